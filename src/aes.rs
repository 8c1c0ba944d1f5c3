//! AES-ECB single-block primitive.
//!
//! XTS consumes AES strictly one 16-byte block at a time, under a key fixed
//! for the life of the cipher. [`AesEcb`] therefore expands the key schedule
//! once at construction and exposes in-place [`encrypt_block`] /
//! [`decrypt_block`] calls; there is no mode logic here.
//!
//! AES-128 (10 rounds) and AES-256 (14 rounds) are supported, the two key
//! sizes XTS-AES is defined for. The implementation is a plain
//! lookup-table Rijndael and is not constant-time; it targets correctness
//! and portability, not side-channel resistance.
//!
//! [`encrypt_block`]: AesEcb::encrypt_block
//! [`decrypt_block`]: AesEcb::decrypt_block

use zeroize::Zeroize;

use crate::{Error, Result};

/// AES block size in bytes, which is also the XTS block size.
pub const BLOCK_SIZE: usize = 16;

/// Round-key bytes for the largest supported variant (AES-256 keeps 15
/// round keys of 16 bytes).
const MAX_SCHEDULE: usize = 240;

/// Forward S-box (FIPS 197, figure 7).
const SBOX: [u8; 256] = [
    0x63, 0x7C, 0x77, 0x7B, 0xF2, 0x6B, 0x6F, 0xC5, 0x30, 0x01, 0x67, 0x2B, 0xFE, 0xD7, 0xAB, 0x76,
    0xCA, 0x82, 0xC9, 0x7D, 0xFA, 0x59, 0x47, 0xF0, 0xAD, 0xD4, 0xA2, 0xAF, 0x9C, 0xA4, 0x72, 0xC0,
    0xB7, 0xFD, 0x93, 0x26, 0x36, 0x3F, 0xF7, 0xCC, 0x34, 0xA5, 0xE5, 0xF1, 0x71, 0xD8, 0x31, 0x15,
    0x04, 0xC7, 0x23, 0xC3, 0x18, 0x96, 0x05, 0x9A, 0x07, 0x12, 0x80, 0xE2, 0xEB, 0x27, 0xB2, 0x75,
    0x09, 0x83, 0x2C, 0x1A, 0x1B, 0x6E, 0x5A, 0xA0, 0x52, 0x3B, 0xD6, 0xB3, 0x29, 0xE3, 0x2F, 0x84,
    0x53, 0xD1, 0x00, 0xED, 0x20, 0xFC, 0xB1, 0x5B, 0x6A, 0xCB, 0xBE, 0x39, 0x4A, 0x4C, 0x58, 0xCF,
    0xD0, 0xEF, 0xAA, 0xFB, 0x43, 0x4D, 0x33, 0x85, 0x45, 0xF9, 0x02, 0x7F, 0x50, 0x3C, 0x9F, 0xA8,
    0x51, 0xA3, 0x40, 0x8F, 0x92, 0x9D, 0x38, 0xF5, 0xBC, 0xB6, 0xDA, 0x21, 0x10, 0xFF, 0xF3, 0xD2,
    0xCD, 0x0C, 0x13, 0xEC, 0x5F, 0x97, 0x44, 0x17, 0xC4, 0xA7, 0x7E, 0x3D, 0x64, 0x5D, 0x19, 0x73,
    0x60, 0x81, 0x4F, 0xDC, 0x22, 0x2A, 0x90, 0x88, 0x46, 0xEE, 0xB8, 0x14, 0xDE, 0x5E, 0x0B, 0xDB,
    0xE0, 0x32, 0x3A, 0x0A, 0x49, 0x06, 0x24, 0x5C, 0xC2, 0xD3, 0xAC, 0x62, 0x91, 0x95, 0xE4, 0x79,
    0xE7, 0xC8, 0x37, 0x6D, 0x8D, 0xD5, 0x4E, 0xA9, 0x6C, 0x56, 0xF4, 0xEA, 0x65, 0x7A, 0xAE, 0x08,
    0xBA, 0x78, 0x25, 0x2E, 0x1C, 0xA6, 0xB4, 0xC6, 0xE8, 0xDD, 0x74, 0x1F, 0x4B, 0xBD, 0x8B, 0x8A,
    0x70, 0x3E, 0xB5, 0x66, 0x48, 0x03, 0xF6, 0x0E, 0x61, 0x35, 0x57, 0xB9, 0x86, 0xC1, 0x1D, 0x9E,
    0xE1, 0xF8, 0x98, 0x11, 0x69, 0xD9, 0x8E, 0x94, 0x9B, 0x1E, 0x87, 0xE9, 0xCE, 0x55, 0x28, 0xDF,
    0x8C, 0xA1, 0x89, 0x0D, 0xBF, 0xE6, 0x42, 0x68, 0x41, 0x99, 0x2D, 0x0F, 0xB0, 0x54, 0xBB, 0x16,
];

/// Inverse S-box (FIPS 197, figure 14).
const INV_SBOX: [u8; 256] = [
    0x52, 0x09, 0x6A, 0xD5, 0x30, 0x36, 0xA5, 0x38, 0xBF, 0x40, 0xA3, 0x9E, 0x81, 0xF3, 0xD7, 0xFB,
    0x7C, 0xE3, 0x39, 0x82, 0x9B, 0x2F, 0xFF, 0x87, 0x34, 0x8E, 0x43, 0x44, 0xC4, 0xDE, 0xE9, 0xCB,
    0x54, 0x7B, 0x94, 0x32, 0xA6, 0xC2, 0x23, 0x3D, 0xEE, 0x4C, 0x95, 0x0B, 0x42, 0xFA, 0xC3, 0x4E,
    0x08, 0x2E, 0xA1, 0x66, 0x28, 0xD9, 0x24, 0xB2, 0x76, 0x5B, 0xA2, 0x49, 0x6D, 0x8B, 0xD1, 0x25,
    0x72, 0xF8, 0xF6, 0x64, 0x86, 0x68, 0x98, 0x16, 0xD4, 0xA4, 0x5C, 0xCC, 0x5D, 0x65, 0xB6, 0x92,
    0x6C, 0x70, 0x48, 0x50, 0xFD, 0xED, 0xB9, 0xDA, 0x5E, 0x15, 0x46, 0x57, 0xA7, 0x8D, 0x9D, 0x84,
    0x90, 0xD8, 0xAB, 0x00, 0x8C, 0xBC, 0xD3, 0x0A, 0xF7, 0xE4, 0x58, 0x05, 0xB8, 0xB3, 0x45, 0x06,
    0xD0, 0x2C, 0x1E, 0x8F, 0xCA, 0x3F, 0x0F, 0x02, 0xC1, 0xAF, 0xBD, 0x03, 0x01, 0x13, 0x8A, 0x6B,
    0x3A, 0x91, 0x11, 0x41, 0x4F, 0x67, 0xDC, 0xEA, 0x97, 0xF2, 0xCF, 0xCE, 0xF0, 0xB4, 0xE6, 0x73,
    0x96, 0xAC, 0x74, 0x22, 0xE7, 0xAD, 0x35, 0x85, 0xE2, 0xF9, 0x37, 0xE8, 0x1C, 0x75, 0xDF, 0x6E,
    0x47, 0xF1, 0x1A, 0x71, 0x1D, 0x29, 0xC5, 0x89, 0x6F, 0xB7, 0x62, 0x0E, 0xAA, 0x18, 0xBE, 0x1B,
    0xFC, 0x56, 0x3E, 0x4B, 0xC6, 0xD2, 0x79, 0x20, 0x9A, 0xDB, 0xC0, 0xFE, 0x78, 0xCD, 0x5A, 0xF4,
    0x1F, 0xDD, 0xA8, 0x33, 0x88, 0x07, 0xC7, 0x31, 0xB1, 0x12, 0x10, 0x59, 0x27, 0x80, 0xEC, 0x5F,
    0x60, 0x51, 0x7F, 0xA9, 0x19, 0xB5, 0x4A, 0x0D, 0x2D, 0xE5, 0x7A, 0x9F, 0x93, 0xC9, 0x9C, 0xEF,
    0xA0, 0xE0, 0x3B, 0x4D, 0xAE, 0x2A, 0xF5, 0xB0, 0xC8, 0xEB, 0xBB, 0x3C, 0x83, 0x53, 0x99, 0x61,
    0x17, 0x2B, 0x04, 0x7E, 0xBA, 0x77, 0xD6, 0x26, 0xE1, 0x69, 0x14, 0x63, 0x55, 0x21, 0x0C, 0x7D,
];

/// Keyed AES context for single-block ECB operations.
///
/// Construction validates the key length and expands the round keys once;
/// every block call after that is schedule-reuse only. The schedule is
/// wiped on drop.
pub struct AesEcb {
    w: [u8; MAX_SCHEDULE],
    rounds: usize,
}

impl AesEcb {
    /// Build a context from a 16-byte (AES-128) or 32-byte (AES-256) key.
    ///
    /// Any other length is [`Error::InvalidArgument`]; XTS-AES is not
    /// defined for AES-192.
    pub fn new(key: &[u8]) -> Result<Self> {
        let (nk, rounds) = match key.len() {
            16 => (4, 10),
            32 => (8, 14),
            _ => return Err(Error::InvalidArgument("AES key must be 16 or 32 bytes")),
        };
        let mut w = [0u8; MAX_SCHEDULE];
        expand_key(key, nk, rounds, &mut w);
        Ok(Self { w, rounds })
    }

    /// Encrypt one block in place.
    pub fn encrypt_block(&self, s: &mut [u8; BLOCK_SIZE]) {
        add_round_key(s, &self.w[..16]);
        for round in 1..self.rounds {
            sub_bytes(s);
            shift_rows(s);
            mix_columns(s);
            add_round_key(s, &self.w[round * 16..(round + 1) * 16]);
        }
        sub_bytes(s);
        shift_rows(s);
        add_round_key(s, &self.w[self.rounds * 16..(self.rounds + 1) * 16]);
    }

    /// Decrypt one block in place.
    pub fn decrypt_block(&self, s: &mut [u8; BLOCK_SIZE]) {
        add_round_key(s, &self.w[self.rounds * 16..(self.rounds + 1) * 16]);
        for round in (1..self.rounds).rev() {
            inv_shift_rows(s);
            inv_sub_bytes(s);
            add_round_key(s, &self.w[round * 16..(round + 1) * 16]);
            inv_mix_columns(s);
        }
        inv_shift_rows(s);
        inv_sub_bytes(s);
        add_round_key(s, &self.w[..16]);
    }

    /// Destroy the key schedule ahead of drop. The context must not be
    /// used for block operations afterwards.
    pub(crate) fn wipe(&mut self) {
        self.w.zeroize();
    }
}

impl Drop for AesEcb {
    fn drop(&mut self) {
        self.w.zeroize();
    }
}

/// KeyExpansion (FIPS 197, section 5.2) for NK = 4 or 8.
///
/// The NK > 6 variants insert an extra SubWord at every fourth word between
/// the RotWord positions; the round constant doubles in GF(2^8) each time
/// it is consumed.
fn expand_key(key: &[u8], nk: usize, rounds: usize, w: &mut [u8; MAX_SCHEDULE]) {
    w[..key.len()].copy_from_slice(key);
    let words = 4 * (rounds + 1);
    let mut rcon: u8 = 0x01;
    let mut t = [0u8; 4];
    for i in nk..words {
        t.copy_from_slice(&w[4 * (i - 1)..4 * i]);
        if i % nk == 0 {
            t.rotate_left(1);
            for b in &mut t {
                *b = SBOX[*b as usize];
            }
            t[0] ^= rcon;
            rcon = xtime(rcon);
        } else if nk > 6 && i % nk == 4 {
            for b in &mut t {
                *b = SBOX[*b as usize];
            }
        }
        for j in 0..4 {
            w[4 * i + j] = w[4 * (i - nk) + j] ^ t[j];
        }
    }
    t.zeroize();
}

/// Multiply by x in GF(2^8), reduction polynomial 0x11B.
#[inline]
fn xtime(b: u8) -> u8 {
    (b << 1) ^ if b & 0x80 != 0 { 0x1B } else { 0 }
}

/// General GF(2^8) multiply, used by the column mixes.
#[inline]
fn gf256_mul(mut a: u8, mut b: u8) -> u8 {
    let mut p = 0;
    while b != 0 {
        if b & 1 != 0 {
            p ^= a;
        }
        a = xtime(a);
        b >>= 1;
    }
    p
}

fn add_round_key(s: &mut [u8; BLOCK_SIZE], rk: &[u8]) {
    for (b, k) in s.iter_mut().zip(rk) {
        *b ^= k;
    }
}

fn sub_bytes(s: &mut [u8; BLOCK_SIZE]) {
    for b in s.iter_mut() {
        *b = SBOX[*b as usize];
    }
}

fn inv_sub_bytes(s: &mut [u8; BLOCK_SIZE]) {
    for b in s.iter_mut() {
        *b = INV_SBOX[*b as usize];
    }
}

// The state is column-major: row i lives at indices {i, i+4, i+8, i+12}.

fn shift_rows(s: &mut [u8; BLOCK_SIZE]) {
    // Row 1: left-rotate by 1.
    let t = s[1];
    s[1] = s[5];
    s[5] = s[9];
    s[9] = s[13];
    s[13] = t;
    // Row 2: left-rotate by 2.
    s.swap(2, 10);
    s.swap(6, 14);
    // Row 3: left-rotate by 3, i.e. right-rotate by 1.
    let t = s[15];
    s[15] = s[11];
    s[11] = s[7];
    s[7] = s[3];
    s[3] = t;
}

fn inv_shift_rows(s: &mut [u8; BLOCK_SIZE]) {
    // Row 1: right-rotate by 1.
    let t = s[13];
    s[13] = s[9];
    s[9] = s[5];
    s[5] = s[1];
    s[1] = t;
    // Row 2: right-rotate by 2.
    s.swap(2, 10);
    s.swap(6, 14);
    // Row 3: right-rotate by 3.
    let t = s[3];
    s[3] = s[7];
    s[7] = s[11];
    s[11] = s[15];
    s[15] = t;
}

fn mix_columns(s: &mut [u8; BLOCK_SIZE]) {
    for col in 0..4 {
        let b = col * 4;
        let (s0, s1, s2, s3) = (s[b], s[b + 1], s[b + 2], s[b + 3]);
        s[b] = gf256_mul(0x02, s0) ^ gf256_mul(0x03, s1) ^ s2 ^ s3;
        s[b + 1] = s0 ^ gf256_mul(0x02, s1) ^ gf256_mul(0x03, s2) ^ s3;
        s[b + 2] = s0 ^ s1 ^ gf256_mul(0x02, s2) ^ gf256_mul(0x03, s3);
        s[b + 3] = gf256_mul(0x03, s0) ^ s1 ^ s2 ^ gf256_mul(0x02, s3);
    }
}

fn inv_mix_columns(s: &mut [u8; BLOCK_SIZE]) {
    for col in 0..4 {
        let b = col * 4;
        let (s0, s1, s2, s3) = (s[b], s[b + 1], s[b + 2], s[b + 3]);
        s[b] = gf256_mul(0x0E, s0) ^ gf256_mul(0x0B, s1) ^ gf256_mul(0x0D, s2) ^ gf256_mul(0x09, s3);
        s[b + 1] =
            gf256_mul(0x09, s0) ^ gf256_mul(0x0E, s1) ^ gf256_mul(0x0B, s2) ^ gf256_mul(0x0D, s3);
        s[b + 2] =
            gf256_mul(0x0D, s0) ^ gf256_mul(0x09, s1) ^ gf256_mul(0x0E, s2) ^ gf256_mul(0x0B, s3);
        s[b + 3] =
            gf256_mul(0x0B, s0) ^ gf256_mul(0x0D, s1) ^ gf256_mul(0x09, s2) ^ gf256_mul(0x0E, s3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // FIPS 197 appendix C known-answer blocks.
    const PLAIN: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE,
        0xFF,
    ];

    fn sequential_key(len: usize) -> Vec<u8> {
        (0..len as u8).collect()
    }

    #[test]
    fn aes128_known_answer() {
        let cipher = AesEcb::new(&sequential_key(16)).unwrap();
        let mut block = PLAIN;
        cipher.encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "69c4e0d86a7b0430d8cdb78070b4c55a");
        cipher.decrypt_block(&mut block);
        assert_eq!(block, PLAIN);
    }

    #[test]
    fn aes256_known_answer() {
        let cipher = AesEcb::new(&sequential_key(32)).unwrap();
        let mut block = PLAIN;
        cipher.encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "8ea2b7ca516745bfeafc49904b496089");
        cipher.decrypt_block(&mut block);
        assert_eq!(block, PLAIN);
    }

    #[test]
    fn rejects_unsupported_key_lengths() {
        for len in [0, 15, 17, 24, 33] {
            assert!(matches!(
                AesEcb::new(&vec![0u8; len]),
                Err(Error::InvalidArgument(_))
            ));
        }
    }
}
