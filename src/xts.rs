//! Buffered streaming XTS cipher.
//!
//! XTS-AES (IEEE P1619 / NIST SP 800-38E) encrypts each 16-byte block as
//! `C = E_K1(P ⊕ T) ⊕ T` with a per-block tweak `T` from
//! [`TweakSequence`], and handles a non-aligned tail with ciphertext
//! stealing (CTS) so output length always equals input length.
//!
//! ## Buffering discipline
//!
//! CTS needs the final *two* blocks of a data unit together, and the
//! stream only learns which blocks are final at [`finalize`]. The cipher
//! therefore keeps 16–31 bytes pending at all times once it has seen a
//! full block: [`process`] emits a block only after bytes of a strictly
//! later block have arrived, and whatever remains pending is resolved -
//! possibly stolen - at finalization.
//!
//! ## Modes
//!
//! * [`XtsMode::Continuous`] - one logical stream across many sectors; the
//!   tweak sequence rolls over at each sector boundary.
//! * [`XtsMode::Independent`] - the stream is a single data unit bounded
//!   by one sector; exceeding the sector's byte budget is an error.
//!
//! [`process`]: XtsCipher::process
//! [`finalize`]: XtsCipher::finalize

use zeroize::Zeroize;

use crate::aes::{AesEcb, BLOCK_SIZE};
use crate::gf128;
use crate::tweak::TweakSequence;
use crate::{Error, Result};

/// Most bytes the cipher keeps pending between calls: one byte short of
/// two blocks.
const MAX_PENDING: usize = 2 * BLOCK_SIZE - 1;

/// Whether the stream spans sectors or is confined to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XtsMode {
    /// The stream walks consecutive sectors; tweaks roll over at sector
    /// boundaries and there is no per-call length limit.
    Continuous,
    /// The whole stream is one data unit inside a single sector. Bytes
    /// past the sector size are rejected.
    Independent,
}

/// Transform direction, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Construction parameters for [`XtsCipher`].
///
/// `key1` encrypts data, `key2` encrypts sector indices into tweaks. Both
/// must be the same length, 16 bytes (XTS-AES-128) or 32 (XTS-AES-256).
/// IEEE 1619 wants the two keys distinct for its security bound; that is
/// the caller's choice and not enforced here.
#[derive(Clone, Copy)]
pub struct XtsParams<'a> {
    pub mode: XtsMode,
    pub key1: &'a [u8],
    pub key2: &'a [u8],
    /// Data-unit size in bytes, at least 16, not necessarily a multiple
    /// of 16.
    pub sector_size: u64,
    /// Sector index the stream starts at (and returns to on reset).
    pub start_sector: u64,
}

/// Streaming XTS-AES encryptor/decryptor.
///
/// Not safe for concurrent use; distinct instances share nothing. The
/// pending buffer, tweaks, and key schedules are wiped on [`dispose`] and
/// on drop.
///
/// [`dispose`]: XtsCipher::dispose
pub struct XtsCipher {
    direction: Direction,
    mode: XtsMode,
    cipher: AesEcb,
    tweaks: TweakSequence,
    start_sector: u64,
    pending: [u8; MAX_PENDING],
    pending_len: usize,
    /// Logical bytes accepted toward the current sector, pending bytes
    /// included. Tracked in Independent mode only.
    sector_bytes: u64,
    disposed: bool,
}

impl XtsCipher {
    /// Build a cipher for `direction` from `params`.
    ///
    /// Fails with [`Error::InvalidArgument`] on mismatched or unsupported
    /// key lengths or a sector size below one block.
    pub fn new(direction: Direction, params: XtsParams<'_>) -> Result<Self> {
        if params.key1.len() != params.key2.len() {
            return Err(Error::InvalidArgument(
                "data and tweak keys must be the same length",
            ));
        }
        let cipher = AesEcb::new(params.key1)?;
        let tweaks = TweakSequence::new(params.key2, params.sector_size, params.start_sector, 0)?;
        Ok(Self {
            direction,
            mode: params.mode,
            cipher,
            tweaks,
            start_sector: params.start_sector,
            pending: [0u8; MAX_PENDING],
            pending_len: 0,
            sector_bytes: 0,
            disposed: false,
        })
    }

    /// The XTS block size, 16 bytes.
    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Algorithm identity string.
    pub fn algorithm_name(&self) -> &'static str {
        "AES/XTS"
    }

    /// Configured transform direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Configured mode.
    pub fn mode(&self) -> XtsMode {
        self.mode
    }

    /// Read-only view of the owned tweak sequence.
    pub fn tweaks(&self) -> &TweakSequence {
        &self.tweaks
    }

    /// Exact number of bytes [`process`](Self::process) would emit for
    /// `additional` more input bytes, given the current pending state.
    ///
    /// Fails exactly when the corresponding `process` call would fail its
    /// pre-checks: [`Error::InvalidState`] after disposal or past the
    /// Independent-mode budget.
    pub fn predict_update_size(&self, additional: u64) -> Result<u64> {
        self.ensure_live()?;
        self.check_budget(additional)?;
        Ok(self.update_size(additional))
    }

    /// 32-bit variant of [`predict_update_size`](Self::predict_update_size).
    ///
    /// Additionally fails with [`Error::InvalidState`] when the combined
    /// input no longer fits a 32-bit-addressed output.
    pub fn predict_update_size_u32(&self, additional: u32) -> Result<u32> {
        self.ensure_live()?;
        self.check_budget(u64::from(additional))?;
        self.check_int32(u64::from(additional))?;
        Ok(self.update_size(u64::from(additional)) as u32)
    }

    /// Exact number of bytes [`finalize`](Self::finalize) would emit for
    /// `additional` trailing bytes: `pending + additional`, since XTS
    /// preserves length.
    pub fn predict_final_size(&self, additional: u64) -> Result<u64> {
        self.ensure_live()?;
        self.check_budget(additional)?;
        Ok((self.pending_len as u64).saturating_add(additional))
    }

    /// 32-bit variant of [`predict_final_size`](Self::predict_final_size).
    pub fn predict_final_size_u32(&self, additional: u32) -> Result<u32> {
        self.ensure_live()?;
        self.check_budget(u64::from(additional))?;
        self.check_int32(u64::from(additional))?;
        Ok((self.pending_len as u64 + u64::from(additional)) as u32)
    }

    /// Absorb `input`, emitting any blocks that are now safe to release.
    ///
    /// Emits `predict_update_size(input.len())` bytes into `output` and
    /// returns that count; between 16 and 31 bytes stay pending for the
    /// eventual CTS tail. All failures are pre-checks - on error nothing
    /// was read, written, or changed.
    pub fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.ensure_live()?;
        self.check_budget(input.len() as u64)?;
        let emit = self.update_size(input.len() as u64) as usize;
        if output.len() < emit {
            return Err(Error::InvalidArgument("output buffer too small for update"));
        }
        if let XtsMode::Independent = self.mode {
            self.sector_bytes += input.len() as u64;
        }

        if emit == 0 {
            self.pending[self.pending_len..self.pending_len + input.len()].copy_from_slice(input);
            self.pending_len += input.len();
            return Ok(0);
        }

        // Drain whole blocks from the logical stream pending || input,
        // leaving the 16..=31 byte tail pending.
        let mut held = [0u8; MAX_PENDING];
        held[..self.pending_len].copy_from_slice(&self.pending[..self.pending_len]);
        let held_len = self.pending_len;
        let total = held_len + input.len();
        self.pending.zeroize();
        self.pending_len = 0;

        let mut block = [0u8; BLOCK_SIZE];
        for i in 0..emit / BLOCK_SIZE {
            gather(&held[..held_len], input, i * BLOCK_SIZE, &mut block);
            self.crypt_block(&mut block);
            output[i * BLOCK_SIZE..(i + 1) * BLOCK_SIZE].copy_from_slice(&block);
        }
        block.zeroize();

        let keep = total - emit;
        gather(&held[..held_len], input, emit, &mut self.pending[..keep]);
        self.pending_len = keep;
        held.zeroize();
        Ok(emit)
    }

    /// Per-byte variant of [`process`](Self::process).
    pub fn process_byte(&mut self, input: u8, output: &mut [u8]) -> Result<usize> {
        self.process(&[input], output)
    }

    /// Close the data unit: absorb `trailing`, emit everything still
    /// pending - applying ciphertext stealing if the total is not
    /// block-aligned - and reset to the configured start state.
    ///
    /// Emits zero bytes for an empty unit, and fails with
    /// [`Error::InvalidArgument`] for a unit shorter than one block or a
    /// stolen pair that would straddle a sector boundary (CTS is defined
    /// only within a single data unit).
    pub fn finalize(&mut self, trailing: &[u8], output: &mut [u8]) -> Result<usize> {
        self.ensure_live()?;
        self.check_budget(trailing.len() as u64)?;
        let total = self.pending_len + trailing.len();
        if total == 0 {
            self.rewind();
            return Ok(0);
        }
        if total < BLOCK_SIZE {
            return Err(Error::InvalidArgument("data unit shorter than one block"));
        }
        if output.len() < total {
            return Err(Error::InvalidArgument("output buffer too small for final"));
        }
        let partial = total % BLOCK_SIZE;
        let blocks = total / BLOCK_SIZE;
        if self.mode == XtsMode::Continuous && partial != 0 {
            // The stolen pair must sit inside one sector: refuse when the
            // penultimate block would be the sector's last.
            let bps = self.tweaks.blocks_per_sector();
            if (self.tweaks.block() + blocks as u64 - 1) % bps == bps - 1 {
                return Err(Error::InvalidArgument(
                    "invalid data state for final at a sector boundary",
                ));
            }
        }

        let mut held = [0u8; MAX_PENDING];
        held[..self.pending_len].copy_from_slice(&self.pending[..self.pending_len]);
        let held_len = self.pending_len;

        // Leading blocks transform normally; the last 16 or 16+partial
        // bytes form the final block or the stolen pair.
        let tail_len = if partial == 0 { BLOCK_SIZE } else { BLOCK_SIZE + partial };
        let lead = total - tail_len;
        let mut block = [0u8; BLOCK_SIZE];
        for i in 0..lead / BLOCK_SIZE {
            gather(&held[..held_len], trailing, i * BLOCK_SIZE, &mut block);
            self.crypt_block(&mut block);
            output[i * BLOCK_SIZE..(i + 1) * BLOCK_SIZE].copy_from_slice(&block);
        }

        let mut tail = [0u8; MAX_PENDING];
        gather(&held[..held_len], trailing, lead, &mut tail[..tail_len]);
        held.zeroize();

        if partial == 0 {
            block.copy_from_slice(&tail[..BLOCK_SIZE]);
            self.crypt_block(&mut block);
            output[lead..lead + BLOCK_SIZE].copy_from_slice(&block);
        } else {
            self.crypt_stolen(&mut tail, partial);
            output[lead..lead + tail_len].copy_from_slice(&tail[..tail_len]);
        }
        block.zeroize();
        tail.zeroize();

        self.rewind();
        Ok(total)
    }

    /// Discard all buffered data and return to the configured start
    /// sector with an empty pending buffer.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.rewind();
        Ok(())
    }

    fn rewind(&mut self) {
        self.pending.zeroize();
        self.pending_len = 0;
        self.sector_bytes = 0;
        self.tweaks.rewind(self.start_sector);
    }

    /// Wipe all sensitive state and permanently retire the instance.
    ///
    /// Every later operation fails with [`Error::InvalidState`]. Also runs
    /// on drop.
    pub fn dispose(&mut self) {
        self.pending.zeroize();
        self.pending_len = 0;
        self.sector_bytes = 0;
        self.tweaks.wipe();
        self.cipher.wipe();
        self.disposed = true;
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            return Err(Error::InvalidState("cipher has been disposed"));
        }
        Ok(())
    }

    /// Independent mode admits at most one sector's worth of logical
    /// bytes, buffered bytes included.
    fn check_budget(&self, additional: u64) -> Result<()> {
        if let XtsMode::Independent = self.mode {
            match self.sector_bytes.checked_add(additional) {
                Some(total) if total <= self.tweaks.sector_size() => {}
                _ => {
                    return Err(Error::InvalidState(
                        "input exceeds the sector byte budget",
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_int32(&self, additional: u64) -> Result<()> {
        if self.pending_len as u64 + additional > i32::MAX as u64 {
            return Err(Error::InvalidState("output size exceeds the 32-bit range"));
        }
        Ok(())
    }

    fn update_size(&self, additional: u64) -> u64 {
        // Saturating keeps nonsense queries near u64::MAX from wrapping;
        // real inputs are bounded by address space and never saturate.
        let total = (self.pending_len as u64).saturating_add(additional);
        (total / BLOCK_SIZE as u64)
            .saturating_sub(1)
            .saturating_mul(BLOCK_SIZE as u64)
    }

    /// One full-block transform: XOR tweak, AES, XOR tweak, advance.
    fn crypt_block(&mut self, block: &mut [u8; BLOCK_SIZE]) {
        let mut t = [0u8; BLOCK_SIZE];
        self.tweaks.take_and_advance(&mut t);
        gf128::xor(block, &t);
        match self.direction {
            Direction::Encrypt => self.cipher.encrypt_block(block),
            Direction::Decrypt => self.cipher.decrypt_block(block),
        }
        gf128::xor(block, &t);
        t.zeroize();
    }

    /// Transform the final 16 + `partial` bytes of a unit with ciphertext
    /// stealing, in place, in emission order.
    fn crypt_stolen(&mut self, tail: &mut [u8; MAX_PENDING], partial: usize) {
        let mut t_prev = [0u8; BLOCK_SIZE];
        let mut t_last = [0u8; BLOCK_SIZE];
        self.tweaks.take_and_advance(&mut t_prev);
        self.tweaks.take_and_advance(&mut t_last);

        let mut full = [0u8; BLOCK_SIZE];
        full.copy_from_slice(&tail[..BLOCK_SIZE]);
        let mut joined = [0u8; BLOCK_SIZE];

        match self.direction {
            Direction::Encrypt => {
                // CC = E(P(n-1) ⊕ T(n-1)) ⊕ T(n-1); its tail is stolen to
                // pad the short final block.
                gf128::xor(&mut full, &t_prev);
                self.cipher.encrypt_block(&mut full);
                gf128::xor(&mut full, &t_prev);

                joined[..partial].copy_from_slice(&tail[BLOCK_SIZE..BLOCK_SIZE + partial]);
                joined[partial..].copy_from_slice(&full[partial..]);
                gf128::xor(&mut joined, &t_last);
                self.cipher.encrypt_block(&mut joined);
                gf128::xor(&mut joined, &t_last);

                // Emit C(n-1) then the truncated C(n).
                tail[BLOCK_SIZE..BLOCK_SIZE + partial].copy_from_slice(&full[..partial]);
                tail[..BLOCK_SIZE].copy_from_slice(&joined);
            }
            Direction::Decrypt => {
                // The stored C(n-1) was produced under T(n); undo it first
                // to recover P(n) and the stolen ciphertext tail.
                gf128::xor(&mut full, &t_last);
                self.cipher.decrypt_block(&mut full);
                gf128::xor(&mut full, &t_last);

                joined[..partial].copy_from_slice(&tail[BLOCK_SIZE..BLOCK_SIZE + partial]);
                joined[partial..].copy_from_slice(&full[partial..]);
                gf128::xor(&mut joined, &t_prev);
                self.cipher.decrypt_block(&mut joined);
                gf128::xor(&mut joined, &t_prev);

                // Emit P(n-1) then the short P(n).
                tail[BLOCK_SIZE..BLOCK_SIZE + partial].copy_from_slice(&full[..partial]);
                tail[..BLOCK_SIZE].copy_from_slice(&joined);
            }
        }

        full.zeroize();
        joined.zeroize();
        t_prev.zeroize();
        t_last.zeroize();
    }
}

impl Drop for XtsCipher {
    fn drop(&mut self) {
        self.pending.zeroize();
    }
}

/// Copy `out.len()` bytes starting at logical offset `pos` of the
/// concatenation `head || tail`. The caller guarantees the span fits.
fn gather(head: &[u8], tail: &[u8], pos: usize, out: &mut [u8]) {
    let mut written = 0;
    let mut pos = pos;
    if pos < head.len() {
        let n = (head.len() - pos).min(out.len());
        out[..n].copy_from_slice(&head[pos..pos + n]);
        written = n;
        pos = head.len();
    }
    let at = pos - head.len();
    let rest = out.len() - written;
    out[written..].copy_from_slice(&tail[at..at + rest]);
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    const KEY1: [u8; 16] = [
        0x27, 0x18, 0x28, 0x18, 0x28, 0x45, 0x90, 0x45, 0x23, 0x53, 0x60, 0x28, 0x74, 0x71, 0x35,
        0x26,
    ];
    const KEY2: [u8; 16] = [
        0x31, 0x41, 0x59, 0x26, 0x53, 0x58, 0x97, 0x93, 0x23, 0x84, 0x62, 0x64, 0x33, 0x83, 0x27,
        0x95,
    ];

    fn cipher(direction: Direction, mode: XtsMode, sector_size: u64) -> XtsCipher {
        XtsCipher::new(
            direction,
            XtsParams {
                mode,
                key1: &KEY1,
                key2: &KEY2,
                sector_size,
                start_sector: 0,
            },
        )
        .unwrap()
    }

    fn one_shot(direction: Direction, sector_size: u64, data: &[u8]) -> Vec<u8> {
        let mut c = cipher(direction, XtsMode::Continuous, sector_size);
        let mut out = vec![0u8; data.len()];
        let n = c.process(data, &mut out).unwrap();
        let m = c.finalize(&[], &mut out[n..]).unwrap();
        assert_eq!(n + m, data.len());
        out
    }

    #[test]
    fn rejects_mismatched_key_lengths() {
        let result = XtsCipher::new(
            Direction::Encrypt,
            XtsParams {
                mode: XtsMode::Continuous,
                key1: &[0u8; 16],
                key2: &[0u8; 32],
                sector_size: 512,
                start_sector: 0,
            },
        );
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn holds_back_the_final_two_blocks() {
        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        let mut out = vec![0u8; 64];
        // 31 bytes fit entirely in the pending buffer.
        assert_eq!(c.process(&[0xAA; 31], &mut out).unwrap(), 0);
        // The 32nd byte releases exactly one block.
        assert_eq!(c.process_byte(0xAA, &mut out).unwrap(), 16);
        assert_eq!(c.predict_final_size(0).unwrap(), 16);
    }

    #[test]
    fn round_trips_all_tail_shapes() {
        for len in [16usize, 17, 31, 32, 33, 48, 100, 512, 500] {
            let mut data = vec![0u8; len];
            rand::thread_rng().fill(&mut data[..]);
            let ct = one_shot(Direction::Encrypt, 512, &data);
            assert_eq!(ct.len(), len);
            assert_ne!(ct, data, "ciphertext should differ at {len} bytes");
            let pt = one_shot(Direction::Decrypt, 512, &ct);
            assert_eq!(pt, data, "round trip at {len} bytes");
        }
    }

    #[test]
    fn round_trips_across_sector_boundaries() {
        // 64-byte sectors force several rollovers inside 500 bytes.
        let mut data = vec![0u8; 500];
        rand::thread_rng().fill(&mut data[..]);
        let ct = one_shot(Direction::Encrypt, 64, &data);
        let pt = one_shot(Direction::Decrypt, 64, &ct);
        assert_eq!(pt, data);
    }

    #[test]
    fn fragmented_input_matches_one_shot() {
        let mut rng = rand::thread_rng();
        let mut data = vec![0u8; 500];
        rng.fill(&mut data[..]);
        let expected = one_shot(Direction::Encrypt, 512, &data);

        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        let mut out = vec![0u8; data.len()];
        let mut fed = 0;
        let mut written = 0;
        while fed < data.len() {
            let chunk = rng.gen_range(1..=49).min(data.len() - fed);
            written += c
                .process(&data[fed..fed + chunk], &mut out[written..])
                .unwrap();
            fed += chunk;
        }
        written += c.finalize(&[], &mut out[written..]).unwrap();
        assert_eq!(written, data.len());
        assert_eq!(out, expected);
    }

    #[test]
    fn trailing_bytes_on_finalize_match_process_then_finalize() {
        let mut data = vec![0u8; 77];
        rand::thread_rng().fill(&mut data[..]);
        let expected = one_shot(Direction::Encrypt, 512, &data);

        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        let mut out = vec![0u8; data.len()];
        let n = c.process(&data[..40], &mut out).unwrap();
        let m = c.finalize(&data[40..], &mut out[n..]).unwrap();
        assert_eq!(n + m, data.len());
        assert_eq!(out, expected);
    }

    #[test]
    fn predictions_match_actual_emission() {
        let mut rng = rand::thread_rng();
        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        let mut out = vec![0u8; 4096];
        for _ in 0..200 {
            let n = rng.gen_range(0..64);
            let chunk = vec![0x5Au8; n];
            let predicted = c.predict_update_size(n as u64).unwrap();
            let emitted = c.process(&chunk, &mut out).unwrap();
            assert_eq!(predicted, emitted as u64);
        }
        let predicted = c.predict_final_size(0).unwrap();
        let emitted = c.finalize(&[], &mut out).unwrap();
        assert_eq!(predicted, emitted as u64);
    }

    #[test]
    fn predict_final_is_length_preserving() {
        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        let mut out = vec![0u8; 64];
        c.process(&[0u8; 20], &mut out).unwrap();
        assert_eq!(c.predict_final_size(13).unwrap(), 33);
    }

    #[test]
    fn empty_finalize_emits_nothing() {
        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        assert_eq!(c.finalize(&[], &mut []).unwrap(), 0);
    }

    #[test]
    fn rejects_units_shorter_than_a_block() {
        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        let mut out = [0u8; 16];
        c.process(&[1, 2, 3], &mut out).unwrap();
        assert!(matches!(
            c.finalize(&[], &mut out),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_undersized_output_buffers() {
        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        let mut small = [0u8; 8];
        assert!(matches!(
            c.process(&[0u8; 48], &mut small),
            Err(Error::InvalidArgument(_))
        ));
        // Nothing was consumed by the failed call.
        assert_eq!(c.predict_final_size(0).unwrap(), 0);
    }

    #[test]
    fn cts_across_a_sector_boundary_is_rejected() {
        // 33 bytes into 32-byte sectors: the stolen pair would straddle.
        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 32);
        let mut out = vec![0u8; 64];
        let n = c.process(&[0x77; 33], &mut out).unwrap();
        assert!(matches!(
            c.finalize(&[], &mut out[n..]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn block_aligned_tail_at_a_sector_edge_is_fine() {
        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 32);
        let mut out = vec![0u8; 32];
        let n = c.process(&[0x77; 32], &mut out).unwrap();
        assert_eq!(c.finalize(&[], &mut out[n..]).unwrap(), 32 - n);
    }

    #[test]
    fn independent_mode_budget_is_enforced() {
        let mut c = cipher(Direction::Encrypt, XtsMode::Independent, 32);
        let mut out = vec![0u8; 64];
        let n = c.process(&[0x11; 32], &mut out).unwrap();
        assert_eq!(n, 16);
        // One more byte exceeds the sector; state must be untouched.
        assert!(matches!(
            c.process_byte(0x22, &mut out[n..]),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            c.predict_update_size(1),
            Err(Error::InvalidState(_))
        ));
        let m = c.finalize(&[], &mut out[n..]).unwrap();
        assert_eq!(n + m, 32);
    }

    #[test]
    fn independent_mode_resets_its_budget_on_finalize() {
        let mut c = cipher(Direction::Encrypt, XtsMode::Independent, 32);
        let mut out = vec![0u8; 32];
        let n = c.process(&[0x11; 32], &mut out).unwrap();
        c.finalize(&[], &mut out[n..]).unwrap();
        // A fresh unit fits again.
        assert_eq!(c.predict_update_size(32).unwrap(), 16);
    }

    #[test]
    fn finalize_auto_resets() {
        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        let mut out = vec![0u8; 64];
        let n = c.process(&[0x33; 40], &mut out).unwrap();
        c.finalize(&[], &mut out[n..]).unwrap();
        assert_eq!(c.predict_final_size(0).unwrap(), 0);
        assert_eq!((c.tweaks().sector(), c.tweaks().block()), (0, 0));

        // A repeat unit produces identical bytes without reconfiguration.
        let mut again = vec![0u8; 64];
        let n2 = c.process(&[0x33; 40], &mut again).unwrap();
        c.finalize(&[], &mut again[n2..]).unwrap();
        assert_eq!(again[..40], out[..40]);
    }

    #[test]
    fn reset_discards_buffered_bytes() {
        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        let mut out = vec![0u8; 64];
        c.process(&[0x44; 20], &mut out).unwrap();
        c.reset().unwrap();
        assert_eq!(c.predict_final_size(0).unwrap(), 0);
    }

    #[test]
    fn one_shot_equals_streaming_prefix() {
        // Emitted bytes are a strict prefix of the one-shot result long
        // before finalize.
        let mut data = vec![0u8; 200];
        rand::thread_rng().fill(&mut data[..]);
        let expected = one_shot(Direction::Encrypt, 512, &data);

        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        let mut out = vec![0u8; 200];
        let n = c.process(&data, &mut out).unwrap();
        assert_eq!(out[..n], expected[..n]);
    }

    #[test]
    fn predict_sizes_u32_guard_the_int32_range() {
        let c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        assert!(matches!(
            c.predict_update_size_u32(u32::MAX),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            c.predict_final_size_u32(u32::MAX),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(c.predict_update_size_u32(100).unwrap(), 80);
        assert_eq!(c.predict_final_size_u32(100).unwrap(), 100);
    }

    #[test]
    fn dispose_retires_the_instance_and_wipes_the_tweak() {
        let mut c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        let mut out = vec![0u8; 64];
        c.process(&[0x55; 20], &mut out).unwrap();
        assert_ne!(*c.tweaks().current(), [0u8; 16]);
        c.dispose();
        assert_eq!(*c.tweaks().current(), [0u8; 16]);
        assert!(matches!(
            c.process(&[0u8; 16], &mut out),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(c.finalize(&[], &mut out), Err(Error::InvalidState(_))));
        assert!(matches!(c.predict_update_size(0), Err(Error::InvalidState(_))));
        assert!(matches!(c.predict_final_size(0), Err(Error::InvalidState(_))));
        assert!(matches!(c.reset(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn reports_identity() {
        let c = cipher(Direction::Encrypt, XtsMode::Continuous, 512);
        assert_eq!(c.block_size(), 16);
        assert_eq!(c.algorithm_name(), "AES/XTS");
        assert_eq!(c.direction(), Direction::Encrypt);
        assert_eq!(c.mode(), XtsMode::Continuous);
    }
}
