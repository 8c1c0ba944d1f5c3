//! XTS tweak derivation.
//!
//! The tweak for block j of sector s is
//!
//! ```text
//! T(s, j) = E_K2(encode(s)) · α^j
//! ```
//!
//! where `encode` writes the 64-bit sector index as 16 little-endian bytes
//! (IEEE 1619 convention), E_K2 is AES-ECB under the tweak key, and α is
//! the GF(2^128) element `0x02`. Tweaks never cross sector boundaries
//! multiplicatively: each sector starts over from α^0 = E_K2(encode(s)).
//!
//! [`tweak_value`] computes one tweak from its coordinates;
//! [`TweakSequence`] walks them in order, rolling over at sector ends.

use zeroize::Zeroize;

use crate::aes::{AesEcb, BLOCK_SIZE};
use crate::gf128;
use crate::{Error, Result};

/// Compute T(sector, block) from scratch.
///
/// Agrees with [`TweakSequence`] positioned at the same coordinates. The
/// block advance uses the same doubling-vs-closed-form policy as the
/// sequence ([`gf128::advance`]).
pub fn tweak_value(cipher: &AesEcb, sector: u64, block: u64) -> [u8; BLOCK_SIZE] {
    let mut t = [0u8; BLOCK_SIZE];
    t[..8].copy_from_slice(&sector.to_le_bytes());
    cipher.encrypt_block(&mut t);
    gf128::advance(&mut t, block);
    t
}

/// Stateful tweak iterator over (sector, block) coordinates.
///
/// Holds its own AES context keyed with the tweak key. At every observable
/// moment `current()` equals `tweak_value` at the same coordinates. The
/// current tweak is wiped on drop.
pub struct TweakSequence {
    cipher: AesEcb,
    sector_size: u64,
    blocks_per_sector: u64,
    sector: u64,
    block: u64,
    tweak: [u8; BLOCK_SIZE],
}

impl TweakSequence {
    /// Create a sequence keyed with `tweak_key` (16 or 32 bytes) and
    /// position it at (`start_sector`, `start_block`).
    ///
    /// Fails like [`reset`](Self::reset) on bad geometry, or with
    /// [`Error::InvalidArgument`] on a bad key length.
    pub fn new(
        tweak_key: &[u8],
        sector_size: u64,
        start_sector: u64,
        start_block: u64,
    ) -> Result<Self> {
        let mut seq = Self {
            cipher: AesEcb::new(tweak_key)?,
            sector_size: 0,
            blocks_per_sector: 0,
            sector: 0,
            block: 0,
            tweak: [0u8; BLOCK_SIZE],
        };
        seq.reset(sector_size, start_sector, start_block)?;
        Ok(seq)
    }

    /// Re-seat the sequence at (`start_sector`, `start_block`) with a new
    /// sector geometry.
    ///
    /// `sector_size` is in bytes, at least one block, and need not be a
    /// multiple of the block size; a trailing partial block still counts
    /// toward `blocks_per_sector`. Fails with [`Error::InvalidArgument`]
    /// when the sector is too small and [`Error::OutOfRange`] when
    /// `start_block` is not inside the sector, leaving the sequence
    /// untouched.
    pub fn reset(&mut self, sector_size: u64, start_sector: u64, start_block: u64) -> Result<()> {
        if sector_size < BLOCK_SIZE as u64 {
            return Err(Error::InvalidArgument("sector size below one block"));
        }
        let blocks_per_sector = sector_size.div_ceil(BLOCK_SIZE as u64);
        if start_block >= blocks_per_sector {
            return Err(Error::OutOfRange("start block outside the sector"));
        }
        self.sector_size = sector_size;
        self.blocks_per_sector = blocks_per_sector;
        self.sector = start_sector;
        self.block = start_block;
        self.tweak = tweak_value(&self.cipher, start_sector, start_block);
        Ok(())
    }

    /// Return to block 0 of `sector`, keeping the configured geometry.
    pub fn rewind(&mut self, sector: u64) {
        self.sector = sector;
        self.block = 0;
        self.tweak = tweak_value(&self.cipher, sector, 0);
    }

    /// Read-only view of the current 16-byte tweak.
    pub fn current(&self) -> &[u8; BLOCK_SIZE] {
        &self.tweak
    }

    /// Sector the current tweak belongs to.
    pub fn sector(&self) -> u64 {
        self.sector
    }

    /// Block index of the current tweak within its sector.
    pub fn block(&self) -> u64 {
        self.block
    }

    /// Number of (possibly partial) blocks per sector.
    pub fn blocks_per_sector(&self) -> u64 {
        self.blocks_per_sector
    }

    /// Configured sector size in bytes.
    pub fn sector_size(&self) -> u64 {
        self.sector_size
    }

    /// Step to the next block.
    ///
    /// Within a sector this is one multiply by α. Advancing out of the last
    /// block re-seeds at (sector + 1, 0) instead, since the next sector's
    /// tweak chain starts from its own encrypted sector index.
    pub fn advance(&mut self) {
        self.block += 1;
        if self.block == self.blocks_per_sector {
            self.block = 0;
            self.sector = self.sector.wrapping_add(1);
            self.tweak = tweak_value(&self.cipher, self.sector, 0);
        } else {
            gf128::double(&mut self.tweak);
        }
    }

    /// Copy the current tweak into `out`, then advance.
    pub fn take_and_advance(&mut self, out: &mut [u8; BLOCK_SIZE]) {
        out.copy_from_slice(&self.tweak);
        self.advance();
    }

    /// Destroy the tweak and the underlying AES schedule ahead of drop.
    pub(crate) fn wipe(&mut self) {
        self.tweak.zeroize();
        self.cipher.wipe();
    }
}

impl Drop for TweakSequence {
    fn drop(&mut self) {
        self.tweak.zeroize();
    }
}
