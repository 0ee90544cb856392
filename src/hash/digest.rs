// Digest of the short byte window keying the hash tables and chain.
//
// Multiplicative hashing in the style of xdelta3's small checksum: the
// bytes are packed little-endian and multiplied by an LCG constant.  Up to
// four bytes the 32-bit product is a bijection of the input, so distinct
// sequences never share a digest.  Longer windows fold a 64-bit product to
// its high half and may collide; the match finder re-verifies every
// candidate against the window regardless.

use crate::window::Window;

/// LCG multiplier for 32-bit hashes (xd3_hash_multiplier32).
pub const HASH_MULT_32: u32 = 1_597_334_677;

/// LCG multiplier for 64-bit hashes (xd3_hash_multiplier64).
pub const HASH_MULT_64: u64 = 1_181_783_497_276_652_981;

/// Shortest supported digest window.
pub const MIN_DIGEST_LEN: usize = 2;

/// Longest supported digest window.
pub const MAX_DIGEST_LEN: usize = 8;

/// Digest of `bytes` (2..=8 bytes).
#[inline(always)]
pub fn digest(bytes: &[u8]) -> u32 {
    debug_assert!((MIN_DIGEST_LEN..=MAX_DIGEST_LEN).contains(&bytes.len()));
    let mut packed = [0u8; 8];
    let n = bytes.len().min(MAX_DIGEST_LEN);
    packed[..n].copy_from_slice(&bytes[..n]);
    let v = u64::from_le_bytes(packed);
    if n <= 4 {
        (v as u32).wrapping_mul(HASH_MULT_32)
    } else {
        (v.wrapping_mul(HASH_MULT_64) >> 32) as u32
    }
}

/// Widest digest space handed to the finder's indexes.
pub const MAX_SPACE_BITS: u32 = 28;

/// Bounded digest space of `1 << bits` buckets.
///
/// The finder folds every digest into this space before touching its
/// indexes, so each table holds at most `size` distinct keys however long
/// the stream runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestSpace {
    /// Number of buckets (power of 2).
    pub size: usize,
    /// `32 - log2(size)`.
    pub shift: u32,
    /// `size - 1`.
    pub mask: u32,
}

impl DigestSpace {
    /// Space sized for `slots` live positions, one bit under the next
    /// power of two (exact powers keep their full size).
    pub fn new(slots: usize) -> Self {
        let bits = space_bits(slots);
        let size = 1usize << bits;
        Self {
            size,
            shift: 32 - bits,
            mask: (size - 1) as u32,
        }
    }

    /// Fold a digest into `0..size`, mixing its high bits into the low ones.
    #[inline(always)]
    pub fn fold(&self, digest: u32) -> u32 {
        (digest >> self.shift) ^ (digest & self.mask)
    }
}

fn space_bits(slots: usize) -> u32 {
    for i in 3..=MAX_SPACE_BITS {
        if slots < (1 << i) {
            return i - 1;
        }
    }
    MAX_SPACE_BITS
}

/// Digest of the `len` bytes at absolute `pos` in `window`, or `None` when
/// they are not all present.
#[inline]
pub fn digest_at(window: &Window, pos: u64, len: usize) -> Option<u32> {
    let mut buf = [0u8; MAX_DIGEST_LEN];
    let buf = &mut buf[..len.min(MAX_DIGEST_LEN)];
    window.read_at(pos, buf).then(|| digest(buf))
}
