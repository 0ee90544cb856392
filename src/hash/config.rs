// Match finder configuration.
//
// Fixed at construction.  Presets differ only in how hard the finder
// searches; dictionary and buffer sizes are left to the caller.

use super::digest::{MAX_DIGEST_LEN, MIN_DIGEST_LEN};
use crate::error::ConfigError;

/// Default dictionary capacity (4 MiB).
pub const DEFAULT_DICT_CAPACITY: usize = 1 << 22;

/// Default input headroom (64 KiB).
pub const DEFAULT_HEADROOM: usize = 1 << 16;

/// Longest match reported by default (LZMA's maximum match length).
pub const DEFAULT_MAX_MATCH_LEN: usize = 273;

/// Chain records allocated up front; the ring doubles from here.
pub const INITIAL_CHAIN_RECORDS: usize = 1 << 12;

/// Match finder parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderConfig {
    /// Name for display purposes.
    pub name: &'static str,
    /// Maximum match distance (D).
    pub dict_capacity: usize,
    /// Bytes the producer may run ahead of the finder (H).
    pub headroom: usize,
    /// Digest lengths of the single-position hash table tiers.
    pub tiers: Vec<usize>,
    /// Digest length keying the hash chain.
    pub chain_len: usize,
    /// Chain candidates examined per step.
    pub depth: usize,
    /// Ring size bound of the hash chain; `None` follows `dict_capacity`.
    pub chain_capacity: Option<usize>,
    /// Matches stop extending at this length.
    pub max_match_len: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            name: "default",
            dict_capacity: DEFAULT_DICT_CAPACITY,
            headroom: DEFAULT_HEADROOM,
            tiers: vec![2, 3],
            chain_len: 4,
            depth: 32,
            chain_capacity: None,
            max_match_len: DEFAULT_MAX_MATCH_LEN,
        }
    }
}

impl FinderConfig {
    /// Single three-byte tier and a shallow chain.
    pub fn fast() -> Self {
        Self {
            name: "fast",
            tiers: vec![3],
            depth: 4,
            max_match_len: 64,
            ..Self::default()
        }
    }

    /// Deep chain search.
    pub fn thorough() -> Self {
        Self {
            name: "thorough",
            depth: 256,
            ..Self::default()
        }
    }

    pub fn with_dict_capacity(mut self, dict_capacity: usize) -> Self {
        self.dict_capacity = dict_capacity;
        self
    }

    pub fn with_headroom(mut self, headroom: usize) -> Self {
        self.headroom = headroom;
        self
    }

    pub fn with_tiers(mut self, tiers: &[usize]) -> Self {
        self.tiers = tiers.to_vec();
        self
    }

    pub fn with_chain_len(mut self, chain_len: usize) -> Self {
        self.chain_len = chain_len;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_chain_capacity(mut self, chain_capacity: usize) -> Self {
        self.chain_capacity = Some(chain_capacity);
        self
    }

    pub fn with_max_match_len(mut self, max_match_len: usize) -> Self {
        self.max_match_len = max_match_len;
        self
    }

    /// Shortest match the finder reports.
    pub fn min_match_len(&self) -> usize {
        self.tiers
            .iter()
            .copied()
            .chain(std::iter::once(self.chain_len))
            .min()
            .unwrap_or(self.chain_len)
    }

    /// Ring size bound of the hash chain.
    pub fn ring_capacity(&self) -> usize {
        self.chain_capacity.unwrap_or(self.dict_capacity)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dict_capacity == 0 {
            return Err(ConfigError::ZeroDictionary);
        }
        if self.headroom == 0 {
            return Err(ConfigError::ZeroHeadroom);
        }
        if self.tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        let digest_lens = MIN_DIGEST_LEN..=MAX_DIGEST_LEN;
        for &len in self.tiers.iter().chain(std::iter::once(&self.chain_len)) {
            if !digest_lens.contains(&len) {
                return Err(ConfigError::DigestLength(len));
            }
        }
        if self.depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.chain_capacity == Some(0) {
            return Err(ConfigError::ZeroChainCapacity);
        }
        let min = self.min_match_len();
        if self.max_match_len < min {
            return Err(ConfigError::MatchLength {
                min,
                max: self.max_match_len,
            });
        }
        Ok(())
    }
}
