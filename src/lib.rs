//! Oxilz: the windowing and match-finding core of an LZMA-style codec.
//!
//! The crate provides:
//! - A sliding dictionary [`Window`] with absolute stream addressing,
//!   overlapping back-reference copies and back-pressure aware reads/writes
//! - Hash indexes ([`HashTable`], [`HashChain`]) keyed by short digests
//! - A [`MatchFinder`] producing ranked `(distance, length)` candidates
//! - A reference greedy parser and replayer (`engine`)
//! - A lock-guarded [`SharedWindow`] for producer/consumer threads
//!
//! Entropy coding and container framing are left to the caller.
//!
//! # Quick Start
//!
//! ```
//! use oxilz::engine;
//! use oxilz::FinderConfig;
//!
//! let data = b"abracadabra abracadabra";
//! let config = FinderConfig::default().with_dict_capacity(1 << 16);
//! let tokens = engine::parse(data, &config).unwrap();
//! let decoded = engine::expand(&tokens, config.dict_capacity).unwrap();
//! assert_eq!(decoded, data);
//! ```

pub mod engine;
pub mod error;
pub mod hash;
pub mod sync;
pub mod window;

pub use error::{ConfigError, Error, Result, WindowError};
pub use hash::chain::HashChain;
pub use hash::config::FinderConfig;
pub use hash::matching::{Match, MatchFinder};
pub use hash::table::HashTable;
pub use sync::SharedWindow;
pub use window::{Anchor, Drain, Window};
