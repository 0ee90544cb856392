// Error taxonomy for the window and match finder.
//
// Partial progress and end of stream are not errors; they are reported
// through return values (`usize` counts and `window::Drain`).

use std::io;

use thiserror::Error;

/// Errors raised by [`Window`](crate::window::Window) mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// Headroom exhausted; drain the window and retry.
    #[error("window full: requested {requested} bytes, {available} available")]
    Capacity {
        /// Bytes the caller asked to append.
        requested: usize,
        /// Bytes the window could accept right now.
        available: usize,
    },

    /// Back-reference outside the retained history or the dictionary.
    #[error(
        "invalid distance {distance}: {history} bytes of history, dictionary capacity {dict_capacity}"
    )]
    InvalidDistance {
        /// Requested distance.
        distance: usize,
        /// Total bytes written so far.
        history: u64,
        /// Configured dictionary capacity.
        dict_capacity: usize,
    },

    /// Append attempted after end of stream was signalled.
    #[error("window closed: end of stream already set")]
    Closed,
}

/// Invalid construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("dictionary capacity must be non-zero")]
    ZeroDictionary,
    #[error("headroom of the input window must be non-zero")]
    ZeroHeadroom,
    #[error("at least one hash table tier is required")]
    NoTiers,
    #[error("digest length {0} outside supported range 2..=8")]
    DigestLength(usize),
    #[error("search depth must be non-zero")]
    ZeroDepth,
    #[error("chain capacity must be non-zero")]
    ZeroChainCapacity,
    #[error("maximum match length {max} below minimum match length {min}")]
    MatchLength { min: usize, max: usize },
}

/// Crate-level error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<WindowError> for io::Error {
    fn from(e: WindowError) -> Self {
        let kind = match e {
            WindowError::Capacity { .. } => io::ErrorKind::WouldBlock,
            WindowError::InvalidDistance { .. } => io::ErrorKind::InvalidData,
            WindowError::Closed => io::ErrorKind::BrokenPipe,
        };
        io::Error::new(kind, e)
    }
}
