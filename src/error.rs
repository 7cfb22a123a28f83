//! Error type shared by every trie operation.

/// Errors returned by [`BinTrie`](crate::BinTrie) operations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Node storage could not grow, or the configured node limit was reached.
    ///
    /// The key keeps its previous state. Nodes materialized for the failed
    /// operation are reclaimed on the way back up, so the tree stays valid and
    /// the call can simply be retried once memory is available.
    #[error("node allocation failed")]
    AllocationFailure,

    /// The key is already reserved.
    #[error("key {key} is already taken")]
    AlreadyTaken {
        /// The key passed to `reserve`.
        key: u64,
    },

    /// The key is not currently reserved.
    #[error("key {key} is not reserved")]
    NotFound {
        /// The key passed to `release`.
        key: u64,
    },

    /// The key does not fit in `height` bits.
    #[error("key {key} is outside the {height}-bit key space")]
    KeyOutOfRange {
        /// The offending key.
        key: u64,
        /// Height of the trie it was checked against.
        height: u32,
    },

    /// Heights must be in `1..=64`.
    #[error("invalid trie height {height} (expected 1..=64)")]
    InvalidHeight {
        /// The requested height.
        height: u32,
    },
}

/// Result alias for trie operations.
pub type Result<T> = std::result::Result<T, Error>;
