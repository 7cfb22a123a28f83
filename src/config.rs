//! Construction-time configuration.

use crate::error::{Error, Result};

/// Largest supported height; keys are `u64`.
pub const MAX_HEIGHT: u32 = 64;

/// Configuration for a [`BinTrie`](crate::BinTrie).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieConfig {
    /// Number of key bits. The key space is `[0, 2^height)`.
    pub height: u32,
    /// Node slots reserved up front.
    pub initial_capacity: usize,
    /// Upper bound on live nodes. `None` means limited only by memory.
    pub max_nodes: Option<usize>,
}

impl Default for TrieConfig {
    fn default() -> Self {
        Self {
            height: 32,
            initial_capacity: 64,
            max_nodes: None,
        }
    }
}

impl TrieConfig {
    /// Default configuration for the given height.
    pub fn new(height: u32) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    /// Set the number of node slots reserved at construction.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Cap the number of live nodes.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.height == 0 || self.height > MAX_HEIGHT {
            return Err(Error::InvalidHeight {
                height: self.height,
            });
        }
        Ok(())
    }
}
