//! A lock-wrapped trie for sharing between threads.
//!
//! [`BinTrie`] itself does no synchronization. `SharedTrie` serializes
//! mutations behind a write lock while letting counts and lookups share a
//! read lock.

use parking_lot::{RwLock, RwLockReadGuard};

use crate::config::TrieConfig;
use crate::error::Result;
use crate::BinTrie;

/// A [`BinTrie`] behind a reader-writer lock.
pub struct SharedTrie {
    inner: RwLock<BinTrie>,
}

impl SharedTrie {
    /// Create an empty shared trie over `height`-bit keys.
    pub fn new(height: u32) -> Result<Self> {
        Ok(Self::from(BinTrie::new(height)?))
    }

    /// Create an empty shared trie with the given configuration.
    pub fn with_config(config: TrieConfig) -> Result<Self> {
        Ok(Self::from(BinTrie::with_config(config)?))
    }

    /// See [`BinTrie::reserve`].
    pub fn reserve(&self, key: u64) -> Result<()> {
        self.inner.write().reserve(key)
    }

    /// See [`BinTrie::release`].
    pub fn release(&self, key: u64) -> Result<()> {
        self.inner.write().release(key)
    }

    /// See [`BinTrie::count_free`].
    pub fn count_free(&self) -> u128 {
        self.inner.read().count_free()
    }

    /// See [`BinTrie::is_taken`].
    pub fn is_taken(&self, key: u64) -> Result<bool> {
        self.inner.read().is_taken(key)
    }

    /// Shared access for several reads under one lock.
    pub fn read(&self) -> RwLockReadGuard<'_, BinTrie> {
        self.inner.read()
    }

    /// Unwrap the trie.
    pub fn into_inner(self) -> BinTrie {
        self.inner.into_inner()
    }
}

impl From<BinTrie> for SharedTrie {
    fn from(trie: BinTrie) -> Self {
        Self {
            inner: RwLock::new(trie),
        }
    }
}
