//! # trie-alloc
//!
//! A space-efficient allocator over a fixed `2^H` key space (for example all
//! host addresses of a subnet) that never materializes a bitmap.
//!
//! Keys are paths through a binary trie, read most-significant bit first.
//! A subtree whose keys are all free or all taken is stored as a single
//! node; it is split only when an operation needs finer state, and collapsed
//! again as soon as it becomes uniform. Memory therefore tracks the number of
//! boundaries between free and taken runs, not the size of the key space.
//!
//! ## Example
//!
//! ```rust
//! use trie_alloc::{BinTrie, Error};
//!
//! let mut trie = BinTrie::new(8).unwrap();
//! assert_eq!(trie.count_free(), 256);
//!
//! trie.reserve(10).unwrap();
//! assert_eq!(trie.reserve(10), Err(Error::AlreadyTaken { key: 10 }));
//! assert_eq!(trie.count_free(), 255);
//!
//! trie.release(10).unwrap();
//! assert_eq!(trie.release(10), Err(Error::NotFound { key: 10 }));
//! assert_eq!(trie.count_free(), 256);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod debug;
mod error;
mod node;
mod shared;
mod trie;

pub use config::{TrieConfig, MAX_HEIGHT};
pub use debug::{DumpEntry, TreeDump};
pub use error::{Error, Result};
pub use node::{Side, Status};
pub use shared::SharedTrie;
pub use trie::BinTrie;

#[cfg(test)]
mod proptests;
