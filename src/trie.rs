//! The allocator trie: reserve and release descents, lazy compaction, and
//! free-key counting.
//!
//! Both descents recurse from the root toward the leaf named by the key,
//! reading key bits most-significant first. On the way back up every level
//! gets a chance to collapse, so after each call a subtree is a single node
//! exactly when all of its keys share one status.

use std::fmt;

use crate::config::{TrieConfig, MAX_HEIGHT};
use crate::error::{Error, Result};
use crate::node::{NodeArena, NodeId, Side, Status};

/// A space-efficient allocator over the key space `[0, 2^height)`.
///
/// Memory use is proportional to the number of boundaries between free and
/// taken runs of keys, not to the size of the key space.
///
/// Dropping the trie releases every node.
#[derive(Clone)]
pub struct BinTrie {
    pub(crate) nodes: NodeArena,
    pub(crate) root: NodeId,
    height: u32,
}

// =============================================================================
// Construction & accessors
// =============================================================================

impl BinTrie {
    /// Create an empty trie over `height`-bit keys.
    pub fn new(height: u32) -> Result<Self> {
        Self::with_config(TrieConfig::new(height))
    }

    /// Create an empty trie with the given configuration.
    pub fn with_config(config: TrieConfig) -> Result<Self> {
        config.validate()?;
        let mut nodes = NodeArena::with_capacity(config.initial_capacity, config.max_nodes)?;
        let root = nodes.alloc(Status::Free)?;
        log::debug!(
            "created trie of height {} (capacity {} nodes, limit {:?})",
            config.height,
            config.initial_capacity,
            config.max_nodes
        );
        Ok(Self {
            nodes,
            root,
            height: config.height,
        })
    }

    /// Number of key bits.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of the key space, `2^height`.
    #[inline]
    pub fn capacity(&self) -> u128 {
        1u128 << self.height
    }

    /// Number of live nodes, root included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Bytes held by node storage.
    pub fn memory_usage(&self) -> usize {
        self.nodes.capacity_bytes()
    }

    /// Release unused node storage.
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    /// Change the live-node limit. Existing nodes are kept even if over it.
    pub fn set_max_nodes(&mut self, max_nodes: Option<usize>) {
        self.nodes.set_max_nodes(max_nodes);
    }

    /// Release every key, leaving only a FREE root.
    pub fn clear(&mut self) {
        self.nodes.free_children(self.root);
        self.nodes[self.root].status = Status::Free;
        log::debug!("cleared trie of height {}", self.height);
    }

    fn check_key(&self, key: u64) -> Result<()> {
        if self.height < MAX_HEIGHT && key >> self.height != 0 {
            return Err(Error::KeyOutOfRange {
                key,
                height: self.height,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Reserve
// =============================================================================

impl BinTrie {
    /// Mark `key` as taken.
    ///
    /// Fails with [`Error::AlreadyTaken`] if it already is, and with
    /// [`Error::AllocationFailure`] if a node on its path cannot be created.
    pub fn reserve(&mut self, key: u64) -> Result<()> {
        self.check_key(key)?;
        self.reserve_at(self.root, self.height, key)
    }

    fn reserve_at(&mut self, id: NodeId, remaining: u32, key: u64) -> Result<()> {
        // A taken node is either the leaf itself or a collapsed, fully taken
        // subtree; neither needs expanding to answer.
        if self.nodes[id].status == Status::Taken {
            return Err(Error::AlreadyTaken { key });
        }

        if remaining == 0 {
            self.nodes[id].status = Status::Taken;
            return Ok(());
        }

        let side = Side::of_key(key, remaining - 1);
        let mut child = self.nodes[id].child(side);
        if child.is_null() {
            // Absent under a free parent means implicitly free.
            child = self.nodes.alloc(Status::Free)?;
            self.nodes[id].set_child(side, child);
            log::trace!("materialized free {side} child at depth {}", self.height - remaining + 1);
        }

        if let Err(err) = self.reserve_at(child, remaining - 1, key) {
            // Reclaim a free chain left by a failed allocation further down.
            self.try_collapse(id, Status::Free);
            return Err(err);
        }

        self.try_collapse(id, Status::Taken);
        Ok(())
    }
}

// =============================================================================
// Release
// =============================================================================

impl BinTrie {
    /// Mark `key` as free again.
    ///
    /// Fails with [`Error::NotFound`] if it is not reserved, and with
    /// [`Error::AllocationFailure`] if a collapsed taken subtree on its path
    /// cannot be split.
    pub fn release(&mut self, key: u64) -> Result<()> {
        self.check_key(key)?;
        self.release_at(self.root, self.height, key)
    }

    fn release_at(&mut self, id: NodeId, remaining: u32, key: u64) -> Result<()> {
        if remaining == 0 {
            if self.nodes[id].status == Status::Free {
                return Err(Error::NotFound { key });
            }
            self.nodes[id].status = Status::Free;
            return Ok(());
        }

        if self.nodes[id].status == Status::Taken {
            self.split(id)?;
            log::trace!("split taken node at depth {}", self.height - remaining);
        }

        let side = Side::of_key(key, remaining - 1);
        let child = self.nodes[id].child(side);
        if child.is_null() {
            // Never materialized, so never reserved.
            return Err(Error::NotFound { key });
        }

        if let Err(err) = self.release_at(child, remaining - 1, key) {
            // Undo a split made above a failed allocation.
            self.try_collapse(id, Status::Taken);
            return Err(err);
        }

        self.try_collapse(id, Status::Free);
        Ok(())
    }

    /// Expand a collapsed taken node into two taken children. Either both
    /// children are attached or the node is left untouched.
    fn split(&mut self, id: NodeId) -> Result<()> {
        debug_assert!(self.nodes[id].is_childless());

        let left = self.nodes.alloc(Status::Taken)?;
        let right = match self.nodes.alloc(Status::Taken) {
            Ok(right) => right,
            Err(err) => {
                self.nodes.free_subtree(left);
                return Err(err);
            }
        };

        let node = &mut self.nodes[id];
        node.set_child(Side::Left, left);
        node.set_child(Side::Right, right);
        node.status = Status::Free;
        Ok(())
    }
}

// =============================================================================
// Lazy compaction
// =============================================================================

impl BinTrie {
    /// Collapse `id` into a single `target` node if both of its children are
    /// childless and read as `target`. An absent child reads as `id`'s own
    /// status, so a node whose sibling was never materialized still collapses
    /// once the present child is uniform with it. Returns whether the node
    /// collapsed.
    fn try_collapse(&mut self, id: NodeId, target: Status) -> bool {
        let node = self.nodes[id];
        if node.is_childless() {
            return false;
        }

        let uniform = Side::BOTH
            .iter()
            .all(|&side| self.nodes.uniform_status(node.child(side), node.status) == Some(target));
        if !uniform {
            return false;
        }

        self.nodes.free_children(id);
        self.nodes[id].status = target;
        log::trace!("collapsed node to {target}");
        true
    }
}

// =============================================================================
// Queries
// =============================================================================

impl BinTrie {
    /// Number of free keys. Never allocates.
    pub fn count_free(&self) -> u128 {
        self.count_free_at(self.root, self.height, Status::Free)
    }

    /// Number of reserved keys.
    pub fn count_taken(&self) -> u128 {
        self.capacity() - self.count_free()
    }

    fn count_free_at(&self, id: NodeId, remaining: u32, inherited: Status) -> u128 {
        if id.is_null() {
            return match inherited {
                Status::Free => 1u128 << remaining,
                Status::Taken => 0,
            };
        }

        let node = &self.nodes[id];
        if remaining == 0 {
            return u128::from(node.status == Status::Free);
        }

        Side::BOTH
            .iter()
            .map(|&side| self.count_free_at(node.child(side), remaining - 1, node.status))
            .sum()
    }

    /// Whether `key` is currently reserved.
    pub fn is_taken(&self, key: u64) -> Result<bool> {
        self.check_key(key)?;

        let mut id = self.root;
        let mut status = Status::Free;
        let mut remaining = self.height;
        loop {
            status = self.nodes.effective_status(id, status);
            if id.is_null() || self.nodes[id].is_childless() {
                return Ok(status == Status::Taken);
            }
            id = self.nodes[id].child(Side::of_key(key, remaining - 1));
            remaining -= 1;
        }
    }
}

impl fmt::Debug for BinTrie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinTrie")
            .field("height", &self.height)
            .field("free", &self.count_free())
            .field("nodes", &self.node_count())
            .finish()
    }
}
