//! Node representation and the arena that owns every node.
//!
//! A node either stands for a single key (at depth `H`) or for a whole
//! subtree of `2^(H - depth)` keys. A childless node's status is the roll-up
//! status of its entire subtree; an absent child reads as its parent's status.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};

/// Reservation state of a key, or of every key in a collapsed subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Available for `reserve`.
    Free,
    /// Reserved; available for `release`.
    Taken,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Free => f.write_str("free"),
            Status::Taken => f.write_str("taken"),
        }
    }
}

/// Branch taken at one level of a key path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Key bit 0.
    Left,
    /// Key bit 1.
    Right,
}

impl Side {
    pub(crate) const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Side selected by bit `bit` of `key` (bit 0 is the LSB).
    #[inline]
    pub(crate) fn of_key(key: u64, bit: u32) -> Self {
        if (key >> bit) & 1 == 0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("0"),
            Side::Right => f.write_str("1"),
        }
    }
}

/// Index of a node slot in the arena, or `NULL` for an absent child.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const NULL: NodeId = NodeId(u32::MAX);
    const MAX_SLOTS: usize = u32::MAX as usize;

    #[inline]
    fn new(index: usize) -> Self {
        debug_assert!(index < Self::MAX_SLOTS);
        Self(index as u32)
    }

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }

    #[inline]
    fn index(self) -> usize {
        debug_assert!(!self.is_null());
        self.0 as usize
    }
}

/// A trie node. Children are created and discarded by the owning trie.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Node {
    pub(crate) status: Status,
    children: [NodeId; 2],
}

impl Node {
    #[inline]
    fn new(status: Status) -> Self {
        Self {
            status,
            children: [NodeId::NULL; 2],
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> NodeId {
        self.children[side.index()]
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, id: NodeId) {
        self.children[side.index()] = id;
    }

    /// Both children absent: the status covers the whole subtree.
    #[inline]
    pub(crate) fn is_childless(&self) -> bool {
        self.children.iter().all(|c| c.is_null())
    }

    #[inline]
    fn take_children(&mut self) -> [NodeId; 2] {
        std::mem::replace(&mut self.children, [NodeId::NULL; 2])
    }
}

/// Slot arena for trie nodes with a free list of recycled slots.
pub(crate) struct NodeArena {
    nodes: Vec<Node>,
    /// Recycled slots. Capacity always covers every slot, so freeing never allocates.
    free: Vec<NodeId>,
    max_nodes: Option<usize>,
}

impl NodeArena {
    pub(crate) fn with_capacity(capacity: usize, max_nodes: Option<usize>) -> Result<Self> {
        let mut nodes = Vec::new();
        let mut free = Vec::new();
        nodes.try_reserve(capacity).map_err(|_| {
            log::warn!("failed to reserve {capacity} node slots");
            Error::AllocationFailure
        })?;
        free.try_reserve(capacity).map_err(|_| {
            log::warn!("failed to reserve free list for {capacity} node slots");
            Error::AllocationFailure
        })?;
        Ok(Self {
            nodes,
            free,
            max_nodes,
        })
    }

    /// Number of live nodes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub(crate) fn capacity_bytes(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Node>()
            + self.free.capacity() * std::mem::size_of::<NodeId>()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
        self.free.shrink_to(self.nodes.len());
    }

    pub(crate) fn set_max_nodes(&mut self, max_nodes: Option<usize>) {
        self.max_nodes = max_nodes;
    }

    /// Create a childless node with the given status.
    pub(crate) fn alloc(&mut self, status: Status) -> Result<NodeId> {
        if let Some(limit) = self.max_nodes {
            if self.len() >= limit {
                log::warn!("node limit of {limit} reached");
                return Err(Error::AllocationFailure);
            }
        }

        let node = Node::new(status);
        if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = node;
            return Ok(id);
        }

        let index = self.nodes.len();
        if index >= NodeId::MAX_SLOTS {
            log::warn!("node arena exhausted its index space");
            return Err(Error::AllocationFailure);
        }
        self.nodes.try_reserve(1).map_err(|_| {
            log::warn!("failed to grow node arena past {index} slots");
            Error::AllocationFailure
        })?;
        self.free
            .try_reserve(index + 1 - self.free.len())
            .map_err(|_| {
                log::warn!("failed to grow node free list past {index} slots");
                Error::AllocationFailure
            })?;
        self.nodes.push(node);
        Ok(NodeId::new(index))
    }

    /// Free `id` and everything below it, children before parents.
    pub(crate) fn free_subtree(&mut self, id: NodeId) {
        if id.is_null() {
            return;
        }
        let [left, right] = self[id].take_children();
        self.free_subtree(left);
        self.free_subtree(right);
        self.free.push(id);
    }

    /// Discard both children of `id`, leaving it childless.
    pub(crate) fn free_children(&mut self, id: NodeId) {
        let [left, right] = self[id].take_children();
        self.free_subtree(left);
        self.free_subtree(right);
    }

    /// Status of a possibly-absent child: absence inherits the parent's status.
    #[inline]
    pub(crate) fn effective_status(&self, id: NodeId, inherited: Status) -> Status {
        if id.is_null() {
            inherited
        } else {
            self[id].status
        }
    }

    /// The single status covering the subtree at `id`, if it is childless.
    /// An absent node is a childless extension of its parent.
    #[inline]
    pub(crate) fn uniform_status(&self, id: NodeId, inherited: Status) -> Option<Status> {
        if id.is_null() {
            Some(inherited)
        } else if self[id].is_childless() {
            Some(self[id].status)
        } else {
            None
        }
    }
}

impl Clone for NodeArena {
    fn clone(&self) -> Self {
        // Keep the free list able to hold every slot.
        let mut free = Vec::with_capacity(self.nodes.len());
        free.extend_from_slice(&self.free);
        Self {
            nodes: self.nodes.clone(),
            free,
            max_nodes: self.max_nodes,
        }
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for NodeArena {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}
