//! Debug utilities: tree dumps and invariant checks.

use std::fmt;

use crate::node::{NodeId, Side, Status};
use crate::BinTrie;

/// One node of a pre-order [`BinTrie::debug_dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpEntry {
    /// Distance from the root.
    pub depth: u32,
    /// Which child of its parent this node is; `None` for the root.
    pub side: Option<Side>,
    /// Stored status. Only meaningful for subtree content when `childless`.
    pub status: Status,
    /// The node has no children, so `status` covers its whole subtree.
    pub childless: bool,
}

impl BinTrie {
    /// Every node in pre-order, left before right.
    pub fn debug_dump(&self) -> Vec<DumpEntry> {
        let mut out = Vec::with_capacity(self.node_count());
        let mut stack: Vec<(NodeId, u32, Option<Side>)> = vec![(self.root, 0, None)];

        while let Some((id, depth, side)) = stack.pop() {
            let node = &self.nodes[id];
            out.push(DumpEntry {
                depth,
                side,
                status: node.status,
                childless: node.is_childless(),
            });
            for side in Side::BOTH.into_iter().rev() {
                let child = node.child(side);
                if !child.is_null() {
                    stack.push((child, depth + 1, Some(side)));
                }
            }
        }
        out
    }

    /// A printable view of the tree, one node per line.
    pub fn dump(&self) -> TreeDump<'_> {
        TreeDump { trie: self }
    }

    /// Print the tree structure for debugging.
    pub fn debug_print(&self) {
        println!("=== BinTrie Debug ===");
        println!("Height: {}, free: {}", self.height(), self.count_free());
        print!("{}", self.dump());
        println!("=====================");
    }

    /// Verify tree integrity - returns list of issues found.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let reachable = self.verify_node(self.root, 0, 0, &mut issues);
        if reachable != self.node_count() {
            issues.push(format!(
                "{} live nodes but {} reachable from the root",
                self.node_count(),
                reachable
            ));
        }
        issues
    }

    fn verify_node(&self, id: NodeId, depth: u32, path: u64, issues: &mut Vec<String>) -> usize {
        let node = &self.nodes[id];
        if node.is_childless() {
            return 1;
        }

        if depth == self.height() {
            issues.push(format!("leaf {path:#b} has children"));
        }
        if node.status == Status::Taken {
            issues.push(format!(
                "taken node at depth {depth} (path {path:#b}) has children"
            ));
        }

        let left = self.nodes.uniform_status(node.child(Side::Left), node.status);
        let right = self.nodes.uniform_status(node.child(Side::Right), node.status);
        if let (Some(a), Some(b)) = (left, right) {
            if a == b {
                issues.push(format!(
                    "node at depth {depth} (path {path:#b}) should have collapsed to {a}"
                ));
            }
        }

        let mut count = 1;
        for side in Side::BOTH {
            let child = node.child(side);
            if !child.is_null() {
                let bit = u64::from(side == Side::Right);
                count += self.verify_node(child, depth + 1, (path << 1) | bit, issues);
            }
        }
        count
    }
}

/// Display adapter returned by [`BinTrie::dump`].
pub struct TreeDump<'a> {
    trie: &'a BinTrie,
}

impl fmt::Display for TreeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.trie.debug_dump() {
            let indent = "  ".repeat(entry.depth as usize);
            match entry.side {
                Some(side) => write!(f, "{indent}[{side}|{}]", entry.status)?,
                None => write!(f, "{indent}[root|{}]", entry.status)?,
            }
            if entry.childless {
                f.write_str(" collapsed")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
