//! B+Tree Index
//!
//! Ordered index over composite `column##value` keys, so every column of a
//! table shares one physical tree.
//!
//! ## Structure
//! ```text
//!                    ┌───────────────┐
//!                    │  [id##2]      │   internal: separators + children
//!                    └──┬─────────┬──┘
//!                       │         │
//!          ┌────────────▼──┐   ┌──▼──────────────────┐
//!          │ id##1 │ ...   │──►│ id##2 │ id##3 │ ... │──► None
//!          └───────────────┘   └─────────────────────┘
//!                 leaves: keys + offsets, linked left to right
//! ```
//!
//! Keys compare as plain strings. Numeric columns are therefore ordered
//! lexicographically (`"10" < "9"`), and range scans follow that order.
//!
//! Removal takes entries out of their leaf without merging or rebalancing;
//! leaves may underflow or become empty, which lookups and scans tolerate.

mod node;
mod persist;

use node::{InternalNode, LeafNode, Node, NodeId};

pub use node::{MAX_KEYS, ORDER};

/// Separator and new right sibling reported by a split child
struct Split {
    separator: String,
    right: NodeId,
}

/// Arena-backed B+Tree of order 4 mapping string keys to heap offsets
#[derive(Debug, Clone)]
pub struct BPlusTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for BPlusTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BPlusTree {
    /// Create a tree whose root is an empty leaf
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Leaf(LeafNode::default())],
            root: 0,
        }
    }

    /// Insert `(key, offset)`; equal keys are kept as separate entries
    pub fn insert(&mut self, key: &str, offset: u64) {
        if let Some(split) = self.insert_recursive(self.root, key, offset) {
            let old_root = self.root;
            self.root = self.alloc(Node::Internal(InternalNode {
                keys: vec![split.separator],
                children: vec![old_root, split.right],
            }));
            tracing::trace!("B+Tree grew a new root, depth now {}", self.depth());
        }
    }

    fn insert_recursive(&mut self, id: NodeId, key: &str, offset: u64) -> Option<Split> {
        let (child_index, child) = match &mut self.nodes[id] {
            Node::Leaf(leaf) => {
                leaf.insert(key, offset);
                if !leaf.is_overfull() {
                    return None;
                }
                let upper = leaf.split_off_upper();
                let separator = upper.keys[0].clone();
                let right = self.alloc(Node::Leaf(upper));
                if let Node::Leaf(leaf) = &mut self.nodes[id] {
                    leaf.next = Some(right);
                }
                return Some(Split { separator, right });
            }
            Node::Internal(node) => {
                let index = node.insert_child_index(key);
                (index, node.children[index])
            }
        };

        let split = self.insert_recursive(child, key, offset)?;

        let Node::Internal(node) = &mut self.nodes[id] else {
            return None;
        };
        node.insert_split(child_index, split.separator, split.right);
        if !node.is_overfull() {
            return None;
        }

        let (separator, upper) = node.split_off_upper();
        let right = self.alloc(Node::Internal(upper));
        Some(Split { separator, right })
    }

    /// All offsets stored under exactly `key`, in key-then-insertion order
    pub fn search(&self, key: &str) -> Vec<u64> {
        self.range_search(key, key)
    }

    /// Offsets of every key in `[low, high]`, in ascending key order
    pub fn range_search(&self, low: &str, high: &str) -> Vec<u64> {
        let mut offsets = Vec::new();
        if low > high {
            return offsets;
        }

        let mut current = Some(self.find_leaf(low));
        while let Some(id) = current {
            let Node::Leaf(leaf) = &self.nodes[id] else {
                break;
            };
            for (key, &offset) in leaf.keys.iter().zip(&leaf.offsets) {
                if key.as_str() < low {
                    continue;
                }
                if key.as_str() > high {
                    return offsets;
                }
                offsets.push(offset);
            }
            current = leaf.next;
        }

        offsets
    }

    /// Remove one `(key, offset)` entry; returns whether it was present
    pub fn remove(&mut self, key: &str, offset: u64) -> bool {
        let mut current = Some(self.find_leaf(key));
        while let Some(id) = current {
            let Node::Leaf(leaf) = &mut self.nodes[id] else {
                return false;
            };
            if let Some(pos) = leaf.position_of(key, offset) {
                leaf.remove_at(pos);
                return true;
            }
            if leaf.keys.last().is_some_and(|k| k.as_str() > key) {
                return false;
            }
            current = leaf.next;
        }
        false
    }

    /// Every `(key, offset)` entry, read along the leaf chain
    pub fn entries(&self) -> Vec<(String, u64)> {
        let mut entries = Vec::new();
        let mut current = Some(self.leftmost_leaf());
        while let Some(id) = current {
            let Node::Leaf(leaf) = &self.nodes[id] else {
                break;
            };
            entries.extend(leaf.keys.iter().cloned().zip(leaf.offsets.iter().copied()));
            current = leaf.next;
        }
        entries
    }

    /// Number of entries in the tree
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of levels from the root down to the leaves (1 for a lone leaf)
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id] {
            depth += 1;
            id = node.children[0];
        }
        depth
    }

    /// Number of leaves reachable along the leaf chain
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut current = Some(self.leftmost_leaf());
        while let Some(id) = current {
            let Node::Leaf(leaf) = &self.nodes[id] else {
                break;
            };
            count += 1;
            current = leaf.next;
        }
        count
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Leftmost leaf that can hold `key`
    fn find_leaf(&self, key: &str) -> NodeId {
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id] {
            id = node.children[node.lookup_child_index(key)];
        }
        id
    }

    fn leftmost_leaf(&self) -> NodeId {
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id] {
            id = node.children[0];
        }
        id
    }
}
