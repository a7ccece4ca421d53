//! B+Tree nodes
//!
//! Nodes live in an arena owned by the tree and refer to each other by
//! `NodeId`. Each child has exactly one parent; the leaf `next` link is a
//! plain id and owns nothing.

/// Index of a node in the tree's arena
pub(crate) type NodeId = usize;

/// Order 4: at most 3 keys and 4 children per node
pub const ORDER: usize = 4;

/// A node holding more than this many keys is split
pub const MAX_KEYS: usize = ORDER - 1;

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Leaf(LeafNode),
    Internal(InternalNode),
}

impl Node {
    pub(crate) fn keys(&self) -> &[String] {
        match self {
            Node::Leaf(leaf) => &leaf.keys,
            Node::Internal(node) => &node.keys,
        }
    }
}

/// Sorted keys with one offset per key; equal keys sit side by side
#[derive(Debug, Clone, Default)]
pub(crate) struct LeafNode {
    pub(crate) keys: Vec<String>,
    pub(crate) offsets: Vec<u64>,
    pub(crate) next: Option<NodeId>,
}

impl LeafNode {
    /// Insert after any equal keys so duplicates keep insertion order
    pub(crate) fn insert(&mut self, key: &str, offset: u64) {
        let pos = self.keys.partition_point(|k| k.as_str() <= key);
        self.keys.insert(pos, key.to_string());
        self.offsets.insert(pos, offset);
    }

    pub(crate) fn is_overfull(&self) -> bool {
        self.keys.len() > MAX_KEYS
    }

    /// Move the upper half (from `len / 2`) into a new leaf.
    ///
    /// The new leaf inherits this leaf's `next`; the caller links this leaf
    /// to the new one once it has an id.
    pub(crate) fn split_off_upper(&mut self) -> LeafNode {
        let mid = self.keys.len() / 2;
        LeafNode {
            keys: self.keys.split_off(mid),
            offsets: self.offsets.split_off(mid),
            next: self.next,
        }
    }

    /// Position of the entry `(key, offset)`
    pub(crate) fn position_of(&self, key: &str, offset: u64) -> Option<usize> {
        self.keys
            .iter()
            .zip(&self.offsets)
            .position(|(k, &o)| k == key && o == offset)
    }

    pub(crate) fn remove_at(&mut self, pos: usize) {
        self.keys.remove(pos);
        self.offsets.remove(pos);
    }
}

/// Separator keys with `keys.len() + 1` children
#[derive(Debug, Clone, Default)]
pub(crate) struct InternalNode {
    pub(crate) keys: Vec<String>,
    pub(crate) children: Vec<NodeId>,
}

impl InternalNode {
    /// Child to descend into when inserting: skip every separator `<= key`
    pub(crate) fn insert_child_index(&self, key: &str) -> usize {
        self.keys.partition_point(|k| k.as_str() <= key)
    }

    /// Child to descend into when looking up: skip every separator `< key`.
    ///
    /// Lands on the leftmost subtree that can hold `key`, which matters once
    /// equal keys have been split across siblings.
    pub(crate) fn lookup_child_index(&self, key: &str) -> usize {
        self.keys.partition_point(|k| k.as_str() < key)
    }

    /// Place a separator and the right-hand child produced by splitting
    /// `children[child_index]`
    pub(crate) fn insert_split(&mut self, child_index: usize, separator: String, right: NodeId) {
        self.keys.insert(child_index, separator);
        self.children.insert(child_index + 1, right);
    }

    pub(crate) fn is_overfull(&self) -> bool {
        self.keys.len() > MAX_KEYS
    }

    /// Split around the middle key, which moves up and stays in neither half
    pub(crate) fn split_off_upper(&mut self) -> (String, InternalNode) {
        let mid = self.keys.len() / 2;
        let mut upper_keys = self.keys.split_off(mid);
        let promoted = upper_keys.remove(0);
        let upper_children = self.children.split_off(mid + 1);
        (
            promoted,
            InternalNode {
                keys: upper_keys,
                children: upper_children,
            },
        )
    }
}
