//! B+Tree persistence
//!
//! Pre-order serialization of the node tree:
//!
//! ```text
//! node     := is_leaf u8 | key_count u64 | key × key_count | body
//! key      := len u64 | bytes
//! body     := offset u64 × key_count                  (leaf)
//!           | child_count u64 | node × child_count    (internal)
//! ```
//!
//! Integers are little-endian. Leaf links are not stored; they are rebuilt
//! by walking the loaded leaves left to right.

use std::fs;
use std::path::Path;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{PicoError, Result};

use super::node::{InternalNode, LeafNode, Node, NodeId};
use super::BPlusTree;

const LEAF_FLAG: u8 = 1;
const INTERNAL_FLAG: u8 = 0;

impl BPlusTree {
    /// Serialize the whole tree
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        self.write_node(&mut buf, self.root);
        buf.to_vec()
    }

    fn write_node(&self, buf: &mut BytesMut, id: NodeId) {
        let node = &self.nodes[id];
        buf.put_u8(match node {
            Node::Leaf(_) => LEAF_FLAG,
            Node::Internal(_) => INTERNAL_FLAG,
        });

        let keys = node.keys();
        buf.put_u64_le(keys.len() as u64);
        for key in keys {
            buf.put_u64_le(key.len() as u64);
            buf.put_slice(key.as_bytes());
        }

        match node {
            Node::Leaf(leaf) => {
                for &offset in &leaf.offsets {
                    buf.put_u64_le(offset);
                }
            }
            Node::Internal(internal) => {
                buf.put_u64_le(internal.children.len() as u64);
                for &child in &internal.children {
                    self.write_node(buf, child);
                }
            }
        }
    }

    /// Rebuild a tree from its serialized form; empty input gives an empty tree
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::new());
        }

        let mut nodes = Vec::new();
        let root = read_node(&mut bytes, &mut nodes)?;
        if bytes.has_remaining() {
            tracing::warn!(
                "Ignoring {} trailing bytes after B+Tree root",
                bytes.remaining()
            );
        }

        let mut tree = Self { nodes, root };
        tree.rebuild_leaf_links();
        Ok(tree)
    }

    /// Re-chain the leaves left to right by an in-order walk
    pub(crate) fn rebuild_leaf_links(&mut self) {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            match &self.nodes[id] {
                Node::Leaf(_) => leaves.push(id),
                // Push right to left so the leftmost child is visited first
                Node::Internal(node) => stack.extend(node.children.iter().rev()),
            }
        }

        let mut next = None;
        for &id in leaves.iter().rev() {
            if let Node::Leaf(leaf) = &mut self.nodes[id] {
                leaf.next = next;
            }
            next = Some(id);
        }
    }

    /// Write the whole tree to `path`
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_bytes())?;
        tracing::debug!(
            "Persisted B+Tree ({} leaves, depth {}) to {}",
            self.leaf_count(),
            self.depth(),
            path.display()
        );
        Ok(())
    }

    /// Load a tree from `path`; a missing file yields an empty tree
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No B+Tree index file at {}, starting empty", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn corrupt(msg: String) -> PicoError {
    PicoError::IndexCorruption(format!("B+Tree: {}", msg))
}

fn read_u64(bytes: &mut &[u8], what: &str) -> Result<u64> {
    if bytes.remaining() < 8 {
        return Err(corrupt(format!("truncated {}", what)));
    }
    Ok(bytes.get_u64_le())
}

/// Read a count and make sure at least `count * min_size` bytes follow
fn read_count(bytes: &mut &[u8], what: &str, min_size: usize) -> Result<usize> {
    let count = read_u64(bytes, what)?;
    let fits = usize::try_from(count)
        .ok()
        .filter(|&c| c.saturating_mul(min_size) <= bytes.remaining());
    fits.ok_or_else(|| corrupt(format!("{} {} exceeds remaining input", what, count)))
}

fn read_node(bytes: &mut &[u8], nodes: &mut Vec<Node>) -> Result<NodeId> {
    if !bytes.has_remaining() {
        return Err(corrupt("missing node".to_string()));
    }
    let flag = bytes.get_u8();

    let key_count = read_count(bytes, "key count", 8)?;
    let mut keys = Vec::with_capacity(key_count);
    for _ in 0..key_count {
        let len = read_count(bytes, "key length", 1)?;
        keys.push(String::from_utf8_lossy(&bytes[..len]).into_owned());
        bytes.advance(len);
    }

    let node = match flag {
        LEAF_FLAG => {
            let mut offsets = Vec::with_capacity(key_count);
            for _ in 0..key_count {
                offsets.push(read_u64(bytes, "leaf offset")?);
            }
            Node::Leaf(LeafNode {
                keys,
                offsets,
                next: None,
            })
        }
        INTERNAL_FLAG => {
            // Each child needs at least a flag and a key count
            let child_count = read_count(bytes, "child count", 9)?;
            if child_count != key_count + 1 {
                return Err(corrupt(format!(
                    "internal node with {} keys has {} children",
                    key_count, child_count
                )));
            }
            let mut children = Vec::with_capacity(child_count);
            for _ in 0..child_count {
                children.push(read_node(bytes, nodes)?);
            }
            Node::Internal(InternalNode { keys, children })
        }
        other => return Err(corrupt(format!("unknown node flag {}", other))),
    };

    nodes.push(node);
    Ok(nodes.len() - 1)
}
