//! Arena-owned node graph.
//!
//! All nodes are owned by one `SlotMap`; node-to-node links are plain
//! generational keys with no ownership. A cycle between nodes therefore
//! cannot keep anything alive: removing a node frees it, and links to it
//! turn stale instead of dangling.

use crate::error::HandleError;
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use tracing::debug;

new_key_type! {
    /// Stable handle to a node in a [`NodeArena`].
    pub struct NodeKey;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NodeKind {
    A,
    B,
}

#[derive(Debug)]
pub struct ArenaNode {
    pub name: String,
    pub kind: NodeKind,
    peer: Option<NodeKey>,
}

impl ArenaNode {
    /// Key of the linked node. It may be stale; resolve it through the arena.
    pub fn peer_key(&self) -> Option<NodeKey> {
        self.peer
    }
}

#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: SlotMap<NodeKey, ArenaNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeKey {
        self.nodes.insert(ArenaNode {
            name: name.into(),
            kind,
            peer: None,
        })
    }

    pub fn get(&self, key: NodeKey) -> Result<&ArenaNode, HandleError> {
        self.nodes.get(key).ok_or(HandleError::StaleKey)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Point `from` at `to`. Both must be live.
    pub fn link(&mut self, from: NodeKey, to: NodeKey) -> Result<(), HandleError> {
        if !self.nodes.contains_key(to) {
            return Err(HandleError::StaleKey);
        }
        let node = self.nodes.get_mut(from).ok_or(HandleError::StaleKey)?;
        node.peer = Some(to);
        Ok(())
    }

    /// Resolve `key`'s peer. `Ok(None)` means the node has no link;
    /// `StaleKey` means the node or its peer has been removed.
    pub fn peer(&self, key: NodeKey) -> Result<Option<&ArenaNode>, HandleError> {
        match self.get(key)?.peer {
            None => Ok(None),
            Some(peer) => self.get(peer).map(Some),
        }
    }

    pub fn remove(&mut self, key: NodeKey) -> Result<ArenaNode, HandleError> {
        let node = self.nodes.remove(key).ok_or(HandleError::StaleKey)?;
        debug!(node = %node.name, "removed arena node");
        Ok(node)
    }

    /// Drop every node not reachable from `roots` by following peer links.
    /// Returns how many nodes were freed.
    pub fn retain_reachable(&mut self, roots: &[NodeKey]) -> usize {
        let mut marked: SecondaryMap<NodeKey, ()> = SecondaryMap::new();
        let mut stack: Vec<NodeKey> = roots
            .iter()
            .copied()
            .filter(|k| self.nodes.contains_key(*k))
            .collect();
        while let Some(k) = stack.pop() {
            if marked.insert(k, ()).is_some() {
                continue;
            }
            if let Some(peer) = self.nodes[k].peer {
                if self.nodes.contains_key(peer) {
                    stack.push(peer);
                }
            }
        }
        let before = self.nodes.len();
        self.nodes.retain(|k, _| marked.contains_key(k));
        let freed = before - self.nodes.len();
        debug!(freed, remaining = self.nodes.len(), "swept unreachable arena nodes");
        freed
    }
}
