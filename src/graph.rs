//! Two node kinds that point at each other, to show the cycle hazard.
//!
//! With `Link::Owning` in both directions a linked pair keeps itself alive
//! after every outside handle is gone. Switching one direction to
//! `Link::Observing` lets the pair be torn down normally.

use crate::observer::Observer;
use crate::shared::Shared;
use core::cell::RefCell;
use tracing::debug;

/// One direction of a node-to-node relationship.
pub enum Link<T> {
    Detached,
    Owning(Shared<T>),
    Observing(Observer<T>),
}

impl<T> Link<T> {
    /// An owning handle to the peer, if it is still alive.
    pub fn upgrade(&self) -> Shared<T> {
        match self {
            Link::Detached => Shared::empty(),
            Link::Owning(s) => s.clone(),
            Link::Observing(o) => o.lock(),
        }
    }

    pub fn is_owning(&self) -> bool {
        matches!(self, Link::Owning(_))
    }
}

impl<T> Default for Link<T> {
    fn default() -> Self {
        Link::Detached
    }
}

/// How `link_pair` wires B back to A.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LinkStrategy {
    /// B owns A: the pair forms a reference cycle and leaks.
    MutualOwnership,
    /// B only observes A: no cycle.
    ObservingBack,
}

pub struct NodeA {
    name: String,
    peer: RefCell<Link<NodeB>>,
}

pub struct NodeB {
    name: String,
    peer: RefCell<Link<NodeA>>,
}

impl NodeA {
    pub fn new(name: impl Into<String>, peer: Link<NodeB>) -> Shared<NodeA> {
        Shared::new(NodeA {
            name: name.into(),
            peer: RefCell::new(peer),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the link to B, dropping the previous one.
    pub fn set_peer(&self, peer: Link<NodeB>) {
        // The old link is dropped after the borrow ends.
        drop(self.peer.replace(peer));
    }

    pub fn peer(&self) -> Shared<NodeB> {
        self.peer.borrow().upgrade()
    }

    pub fn owns_peer(&self) -> bool {
        self.peer.borrow().is_owning()
    }
}

impl NodeB {
    pub fn new(name: impl Into<String>, peer: Link<NodeA>) -> Shared<NodeB> {
        Shared::new(NodeB {
            name: name.into(),
            peer: RefCell::new(peer),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_peer(&self, peer: Link<NodeA>) {
        // The old link is dropped after the borrow ends.
        drop(self.peer.replace(peer));
    }

    pub fn peer(&self) -> Shared<NodeA> {
        self.peer.borrow().upgrade()
    }

    /// True when B's link to A is observing and A is gone.
    pub fn peer_expired(&self) -> bool {
        match &*self.peer.borrow() {
            Link::Observing(o) => o.expired(),
            Link::Owning(s) => s.is_empty(),
            Link::Detached => true,
        }
    }
}

impl Drop for NodeA {
    fn drop(&mut self) {
        debug!(node = %self.name, "dropping NodeA");
    }
}

impl Drop for NodeB {
    fn drop(&mut self) {
        debug!(node = %self.name, "dropping NodeB");
    }
}

/// Build an A/B pair that reference each other. A always owns B; B owns or
/// observes A according to `strategy`.
pub fn link_pair(
    a_name: &str,
    b_name: &str,
    strategy: LinkStrategy,
) -> (Shared<NodeA>, Shared<NodeB>) {
    let a = NodeA::new(a_name, Link::Detached);
    let back = match strategy {
        LinkStrategy::MutualOwnership => Link::Owning(a.clone()),
        LinkStrategy::ObservingBack => Link::Observing(a.observe()),
    };
    let b = NodeB::new(b_name, back);
    a.set_peer(Link::Owning(b.clone()));
    (a, b)
}

/// Break whatever cycle runs through `a` by detaching both directions.
pub fn unlink(a: &NodeA) {
    let b = a.peer();
    a.set_peer(Link::Detached);
    if let Some(b) = b.get() {
        b.set_peer(Link::Detached);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_follows_link_kind() {
        let a = NodeA::new("a", Link::Detached);
        assert!(Link::<NodeA>::Detached.upgrade().is_empty());
        assert!(Link::Owning(a.clone()).upgrade().is_owning());
        let obs = Link::Observing(a.observe());
        assert!(Shared::ptr_eq(&obs.upgrade(), &a));
        drop(a);
        assert!(obs.upgrade().is_empty());
    }

    #[test]
    fn mutual_pair_counts_include_peer() {
        let (a, b) = link_pair("a", "b", LinkStrategy::MutualOwnership);
        assert_eq!(a.use_count(), 2);
        assert_eq!(b.use_count(), 2);
        assert!(a.owns_peer());
        unlink(&a);
        assert_eq!(a.use_count(), 1);
        assert_eq!(b.use_count(), 1);
    }

    #[test]
    fn observing_pair_counts_exclude_back_link() {
        let (a, b) = link_pair("a", "b", LinkStrategy::ObservingBack);
        assert_eq!(a.use_count(), 1);
        assert_eq!(b.use_count(), 2);
        assert_eq!(b.peer().name(), "a");
        assert_eq!(a.peer().name(), "b");
    }
}
