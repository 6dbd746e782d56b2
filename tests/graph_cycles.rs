use rc_handle::arena::{NodeArena, NodeKind};
use rc_handle::graph::{self, Link, LinkStrategy, NodeA, NodeB};
use rc_handle::HandleError;

#[test]
fn mutual_ownership_leaks_the_pair() {
    let (a, b) = graph::link_pair("A1", "B1", LinkStrategy::MutualOwnership);
    assert_eq!(a.use_count(), 2);
    assert_eq!(b.use_count(), 2);

    let (wa, wb) = (a.observe(), b.observe());
    drop(a);
    drop(b);

    // Nothing outside refers to either node, yet both are still alive.
    assert!(wa.use_count() >= 1);
    assert!(wb.use_count() >= 1);
    assert!(!wa.expired());
    assert!(!wb.expired());

    // Cut the cycle by hand; then both go.
    let a = wa.lock();
    graph::unlink(&a);
    drop(a);
    assert!(wa.expired());
    assert!(wb.expired());
}

#[test]
fn observing_back_link_breaks_the_cycle() {
    let (a, b) = graph::link_pair("A1", "B1", LinkStrategy::ObservingBack);
    let (wa, wb) = (a.observe(), b.observe());

    drop(a);
    assert_eq!(wa.use_count(), 0);
    assert!(wa.expired());
    assert!(b.peer_expired());
    assert!(b.peer().is_empty());
    assert_eq!(b.use_count(), 1);

    drop(b);
    assert_eq!(wb.use_count(), 0);
    assert!(wb.expired());
}

#[test]
fn dropping_b_first_keeps_a_and_its_b() {
    let (a, b) = graph::link_pair("A1", "B1", LinkStrategy::ObservingBack);
    let wb = b.observe();
    drop(b);
    // A still owns B.
    assert!(!wb.expired());
    assert_eq!(a.peer().name(), "B1");
    drop(a);
    assert!(wb.expired());
}

#[test]
fn nested_wiring_without_cycle_is_freed() {
    let inner = NodeB::new("inner", Link::Owning(rc_handle::Shared::empty()));
    let w_inner = inner.observe();
    let a = NodeA::new("a", Link::Owning(inner));
    let b = NodeB::new("b", Link::Owning(a.clone()));
    assert_eq!(a.use_count(), 2);
    let (wa, wb) = (a.observe(), b.observe());
    drop(a);
    assert!(!wa.expired());
    drop(b);
    assert!(wa.expired());
    assert!(wb.expired());
    assert!(w_inner.expired());
}

#[test]
fn arena_pair_has_no_leak() {
    let mut arena = NodeArena::new();
    let a = arena.insert("A1", NodeKind::A);
    let b = arena.insert("B1", NodeKind::B);
    arena.link(a, b).unwrap();
    arena.link(b, a).unwrap();
    assert_eq!(arena.peer(a).unwrap().map(|n| n.name.as_str()), Some("B1"));

    // No roots: the cycle is unreachable and is freed.
    assert_eq!(arena.retain_reachable(&[]), 2);
    assert!(arena.is_empty());
    assert_eq!(arena.get(a).unwrap_err(), HandleError::StaleKey);
}

#[test]
fn arena_remove_turns_links_stale() {
    let mut arena = NodeArena::new();
    let a = arena.insert("A1", NodeKind::A);
    let b = arena.insert("B1", NodeKind::B);
    arena.link(b, a).unwrap();
    let removed = arena.remove(a).unwrap();
    assert_eq!(removed.kind, NodeKind::A);
    assert_eq!(arena.get(b).unwrap().peer_key(), Some(a));
    assert_eq!(arena.peer(b).unwrap_err(), HandleError::StaleKey);
}
