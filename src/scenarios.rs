//! Runnable walkthroughs of the handle lifecycles.
//!
//! Each scenario drives the handles through one situation and records the
//! counts it observed along the way, so callers (tests, the demo binary) can
//! check or print them.

use crate::arena::{NodeArena, NodeKind};
use crate::error::HandleError;
use crate::graph::{self, Link, LinkStrategy, NodeA, NodeB};
use crate::observer::Observer;
use crate::shared::Shared;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Scenario {
    /// Copy and reset an owning handle until the object goes.
    Lifecycle,
    /// Mutually owning pair that outlives its external handles.
    CycleLeak,
    /// Same pair with the back link observing instead.
    CycleFix,
    /// Observe an object before and after its destruction.
    Observe,
    /// A owns a B that owns nothing, then a second B owns A.
    Wiring,
    /// The pair held in an arena and linked by key.
    Arena,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Lifecycle,
        Scenario::CycleLeak,
        Scenario::CycleFix,
        Scenario::Observe,
        Scenario::Wiring,
        Scenario::Arena,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Lifecycle => "lifecycle",
            Scenario::CycleLeak => "cycle-leak",
            Scenario::CycleFix => "cycle-fix",
            Scenario::Observe => "observe",
            Scenario::Wiring => "wiring",
            Scenario::Arena => "arena",
        }
    }

    pub fn run(self) -> Result<Report, HandleError> {
        Ok(match self {
            Scenario::Lifecycle => Report::Lifecycle(basic_lifecycle()),
            Scenario::CycleLeak => Report::CycleLeak(cycle_leak()?),
            Scenario::CycleFix => Report::CycleFix(cycle_fix()),
            Scenario::Observe => Report::Observe(observe_until_destroyed()?),
            Scenario::Wiring => Report::Wiring(nested_wiring()),
            Scenario::Arena => Report::Arena(arena_pair()?),
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Report {
    Lifecycle(LifecycleReport),
    CycleLeak(CycleLeakReport),
    CycleFix(CycleFixReport),
    Observe(ObserveReport),
    Wiring(WiringReport),
    Arena(ArenaReport),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LifecycleReport {
    pub count_after_new: usize,
    pub count_after_copy: usize,
    pub count_after_first_reset: usize,
    pub alive_after_first_reset: bool,
    pub first_empty: bool,
    pub destroyed_after_second_reset: bool,
    pub second_empty: bool,
}

/// h1 over O, copy to h2, reset h1, reset h2.
pub fn basic_lifecycle() -> LifecycleReport {
    let mut h1 = Shared::new(String::from("O"));
    let probe = h1.observe();
    let count_after_new = h1.use_count();

    let mut h2 = h1.clone();
    let count_after_copy = h2.use_count();

    h1.reset();
    let count_after_first_reset = h2.use_count();
    let alive_after_first_reset = !probe.expired();
    let first_empty = h1.is_empty();

    h2.reset();
    LifecycleReport {
        count_after_new,
        count_after_copy,
        count_after_first_reset,
        alive_after_first_reset,
        first_empty,
        destroyed_after_second_reset: probe.expired(),
        second_empty: h2.is_empty(),
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CycleLeakReport {
    pub a_count_linked: usize,
    pub b_count_linked: usize,
    pub a_count_unreachable: usize,
    pub b_count_unreachable: usize,
    /// Whether both nodes were freed once the cycle was cut by hand.
    pub reclaimed_after_unlink: bool,
}

/// Mutually owning pair; drop both external handles and look at what is
/// left through observers.
pub fn cycle_leak() -> Result<CycleLeakReport, HandleError> {
    let (a, b) = graph::link_pair("A1", "B1", LinkStrategy::MutualOwnership);
    let (wa, wb) = (a.observe(), b.observe());
    let a_count_linked = a.use_count();
    let b_count_linked = b.use_count();

    drop(a);
    drop(b);
    let a_count_unreachable = wa.use_count();
    let b_count_unreachable = wb.use_count();

    // Cut the cycle so the walkthrough itself does not leak.
    let a = wa.try_lock()?;
    graph::unlink(&a);
    drop(a);

    Ok(CycleLeakReport {
        a_count_linked,
        b_count_linked,
        a_count_unreachable,
        b_count_unreachable,
        reclaimed_after_unlink: wa.expired() && wb.expired(),
    })
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CycleFixReport {
    pub a_count_linked: usize,
    pub b_count_linked: usize,
    pub a_destroyed: bool,
    pub b_sees_a_expired: bool,
    pub b_count_after_a: usize,
    pub b_destroyed: bool,
}

/// Pair where B only observes A; external handles are dropped A first.
pub fn cycle_fix() -> CycleFixReport {
    let (a, b) = graph::link_pair("A1", "B1", LinkStrategy::ObservingBack);
    let (wa, wb) = (a.observe(), b.observe());
    let a_count_linked = a.use_count();
    let b_count_linked = b.use_count();

    drop(a);
    let a_destroyed = wa.expired();
    let b_sees_a_expired = b.peer_expired();
    let b_count_after_a = b.use_count();

    drop(b);
    CycleFixReport {
        a_count_linked,
        b_count_linked,
        a_destroyed,
        b_sees_a_expired,
        b_count_after_a,
        b_destroyed: wb.expired(),
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObserveReport {
    pub expired_while_owned: bool,
    pub count_with_lock: usize,
    pub expired_while_only_lock_held: bool,
    pub expired_after_all_reset: bool,
    pub lock_after_destroy_empty: bool,
}

/// Observe h, lock it, then reset every owner.
pub fn observe_until_destroyed() -> Result<ObserveReport, HandleError> {
    let mut h = Shared::new(vec![1u32, 2, 3]);
    let w = Observer::from(&h);
    let expired_while_owned = w.expired();

    let mut locked = w.try_lock()?;
    let count_with_lock = locked.use_count();

    h.reset();
    let expired_while_only_lock_held = w.expired();
    locked.reset();

    Ok(ObserveReport {
        expired_while_owned,
        count_with_lock,
        expired_while_only_lock_held,
        expired_after_all_reset: w.expired(),
        lock_after_destroy_empty: w.lock().is_empty(),
    })
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WiringReport {
    pub a_count: usize,
    pub b_count: usize,
    pub a_owns_inner_b: bool,
    pub inner_b_peer_empty: bool,
    pub all_destroyed: bool,
}

/// A owns an inner B whose link to A is an Empty owning handle; a second B
/// owns A. There is no cycle, so everything goes when the locals do.
pub fn nested_wiring() -> WiringReport {
    let a = NodeA::new(
        "a",
        Link::Owning(NodeB::new("inner-b", Link::Owning(Shared::empty()))),
    );
    let b = NodeB::new("b", Link::Owning(a.clone()));
    let inner = a.peer().observe();
    let (wa, wb) = (a.observe(), b.observe());

    let report = WiringReport {
        a_count: a.use_count(),
        b_count: b.use_count(),
        a_owns_inner_b: a.owns_peer(),
        inner_b_peer_empty: inner.lock().peer().is_empty(),
        all_destroyed: false,
    };
    drop(b);
    drop(a);
    WiringReport {
        all_destroyed: wa.expired() && wb.expired() && inner.expired(),
        ..report
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArenaReport {
    pub nodes_linked: usize,
    pub b_peer_stale_after_remove: bool,
    pub freed_by_sweep: usize,
    pub remaining: usize,
}

/// Link A and B both ways in an arena, remove A, then sweep with no roots.
pub fn arena_pair() -> Result<ArenaReport, HandleError> {
    let mut arena = NodeArena::new();
    let a = arena.insert("A1", NodeKind::A);
    let b = arena.insert("B1", NodeKind::B);
    arena.link(a, b)?;
    arena.link(b, a)?;
    let nodes_linked = arena.len();

    arena.remove(a)?;
    let b_peer_stale_after_remove = matches!(arena.peer(b), Err(HandleError::StaleKey));
    let freed_by_sweep = arena.retain_reachable(&[]);

    Ok(ArenaReport {
        nodes_linked,
        b_peer_stale_after_remove,
        freed_by_sweep,
        remaining: arena.len(),
    })
}
