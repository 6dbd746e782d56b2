#![cfg(test)]

// Model-based property tests for Shared/Observer kept inside the crate so
// they can look at counter internals.

use crate::observer::Observer;
use crate::shared::Shared;
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

struct Tracked(Rc<Cell<usize>>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

const SLOTS: usize = 4;
const OBSERVERS: usize = 3;

#[derive(Clone, Debug)]
enum Op {
    Clone(usize, usize),
    Assign(usize, usize),
    MoveFrom(usize, usize),
    Take(usize, usize),
    Reset(usize),
    Observe(usize, usize),
    Capture(usize, usize),
    Lock(usize, usize),
    ResetObserver(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    let s = 0..SLOTS;
    let o = 0..OBSERVERS;
    prop_oneof![
        (s.clone(), s.clone()).prop_map(|(i, j)| Op::Clone(i, j)),
        (s.clone(), s.clone()).prop_map(|(i, j)| Op::Assign(i, j)),
        (s.clone(), s.clone()).prop_map(|(i, j)| Op::MoveFrom(i, j)),
        (s.clone(), s.clone()).prop_map(|(i, j)| Op::Take(i, j)),
        s.clone().prop_map(Op::Reset),
        (s.clone(), o.clone()).prop_map(|(i, k)| Op::Observe(i, k)),
        (s.clone(), o.clone()).prop_map(|(i, k)| Op::Capture(i, k)),
        (o.clone(), s.clone()).prop_map(|(k, i)| Op::Lock(k, i)),
        o.prop_map(Op::ResetObserver),
    ]
}

// Disjoint mutable borrows of two distinct slots.
fn two_mut<T>(v: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j);
    if i < j {
        let (lo, hi) = v.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = v.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

proptest! {
    #[test]
    fn prop_single_object_lifecycle(ops in proptest::collection::vec(arb_op(), 1..120)) {
        let drops = Rc::new(Cell::new(0));
        let mut slots: Vec<Shared<Tracked>> = (0..SLOTS).map(|_| Shared::empty()).collect();
        slots[0] = Shared::new(Tracked(drops.clone()));
        let mut observers: Vec<Observer<Tracked>> = (0..OBSERVERS).map(|_| Observer::new()).collect();

        // Model: which slots own the object, which observers are bound to it.
        let mut owning = [false; SLOTS];
        owning[0] = true;
        let mut bound = [false; OBSERVERS];

        for op in ops {
            match op {
                Op::Clone(i, j) => {
                    slots[j] = slots[i].clone();
                    owning[j] = owning[i];
                }
                Op::Assign(i, j) => {
                    if i == j {
                        // Assigning from a handle that shares the same storage.
                        let before = slots[i].use_count();
                        let copy = slots[i].clone();
                        slots[i].assign(&copy);
                        prop_assert_eq!(slots[i].use_count(), copy.use_count());
                        drop(copy);
                        prop_assert_eq!(slots[i].use_count(), before);
                    } else {
                        let (src, dst) = two_mut(&mut slots, i, j);
                        dst.assign(src);
                        owning[j] = owning[i];
                    }
                }
                Op::MoveFrom(i, j) => {
                    if i != j {
                        let (src, dst) = two_mut(&mut slots, i, j);
                        dst.move_from(src);
                        owning[j] = owning[i];
                        owning[i] = false;
                    }
                }
                Op::Take(i, j) => {
                    let taken = slots[i].take();
                    slots[j] = taken;
                    let was = owning[i];
                    owning[i] = false;
                    owning[j] = was;
                }
                Op::Reset(i) => {
                    slots[i].reset();
                    owning[i] = false;
                }
                Op::Observe(i, k) => {
                    observers[k] = slots[i].observe();
                    bound[k] = owning[i];
                }
                Op::Capture(i, k) => {
                    observers[k].capture(&mut slots[i]);
                    bound[k] = owning[i];
                    owning[i] = false;
                }
                Op::Lock(k, i) => {
                    let alive = owning.iter().any(|&o| o);
                    let before = owning.iter().filter(|&&o| o).count();
                    let locked = observers[k].lock();
                    if bound[k] && alive {
                        prop_assert_eq!(locked.use_count(), before + 1);
                    } else {
                        prop_assert!(locked.is_empty());
                        prop_assert_eq!(slots.iter().map(Shared::use_count).max(), Some(before));
                    }
                    owning[i] = locked.is_owning();
                    slots[i] = locked;
                }
                Op::ResetObserver(k) => {
                    observers[k].reset();
                    bound[k] = false;
                }
            }

            let owners = owning.iter().filter(|&&o| o).count();
            let alive = owners > 0;
            for (slot, &own) in slots.iter().zip(owning.iter()) {
                prop_assert_eq!(slot.is_owning(), own);
                prop_assert_eq!(slot.use_count(), if own { owners } else { 0 });
            }
            for (obs, &b) in observers.iter().zip(bound.iter()) {
                prop_assert_eq!(obs.expired(), !(b && alive));
            }
            prop_assert_eq!(drops.get(), if alive { 0 } else { 1 });
        }

        drop(slots);
        prop_assert_eq!(drops.get(), 1);
        prop_assert!(observers.iter().all(Observer::expired));
    }
}
