//! rc-handle: single-threaded, reference-counted owning and observing
//! handles built from raw allocations.
//!
//! Internal Design:
//!
//! Summary
//! - `Shared<T>` owns a heap object together with every clone of itself.
//!   The object is destroyed, exactly once, by whichever operation takes
//!   the owner count to zero.
//! - `Observer<T>` refers to the same object without owning it. It reports
//!   `expired()` once the owner count reaches zero and can `lock()` back
//!   into a `Shared<T>` while the object lives.
//!
//! Storage
//! - Each managed object gets a separate counter block (`counter::RefCount`)
//!   allocated when the first `Shared` adopts the object.
//! - `strong` counts owners. `weak` keeps the counter block alive: one unit
//!   for all owners together, plus one per observer. The object is freed
//!   when `strong` hits zero and the block when `weak` hits zero, so an
//!   observer can always read `strong` safely, even after the object is gone.
//! - A handle stores `Option<Raw<T>>`: both pointers or neither. A handle
//!   cannot hold an object pointer without a counter, or the reverse.
//!
//! Release and acquisition
//! - All destructive paths (drop, `reset`, `assign`, `move_from`) funnel
//!   through one `release` that detaches the pair before decrementing, so a
//!   handle cannot release twice even if `T::drop` reenters the handles.
//! - All sharing paths (`clone`, `Observer::lock`) funnel through one guarded
//!   `acquire` that only increments while `strong > 0`. A destroyed object
//!   is never handed out again, including while its destructor runs.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (plain `Cell` counters, no atomics).
//! - Count overflow aborts, matching `Rc`.
//! - Dereferencing an Empty `Shared` panics; use `get`/`try_get` to check.
//!
//! Demonstrations
//! - `graph`: `NodeA`/`NodeB` that link to each other. Owning links in both
//!   directions leak the pair; an observing back link does not.
//! - `arena`: the same pair owned by a `SlotMap` and linked by key.
//! - `scenarios`: the lifecycles above as runnable functions, driven by the
//!   `rc-handle-demo` binary (feature `cli`).

pub mod arena;
mod counter;
pub mod error;
pub mod graph;
mod handle_proptest;
#[cfg(feature = "cli")]
pub mod observability;
pub mod observer;
pub mod scenarios;
pub mod shared;

// Public surface
pub use error::HandleError;
pub use observer::Observer;
pub use shared::Shared;
