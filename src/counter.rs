//! Shared counter block for one managed object.
//!
//! `strong` is the reference count proper: one unit per live `Shared`.
//! `weak` keeps the block itself alive: one unit held jointly by all owners
//! while `strong > 0`, plus one unit per live `Observer`. Observers never
//! touch `strong`; they only read it to decide whether the object is gone.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct RefCount {
    strong: Cell<usize>,
    weak: Cell<usize>,
    // !Send + !Sync: plain cells, no atomics.
    _nosend: PhantomData<*mut ()>,
}

impl RefCount {
    /// Counter for a freshly allocated object: one owner, no observers.
    pub(crate) fn new() -> Self {
        Self {
            strong: Cell::new(1),
            weak: Cell::new(1),
            _nosend: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn strong(&self) -> usize {
        self.strong.get()
    }

    /// Live observers, excluding the unit held on behalf of the owners.
    #[inline]
    pub(crate) fn observers(&self) -> usize {
        let w = self.weak.get();
        if self.strong.get() > 0 {
            w - 1
        } else {
            w
        }
    }

    /// Add one owner, but only while the object is still alive.
    ///
    /// Returns false (and leaves the count at 0) once the last owner is gone,
    /// so a destroyed object can never be handed out again.
    #[inline]
    pub(crate) fn try_increment(&self) -> bool {
        let c = self.strong.get();
        if c == 0 {
            return false;
        }
        let n = c.wrapping_add(1);
        if n == 0 {
            // Follow Rc semantics: abort on overflow rather than continue unsafely.
            std::process::abort();
        }
        self.strong.set(n);
        true
    }

    /// Drop one owner. Returns true if that was the last one.
    #[inline]
    pub(crate) fn decrement(&self) -> bool {
        let c = self.strong.get();
        assert!(c > 0, "RefCount strong underflow");
        let n = c - 1;
        self.strong.set(n);
        n == 0
    }

    #[inline]
    pub(crate) fn add_observer(&self) {
        let n = self.weak.get().wrapping_add(1);
        if n == 0 {
            std::process::abort();
        }
        self.weak.set(n);
    }

    /// Return one unit of `weak`. Returns true when the block is no longer
    /// referenced by anyone and must be freed by the caller.
    #[inline]
    pub(crate) fn release_weak(&self) -> bool {
        let c = self.weak.get();
        assert!(c > 0, "RefCount weak underflow");
        let n = c - 1;
        self.weak.set(n);
        n == 0
    }
}
