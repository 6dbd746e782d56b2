//! `Observer<T>`: the non-owning handle.

use crate::error::HandleError;
use crate::shared::{Raw, Shared};
use core::fmt;
use std::ptr;

/// Non-owning handle to an object managed by [`Shared`].
///
/// An observer never changes the owner count. It can report whether the
/// object has been destroyed (`expired`) and try to become an owner again
/// (`lock`). Holding observers in one direction of a parent/child or
/// peer-to-peer relationship is how ownership cycles are avoided.
pub struct Observer<T> {
    raw: Option<Raw<T>>,
}

impl<T> Observer<T> {
    /// An observer bound to nothing; it is always expired.
    pub const fn new() -> Self {
        Self { raw: None }
    }

    fn bind(raw: Option<Raw<T>>) -> Self {
        if let Some(raw) = raw {
            raw.count().add_observer();
        }
        Self { raw }
    }

    /// Start observing `source`'s object, dropping whatever was observed
    /// before.
    pub fn assign(&mut self, source: &Shared<T>) {
        // Bind first so the old and new counter may be the same block.
        *self = Self::bind(source.raw());
    }

    /// Observe `source`'s object and take ownership away from `source`.
    ///
    /// `source` is released and left Empty. If it was the only owner the
    /// object is destroyed here and this observer is already expired.
    pub fn capture(&mut self, source: &mut Shared<T>) {
        self.assign(source);
        source.reset();
    }

    /// True once the object has been destroyed, or if nothing was ever
    /// observed.
    pub fn expired(&self) -> bool {
        self.use_count() == 0
    }

    /// Number of live owners of the observed object.
    pub fn use_count(&self) -> usize {
        self.raw.map_or(0, |raw| raw.count().strong())
    }

    /// Try to become an owner.
    ///
    /// Returns an Empty `Shared` when expired. Otherwise the owner count
    /// goes up by exactly one, through the same guarded path `Shared::clone`
    /// uses, so an object whose count already reached zero is never revived.
    pub fn lock(&self) -> Shared<T> {
        Shared::acquire(self.raw)
    }

    /// Like `lock`, but says why no owner could be produced.
    pub fn try_lock(&self) -> Result<Shared<T>, HandleError> {
        if self.raw.is_none() {
            return Err(HandleError::Empty);
        }
        let shared = self.lock();
        if shared.is_empty() {
            return Err(HandleError::Expired);
        }
        Ok(shared)
    }

    /// Stop observing. The owner count is unaffected.
    pub fn reset(&mut self) {
        if let Some(raw) = self.raw.take() {
            // SAFETY: this observer held one weak unit and no longer uses `raw`.
            unsafe { raw.release_weak() };
        }
    }

    /// Address of the observed object, for identity only. It may dangle
    /// once the observer is expired.
    pub fn as_ptr(&self) -> *const T {
        match self.raw {
            Some(raw) => raw.object.as_ptr(),
            None => ptr::null(),
        }
    }

    /// True when both observers watch the same allocation (or neither
    /// watches anything).
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        ptr::eq(Raw::identity(a.raw), Raw::identity(b.raw))
    }
}

impl<T> Default for Observer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<&Shared<T>> for Observer<T> {
    fn from(source: &Shared<T>) -> Self {
        Self::bind(source.raw())
    }
}

impl<T> From<Shared<T>> for Observer<T> {
    fn from(mut source: Shared<T>) -> Self {
        let mut observer = Self::new();
        observer.capture(&mut source);
        observer
    }
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self::bind(self.raw)
    }
}

impl<T> Drop for Observer<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.raw.is_none() {
            f.write_str("Observer(<empty>)")
        } else if self.expired() {
            f.write_str("Observer(<expired>)")
        } else {
            write!(f, "Observer(use_count={})", self.use_count())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Observer;
    use crate::error::HandleError;
    use crate::shared::Shared;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn default_observer_is_expired() {
        let w: Observer<i32> = Observer::default();
        assert!(w.expired());
        assert!(w.lock().is_empty());
        assert_eq!(w.try_lock().unwrap_err(), HandleError::Empty);
    }

    #[test]
    fn observing_does_not_count() {
        let s = Shared::new(1);
        let w = s.observe();
        let w2 = w.clone();
        assert_eq!(s.use_count(), 1);
        assert_eq!(s.observer_count(), 2);
        drop(w2);
        assert_eq!(s.observer_count(), 1);
        assert!(!w.expired());
    }

    #[test]
    fn lock_adds_exactly_one_owner() {
        let s = Shared::new("a");
        let w = Observer::from(&s);
        let before = s.use_count();
        let l = w.lock();
        assert_eq!(s.use_count(), before + 1);
        assert!(Shared::ptr_eq(&s, &l));
    }

    #[test]
    fn expired_after_last_owner_goes() {
        let s = Shared::new(String::from("gone"));
        let w = s.observe();
        drop(s);
        assert!(w.expired());
        assert_eq!(w.use_count(), 0);
        assert!(w.lock().is_empty());
        assert_eq!(w.try_lock().unwrap_err(), HandleError::Expired);
    }

    #[test]
    fn capture_surrenders_sole_ownership() {
        let s = Shared::new(5);
        let w = Observer::from(s);
        assert!(w.expired());

        let mut a = Shared::new(6);
        let b = a.clone();
        let mut w = Observer::new();
        w.capture(&mut a);
        assert!(a.is_empty());
        assert!(!w.expired());
        assert_eq!(b.use_count(), 1);
    }

    #[test]
    fn assign_switches_target() {
        let a = Shared::new(1);
        let b = Shared::new(2);
        let mut w = a.observe();
        w.assign(&b);
        assert_eq!(a.observer_count(), 0);
        assert_eq!(b.observer_count(), 1);
        // Reassigning to the same object keeps the counter alive throughout.
        w.assign(&b);
        assert_eq!(b.observer_count(), 1);
        assert_eq!(*w.lock(), 2);
    }

    #[test]
    fn observers_of_distinct_zero_sized_objects_differ() {
        let a = Shared::new(());
        let b = Shared::new(());
        let (wa, wb) = (a.observe(), b.observe());
        assert!(!Observer::ptr_eq(&wa, &wb));
        assert!(Observer::ptr_eq(&wa, &wa.clone()));
        drop(a);
        assert!(wa.expired());
        assert!(!wb.expired());
    }

    #[test]
    fn reset_leaves_owner_count_alone() {
        let s = Shared::new(0u8);
        let mut w = s.observe();
        w.reset();
        assert!(w.expired());
        assert_eq!(s.use_count(), 1);
        assert_eq!(s.observer_count(), 0);
    }

    // Holds an observer to itself and tries to lock it while being dropped.
    struct SelfWatch {
        me: RefCell<Observer<SelfWatch>>,
        locked_during_drop: Rc<Cell<Option<bool>>>,
    }

    impl Drop for SelfWatch {
        fn drop(&mut self) {
            let me = self.me.borrow();
            self.locked_during_drop
                .set(Some(me.lock().is_owning() || !me.expired()));
        }
    }

    #[test]
    fn lock_never_revives_an_object_being_destroyed() {
        let seen = Rc::new(Cell::new(None));
        let s = Shared::new(SelfWatch {
            me: RefCell::new(Observer::new()),
            locked_during_drop: seen.clone(),
        });
        *s.me.borrow_mut() = s.observe();
        assert_eq!(s.observer_count(), 1);
        drop(s);
        assert_eq!(seen.get(), Some(false));
    }

    #[test]
    fn observer_outlives_storage_safely() {
        let w = {
            let s = Shared::new(vec![1, 2, 3]);
            s.observe()
        };
        assert!(w.expired());
        let w2 = w.clone();
        drop(w);
        assert!(w2.expired());
    }

    #[test]
    fn debug_reports_state() {
        let s = Shared::new(1);
        let w = s.observe();
        assert_eq!(format!("{:?}", w), "Observer(use_count=1)");
        drop(s);
        assert_eq!(format!("{:?}", w), "Observer(<expired>)");
        assert_eq!(format!("{:?}", Observer::<i32>::new()), "Observer(<empty>)");
    }
}
