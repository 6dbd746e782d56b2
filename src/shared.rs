//! `Shared<T>`: the owning handle.

use crate::counter::RefCount;
use crate::error::HandleError;
use crate::observer::Observer;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::Deref;
use std::ptr::{self, NonNull};
use tracing::trace;

/// Object pointer and counter pointer of one managed allocation.
///
/// The two always travel together, so a handle is either bound to both or
/// to neither.
pub(crate) struct Raw<T> {
    pub(crate) object: NonNull<T>,
    pub(crate) count: NonNull<RefCount>,
}

impl<T> Clone for Raw<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Raw<T> {}

impl<T> Raw<T> {
    #[inline]
    pub(crate) fn count(&self) -> &RefCount {
        // SAFETY: every handle holding a `Raw` also holds a `weak` unit on
        // the counter block, so the block outlives the handle.
        unsafe { self.count.as_ref() }
    }

    /// Identity of the allocation: the counter block is unique per managed
    /// object, unlike the object address (all zero-sized objects share one).
    #[inline]
    pub(crate) fn identity(raw: Option<Raw<T>>) -> *const RefCount {
        match raw {
            Some(raw) => raw.count.as_ptr(),
            None => ptr::null(),
        }
    }

    /// Give back one `weak` unit and free the counter block if it was the
    /// last one.
    ///
    /// Safety: the caller must own the unit it returns, and must not use
    /// this `Raw` afterwards.
    pub(crate) unsafe fn release_weak(self) {
        if self.count().release_weak() {
            trace!(count = ?self.count, "freeing reference count");
            drop(Box::from_raw(self.count.as_ptr()));
        }
    }
}

/// Owning, reference-counted handle to a heap object.
///
/// Cloning shares ownership and bumps the count; dropping or resetting gives
/// it back. The object is destroyed by whichever operation takes the count
/// to zero. A `Shared` may also be Empty, owning nothing.
///
/// Single-threaded: `!Send`/`!Sync`.
pub struct Shared<T> {
    raw: Option<Raw<T>>,
    _owns: PhantomData<T>,
}

impl<T> Shared<T> {
    /// An Empty handle.
    pub const fn empty() -> Self {
        Self {
            raw: None,
            _owns: PhantomData,
        }
    }

    /// Move `value` to the heap and take ownership of it with a count of 1.
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    /// Take ownership of an existing heap allocation with a count of 1.
    pub fn from_box(value: Box<T>) -> Self {
        let object = NonNull::from(Box::leak(value));
        Self::adopt(object)
    }

    /// Take ownership of a raw pointer. A null pointer yields an Empty handle.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or come from `Box::into_raw`, and must not be owned
    /// by anything else (including another `Shared`).
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        match NonNull::new(ptr) {
            Some(object) => Self::adopt(object),
            None => Self::empty(),
        }
    }

    fn adopt(object: NonNull<T>) -> Self {
        let count = NonNull::from(Box::leak(Box::new(RefCount::new())));
        trace!(object = ?object, count = ?count, "allocated managed object");
        Self::bound(Raw { object, count })
    }

    /// Wrap a pair whose strong unit the caller already holds.
    fn bound(raw: Raw<T>) -> Self {
        Self {
            raw: Some(raw),
            _owns: PhantomData,
        }
    }

    /// Acquire a new owner for `raw`, provided the object is still alive.
    ///
    /// Both `clone` and `Observer::lock` come through here, so ownership is
    /// only ever shared through the guarded increment.
    pub(crate) fn acquire(raw: Option<Raw<T>>) -> Self {
        match raw {
            Some(raw) if raw.count().try_increment() => Self::bound(raw),
            _ => Self::empty(),
        }
    }

    pub(crate) fn raw(&self) -> Option<Raw<T>> {
        self.raw
    }

    /// Give up this handle's ownership and leave it Empty.
    ///
    /// Every destructive path (drop, reset, assign, move_from) goes through
    /// here. The pair is detached before anything else happens, so a handle
    /// can never release the same unit twice, even if `T::drop` reenters.
    fn release(&mut self) {
        let Some(raw) = self.raw.take() else {
            return;
        };
        if raw.count().decrement() {
            trace!(object = ?raw.object, "last owner released, destroying managed object");
            // SAFETY: the strong count just hit zero, so no other owner can
            // reach the object and no observer can upgrade to it.
            unsafe {
                drop(Box::from_raw(raw.object.as_ptr()));
                raw.release_weak();
            }
        }
    }

    /// Release ownership; the handle becomes Empty.
    pub fn reset(&mut self) {
        self.release();
    }

    /// Copy-assign: release the current ownership, then share `source`'s.
    ///
    /// If both handles already share the same storage nothing happens, so
    /// the count is left as it was.
    pub fn assign(&mut self, source: &Shared<T>) {
        if Self::ptr_eq(self, source) {
            return;
        }
        self.release();
        self.raw = Self::acquire(source.raw).detach();
    }

    /// Move-assign: release the current ownership, then take `source`'s
    /// without touching the count. `source` is left Empty.
    pub fn move_from(&mut self, source: &mut Shared<T>) {
        self.release();
        self.raw = source.raw.take();
    }

    /// Move out of this handle, leaving it Empty.
    pub fn take(&mut self) -> Shared<T> {
        Self {
            raw: self.raw.take(),
            _owns: PhantomData,
        }
    }

    /// Hand the pair (and its strong unit) to the caller without releasing.
    fn detach(mut self) -> Option<Raw<T>> {
        self.raw.take()
    }

    /// Borrow the object, or `None` when Empty.
    pub fn get(&self) -> Option<&T> {
        // SAFETY: this handle holds a strong unit, so the object is alive.
        self.raw.map(|raw| unsafe { &*raw.object.as_ptr() })
    }

    /// Like `get`, reporting an Empty handle as an error.
    pub fn try_get(&self) -> Result<&T, HandleError> {
        self.get().ok_or(HandleError::Empty)
    }

    /// Mutable access when this is the only owner and nothing observes the
    /// object.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        let raw = self.raw?;
        let count = raw.count();
        if count.strong() == 1 && count.observers() == 0 {
            // SAFETY: sole owner and no observer that could lock a second one.
            Some(unsafe { &mut *raw.object.as_ptr() })
        } else {
            None
        }
    }

    /// The object pointer, or null when Empty. Ownership is unaffected.
    pub fn as_ptr(&self) -> *const T {
        match self.raw {
            Some(raw) => raw.object.as_ptr(),
            None => ptr::null(),
        }
    }

    /// True when the handle owns an object.
    pub fn is_owning(&self) -> bool {
        self.raw.is_some()
    }

    /// True when the handle owns nothing.
    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
    }

    /// Number of live owners, or 0 when Empty.
    pub fn use_count(&self) -> usize {
        self.raw.map_or(0, |raw| raw.count().strong())
    }

    /// Number of live observers of this object, or 0 when Empty.
    pub fn observer_count(&self) -> usize {
        self.raw.map_or(0, |raw| raw.count().observers())
    }

    /// Create an observer of this handle's object.
    pub fn observe(&self) -> Observer<T> {
        Observer::from(self)
    }

    /// True when both handles point at the same object (or are both Empty).
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        ptr::eq(Raw::identity(a.raw), Raw::identity(b.raw))
    }

    /// Recover the object if `this` is its only owner.
    ///
    /// Observers of the object become expired.
    pub fn try_unwrap(mut this: Self) -> Result<T, Self> {
        let Some(raw) = this.raw else {
            return Err(this);
        };
        if raw.count().strong() != 1 {
            return Err(this);
        }
        this.raw = None;
        raw.count().decrement();
        // SAFETY: we held the only strong unit and just gave it up.
        unsafe {
            let value = *Box::from_raw(raw.object.as_ptr());
            raw.release_weak();
            Ok(value)
        }
    }
}

impl<T> Default for Shared<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Box<T>> for Shared<T> {
    fn from(value: Box<T>) -> Self {
        Self::from_box(value)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self::acquire(self.raw)
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign(source);
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> Deref for Shared<T> {
    type Target = T;

    /// Panics when the handle is Empty; check `is_owning` or use `get` first.
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced an empty Shared handle"),
        }
    }
}

impl<T> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<T> Eq for Shared<T> {}

impl<T> Hash for Shared<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Raw::identity(self.raw) as usize).hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Shared").field(value).finish(),
            None => f.write_str("Shared(<empty>)"),
        }
    }
}
