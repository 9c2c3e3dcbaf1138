//! A cloneable handle for sharing one store between several overlays.
//!
//! `&S` and `Arc<S>` are enough to share a basis for reading. When the sharers also need to write, or the store must be resized
//! while overlays keep pointing at it, wrap it in a `SharedStore`. Every clone of the handle is the same store.
//!
//! ```
//! use lattice_views_core::prelude::*;
//! use lattice_views_storage::prelude::*;
//!
//! let image = SharedStore::new(Array2::fill(PointN([10, 10]), 1u8));
//! let window = Viewport::new(image.clone(), PointN([8, 8]), PointN([12, 12]));
//! assert_eq!(window.shape(), PointN([2, 2]));
//!
//! image.write().resize(PointN([9, 9])).unwrap();
//! assert_eq!(window.shape(), PointN([1, 1]));
//! ```

use crate::{IndexedStore, IndexedStoreMut, NewInstance, OverlayError, Parallelism, Resizable};

use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A shared read/write handle to a store. Equality and hashing are by identity.
#[derive(Debug, Default)]
pub struct SharedStore<S> {
    inner: Arc<RwLock<S>>,
}

impl<S> Clone for SharedStore<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> SharedStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    // A panic while a guard was held leaves the store readable; samples are plain numbers.

    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, S> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, S> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` iff both handles refer to the same store.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The number of handles to this store.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Returns the store if this is the last handle to it.
    pub fn try_unwrap(self) -> Result<S, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(lock) => Ok(lock.into_inner().unwrap_or_else(PoisonError::into_inner)),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl<S> PartialEq for SharedStore<S> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<S> Eq for SharedStore<S> {}

impl<S> Hash for SharedStore<S> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state)
    }
}

impl<S> IndexedStore for SharedStore<S>
where
    S: IndexedStore,
{
    type Index = S::Index;
    type Sample = S::Sample;

    #[inline]
    fn get(&self, index: Self::Index) -> Self::Sample {
        self.read().get(index)
    }

    #[inline]
    fn is_valid(&self, index: Self::Index) -> bool {
        self.read().is_valid(index)
    }

    #[inline]
    fn shape(&self) -> Self::Index {
        self.read().shape()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.read().capacity()
    }

    #[inline]
    fn parallelism(&self) -> Option<Parallelism> {
        self.read().parallelism()
    }
}

impl<S> IndexedStoreMut for SharedStore<S>
where
    S: IndexedStoreMut,
{
    #[inline]
    fn set(&mut self, index: Self::Index, value: Self::Sample) {
        self.write().set(index, value)
    }

    #[inline]
    fn add(&mut self, index: Self::Index, value: Self::Sample) {
        self.write().add(index, value)
    }

    #[inline]
    fn clear(&mut self, index: Self::Index) {
        self.write().clear(index)
    }

    #[inline]
    fn discard(&mut self, index: Self::Index) {
        self.write().discard(index)
    }

    fn destroy(&mut self) {
        self.write().destroy()
    }
}

impl<S> Resizable for SharedStore<S>
where
    S: Resizable,
{
    fn resize(&mut self, shape: Self::Index) -> Result<(), OverlayError> {
        self.write().resize(shape)
    }
}

impl<S> NewInstance for SharedStore<S>
where
    S: NewInstance,
{
    /// A new handle to a new store; the instance is not shared with `self`.
    fn new_instance(&self, shape: Self::Index) -> Result<Self, OverlayError> {
        Ok(Self::new(self.read().new_instance(shape)?))
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;
    use crate::prelude::*;

    use lattice_views_core::prelude::*;

    #[test]
    fn clones_write_through_to_one_store() {
        let first = SharedStore::new(Array1::fill(PointN([4]), 0i32));
        let mut second = first.clone();
        second.set(PointN([2]), 5);
        second.add(PointN([2]), 1);

        assert_eq!(first.get(PointN([2])), 6);
        assert_eq!(first, second);
        assert_eq!(first.handle_count(), 2);
    }

    #[test]
    fn distinct_stores_are_not_equal() {
        let a = SharedStore::new(Array1::fill(PointN([4]), 0i32));
        let b = SharedStore::new(Array1::fill(PointN([4]), 0i32));
        assert_ne!(a, b);

        let fresh = a.new_instance(PointN([2])).unwrap();
        assert!(!fresh.ptr_eq(&a));
        assert_eq!(fresh.shape(), PointN([2]));
    }

    #[test]
    fn resize_is_visible_to_every_handle() {
        let store = SharedStore::new(Array2::fill(PointN([3, 3]), 1.0f32));
        let mut handle = store.clone();
        handle.resize(PointN([1, 2])).unwrap();

        assert_eq!(store.shape(), PointN([1, 2]));
        assert_eq!(store.capacity(), 2);
    }

    #[test]
    fn last_handle_unwraps() {
        let store = SharedStore::new(Array1::fill(PointN([2]), 7u8));
        let other = store.clone();
        let store = store.try_unwrap().unwrap_err();
        drop(other);

        let array = store.try_unwrap().unwrap();
        assert_eq!(array.values_slice(), &[7, 7]);
    }
}
