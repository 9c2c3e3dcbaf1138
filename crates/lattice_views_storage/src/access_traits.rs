//! Traits defining the indexed numeric store contract.
//!
//! Every store in this crate, from the dense `ArrayN` to the most deeply nested overlay, implements `IndexedStore` (reads)
//! and `IndexedStoreMut` (writes). Because the traits are also implemented for `&S`, `&mut S`, `Box<S>` and `Arc<S>`, an
//! overlay can own its basis, borrow it, or share it, and any overlay can be the basis of another.
//!
//! ```
//! use lattice_views_core::prelude::*;
//! use lattice_views_storage::prelude::*;
//!
//! let mut image = Array2::fill(PointN([10, 10]), 0.0f32);
//! image.set(PointN([2, 3]), 4.0);
//!
//! // Borrow the image as the basis of a window.
//! let window = Viewport::new(&image, PointN([2, 3]), PointN([6, 7]));
//! assert_eq!(window.get(PointN([0, 0])), 4.0);
//! assert_eq!(window.shape(), PointN([4, 4]));
//! ```
//!
//! # Copy an Extent
//!
//! `copy_extent` moves every valid sample of an extent between any two stores that share an index type:
//! ```
//! # use lattice_views_core::prelude::*;
//! # use lattice_views_storage::prelude::*;
//! let src = Array2::fill_with(PointN([4, 4]), |p: Point2i| (p.x() + p.y()) as i32);
//! let mut dst = Array2::fill(PointN([4, 4]), 0);
//! copy_extent(&Extent2i::from_shape(PointN([2, 2])), &src, &mut dst);
//! assert_eq!(dst.get(PointN([1, 1])), 2);
//! assert_eq!(dst.get(PointN([3, 3])), 0);
//! ```

use crate::{ElementType, OverlayError, Parallelism, Sample};

use auto_impl::auto_impl;
use lattice_views_core::num::Zero;
use lattice_views_core::prelude::*;

/// Read access to an N-dimensional store of numeric samples.
#[auto_impl(&, &mut, Box, Arc)]
pub trait IndexedStore {
    type Index: IntegerPoint;
    type Sample: Sample;

    /// Get the sample at `index`.
    fn get(&self, index: Self::Index) -> Self::Sample;

    /// Returns `true` iff `index` is inside the store and holds trustworthy data. Never panics.
    fn is_valid(&self, index: Self::Index) -> bool;

    /// The current extent along every axis. May change between calls if the store is resizable.
    fn shape(&self) -> Self::Index;

    /// The number of samples the underlying storage holds.
    fn capacity(&self) -> usize;

    #[inline]
    fn size(&self, axis: usize) -> i32 {
        self.shape().at(axis)
    }

    #[inline]
    fn element_type(&self) -> ElementType {
        <Self::Sample as Sample>::ELEMENT_TYPE
    }

    /// The processing policy this store carries, if any. Overlays copy it once when they are constructed.
    #[inline]
    fn parallelism(&self) -> Option<Parallelism> {
        None
    }
}

/// Write access to an N-dimensional store of numeric samples.
pub trait IndexedStoreMut: IndexedStore {
    /// Set the sample at `index`.
    fn set(&mut self, index: Self::Index, value: Self::Sample);

    /// Accumulate `value` into the sample at `index`.
    #[inline]
    fn add(&mut self, index: Self::Index, value: Self::Sample) {
        let current = self.get(index);
        self.set(index, current + value);
    }

    /// Force the sample at `index` to zero.
    #[inline]
    fn clear(&mut self, index: Self::Index) {
        self.set(index, Self::Sample::zero());
    }

    /// Invalidate the sample at `index`. Stores without validity bookkeeping just clear it.
    #[inline]
    fn discard(&mut self, index: Self::Index) {
        self.clear(index);
    }

    /// Release backing storage. Stores that own nothing do nothing.
    #[inline]
    fn destroy(&mut self) {}
}

/// Stores whose shape can change after construction.
pub trait Resizable: IndexedStore {
    fn resize(&mut self, shape: Self::Index) -> Result<(), OverlayError>;
}

// `auto_impl` can't name the supertrait's associated types, so the forwarding impls are written out.
macro_rules! impl_mut_forwarding {
    ($($ptr:ty),*) => {
        $(
            impl<S> IndexedStoreMut for $ptr
            where
                S: IndexedStoreMut + ?Sized,
            {
                #[inline]
                fn set(&mut self, index: Self::Index, value: Self::Sample) {
                    (**self).set(index, value)
                }

                #[inline]
                fn add(&mut self, index: Self::Index, value: Self::Sample) {
                    (**self).add(index, value)
                }

                #[inline]
                fn clear(&mut self, index: Self::Index) {
                    (**self).clear(index)
                }

                #[inline]
                fn discard(&mut self, index: Self::Index) {
                    (**self).discard(index)
                }

                #[inline]
                fn destroy(&mut self) {
                    (**self).destroy()
                }
            }

            impl<S> Resizable for $ptr
            where
                S: Resizable + ?Sized,
            {
                #[inline]
                fn resize(&mut self, shape: Self::Index) -> Result<(), OverlayError> {
                    (**self).resize(shape)
                }
            }
        )*
    };
}

impl_mut_forwarding!(&mut S, Box<S>);

/// Stores that can produce a fresh, zeroed instance of themselves with a new shape, carrying over processing policy but no
/// data.
pub trait NewInstance: IndexedStore + Sized {
    fn new_instance(&self, shape: Self::Index) -> Result<Self, OverlayError>;
}

/// Iteration over the valid samples of any store.
pub trait ForEachValid: IndexedStore {
    /// Calls `f` on every valid index of `extent`, first axis fastest.
    #[inline]
    fn for_each_valid(
        &self,
        extent: &Extent<Self::Index>,
        mut f: impl FnMut(Self::Index, Self::Sample),
    ) {
        for p in extent.iter_points() {
            if self.is_valid(p) {
                f(p, self.get(p));
            }
        }
    }

    #[inline]
    fn count_valid(&self, extent: &Extent<Self::Index>) -> usize {
        extent.iter_points().filter(|p| self.is_valid(*p)).count()
    }

    /// The extent from the origin to the current shape.
    #[inline]
    fn full_extent(&self) -> Extent<Self::Index> {
        Extent::from_shape(self.shape())
    }
}

impl<S> ForEachValid for S where S: IndexedStore + ?Sized {}

/// Copy all valid samples in `extent` from `src` to `dst`. Points outside of `dst` are skipped.
pub fn copy_extent<Src, Dst>(extent: &Extent<Src::Index>, src: &Src, dst: &mut Dst)
where
    Src: IndexedStore,
    Dst: IndexedStoreMut + IndexedStore<Index = Src::Index, Sample = Src::Sample>,
{
    let extent = extent.intersection(&Extent::from_shape(dst.shape()));
    src.for_each_valid(&extent, |p, value| dst.set(p, value));
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
