//! Dense N-dimensional arrays of samples.
//!
//! `ArrayN` is the concrete backend every overlay ultimately reads from: a flat `Vec` of samples laid out with the first axis
//! varying fastest, indexed by points in `[0, shape)`.
//!
//! # Indexing
//!
//! Arrays implement `IndexedStore` and `IndexedStoreMut` for their point type. `get` and `set` assume the index is in bounds
//! and panic otherwise, just like slice indexing. `is_valid` never panics: it is `false` outside of the array and for NaN
//! samples.
//!
//! ```
//! use lattice_views_core::prelude::*;
//! use lattice_views_storage::prelude::*;
//!
//! let mut cube = Array3::fill(PointN([4, 4, 4]), 0i32);
//! cube.set(PointN([1, 2, 3]), 7);
//! cube.add(PointN([1, 2, 3]), 1);
//!
//! assert_eq!(cube.get(PointN([1, 2, 3])), 8);
//! assert!(cube.is_valid(PointN([3, 3, 3])));
//! assert!(!cube.is_valid(PointN([4, 0, 0])));
//! ```
//!
//! # Resizing
//!
//! Arrays can be resized in place. The overlapping region keeps its samples, new samples are zero. Overlays never cache the
//! shape of their basis, so they stay consistent across a resize.
//!
//! ```
//! # use lattice_views_core::prelude::*;
//! # use lattice_views_storage::prelude::*;
//! let mut image = Array2::fill_with(PointN([3, 3]), |p: Point2i| p.x() + 10 * p.y());
//! image.resize(PointN([2, 4])).unwrap();
//!
//! assert_eq!(image.get(PointN([1, 2])), 21);
//! assert_eq!(image.get(PointN([1, 3])), 0);
//! ```

mod coords;
mod indexer;

pub use coords::*;
pub use indexer::*;

use crate::{
    error::components, IndexedStore, IndexedStoreMut, IntoRawBytes, NewInstance, OverlayError,
    Parallelism, Resizable, Sample,
};

use core::hash::{Hash, Hasher};
use lattice_views_core::prelude::*;

/// A map from lattice point `P` to sample `T`, stored as a flat array on the heap.
#[derive(Clone, Debug)]
pub struct ArrayN<P, T> {
    values: Vec<T>,
    shape: P,
    parallelism: Option<Parallelism>,
}

/// A 1-dimensional `ArrayN`, e.g. a sample vector.
pub type Array1<T> = ArrayN<Point1i, T>;
/// A 2-dimensional `ArrayN`, e.g. an image.
pub type Array2<T> = ArrayN<Point2i, T>;
/// A 3-dimensional `ArrayN`, e.g. a cube.
pub type Array3<T> = ArrayN<Point3i, T>;
/// A `D`-dimensional `ArrayN`.
pub type ArrayNd<T, const D: usize> = ArrayN<PointNi<D>, T>;

impl<P, T> ArrayN<P, T>
where
    P: IntegerPoint,
{
    /// Create a new `ArrayN` directly from the shape and values. Fails unless the number of points in `shape` matches the
    /// length of `values`.
    pub fn new(shape: P, values: Vec<T>) -> Result<Self, OverlayError> {
        check_shape(&shape)?;
        if shape.volume() != values.len() {
            return Err(OverlayError::ShapeMismatch {
                expected: components(&shape),
                found: vec![values.len() as i32],
            });
        }

        Ok(Self {
            values,
            shape,
            parallelism: None,
        })
    }

    /// Creates an array that fills the entire `shape` with the same `value`. Negative shape components are treated as zero.
    pub fn fill(shape: P, value: T) -> Self
    where
        T: Clone,
    {
        let shape = shape.join(&P::ZERO);

        Self {
            values: vec![value; shape.volume()],
            shape,
            parallelism: None,
        }
    }

    /// Create a new array for `shape` where each point's value is determined by the `filler` function.
    pub fn fill_with(shape: P, filler: impl FnMut(P) -> T) -> Self {
        let shape = shape.join(&P::ZERO);

        Self {
            values: Extent::from_shape(shape).iter_points().map(filler).collect(),
            shape,
            parallelism: None,
        }
    }

    /// Attach a processing policy that overlays built on this array will copy.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = Some(parallelism);

        self
    }

    pub fn set_parallelism(&mut self, parallelism: Option<Parallelism>) {
        self.parallelism = parallelism;
    }

    #[inline]
    pub fn extent(&self) -> Extent<P> {
        Extent::from_shape(self.shape)
    }

    /// The offset of `p`, or `None` if it's out of bounds.
    #[inline]
    pub fn stride(&self, p: P) -> Option<Stride> {
        P::checked_stride(self.shape, p)
    }

    #[inline]
    pub fn contains(&self, p: P) -> bool {
        p.is_within(&self.shape)
    }

    /// Returns the entire slice of values.
    #[inline]
    pub fn values_slice(&self) -> &[T] {
        &self.values
    }

    /// Returns the entire slice of values.
    #[inline]
    pub fn values_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Set all points to the same value.
    #[inline]
    pub fn reset_values(&mut self, value: T)
    where
        T: Clone,
    {
        self.values.fill(value);
    }

    /// Moves the raw shape and values storage out of `self`.
    #[inline]
    pub fn into_parts(self) -> (P, Vec<T>) {
        (self.shape, self.values)
    }

    #[inline]
    fn stride_or_panic(&self, p: P) -> usize {
        match self.stride(p) {
            Some(stride) => stride.0,
            None => panic!("index {:?} out of bounds for shape {:?}", p, self.shape),
        }
    }

    /// Change the shape, keeping the samples in the overlapping region and filling new points with `fill`.
    pub fn resize_with_fill(&mut self, shape: P, fill: T) -> Result<(), OverlayError>
    where
        T: Clone,
    {
        check_shape(&shape)?;
        if shape == self.shape {
            return Ok(());
        }

        tracing::debug!(from = ?self.shape, to = ?shape, "resizing array");

        let old_shape = self.shape;
        let old_values = std::mem::replace(&mut self.values, vec![fill; shape.volume()]);
        self.shape = shape;

        let overlap = Extent::from_shape(old_shape).intersection(&Extent::from_shape(shape));
        for p in overlap.iter_points() {
            let src = P::stride_from_local_point(old_shape, p).0;
            let dst = P::stride_from_local_point(shape, p).0;
            self.values[dst] = old_values[src].clone();
        }

        Ok(())
    }
}

fn check_shape<P>(shape: &P) -> Result<(), OverlayError>
where
    P: IntegerPoint,
{
    if shape.join(&P::ZERO) != *shape {
        return Err(OverlayError::InvalidShape(components(shape)));
    }

    Ok(())
}

impl<P, T> IndexedStore for ArrayN<P, T>
where
    P: IntegerPoint,
    T: Sample,
{
    type Index = P;
    type Sample = T;

    #[inline]
    fn get(&self, index: P) -> T {
        self.values[self.stride_or_panic(index)]
    }

    #[inline]
    fn is_valid(&self, index: P) -> bool {
        match self.stride(index) {
            Some(stride) => self.values[stride.0].is_valid_sample(),
            None => false,
        }
    }

    #[inline]
    fn shape(&self) -> P {
        self.shape
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn parallelism(&self) -> Option<Parallelism> {
        self.parallelism.clone()
    }
}

impl<P, T> IndexedStoreMut for ArrayN<P, T>
where
    P: IntegerPoint,
    T: Sample,
{
    #[inline]
    fn set(&mut self, index: P, value: T) {
        let stride = self.stride_or_panic(index);
        self.values[stride] = value;
    }

    #[inline]
    fn add(&mut self, index: P, value: T) {
        let stride = self.stride_or_panic(index);
        self.values[stride] = self.values[stride] + value;
    }

    fn destroy(&mut self) {
        tracing::debug!(shape = ?self.shape, "releasing array storage");
        self.values = Vec::new();
        self.shape = P::ZERO;
    }
}

impl<P, T> Resizable for ArrayN<P, T>
where
    P: IntegerPoint,
    T: Sample,
{
    fn resize(&mut self, shape: P) -> Result<(), OverlayError> {
        self.resize_with_fill(shape, T::zero())
    }
}

impl<P, T> NewInstance for ArrayN<P, T>
where
    P: IntegerPoint,
    T: Sample,
{
    fn new_instance(&self, shape: P) -> Result<Self, OverlayError> {
        check_shape(&shape)?;

        Ok(Self::fill(shape, T::zero()).with_parallelism_opt(self.parallelism.clone()))
    }
}

impl<P, T> ArrayN<P, T> {
    fn with_parallelism_opt(mut self, parallelism: Option<Parallelism>) -> Self {
        self.parallelism = parallelism;

        self
    }
}

// Equality and hashing cover the samples and shape. The processing policy is not part of the data.

impl<P, T> PartialEq for ArrayN<P, T>
where
    P: PartialEq,
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.values == other.values
    }
}

impl<P, T> Eq for ArrayN<P, T>
where
    P: Eq,
    T: Eq,
{
}

impl<P, T> Hash for ArrayN<P, T>
where
    P: Hash,
    T: Sample,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shape.hash(state);
        self.values.len().hash(state);
        for value in self.values.iter() {
            value.hash_sample(state);
        }
    }
}

impl<'a, P, T> IntoRawBytes<'a> for ArrayN<P, T>
where
    T: Sample,
{
    type Output = &'a [u8];

    fn into_raw_bytes(&'a self) -> Self::Output {
        self.values.as_slice().into_raw_bytes()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
