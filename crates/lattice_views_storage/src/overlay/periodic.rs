use super::CachedPolicy;
use crate::{IndexedStore, IndexedStoreMut, NewInstance, OverlayError, Parallelism, Resizable};

use lattice_views_core::num::Zero;
use lattice_views_core::prelude::*;
use lattice_views_core::{wrap_coordinate, wrap_index};

/// The size a `Periodic` overlay reports along every axis.
pub const UNBOUNDED: i32 = i32::MAX;

/// Returns `true` iff `shape` is unbounded along some axis.
#[inline]
pub fn is_unbounded<P>(shape: P) -> bool
where
    P: IntegerPoint,
{
    (0..P::DIM).any(|axis| shape.at(axis) == UNBOUNDED)
}

/// Tiles the basis infinitely along every axis.
///
/// Every index is wrapped into the basis extent before it is delegated, so `get(i)` is `basis.get(i mod shape)` with the
/// remainder taken in `[0, shape)`. The period along an axis is the basis extent along that axis at the time of the call. If
/// the basis is empty along any axis, every index is invalid, reads return zero and writes do nothing.
///
/// ```
/// use lattice_views_core::prelude::*;
/// use lattice_views_storage::prelude::*;
///
/// let ring = Array1::fill_with(PointN([5]), |p: Point1i| p.x() as f32);
/// let tiled = Periodic::new(&ring);
///
/// assert_eq!(tiled.get(PointN([-1])), 4.0);
/// assert_eq!(tiled.get(PointN([7])), 2.0);
/// assert_eq!(tiled.get_continuous(PointN([-0.5])), 4.0);
/// assert_eq!(tiled.size(0), UNBOUNDED);
/// assert_eq!(tiled.period(0), 5);
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Periodic<B> {
    basis: B,
    policy: CachedPolicy,
}

type FloatIndex<B> = <<B as IndexedStore>::Index as IntegerPoint>::Float;

impl<B> Periodic<B>
where
    B: IndexedStore,
{
    pub fn new(basis: B) -> Self {
        Self {
            policy: CachedPolicy::of(&basis),
            basis,
        }
    }

    /// The true extent of the basis along `axis`.
    #[inline]
    pub fn period(&self, axis: usize) -> i32 {
        self.basis.size(axis)
    }

    /// The basis index that `index` maps to, or `None` if the basis is empty.
    #[inline]
    pub fn wrap(&self, index: B::Index) -> Option<B::Index> {
        let periods = self.basis.shape();
        if periods.volume() == 0 {
            return None;
        }

        Some(index.map_components_binary(&periods, wrap_index))
    }

    /// Wraps continuous `coords` into `[0, period)` on every axis, or `None` if the basis is empty.
    #[inline]
    pub fn wrap_continuous(&self, coords: FloatIndex<B>) -> Option<FloatIndex<B>> {
        let periods = self.basis.shape();
        if periods.volume() == 0 {
            return None;
        }

        Some(coords.map_components_binary(&periods.to_float(), wrap_coordinate))
    }

    /// The sample of the cell containing `coords`, after wrapping.
    pub fn get_continuous(&self, coords: FloatIndex<B>) -> B::Sample {
        match self.continuous_to_basis(coords) {
            Some(i) => self.basis.get(i),
            None => B::Sample::zero(),
        }
    }

    pub fn is_valid_continuous(&self, coords: FloatIndex<B>) -> bool {
        self.continuous_to_basis(coords)
            .map_or(false, |i| self.basis.is_valid(i))
    }

    fn continuous_to_basis(&self, coords: FloatIndex<B>) -> Option<B::Index> {
        // Flooring a coordinate just below a period boundary can land on the period itself.
        self.wrap_continuous(coords)
            .and_then(|wrapped| self.wrap(wrapped.floor_to_integer()))
    }

    #[inline]
    pub fn basis(&self) -> &B {
        &self.basis
    }

    #[inline]
    pub fn basis_mut(&mut self) -> &mut B {
        &mut self.basis
    }

    pub fn set_basis(&mut self, basis: B) -> B {
        tracing::debug!("rebinding periodic basis");

        std::mem::replace(&mut self.basis, basis)
    }

    #[inline]
    pub fn into_basis(self) -> B {
        self.basis
    }
}

impl<B> IndexedStore for Periodic<B>
where
    B: IndexedStore,
{
    type Index = B::Index;
    type Sample = B::Sample;

    #[inline]
    fn get(&self, index: Self::Index) -> Self::Sample {
        match self.wrap(index) {
            Some(i) => self.basis.get(i),
            None => Self::Sample::zero(),
        }
    }

    #[inline]
    fn is_valid(&self, index: Self::Index) -> bool {
        self.wrap(index).map_or(false, |i| self.basis.is_valid(i))
    }

    #[inline]
    fn shape(&self) -> Self::Index {
        B::Index::fill(UNBOUNDED)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.basis.capacity()
    }

    #[inline]
    fn parallelism(&self) -> Option<Parallelism> {
        self.policy.get()
    }
}

impl<B> IndexedStoreMut for Periodic<B>
where
    B: IndexedStoreMut,
{
    #[inline]
    fn set(&mut self, index: Self::Index, value: Self::Sample) {
        if let Some(i) = self.wrap(index) {
            self.basis.set(i, value)
        }
    }

    #[inline]
    fn add(&mut self, index: Self::Index, value: Self::Sample) {
        if let Some(i) = self.wrap(index) {
            self.basis.add(i, value)
        }
    }

    #[inline]
    fn clear(&mut self, index: Self::Index) {
        if let Some(i) = self.wrap(index) {
            self.basis.clear(i)
        }
    }

    #[inline]
    fn discard(&mut self, index: Self::Index) {
        if let Some(i) = self.wrap(index) {
            self.basis.discard(i)
        }
    }

    fn destroy(&mut self) {
        self.basis.destroy()
    }
}

impl<B> Resizable for Periodic<B>
where
    B: IndexedStore,
{
    /// A periodic view has no finite shape to change. Resize the basis instead.
    fn resize(&mut self, _shape: Self::Index) -> Result<(), OverlayError> {
        Err(OverlayError::Unsupported {
            operation: "resize",
            view: "Periodic",
        })
    }
}

impl<B> NewInstance for Periodic<B>
where
    B: NewInstance,
{
    /// Tiles a new basis of `shape`, which becomes the period.
    fn new_instance(&self, shape: Self::Index) -> Result<Self, OverlayError> {
        Ok(Self {
            basis: self.basis.new_instance(shape)?,
            policy: self.policy.clone(),
        })
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
