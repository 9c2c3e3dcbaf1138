use super::CachedPolicy;
use crate::header::{index_component, DescribeHeader, Header, HeaderValue};
use crate::{
    error::components, IndexedStore, IndexedStoreMut, NewInstance, OverlayError, Parallelism,
    Resizable,
};

use lattice_views_core::num::Zero;
use lattice_views_core::prelude::*;

/// A rectangular window onto a basis.
///
/// Local index `i` maps to basis index `i + origin`. The window exposes `declared_size` points along each axis, clamped on
/// every query to what the basis currently holds past the origin, so it shrinks (possibly to nothing) when the basis does and
/// grows back when the basis is resized again.
///
/// Outside of the effective window, reads return zero, indices are invalid and writes do nothing.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Viewport<B>
where
    B: IndexedStore,
{
    basis: B,
    origin: B::Index,
    declared_size: B::Index,
    policy: CachedPolicy,
}

impl<B> Viewport<B>
where
    B: IndexedStore,
{
    /// A window over the half-open box `[from, to)` of the basis. Negative components of `from` are clamped to zero, and a box
    /// with `to <= from` on any axis is empty.
    pub fn new(basis: B, from: B::Index, to: B::Index) -> Self {
        let mut viewport = Self::full(basis);
        viewport.set_bounds(from, to);

        viewport
    }

    pub fn with_origin_and_size(basis: B, origin: B::Index, size: B::Index) -> Self {
        let mut viewport = Self::full(basis);
        viewport.set_origin(origin);
        viewport.set_size(size);

        viewport
    }

    /// A window over everything the basis holds right now.
    pub fn full(basis: B) -> Self {
        Self {
            origin: B::Index::ZERO,
            declared_size: basis.shape(),
            policy: CachedPolicy::of(&basis),
            basis,
        }
    }

    pub fn set_bounds(&mut self, from: B::Index, to: B::Index) {
        self.origin = from.join(&B::Index::ZERO);
        self.declared_size = (to - self.origin).join(&B::Index::ZERO);
    }

    pub fn set_origin(&mut self, origin: B::Index) {
        self.origin = origin.join(&B::Index::ZERO);
    }

    /// Negative components are clamped to zero.
    pub fn set_size(&mut self, size: B::Index) {
        self.declared_size = size.join(&B::Index::ZERO);
    }

    /// Translate the window by `delta`, keeping its declared size.
    pub fn move_by(&mut self, delta: B::Index) {
        self.set_origin(self.origin + delta);
    }

    #[inline]
    pub fn origin(&self) -> B::Index {
        self.origin
    }

    #[inline]
    pub fn declared_size(&self) -> B::Index {
        self.declared_size
    }

    /// The effective window, in basis coordinates.
    pub fn bounds(&self) -> Extent<B::Index> {
        Extent::from_min_and_shape(self.origin, self.shape())
    }

    /// The basis index for local `index`, or `None` if it is outside of the effective window.
    #[inline]
    pub fn to_basis(&self, index: B::Index) -> Option<B::Index> {
        if index.is_within(&self.shape()) {
            Some(index + self.origin)
        } else {
            None
        }
    }

    #[inline]
    pub fn basis(&self) -> &B {
        &self.basis
    }

    #[inline]
    pub fn basis_mut(&mut self) -> &mut B {
        &mut self.basis
    }

    /// Rebind to `basis`, keeping the window's origin and declared size. Returns the previous basis.
    pub fn set_basis(&mut self, basis: B) -> B {
        tracing::debug!(origin = ?self.origin, "rebinding viewport basis");

        std::mem::replace(&mut self.basis, basis)
    }

    #[inline]
    pub fn into_basis(self) -> B {
        self.basis
    }
}

impl<B> IndexedStore for Viewport<B>
where
    B: IndexedStore,
{
    type Index = B::Index;
    type Sample = B::Sample;

    #[inline]
    fn get(&self, index: Self::Index) -> Self::Sample {
        match self.to_basis(index) {
            Some(i) => self.basis.get(i),
            None => Self::Sample::zero(),
        }
    }

    #[inline]
    fn is_valid(&self, index: Self::Index) -> bool {
        self.to_basis(index)
            .map_or(false, |i| self.basis.is_valid(i))
    }

    #[inline]
    fn shape(&self) -> Self::Index {
        let available = self.basis.shape() - self.origin;

        self.declared_size.meet(&available).join(&B::Index::ZERO)
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

impl<B> IndexedStoreMut for Viewport<B>
where
    B: IndexedStoreMut,
{
    #[inline]
    fn set(&mut self, index: Self::Index, value: Self::Sample) {
        if let Some(i) = self.to_basis(index) {
            self.basis.set(i, value)
        }
    }

    #[inline]
    fn add(&mut self, index: Self::Index, value: Self::Sample) {
        if let Some(i) = self.to_basis(index) {
            self.basis.add(i, value)
        }
    }

    #[inline]
    fn clear(&mut self, index: Self::Index) {
        if let Some(i) = self.to_basis(index) {
            self.basis.clear(i)
        }
    }

    #[inline]
    fn discard(&mut self, index: Self::Index) {
        if let Some(i) = self.to_basis(index) {
            self.basis.discard(i)
        }
    }

    fn destroy(&mut self) {
        self.basis.destroy()
    }
}

impl<B> Resizable for Viewport<B>
where
    B: IndexedStore,
{
    /// Changes the declared size of the window. The basis is untouched.
    fn resize(&mut self, shape: Self::Index) -> Result<(), OverlayError> {
        if shape.join(&B::Index::ZERO) != shape {
            return Err(OverlayError::InvalidShape(components(&shape)));
        }
        tracing::debug!(from = ?self.declared_size, to = ?shape, "resizing viewport");
        self.declared_size = shape;

        Ok(())
    }
}

impl<B> NewInstance for Viewport<B>
where
    B: NewInstance,
{
    /// A full window over a new basis of `shape`.
    fn new_instance(&self, shape: Self::Index) -> Result<Self, OverlayError> {
        let mut fresh = Self::full(self.basis.new_instance(shape)?);
        fresh.policy = self.policy.clone();

        Ok(fresh)
    }
}

impl<B> DescribeHeader for Viewport<B>
where
    B: IndexedStore,
{
    fn describe_into(&self, header: &mut dyn Header) {
        for axis in 0..B::Index::DIM {
            header.put(
                &origin_key(axis),
                HeaderValue::Integer(self.origin.at(axis) as i64),
            );
            header.put(
                &size_key(axis),
                HeaderValue::Integer(self.declared_size.at(axis) as i64),
            );
        }
    }

    fn configure_from(&mut self, header: &dyn Header) -> Result<(), OverlayError> {
        let mut origin = self.origin;
        let mut size = self.declared_size;
        for axis in 0..B::Index::DIM {
            if let Some(c) = index_component(header, &origin_key(axis))? {
                origin = origin.with_component(axis, c);
            }
            if let Some(c) = index_component(header, &size_key(axis))? {
                size = size.with_component(axis, c);
            }
        }
        self.set_origin(origin);
        self.set_size(size);

        Ok(())
    }
}

fn origin_key(axis: usize) -> String {
    format!("VPORIG{}", axis + 1)
}

fn size_key(axis: usize) -> String {
    format!("VPSIZE{}", axis + 1)
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
