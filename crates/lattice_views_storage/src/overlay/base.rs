use super::CachedPolicy;
use crate::{IndexedStore, IndexedStoreMut, NewInstance, OverlayError, Parallelism, Resizable};

/// An overlay that changes nothing. Every operation goes straight to the basis at the same index.
///
/// Useful as a neutral element in generic code that always wraps its input, and as the simplest example of the overlay shape.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Overlay<B> {
    basis: B,
    policy: CachedPolicy,
}

impl<B> Overlay<B>
where
    B: IndexedStore,
{
    pub fn new(basis: B) -> Self {
        Self {
            policy: CachedPolicy::of(&basis),
            basis,
        }
    }
}

impl<B> Overlay<B> {
    #[inline]
    pub fn basis(&self) -> &B {
        &self.basis
    }

    #[inline]
    pub fn basis_mut(&mut self) -> &mut B {
        &mut self.basis
    }

    /// Rebind to `basis`, returning the previous one.
    pub fn set_basis(&mut self, basis: B) -> B {
        tracing::debug!("rebinding overlay basis");

        std::mem::replace(&mut self.basis, basis)
    }

    #[inline]
    pub fn into_basis(self) -> B {
        self.basis
    }
}

impl<B> IndexedStore for Overlay<B>
where
    B: IndexedStore,
{
    type Index = B::Index;
    type Sample = B::Sample;

    #[inline]
    fn get(&self, index: Self::Index) -> Self::Sample {
        self.basis.get(index)
    }

    #[inline]
    fn is_valid(&self, index: Self::Index) -> bool {
        self.basis.is_valid(index)
    }

    #[inline]
    fn shape(&self) -> Self::Index {
        self.basis.shape()
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

impl<B> IndexedStoreMut for Overlay<B>
where
    B: IndexedStoreMut,
{
    #[inline]
    fn set(&mut self, index: Self::Index, value: Self::Sample) {
        self.basis.set(index, value)
    }

    #[inline]
    fn add(&mut self, index: Self::Index, value: Self::Sample) {
        self.basis.add(index, value)
    }

    #[inline]
    fn clear(&mut self, index: Self::Index) {
        self.basis.clear(index)
    }

    #[inline]
    fn discard(&mut self, index: Self::Index) {
        self.basis.discard(index)
    }

    fn destroy(&mut self) {
        self.basis.destroy()
    }
}

impl<B> Resizable for Overlay<B>
where
    B: Resizable,
{
    fn resize(&mut self, shape: Self::Index) -> Result<(), OverlayError> {
        self.basis.resize(shape)
    }
}

impl<B> NewInstance for Overlay<B>
where
    B: NewInstance,
{
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
