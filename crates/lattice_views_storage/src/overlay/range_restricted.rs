use super::CachedPolicy;
use crate::header::{DescribeHeader, Header, HeaderValue};
use crate::{
    IndexedStore, IndexedStoreMut, NewInstance, OverlayError, Parallelism, Resizable, Sample,
};

use float_ord::FloatOrd;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A closed interval `[min, max]` of sample values.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RangeBounds"))]
pub struct ValueRange {
    min: f64,
    max: f64,
}

/// Unchecked bounds, validated by `ValueRange::new` on the way in.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RangeBounds {
    min: f64,
    max: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RangeBounds> for ValueRange {
    type Error = OverlayError;

    fn try_from(bounds: RangeBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.min, bounds.max)
    }
}

impl ValueRange {
    /// Fails unless `max > min`. NaN bounds are rejected too.
    pub fn new(min: f64, max: f64) -> Result<Self, OverlayError> {
        if !(max > min) {
            tracing::warn!(min, max, "rejected value range");
            return Err(OverlayError::EmptyRange { min, max });
        }

        Ok(Self { min, max })
    }

    /// Every number except NaN.
    pub fn unbounded() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Inclusive at both ends.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl PartialEq for ValueRange {
    fn eq(&self, other: &Self) -> bool {
        FloatOrd(self.min) == FloatOrd(other.min) && FloatOrd(self.max) == FloatOrd(other.max)
    }
}

impl Eq for ValueRange {}

impl Hash for ValueRange {
    fn hash<H: Hasher>(&self, state: &mut H) {
        FloatOrd(self.min).hash(state);
        FloatOrd(self.max).hash(state);
    }
}

/// Masks out samples whose value falls outside of a `ValueRange`.
///
/// An index is valid iff the basis says it is valid and its current sample lies in the range. Restricting can only ever make
/// fewer indices valid. Everything else passes through to the basis.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RangeRestricted<B> {
    basis: B,
    range: ValueRange,
    policy: CachedPolicy,
}

impl<B> RangeRestricted<B>
where
    B: IndexedStore,
{
    pub fn new(basis: B, range: ValueRange) -> Self {
        Self {
            policy: CachedPolicy::of(&basis),
            basis,
            range,
        }
    }

    #[inline]
    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn set_range(&mut self, range: ValueRange) {
        self.range = range;
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
        tracing::debug!("rebinding range restricted basis");

        std::mem::replace(&mut self.basis, basis)
    }

    #[inline]
    pub fn into_basis(self) -> B {
        self.basis
    }
}

impl<B> IndexedStore for RangeRestricted<B>
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
        // The basis must vouch for the index before it is read.
        self.basis.is_valid(index) && self.range.contains(self.basis.get(index).as_f64())
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

impl<B> IndexedStoreMut for RangeRestricted<B>
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

impl<B> Resizable for RangeRestricted<B>
where
    B: Resizable,
{
    fn resize(&mut self, shape: Self::Index) -> Result<(), OverlayError> {
        self.basis.resize(shape)
    }
}

impl<B> NewInstance for RangeRestricted<B>
where
    B: NewInstance,
{
    fn new_instance(&self, shape: Self::Index) -> Result<Self, OverlayError> {
        Ok(Self {
            basis: self.basis.new_instance(shape)?,
            range: self.range,
            policy: self.policy.clone(),
        })
    }
}

impl<B> DescribeHeader for RangeRestricted<B>
where
    B: IndexedStore,
{
    fn describe_into(&self, header: &mut dyn Header) {
        header.put("RNGMIN", HeaderValue::Real(self.range.min));
        header.put("RNGMAX", HeaderValue::Real(self.range.max));
    }

    fn configure_from(&mut self, header: &dyn Header) -> Result<(), OverlayError> {
        let min = header.real("RNGMIN")?.unwrap_or(self.range.min);
        let max = header.real("RNGMAX")?.unwrap_or(self.range.max);
        self.range = ValueRange::new(min, max)?;

        Ok(())
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
    fn empty_ranges_are_rejected() {
        assert_eq!(
            ValueRange::new(1.0, 1.0),
            Err(OverlayError::EmptyRange { min: 1.0, max: 1.0 })
        );
        assert!(ValueRange::new(2.0, -2.0).is_err());
        assert!(ValueRange::new(f64::NAN, 1.0).is_err());
        assert!(ValueRange::new(-1e-9, 0.0).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_ranges_are_validated() {
        let range = ValueRange::new(-1.0, 3.5).unwrap();
        let bytes = bincode::serialize(&range).unwrap();
        assert_eq!(bincode::deserialize::<ValueRange>(&bytes).unwrap(), range);

        let empty = bincode::serialize(&(2.0f64, 2.0f64)).unwrap();
        assert!(bincode::deserialize::<ValueRange>(&empty).is_err());
        let nan = bincode::serialize(&(f64::NAN, 1.0f64)).unwrap();
        assert!(bincode::deserialize::<ValueRange>(&nan).is_err());
    }

    #[test]
    fn containment_is_inclusive() {
        let range = ValueRange::new(0.0, 10.0).unwrap();

        assert!(range.contains(0.0));
        assert!(range.contains(10.0));
        assert!(!range.contains(10.000001));
        assert!(!range.contains(f64::NAN));
        assert!(ValueRange::unbounded().contains(f64::MAX));
    }

    #[test]
    fn restriction_never_loosens_validity() {
        let mut samples = Array1::fill_with(PointN([25]), |p: Point1i| p.x() as f32 - 5.0);
        samples.set(PointN([7]), f32::NAN);
        let restricted = RangeRestricted::new(&samples, ValueRange::new(0.0, 10.0).unwrap());

        for p in samples.full_extent().iter_points() {
            let value = samples.get(p) as f64;
            let expected = samples.is_valid(p) && (0.0..=10.0).contains(&value);
            assert_eq!(restricted.is_valid(p), expected, "at {:?}", p);
            if restricted.is_valid(p) {
                assert!(samples.is_valid(p));
            }
        }
        assert!(!restricted.is_valid(PointN([25])));
        assert!(!restricted.is_valid(PointN([-1])));
    }

    #[test]
    fn validity_tracks_the_current_value() {
        let mut samples = Array1::fill(PointN([3]), 5i16);
        let mut restricted = RangeRestricted::new(&mut samples, ValueRange::new(0.0, 10.0).unwrap());

        assert!(restricted.is_valid(PointN([1])));
        restricted.add(PointN([1]), 6);
        assert!(!restricted.is_valid(PointN([1])));
        restricted.set_range(ValueRange::new(0.0, 20.0).unwrap());
        assert!(restricted.is_valid(PointN([1])));
    }

    #[test]
    fn copies_have_independent_ranges() {
        let samples = Array1::fill(PointN([3]), 5i16);
        let restricted = RangeRestricted::new(samples, ValueRange::new(0.0, 10.0).unwrap());

        let mut fresh = restricted.new_instance(PointN([4])).unwrap();
        fresh.set_range(ValueRange::new(6.0, 7.0).unwrap());

        assert_eq!(restricted.range(), ValueRange::new(0.0, 10.0).unwrap());
        assert_eq!(fresh.shape(), PointN([4]));
        assert!(!fresh.is_valid(PointN([0])));
    }

    #[test]
    fn header_configures_bounds() {
        let samples = Array1::fill(PointN([3]), 5u8);
        let mut restricted = RangeRestricted::new(&samples, ValueRange::unbounded());

        let mut header: SmallKeyHashMap<String, HeaderValue> = SmallKeyHashMap::default();
        header.put("RNGMIN", HeaderValue::Integer(6));
        header.put("RNGMAX", HeaderValue::Real(8.5));
        restricted.configure_from(&header).unwrap();
        assert_eq!(restricted.range(), ValueRange::new(6.0, 8.5).unwrap());
        assert!(!restricted.is_valid(PointN([0])));

        header.put("RNGMAX", HeaderValue::Real(1.0));
        assert!(restricted.configure_from(&header).is_err());
        assert_eq!(restricted.range().max(), 8.5);
    }
}
