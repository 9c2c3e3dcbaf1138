//! Quality flags layered over a basis.
//!
//! `Flagged` keeps one `FlagBits` word per index of the basis, in an `ArrayN` of the same shape. An index is valid iff the basis
//! says so and none of its flags intersect the validating mask. Writing a sample through the overlay clears that index's
//! flags, `discard` zeroes the sample and sets `DISCARD`.
//!
//! # Bulk Operations
//!
//! `flag_all`, `unflag_all`, `flag_where` and `try_update_flags` visit every index whose basis sample is valid. `count_flags`
//! reads every flag cell, so it matches `is_flagged` summed over the whole index space. All of them partition the flag array into contiguous chunks and run the chunks on the overlay's `Parallelism` policy. Each chunk
//! writes only its own flag cells and reads the basis, so the basis must be `Sync`.
//!
//! ```
//! use lattice_views_core::prelude::*;
//! use lattice_views_storage::prelude::*;
//!
//! const SATURATED: FlagBits = FIRST_USER_FLAG;
//!
//! let image = Array2::fill_with(PointN([64, 64]), |p: Point2i| (p.x() * p.y()) as u8);
//! let mut flagged = Flagged::new(&image).unwrap();
//! flagged.set_parallelism(Parallelism::with_threads(4));
//!
//! let saturated = flagged.flag_where(SATURATED, |_p, value| value == u8::MAX).unwrap();
//! assert_eq!(flagged.count_flags(SATURATED).unwrap(), saturated);
//! ```
//!
//! If a chunk fails or panics, sibling chunks are interrupted and every failure is returned in one `OverlayError::Parallel`.
//! Flags already written by other chunks are kept.

use super::{is_unbounded, CachedPolicy, ValueRange};
use crate::header::{header_type, DescribeHeader, Header, HeaderValue};
use crate::{
    any_set, error::components, ArrayIndexer, ArrayN, ChunkError, FlagBits, IndexedStore,
    IndexedStoreMut, NewInstance, OverlayError, Parallelism, Resizable, Sample, Stride, ALL_FLAGS,
    DISCARD, NO_FLAGS,
};

use lattice_views_core::prelude::*;

/// An overlay that adds per-index quality flags to a basis.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Flagged<B>
where
    B: IndexedStore,
{
    basis: B,
    flags: ArrayN<B::Index, FlagBits>,
    validating_mask: FlagBits,
    policy: CachedPolicy,
}

impl<B> Flagged<B>
where
    B: IndexedStore,
{
    /// Flags every index of `basis`, all initially clear. Fails if the basis is unbounded.
    pub fn new(basis: B) -> Result<Self, OverlayError> {
        check_bounded(&basis)?;
        let flags = ArrayN::fill(basis.shape(), NO_FLAGS);

        Ok(Self::from_parts(basis, flags))
    }

    /// Use an existing flag array, which must have the same shape as `basis`.
    pub fn with_flags(basis: B, flags: ArrayN<B::Index, FlagBits>) -> Result<Self, OverlayError> {
        check_bounded(&basis)?;
        check_same_shape(basis.shape(), flags.shape())?;

        Ok(Self::from_parts(basis, flags))
    }

    fn from_parts(basis: B, flags: ArrayN<B::Index, FlagBits>) -> Self {
        Self {
            policy: CachedPolicy::of(&basis).or_default(),
            basis,
            flags,
            validating_mask: ALL_FLAGS,
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

    /// Rebind to `basis`, returning the previous one. The new basis must have the same shape as the flag array.
    pub fn set_basis(&mut self, basis: B) -> Result<B, OverlayError> {
        check_same_shape(basis.shape(), self.flags.shape())?;
        tracing::debug!(shape = ?self.flags.shape(), "rebinding flagged basis");

        Ok(std::mem::replace(&mut self.basis, basis))
    }

    #[inline]
    pub fn into_parts(self) -> (B, ArrayN<B::Index, FlagBits>) {
        (self.basis, self.flags)
    }

    #[inline]
    pub fn flag_array(&self) -> &ArrayN<B::Index, FlagBits> {
        &self.flags
    }

    /// Indices with any of these bits set are invalid.
    #[inline]
    pub fn validating_mask(&self) -> FlagBits {
        self.validating_mask
    }

    pub fn set_validating_mask(&mut self, mask: FlagBits) {
        self.validating_mask = mask;
    }

    /// The policy bulk operations run with.
    pub fn parallelism_policy(&self) -> Parallelism {
        self.policy.executor()
    }

    pub fn set_parallelism(&mut self, policy: Parallelism) {
        self.policy.set(Some(policy));
    }

    /// The flags of `index`. Indices outside of the flag array have none.
    #[inline]
    pub fn flags_at(&self, index: B::Index) -> FlagBits {
        self.flags
            .stride(index)
            .map_or(NO_FLAGS, |s| self.flags.values_slice()[s.0])
    }

    /// Overwrite the flags of `index`. Does nothing outside of the flag array.
    #[inline]
    pub fn set_flags_at(&mut self, index: B::Index, bits: FlagBits) {
        if let Some(s) = self.flags.stride(index) {
            self.flags.values_mut_slice()[s.0] = bits;
        }
    }

    #[inline]
    pub fn flag(&mut self, index: B::Index, pattern: FlagBits) {
        self.set_flags_at(index, self.flags_at(index) | pattern);
    }

    #[inline]
    pub fn unflag(&mut self, index: B::Index, pattern: FlagBits) {
        self.set_flags_at(index, self.flags_at(index) & !pattern);
    }

    /// Returns `true` iff any bit of `pattern` is set at `index`.
    #[inline]
    pub fn is_flagged(&self, index: B::Index, pattern: FlagBits) -> bool {
        any_set(self.flags_at(index), pattern)
    }

    /// Returns `true` iff no bit of `pattern` is set at `index`.
    #[inline]
    pub fn is_unflagged(&self, index: B::Index, pattern: FlagBits) -> bool {
        !self.is_flagged(index, pattern)
    }

    /// Remove every flag of every index, including indices the basis considers invalid.
    pub fn clear_all_flags(&mut self) {
        self.flags.reset_values(NO_FLAGS);
    }
}

impl<B> Flagged<B>
where
    B: IndexedStore + Sync,
{
    /// Set `pattern` on every index with a valid basis sample.
    pub fn flag_all(&mut self, pattern: FlagBits) -> Result<(), OverlayError> {
        self.bulk_update("flag_all", |_, _, bits| {
            *bits |= pattern;
            Ok(true)
        })
        .map(|_| ())
    }

    /// Remove `pattern` from every index with a valid basis sample.
    pub fn unflag_all(&mut self, pattern: FlagBits) -> Result<(), OverlayError> {
        self.bulk_update("unflag_all", |_, _, bits| {
            *bits &= !pattern;
            Ok(true)
        })
        .map(|_| ())
    }

    /// Set `pattern` on every index with a valid basis sample for which `predicate` holds. Returns how many indices matched.
    pub fn flag_where<F>(&mut self, pattern: FlagBits, predicate: F) -> Result<usize, OverlayError>
    where
        F: Fn(B::Index, B::Sample) -> bool + Sync,
    {
        self.bulk_update("flag_where", |index, value, bits| {
            let matched = predicate(index, value);
            if matched {
                *bits |= pattern;
            }
            Ok(matched)
        })
    }

    /// Set `pattern` on every index whose valid sample lies outside of `range`. Returns how many indices were flagged.
    pub fn flag_out_of_range(
        &mut self,
        range: ValueRange,
        pattern: FlagBits,
    ) -> Result<usize, OverlayError> {
        self.flag_where(pattern, |_, value| !range.contains(value.as_f64()))
    }

    /// Run a fallible `task` on the flags of every index with a valid basis sample.
    ///
    /// The first error stops its chunk and interrupts the others. All errors come back together as `OverlayError::Parallel`,
    /// with the stride of the index that failed.
    pub fn try_update_flags<F>(&mut self, task: F) -> Result<(), OverlayError>
    where
        F: Fn(B::Index, B::Sample, &mut FlagBits) -> Result<(), String> + Sync,
    {
        self.bulk_update("try_update_flags", |index, value, bits| {
            task(index, value, bits).map(|_| true)
        })
        .map(|_| ())
    }

    /// The number of flag cells with any bit of `pattern` set. Agrees with testing `is_flagged` at every index.
    pub fn count_flags(&self, pattern: FlagBits) -> Result<usize, OverlayError> {
        let executor = self.policy.executor();
        let cells = self.flags.values_slice();
        let span = tracing::debug_span!(
            "bulk_flags",
            op = "count_flags",
            chunks = executor.num_chunks(cells.len()),
            threads = executor.threads()
        );
        let _enter = span.enter();

        let partial_counts = executor.for_each_range(cells.len(), |ctx, range| {
            let mut count = 0;
            for stride in range {
                ctx.advance(stride)?;
                if any_set(cells[stride], pattern) {
                    count += 1;
                }
            }
            Ok(count)
        })?;

        Ok(partial_counts.into_iter().sum())
    }

    /// Runs `task` on every flag cell whose basis sample is valid, one chunk per task, and sums how many calls returned `true`.
    fn bulk_update<F>(&mut self, op: &'static str, task: F) -> Result<usize, OverlayError>
    where
        F: Fn(B::Index, B::Sample, &mut FlagBits) -> Result<bool, String> + Sync,
    {
        let Self {
            basis,
            flags,
            policy,
            ..
        } = self;
        let basis = &*basis;
        let executor = policy.executor();
        let shape = flags.shape();
        let cells = flags.values_mut_slice();
        let span = tracing::debug_span!(
            "bulk_flags",
            op,
            chunks = executor.num_chunks(cells.len()),
            threads = executor.threads()
        );
        let _enter = span.enter();

        let partial_counts = executor.for_each_chunk_mut(cells, |ctx, chunk| {
            let mut count = 0;
            for (i, bits) in chunk.iter_mut().enumerate() {
                let stride = ctx.offset + i;
                ctx.advance(stride)?;
                let index = B::Index::local_point_from_stride(shape, Stride(stride));
                if !basis.is_valid(index) {
                    continue;
                }
                let hit = task(index, basis.get(index), bits)
                    .map_err(|reason| ChunkError::Failed { stride, reason })?;
                if hit {
                    count += 1;
                }
            }
            Ok(count)
        })?;

        Ok(partial_counts.into_iter().sum())
    }
}

fn check_bounded<B>(basis: &B) -> Result<(), OverlayError>
where
    B: IndexedStore,
{
    if is_unbounded(basis.shape()) {
        tracing::warn!("rejected flags for an unbounded basis");
        return Err(OverlayError::UnboundedBasis);
    }

    Ok(())
}

fn check_same_shape<P>(expected: P, found: P) -> Result<(), OverlayError>
where
    P: IntegerPoint,
{
    if expected != found {
        tracing::warn!(?expected, ?found, "rejected flag array shape");
        return Err(OverlayError::ShapeMismatch {
            expected: components(&expected),
            found: components(&found),
        });
    }

    Ok(())
}

impl<B> IndexedStore for Flagged<B>
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
        !self.is_flagged(index, self.validating_mask) && self.basis.is_valid(index)
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

impl<B> IndexedStoreMut for Flagged<B>
where
    B: IndexedStoreMut,
{
    #[inline]
    fn set(&mut self, index: Self::Index, value: Self::Sample) {
        self.basis.set(index, value);
        self.set_flags_at(index, NO_FLAGS);
    }

    #[inline]
    fn add(&mut self, index: Self::Index, value: Self::Sample) {
        self.basis.add(index, value);
        self.set_flags_at(index, NO_FLAGS);
    }

    #[inline]
    fn clear(&mut self, index: Self::Index) {
        self.basis.clear(index);
        self.set_flags_at(index, NO_FLAGS);
    }

    #[inline]
    fn discard(&mut self, index: Self::Index) {
        self.basis.clear(index);
        self.flag(index, DISCARD);
    }

    fn destroy(&mut self) {
        self.flags.destroy();
        self.basis.destroy();
    }
}

impl<B> Resizable for Flagged<B>
where
    B: Resizable,
{
    /// Resizes the basis and the flag array together. Flags in the overlapping region are kept.
    fn resize(&mut self, shape: Self::Index) -> Result<(), OverlayError> {
        self.basis.resize(shape)?;
        tracing::debug!(to = ?shape, "resizing flag array");
        self.flags.resize(shape)
    }
}

impl<B> NewInstance for Flagged<B>
where
    B: NewInstance,
{
    /// A new basis of `shape` with clear flags, the same validating mask and the same policy.
    fn new_instance(&self, shape: Self::Index) -> Result<Self, OverlayError> {
        let basis = self.basis.new_instance(shape)?;
        check_bounded(&basis)?;

        Ok(Self {
            flags: ArrayN::fill(basis.shape(), NO_FLAGS),
            basis,
            validating_mask: self.validating_mask,
            policy: self.policy.clone(),
        })
    }
}

impl<B> DescribeHeader for Flagged<B>
where
    B: IndexedStore,
{
    fn describe_into(&self, header: &mut dyn Header) {
        header.put(
            "FLAGMASK",
            HeaderValue::Integer(self.validating_mask as i64),
        );
    }

    fn configure_from(&mut self, header: &dyn Header) -> Result<(), OverlayError> {
        match header.value("FLAGMASK") {
            None => {}
            Some(HeaderValue::Integer(mask)) => self.validating_mask = mask as FlagBits,
            Some(HeaderValue::Real(_)) => return Err(header_type("FLAGMASK")),
        }

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

    use pretty_assertions::assert_eq;

    const BAD: FlagBits = FIRST_USER_FLAG;
    const SUSPECT: FlagBits = FIRST_USER_FLAG << 1;

    fn policies() -> Vec<Parallelism> {
        vec![
            Parallelism::sequential(),
            Parallelism::with_threads(3),
            Parallelism::with_threads(4).chunks(10_000),
        ]
    }

    #[test]
    fn flags_mask_validity() {
        let image = Array2::fill(PointN([4, 4]), 1.0f32);
        let mut flagged = Flagged::new(&image).unwrap();

        flagged.flag(PointN([1, 1]), BAD | SUSPECT);
        assert!(!flagged.is_valid(PointN([1, 1])));
        assert!(flagged.is_flagged(PointN([1, 1]), SUSPECT));
        assert!(flagged.is_unflagged(PointN([1, 1]), DISCARD));

        flagged.set_validating_mask(SUSPECT);
        flagged.unflag(PointN([1, 1]), SUSPECT);
        assert!(flagged.is_valid(PointN([1, 1])));
        assert_eq!(flagged.flags_at(PointN([1, 1])), BAD);
        assert!(!flagged.is_valid(PointN([4, 0])));
        assert_eq!(flagged.flags_at(PointN([4, 0])), NO_FLAGS);
    }

    #[test]
    fn writes_clear_flags() {
        let mut image = Array2::fill(PointN([3, 3]), 0i32);
        let mut flagged = Flagged::new(&mut image).unwrap();
        let p = PointN([2, 1]);

        flagged.flag(p, BAD);
        flagged.set(p, 5);
        assert!(flagged.is_valid(p));
        assert_eq!(flagged.get(p), 5);

        flagged.flag(p, SUSPECT);
        flagged.add(p, 1);
        assert_eq!(flagged.flags_at(p), NO_FLAGS);
        assert_eq!(flagged.get(p), 6);
    }

    #[test]
    fn discard_differs_from_clear() {
        let mut image = Array1::fill(PointN([4]), 9u8);
        let mut flagged = Flagged::new(&mut image).unwrap();

        flagged.flag(PointN([0]), BAD);
        flagged.discard(PointN([0]));
        assert_eq!(flagged.get(PointN([0])), 0);
        assert!(flagged.is_flagged(PointN([0]), DISCARD));
        assert!(flagged.is_flagged(PointN([0]), BAD));
        assert!(!flagged.is_valid(PointN([0])));

        flagged.flag(PointN([1]), BAD);
        flagged.clear(PointN([1]));
        assert_eq!(flagged.get(PointN([1])), 0);
        assert_eq!(flagged.flags_at(PointN([1])), NO_FLAGS);
        assert!(flagged.is_valid(PointN([1])));
    }

    #[test]
    fn rejects_mismatched_or_unbounded_bases() {
        let image = Array2::fill(PointN([3, 3]), 0i32);

        assert_eq!(
            Flagged::with_flags(&image, Array2::fill(PointN([3, 2]), NO_FLAGS)),
            Err(OverlayError::ShapeMismatch {
                expected: vec![3, 3],
                found: vec![3, 2],
            })
        );
        assert_eq!(
            Flagged::new(Periodic::new(&image)).map(|_| ()),
            Err(OverlayError::UnboundedBasis)
        );

        let other = Array2::fill(PointN([2, 2]), 0i32);
        let mut flagged = Flagged::new(&image).unwrap();
        assert!(flagged.set_basis(&other).is_err());
        assert!(std::ptr::eq(*flagged.basis(), &image));

        let same_shape = Array2::fill(PointN([3, 3]), 1i32);
        let previous = flagged.set_basis(&same_shape).unwrap();
        assert!(std::ptr::eq(previous, &image));
        assert_eq!(flagged.get(PointN([0, 0])), 1);
    }

    #[test]
    fn bulk_operations_skip_invalid_basis_samples() {
        let mut image = Array2::fill(PointN([5, 5]), 1.0f64);
        image.set(PointN([2, 2]), f64::NAN);

        for policy in policies() {
            let mut flagged = Flagged::new(&image).unwrap();
            flagged.set_parallelism(policy);

            flagged.flag_all(BAD).unwrap();
            assert_eq!(flagged.count_flags(BAD).unwrap(), 24);
            assert_eq!(flagged.flags_at(PointN([2, 2])), NO_FLAGS);

            flagged.unflag_all(BAD).unwrap();
            assert_eq!(flagged.count_flags(ALL_FLAGS).unwrap(), 0);
        }
    }

    #[test]
    fn count_is_independent_of_partition() {
        let image = Array3::fill_with(PointN([7, 5, 3]), |p: Point3i| (p.x() * 7 + p.y() * 3 + p.z()) % 11);
        let mut expected = None;

        for policy in policies() {
            let mut flagged = Flagged::new(&image).unwrap();
            flagged.set_parallelism(policy);
            let matched = flagged.flag_where(SUSPECT, |_, value| value < 4).unwrap();
            let counted = flagged.count_flags(SUSPECT).unwrap();
            assert_eq!(matched, counted);

            let serial = image
                .full_extent()
                .iter_points()
                .filter(|p| flagged.is_flagged(*p, SUSPECT))
                .count();
            assert_eq!(counted, serial);

            match expected {
                None => expected = Some(counted),
                Some(e) => assert_eq!(e, counted),
            }
        }
    }

    #[test]
    fn count_includes_flags_over_invalid_samples() {
        let samples = ArrayN::new(PointN([4]), vec![1.0f32, 1.0, f32::NAN, 1.0]).unwrap();

        for policy in policies() {
            let mut flagged = Flagged::new(&samples).unwrap();
            flagged.set_parallelism(policy);
            flagged.flag(PointN([0]), SUSPECT);
            flagged.flag(PointN([2]), SUSPECT);

            let serial = samples
                .full_extent()
                .iter_points()
                .filter(|p| flagged.is_flagged(*p, SUSPECT))
                .count();
            assert_eq!(serial, 2);
            assert_eq!(flagged.count_flags(SUSPECT).unwrap(), serial);
        }
    }

    #[test]
    fn flag_out_of_range_marks_outliers() {
        let samples = Array1::fill_with(PointN([20]), |p: Point1i| p.x() as i64 - 5);
        let mut flagged = Flagged::new(&samples).unwrap();

        let outliers = flagged
            .flag_out_of_range(ValueRange::new(0.0, 10.0).unwrap(), BAD)
            .unwrap();

        assert_eq!(outliers, 9);
        assert!(flagged.is_flagged(PointN([0]), BAD));
        assert!(flagged.is_valid(PointN([5])));
        assert!(!flagged.is_valid(PointN([16])));
    }

    #[test]
    fn failing_task_reports_every_failure() {
        let samples = Array1::fill_with(PointN([40]), |p: Point1i| p.x());

        for policy in policies() {
            let mut flagged = Flagged::new(&samples).unwrap();
            flagged.set_parallelism(policy.clone());

            let result = flagged.try_update_flags(|index, _, bits| {
                if index.x() == 17 {
                    return Err(format!("cannot flag {}", index.x()));
                }
                *bits |= BAD;
                Ok(())
            });

            match result {
                Err(OverlayError::Parallel { failures, .. }) => {
                    assert_eq!(failures.len(), 1);
                    assert_eq!(failures[0].stride, 17);
                    assert_eq!(failures[0].reason, "cannot flag 17");
                }
                other => panic!("expected a parallel failure, got {:?}", other),
            }
            assert!(flagged.is_unflagged(PointN([17]), BAD));
            if policy.is_sequential() {
                assert_eq!(flagged.count_flags(BAD).unwrap(), 17);
            }
        }
    }

    #[test]
    fn resize_keeps_flags_in_overlap() {
        let mut flagged = Flagged::new(Array2::fill(PointN([4, 4]), 1u8)).unwrap();
        flagged.flag(PointN([1, 1]), BAD);
        flagged.flag(PointN([3, 3]), BAD);

        flagged.resize(PointN([2, 6])).unwrap();
        assert_eq!(flagged.shape(), PointN([2, 6]));
        assert_eq!(flagged.flag_array().shape(), PointN([2, 6]));
        assert!(flagged.is_flagged(PointN([1, 1]), BAD));
        assert_eq!(flagged.count_flags(BAD).unwrap(), 1);
    }

    #[test]
    fn new_instance_keeps_mask_and_policy() {
        let mut flagged = Flagged::new(Array1::fill(PointN([3]), 1i16)).unwrap();
        flagged.set_validating_mask(BAD);
        flagged.set_parallelism(Parallelism::with_threads(2));
        flagged.flag(PointN([0]), BAD);

        let fresh = flagged.new_instance(PointN([5])).unwrap();
        assert_eq!(fresh.validating_mask(), BAD);
        assert_eq!(fresh.parallelism(), Some(Parallelism::with_threads(2)));
        assert_eq!(fresh.count_flags(ALL_FLAGS).unwrap(), 0);
        assert_eq!(fresh.shape(), PointN([5]));
    }

    #[test]
    fn destroy_releases_flags_then_basis() {
        let mut flagged = Flagged::new(Array2::fill(PointN([4, 4]), 1u8)).unwrap();
        flagged.destroy();

        assert_eq!(flagged.flag_array().capacity(), 0);
        assert_eq!(flagged.basis().capacity(), 0);
        assert!(!flagged.is_valid(PointN([0, 0])));
    }

    #[test]
    fn header_round_trips_the_full_mask() {
        let image = Array1::fill(PointN([2]), 0u8);
        let mut flagged = Flagged::new(&image).unwrap();
        flagged.set_validating_mask(ALL_FLAGS & !DISCARD);

        let mut header: SmallKeyHashMap<String, HeaderValue> = SmallKeyHashMap::default();
        flagged.describe_into(&mut header);

        let mut other = Flagged::new(&image).unwrap();
        other.configure_from(&header).unwrap();
        assert_eq!(other.validating_mask(), ALL_FLAGS & !DISCARD);
    }
}
