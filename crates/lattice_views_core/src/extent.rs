use crate::{point::point_traits::*, PointN};

use core::ops::{Add, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 1-dimensional integer extent.
pub type Extent1i = Extent<PointN<[i32; 1]>>;
/// A 2-dimensional integer extent.
pub type Extent2i = Extent<PointN<[i32; 2]>>;
/// A 3-dimensional integer extent.
pub type Extent3i = Extent<PointN<[i32; 3]>>;

/// An N-dimensional extent. This is mathematically the Cartesian product of a half-closed interval `[a, b)` in each dimension.
/// You can also just think of it as an axis-aligned box with some shape and a minimum point.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Extent<P> {
    /// The least point contained in the extent.
    pub minimum: P,
    /// The length of each dimension.
    pub shape: P,
}

impl<P> Extent<P> {
    /// The default representation of an extent as the minimum point and shape.
    #[inline]
    pub fn from_min_and_shape(minimum: P, shape: P) -> Self {
        Self { minimum, shape }
    }
}

impl<P> Extent<P>
where
    P: IntegerPoint,
{
    /// The extent starting at the origin with the given `shape`.
    #[inline]
    pub fn from_shape(shape: P) -> Self {
        Self::from_min_and_shape(P::ZERO, shape)
    }

    /// An alternative representation of an extent as the minimum point and least upper bound.
    #[inline]
    pub fn from_min_and_lub(minimum: P, least_upper_bound: P) -> Self {
        // We want to avoid negative shape components.
        let shape = (least_upper_bound - minimum).join(&P::ZERO);

        Self { minimum, shape }
    }

    /// The least point `p` for which all points `q` in the extent satisfy `q < p`.
    #[inline]
    pub fn least_upper_bound(&self) -> P {
        self.minimum + self.shape
    }

    /// The number of points contained in the extent.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.shape.volume()
    }

    /// Returns `true` iff the number of points in the extent is 0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_points() == 0
    }

    /// Returns `true` iff the point `p` is contained in this extent.
    #[inline]
    pub fn contains(&self, p: P) -> bool {
        (p - self.minimum).is_within(&self.shape)
    }

    /// Returns the extent containing only the points in both `self` and `other`.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Self {
        let minimum = self.minimum.join(&other.minimum);
        let lub = self.least_upper_bound().meet(&other.least_upper_bound());

        Self::from_min_and_lub(minimum, lub)
    }

    /// Returns `true` iff the intersection of `self` and `other` is equal to `self`.
    #[inline]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.intersection(other).eq(self)
    }

    /// Iterate over all points in the extent. The first axis varies fastest.
    /// ```
    /// # use lattice_views_core::prelude::*;
    /// #
    /// let extent = Extent3i::from_min_and_shape(PointN([0, 0, 0]), PointN([2, 2, 1]));
    /// let points = extent.iter_points().collect::<Vec<_>>();
    /// assert_eq!(points, vec![
    ///     PointN([0, 0, 0]), PointN([1, 0, 0]), PointN([0, 1, 0]), PointN([1, 1, 0])
    /// ]);
    /// ```
    #[inline]
    pub fn iter_points(&self) -> ExtentPointIter<P> {
        ExtentPointIter {
            minimum: self.minimum,
            lub: self.least_upper_bound(),
            next: if self.is_empty() {
                None
            } else {
                Some(self.minimum)
            },
        }
    }
}

impl<P> Add<P> for Extent<P>
where
    P: Add<Output = P>,
{
    type Output = Self;

    #[inline]
    fn add(self, rhs: P) -> Self::Output {
        Extent {
            minimum: self.minimum + rhs,
            shape: self.shape,
        }
    }
}

impl<P> Sub<P> for Extent<P>
where
    P: Sub<Output = P>,
{
    type Output = Self;

    #[inline]
    fn sub(self, rhs: P) -> Self::Output {
        Extent {
            minimum: self.minimum - rhs,
            shape: self.shape,
        }
    }
}

/// Visits every point of an `Extent` with the first axis varying fastest.
#[derive(Clone, Debug)]
pub struct ExtentPointIter<P> {
    minimum: P,
    lub: P,
    next: Option<P>,
}

impl<P> Iterator for ExtentPointIter<P>
where
    P: IntegerPoint,
{
    type Item = P;

    #[inline]
    fn next(&mut self) -> Option<P> {
        let current = self.next?;

        let mut successor = current;
        let mut advanced = false;
        for axis in 0..P::DIM {
            let c = successor.at(axis) + 1;
            if c < self.lub.at(axis) {
                successor = successor.with_component(axis, c);
                advanced = true;
                break;
            }
            successor = successor.with_component(axis, self.minimum.at(axis));
        }
        self.next = if advanced { Some(successor) } else { None };

        Some(current)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
