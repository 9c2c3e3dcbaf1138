//! Index tuples.
//!
//! A `PointN` is just a primitive array of coordinates. It is most convenient to construct points of any dimension as:
//!
//! ```
//! use lattice_views_core::prelude::*;
//!
//! let p1 = PointN([1]); // 1D
//! let p2 = PointN([1, 2]); // 2D
//! let p3 = PointN([1, 2, 3]); // 3D
//!
//! assert_eq!(p2 + PointN([3, 4]), PointN([4, 6]));
//! assert_eq!(p3.at(2), 3);
//! assert_eq!(p1.with_component(0, 7), PointN([7]));
//! ```
//!
//! Integer points implement `IntegerPoint`, which is the index contract every store and overlay in this workspace is generic
//! over. Equality and hashing are structural.

pub mod point_traits;

use point_traits::*;

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use num::Zero;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An N-dimensional point, which is just a primitive array of type `N`.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct PointN<N>(pub N);

/// A 1-dimensional point with scalar type `T`.
pub type Point1<T> = PointN<[T; 1]>;
/// A 1-dimensional index.
pub type Point1i = PointN<[i32; 1]>;
/// A 1-dimensional continuous coordinate.
pub type Point1f = PointN<[f64; 1]>;
/// A 2-dimensional point with scalar type `T`.
pub type Point2<T> = PointN<[T; 2]>;
/// A 2-dimensional index.
pub type Point2i = PointN<[i32; 2]>;
/// A 2-dimensional continuous coordinate.
pub type Point2f = PointN<[f64; 2]>;
/// A 3-dimensional point with scalar type `T`.
pub type Point3<T> = PointN<[T; 3]>;
/// A 3-dimensional index.
pub type Point3i = PointN<[i32; 3]>;
/// A 3-dimensional continuous coordinate.
pub type Point3f = PointN<[f64; 3]>;
/// A `D`-dimensional index.
pub type PointNi<const D: usize> = PointN<[i32; D]>;
/// A `D`-dimensional continuous coordinate.
pub type PointNf<const D: usize> = PointN<[f64; D]>;

impl<T, const D: usize> PointN<[T; D]>
where
    T: Copy,
{
    #[inline]
    pub fn fill(value: T) -> Self {
        PointN([value; D])
    }

    /// Returns a copy of `self` with the component on `axis` replaced by `value`.
    #[inline]
    pub fn with_component(&self, axis: usize, value: T) -> Self {
        let mut out = *self;
        out.0[axis] = value;

        out
    }

    #[inline]
    pub fn at(&self, axis: usize) -> T {
        self.0[axis]
    }

    #[inline]
    pub fn components(&self) -> &[T; D] {
        &self.0
    }
}

impl<T> Point1<T>
where
    T: Copy,
{
    #[inline]
    pub fn x(&self) -> T {
        self.0[0]
    }
}

impl<T> Point2<T>
where
    T: Copy,
{
    #[inline]
    pub fn x(&self) -> T {
        self.0[0]
    }

    #[inline]
    pub fn y(&self) -> T {
        self.0[1]
    }
}

impl<T> Point3<T>
where
    T: Copy,
{
    #[inline]
    pub fn x(&self) -> T {
        self.0[0]
    }

    #[inline]
    pub fn y(&self) -> T {
        self.0[1]
    }

    #[inline]
    pub fn z(&self) -> T {
        self.0[2]
    }
}

impl<T, const D: usize> GetComponent for PointN<[T; D]>
where
    T: Copy,
{
    type Scalar = T;

    #[inline]
    fn at(&self, component_index: usize) -> T {
        self.0[component_index]
    }
}

impl<T, const D: usize> MapComponents for PointN<[T; D]>
where
    T: Copy,
{
    type Scalar = T;

    #[inline]
    fn map_components_unary(&self, f: impl Fn(Self::Scalar) -> Self::Scalar) -> Self {
        let mut out = *self;
        for c in out.0.iter_mut() {
            *c = f(*c);
        }

        out
    }

    #[inline]
    fn map_components_binary(
        &self,
        other: &Self,
        f: impl Fn(Self::Scalar, Self::Scalar) -> Self::Scalar,
    ) -> Self {
        let mut out = *self;
        for (c, o) in out.0.iter_mut().zip(other.0.iter()) {
            *c = f(*c, *o);
        }

        out
    }
}

impl<T, const D: usize> ConstZero for PointN<[T; D]>
where
    T: ConstZero,
{
    const ZERO: Self = PointN([T::ZERO; D]);
}

impl<T, const D: usize> Ones for PointN<[T; D]>
where
    T: ConstOne,
{
    const ONES: Self = PointN([T::ONE; D]);
}

impl<T, const D: usize> Bounded for PointN<[T; D]>
where
    T: Bounded,
{
    const MIN: Self = PointN([T::MIN; D]);
    const MAX: Self = PointN([T::MAX; D]);
}

impl<T, const D: usize> Add for PointN<[T; D]>
where
    T: Copy + Add<Output = T>,
{
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.map_components_binary(&rhs, |c1, c2| c1 + c2)
    }
}

impl<T, const D: usize> Sub for PointN<[T; D]>
where
    T: Copy + Sub<Output = T>,
{
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.map_components_binary(&rhs, |c1, c2| c1 - c2)
    }
}

impl<T, const D: usize> Mul<T> for PointN<[T; D]>
where
    T: Copy + Mul<Output = T>,
{
    type Output = Self;

    #[inline]
    fn mul(self, rhs: T) -> Self {
        self.map_components_unary(|c| c * rhs)
    }
}

impl<T, const D: usize> Neg for PointN<[T; D]>
where
    T: Copy + Neg<Output = T>,
{
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self.map_components_unary(|c| -c)
    }
}

impl<N> AddAssign for PointN<N>
where
    PointN<N>: Copy + Add<Output = Self>,
{
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<N> SubAssign for PointN<N>
where
    PointN<N>: Copy + Sub<Output = Self>,
{
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<N> Zero for PointN<N>
where
    Self: ConstZero + PartialEq + Add<Output = Self>,
{
    #[inline]
    fn zero() -> Self {
        Self::ZERO
    }

    #[inline]
    fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl<const D: usize> LatticeOrder for PointN<[i32; D]> {
    #[inline]
    fn join(&self, other: &Self) -> Self {
        self.map_components_binary(other, i32::max)
    }

    #[inline]
    fn meet(&self, other: &Self) -> Self {
        self.map_components_binary(other, i32::min)
    }
}

impl<const D: usize> IntegerPoint for PointN<[i32; D]> {
    const DIM: usize = D;

    type Float = PointN<[f64; D]>;

    #[inline]
    fn fill(value: i32) -> Self {
        PointN([value; D])
    }

    #[inline]
    fn with_component(&self, axis: usize, value: i32) -> Self {
        PointN::with_component(self, axis, value)
    }

    #[inline]
    fn volume(&self) -> usize {
        let mut volume = 1usize;
        for &c in self.0.iter() {
            if c <= 0 {
                return 0;
            }
            volume = volume.saturating_mul(c as usize);
        }

        volume
    }

    #[inline]
    fn is_within(&self, shape: &Self) -> bool {
        self.0
            .iter()
            .zip(shape.0.iter())
            .all(|(&c, &s)| c >= 0 && c < s)
    }

    #[inline]
    fn to_float(&self) -> Self::Float {
        PointN(self.0.map(|c| c as f64))
    }
}

impl<const D: usize> FloatPoint for PointN<[f64; D]> {
    type Integer = PointN<[i32; D]>;

    #[inline]
    fn floor_to_integer(&self) -> Self::Integer {
        PointN(self.0.map(|c| c.floor() as i32))
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
