use core::fmt::Debug;
use core::hash::Hash;
use core::ops::{Add, Neg, Sub};

pub trait GetComponent {
    type Scalar: Copy;

    /// Returns the component specified by index. I.e. X = 0, Y = 1, Z = 2.
    fn at(&self, component_index: usize) -> Self::Scalar;
}

pub trait MapComponents {
    type Scalar;

    /// Returns the point after applying `f` component-wise.
    fn map_components_unary(&self, f: impl Fn(Self::Scalar) -> Self::Scalar) -> Self;

    /// Returns the point after applying `f` component-wise to both `self` and `other` in parallel.
    fn map_components_binary(
        &self,
        other: &Self,
        f: impl Fn(Self::Scalar, Self::Scalar) -> Self::Scalar,
    ) -> Self;
}

pub trait LatticeOrder {
    /// Component-wise maximum.
    fn join(&self, other: &Self) -> Self;

    /// Component-wise minimum.
    fn meet(&self, other: &Self) -> Self;
}

/// The index contract shared by every store and overlay.
///
/// Implemented for `PointN<[i32; D]>` with any `D`, so a single generic overlay implementation serves every dimensionality.
pub trait IntegerPoint:
    'static
    + Add<Output = Self>
    + Bounded
    + ConstZero
    + Copy
    + Debug
    + Eq
    + GetComponent<Scalar = i32>
    + Hash
    + LatticeOrder
    + MapComponents<Scalar = i32>
    + Neg<Output = Self>
    + Ones
    + Send
    + Sub<Output = Self>
    + Sync
{
    /// The number of axes.
    const DIM: usize;

    /// The continuous coordinate type with the same number of axes.
    type Float: FloatPoint<Integer = Self>;

    fn fill(value: i32) -> Self;

    /// Returns a copy of `self` with the component on `axis` replaced by `value`.
    fn with_component(&self, axis: usize, value: i32) -> Self;

    /// The number of points in a box of this shape. Zero if any component is non-positive, saturating on overflow.
    fn volume(&self) -> usize;

    /// Returns `true` iff `0 <= self[axis] < shape[axis]` on every axis.
    fn is_within(&self, shape: &Self) -> bool;

    fn to_float(&self) -> Self::Float;
}

/// A continuous coordinate, used where fractional positions must map onto the integer lattice.
pub trait FloatPoint:
    'static + Copy + Debug + GetComponent<Scalar = f64> + MapComponents<Scalar = f64> + PartialEq
{
    type Integer: IntegerPoint<Float = Self>;

    /// The lattice point whose unit cell contains `self`.
    fn floor_to_integer(&self) -> Self::Integer;
}

pub trait Ones: Copy {
    /// A point of all ones.
    const ONES: Self;
}

// `Zero` trait doesn't allow associated constants for zero because of bignums.
pub trait ConstZero: Copy {
    const ZERO: Self;
}

// `One` trait doesn't allow associated constants for one because of bignums.
pub trait ConstOne: Copy {
    const ONE: Self;
}

impl ConstZero for i32 {
    const ZERO: i32 = 0;
}
impl ConstOne for i32 {
    const ONE: i32 = 1;
}

impl ConstZero for f64 {
    const ZERO: f64 = 0.0;
}
impl ConstOne for f64 {
    const ONE: f64 = 1.0;
}

pub trait Bounded: Copy {
    const MIN: Self;
    const MAX: Self;
}

impl Bounded for i32 {
    const MIN: Self = i32::MIN;
    const MAX: Self = i32::MAX;
}

impl Bounded for f64 {
    const MIN: Self = f64::MIN;
    const MAX: Self = f64::MAX;
}
