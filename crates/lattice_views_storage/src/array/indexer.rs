use crate::Stride;

use lattice_views_core::prelude::*;

/// Conversion between lattice points and linear offsets into a store of a given shape.
///
/// The first axis varies fastest. Implemented for every `IntegerPoint`.
pub trait ArrayIndexer: IntegerPoint {
    /// The offset of the array-local point `p`. Only meaningful when `p.is_within(&shape)`.
    #[inline]
    fn stride_from_local_point(shape: Self, p: Self) -> Stride {
        let mut stride = 0usize;
        let mut step = 1usize;
        for axis in 0..Self::DIM {
            stride += p.at(axis) as usize * step;
            step *= shape.at(axis) as usize;
        }

        Stride(stride)
    }

    /// The inverse of `stride_from_local_point`.
    #[inline]
    fn local_point_from_stride(shape: Self, stride: Stride) -> Self {
        let mut remainder = stride.0;
        let mut p = Self::ZERO;
        for axis in 0..Self::DIM {
            let extent = shape.at(axis) as usize;
            p = p.with_component(axis, (remainder % extent) as i32);
            remainder /= extent;
        }

        p
    }

    /// The offset of `p`, or `None` if it lies outside of `shape`.
    #[inline]
    fn checked_stride(shape: Self, p: Self) -> Option<Stride> {
        if p.is_within(&shape) {
            Some(Self::stride_from_local_point(shape, p))
        } else {
            None
        }
    }
}

impl<P> ArrayIndexer for P where P: IntegerPoint {}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
