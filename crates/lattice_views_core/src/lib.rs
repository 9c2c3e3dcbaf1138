//! The core data types for indexing N-dimensional integer lattices:
//! - `PointN`: an N-dimensional index tuple, most importantly `Point1i`, `Point2i` and `Point3i`
//! - `Extent`: an axis-aligned box of points, used to describe windows and iteration ranges
//!
//! Every type here is generic over the number of dimensions, so the same code serves 1-D sample vectors, 2-D images, 3-D
//! cubes and anything beyond.

pub mod extent;
pub mod int_math;
pub mod point;

pub use extent::{Extent, Extent1i, Extent2i, Extent3i, ExtentPointIter};
pub use int_math::{wrap_coordinate, wrap_index};
pub use point::{
    point_traits::*, Point1, Point1f, Point1i, Point2, Point2f, Point2i, Point3, Point3f, Point3i,
    PointN, PointNf, PointNi,
};

pub use num;

pub mod prelude {
    pub use super::{
        Bounded, ConstZero, Extent, Extent1i, Extent2i, Extent3i, FloatPoint, GetComponent,
        IntegerPoint, LatticeOrder, MapComponents, Ones, Point1, Point1f, Point1i, Point2,
        Point2f, Point2i, Point3, Point3f, Point3i, PointN, PointNf, PointNi,
    };
}
