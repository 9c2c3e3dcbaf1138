//! Composable views over N-dimensional arrays of numeric samples.
//!
//! This library is organized into two crates:
//! - **core**: index points and extents for integer lattices of any dimension
//! - **storage**: the indexed store contract, dense arrays, and the overlays that window, tile, mask and flag them
//!
//! To learn the basics, start with these doc pages:
//!
//! - [points](crate::core::point)
//! - [extents](crate::core::extent)
//! - [arrays](crate::storage::array)
//! - [the store contract](crate::storage::access_traits)
//! - [overlays](crate::storage::overlay)
//! - [bulk flag operations](crate::storage::overlay::Flagged)
//!
//! ```
//! use lattice_views::prelude::*;
//!
//! let image = Array2::fill(PointN([16, 16]), 1.0f32);
//! let window = Viewport::new(Periodic::new(&image), PointN([8, 8]), PointN([24, 24]));
//! assert_eq!(window.shape(), PointN([16, 16]));
//! assert_eq!(window.get(PointN([15, 15])), 1.0);
//! ```

pub use lattice_views_core as core;
pub use lattice_views_storage as storage;

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::storage::prelude::*;
}
