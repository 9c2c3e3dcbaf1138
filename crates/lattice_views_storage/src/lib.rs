#![allow(clippy::type_complexity)]

//! N-dimensional sample stores and the overlays that view them.
//!
//! The store contract is a pair of traits:
//!   - `IndexedStore`: read a sample, check an index's validity, query the shape
//!   - `IndexedStoreMut`: set, accumulate, clear or discard a sample
//!
//! The dense backend is `ArrayN`, with `Array1`, `Array2` and `Array3` aliases. `SharedStore` lets several overlays share one
//! backend for both reading and writing.
//!
//! Overlays wrap any store and are stores themselves:
//!   - `Overlay`: pass-through
//!   - `Viewport`: a translated window, clamped to the basis
//!   - `Periodic`: infinite tiling
//!   - `RangeRestricted`: value-range masking
//!   - `Flagged`: quality-bit masking, with parallel bulk flag operations driven by a `Parallelism` policy

pub mod access_traits;
pub mod array;
pub mod error;
pub mod flags;
pub mod header;
pub mod overlay;
pub mod parallel;
pub mod raw_bytes;
pub mod sample;
pub mod shared;

pub use access_traits::*;
pub use array::*;
pub use error::{OverlayError, WorkerFailure};
pub use flags::*;
pub use header::{DescribeHeader, Header, HeaderValue};
pub use overlay::*;
pub use parallel::{ChunkContext, ChunkError, Parallelism};
pub use raw_bytes::*;
pub use sample::{ElementType, Sample};
pub use shared::SharedStore;

// Hash types to use for small keys like header keywords.
pub type SmallKeyHashMap<K, V> = ahash::AHashMap<K, V>;
pub type SmallKeyBuildHasher = ahash::RandomState;

pub mod prelude {
    pub use super::{
        copy_extent, Array1, Array2, Array3, ArrayN, ArrayNd, DescribeHeader, ElementType,
        FlagBits, Flagged, ForEachValid, Header, HeaderValue, IndexedStore, IndexedStoreMut,
        IntoRawBytes, NewInstance, Overlay, OverlayError, Parallelism, Periodic,
        RangeRestricted, Resizable, Sample, SharedStore, SmallKeyHashMap, ValueRange, Viewport,
        ALL_FLAGS, DISCARD, FIRST_USER_FLAG, NO_FLAGS, UNBOUNDED,
    };
}
