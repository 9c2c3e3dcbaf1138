//! Views that change how a basis store is indexed, read, written or validated, without copying it.
//!
//! Every overlay holds exactly one basis and is itself an `IndexedStore`, so overlays nest to any depth. Each layer only knows
//! its immediate basis:
//!   - `Overlay`: forwards everything unchanged
//!   - `Viewport`: a translated, clamped window
//!   - `Periodic`: tiles the basis infinitely along every axis
//!   - `RangeRestricted`: samples outside of a value range are invalid
//!   - `Flagged`: per-index quality bits, with parallel bulk operations
//!
//! ```
//! use lattice_views_core::prelude::*;
//! use lattice_views_storage::prelude::*;
//!
//! let image = Array2::fill_with(PointN([8, 8]), |p: Point2i| (p.x() + p.y()) as f32);
//!
//! let mut flagged = Flagged::new(&image).unwrap();
//! flagged.flag(PointN([3, 3]), FIRST_USER_FLAG);
//!
//! let in_range = RangeRestricted::new(&flagged, ValueRange::new(0.0, 10.0).unwrap());
//! let window = Viewport::new(in_range, PointN([2, 2]), PointN([6, 6]));
//! assert_eq!(window.get(PointN([0, 0])), 4.0);
//! assert!(!window.is_valid(PointN([1, 1])));
//! assert!(window.is_valid(PointN([3, 3])));
//! assert!(!window.is_valid(PointN([4, 4])));
//! ```
//!
//! Overlays never cache the shape of their basis. The only thing copied from the basis is its processing policy, once, when
//! the overlay is constructed.

mod base;
mod flagged;
mod periodic;
mod range_restricted;
mod viewport;

pub use base::*;
pub use flagged::*;
pub use periodic::*;
pub use range_restricted::*;
pub use viewport::*;

use crate::{IndexedStore, Parallelism};

use std::hash::{Hash, Hasher};

/// The processing policy an overlay copied from its basis. It is not part of the overlay's value, so it is ignored by equality
/// and hashing.
#[derive(Clone, Debug, Default)]
pub(crate) struct CachedPolicy(Option<Parallelism>);

impl CachedPolicy {
    pub fn of<B>(basis: &B) -> Self
    where
        B: IndexedStore,
    {
        Self(basis.parallelism())
    }

    pub fn or_default(self) -> Self {
        Self(Some(self.0.unwrap_or_default()))
    }

    pub fn get(&self) -> Option<Parallelism> {
        self.0.clone()
    }

    pub fn set(&mut self, policy: Option<Parallelism>) {
        self.0 = policy;
    }

    /// The policy bulk operations run with.
    pub fn executor(&self) -> Parallelism {
        self.0.clone().unwrap_or_default()
    }
}

impl PartialEq for CachedPolicy {
    #[inline]
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for CachedPolicy {}

impl Hash for CachedPolicy {
    #[inline]
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}
