//! A narrow key/value interface for describing overlay configuration to header-oriented collaborators.
//!
//! Overlays know nothing about any particular header format. They describe their own state (not their basis's) as a handful of
//! keyed numbers, and can be reconfigured from the same keys:
//!
//! | overlay | keys |
//! |---|---|
//! | `Viewport` | `VPORIG1`..`VPORIGn`, `VPSIZE1`..`VPSIZEn` (integers, axes numbered from 1) |
//! | `RangeRestricted` | `RNGMIN`, `RNGMAX` (reals) |
//! | `Flagged` | `FLAGMASK` (integer holding the bits of the validating mask) |
//!
//! ```
//! use lattice_views_core::prelude::*;
//! use lattice_views_storage::prelude::*;
//!
//! let image = Array2::fill(PointN([10, 10]), 0.0f32);
//! let window = Viewport::new(&image, PointN([2, 3]), PointN([6, 7]));
//!
//! let mut header: SmallKeyHashMap<String, HeaderValue> = SmallKeyHashMap::default();
//! window.describe_into(&mut header);
//! assert_eq!(header.value("VPORIG2"), Some(HeaderValue::Integer(3)));
//!
//! let mut other = Viewport::full(&image);
//! other.configure_from(&header).unwrap();
//! assert_eq!(other.bounds(), window.bounds());
//! ```
//!
//! Keys missing from a header leave the corresponding state untouched.

use crate::{OverlayError, SmallKeyHashMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A header value. Integers widen to reals on request, reals never narrow to integers.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum HeaderValue {
    Integer(i64),
    Real(f64),
}

/// Somewhere to record and look up keyed header values.
pub trait Header {
    fn put(&mut self, key: &str, value: HeaderValue);

    fn value(&self, key: &str) -> Option<HeaderValue>;

    /// The integer stored at `key`, if any.
    fn integer(&self, key: &str) -> Result<Option<i64>, OverlayError> {
        match self.value(key) {
            None => Ok(None),
            Some(HeaderValue::Integer(i)) => Ok(Some(i)),
            Some(HeaderValue::Real(_)) => Err(header_type(key)),
        }
    }

    /// The real stored at `key`, if any.
    fn real(&self, key: &str) -> Result<Option<f64>, OverlayError> {
        match self.value(key) {
            None => Ok(None),
            Some(HeaderValue::Integer(i)) => Ok(Some(i as f64)),
            Some(HeaderValue::Real(r)) => Ok(Some(r)),
        }
    }
}

impl Header for SmallKeyHashMap<String, HeaderValue> {
    #[inline]
    fn put(&mut self, key: &str, value: HeaderValue) {
        self.insert(key.to_string(), value);
    }

    #[inline]
    fn value(&self, key: &str) -> Option<HeaderValue> {
        self.get(key).copied()
    }
}

/// Overlays that can describe their configuration as header values and be configured from them.
pub trait DescribeHeader {
    fn describe_into(&self, header: &mut dyn Header);

    /// Apply every key present in `header`. On error, state is left as it was before the call.
    fn configure_from(&mut self, header: &dyn Header) -> Result<(), OverlayError>;
}

pub(crate) fn header_type(key: &str) -> OverlayError {
    OverlayError::HeaderType {
        key: key.to_string(),
    }
}

/// Reads an integer that must fit in an `i32` index component.
pub(crate) fn index_component(header: &dyn Header, key: &str) -> Result<Option<i32>, OverlayError> {
    match header.integer(key)? {
        None => Ok(None),
        Some(i) => i32::try_from(i).map(Some).map_err(|_| header_type(key)),
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

    #[test]
    fn integers_widen_but_reals_do_not_narrow() {
        let mut header: SmallKeyHashMap<String, HeaderValue> = SmallKeyHashMap::default();
        header.put("A", HeaderValue::Integer(3));
        header.put("B", HeaderValue::Real(0.5));

        assert_eq!(header.real("A"), Ok(Some(3.0)));
        assert_eq!(header.integer("A"), Ok(Some(3)));
        assert_eq!(header.integer("B"), Err(header_type("B")));
        assert_eq!(header.integer("C"), Ok(None));
    }

    #[test]
    fn index_components_must_fit() {
        let mut header: SmallKeyHashMap<String, HeaderValue> = SmallKeyHashMap::default();
        header.put("BIG", HeaderValue::Integer(i64::MAX));
        header.put("OK", HeaderValue::Integer(-4));

        assert!(index_component(&header, "BIG").is_err());
        assert_eq!(index_component(&header, "OK"), Ok(Some(-4)));
    }
}
