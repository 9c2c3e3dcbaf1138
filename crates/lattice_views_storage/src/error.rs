use lattice_views_core::prelude::*;

use thiserror::Error;

/// Everything that can go wrong while configuring or bulk-mutating a store.
///
/// Degenerate index spaces (an empty viewport, a basis that shrank under a window) are never errors; they read as empty or
/// invalid instead.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OverlayError {
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<i32>,
        found: Vec<i32>,
    },

    #[error("value range [{min}, {max}] has no positive span")]
    EmptyRange { min: f64, max: f64 },

    #[error("operation requires a basis with finite extent")]
    UnboundedBasis,

    #[error("invalid shape {0:?}: components must be non-negative")]
    InvalidShape(Vec<i32>),

    #[error("{view} does not support {operation}")]
    Unsupported {
        operation: &'static str,
        view: &'static str,
    },

    #[error("{} of the bulk operation's chunks failed ({interrupted} interrupted)", .failures.len())]
    Parallel {
        failures: Vec<WorkerFailure>,
        interrupted: usize,
    },

    #[error("header key {key} holds a value of the wrong kind")]
    HeaderType { key: String },
}

/// The failure of one chunk of a bulk operation.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkerFailure {
    /// Which chunk of the partition failed.
    pub chunk: usize,
    /// The linear offset of the index being processed when it failed. A panic is reported at the last offset the task
    /// passed to `ChunkContext::advance`, or at the chunk start if it never called it.
    pub stride: usize,
    pub reason: String,
}

pub(crate) fn components<P>(p: &P) -> Vec<i32>
where
    P: IntegerPoint,
{
    (0..P::DIM).map(|axis| p.at(axis)).collect()
}
