//! Error types for residual interpolation and fusion.
//!
//! ## Purpose
//!
//! This module defines the single error enum returned by every fallible
//! operation in the crate.
//!
//! ## Design notes
//!
//! * **Local vs. fatal**: `InsufficientData` and `Geometry` are raised per
//!   query point and are recovered from by the engine (pass-through of the
//!   model value, or the all-points neighbor fallback). Every other variant
//!   aborts the run.
//! * **Configuration first**: Configuration variants are raised by the
//!   validator before any per-point computation begins.
//!
//! ## Non-goals
//!
//! * This module does not log; callers decide how loudly to report.

use thiserror::Error;

/// Errors raised while configuring or running a fusion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FusionError {
    /// A required input collection is empty.
    #[error("Input arrays are empty")]
    EmptyInput,

    /// Two parallel inputs disagree in length.
    #[error("Length mismatch: {what} has {got} values, expected {expected}")]
    MismatchedInputs {
        /// Name of the offending input.
        what: &'static str,
        /// Length that was supplied.
        got: usize,
        /// Length that was expected.
        expected: usize,
    },

    /// A coordinate or value is NaN or infinite where a finite number is required.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// Too few usable reference points for a query.
    #[error("Insufficient data: got {got} usable reference points, need at least {needed}")]
    InsufficientData {
        /// Usable points found.
        got: usize,
        /// Minimum required.
        needed: usize,
    },

    /// The reference points cannot be triangulated (too few or collinear).
    #[error("Degenerate geometry: {0}")]
    Geometry(String),

    /// Inverse-distance power is not finite and negative.
    #[error("Invalid power: {0} (must be finite and negative)")]
    InvalidPower(f64),

    /// Fixed neighbor count is zero.
    #[error("Invalid neighbor count: {0} (must be at least 1)")]
    InvalidNeighborCount(usize),

    /// Floor distance is negative or not finite.
    #[error("Invalid floor distance: {0} (must be finite and >= 0)")]
    InvalidFloorDistance(f64),

    /// Fallback weight lies outside [0, 1].
    #[error("Invalid fallback weight: {0} (must be in [0, 1])")]
    InvalidFallbackWeight(f64),

    /// A blend refers to a variant that is not registered.
    #[error("Unknown fusion variant: {0}")]
    UnknownVariant(String),

    /// Two variants share a name.
    #[error("Fusion variant registered twice: {0}")]
    DuplicateVariant(String),

    /// A builder parameter was set more than once.
    #[error(
        "Parameter [{parameter}] was set multiple times. Each parameter should only be configured once."
    )]
    DuplicateParameter {
        /// Name of the parameter.
        parameter: &'static str,
    },

    /// Any other invalid configuration combination.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A configuration document could not be parsed.
    #[error("Configuration file error: {0}")]
    Toml(String),
}

impl FusionError {
    /// Returns true for errors that only affect a single query point.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            FusionError::InsufficientData { .. } | FusionError::Geometry(_)
        )
    }
}
