//! Leave-one-out cross-validation of a reference set.
//!
//! ## Purpose
//!
//! For every reference point this module re-estimates the corrected value
//! from all other references of the same network and reports the error
//! against the true observation.
//!
//! ## Design notes
//!
//! * **Exclusion**: The point's own index is passed to the neighbor selector,
//!   which skips it in the KD-tree search and, under the Delaunay policy,
//!   returns the point's own adjacency from the shared triangulation.
//! * **Per-network**: Only the reference set being validated is consulted.
//! * **Local failures**: A point whose evaluation fails gets NaN estimates; the
//!   rest of the table is unaffected.
//!
//! ## Invariants
//!
//! * One row per reference point, in reference order.
//! * `error = estimate - observed`.

use crate::algorithms::correction::{CorrectionMode, CorrectionPipeline};
use crate::algorithms::reference::ReferenceSet;
use crate::algorithms::selector::NeighborPolicy;
use crate::evaluation::batch::{buffer_capacity, map_indices};
use crate::primitives::errors::FusionError;
use crate::primitives::points::FusionFloat;

/// Cross-validated estimate for one reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct LooRow<T> {
    /// Index of the point in its reference set.
    pub index: usize,
    /// Identifier of the point.
    pub id: String,
    /// Corrected value estimated without the point.
    pub estimate: T,
    /// Interpolated residual (NaN if none was available).
    pub bias: T,
    /// `estimate - observed`.
    pub error: T,
    /// Distance to the nearest other reference.
    pub nearest_distance: T,
    /// Number of neighbors used.
    pub neighbor_count: usize,
    /// True if the forecast was passed through for lack of neighbors.
    pub passed_through: bool,
    /// True if the all-references fallback replaced a degenerate triangulation.
    pub geometry_fallback: bool,
    /// Set when the evaluation of this point failed.
    pub failure: Option<FusionError>,
}

/// Leave-one-out estimates for every point of `reference`.
pub fn validate_all<T: FusionFloat>(
    reference: &ReferenceSet<T>,
    policy: NeighborPolicy,
    power: T,
    mode: CorrectionMode,
) -> Vec<LooRow<T>> {
    let pipeline = CorrectionPipeline::new(reference, policy, power, mode);
    validate_with(&pipeline)
}

/// Leave-one-out estimates using an existing pipeline.
pub fn validate_with<T: FusionFloat>(pipeline: &CorrectionPipeline<'_, T>) -> Vec<LooRow<T>> {
    let reference = pipeline.interpolator().reference();
    let capacity = buffer_capacity(pipeline.interpolator().policy());

    map_indices(reference.len(), capacity, |i, buf| {
        let point = reference.point(i);
        match pipeline.evaluate(&point.as_query(), Some(i), buf) {
            Ok(est) => LooRow {
                index: i,
                id: point.id.clone(),
                estimate: est.corrected,
                bias: est.bias,
                error: est.corrected - point.observed,
                nearest_distance: est.nearest_distance,
                neighbor_count: est.neighbor_count,
                passed_through: est.passed_through,
                geometry_fallback: est.geometry_fallback,
                failure: None,
            },
            Err(e) => LooRow {
                index: i,
                id: point.id.clone(),
                estimate: T::nan(),
                bias: T::nan(),
                error: T::nan(),
                nearest_distance: T::nan(),
                neighbor_count: 0,
                passed_through: false,
                geometry_fallback: false,
                failure: Some(e),
            },
        }
    })
}
