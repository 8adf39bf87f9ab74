//! Residual interpolation at arbitrary query points.
//!
//! ## Purpose
//!
//! This module composes neighbor selection and inverse-distance weighting into
//! the interpolation engine: the residual field of a reference set is estimated
//! at a query coordinate from the residuals of the selected neighbors.
//!
//! ## Design notes
//!
//! * **Precomputed residuals**: An [`Interpolator`] computes the residual of
//!   every reference once, so each query only gathers and weights.
//! * **Geometry fallback**: A degenerate triangulation is not fatal. The
//!   query falls back to every active reference as its neighbor set and the
//!   result is flagged.
//! * **No data**: When no usable neighbor remains the estimate is `None`;
//!   the correction step passes the forecast through unchanged.
//! * **Reusable buffers**: [`InterpolationBuffer`] holds the search and
//!   gathering scratch space so a batch allocates once per thread.
//!
//! ## Key concepts
//!
//! * **Residual kinds**: Difference (`observed - model`), ratio
//!   (`observed / model`) and value (`observed`, for plain interpolation of
//!   the observations).
//!
//! ## Invariants
//!
//! * Interpolation is a pure function of the reference set and the query.
//! * The nearest distance reported is the distance to the nearest active
//!   reference.
//!
//! ## Non-goals
//!
//! * Combining the estimate with the forecast (see `algorithms::correction`).

use num_traits::Float;
use tracing::debug;

use crate::algorithms::reference::ReferenceSet;
use crate::algorithms::selector::{NeighborPolicy, NeighborSelector};
use crate::math::kernel::inverse_distance_weight;
use crate::math::neighborhood::{NeighborList, NodeDistance};
use crate::primitives::buffer::NeighborhoodSearchBuffer;
use crate::primitives::errors::FusionError;
use crate::primitives::points::FusionFloat;

// ============================================================================
// Residual Kind
// ============================================================================

/// Quantity interpolated between references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResidualKind {
    /// `observed - model`.
    #[default]
    Difference,

    /// `observed / model`; undefined (NaN) when the model is not positive.
    Ratio,

    /// `observed` itself.
    Value,
}

impl ResidualKind {
    /// Residual of one paired observation.
    #[inline]
    pub fn residual<T: Float>(self, observed: T, model: T) -> T {
        match self {
            ResidualKind::Difference => observed - model,
            ResidualKind::Ratio => {
                if model > T::zero() {
                    observed / model
                } else {
                    T::nan()
                }
            }
            ResidualKind::Value => observed,
        }
    }
}

// ============================================================================
// Buffers and Results
// ============================================================================

/// Scratch space for one interpolation at a time.
#[derive(Debug, Clone)]
pub struct InterpolationBuffer<T> {
    /// KD-tree search state.
    pub search: NeighborhoodSearchBuffer<NodeDistance<T>>,
    /// Selected neighbors of the current query.
    pub neighbors: NeighborList<T>,
    /// Residuals gathered for the current neighbors.
    pub values: Vec<T>,
}

impl<T: Float> InterpolationBuffer<T> {
    /// Create a buffer sized for `k` neighbors.
    pub fn new(k: usize) -> Self {
        Self {
            search: NeighborhoodSearchBuffer::new(k),
            neighbors: NeighborList::with_capacity(k),
            values: Vec::with_capacity(k),
        }
    }
}

impl<T: Float> Default for InterpolationBuffer<T> {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Interpolated residual at one query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolated<T> {
    /// Weighted residual, or `None` when no usable neighbor exists.
    pub estimate: Option<T>,
    /// Distance to the nearest active reference (NaN if there is none).
    pub nearest_distance: T,
    /// Number of neighbors selected.
    pub neighbor_count: usize,
    /// True if the triangulation was degenerate and all references were used.
    pub geometry_fallback: bool,
}

// ============================================================================
// Interpolator
// ============================================================================

/// Interpolates the residual field of one reference set.
#[derive(Debug, Clone)]
pub struct Interpolator<'a, T: FusionFloat> {
    reference: &'a ReferenceSet<T>,
    policy: NeighborPolicy,
    power: T,
    kind: ResidualKind,
    residuals: Vec<T>,
}

impl<'a, T: FusionFloat> Interpolator<'a, T> {
    /// Create an interpolator, computing every reference residual up front.
    pub fn new(
        reference: &'a ReferenceSet<T>,
        policy: NeighborPolicy,
        power: T,
        kind: ResidualKind,
    ) -> Self {
        let residuals = reference
            .points()
            .iter()
            .map(|p| kind.residual(p.observed, p.model))
            .collect();
        Self {
            reference,
            policy,
            power,
            kind,
            residuals,
        }
    }

    /// Reference set being interpolated.
    pub fn reference(&self) -> &'a ReferenceSet<T> {
        self.reference
    }

    /// Neighbor policy.
    pub fn policy(&self) -> NeighborPolicy {
        self.policy
    }

    /// Inverse-distance power.
    pub fn power(&self) -> T {
        self.power
    }

    /// Residual kind.
    pub fn kind(&self) -> ResidualKind {
        self.kind
    }

    /// Residual of every reference, in reference order.
    pub fn residuals(&self) -> &[T] {
        &self.residuals
    }

    /// Interpolate the residual at `query`, leaving out reference `exclude`.
    pub fn interpolate(
        &self,
        query: [T; 2],
        exclude: Option<usize>,
        buf: &mut InterpolationBuffer<T>,
    ) -> Result<Interpolated<T>, FusionError> {
        if !query[0].is_finite() || !query[1].is_finite() {
            return Err(FusionError::InvalidNumericValue(
                "query coordinate is not finite".into(),
            ));
        }

        let selector = NeighborSelector::new(self.reference);
        let mut geometry_fallback = false;
        match selector.select(query, self.policy, exclude, &mut buf.search, &mut buf.neighbors) {
            Ok(()) => {}
            Err(FusionError::Geometry(reason)) => {
                debug!(%reason, "degenerate triangulation, using all references");
                selector.all_points(query, exclude, &mut buf.neighbors);
                geometry_fallback = true;
            }
            Err(e) => return Err(e),
        }

        buf.values.clear();
        buf.values
            .extend(buf.neighbors.indices.iter().map(|&i| self.residuals[i]));

        let estimate = match inverse_distance_weight(&buf.values, &buf.neighbors.distances, self.power) {
            Ok(v) => Some(v),
            Err(FusionError::InsufficientData { .. }) => None,
            Err(e) => return Err(e),
        };

        Ok(Interpolated {
            estimate,
            nearest_distance: buf.neighbors.nearest_distance().unwrap_or_else(T::nan),
            neighbor_count: buf.neighbors.len(),
            geometry_fallback,
        })
    }
}

/// Interpolate the difference residual of `reference` at `query`.
///
/// Convenience for one-off queries; batches should build an [`Interpolator`].
pub fn interpolate<T: FusionFloat>(
    query: [T; 2],
    reference: &ReferenceSet<T>,
    policy: NeighborPolicy,
    power: T,
    exclude: Option<usize>,
) -> Result<Interpolated<T>, FusionError> {
    let k = match policy {
        NeighborPolicy::FixedK { k } => k,
        NeighborPolicy::Delaunay => 1,
    };
    let mut buf = InterpolationBuffer::new(k);
    Interpolator::new(reference, policy, power, ResidualKind::Difference).interpolate(query, exclude, &mut buf)
}
