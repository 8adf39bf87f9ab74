//! Forecast correction from an interpolated residual.
//!
//! ## Purpose
//!
//! This module applies an interpolated residual to the forecast value at a
//! query point and bundles interpolation and correction into one pipeline.
//!
//! ## Key concepts
//!
//! * **Additive**: `corrected = model + (observed - model)~`.
//! * **Multiplicative**: `corrected = model * (observed / model)~`.
//! * **Direct**: `corrected = observed~`; the forecast is ignored.
//!
//! Here `~` denotes the interpolated estimate.
//!
//! ## Invariants
//!
//! * A missing estimate passes the forecast through unchanged.

use core::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::algorithms::interpolation::{InterpolationBuffer, Interpolator, ResidualKind};
use crate::algorithms::reference::ReferenceSet;
use crate::algorithms::selector::NeighborPolicy;
use crate::primitives::errors::FusionError;
use crate::primitives::points::{FusionFloat, QueryPoint};

/// How an interpolated residual is combined with the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionMode {
    /// Add the interpolated difference to the forecast.
    #[default]
    Additive,

    /// Multiply the forecast by the interpolated ratio.
    Multiplicative,

    /// Use the interpolated observation directly.
    Direct,
}

impl CorrectionMode {
    /// Residual the interpolation engine must compute for this mode.
    pub fn residual_kind(self) -> ResidualKind {
        match self {
            CorrectionMode::Additive => ResidualKind::Difference,
            CorrectionMode::Multiplicative => ResidualKind::Ratio,
            CorrectionMode::Direct => ResidualKind::Value,
        }
    }

    /// Corrected value for `model` given the interpolated `estimate`.
    #[inline]
    pub fn apply<T: FusionFloat>(self, model: T, estimate: Option<T>) -> T {
        let Some(e) = estimate else {
            return model;
        };
        match self {
            CorrectionMode::Additive => model + e,
            CorrectionMode::Multiplicative => model * e,
            CorrectionMode::Direct => e,
        }
    }
}

impl Display for CorrectionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            CorrectionMode::Additive => "additive",
            CorrectionMode::Multiplicative => "multiplicative",
            CorrectionMode::Direct => "direct",
        };
        f.write_str(s)
    }
}

/// Corrected value at one query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointEstimate<T> {
    /// Corrected forecast (or interpolated observation in direct mode).
    pub corrected: T,
    /// Raw interpolated residual (NaN when none was available).
    pub bias: T,
    /// Distance to the nearest active reference.
    pub nearest_distance: T,
    /// Number of neighbors used.
    pub neighbor_count: usize,
    /// True if the forecast was passed through for lack of neighbors.
    pub passed_through: bool,
    /// True if the all-references fallback replaced a degenerate triangulation.
    pub geometry_fallback: bool,
}

/// Interpolation followed by correction, for one reference set and mode.
#[derive(Debug, Clone)]
pub struct CorrectionPipeline<'a, T: FusionFloat> {
    interpolator: Interpolator<'a, T>,
    mode: CorrectionMode,
}

impl<'a, T: FusionFloat> CorrectionPipeline<'a, T> {
    /// Create a pipeline; residuals are computed to suit `mode`.
    pub fn new(
        reference: &'a ReferenceSet<T>,
        policy: NeighborPolicy,
        power: T,
        mode: CorrectionMode,
    ) -> Self {
        Self {
            interpolator: Interpolator::new(reference, policy, power, mode.residual_kind()),
            mode,
        }
    }

    /// Underlying interpolator.
    pub fn interpolator(&self) -> &Interpolator<'a, T> {
        &self.interpolator
    }

    /// Correction mode.
    pub fn mode(&self) -> CorrectionMode {
        self.mode
    }

    /// Estimate the corrected value at `query`, leaving out reference `exclude`.
    pub fn evaluate(
        &self,
        query: &QueryPoint<T>,
        exclude: Option<usize>,
        buf: &mut InterpolationBuffer<T>,
    ) -> Result<PointEstimate<T>, FusionError> {
        let r = self.interpolator.interpolate(query.coords(), exclude, buf)?;
        Ok(PointEstimate {
            corrected: self.mode.apply(query.model, r.estimate),
            bias: r.estimate.unwrap_or_else(T::nan),
            nearest_distance: r.nearest_distance,
            neighbor_count: r.neighbor_count,
            passed_through: r.estimate.is_none(),
            geometry_fallback: r.geometry_fallback,
        })
    }
}

/// Corrected value for `model` given `estimate` under `mode`.
#[inline]
pub fn apply<T: FusionFloat>(model: T, estimate: Option<T>, mode: CorrectionMode) -> T {
    mode.apply(model, estimate)
}
