//! Ensemble blending of the two network surfaces.
//!
//! ## Purpose
//!
//! This module combines one corrected value per network into a fused value,
//! weighting each network by the inverse distance (to a configurable power)
//! from the query to that network's nearest reference.
//!
//! ## Design notes
//!
//! * **Floor distance**: A network's distance is clamped to its floor before
//!   weighting, so it is never treated as closer than the floor. With the
//!   default floor of half a cell diagonal for network B, network A wins
//!   within a cell whenever it has a reference there.
//! * **Missing estimates**: A network whose value or distance is not finite
//!   keeps its constant fallback weight and contributes the forecast value;
//!   the other network takes the remainder. This blends a small constant
//!   share of the forecast in rather than renormalizing to the other network.
//! * **Nothing valid**: The forecast value is returned with equal weights.
//!
//! ## Invariants
//!
//! * Weights are non-negative and sum to one.
//! * Swapping the networks (and their parameters) leaves the fused value
//!   unchanged.

use crate::engine::config::FusionConfig;
use crate::math::kernel::normalized_weights;
use crate::primitives::errors::FusionError;
use crate::primitives::points::{FusionFloat, Network};

// ============================================================================
// Parameters and Results
// ============================================================================

/// Parameters of the ensemble blend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendParams<T> {
    /// Inverse-distance power (negative).
    pub power: T,
    /// Floor distance of network A.
    pub floor_a: T,
    /// Floor distance of network B.
    pub floor_b: T,
    /// Constant weight of network A where its estimate is missing.
    pub fallback_a: T,
    /// Constant weight of network B where its estimate is missing.
    pub fallback_b: T,
}

impl<T: FusionFloat> BlendParams<T> {
    /// Parameters taken from a configuration.
    pub fn from_config(config: &FusionConfig) -> Self {
        let cast = |v: f64| T::from(v).unwrap_or_else(T::nan);
        Self {
            power: cast(config.blend_power),
            floor_a: cast(config.floor_distance(Network::A)),
            floor_b: cast(config.floor_distance(Network::B)),
            fallback_a: cast(config.fallback_weight(Network::A)),
            fallback_b: cast(config.fallback_weight(Network::B)),
        }
    }

    /// The same parameters with the roles of the networks swapped.
    pub fn swapped(&self) -> Self {
        Self {
            power: self.power,
            floor_a: self.floor_b,
            floor_b: self.floor_a,
            fallback_a: self.fallback_b,
            fallback_b: self.fallback_a,
        }
    }
}

/// Weights of the two networks at one query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleWeight<T> {
    /// Weight of network A.
    pub a: T,
    /// Weight of network B.
    pub b: T,
}

/// Fused value at one query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blended<T> {
    /// Fused value.
    pub value: T,
    /// Weights used.
    pub weight: EnsembleWeight<T>,
}

// ============================================================================
// Blender
// ============================================================================

/// Distance-weighted blender of two network estimates.
#[derive(Debug, Clone, Copy)]
pub struct EnsembleBlender<T> {
    params: BlendParams<T>,
}

impl<T: FusionFloat> EnsembleBlender<T> {
    /// Create a blender.
    pub fn new(params: BlendParams<T>) -> Self {
        Self { params }
    }

    /// Blend parameters.
    pub fn params(&self) -> &BlendParams<T> {
        &self.params
    }

    /// Weights for two valid networks at raw distances `dist_a`, `dist_b`.
    pub fn weights(&self, dist_a: T, dist_b: T) -> EnsembleWeight<T> {
        let eff = [dist_a.max(self.params.floor_a), dist_b.max(self.params.floor_b)];
        let w = normalized_weights(&eff, self.params.power);
        EnsembleWeight { a: w[0], b: w[1] }
    }

    /// Fuse one query point.
    pub fn blend_point(&self, model: T, value_a: T, dist_a: T, value_b: T, dist_b: T) -> Blended<T> {
        let valid_a = value_a.is_finite() && dist_a.is_finite();
        let valid_b = value_b.is_finite() && dist_b.is_finite();
        let half = T::from(0.5).unwrap_or_else(T::nan);

        let (weight, contrib_a, contrib_b) = match (valid_a, valid_b) {
            (true, true) => (self.weights(dist_a, dist_b), value_a, value_b),
            (true, false) => {
                let b = self.params.fallback_b;
                (EnsembleWeight { a: T::one() - b, b }, value_a, model)
            }
            (false, true) => {
                let a = self.params.fallback_a;
                (EnsembleWeight { a, b: T::one() - a }, model, value_b)
            }
            (false, false) => {
                return Blended {
                    value: model,
                    weight: EnsembleWeight { a: half, b: half },
                }
            }
        };

        let term = |w: T, v: T| if w > T::zero() { w * v } else { T::zero() };
        Blended {
            value: term(weight.a, contrib_a) + term(weight.b, contrib_b),
            weight,
        }
    }

    /// Fuse every query point of two aligned estimate columns.
    pub fn blend(
        &self,
        model: &[T],
        values_a: &[T],
        dist_a: &[T],
        values_b: &[T],
        dist_b: &[T],
    ) -> Result<Vec<Blended<T>>, FusionError> {
        let n = model.len();
        for (what, len) in [
            ("values_a", values_a.len()),
            ("dist_a", dist_a.len()),
            ("values_b", values_b.len()),
            ("dist_b", dist_b.len()),
        ] {
            if len != n {
                return Err(FusionError::MismatchedInputs {
                    what,
                    got: len,
                    expected: n,
                });
            }
        }

        Ok((0..n)
            .map(|i| self.blend_point(model[i], values_a[i], dist_a[i], values_b[i], dist_b[i]))
            .collect())
    }
}

/// Fuse two aligned estimate columns with `params`.
pub fn blend<T: FusionFloat>(
    model: &[T],
    values_a: &[T],
    dist_a: &[T],
    values_b: &[T],
    dist_b: &[T],
    params: BlendParams<T>,
) -> Result<Vec<Blended<T>>, FusionError> {
    EnsembleBlender::new(params).blend(model, values_a, dist_a, values_b, dist_b)
}
