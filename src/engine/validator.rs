//! Validation of fusion configuration and inputs.
//!
//! ## Purpose
//!
//! This module checks a [`FusionConfig`] and the run inputs before any
//! per-point computation begins, so invalid power, neighbor count, floor,
//! fallback or variant combinations fail at configuration time.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Efficiency**: Checks are ordered from cheap to expensive.
//!
//! ## Invariants
//!
//! * Powers are finite and negative; `k >= 1`.
//! * Floors are finite and non-negative; fallback weights lie in `[0, 1]`.
//! * Variant names are unique and every blend names a registered variant.
//!
//! ## Non-goals
//!
//! * This module does not correct invalid inputs.

use std::collections::HashSet;

use num_traits::Float;

use crate::algorithms::selector::NeighborPolicy;
use crate::engine::config::FusionConfig;
use crate::engine::variants::FusionVariant;
use crate::primitives::errors::FusionError;
use crate::primitives::points::{Network, QueryPoint};

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for fusion configuration and inputs.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Configuration
    // ========================================================================

    /// Validate a complete configuration.
    pub fn validate_config(config: &FusionConfig) -> Result<(), FusionError> {
        Self::validate_power(config.blend_power)?;
        for network in [Network::A, Network::B] {
            Self::validate_floor(config.floor_distance(network))?;
            Self::validate_fallback(config.fallback_weight(network))?;
        }
        if let Some(g) = config.grid_spacing {
            Self::validate_scalar(g.dx, "grid_spacing.dx")?;
            Self::validate_scalar(g.dy, "grid_spacing.dy")?;
        }
        if config.tags.a.is_empty() || config.tags.b.is_empty() || config.tags.a == config.tags.b {
            return Err(FusionError::Configuration(format!(
                "network tags must be distinct and non-empty (got '{}' and '{}')",
                config.tags.a, config.tags.b
            )));
        }
        Self::validate_variants(&config.variants)?;
        Self::validate_blends(config)
    }

    /// Validate the variant table.
    pub fn validate_variants(variants: &[FusionVariant]) -> Result<(), FusionError> {
        if variants.is_empty() {
            return Err(FusionError::Configuration(
                "at least one fusion variant is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for v in variants {
            if v.name.is_empty() {
                return Err(FusionError::Configuration("variant name is empty".into()));
            }
            if !seen.insert(v.name.as_str()) {
                return Err(FusionError::DuplicateVariant(v.name.clone()));
            }
            Self::validate_power(v.power)?;
            Self::validate_policy(v.policy)?;
        }
        Ok(())
    }

    /// Validate that every blend names a registered variant, once.
    pub fn validate_blends(config: &FusionConfig) -> Result<(), FusionError> {
        let mut seen = HashSet::new();
        for b in &config.blends {
            if config.variant(&b.variant).is_none() {
                return Err(FusionError::UnknownVariant(b.variant.clone()));
            }
            if !seen.insert(b.variant.as_str()) {
                return Err(FusionError::DuplicateVariant(b.column()));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Validate an inverse-distance power.
    pub fn validate_power(power: f64) -> Result<(), FusionError> {
        if !power.is_finite() || power >= 0.0 {
            return Err(FusionError::InvalidPower(power));
        }
        Ok(())
    }

    /// Validate a neighbor policy.
    pub fn validate_policy(policy: NeighborPolicy) -> Result<(), FusionError> {
        match policy {
            NeighborPolicy::FixedK { k } if k == 0 => Err(FusionError::InvalidNeighborCount(k)),
            _ => Ok(()),
        }
    }

    /// Validate a floor distance.
    pub fn validate_floor(floor: f64) -> Result<(), FusionError> {
        if !floor.is_finite() || floor < 0.0 {
            return Err(FusionError::InvalidFloorDistance(floor));
        }
        Ok(())
    }

    /// Validate a fallback weight.
    pub fn validate_fallback(weight: f64) -> Result<(), FusionError> {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(FusionError::InvalidFallbackWeight(weight));
        }
        Ok(())
    }

    /// Validate a single numeric value for finiteness.
    pub fn validate_scalar<T: Float>(val: T, name: &str) -> Result<(), FusionError> {
        if !val.is_finite() {
            return Err(FusionError::InvalidNumericValue(format!(
                "{}={}",
                name,
                val.to_f64().unwrap_or(f64::NAN)
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Validate the target surface.
    ///
    /// Coordinates must be finite; a non-finite forecast value only affects
    /// its own row.
    pub fn validate_queries<T: Float>(queries: &[QueryPoint<T>]) -> Result<(), FusionError> {
        for (i, q) in queries.iter().enumerate() {
            if !q.x.is_finite() || !q.y.is_finite() {
                return Err(FusionError::InvalidNumericValue(format!(
                    "target[{}]=({}, {})",
                    i,
                    q.x.to_f64().unwrap_or(f64::NAN),
                    q.y.to_f64().unwrap_or(f64::NAN)
                )));
            }
        }
        Ok(())
    }

    /// Validate that no parameters were set multiple times in the builder.
    pub fn validate_no_duplicates(duplicate_param: Option<&'static str>) -> Result<(), FusionError> {
        if let Some(param) = duplicate_param {
            return Err(FusionError::DuplicateParameter { parameter: param });
        }
        Ok(())
    }
}
