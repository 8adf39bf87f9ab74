//! Explicit run configuration.
//!
//! ## Purpose
//!
//! [`FusionConfig`] carries every setting a fusion run needs: the variant
//! table, the blends, the blending power, floor distances and fallback
//! weights, and the network tags used in column keys. It is passed to the
//! engine explicitly; there is no global state.
//!
//! ## Design notes
//!
//! * **TOML**: The configuration round-trips through TOML with `serde`.
//!   Every field has a default, so a partial file is valid.
//! * **Floor of network B**: Unless given explicitly, the floor is half the
//!   diagonal of one grid cell, derived from [`GridSpacing`].
//!
//! ## Invariants
//!
//! * A configuration is validated once, before any per-point work.

use serde::{Deserialize, Serialize};

use crate::engine::variants::{default_blends, default_variants, BlendSpec, FusionVariant};
use crate::math::distance::{half_cell_diagonal, mean_spacing};
use crate::primitives::errors::FusionError;
use crate::primitives::points::Network;

/// Default inverse-distance power of the ensemble blend.
pub const DEFAULT_BLEND_POWER: f64 = -2.0;

/// Default constant weight of network B where its estimate is missing.
pub const DEFAULT_FALLBACK_WEIGHT_B: f64 = 0.25;

// ============================================================================
// Grid Spacing
// ============================================================================

/// Cell spacing of the target grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpacing {
    /// Spacing along x.
    pub dx: f64,
    /// Spacing along y.
    pub dy: f64,
}

impl GridSpacing {
    /// Create a spacing.
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Mean spacing of two grid axes (cell-center coordinates).
    pub fn from_axes(x: &[f64], y: &[f64]) -> Result<Self, FusionError> {
        let dx = mean_spacing(x).ok_or(FusionError::InsufficientData { got: x.len(), needed: 2 })?;
        let dy = mean_spacing(y).ok_or(FusionError::InsufficientData { got: y.len(), needed: 2 })?;
        Ok(Self { dx, dy })
    }

    /// Half the cell diagonal.
    pub fn floor_distance(&self) -> f64 {
        half_cell_diagonal(self.dx, self.dy)
    }
}

// ============================================================================
// Network Tags
// ============================================================================

/// Short tags of the two networks used in column keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTags {
    /// Tag of network A.
    #[serde(default = "default_tag_a")]
    pub a: String,
    /// Tag of network B.
    #[serde(default = "default_tag_b")]
    pub b: String,
}

fn default_tag_a() -> String {
    "AN".to_string()
}

fn default_tag_b() -> String {
    "PA".to_string()
}

impl Default for NetworkTags {
    fn default() -> Self {
        Self {
            a: default_tag_a(),
            b: default_tag_b(),
        }
    }
}

impl NetworkTags {
    /// Tag of `network`.
    pub fn tag(&self, network: Network) -> &str {
        match network {
            Network::A => &self.a,
            Network::B => &self.b,
        }
    }
}

// ============================================================================
// Fusion Config
// ============================================================================

/// Complete configuration of a fusion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Registered variants, evaluated in order.
    #[serde(default = "default_variants")]
    pub variants: Vec<FusionVariant>,

    /// Variant columns blended across the two networks.
    #[serde(default = "default_blends")]
    pub blends: Vec<BlendSpec>,

    /// Inverse-distance power of the ensemble blend.
    #[serde(default = "default_blend_power")]
    pub blend_power: f64,

    /// Floor distance of network A.
    #[serde(default)]
    pub floor_distance_a: f64,

    /// Floor distance of network B; derived from `grid_spacing` if absent.
    #[serde(default)]
    pub floor_distance_b: Option<f64>,

    /// Target grid spacing, used to derive the floor of network B.
    #[serde(default)]
    pub grid_spacing: Option<GridSpacing>,

    /// Constant weight of network A where its estimate is missing.
    #[serde(default)]
    pub fallback_weight_a: Option<f64>,

    /// Constant weight of network B where its estimate is missing.
    #[serde(default = "default_fallback_weight_b")]
    pub fallback_weight_b: Option<f64>,

    /// Column-key tags of the networks.
    #[serde(default)]
    pub tags: NetworkTags,

    /// Skip the target surface even if one is supplied.
    #[serde(default)]
    pub cv_only: bool,
}

fn default_blend_power() -> f64 {
    DEFAULT_BLEND_POWER
}

fn default_fallback_weight_b() -> Option<f64> {
    Some(DEFAULT_FALLBACK_WEIGHT_B)
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            variants: default_variants(),
            blends: default_blends(),
            blend_power: DEFAULT_BLEND_POWER,
            floor_distance_a: 0.0,
            floor_distance_b: None,
            grid_spacing: None,
            fallback_weight_a: None,
            fallback_weight_b: default_fallback_weight_b(),
            tags: NetworkTags::default(),
            cv_only: false,
        }
    }
}

impl FusionConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, FusionError> {
        toml::from_str(s).map_err(|e| FusionError::Toml(e.to_string()))
    }

    /// Serialize the configuration to TOML text.
    pub fn to_toml_string(&self) -> Result<String, FusionError> {
        toml::to_string(self).map_err(|e| FusionError::Toml(e.to_string()))
    }

    /// Effective floor distance of `network`.
    pub fn floor_distance(&self, network: Network) -> f64 {
        match network {
            Network::A => self.floor_distance_a,
            Network::B => self
                .floor_distance_b
                .or_else(|| self.grid_spacing.map(|g| g.floor_distance()))
                .unwrap_or(0.0),
        }
    }

    /// Fallback weight of `network` (zero if none is configured).
    pub fn fallback_weight(&self, network: Network) -> f64 {
        match network {
            Network::A => self.fallback_weight_a,
            Network::B => self.fallback_weight_b,
        }
        .unwrap_or(0.0)
    }

    /// Registered variant called `name`.
    pub fn variant(&self, name: &str) -> Option<&FusionVariant> {
        self.variants.iter().find(|v| v.name == name)
    }
}
