//! Registered fusion variants and blend specifications.
//!
//! ## Purpose
//!
//! A fusion variant is a closed descriptor `{name, policy, power, mode}`
//! handled by the single interpolation and correction pipeline. This module
//! defines the descriptor, the default variant table and the blend
//! specifications that pair one variant across the two networks.
//!
//! ## Key concepts
//!
//! | name | policy         | power | mode           |
//! |------|----------------|-------|----------------|
//! | IDW  | fixed-k (k=10) | -5    | direct         |
//! | VNA  | delaunay       | -2    | direct         |
//! | aIDW | fixed-k (k=10) | -5    | additive       |
//! | aVNA | delaunay       | -2    | additive       |
//! | eVNA | delaunay       | -2    | multiplicative |

use serde::{Deserialize, Serialize};

use crate::algorithms::correction::CorrectionMode;
use crate::algorithms::selector::NeighborPolicy;

/// Default neighbor count of the nearest-neighbor variants.
pub const DEFAULT_K: usize = 10;

/// Default power of the nearest-neighbor variants.
pub const DEFAULT_IDW_POWER: f64 = -5.0;

/// Default power of the Delaunay-neighbor variants.
pub const DEFAULT_VNA_POWER: f64 = -2.0;

// ============================================================================
// Fusion Variant
// ============================================================================

/// One named interpolation and correction recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionVariant {
    /// Name used in column keys (e.g. `aVNA`).
    pub name: String,
    /// Neighbor-selection policy.
    pub policy: NeighborPolicy,
    /// Inverse-distance power (negative).
    pub power: f64,
    /// Correction mode.
    pub mode: CorrectionMode,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

impl FusionVariant {
    /// Create a variant without a description.
    pub fn new(name: impl Into<String>, policy: NeighborPolicy, power: f64, mode: CorrectionMode) -> Self {
        Self {
            name: name.into(),
            policy,
            power,
            mode,
            description: String::new(),
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Nearest-neighbor interpolation of the observations.
    pub fn idw() -> Self {
        Self::new(
            "IDW",
            NeighborPolicy::FixedK { k: DEFAULT_K },
            DEFAULT_IDW_POWER,
            CorrectionMode::Direct,
        )
        .with_description("NN weighted (n=10, d**-5) observations")
    }

    /// Delaunay-neighbor interpolation of the observations.
    pub fn vna() -> Self {
        Self::new("VNA", NeighborPolicy::Delaunay, DEFAULT_VNA_POWER, CorrectionMode::Direct)
            .with_description("VN weighted (n=nv, d**-2) observations")
    }

    /// Nearest-neighbor bias added to the forecast.
    pub fn aidw() -> Self {
        Self::new(
            "aIDW",
            NeighborPolicy::FixedK { k: DEFAULT_K },
            DEFAULT_IDW_POWER,
            CorrectionMode::Additive,
        )
        .with_description("IDW of bias added to the forecast")
    }

    /// Delaunay-neighbor bias added to the forecast.
    pub fn avna() -> Self {
        Self::new("aVNA", NeighborPolicy::Delaunay, DEFAULT_VNA_POWER, CorrectionMode::Additive)
            .with_description("VNA of bias added to the forecast")
    }

    /// Delaunay-neighbor ratio multiplying the forecast.
    pub fn evna() -> Self {
        Self::new(
            "eVNA",
            NeighborPolicy::Delaunay,
            DEFAULT_VNA_POWER,
            CorrectionMode::Multiplicative,
        )
        .with_description("VNA of ratio bias multiplying the forecast")
    }

    /// Column key of this variant's estimate for a network tag.
    pub fn column(&self, tag: &str) -> String {
        format!("{}_{}", self.name, tag)
    }
}

/// The registered variant table: IDW, VNA, aIDW, aVNA, eVNA.
pub fn default_variants() -> Vec<FusionVariant> {
    vec![
        FusionVariant::idw(),
        FusionVariant::vna(),
        FusionVariant::aidw(),
        FusionVariant::avna(),
        FusionVariant::evna(),
    ]
}

// ============================================================================
// Blend Specification
// ============================================================================

/// A variant whose two network estimates are blended into one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendSpec {
    /// Variant name (must be registered).
    pub variant: String,
    /// Also blend on the target surface, not only on the CV table.
    #[serde(default = "default_on_target")]
    pub on_target: bool,
}

fn default_on_target() -> bool {
    true
}

impl BlendSpec {
    /// Blend `variant` on both the CV table and the target surface.
    pub fn new(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            on_target: true,
        }
    }

    /// Blend `variant` on the CV table only.
    pub fn cv_only(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            on_target: false,
        }
    }

    /// Output column key (`FUSED_<variant>`).
    pub fn column(&self) -> String {
        format!("FUSED_{}", self.variant)
    }
}

/// Default blends: aVNA and aIDW everywhere, eVNA on the CV table only.
pub fn default_blends() -> Vec<BlendSpec> {
    vec![
        BlendSpec::new("aVNA"),
        BlendSpec::cv_only("eVNA"),
        BlendSpec::new("aIDW"),
    ]
}
