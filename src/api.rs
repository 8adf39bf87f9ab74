//! High-level API for two-network data fusion.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point. It implements a
//! fluent builder for the run configuration and a [`FusionRun`] that executes
//! a complete fusion over two reference sets and an optional target surface.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all parameters.
//! * **Validated**: The configuration is validated once in `build()`, before
//!   any per-point work.
//! * **Type-Safe**: Generic over `Float` types for flexible precision.
//!
//! ## Key concepts
//!
//! ### Configuration Flow
//!
//! 1. Create a [`FusionBuilder`] via `AirFuse::new()`.
//! 2. Chain configuration methods (`.blend_power()`, `.grid_spacing()`, etc.),
//!    optionally starting from a loaded [`FusionConfig`] with `.config()`.
//! 3. Call `.build()` to obtain a validated [`FusionRun`].
//! 4. Call `.run()` with the reference sets and the target surface.

use crate::engine::executor::FusionExecutor;
use crate::engine::validator::Validator;

// Publicly re-exported types
pub use crate::algorithms::correction::{apply, CorrectionMode, CorrectionPipeline, PointEstimate};
pub use crate::algorithms::interpolation::{
    interpolate, Interpolated, InterpolationBuffer, Interpolator, ResidualKind,
};
pub use crate::algorithms::reference::ReferenceSet;
pub use crate::algorithms::selector::{NeighborPolicy, NeighborSelector};
pub use crate::engine::blender::{blend, BlendParams, Blended, EnsembleBlender, EnsembleWeight};
pub use crate::engine::config::{FusionConfig, GridSpacing, NetworkTags};
pub use crate::engine::output::{Column, ColumnKind, FusionOutput, FusionTable};
pub use crate::engine::variants::{default_blends, default_variants, BlendSpec, FusionVariant};
pub use crate::evaluation::loo::{validate_all, LooRow};
pub use crate::evaluation::metrics::CvMetrics;
pub use crate::math::kernel::inverse_distance_weight;
pub use crate::math::neighborhood::NeighborList;
pub use crate::primitives::errors::FusionError;
pub use crate::primitives::points::{FusionFloat, Network, ObservationPoint, QueryPoint};

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for configuring a fusion run.
#[derive(Debug, Clone, Default)]
pub struct FusionBuilder {
    /// Base configuration that explicit settings override.
    pub base: Option<FusionConfig>,

    /// Registered variants.
    pub variants: Option<Vec<FusionVariant>>,

    /// Blended variants.
    pub blends: Option<Vec<BlendSpec>>,

    /// Inverse-distance power of the blend.
    pub blend_power: Option<f64>,

    /// Floor distance of network A.
    pub floor_distance_a: Option<f64>,

    /// Floor distance of network B.
    pub floor_distance_b: Option<f64>,

    /// Target grid spacing.
    pub grid_spacing: Option<GridSpacing>,

    /// Fallback weight of network A.
    pub fallback_weight_a: Option<f64>,

    /// Fallback weight of network B.
    pub fallback_weight_b: Option<f64>,

    /// Network tags.
    pub tags: Option<NetworkTags>,

    /// Cross-validation only.
    pub cv_only: Option<bool>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl FusionBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration (e.g. loaded from TOML).
    pub fn config(mut self, config: FusionConfig) -> Self {
        if self.base.is_some() {
            self.duplicate_param = Some("config");
        }
        self.base = Some(config);
        self
    }

    /// Replace the variant table.
    pub fn variants(mut self, variants: Vec<FusionVariant>) -> Self {
        if self.variants.is_some() {
            self.duplicate_param = Some("variants");
        }
        self.variants = Some(variants);
        self
    }

    /// Replace the blended variants.
    pub fn blends(mut self, blends: Vec<BlendSpec>) -> Self {
        if self.blends.is_some() {
            self.duplicate_param = Some("blends");
        }
        self.blends = Some(blends);
        self
    }

    /// Set the inverse-distance power of the blend (default −2).
    pub fn blend_power(mut self, power: f64) -> Self {
        if self.blend_power.is_some() {
            self.duplicate_param = Some("blend_power");
        }
        self.blend_power = Some(power);
        self
    }

    /// Set the floor distance of network A (default 0).
    pub fn floor_distance_a(mut self, floor: f64) -> Self {
        if self.floor_distance_a.is_some() {
            self.duplicate_param = Some("floor_distance_a");
        }
        self.floor_distance_a = Some(floor);
        self
    }

    /// Set the floor distance of network B explicitly.
    pub fn floor_distance_b(mut self, floor: f64) -> Self {
        if self.floor_distance_b.is_some() {
            self.duplicate_param = Some("floor_distance_b");
        }
        self.floor_distance_b = Some(floor);
        self
    }

    /// Set the target grid spacing; network B's floor defaults to half its diagonal.
    pub fn grid_spacing(mut self, dx: f64, dy: f64) -> Self {
        if self.grid_spacing.is_some() {
            self.duplicate_param = Some("grid_spacing");
        }
        self.grid_spacing = Some(GridSpacing::new(dx, dy));
        self
    }

    /// Set the fallback weight of network A (default none).
    pub fn fallback_weight_a(mut self, weight: f64) -> Self {
        if self.fallback_weight_a.is_some() {
            self.duplicate_param = Some("fallback_weight_a");
        }
        self.fallback_weight_a = Some(weight);
        self
    }

    /// Set the fallback weight of network B (default 0.25).
    pub fn fallback_weight_b(mut self, weight: f64) -> Self {
        if self.fallback_weight_b.is_some() {
            self.duplicate_param = Some("fallback_weight_b");
        }
        self.fallback_weight_b = Some(weight);
        self
    }

    /// Set the column-key tags of the networks (default `AN`, `PA`).
    pub fn tags(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        if self.tags.is_some() {
            self.duplicate_param = Some("tags");
        }
        self.tags = Some(NetworkTags {
            a: a.into(),
            b: b.into(),
        });
        self
    }

    /// Skip the target surface; only cross-validation tables are produced.
    pub fn cv_only(mut self) -> Self {
        if self.cv_only.is_some() {
            self.duplicate_param = Some("cv_only");
        }
        self.cv_only = Some(true);
        self
    }

    /// Validate the settings and produce a runnable fusion.
    pub fn build(self) -> Result<FusionRun, FusionError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;

        let mut config = self.base.unwrap_or_default();
        if let Some(v) = self.variants {
            config.variants = v;
        }
        if let Some(b) = self.blends {
            config.blends = b;
        }
        if let Some(p) = self.blend_power {
            config.blend_power = p;
        }
        if let Some(f) = self.floor_distance_a {
            config.floor_distance_a = f;
        }
        if let Some(f) = self.floor_distance_b {
            config.floor_distance_b = Some(f);
        }
        if let Some(g) = self.grid_spacing {
            config.grid_spacing = Some(g);
        }
        if let Some(w) = self.fallback_weight_a {
            config.fallback_weight_a = Some(w);
        }
        if let Some(w) = self.fallback_weight_b {
            config.fallback_weight_b = Some(w);
        }
        if let Some(t) = self.tags {
            config.tags = t;
        }
        if let Some(c) = self.cv_only {
            config.cv_only = c;
        }

        Validator::validate_config(&config)?;
        Ok(FusionRun { config })
    }
}

// ============================================================================
// Run
// ============================================================================

/// A validated fusion, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionRun {
    config: FusionConfig,
}

impl FusionRun {
    /// Validated configuration.
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuse two reference sets, optionally over a target surface.
    ///
    /// With `target = None` (or `cv_only`) only the CV tables are produced.
    pub fn run<T: FusionFloat>(
        &self,
        reference_a: &ReferenceSet<T>,
        reference_b: &ReferenceSet<T>,
        target: Option<&[QueryPoint<T>]>,
    ) -> Result<FusionOutput<T>, FusionError> {
        if let Some(queries) = target.filter(|_| !self.config.cv_only) {
            Validator::validate_queries(queries)?;
        }
        FusionExecutor::new(&self.config).run(reference_a, reference_b, target)
    }

    /// Build the reference sets from paired observations and run.
    pub fn run_points<T: FusionFloat>(
        &self,
        points_a: Vec<ObservationPoint<T>>,
        points_b: Vec<ObservationPoint<T>>,
        target: Option<&[QueryPoint<T>]>,
    ) -> Result<FusionOutput<T>, FusionError> {
        let reference_a = ReferenceSet::new(Network::A, points_a)?;
        let reference_b = ReferenceSet::new(Network::B, points_b)?;
        self.run(&reference_a, &reference_b, target)
    }
}
