//! # AirFuse — residual interpolation and fusion of air-quality observations
//!
//! Fuses sparse, irregularly placed point observations from two monitoring
//! networks with a gridded forecast to produce a corrected concentration
//! surface, together with leave-one-out cross-validation of every product.
//!
//! ## How fusion works
//!
//! 1. For each network, the residual of every observation against the
//!    co-located forecast value is computed (`observed - model`, or the
//!    ratio `observed / model` for multiplicative correction).
//! 2. The residual field is interpolated at each query point with an
//!    inverse-power-of-distance kernel over either the `k` nearest references
//!    (IDW) or the Delaunay neighbors of the nearest reference (VNA).
//! 3. The interpolated residual corrects the forecast (additive,
//!    multiplicative, or direct interpolation of the observations).
//! 4. Every reference is re-estimated without itself (leave-one-out) to
//!    score each variant.
//! 5. The two network surfaces are blended with weights from each network's
//!    distance to its nearest reference, with a floor distance for the denser,
//!    less precise network.
//!
//! ## Quick Start
//!
//! ```rust
//! use airfuse::prelude::*;
//!
//! // Regulatory monitors (network A) and low-cost sensors (network B).
//! let monitors = ReferenceSet::from_columns(
//!     Network::A,
//!     &[0.0, 10.0, 0.0, 10.0],
//!     &[0.0, 0.0, 10.0, 10.0],
//!     &[12.0, 15.0, 9.0, 11.0],
//!     &[10.0, 10.0, 10.0, 10.0],
//! )?;
//! let sensors = ReferenceSet::from_columns(
//!     Network::B,
//!     &[5.0, 2.0, 8.0],
//!     &[5.0, 8.0, 2.0],
//!     &[13.0, 10.0, 14.0],
//!     &[10.0, 10.0, 10.0],
//! )?;
//!
//! // Target grid cells with their forecast values.
//! let grid = vec![QueryPoint::new(5.0, 5.0, 10.0), QueryPoint::new(1.0, 1.0, 10.0)];
//!
//! let run = AirFuse::new()
//!     .grid_spacing(1.0, 1.0) // floor of network B: half the cell diagonal
//!     .build()?;
//!
//! let output = run.run(&monitors, &sensors, Some(&grid[..]))?;
//!
//! let fused = output.target.as_ref().and_then(|t| t.column("FUSED_aVNA"));
//! assert!(fused.is_some());
//! assert!(output.cv_a.column("LOO_aVNA_AN").is_some());
//! # Result::<(), FusionError>::Ok(())
//! ```
//!
//! ### Result and Error Handling
//!
//! `run` returns a `Result<FusionOutput<T>, FusionError>`. Configuration
//! errors are raised by `build()`, before any per-point work. Per-point
//! problems never abort a run: a query with no usable neighbor passes the
//! forecast through, a degenerate triangulation falls back to all references,
//! and a failed point yields NaN in its row.
//!
//! ### Configuration files
//!
//! ```rust
//! use airfuse::prelude::*;
//!
//! let config = FusionConfig::from_toml_str(
//!     r#"
//!     blend_power = -2.0
//!     floor_distance_b = 6000.0
//!     cv_only = true
//!     "#,
//! )?;
//! let run = AirFuse::new().config(config).build()?;
//! assert!(run.config().cv_only);
//! # Result::<(), FusionError>::Ok(())
//! ```
//!
//! ## Variants
//!
//! | name | neighbors       | power | correction     |
//! |------|-----------------|-------|----------------|
//! | IDW  | 10 nearest      | −5    | direct         |
//! | VNA  | Delaunay        | −2    | direct         |
//! | aIDW | 10 nearest      | −5    | additive       |
//! | aVNA | Delaunay        | −2    | additive       |
//! | eVNA | Delaunay        | −2    | multiplicative |
//!
//! ## Features
//!
//! * `parallel` (default): evaluate query points on the rayon pool.
//! * `dev`: expose internal modules for testing.
//!
//! ## Logging
//!
//! The crate emits `tracing` events (variant begin/finish at info level,
//! degraded points at warn and debug level) and never installs a subscriber.

#![warn(missing_docs)]

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - data model, errors and search buffers.
mod primitives;

// Layer 2: Math - distance, KD-tree, Delaunay adjacency, weighting kernel.
mod math;

// Layer 3: Algorithms - reference sets, neighbor selection, interpolation
// and correction.
mod algorithms;

// Layer 4: Evaluation - batch evaluation, leave-one-out, CV metrics.
mod evaluation;

// Layer 5: Engine - configuration, validation, orchestration, blending.
mod engine;

// High-level fluent API.
mod api;

// ============================================================================
// Prelude
// ============================================================================

/// Standard AirFuse prelude.
///
/// ```
/// use airfuse::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{
        apply, blend, default_blends, default_variants, interpolate, inverse_distance_weight,
        validate_all, BlendParams, BlendSpec, Blended, Column, ColumnKind, CorrectionMode,
        CorrectionPipeline, CvMetrics, EnsembleBlender, EnsembleWeight, FusionBuilder as AirFuse,
        FusionConfig, FusionError, FusionFloat, FusionOutput, FusionRun, FusionTable,
        FusionVariant, GridSpacing, Interpolated, InterpolationBuffer, Interpolator, LooRow,
        NeighborList, NeighborPolicy, NeighborSelector, Network, NetworkTags, ObservationPoint,
        PointEstimate, QueryPoint, ReferenceSet, ResidualKind,
    };
}

pub use api::{FusionBuilder, FusionRun};

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// Only available with the `dev` feature enabled.
///
/// **Warning**: These are internal implementation details and may change without notice.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types and utilities.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal core algorithms.
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    /// Internal evaluation.
    pub mod evaluation {
        pub use crate::evaluation::*;
    }
    /// Internal execution engine.
    pub mod engine {
        pub use crate::engine::*;
    }
    /// Internal API.
    pub mod api {
        pub use crate::api::*;
    }
}
