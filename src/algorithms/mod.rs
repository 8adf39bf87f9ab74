//! Layer 3: Algorithms
//!
//! # Purpose
//!
//! This layer composes the math building blocks into the fusion algorithms:
//! - Reference sets with cached spatial indexes
//! - Neighbor selection (fixed-k nearest or Delaunay-adjacent)
//! - Residual interpolation at arbitrary query points
//! - Additive, multiplicative and direct correction of the forecast
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Reference sets (interpolation anchors) with cached indexes.
pub mod reference;

/// Neighbor selection policies.
pub mod selector;

/// Residual interpolation engine.
pub mod interpolation;

/// Forecast correction modes.
pub mod correction;
