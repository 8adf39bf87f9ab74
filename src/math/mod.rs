//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides pure geometric and numerical building blocks:
//! - Euclidean distance and grid-spacing helpers
//! - KD-tree k-nearest-neighbor search
//! - Delaunay triangulation adjacency
//! - The inverse-power-of-distance kernel
//!
//! These carry no fusion-specific logic.
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
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Euclidean distance and grid spacing.
pub mod distance;

/// KD-tree for k-nearest neighbor search.
pub mod neighborhood;

/// Delaunay triangulation (Bowyer-Watson) and vertex adjacency.
pub mod delaunay;

/// Inverse-distance weighting kernel.
pub mod kernel;
