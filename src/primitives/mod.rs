//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer provides the fundamental data structures shared by every
//! other layer:
//! - The crate error type
//! - Observation, reference and query point types
//! - Reusable search buffers
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
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Error types for fusion operations.
pub mod errors;

/// Observation points, reference sets and query points.
pub mod points;

/// Reusable buffers for neighbor searches.
pub mod buffer;
