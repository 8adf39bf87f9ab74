//! Layer 4: Evaluation
//!
//! # Purpose
//!
//! This layer runs the algorithms over whole batches of query points and
//! scores the results:
//! - Batch evaluation with per-thread scratch buffers
//! - Leave-one-out cross-validation of a reference set
//! - Summary statistics of estimates against observations
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Evaluation ← You are here
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Batch evaluation over query points.
pub mod batch;

/// Leave-one-out cross-validation.
pub mod loo;

/// Cross-validation summary statistics.
pub mod metrics;
