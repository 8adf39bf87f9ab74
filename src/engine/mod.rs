//! Layer 5: Engine
//!
//! # Purpose
//!
//! This layer turns a configuration into a complete fusion run:
//! - Run configuration and the registered variant table
//! - Fail-fast validation of configuration and inputs
//! - Orchestration of the per-network passes
//! - Ensemble blending of the two networks
//! - Output tables
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine ← You are here
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Run configuration.
pub mod config;

/// Fusion variant descriptors and blend specifications.
pub mod variants;

/// Configuration and input validation.
pub mod validator;

/// Ensemble blending.
pub mod blender;

/// Output tables.
pub mod output;

/// Run orchestration.
pub mod executor;
