//! Observation and query point types.
//!
//! ## Purpose
//!
//! This module defines the immutable records the fusion core consumes:
//! paired observations (an observed concentration plus the co-located
//! forecast value) and query points (a coordinate plus the forecast value
//! to be corrected).
//!
//! ## Key concepts
//!
//! * **Network**: One of two independent observation sources. Network A is
//!   the sparse, precise one (regulatory monitors); network B is the dense,
//!   lower-precision one (low-cost sensors).
//! * **Pairing**: Projecting coordinates and attaching the forecast value
//!   happens outside the crate; points arrive already paired.
//!
//! ## Invariants
//!
//! * Points are never mutated once constructed.

use core::fmt::{self, Debug, Display};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Floating point bound used throughout the crate.
pub trait FusionFloat: Float + Debug + Send + Sync + 'static {}

impl FusionFloat for f32 {}
impl FusionFloat for f64 {}

/// Observation network membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Network {
    /// Sparse, high-precision network (e.g. regulatory monitors).
    #[default]
    A,
    /// Dense, lower-precision network (e.g. low-cost sensors).
    B,
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::A => write!(f, "A"),
            Network::B => write!(f, "B"),
        }
    }
}

/// A point observation paired with the forecast value at its location.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationPoint<T> {
    /// Site or sensor identifier.
    pub id: String,
    /// Projected x coordinate.
    pub x: T,
    /// Projected y coordinate.
    pub y: T,
    /// Measured concentration.
    pub observed: T,
    /// Co-located forecast value.
    pub model: T,
    /// Network the observation belongs to.
    pub network: Network,
}

impl<T: Float> ObservationPoint<T> {
    /// Create a paired observation.
    pub fn new(id: impl Into<String>, x: T, y: T, observed: T, model: T, network: Network) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            observed,
            model,
            network,
        }
    }

    /// Coordinate as a 2-element array.
    #[inline]
    pub fn coords(&self) -> [T; 2] {
        [self.x, self.y]
    }

    /// Query at this observation's location, carrying its forecast value.
    #[inline]
    pub fn as_query(&self) -> QueryPoint<T> {
        QueryPoint::new(self.x, self.y, self.model)
    }
}

/// A location where an estimate is wanted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryPoint<T> {
    /// Projected x coordinate.
    pub x: T,
    /// Projected y coordinate.
    pub y: T,
    /// Forecast value to be corrected.
    pub model: T,
}

impl<T: Float> QueryPoint<T> {
    /// Create a query point.
    pub fn new(x: T, y: T, model: T) -> Self {
        Self { x, y, model }
    }

    /// Coordinate as a 2-element array.
    #[inline]
    pub fn coords(&self) -> [T; 2] {
        [self.x, self.y]
    }
}
