//! Distance computation for projected coordinates.
//!
//! ## Purpose
//!
//! This module provides Euclidean distance in the projected plane, the
//! [`PointDistance`] implementation the KD-tree searches with, and the grid
//! spacing helpers used to derive the ensemble floor distance.
//!
//! ## Design notes
//!
//! * **Squared comparisons**: Searches compare squared distances and only take
//!   the square root for reported values.
//! * **Projected units**: Coordinates are assumed to be in a projected CRS, so
//!   plain Euclidean distance is meaningful.
//!
//! ## Invariants
//!
//! * Distance is always non-negative and symmetric.
//! * Distance is zero if and only if points are identical.

use num_traits::Float;

use crate::math::neighborhood::PointDistance;

/// Euclidean metric in the projected plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl Euclidean {
    /// Euclidean distance between two points.
    #[inline]
    pub fn distance<T: Float>(a: &[T], b: &[T]) -> T {
        Self::distance_squared(a, b).sqrt()
    }

    /// Squared Euclidean distance between two points.
    #[inline]
    pub fn distance_squared<T: Float>(a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len(), "Points must have same dimension");
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| {
                let diff = ai - bi;
                diff * diff
            })
            .fold(T::zero(), |acc, x| acc + x)
    }
}

impl<T: Float> PointDistance<T> for Euclidean {
    #[inline]
    fn distance_squared(&self, a: &[T], b: &[T]) -> T {
        Euclidean::distance_squared(a, b)
    }

    #[inline]
    fn split_distance_squared(&self, _dim: usize, split_val: T, query_val: T) -> T {
        let diff = query_val - split_val;
        diff * diff
    }

    #[inline]
    fn post_process_distance(&self, d: T) -> T {
        d.sqrt()
    }
}

/// Mean spacing between consecutive coordinates of a grid axis.
///
/// Returns `None` for axes with fewer than two coordinates.
pub fn mean_spacing<T: Float>(axis: &[T]) -> Option<T> {
    if axis.len() < 2 {
        return None;
    }
    let total = axis
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(T::zero(), |acc, d| acc + d);
    T::from(axis.len() - 1).map(|n| total / n)
}

/// Half of a grid cell's diagonal: `sqrt(dx² + dy²) / 2`.
#[inline]
pub fn half_cell_diagonal<T: Float>(dx: T, dy: T) -> T {
    let two = T::one() + T::one();
    dx.hypot(dy) / two
}
