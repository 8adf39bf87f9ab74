//! Inverse-power-of-distance weighting.
//!
//! ## Purpose
//!
//! This module turns a set of `(distance, value)` pairs into one weighted
//! estimate with weights `distance^power` (`power < 0`), normalized to sum to
//! one.
//!
//! ## Design notes
//!
//! * **Coincident points**: If any distance is exactly zero the estimate is the
//!   value at that distance (the mean, if several references coincide), which
//!   is the limit of the kernel and avoids division by zero.
//! * **Relative weights**: Distances are divided by the smallest distance
//!   before raising to `power`. The normalized weights are unchanged, but steep
//!   powers such as −5 cannot underflow to zero or overflow to infinity.
//! * **Unusable pairs**: Pairs whose value or distance is not finite are
//!   skipped (a ratio residual against a zero forecast, for instance).
//!
//! ## Invariants
//!
//! * Weights are non-negative and sum to one.
//! * The estimate lies within the range of the contributing values.
//!
//! ## Non-goals
//!
//! * Neighbor selection (handled by `algorithms::selector`).

use num_traits::Float;

use crate::primitives::errors::FusionError;

/// Weighted estimate of `values` using `distance^power` weights.
///
/// Fails with [`FusionError::InsufficientData`] when no usable pair remains.
pub fn inverse_distance_weight<T: Float>(
    values: &[T],
    distances: &[T],
    power: T,
) -> Result<T, FusionError> {
    if values.len() != distances.len() {
        return Err(FusionError::MismatchedInputs {
            what: "distances",
            got: distances.len(),
            expected: values.len(),
        });
    }

    let usable = || {
        values
            .iter()
            .zip(distances.iter())
            .filter(|(v, d)| v.is_finite() && d.is_finite() && **d >= T::zero())
    };

    let mut count = 0usize;
    let mut min_dist = T::infinity();
    let mut coincident_sum = T::zero();
    let mut coincident_count = 0usize;
    for (&v, &d) in usable() {
        count += 1;
        if d == T::zero() {
            coincident_sum = coincident_sum + v;
            coincident_count += 1;
        }
        if d < min_dist {
            min_dist = d;
        }
    }

    if count == 0 {
        return Err(FusionError::InsufficientData { got: 0, needed: 1 });
    }

    if coincident_count > 0 {
        let n = T::from(coincident_count).unwrap_or_else(T::one);
        return Ok(coincident_sum / n);
    }

    let mut weight_sum = T::zero();
    let mut weighted = T::zero();
    for (&v, &d) in usable() {
        let w = (d / min_dist).powf(power);
        weight_sum = weight_sum + w;
        weighted = weighted + w * v;
    }

    Ok(weighted / weight_sum)
}

/// Normalized weights for `distances` under the same kernel.
///
/// Zero distances share all of the weight; non-finite distances get zero.
pub fn normalized_weights<T: Float>(distances: &[T], power: T) -> Vec<T> {
    let finite = |d: &T| d.is_finite() && *d >= T::zero();
    let zeros = distances.iter().filter(|d| **d == T::zero()).count();
    if zeros > 0 {
        let share = T::one() / T::from(zeros).unwrap_or_else(T::one);
        return distances
            .iter()
            .map(|&d| if d == T::zero() { share } else { T::zero() })
            .collect();
    }

    let min_dist = distances
        .iter()
        .copied()
        .filter(finite)
        .fold(T::infinity(), T::min);
    if !min_dist.is_finite() {
        return vec![T::zero(); distances.len()];
    }

    let raw: Vec<T> = distances
        .iter()
        .map(|&d| {
            if finite(&d) {
                (d / min_dist).powf(power)
            } else {
                T::zero()
            }
        })
        .collect();
    let total = raw.iter().fold(T::zero(), |acc, &w| acc + w);
    raw.into_iter().map(|w| w / total).collect()
}
