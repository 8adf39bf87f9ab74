//! Tests for the inverse-distance weighting kernel.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use airfuse::prelude::*;

#[test]
fn test_zero_distance_returns_that_value_exactly() {
    let values = [10.0, 20.0, 1.0e6];
    let distances = [0.0, 10.0, 3.0];
    let est = inverse_distance_weight(&values, &distances, -5.0).unwrap();
    assert_eq!(est, 10.0);
}

#[test]
fn test_zero_distance_independent_of_other_values() {
    for other in [-1.0e9, 0.0, 3.5, 1.0e9] {
        let est = inverse_distance_weight(&[other, 7.25], &[1.0, 0.0], -2.0).unwrap();
        assert_eq!(est, 7.25);
    }
}

#[test]
fn test_coincident_references_average() {
    let est = inverse_distance_weight(&[4.0, 8.0, 100.0], &[0.0, 0.0, 1.0], -2.0).unwrap();
    assert_eq!(est, 6.0);
}

#[test]
fn test_equal_distances_give_simple_average() {
    let est = inverse_distance_weight(&[10.0, 20.0], &[5.0, 5.0], -2.0).unwrap();
    assert_relative_eq!(est, 15.0, epsilon = 1e-12);
}

#[test]
fn test_two_point_weights() {
    // w1 = 1/1^2, w2 = 1/2^2 -> (10 + 20/4) / 1.25 = 12
    let est = inverse_distance_weight(&[10.0, 20.0], &[1.0, 2.0], -2.0).unwrap();
    assert_relative_eq!(est, 12.0, epsilon = 1e-12);
}

#[test]
fn test_larger_power_magnitude_moves_toward_nearer_value() {
    let values = [10.0, 20.0];
    let distances = [2.0, 3.0];
    let mut previous = f64::INFINITY;
    for power in [-0.5, -1.0, -2.0, -3.0, -5.0, -8.0] {
        let est = inverse_distance_weight(&values, &distances, power).unwrap();
        assert!(est < previous, "power {} did not move toward 10", power);
        assert!(est > 10.0);
        previous = est;
    }
}

#[test]
fn test_steep_power_does_not_underflow() {
    // Raw d^-5 for d ~ 1e70 underflows; relative weights do not.
    let est = inverse_distance_weight(&[1.0, 3.0], &[1.0e70, 1.0e70], -5.0).unwrap();
    assert_relative_eq!(est, 2.0, epsilon = 1e-12);
}

#[test]
fn test_empty_input_is_insufficient_data() {
    let err = inverse_distance_weight::<f64>(&[], &[], -2.0).unwrap_err();
    assert!(matches!(err, FusionError::InsufficientData { got: 0, .. }));
}

#[test]
fn test_non_finite_pairs_are_skipped() {
    let est = inverse_distance_weight(&[f64::NAN, 5.0, f64::INFINITY], &[1.0, 2.0, 1.0], -2.0).unwrap();
    assert_eq!(est, 5.0);

    let err = inverse_distance_weight(&[f64::NAN], &[1.0], -2.0).unwrap_err();
    assert!(matches!(err, FusionError::InsufficientData { .. }));
}

#[test]
fn test_mismatched_lengths() {
    let err = inverse_distance_weight(&[1.0, 2.0], &[1.0], -2.0).unwrap_err();
    assert!(matches!(err, FusionError::MismatchedInputs { .. }));
}

#[test]
fn test_f32_support() {
    let est = inverse_distance_weight(&[10.0f32, 20.0], &[5.0, 5.0], -2.0).unwrap();
    assert_abs_diff_eq!(est, 15.0f32, epsilon = 1e-5);
}
