//! Tests for residual interpolation.
//!
//! ## Test Organization
//!
//! 1. **Residuals** - Difference, ratio and value residuals
//! 2. **Estimates** - Hand-checked kernel results
//! 3. **Fallbacks** - Degenerate geometry and empty neighborhoods

use approx::assert_relative_eq;
use airfuse::prelude::*;

fn line_pair() -> ReferenceSet<f64> {
    // Model is zero, so difference residuals equal the observations.
    ReferenceSet::from_columns(
        Network::A,
        &[0.0, 10.0],
        &[0.0, 0.0],
        &[10.0, 20.0],
        &[0.0, 0.0],
    )
    .unwrap()
}

// ============================================================================
// Residuals
// ============================================================================

#[test]
fn test_residual_kinds() {
    assert_eq!(ResidualKind::Difference.residual(12.0, 10.0), 2.0);
    assert_eq!(ResidualKind::Value.residual(12.0, 10.0), 12.0);
    assert_eq!(ResidualKind::Ratio.residual(12.0, 8.0), 1.5);
    assert!(ResidualKind::Ratio.residual(12.0_f64, 0.0).is_nan());
    assert!(ResidualKind::Ratio.residual(12.0_f64, -1.0).is_nan());
    assert_eq!(ResidualKind::default(), ResidualKind::Difference);
}

#[test]
fn test_interpolator_precomputes_residuals() {
    let set = ReferenceSet::from_columns(
        Network::B,
        &[0.0, 1.0, 2.0],
        &[0.0, 1.0, 0.0],
        &[12.0, 9.0, 5.0],
        &[10.0, 10.0, 5.0],
    )
    .unwrap();
    let interp = Interpolator::new(&set, NeighborPolicy::Delaunay, -2.0, ResidualKind::Difference);
    assert_eq!(interp.residuals(), &[2.0, -1.0, 0.0]);
    assert_eq!(interp.policy(), NeighborPolicy::Delaunay);
    assert_eq!(interp.power(), -2.0);
}

// ============================================================================
// Estimates
// ============================================================================

#[test]
fn test_query_on_reference_returns_its_value() {
    let set = line_pair();
    let r = interpolate([0.0, 0.0], &set, NeighborPolicy::FixedK { k: 2 }, -5.0, None).unwrap();

    assert_eq!(r.estimate, Some(10.0));
    assert_eq!(r.nearest_distance, 0.0);
    assert_eq!(r.neighbor_count, 2);
    assert!(!r.geometry_fallback);
}

#[test]
fn test_equidistant_query_returns_mean() {
    let set = line_pair();
    for policy in [NeighborPolicy::FixedK { k: 2 }, NeighborPolicy::Delaunay] {
        let r = interpolate([5.0, 0.0], &set, policy, -2.0, None).unwrap();
        assert_relative_eq!(r.estimate.unwrap(), 15.0, epsilon = 1e-12);
        assert_relative_eq!(r.nearest_distance, 5.0, epsilon = 1e-12);
    }
}

#[test]
fn test_exclusion_removes_zero_distance_reference() {
    let set = ReferenceSet::from_columns(
        Network::A,
        &[0.0, 3.0, 0.0],
        &[0.0, 0.0, 4.0],
        &[10.0, 20.0, 40.0],
        &[0.0, 0.0, 0.0],
    )
    .unwrap();

    let r = interpolate([0.0, 0.0], &set, NeighborPolicy::FixedK { k: 10 }, -2.0, Some(0)).unwrap();

    // Relative weights 1 and (4/3)^-2 = 0.5625.
    assert_relative_eq!(r.estimate.unwrap(), 42.5 / 1.5625, epsilon = 1e-12);
    assert_relative_eq!(r.nearest_distance, 3.0, epsilon = 1e-12);
    assert_eq!(r.neighbor_count, 2);
}

#[test]
fn test_ratio_residuals_skip_non_positive_model() {
    let set = ReferenceSet::from_columns(
        Network::A,
        &[0.0, 10.0],
        &[0.0, 0.0],
        &[20.0, 5.0],
        &[10.0, 0.0],
    )
    .unwrap();
    let interp = Interpolator::new(&set, NeighborPolicy::FixedK { k: 2 }, -2.0, ResidualKind::Ratio);
    let mut buf = InterpolationBuffer::new(2);

    let r = interp.interpolate([4.0, 0.0], None, &mut buf).unwrap();
    assert_eq!(r.estimate, Some(2.0));
    assert_eq!(r.neighbor_count, 2);
}

#[test]
fn test_buffer_is_reusable_across_queries() {
    let set = line_pair();
    let interp = Interpolator::new(&set, NeighborPolicy::FixedK { k: 2 }, -2.0, ResidualKind::Value);
    let mut buf = InterpolationBuffer::default();

    let first = interp.interpolate([5.0, 0.0], None, &mut buf).unwrap();
    let second = interp.interpolate([10.0, 0.0], None, &mut buf).unwrap();
    let again = interp.interpolate([5.0, 0.0], None, &mut buf).unwrap();

    assert_eq!(second.estimate, Some(20.0));
    assert_eq!(first, again);
}

// ============================================================================
// Fallbacks
// ============================================================================

#[test]
fn test_collinear_references_fall_back_to_all_points() {
    let set = ReferenceSet::from_columns(
        Network::B,
        &[0.0, 1.0, 2.0, 3.0],
        &[0.0, 0.0, 0.0, 0.0],
        &[1.0, 2.0, 3.0, 4.0],
        &[0.0, 0.0, 0.0, 0.0],
    )
    .unwrap();

    let r = interpolate([1.5, 1.0], &set, NeighborPolicy::Delaunay, -2.0, None).unwrap();
    assert!(r.geometry_fallback);
    assert_eq!(r.neighbor_count, 4);
    assert!(r.estimate.unwrap() > 1.0 && r.estimate.unwrap() < 4.0);

    let loo = interpolate([1.0, 0.0], &set, NeighborPolicy::Delaunay, -2.0, Some(1)).unwrap();
    assert!(loo.geometry_fallback);
    assert_eq!(loo.neighbor_count, 3);
}

#[test]
fn test_no_active_reference_yields_no_estimate() {
    let set = ReferenceSet::from_columns(Network::A, &[1.0], &[1.0], &[5.0], &[4.0]).unwrap();

    for policy in [NeighborPolicy::FixedK { k: 3 }, NeighborPolicy::Delaunay] {
        let r = interpolate([1.0, 1.0], &set, policy, -2.0, Some(0)).unwrap();
        assert_eq!(r.estimate, None);
        assert_eq!(r.neighbor_count, 0);
        assert!(f64::is_nan(r.nearest_distance));
    }
}

#[test]
fn test_non_finite_query_is_rejected() {
    let set = line_pair();
    let err = interpolate([f64::NAN, 0.0], &set, NeighborPolicy::FixedK { k: 2 }, -2.0, None).unwrap_err();
    assert!(matches!(err, FusionError::InvalidNumericValue(_)));
}

#[test]
fn test_reference_set_rejects_non_finite_values() {
    let err = ReferenceSet::from_columns(Network::A, &[0.0], &[0.0], &[f64::NAN], &[1.0]).unwrap_err();
    assert!(matches!(err, FusionError::InvalidNumericValue(_)));

    let err = ReferenceSet::<f64>::from_columns(Network::A, &[], &[], &[], &[]).unwrap_err();
    assert_eq!(err, FusionError::EmptyInput);

    let err = ReferenceSet::from_columns(Network::A, &[0.0, 1.0], &[0.0], &[1.0, 2.0], &[1.0, 2.0]).unwrap_err();
    assert!(matches!(err, FusionError::MismatchedInputs { what: "y", .. }));
}
