//! Tests for leave-one-out validation and CV metrics.
//!
//! ## Test Organization
//!
//! 1. **Leave-one-out** - Rows, exclusion and errors
//! 2. **Metrics** - Hand-checked statistics and degenerate samples

use approx::assert_relative_eq;
use airfuse::prelude::*;

fn scatter(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut s = seed;
    let mut next = || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (s >> 11) as f64 / (1u64 << 53) as f64
    };
    let mut cols = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for _ in 0..n {
        let x = next() * 100.0;
        let y = next() * 100.0;
        cols.0.push(x);
        cols.1.push(y);
        cols.2.push(10.0 + 0.1 * x + 5.0 * next());
        cols.3.push(8.0 + 0.05 * y);
    }
    cols
}

// ============================================================================
// Leave-one-out
// ============================================================================

#[test]
fn test_loo_rows_in_reference_order() {
    let set = ReferenceSet::from_columns(
        Network::A,
        &[0.0, 3.0, 0.0],
        &[0.0, 0.0, 4.0],
        &[10.0, 20.0, 40.0],
        &[0.0, 0.0, 0.0],
    )
    .unwrap();

    let rows = validate_all(&set, NeighborPolicy::FixedK { k: 10 }, -2.0, CorrectionMode::Direct);

    assert_eq!(rows.len(), 3);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.index, i);
        assert_eq!(row.id, i.to_string());
        assert_eq!(row.neighbor_count, 2);
        assert!(row.failure.is_none());
    }

    // Point 0 from points 1 (d=3) and 2 (d=4).
    assert_relative_eq!(rows[0].estimate, 42.5 / 1.5625, epsilon = 1e-12);
    assert_relative_eq!(rows[0].error, 42.5 / 1.5625 - 10.0, epsilon = 1e-12);
    assert_relative_eq!(rows[0].nearest_distance, 3.0, epsilon = 1e-12);
}

#[test]
fn test_loo_never_reproduces_own_observation_at_zero_distance() {
    let (x, y, obs, model) = scatter(50, 4);
    let set = ReferenceSet::from_columns(Network::B, &x, &y, &obs, &model).unwrap();

    for policy in [NeighborPolicy::FixedK { k: 10 }, NeighborPolicy::Delaunay] {
        for row in validate_all(&set, policy, -5.0, CorrectionMode::Additive) {
            assert!(row.nearest_distance > 0.0);
            assert!(row.estimate.is_finite());
            assert_relative_eq!(row.error, row.estimate - obs[row.index], epsilon = 1e-12);
        }
    }
}

#[test]
fn test_delaunay_loo_weights_own_adjacency() {
    let (x, y, obs, model) = scatter(30, 17);
    let set = ReferenceSet::from_columns(Network::A, &x, &y, &obs, &model).unwrap();
    let rows = validate_all(&set, NeighborPolicy::Delaunay, -2.0, CorrectionMode::Additive);
    let tri = set.triangulation().unwrap();

    for (i, row) in rows.iter().enumerate() {
        let nbrs = tri.neighbors(i);
        assert!(!nbrs.contains(&i));
        assert_eq!(row.neighbor_count, nbrs.len());

        let (mut num, mut den) = (0.0, 0.0);
        for &j in nbrs {
            let w = (x[j] - x[i]).hypot(y[j] - y[i]).powi(-2);
            num += w * (obs[j] - model[j]);
            den += w;
        }
        assert_relative_eq!(row.estimate, model[i] + num / den, epsilon = 1e-9);
    }
}

#[test]
fn test_delaunay_loo_skips_references_beyond_own_neighbors() {
    // Reference 4 neighbors reference 1 but not reference 0.
    let set = ReferenceSet::from_columns(
        Network::A,
        &[0.0, 1.0, -1.0, -1.0, 4.0],
        &[0.0, 0.0, 2.0, -2.0, 0.0],
        &[0.0, 1.0, 1.0, 1.0, 100.0],
        &[0.0, 0.0, 0.0, 0.0, 0.0],
    )
    .unwrap();
    let rows = validate_all(&set, NeighborPolicy::Delaunay, -2.0, CorrectionMode::Direct);

    assert_eq!(rows[0].neighbor_count, 3);
    assert_relative_eq!(rows[0].estimate, 1.0, epsilon = 1e-12);
    assert_relative_eq!(rows[0].nearest_distance, 1.0, epsilon = 1e-12);
}

#[test]
fn test_loo_single_reference_passes_through() {
    let set = ReferenceSet::from_columns(Network::A, &[0.0], &[0.0], &[12.0], &[10.0]).unwrap();
    let rows = validate_all(&set, NeighborPolicy::Delaunay, -2.0, CorrectionMode::Additive);

    assert_eq!(rows.len(), 1);
    assert!(rows[0].passed_through);
    assert_eq!(rows[0].estimate, 10.0);
    assert_eq!(rows[0].error, -2.0);
}

// ============================================================================
// Metrics
// ============================================================================

#[test]
fn test_metrics_hand_checked() {
    let m = CvMetrics::compute(&[2.0, 4.0, 6.0], &[1.0, 4.0, 7.0]);

    assert_eq!(m.count, 3);
    assert_relative_eq!(m.mean_bias, 0.0, epsilon = 1e-12);
    assert_relative_eq!(m.mae, 2.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(m.rmse, (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    assert_relative_eq!(m.r, 1.0, epsilon = 1e-12);
    assert_relative_eq!(m.nmb, 0.0, epsilon = 1e-12);
    assert_relative_eq!(m.nme, 2.0 / 12.0, epsilon = 1e-12);
}

#[test]
fn test_metrics_skip_non_finite_pairs() {
    let m = CvMetrics::compute(&[f64::NAN, 3.0, 5.0], &[1.0, 2.0, f64::INFINITY]);
    assert_eq!(m.count, 1);
    assert_eq!(m.mean_bias, 1.0);
    assert!(m.r.is_nan());
}

#[test]
fn test_metrics_empty_and_constant_samples() {
    let empty = CvMetrics::<f64>::compute(&[], &[]);
    assert_eq!(empty.count, 0);
    assert!(empty.rmse.is_nan() && empty.nmb.is_nan());

    let constant = CvMetrics::compute(&[1.0, 2.0], &[3.0, 3.0]);
    assert!(f64::is_nan(constant.r));
    assert_relative_eq!(constant.mean_bias, -1.5, epsilon = 1e-12);
}
