#![cfg(feature = "dev")]

use approx::assert_relative_eq;

use airfuse::internals::math::distance::{half_cell_diagonal, mean_spacing, Euclidean};

#[test]
fn test_euclidean_distance() {
    assert_relative_eq!(Euclidean::distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0, epsilon = 1e-12);
    assert_relative_eq!(
        Euclidean::distance_squared(&[1.0, 1.0], &[4.0, 5.0]),
        25.0,
        epsilon = 1e-12
    );
    assert_eq!(Euclidean::distance(&[2.5, -1.0], &[2.5, -1.0]), 0.0);
}

#[test]
fn test_euclidean_large_projected_coordinates() {
    // Lambert conformal coordinates are in the millions of meters.
    let a = [2_500_000.0, -1_200_000.0];
    let b = [2_503_000.0, -1_196_000.0];
    assert_relative_eq!(Euclidean::distance(&a, &b), 5000.0, epsilon = 1e-6);
}

#[test]
fn test_mean_spacing() {
    assert_eq!(mean_spacing(&[0.0, 12.0, 24.0, 36.0]), Some(12.0));
    assert_eq!(mean_spacing(&[10.0, 7.0]), Some(-3.0));
    assert_eq!(mean_spacing::<f64>(&[1.0]), None);
    assert_eq!(mean_spacing::<f64>(&[]), None);
}

#[test]
fn test_half_cell_diagonal() {
    assert_relative_eq!(half_cell_diagonal(3.0, 4.0), 2.5, epsilon = 1e-12);
    assert_relative_eq!(
        half_cell_diagonal(12000.0, 12000.0),
        6000.0 * 2f64.sqrt(),
        epsilon = 1e-9
    );
}
