//! Tests for neighbor selection.
//!
//! ## Test Organization
//!
//! 1. **Fixed-k** - Nearest references and stable ties
//! 2. **Delaunay** - Anchor plus adjacent references
//! 3. **Exclusion** - Held-out index never selected
//! 4. **Degenerate Sets** - Small and collinear reference sets

use approx::assert_relative_eq;
use airfuse::prelude::*;

fn reference(coords: &[(f64, f64)]) -> ReferenceSet<f64> {
    let x: Vec<f64> = coords.iter().map(|c| c.0).collect();
    let y: Vec<f64> = coords.iter().map(|c| c.1).collect();
    let obs: Vec<f64> = (0..coords.len()).map(|i| i as f64).collect();
    let model = vec![0.0; coords.len()];
    ReferenceSet::from_columns(Network::A, &x, &y, &obs, &model).unwrap()
}

fn select(
    set: &ReferenceSet<f64>,
    query: [f64; 2],
    policy: NeighborPolicy,
    exclude: Option<usize>,
) -> Result<NeighborList<f64>, FusionError> {
    let mut buf = InterpolationBuffer::new(8);
    NeighborSelector::new(set).select(query, policy, exclude, &mut buf.search, &mut buf.neighbors)?;
    Ok(buf.neighbors)
}

const TRIANGLE_WITH_CENTER: [(f64, f64); 4] = [(0.0, 0.0), (10.0, 0.0), (5.0, 8.0), (5.0, 3.0)];

// ============================================================================
// Fixed-k
// ============================================================================

#[test]
fn test_fixed_k_returns_k_nearest_sorted() {
    let set = reference(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);
    let nbh = select(&set, [3.2, 0.0], NeighborPolicy::FixedK { k: 3 }, None).unwrap();

    assert_eq!(nbh.indices, vec![3, 4, 2]);
    assert_relative_eq!(nbh.distances[0], 0.2, epsilon = 1e-12);
    assert_relative_eq!(nbh.distances[1], 0.8, epsilon = 1e-12);
    assert_relative_eq!(nbh.distances[2], 1.2, epsilon = 1e-12);
}

#[test]
fn test_fixed_k_ties_broken_by_insertion_order() {
    let set = reference(&[(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)]);
    let nbh = select(&set, [0.0, 0.0], NeighborPolicy::FixedK { k: 2 }, None).unwrap();
    assert_eq!(nbh.indices, vec![0, 1]);
}

#[test]
fn test_policy_tags_and_default() {
    assert_eq!(NeighborPolicy::FixedK { k: 10 }.tag(), "IDW");
    assert_eq!(NeighborPolicy::Delaunay.tag(), "VNA");
    assert_eq!(NeighborPolicy::default(), NeighborPolicy::FixedK { k: 10 });
}

// ============================================================================
// Delaunay
// ============================================================================

#[test]
fn test_delaunay_query_on_reference_anchors_on_itself() {
    let set = reference(&TRIANGLE_WITH_CENTER);
    let nbh = select(&set, [5.0, 3.0], NeighborPolicy::Delaunay, None).unwrap();

    assert_eq!(nbh.indices[0], 3);
    assert_eq!(nbh.distances[0], 0.0);
    let mut rest = nbh.indices[1..].to_vec();
    rest.sort_unstable();
    assert_eq!(rest, vec![0, 1, 2]);
}

#[test]
fn test_delaunay_query_anchors_on_nearest_reference() {
    let set = reference(&TRIANGLE_WITH_CENTER);
    let nbh = select(&set, [0.5, 0.2], NeighborPolicy::Delaunay, None).unwrap();

    assert_eq!(nbh.indices[0], 0);
    assert_eq!(nbh.len(), 4);
}

#[test]
fn test_delaunay_excludes_non_adjacent_references() {
    // Long thin diamond: the tips are not adjacent to each other.
    let set = reference(&[(0.0, 0.0), (50.0, -1.0), (50.0, 1.0), (100.0, 0.0)]);
    let nbh = select(&set, [1.0, 0.0], NeighborPolicy::Delaunay, None).unwrap();

    assert_eq!(nbh.indices[0], 0);
    assert!(!nbh.contains(3));
    assert_eq!(nbh.len(), 3);
}

// ============================================================================
// Exclusion
// ============================================================================

#[test]
fn test_excluded_index_never_selected() {
    let coords: Vec<(f64, f64)> = (0..40)
        .map(|i| {
            let t = i as f64;
            ((t * 7.3) % 23.0, (t * 3.1) % 17.0 + (t * 0.01))
        })
        .collect();
    let set = reference(&coords);

    for policy in [NeighborPolicy::FixedK { k: 10 }, NeighborPolicy::Delaunay] {
        for i in 0..set.len() {
            let query = [coords[i].0, coords[i].1];
            let nbh = select(&set, query, policy, Some(i)).unwrap();
            assert!(!nbh.contains(i), "{} selected itself under {}", i, policy);
            assert!(!nbh.is_empty());
            assert!(nbh.distances.iter().all(|&d| d >= 0.0));
        }
    }
}

#[test]
fn test_delaunay_exclusion_returns_own_adjacency() {
    let set = reference(&TRIANGLE_WITH_CENTER);
    let nbh = select(&set, [5.0, 3.0], NeighborPolicy::Delaunay, Some(3)).unwrap();

    let mut idx = nbh.indices.clone();
    idx.sort_unstable();
    assert_eq!(idx, vec![0, 1, 2]);
}

#[test]
fn test_delaunay_exclusion_ignores_neighbors_of_nearest_other() {
    // Point 4 is adjacent to point 1 (the nearest other) but not to point 0.
    let coords = [(0.0, 0.0), (1.0, 0.0), (-1.0, 2.0), (-1.0, -2.0), (4.0, 0.0)];
    let set = reference(&coords);
    assert_eq!(set.triangulation().unwrap().neighbors(0), &[1, 2, 3]);

    let nbh = select(&set, [0.0, 0.0], NeighborPolicy::Delaunay, Some(0)).unwrap();
    let mut idx = nbh.indices.clone();
    idx.sort_unstable();
    assert_eq!(idx, vec![1, 2, 3]);
    assert_eq!(nbh.indices[0], 1);
}

#[test]
fn test_delaunay_exclusion_matches_adjacency_on_scatter() {
    let coords: Vec<(f64, f64)> = (0..40)
        .map(|i| {
            let t = i as f64;
            ((t * 7.3) % 23.0, (t * 3.1) % 17.0 + (t * 0.01))
        })
        .collect();
    let set = reference(&coords);
    let tri = set.triangulation().unwrap();

    for i in 0..set.len() {
        let nbh = select(&set, [coords[i].0, coords[i].1], NeighborPolicy::Delaunay, Some(i)).unwrap();
        let mut idx = nbh.indices.clone();
        idx.sort_unstable();
        assert_eq!(idx.as_slice(), tri.neighbors(i), "held-out point {}", i);
    }
}

// ============================================================================
// Degenerate Sets
// ============================================================================

#[test]
fn test_fewer_than_three_active_returns_all() {
    let set = reference(&[(0.0, 0.0), (10.0, 0.0), (3.0, 4.0)]);
    let nbh = select(&set, [0.0, 0.0], NeighborPolicy::Delaunay, Some(0)).unwrap();
    assert_eq!(nbh.indices, vec![2, 1]);

    let pair = reference(&[(0.0, 0.0), (10.0, 0.0)]);
    let nbh = select(&pair, [5.0, 0.0], NeighborPolicy::Delaunay, None).unwrap();
    assert_eq!(nbh.indices, vec![0, 1]);
}

#[test]
fn test_collinear_delaunay_fails_with_geometry_error() {
    let set = reference(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
    let err = select(&set, [1.0, 1.0], NeighborPolicy::Delaunay, None).unwrap_err();
    assert!(matches!(err, FusionError::Geometry(_)));
    assert!(err.is_local());
}

#[test]
fn test_all_points_lists_every_active_reference() {
    let set = reference(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
    let mut nbh = NeighborList::new();
    NeighborSelector::new(&set).all_points([2.9, 0.0], Some(3), &mut nbh);
    assert_eq!(nbh.indices, vec![2, 1, 0]);
}
