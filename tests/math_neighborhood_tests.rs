#![cfg(feature = "dev")]

use approx::assert_relative_eq;

use airfuse::internals::math::distance::Euclidean;
use airfuse::internals::math::neighborhood::{KDTree, NeighborList};
use airfuse::internals::primitives::buffer::NeighborhoodSearchBuffer;

fn brute_force(points: &[f64], query: [f64; 2], exclude: Option<usize>) -> Vec<(usize, f64)> {
    let mut all: Vec<(usize, f64)> = (0..points.len() / 2)
        .filter(|&i| Some(i) != exclude)
        .map(|i| {
            let dx = points[2 * i] - query[0];
            let dy = points[2 * i + 1] - query[1];
            (i, (dx * dx + dy * dy).sqrt())
        })
        .collect();
    all.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)));
    all
}

#[test]
fn test_kdtree_simple_2d() {
    let points = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    let tree = KDTree::new(&points, 2);

    let k = 2;
    let mut buffer = NeighborhoodSearchBuffer::new(k);
    let mut nbh = NeighborList::with_capacity(k);
    tree.find_k_nearest(&[0.2, 0.2], k, &Euclidean, None, &mut buffer, &mut nbh);

    assert_eq!(nbh.len(), 2);
    assert_eq!(nbh.indices[0], 0);
    // (1,0) and (0,1) tie; the lower index wins.
    assert_eq!(nbh.indices[1], 1);
    assert_relative_eq!(nbh.distances[0], (0.08f64).sqrt(), epsilon = 1e-12);
}

#[test]
fn test_kdtree_exclude_self() {
    let points = vec![0.0, 0.0, 1.0, 1.0, 5.0, 5.0];
    let tree = KDTree::new(&points, 2);

    let mut buffer = NeighborhoodSearchBuffer::new(3);
    let mut nbh = NeighborList::with_capacity(3);
    tree.find_k_nearest(&[0.0, 0.0], 3, &Euclidean, Some(0), &mut buffer, &mut nbh);

    assert_eq!(nbh.indices, vec![1, 2]);
    assert!(!nbh.contains(0));
}

#[test]
fn test_kdtree_matches_brute_force() {
    // Deterministic scatter.
    let mut points = Vec::new();
    let mut s = 7u64;
    for _ in 0..200 {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let x = (s >> 33) as f64 / (1u64 << 31) as f64 * 100.0;
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let y = (s >> 33) as f64 / (1u64 << 31) as f64 * 100.0;
        points.push(x);
        points.push(y);
    }
    let tree = KDTree::new(&points, 2);

    let k = 10;
    let mut buffer = NeighborhoodSearchBuffer::new(k);
    let mut nbh = NeighborList::with_capacity(k);
    for (qi, query) in [[50.0, 50.0], [0.0, 0.0], [99.0, 3.0], [-20.0, 140.0]].iter().enumerate() {
        let exclude = if qi % 2 == 0 { Some(qi * 17) } else { None };
        tree.find_k_nearest(query, k, &Euclidean, exclude, &mut buffer, &mut nbh);
        let expected = brute_force(&points, *query, exclude);

        assert_eq!(nbh.len(), k);
        for (j, (idx, dist)) in expected.iter().take(k).enumerate() {
            assert_eq!(nbh.indices[j], *idx);
            assert_relative_eq!(nbh.distances[j], *dist, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_kdtree_nearest_with_exclusion() {
    let points = vec![0.0, 0.0, 3.0, 4.0, 10.0, 0.0];
    let tree = KDTree::new(&points, 2);
    let mut buffer = NeighborhoodSearchBuffer::new(1);

    let (idx, d) = tree.nearest(&[0.0, 0.0], &Euclidean, None, &mut buffer).unwrap();
    assert_eq!(idx, 0);
    assert_eq!(d, 0.0);

    let (idx, d) = tree.nearest(&[0.0, 0.0], &Euclidean, Some(0), &mut buffer).unwrap();
    assert_eq!(idx, 1);
    assert_relative_eq!(d, 5.0, epsilon = 1e-12);
}

#[test]
fn test_kdtree_k_larger_than_n() {
    let points = vec![0.0, 0.0, 1.0, 0.0];
    let tree = KDTree::new(&points, 2);
    let mut buffer = NeighborhoodSearchBuffer::new(10);
    let mut nbh = NeighborList::with_capacity(10);

    tree.find_k_nearest(&[0.5, 0.0], 10, &Euclidean, None, &mut buffer, &mut nbh);
    assert_eq!(nbh.indices, vec![0, 1]);

    tree.find_k_nearest(&[0.5, 0.0], 10, &Euclidean, Some(1), &mut buffer, &mut nbh);
    assert_eq!(nbh.indices, vec![0]);
}

#[test]
fn test_kdtree_single_point_excluded() {
    let points = vec![2.0, 2.0];
    let tree = KDTree::new(&points, 2);
    let mut buffer = NeighborhoodSearchBuffer::new(1);
    let mut nbh = NeighborList::with_capacity(1);

    tree.find_k_nearest(&[0.0, 0.0], 1, &Euclidean, Some(0), &mut buffer, &mut nbh);
    assert!(nbh.is_empty());
    assert!(tree.nearest(&[0.0, 0.0], &Euclidean, Some(0), &mut buffer).is_none());
}

#[test]
fn test_neighbor_list_sort_is_stable_on_ties() {
    let mut list = NeighborList::new();
    list.push(3, 2.0);
    list.push(1, 1.0);
    list.push(0, 2.0);
    list.sort();

    assert_eq!(list.indices, vec![1, 0, 3]);
    assert_eq!(list.nearest_distance(), Some(1.0));
}

#[test]
fn test_calculate_left_subtree_size() {
    assert_eq!(KDTree::<f64>::calculate_left_subtree_size(1), 0);
    assert_eq!(KDTree::<f64>::calculate_left_subtree_size(2), 1);
    assert_eq!(KDTree::<f64>::calculate_left_subtree_size(3), 1);
    assert_eq!(KDTree::<f64>::calculate_left_subtree_size(7), 3);
}
