//! KD-Tree for exact k-nearest neighbor search over reference points.
//!
//! ## Purpose
//!
//! This module implements a KD-tree so that interpolating a full target grid
//! does not scan every reference point for every cell. Searches return the
//! `k` references closest to a query, optionally skipping one excluded index
//! (the held-out point of a leave-one-out evaluation).
//!
//! ## Design notes
//!
//! * **Static Construction**: The tree is built once per reference set and shared read-only.
//! * **Eytzinger Layout**: Tree nodes are stored in a left-complete binary tree (array) layout.
//! * **Stable ties**: Candidates are ordered by `(distance, index)`, so equal
//!   distances resolve to the reference inserted first.
//! * **Trait-based Distance**: The metric is supplied through [`PointDistance`].
//!
//! ## Key concepts
//!
//! * **Splitting Plane**: The dimension and value used to split points at each node.
//! * **Implicit Navigation**: Child nodes are accessed via arithmetic ($2i+1$, $2i+2$).
//! * **Pruning**: Skipping branches that cannot contain nearer (or tied) neighbors.
//!
//! ## Invariants
//!
//! * Queries always return the exact nearest neighbors (no approximation).
//! * An excluded index is never pushed into the candidate heap.
//! * Returned lists are sorted by ascending distance, then ascending index.
//!
//! ## Non-goals
//!
//! * This module does not support dynamic insertions or deletions.

use core::cmp::Ordering::{self, Equal};
use num_traits::Float;

use crate::primitives::buffer::NeighborhoodSearchBuffer;

// ============================================================================
// Helper Types
// ============================================================================

/// Candidate entry for the bounded max-heap used during search.
///
/// Orders by distance (the second field), then by reference index.
#[derive(Debug, Clone, Copy)]
pub struct NodeDistance<T>(pub usize, pub T);

impl<T: PartialOrd> PartialEq for NodeDistance<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Equal
    }
}
impl<T: PartialOrd> Eq for NodeDistance<T> {}

impl<T: PartialOrd> PartialOrd for NodeDistance<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: PartialOrd> Ord for NodeDistance<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.1
            .partial_cmp(&other.1)
            .unwrap_or(Equal)
            .then_with(|| self.0.cmp(&other.0))
    }
}

/// Trait for distance calculations used in KD-tree search.
pub trait PointDistance<T: Float> {
    /// Squared distance between two points (avoids sqrt in the hot loop).
    fn distance_squared(&self, a: &[T], b: &[T]) -> T;

    /// Squared distance from the query to a splitting plane.
    fn split_distance_squared(&self, dim: usize, split_val: T, query_val: T) -> T;

    /// Convert a squared comparison distance back to the metric space.
    fn post_process_distance(&self, d: T) -> T;
}

// ============================================================================
// Neighbor List
// ============================================================================

/// Ordered set of `(reference index, distance)` pairs for one query.
///
/// An empty list is a valid degenerate result.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborList<T> {
    /// Indices of the selected references.
    pub indices: Vec<usize>,
    /// Distance from the query to each selected reference.
    pub distances: Vec<T>,
}

impl<T: Float> NeighborList<T> {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
            distances: Vec::new(),
        }
    }

    /// Pre-allocate storage for `k` neighbors.
    pub fn with_capacity(k: usize) -> Self {
        Self {
            indices: Vec::with_capacity(k),
            distances: Vec::with_capacity(k),
        }
    }

    /// Number of neighbors.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if no neighbors are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Remove every neighbor, keeping capacity.
    pub fn clear(&mut self) {
        self.indices.clear();
        self.distances.clear();
    }

    /// Append a neighbor.
    pub fn push(&mut self, index: usize, distance: T) {
        self.indices.push(index);
        self.distances.push(distance);
    }

    /// Whether `index` is part of the list.
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Smallest distance in the list, if any.
    pub fn nearest_distance(&self) -> Option<T> {
        self.distances
            .iter()
            .copied()
            .fold(None, |acc: Option<T>, d| match acc {
                Some(m) if m <= d => Some(m),
                _ => Some(d),
            })
    }

    /// Sort by ascending distance, breaking ties by ascending index.
    pub fn sort(&mut self) {
        let mut pairs: Vec<(usize, T)> = self
            .indices
            .iter()
            .copied()
            .zip(self.distances.iter().copied())
            .collect();
        pairs.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Equal).then(a.0.cmp(&b.0)));
        self.clear();
        for (i, d) in pairs {
            self.push(i, d);
        }
    }
}

impl<T: Float> Default for NeighborList<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// KD-Tree Implementation
// ============================================================================

/// Node in the Eytzinger layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct KDNode {
    /// Index of the point in the original flattened data array.
    pub index: usize,
}

/// KD-tree for spatial indexing of reference coordinates.
#[derive(Debug, Clone)]
pub struct KDTree<T: Float> {
    /// The implicit Eytzinger tree nodes.
    nodes: Vec<KDNode>,
    /// Permuted points aligned with the nodes.
    points: Vec<T>,
    /// Dimensionality of the data.
    dimensions: usize,
}

impl<T: Float> KDTree<T> {
    // ------------------------------------------------------------------------
    // Public API
    // ------------------------------------------------------------------------

    /// Build a KD-tree from a flattened coordinate array.
    pub fn new(points: &[T], dimensions: usize) -> Self {
        let n = points.len() / dimensions;
        let mut indices: Vec<usize> = (0..n).collect();

        let mut nodes = vec![KDNode::default(); n];
        let mut permuted_points = vec![T::zero(); n * dimensions];

        Self::build_recursive(
            points,
            dimensions,
            &mut indices,
            0,
            &mut nodes,
            &mut permuted_points,
            0,
        );

        Self {
            nodes,
            points: permuted_points,
            dimensions,
        }
    }

    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree indexes no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the `k` nearest points to `query`, skipping `exclude`.
    ///
    /// The result is written into `neighbors`, sorted by distance then index.
    pub fn find_k_nearest<D: PointDistance<T>>(
        &self,
        query: &[T],
        k: usize,
        dist_calc: &D,
        exclude: Option<usize>,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
        neighbors: &mut NeighborList<T>,
    ) {
        neighbors.clear();
        if k == 0 || self.nodes.is_empty() {
            return;
        }

        buffer.clear();
        buffer.ensure_capacity(k);
        self.search_iterative(query, k, dist_calc, exclude, buffer);

        let mut found: Vec<NodeDistance<T>> = buffer.heap.drain().collect();
        found.sort();
        for NodeDistance(idx, dist) in found {
            neighbors.push(idx, dist_calc.post_process_distance(dist));
        }
    }

    /// Nearest point to `query` other than `exclude`, as `(index, distance)`.
    pub fn nearest<D: PointDistance<T>>(
        &self,
        query: &[T],
        dist_calc: &D,
        exclude: Option<usize>,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
    ) -> Option<(usize, T)> {
        if self.nodes.is_empty() {
            return None;
        }
        buffer.clear();
        self.search_iterative(query, 1, dist_calc, exclude, buffer);
        buffer
            .heap
            .peek()
            .map(|&NodeDistance(idx, dist)| (idx, dist_calc.post_process_distance(dist)))
    }

    // ------------------------------------------------------------------------
    // Private Helpers & Algorithms
    // ------------------------------------------------------------------------

    /// Recursively builds the tree in Eytzinger layout.
    fn build_recursive(
        points: &[T],
        dims: usize,
        indices: &mut [usize],
        depth: usize,
        nodes: &mut [KDNode],
        permuted_points: &mut [T],
        curr_idx: usize,
    ) {
        if indices.is_empty() {
            return;
        }

        let axis = depth % dims;
        let n = indices.len();

        // Pivot rank for a left-complete tree keeps the Eytzinger property
        let median_idx = Self::calculate_left_subtree_size(n);

        if median_idx < n {
            indices.select_nth_unstable_by(median_idx, |&a, &b| {
                points[a * dims + axis]
                    .partial_cmp(&points[b * dims + axis])
                    .unwrap_or(Equal)
            });
        }

        let point_idx = indices[median_idx];
        nodes[curr_idx] = KDNode { index: point_idx };

        let src_start = point_idx * dims;
        let dest_start = curr_idx * dims;
        permuted_points[dest_start..dest_start + dims]
            .copy_from_slice(&points[src_start..src_start + dims]);

        let (left_part, right_part_with_median) = indices.split_at_mut(median_idx);
        let right_part = &mut right_part_with_median[1..];

        Self::build_recursive(
            points,
            dims,
            left_part,
            depth + 1,
            nodes,
            permuted_points,
            2 * curr_idx + 1,
        );
        Self::build_recursive(
            points,
            dims,
            right_part,
            depth + 1,
            nodes,
            permuted_points,
            2 * curr_idx + 2,
        );
    }

    /// Iterative search using an explicit stack for traversal.
    ///
    /// Stack entries pack `(node_idx, axis)` into one `usize`: node index in
    /// the high bits (`>> 8`), axis in the low 8 bits.
    fn search_iterative<D: PointDistance<T>>(
        &self,
        query: &[T],
        k: usize,
        dist_calc: &D,
        exclude: Option<usize>,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
    ) {
        let d = self.dimensions;
        let heap = &mut buffer.heap;
        let stack = &mut buffer.stack;
        let nodes_len = self.nodes.len();

        let mut heap_full = false;
        let mut max_dist = T::infinity();

        stack.push(0);

        while let Some(packed) = stack.pop() {
            let axis = packed & 0xFF;
            let node_idx = packed >> 8;

            let node = self.nodes[node_idx];
            let offset = node_idx * d;
            let node_point = &self.points[offset..offset + d];

            // 1. Process current node
            if exclude != Some(node.index) {
                let candidate = NodeDistance(node.index, dist_calc.distance_squared(query, node_point));

                if !heap_full {
                    heap.push(candidate);
                    if heap.len() == k {
                        heap_full = true;
                        max_dist = heap.peek().map(|nd| nd.1).unwrap_or(T::infinity());
                    }
                } else if heap.peek().is_some_and(|top| candidate < *top) {
                    if let Some(mut top) = heap.peek_mut() {
                        *top = candidate;
                    }
                    max_dist = heap.peek().map(|nd| nd.1).unwrap_or(T::infinity());
                }
            }

            // 2. Leaf check: implicit left child is at 2*i + 1
            let left_child = 2 * node_idx + 1;
            if left_child >= nodes_len {
                continue;
            }

            let split_dim = axis;
            let split_val = node_point[split_dim];
            let diff = query[split_dim] - split_val;

            let right_child = left_child + 1;
            let has_right = right_child < nodes_len;
            let next_axis = if split_dim + 1 == d { 0 } else { split_dim + 1 };

            let packed_left = (left_child << 8) | next_axis;
            let packed_right = (right_child << 8) | next_axis;

            let (near_packed, far_packed, near_exists, far_exists) = if diff <= T::zero() {
                (packed_left, packed_right, true, has_right)
            } else {
                (packed_right, packed_left, has_right, true)
            };

            // 3. Pruning: ties on the plane must still be visited for stable ordering
            if far_exists {
                let dist_to_plane =
                    dist_calc.split_distance_squared(split_dim, split_val, query[split_dim]);
                if !heap_full || dist_to_plane <= max_dist {
                    stack.push(far_packed);
                }
            }

            // 4. Always explore the near child
            if near_exists {
                stack.push(near_packed);
            }
        }
    }

    /// Number of nodes in the left subtree of a left-complete binary tree of size n.
    pub fn calculate_left_subtree_size(n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let h = (usize::BITS - n.leading_zeros() - 1) as usize;
        if h == 0 {
            return 0;
        }

        let max_leaf_capacity = 1 << h;
        let total_nodes_above_leaf = max_leaf_capacity - 1;
        let r = n - total_nodes_above_leaf;
        let left_part_leaves = r.min(max_leaf_capacity / 2);
        let left_subtree_capacity_full = (max_leaf_capacity / 2) - 1;
        left_subtree_capacity_full + left_part_leaves
    }
}
