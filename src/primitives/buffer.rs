//! Reusable buffers for KD-tree neighbor searches.
//!
//! ## Purpose
//!
//! Interpolating a full target grid runs one neighbor search per cell. This
//! module provides the scratch space (a bounded max-heap and a traversal
//! stack) so each search reuses memory instead of allocating.
//!
//! ## Invariants
//!
//! * Buffers are only logically cleared between searches, never shrunk.
//!
//! ## Non-goals
//!
//! * Thread-local caching (one buffer per worker is passed explicitly).

use std::collections::BinaryHeap;

/// Persistent buffers for KD-tree search to avoid allocations.
#[derive(Debug, Clone)]
pub struct NeighborhoodSearchBuffer<N> {
    pub(crate) heap: BinaryHeap<N>,
    pub(crate) stack: Vec<usize>,
}

impl<N: Ord> NeighborhoodSearchBuffer<N> {
    /// Create a new search buffer with capacity k.
    pub fn new(k: usize) -> Self {
        // Stack depth is bounded by tree height.
        Self {
            heap: BinaryHeap::with_capacity(k),
            stack: Vec::with_capacity(32),
        }
    }

    /// Grow the heap if a larger k is requested.
    pub fn ensure_capacity(&mut self, k: usize) {
        if self.heap.capacity() < k {
            self.heap.reserve(k - self.heap.len());
        }
    }

    /// Clear all internal buffers for reuse.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.stack.clear();
    }
}

impl<N: Ord> Default for NeighborhoodSearchBuffer<N> {
    fn default() -> Self {
        Self::new(1)
    }
}
