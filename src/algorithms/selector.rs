//! Neighbor selection for residual interpolation.
//!
//! ## Purpose
//!
//! This module decides which reference points contribute to the estimate at a
//! query point. Two policies are supported: the `k` nearest references, and
//! the Delaunay neighbors of the query's nearest reference.
//!
//! ## Design notes
//!
//! * **Exclusion**: The excluded index is skipped by the KD-tree search. Under
//!   the Delaunay policy a held-out reference is the query itself, so its list
//!   is its own adjacency in the cached full triangulation, which never
//!   contains the point.
//! * **Anchor**: Otherwise Delaunay neighbors are taken around the nearest
//!   reference. A query that coincides with a reference anchors on that
//!   reference. The anchor itself is part of the list.
//! * **Small sets**: With fewer than three active references every active
//!   reference is returned.
//!
//! ## Key concepts
//!
//! * **Stable order**: Lists are sorted by distance, ties broken by reference
//!   index (insertion order).
//!
//! ## Invariants
//!
//! * Distances are non-negative.
//! * The excluded index never appears in the output.
//!
//! ## Non-goals
//!
//! * Recovering from degenerate triangulations (see `algorithms::interpolation`).

use core::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::algorithms::reference::ReferenceSet;
use crate::math::delaunay::Triangulation;
use crate::math::distance::Euclidean;
use crate::math::neighborhood::{NeighborList, NodeDistance};
use crate::primitives::buffer::NeighborhoodSearchBuffer;
use crate::primitives::errors::FusionError;
use crate::primitives::points::FusionFloat;

// ============================================================================
// Policy
// ============================================================================

/// Neighbor-selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NeighborPolicy {
    /// The `k` nearest references.
    FixedK {
        /// Number of neighbors.
        k: usize,
    },

    /// The nearest reference and its Delaunay neighbors.
    Delaunay,
}

impl NeighborPolicy {
    /// Short tag used in distance column names (`IDW` or `VNA`).
    pub fn tag(&self) -> &'static str {
        match self {
            NeighborPolicy::FixedK { .. } => "IDW",
            NeighborPolicy::Delaunay => "VNA",
        }
    }
}

impl Default for NeighborPolicy {
    fn default() -> Self {
        NeighborPolicy::FixedK { k: 10 }
    }
}

impl Display for NeighborPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NeighborPolicy::FixedK { k } => write!(f, "fixed-k (k={})", k),
            NeighborPolicy::Delaunay => write!(f, "delaunay"),
        }
    }
}

// ============================================================================
// Selector
// ============================================================================

/// Selects neighbors of query points within one reference set.
#[derive(Debug, Clone, Copy)]
pub struct NeighborSelector<'a, T: FusionFloat> {
    reference: &'a ReferenceSet<T>,
}

impl<'a, T: FusionFloat> NeighborSelector<'a, T> {
    /// Create a selector over `reference`.
    pub fn new(reference: &'a ReferenceSet<T>) -> Self {
        Self { reference }
    }

    /// Select neighbors of `query` under `policy`, skipping `exclude`.
    ///
    /// With the Delaunay policy, `exclude = Some(e)` means `query` is
    /// reference `e`, and the list is `e`'s Delaunay neighbors.
    ///
    /// The list is written into `out`. Fails with [`FusionError::Geometry`]
    /// when the Delaunay policy meets a degenerate reference set.
    pub fn select(
        &self,
        query: [T; 2],
        policy: NeighborPolicy,
        exclude: Option<usize>,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
        out: &mut NeighborList<T>,
    ) -> Result<(), FusionError> {
        let exclude = exclude.filter(|&e| e < self.reference.len());
        match policy {
            NeighborPolicy::FixedK { k } => {
                self.reference
                    .tree()
                    .find_k_nearest(&query, k, &Euclidean, exclude, buffer, out);
            }
            NeighborPolicy::Delaunay => {
                let active = self.reference.len() - usize::from(exclude.is_some());
                if active < 3 {
                    self.all_points(query, exclude, out);
                } else {
                    let tri = self.reference.triangulation()?;
                    match exclude {
                        Some(e) => self.adjacent_to(query, tri, e, out),
                        None => self.delaunay_neighbors(query, tri, buffer, out),
                    }
                }
            }
        }

        debug_assert!(exclude.map_or(true, |e| !out.contains(e)));
        Ok(())
    }

    /// Every active reference, sorted by distance.
    pub fn all_points(&self, query: [T; 2], exclude: Option<usize>, out: &mut NeighborList<T>) {
        out.clear();
        for i in (0..self.reference.len()).filter(|&i| Some(i) != exclude) {
            out.push(i, self.reference.distance_to(query, i));
        }
        out.sort();
    }

    fn delaunay_neighbors(
        &self,
        query: [T; 2],
        tri: &Triangulation,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
        out: &mut NeighborList<T>,
    ) {
        out.clear();
        let Some((anchor, anchor_dist)) = self.reference.nearest(query, None, buffer) else {
            return;
        };

        out.push(anchor, anchor_dist);
        self.push_adjacent(query, tri, anchor, out);
    }

    fn adjacent_to(&self, query: [T; 2], tri: &Triangulation, e: usize, out: &mut NeighborList<T>) {
        out.clear();
        self.push_adjacent(query, tri, e, out);
    }

    fn push_adjacent(&self, query: [T; 2], tri: &Triangulation, i: usize, out: &mut NeighborList<T>) {
        for &j in tri.neighbors(i) {
            out.push(j, self.reference.distance_to(query, j));
        }
        out.sort();
    }
}
