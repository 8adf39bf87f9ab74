//! Reference sets: the observations of one network used as interpolation anchors.
//!
//! ## Purpose
//!
//! A [`ReferenceSet`] owns the paired observations of one network together
//! with the spatial indexes every query needs: a KD-tree over the coordinates
//! and a lazily built Delaunay triangulation.
//!
//! ## Design notes
//!
//! * **Read-only sharing**: A reference set is immutable after construction
//!   and may be shared across threads without locking.
//! * **Cached triangulation**: The full triangulation is computed at most once
//!   (on first use) and cached for the lifetime of the set. Leave-one-out
//!   queries read the same cache.
//!
//! ## Invariants
//!
//! * A reference set is never empty.
//! * Every point belongs to the set's network.
//! * Every coordinate, observation and forecast value is finite.

use std::sync::OnceLock;

use crate::math::delaunay::Triangulation;
use crate::math::distance::Euclidean;
use crate::math::neighborhood::{KDTree, NodeDistance};
use crate::primitives::buffer::NeighborhoodSearchBuffer;
use crate::primitives::errors::FusionError;
use crate::primitives::points::{FusionFloat, Network, ObservationPoint};

/// The observations of one network, indexed for neighbor queries.
#[derive(Debug, Clone)]
pub struct ReferenceSet<T: FusionFloat> {
    network: Network,
    points: Vec<ObservationPoint<T>>,
    coords: Vec<T>,
    tree: KDTree<T>,
    triangulation: OnceLock<Result<Triangulation, FusionError>>,
}

impl<T: FusionFloat> ReferenceSet<T> {
    /// Build a reference set from paired observations.
    pub fn new(network: Network, points: Vec<ObservationPoint<T>>) -> Result<Self, FusionError> {
        if points.is_empty() {
            return Err(FusionError::EmptyInput);
        }

        for (i, p) in points.iter().enumerate() {
            if p.network != network {
                return Err(FusionError::Configuration(format!(
                    "point {} ({}) belongs to network {}, not {}",
                    i, p.id, p.network, network
                )));
            }
            for (name, value) in [
                ("x", p.x),
                ("y", p.y),
                ("observed", p.observed),
                ("model", p.model),
            ] {
                if !value.is_finite() {
                    return Err(FusionError::InvalidNumericValue(format!(
                        "{}[{}] ({})={}",
                        name,
                        i,
                        p.id,
                        value.to_f64().unwrap_or(f64::NAN)
                    )));
                }
            }
        }

        let coords: Vec<T> = points.iter().flat_map(|p| [p.x, p.y]).collect();
        let tree = KDTree::new(&coords, 2);

        Ok(Self {
            network,
            points,
            coords,
            tree,
            triangulation: OnceLock::new(),
        })
    }

    /// Build a reference set from parallel columns.
    ///
    /// Identifiers are generated from the row index.
    pub fn from_columns(
        network: Network,
        x: &[T],
        y: &[T],
        observed: &[T],
        model: &[T],
    ) -> Result<Self, FusionError> {
        let n = x.len();
        for (what, len) in [("y", y.len()), ("observed", observed.len()), ("model", model.len())] {
            if len != n {
                return Err(FusionError::MismatchedInputs {
                    what,
                    got: len,
                    expected: n,
                });
            }
        }

        let points = (0..n)
            .map(|i| ObservationPoint::new(format!("{}", i), x[i], y[i], observed[i], model[i], network))
            .collect();
        Self::new(network, points)
    }

    /// Network these observations belong to.
    #[inline]
    pub fn network(&self) -> Network {
        self.network
    }

    /// Number of reference points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed set; provided for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All reference points in insertion order.
    #[inline]
    pub fn points(&self) -> &[ObservationPoint<T>] {
        &self.points
    }

    /// Reference point `i`.
    #[inline]
    pub fn point(&self, i: usize) -> &ObservationPoint<T> {
        &self.points[i]
    }

    /// Coordinates of reference point `i`.
    #[inline]
    pub fn coords(&self, i: usize) -> [T; 2] {
        [self.coords[2 * i], self.coords[2 * i + 1]]
    }

    /// Flattened `(x, y)` coordinates.
    #[inline]
    pub fn flat_coords(&self) -> &[T] {
        &self.coords
    }

    /// KD-tree over the reference coordinates.
    #[inline]
    pub fn tree(&self) -> &KDTree<T> {
        &self.tree
    }

    /// Triangulation of the full set, computed once and cached.
    pub fn triangulation(&self) -> Result<&Triangulation, FusionError> {
        self.triangulation
            .get_or_init(|| Triangulation::new(&self.coords))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Nearest reference to `query` other than `exclude`, as `(index, distance)`.
    pub fn nearest(
        &self,
        query: [T; 2],
        exclude: Option<usize>,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
    ) -> Option<(usize, T)> {
        self.tree.nearest(&query, &Euclidean, exclude, buffer)
    }

    /// Distance from `query` to reference `i`.
    #[inline]
    pub fn distance_to(&self, query: [T; 2], i: usize) -> T {
        Euclidean::distance(&query, &self.coords(i))
    }
}
