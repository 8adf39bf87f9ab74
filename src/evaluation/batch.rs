//! Batch evaluation of query points.
//!
//! ## Purpose
//!
//! Every pass of the engine (target grid, leave-one-out, cross-network) maps a
//! pure per-point function over a range of indices. This module runs that map
//! sequentially or, with the `parallel` feature, on the rayon pool.
//!
//! ## Design notes
//!
//! * **Scratch per worker**: Each worker owns one [`InterpolationBuffer`],
//!   created through `map_init`, so no buffer is shared between threads.
//! * **Order**: Output order always equals index order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::algorithms::correction::{CorrectionPipeline, PointEstimate};
use crate::algorithms::interpolation::InterpolationBuffer;
use crate::algorithms::selector::NeighborPolicy;
use crate::primitives::errors::FusionError;
use crate::primitives::points::{FusionFloat, QueryPoint};

/// Buffer capacity suited to `policy`.
pub fn buffer_capacity(policy: NeighborPolicy) -> usize {
    match policy {
        NeighborPolicy::FixedK { k } => k,
        NeighborPolicy::Delaunay => 8,
    }
}

/// Map `f` over `0..n`, handing each call a scratch buffer.
pub fn map_indices<T, R, F>(n: usize, capacity: usize, f: F) -> Vec<R>
where
    T: FusionFloat,
    R: Send,
    F: Fn(usize, &mut InterpolationBuffer<T>) -> R + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        (0..n)
            .into_par_iter()
            .map_init(|| InterpolationBuffer::new(capacity), |buf, i| f(i, buf))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut buf = InterpolationBuffer::new(capacity);
        (0..n).map(|i| f(i, &mut buf)).collect()
    }
}

/// Evaluate `pipeline` at every query, without exclusion.
///
/// Per-point failures are returned in place; they never abort the batch.
pub fn evaluate_queries<T: FusionFloat>(
    pipeline: &CorrectionPipeline<'_, T>,
    queries: &[QueryPoint<T>],
) -> Vec<Result<PointEstimate<T>, FusionError>> {
    let capacity = buffer_capacity(pipeline.interpolator().policy());
    map_indices(queries.len(), capacity, |i, buf| {
        pipeline.evaluate(&queries[i], None, buf)
    })
}
