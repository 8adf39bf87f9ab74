//! Execution engine for a two-network fusion run.
//!
//! ## Purpose
//!
//! This module orchestrates a complete run: leave-one-out validation of every
//! variant per network, evaluation of network B's variants at network A's
//! observations, the target surface pass, and the ensemble blends on both the
//! CV table of network A and the target surface.
//!
//! ## Design notes
//!
//! * **Variant loop**: Every registered variant goes through the same
//!   interpolation and correction pipeline; only its descriptor changes.
//! * **Logging**: Each variant pass logs its begin and finish (with elapsed
//!   time) at info level. Degraded points are counted and reported in one
//!   warning per pass, with per-point detail at debug level.
//! * **Local failures**: A failed point yields NaN in its row; the run goes on.
//!
//! ## Key concepts
//!
//! * **Column keys**: `<variant>_<tag>` on the target surface,
//!   `LOO_<variant>_<tag>` on CV tables, `<POLICY>_<tag>_DIST` for nearest
//!   distances with `_ADJ` for floored ones, `FUSED_<variant>` for blends.
//!
//! ## Invariants
//!
//! * One network's leave-one-out pass never sees the other network's points.
//! * In CV-only mode no target table is produced.
//!
//! ## Non-goals
//!
//! * This module does not validate the configuration (handled by `validator`).

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::algorithms::correction::{CorrectionPipeline, PointEstimate};
use crate::algorithms::reference::ReferenceSet;
use crate::engine::blender::{BlendParams, EnsembleBlender};
use crate::engine::config::FusionConfig;
use crate::engine::output::{ColumnKind, FusionOutput, FusionTable};
use crate::engine::variants::FusionVariant;
use crate::evaluation::batch::evaluate_queries;
use crate::evaluation::loo::validate_with;
use crate::primitives::errors::FusionError;
use crate::primitives::points::{FusionFloat, Network, QueryPoint};

/// Prefix of every column computed at held-out observations.
pub const LOO_PREFIX: &str = "LOO_";

// ============================================================================
// Pass Results
// ============================================================================

/// Per-point results of one variant pass, aligned with the table rows.
#[derive(Debug, Clone)]
struct PassColumns<T> {
    estimate: Vec<T>,
    distance: Vec<T>,
    passed_through: usize,
    geometry_fallback: usize,
    failed: usize,
}

impl<T: FusionFloat> PassColumns<T> {
    fn with_capacity(n: usize) -> Self {
        Self {
            estimate: Vec::with_capacity(n),
            distance: Vec::with_capacity(n),
            passed_through: 0,
            geometry_fallback: 0,
            failed: 0,
        }
    }

    fn push(&mut self, row: usize, result: Result<PointEstimate<T>, FusionError>) {
        match result {
            Ok(est) => {
                self.passed_through += usize::from(est.passed_through);
                self.geometry_fallback += usize::from(est.geometry_fallback);
                if est.passed_through {
                    debug!(row, "no usable neighbors, forecast passed through");
                }
                self.estimate.push(est.corrected);
                self.distance.push(est.nearest_distance);
            }
            Err(e) => {
                if e.is_local() {
                    debug!(row, error = %e, "point evaluation failed");
                } else {
                    warn!(row, error = %e, "point evaluation failed on invalid input");
                }
                self.failed += 1;
                self.estimate.push(T::nan());
                self.distance.push(T::nan());
            }
        }
    }

    fn report(&self, tag: &str, variant: &str) {
        if self.passed_through > 0 || self.geometry_fallback > 0 || self.failed > 0 {
            warn!(
                network = tag,
                variant,
                passed_through = self.passed_through,
                geometry_fallback = self.geometry_fallback,
                failed = self.failed,
                "degraded points in pass"
            );
        }
    }
}

// ============================================================================
// Network Executor
// ============================================================================

/// Runs every variant of one network over a table.
#[derive(Debug, Clone, Copy)]
pub struct NetworkExecutor<'a, T: FusionFloat> {
    reference: &'a ReferenceSet<T>,
    tag: &'a str,
    variants: &'a [FusionVariant],
}

impl<'a, T: FusionFloat> NetworkExecutor<'a, T> {
    /// Create an executor for `reference`, keyed by `tag`.
    pub fn new(reference: &'a ReferenceSet<T>, tag: &'a str, variants: &'a [FusionVariant]) -> Self {
        Self {
            reference,
            tag,
            variants,
        }
    }

    /// Leave-one-out pass of every variant over the network's own CV table.
    pub fn run_loo(&self, table: &mut FusionTable<T>) -> Result<(), FusionError> {
        let mut written = HashSet::new();
        for v in self.variants {
            let start = self.begin(v);
            let pipeline = self.pipeline(v)?;

            let rows = validate_with(&pipeline);
            let mut cols = PassColumns::with_capacity(rows.len());
            for row in rows {
                let result = match row.failure {
                    Some(e) => Err(e),
                    None => Ok(PointEstimate {
                        corrected: row.estimate,
                        bias: row.bias,
                        nearest_distance: row.nearest_distance,
                        neighbor_count: row.neighbor_count,
                        passed_through: row.passed_through,
                        geometry_fallback: row.geometry_fallback,
                    }),
                };
                cols.push(row.index, result);
            }

            self.record(table, v, LOO_PREFIX, cols, &mut written)?;
            self.finish(v, start);
        }
        Ok(())
    }

    /// Plain pass of every variant at `queries`, written with `prefix`.
    ///
    /// The queries are not references of this network, so nothing is excluded.
    pub fn evaluate_into(
        &self,
        queries: &[QueryPoint<T>],
        prefix: &str,
        table: &mut FusionTable<T>,
    ) -> Result<(), FusionError> {
        let mut written = HashSet::new();
        for v in self.variants {
            let start = self.begin(v);
            let pipeline = self.pipeline(v)?;

            let results = evaluate_queries(&pipeline, queries);
            let mut cols = PassColumns::with_capacity(results.len());
            for (i, r) in results.into_iter().enumerate() {
                cols.push(i, r);
            }

            self.record(table, v, prefix, cols, &mut written)?;
            self.finish(v, start);
        }
        Ok(())
    }

    fn pipeline(&self, v: &FusionVariant) -> Result<CorrectionPipeline<'a, T>, FusionError> {
        let power = T::from(v.power).ok_or(FusionError::InvalidPower(v.power))?;
        Ok(CorrectionPipeline::new(self.reference, v.policy, power, v.mode))
    }

    fn begin(&self, v: &FusionVariant) -> Instant {
        info!(network = self.tag, variant = %v.name, "begin");
        Instant::now()
    }

    fn finish(&self, v: &FusionVariant, start: Instant) {
        info!(
            network = self.tag,
            variant = %v.name,
            elapsed_s = start.elapsed().as_secs_f64(),
            "finish"
        );
    }

    fn record(
        &self,
        table: &mut FusionTable<T>,
        v: &FusionVariant,
        prefix: &str,
        cols: PassColumns<T>,
        written: &mut HashSet<&'static str>,
    ) -> Result<(), FusionError> {
        cols.report(self.tag, &v.name);

        let name = format!("{}{}", prefix, v.column(self.tag));
        if let Some(observed) = table.observed() {
            let error = cols
                .estimate
                .iter()
                .zip(observed.iter())
                .map(|(&e, &o)| e - o)
                .collect();
            table.insert_column(format!("{}_ERR", name), ColumnKind::Error, error)?;
        }
        table.insert_column(name, ColumnKind::Estimate, cols.estimate)?;

        let policy = v.policy.tag();
        if written.insert(policy) {
            table.insert_column(
                distance_column(prefix, policy, self.tag),
                ColumnKind::Distance,
                cols.distance,
            )?;
        }
        Ok(())
    }
}

/// Key of a nearest-distance column.
pub fn distance_column(prefix: &str, policy: &str, tag: &str) -> String {
    format!("{}{}_{}_DIST", prefix, policy, tag)
}

// ============================================================================
// Fusion Executor
// ============================================================================

/// Runs a complete two-network fusion.
#[derive(Debug, Clone)]
pub struct FusionExecutor<'a> {
    config: &'a FusionConfig,
}

impl<'a> FusionExecutor<'a> {
    /// Create an executor for a validated configuration.
    pub fn new(config: &'a FusionConfig) -> Self {
        Self { config }
    }

    /// Run the fusion.
    ///
    /// `target` is the query surface; `None` (or `cv_only`) skips the
    /// target pass and the target blends.
    pub fn run<T: FusionFloat>(
        &self,
        reference_a: &ReferenceSet<T>,
        reference_b: &ReferenceSet<T>,
        target: Option<&[QueryPoint<T>]>,
    ) -> Result<FusionOutput<T>, FusionError> {
        let cfg = self.config;
        for (reference, expected) in [(reference_a, Network::A), (reference_b, Network::B)] {
            if reference.network() != expected {
                return Err(FusionError::Configuration(format!(
                    "reference set for network {} holds network {} observations",
                    expected,
                    reference.network()
                )));
            }
        }

        let (tag_a, tag_b) = (cfg.tags.a.as_str(), cfg.tags.b.as_str());
        let exec_a = NetworkExecutor::new(reference_a, tag_a, &cfg.variants);
        let exec_b = NetworkExecutor::new(reference_b, tag_b, &cfg.variants);
        let blender = EnsembleBlender::new(BlendParams::from_config(cfg));

        // Cross-validation tables.
        let mut cv_a = FusionTable::for_reference(format!("{} CV", tag_a), reference_a);
        let mut cv_b = FusionTable::for_reference(format!("{} CV", tag_b), reference_b);
        exec_a.run_loo(&mut cv_a)?;
        exec_b.run_loo(&mut cv_b)?;

        // Network B held out at network A's observations.
        let held_out: Vec<QueryPoint<T>> = reference_a.points().iter().map(|p| p.as_query()).collect();
        exec_b.evaluate_into(&held_out, LOO_PREFIX, &mut cv_a)?;
        self.fuse(&mut cv_a, &blender, LOO_PREFIX, false)?;

        // Target surface.
        let target = match target {
            Some(queries) if !cfg.cv_only => {
                let mut table = FusionTable::for_queries("target", queries);
                exec_a.evaluate_into(queries, "", &mut table)?;
                exec_b.evaluate_into(queries, "", &mut table)?;
                self.fuse(&mut table, &blender, "", true)?;
                Some(table)
            }
            _ => {
                info!("cv only, target surface skipped");
                None
            }
        };

        let metrics_a = cv_a.cv_metrics();
        let metrics_b = cv_b.cv_metrics();
        for (name, m) in metrics_a.iter().chain(metrics_b.iter()) {
            debug!(column = %name, count = m.count, "cross-validation scored");
        }

        Ok(FusionOutput {
            cv_a,
            cv_b,
            target,
            metrics_a,
            metrics_b,
        })
    }

    /// Floored distances and blended columns for every configured blend.
    fn fuse<T: FusionFloat>(
        &self,
        table: &mut FusionTable<T>,
        blender: &EnsembleBlender<T>,
        prefix: &str,
        target_pass: bool,
    ) -> Result<(), FusionError> {
        let cfg = self.config;
        let (tag_a, tag_b) = (cfg.tags.a.as_str(), cfg.tags.b.as_str());

        for spec in &cfg.blends {
            if target_pass && !spec.on_target {
                continue;
            }
            let variant = cfg
                .variant(&spec.variant)
                .ok_or_else(|| FusionError::UnknownVariant(spec.variant.clone()))?;
            let policy = variant.policy.tag();

            let dist_key_a = distance_column(prefix, policy, tag_a);
            let dist_key_b = distance_column(prefix, policy, tag_b);
            let values_a = Self::required(table, &format!("{}{}", prefix, variant.column(tag_a)))?;
            let values_b = Self::required(table, &format!("{}{}", prefix, variant.column(tag_b)))?;
            let dist_a = Self::required(table, &dist_key_a)?;
            let dist_b = Self::required(table, &dist_key_b)?;

            let blended = blender.blend(table.model(), &values_a, &dist_a, &values_b, &dist_b)?;

            let params = blender.params();
            for (key, dist, floor) in [(dist_key_a, &dist_a, params.floor_a), (dist_key_b, &dist_b, params.floor_b)] {
                if floor > T::zero() {
                    let adjusted = dist.iter().map(|&d| if d.is_finite() { d.max(floor) } else { d }).collect();
                    table.insert_column(format!("{}_ADJ", key), ColumnKind::Distance, adjusted)?;
                }
            }

            let column = spec.column();
            table.insert_column(
                format!("{}_WGT_{}", column, tag_a),
                ColumnKind::Weight,
                blended.iter().map(|b| b.weight.a).collect(),
            )?;
            table.insert_column(
                format!("{}_WGT_{}", column, tag_b),
                ColumnKind::Weight,
                blended.iter().map(|b| b.weight.b).collect(),
            )?;
            table.insert_column(column, ColumnKind::Estimate, blended.iter().map(|b| b.value).collect())?;
        }
        Ok(())
    }

    fn required<T: FusionFloat>(table: &FusionTable<T>, name: &str) -> Result<Vec<T>, FusionError> {
        table
            .column(name)
            .map(<[T]>::to_vec)
            .ok_or_else(|| FusionError::Configuration(format!("missing column {}", name)))
    }
}
