//! Output tables of a fusion run.
//!
//! ## Purpose
//!
//! This module defines the column store handed to the persistence layer: one
//! table per network for cross-validation and one optional table for the
//! target surface.
//!
//! ## Design notes
//!
//! * **Shared columns**: Every table carries identifiers, coordinates and the
//!   forecast value; CV tables also carry the observed value.
//! * **Named columns**: Derived columns are kept in insertion order under
//!   their output key (e.g. `LOO_aVNA_AN`, `VNA_PA_DIST`, `FUSED_aVNA`).
//!   NaN marks a missing per-row value.
//! * **Column kinds**: Each column records what it holds, so summary
//!   statistics are computed only for estimate columns.

use core::fmt::{Display, Formatter, Result as FmtResult};

use crate::algorithms::reference::ReferenceSet;
use crate::evaluation::metrics::CvMetrics;
use crate::primitives::errors::FusionError;
use crate::primitives::points::{FusionFloat, QueryPoint};

// ============================================================================
// Columns
// ============================================================================

/// What a named column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Corrected or fused value.
    Estimate,
    /// `estimate - observed`.
    Error,
    /// Distance to the nearest reference (raw or floored).
    Distance,
    /// Ensemble weight of one network.
    Weight,
}

/// A named column of a [`FusionTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column<T> {
    /// Output key.
    pub name: String,
    /// Content kind.
    pub kind: ColumnKind,
    /// One value per row.
    pub values: Vec<T>,
}

// ============================================================================
// Fusion Table
// ============================================================================

/// Column store of per-row results.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionTable<T> {
    label: String,
    ids: Vec<String>,
    x: Vec<T>,
    y: Vec<T>,
    model: Vec<T>,
    observed: Option<Vec<T>>,
    columns: Vec<Column<T>>,
}

impl<T: FusionFloat> FusionTable<T> {
    /// Empty CV table with one row per reference point.
    pub fn for_reference(label: impl Into<String>, reference: &ReferenceSet<T>) -> Self {
        let pts = reference.points();
        Self {
            label: label.into(),
            ids: pts.iter().map(|p| p.id.clone()).collect(),
            x: pts.iter().map(|p| p.x).collect(),
            y: pts.iter().map(|p| p.y).collect(),
            model: pts.iter().map(|p| p.model).collect(),
            observed: Some(pts.iter().map(|p| p.observed).collect()),
            columns: Vec::new(),
        }
    }

    /// Empty target table with one row per query point.
    pub fn for_queries(label: impl Into<String>, queries: &[QueryPoint<T>]) -> Self {
        Self {
            label: label.into(),
            ids: (0..queries.len()).map(|i| i.to_string()).collect(),
            x: queries.iter().map(|q| q.x).collect(),
            y: queries.iter().map(|q| q.y).collect(),
            model: queries.iter().map(|q| q.model).collect(),
            observed: None,
            columns: Vec::new(),
        }
    }

    /// Table label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Row identifiers.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// x coordinates.
    pub fn x(&self) -> &[T] {
        &self.x
    }

    /// y coordinates.
    pub fn y(&self) -> &[T] {
        &self.y
    }

    /// Forecast values.
    pub fn model(&self) -> &[T] {
        &self.model
    }

    /// Observed values (CV tables only).
    pub fn observed(&self) -> Option<&[T]> {
        self.observed.as_deref()
    }

    /// Values of column `name`.
    pub fn column(&self, name: &str) -> Option<&[T]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Named columns in insertion order.
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// Names of the named columns in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Insert or replace column `name`.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        kind: ColumnKind,
        values: Vec<T>,
    ) -> Result<(), FusionError> {
        if values.len() != self.len() {
            return Err(FusionError::MismatchedInputs {
                what: "column",
                got: values.len(),
                expected: self.len(),
            });
        }

        let name = name.into();
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(c) => {
                c.kind = kind;
                c.values = values;
            }
            None => self.columns.push(Column { name, kind, values }),
        }
        Ok(())
    }

    /// Scores of estimate column `name` against the observed values.
    pub fn metrics(&self, name: &str) -> Option<CvMetrics<T>> {
        let observed = self.observed.as_deref()?;
        let values = self.column(name)?;
        Some(CvMetrics::compute(values, observed))
    }

    /// Scores of every estimate column, in column order.
    pub fn cv_metrics(&self) -> Vec<(String, CvMetrics<T>)> {
        let Some(observed) = self.observed.as_deref() else {
            return Vec::new();
        };
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Estimate)
            .map(|c| (c.name.clone(), CvMetrics::compute(&c.values, observed)))
            .collect()
    }
}

impl<T: FusionFloat + Display> Display for FusionTable<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{} ({} rows, {} columns)", self.label, self.len(), self.columns.len())?;
        for c in &self.columns {
            let finite: Vec<T> = c.values.iter().copied().filter(|v| v.is_finite()).collect();
            let mean = if finite.is_empty() {
                T::nan()
            } else {
                finite.iter().fold(T::zero(), |acc, &v| acc + v)
                    / T::from(finite.len()).unwrap_or_else(T::nan)
            };
            writeln!(
                f,
                "  {:<24} {:>8} valid  mean={:.3}",
                c.name,
                finite.len(),
                mean
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Fusion Output
// ============================================================================

/// Everything a fusion run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutput<T> {
    /// CV table of network A, including cross-network and fused columns.
    pub cv_a: FusionTable<T>,
    /// CV table of network B.
    pub cv_b: FusionTable<T>,
    /// Target surface, absent in CV-only mode.
    pub target: Option<FusionTable<T>>,
    /// Scores of the estimate columns of `cv_a`.
    pub metrics_a: Vec<(String, CvMetrics<T>)>,
    /// Scores of the estimate columns of `cv_b`.
    pub metrics_b: Vec<(String, CvMetrics<T>)>,
}

impl<T: FusionFloat> FusionOutput<T> {
    /// Scores of column `name` from either CV table.
    pub fn metric(&self, name: &str) -> Option<&CvMetrics<T>> {
        self.metrics_a
            .iter()
            .chain(self.metrics_b.iter())
            .find(|(n, _)| n == name)
            .map(|(_, m)| m)
    }
}

impl<T: FusionFloat + Display> Display for FusionOutput<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.cv_a)?;
        write!(f, "{}", self.cv_b)?;
        match &self.target {
            Some(t) => write!(f, "{}", t)?,
            None => writeln!(f, "target: skipped (cv only)")?,
        }
        writeln!(f, "Cross-validation:")?;
        for (name, m) in self.metrics_a.iter().chain(self.metrics_b.iter()) {
            writeln!(f, "  {:<24} {}", name, m)?;
        }
        Ok(())
    }
}
