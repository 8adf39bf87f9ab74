//! Summary statistics of estimates against observations.
//!
//! ## Purpose
//!
//! This module scores one column of cross-validated estimates against the
//! observed values: bias, absolute and squared error, correlation and their
//! normalized forms.
//!
//! ## Key concepts
//!
//! * **NMB**: `sum(est - obs) / sum(obs)`.
//! * **NME**: `sum(|est - obs|) / sum(obs)`.
//!
//! ## Invariants
//!
//! * Pairs with a non-finite estimate or observation are ignored.
//! * Statistics that are undefined for the sample (no pairs, zero variance)
//!   are NaN.

use core::fmt::{Display, Formatter, Result as FmtResult};

use num_traits::Float;

/// Cross-validation scores for one estimate column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CvMetrics<T> {
    /// Number of usable pairs.
    pub count: usize,
    /// Mean of `est - obs`.
    pub mean_bias: T,
    /// Mean of `|est - obs|`.
    pub mae: T,
    /// Root mean squared error.
    pub rmse: T,
    /// Pearson correlation.
    pub r: T,
    /// Normalized mean bias.
    pub nmb: T,
    /// Normalized mean error.
    pub nme: T,
}

impl<T: Float> CvMetrics<T> {
    /// Score `estimates` against `observed`.
    pub fn compute(estimates: &[T], observed: &[T]) -> Self {
        let pairs = || {
            estimates
                .iter()
                .zip(observed.iter())
                .filter(|(e, o)| e.is_finite() && o.is_finite())
                .map(|(&e, &o)| (e, o))
        };

        let mut count = 0usize;
        let (mut se, mut so, mut sd, mut sad, mut ssd) =
            (T::zero(), T::zero(), T::zero(), T::zero(), T::zero());
        for (e, o) in pairs() {
            count += 1;
            let d = e - o;
            se = se + e;
            so = so + o;
            sd = sd + d;
            sad = sad + d.abs();
            ssd = ssd + d * d;
        }

        if count == 0 {
            return Self {
                count,
                mean_bias: T::nan(),
                mae: T::nan(),
                rmse: T::nan(),
                r: T::nan(),
                nmb: T::nan(),
                nme: T::nan(),
            };
        }

        let n = T::from(count).unwrap_or_else(T::nan);
        let (me, mo) = (se / n, so / n);
        let (mut cov, mut ve, mut vo) = (T::zero(), T::zero(), T::zero());
        for (e, o) in pairs() {
            cov = cov + (e - me) * (o - mo);
            ve = ve + (e - me) * (e - me);
            vo = vo + (o - mo) * (o - mo);
        }
        let denom = (ve * vo).sqrt();
        let r = if count > 1 && denom > T::zero() {
            cov / denom
        } else {
            T::nan()
        };

        let ratio = |num: T| if so != T::zero() { num / so } else { T::nan() };

        Self {
            count,
            mean_bias: sd / n,
            mae: sad / n,
            rmse: (ssd / n).sqrt(),
            r,
            nmb: ratio(sd),
            nme: ratio(sad),
        }
    }
}

impl<T: Float + Display> Display for CvMetrics<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "n={} MB={:.3} MAE={:.3} RMSE={:.3} R={:.3} NMB={:.3} NME={:.3}",
            self.count, self.mean_bias, self.mae, self.rmse, self.r, self.nmb, self.nme
        )
    }
}
