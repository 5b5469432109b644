//! Pairwise salience strategies
//!
//! Salience is signed: positive values favor the first system of a pair,
//! negative values the second. Every strategy is bounded to `(-1, 1)` so a
//! single rare n-gram cannot dominate a ranking.

use super::counts::NgramTally;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which rate the confidence-weighted strategy compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateBasis {
    /// matched / reference occurrences
    Recall,
    /// matched / hypothesis occurrences
    Precision,
}

/// Which count the smoothed strategy compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountStatistic {
    /// Hypothesis occurrences matched in the reference
    Matched,
    /// Hypothesis occurrences not found in the reference
    Over,
    /// Reference occurrences the hypothesis failed to produce
    Under,
}

/// Salience strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Salience {
    /// `(rate_a - rate_b) * w(n)` with `w(n) = ln(1+n) / (1 + ln(1+n))`
    ///
    /// `n` is the rate denominator: reference occurrences for recall,
    /// `hyp_a + hyp_b` for precision.
    ConfidenceWeighted {
        /// Rate being compared
        basis: RateBasis,
    },
    /// Laplace-smoothed share `2 * (c_a + alpha) / (c_a + c_b + 2 * alpha) - 1`
    Smoothed {
        /// Smoothing mass, larger values favor frequent n-grams
        alpha: f64,
        /// Count being compared
        statistic: CountStatistic,
    },
}

impl Default for Salience {
    fn default() -> Self {
        Salience::ConfidenceWeighted {
            basis: RateBasis::Recall,
        }
    }
}

/// Count-confidence weight in `[0, 1)`, increasing in `count`
pub fn confidence_weight(count: f64) -> f64 {
    let log = (1.0 + count).ln();
    log / (1.0 + log)
}

impl Salience {
    /// Reject parameters that would produce undefined scores
    pub fn validate(&self) -> Result<()> {
        match self {
            Salience::ConfidenceWeighted { .. } => Ok(()),
            Salience::Smoothed { alpha, .. } => {
                if alpha.is_finite() && *alpha > 0.0 {
                    Ok(())
                } else {
                    Err(Error::configuration(format!(
                        "smoothing alpha must be positive, got {alpha}"
                    )))
                }
            }
        }
    }

    /// Salience of systems `a` over `b` for one n-gram
    ///
    /// `None` when the strategy is undefined for this n-gram (no reference
    /// occurrences for recall, a system without occurrences for precision).
    pub fn score(&self, tally: &NgramTally, a: usize, b: usize) -> Option<f64> {
        let hyp = |s: usize| tally.hypothesis.get(s).copied().unwrap_or(0) as f64;
        let matched = |s: usize| tally.matched.get(s).copied().unwrap_or(0) as f64;

        match *self {
            Salience::ConfidenceWeighted { basis } => match basis {
                RateBasis::Recall => {
                    let reference = tally.reference as f64;
                    if reference == 0.0 {
                        return None;
                    }
                    let diff = (matched(a) - matched(b)) / reference;
                    Some(diff * confidence_weight(reference))
                }
                RateBasis::Precision => {
                    let (hyp_a, hyp_b) = (hyp(a), hyp(b));
                    if hyp_a == 0.0 || hyp_b == 0.0 {
                        return None;
                    }
                    let diff = matched(a) / hyp_a - matched(b) / hyp_b;
                    Some(diff * confidence_weight(hyp_a + hyp_b))
                }
            },
            Salience::Smoothed { alpha, statistic } => {
                let count = |s: usize| match statistic {
                    CountStatistic::Matched => matched(s),
                    CountStatistic::Over => hyp(s) - matched(s),
                    CountStatistic::Under => tally.reference as f64 - matched(s),
                };
                let (c_a, c_b) = (count(a), count(b));
                Some(2.0 * (c_a + alpha) / (c_a + c_b + 2.0 * alpha) - 1.0)
            }
        }
    }
}
