//! Metric capability and per-sentence statistics
//!
//! A [`Metric`] turns one hypothesis/reference pair into additive
//! [`SufficientStats`] and turns summed statistics into a score. Corpus
//! scores over any multiset of sentence indices, including the repeated
//! indices produced by bootstrap resampling, are then a sum followed by a
//! single [`Metric::score_totals`] call. Metrics such as BLEU that are not
//! the mean of per-sentence scores stay exact under this scheme.

mod bleu;
mod simple;
mod table;

pub use bleu::{Bleu, SentBleu};
pub use simple::{LengthRatio, MeanScore};
pub use table::StatsTable;

use crate::corpus::Sentence;
use crate::error::{Error, Result};
use crate::monoid::Monoid;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Additive per-sentence statistics of a metric
///
/// Combining is element-wise addition; a shorter vector is treated as
/// zero-padded. The empty vector is the identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SufficientStats(SmallVec<[f64; 10]>);

impl SufficientStats {
    /// Create statistics from raw values
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self(values.into_iter().collect())
    }

    /// Raw values
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no values are present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value at `index`, 0.0 when absent
    pub fn get(&self, index: usize) -> f64 {
        self.0.get(index).copied().unwrap_or(0.0)
    }

    /// Adds `other` element-wise into `self`
    pub fn add_assign(&mut self, other: &Self) {
        if other.0.len() > self.0.len() {
            self.0.resize(other.0.len(), 0.0);
        }
        for (acc, value) in self.0.iter_mut().zip(other.0.iter()) {
            *acc += value;
        }
    }
}

impl Monoid for SufficientStats {
    fn identity() -> Self {
        Self::default()
    }

    fn combine(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.add_assign(other);
        out
    }

    fn absorb(&mut self, other: Self) {
        self.add_assign(&other);
    }
}

/// A scoring capability over tokenized sentences
pub trait Metric: Send + Sync {
    /// Human readable name, may contain spaces
    fn name(&self) -> &str;

    /// Identifier without spaces
    fn id(&self) -> &str;

    /// Upper end of the metric's natural range
    fn scale(&self) -> f64 {
        1.0
    }

    /// Sufficient statistics for one hypothesis/reference pair
    fn sentence_stats(&self, hypothesis: &[String], reference: &[String])
        -> Result<SufficientStats>;

    /// Score for statistics summed over a multiset of sentences
    fn score_totals(&self, totals: &SufficientStats) -> Result<f64>;

    /// Score of a single sentence
    fn sentence_score(&self, hypothesis: &[String], reference: &[String]) -> Result<f64> {
        let stats = self.sentence_stats(hypothesis, reference)?;
        self.score_totals(&stats)
    }

    /// Corpus-level score of aligned hypotheses and references
    fn corpus_score(&self, hypotheses: &[Sentence], references: &[Sentence]) -> Result<f64> {
        if hypotheses.len() != references.len() {
            return Err(Error::invalid_input(format!(
                "{} hypotheses but {} references",
                hypotheses.len(),
                references.len()
            )));
        }
        let mut totals = SufficientStats::identity();
        for (hypothesis, reference) in hypotheses.iter().zip(references) {
            totals.add_assign(&self.sentence_stats(hypothesis, reference)?);
        }
        self.score_totals(&totals)
    }

    /// Score of the multiset `indices` over precomputed sentence statistics
    ///
    /// Statistics are summed in the order of `indices`.
    fn score_indices(&self, stats: &[SufficientStats], indices: &[usize]) -> Result<f64> {
        let mut totals = SufficientStats::identity();
        for &index in indices {
            let sentence = stats.get(index).ok_or_else(|| {
                Error::invalid_input(format!(
                    "sentence index {index} out of range ({} sentences)",
                    stats.len()
                ))
            })?;
            totals.add_assign(sentence);
        }
        self.score_totals(&totals)
    }
}

/// Selector for the built-in metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Corpus BLEU
    Bleu,
    /// Smoothed sentence-level BLEU, averaged over the corpus
    SentBleu,
    /// Hypothesis to reference length ratio
    Length,
    /// Mean of externally supplied sentence scores
    Mean,
}

impl MetricKind {
    /// All selectable kinds
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Bleu,
        MetricKind::SentBleu,
        MetricKind::Length,
        MetricKind::Mean,
    ];

    /// Identifier used in configuration files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Bleu => "bleu",
            MetricKind::SentBleu => "sentbleu",
            MetricKind::Length => "length",
            MetricKind::Mean => "mean",
        }
    }

    /// Instantiate the metric with default parameters
    pub fn build(&self) -> Box<dyn Metric> {
        match self {
            MetricKind::Bleu => Box::new(Bleu::default()),
            MetricKind::SentBleu => Box::new(SentBleu::default()),
            MetricKind::Length => Box::new(LengthRatio),
            MetricKind::Mean => Box::new(MeanScore),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MetricKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::configuration(format!("unknown metric '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::tokenize;

    #[test]
    fn test_stats_add_pads_shorter() {
        let mut a = SufficientStats::new([1.0, 2.0]);
        a.add_assign(&SufficientStats::new([1.0, 1.0, 5.0]));
        assert_eq!(a.as_slice(), &[2.0, 3.0, 5.0]);
        assert_eq!(a.get(7), 0.0);
    }

    #[test]
    fn test_stats_monoid_identity() {
        let a = SufficientStats::new([3.0, 4.0]);
        assert_eq!(a.combine(&SufficientStats::identity()), a);
        assert_eq!(SufficientStats::identity().combine(&a), a);
    }

    #[test]
    fn test_metric_kind_round_trip() {
        for kind in MetricKind::ALL {
            assert_eq!(kind.as_str().parse::<MetricKind>().unwrap(), kind);
            assert_eq!(kind.build().id(), kind.as_str());
        }
        assert!(matches!(
            "meteor".parse::<MetricKind>(),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_corpus_score_rejects_misaligned() {
        let refs = vec![tokenize("a b")];
        let result = LengthRatio.corpus_score(&[], &refs);
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_score_indices_with_repeats() {
        let stats = vec![
            SufficientStats::new([2.0, 4.0]),
            SufficientStats::new([2.0, 1.0]),
        ];
        // ref = 2 + 2 + 2, hyp = 4 + 4 + 1
        let score = LengthRatio.score_indices(&stats, &[0, 0, 1]).unwrap();
        assert!((score - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_score_indices_out_of_range() {
        let stats = vec![SufficientStats::new([1.0, 1.0])];
        assert!(matches!(
            LengthRatio.score_indices(&stats, &[1]),
            Err(Error::InvalidInput { .. })
        ));
    }
}
