//! Per-system, per-sentence statistics table

use super::{MeanScore, Metric, SufficientStats};
use crate::corpus::{CorpusPair, Sentence};
use crate::error::{Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sufficient statistics indexed by `[system][sentence]`
///
/// Built once per run and shared read-only by the bootstrap tester and the
/// bucketer.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsTable {
    metric_id: String,
    rows: Vec<Vec<SufficientStats>>,
}

impl StatsTable {
    /// Compute statistics for every system and sentence of `corpus`
    pub fn compute(corpus: &CorpusPair, metric: &dyn Metric) -> Result<Self> {
        let reference = corpus.reference();
        let rows = corpus
            .systems()
            .iter()
            .map(|system| sentence_stats(metric, system.sentences(), reference))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            metric = metric.id(),
            systems = rows.len(),
            sentences = corpus.len(),
            "computed sentence statistics"
        );

        Ok(Self {
            metric_id: metric.id().to_string(),
            rows,
        })
    }

    /// Build a table from externally computed sentence scores, one row per system
    ///
    /// The table is scored with [`MeanScore`].
    pub fn from_sentence_scores(scores: Vec<Vec<f64>>) -> Result<Self> {
        let Some(first) = scores.first() else {
            return Err(Error::invalid_input("no systems in score table"));
        };
        let expected = first.len();

        let mut rows = Vec::with_capacity(scores.len());
        for (system, row) in scores.iter().enumerate() {
            if row.len() != expected {
                return Err(Error::invalid_input(format!(
                    "system {system} has {} scores, expected {expected}",
                    row.len()
                )));
            }
            if let Some(position) = row.iter().position(|score| !score.is_finite()) {
                return Err(Error::invalid_input(format!(
                    "system {system} has a non-finite score at sentence {position}"
                )));
            }
            rows.push(row.iter().map(|&score| MeanScore::stats_for(score)).collect());
        }

        Ok(Self {
            metric_id: MeanScore.id().to_string(),
            rows,
        })
    }

    /// Identifier of the metric that produced the table
    pub fn metric_id(&self) -> &str {
        &self.metric_id
    }

    /// Number of systems
    pub fn num_systems(&self) -> usize {
        self.rows.len()
    }

    /// Number of sentences
    pub fn num_sentences(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Statistics of one system
    pub fn system(&self, system: usize) -> Result<&[SufficientStats]> {
        self.rows.get(system).map(Vec::as_slice).ok_or_else(|| {
            Error::invalid_input(format!(
                "system index {system} out of range ({} systems)",
                self.rows.len()
            ))
        })
    }

    /// Corpus score of one system over all sentences
    pub fn corpus_score(&self, metric: &dyn Metric, system: usize) -> Result<f64> {
        let stats = self.system(system)?;
        let all: Vec<usize> = (0..stats.len()).collect();
        metric.score_indices(stats, &all)
    }

    /// Score of one system on a subset (or multiset) of sentences
    pub fn score_subset(&self, metric: &dyn Metric, system: usize, indices: &[usize]) -> Result<f64> {
        metric.score_indices(self.system(system)?, indices)
    }

    /// Per-sentence scores of every system
    pub fn sentence_scores(&self, metric: &dyn Metric) -> Result<Vec<Vec<f64>>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|stats| metric.score_totals(stats)).collect())
            .collect()
    }
}

#[cfg(feature = "parallel")]
fn sentence_stats(
    metric: &dyn Metric,
    hypotheses: &[Sentence],
    references: &[Sentence],
) -> Result<Vec<SufficientStats>> {
    hypotheses
        .par_iter()
        .zip(references.par_iter())
        .map(|(hypothesis, reference)| metric.sentence_stats(hypothesis, reference))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn sentence_stats(
    metric: &dyn Metric,
    hypotheses: &[Sentence],
    references: &[Sentence],
) -> Result<Vec<SufficientStats>> {
    hypotheses
        .iter()
        .zip(references)
        .map(|(hypothesis, reference)| metric.sentence_stats(hypothesis, reference))
        .collect()
}
