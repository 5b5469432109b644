//! Length ratio and mean-of-scores metrics

use super::{Metric, SufficientStats};
use crate::error::{Error, Result};

/// Ratio of hypothesis length to reference length
///
/// Statistics layout: `[ref_len, hyp_len]`. Scores 0 when the reference is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LengthRatio;

impl Metric for LengthRatio {
    fn name(&self) -> &str {
        "length ratio"
    }

    fn id(&self) -> &str {
        "length"
    }

    fn sentence_stats(
        &self,
        hypothesis: &[String],
        reference: &[String],
    ) -> Result<SufficientStats> {
        Ok(SufficientStats::new([
            reference.len() as f64,
            hypothesis.len() as f64,
        ]))
    }

    fn score_totals(&self, totals: &SufficientStats) -> Result<f64> {
        if totals.is_empty() {
            return Err(Error::computation(self.id(), "no sentences to score"));
        }
        let ref_len = totals.get(0);
        if ref_len == 0.0 {
            return Ok(0.0);
        }
        Ok(totals.get(1) / ref_len)
    }
}

/// Mean of sentence scores computed outside this crate
///
/// Statistics layout: `[score, 1]`. Tables for this metric are built with
/// [`StatsTable::from_sentence_scores`](super::StatsTable::from_sentence_scores);
/// it cannot score token sequences itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanScore;

impl MeanScore {
    /// Statistics for one externally computed score
    pub fn stats_for(score: f64) -> SufficientStats {
        SufficientStats::new([score, 1.0])
    }
}

impl Metric for MeanScore {
    fn name(&self) -> &str {
        "mean sentence score"
    }

    fn id(&self) -> &str {
        "mean"
    }

    fn sentence_stats(
        &self,
        _hypothesis: &[String],
        _reference: &[String],
    ) -> Result<SufficientStats> {
        Err(Error::computation(
            self.id(),
            "sentence scores must be supplied externally",
        ))
    }

    fn score_totals(&self, totals: &SufficientStats) -> Result<f64> {
        let count = totals.get(1);
        if count == 0.0 {
            return Err(Error::computation(self.id(), "no sentences to average"));
        }
        Ok(totals.get(0) / count)
    }
}
