//! BLEU at corpus and sentence level

use super::{Metric, SufficientStats};
use crate::error::{Error, Result};
use crate::ngram::clipped_matches;

/// Default maximum n-gram order
pub const DEFAULT_BLEU_ORDER: usize = 4;

/// Corpus BLEU with uniform weights
///
/// Statistics layout: `[ref_len, hyp_len, matches_1..N, totals_1..N]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bleu {
    max_order: usize,
}

impl Default for Bleu {
    fn default() -> Self {
        Self {
            max_order: DEFAULT_BLEU_ORDER,
        }
    }
}

impl Bleu {
    /// BLEU over n-grams of order 1..=max_order
    pub fn new(max_order: usize) -> Result<Self> {
        if max_order == 0 {
            return Err(Error::configuration("BLEU order must be at least 1"));
        }
        Ok(Self { max_order })
    }

    /// Maximum n-gram order
    pub fn max_order(&self) -> usize {
        self.max_order
    }

    fn stats_len(&self) -> usize {
        2 + 2 * self.max_order
    }

    fn collect_stats(&self, hypothesis: &[String], reference: &[String]) -> SufficientStats {
        let mut values = vec![0.0; self.stats_len()];
        values[0] = reference.len() as f64;
        values[1] = hypothesis.len() as f64;
        for order in 1..=self.max_order {
            let (matched, total) = clipped_matches(hypothesis, reference, order);
            values[1 + order] = matched as f64;
            values[1 + self.max_order + order] = total as f64;
        }
        SufficientStats::new(values)
    }
}

/// Brevity penalty for the given lengths
fn brevity_penalty(ref_len: f64, hyp_len: f64) -> f64 {
    if hyp_len >= ref_len {
        1.0
    } else {
        (1.0 - ref_len / hyp_len).exp()
    }
}

impl Metric for Bleu {
    fn name(&self) -> &str {
        "BLEU"
    }

    fn id(&self) -> &str {
        "bleu"
    }

    fn sentence_stats(
        &self,
        hypothesis: &[String],
        reference: &[String],
    ) -> Result<SufficientStats> {
        Ok(self.collect_stats(hypothesis, reference))
    }

    fn score_totals(&self, totals: &SufficientStats) -> Result<f64> {
        if totals.len() != self.stats_len() {
            return Err(Error::computation(
                self.id(),
                format!(
                    "expected {} statistics, got {}",
                    self.stats_len(),
                    totals.len()
                ),
            ));
        }

        let ref_len = totals.get(0);
        let hyp_len = totals.get(1);
        if hyp_len == 0.0 {
            return Ok(0.0);
        }

        let mut log_precision = 0.0;
        for order in 1..=self.max_order {
            let matched = totals.get(1 + order);
            let total = totals.get(1 + self.max_order + order);
            if matched == 0.0 || total == 0.0 {
                return Ok(0.0);
            }
            log_precision += (matched / total).ln();
        }
        log_precision /= self.max_order as f64;

        Ok(brevity_penalty(ref_len, hyp_len) * log_precision.exp())
    }
}

/// Sentence-level BLEU with add-one smoothing on orders >= 2
///
/// Each sentence contributes `[score, 1]`, so the corpus score is the mean
/// sentence score.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SentBleu {
    inner: Bleu,
}

impl SentBleu {
    /// Smoothed sentence BLEU over n-grams of order 1..=max_order
    pub fn new(max_order: usize) -> Result<Self> {
        Ok(Self {
            inner: Bleu::new(max_order)?,
        })
    }

    fn smoothed(&self, stats: &SufficientStats) -> f64 {
        let n = self.inner.max_order;
        let ref_len = stats.get(0);
        let hyp_len = stats.get(1);
        let unigram_matches = stats.get(2);
        let unigram_total = stats.get(2 + n);
        if hyp_len == 0.0 || unigram_matches == 0.0 || unigram_total == 0.0 {
            return 0.0;
        }

        let mut log_precision = (unigram_matches / unigram_total).ln();
        for order in 2..=n {
            let matched = stats.get(1 + order);
            let total = stats.get(1 + n + order);
            log_precision += ((matched + 1.0) / (total + 1.0)).ln();
        }
        log_precision /= n as f64;

        brevity_penalty(ref_len, hyp_len) * log_precision.exp()
    }
}

impl Metric for SentBleu {
    fn name(&self) -> &str {
        "sentence-level BLEU"
    }

    fn id(&self) -> &str {
        "sentbleu"
    }

    fn sentence_stats(
        &self,
        hypothesis: &[String],
        reference: &[String],
    ) -> Result<SufficientStats> {
        let raw = self.inner.collect_stats(hypothesis, reference);
        Ok(SufficientStats::new([self.smoothed(&raw), 1.0]))
    }

    fn score_totals(&self, totals: &SufficientStats) -> Result<f64> {
        let count = totals.get(1);
        if count == 0.0 {
            return Err(Error::computation(self.id(), "no sentences to average"));
        }
        Ok(totals.get(0) / count)
    }
}
