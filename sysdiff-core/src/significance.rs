//! Paired bootstrap significance testing
//!
//! Every iteration draws one multiset of sentence indices and applies it to
//! all systems, so each compared pair sees the same resampled corpus. Corpus
//! scores are recomputed from summed sufficient statistics, which keeps
//! non-decomposable metrics such as BLEU exact.
//!
//! Iteration `b` takes its indices from a ChaCha8 stream seeded with the run
//! seed and positioned on stream `b`. Draws therefore do not depend on the
//! thread that evaluates an iteration and reports are bit-identical with or
//! without the `parallel` feature.

use crate::error::{Error, Result};
use crate::metric::{Metric, StatsTable};
use crate::pairs::{resolve_pairs, SystemPair};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Default number of bootstrap iterations
pub const DEFAULT_SAMPLES: usize = 1000;

/// Default significance threshold
pub const DEFAULT_THRESHOLD: f64 = 0.05;

/// Configuration for [`PairedBootstrap`]
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapConfig {
    /// Number of resampling iterations
    pub samples: usize,
    /// Significance threshold `p`; the interval level is `1 - p`
    pub threshold: f64,
    /// Seed of the resampling stream
    pub seed: u64,
    /// Fraction of the corpus drawn per iteration
    pub sample_ratio: f64,
    /// Pairs to compare (None = all pairs `i < j`)
    pub pairs: Option<Vec<SystemPair>>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            threshold: DEFAULT_THRESHOLD,
            seed: 0,
            sample_ratio: 1.0,
            pairs: None,
        }
    }
}

impl BootstrapConfig {
    /// Creates a new builder for BootstrapConfig
    pub fn builder() -> BootstrapConfigBuilder {
        BootstrapConfigBuilder::default()
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.samples < 1 {
            return Err(Error::configuration("at least one bootstrap sample is required"));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(Error::configuration(format!(
                "significance threshold must lie in (0, 1), got {}",
                self.threshold
            )));
        }
        if !(self.sample_ratio > 0.0 && self.sample_ratio <= 1.0) {
            return Err(Error::configuration(format!(
                "sample ratio must lie in (0, 1], got {}",
                self.sample_ratio
            )));
        }
        Ok(())
    }

    /// Number of indices drawn per iteration for a corpus of `sentences`
    pub fn sample_size(&self, sentences: usize) -> usize {
        ((sentences as f64 * self.sample_ratio).floor() as usize).max(1)
    }
}

/// Builder for BootstrapConfig with fluent API
#[derive(Debug, Clone, Default)]
pub struct BootstrapConfigBuilder {
    config: BootstrapConfig,
}

impl BootstrapConfigBuilder {
    /// Sets the number of iterations
    pub fn samples(mut self, samples: usize) -> Self {
        self.config.samples = samples;
        self
    }

    /// Sets the significance threshold
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Sets the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Sets the fraction of the corpus drawn per iteration
    pub fn sample_ratio(mut self, ratio: f64) -> Self {
        self.config.sample_ratio = ratio;
        self
    }

    /// Restricts the compared pairs
    pub fn pairs(mut self, pairs: Vec<SystemPair>) -> Self {
        self.config.pairs = Some(pairs);
        self
    }

    /// Builds and validates the configuration
    pub fn build(self) -> Result<BootstrapConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Source of resampled sentence indices
pub trait IndexSampler: Send + Sync {
    /// Indices in `0..population` for one iteration
    fn draw(&self, iteration: usize, population: usize, sample_size: usize) -> Vec<usize>;
}

/// Draws with replacement from a per-iteration ChaCha8 stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededSampler {
    seed: u64,
}

impl SeededSampler {
    /// Sampler for a run seed
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl IndexSampler for SeededSampler {
    fn draw(&self, iteration: usize, population: usize, sample_size: usize) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(iteration as u64);
        (0..sample_size)
            .map(|_| rng.gen_range(0..population))
            .collect()
    }
}

/// Replays a fixed list of draws, cycling when iterations exceed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSampler {
    draws: Vec<Vec<usize>>,
}

impl FixedSampler {
    /// Sampler returning `draws[iteration]`
    pub fn new(draws: Vec<Vec<usize>>) -> Self {
        Self { draws }
    }
}

impl IndexSampler for FixedSampler {
    fn draw(&self, iteration: usize, _population: usize, _sample_size: usize) -> Vec<usize> {
        if self.draws.is_empty() {
            return Vec::new();
        }
        self.draws[iteration % self.draws.len()].clone()
    }
}

/// Outcome for one compared pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignificanceReport {
    /// Index of the first system
    pub system_a: usize,
    /// Index of the second system
    pub system_b: usize,
    /// Iterations where A scored higher
    pub wins_a: usize,
    /// Iterations where B scored higher
    pub wins_b: usize,
    /// Iterations with equal scores
    pub ties: usize,
    /// Fraction of iterations won by A
    pub p_a_gt_b: f64,
    /// Fraction of iterations won by B
    pub p_b_gt_a: f64,
    /// Fraction of tied iterations
    pub p_tie: f64,
    /// Lower bound of the `A - B` interval
    pub ci_low: f64,
    /// Upper bound of the `A - B` interval
    pub ci_high: f64,
    /// Whether either system wins at least a `1 - p` share of iterations
    pub is_significant: bool,
}

impl SignificanceReport {
    /// Index of the significantly better system, if any
    pub fn winner(&self) -> Option<usize> {
        if !self.is_significant {
            None
        } else if self.p_a_gt_b >= self.p_b_gt_a {
            Some(self.system_a)
        } else {
            Some(self.system_b)
        }
    }
}

/// Resampled score distribution of one system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSummary {
    /// System index
    pub system: usize,
    /// Score on the full corpus
    pub score: f64,
    /// Mean resampled score
    pub mean: f64,
    /// Median resampled score
    pub median: f64,
    /// Lower percentile bound
    pub lower: f64,
    /// Upper percentile bound
    pub upper: f64,
}

/// Everything a bootstrap run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapOutcome {
    /// Metric identifier
    pub metric: String,
    /// Iterations run
    pub samples: usize,
    /// Threshold used
    pub threshold: f64,
    /// Indices drawn per iteration
    pub sample_size: usize,
    /// One summary per system
    pub systems: Vec<SystemSummary>,
    /// One report per compared pair
    pub comparisons: Vec<SignificanceReport>,
}

/// Paired bootstrap resampling tester
#[derive(Debug, Clone)]
pub struct PairedBootstrap<S = SeededSampler> {
    config: BootstrapConfig,
    sampler: S,
}

impl PairedBootstrap<SeededSampler> {
    /// Tester drawing from the configured seed
    pub fn new(config: BootstrapConfig) -> Result<Self> {
        let sampler = SeededSampler::new(config.seed);
        Self::with_sampler(config, sampler)
    }
}

impl<S: IndexSampler> PairedBootstrap<S> {
    /// Tester with a custom index source
    pub fn with_sampler(config: BootstrapConfig, sampler: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, sampler })
    }

    /// Configuration in use
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Run the comparison
    ///
    /// `progress` is called with `(completed, total)` after every
    /// iteration. Any metric failure aborts the whole run.
    pub fn run(
        &self,
        table: &StatsTable,
        metric: &dyn Metric,
        progress: Option<&(dyn Fn(usize, usize) + Sync)>,
    ) -> Result<BootstrapOutcome> {
        let sentences = table.num_sentences();
        if sentences == 0 {
            return Err(Error::invalid_input("cannot resample an empty corpus"));
        }
        let pairs = resolve_pairs(self.config.pairs.as_deref(), table.num_systems())?;
        let sample_size = self.config.sample_size(sentences);
        let samples = self.config.samples;

        tracing::info!(
            metric = metric.id(),
            samples,
            sample_size,
            pairs = pairs.len(),
            "starting paired bootstrap"
        );

        let completed = AtomicUsize::new(0);
        let iteration = |b: usize| -> Result<Vec<f64>> {
            let indices = self.sampler.draw(b, sentences, sample_size);
            let scores = (0..table.num_systems())
                .map(|system| table.score_subset(metric, system, &indices))
                .collect::<Result<Vec<f64>>>()?;
            if let Some(report) = progress {
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                report(done, samples);
            }
            Ok(scores)
        };

        #[cfg(feature = "parallel")]
        let resampled: Vec<Vec<f64>> = (0..samples)
            .into_par_iter()
            .map(iteration)
            .collect::<Result<_>>()?;

        #[cfg(not(feature = "parallel"))]
        let resampled: Vec<Vec<f64>> = (0..samples).map(iteration).collect::<Result<_>>()?;

        let threshold = self.config.threshold;
        let comparisons = pairs
            .iter()
            .map(|&pair| compare_pair(&resampled, pair, threshold))
            .collect();

        let systems = (0..table.num_systems())
            .map(|system| {
                let scores: Vec<f64> = resampled.iter().map(|row| row[system]).collect();
                summarize(system, table.corpus_score(metric, system)?, scores, threshold)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BootstrapOutcome {
            metric: metric.id().to_string(),
            samples,
            threshold,
            sample_size,
            systems,
            comparisons,
        })
    }

    /// Resampled score distribution of one system on a subset of sentences
    ///
    /// Iteration `b` draws positions into `members` the same way [`run`]
    /// draws sentence indices, so subsets of equal size see equal draws.
    ///
    /// [`run`]: PairedBootstrap::run
    pub fn summarize_subset(
        &self,
        table: &StatsTable,
        metric: &dyn Metric,
        system: usize,
        members: &[usize],
    ) -> Result<SystemSummary> {
        if members.is_empty() {
            return Err(Error::invalid_input("cannot resample an empty subset"));
        }
        let sample_size = self.config.sample_size(members.len());
        let iteration = |b: usize| -> Result<f64> {
            let indices = self
                .sampler
                .draw(b, members.len(), sample_size)
                .into_iter()
                .map(|position| {
                    members.get(position).copied().ok_or_else(|| {
                        Error::invalid_input(format!(
                            "drawn position {position} outside a subset of {}",
                            members.len()
                        ))
                    })
                })
                .collect::<Result<Vec<usize>>>()?;
            table.score_subset(metric, system, &indices)
        };

        #[cfg(feature = "parallel")]
        let scores: Vec<f64> = (0..self.config.samples)
            .into_par_iter()
            .map(iteration)
            .collect::<Result<_>>()?;

        #[cfg(not(feature = "parallel"))]
        let scores: Vec<f64> = (0..self.config.samples).map(iteration).collect::<Result<_>>()?;

        let score = table.score_subset(metric, system, members)?;
        summarize(system, score, scores, self.config.threshold)
    }
}

fn compare_pair(resampled: &[Vec<f64>], pair: SystemPair, threshold: f64) -> SignificanceReport {
    let mut wins_a = 0;
    let mut wins_b = 0;
    let mut ties = 0;
    let mut diffs = Vec::with_capacity(resampled.len());

    for row in resampled {
        let (a, b) = (row[pair.a], row[pair.b]);
        if a > b {
            wins_a += 1;
        } else if b > a {
            wins_b += 1;
        } else {
            ties += 1;
        }
        diffs.push(a - b);
    }

    diffs.sort_by(f64::total_cmp);
    let (ci_low, ci_high) = percentile_bounds(&diffs, threshold);

    let total = resampled.len() as f64;
    let p_a_gt_b = wins_a as f64 / total;
    let p_b_gt_a = wins_b as f64 / total;

    SignificanceReport {
        system_a: pair.a,
        system_b: pair.b,
        wins_a,
        wins_b,
        ties,
        p_a_gt_b,
        p_b_gt_a,
        p_tie: ties as f64 / total,
        ci_low,
        ci_high,
        is_significant: p_a_gt_b.max(p_b_gt_a) >= 1.0 - threshold,
    }
}

fn summarize(system: usize, score: f64, mut scores: Vec<f64>, threshold: f64) -> Result<SystemSummary> {
    if scores.is_empty() {
        return Err(Error::computation("bootstrap", "no resampled scores"));
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    scores.sort_by(f64::total_cmp);

    let mid = scores.len() / 2;
    let median = if scores.len() % 2 == 1 {
        scores[mid]
    } else {
        (scores[mid - 1] + scores[mid]) / 2.0
    };
    let (lower, upper) = percentile_bounds(&scores, threshold);

    Ok(SystemSummary {
        system,
        score,
        mean,
        median,
        lower,
        upper,
    })
}

/// `(d[floor(B p/2)], d[min(floor(B (1 - p/2)), B - 1)])` of sorted, non-empty `d`
fn percentile_bounds(sorted: &[f64], threshold: f64) -> (f64, f64) {
    let count = sorted.len();
    let last = count - 1;
    let low = ((count as f64 * threshold / 2.0).floor() as usize).min(last);
    let high = ((count as f64 * (1.0 - threshold / 2.0)).floor() as usize).min(last);
    (sorted[low], sorted[high])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::MeanScore;

    fn crossed_table() -> StatsTable {
        StatsTable::from_sentence_scores(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap()
    }

    #[test]
    fn test_golden_draws() {
        let config = BootstrapConfig::builder().samples(4).build().unwrap();
        let sampler = FixedSampler::new(vec![vec![0, 0], vec![1, 1], vec![0, 1], vec![1, 0]]);
        let outcome = PairedBootstrap::with_sampler(config, sampler)
            .unwrap()
            .run(&crossed_table(), &MeanScore, None)
            .unwrap();

        let report = &outcome.comparisons[0];
        assert_eq!((report.wins_a, report.wins_b, report.ties), (1, 1, 2));
        assert_eq!(report.p_a_gt_b, 0.25);
        assert_eq!(report.p_b_gt_a, 0.25);
        assert_eq!(report.p_tie, 0.5);
        assert!(!report.is_significant);
        assert_eq!(report.winner(), None);
        // sorted diffs [-1, 0, 0, 1]
        assert_eq!(report.ci_low, -1.0);
        assert_eq!(report.ci_high, 1.0);
    }

    #[test]
    fn test_identical_systems_always_tie() {
        let table =
            StatsTable::from_sentence_scores(vec![vec![0.3, 0.9, 0.1], vec![0.3, 0.9, 0.1]]).unwrap();
        let config = BootstrapConfig::builder().samples(50).build().unwrap();
        let outcome = PairedBootstrap::new(config)
            .unwrap()
            .run(&table, &MeanScore, None)
            .unwrap();
        let report = &outcome.comparisons[0];
        assert_eq!(report.p_a_gt_b, 0.0);
        assert_eq!(report.p_b_gt_a, 0.0);
        assert_eq!(report.p_tie, 1.0);
    }

    #[test]
    fn test_dominant_system_is_significant() {
        let table = StatsTable::from_sentence_scores(vec![vec![0.9; 20], vec![0.1; 20]]).unwrap();
        let outcome = PairedBootstrap::new(BootstrapConfig::default())
            .unwrap()
            .run(&table, &MeanScore, None)
            .unwrap();
        let report = &outcome.comparisons[0];
        assert!(report.is_significant);
        assert_eq!(report.winner(), Some(0));
        assert!(report.ci_low > 0.0);
    }

    #[test]
    fn test_single_sample_is_point_estimate() {
        let config = BootstrapConfig::builder().samples(1).build().unwrap();
        let outcome = PairedBootstrap::new(config)
            .unwrap()
            .run(&crossed_table(), &MeanScore, None)
            .unwrap();
        let report = &outcome.comparisons[0];
        assert_eq!(report.ci_low, report.ci_high);
        let summary = &outcome.systems[0];
        assert_eq!(summary.lower, summary.upper);
        assert_eq!(summary.mean, summary.median);
    }

    #[test]
    fn test_seeded_sampler_is_reproducible() {
        let sampler = SeededSampler::new(7);
        assert_eq!(sampler.draw(3, 10, 10), sampler.draw(3, 10, 10));
        assert_ne!(sampler.draw(3, 100, 20), sampler.draw(4, 100, 20));
        assert!(sampler.draw(0, 5, 50).iter().all(|&i| i < 5));
    }

    #[test]
    fn test_sample_ratio() {
        let config = BootstrapConfig::builder().sample_ratio(0.5).build().unwrap();
        assert_eq!(config.sample_size(10), 5);
        assert_eq!(config.sample_size(1), 1);
    }

    #[test]
    fn test_progress_reports_every_iteration() {
        let calls = AtomicUsize::new(0);
        let callback: &(dyn Fn(usize, usize) + Sync) = &|_done, total| {
            assert_eq!(total, 10);
            calls.fetch_add(1, Ordering::Relaxed);
        };
        let config = BootstrapConfig::builder().samples(10).build().unwrap();
        PairedBootstrap::new(config)
            .unwrap()
            .run(&crossed_table(), &MeanScore, Some(callback))
            .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn test_subset_summary() {
        let table = StatsTable::from_sentence_scores(vec![vec![0.2, 0.4, 0.9, 0.6]]).unwrap();
        let config = BootstrapConfig::builder().samples(3).build().unwrap();
        let sampler = FixedSampler::new(vec![vec![0, 0], vec![1, 1], vec![0, 1]]);
        let summary = PairedBootstrap::with_sampler(config, sampler)
            .unwrap()
            .summarize_subset(&table, &MeanScore, 0, &[1, 2])
            .unwrap();

        // positions map onto sentences 1 and 2: means 0.4, 0.9, 0.65
        assert!((summary.score - 0.65).abs() < 1e-12);
        assert!((summary.lower - 0.4).abs() < 1e-12);
        assert!((summary.median - 0.65).abs() < 1e-12);
        assert!((summary.upper - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_subset_summary_rejects_bad_input() {
        let table = StatsTable::from_sentence_scores(vec![vec![0.2, 0.4]]).unwrap();
        let tester = PairedBootstrap::new(BootstrapConfig::default()).unwrap();
        assert!(tester.summarize_subset(&table, &MeanScore, 0, &[]).is_err());

        let config = BootstrapConfig::builder().samples(1).build().unwrap();
        let stray = PairedBootstrap::with_sampler(config, FixedSampler::new(vec![vec![5]])).unwrap();
        assert!(matches!(
            stray.summarize_subset(&table, &MeanScore, 0, &[0, 1]),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        assert!(BootstrapConfig::builder().samples(0).build().is_err());
        assert!(BootstrapConfig::builder().threshold(0.0).build().is_err());
        assert!(BootstrapConfig::builder().threshold(1.0).build().is_err());
        assert!(BootstrapConfig::builder().sample_ratio(1.5).build().is_err());
        assert!(BootstrapConfig::builder().sample_ratio(0.0).build().is_err());
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let table = StatsTable::from_sentence_scores(vec![vec![], vec![]]).unwrap();
        let result = PairedBootstrap::new(BootstrapConfig::default())
            .unwrap()
            .run(&table, &MeanScore, None);
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_self_comparison_rejected() {
        let config = BootstrapConfig::builder()
            .pairs(vec![SystemPair::new(1, 1)])
            .build()
            .unwrap();
        let result = PairedBootstrap::new(config)
            .unwrap()
            .run(&crossed_table(), &MeanScore, None);
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }
}
