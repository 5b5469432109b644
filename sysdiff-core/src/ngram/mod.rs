//! N-gram difference analysis
//!
//! Counts every contiguous n-gram of the reference and of each system,
//! matches hypothesis occurrences against the same sentence's reference
//! with clipped one-to-one matching, and ranks n-grams by how differently
//! two systems reproduce them.
//!
//! Counting is a map-reduce: [`NgramCounts::from_sentence`] is a pure
//! per-sentence count and the results are merged with the associative
//! [`Monoid`] merge, in parallel when the `parallel` feature is enabled.
//! Counts are integers, so the result does not depend on the merge order.

mod counts;
mod extract;
mod salience;

pub use counts::{NgramCounts, NgramTally};
pub use extract::{clipped_matches, ngram_counts, ngrams, Ngram};
pub use salience::{confidence_weight, CountStatistic, RateBasis, Salience};

use crate::corpus::{CorpusPair, Sentence};
use crate::error::{Error, Result};
use crate::monoid::Monoid;
use crate::pairs::{resolve_pairs, SystemPair};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Default maximum n-gram order
pub const DEFAULT_MAX_ORDER: usize = 4;

/// Default number of n-grams listed per direction
pub const DEFAULT_REPORT_LENGTH: usize = 50;

/// Configuration for [`NgramAnalyzer`]
#[derive(Debug, Clone, PartialEq)]
pub struct NgramConfig {
    /// Smallest n-gram order
    pub min_order: usize,
    /// Largest n-gram order
    pub max_order: usize,
    /// Salience strategy
    pub salience: Salience,
    /// Ranked n-grams kept per direction (None = all)
    pub report_length: Option<usize>,
    /// Pairs to compare (None = all pairs `i < j`)
    pub pairs: Option<Vec<SystemPair>>,
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self {
            min_order: 1,
            max_order: DEFAULT_MAX_ORDER,
            salience: Salience::default(),
            report_length: Some(DEFAULT_REPORT_LENGTH),
            pairs: None,
        }
    }
}

impl NgramConfig {
    /// Creates a new builder for NgramConfig
    pub fn builder() -> NgramConfigBuilder {
        NgramConfigBuilder::default()
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.min_order == 0 {
            return Err(Error::configuration("minimum n-gram order must be at least 1"));
        }
        if self.max_order < self.min_order {
            return Err(Error::configuration(format!(
                "maximum n-gram order {} is below the minimum {}",
                self.max_order, self.min_order
            )));
        }
        self.salience.validate()
    }
}

/// Builder for NgramConfig with fluent API
#[derive(Debug, Clone, Default)]
pub struct NgramConfigBuilder {
    config: NgramConfig,
}

impl NgramConfigBuilder {
    /// Sets the order range
    pub fn orders(mut self, min_order: usize, max_order: usize) -> Self {
        self.config.min_order = min_order;
        self.config.max_order = max_order;
        self
    }

    /// Sets the salience strategy
    pub fn salience(mut self, salience: Salience) -> Self {
        self.config.salience = salience;
        self
    }

    /// Sets the per-direction report length
    pub fn report_length(mut self, length: Option<usize>) -> Self {
        self.config.report_length = length;
        self
    }

    /// Restricts the compared pairs
    pub fn pairs(mut self, pairs: Vec<SystemPair>) -> Self {
        self.config.pairs = Some(pairs);
        self
    }

    /// Builds and validates the configuration
    pub fn build(self) -> Result<NgramConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// One materialised n-gram with counts and pairwise salience
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NgramRecord {
    /// The n-gram
    pub ngram: Ngram,
    /// Occurrences in the reference
    pub reference_count: u64,
    /// Occurrences in each system's output
    pub counts_per_system: Vec<u64>,
    /// Clipped matches for each system
    pub matched_per_system: Vec<u64>,
    /// Salience for each compared pair, in report pair order
    pub pairwise_salience: Vec<Option<f64>>,
}

impl NgramRecord {
    /// matched / reference occurrences, undefined without reference occurrences
    pub fn recall(&self, system: usize) -> Option<f64> {
        (self.reference_count > 0)
            .then(|| self.matched_per_system[system] as f64 / self.reference_count as f64)
    }

    /// matched / hypothesis occurrences, undefined when the system never produced it
    pub fn precision(&self, system: usize) -> Option<f64> {
        let produced = self.counts_per_system[system];
        (produced > 0).then(|| self.matched_per_system[system] as f64 / produced as f64)
    }

    /// Hypothesis occurrences without a reference match
    pub fn over_generated(&self, system: usize) -> u64 {
        self.counts_per_system[system] - self.matched_per_system[system]
    }

    /// Reference occurrences the system did not produce
    pub fn under_generated(&self, system: usize) -> u64 {
        self.reference_count - self.matched_per_system[system]
    }

    fn total_for(&self, pair: SystemPair) -> u64 {
        self.reference_count + self.counts_per_system[pair.a] + self.counts_per_system[pair.b]
    }
}

/// An n-gram in a ranked list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedNgram {
    /// The n-gram
    pub ngram: Ngram,
    /// Signed salience (positive favors the pair's first system)
    pub salience: f64,
    /// Reference plus both systems' occurrences
    pub total_count: u64,
}

/// Salient n-grams for one pair, strongest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairRanking {
    /// Compared pair
    pub pair: SystemPair,
    /// N-grams with positive salience
    pub favors_a: Vec<RankedNgram>,
    /// N-grams with negative salience
    pub favors_b: Vec<RankedNgram>,
}

/// Records and rankings for one n-gram order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderReport {
    /// N-gram order
    pub order: usize,
    /// Every n-gram of this order produced by at least one system, sorted by tokens
    pub records: Vec<NgramRecord>,
    /// One ranking per compared pair
    pub rankings: Vec<PairRanking>,
}

/// Result of an n-gram difference analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NgramDiffReport {
    /// System names in corpus order
    pub systems: Vec<String>,
    /// Compared pairs
    pub pairs: Vec<SystemPair>,
    /// Strategy used for salience
    pub salience: Salience,
    /// One entry per order, ascending
    pub orders: Vec<OrderReport>,
}

impl NgramDiffReport {
    /// Report for one order
    pub fn order(&self, order: usize) -> Option<&OrderReport> {
        self.orders.iter().find(|report| report.order == order)
    }
}

/// N-gram counting and salience ranking
#[derive(Debug, Clone)]
pub struct NgramAnalyzer {
    config: NgramConfig,
}

impl NgramAnalyzer {
    /// Create an analyzer, validating the configuration
    pub fn new(config: NgramConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &NgramConfig {
        &self.config
    }

    /// Count n-grams over the whole corpus
    pub fn count(&self, corpus: &CorpusPair) -> NgramCounts {
        let (min, max) = (self.config.min_order, self.config.max_order);
        let count_one = |index: usize| {
            let hypotheses: Vec<&Sentence> = corpus
                .systems()
                .iter()
                .map(|system| &system.sentences()[index])
                .collect();
            NgramCounts::from_sentence(&corpus.reference()[index], &hypotheses, min, max)
        };

        #[cfg(feature = "parallel")]
        let counts = (0..corpus.len())
            .into_par_iter()
            .map(count_one)
            .reduce(NgramCounts::identity, |mut acc, part| {
                acc.absorb(part);
                acc
            });

        #[cfg(not(feature = "parallel"))]
        let counts = NgramCounts::concat((0..corpus.len()).map(count_one));

        counts
    }

    /// Count, score and rank n-grams
    pub fn analyze(&self, corpus: &CorpusPair) -> Result<NgramDiffReport> {
        let pairs = resolve_pairs(self.config.pairs.as_deref(), corpus.num_systems())?;
        let counts = self.count(corpus);
        let systems = corpus.num_systems();

        let mut by_order: BTreeMap<usize, Vec<NgramRecord>> = (self.config.min_order
            ..=self.config.max_order)
            .map(|order| (order, Vec::new()))
            .collect();

        for (ngram, tally) in counts.iter().filter(|(_, tally)| tally.produced()) {
            let mut counts_per_system = tally.hypothesis.clone();
            let mut matched_per_system = tally.matched.clone();
            counts_per_system.resize(systems, 0);
            matched_per_system.resize(systems, 0);

            let record = NgramRecord {
                ngram: ngram.clone(),
                reference_count: tally.reference,
                counts_per_system,
                matched_per_system,
                pairwise_salience: pairs
                    .iter()
                    .map(|pair| self.config.salience.score(tally, pair.a, pair.b))
                    .collect(),
            };
            if let Some(records) = by_order.get_mut(&ngram.order()) {
                records.push(record);
            }
        }

        let orders: Vec<OrderReport> = by_order
            .into_iter()
            .map(|(order, mut records)| {
                records.sort_by(|x, y| x.ngram.cmp(&y.ngram));
                let rankings = pairs
                    .iter()
                    .enumerate()
                    .map(|(slot, &pair)| self.rank(&records, slot, pair))
                    .collect();
                OrderReport {
                    order,
                    records,
                    rankings,
                }
            })
            .collect();

        tracing::info!(
            distinct = counts.len(),
            pairs = pairs.len(),
            "ranked n-grams"
        );

        Ok(NgramDiffReport {
            systems: corpus.system_names(),
            pairs,
            salience: self.config.salience,
            orders,
        })
    }

    fn rank(&self, records: &[NgramRecord], slot: usize, pair: SystemPair) -> PairRanking {
        let mut favors_a = Vec::new();
        let mut favors_b = Vec::new();

        for record in records {
            let Some(salience) = record.pairwise_salience[slot] else {
                continue;
            };
            let ranked = RankedNgram {
                ngram: record.ngram.clone(),
                salience,
                total_count: record.total_for(pair),
            };
            match salience.partial_cmp(&0.0) {
                Some(Ordering::Greater) => favors_a.push(ranked),
                Some(Ordering::Less) => favors_b.push(ranked),
                _ => {}
            }
        }

        for list in [&mut favors_a, &mut favors_b] {
            list.sort_by(compare_ranked);
            if let Some(limit) = self.config.report_length {
                list.truncate(limit);
            }
        }

        PairRanking {
            pair,
            favors_a,
            favors_b,
        }
    }
}

/// Descending |salience|, then descending total count, then tokens
fn compare_ranked(x: &RankedNgram, y: &RankedNgram) -> Ordering {
    y.salience
        .abs()
        .total_cmp(&x.salience.abs())
        .then_with(|| y.total_count.cmp(&x.total_count))
        .then_with(|| x.ngram.cmp(&y.ngram))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::tokenize;

    fn cat_corpus() -> CorpusPair {
        CorpusPair::builder(vec![tokenize("the cat sat")])
            .system("a", vec![tokenize("the cat sat")])
            .system("b", vec![tokenize("a cat sat")])
            .build()
            .unwrap()
    }

    fn record<'a>(report: &'a NgramDiffReport, ngram: &str) -> &'a NgramRecord {
        let gram = Ngram::new(ngram.split(' '));
        report
            .order(gram.order())
            .and_then(|order| order.records.iter().find(|r| r.ngram == gram))
            .unwrap()
    }

    #[test]
    fn test_shared_ngram_has_zero_salience() {
        let report = NgramAnalyzer::new(NgramConfig::default())
            .unwrap()
            .analyze(&cat_corpus())
            .unwrap();
        let cat = record(&report, "cat");
        assert_eq!(cat.matched_per_system, vec![1, 1]);
        assert_eq!(cat.pairwise_salience, vec![Some(0.0)]);
    }

    #[test]
    fn test_missing_ngram_favors_producer() {
        let report = NgramAnalyzer::new(NgramConfig::default())
            .unwrap()
            .analyze(&cat_corpus())
            .unwrap();
        let the = record(&report, "the");
        assert_eq!(the.matched_per_system, vec![1, 0]);
        assert!(the.pairwise_salience[0].unwrap() > 0.0);

        let ranking = &report.order(1).unwrap().rankings[0];
        assert_eq!(ranking.favors_a[0].ngram, Ngram::new(["the"]));
        assert!(ranking.favors_b.is_empty());
    }

    #[test]
    fn test_reference_absent_ngram_is_precision_only() {
        let report = NgramAnalyzer::new(NgramConfig::default())
            .unwrap()
            .analyze(&cat_corpus())
            .unwrap();
        let a = record(&report, "a");
        assert_eq!(a.reference_count, 0);
        assert_eq!(a.recall(1), None);
        assert_eq!(a.precision(1), Some(0.0));
        assert_eq!(a.pairwise_salience, vec![None]);
    }

    #[test]
    fn test_unproduced_reference_ngrams_not_materialised() {
        let corpus = CorpusPair::builder(vec![tokenize("x y")])
            .system("a", vec![tokenize("x")])
            .system("b", vec![tokenize("x")])
            .build()
            .unwrap();
        let report = NgramAnalyzer::new(NgramConfig::default())
            .unwrap()
            .analyze(&corpus)
            .unwrap();
        let unigrams = &report.order(1).unwrap().records;
        assert_eq!(unigrams.len(), 1);
        assert_eq!(unigrams[0].ngram, Ngram::new(["x"]));
        assert!(report.order(2).unwrap().records.is_empty());
    }

    #[test]
    fn test_ties_broken_by_count_then_tokens() {
        // "p" and "q" both have perfect recall for a and zero for b with
        // one reference occurrence each; "r" occurs twice
        let corpus = CorpusPair::builder(vec![tokenize("q p r"), tokenize("r")])
            .system("a", vec![tokenize("q p r"), tokenize("r")])
            .system("b", vec![tokenize("z"), tokenize("z")])
            .build()
            .unwrap();
        let config = NgramConfig::builder().orders(1, 1).build().unwrap();
        let report = NgramAnalyzer::new(config).unwrap().analyze(&corpus).unwrap();
        let favors_a: Vec<String> = report.orders[0].rankings[0]
            .favors_a
            .iter()
            .map(|r| r.ngram.to_string())
            .collect();
        assert_eq!(favors_a, vec!["r", "p", "q"]);
    }

    #[test]
    fn test_report_length_truncates() {
        let corpus = CorpusPair::builder(vec![tokenize("a b c d e")])
            .system("a", vec![tokenize("a b c d e")])
            .system("b", vec![tokenize("z")])
            .build()
            .unwrap();
        let config = NgramConfig::builder()
            .orders(1, 1)
            .report_length(Some(2))
            .build()
            .unwrap();
        let report = NgramAnalyzer::new(config).unwrap().analyze(&corpus).unwrap();
        assert_eq!(report.orders[0].rankings[0].favors_a.len(), 2);
    }

    #[test]
    fn test_invalid_orders_rejected() {
        assert!(NgramConfig::builder().orders(0, 2).build().is_err());
        assert!(NgramConfig::builder().orders(3, 2).build().is_err());
    }

    #[test]
    fn test_single_system_rejected() {
        let corpus = CorpusPair::builder(vec![tokenize("a")])
            .system("only", vec![tokenize("a")])
            .build()
            .unwrap();
        let result = NgramAnalyzer::new(NgramConfig::default())
            .unwrap()
            .analyze(&corpus);
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }
}
