//! Bucketing and per-bucket aggregation
//!
//! A [`Bucketer`] maps items (sentences or word occurrences) to one or more
//! bucket ids through the key function selected by [`BucketMode`]. Every
//! mode except multi-label yields exactly one bucket per item, so its
//! buckets partition the items; multi-label buckets form a cover.
//!
//! Sentence buckets report either the mean of per-sentence scores (micro)
//! or the metric recomputed on the bucket's sentences (macro), optionally
//! with a bootstrap interval per bucket. Word buckets report matching
//! accuracy, see [`Bucketer::word_accuracy`].

mod cutoffs;
mod frequency;
mod labels;
mod word;

pub use cutoffs::{Cutoffs, Ranges};
pub use frequency::FrequencyTable;
pub use labels::{LabelSet, UnknownLabelPolicy, OTHER_LABEL};
pub use word::{match_words, WordAccuracy, WordAccuracyReport, WordAccuracyRow, WordLabels};

use crate::corpus::CorpusPair;
use crate::error::{Error, Result};
use crate::metric::{MeanScore, Metric, StatsTable};
use crate::significance::{BootstrapConfig, PairedBootstrap, SystemSummary};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

/// Default delimiter between sub-labels of a multi-label value
pub const DEFAULT_LABEL_DELIMITER: &str = "+";

/// Bucket ids assigned to one item
pub type BucketIds = SmallVec<[usize; 4]>;

/// The attribute an item is keyed by
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attribute<'a> {
    /// A word looked up in a frequency table
    Word(&'a str),
    /// A categorical label, possibly holding several sub-labels
    Label(&'a str),
    /// A numeric value
    Number(f64),
}

impl Attribute<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Attribute::Word(_) => "word",
            Attribute::Label(_) => "label",
            Attribute::Number(_) => "numeric",
        }
    }
}

/// Key function and its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum BucketMode {
    /// Word frequency bins
    Frequency {
        /// Frequency source
        table: FrequencyTable,
        /// Count boundaries
        cutoffs: Cutoffs,
    },
    /// One bucket per declared label
    Label {
        /// Declared labels
        labels: LabelSet,
    },
    /// One bucket per distinct sub-label of a delimited label value
    MultiLabel {
        /// Declared sub-labels
        labels: LabelSet,
        /// Separator between sub-labels
        delimiter: String,
    },
    /// Numeric label ranges
    NumLabel {
        /// Range boundaries or how to derive them
        ranges: Ranges,
    },
    /// Sentence score ranges
    Score {
        /// Range boundaries or how to derive them
        ranges: Ranges,
    },
    /// Hypothesis length ranges
    Length {
        /// Range boundaries
        cutoffs: Cutoffs,
    },
    /// Hypothesis minus reference length ranges
    LengthDiff {
        /// Range boundaries
        cutoffs: Cutoffs,
    },
}

impl BucketMode {
    /// Short name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            BucketMode::Frequency { .. } => "frequency",
            BucketMode::Label { .. } => "label",
            BucketMode::MultiLabel { .. } => "multilabel",
            BucketMode::NumLabel { .. } => "numlabel",
            BucketMode::Score { .. } => "score",
            BucketMode::Length { .. } => "length",
            BucketMode::LengthDiff { .. } => "lengthdiff",
        }
    }

    /// Whether every item lands in exactly one bucket
    pub fn is_partition(&self) -> bool {
        !matches!(self, BucketMode::MultiLabel { .. })
    }

    fn ranges(&self) -> Option<&Ranges> {
        match self {
            BucketMode::NumLabel { ranges } | BucketMode::Score { ranges } => Some(ranges),
            _ => None,
        }
    }
}

/// How a bucket's statistic is computed from its sentences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Mean of per-sentence scores
    #[default]
    Micro,
    /// Metric recomputed on the bucket's sentences
    Macro,
}

/// A bucket key with its member item indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Bucket name
    pub key: String,
    /// Member indices in item order
    pub members: Vec<usize>,
}

/// Sentence-aligned attribute streams
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceAttributes<'a> {
    /// One label value per sentence
    pub labels: Option<&'a [String]>,
    /// One number per sentence
    pub numbers: Option<&'a [f64]>,
}

/// Per-bucket counts and statistics for every system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketRow {
    /// Bucket name
    pub key: String,
    /// Items in the bucket for each system
    pub counts_per_system: Vec<usize>,
    /// Statistic for each system, `None` for an empty bucket
    pub stat_per_system: Vec<Option<f64>>,
    /// Bootstrap summary for each system, when intervals were requested
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub intervals_per_system: Vec<Option<SystemSummary>>,
}

/// Result of a bucketed aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketReport {
    /// Key function name
    pub mode: String,
    /// Aggregation used
    pub aggregation: Aggregation,
    /// System names in corpus order
    pub systems: Vec<String>,
    /// Buckets in key order
    pub buckets: Vec<BucketRow>,
}

/// Assigns items to buckets and aggregates per-bucket statistics
#[derive(Debug, Clone)]
pub struct Bucketer {
    mode: BucketMode,
    intervals: Option<BootstrapConfig>,
}

impl Bucketer {
    /// Bucketer for a key function
    pub fn new(mode: BucketMode) -> Self {
        Self {
            mode,
            intervals: None,
        }
    }

    /// Also resample every non-empty sentence bucket with `config`
    pub fn with_intervals(mut self, config: BootstrapConfig) -> Self {
        self.intervals = Some(config);
        self
    }

    /// Key function in use
    pub fn mode(&self) -> &BucketMode {
        &self.mode
    }

    /// Bucket names in output order
    ///
    /// Fails for fixed-count ranges that have not been [fitted](Bucketer::fit).
    pub fn keys(&self) -> Result<Vec<String>> {
        match &self.mode {
            BucketMode::Frequency { cutoffs, .. }
            | BucketMode::Length { cutoffs }
            | BucketMode::LengthDiff { cutoffs } => Ok(cutoffs.names()),
            BucketMode::NumLabel { ranges } | BucketMode::Score { ranges } => {
                Ok(ranges.cutoffs()?.names())
            }
            BucketMode::Label { labels } | BucketMode::MultiLabel { labels, .. } => {
                Ok(labels.names().to_vec())
            }
        }
    }

    /// A copy whose numeric ranges are fixed boundaries derived from `values`
    pub fn fit(&self, values: &[f64]) -> Result<Bucketer> {
        let mode = match &self.mode {
            BucketMode::NumLabel { ranges } => BucketMode::NumLabel {
                ranges: ranges.resolve(values)?.into(),
            },
            BucketMode::Score { ranges } => BucketMode::Score {
                ranges: ranges.resolve(values)?.into(),
            },
            other => other.clone(),
        };
        Ok(Bucketer {
            mode,
            intervals: self.intervals.clone(),
        })
    }

    /// Bucket ids of one item
    pub fn assign(&self, attribute: &Attribute<'_>) -> Result<BucketIds> {
        match (&self.mode, attribute) {
            (BucketMode::Frequency { table, cutoffs }, Attribute::Word(word)) => {
                Ok(smallvec![cutoffs.bin(table.count(word) as f64)])
            }
            (BucketMode::Label { labels }, Attribute::Label(label)) => {
                Ok(smallvec![labels.resolve(label)?])
            }
            (BucketMode::MultiLabel { labels, delimiter }, Attribute::Label(label)) => {
                let mut ids = BucketIds::new();
                for part in label.split(delimiter.as_str()) {
                    let id = labels.resolve(part)?;
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                Ok(ids)
            }
            (
                BucketMode::Length { cutoffs } | BucketMode::LengthDiff { cutoffs },
                Attribute::Number(value),
            ) => Ok(smallvec![cutoffs.bin(*value)]),
            (
                BucketMode::NumLabel { ranges } | BucketMode::Score { ranges },
                Attribute::Number(value),
            ) => match ranges {
                Ranges::Explicit { cutoffs } => Ok(smallvec![cutoffs.bin(*value)]),
                _ => Ok(smallvec![ranges.cutoffs()?.bin(*value)]),
            },
            (mode, attribute) => Err(Error::invalid_input(format!(
                "{} buckets cannot be keyed by a {} attribute",
                mode.name(),
                attribute.kind()
            ))),
        }
    }

    /// Group item indices by bucket
    pub fn partition<'a, I>(&self, attributes: I) -> Result<Vec<Bucket>>
    where
        I: IntoIterator<Item = Attribute<'a>>,
    {
        let mut buckets: Vec<Bucket> = self
            .keys()?
            .into_iter()
            .map(|key| Bucket {
                key,
                members: Vec::new(),
            })
            .collect();

        for (item, attribute) in attributes.into_iter().enumerate() {
            for id in self.assign(&attribute)? {
                buckets[id].members.push(item);
            }
        }
        Ok(buckets)
    }

    /// Bucket sentences and aggregate the metric per bucket and system
    ///
    /// Length, length difference and score keys depend on each system's
    /// output, so membership is computed per system. Fixed-count ranges are
    /// fitted to the values of all systems together so every system shares
    /// one set of buckets.
    pub fn analyze_sentences(
        &self,
        corpus: &CorpusPair,
        table: &StatsTable,
        metric: &dyn Metric,
        attributes: SentenceAttributes<'_>,
        aggregation: Aggregation,
    ) -> Result<BucketReport> {
        if table.num_systems() != corpus.num_systems() || table.num_sentences() != corpus.len() {
            return Err(Error::invalid_input(format!(
                "statistics cover {} systems x {} sentences, corpus has {} x {}",
                table.num_systems(),
                table.num_sentences(),
                corpus.num_systems(),
                corpus.len()
            )));
        }
        check_stream_len("sentence labels", attributes.labels.map(<[String]>::len), corpus.len())?;
        check_stream_len("sentence numbers", attributes.numbers.map(<[f64]>::len), corpus.len())?;

        let scores = table.sentence_scores(metric)?;
        let systems = corpus.num_systems();
        let items = (0..systems)
            .map(|system| self.sentence_attributes(corpus, &scores[system], system, attributes))
            .collect::<Result<Vec<_>>>()?;

        let fitted;
        let bucketer = match self.mode.ranges() {
            Some(ranges) if !ranges.is_resolved() => {
                let values: Vec<f64> = items
                    .iter()
                    .flatten()
                    .filter_map(|attribute| match attribute {
                        Attribute::Number(value) => Some(*value),
                        _ => None,
                    })
                    .collect();
                fitted = self.fit(&values)?;
                &fitted
            }
            _ => self,
        };

        let keys = bucketer.keys()?;
        let mut rows: Vec<BucketRow> = keys
            .into_iter()
            .map(|key| BucketRow {
                key,
                counts_per_system: vec![0; systems],
                stat_per_system: vec![None; systems],
                intervals_per_system: Vec::new(),
            })
            .collect();

        let resampler = self.interval_resampler(&scores, aggregation)?;
        if resampler.is_some() {
            for row in &mut rows {
                row.intervals_per_system = vec![None; systems];
            }
        }

        for (system, system_items) in items.into_iter().enumerate() {
            let buckets = bucketer.partition(system_items)?;
            let stats = table.system(system)?;

            for (row, bucket) in rows.iter_mut().zip(&buckets) {
                row.counts_per_system[system] = bucket.members.len();
                if bucket.members.is_empty() {
                    continue;
                }
                let value = match aggregation {
                    Aggregation::Micro => {
                        bucket.members.iter().map(|&i| scores[system][i]).sum::<f64>()
                            / bucket.members.len() as f64
                    }
                    Aggregation::Macro => metric.score_indices(stats, &bucket.members)?,
                };
                row.stat_per_system[system] = Some(value);

                if let Some(resampler) = &resampler {
                    row.intervals_per_system[system] =
                        Some(resampler.summarize(table, metric, system, &bucket.members)?);
                }
            }
        }

        tracing::debug!(
            mode = self.mode.name(),
            buckets = rows.len(),
            "bucketed sentences"
        );

        Ok(BucketReport {
            mode: self.mode.name().to_string(),
            aggregation,
            systems: corpus.system_names(),
            buckets: rows,
        })
    }

    fn interval_resampler(
        &self,
        scores: &[Vec<f64>],
        aggregation: Aggregation,
    ) -> Result<Option<IntervalResampler>> {
        let Some(config) = &self.intervals else {
            return Ok(None);
        };
        let mean_table = match aggregation {
            Aggregation::Macro => None,
            Aggregation::Micro => Some(StatsTable::from_sentence_scores(scores.to_vec())?),
        };
        Ok(Some(IntervalResampler {
            tester: PairedBootstrap::new(config.clone())?,
            mean_table,
        }))
    }

    fn sentence_attributes<'a>(
        &self,
        corpus: &'a CorpusPair,
        scores: &[f64],
        system: usize,
        attributes: SentenceAttributes<'a>,
    ) -> Result<Vec<Attribute<'a>>> {
        let hypotheses = corpus.hypotheses(system)?;
        let reference = corpus.reference();

        let items = match &self.mode {
            BucketMode::Length { .. } => hypotheses
                .iter()
                .map(|h| Attribute::Number(h.len() as f64))
                .collect(),
            BucketMode::LengthDiff { .. } => hypotheses
                .iter()
                .zip(reference)
                .map(|(h, r)| Attribute::Number(h.len() as f64 - r.len() as f64))
                .collect(),
            BucketMode::Score { .. } => scores.iter().map(|&s| Attribute::Number(s)).collect(),
            BucketMode::Label { .. } | BucketMode::MultiLabel { .. } => attributes
                .labels
                .ok_or_else(|| {
                    Error::invalid_input(format!("{} buckets need sentence labels", self.mode.name()))
                })?
                .iter()
                .map(|label| Attribute::Label(label))
                .collect(),
            BucketMode::NumLabel { .. } => attributes
                .numbers
                .ok_or_else(|| Error::invalid_input("numlabel buckets need sentence numbers"))?
                .iter()
                .map(|&n| Attribute::Number(n))
                .collect(),
            BucketMode::Frequency { .. } => {
                return Err(Error::invalid_input(
                    "frequency buckets key words, not sentences",
                ))
            }
        };
        Ok(items)
    }
}

/// Per-bucket bootstrap over the statistic a report aggregates
///
/// Micro statistics are means of sentence scores, so their intervals
/// resample a mean-of-scores table built from those scores.
struct IntervalResampler {
    tester: PairedBootstrap,
    mean_table: Option<StatsTable>,
}

impl IntervalResampler {
    fn summarize(
        &self,
        table: &StatsTable,
        metric: &dyn Metric,
        system: usize,
        members: &[usize],
    ) -> Result<SystemSummary> {
        match &self.mean_table {
            Some(mean_table) => self.tester.summarize_subset(mean_table, &MeanScore, system, members),
            None => self.tester.summarize_subset(table, metric, system, members),
        }
    }
}

fn check_stream_len(what: &str, actual: Option<usize>, expected: usize) -> Result<()> {
    match actual {
        Some(len) if len != expected => Err(Error::invalid_input(format!(
            "{what} has {len} entries but the corpus has {expected} sentences"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::tokenize;
    use crate::metric::{LengthRatio, MeanScore};

    fn label_set(names: &[&str]) -> LabelSet {
        LabelSet::new(names.iter().copied(), UnknownLabelPolicy::Reject).unwrap()
    }

    #[test]
    fn test_frequency_bins_rare_and_common_words() {
        let table = FrequencyTable::from_counts([("a", 1), ("the", 1000)], false);
        let bucketer = Bucketer::new(BucketMode::Frequency {
            table,
            cutoffs: Cutoffs::frequency_default(),
        });
        let buckets = bucketer
            .partition([Attribute::Word("a"), Attribute::Word("the")])
            .unwrap();
        assert_eq!(buckets[0].members, vec![0]);
        assert_eq!(buckets[3].members, vec![1]);
        let total: usize = buckets.iter().map(|b| b.members.len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_multilabel_cover() {
        let bucketer = Bucketer::new(BucketMode::MultiLabel {
            labels: label_set(&["x", "y", "z"]),
            delimiter: DEFAULT_LABEL_DELIMITER.to_string(),
        });
        let ids = bucketer.assign(&Attribute::Label("z+x+z")).unwrap();
        assert_eq!(ids.as_slice(), &[2, 0]);
        assert!(!bucketer.mode().is_partition());
    }

    #[test]
    fn test_unknown_label_policy() {
        let strict = Bucketer::new(BucketMode::Label {
            labels: label_set(&["a"]),
        });
        assert!(strict.assign(&Attribute::Label("b")).is_err());

        let lenient = Bucketer::new(BucketMode::Label {
            labels: LabelSet::new(["a"], UnknownLabelPolicy::Other).unwrap(),
        });
        assert_eq!(lenient.keys().unwrap(), vec!["a", "other"]);
        assert_eq!(lenient.assign(&Attribute::Label("b")).unwrap().as_slice(), &[1]);
    }

    #[test]
    fn test_attribute_mode_mismatch() {
        let bucketer = Bucketer::new(BucketMode::Length {
            cutoffs: Cutoffs::length_default(),
        });
        assert!(matches!(
            bucketer.assign(&Attribute::Word("a")),
            Err(Error::InvalidInput { .. })
        ));
    }

    fn corpus() -> CorpusPair {
        CorpusPair::builder(vec![tokenize("a b"), tokenize("a b c d"), tokenize("e")])
            .system("short", vec![tokenize("a"), tokenize("a b"), tokenize("e")])
            .system("long", vec![tokenize("a b c"), tokenize("a b c d e"), tokenize("e")])
            .build()
            .unwrap()
    }

    #[test]
    fn test_length_diff_membership_per_system() {
        let corpus = corpus();
        let table = StatsTable::compute(&corpus, &LengthRatio).unwrap();
        let bucketer = Bucketer::new(BucketMode::LengthDiff {
            cutoffs: "0:1".parse().unwrap(),
        });
        let report = bucketer
            .analyze_sentences(
                &corpus,
                &table,
                &LengthRatio,
                SentenceAttributes::default(),
                Aggregation::Macro,
            )
            .unwrap();

        let keys: Vec<&str> = report.buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["<0", "0", ">=1"]);
        assert_eq!(report.buckets[0].counts_per_system, vec![2, 0]);
        assert_eq!(report.buckets[1].counts_per_system, vec![1, 1]);
        assert_eq!(report.buckets[2].counts_per_system, vec![0, 2]);
        assert_eq!(report.buckets[2].stat_per_system[0], None);
        // long system, sentences 0 and 1: (3 + 5) / (2 + 4)
        let ratio = report.buckets[2].stat_per_system[1].unwrap();
        assert!((ratio - 8.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_micro_and_macro_differ_for_ratio_metric() {
        let corpus = corpus();
        let table = StatsTable::compute(&corpus, &LengthRatio).unwrap();
        let labels = vec!["all".to_string(); 3];
        let bucketer = Bucketer::new(BucketMode::Label {
            labels: label_set(&["all"]),
        });
        let attributes = SentenceAttributes {
            labels: Some(&labels),
            numbers: None,
        };
        let micro = bucketer
            .analyze_sentences(&corpus, &table, &LengthRatio, attributes, Aggregation::Micro)
            .unwrap();
        let macro_ = bucketer
            .analyze_sentences(&corpus, &table, &LengthRatio, attributes, Aggregation::Macro)
            .unwrap();

        // short system: ratios 0.5, 0.5, 1.0 vs 4 / 7
        let micro_short = micro.buckets[0].stat_per_system[0].unwrap();
        let macro_short = macro_.buckets[0].stat_per_system[0].unwrap();
        assert!((micro_short - 2.0 / 3.0).abs() < 1e-12);
        assert!((macro_short - 4.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_score_buckets_from_external_scores() {
        let corpus = corpus();
        let table =
            StatsTable::from_sentence_scores(vec![vec![0.05, 0.5, 0.95], vec![0.15, 0.15, 0.15]])
                .unwrap();
        let bucketer = Bucketer::new(BucketMode::Score {
            ranges: Cutoffs::score_default(1.0).unwrap().into(),
        });
        let report = bucketer
            .analyze_sentences(
                &corpus,
                &table,
                &MeanScore,
                SentenceAttributes::default(),
                Aggregation::Micro,
            )
            .unwrap();
        assert_eq!(report.buckets.len(), 10);
        assert_eq!(report.buckets[1].counts_per_system, vec![0, 3]);
        assert_eq!(report.buckets[9].counts_per_system, vec![1, 0]);
    }

    #[test]
    fn test_intervals_bracket_bucket_statistics() {
        let corpus = corpus();
        let table = StatsTable::compute(&corpus, &LengthRatio).unwrap();
        let config = BootstrapConfig::builder().samples(20).seed(3).build().unwrap();
        let bucketer = Bucketer::new(BucketMode::Length {
            cutoffs: "3".parse().unwrap(),
        })
        .with_intervals(config);

        for aggregation in [Aggregation::Micro, Aggregation::Macro] {
            let report = bucketer
                .analyze_sentences(
                    &corpus,
                    &table,
                    &LengthRatio,
                    SentenceAttributes::default(),
                    aggregation,
                )
                .unwrap();
            for row in &report.buckets {
                assert_eq!(row.intervals_per_system.len(), 2);
                for (stat, interval) in row.stat_per_system.iter().zip(&row.intervals_per_system) {
                    match (stat, interval) {
                        (Some(stat), Some(summary)) => {
                            assert!((summary.score - stat).abs() < 1e-12);
                            assert!(summary.lower <= summary.upper);
                        }
                        (None, None) => {}
                        other => panic!("statistic and interval disagree: {other:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn test_no_intervals_unless_requested() {
        let corpus = corpus();
        let table = StatsTable::compute(&corpus, &LengthRatio).unwrap();
        let report = Bucketer::new(BucketMode::Length {
            cutoffs: "3".parse().unwrap(),
        })
        .analyze_sentences(
            &corpus,
            &table,
            &LengthRatio,
            SentenceAttributes::default(),
            Aggregation::Macro,
        )
        .unwrap();
        assert!(report.buckets.iter().all(|row| row.intervals_per_system.is_empty()));
    }

    #[test]
    fn test_fixed_count_score_buckets_are_fitted() {
        let corpus = corpus();
        let table =
            StatsTable::from_sentence_scores(vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]])
                .unwrap();
        let bucketer = Bucketer::new(BucketMode::Score {
            ranges: Ranges::FixedCount { bins: 2 },
        });
        assert!(bucketer.keys().is_err());

        let report = bucketer
            .analyze_sentences(
                &corpus,
                &table,
                &MeanScore,
                SentenceAttributes::default(),
                Aggregation::Micro,
            )
            .unwrap();
        // pooled scores split at rank 3
        let keys: Vec<&str> = report.buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["<0.4", ">=0.4"]);
        assert_eq!(report.buckets[0].counts_per_system, vec![3, 0]);
        assert_eq!(report.buckets[1].counts_per_system, vec![0, 3]);
    }

    #[test]
    fn test_missing_stream_rejected() {
        let corpus = corpus();
        let table = StatsTable::compute(&corpus, &LengthRatio).unwrap();
        let bucketer = Bucketer::new(BucketMode::NumLabel {
            ranges: Cutoffs::numlabel_default().into(),
        });
        let result = bucketer.analyze_sentences(
            &corpus,
            &table,
            &LengthRatio,
            SentenceAttributes::default(),
            Aggregation::Micro,
        );
        assert!(matches!(result, Err(Error::InvalidInput { .. })));

        let short = [0.1];
        let result = bucketer.analyze_sentences(
            &corpus,
            &table,
            &LengthRatio,
            SentenceAttributes {
                labels: None,
                numbers: Some(&short),
            },
            Aggregation::Micro,
        );
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }
}
