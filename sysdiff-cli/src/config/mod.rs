//! Configuration module
//!
//! An optional TOML file supplies defaults for every analysis; command-line
//! flags override individual values.

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use sysdiff_core::bucket::{Aggregation, UnknownLabelPolicy, DEFAULT_LABEL_DELIMITER};
use sysdiff_core::ngram::{CountStatistic, RateBasis, Salience, DEFAULT_MAX_ORDER};
use sysdiff_core::sentence_examples::DEFAULT_EXAMPLE_COUNT;
use sysdiff_core::significance::{DEFAULT_SAMPLES, DEFAULT_THRESHOLD};
use sysdiff_core::MetricKind;

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct CliConfig {
    /// Significance testing configuration
    #[serde(default)]
    pub significance: SignificanceConfig,

    /// Bucketing configuration
    #[serde(default)]
    pub buckets: BucketConfig,

    /// N-gram analysis configuration
    #[serde(default)]
    pub ngram: NgramSection,

    /// Sentence example configuration
    #[serde(default)]
    pub examples: ExamplesSection,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Performance configuration
    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl CliConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Significance-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SignificanceConfig {
    /// Metric used for significance and sentence buckets
    pub metric: MetricKind,

    /// Bootstrap iterations
    pub samples: usize,

    /// Significance threshold
    pub threshold: f64,

    /// Resampling seed
    pub seed: u64,

    /// Fraction of the corpus drawn per iteration
    pub sample_ratio: f64,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            metric: MetricKind::Bleu,
            samples: DEFAULT_SAMPLES,
            threshold: DEFAULT_THRESHOLD,
            seed: 0,
            sample_ratio: 1.0,
        }
    }
}

/// Key functions selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BucketKind {
    /// Word frequency (word buckets only)
    Frequency,
    /// Categorical label
    Label,
    /// Delimited multi-label
    #[value(name = "multilabel")]
    MultiLabel,
    /// Numeric label ranges
    #[value(name = "numlabel")]
    NumLabel,
    /// Sentence score ranges
    Score,
    /// Hypothesis length ranges
    Length,
    /// Hypothesis minus reference length ranges
    #[value(name = "lengthdiff")]
    LengthDiff,
}

/// Bucketing-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BucketConfig {
    /// Sentence bucket key
    pub mode: BucketKind,

    /// Word bucket key
    pub word_mode: BucketKind,

    /// Sentence aggregation
    pub aggregation: Aggregation,

    /// Colon-separated cutoffs, or `count:N` / `width:START:WIDTH:N` ranges
    /// for numlabel and score keys (mode default when absent)
    pub cutoffs: Option<String>,

    /// Handling of labels outside the declared set
    pub unknown_labels: UnknownLabelPolicy,

    /// Separator between sub-labels
    pub delimiter: String,

    /// Bootstrap interval for every sentence bucket, using the significance settings
    pub intervals: bool,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            mode: BucketKind::Length,
            word_mode: BucketKind::Frequency,
            aggregation: Aggregation::Macro,
            cutoffs: None,
            unknown_labels: UnknownLabelPolicy::Reject,
            delimiter: DEFAULT_LABEL_DELIMITER.to_string(),
            intervals: false,
        }
    }
}

/// Salience strategies selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SalienceKind {
    /// Confidence-weighted recall difference
    Recall,
    /// Confidence-weighted precision difference
    Precision,
    /// Smoothed share of matched counts
    Matched,
    /// Smoothed share of over-generated counts
    Over,
    /// Smoothed share of under-generated counts
    Under,
}

impl SalienceKind {
    /// Strategy with the given smoothing mass
    pub fn to_salience(self, alpha: f64) -> Salience {
        let smoothed = |statistic| Salience::Smoothed { alpha, statistic };
        match self {
            SalienceKind::Recall => Salience::ConfidenceWeighted {
                basis: RateBasis::Recall,
            },
            SalienceKind::Precision => Salience::ConfidenceWeighted {
                basis: RateBasis::Precision,
            },
            SalienceKind::Matched => smoothed(CountStatistic::Matched),
            SalienceKind::Over => smoothed(CountStatistic::Over),
            SalienceKind::Under => smoothed(CountStatistic::Under),
        }
    }
}

/// N-gram-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NgramSection {
    /// Smallest n-gram order
    pub min_order: usize,

    /// Largest n-gram order
    pub max_order: usize,

    /// Salience strategy
    pub salience: SalienceKind,

    /// Smoothing mass for smoothed strategies
    pub alpha: f64,

    /// N-grams listed per direction (0 = all)
    pub report_length: usize,
}

impl Default for NgramSection {
    fn default() -> Self {
        Self {
            min_order: 1,
            max_order: DEFAULT_MAX_ORDER,
            salience: SalienceKind::Recall,
            alpha: 1.0,
            report_length: 50,
        }
    }
}

/// Sentence example configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ExamplesSection {
    /// Sentence-level metric the examples are ranked by
    pub metric: MetricKind,

    /// Sentences listed per direction
    pub report_length: usize,
}

impl Default for ExamplesSection {
    fn default() -> Self {
        Self {
            metric: MetricKind::SentBleu,
            report_length: DEFAULT_EXAMPLE_COUNT,
        }
    }
}

/// Output-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Pretty print JSON output
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            pretty_json: true,
        }
    }
}

/// Performance-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of worker threads (0 = auto)
    pub worker_threads: usize,
}
