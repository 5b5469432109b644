//! Output formatting module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use sysdiff_core::ngram::{CountStatistic, RateBasis};
use sysdiff_core::significance::SystemSummary;
use sysdiff_core::{
    BootstrapOutcome, BucketReport, NgramDiffReport, Salience, SentenceExamplesReport,
    WordAccuracyReport,
};

/// Trait for output formatters
///
/// Each analysis writes one section; `finish` flushes whatever the format
/// buffers.
pub trait OutputFormatter: Send + Sync {
    /// Write a significance section; `names` maps system indices to names
    fn write_significance(&mut self, names: &[String], outcome: &BootstrapOutcome) -> Result<()>;

    /// Write a sentence bucket section
    fn write_buckets(&mut self, report: &BucketReport) -> Result<()>;

    /// Write a word accuracy section
    fn write_word_accuracy(&mut self, report: &WordAccuracyReport) -> Result<()>;

    /// Write an n-gram difference section
    fn write_ngrams(&mut self, report: &NgramDiffReport) -> Result<()>;

    /// Write a sentence examples section
    fn write_examples(&mut self, report: &SentenceExamplesReport) -> Result<()>;

    /// Finalize output (e.g., emit the buffered JSON document)
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod markdown;
pub mod text;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

/// Supported output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned plain-text tables
    #[default]
    Text,
    /// One JSON document with a key per analysis
    Json,
    /// Markdown tables
    Markdown,
}

impl OutputFormat {
    /// All formats in listing order
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Text, OutputFormat::Json, OutputFormat::Markdown];

    /// One-line description for `list formats`
    pub fn description(&self) -> &'static str {
        match self {
            OutputFormat::Text => "Aligned plain-text tables",
            OutputFormat::Json => "A single JSON document with one key per analysis",
            OutputFormat::Markdown => "Markdown tables",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
        };
        f.write_str(name)
    }
}

/// Build the formatter for `format` over `writer`
pub fn create_formatter(
    format: OutputFormat,
    writer: Box<dyn Write + Send + Sync>,
    pretty_json: bool,
) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(writer)),
        OutputFormat::Json => Box::new(JsonFormatter::new(writer, pretty_json)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new(writer)),
    }
}

/// Render an optional statistic with four decimals, `-` when undefined
pub(crate) fn fmt_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

/// Render a bucket interval as `[lower, upper]`, `-` for an empty bucket
pub(crate) fn fmt_interval(summary: Option<&SystemSummary>) -> String {
    summary.map_or_else(
        || "-".to_string(),
        |s| format!("[{:.4}, {:.4}]", s.lower, s.upper),
    )
}

/// Name of system `index`, falling back to the index itself
pub(crate) fn system_name(names: &[String], index: usize) -> String {
    names
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("#{index}"))
}

/// Short human-readable name of a salience strategy
pub(crate) fn salience_label(salience: &Salience) -> String {
    match salience {
        Salience::ConfidenceWeighted { basis } => match basis {
            RateBasis::Recall => "weighted recall difference".to_string(),
            RateBasis::Precision => "weighted precision difference".to_string(),
        },
        Salience::Smoothed { alpha, statistic } => {
            let statistic = match statistic {
                CountStatistic::Matched => "matched",
                CountStatistic::Over => "over-generated",
                CountStatistic::Under => "under-generated",
            };
            format!("smoothed {statistic} share (alpha {alpha})")
        }
    }
}

#[cfg(test)]
pub(crate) mod test_reports {
    //! Small reports shared by the formatter tests

    use sysdiff_core::bucket::{BucketRow, WordAccuracy, WordAccuracyRow};
    use sysdiff_core::corpus::{tokenize, CorpusPair};
    use sysdiff_core::sentence_examples::{PairExamples, SentenceExample};
    use sysdiff_core::significance::{SignificanceReport, SystemSummary};
    use sysdiff_core::*;

    pub fn names() -> Vec<String> {
        vec!["base".to_string(), "new".to_string()]
    }

    pub fn outcome() -> BootstrapOutcome {
        BootstrapOutcome {
            metric: "bleu".to_string(),
            samples: 100,
            threshold: 0.05,
            sample_size: 3,
            systems: vec![
                SystemSummary {
                    system: 0,
                    score: 0.25,
                    mean: 0.24,
                    median: 0.245,
                    lower: 0.2,
                    upper: 0.3,
                },
                SystemSummary {
                    system: 1,
                    score: 0.5,
                    mean: 0.5,
                    median: 0.5,
                    lower: 0.45,
                    upper: 0.55,
                },
            ],
            comparisons: vec![SignificanceReport {
                system_a: 0,
                system_b: 1,
                wins_a: 2,
                wins_b: 97,
                ties: 1,
                p_a_gt_b: 0.02,
                p_b_gt_a: 0.97,
                p_tie: 0.01,
                ci_low: -0.3,
                ci_high: -0.2,
                is_significant: true,
            }],
        }
    }

    pub fn buckets() -> BucketReport {
        BucketReport {
            mode: "length".to_string(),
            aggregation: Aggregation::Macro,
            systems: names(),
            buckets: vec![
                BucketRow {
                    key: "<10".to_string(),
                    counts_per_system: vec![2, 1],
                    stat_per_system: vec![Some(0.5), Some(0.75)],
                    intervals_per_system: Vec::new(),
                },
                BucketRow {
                    key: ">=10".to_string(),
                    counts_per_system: vec![0, 1],
                    stat_per_system: vec![None, Some(0.125)],
                    intervals_per_system: Vec::new(),
                },
            ],
        }
    }

    /// `buckets()` with a bootstrap interval on every non-empty cell
    pub fn buckets_with_intervals() -> BucketReport {
        let interval = |system, score, lower, upper| SystemSummary {
            system,
            score,
            mean: score,
            median: score,
            lower,
            upper,
        };
        let mut report = buckets();
        report.buckets[0].intervals_per_system =
            vec![Some(interval(0, 0.5, 0.4, 0.6)), Some(interval(1, 0.75, 0.75, 0.75))];
        report.buckets[1].intervals_per_system = vec![None, Some(interval(1, 0.125, 0.125, 0.125))];
        report
    }

    pub fn examples() -> SentenceExamplesReport {
        SentenceExamplesReport {
            metric: "sentbleu".to_string(),
            systems: names(),
            report_length: 10,
            pairs: vec![PairExamples {
                system_a: 0,
                system_b: 1,
                a_better: Vec::new(),
                b_better: vec![SentenceExample {
                    sentence: 4,
                    score_a: 0.25,
                    score_b: 1.0,
                    difference: 0.75,
                    reference: "the cat sat".to_string(),
                    output_a: "a cat sat".to_string(),
                    output_b: "the cat sat".to_string(),
                }],
            }],
        }
    }

    pub fn word_accuracy() -> WordAccuracyReport {
        WordAccuracyReport {
            mode: "frequency".to_string(),
            systems: names(),
            buckets: vec![WordAccuracyRow {
                key: "<10".to_string(),
                per_system: vec![
                    WordAccuracy {
                        matched: 1,
                        reference_total: 2,
                        hypothesis_total: 2,
                        recall: 0.5,
                        precision: 0.5,
                        f_measure: 0.5,
                    },
                    WordAccuracy::default(),
                ],
            }],
        }
    }

    pub fn ngrams() -> NgramDiffReport {
        let corpus = CorpusPair::builder(vec![tokenize("the cat sat")])
            .system("base", vec![tokenize("a cat sat")])
            .system("new", vec![tokenize("the cat sat")])
            .build()
            .unwrap();
        let config = NgramConfig::builder().orders(1, 2).build().unwrap();
        NgramAnalyzer::new(config).unwrap().analyze(&corpus).unwrap()
    }
}
