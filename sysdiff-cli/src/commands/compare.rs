//! Compare command implementation

use crate::config::{BucketKind, CliConfig, SalienceKind};
use crate::error::CliError;
use crate::input::{resolve_patterns, FileReader};
use crate::output::{create_formatter, OutputFormat, OutputFormatter};
use crate::progress::ProgressReporter;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use sysdiff_core::bucket::{
    Aggregation, BucketMode, Bucketer, Cutoffs, FrequencyTable, LabelSet, Ranges,
    SentenceAttributes, UnknownLabelPolicy, WordLabels,
};
use sysdiff_core::corpus::{CorpusPair, SystemOutput};
use sysdiff_core::io::read_frequency_table;
use sysdiff_core::metric::{Metric, MetricKind, StatsTable};
use sysdiff_core::ngram::{NgramAnalyzer, NgramConfig};
use sysdiff_core::sentence_examples::{ExampleConfig, SentenceExamples};
use sysdiff_core::significance::{BootstrapConfig, PairedBootstrap};
use sysdiff_core::SystemPair;

/// Analyses the compare command can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Analysis {
    /// Paired bootstrap significance test
    Significance,
    /// Sentence-level buckets
    Buckets,
    /// Word-level accuracy buckets
    Words,
    /// N-gram difference analysis
    Ngrams,
    /// Sentences with the largest score gaps
    Examples,
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Analysis::Significance => "significance",
            Analysis::Buckets => "buckets",
            Analysis::Words => "words",
            Analysis::Ngrams => "ngrams",
            Analysis::Examples => "examples",
        };
        f.write_str(name)
    }
}

fn parse_aggregation(s: &str) -> Result<Aggregation, String> {
    match s {
        "micro" => Ok(Aggregation::Micro),
        "macro" => Ok(Aggregation::Macro),
        other => Err(format!("unknown aggregation '{other}', expected micro or macro")),
    }
}

fn parse_policy(s: &str) -> Result<UnknownLabelPolicy, String> {
    match s {
        "reject" => Ok(UnknownLabelPolicy::Reject),
        "other" => Ok(UnknownLabelPolicy::Other),
        other => Err(format!("unknown label policy '{other}', expected reject or other")),
    }
}

/// Arguments for the compare command
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Reference file, one whitespace-tokenized sentence per line
    #[arg(short, long, value_name = "FILE")]
    pub reference: PathBuf,

    /// System output files or patterns (supports glob), in system order
    #[arg(short, long, value_name = "FILE/PATTERN", required = true, num_args = 1..)]
    pub systems: Vec<String>,

    /// System names, comma separated (default: file stems)
    #[arg(short, long, value_delimiter = ',')]
    pub names: Vec<String>,

    /// Analyses to run, comma separated
    #[arg(
        short,
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [
            Analysis::Significance,
            Analysis::Buckets,
            Analysis::Words,
            Analysis::Ngrams,
            Analysis::Examples,
        ]
    )]
    pub analyses: Vec<Analysis>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Metric for significance and sentence buckets
    #[arg(short, long)]
    pub metric: Option<MetricKind>,

    /// Per-sentence scores, one file per system (required by the mean metric)
    #[arg(long, value_name = "FILE")]
    pub scores: Vec<PathBuf>,

    /// Lowercase every sentence before analysis
    #[arg(long)]
    pub lowercase: bool,

    /// System pairs to compare, e.g. "0-1;0-2" (default: all pairs)
    #[arg(long, value_name = "PAIRS")]
    pub pairs: Option<String>,

    /// Bootstrap iterations
    #[arg(long)]
    pub samples: Option<usize>,

    /// Significance threshold
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Resampling seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of the corpus drawn per iteration
    #[arg(long)]
    pub sample_ratio: Option<f64>,

    /// Sentence bucket key
    #[arg(long, value_enum)]
    pub bucket: Option<BucketKind>,

    /// Colon-separated bucket cutoffs, e.g. "10:20:30"; numlabel and score
    /// keys also take "count:BINS" or "width:START:WIDTH:BINS"
    #[arg(long)]
    pub cutoffs: Option<String>,

    /// Sentence bucket aggregation: micro or macro
    #[arg(long, value_parser = parse_aggregation)]
    pub aggregation: Option<Aggregation>,

    /// Sentence labels, one per line
    #[arg(long, value_name = "FILE")]
    pub labels: Option<PathBuf>,

    /// Declared labels in bucket order, comma separated (default: observed labels)
    #[arg(long, value_delimiter = ',')]
    pub label_set: Vec<String>,

    /// Labels outside the declared set: reject or other
    #[arg(long, value_parser = parse_policy)]
    pub unknown_labels: Option<UnknownLabelPolicy>,

    /// Sentence numbers for numlabel buckets, one per line
    #[arg(long, value_name = "FILE")]
    pub numbers: Option<PathBuf>,

    /// Separator between sub-labels
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Add a bootstrap interval to every sentence bucket
    #[arg(long)]
    pub bucket_intervals: bool,

    /// Word bucket key
    #[arg(long, value_enum)]
    pub word_bucket: Option<BucketKind>,

    /// Colon-separated cutoffs for word buckets
    #[arg(long)]
    pub word_cutoffs: Option<String>,

    /// Frequency file of word<TAB>count lines (default: reference counts)
    #[arg(long, value_name = "FILE")]
    pub frequency_file: Option<PathBuf>,

    /// Reference word labels, one per token
    #[arg(long, value_name = "FILE")]
    pub ref_word_labels: Option<PathBuf>,

    /// System word labels, one file per system
    #[arg(long, value_name = "FILE")]
    pub sys_word_labels: Vec<PathBuf>,

    /// Per-token scores aligned with the reference, one file per system
    #[arg(long, value_name = "FILE")]
    pub word_scores: Vec<PathBuf>,

    /// Compare words case-insensitively
    #[arg(long)]
    pub case_insensitive: bool,

    /// Smallest n-gram order
    #[arg(long)]
    pub min_order: Option<usize>,

    /// Largest n-gram order
    #[arg(long)]
    pub max_order: Option<usize>,

    /// N-gram salience strategy
    #[arg(long, value_enum)]
    pub salience: Option<SalienceKind>,

    /// Smoothing mass for smoothed salience strategies
    #[arg(long)]
    pub alpha: Option<f64>,

    /// N-grams listed per direction (0 = all)
    #[arg(long)]
    pub report_length: Option<usize>,

    /// Sentence-level metric for sentence examples
    #[arg(long)]
    pub example_metric: Option<MetricKind>,

    /// Sentence examples listed per direction
    #[arg(long)]
    pub example_length: Option<usize>,

    /// Number of worker threads (default: number of CPUs)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl CompareArgs {
    /// Execute the compare command
    pub fn execute(&self, quiet: bool) -> Result<()> {
        log::info!("Starting system comparison");
        log::debug!("Arguments: {:?}", self);

        let settings = self.settings()?;
        configure_threads(settings.performance.worker_threads);

        let corpus = self.load_corpus()?;
        log::info!(
            "Loaded {} sentences for {} systems",
            corpus.len(),
            corpus.num_systems()
        );
        let pairs = self
            .pairs
            .as_deref()
            .map(SystemPair::parse_list)
            .transpose()?;

        let writer: Box<dyn Write + Send + Sync> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
                format!("Failed to create output file: {}", path.display())
            })?)),
            None => Box::new(io::stdout()),
        };
        let mut formatter =
            create_formatter(settings.output.format, writer, settings.output.pretty_json);

        let metric = settings.significance.metric.build();
        let needs_table = self
            .analyses
            .iter()
            .any(|a| matches!(a, Analysis::Significance | Analysis::Buckets));
        let table = if needs_table {
            Some(self.stats_table(&corpus, settings.significance.metric, metric.as_ref()))
        } else {
            None
        };

        let mut failed = Vec::new();
        let mut analyses: Vec<Analysis> = Vec::new();
        for analysis in &self.analyses {
            if !analyses.contains(analysis) {
                analyses.push(*analysis);
            }
        }
        for analysis in analyses {
            let outcome = match analysis {
                Analysis::Significance => borrow_table(&table).and_then(|table| {
                    run_significance(
                        &settings,
                        pairs.clone(),
                        &corpus,
                        table,
                        metric.as_ref(),
                        quiet,
                        formatter.as_mut(),
                    )
                }),
                Analysis::Buckets => borrow_table(&table).and_then(|table| {
                    self.run_buckets(&settings, &corpus, table, metric.as_ref(), formatter.as_mut())
                }),
                Analysis::Words => self.run_words(&settings, &corpus, formatter.as_mut()),
                Analysis::Ngrams => run_ngrams(&settings, pairs.clone(), &corpus, formatter.as_mut()),
                Analysis::Examples => {
                    self.run_examples(&settings, pairs.clone(), &corpus, formatter.as_mut())
                }
            };

            if let Err(err) = outcome {
                log::error!("{analysis} analysis failed: {err:#}");
                failed.push(analysis.to_string());
            }
        }

        formatter.finish()?;

        if failed.is_empty() {
            log::info!("Comparison complete");
            Ok(())
        } else {
            Err(CliError::AnalysisFailed(failed).into())
        }
    }

    /// Configuration file values with command-line overrides applied
    pub fn settings(&self) -> Result<CliConfig> {
        let mut config = CliConfig::load_or_default(self.config.as_deref())?;

        let significance = &mut config.significance;
        override_with(&mut significance.metric, self.metric);
        override_with(&mut significance.samples, self.samples);
        override_with(&mut significance.threshold, self.threshold);
        override_with(&mut significance.seed, self.seed);
        override_with(&mut significance.sample_ratio, self.sample_ratio);

        let buckets = &mut config.buckets;
        override_with(&mut buckets.mode, self.bucket);
        override_with(&mut buckets.word_mode, self.word_bucket);
        override_with(&mut buckets.aggregation, self.aggregation);
        override_with(&mut buckets.unknown_labels, self.unknown_labels);
        override_with(&mut buckets.delimiter, self.delimiter.clone());
        if self.cutoffs.is_some() {
            buckets.cutoffs = self.cutoffs.clone();
        }
        buckets.intervals |= self.bucket_intervals;

        let ngram = &mut config.ngram;
        override_with(&mut ngram.min_order, self.min_order);
        override_with(&mut ngram.max_order, self.max_order);
        override_with(&mut ngram.salience, self.salience);
        override_with(&mut ngram.alpha, self.alpha);
        override_with(&mut ngram.report_length, self.report_length);

        override_with(&mut config.examples.metric, self.example_metric);
        override_with(&mut config.examples.report_length, self.example_length);

        override_with(&mut config.output.format, self.format);
        override_with(&mut config.performance.worker_threads, self.threads);

        Ok(config)
    }

    fn load_corpus(&self) -> Result<CorpusPair> {
        let reference = FileReader::read_corpus(&self.reference)?;
        let files = resolve_patterns(&self.systems)?;

        if !self.names.is_empty() && self.names.len() != files.len() {
            return Err(CliError::InputMismatch(format!(
                "{} names given for {} system files",
                self.names.len(),
                files.len()
            ))
            .into());
        }

        let mut systems = Vec::with_capacity(files.len());
        for (index, path) in files.iter().enumerate() {
            let name = self
                .names
                .get(index)
                .cloned()
                .unwrap_or_else(|| FileReader::system_name(path));
            log::debug!("System {index} ({name}): {}", path.display());
            systems.push(SystemOutput::new(name, FileReader::read_corpus(path)?));
        }

        let corpus = CorpusPair::new(reference, systems).context("Inputs are not aligned")?;
        Ok(if self.lowercase {
            corpus.lowercased()
        } else {
            corpus
        })
    }

    fn stats_table(
        &self,
        corpus: &CorpusPair,
        kind: MetricKind,
        metric: &dyn Metric,
    ) -> Result<StatsTable> {
        if kind != MetricKind::Mean {
            return Ok(StatsTable::compute(corpus, metric)?);
        }

        if self.scores.len() != corpus.num_systems() {
            return Err(CliError::ConfigError(format!(
                "the mean metric needs one --scores file per system ({} given, {} systems)",
                self.scores.len(),
                corpus.num_systems()
            ))
            .into());
        }
        let mut rows = Vec::with_capacity(self.scores.len());
        for path in &self.scores {
            let row = FileReader::read_numbers(path)?;
            if row.len() != corpus.len() {
                return Err(CliError::InputMismatch(format!(
                    "{} has {} scores for {} sentences",
                    path.display(),
                    row.len(),
                    corpus.len()
                ))
                .into());
            }
            rows.push(row);
        }
        Ok(StatsTable::from_sentence_scores(rows)?)
    }

    fn run_buckets(
        &self,
        settings: &CliConfig,
        corpus: &CorpusPair,
        table: &StatsTable,
        metric: &dyn Metric,
        formatter: &mut dyn OutputFormatter,
    ) -> Result<()> {
        let buckets = &settings.buckets;
        let labels = self.labels.as_deref().map(FileReader::read_labels).transpose()?;
        let numbers = self.numbers.as_deref().map(FileReader::read_numbers).transpose()?;
        let cutoffs = buckets.cutoffs.as_deref();
        let delimiter = buckets.delimiter.as_str();

        let mode = match buckets.mode {
            BucketKind::Frequency => {
                return Err(CliError::ConfigError(
                    "frequency buckets apply to words, use --word-bucket frequency".to_string(),
                )
                .into())
            }
            BucketKind::Label => BucketMode::Label {
                labels: self.label_set(labels.as_deref(), None, buckets.unknown_labels)?,
            },
            BucketKind::MultiLabel => BucketMode::MultiLabel {
                labels: self.label_set(labels.as_deref(), Some(delimiter), buckets.unknown_labels)?,
                delimiter: delimiter.to_string(),
            },
            BucketKind::NumLabel => BucketMode::NumLabel {
                ranges: match cutoffs {
                    Some(text) => text.parse::<Ranges>()?,
                    None => Cutoffs::numlabel_default().into(),
                },
            },
            BucketKind::Score => BucketMode::Score {
                ranges: match cutoffs {
                    Some(text) => text.parse::<Ranges>()?,
                    None => Cutoffs::score_default(metric.scale())?.into(),
                },
            },
            BucketKind::Length => BucketMode::Length {
                cutoffs: cutoffs_or(cutoffs, Cutoffs::length_default)?,
            },
            BucketKind::LengthDiff => BucketMode::LengthDiff {
                cutoffs: cutoffs_or(cutoffs, Cutoffs::length_diff_default)?,
            },
        };

        let mut bucketer = Bucketer::new(mode);
        if buckets.intervals {
            bucketer = bucketer.with_intervals(bootstrap_config(settings, None)?);
        }
        let report = bucketer.analyze_sentences(
            corpus,
            table,
            metric,
            SentenceAttributes {
                labels: labels.as_deref(),
                numbers: numbers.as_deref(),
            },
            buckets.aggregation,
        )?;
        formatter.write_buckets(&report)
    }

    fn run_words(
        &self,
        settings: &CliConfig,
        corpus: &CorpusPair,
        formatter: &mut dyn OutputFormatter,
    ) -> Result<()> {
        let buckets = &settings.buckets;
        let reference_labels = self
            .ref_word_labels
            .as_deref()
            .map(FileReader::read_token_labels)
            .transpose()?;
        let output_labels = self
            .sys_word_labels
            .iter()
            .map(|path| FileReader::read_token_labels(path))
            .collect::<Result<Vec<_>>>()?;
        let cutoffs = self.word_cutoffs.as_deref();
        let delimiter = buckets.delimiter.as_str();

        let mode = match buckets.word_mode {
            BucketKind::Frequency => {
                let table = match &self.frequency_file {
                    Some(path) => read_frequency_table(path, self.case_insensitive).with_context(
                        || format!("Failed to read frequency file: {}", path.display()),
                    )?,
                    None => FrequencyTable::from_corpus(corpus.reference(), self.case_insensitive),
                };
                BucketMode::Frequency {
                    table,
                    cutoffs: cutoffs_or(cutoffs, Cutoffs::frequency_default)?,
                }
            }
            BucketKind::Label => BucketMode::Label {
                labels: word_label_set(
                    reference_labels.as_deref(),
                    &output_labels,
                    None,
                    buckets.unknown_labels,
                )?,
            },
            BucketKind::MultiLabel => BucketMode::MultiLabel {
                labels: word_label_set(
                    reference_labels.as_deref(),
                    &output_labels,
                    Some(delimiter),
                    buckets.unknown_labels,
                )?,
                delimiter: delimiter.to_string(),
            },
            other => {
                return Err(CliError::ConfigError(format!(
                    "word buckets support frequency, label and multilabel keys, not {other:?}"
                ))
                .into())
            }
        };
        let bucketer = Bucketer::new(mode);

        let labels = WordLabels {
            reference: reference_labels.as_deref(),
            outputs: (!output_labels.is_empty()).then_some(output_labels.as_slice()),
        };
        let report = bucketer.word_accuracy(corpus, labels, self.case_insensitive)?;
        formatter.write_word_accuracy(&report)?;

        if !self.word_scores.is_empty() {
            let scores = self
                .word_scores
                .iter()
                .map(|path| FileReader::read_token_scores(path))
                .collect::<Result<Vec<_>>>()?;
            let report = bucketer.word_scores(
                corpus.system_names(),
                corpus.reference(),
                reference_labels.as_deref(),
                &scores,
            )?;
            formatter.write_buckets(&report)?;
        }
        Ok(())
    }

    fn run_examples(
        &self,
        settings: &CliConfig,
        pairs: Option<Vec<SystemPair>>,
        corpus: &CorpusPair,
        formatter: &mut dyn OutputFormatter,
    ) -> Result<()> {
        let examples = &settings.examples;
        let metric = examples.metric.build();
        let table = self.stats_table(corpus, examples.metric, metric.as_ref())?;
        let config = ExampleConfig {
            report_length: examples.report_length,
            pairs,
        };
        let report = SentenceExamples::new(config)?.find(corpus, &table, metric.as_ref())?;
        formatter.write_examples(&report)
    }

    /// Declared labels when given, otherwise every label observed in `observed`
    fn label_set(
        &self,
        observed: Option<&[String]>,
        delimiter: Option<&str>,
        policy: UnknownLabelPolicy,
    ) -> Result<LabelSet> {
        if !self.label_set.is_empty() {
            return Ok(LabelSet::new(&self.label_set, policy)?);
        }
        let observed = observed.ok_or_else(|| {
            CliError::ConfigError("label buckets need --labels or --label-set".to_string())
        })?;
        Ok(LabelSet::from_observed(
            observed.iter().map(String::as_str),
            delimiter,
            policy,
        )?)
    }
}

fn word_label_set(
    reference: Option<&[Vec<String>]>,
    outputs: &[Vec<Vec<String>>],
    delimiter: Option<&str>,
    policy: UnknownLabelPolicy,
) -> Result<LabelSet> {
    let reference = reference.ok_or_else(|| {
        CliError::ConfigError("label word buckets need --ref-word-labels".to_string())
    })?;
    let observed = reference
        .iter()
        .chain(outputs.iter().flatten())
        .flatten()
        .map(String::as_str);
    Ok(LabelSet::from_observed(observed, delimiter, policy)?)
}

fn run_significance(
    settings: &CliConfig,
    pairs: Option<Vec<SystemPair>>,
    corpus: &CorpusPair,
    table: &StatsTable,
    metric: &dyn Metric,
    quiet: bool,
    formatter: &mut dyn OutputFormatter,
) -> Result<()> {
    let tester = PairedBootstrap::new(bootstrap_config(settings, pairs)?)?;

    let mut progress = ProgressReporter::new(quiet);
    progress.init_samples(settings.significance.samples as u64);
    let callback: &(dyn Fn(usize, usize) + Sync) = &|_done, _total| progress.sample_completed();
    let outcome = tester.run(table, metric, Some(callback));
    progress.finish();

    formatter.write_significance(&corpus.system_names(), &outcome?)
}

/// Bootstrap settings from the significance section
fn bootstrap_config(settings: &CliConfig, pairs: Option<Vec<SystemPair>>) -> Result<BootstrapConfig> {
    let significance = &settings.significance;
    let mut builder = BootstrapConfig::builder()
        .samples(significance.samples)
        .threshold(significance.threshold)
        .seed(significance.seed)
        .sample_ratio(significance.sample_ratio);
    if let Some(pairs) = pairs {
        builder = builder.pairs(pairs);
    }
    Ok(builder.build()?)
}

fn run_ngrams(
    settings: &CliConfig,
    pairs: Option<Vec<SystemPair>>,
    corpus: &CorpusPair,
    formatter: &mut dyn OutputFormatter,
) -> Result<()> {
    let ngram = &settings.ngram;
    let mut builder = NgramConfig::builder()
        .orders(ngram.min_order, ngram.max_order)
        .salience(ngram.salience.to_salience(ngram.alpha))
        .report_length((ngram.report_length > 0).then_some(ngram.report_length));
    if let Some(pairs) = pairs {
        builder = builder.pairs(pairs);
    }

    let report = NgramAnalyzer::new(builder.build()?)?.analyze(corpus)?;
    formatter.write_ngrams(&report)
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn cutoffs_or(text: Option<&str>, default: fn() -> Cutoffs) -> Result<Cutoffs> {
    match text {
        Some(text) => Ok(text.parse()?),
        None => Ok(default()),
    }
}

fn borrow_table(table: &Option<Result<StatsTable>>) -> Result<&StatsTable> {
    match table {
        Some(Ok(table)) => Ok(table),
        Some(Err(err)) => Err(anyhow!("Failed to compute sentence statistics: {err:#}")),
        None => Err(anyhow!("Sentence statistics were not computed")),
    }
}

/// Size the global rayon pool; 0 means one thread per CPU
fn configure_threads(requested: usize) {
    let threads = if requested == 0 {
        num_cpus::get()
    } else {
        requested
    };
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        Ok(()) => log::debug!("Using {threads} worker threads"),
        Err(err) => log::warn!("Could not configure {threads} worker threads: {err}"),
    }
}
