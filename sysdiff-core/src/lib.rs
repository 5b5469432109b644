//! Holistic comparison of text generation systems
//!
//! Given a reference corpus and the aligned outputs of two or more systems
//! (translation, summarization, dialog), this crate answers three questions:
//!
//! - **Is the difference real?** [`significance::PairedBootstrap`] resamples
//!   the corpus with replacement and reports win probabilities and a
//!   confidence interval for every compared pair.
//! - **Where does it come from?** [`bucket::Bucketer`] splits sentences or
//!   words by frequency, label, length or score and aggregates per bucket.
//! - **Which phrases differ?** [`ngram::NgramAnalyzer`] ranks n-grams by how
//!   differently two systems reproduce them, and
//!   [`sentence_examples::SentenceExamples`] lists the sentences with the
//!   largest score gaps.
//!
//! Metrics plug in through the [`metric::Metric`] trait, which exposes
//! additive sufficient statistics so that corpus-level scores such as BLEU
//! stay exact on resampled and bucketed subsets.
//!
//! # Example
//!
//! ```rust
//! use sysdiff_core::corpus::{tokenize, CorpusPair};
//! use sysdiff_core::metric::{Bleu, StatsTable};
//! use sysdiff_core::significance::{BootstrapConfig, PairedBootstrap};
//!
//! let corpus = CorpusPair::builder(vec![tokenize("the cat sat on the mat")])
//!     .system("baseline", vec![tokenize("a cat sat on a mat")])
//!     .system("improved", vec![tokenize("the cat sat on the mat")])
//!     .build()
//!     .unwrap();
//!
//! let metric = Bleu::default();
//! let table = StatsTable::compute(&corpus, &metric).unwrap();
//! let config = BootstrapConfig::builder().samples(100).build().unwrap();
//! let outcome = PairedBootstrap::new(config)
//!     .unwrap()
//!     .run(&table, &metric, None)
//!     .unwrap();
//!
//! assert_eq!(outcome.comparisons[0].p_b_gt_a, 1.0);
//! ```

#![warn(missing_docs)]

pub mod bucket;
pub mod corpus;
pub mod error;
pub mod io;
pub mod metric;
pub mod monoid;
pub mod ngram;
pub mod pairs;
pub mod sentence_examples;
pub mod significance;

pub use bucket::{
    Aggregation, Attribute, BucketMode, BucketReport, Bucketer, Cutoffs, FrequencyTable, LabelSet,
    Ranges, SentenceAttributes, UnknownLabelPolicy, WordAccuracyReport, WordLabels,
};
pub use corpus::{CorpusPair, Sentence, SystemOutput};
pub use error::{Error, Result};
pub use metric::{Metric, MetricKind, StatsTable, SufficientStats};
pub use monoid::Monoid;
pub use ngram::{NgramAnalyzer, NgramConfig, NgramDiffReport, Salience};
pub use pairs::SystemPair;
pub use sentence_examples::{ExampleConfig, SentenceExamples, SentenceExamplesReport};
pub use significance::{
    BootstrapConfig, BootstrapOutcome, PairedBootstrap, SignificanceReport, SystemSummary,
};
