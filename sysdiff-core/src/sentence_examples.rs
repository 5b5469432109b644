//! Sentences where two systems differ most
//!
//! For every compared pair the sentences are ranked by the gap between the
//! two systems' sentence scores. Sentences whose reference and both outputs
//! repeat an earlier sentence are listed once.

use crate::corpus::{CorpusPair, Sentence};
use crate::error::{Error, Result};
use crate::metric::{Metric, StatsTable};
use crate::pairs::{resolve_pairs, SystemPair};
use serde::Serialize;
use std::collections::HashSet;

/// Default number of sentences listed per direction
pub const DEFAULT_EXAMPLE_COUNT: usize = 10;

/// Configuration for [`SentenceExamples`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleConfig {
    /// Sentences listed per direction
    pub report_length: usize,
    /// Pairs to compare (None = all pairs `i < j`)
    pub pairs: Option<Vec<SystemPair>>,
}

impl Default for ExampleConfig {
    fn default() -> Self {
        Self {
            report_length: DEFAULT_EXAMPLE_COUNT,
            pairs: None,
        }
    }
}

impl ExampleConfig {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.report_length == 0 {
            return Err(Error::configuration("at least one example per direction is required"));
        }
        Ok(())
    }
}

/// One sentence with both systems' scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceExample {
    /// Sentence index
    pub sentence: usize,
    /// Score of the first system
    pub score_a: f64,
    /// Score of the second system
    pub score_b: f64,
    /// `score_b - score_a`
    pub difference: f64,
    /// Reference text
    pub reference: String,
    /// Output of the first system
    pub output_a: String,
    /// Output of the second system
    pub output_b: String,
}

/// Examples for one compared pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairExamples {
    /// Index of the first system
    pub system_a: usize,
    /// Index of the second system
    pub system_b: usize,
    /// Sentences the first system scores higher on, largest gap first
    pub a_better: Vec<SentenceExample>,
    /// Sentences the second system scores higher on, largest gap first
    pub b_better: Vec<SentenceExample>,
}

/// Result of a sentence example search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceExamplesReport {
    /// Metric identifier
    pub metric: String,
    /// System names in corpus order
    pub systems: Vec<String>,
    /// Sentences listed per direction
    pub report_length: usize,
    /// One entry per compared pair
    pub pairs: Vec<PairExamples>,
}

/// Finds the sentences with the largest score gaps between systems
#[derive(Debug, Clone)]
pub struct SentenceExamples {
    config: ExampleConfig,
}

impl SentenceExamples {
    /// Searcher for a validated configuration
    pub fn new(config: ExampleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Rank the sentences of every compared pair
    ///
    /// Ties in the score gap keep sentence order. Sentences scored equally
    /// by both systems appear in neither list.
    pub fn find(
        &self,
        corpus: &CorpusPair,
        table: &StatsTable,
        metric: &dyn Metric,
    ) -> Result<SentenceExamplesReport> {
        if table.num_systems() != corpus.num_systems() || table.num_sentences() != corpus.len() {
            return Err(Error::invalid_input(format!(
                "statistics cover {} systems x {} sentences, corpus has {} x {}",
                table.num_systems(),
                table.num_sentences(),
                corpus.num_systems(),
                corpus.len()
            )));
        }
        let pairs = resolve_pairs(self.config.pairs.as_deref(), corpus.num_systems())?;
        let scores = table.sentence_scores(metric)?;

        let pairs = pairs
            .into_iter()
            .map(|pair| self.pair_examples(corpus, &scores, pair))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            metric = metric.id(),
            pairs = pairs.len(),
            "collected sentence examples"
        );

        Ok(SentenceExamplesReport {
            metric: metric.id().to_string(),
            systems: corpus.system_names(),
            report_length: self.config.report_length,
            pairs,
        })
    }

    fn pair_examples(
        &self,
        corpus: &CorpusPair,
        scores: &[Vec<f64>],
        pair: SystemPair,
    ) -> Result<PairExamples> {
        let reference = corpus.reference();
        let outputs_a = corpus.hypotheses(pair.a)?;
        let outputs_b = corpus.hypotheses(pair.b)?;

        let mut seen: HashSet<(&Sentence, &Sentence, &Sentence)> = HashSet::new();
        let mut gaps: Vec<(f64, usize)> = Vec::new();
        for sentence in 0..corpus.len() {
            if !seen.insert((&reference[sentence], &outputs_a[sentence], &outputs_b[sentence])) {
                continue;
            }
            gaps.push((scores[pair.b][sentence] - scores[pair.a][sentence], sentence));
        }

        let mut a_better: Vec<(f64, usize)> = gaps.iter().copied().filter(|g| g.0 < 0.0).collect();
        a_better.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
        let mut b_better: Vec<(f64, usize)> = gaps.into_iter().filter(|g| g.0 > 0.0).collect();
        b_better.sort_by(|x, y| y.0.total_cmp(&x.0).then(x.1.cmp(&y.1)));

        let example = |(difference, sentence): (f64, usize)| SentenceExample {
            sentence,
            score_a: scores[pair.a][sentence],
            score_b: scores[pair.b][sentence],
            difference,
            reference: reference[sentence].join(" "),
            output_a: outputs_a[sentence].join(" "),
            output_b: outputs_b[sentence].join(" "),
        };
        let length = self.config.report_length;

        Ok(PairExamples {
            system_a: pair.a,
            system_b: pair.b,
            a_better: a_better.into_iter().take(length).map(example).collect(),
            b_better: b_better.into_iter().take(length).map(example).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::tokenize;
    use crate::metric::MeanScore;

    /// Five sentences; sentence 3 repeats sentence 1 everywhere
    fn corpus() -> CorpusPair {
        let lines = |prefix: &str| -> Vec<Sentence> {
            [0, 1, 2, 1, 4]
                .iter()
                .map(|i| tokenize(&format!("{prefix}{i}")))
                .collect()
        };
        CorpusPair::builder(lines("r"))
            .system("a", lines("a"))
            .system("b", lines("b"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_examples_ranked_by_gap() {
        let table = StatsTable::from_sentence_scores(vec![
            vec![0.9, 0.1, 0.5, 0.1, 0.6],
            vec![0.2, 0.8, 0.5, 0.8, 0.7],
        ])
        .unwrap();
        let report = SentenceExamples::new(ExampleConfig::default())
            .unwrap()
            .find(&corpus(), &table, &MeanScore)
            .unwrap();

        let pair = &report.pairs[0];
        let a_better: Vec<usize> = pair.a_better.iter().map(|e| e.sentence).collect();
        let b_better: Vec<usize> = pair.b_better.iter().map(|e| e.sentence).collect();
        assert_eq!(a_better, vec![0]);
        // sentence 3 repeats sentence 1; sentence 2 is a tie
        assert_eq!(b_better, vec![1, 4]);

        let top = &pair.b_better[0];
        assert_eq!(top.reference, "r1");
        assert_eq!((top.output_a.as_str(), top.output_b.as_str()), ("a1", "b1"));
        assert!((top.difference - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_report_length_truncates() {
        let table = StatsTable::from_sentence_scores(vec![
            vec![0.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.1, 0.2, 0.3, 0.4, 0.5],
        ])
        .unwrap();
        let config = ExampleConfig {
            report_length: 2,
            pairs: Some(vec![SystemPair::new(1, 0)]),
        };
        let report = SentenceExamples::new(config)
            .unwrap()
            .find(&corpus(), &table, &MeanScore)
            .unwrap();

        let pair = &report.pairs[0];
        assert_eq!((pair.system_a, pair.system_b), (1, 0));
        let a_better: Vec<usize> = pair.a_better.iter().map(|e| e.sentence).collect();
        assert_eq!(a_better, vec![4, 2]);
        assert!(pair.b_better.is_empty());
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(SentenceExamples::new(ExampleConfig {
            report_length: 0,
            pairs: None,
        })
        .is_err());

        let table = StatsTable::from_sentence_scores(vec![vec![0.0; 4], vec![0.0; 4]]).unwrap();
        let result = SentenceExamples::new(ExampleConfig::default())
            .unwrap()
            .find(&corpus(), &table, &MeanScore);
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }
}
