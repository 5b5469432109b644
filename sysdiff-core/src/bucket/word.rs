//! Word-level bucketing: matching accuracy and per-token score means

use super::{Aggregation, Attribute, BucketMode, BucketReport, BucketRow, Bucketer};
use crate::corpus::{CorpusPair, Sentence};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// Token-aligned label streams for word buckets
#[derive(Debug, Clone, Copy, Default)]
pub struct WordLabels<'a> {
    /// One label per reference token, `[sentence][token]`
    pub reference: Option<&'a [Vec<String>]>,
    /// One label per hypothesis token, `[system][sentence][token]`
    pub outputs: Option<&'a [Vec<Vec<String>>]>,
}

/// Matching accuracy of one system in one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WordAccuracy {
    /// Matched reference words
    pub matched: u64,
    /// Reference words in the bucket
    pub reference_total: u64,
    /// Hypothesis words in the bucket
    pub hypothesis_total: u64,
    /// matched / reference_total
    pub recall: f64,
    /// matched / hypothesis_total
    pub precision: f64,
    /// Harmonic mean of recall and precision
    pub f_measure: f64,
}

impl WordAccuracy {
    /// Fill the rates; a rate over an empty total is 0
    fn finish(&mut self) {
        let rate = |count: u64, total: u64| {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            }
        };
        self.recall = rate(self.matched, self.reference_total);
        self.precision = rate(self.matched, self.hypothesis_total);
        let sum = self.recall + self.precision;
        self.f_measure = if sum > 0.0 {
            2.0 * self.recall * self.precision / sum
        } else {
            0.0
        };
    }
}

/// Accuracy of every system in one bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordAccuracyRow {
    /// Bucket name
    pub key: String,
    /// One entry per system
    pub per_system: Vec<WordAccuracy>,
}

/// Word matching accuracy by bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordAccuracyReport {
    /// Key function name
    pub mode: String,
    /// System names in corpus order
    pub systems: Vec<String>,
    /// Buckets in key order
    pub buckets: Vec<WordAccuracyRow>,
}

/// Match each hypothesis word to the first unused identical reference word
///
/// Returns, for every hypothesis position, the matched reference position.
pub fn match_words(
    hypothesis: &[String],
    reference: &[String],
    case_insensitive: bool,
) -> Vec<Option<usize>> {
    let fold = |token: &str| -> String {
        if case_insensitive {
            token.to_lowercase()
        } else {
            token.to_string()
        }
    };

    let mut available: HashMap<String, VecDeque<usize>> = HashMap::new();
    for (position, token) in reference.iter().enumerate() {
        available.entry(fold(token)).or_default().push_back(position);
    }

    hypothesis
        .iter()
        .map(|token| {
            available
                .get_mut(&fold(token))
                .and_then(VecDeque::pop_front)
        })
        .collect()
}

impl Bucketer {
    fn check_word_mode(&self) -> Result<()> {
        match self.mode {
            BucketMode::Frequency { .. } | BucketMode::Label { .. } | BucketMode::MultiLabel { .. } => {
                Ok(())
            }
            _ => Err(Error::invalid_input(format!(
                "{} buckets do not apply to words",
                self.mode.name()
            ))),
        }
    }

    fn is_label_mode(&self) -> bool {
        matches!(
            self.mode,
            BucketMode::Label { .. } | BucketMode::MultiLabel { .. }
        )
    }

    /// Word matching accuracy of every system, bucketed by word attribute
    ///
    /// Reference words are keyed by their frequency or reference label.
    /// A matched hypothesis word is keyed like the reference word it
    /// matched; an unmatched one by its own frequency or output label.
    /// Matches are counted in the bucket of the matched reference word, so
    /// no bucket holds more matches than hypothesis words.
    pub fn word_accuracy(
        &self,
        corpus: &CorpusPair,
        labels: WordLabels<'_>,
        case_insensitive: bool,
    ) -> Result<WordAccuracyReport> {
        self.check_word_mode()?;
        let label_mode = self.is_label_mode();
        let reference = corpus.reference();

        if label_mode {
            let reference_labels = labels
                .reference
                .ok_or_else(|| Error::invalid_input("label buckets need reference word labels"))?;
            check_token_alignment("reference labels", reference_labels, reference)?;

            let outputs = labels
                .outputs
                .ok_or_else(|| Error::invalid_input("label buckets need output word labels"))?;
            if outputs.len() != corpus.num_systems() {
                return Err(Error::invalid_input(format!(
                    "output labels given for {} systems, corpus has {}",
                    outputs.len(),
                    corpus.num_systems()
                )));
            }
            for (system, system_labels) in outputs.iter().enumerate() {
                check_token_alignment(
                    &format!("output labels of system {system}"),
                    system_labels,
                    corpus.hypotheses(system)?,
                )?;
            }
        }

        let keys = self.keys()?;
        let mut rows: Vec<WordAccuracyRow> = keys
            .into_iter()
            .map(|key| WordAccuracyRow {
                key,
                per_system: vec![WordAccuracy::default(); corpus.num_systems()],
            })
            .collect();

        for system in 0..corpus.num_systems() {
            let hypotheses = corpus.hypotheses(system)?;
            for (sentence, (hypothesis, reference)) in hypotheses.iter().zip(reference).enumerate() {
                let matches = match_words(hypothesis, reference, case_insensitive);
                let mut reference_matched = vec![false; reference.len()];
                for &position in matches.iter().flatten() {
                    reference_matched[position] = true;
                }

                for (position, token) in reference.iter().enumerate() {
                    let attribute = match labels.reference.filter(|_| label_mode) {
                        Some(reference_labels) => {
                            Attribute::Label(&reference_labels[sentence][position])
                        }
                        None => Attribute::Word(token),
                    };
                    for id in self.assign(&attribute)? {
                        let cell = &mut rows[id].per_system[system];
                        cell.reference_total += 1;
                        if reference_matched[position] {
                            cell.matched += 1;
                        }
                    }
                }

                for (position, token) in hypothesis.iter().enumerate() {
                    let attribute = match (matches[position], labels.reference.filter(|_| label_mode)) {
                        (Some(matched), Some(reference_labels)) => {
                            Attribute::Label(&reference_labels[sentence][matched])
                        }
                        (Some(matched), None) => Attribute::Word(&reference[matched]),
                        (None, _) => match labels.outputs.filter(|_| label_mode) {
                            Some(outputs) => Attribute::Label(&outputs[system][sentence][position]),
                            None => Attribute::Word(token),
                        },
                    };
                    for id in self.assign(&attribute)? {
                        rows[id].per_system[system].hypothesis_total += 1;
                    }
                }
            }
        }

        for cell in rows.iter_mut().flat_map(|row| row.per_system.iter_mut()) {
            cell.finish();
        }

        tracing::debug!(mode = self.mode.name(), "computed word accuracy");

        Ok(WordAccuracyReport {
            mode: self.mode.name().to_string(),
            systems: corpus.system_names(),
            buckets: rows,
        })
    }

    /// Mean per-token score by bucket
    ///
    /// `tokens` are the scored words (typically the reference), `scores` are
    /// `[system][sentence][token]` scalars aligned with them, and `labels`
    /// supplies token labels in label modes.
    pub fn word_scores(
        &self,
        systems: Vec<String>,
        tokens: &[Sentence],
        labels: Option<&[Vec<String>]>,
        scores: &[Vec<Vec<f64>>],
    ) -> Result<BucketReport> {
        self.check_word_mode()?;
        if scores.len() != systems.len() {
            return Err(Error::invalid_input(format!(
                "scores given for {} systems, {} names",
                scores.len(),
                systems.len()
            )));
        }
        for (system, system_scores) in scores.iter().enumerate() {
            check_token_alignment(&format!("word scores of system {system}"), system_scores, tokens)?;
        }
        let labels = if self.is_label_mode() {
            let labels =
                labels.ok_or_else(|| Error::invalid_input("label buckets need word labels"))?;
            check_token_alignment("word labels", labels, tokens)?;
            Some(labels)
        } else {
            None
        };

        let mut attributes = Vec::new();
        for (sentence, words) in tokens.iter().enumerate() {
            for (position, word) in words.iter().enumerate() {
                attributes.push(match labels {
                    Some(labels) => Attribute::Label(labels[sentence][position].as_str()),
                    None => Attribute::Word(word.as_str()),
                });
            }
        }
        let buckets = self.partition(attributes)?;
        let flat: Vec<Vec<f64>> = scores
            .iter()
            .map(|system_scores| system_scores.iter().flatten().copied().collect())
            .collect();

        let rows = buckets
            .into_iter()
            .map(|bucket| {
                let stat_per_system = flat
                    .iter()
                    .map(|system_scores| {
                        if bucket.members.is_empty() {
                            return None;
                        }
                        let sum: f64 = bucket.members.iter().map(|&i| system_scores[i]).sum();
                        Some(sum / bucket.members.len() as f64)
                    })
                    .collect();
                BucketRow {
                    key: bucket.key,
                    counts_per_system: vec![bucket.members.len(); scores.len()],
                    stat_per_system,
                    intervals_per_system: Vec::new(),
                }
            })
            .collect();

        Ok(BucketReport {
            mode: self.mode.name().to_string(),
            aggregation: Aggregation::Micro,
            systems,
            buckets: rows,
        })
    }
}

fn check_token_alignment<T>(what: &str, values: &[Vec<T>], tokens: &[Sentence]) -> Result<()> {
    if values.len() != tokens.len() {
        return Err(Error::invalid_input(format!(
            "{what} cover {} sentences, expected {}",
            values.len(),
            tokens.len()
        )));
    }
    for (sentence, (row, words)) in values.iter().zip(tokens).enumerate() {
        if row.len() != words.len() {
            return Err(Error::invalid_input(format!(
                "{what}: sentence {sentence} has {} entries for {} tokens",
                row.len(),
                words.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{Cutoffs, FrequencyTable, LabelSet, UnknownLabelPolicy};
    use crate::corpus::tokenize;

    #[test]
    fn test_match_words_consumes_reference() {
        let matches = match_words(&tokenize("a a b c"), &tokenize("b a x"), false);
        assert_eq!(matches, vec![Some(1), None, Some(0), None]);
    }

    #[test]
    fn test_match_words_case_folding() {
        let hyp = tokenize("The cat");
        let reference = tokenize("the cat");
        assert_eq!(match_words(&hyp, &reference, false), vec![None, Some(1)]);
        assert_eq!(match_words(&hyp, &reference, true), vec![Some(0), Some(1)]);
    }

    fn frequency_bucketer() -> Bucketer {
        let table = FrequencyTable::from_counts([("the", 500), ("cat", 5)], false);
        Bucketer::new(BucketMode::Frequency {
            table,
            cutoffs: Cutoffs::frequency_default(),
        })
    }

    #[test]
    fn test_frequency_accuracy() {
        let corpus = CorpusPair::builder(vec![tokenize("the cat the")])
            .system("sys", vec![tokenize("the dog")])
            .build()
            .unwrap();
        let report = frequency_bucketer()
            .word_accuracy(&corpus, WordLabels::default(), false)
            .unwrap();

        // bins: <10 holds cat and dog, [100,1000) holds the
        let rare = report.buckets[0].per_system[0];
        assert_eq!((rare.matched, rare.reference_total, rare.hypothesis_total), (0, 1, 1));
        assert_eq!(rare.f_measure, 0.0);

        let common = report.buckets[2].per_system[0];
        assert_eq!((common.matched, common.reference_total, common.hypothesis_total), (1, 2, 1));
        assert_eq!(common.recall, 0.5);
        assert_eq!(common.precision, 1.0);
        assert!((common.f_measure - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_case_folded_match_keyed_by_reference_word() {
        let corpus = CorpusPair::builder(vec![tokenize("the")])
            .system("sys", vec![tokenize("The")])
            .build()
            .unwrap();
        let table = FrequencyTable::from_counts([("the", 500)], false);
        let bucketer = Bucketer::new(BucketMode::Frequency {
            table,
            cutoffs: Cutoffs::frequency_default(),
        });
        let report = bucketer
            .word_accuracy(&corpus, WordLabels::default(), true)
            .unwrap();

        let common = report.buckets[2].per_system[0];
        assert_eq!((common.matched, common.reference_total, common.hypothesis_total), (1, 1, 1));
        assert_eq!(common.precision, 1.0);
        assert_eq!(common.f_measure, 1.0);
        for cell in report.buckets.iter().flat_map(|row| &row.per_system) {
            assert!(cell.matched <= cell.hypothesis_total);
            assert!(cell.recall.is_finite() && cell.precision.is_finite());
            assert!(cell.f_measure.is_finite());
        }
    }

    #[test]
    fn test_rates_over_empty_totals_are_zero() {
        let mut cell = WordAccuracy {
            matched: 0,
            reference_total: 3,
            hypothesis_total: 0,
            ..WordAccuracy::default()
        };
        cell.finish();
        assert_eq!((cell.recall, cell.precision, cell.f_measure), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_label_accuracy_uses_reference_label_for_matches() {
        let corpus = CorpusPair::builder(vec![tokenize("dogs bark")])
            .system("sys", vec![tokenize("dogs barked")])
            .build()
            .unwrap();
        let reference_labels = vec![vec!["N".to_string(), "V".to_string()]];
        // the output tagger mislabels the matched word; the reference label wins
        let output_labels = vec![vec![vec!["V".to_string(), "V".to_string()]]];
        let bucketer = Bucketer::new(BucketMode::Label {
            labels: LabelSet::new(["N", "V"], UnknownLabelPolicy::Reject).unwrap(),
        });
        let report = bucketer
            .word_accuracy(
                &corpus,
                WordLabels {
                    reference: Some(&reference_labels),
                    outputs: Some(&output_labels),
                },
                false,
            )
            .unwrap();

        let noun = report.buckets[0].per_system[0];
        assert_eq!((noun.matched, noun.reference_total, noun.hypothesis_total), (1, 1, 1));
        let verb = report.buckets[1].per_system[0];
        assert_eq!((verb.matched, verb.reference_total, verb.hypothesis_total), (0, 1, 1));
    }

    #[test]
    fn test_label_accuracy_requires_labels() {
        let corpus = CorpusPair::builder(vec![tokenize("a")])
            .system("sys", vec![tokenize("a")])
            .build()
            .unwrap();
        let bucketer = Bucketer::new(BucketMode::Label {
            labels: LabelSet::new(["x"], UnknownLabelPolicy::Reject).unwrap(),
        });
        assert!(bucketer
            .word_accuracy(&corpus, WordLabels::default(), false)
            .is_err());
    }

    #[test]
    fn test_sentence_only_modes_rejected_for_words() {
        let corpus = CorpusPair::builder(vec![tokenize("a")])
            .system("sys", vec![tokenize("a")])
            .build()
            .unwrap();
        let bucketer = Bucketer::new(BucketMode::Length {
            cutoffs: Cutoffs::length_default(),
        });
        assert!(matches!(
            bucketer.word_accuracy(&corpus, WordLabels::default(), false),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_word_scores_mean_per_bucket() {
        let tokens = vec![tokenize("the cat"), tokenize("the")];
        let scores = vec![vec![vec![-1.0, -4.0], vec![-3.0]]];
        let report = frequency_bucketer()
            .word_scores(vec!["sys".to_string()], &tokens, None, &scores)
            .unwrap();
        assert_eq!(report.buckets[0].stat_per_system, vec![Some(-4.0)]);
        assert_eq!(report.buckets[1].stat_per_system, vec![None]);
        assert_eq!(report.buckets[2].stat_per_system, vec![Some(-2.0)]);
        assert_eq!(report.buckets[2].counts_per_system, vec![2]);
    }
}
