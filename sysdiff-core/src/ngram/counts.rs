//! Sparse n-gram tallies with an associative merge

use super::extract::{ngram_counts, Ngram};
use crate::corpus::Sentence;
use crate::monoid::Monoid;
use std::collections::HashMap;

/// Counts of one n-gram across the reference and every system
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NgramTally {
    /// Occurrences in the reference
    pub reference: u64,
    /// Occurrences in each system's output
    pub hypothesis: Vec<u64>,
    /// Clipped matches against the reference for each system
    pub matched: Vec<u64>,
}

impl NgramTally {
    fn with_systems(systems: usize) -> Self {
        Self {
            reference: 0,
            hypothesis: vec![0; systems],
            matched: vec![0; systems],
        }
    }

    fn merge(&mut self, other: &Self) {
        self.reference += other.reference;
        add_padded(&mut self.hypothesis, &other.hypothesis);
        add_padded(&mut self.matched, &other.matched);
    }

    /// Whether any system produced the n-gram
    pub fn produced(&self) -> bool {
        self.hypothesis.iter().any(|&count| count > 0)
    }
}

fn add_padded(into: &mut Vec<u64>, from: &[u64]) {
    if from.len() > into.len() {
        into.resize(from.len(), 0);
    }
    for (acc, value) in into.iter_mut().zip(from) {
        *acc += value;
    }
}

/// N-gram tallies for a set of sentences
///
/// Reference-only n-grams are kept while counting so reference totals stay
/// exact after merging; reports skip them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NgramCounts {
    systems: usize,
    tallies: HashMap<Ngram, NgramTally>,
}

impl NgramCounts {
    /// Count the n-grams of one aligned sentence
    pub fn from_sentence(
        reference: &[String],
        hypotheses: &[&Sentence],
        min_order: usize,
        max_order: usize,
    ) -> Self {
        let systems = hypotheses.len();
        let mut tallies: HashMap<Ngram, NgramTally> = HashMap::new();

        for order in min_order..=max_order {
            let ref_counts = ngram_counts(reference, order);

            for (&gram, &count) in &ref_counts {
                tallies
                    .entry(Ngram::from(gram))
                    .or_insert_with(|| NgramTally::with_systems(systems))
                    .reference += count;
            }

            for (system, hypothesis) in hypotheses.iter().enumerate() {
                for (gram, count) in ngram_counts(hypothesis, order) {
                    let available = ref_counts.get(gram).copied().unwrap_or(0);
                    let tally = tallies
                        .entry(Ngram::from(gram))
                        .or_insert_with(|| NgramTally::with_systems(systems));
                    tally.hypothesis[system] += count;
                    tally.matched[system] += count.min(available);
                }
            }
        }

        Self { systems, tallies }
    }

    /// Number of systems counted
    pub fn systems(&self) -> usize {
        self.systems
    }

    /// Number of distinct n-grams, reference-only ones included
    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    /// Whether nothing was counted
    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// Tally of one n-gram
    pub fn get(&self, ngram: &Ngram) -> Option<&NgramTally> {
        self.tallies.get(ngram)
    }

    /// All tallies in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&Ngram, &NgramTally)> {
        self.tallies.iter()
    }
}

impl Monoid for NgramCounts {
    fn identity() -> Self {
        Self::default()
    }

    fn combine(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.absorb(other.clone());
        out
    }

    fn absorb(&mut self, other: Self) {
        self.systems = self.systems.max(other.systems);
        for (ngram, tally) in other.tallies {
            match self.tallies.get_mut(&ngram) {
                Some(existing) => existing.merge(&tally),
                None => {
                    self.tallies.insert(ngram, tally);
                }
            }
        }
    }
}
