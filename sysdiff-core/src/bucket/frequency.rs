//! Word frequency lookup

use crate::corpus::Sentence;
use std::collections::HashMap;

/// Word counts used by frequency buckets
///
/// A case-insensitive table folds keys on insertion and lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
    case_insensitive: bool,
}

impl FrequencyTable {
    /// Count every token of `sentences`
    pub fn from_corpus(sentences: &[Sentence], case_insensitive: bool) -> Self {
        let mut table = Self {
            counts: HashMap::new(),
            case_insensitive,
        };
        for token in sentences.iter().flatten() {
            table.add(token, 1);
        }
        table
    }

    /// Table from explicit `(word, count)` entries; repeated words add up
    pub fn from_counts<I, S>(entries: I, case_insensitive: bool) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut table = Self {
            counts: HashMap::new(),
            case_insensitive,
        };
        for (word, count) in entries {
            table.add(word.as_ref(), count);
        }
        table
    }

    fn add(&mut self, word: &str, count: u64) {
        let key = if self.case_insensitive {
            word.to_lowercase()
        } else {
            word.to_string()
        };
        *self.counts.entry(key).or_insert(0) += count;
    }

    /// Occurrences of `word`, 0 when unseen
    pub fn count(&self, word: &str) -> u64 {
        if self.case_insensitive {
            self.counts.get(&word.to_lowercase()).copied().unwrap_or(0)
        } else {
            self.counts.get(word).copied().unwrap_or(0)
        }
    }

    /// Whether lookups fold case
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries by descending count, then ascending word
    pub fn sorted_entries(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(word, &count)| (word.as_str(), count))
            .collect();
        entries.sort_by(|x, y| y.1.cmp(&x.1).then_with(|| x.0.cmp(y.0)));
        entries
    }
}
