//! Aligned reference and system output corpora

use crate::error::{Error, Result};

/// A tokenized sentence
pub type Sentence = Vec<String>;

/// Split a line into whitespace-separated tokens
pub fn tokenize(line: &str) -> Sentence {
    line.split_whitespace().map(str::to_string).collect()
}

/// Lowercase every token of a sentence
pub fn lowercase(sentence: &[String]) -> Sentence {
    sentence.iter().map(|token| token.to_lowercase()).collect()
}

/// Hypotheses produced by one system, aligned to the reference
#[derive(Debug, Clone, PartialEq)]
pub struct SystemOutput {
    name: String,
    sentences: Vec<Sentence>,
}

impl SystemOutput {
    /// Create a named system output
    pub fn new(name: impl Into<String>, sentences: Vec<Sentence>) -> Self {
        Self {
            name: name.into(),
            sentences,
        }
    }

    /// Display name of the system
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hypothesis sentences in corpus order
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }
}

/// One reference corpus plus N-aligned outputs of one or more systems
///
/// All sequences share the same length and index `i` denotes the same
/// source sentence everywhere. The pair is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusPair {
    reference: Vec<Sentence>,
    systems: Vec<SystemOutput>,
}

impl CorpusPair {
    /// Build a corpus pair, rejecting misaligned inputs
    pub fn new(reference: Vec<Sentence>, systems: Vec<SystemOutput>) -> Result<Self> {
        if systems.is_empty() {
            return Err(Error::invalid_input("at least one system output is required"));
        }

        for system in &systems {
            if system.sentences.len() != reference.len() {
                return Err(Error::invalid_input(format!(
                    "system '{}' has {} sentences but the reference has {}",
                    system.name,
                    system.sentences.len(),
                    reference.len()
                )));
            }
        }

        tracing::debug!(
            sentences = reference.len(),
            systems = systems.len(),
            "built corpus pair"
        );

        Ok(Self { reference, systems })
    }

    /// Creates a new builder for a reference corpus
    pub fn builder(reference: Vec<Sentence>) -> CorpusPairBuilder {
        CorpusPairBuilder {
            reference,
            systems: Vec::new(),
        }
    }

    /// Number of aligned sentences
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    /// Whether the corpus has no sentences
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    /// Number of systems
    pub fn num_systems(&self) -> usize {
        self.systems.len()
    }

    /// Reference sentences
    pub fn reference(&self) -> &[Sentence] {
        &self.reference
    }

    /// All system outputs
    pub fn systems(&self) -> &[SystemOutput] {
        &self.systems
    }

    /// Output of one system
    pub fn system(&self, index: usize) -> Result<&SystemOutput> {
        self.systems.get(index).ok_or_else(|| {
            Error::invalid_input(format!(
                "system index {index} out of range ({} systems)",
                self.systems.len()
            ))
        })
    }

    /// Hypothesis sentences of one system
    pub fn hypotheses(&self, index: usize) -> Result<&[Sentence]> {
        Ok(self.system(index)?.sentences())
    }

    /// Names of all systems in order
    pub fn system_names(&self) -> Vec<String> {
        self.systems.iter().map(|s| s.name.clone()).collect()
    }

    /// A case-folded copy of the whole corpus
    pub fn lowercased(&self) -> Self {
        Self {
            reference: self.reference.iter().map(|s| lowercase(s)).collect(),
            systems: self
                .systems
                .iter()
                .map(|system| SystemOutput {
                    name: system.name.clone(),
                    sentences: system.sentences.iter().map(|s| lowercase(s)).collect(),
                })
                .collect(),
        }
    }
}

/// Builder for [`CorpusPair`]
#[derive(Debug, Clone)]
pub struct CorpusPairBuilder {
    reference: Vec<Sentence>,
    systems: Vec<SystemOutput>,
}

impl CorpusPairBuilder {
    /// Add a system output
    pub fn system(mut self, name: impl Into<String>, sentences: Vec<Sentence>) -> Self {
        self.systems.push(SystemOutput::new(name, sentences));
        self
    }

    /// Validate and build the corpus pair
    pub fn build(self) -> Result<CorpusPair> {
        CorpusPair::new(self.reference, self.systems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sents(lines: &[&str]) -> Vec<Sentence> {
        lines.iter().map(|l| tokenize(l)).collect()
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  the  cat\tsat "), vec!["the", "cat", "sat"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_builder_accepts_aligned_corpora() {
        let pair = CorpusPair::builder(sents(&["a b", "c"]))
            .system("base", sents(&["a", "c d"]))
            .system("new", sents(&["a b", "c"]))
            .build()
            .unwrap();

        assert_eq!(pair.len(), 2);
        assert_eq!(pair.num_systems(), 2);
        assert_eq!(pair.system_names(), vec!["base", "new"]);
        assert_eq!(pair.hypotheses(1).unwrap()[0], vec!["a", "b"]);
    }

    #[test]
    fn test_misaligned_lengths_rejected() {
        let result = CorpusPair::builder(sents(&["a", "b"]))
            .system("short", sents(&["a"]))
            .build();

        match result {
            Err(Error::InvalidInput { reason }) => assert!(reason.contains("short")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_no_systems_rejected() {
        assert!(matches!(
            CorpusPair::new(sents(&["a"]), vec![]),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_unknown_system_index() {
        let pair = CorpusPair::builder(sents(&["a"]))
            .system("only", sents(&["a"]))
            .build()
            .unwrap();
        assert!(pair.system(0).is_ok());
        assert!(matches!(pair.system(1), Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_lowercased_leaves_original_untouched() {
        let pair = CorpusPair::builder(sents(&["The Cat"]))
            .system("sys", sents(&["THE cat"]))
            .build()
            .unwrap();

        let lower = pair.lowercased();
        assert_eq!(lower.reference()[0], vec!["the", "cat"]);
        assert_eq!(lower.hypotheses(0).unwrap()[0], vec!["the", "cat"]);
        assert_eq!(pair.reference()[0], vec!["The", "Cat"]);
    }
}
