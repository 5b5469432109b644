//! N-gram enumeration and clipped matching

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// An ordered tuple of tokens
///
/// Ordering is lexicographic by token, which is the final tie-breaker when
/// ranking n-grams.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ngram(Vec<String>);

impl Ngram {
    /// Create an n-gram from tokens
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    /// Tokens of the n-gram
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Order (number of tokens)
    pub fn order(&self) -> usize {
        self.0.len()
    }
}

impl From<&[String]> for Ngram {
    fn from(tokens: &[String]) -> Self {
        Self(tokens.to_vec())
    }
}

impl fmt::Display for Ngram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Contiguous n-grams of one order, in sentence order
pub fn ngrams(tokens: &[String], order: usize) -> impl Iterator<Item = &[String]> {
    // `windows(0)` panics, an order of zero simply yields nothing
    let size = order.max(1);
    let enabled = order > 0;
    tokens.windows(size).filter(move |_| enabled)
}

/// Occurrence count of every n-gram of one order
pub fn ngram_counts(tokens: &[String], order: usize) -> HashMap<&[String], u64> {
    let mut counts = HashMap::new();
    for gram in ngrams(tokens, order) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// Matched and total hypothesis n-grams of one order
///
/// Each reference occurrence satisfies at most one hypothesis occurrence,
/// so the matched count of an n-gram is `min(hyp count, ref count)`.
pub fn clipped_matches(hypothesis: &[String], reference: &[String], order: usize) -> (u64, u64) {
    let hyp_counts = ngram_counts(hypothesis, order);
    let ref_counts = ngram_counts(reference, order);

    let mut matched = 0;
    let mut total = 0;
    for (gram, count) in hyp_counts {
        total += count;
        matched += count.min(ref_counts.get(gram).copied().unwrap_or(0));
    }
    (matched, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::tokenize;

    #[test]
    fn test_ngrams_of_each_order() {
        let s = tokenize("a b c");
        assert_eq!(ngrams(&s, 1).count(), 3);
        assert_eq!(ngrams(&s, 2).count(), 2);
        assert_eq!(ngrams(&s, 3).count(), 1);
        assert_eq!(ngrams(&s, 4).count(), 0);
        assert_eq!(ngrams(&s, 0).count(), 0);
    }

    #[test]
    fn test_clipped_matches_never_exceed_reference() {
        let hyp = tokenize("the the the the");
        let reference = tokenize("the cat the");
        assert_eq!(clipped_matches(&hyp, &reference, 1), (2, 4));
    }

    #[test]
    fn test_ngram_display_and_order() {
        let gram = Ngram::new(["new", "york"]);
        assert_eq!(gram.to_string(), "new york");
        assert_eq!(gram.order(), 2);
        assert!(Ngram::new(["a", "z"]) < Ngram::new(["b", "a"]));
    }
}
