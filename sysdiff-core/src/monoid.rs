//! Associative merge for partial results
//!
//! Statistics that are computed per sentence and then combined (metric
//! sufficient statistics, n-gram counts) implement [`Monoid`]. Because the
//! merge is associative with an identity, per-sentence work can be split
//! across threads and recombined without changing integer results.

/// A type with an associative merge and an identity element
///
/// - Associativity: `a.combine(&b).combine(&c) == a.combine(&b.combine(&c))`
/// - Identity: `a.combine(&Self::identity()) == a`
pub trait Monoid: Clone + Send + Sync {
    /// Returns the identity element
    fn identity() -> Self;

    /// Combines two elements into a new one
    fn combine(&self, other: &Self) -> Self;

    /// Merges `other` into `self` in place
    ///
    /// Override when an in-place merge avoids reallocating.
    fn absorb(&mut self, other: Self) {
        *self = self.combine(&other);
    }

    /// Folds a sequence left to right, starting from the identity
    ///
    /// The reduction order is the iteration order, so floating-point
    /// monoids give reproducible results for a fixed input order.
    fn concat<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        iter.into_iter().fold(Self::identity(), |mut acc, item| {
            acc.absorb(item);
            acc
        })
    }
}
