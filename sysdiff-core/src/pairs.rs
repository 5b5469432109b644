//! System pairs to compare

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An ordered pair of system indices; `a` is the "left" system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SystemPair {
    /// First system
    pub a: usize,
    /// Second system
    pub b: usize,
}

impl SystemPair {
    /// Create a pair
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    /// Every pair `(i, j)` with `i < j`
    pub fn all(systems: usize) -> Vec<SystemPair> {
        (0..systems)
            .flat_map(|a| ((a + 1)..systems).map(move |b| SystemPair { a, b }))
            .collect()
    }

    /// Parse a list of pairs written as `0-1;0-2`
    pub fn parse_list(s: &str) -> Result<Vec<SystemPair>> {
        s.split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Check that both indices exist and differ
    pub fn validate(&self, systems: usize) -> Result<()> {
        if self.a == self.b {
            return Err(Error::invalid_input(format!(
                "cannot compare system {} with itself",
                self.a
            )));
        }
        if self.a >= systems || self.b >= systems {
            return Err(Error::invalid_input(format!(
                "pair {self} names a system outside 0..{systems}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SystemPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

impl FromStr for SystemPair {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::configuration(format!("malformed system pair '{s}', expected e.g. 0-1"));
        let (a, b) = s.split_once('-').ok_or_else(invalid)?;
        let a = a.trim().parse().map_err(|_| invalid())?;
        let b = b.trim().parse().map_err(|_| invalid())?;
        Ok(SystemPair { a, b })
    }
}

/// Explicit pairs validated against the system count, or all pairs
pub fn resolve_pairs(requested: Option<&[SystemPair]>, systems: usize) -> Result<Vec<SystemPair>> {
    match requested {
        Some(pairs) => {
            if pairs.is_empty() {
                return Err(Error::invalid_input("no system pairs to compare"));
            }
            for pair in pairs {
                pair.validate(systems)?;
            }
            Ok(pairs.to_vec())
        }
        None => {
            if systems < 2 {
                return Err(Error::invalid_input(format!(
                    "at least two systems are needed for a comparison, got {systems}"
                )));
            }
            Ok(SystemPair::all(systems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_pairs() {
        assert_eq!(
            SystemPair::all(3),
            vec![
                SystemPair::new(0, 1),
                SystemPair::new(0, 2),
                SystemPair::new(1, 2)
            ]
        );
        assert!(SystemPair::all(1).is_empty());
    }

    #[test]
    fn test_parse_list() {
        let pairs = SystemPair::parse_list("0-1; 2-0").unwrap();
        assert_eq!(pairs, vec![SystemPair::new(0, 1), SystemPair::new(2, 0)]);
        assert!(SystemPair::parse_list("0:1").is_err());
        assert!(SystemPair::parse_list("a-b").is_err());
    }

    #[test]
    fn test_resolve_rejects_bad_pairs() {
        assert!(resolve_pairs(Some(&[SystemPair::new(0, 0)]), 2).is_err());
        assert!(resolve_pairs(Some(&[SystemPair::new(0, 2)]), 2).is_err());
        assert!(resolve_pairs(Some(&[]), 2).is_err());
        assert!(resolve_pairs(None, 1).is_err());
        assert_eq!(resolve_pairs(None, 2).unwrap(), vec![SystemPair::new(0, 1)]);
    }
}
