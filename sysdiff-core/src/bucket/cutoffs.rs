//! Ordered numeric bin boundaries and the ways to obtain them

use crate::error::{Error, Result};
use serde::Serialize;
use std::str::FromStr;

/// Strictly ascending, finite bin boundaries
///
/// `k` cutoffs define `k + 1` bins. A value falls in the first bin whose
/// cutoff it is below, or in the last bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cutoffs(Vec<f64>);

impl Cutoffs {
    /// Validate and wrap boundaries
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::configuration("at least one bucket cutoff is required"));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(Error::configuration(format!("bucket cutoff {bad} is not finite")));
        }
        if let Some(pair) = values.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::configuration(format!(
                "bucket cutoffs must be strictly ascending, found {} before {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self(values))
    }

    /// Log-scale word frequency bins
    pub fn frequency_default() -> Self {
        Self(vec![10.0, 100.0, 1000.0])
    }

    /// Bins for numeric labels in `[0, 1]`
    pub fn numlabel_default() -> Self {
        Self(vec![0.25, 0.5, 0.75])
    }

    /// Tenths of a metric's scale
    pub fn score_default(scale: f64) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::configuration(format!("metric scale {scale} must be positive")));
        }
        Self::new((1..10).map(|k| scale * k as f64 / 10.0).collect())
    }

    /// Hypothesis length bins
    pub fn length_default() -> Self {
        Self(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0])
    }

    /// Hypothesis minus reference length bins
    pub fn length_diff_default() -> Self {
        Self(vec![
            -20.0, -10.0, -5.0, -4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 11.0,
            21.0,
        ])
    }

    /// Boundaries
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of bins
    pub fn num_bins(&self) -> usize {
        self.0.len() + 1
    }

    /// Bin index of `value`
    pub fn bin(&self, value: f64) -> usize {
        self.0
            .iter()
            .position(|&cutoff| value < cutoff)
            .unwrap_or(self.0.len())
    }

    /// Display names of every bin, in bin order
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.num_bins());
        names.push(format!("<{}", format_bound(self.0[0])));
        for w in self.0.windows(2) {
            let (low, high) = (w[0], w[1]);
            if low.fract() == 0.0 && high.fract() == 0.0 && high - low == 1.0 {
                names.push(format_bound(low));
            } else {
                names.push(format!("[{},{})", format_bound(low), format_bound(high)));
            }
        }
        if let Some(&last) = self.0.last() {
            names.push(format!(">={}", format_bound(last)));
        }
        names
    }
}

impl FromStr for Cutoffs {
    type Err = Error;

    /// Parse colon-separated boundaries such as `1:2:5`
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(':')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|_| {
                    Error::configuration(format!("malformed bucket cutoff '{part}' in '{s}'"))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        Self::new(values)
    }
}

/// Where the boundaries of a numeric bucket mode come from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ranges {
    /// Boundaries given up front
    Explicit {
        /// Boundaries
        cutoffs: Cutoffs,
    },
    /// `bins` equal-width bins whose first bin ends at `start + width`
    FixedWidth {
        /// Lower edge of the first bin
        start: f64,
        /// Bin width
        width: f64,
        /// Number of bins
        bins: usize,
    },
    /// `bins` bins holding roughly equal numbers of the bucketed values
    FixedCount {
        /// Number of bins
        bins: usize,
    },
}

impl From<Cutoffs> for Ranges {
    fn from(cutoffs: Cutoffs) -> Self {
        Ranges::Explicit { cutoffs }
    }
}

impl Ranges {
    /// Whether boundaries are known without looking at the data
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Ranges::FixedCount { .. })
    }

    /// Boundaries that do not depend on the bucketed values
    pub fn cutoffs(&self) -> Result<Cutoffs> {
        match self {
            Ranges::Explicit { cutoffs } => Ok(cutoffs.clone()),
            Ranges::FixedWidth { start, width, bins } => {
                if *bins < 2 {
                    return Err(Error::configuration("fixed-width ranges need at least two bins"));
                }
                if !(width.is_finite() && *width > 0.0) {
                    return Err(Error::configuration(format!(
                        "bin width must be positive, got {width}"
                    )));
                }
                Cutoffs::new((1..*bins).map(|k| start + width * k as f64).collect())
            }
            Ranges::FixedCount { .. } => Err(Error::configuration(
                "fixed-count ranges are derived from the bucketed values",
            )),
        }
    }

    /// Boundaries for a concrete set of values
    ///
    /// Fixed-count boundaries are the values at ranks `k * n / bins` of the
    /// sorted input, `k = 1..bins`. Repeated values never straddle a
    /// boundary, so heavily tied data yields fewer bins.
    pub fn resolve(&self, values: &[f64]) -> Result<Cutoffs> {
        let bins = match self {
            Ranges::FixedCount { bins } => *bins,
            _ => return self.cutoffs(),
        };
        if bins < 2 {
            return Err(Error::configuration("fixed-count ranges need at least two bins"));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(Error::invalid_input(format!("cannot rank the value {bad}")));
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let Some(&lowest) = sorted.first() else {
            return Err(Error::invalid_input("fixed-count ranges need at least one value"));
        };

        let mut boundaries: Vec<f64> = Vec::with_capacity(bins - 1);
        for k in 1..bins {
            let candidate = sorted[(k * sorted.len() / bins).min(sorted.len() - 1)];
            let above_last = boundaries.last().map_or(true, |&last| candidate > last);
            if candidate > lowest && above_last {
                boundaries.push(candidate);
            }
        }
        if boundaries.is_empty() {
            // every value is equal
            boundaries.push(lowest);
        }
        Cutoffs::new(boundaries)
    }
}

impl FromStr for Ranges {
    type Err = Error;

    /// Parse `count:N`, `width:START:WIDTH:N` or explicit boundaries
    fn from_str(s: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::configuration(format!("malformed ranges '{s}': {reason}"));
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        match parts.as_slice() {
            ["count", bins] => {
                let bins: usize = bins.parse().map_err(|_| malformed("bin count must be an integer"))?;
                if bins < 2 {
                    return Err(malformed("at least two bins are required"));
                }
                Ok(Ranges::FixedCount { bins })
            }
            ["width", start, width, bins] => {
                let ranges = Ranges::FixedWidth {
                    start: start.parse().map_err(|_| malformed("start must be a number"))?,
                    width: width.parse().map_err(|_| malformed("width must be a number"))?,
                    bins: bins.parse().map_err(|_| malformed("bin count must be an integer"))?,
                };
                ranges.cutoffs()?;
                Ok(ranges)
            }
            ["count", ..] | ["width", ..] => Err(malformed(
                "expected count:BINS or width:START:WIDTH:BINS",
            )),
            _ => Ok(Ranges::Explicit { cutoffs: s.parse()? }),
        }
    }
}

fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_boundaries() {
        let cutoffs = Cutoffs::frequency_default();
        assert_eq!(cutoffs.bin(1.0), 0);
        assert_eq!(cutoffs.bin(10.0), 1);
        assert_eq!(cutoffs.bin(999.0), 2);
        assert_eq!(cutoffs.bin(1000.0), 3);
        assert_eq!(cutoffs.num_bins(), 4);
    }

    #[test]
    fn test_names() {
        assert_eq!(
            Cutoffs::frequency_default().names(),
            vec!["<10", "[10,100)", "[100,1000)", ">=1000"]
        );
        assert_eq!(
            Cutoffs::numlabel_default().names(),
            vec!["<0.25", "[0.25,0.5)", "[0.5,0.75)", ">=0.75"]
        );
    }

    #[test]
    fn test_unit_integer_bins_collapse() {
        let names = "3:4:6".parse::<Cutoffs>().unwrap().names();
        assert_eq!(names, vec!["<3", "3", "[4,6)", ">=6"]);

        let diff = Cutoffs::length_diff_default().names();
        assert_eq!(diff.len(), 17);
        assert_eq!(diff[0], "<-20");
        assert_eq!(diff[3], "-5");
        assert_eq!(diff[8], "0");
        assert_eq!(diff[14], "[6,11)");
        assert_eq!(diff[16], ">=21");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("".parse::<Cutoffs>().is_err());
        assert!("1:x".parse::<Cutoffs>().is_err());
        assert!("2:1".parse::<Cutoffs>().is_err());
        assert!("1:1".parse::<Cutoffs>().is_err());
        assert!("1:inf".parse::<Cutoffs>().is_err());
        assert_eq!("1:2:5".parse::<Cutoffs>().unwrap().values(), &[1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_fixed_width_ranges() {
        let ranges: Ranges = "width:0:0.5:4".parse().unwrap();
        assert_eq!(ranges.cutoffs().unwrap().values(), &[0.5, 1.0, 1.5]);
        assert!("width:0:0:4".parse::<Ranges>().is_err());
        assert!("width:0:1:1".parse::<Ranges>().is_err());
        assert!("width:0:1".parse::<Ranges>().is_err());
    }

    #[test]
    fn test_fixed_count_equal_bins() {
        let ranges: Ranges = "count:4".parse().unwrap();
        assert!(!ranges.is_resolved());
        assert!(ranges.cutoffs().is_err());

        let values: Vec<f64> = (1..=12).rev().map(f64::from).collect();
        let cutoffs = ranges.resolve(&values).unwrap();
        assert_eq!(cutoffs.values(), &[4.0, 7.0, 10.0]);

        let mut sizes = vec![0; cutoffs.num_bins()];
        for &value in &values {
            sizes[cutoffs.bin(value)] += 1;
        }
        assert_eq!(sizes, vec![3, 3, 3, 3]);
    }

    #[test]
    fn test_fixed_count_with_ties() {
        let ranges = Ranges::FixedCount { bins: 3 };
        let cutoffs = ranges.resolve(&[1.0, 1.0, 1.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(cutoffs.values(), &[2.0]);

        let constant = ranges.resolve(&[5.0; 4]).unwrap();
        assert_eq!(constant.values(), &[5.0]);
        assert_eq!(constant.bin(5.0), 1);

        assert!(ranges.resolve(&[]).is_err());
        assert!(Ranges::FixedCount { bins: 1 }.resolve(&[1.0]).is_err());
        assert!("count:1".parse::<Ranges>().is_err());
        assert!("count:x".parse::<Ranges>().is_err());
    }

    #[test]
    fn test_explicit_ranges_ignore_values() {
        let ranges: Ranges = "1:2".parse().unwrap();
        assert_eq!(ranges, Ranges::from("1:2".parse::<Cutoffs>().unwrap()));
        assert_eq!(ranges.resolve(&[]).unwrap().values(), &[1.0, 2.0]);
    }

    #[test]
    fn test_score_default() {
        let cutoffs = Cutoffs::score_default(1.0).unwrap();
        assert_eq!(cutoffs.num_bins(), 10);
        assert_eq!(cutoffs.bin(0.05), 0);
        assert_eq!(cutoffs.bin(0.95), 9);
        assert!(Cutoffs::score_default(0.0).is_err());
    }
}
