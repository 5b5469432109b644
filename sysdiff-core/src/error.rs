//! Error types for analysis and loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the comparison engine and its loaders
#[derive(Debug, Error)]
pub enum Error {
    /// Input data violates an invariant (misaligned corpora, unknown label, ...)
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input
        reason: String,
    },

    /// Invalid configuration parameters
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// What was wrong with the configuration
        reason: String,
    },

    /// A metric evaluation failed
    #[error("metric '{metric}' failed: {reason}")]
    Computation {
        /// Identifier of the failing metric
        metric: String,
        /// Failure description
        reason: String,
    },

    /// Reading or writing a file failed
    #[error("I/O error on {}", path.display())]
    Io {
        /// File involved in the failed operation
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A file was readable but its content is malformed
    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        reason: String,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::Configuration`]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Error::Configuration {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::Computation`]
    pub fn computation(metric: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Computation {
            metric: metric.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;
