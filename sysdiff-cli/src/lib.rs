//! sysdiff CLI library
//!
//! This library provides the command-line interface for comparing the
//! outputs of several systems against a shared reference.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
