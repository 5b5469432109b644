//! CLI command implementations

use crate::config::{BucketKind, SalienceKind};
use crate::output::OutputFormat;
use clap::{Subcommand, ValueEnum};
use sysdiff_core::MetricKind;

pub mod compare;
pub mod count;
pub mod generate_config;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare system outputs against a reference
    Compare(compare::CompareArgs),

    /// Write a word frequency file from one or more corpora
    Count(count::CountArgs),

    /// Print or write a configuration file with default values
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List available metrics
    Metrics,

    /// List available bucket keys
    Buckets,

    /// List available n-gram salience strategies
    Salience,

    /// List available output formats
    Formats,
}

impl ListCommands {
    /// Lines printed for this listing
    pub fn lines(&self) -> Vec<String> {
        match self {
            ListCommands::Metrics => MetricKind::ALL
                .iter()
                .map(|kind| format!("{:<10} {}", kind.as_str(), kind.build().name()))
                .collect(),
            ListCommands::Buckets => value_enum_lines::<BucketKind>(),
            ListCommands::Salience => value_enum_lines::<SalienceKind>(),
            ListCommands::Formats => OutputFormat::ALL
                .iter()
                .map(|format| format!("{:<10} {}", format.to_string(), format.description()))
                .collect(),
        }
    }

    /// Print the listing
    pub fn execute(&self) {
        for line in self.lines() {
            println!("{line}");
        }
    }
}

fn value_enum_lines<T: ValueEnum>() -> Vec<String> {
    T::value_variants()
        .iter()
        .filter_map(ValueEnum::to_possible_value)
        .map(|value| {
            let help = value.get_help().map(ToString::to_string).unwrap_or_default();
            format!("{:<10} {}", value.get_name(), help)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_metrics() {
        let lines = ListCommands::Metrics.lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("bleu"));
        assert!(lines.iter().any(|l| l.starts_with("mean")));
    }

    #[test]
    fn test_list_buckets_uses_cli_names() {
        let lines = ListCommands::Buckets.lines();
        assert!(lines.iter().any(|l| l.starts_with("lengthdiff")));
        assert!(lines.iter().any(|l| l.starts_with("multilabel") && l.contains("multi-label")));
    }

    #[test]
    fn test_list_formats_and_salience() {
        assert_eq!(ListCommands::Formats.lines().len(), 3);
        assert!(ListCommands::Salience.lines()[0].starts_with("recall"));
    }
}
