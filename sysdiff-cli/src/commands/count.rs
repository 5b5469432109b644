//! Count command implementation

use crate::input::{resolve_patterns, FileReader};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use sysdiff_core::bucket::FrequencyTable;
use sysdiff_core::io::write_frequency_table;

/// Arguments for the count command
#[derive(Debug, Args)]
pub struct CountArgs {
    /// Corpus files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Frequency file to write (word<TAB>count per line)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Fold case before counting
    #[arg(long)]
    pub case_insensitive: bool,
}

impl CountArgs {
    /// Execute the count command
    pub fn execute(&self) -> Result<()> {
        let files = resolve_patterns(&self.input)?;

        let mut sentences = Vec::new();
        for path in &files {
            log::info!("Counting words in {}", path.display());
            sentences.extend(FileReader::read_corpus(path)?);
        }

        let table = FrequencyTable::from_corpus(&sentences, self.case_insensitive);
        write_frequency_table(&self.output, &table).with_context(|| {
            format!("Failed to write frequency file: {}", self.output.display())
        })?;

        println!(
            "Counted {} distinct words in {} sentences from {} file(s): {}",
            table.len(),
            sentences.len(),
            files.len(),
            self.output.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use sysdiff_core::io::read_frequency_table;
    use tempfile::TempDir;

    #[test]
    fn test_counts_every_input_file() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.txt");
        fs::write(&first, "the cat\nThe dog\n").unwrap();
        fs::write(&second, "the end\n").unwrap();
        let output = dir.path().join("freq.tsv");

        CountArgs {
            input: vec![dir.path().join("*.txt").to_string_lossy().into_owned()],
            output: output.clone(),
            case_insensitive: true,
        }
        .execute()
        .unwrap();

        let table = read_frequency_table(&output, true).unwrap();
        assert_eq!(table.count("the"), 3);
        assert_eq!(table.count("cat"), 1);
        assert_eq!(fs::read_to_string(&output).unwrap().lines().next(), Some("the\t3"));
    }
}
