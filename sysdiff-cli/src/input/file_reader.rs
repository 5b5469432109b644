//! File reading utilities
//!
//! Thin wrappers over the core loaders that attach command-line context to
//! every failure.

use anyhow::{Context, Result};
use std::path::Path;
use sysdiff_core::corpus::Sentence;
use sysdiff_core::io;

/// Reader for the line-aligned input streams
pub struct FileReader;

impl FileReader {
    /// Read a whitespace-tokenized corpus
    pub fn read_corpus(path: &Path) -> Result<Vec<Sentence>> {
        io::read_corpus(path).with_context(|| format!("Failed to read corpus: {}", path.display()))
    }

    /// Read one label per line
    pub fn read_labels(path: &Path) -> Result<Vec<String>> {
        io::read_labels(path).with_context(|| format!("Failed to read labels: {}", path.display()))
    }

    /// Read one number per line
    pub fn read_numbers(path: &Path) -> Result<Vec<f64>> {
        io::read_numbers(path)
            .with_context(|| format!("Failed to read numbers: {}", path.display()))
    }

    /// Read one label per token, whitespace separated, one sentence per line
    pub fn read_token_labels(path: &Path) -> Result<Vec<Vec<String>>> {
        io::read_corpus(path)
            .with_context(|| format!("Failed to read word labels: {}", path.display()))
    }

    /// Read one score per token, whitespace separated, one sentence per line
    pub fn read_token_scores(path: &Path) -> Result<Vec<Vec<f64>>> {
        io::read_token_numbers(path)
            .with_context(|| format!("Failed to read word scores: {}", path.display()))
    }

    /// Display name of a system file: its stem, or the full path without one
    pub fn system_name(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_corpus_success() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("ref.txt");
        fs::write(&file_path, "the cat sat\n\na  dog\n").unwrap();

        let corpus = FileReader::read_corpus(&file_path).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus[0], vec!["the", "cat", "sat"]);
        assert!(corpus[1].is_empty());
        assert_eq!(corpus[2], vec!["a", "dog"]);
    }

    #[test]
    fn test_read_nonexistent_file() {
        let path = Path::new("/nonexistent/ref.txt");
        let err = FileReader::read_corpus(path).unwrap_err();
        assert!(err.to_string().contains("Failed to read corpus"));
    }

    #[test]
    fn test_bad_number_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("scores.txt");
        fs::write(&file_path, "0.5\nhigh\n").unwrap();

        let err = FileReader::read_numbers(&file_path).unwrap_err();
        assert!(err.to_string().contains("scores.txt"));
        assert!(format!("{err:#}").contains("scores.txt:2:"));
    }

    #[test]
    fn test_system_name_uses_stem() {
        assert_eq!(FileReader::system_name(Path::new("out/sys1.txt")), "sys1");
        assert_eq!(FileReader::system_name(Path::new("baseline")), "baseline");
    }
}
