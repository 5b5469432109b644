//! Loaders and writers for corpora, label streams and count files
//!
//! All files are UTF-8 text with one record per line. Every parse failure
//! names the file and the 1-based line number.

use crate::bucket::FrequencyTable;
use crate::corpus::{tokenize, Sentence};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn read_all_lines(path: &Path) -> Result<Vec<String>> {
    open(path)?
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_error(path: &Path, line: usize, reason: impl Into<String>) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

/// One whitespace-tokenized sentence per line
pub fn read_corpus(path: impl AsRef<Path>) -> Result<Vec<Sentence>> {
    let path = path.as_ref();
    let sentences: Vec<Sentence> = read_all_lines(path)?
        .iter()
        .map(|line| tokenize(line))
        .collect();
    tracing::debug!(path = %path.display(), sentences = sentences.len(), "read corpus");
    Ok(sentences)
}

/// One label value per line, surrounding whitespace trimmed
pub fn read_labels(path: impl AsRef<Path>) -> Result<Vec<String>> {
    Ok(read_all_lines(path.as_ref())?
        .into_iter()
        .map(|line| line.trim().to_string())
        .collect())
}

/// One finite number per line
pub fn read_numbers(path: impl AsRef<Path>) -> Result<Vec<f64>> {
    let path = path.as_ref();
    read_all_lines(path)?
        .iter()
        .enumerate()
        .map(|(index, line)| parse_number(path, index + 1, line.trim()))
        .collect()
}

/// Whitespace-separated finite numbers per line, one per token
pub fn read_token_numbers(path: impl AsRef<Path>) -> Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    read_all_lines(path)?
        .iter()
        .enumerate()
        .map(|(index, line)| {
            line.split_whitespace()
                .map(|field| parse_number(path, index + 1, field))
                .collect()
        })
        .collect()
}

fn parse_number(path: &Path, line: usize, field: &str) -> Result<f64> {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(value) => Err(parse_error(path, line, format!("{value} is not finite"))),
        Err(_) => Err(parse_error(path, line, format!("'{field}' is not a number"))),
    }
}

/// A `word<TAB>count` file
pub fn read_frequency_table(path: impl AsRef<Path>, case_insensitive: bool) -> Result<FrequencyTable> {
    let path = path.as_ref();
    let mut entries = Vec::new();
    for (index, line) in read_all_lines(path)?.into_iter().enumerate() {
        let (word, count) = line
            .split_once('\t')
            .ok_or_else(|| parse_error(path, index + 1, "expected word<TAB>count"))?;
        if word.is_empty() {
            return Err(parse_error(path, index + 1, "empty word"));
        }
        let count: u64 = count
            .trim()
            .parse()
            .map_err(|_| parse_error(path, index + 1, format!("'{count}' is not a count")))?;
        entries.push((word.to_string(), count));
    }
    tracing::debug!(path = %path.display(), words = entries.len(), "read frequency table");
    Ok(FrequencyTable::from_counts(entries, case_insensitive))
}

/// Write a frequency table by descending count, then ascending word
pub fn write_frequency_table(path: impl AsRef<Path>, table: &FrequencyTable) -> Result<()> {
    let path = path.as_ref();
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    for (word, count) in table.sorted_entries() {
        writeln!(writer, "{word}\t{count}").map_err(io_error)?;
    }
    writer.flush().map_err(io_error)
}
