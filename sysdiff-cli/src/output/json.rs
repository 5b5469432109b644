//! JSON output formatter

use super::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use sysdiff_core::{
    BootstrapOutcome, BucketReport, NgramDiffReport, SentenceExamplesReport, WordAccuracyReport,
};

/// JSON formatter - buffers every section and writes one object on finish
pub struct JsonFormatter<W: Write> {
    writer: W,
    pretty: bool,
    document: Map<String, Value>,
}

/// Significance section with system names resolved
#[derive(Debug, Serialize)]
pub struct SignificanceSection<'a> {
    /// System names in corpus order
    pub system_names: &'a [String],
    /// The bootstrap outcome
    #[serde(flatten)]
    pub outcome: &'a BootstrapOutcome,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer,
            pretty,
            document: Map::new(),
        }
    }

    fn insert(&mut self, key: &str, section: impl Serialize) -> Result<()> {
        self.document
            .insert(key.to_string(), serde_json::to_value(section)?);
        Ok(())
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn write_significance(&mut self, names: &[String], outcome: &BootstrapOutcome) -> Result<()> {
        self.insert(
            "significance",
            SignificanceSection {
                system_names: names,
                outcome,
            },
        )
    }

    fn write_buckets(&mut self, report: &BucketReport) -> Result<()> {
        self.insert("buckets", report)
    }

    fn write_word_accuracy(&mut self, report: &WordAccuracyReport) -> Result<()> {
        self.insert("word_accuracy", report)
    }

    fn write_ngrams(&mut self, report: &NgramDiffReport) -> Result<()> {
        self.insert("ngrams", report)
    }

    fn write_examples(&mut self, report: &SentenceExamplesReport) -> Result<()> {
        self.insert("examples", report)
    }

    fn finish(&mut self) -> Result<()> {
        let document = Value::Object(std::mem::take(&mut self.document));
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &document)?;
        } else {
            serde_json::to_writer(&mut self.writer, &document)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
