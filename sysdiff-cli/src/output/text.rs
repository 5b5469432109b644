//! Plain text output formatter

use super::{fmt_interval, fmt_stat, salience_label, system_name, OutputFormatter};
use anyhow::Result;
use std::io::Write;
use sysdiff_core::ngram::RankedNgram;
use sysdiff_core::sentence_examples::SentenceExample;
use sysdiff_core::{
    Aggregation, BootstrapOutcome, BucketReport, NgramDiffReport, SentenceExamplesReport,
    WordAccuracyReport,
};

/// Plain text formatter - aligned tables, one section per analysis
pub struct TextFormatter<W: Write> {
    writer: W,
    sections: usize,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer, sections: 0 }
    }

    fn header(&mut self, title: &str) -> Result<()> {
        if self.sections > 0 {
            writeln!(self.writer)?;
        }
        self.sections += 1;
        writeln!(self.writer, "== {title} ==")?;
        Ok(())
    }

    fn ranked(&mut self, label: &str, entries: &[RankedNgram]) -> Result<()> {
        writeln!(self.writer, "  favors {label}:")?;
        if entries.is_empty() {
            writeln!(self.writer, "    (none)")?;
        }
        let width = entries
            .iter()
            .map(|e| e.ngram.to_string().chars().count())
            .max()
            .unwrap_or(0);
        for entry in entries {
            writeln!(
                self.writer,
                "    {:<width$}  {:+.4}  (total {})",
                entry.ngram.to_string(),
                entry.salience,
                entry.total_count
            )?;
        }
        Ok(())
    }

    fn examples(&mut self, label: &str, names: [&str; 2], entries: &[SentenceExample]) -> Result<()> {
        writeln!(self.writer, "  {label} better:")?;
        if entries.is_empty() {
            writeln!(self.writer, "    (none)")?;
        }
        let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0).max("ref".len());
        for entry in entries {
            writeln!(
                self.writer,
                "    #{}  {:.4} vs {:.4}  ({:+.4})",
                entry.sentence, entry.score_a, entry.score_b, entry.difference
            )?;
            writeln!(self.writer, "      {:<width$}  {}", "ref", entry.reference)?;
            writeln!(self.writer, "      {:<width$}  {}", names[0], entry.output_a)?;
            writeln!(self.writer, "      {:<width$}  {}", names[1], entry.output_b)?;
        }
        Ok(())
    }
}

fn key_width<'a>(keys: impl Iterator<Item = &'a str>) -> usize {
    keys.map(|k| k.chars().count()).max().unwrap_or(0).max("bucket".len())
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn write_significance(&mut self, names: &[String], outcome: &BootstrapOutcome) -> Result<()> {
        self.header(&format!(
            "Significance: {} ({} samples of {} sentences, p = {})",
            outcome.metric, outcome.samples, outcome.sample_size, outcome.threshold
        ))?;

        let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0).max("system".len());
        let coverage = (1.0 - outcome.threshold) * 100.0;
        writeln!(
            self.writer,
            "{:<width$}  {:>8}  {:>8}  {:>8}  {coverage:.0}% interval",
            "system", "score", "mean", "median"
        )?;
        for summary in &outcome.systems {
            writeln!(
                self.writer,
                "{:<width$}  {:>8.4}  {:>8.4}  {:>8.4}  [{:.4}, {:.4}]",
                system_name(names, summary.system),
                summary.score,
                summary.mean,
                summary.median,
                summary.lower,
                summary.upper
            )?;
        }

        for report in &outcome.comparisons {
            let a = system_name(names, report.system_a);
            let b = system_name(names, report.system_b);
            let verdict = match report.winner() {
                Some(winner) => format!("{} is significantly better", system_name(names, winner)),
                None => "no significant difference".to_string(),
            };
            writeln!(self.writer)?;
            writeln!(self.writer, "{a} vs {b}: {verdict}")?;
            writeln!(
                self.writer,
                "  P({a} > {b}) = {:.4}  P({b} > {a}) = {:.4}  P(tie) = {:.4}",
                report.p_a_gt_b, report.p_b_gt_a, report.p_tie
            )?;
            writeln!(
                self.writer,
                "  {a} - {b}: [{:.4}, {:.4}]",
                report.ci_low, report.ci_high
            )?;
        }
        Ok(())
    }

    fn write_buckets(&mut self, report: &BucketReport) -> Result<()> {
        self.header(&format!(
            "Sentence buckets: {} ({})",
            report.mode,
            match report.aggregation {
                Aggregation::Micro => "micro",
                Aggregation::Macro => "macro",
            }
        ))?;

        let rows: Vec<Vec<String>> = report
            .buckets
            .iter()
            .map(|row| {
                row.counts_per_system
                    .iter()
                    .zip(&row.stat_per_system)
                    .enumerate()
                    .map(|(system, (count, stat))| {
                        let cell = format!("{} ({count})", fmt_stat(*stat));
                        match row.intervals_per_system.get(system) {
                            Some(interval) => format!("{cell} {}", fmt_interval(interval.as_ref())),
                            None => cell,
                        }
                    })
                    .collect()
            })
            .collect();
        let cell_width = rows
            .iter()
            .flatten()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0)
            .max(16);

        let width = key_width(report.buckets.iter().map(|b| b.key.as_str()));
        write!(self.writer, "{:<width$}", "bucket")?;
        for name in &report.systems {
            write!(self.writer, "  {name:>cell_width$}")?;
        }
        writeln!(self.writer)?;

        for (row, cells) in report.buckets.iter().zip(&rows) {
            write!(self.writer, "{:<width$}", row.key)?;
            for cell in cells {
                write!(self.writer, "  {cell:>cell_width$}")?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn write_word_accuracy(&mut self, report: &WordAccuracyReport) -> Result<()> {
        self.header(&format!("Word accuracy: {}", report.mode))?;

        let width = key_width(report.buckets.iter().map(|b| b.key.as_str()));
        for (system, name) in report.systems.iter().enumerate() {
            writeln!(self.writer, "-- {name} --")?;
            writeln!(
                self.writer,
                "{:<width$}  {:>6}  {:>6}  {:>6}  {:>8}  {:>8}  {:>8}",
                "bucket", "ref", "hyp", "match", "recall", "prec", "f-meas"
            )?;
            for row in &report.buckets {
                let cell = &row.per_system[system];
                writeln!(
                    self.writer,
                    "{:<width$}  {:>6}  {:>6}  {:>6}  {:>8.4}  {:>8.4}  {:>8.4}",
                    row.key,
                    cell.reference_total,
                    cell.hypothesis_total,
                    cell.matched,
                    cell.recall,
                    cell.precision,
                    cell.f_measure
                )?;
            }
        }
        Ok(())
    }

    fn write_ngrams(&mut self, report: &NgramDiffReport) -> Result<()> {
        self.header(&format!(
            "N-gram differences: {}",
            salience_label(&report.salience)
        ))?;

        for order in &report.orders {
            writeln!(self.writer, "-- order {} ({} n-grams) --", order.order, order.records.len())?;
            for ranking in &order.rankings {
                let a = system_name(&report.systems, ranking.pair.a);
                let b = system_name(&report.systems, ranking.pair.b);
                writeln!(self.writer, "{a} vs {b}")?;
                self.ranked(&a, &ranking.favors_a)?;
                self.ranked(&b, &ranking.favors_b)?;
            }
        }
        Ok(())
    }

    fn write_examples(&mut self, report: &SentenceExamplesReport) -> Result<()> {
        self.header(&format!("Sentence examples: {}", report.metric))?;

        for pair in &report.pairs {
            let a = system_name(&report.systems, pair.system_a);
            let b = system_name(&report.systems, pair.system_b);
            writeln!(self.writer, "-- {a} vs {b} --")?;
            self.examples(&a, [a.as_str(), b.as_str()], &pair.a_better)?;
            self.examples(&b, [a.as_str(), b.as_str()], &pair.b_better)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
