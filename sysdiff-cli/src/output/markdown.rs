//! Markdown output formatter

use super::{fmt_interval, fmt_stat, salience_label, system_name, OutputFormatter};
use anyhow::Result;
use std::io::Write;
use sysdiff_core::ngram::RankedNgram;
use sysdiff_core::sentence_examples::SentenceExample;
use sysdiff_core::{
    BootstrapOutcome, BucketReport, NgramDiffReport, SentenceExamplesReport, WordAccuracyReport,
};

/// Markdown formatter - one heading and table per analysis
pub struct MarkdownFormatter<W: Write> {
    writer: W,
    sections: usize,
}

impl<W: Write> MarkdownFormatter<W> {
    /// Create a new markdown formatter
    pub fn new(writer: W) -> Self {
        Self { writer, sections: 0 }
    }

    fn heading(&mut self, title: &str) -> Result<()> {
        if self.sections > 0 {
            writeln!(self.writer)?;
        }
        self.sections += 1;
        writeln!(self.writer, "## {title}")?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn table_header(&mut self, columns: &[&str]) -> Result<()> {
        writeln!(self.writer, "| {} |", columns.join(" | "))?;
        let rule: Vec<&str> = columns.iter().map(|_| "---").collect();
        writeln!(self.writer, "| {} |", rule.join(" | "))?;
        Ok(())
    }

    fn ranked(&mut self, label: &str, entries: &[RankedNgram]) -> Result<()> {
        writeln!(self.writer, "Favors **{label}**:")?;
        writeln!(self.writer)?;
        if entries.is_empty() {
            writeln!(self.writer, "*none*")?;
            writeln!(self.writer)?;
            return Ok(());
        }
        self.table_header(&["n-gram", "salience", "total"])?;
        for entry in entries {
            writeln!(
                self.writer,
                "| `{}` | {:+.4} | {} |",
                entry.ngram, entry.salience, entry.total_count
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn examples(&mut self, label: &str, names: [&str; 2], entries: &[SentenceExample]) -> Result<()> {
        writeln!(self.writer, "**{label}** better:")?;
        writeln!(self.writer)?;
        if entries.is_empty() {
            writeln!(self.writer, "*none*")?;
            writeln!(self.writer)?;
            return Ok(());
        }
        self.table_header(&["sentence", names[0], names[1], "difference", "reference", "outputs"])?;
        for entry in entries {
            writeln!(
                self.writer,
                "| {} | {:.4} | {:.4} | {:+.4} | {} | {}: {}<br>{}: {} |",
                entry.sentence,
                entry.score_a,
                entry.score_b,
                entry.difference,
                escape_cell(&entry.reference),
                names[0],
                escape_cell(&entry.output_a),
                names[1],
                escape_cell(&entry.output_b)
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

/// Escape pipes so sentence text stays inside its table cell
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

impl<W: Write + Send + Sync> OutputFormatter for MarkdownFormatter<W> {
    fn write_significance(&mut self, names: &[String], outcome: &BootstrapOutcome) -> Result<()> {
        self.heading(&format!("Significance ({})", outcome.metric))?;
        writeln!(
            self.writer,
            "{} samples of {} sentences, threshold {}.",
            outcome.samples, outcome.sample_size, outcome.threshold
        )?;
        writeln!(self.writer)?;

        self.table_header(&["system", "score", "mean", "median", "lower", "upper"])?;
        for summary in &outcome.systems {
            writeln!(
                self.writer,
                "| {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} |",
                system_name(names, summary.system),
                summary.score,
                summary.mean,
                summary.median,
                summary.lower,
                summary.upper
            )?;
        }
        writeln!(self.writer)?;

        self.table_header(&["A", "B", "P(A>B)", "P(B>A)", "P(tie)", "A-B interval", "winner"])?;
        for report in &outcome.comparisons {
            let winner = report
                .winner()
                .map_or_else(|| "-".to_string(), |w| format!("**{}**", system_name(names, w)));
            writeln!(
                self.writer,
                "| {} | {} | {:.4} | {:.4} | {:.4} | [{:.4}, {:.4}] | {} |",
                system_name(names, report.system_a),
                system_name(names, report.system_b),
                report.p_a_gt_b,
                report.p_b_gt_a,
                report.p_tie,
                report.ci_low,
                report.ci_high,
                winner
            )?;
        }
        Ok(())
    }

    fn write_buckets(&mut self, report: &BucketReport) -> Result<()> {
        self.heading(&format!("Sentence buckets ({})", report.mode))?;

        let intervals = report.buckets.iter().any(|b| !b.intervals_per_system.is_empty());
        let mut columns = vec!["bucket".to_string()];
        for name in &report.systems {
            columns.push(name.clone());
            columns.push(format!("{name} (n)"));
            if intervals {
                columns.push(format!("{name} interval"));
            }
        }
        let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
        self.table_header(&columns)?;

        for row in &report.buckets {
            let mut cells = vec![format!("`{}`", row.key)];
            for (system, (count, stat)) in row
                .counts_per_system
                .iter()
                .zip(&row.stat_per_system)
                .enumerate()
            {
                cells.push(fmt_stat(*stat));
                cells.push(count.to_string());
                if intervals {
                    let interval = row.intervals_per_system.get(system).and_then(Option::as_ref);
                    cells.push(fmt_interval(interval));
                }
            }
            writeln!(self.writer, "| {} |", cells.join(" | "))?;
        }
        Ok(())
    }

    fn write_word_accuracy(&mut self, report: &WordAccuracyReport) -> Result<()> {
        self.heading(&format!("Word accuracy ({})", report.mode))?;

        let mut columns = vec!["bucket".to_string(), "ref".to_string()];
        for name in &report.systems {
            columns.push(format!("{name} recall"));
            columns.push(format!("{name} precision"));
            columns.push(format!("{name} F"));
        }
        let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
        self.table_header(&columns)?;

        for row in &report.buckets {
            let reference_total = row.per_system.first().map_or(0, |c| c.reference_total);
            let mut cells = vec![format!("`{}`", row.key), reference_total.to_string()];
            for cell in &row.per_system {
                cells.push(format!("{:.4}", cell.recall));
                cells.push(format!("{:.4}", cell.precision));
                cells.push(format!("{:.4}", cell.f_measure));
            }
            writeln!(self.writer, "| {} |", cells.join(" | "))?;
        }
        Ok(())
    }

    fn write_ngrams(&mut self, report: &NgramDiffReport) -> Result<()> {
        self.heading(&format!("N-gram differences ({})", salience_label(&report.salience)))?;

        for order in &report.orders {
            writeln!(self.writer, "### Order {}", order.order)?;
            writeln!(self.writer)?;
            for ranking in &order.rankings {
                let a = system_name(&report.systems, ranking.pair.a);
                let b = system_name(&report.systems, ranking.pair.b);
                writeln!(self.writer, "#### {a} vs {b}")?;
                writeln!(self.writer)?;
                self.ranked(&a, &ranking.favors_a)?;
                self.ranked(&b, &ranking.favors_b)?;
            }
        }
        Ok(())
    }

    fn write_examples(&mut self, report: &SentenceExamplesReport) -> Result<()> {
        self.heading(&format!("Sentence examples ({})", report.metric))?;

        for pair in &report.pairs {
            let a = system_name(&report.systems, pair.system_a);
            let b = system_name(&report.systems, pair.system_b);
            writeln!(self.writer, "### {a} vs {b}")?;
            writeln!(self.writer)?;
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
