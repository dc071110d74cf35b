//! Console output formatter for batch results

use colored::Colorize;
use filing_application::{BatchOutput, BatchSummary};
use filing_domain::{ConceptFigure, DocumentReport};

/// Formats batch results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Enable or disable colored output for the whole process
    pub fn set_color(enabled: bool) {
        if !enabled {
            colored::control::set_override(false);
        }
    }

    /// Format every document followed by the batch totals
    pub fn format(output: &BatchOutput) -> String {
        let mut text = String::new();

        text.push_str(&Self::header("Balance Sheet Extraction"));
        text.push('\n');

        for report in &output.reports {
            text.push_str(&Self::format_report(report));
        }

        text.push_str(&Self::section_header("Batch"));
        text.push_str(&Self::format_summary(&output.summary));
        text.push_str(&Self::footer());

        text
    }

    /// Format as JSON
    pub fn format_json(output: &BatchOutput) -> String {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    }

    /// One document: located table, figures, flags and problems
    pub fn format_report(report: &DocumentReport) -> String {
        let flags = report.human_flags();
        let status = if report.is_clean() {
            "clean".green().to_string()
        } else if flags.is_empty() {
            "degraded".yellow().to_string()
        } else {
            format!("{} flagged", flags.len()).red().to_string()
        };

        let mut text = format!(
            "\n{} {}\n",
            format!("── {} ──", report.document_id).yellow().bold(),
            status
        );

        if let Some(block) = report.table_block {
            text.push_str(&format!("  {} {}\n", "Table block:".cyan(), block));
        }
        if let Some(units) = report.sum_units {
            text.push_str(&format!("  {} {}\n", "Units:".cyan(), units));
        }
        if let Some(column) = report.value_column {
            let date = report
                .column_dates
                .get(column)
                .map(String::as_str)
                .unwrap_or("undated");
            text.push_str(&format!("  {} {} ({})\n", "Value column:".cyan(), column, date));
        }

        for figure in &report.figures {
            text.push_str(&Self::format_figure(figure, report.sum_divider));
        }

        for (kind, concept, reason) in &flags {
            let subject = match concept {
                Some(concept) => format!("{} [{}]", kind, concept),
                None => kind.to_string(),
            };
            text.push_str(&format!("  {} {}: {}\n", "!".red().bold(), subject, reason));
        }
        for problem in &report.problems {
            text.push_str(&format!("  {} {}\n", "-".dimmed(), problem.dimmed()));
        }

        text
    }

    fn format_figure(figure: &ConceptFigure, divider: Option<f64>) -> String {
        let mut text = format!(
            "  {} {} ({} lines)",
            format!("{}:", figure.concept).cyan().bold(),
            figure.total,
            figure.lines.len()
        );
        if let Some(divider) = divider {
            text.push_str(&format!(" = {:.1}M", figure.total as f64 / divider));
        }
        if !figure.missing.is_empty() {
            text.push_str(&format!(" {}", format!("missing {:?}", figure.missing).yellow()));
        }
        text.push('\n');
        for line in &figure.lines {
            let value = line
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "n/a".to_string());
            text.push_str(&format!("      {:>3}: {} = {}\n", line.index, line.path.join(" > "), value));
        }
        text
    }

    /// Batch counters and oracle usage
    pub fn format_summary(summary: &BatchSummary) -> String {
        let mut text = format!(
            "  {} {}/{} completed, {} clean, {} flagged decisions\n",
            "Documents:".cyan(),
            summary.completed,
            summary.documents,
            summary.clean,
            summary.human_flags
        );
        text.push_str(&format!(
            "  {} {} votes; {} fast, {} strong, {} failed calls\n",
            "Oracle:".cyan(),
            summary.votes_used,
            summary.usage.fast_calls,
            summary.usage.strong_calls,
            summary.usage.failed_calls
        ));
        if summary.cancelled {
            text.push_str(&format!(
                "  {}\n",
                "Cancelled: unfinished documents were not recorded".red().bold()
            ));
        }
        text
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
