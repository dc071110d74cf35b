//! Progress reporting for batch execution

use colored::Colorize;
use filing_application::PipelineProgress;
use filing_domain::{Concept, DecisionOutcome, DocumentReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports batch progress with a progress bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn batch_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineProgress for ProgressReporter {
    fn on_batch_start(&self, total_documents: usize) {
        let bar = ProgressBar::new(total_documents as u64);
        bar.set_style(Self::batch_style());
        bar.set_prefix("Documents");
        bar.set_message("Starting...");
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_document_start(&self, document_id: &str) {
        self.with_bar(|bar| bar.set_message(document_id.to_string()));
    }

    fn on_decision(&self, document_id: &str, concept: Option<Concept>, outcome: &DecisionOutcome) {
        if let Some(reason) = outcome.flag {
            let subject = concept.map(|c| format!(" [{}]", c)).unwrap_or_default();
            self.with_bar(|bar| {
                bar.println(format!(
                    "  {} {} {}{}: {}",
                    "!".red().bold(),
                    document_id,
                    outcome.kind,
                    subject,
                    reason
                ))
            });
        }
    }

    fn on_document_complete(&self, report: &DocumentReport) {
        let status = if report.is_clean() {
            format!("{} {}", "v".green(), report.document_id)
        } else {
            format!("{} {}", "x".yellow(), report.document_id)
        };
        self.with_bar(|bar| {
            bar.set_message(status);
            bar.inc(1);
        });
    }

    fn on_batch_complete(&self, cancelled: bool) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(bar) = guard.take()
        {
            if cancelled {
                bar.abandon_with_message("cancelled".red().to_string());
            } else {
                bar.finish_with_message("complete!".green().to_string());
            }
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl PipelineProgress for SimpleProgress {
    fn on_batch_start(&self, total_documents: usize) {
        println!("{} {} documents", "->".cyan(), total_documents.to_string().bold());
    }

    fn on_document_complete(&self, report: &DocumentReport) {
        if report.is_clean() {
            println!("  {} {}", "v".green(), report.document_id);
        } else {
            println!(
                "  {} {} ({} flags, {} problems)",
                "x".yellow(),
                report.document_id,
                report.human_flags().len(),
                report.problems.len()
            );
        }
    }

    fn on_batch_complete(&self, cancelled: bool) {
        if cancelled {
            println!("{}", "Batch cancelled".red());
        }
        println!();
    }
}
