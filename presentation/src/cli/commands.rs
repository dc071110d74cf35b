//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for batch results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-document summary and batch totals
    Summary,
    /// Every document report as JSON
    Json,
}

impl From<OutputFormat> for filing_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for filing-quorum
#[derive(Parser, Debug)]
#[command(name = "filing-quorum")]
#[command(author, version, about = "Balance sheet extraction with voting and escalation")]
#[command(long_about = r#"
Filing Quorum extracts balance sheet figures from SEC filings. Every decision
is asked several times of a fast model and settled by majority; unresolved
decisions escalate to a strong model, and suspicious concept selections are
checked by a supervisor. Whatever cannot be settled is flagged for review.

Each document is a JSON file in DOCUMENTS_DIR:
  {"id": "...", "blocks": ["text block", ...], "pre_table_text": "..."}

Configuration files are loaded from (in priority order):
1. FILING_QUORUM_* environment variables
2. --config <path>          Explicit config file
3. ./filing-quorum.toml     Project-level config
4. ~/.config/filing-quorum/config.toml   Global config

Example:
  filing-quorum ./filings
  filing-quorum ./filings --output json --audit runs/q3.audit.jsonl
"#)]
pub struct Cli {
    /// Directory holding one JSON document per filing
    #[arg(value_name = "DOCUMENTS_DIR", required_unless_present = "show_config")]
    pub documents_dir: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// JSONL file receiving decision outcomes and their audit trails
    #[arg(long, value_name = "PATH")]
    pub audit: Option<PathBuf>,

    /// Documents processed at the same time (overrides the config file)
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::parse_from([
            "filing-quorum",
            "filings",
            "--output",
            "json",
            "--audit",
            "out/audit.jsonl",
            "-j",
            "2",
            "-vv",
        ]);
        assert_eq!(cli.documents_dir, Some(PathBuf::from("filings")));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.audit, Some(PathBuf::from("out/audit.jsonl")));
        assert_eq!(cli.concurrency, Some(2));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_documents_dir_required_unless_show_config() {
        assert!(Cli::try_parse_from(["filing-quorum"]).is_err());
        let cli = Cli::try_parse_from(["filing-quorum", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.documents_dir.is_none());
    }
}
