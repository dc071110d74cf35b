//! JSONL file writer for decision outcomes.
//!
//! Every [`StageOutcome`] becomes one `decision_outcome` line keyed by
//! document id and task kind, carrying its full audit trail. After the
//! outcomes of a document, one `document_report` line summarises it.
//! Each line has a `type` field and a `timestamp`.

use filing_application::OutcomeSink;
use filing_domain::{DocumentReport, StageOutcome};
use serde_json::{Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL outcome sink that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every document
/// and on `Drop`.
pub struct JsonlOutcomeSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlOutcomeSink {
    /// Create a sink writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create audit directory {}: {}", parent.display(), e);
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create audit file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the audit file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&self, record_type: &str, payload: Value, flush: bool) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let record = match payload {
            Value::Object(mut map) => {
                map.insert("type".to_string(), Value::String(record_type.to_string()));
                map.insert("timestamp".to_string(), Value::String(timestamp));
                Value::Object(map)
            }
            other => json!({
                "type": record_type,
                "timestamp": timestamp,
                "data": other,
            }),
        };

        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!("Could not serialize {} record: {}", record_type, e);
                return;
            }
        };

        if let Ok(mut writer) = self.writer.lock() {
            if let Err(e) = writeln!(writer, "{}", line) {
                warn!("Could not write to {}: {}", self.path.display(), e);
                return;
            }
            if flush {
                let _ = writer.flush();
            }
        }
    }
}

impl OutcomeSink for JsonlOutcomeSink {
    fn record_outcome(&self, document_id: &str, outcome: &StageOutcome) {
        let payload = match serde_json::to_value(outcome) {
            Ok(Value::Object(mut map)) => {
                map.insert(
                    "document_id".to_string(),
                    Value::String(document_id.to_string()),
                );
                Value::Object(map)
            }
            Ok(other) => other,
            Err(e) => {
                warn!(document = document_id, "Could not serialize outcome: {}", e);
                return;
            }
        };
        self.write_record("decision_outcome", payload, false);
    }

    fn record_report(&self, report: &DocumentReport) {
        let payload = json!({
            "document_id": report.document_id,
            "decisions": report.outcomes.len(),
            "votes_used": report.votes_used(),
            "human_flags": report.human_flags().len(),
            "table_block": report.table_block,
            "sum_units": report.sum_units,
            "sum_divider": report.sum_divider,
            "column_dates": report.column_dates,
            "value_column": report.value_column,
            "table": report.table,
            "figures": report.figures,
            "problems": report.problems,
        });
        self.write_record("document_report", payload, true);
    }
}

impl Drop for JsonlOutcomeSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
