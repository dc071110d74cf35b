//! Filing documents stored as one JSON file each.
//!
//! ```json
//! {"id": "0000320193-24-000069", "blocks": ["...", "..."], "pre_table_text": "..."}
//! ```
//!
//! `id` defaults to the file stem; `pre_table_text` is optional.

use filing_application::{DocumentSource, SourceError};
use filing_domain::FilingDocument;
use glob::glob;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct RawDocument {
    id: Option<String>,
    #[serde(default)]
    blocks: Vec<String>,
    pre_table_text: Option<String>,
}

/// Loads every `*.json` file of a directory, sorted by file name.
///
/// A file that cannot be read or parsed is skipped with a warning; only
/// directory-level problems fail the load.
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    dir: PathBuf,
}

impl JsonDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_document(path: &Path) -> Result<FilingDocument, SourceError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| SourceError::Read {
            path: display.clone(),
            message: e.to_string(),
        })?;
        let raw: RawDocument = serde_json::from_str(&text).map_err(|e| SourceError::Invalid {
            path: display.clone(),
            message: e.to_string(),
        })?;

        let id = match raw.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .ok_or_else(|| SourceError::Invalid {
                    path: display,
                    message: "no id and no file name".to_string(),
                })?,
        };
        let document = FilingDocument {
            id,
            blocks: raw.blocks,
            pre_table_text: raw.pre_table_text,
        };
        debug!(document = %document.id, blocks = document.blocks.len(), "Loaded document");
        Ok(document)
    }
}

impl DocumentSource for JsonDirectorySource {
    fn load(&self) -> Result<Vec<FilingDocument>, SourceError> {
        if !self.dir.is_dir() {
            return Err(SourceError::Read {
                path: self.dir.display().to_string(),
                message: "not a directory".to_string(),
            });
        }

        let pattern = self.dir.join("*.json");
        let entries = glob(&pattern.to_string_lossy())
            .map_err(|e| SourceError::Pattern(e.to_string()))?;

        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => warn!(path = %e.path().display(), "Skipping unreadable entry: {}", e.error()),
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        let mut skipped = 0usize;
        for path in &paths {
            match Self::read_document(path) {
                Ok(document) => documents.push(document),
                Err(e) => {
                    warn!("Skipping document: {}", e);
                    skipped += 1;
                }
            }
        }
        info!(
            dir = %self.dir.display(),
            documents = documents.len(),
            skipped,
            "Documents loaded"
        );
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_sorted_documents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"{"id": "second", "blocks": ["one", "two"], "pre_table_text": "In millions"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("a.json"), r#"{"blocks": ["only"]}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let documents = JsonDirectorySource::new(dir.path()).load().unwrap();

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].id, "a");
        assert_eq!(documents[0].blocks, vec!["only".to_string()]);
        assert_eq!(documents[1].id, "second");
        assert_eq!(documents[1].pre_table_text.as_deref(), Some("In millions"));
    }

    #[test]
    fn test_broken_file_does_not_hide_its_neighbours() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"{"blocks": ["only"]}"#).unwrap();
        fs::write(dir.path().join("b.json"), "{not json").unwrap();

        let documents = JsonDirectorySource::new(dir.path()).load().unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, "a");
    }

    #[test]
    fn test_invalid_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let error = JsonDirectorySource::read_document(&path).unwrap_err();
        match error {
            SourceError::Invalid { path, .. } => assert!(path.ends_with("broken.json")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            JsonDirectorySource::new(missing).load(),
            Err(SourceError::Read { .. })
        ));
    }
}
