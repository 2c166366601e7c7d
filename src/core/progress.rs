//! Durable record of items that completed successfully.
//!
//! Stored as JSON lines under `processing_history/`. The whole file is read
//! into memory at startup; each completion is appended and synced before the
//! call returns.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::utils::{DescriberError, DescriberResult, append_durably, open_append};

/// File name of the progress store inside the history directory.
pub const PROGRESS_FILE_NAME: &str = "processed_files.jsonl";

/// One persisted completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub path: String,
    pub completed_at: DateTime<Local>,
}

/// Set of item identifiers already processed in this or earlier sessions.
pub struct ProgressStore {
    path: PathBuf,
    processed: HashSet<String>,
    file: Option<File>,
}

impl ProgressStore {
    /// Loads the store from `path`.
    ///
    /// A missing file yields an empty store. Any line that does not parse,
    /// including a truncated final line, is reported as
    /// [`DescriberError::CorruptState`].
    pub fn load(path: impl Into<PathBuf>) -> DescriberResult<Self> {
        let path = path.into();
        let mut processed = HashSet::new();

        if !path.exists() {
            debug!("No progress file at {}, starting empty", path.display());
            return Ok(Self { path, processed, file: None });
        }

        let bytes = std::fs::read(&path).map_err(|e| DescriberError::io(&path, e))?;
        let content = String::from_utf8(bytes)
            .map_err(|e| DescriberError::corrupt_state(&path, 0, format!("not valid UTF-8: {}", e)))?;

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: ProgressEntry = serde_json::from_str(line)
                .map_err(|e| DescriberError::corrupt_state(&path, idx + 1, e.to_string()))?;
            processed.insert(entry.path);
        }

        // A partially written last line has no newline terminator.
        if !content.is_empty() && !content.ends_with('\n') {
            let line = content.lines().count();
            return Err(DescriberError::corrupt_state(&path, line, "last entry is not terminated"));
        }

        info!("Loaded {} processed items from {}", processed.len(), path.display());
        Ok(Self { path, processed, file: None })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.processed.contains(id)
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably appends `id`. Returns `false` if it was already present.
    pub fn insert(&mut self, id: &str) -> DescriberResult<bool> {
        if self.processed.contains(id) {
            return Ok(false);
        }

        let entry = ProgressEntry {
            path: id.to_string(),
            completed_at: Local::now(),
        };
        let mut line = serde_json::to_vec(&entry).map_err(|e| DescriberError::io(&self.path, e))?;
        line.push(b'\n');

        if self.file.is_none() {
            self.file = Some(open_append(&self.path)?);
        }
        if let Some(file) = self.file.as_mut() {
            append_durably(file, &self.path, &line)?;
        }

        self.processed.insert(id.to_string());
        Ok(true)
    }
}
