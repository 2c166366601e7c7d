//! Core types for processing results.

use std::path::PathBuf;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp format used in the per-directory CSV files.
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prefix written in place of a description when captioning failed.
pub const ERROR_MARKER: &str = "ERROR: ";

/// Result of processing one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingRecord {
    /// Path to the image
    pub path: PathBuf,
    /// Generated description, or an `ERROR: ...` marker on failure
    pub description: String,
    /// When the item finished processing
    pub timestamp: DateTime<Local>,
    /// Whether the description was generated
    pub success: bool,
}

impl ProcessingRecord {
    pub fn success(path: impl Into<PathBuf>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            timestamp: Local::now(),
            success: true,
        }
    }

    pub fn failure(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        Self {
            path: path.into(),
            description: format!("{}{}", ERROR_MARKER, error),
            timestamp: Local::now(),
            success: false,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.success { "success" } else { "failed" }
    }

    /// Converts to the row written into a directory output file.
    pub fn to_row(&self) -> RecordRow {
        RecordRow {
            file_path: self.path.to_string_lossy().into_owned(),
            description: self.description.clone(),
            timestamp: self.timestamp.format(RECORD_TIMESTAMP_FORMAT).to_string(),
            status: self.status_label().to_string(),
        }
    }
}

/// One row of a directory output CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    pub file_path: String,
    pub description: String,
    pub timestamp: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_records_carry_error_marker() {
        let record = ProcessingRecord::failure("/a/b.jpg", "Request timed out after 120s");
        assert!(!record.success);
        assert_eq!(record.description, "ERROR: Request timed out after 120s");

        let row = record.to_row();
        assert_eq!(row.status, "failed");
        assert_eq!(row.file_path, "/a/b.jpg");
    }

    #[test]
    fn success_row_uses_csv_timestamp_format() {
        let record = ProcessingRecord::success("/a/b.jpg", "A harbour at dusk.");
        let row = record.to_row();
        assert_eq!(row.status, "success");
        assert_eq!(row.timestamp.len(), "2024-01-01 00:00:00".len());
    }
}
