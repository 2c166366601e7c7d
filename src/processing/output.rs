//! Per-directory description files.
//!
//! Each image directory gets one CSV holding at most one row per image.
//! New rows are appended and synced; a row for an image that already has one
//! (an earlier failure, or an orphan left by a crash before the progress
//! store was updated) replaces it through an atomic rewrite.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use crate::core::{ProcessingRecord, RecordRow};
use crate::utils::{DescriberError, DescriberResult, append_durably, open_append, replace_atomically, truncate_file};

/// Default file name of a directory output.
pub const OUTPUT_FILE_NAME: &str = "image_descriptions.csv";

const HEADER: [&str; 4] = ["file_path", "description", "timestamp", "status"];

/// What happened when a record was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputWrite {
    /// Location of the directory's output file
    pub csv_path: PathBuf,
    /// First write to this directory's output in the session
    pub first_in_session: bool,
    /// An existing row for the same image was replaced
    pub replaced: bool,
}

struct DirectoryOutput {
    csv_path: PathBuf,
    recorded: HashSet<String>,
}

impl DirectoryOutput {
    fn open(csv_path: PathBuf) -> DescriberResult<Self> {
        let mut recorded = HashSet::new();
        if csv_path.exists() {
            for row in recover_rows(&csv_path)? {
                recorded.insert(row.file_path);
            }
        }
        Ok(Self { csv_path, recorded })
    }

    fn append(&mut self, row: &RecordRow) -> DescriberResult<()> {
        let needs_header = std::fs::metadata(&self.csv_path).map(|m| m.len() == 0).unwrap_or(true);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(Vec::new());
        writer.serialize(row).map_err(|e| DescriberError::io(&self.csv_path, e))?;
        let bytes = writer.into_inner().map_err(|e| DescriberError::io(&self.csv_path, e.error()))?;

        let mut file = open_append(&self.csv_path)?;
        append_durably(&mut file, &self.csv_path, &bytes)?;
        self.recorded.insert(row.file_path.clone());
        Ok(())
    }

    fn replace(&mut self, row: &RecordRow) -> DescriberResult<()> {
        let mut rows = read_rows(&self.csv_path)?;
        rows.retain(|existing| existing.file_path != row.file_path);
        rows.push(row.clone());

        let mut writer = csv::Writer::from_writer(Vec::new());
        for r in &rows {
            writer.serialize(r).map_err(|e| DescriberError::io(&self.csv_path, e))?;
        }
        let bytes = writer.into_inner().map_err(|e| DescriberError::io(&self.csv_path, e.error()))?;
        replace_atomically(&self.csv_path, &bytes)
    }
}

fn read_rows(path: &Path) -> DescriberResult<Vec<RecordRow>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| DescriberError::io(path, e))?;
    reader
        .deserialize::<RecordRow>()
        .enumerate()
        .map(|(idx, row)| row.map_err(|e| DescriberError::io(path, format!("unreadable row {}: {}", idx + 2, e))))
        .collect()
}

/// Reads an existing output, cutting off a row left half-written by a crash.
///
/// Rows are appended before the progress store is updated, so a dropped tail
/// row belongs to an item that was never stored and will be described again.
/// A bad row followed by good ones is not a torn append and is an error.
fn recover_rows(path: &Path) -> DescriberResult<Vec<RecordRow>> {
    let bytes = std::fs::read(path).map_err(|e| DescriberError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(bytes.as_slice());

    let headers = match reader.headers() {
        Ok(headers) if headers.iter().eq(HEADER) => headers.clone(),
        _ if !bytes.contains(&b'\n') => {
            warn!("Discarding incomplete header in {}", path.display());
            truncate_file(path, 0)?;
            return Ok(Vec::new());
        }
        _ => return Err(DescriberError::io(path, "unexpected header row")),
    };

    let mut rows = Vec::new();
    let mut keep = reader.position().byte();
    let mut last_start = keep;
    let mut torn = false;
    let mut record = csv::StringRecord::new();
    loop {
        let start = reader.position().byte();
        let parsed = reader
            .read_record(&mut record)
            .map_err(|e| e.to_string())
            .and_then(|more| match more {
                false => Ok(None),
                true => record
                    .deserialize::<RecordRow>(Some(&headers))
                    .map(Some)
                    .map_err(|e| e.to_string()),
            });

        match parsed {
            Ok(Some(row)) => {
                rows.push(row);
                last_start = start;
                keep = reader.position().byte();
            }
            Ok(None) => break,
            Err(reason) => {
                if reader.read_record(&mut record).unwrap_or(false) {
                    return Err(DescriberError::io(path, format!("unreadable row at byte {}: {}", start, reason)));
                }
                torn = true;
                break;
            }
        }
    }

    // A complete-looking last row without its newline may still be cut short.
    if !torn && !bytes.ends_with(b"\n") {
        // With no rows the unterminated line is the header itself.
        keep = if rows.pop().is_some() { last_start } else { 0 };
        torn = true;
    }

    if torn {
        warn!("Discarding half-written last row of {}", path.display());
        truncate_file(path, keep)?;
    }
    Ok(rows)
}

/// All directory outputs touched during a session.
pub struct DirectoryOutputs {
    file_name: String,
    open: HashMap<PathBuf, DirectoryOutput>,
}

impl Default for DirectoryOutputs {
    fn default() -> Self {
        Self::new(OUTPUT_FILE_NAME)
    }
}

impl DirectoryOutputs {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            open: HashMap::new(),
        }
    }

    /// Output location for images in `directory`.
    pub fn csv_path_for(&self, directory: &Path) -> PathBuf {
        directory.join(&self.file_name)
    }

    /// Durably writes `record` into the output of `directory`.
    pub fn write(&mut self, directory: &Path, record: &ProcessingRecord) -> DescriberResult<OutputWrite> {
        let first_in_session = !self.open.contains_key(directory);
        if first_in_session {
            let output = DirectoryOutput::open(self.csv_path_for(directory))?;
            self.open.insert(directory.to_path_buf(), output);
        }
        let Some(output) = self.open.get_mut(directory) else {
            return Err(DescriberError::io(directory, "directory output not open"));
        };

        let row = record.to_row();
        let replaced = output.recorded.contains(&row.file_path);
        if replaced {
            debug!("Replacing existing row for {}", row.file_path);
            output.replace(&row)?;
        } else {
            output.append(&row)?;
        }

        Ok(OutputWrite {
            csv_path: output.csv_path.clone(),
            first_in_session,
            replaced,
        })
    }
}
