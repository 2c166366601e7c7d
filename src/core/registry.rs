//! Global index of per-directory output files (`csv_locations.csv`).

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::utils::{DescriberError, DescriberResult, append_durably, open_append, truncate_file};

/// File name of the registry inside the history directory.
pub const REGISTRY_FILE_NAME: &str = "csv_locations.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryRow {
    directory: String,
    csv_path: String,
}

/// Append-only, deduplicated mapping of directory to output CSV.
pub struct Registry {
    path: PathBuf,
    entries: BTreeMap<PathBuf, PathBuf>,
    file: File,
}

/// Makes sure the registry ends on a line boundary before it is appended to.
///
/// An unterminated last row is kept (and terminated) only when it parses and
/// names an output file that exists; otherwise it is a torn append and is cut.
/// A dropped entry is registered again the next time its directory is written.
fn repair_tail(path: &Path) -> DescriberResult<()> {
    let bytes = std::fs::read(path).map_err(|e| DescriberError::io(path, e))?;
    if bytes.is_empty() || bytes.ends_with(b"\n") {
        return Ok(());
    }

    let start = bytes.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
    let tail = &bytes[start..];
    let complete = start > 0
        && csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(tail)
            .deserialize::<RegistryRow>()
            .next()
            .and_then(|row| row.ok())
            .is_some_and(|row| Path::new(&row.csv_path).is_file());

    if complete {
        debug!("Terminating last registry row in {}", path.display());
        let mut file = open_append(path)?;
        append_durably(&mut file, path, b"\n")
    } else {
        warn!("Discarding half-written last row of {}", path.display());
        truncate_file(path, start as u64)
    }
}

impl Registry {
    /// Loads the registry, creating it with a header row if absent.
    pub fn load(path: impl Into<PathBuf>) -> DescriberResult<Self> {
        let path = path.into();
        let mut entries = BTreeMap::new();

        if path.exists() {
            repair_tail(&path)?;
            let mut reader = csv::Reader::from_path(&path).map_err(|e| DescriberError::io(&path, e))?;
            for (idx, row) in reader.deserialize::<RegistryRow>().enumerate() {
                // Header occupies line 1.
                let row = row.map_err(|e| DescriberError::corrupt_state(&path, idx + 2, e.to_string()))?;
                entries.insert(PathBuf::from(row.directory), PathBuf::from(row.csv_path));
            }
            info!("Loaded {} registered output files from {}", entries.len(), path.display());
        }

        let needs_header = !path.exists() || std::fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let mut file = open_append(&path)?;
        if needs_header {
            debug!("Creating registry at {}", path.display());
            append_durably(&mut file, &path, b"directory,csv_path\n")?;
        }

        Ok(Self { path, entries, file })
    }

    /// Records `directory -> csv_path` unless the directory is already known.
    /// Returns whether a new entry was written.
    pub fn register(&mut self, directory: &Path, csv_path: &Path) -> DescriberResult<bool> {
        if self.entries.contains_key(directory) {
            return Ok(false);
        }

        let row = RegistryRow {
            directory: directory.to_string_lossy().into_owned(),
            csv_path: csv_path.to_string_lossy().into_owned(),
        };
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.serialize(&row).map_err(|e| DescriberError::io(&self.path, e))?;
        let bytes = writer.into_inner().map_err(|e| DescriberError::io(&self.path, e.error()))?;

        append_durably(&mut self.file, &self.path, &bytes)?;
        self.entries.insert(directory.to_path_buf(), csv_path.to_path_buf());
        info!("Registered output {} for {}", csv_path.display(), directory.display());
        Ok(true)
    }

    pub fn get(&self, directory: &Path) -> Option<&Path> {
        self.entries.get(directory).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE_NAME);
        let registry = Registry::load(&path).unwrap();
        assert!(registry.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "directory,csv_path\n");
    }

    #[test]
    fn register_is_deduplicated_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE_NAME);

        let mut registry = Registry::load(&path).unwrap();
        assert!(registry.register(Path::new("/photos/a"), Path::new("/photos/a/image_descriptions.csv")).unwrap());
        assert!(!registry.register(Path::new("/photos/a"), Path::new("/photos/a/image_descriptions.csv")).unwrap());
        drop(registry);

        let mut registry = Registry::load(&path).unwrap();
        assert!(!registry.register(Path::new("/photos/a"), Path::new("/photos/a/image_descriptions.csv")).unwrap());
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(Path::new("/photos/a")),
            Some(Path::new("/photos/a/image_descriptions.csv"))
        );

        let lines = std::fs::read_to_string(&path).unwrap().lines().count();
        assert_eq!(lines, 2);
    }

    #[test]
    fn unterminated_complete_row_is_kept_and_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE_NAME);
        let a = dir.path().join("a");
        std::fs::create_dir(&a).unwrap();
        let a_csv = a.join("image_descriptions.csv");
        std::fs::write(&a_csv, "file_path,description,timestamp,status\n").unwrap();
        std::fs::write(&path, format!("directory,csv_path\n{},{}", a.display(), a_csv.display())).unwrap();

        let mut registry = Registry::load(&path).unwrap();
        assert_eq!(registry.len(), 1);
        registry.register(Path::new("/p/b"), Path::new("/p/b/image_descriptions.csv")).unwrap();
        drop(registry);

        let registry = Registry::load(&path).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&a), Some(a_csv.as_path()));
    }

    #[test]
    fn torn_last_row_is_cut() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE_NAME);
        std::fs::write(&path, "directory,csv_path\n/p/a,/p/a/image_descriptions.csv\n/p/c,/p/c/imag").unwrap();

        let mut registry = Registry::load(&path).unwrap();
        assert_eq!(registry.len(), 1);
        registry.register(Path::new("/p/b"), Path::new("/p/b/image_descriptions.csv")).unwrap();
        drop(registry);

        let registry = Registry::load(&path).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get(Path::new("/p/c")).is_none());
    }

    #[test]
    fn torn_header_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE_NAME);
        std::fs::write(&path, "direct").unwrap();

        let registry = Registry::load(&path).unwrap();
        assert!(registry.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "directory,csv_path\n");
    }

    #[test]
    fn paths_with_commas_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE_NAME);
        let mut registry = Registry::load(&path).unwrap();
        registry.register(Path::new("/photos/Smith, J"), Path::new("/photos/Smith, J/image_descriptions.csv")).unwrap();
        drop(registry);

        let registry = Registry::load(&path).unwrap();
        assert!(registry.get(Path::new("/photos/Smith, J")).is_some());
    }
}
