use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use crate::utils::{DescriberError, DescriberResult};

/// Create a directory and all of its parents
pub fn create_dir_all(path: impl AsRef<Path>) -> DescriberResult<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| DescriberError::io(path, format!("Failed to create directory: {}", e)))
}

/// Open `path` for appending, creating it if needed.
pub fn open_append(path: impl AsRef<Path>) -> DescriberResult<File> {
    let path = path.as_ref();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| DescriberError::io(path, e))
}

/// Append `bytes` to `file` and wait until the data reaches the disk.
pub fn append_durably(file: &mut File, path: &Path, bytes: &[u8]) -> DescriberResult<()> {
    file.write_all(bytes).map_err(|e| DescriberError::io(path, e))?;
    file.flush().map_err(|e| DescriberError::io(path, e))?;
    file.sync_data().map_err(|e| DescriberError::io(path, e))
}

/// Replace the contents of `path` atomically.
///
/// Writes to a temporary file in the same directory and renames it over the
/// target, so readers see either the old or the new file in full.
pub fn replace_atomically(path: &Path, bytes: &[u8]) -> DescriberResult<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| DescriberError::io(parent, e))?;
    tmp.write_all(bytes).map_err(|e| DescriberError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| DescriberError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| DescriberError::io(path, e.error))?;
    Ok(())
}

/// Cut `path` down to its first `len` bytes and sync.
pub fn truncate_file(path: &Path, len: u64) -> DescriberResult<()> {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| DescriberError::io(path, e))?;
    file.set_len(len).map_err(|e| DescriberError::io(path, e))?;
    file.sync_all().map_err(|e| DescriberError::io(path, e))
}

/// Get the file stem as an owned string, falling back to "output".
pub fn file_stem_string(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_atomically_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(&path, "old\n").unwrap();

        replace_atomically(&path, b"new\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn truncate_file_drops_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(&path, "head\ntorn").unwrap();

        truncate_file(&path, 5).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "head\n");
    }

    #[test]
    fn append_durably_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let mut file = open_append(&path).unwrap();
        append_durably(&mut file, &path, b"a\n").unwrap();
        append_durably(&mut file, &path, b"b\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
    }
}
