use std::path::{Path, PathBuf};
use crate::utils::{DescriberResult, ValidationError};

/// Validates the root folder and returns its absolute form
pub fn validate_root_folder(path: impl AsRef<Path>) -> DescriberResult<PathBuf> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ValidationError::path_not_found(path).into());
    }

    if !path.is_dir() {
        return Err(ValidationError::not_a_directory(path).into());
    }

    // Store entries are keyed by absolute path, so relative roots must resolve
    // to the same identifiers on every run.
    path.canonicalize()
        .map_err(|e| crate::utils::DescriberError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::DescriberError;

    #[test]
    fn missing_root_is_rejected() {
        let err = validate_root_folder("/definitely/not/here").unwrap_err();
        assert!(matches!(err, DescriberError::Validation(_)));
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.jpg");
        std::fs::write(&file, b"x").unwrap();
        assert!(validate_root_folder(&file).is_err());
    }

    #[test]
    fn directory_root_resolves_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let root = validate_root_folder(dir.path()).unwrap();
        assert!(root.is_absolute());
    }
}
