//! Work item definition.

use std::path::{Path, PathBuf};
use crate::utils::{ImageFormat, format_from_extension};

/// Where an item stands in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Unprocessed,
    Processed,
    Failed,
}

/// A discovered image file.
///
/// Items are identified by their absolute path; that string is what the
/// progress store and the directory outputs key on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Absolute path to the image
    pub path: PathBuf,
    /// Directory holding the image (and its output CSV)
    pub directory: PathBuf,
    /// Accepted image type derived from the extension
    pub format: ImageFormat,
    pub status: ItemStatus,
}

impl Item {
    /// Builds an item for `path`, or `None` when the extension is not an
    /// accepted image type.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = format_from_extension(&path)?;
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Some(Self {
            path,
            directory,
            format,
            status: ItemStatus::Unprocessed,
        })
    }

    /// Identifier used by the progress store.
    pub fn id(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_derives_directory_and_format() {
        let item = Item::from_path("/archive/box1/photo.PNG").unwrap();
        assert_eq!(item.directory, PathBuf::from("/archive/box1"));
        assert_eq!(item.format, ImageFormat::Png);
        assert_eq!(item.status, ItemStatus::Unprocessed);
        assert_eq!(item.id(), "/archive/box1/photo.PNG");
        assert_eq!(item.file_name(), "photo.PNG");
    }

    #[test]
    fn non_images_are_not_items() {
        assert!(Item::from_path("/archive/box1/notes.txt").is_none());
    }
}
