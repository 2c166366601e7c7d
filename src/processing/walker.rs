use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;
use crate::core::Item;

/// Lazily enumerates accepted images under a root folder.
///
/// Entries are sorted by file name at every level, so the order only changes
/// when the tree does. Each call to [`DirectoryWalker::items`] starts a fresh
/// walk.
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    root: PathBuf,
}

impl DirectoryWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn items(&self) -> impl Iterator<Item = Item> + use<> {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| Item::from_path(entry.into_path()))
    }

    /// Counts candidate items without processing them.
    pub fn count(&self) -> usize {
        self.items().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"img").unwrap();
    }

    #[test]
    fn walks_nested_tree_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b.png"));
        touch(&root.join("a.JPG"));
        touch(&root.join("notes.txt"));
        touch(&root.join("sub/c.webp"));
        touch(&root.join("sub/image_descriptions.csv"));

        let names: Vec<String> = DirectoryWalker::new(root)
            .items()
            .map(|item| item.path.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.JPG", "b.png", "sub/c.webp"]);
    }

    #[test]
    fn walk_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("x/1.gif"));
        touch(&dir.path().join("x/2.bmp"));

        let walker = DirectoryWalker::new(dir.path());
        let first: Vec<_> = walker.items().collect();
        let second: Vec<_> = walker.items().collect();
        assert_eq!(first, second);
        assert_eq!(walker.count(), 2);
    }
}
