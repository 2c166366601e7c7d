use tracing::{debug, warn};
use crate::core::{Item, ProcessingRecord, ProgressStore, Registry};
use crate::processing::output::DirectoryOutputs;
use crate::utils::DescriberResult;

/// Combines the progress store, directory outputs and registry behind the
/// two operations the batch loop needs.
pub struct ProgressTracker {
    store: ProgressStore,
    registry: Registry,
    outputs: DirectoryOutputs,
}

impl ProgressTracker {
    pub fn new(store: ProgressStore, registry: Registry, outputs: DirectoryOutputs) -> Self {
        Self { store, registry, outputs }
    }

    pub fn is_processed(&self, item: &Item) -> bool {
        self.store.contains(&item.id())
    }

    /// Persists `record` for `item`.
    ///
    /// The record reaches the directory output before the item id reaches the
    /// progress store, so a stored id always has a row. Failed records are
    /// written but not stored; the item is retried next session.
    pub fn mark_processed(&mut self, item: &Item, record: &ProcessingRecord) -> DescriberResult<()> {
        let write = self.outputs.write(&item.directory, record)?;

        if write.first_in_session {
            // Registering on first touch also repairs a registry entry lost to
            // a crash right after the output file was created.
            if let Err(e) = self.registry.register(&item.directory, &write.csv_path) {
                warn!("Failed to register {}: {}", write.csv_path.display(), e);
                return Err(e);
            }
        }

        if record.success {
            self.store.insert(&item.id())?;
        }

        debug!(
            "Recorded {} ({}){}",
            item.file_name(),
            record.status_label(),
            if write.replaced { ", replacing earlier row" } else { "" }
        );
        Ok(())
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PROGRESS_FILE_NAME, REGISTRY_FILE_NAME};

    fn tracker(history: &std::path::Path) -> ProgressTracker {
        ProgressTracker::new(
            ProgressStore::load(history.join(PROGRESS_FILE_NAME)).unwrap(),
            Registry::load(history.join(REGISTRY_FILE_NAME)).unwrap(),
            DirectoryOutputs::default(),
        )
    }

    #[test]
    fn success_is_stored_and_registered() {
        let history = tempfile::tempdir().unwrap();
        let photos = tempfile::tempdir().unwrap();
        let item = Item::from_path(photos.path().join("a.jpg")).unwrap();

        let mut tracker = tracker(history.path());
        assert!(!tracker.is_processed(&item));
        tracker.mark_processed(&item, &ProcessingRecord::success(&item.path, "A cat")).unwrap();

        assert!(tracker.is_processed(&item));
        assert_eq!(tracker.registry().len(), 1);
        assert!(photos.path().join("image_descriptions.csv").exists());
    }

    #[test]
    fn failure_is_recorded_but_not_stored() {
        let history = tempfile::tempdir().unwrap();
        let photos = tempfile::tempdir().unwrap();
        let item = Item::from_path(photos.path().join("a.jpg")).unwrap();

        let mut tracker = tracker(history.path());
        tracker.mark_processed(&item, &ProcessingRecord::failure(&item.path, "timeout")).unwrap();

        assert!(!tracker.is_processed(&item));
        let content = std::fs::read_to_string(photos.path().join("image_descriptions.csv")).unwrap();
        assert!(content.contains("ERROR: timeout"));
        assert!(content.contains(",failed"));
    }
}
