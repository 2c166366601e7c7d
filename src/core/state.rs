//! Process-scoped session context.
//!
//! Owns what would otherwise be process globals: the state directories,
//! the session log file with its writer guard, and the loaded configuration.
//! Built once in `main`, passed by reference, and torn down with
//! [`SessionContext::finish`].

use std::path::{Path, PathBuf};
use chrono::Local;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use crate::core::{DescriberConfig, PROGRESS_FILE_NAME, ProgressStore, REGISTRY_FILE_NAME, Registry};
use crate::processing::output::DirectoryOutputs;
use crate::processing::tracker::ProgressTracker;
use crate::utils::{DescriberResult, create_dir_all, logging};

pub struct SessionContext {
    config: DescriberConfig,
    logs_dir: PathBuf,
    history_dir: PathBuf,
    log_file: PathBuf,
    log_guard: Option<WorkerGuard>,
}

impl SessionContext {
    /// Creates `logs/` and `processing_history/` under `base_dir`.
    ///
    /// Failing to create either directory aborts the session.
    pub fn open(base_dir: &Path, config: DescriberConfig) -> DescriberResult<Self> {
        let logs_dir = base_dir.join(&config.logs_dir);
        let history_dir = base_dir.join(&config.history_dir);
        create_dir_all(&logs_dir)?;
        create_dir_all(&history_dir)?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_file = logs_dir.join(format!("image_processing_{}.log", stamp));

        Ok(Self {
            config,
            logs_dir,
            history_dir,
            log_file,
            log_guard: None,
        })
    }

    /// Installs console and session-file logging.
    pub fn with_logging(mut self) -> Self {
        self.log_guard = logging::init_session_logging(&self.log_file);
        info!("Starting new processing session");
        info!("Log file created at: {}", self.log_file.display());
        self
    }

    pub fn config(&self) -> &DescriberConfig {
        &self.config
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    pub fn history_dir(&self) -> &Path {
        &self.history_dir
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn progress_path(&self) -> PathBuf {
        self.history_dir.join(PROGRESS_FILE_NAME)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.history_dir.join(REGISTRY_FILE_NAME)
    }

    /// Loads the progress store and registry into a tracker.
    ///
    /// A corrupt progress store is returned as an error and must stop the run.
    pub fn open_tracker(&self) -> DescriberResult<ProgressTracker> {
        let store = ProgressStore::load(self.progress_path())?;
        let registry = Registry::load(self.registry_path())?;
        let outputs = DirectoryOutputs::new(self.config.output_file_name.clone());
        Ok(ProgressTracker::new(store, registry, outputs))
    }

    /// Ends the session, flushing the log writer.
    pub fn finish(self) {
        info!("Session closed");
        drop(self.log_guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_state_directories() {
        let base = tempfile::tempdir().unwrap();
        let context = SessionContext::open(base.path(), DescriberConfig::default()).unwrap();

        assert!(base.path().join("logs").is_dir());
        assert!(base.path().join("processing_history").is_dir());
        assert_eq!(context.registry_path(), base.path().join("processing_history/csv_locations.csv"));
        let name = context.log_file().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("image_processing_") && name.ends_with(".log"));
    }

    #[test]
    fn open_fails_when_directory_cannot_be_created() {
        let base = tempfile::tempdir().unwrap();
        std::fs::write(base.path().join("logs"), b"not a dir").unwrap();
        assert!(SessionContext::open(base.path(), DescriberConfig::default()).is_err());
    }

    #[test]
    fn open_tracker_creates_registry() {
        let base = tempfile::tempdir().unwrap();
        let context = SessionContext::open(base.path(), DescriberConfig::default()).unwrap();
        let tracker = context.open_tracker().unwrap();
        assert!(tracker.store().is_empty());
        assert!(context.registry_path().exists());
    }
}
