#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use collection_tools_lib::core::{PROGRESS_FILE_NAME, REGISTRY_FILE_NAME, ProgressStore, RecordRow, Registry};
use collection_tools_lib::processing::{
    BatchProcessor, BatchProgress, CaptionService, DirectoryOutputs, DirectoryWalker, InterruptController,
    OUTPUT_FILE_NAME, ProgressTracker, RetryPolicy, SessionOutcome,
};
use collection_tools_lib::utils::ServiceError;
use tempfile::TempDir;

/// Captioning stand-in with scripted failures.
#[derive(Clone, Default)]
pub struct ScriptedCaptions {
    calls: Arc<Mutex<Vec<PathBuf>>>,
    attempts: Arc<Mutex<HashMap<PathBuf, u32>>>,
    failures_per_image: u32,
    abort_on: Option<(String, InterruptController)>,
}

impl ScriptedCaptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each image fails `count` times with a network error before succeeding.
    pub fn failing(count: u32) -> Self {
        Self {
            failures_per_image: count,
            ..Self::default()
        }
    }

    /// Requests a hard abort while describing `file_name` and never answers.
    pub fn aborting_on(file_name: &str, controller: InterruptController) -> Self {
        Self {
            abort_on: Some((file_name.to_string(), controller)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_names(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}

pub fn caption_for(path: &Path) -> String {
    format!("A photo named {}", path.file_name().unwrap().to_string_lossy())
}

#[async_trait]
impl CaptionService for ScriptedCaptions {
    async fn describe(&self, image: &Path) -> Result<String, ServiceError> {
        self.calls.lock().unwrap().push(image.to_path_buf());

        if let Some((name, controller)) = &self.abort_on {
            if image.file_name().is_some_and(|n| n.to_string_lossy() == name.as_str()) {
                controller.interrupt();
                controller.interrupt();
                std::future::pending::<()>().await;
            }
        }

        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let n = attempts.entry(image.to_path_buf()).or_insert(0);
            *n += 1;
            *n
        };
        if attempt <= self.failures_per_image {
            return Err(ServiceError::Network(format!("connection refused (attempt {})", attempt)));
        }
        Ok(caption_for(image))
    }
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay_ms: 1,
        max_delay_ms: 2,
        multiplier: 2.0,
        jitter: false,
    }
}

/// A photo tree plus a separate state directory.
pub struct Fixture {
    pub history: TempDir,
    pub photos: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            history: tempfile::tempdir().unwrap(),
            photos: tempfile::tempdir().unwrap(),
        }
    }

    pub fn add_images(&self, relative: &[&str]) {
        for rel in relative {
            let path = self.photos.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, b"not really pixels").unwrap();
        }
    }

    pub fn image(&self, relative: &str) -> PathBuf {
        self.photos.path().join(relative)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.history.path().join(PROGRESS_FILE_NAME)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.history.path().join(REGISTRY_FILE_NAME)
    }

    pub fn tracker(&self) -> ProgressTracker {
        ProgressTracker::new(
            ProgressStore::load(self.progress_path()).unwrap(),
            Registry::load(self.registry_path()).unwrap(),
            DirectoryOutputs::default(),
        )
    }

    /// Rows of the output file in `dir` (relative to the photo root).
    pub fn rows(&self, dir: &str) -> Vec<RecordRow> {
        let path = self.photos.path().join(dir).join(OUTPUT_FILE_NAME);
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader.deserialize().map(|r| r.unwrap()).collect()
    }

    pub async fn run(
        &self,
        service: ScriptedCaptions,
        retry: RetryPolicy,
        controller: &InterruptController,
        on_progress: impl FnMut(&BatchProgress),
    ) -> SessionOutcome {
        let processor = BatchProcessor::new(Box::new(service), retry);
        let walker = DirectoryWalker::new(self.photos.path());
        let mut tracker = self.tracker();
        processor
            .run(&walker, &mut tracker, controller, on_progress)
            .await
            .unwrap()
    }
}
