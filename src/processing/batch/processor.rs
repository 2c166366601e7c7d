use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use crate::core::{Item, ItemStatus, ProcessingRecord};
use crate::processing::caption::{CaptionService, RetryPolicy};
use crate::processing::interrupt::InterruptController;
use crate::processing::tracker::ProgressTracker;
use crate::processing::walker::DirectoryWalker;
use crate::utils::{DescriberResult, ServiceError};
use super::SessionMetrics;

/// What happened to one item.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    /// Completed in an earlier session
    Skipped,
    /// Described and persisted
    Described(ProcessingRecord),
    /// Captioning failed after retries; the failure was persisted
    Failed(ProcessingRecord),
    /// The result could not be written
    WriteFailed(String),
}

/// Progress of a running session, passed to the progress callback after
/// every item.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub path: PathBuf,
    pub status: ItemStatus,
    pub outcome: ItemOutcome,
    pub metrics: SessionMetrics,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Every candidate was handled
    Completed,
    /// Stopped early after a shutdown request
    Interrupted,
    /// Hard abort; the in-flight item was abandoned
    Aborted,
}

#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub status: SessionStatus,
    pub metrics: SessionMetrics,
}

/// Sequentially describes every unprocessed image under a root folder.
pub struct BatchProcessor {
    service: Box<dyn CaptionService>,
    retry: RetryPolicy,
}

impl BatchProcessor {
    pub fn new(service: Box<dyn CaptionService>, retry: RetryPolicy) -> Self {
        debug!("Creating BatchProcessor with {} attempts per item", retry.max_attempts);
        Self { service, retry }
    }

    async fn describe_item(&self, item: &Item) -> (Result<String, ServiceError>, u32) {
        let label = format!("Describing {}", item.file_name());
        self.retry.run(&label, || self.service.describe(&item.path)).await
    }

    /// Runs one session.
    ///
    /// Returns `Err` only for errors that must stop the whole run; per-item
    /// failures are persisted or counted and the loop moves on.
    pub async fn run(
        &self,
        walker: &DirectoryWalker,
        tracker: &mut ProgressTracker,
        controller: &InterruptController,
        mut on_progress: impl FnMut(&BatchProgress),
    ) -> DescriberResult<SessionOutcome> {
        info!("Processing images under {}", walker.root().display());
        let mut metrics = SessionMetrics::new();
        let mut status = SessionStatus::Completed;

        for mut item in walker.items() {
            // Skipped items never suspend, so give the signal listener a turn.
            tokio::task::yield_now().await;
            if controller.is_aborted() {
                status = SessionStatus::Aborted;
                break;
            }
            if controller.is_shutdown_requested() {
                info!("Shutdown requested, not starting {}", item.path.display());
                status = SessionStatus::Interrupted;
                break;
            }

            let outcome = if tracker.is_processed(&item) {
                item.status = ItemStatus::Processed;
                metrics.skipped += 1;
                ItemOutcome::Skipped
            } else {
                let described = tokio::select! {
                    biased;
                    _ = controller.aborted() => None,
                    result = self.describe_item(&item) => Some(result),
                };
                let Some((result, attempts)) = described else {
                    warn!("Aborted while describing {}; nothing recorded", item.path.display());
                    status = SessionStatus::Aborted;
                    break;
                };
                metrics.record_attempts(attempts);

                let record = match result {
                    Ok(description) => ProcessingRecord::success(&item.path, description),
                    Err(e) => {
                        error!("Failed to describe {}: {}", item.path.display(), e);
                        ProcessingRecord::failure(&item.path, e)
                    }
                };

                match tracker.mark_processed(&item, &record) {
                    Ok(()) if record.success => {
                        info!("Processed {}", item.path.display());
                        item.status = ItemStatus::Processed;
                        metrics.processed += 1;
                        ItemOutcome::Described(record)
                    }
                    Ok(()) => {
                        item.status = ItemStatus::Failed;
                        metrics.failed += 1;
                        ItemOutcome::Failed(record)
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        error!("Failed to save result for {}: {}", item.path.display(), e);
                        item.status = ItemStatus::Failed;
                        metrics.write_errors += 1;
                        ItemOutcome::WriteFailed(e.to_string())
                    }
                }
            };

            on_progress(&BatchProgress {
                path: item.path.clone(),
                status: item.status,
                outcome,
                metrics: metrics.clone(),
            });
        }

        // An interrupt during the last item still ends an interrupted session.
        if status == SessionStatus::Completed {
            if controller.is_aborted() {
                status = SessionStatus::Aborted;
            } else if controller.is_shutdown_requested() {
                status = SessionStatus::Interrupted;
            }
        }

        if status != SessionStatus::Aborted {
            controller.stop();
        }

        match status {
            SessionStatus::Completed => info!(
                "Session complete: {} processed, {} failed, {} skipped, {} write errors",
                metrics.processed, metrics.failed, metrics.skipped, metrics.write_errors
            ),
            SessionStatus::Interrupted => info!(
                "Session interrupted: {} processed, {} failed",
                metrics.processed, metrics.errors()
            ),
            SessionStatus::Aborted => warn!("Session aborted"),
        }

        Ok(SessionOutcome { status, metrics })
    }
}

