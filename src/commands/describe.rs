//! The image describer session.

use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};
use crate::core::{DescriberConfig, SessionContext};
use crate::processing::{
    BatchProcessor, BatchProgress, DirectoryWalker, InterruptController, ItemOutcome, OllamaClient,
    SessionOutcome, SessionStatus,
};
use crate::utils::{DescriberResult, validate_root_folder};

/// Paths the final summary points the user at.
#[derive(Debug, Clone)]
pub struct DescribeReport {
    pub outcome: SessionOutcome,
    pub registry_path: PathBuf,
    pub log_file: PathBuf,
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

fn update_bar(bar: &ProgressBar, progress: &BatchProgress) {
    bar.inc(1);
    let name = progress
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match &progress.outcome {
        ItemOutcome::Skipped => bar.set_message(format!("skipped {}", name)),
        ItemOutcome::Described(_) => bar.set_message(name),
        ItemOutcome::Failed(_) | ItemOutcome::WriteFailed(_) => {
            bar.println(format!("Error processing {}", progress.path.display()));
            bar.set_message(format!("failed {}", name));
        }
    }
}

/// Describes every unprocessed image under `root`, with state kept under
/// `base_dir`.
///
/// Errors returned here stop the run: an invalid root folder, unusable
/// state directories, corrupt state files or a bad configuration.
pub async fn run_describer(root: &Path, base_dir: &Path) -> DescriberResult<DescribeReport> {
    let root = validate_root_folder(root)?;
    let config = DescriberConfig::load(base_dir)?;
    let context = SessionContext::open(base_dir, config)?.with_logging();

    let report = describe_with_context(&root, &context).await;
    match &report {
        Ok(report) if report.outcome.status == SessionStatus::Aborted => {
            error!("Processing aborted");
            return Ok(report.clone());
        }
        Ok(_) => {}
        Err(e) => error!("Fatal error: {}", e),
    }
    context.finish();
    report
}

async fn describe_with_context(root: &Path, context: &SessionContext) -> DescriberResult<DescribeReport> {
    let mut tracker = context.open_tracker()?;
    info!(
        "Loaded {} processed items and {} registered output files",
        tracker.store().len(),
        tracker.registry().len()
    );

    let config = context.config();
    let client = OllamaClient::new(config.caption.clone())?;
    let processor = BatchProcessor::new(Box::new(client), config.retry.clone());

    let walker = DirectoryWalker::new(root);
    let bar = progress_bar(walker.count());

    let controller = InterruptController::new();
    let listener = controller.listen_for_ctrl_c();

    let outcome = processor
        .run(&walker, &mut tracker, &controller, |progress| update_bar(&bar, progress))
        .await;
    listener.abort();
    bar.finish_and_clear();

    Ok(DescribeReport {
        outcome: outcome?,
        registry_path: context.registry_path(),
        log_file: context.log_file().to_path_buf(),
    })
}

/// Prints the end-of-session summary to stdout.
pub fn print_summary(report: &DescribeReport) {
    let metrics = &report.outcome.metrics;
    match report.outcome.status {
        SessionStatus::Completed => println!("\nProcessing complete!"),
        SessionStatus::Interrupted => println!("\nProcessing interrupted by user."),
        SessionStatus::Aborted => println!("\nProcessing aborted."),
    }
    println!("Total images processed: {}", metrics.processed);
    if metrics.skipped > 0 {
        println!("Already processed: {}", metrics.skipped);
    }
    println!("Errors encountered: {}", metrics.errors());
    if let Some(secs) = metrics.seconds_per_item() {
        println!("Average time per image: {:.1}s", secs);
    }
    println!("CSV locations are recorded in: {}", report.registry_path.display());
    println!("Log file: {}", report.log_file.display());
}
