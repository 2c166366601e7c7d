pub mod batch;
pub mod caption;
pub mod interrupt;
pub mod output;
pub mod pdf;
pub mod tracker;
pub mod walker;

pub use batch::{BatchProcessor, BatchProgress, ItemOutcome, SessionMetrics, SessionOutcome, SessionStatus};
pub use caption::{CaptionConfig, CaptionService, OllamaClient, RetryPolicy};
pub use interrupt::{InterruptController, RunState};
pub use output::{DirectoryOutputs, OUTPUT_FILE_NAME, OutputWrite};
pub use tracker::ProgressTracker;
pub use walker::DirectoryWalker;
