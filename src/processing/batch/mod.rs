mod metrics;
mod processor;

pub use metrics::SessionMetrics;
pub use processor::{BatchProcessor, BatchProgress, ItemOutcome, SessionOutcome, SessionStatus};
