//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the describer:
//! - [`SessionContext`]: Process-scoped context built once per run
//! - [`Item`]: A discovered image
//! - [`ProcessingRecord`]: Result of describing one image
//! - [`ProgressStore`]: Durable set of completed items
//! - [`Registry`]: Durable index of per-directory output files

mod config;
mod state;
mod types;
mod task;
mod progress;
mod registry;

pub use config::{CONFIG_FILE_NAME, DescriberConfig};
pub use state::SessionContext;
pub use types::{ERROR_MARKER, ProcessingRecord, RECORD_TIMESTAMP_FORMAT, RecordRow};
pub use task::{Item, ItemStatus};
pub use progress::{PROGRESS_FILE_NAME, ProgressEntry, ProgressStore};
pub use registry::{REGISTRY_FILE_NAME, Registry};
