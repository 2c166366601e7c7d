// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod commands;

// Public exports for external consumers
pub use core::{DescriberConfig, Item, ProcessingRecord, ProgressStore, Registry, SessionContext};
pub use utils::{DescriberError, DescriberResult};
pub use commands::*;

// The binaries in main.rs and bin/ are thin wrappers around `commands`.
