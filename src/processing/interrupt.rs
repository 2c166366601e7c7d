//! Two-stage interruption handling.
//!
//! The first interrupt requests a graceful stop: the in-flight item finishes
//! and is persisted, then the walk ends. A second interrupt aborts at once:
//! the in-flight captioning call is abandoned and nothing more is written.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Lifecycle of a session with respect to interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    ShutdownRequested,
    Aborted,
    Stopped,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Running,
            1 => Self::ShutdownRequested,
            2 => Self::Aborted,
            _ => Self::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Running => 0,
            Self::ShutdownRequested => 1,
            Self::Aborted => 2,
            Self::Stopped => 3,
        }
    }
}

/// Shared interruption state. Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct InterruptController {
    state: Arc<AtomicU8>,
    shutdown: CancellationToken,
    abort: CancellationToken,
}

impl Default for InterruptController {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptController {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(RunState::Running.as_u8())),
            shutdown: CancellationToken::new(),
            abort: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Handles one interruption signal and returns the resulting state.
    pub fn interrupt(&self) -> RunState {
        let next = match self.state() {
            RunState::Running => {
                eprintln!("\n\nGracefully shutting down... Press Ctrl+C again to force quit.");
                info!("Shutdown requested, finishing current item");
                self.shutdown.cancel();
                RunState::ShutdownRequested
            }
            RunState::ShutdownRequested => {
                eprintln!("\n\nForce quitting...");
                warn!("Second interrupt received, aborting");
                self.abort.cancel();
                RunState::Aborted
            }
            other => other,
        };
        self.state.store(next.as_u8(), Ordering::SeqCst);
        next
    }

    /// Poll point checked before each item.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_cancelled()
    }

    /// Resolves once a hard abort has been requested.
    pub async fn aborted(&self) {
        self.abort.cancelled().await
    }

    /// Marks the session finished. Has no effect after an abort.
    pub fn stop(&self) {
        let _ = self.state.compare_exchange(
            RunState::Running.as_u8(),
            RunState::Stopped.as_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        let _ = self.state.compare_exchange(
            RunState::ShutdownRequested.as_u8(),
            RunState::Stopped.as_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Spawns a task that feeds Ctrl+C presses into [`Self::interrupt`].
    pub fn listen_for_ctrl_c(&self) -> tokio::task::JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                if controller.interrupt() == RunState::Aborted {
                    return;
                }
            }
        })
    }
}
