use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use snow_core::errors::{ErrorInfo, SnowError};

/// Cooperative cancellation flag shared between a driver and its workers.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token in the non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns `Cancelled` once cancellation has been requested.
    pub fn check(&self, stage: &str) -> Result<(), SnowError> {
        if self.is_cancelled() {
            return Err(SnowError::Cancelled(
                ErrorInfo::new("cancelled", "cancellation requested").with_context("stage", stage),
            ));
        }
        Ok(())
    }
}
