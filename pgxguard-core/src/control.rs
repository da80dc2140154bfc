use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::errors::Interrupted;

///
/// Cooperative interruption for a single analysis run.
///
/// Pipeline stages call [`RunControl::check`] between variant records and
/// between genes; nothing is interrupted mid-step.
///
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    deadline: Option<Instant>,
    cancelled: Option<Arc<AtomicBool>>,
}

impl RunControl {
    /// A control that never interrupts.
    pub fn unbounded() -> Self {
        RunControl::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Share a flag the caller can raise from another thread.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(flag);
        self
    }

    pub fn is_interrupted(&self) -> bool {
        if let Some(flag) = &self.cancelled {
            if flag.load(Ordering::Relaxed) {
                return true;
            }
        }
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }

    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_interrupted() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }
}
