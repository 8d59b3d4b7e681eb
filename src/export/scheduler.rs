//! Coalescing of "menu changed" notifications into one deferred rebuild.

use crate::platform::dispatcher::{DispatchPriority, Dispatcher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub(crate) struct UpdateScheduler {
    reset_queued: AtomicBool,
    dispatcher: Arc<dyn Dispatcher>,
}

impl UpdateScheduler {
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            reset_queued: AtomicBool::new(false),
            dispatcher,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.reset_queued.load(Ordering::Acquire)
    }

    /// Mark a rebuild as pending and post `rebuild` at background priority.
    ///
    /// No-op while a rebuild is already pending. Returns whether a task was posted.
    pub fn queue(&self, rebuild: impl FnOnce() + Send + 'static) -> bool {
        if self.reset_queued.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.dispatcher
            .post(DispatchPriority::Background, Box::new(rebuild));
        true
    }

    /// Clear the pending flag, returning whether it was set.
    pub fn take_pending(&self) -> bool {
        self.reset_queued.swap(false, Ordering::AcqRel)
    }
}
