//! UI-thread dispatcher seam.
//!
//! The exporter never runs deferred work itself; it posts a task to the host's
//! dispatcher and the host runs it later on the UI thread.

use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Dispatch priority, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DispatchPriority {
    /// Idle-time work such as coalesced menu rebuilds
    Background,
    Normal,
    Input,
    /// Run before anything else queued
    Send,
}

/// Posts callbacks to run later on the UI thread.
pub trait Dispatcher: Send + Sync {
    fn post(&self, priority: DispatchPriority, task: Task);
}

/// In-process dispatcher whose queue the host drains from its event loop.
///
/// Tasks run highest priority first, FIFO within a priority. Tasks posted
/// while draining are picked up by the same drain.
#[derive(Default)]
pub struct QueuedDispatcher {
    queue: Mutex<BTreeMap<DispatchPriority, VecDeque<Task>>>,
}

impl QueuedDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.lock().values().map(VecDeque::len).sum()
    }

    /// Run queued tasks until the queue is empty. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop() {
            task();
            ran += 1;
        }
        ran
    }

    fn pop(&self) -> Option<Task> {
        let mut queue = self.queue.lock();
        let mut entry = queue.last_entry()?;
        let task = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        task
    }
}

impl Dispatcher for QueuedDispatcher {
    fn post(&self, priority: DispatchPriority, task: Task) {
        self.queue.lock().entry(priority).or_default().push_back(task);
    }
}
