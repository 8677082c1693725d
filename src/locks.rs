//! Per-task mutual exclusion for pipeline runs.
//!
//! Two concurrent runs for the same task name would race on create, push,
//! and hosting-enable against the repository host. The lock set admits at
//! most one active run per task; duplicates are rejected rather than
//! queued.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Set of task names with an active pipeline run.
#[derive(Default)]
pub struct TaskLocks {
    active: Arc<Mutex<HashSet<String>>>,
}

/// Holds a task's lock; releases it on drop.
pub struct TaskGuard {
    active: Arc<Mutex<HashSet<String>>>,
    task: String,
}

impl TaskLocks {
    /// Creates an empty lock set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tries to claim the lock for `task`.
    ///
    /// Returns `None` when another run already holds it.
    pub fn acquire(&self, task: &str) -> Option<TaskGuard> {
        let mut active = self.active.lock().expect("task lock set poisoned");
        if !active.insert(task.to_string()) {
            return None;
        }
        Some(TaskGuard { active: Arc::clone(&self.active), task: task.to_string() })
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let mut active = self.active.lock().expect("task lock set poisoned");
        active.remove(&self.task);
    }
}
