//! In-memory registry of pipeline runs.
//!
//! The pipeline itself is fire-and-forget, so this registry is the only
//! caller-visible record of whether a run is still going, succeeded, or
//! failed. Records are keyed by task name and round and kept for the
//! process lifetime.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::ports::notifier::RoundOutcome;
use crate::task::Round;

/// Lifecycle state of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// The run is still executing.
    Pending,
    /// The run completed every step.
    Succeeded,
    /// The run aborted at some step.
    Failed,
}

/// Status record for one run, served by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    /// Current lifecycle state.
    pub state: RunState,
    /// When the run was scheduled.
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal state, if it has.
    pub finished_at: Option<DateTime<Utc>>,
    /// Failure detail for failed runs.
    pub error: Option<String>,
    /// Callback payload for succeeded runs.
    pub outcome: Option<RoundOutcome>,
}

/// Registry of all runs observed by this process.
#[derive(Default)]
pub struct RunRegistry {
    runs: Mutex<HashMap<(String, u8), RunRecord>>,
}

impl RunRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start of a run, replacing any previous record for the
    /// same task and round.
    pub async fn start(&self, task: &str, round: Round) {
        let record = RunRecord {
            state: RunState::Pending,
            started_at: Utc::now(),
            finished_at: None,
            error: None,
            outcome: None,
        };
        self.runs.lock().await.insert((task.to_string(), round.number()), record);
    }

    /// Marks a run as succeeded with its callback payload.
    pub async fn succeed(&self, task: &str, round: Round, outcome: RoundOutcome) {
        let mut runs = self.runs.lock().await;
        if let Some(record) = runs.get_mut(&(task.to_string(), round.number())) {
            record.state = RunState::Succeeded;
            record.finished_at = Some(Utc::now());
            record.outcome = Some(outcome);
        }
    }

    /// Marks a run as failed with a failure detail.
    pub async fn fail(&self, task: &str, round: Round, error: &str) {
        let mut runs = self.runs.lock().await;
        if let Some(record) = runs.get_mut(&(task.to_string(), round.number())) {
            record.state = RunState::Failed;
            record.finished_at = Some(Utc::now());
            record.error = Some(error.to_string());
        }
    }

    /// Looks up the record for a task and round number.
    pub async fn get(&self, task: &str, round: u8) -> Option<RunRecord> {
        self.runs.lock().await.get(&(task.to_string(), round)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{RunRegistry, RunState};
    use crate::ports::notifier::RoundOutcome;
    use crate::task::Round;

    fn outcome() -> RoundOutcome {
        RoundOutcome {
            email: "a@b.c".into(),
            task: "demo".into(),
            round: Round::One,
            nonce: "n".into(),
            repo_url: "r".into(),
            commit_sha: "c".into(),
            pages_url: "p".into(),
        }
    }

    #[tokio::test]
    async fn run_moves_through_pending_to_succeeded() {
        let registry = RunRegistry::new();
        registry.start("demo", Round::One).await;
        let record = registry.get("demo", 1).await.unwrap();
        assert_eq!(record.state, RunState::Pending);
        assert!(record.finished_at.is_none());

        registry.succeed("demo", Round::One, outcome()).await;
        let record = registry.get("demo", 1).await.unwrap();
        assert_eq!(record.state, RunState::Succeeded);
        assert!(record.finished_at.is_some());
        assert_eq!(record.outcome.unwrap().commit_sha, "c");
    }

    #[tokio::test]
    async fn failure_records_the_error_detail() {
        let registry = RunRegistry::new();
        registry.start("demo", Round::Two).await;
        registry.fail("demo", Round::Two, "push step failed").await;
        let record = registry.get("demo", 2).await.unwrap();
        assert_eq!(record.state, RunState::Failed);
        assert_eq!(record.error.as_deref(), Some("push step failed"));
        assert!(record.outcome.is_none());
    }

    #[tokio::test]
    async fn rounds_are_tracked_independently() {
        let registry = RunRegistry::new();
        registry.start("demo", Round::One).await;
        registry.succeed("demo", Round::One, outcome()).await;
        registry.start("demo", Round::Two).await;

        assert_eq!(registry.get("demo", 1).await.unwrap().state, RunState::Succeeded);
        assert_eq!(registry.get("demo", 2).await.unwrap().state, RunState::Pending);
        assert!(registry.get("other", 1).await.is_none());
    }
}
