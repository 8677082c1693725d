//! The round orchestration pipeline.
//!
//! One call to [`run`] is one round: a sequence of external steps driven in
//! order, with any failure aborting the remaining steps. Round 1 creates a
//! repository and generates a fresh project; round 2 fetches the published
//! project and asks the generation service for targeted changes. Both end
//! by publishing the snapshot, enabling hosting, and delivering the outcome
//! to the evaluation callback.
//!
//! Errors never propagate to the HTTP caller — the acknowledgement was sent
//! before the run started. A failed run is logged and recorded in the run
//! registry; no callback is sent for it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::context::ServiceContext;
use crate::locks::TaskLocks;
use crate::ports::generator::SiteBrief;
use crate::ports::notifier::RoundOutcome;
use crate::retry;
use crate::snapshot::{self, SnapshotError};
use crate::status::RunRegistry;
use crate::task::{Round, TaskRequest};

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// A pipeline step that talks to an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Round 1: create the repository.
    CreateRepo,
    /// Round 2: fetch the published snapshot.
    FetchFiles,
    /// Round 1: generate a fresh snapshot.
    Generate,
    /// Round 2: apply targeted changes to the fetched snapshot.
    Modify,
    /// Publish the snapshot to the repository.
    Push,
    /// Enable static hosting.
    EnableHosting,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::CreateRepo => "repository create",
            Step::FetchFiles => "file fetch",
            Step::Generate => "site generation",
            Step::Modify => "site modification",
            Step::Push => "publish",
            Step::EnableHosting => "hosting enable",
        };
        f.write_str(name)
    }
}

/// Why a round aborted.
#[derive(Debug, Error)]
pub enum RoundError {
    /// An external step failed after exhausting its retries.
    #[error("{step} failed: {source}")]
    Step {
        /// The step that failed.
        step: Step,
        /// The underlying error from the port.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The generation service returned a malformed snapshot.
    #[error("generated snapshot rejected: {0}")]
    InvalidSnapshot(#[from] SnapshotError),
}

fn at(step: Step) -> impl FnOnce(Box<dyn std::error::Error + Send + Sync>) -> RoundError {
    move |source| RoundError::Step { step, source }
}

fn site_brief(request: &TaskRequest) -> SiteBrief {
    SiteBrief {
        brief: request.brief.clone(),
        attachments: request.attachments.clone(),
        checks: request.checks.clone(),
    }
}

/// Runs one round end to end: step sequencing, outcome assembly, callback
/// delivery, and registry bookkeeping.
///
/// A concurrent run for the same task name causes this one to be rejected
/// before any external call is made.
pub async fn run(
    ctx: Arc<ServiceContext>,
    registry: Arc<RunRegistry>,
    locks: Arc<TaskLocks>,
    request: TaskRequest,
) {
    let Some(_guard) = locks.acquire(&request.task) else {
        tracing::warn!(
            task = %request.task,
            "rejecting duplicate submission: a run is already active for this task"
        );
        return;
    };
    registry.start(&request.task, request.round).await;
    tracing::info!(task = %request.task, round = %request.round, "pipeline run started");

    let result = match request.round {
        Round::One => round_one(&ctx, &request).await,
        Round::Two => round_two(&ctx, &request).await,
    };

    match result {
        Ok(outcome) => {
            // Single-shot delivery; a failed callback does not fail the run.
            if let Err(err) = ctx.notifier.notify(&request.evaluation_url, &outcome).await {
                tracing::warn!(task = %request.task, error = %err, "callback delivery failed");
            }
            tracing::info!(task = %request.task, round = %request.round, "pipeline run succeeded");
            registry.succeed(&request.task, request.round, outcome).await;
        }
        Err(err) => {
            tracing::error!(
                task = %request.task,
                round = %request.round,
                error = %err,
                "pipeline run failed"
            );
            registry.fail(&request.task, request.round, &err.to_string()).await;
        }
    }
}

/// Round 1: create → generate → push → enable hosting.
async fn round_one(
    ctx: &ServiceContext,
    request: &TaskRequest,
) -> Result<RoundOutcome, RoundError> {
    let created = retry::with_backoff("repository create", RETRY_ATTEMPTS, RETRY_BASE_DELAY, || {
        ctx.repo.create(&request.task)
    })
    .await
    .map_err(at(Step::CreateRepo))?;

    let brief = site_brief(request);
    let files = retry::with_backoff("site generation", RETRY_ATTEMPTS, RETRY_BASE_DELAY, || {
        ctx.generator.generate(&brief)
    })
    .await
    .map_err(at(Step::Generate))?;
    snapshot::validate(&files)?;

    let commit_sha = retry::with_backoff("publish", RETRY_ATTEMPTS, RETRY_BASE_DELAY, || {
        ctx.repo.push(&request.task, &files)
    })
    .await
    .map_err(at(Step::Push))?;

    let hosted = retry::with_backoff("hosting enable", RETRY_ATTEMPTS, RETRY_BASE_DELAY, || {
        ctx.repo.enable_hosting(&request.task)
    })
    .await
    .map_err(at(Step::EnableHosting))?;

    Ok(RoundOutcome {
        email: request.email.clone(),
        task: request.task.clone(),
        round: request.round,
        nonce: request.nonce.clone(),
        repo_url: created.repo_url,
        commit_sha,
        pages_url: hosted.pages_url,
    })
}

/// Round 2: fetch → modify → push → enable hosting.
///
/// A modification failure aborts the round rather than republishing the
/// fetched files unmodified; a silent no-op commit would report success for
/// work that was never done.
async fn round_two(
    ctx: &ServiceContext,
    request: &TaskRequest,
) -> Result<RoundOutcome, RoundError> {
    let existing = retry::with_backoff("file fetch", RETRY_ATTEMPTS, RETRY_BASE_DELAY, || {
        ctx.repo.fetch(&request.task)
    })
    .await
    .map_err(at(Step::FetchFiles))?;

    let brief = site_brief(request);
    let files = retry::with_backoff("site modification", RETRY_ATTEMPTS, RETRY_BASE_DELAY, || {
        ctx.generator.modify(&existing, &brief)
    })
    .await
    .map_err(at(Step::Modify))?;
    snapshot::validate(&files)?;

    let commit_sha = retry::with_backoff("publish", RETRY_ATTEMPTS, RETRY_BASE_DELAY, || {
        ctx.repo.push(&request.task, &files)
    })
    .await
    .map_err(at(Step::Push))?;

    let hosted = retry::with_backoff("hosting enable", RETRY_ATTEMPTS, RETRY_BASE_DELAY, || {
        ctx.repo.enable_hosting(&request.task)
    })
    .await
    .map_err(at(Step::EnableHosting))?;

    Ok(RoundOutcome {
        email: request.email.clone(),
        task: request.task.clone(),
        round: request.round,
        nonce: request.nonce.clone(),
        repo_url: hosted.repo_url,
        commit_sha,
        pages_url: hosted.pages_url,
    })
}
