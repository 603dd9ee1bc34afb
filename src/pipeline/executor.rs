//! Branch execution for the map stage
//!
//! Runs every work item through a caller-supplied branch function, either
//! one at a time or concurrently under a semaphore. A branch that errors or
//! panics yields a failed [`BranchOutcome`]; it never stops its siblings.

use super::errors::PipelineError;
use super::types::{Take, WorkItem};
use crate::error::Result;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};

/// How the map stage schedules its branches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Run branches one after another in dispatch order
    Sequential,
    /// Run up to `max_parallel` branches at once on the tokio runtime
    Parallel { max_parallel: usize },
}

impl ExecutionStrategy {
    pub fn from_max_parallel(max_parallel: usize) -> Self {
        if max_parallel <= 1 {
            ExecutionStrategy::Sequential
        } else {
            ExecutionStrategy::Parallel { max_parallel }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchStatus {
    Success,
    Failed(String),
}

/// Result of running one work item
#[derive(Debug, Clone)]
pub struct BranchOutcome {
    /// Dispatch index of the work item
    pub index: usize,
    pub notify_target: String,
    pub status: BranchStatus,
    /// Empty for failed branches
    pub takes: Vec<Take>,
    pub duration: Duration,
}

impl BranchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, BranchStatus::Success)
    }

    fn failed(index: usize, notify_target: String, error: String, duration: Duration) -> Self {
        Self {
            index,
            notify_target,
            status: BranchStatus::Failed(error),
            takes: Vec::new(),
            duration,
        }
    }
}

pub type BranchFuture = BoxFuture<'static, Result<Vec<Take>>>;

/// Execute every work item and collect one outcome per item.
///
/// Outcomes come back in completion order; callers that need dispatch order
/// sort on [`BranchOutcome::index`].
pub async fn execute_branches<F>(
    items: Vec<WorkItem>,
    strategy: ExecutionStrategy,
    branch: F,
) -> Vec<BranchOutcome>
where
    F: Fn(WorkItem) -> BranchFuture + Send + Sync + 'static,
{
    info!(
        "Executing {} branches ({:?})",
        items.len(),
        strategy
    );

    match strategy {
        ExecutionStrategy::Sequential => {
            let mut outcomes = Vec::with_capacity(items.len());
            for item in items {
                let index = item.index;
                let notify_target = item.roster.notify_target.clone();
                let span = branch_span(&item);
                let started = Instant::now();

                let outcome = match AssertUnwindSafe(run_branch(item, &branch))
                    .catch_unwind()
                    .instrument(span)
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        warn!("Branch {} ({}) panicked: {}", index, notify_target, message);
                        BranchOutcome::failed(
                            index,
                            notify_target,
                            format!("branch panicked: {message}"),
                            started.elapsed(),
                        )
                    }
                };
                outcomes.push(outcome);
            }
            outcomes
        }
        ExecutionStrategy::Parallel { max_parallel } => {
            execute_parallel(items, max_parallel, Arc::new(branch)).await
        }
    }
}

async fn execute_parallel<F>(
    items: Vec<WorkItem>,
    max_parallel: usize,
    branch: Arc<F>,
) -> Vec<BranchOutcome>
where
    F: Fn(WorkItem) -> BranchFuture + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));
    let mut running = FuturesUnordered::new();

    for item in items {
        let index = item.index;
        let notify_target = item.roster.notify_target.clone();
        let semaphore = semaphore.clone();
        let branch = branch.clone();
        let span = branch_span(&item);
        let spawned = Instant::now();

        let handle = tokio::spawn(
            async move {
                let started = Instant::now();
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return BranchOutcome::failed(
                            item.index,
                            item.roster.notify_target,
                            "semaphore closed".to_string(),
                            started.elapsed(),
                        )
                    }
                };
                run_branch(item, branch.as_ref()).await
            }
            .instrument(span),
        );

        running.push(async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Branch {} ({}) panicked: {}", index, notify_target, e);
                    BranchOutcome::failed(index, notify_target, e.to_string(), spawned.elapsed())
                }
            }
        });
    }

    let mut outcomes = Vec::new();
    while let Some(outcome) = running.next().await {
        outcomes.push(outcome);
    }
    outcomes
}

async fn run_branch<F>(item: WorkItem, branch: &F) -> BranchOutcome
where
    F: Fn(WorkItem) -> BranchFuture,
{
    let index = item.index;
    let notify_target = item.roster.notify_target.clone();
    let started = Instant::now();

    match branch(item).await {
        Ok(takes) => {
            debug!("Branch produced {} takes", takes.len());
            BranchOutcome {
                index,
                notify_target,
                status: BranchStatus::Success,
                takes,
                duration: started.elapsed(),
            }
        }
        Err(e) => {
            let error = PipelineError::branch(notify_target.clone(), e);
            warn!("Branch {}: {}", index, error);
            BranchOutcome::failed(index, notify_target, error.to_string(), started.elapsed())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn branch_span(item: &WorkItem) -> tracing::Span {
    info_span!(
        "branch",
        index = item.index,
        target = %item.roster.notify_target
    )
}
