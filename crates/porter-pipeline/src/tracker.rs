//! Fail-Fast Batch Tracker
//!
//! Tracks the tasks of one batch and decides when the batch has failed. Both
//! batch importers and exporters submit tasks to a [`WorkerPool`](crate::pool::WorkerPool)
//! and hand the join handles to a tracker.
//!
//! ## Protocol
//!
//! ```text
//!             probe()/drain()
//!   Normal ───────────────────▶ first failure (fail_on_error)
//!     │                               │ abort every other task
//!     │                               ▼
//!     │                           Draining ── resolve every task, collect failures
//!     │                               │
//!     ▼                               ▼
//!   Ok(())                  Err(BatchFailure { every failed task })
//! ```
//!
//! - [`BatchTracker::probe`] resolves tasks that have already finished and
//!   leaves the rest queued in submission order.
//! - [`BatchTracker::drain`] resolves every task, waiting at most `max_wait`
//!   for each one; a task that runs longer counts as failed and is detached.
//! - Tasks cancelled by escalation are dropped without counting as failures.
//!   A panicking task counts as failed.
//!
//! Without `fail_on_error`, failures are logged at `warn` and otherwise
//! ignored: nothing is cancelled and no aggregate error is raised.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use porter_core::{BatchFailure, PortalDataError, Result};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, warn};

/// Kind of work a task performs, used in failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Import,
    Export,
}

impl TaskKind {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Import => "importing",
            Self::Export => "exporting",
        }
    }
}

/// A spawned task paired with a description of what it works on.
pub struct TaskHandle {
    handle: JoinHandle<Result<()>>,
    kind: TaskKind,
    description: String,
}

impl TaskHandle {
    pub fn new(handle: JoinHandle<Result<()>>, kind: TaskKind, description: impl Into<String>) -> Self {
        Self {
            handle,
            kind,
            description: description.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

/// How far a wait pass goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Resolve only tasks that have already finished.
    Probe,
    /// Resolve every task, waiting for each.
    Drain,
}

/// Whether the batch has seen a fatal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    Normal,
    /// A failure was seen; every remaining task is being resolved.
    Draining,
}

enum Outcome {
    Succeeded,
    Cancelled,
    Failed(String),
}

/// Tracks the tasks of one batch.
#[derive(Debug)]
pub struct BatchTracker {
    tasks: VecDeque<TaskHandle>,
    fail_on_error: bool,
    max_wait: Option<Duration>,
    phase: TrackerPhase,
}

impl BatchTracker {
    pub fn new(fail_on_error: bool, max_wait: Option<Duration>) -> Self {
        Self {
            tasks: VecDeque::new(),
            fail_on_error,
            max_wait,
            phase: TrackerPhase::Normal,
        }
    }

    /// Queue a submitted task.
    pub fn push(&mut self, task: TaskHandle) {
        self.tasks.push_back(task);
    }

    /// Number of tasks not yet resolved.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    /// Resolve finished tasks without waiting for running ones.
    ///
    /// # Errors
    ///
    /// With `fail_on_error`, a finished failed task escalates: every other task
    /// is aborted and resolved, and one [`BatchFailure`] naming every failure is
    /// returned.
    pub async fn probe(&mut self) -> Result<()> {
        self.wait(WaitMode::Probe).await
    }

    /// Resolve every task; the barrier between groups of a batch.
    pub async fn drain(&mut self) -> Result<()> {
        self.wait(WaitMode::Drain).await
    }

    async fn wait(&mut self, mode: WaitMode) -> Result<()> {
        let mut unfinished = VecDeque::new();
        let mut failures = Vec::new();

        while let Some(task) = self.tasks.pop_front() {
            let blocking = mode == WaitMode::Drain || self.phase == TrackerPhase::Draining;
            if !blocking && !task.is_finished() {
                unfinished.push_back(task);
                continue;
            }

            if let Outcome::Failed(description) = self.resolve(task).await {
                if self.fail_on_error {
                    failures.push(description);
                    if self.phase == TrackerPhase::Normal {
                        self.escalate(&mut unfinished);
                    }
                }
            }
        }

        self.tasks = unfinished;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(PortalDataError::Batch(BatchFailure::new(failures)))
        }
    }

    /// Abort every other task and switch to draining.
    fn escalate(&mut self, unfinished: &mut VecDeque<TaskHandle>) {
        while let Some(task) = unfinished.pop_back() {
            self.tasks.push_front(task);
        }
        for task in &self.tasks {
            task.handle.abort();
        }
        debug!(remaining = self.tasks.len(), "Batch failed, cancelling remaining tasks");
        self.phase = TrackerPhase::Draining;
    }

    async fn resolve(&self, task: TaskHandle) -> Outcome {
        let TaskHandle {
            handle,
            kind,
            description,
        } = task;
        let label = format!("{} {}", kind.verb(), description);

        let joined = match self.max_wait {
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    // Dropping the handle detaches the task; it is not aborted
                    self.report(&label, &format!("timed out after {:?}", limit));
                    return Outcome::Failed(label);
                }
            },
            None => handle.await,
        };

        match joined {
            Ok(Ok(())) => Outcome::Succeeded,
            Ok(Err(e)) => {
                self.report(&label, &error_chain(&e));
                Outcome::Failed(label)
            }
            Err(e) if e.is_cancelled() => {
                debug!(task = %label, "Task cancelled");
                Outcome::Cancelled
            }
            Err(e) => {
                self.report(&label, &panic_message(e));
                Outcome::Failed(label)
            }
        }
    }

    fn report(&self, label: &str, cause: &str) {
        if self.fail_on_error {
            error!(task = %label, "Failed {}: {}", label, cause);
        } else {
            warn!(task = %label, "Failed {}, continuing: {}", label, cause);
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn panic_message(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .map(|msg| format!("task panicked: {}", msg))
            .unwrap_or_else(|| "task panicked".to_string()),
        Err(e) => e.to_string(),
    }
}
