//! # In-Memory Worker
//!
//! Drives an [`InMemoryTaskQueue`]: runs ready units concurrently, acknowledges their
//! outcomes and hands finished groups to a [`ContinuationHandler`].
//!
//! ```text
//! loop:
//!   handle every queued completion -> finish_group (may complete the parent)
//!   spawn ready units up to `concurrency`
//!   wait for one unit -> acknowledge outcome
//! until no unit is running, ready or completing
//! ```
//!
//! Each unit runs inside [`within_group`], so a unit that itself schedules an
//! orchestration sees its own group as the enclosing group.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::errors::QueueResult;
use super::in_memory::{within_group, InMemoryTaskQueue, PendingUnit};
use super::traits::{ContinuationHandler, TaskUnit};
use super::types::{GroupId, UnitHandle, UnitOutcome};
use crate::config::WorkerConfig;
use crate::models::TaskType;
use crate::registry::UnitRegistry;

/// What a `run_until_idle` pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub units_succeeded: usize,
    pub units_failed: usize,
    pub groups_completed: usize,
    pub continuation_errors: usize,
    /// Groups still incomplete once the worker went idle
    pub stalled_groups: Vec<GroupId>,
}

impl WorkerReport {
    pub fn units_run(&self) -> usize {
        self.units_succeeded + self.units_failed
    }
}

#[derive(Debug)]
pub struct InMemoryWorker {
    queue: Arc<InMemoryTaskQueue>,
    units: UnitRegistry,
    concurrency: usize,
}

impl InMemoryWorker {
    pub fn new(queue: Arc<InMemoryTaskQueue>, config: &WorkerConfig) -> Self {
        Self {
            queue,
            units: UnitRegistry::new(),
            concurrency: config.concurrency.max(1),
        }
    }

    pub fn queue(&self) -> &Arc<InMemoryTaskQueue> {
        &self.queue
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    /// Register unit logic and declare its type executable on the queue
    pub fn register_unit(&self, task_type: impl Into<TaskType>, unit: Arc<dyn TaskUnit>) {
        let task_type = task_type.into();
        self.queue.declare_task_type(task_type.clone());
        self.units.register(task_type, unit);
    }

    /// Run units and continuations until nothing is left to do
    pub async fn run_until_idle(
        &self,
        handler: &dyn ContinuationHandler,
    ) -> QueueResult<WorkerReport> {
        let mut running: JoinSet<(UnitHandle, UnitOutcome)> = JoinSet::new();
        let mut report = WorkerReport::default();

        loop {
            while let Some(completion) = self.queue.take_completion() {
                let group = completion.group.clone();
                debug!(
                    group = %group,
                    description = %completion.description,
                    total_units = completion.status.total_units,
                    failed_units = completion.status.failed_units,
                    "Group finished"
                );
                if let Err(e) = handler.on_group_complete(completion).await {
                    error!(group = %group, error = %e, "Continuation failed");
                    report.continuation_errors += 1;
                }
                self.queue.finish_group(&group)?;
                report.groups_completed += 1;
            }

            while running.len() < self.concurrency {
                let Some(unit) = self.queue.take_ready_unit() else {
                    break;
                };
                self.spawn_unit(&mut running, unit);
            }

            match running.join_next().await {
                Some(Ok((handle, outcome))) => {
                    if outcome.is_success() {
                        report.units_succeeded += 1;
                    } else {
                        report.units_failed += 1;
                    }
                    self.queue.acknowledge_unit(&handle, &outcome)?;
                }
                Some(Err(join_error)) => {
                    // The unit future is awaited inside the spawned task, so only a
                    // cancelled runtime lands here.
                    error!(error = %join_error, "Unit runner task aborted");
                }
                None => {
                    if !self.queue.has_ready_units() && !self.queue.has_pending_completions() {
                        break;
                    }
                }
            }
        }

        report.stalled_groups = self.queue.incomplete_groups();
        if !report.stalled_groups.is_empty() {
            warn!(
                stalled_groups = report.stalled_groups.len(),
                "Worker idle with incomplete groups"
            );
        }
        info!(
            units_succeeded = report.units_succeeded,
            units_failed = report.units_failed,
            groups_completed = report.groups_completed,
            "Worker idle"
        );
        Ok(report)
    }

    fn spawn_unit(&self, running: &mut JoinSet<(UnitHandle, UnitOutcome)>, pending: PendingUnit) {
        let PendingUnit { handle, args } = pending;
        let unit = self.units.resolve(&handle.task_type);

        running.spawn(async move {
            let Some(unit) = unit else {
                warn!(task_type = %handle.task_type, "No unit registered for task type");
                let reason = format!("no unit registered for {}", handle.task_type);
                return (handle, UnitOutcome::Failed { reason });
            };

            let group = handle.group.clone();
            let task = tokio::spawn(within_group(group, async move {
                unit.perform(&args).await
            }));

            let outcome = match task.await {
                Ok(Ok(())) => UnitOutcome::Succeeded,
                Ok(Err(e)) => {
                    warn!(task_type = %handle.task_type, unit = %handle.unit_id, error = %e, "Unit failed");
                    UnitOutcome::Failed {
                        reason: format!("{e:#}"),
                    }
                }
                Err(join_error) => {
                    error!(task_type = %handle.task_type, unit = %handle.unit_id, error = %join_error, "Unit panicked");
                    UnitOutcome::Failed {
                        reason: format!("unit panicked: {join_error}"),
                    }
                }
            };
            (handle, outcome)
        });
    }
}
