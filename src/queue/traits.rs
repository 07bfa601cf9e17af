//! # Queue Service Traits
//!
//! The collaborator contract the orchestration core schedules against, plus the two
//! callbacks a queue worker drives: executable units and group continuations.

use async_trait::async_trait;
use serde_json::Value;

use super::errors::QueueResult;
use super::types::{ContinuationRecord, GroupCompletion, GroupId, UnitHandle};
use crate::error::SequencerResult;
use crate::models::{TaskDescriptor, TaskType};

/// Group-tracking task queue.
///
/// Implementations must uphold the completion contract the executor relies on:
///
/// - A group completes exactly once, after it was closed, every unit in it reached a
///   terminal state (success or failure) and every child group completed.
/// - A group stays outstanding in its parent until its continuation has been handled,
///   so a continuation may open new children of that parent without racing its
///   completion.
#[async_trait]
pub trait TaskQueueService: Send + Sync + 'static {
    /// Open a new group, optionally nested in `parent`. An open group never completes.
    async fn open_group(&self, parent: Option<&GroupId>, description: &str)
        -> QueueResult<GroupId>;

    /// Enqueue one unit into an open group.
    async fn enqueue(&self, group: &GroupId, descriptor: &TaskDescriptor)
        -> QueueResult<UnitHandle>;

    /// Attach the continuation record handed back when `group` completes.
    async fn register_continuation(
        &self,
        group: &GroupId,
        record: ContinuationRecord,
    ) -> QueueResult<()>;

    /// Stop accepting units; the group may now complete.
    async fn close_group(&self, group: &GroupId) -> QueueResult<()>;

    /// Group tracking the unit currently executing, if any.
    fn current_enclosing_group(&self) -> Option<GroupId>;

    /// Whether `task_type` names an executable unit for this service.
    fn satisfies_unit_contract(&self, task_type: &TaskType) -> bool;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str {
        "unknown"
    }
}

/// Business logic behind a task type.
#[async_trait]
pub trait TaskUnit: Send + Sync + 'static {
    async fn perform(&self, args: &[Value]) -> anyhow::Result<()>;
}

/// Receives group completions from a queue worker.
#[async_trait]
pub trait ContinuationHandler: Send + Sync {
    async fn on_group_complete(&self, completion: GroupCompletion) -> SequencerResult<()>;
}
