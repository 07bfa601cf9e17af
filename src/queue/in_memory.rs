//! # In-Memory Task Queue
//!
//! Thread-safe in-memory implementation of [`TaskQueueService`] for testing and
//! development.
//!
//! ## Features
//!
//! - **Group Tree**: Groups nest under a parent and only complete once their units and
//!   child groups are finished and their own continuation has been handled
//! - **Unit Contract**: Only declared task types are executable units
//! - **Event Log**: Every group and unit transition is appended to an inspectable log
//!
//! ## Retention
//!
//! The queue is unbounded: groups, the opening order and the event log are kept for
//! the lifetime of the queue so tests can inspect them afterwards. Use one queue per
//! test or development session rather than a long-lived instance.
//!
//! Units and completions are handed out through [`InMemoryTaskQueue::take_ready_unit`]
//! and [`InMemoryTaskQueue::take_completion`]; [`super::InMemoryWorker`] drives both.

use std::collections::{HashMap, VecDeque};
use std::future::Future;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashSet;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use super::errors::{QueueError, QueueResult};
use super::traits::TaskQueueService;
use super::types::{
    ContinuationRecord, GroupCompletion, GroupId, GroupStatus, QueueEvent, QueueEventKind,
    UnitHandle, UnitId, UnitOutcome,
};
use crate::models::{TaskDescriptor, TaskType};

tokio::task_local! {
    static CURRENT_GROUP: GroupId;
}

/// Run `future` as if it were a unit executing inside `group`.
///
/// Inside the future, [`InMemoryTaskQueue::current_enclosing_group`] reports `group`.
pub async fn within_group<F>(group: GroupId, future: F) -> F::Output
where
    F: Future,
{
    CURRENT_GROUP.scope(group, future).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupLifecycle {
    Open,
    Closed,
    /// Completion handed to a worker; continuation not yet handled
    Completing,
    Complete,
}

#[derive(Debug)]
struct GroupState {
    parent: Option<GroupId>,
    description: String,
    lifecycle: GroupLifecycle,
    total_units: usize,
    pending_units: usize,
    failed_units: usize,
    pending_children: usize,
    continuation: Option<ContinuationRecord>,
}

impl GroupState {
    fn new(parent: Option<GroupId>, description: &str) -> Self {
        Self {
            parent,
            description: description.to_string(),
            lifecycle: GroupLifecycle::Open,
            total_units: 0,
            pending_units: 0,
            failed_units: 0,
            pending_children: 0,
            continuation: None,
        }
    }

    fn is_finishing(&self) -> bool {
        matches!(
            self.lifecycle,
            GroupLifecycle::Completing | GroupLifecycle::Complete
        )
    }

    fn status(&self) -> GroupStatus {
        GroupStatus {
            total_units: self.total_units,
            failed_units: self.failed_units,
        }
    }
}

/// A unit waiting for a worker.
#[derive(Debug, Clone)]
pub struct PendingUnit {
    pub handle: UnitHandle,
    pub args: Vec<Value>,
}

/// Point-in-time view of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub group: GroupId,
    pub parent: Option<GroupId>,
    pub description: String,
    pub status: GroupStatus,
    pub pending_units: usize,
    pub pending_children: usize,
    pub complete: bool,
}

#[derive(Debug, Default)]
struct QueueState {
    groups: HashMap<GroupId, GroupState>,
    /// Group ids in opening order
    opened: Vec<GroupId>,
    ready: VecDeque<PendingUnit>,
    in_flight: HashMap<UnitId, GroupId>,
    completions: VecDeque<GroupId>,
    events: Vec<QueueEvent>,
}

impl QueueState {
    fn record(&mut self, kind: QueueEventKind) {
        let sequence = self.events.len() as u64 + 1;
        trace!(sequence = sequence, event = ?kind, "queue event");
        self.events.push(QueueEvent {
            sequence,
            recorded_at: Utc::now(),
            kind,
        });
    }

    fn group_mut(&mut self, group: &GroupId) -> QueueResult<&mut GroupState> {
        self.groups
            .get_mut(group)
            .ok_or_else(|| QueueError::group_not_found(group))
    }

    /// Queue the group's completion once nothing inside it is outstanding.
    fn try_complete(&mut self, group: &GroupId) {
        let Some(state) = self.groups.get_mut(group) else {
            return;
        };
        if state.lifecycle == GroupLifecycle::Closed
            && state.pending_units == 0
            && state.pending_children == 0
        {
            state.lifecycle = GroupLifecycle::Completing;
            self.completions.push_back(group.clone());
        }
    }
}

/// In-memory group-tracking task queue.
///
/// Nothing is pruned: completed groups and every [`QueueEvent`] stay in memory.
#[derive(Debug, Default)]
pub struct InMemoryTaskQueue {
    state: Mutex<QueueState>,
    task_types: DashSet<TaskType>,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `task_type` as an executable unit
    pub fn declare_task_type(&self, task_type: impl Into<TaskType>) {
        self.task_types.insert(task_type.into());
    }

    /// Next unit waiting for a worker, marking it in flight
    pub fn take_ready_unit(&self) -> Option<PendingUnit> {
        let mut state = self.state.lock();
        let unit = state.ready.pop_front()?;
        state
            .in_flight
            .insert(unit.handle.unit_id.clone(), unit.handle.group.clone());
        Some(unit)
    }

    /// Record the terminal outcome of an in-flight unit
    pub fn acknowledge_unit(&self, handle: &UnitHandle, outcome: &UnitOutcome) -> QueueResult<()> {
        let mut state = self.state.lock();
        let group = state
            .in_flight
            .remove(&handle.unit_id)
            .ok_or_else(|| QueueError::unit_not_found(&handle.unit_id))?;

        let group_state = state.group_mut(&group)?;
        group_state.pending_units = group_state.pending_units.saturating_sub(1);
        if !outcome.is_success() {
            group_state.failed_units += 1;
        }

        state.record(QueueEventKind::UnitFinished {
            group: group.clone(),
            unit: handle.unit_id.clone(),
            succeeded: outcome.is_success(),
        });
        state.try_complete(&group);
        Ok(())
    }

    /// Next finished group whose continuation has to be handled.
    ///
    /// The group stays outstanding in its parent until [`Self::finish_group`].
    pub fn take_completion(&self) -> Option<GroupCompletion> {
        let mut state = self.state.lock();
        let group = state.completions.pop_front()?;
        let group_state = state.groups.get_mut(&group)?;
        let completion = GroupCompletion {
            group: group.clone(),
            parent: group_state.parent.clone(),
            description: group_state.description.clone(),
            status: group_state.status(),
            continuation: group_state.continuation.take(),
        };
        if completion.continuation.is_some() {
            state.record(QueueEventKind::ContinuationFired {
                group: group.clone(),
            });
        }
        Some(completion)
    }

    /// Mark a group complete after its continuation was handled and propagate to the parent
    pub fn finish_group(&self, group: &GroupId) -> QueueResult<()> {
        let mut state = self.state.lock();
        let group_state = state.group_mut(group)?;
        if group_state.lifecycle != GroupLifecycle::Completing {
            return Err(QueueError::internal(format!(
                "group {group} finished while {:?}",
                group_state.lifecycle
            )));
        }
        group_state.lifecycle = GroupLifecycle::Complete;
        let parent = group_state.parent.clone();

        state.record(QueueEventKind::GroupCompleted {
            group: group.clone(),
        });

        if let Some(parent) = parent {
            let parent_state = state.group_mut(&parent)?;
            parent_state.pending_children = parent_state.pending_children.saturating_sub(1);
            state.try_complete(&parent);
        }
        Ok(())
    }

    pub fn has_ready_units(&self) -> bool {
        !self.state.lock().ready.is_empty()
    }

    pub fn has_pending_completions(&self) -> bool {
        !self.state.lock().completions.is_empty()
    }

    /// Groups that have not completed yet
    pub fn incomplete_groups(&self) -> Vec<GroupId> {
        let state = self.state.lock();
        state
            .opened
            .iter()
            .filter(|id| {
                state
                    .groups
                    .get(*id)
                    .is_some_and(|g| g.lifecycle != GroupLifecycle::Complete)
            })
            .cloned()
            .collect()
    }

    /// Every group ever opened, in opening order
    pub fn opened_groups(&self) -> Vec<GroupId> {
        self.state.lock().opened.clone()
    }

    pub fn group_count(&self) -> usize {
        self.state.lock().opened.len()
    }

    pub fn group_snapshot(&self, group: &GroupId) -> Option<GroupSnapshot> {
        let state = self.state.lock();
        state.groups.get(group).map(|g| GroupSnapshot {
            group: group.clone(),
            parent: g.parent.clone(),
            description: g.description.clone(),
            status: g.status(),
            pending_units: g.pending_units,
            pending_children: g.pending_children,
            complete: g.lifecycle == GroupLifecycle::Complete,
        })
    }

    /// Copy of the event log
    pub fn events(&self) -> Vec<QueueEvent> {
        self.state.lock().events.clone()
    }

    /// Task types of every enqueued unit, in enqueue order
    pub fn enqueued_task_types(&self) -> Vec<TaskType> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match &event.kind {
                QueueEventKind::UnitEnqueued { task_type, .. } => Some(task_type.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl TaskQueueService for InMemoryTaskQueue {
    async fn open_group(
        &self,
        parent: Option<&GroupId>,
        description: &str,
    ) -> QueueResult<GroupId> {
        let mut state = self.state.lock();
        if let Some(parent) = parent {
            let parent_state = state.group_mut(parent)?;
            if parent_state.is_finishing() {
                return Err(QueueError::group_completed(parent, "open_group"));
            }
            parent_state.pending_children += 1;
        }

        let group = GroupId::new();
        state
            .groups
            .insert(group.clone(), GroupState::new(parent.cloned(), description));
        state.opened.push(group.clone());
        state.record(QueueEventKind::GroupOpened {
            group: group.clone(),
            parent: parent.cloned(),
            description: description.to_string(),
        });

        debug!(group = %group, parent = ?parent, description = %description, "Opened group");
        Ok(group)
    }

    async fn enqueue(
        &self,
        group: &GroupId,
        descriptor: &TaskDescriptor,
    ) -> QueueResult<UnitHandle> {
        let mut state = self.state.lock();
        let group_state = state.group_mut(group)?;
        match group_state.lifecycle {
            GroupLifecycle::Open => {}
            GroupLifecycle::Closed => return Err(QueueError::group_closed(group)),
            GroupLifecycle::Completing | GroupLifecycle::Complete => {
                return Err(QueueError::group_completed(group, "enqueue"))
            }
        }
        group_state.total_units += 1;
        group_state.pending_units += 1;

        let handle = UnitHandle {
            unit_id: UnitId::new(),
            group: group.clone(),
            task_type: descriptor.task_type.clone(),
        };
        state.ready.push_back(PendingUnit {
            handle: handle.clone(),
            args: descriptor.args.clone(),
        });
        state.record(QueueEventKind::UnitEnqueued {
            group: group.clone(),
            unit: handle.unit_id.clone(),
            task_type: descriptor.task_type.clone(),
        });
        Ok(handle)
    }

    async fn register_continuation(
        &self,
        group: &GroupId,
        record: ContinuationRecord,
    ) -> QueueResult<()> {
        let mut state = self.state.lock();
        let group_state = state.group_mut(group)?;
        if group_state.is_finishing() {
            return Err(QueueError::group_completed(group, "register_continuation"));
        }
        if group_state.continuation.is_some() {
            return Err(QueueError::continuation_already_registered(group));
        }
        group_state.continuation = Some(record);
        Ok(())
    }

    async fn close_group(&self, group: &GroupId) -> QueueResult<()> {
        let mut state = self.state.lock();
        let group_state = state.group_mut(group)?;
        if group_state.lifecycle != GroupLifecycle::Open {
            return Err(QueueError::group_closed(group));
        }
        group_state.lifecycle = GroupLifecycle::Closed;
        state.record(QueueEventKind::GroupClosed {
            group: group.clone(),
        });
        state.try_complete(group);
        Ok(())
    }

    fn current_enclosing_group(&self) -> Option<GroupId> {
        CURRENT_GROUP.try_with(|group| group.clone()).ok()
    }

    fn satisfies_unit_contract(&self, task_type: &TaskType) -> bool {
        self.task_types.contains(task_type)
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}
