//! # Queue Service Types
//!
//! Identifiers and records exchanged with a task queue service.

use crate::models::TaskType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Identity of a tracked group of units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one enqueued unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(Uuid);

impl UnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned by `enqueue`; identifies the unit and the group tracking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitHandle {
    pub unit_id: UnitId,
    pub group: GroupId,
    pub task_type: TaskType,
}

/// Persisted continuation, stored with the group it belongs to.
///
/// The record is plain data: whichever process observes the group's completion
/// rebuilds its state from `payload` and routes on `handler`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationRecord {
    pub handler: String,
    pub payload: Value,
}

impl ContinuationRecord {
    pub fn new(handler: impl Into<String>, payload: Value) -> Self {
        Self {
            handler: handler.into(),
            payload,
        }
    }
}

/// Unit counters of a finished group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStatus {
    pub total_units: usize,
    pub failed_units: usize,
}

impl GroupStatus {
    pub fn succeeded_units(&self) -> usize {
        self.total_units.saturating_sub(self.failed_units)
    }

    pub fn is_success(&self) -> bool {
        self.failed_units == 0
    }
}

/// Delivered to a continuation handler once a group has finished.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCompletion {
    pub group: GroupId,
    pub parent: Option<GroupId>,
    pub description: String,
    pub status: GroupStatus,
    pub continuation: Option<ContinuationRecord>,
}

/// Terminal state of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitOutcome {
    Succeeded,
    Failed { reason: String },
}

impl UnitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UnitOutcome::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QueueEventKind {
    GroupOpened {
        group: GroupId,
        parent: Option<GroupId>,
        description: String,
    },
    UnitEnqueued {
        group: GroupId,
        unit: UnitId,
        task_type: TaskType,
    },
    GroupClosed {
        group: GroupId,
    },
    UnitFinished {
        group: GroupId,
        unit: UnitId,
        succeeded: bool,
    },
    ContinuationFired {
        group: GroupId,
    },
    GroupCompleted {
        group: GroupId,
    },
}

/// Entry of the append-only event log kept by the in-memory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEvent {
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: QueueEventKind,
}
