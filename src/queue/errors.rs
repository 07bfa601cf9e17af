//! # Queue Error Types
//!
//! Errors reported by a task queue service while creating groups, enqueueing units or
//! registering continuations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Group not found: {group}")]
    GroupNotFound { group: String },

    #[error("Group already completed: {group}: {operation}")]
    GroupCompleted { group: String, operation: String },

    #[error("Group is closed to new units: {group}")]
    GroupClosed { group: String },

    #[error("Continuation already registered for group: {group}")]
    ContinuationAlreadyRegistered { group: String },

    #[error("Unit not found: {unit}")]
    UnitNotFound { unit: String },

    #[error("Internal queue error: {message}")]
    Internal { message: String },
}

impl QueueError {
    /// Create a group not found error
    pub fn group_not_found(group: impl ToString) -> Self {
        Self::GroupNotFound {
            group: group.to_string(),
        }
    }

    /// Create an error for an operation attempted on a finished group
    pub fn group_completed(group: impl ToString, operation: impl Into<String>) -> Self {
        Self::GroupCompleted {
            group: group.to_string(),
            operation: operation.into(),
        }
    }

    /// Create a group closed error
    pub fn group_closed(group: impl ToString) -> Self {
        Self::GroupClosed {
            group: group.to_string(),
        }
    }

    /// Create a duplicate continuation error
    pub fn continuation_already_registered(group: impl ToString) -> Self {
        Self::ContinuationAlreadyRegistered {
            group: group.to_string(),
        }
    }

    /// Create a unit not found error
    pub fn unit_not_found(unit: impl ToString) -> Self {
        Self::UnitNotFound {
            unit: unit.to_string(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type for queue service operations
pub type QueueResult<T> = Result<T, QueueError>;
