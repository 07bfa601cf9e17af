//! Error types for the sequencer.
//!

use crate::models::TaskType;
use crate::queue::QueueError;
use thiserror::Error;

/// Errors raised while recording step declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("in_parallel blocks cannot be nested inside another in_parallel block")]
    NestedParallel,
    #[error("task type cannot be empty")]
    EmptyTaskType,
}

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// A referenced task type is not an executable unit for the queue service.
    #[error("Contract violation: task type {task_type} in step {step_index} is not an executable unit")]
    ContractViolation {
        task_type: TaskType,
        step_index: usize,
    },

    #[error("Unknown orchestration: {0}")]
    UnknownOrchestration(String),

    #[error("Orchestration already registered: {0}")]
    DuplicateOrchestration(String),

    #[error("Queue service error: {0}")]
    ExternalService(#[from] QueueError),

    #[error("Continuation error: {0}")]
    Continuation(String),

    #[error("Completion hook failed for {orchestration}: {message}")]
    CompletionHook {
        orchestration: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<serde_json::Error> for SequencerError {
    fn from(error: serde_json::Error) -> Self {
        SequencerError::Continuation(format!("JSON serialization error: {error}"))
    }
}

impl From<config::ConfigError> for SequencerError {
    fn from(error: config::ConfigError) -> Self {
        SequencerError::Configuration(error.to_string())
    }
}

impl SequencerError {
    /// Whether the error was raised before anything was handed to the queue service.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Build(_) | Self::ContractViolation { .. } | Self::UnknownOrchestration(_)
        )
    }
}

pub type SequencerResult<T> = std::result::Result<T, SequencerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation_message_names_type_and_step() {
        let err = SequencerError::ContractViolation {
            task_type: TaskType::new("ChargeCard"),
            step_index: 2,
        };
        let message = err.to_string();
        assert!(message.contains("ChargeCard"));
        assert!(message.contains("step 2"));
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_queue_errors_are_not_validation_errors() {
        let err: SequencerError = QueueError::group_not_found("g-1").into();
        assert!(matches!(err, SequencerError::ExternalService(_)));
        assert!(!err.is_validation_error());
    }
}
