//! # Orchestration Types
//!
//! The owner-facing contract of an orchestration (step declarations plus completion
//! hooks) and the values reported back to it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::builder::WorkflowBuilder;
use crate::error::BuildError;
use crate::queue::GroupId;

/// A named multi-step process.
///
/// `declare_steps` records the steps for one invocation; the hooks run once the last
/// step's group has completed, possibly in a different process than the one that
/// scheduled the first step.
#[async_trait]
pub trait Orchestration: Send + Sync + 'static {
    /// Registry name; also the task type when the orchestration runs as a unit
    fn name(&self) -> &str;

    fn declare_steps(&self, steps: &mut WorkflowBuilder, args: &[Value])
        -> Result<(), BuildError>;

    /// Runs once after the whole workflow finished, whether or not units failed
    async fn on_complete(&self, _status: &CompletionStatus, _args: &[Value]) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after `on_complete` when every unit succeeded
    async fn on_success(&self, _status: &CompletionStatus, _args: &[Value]) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Summary handed to the completion hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionStatus {
    pub orchestration: String,
    pub steps: usize,
    pub total_units: usize,
    pub failed_units: usize,
    pub completed_at: DateTime<Utc>,
}

impl CompletionStatus {
    pub fn is_success(&self) -> bool {
        self.failed_units == 0
    }
}

/// What `execute` did before returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The first step's group is armed; the rest follows through continuations
    Scheduled { first_group: GroupId },
    /// Empty workflow: completion hooks already ran
    CompletedImmediately,
}

impl ExecutionOutcome {
    pub fn first_group(&self) -> Option<&GroupId> {
        match self {
            ExecutionOutcome::Scheduled { first_group } => Some(first_group),
            ExecutionOutcome::CompletedImmediately => None,
        }
    }
}
