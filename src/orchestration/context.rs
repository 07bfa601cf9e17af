//! # Execution Context
//!
//! Per-invocation state of one running orchestration. The context travels between
//! steps as the payload of each step group's continuation record, so the process that
//! handles a group's completion can resume without sharing memory with the process
//! that scheduled it.

use crate::constants::STEP_CONTINUATION_HANDLER;
use crate::error::{SequencerError, SequencerResult};
use crate::models::{StepNode, Workflow};
use crate::queue::{ContinuationRecord, GroupId, GroupStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Registered name of the owning orchestration
    pub orchestration: String,
    /// Arguments the orchestration was invoked with
    pub original_args: Vec<Value>,
    pub workflow: Workflow,
    /// Index of the next step to schedule; `workflow[next_step..]` remains
    pub next_step: usize,
    pub enclosing_group: Option<GroupId>,
    /// Units finished over the completed steps
    pub total_units: usize,
    pub failed_units: usize,
}

impl ExecutionContext {
    pub fn new(
        orchestration: impl Into<String>,
        original_args: Vec<Value>,
        workflow: Workflow,
        enclosing_group: Option<GroupId>,
    ) -> Self {
        Self {
            orchestration: orchestration.into(),
            original_args,
            workflow,
            next_step: 0,
            enclosing_group,
            total_units: 0,
            failed_units: 0,
        }
    }

    pub fn current_step(&self) -> Option<&StepNode> {
        self.workflow.step(self.next_step)
    }

    pub fn remaining_steps(&self) -> &[StepNode] {
        let steps = self.workflow.steps();
        &steps[self.next_step.min(steps.len())..]
    }

    pub fn is_finished(&self) -> bool {
        self.next_step >= self.workflow.len()
    }

    /// Context to resume from once the current step's group completes
    pub fn advanced(&self) -> Self {
        Self {
            next_step: self.next_step + 1,
            ..self.clone()
        }
    }

    /// Fold a finished group's counters into the running totals
    pub fn record_group_status(&mut self, status: &GroupStatus) {
        self.total_units += status.total_units;
        self.failed_units += status.failed_units;
    }

    pub fn to_record(&self) -> SequencerResult<ContinuationRecord> {
        Ok(ContinuationRecord::new(
            STEP_CONTINUATION_HANDLER,
            serde_json::to_value(self)?,
        ))
    }

    pub fn from_record(record: &ContinuationRecord) -> SequencerResult<Self> {
        if record.handler != STEP_CONTINUATION_HANDLER {
            return Err(SequencerError::Continuation(format!(
                "unexpected continuation handler: {}",
                record.handler
            )));
        }
        Ok(serde_json::from_value(record.payload.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskDescriptor;
    use serde_json::json;

    fn context() -> ExecutionContext {
        let workflow = Workflow::new(vec![
            StepNode::Single(TaskDescriptor::new("A", [json!(1)])),
            StepNode::Parallel(vec![
                TaskDescriptor::new("B", []),
                TaskDescriptor::new("C", []),
            ]),
        ]);
        ExecutionContext::new("checkout", vec![json!(1)], workflow, Some(GroupId::new()))
    }

    #[test]
    fn test_advancing_walks_the_remaining_suffix() {
        let ctx = context();
        assert_eq!(ctx.remaining_steps().len(), 2);
        let ctx = ctx.advanced();
        assert_eq!(ctx.remaining_steps().len(), 1);
        assert!(ctx.current_step().unwrap().is_parallel());
        let ctx = ctx.advanced();
        assert!(ctx.is_finished());
        assert!(ctx.remaining_steps().is_empty());
        assert!(ctx.current_step().is_none());
    }

    #[test]
    fn test_record_restores_context() {
        let mut ctx = context().advanced();
        ctx.record_group_status(&GroupStatus {
            total_units: 1,
            failed_units: 1,
        });
        let record = ctx.to_record().unwrap();
        assert_eq!(record.handler, STEP_CONTINUATION_HANDLER);
        assert_eq!(ExecutionContext::from_record(&record).unwrap(), ctx);
    }

    #[test]
    fn test_foreign_records_are_rejected() {
        let record = ContinuationRecord::new("something.else", json!({}));
        assert!(matches!(
            ExecutionContext::from_record(&record),
            Err(SequencerError::Continuation(_))
        ));
    }

    #[test]
    fn test_malformed_payload_is_a_continuation_error() {
        let record = ContinuationRecord::new(STEP_CONTINUATION_HANDLER, json!({"next_step": "x"}));
        assert!(matches!(
            ExecutionContext::from_record(&record),
            Err(SequencerError::Continuation(_))
        ));
    }
}
