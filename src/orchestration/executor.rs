//! # Orchestration Executor
//!
//! Realizes a [`Workflow`] against a [`TaskQueueService`], one step at a time:
//!
//! ```text
//! execute(owner, args, workflow, enclosing)
//!   validate every descriptor            (nothing scheduled on failure)
//!   step 0: open group (child of enclosing)
//!           enqueue units
//!           register continuation = context advanced to step 1
//!           close group              (closed anyway if any of these fail)
//!   ...group completes...
//! advance(completion)
//!   restore context from the record, fold in unit counters
//!   next step -> same as step 0, or
//!   finished  -> owner.on_complete / owner.on_success
//! ```
//!
//! Step `k + 1` is only opened from step `k`'s continuation, and the queue service
//! keeps step `k` outstanding in the enclosing group until that continuation has run,
//! so an enclosing group cannot complete between two steps.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::context::ExecutionContext;
use super::types::{CompletionStatus, ExecutionOutcome};
use crate::config::OrchestrationConfig;
use crate::constants::operations;
use crate::error::{SequencerError, SequencerResult};
use crate::logging::{log_group_operation, log_orchestration_operation};
use crate::models::{StepNode, Workflow};
use crate::queue::{
    ContinuationHandler, ContinuationRecord, GroupCompletion, GroupId, TaskQueueService,
};
use crate::registry::OrchestrationRegistry;

pub struct OrchestrationExecutor<Q: TaskQueueService> {
    queue: Arc<Q>,
    orchestrations: Arc<OrchestrationRegistry>,
    description_prefix: String,
}

impl<Q: TaskQueueService> OrchestrationExecutor<Q> {
    pub fn new(
        queue: Arc<Q>,
        orchestrations: Arc<OrchestrationRegistry>,
        config: &OrchestrationConfig,
    ) -> Self {
        Self {
            queue,
            orchestrations,
            description_prefix: config.description_prefix.clone(),
        }
    }

    pub fn queue(&self) -> &Arc<Q> {
        &self.queue
    }

    /// Check every descriptor against the queue's unit contract
    pub fn validate(&self, workflow: &Workflow) -> SequencerResult<()> {
        for (step_index, descriptor) in workflow.descriptors() {
            if !self.queue.satisfies_unit_contract(&descriptor.task_type) {
                warn!(
                    task_type = %descriptor.task_type,
                    step_index = step_index,
                    provider = self.queue.provider_name(),
                    "Task type does not satisfy the unit contract"
                );
                return Err(SequencerError::ContractViolation {
                    task_type: descriptor.task_type.clone(),
                    step_index,
                });
            }
        }
        Ok(())
    }

    /// Start `workflow` on behalf of the orchestration registered as `owner`.
    ///
    /// Validation and owner resolution happen before anything is handed to the queue
    /// service. An empty workflow runs the owner's completion hooks before returning.
    #[instrument(skip(self, original_args, workflow), fields(steps = workflow.len()))]
    pub async fn execute(
        &self,
        owner: &str,
        original_args: Vec<Value>,
        workflow: Workflow,
        enclosing_group: Option<GroupId>,
    ) -> SequencerResult<ExecutionOutcome> {
        self.orchestrations.resolve(owner)?;
        self.validate(&workflow)?;

        log_orchestration_operation(
            operations::EXECUTE,
            owner,
            Some(workflow.len()),
            "validated",
            enclosing_group
                .as_ref()
                .map(|_| "nested in enclosing group"),
        );

        let ctx = ExecutionContext::new(owner, original_args, workflow, enclosing_group);
        if ctx.is_finished() {
            self.finish(&ctx).await?;
            return Ok(ExecutionOutcome::CompletedImmediately);
        }

        let first_group = self.schedule_step(&ctx).await?;
        Ok(ExecutionOutcome::Scheduled { first_group })
    }

    /// Resume the orchestration whose step group just completed
    pub async fn advance(&self, completion: GroupCompletion) -> SequencerResult<()> {
        let Some(record) = completion.continuation.as_ref() else {
            debug!(group = %completion.group, "Group completed without a continuation");
            return Ok(());
        };

        let mut ctx = ExecutionContext::from_record(record)?;
        ctx.record_group_status(&completion.status);

        log_group_operation(
            operations::ADVANCE,
            &ctx.orchestration,
            &completion.group.to_string(),
            ctx.next_step.saturating_sub(1),
            completion.status.total_units,
            if completion.status.is_success() {
                "succeeded"
            } else {
                "finished_with_failures"
            },
        );

        if ctx.is_finished() {
            self.finish(&ctx).await
        } else {
            self.schedule_step(&ctx).await.map(|_| ())
        }
    }

    async fn schedule_step(&self, ctx: &ExecutionContext) -> SequencerResult<GroupId> {
        let step = ctx.current_step().ok_or_else(|| {
            SequencerError::Continuation(format!(
                "step {} out of range for {} ({} steps)",
                ctx.next_step,
                ctx.orchestration,
                ctx.workflow.len()
            ))
        })?;

        let description = format!(
            "{} {} step {}",
            self.description_prefix,
            ctx.orchestration,
            ctx.next_step + 1
        );
        let record = ctx.advanced().to_record()?;
        let group = self
            .queue
            .open_group(ctx.enclosing_group.as_ref(), &description)
            .await?;

        if let Err(e) = self.arm_group(&group, step, record).await {
            self.release_group(&group, &ctx.orchestration).await;
            return Err(e);
        }

        log_group_operation(
            operations::SCHEDULE_STEP,
            &ctx.orchestration,
            &group.to_string(),
            ctx.next_step,
            step.unit_count(),
            "scheduled",
        );
        Ok(group)
    }

    /// Enqueue the step's units, then attach the continuation and close the group.
    ///
    /// The continuation goes on last so a group abandoned halfway never advances the
    /// orchestration.
    async fn arm_group(
        &self,
        group: &GroupId,
        step: &StepNode,
        record: ContinuationRecord,
    ) -> SequencerResult<()> {
        // Enqueue order does not imply execution order for parallel steps
        for descriptor in step.descriptors() {
            self.queue.enqueue(group, descriptor).await?;
        }
        self.queue.register_continuation(group, record).await?;
        self.queue.close_group(group).await?;
        Ok(())
    }

    /// Close a group whose step failed to schedule so its parent can still complete
    async fn release_group(&self, group: &GroupId, orchestration: &str) {
        match self.queue.close_group(group).await {
            Ok(()) => warn!(
                group = %group,
                orchestration = %orchestration,
                "Closed partially scheduled step group"
            ),
            Err(e) => error!(
                group = %group,
                orchestration = %orchestration,
                error = %e,
                "Failed to close partially scheduled step group"
            ),
        }
    }

    async fn finish(&self, ctx: &ExecutionContext) -> SequencerResult<()> {
        let orchestration = self.orchestrations.resolve(&ctx.orchestration)?;
        let status = CompletionStatus {
            orchestration: ctx.orchestration.clone(),
            steps: ctx.workflow.len(),
            total_units: ctx.total_units,
            failed_units: ctx.failed_units,
            completed_at: Utc::now(),
        };

        let hook_error = |e: anyhow::Error| SequencerError::CompletionHook {
            orchestration: ctx.orchestration.clone(),
            message: format!("{e:#}"),
        };

        orchestration
            .on_complete(&status, &ctx.original_args)
            .await
            .map_err(hook_error)?;
        if status.is_success() {
            orchestration
                .on_success(&status, &ctx.original_args)
                .await
                .map_err(hook_error)?;
        }

        info!(
            orchestration = %ctx.orchestration,
            steps = status.steps,
            total_units = status.total_units,
            failed_units = status.failed_units,
            "Orchestration finished"
        );
        log_orchestration_operation(
            operations::FINISH,
            &ctx.orchestration,
            Some(status.steps),
            if status.is_success() {
                "succeeded"
            } else {
                "completed_with_failures"
            },
            None,
        );
        Ok(())
    }
}

#[async_trait]
impl<Q: TaskQueueService> ContinuationHandler for OrchestrationExecutor<Q> {
    async fn on_group_complete(&self, completion: GroupCompletion) -> SequencerResult<()> {
        self.advance(completion).await
    }
}

impl<Q: TaskQueueService> std::fmt::Debug for OrchestrationExecutor<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestrationExecutor")
            .field("provider", &self.queue.provider_name())
            .field("description_prefix", &self.description_prefix)
            .finish()
    }
}
