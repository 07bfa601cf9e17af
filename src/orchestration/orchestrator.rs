//! # Orchestrator
//!
//! Owner-facing entry point: register orchestrations, start them, inspect their plans.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::{json, Value};
//! use tasker_sequencer::config::SequencerConfig;
//! use tasker_sequencer::error::BuildError;
//! use tasker_sequencer::orchestration::{Orchestration, Orchestrator, WorkflowBuilder};
//! use tasker_sequencer::queue::InMemoryTaskQueue;
//!
//! struct Checkout;
//!
//! impl Orchestration for Checkout {
//!     fn name(&self) -> &str {
//!         "checkout"
//!     }
//!
//!     fn declare_steps(&self, steps: &mut WorkflowBuilder, args: &[Value]) -> Result<(), BuildError> {
//!         steps.run("ReserveStock", args.to_vec());
//!         steps.in_parallel(|steps| {
//!             steps.run("ChargeCard", args.to_vec());
//!             steps.run("NotifyWarehouse", args.to_vec());
//!             Ok(())
//!         })?;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = Arc::new(InMemoryTaskQueue::new());
//! let orchestrator = Orchestrator::new(queue, &SequencerConfig::default());
//! orchestrator.register(Arc::new(Checkout))?;
//!
//! let plan = orchestrator.workflow_plan("checkout", &[json!("order-1")])?;
//! assert_eq!(plan.len(), 2);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::builder::WorkflowBuilder;
use super::executor::OrchestrationExecutor;
use super::guard::CompositionGuard;
use super::types::{ExecutionOutcome, Orchestration};
use crate::config::SequencerConfig;
use crate::constants::operations;
use crate::error::SequencerResult;
use crate::logging::log_orchestration_operation;
use crate::models::Workflow;
use crate::queue::{ContinuationHandler, GroupCompletion, TaskQueueService, TaskUnit};
use crate::registry::OrchestrationRegistry;

pub struct Orchestrator<Q: TaskQueueService> {
    registry: Arc<OrchestrationRegistry>,
    executor: OrchestrationExecutor<Q>,
    guard: CompositionGuard<Q>,
}

impl<Q: TaskQueueService> Orchestrator<Q> {
    pub fn new(queue: Arc<Q>, config: &SequencerConfig) -> Self {
        let registry = Arc::new(OrchestrationRegistry::new());
        Self {
            executor: OrchestrationExecutor::new(
                Arc::clone(&queue),
                Arc::clone(&registry),
                &config.orchestration,
            ),
            guard: CompositionGuard::new(queue),
            registry,
        }
    }

    pub fn register(&self, orchestration: Arc<dyn Orchestration>) -> SequencerResult<()> {
        self.registry.register(orchestration)
    }

    pub fn registry(&self) -> &Arc<OrchestrationRegistry> {
        &self.registry
    }

    pub fn executor(&self) -> &OrchestrationExecutor<Q> {
        &self.executor
    }

    /// Build the workflow `name` would run for `args` without scheduling anything
    pub fn workflow_plan(&self, name: &str, args: &[Value]) -> SequencerResult<Workflow> {
        let orchestration = self.registry.resolve(name)?;
        build_workflow(orchestration.as_ref(), args)
    }

    /// Declare, validate and start the orchestration registered as `name`
    pub async fn perform(&self, name: &str, args: Vec<Value>) -> SequencerResult<ExecutionOutcome> {
        let orchestration = self.registry.resolve(name)?;
        let workflow = build_workflow(orchestration.as_ref(), &args)?;

        log_orchestration_operation(
            operations::PERFORM,
            name,
            Some(workflow.len()),
            "declared",
            None,
        );

        let executor = &self.executor;
        self.guard
            .within_enclosing_group(|enclosing| executor.execute(name, args, workflow, enclosing))
            .await
    }
}

/// Fresh builder per call; nothing is shared between invocations
fn build_workflow(orchestration: &dyn Orchestration, args: &[Value]) -> SequencerResult<Workflow> {
    let mut steps = WorkflowBuilder::new();
    orchestration.declare_steps(&mut steps, args)?;
    let workflow = steps.finish()?;
    debug!(
        orchestration = orchestration.name(),
        steps = workflow.len(),
        units = workflow.unit_count(),
        "Built workflow"
    );
    Ok(workflow)
}

#[async_trait]
impl<Q: TaskQueueService> ContinuationHandler for Orchestrator<Q> {
    async fn on_group_complete(&self, completion: GroupCompletion) -> SequencerResult<()> {
        self.executor.advance(completion).await
    }
}

impl<Q: TaskQueueService> std::fmt::Debug for Orchestrator<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &self.registry)
            .field("executor", &self.executor)
            .finish()
    }
}

/// Runs a registered orchestration as a unit of another workflow.
///
/// Register it with a worker under the orchestration's name; the embedded workflow is
/// nested in the group of the step that runs it.
pub struct OrchestrationUnit<Q: TaskQueueService> {
    orchestrator: Arc<Orchestrator<Q>>,
    name: String,
}

impl<Q: TaskQueueService> OrchestrationUnit<Q> {
    pub fn new(orchestrator: Arc<Orchestrator<Q>>, name: impl Into<String>) -> Self {
        Self {
            orchestrator,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl<Q: TaskQueueService> TaskUnit for OrchestrationUnit<Q> {
    async fn perform(&self, args: &[Value]) -> anyhow::Result<()> {
        self.orchestrator.perform(&self.name, args.to_vec()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BuildError, SequencerError};
    use crate::models::{StepNode, TaskDescriptor};
    use crate::queue::InMemoryTaskQueue;
    use serde_json::json;

    struct TwoArgs;

    impl Orchestration for TwoArgs {
        fn name(&self) -> &str {
            "two_args"
        }

        fn declare_steps(&self, steps: &mut WorkflowBuilder, args: &[Value]) -> Result<(), BuildError> {
            steps.run("A", args.first().cloned());
            steps.run("B", args.get(1).cloned());
            Ok(())
        }
    }

    struct Broken;

    impl Orchestration for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn declare_steps(&self, steps: &mut WorkflowBuilder, _args: &[Value]) -> Result<(), BuildError> {
            steps.in_parallel(|steps| {
                steps.in_parallel(|_| Ok(()))?;
                Ok(())
            })?;
            Ok(())
        }
    }

    fn orchestrator() -> Orchestrator<InMemoryTaskQueue> {
        let queue = Arc::new(InMemoryTaskQueue::new());
        queue.declare_task_type("A");
        queue.declare_task_type("B");
        let orchestrator = Orchestrator::new(queue, &SequencerConfig::default());
        orchestrator.register(Arc::new(TwoArgs)).unwrap();
        orchestrator.register(Arc::new(Broken)).unwrap();
        orchestrator
    }

    #[test]
    fn test_workflow_plan_does_not_schedule() {
        let orchestrator = orchestrator();
        let plan = orchestrator
            .workflow_plan("two_args", &[json!("some"), json!("args")])
            .unwrap();
        assert_eq!(
            plan.steps(),
            &[
                StepNode::Single(TaskDescriptor::new("A", [json!("some")])),
                StepNode::Single(TaskDescriptor::new("B", [json!("args")])),
            ]
        );
        assert_eq!(orchestrator.executor().queue().group_count(), 0);
    }

    #[tokio::test]
    async fn test_build_errors_surface_from_perform() {
        let orchestrator = orchestrator();
        let err = orchestrator.perform("broken", vec![]).await.unwrap_err();
        assert!(matches!(err, SequencerError::Build(BuildError::NestedParallel)));
        assert_eq!(orchestrator.executor().queue().group_count(), 0);
    }

    #[tokio::test]
    async fn test_perform_schedules_first_step() {
        let orchestrator = orchestrator();
        let outcome = orchestrator
            .perform("two_args", vec![json!("some"), json!("args")])
            .await
            .unwrap();
        assert!(matches!(outcome, ExecutionOutcome::Scheduled { .. }));
        assert_eq!(orchestrator.executor().queue().group_count(), 1);
    }
}
