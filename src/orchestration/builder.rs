//! # Workflow Builder
//!
//! Records imperative step declarations into a [`Workflow`]. Nothing is scheduled
//! while building; every orchestration invocation gets its own builder.
//!
//! ```rust
//! use serde_json::json;
//! use tasker_sequencer::orchestration::WorkflowBuilder;
//!
//! # fn main() -> Result<(), tasker_sequencer::error::BuildError> {
//! let mut steps = WorkflowBuilder::new();
//! steps.run("ReserveStock", [json!("order-1")]);
//! steps.in_parallel(|steps| {
//!     steps.run("ChargeCard", [json!("order-1")]);
//!     steps.run("NotifyWarehouse", [json!("order-1")]);
//!     Ok(())
//! })?;
//! steps.run("SendReceipt", [json!("order-1")]);
//!
//! let workflow = steps.finish()?;
//! assert_eq!(workflow.len(), 3);
//! # Ok(())
//! # }
//! ```

use crate::error::BuildError;
use crate::models::{StepNode, TaskDescriptor, TaskType, Workflow};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct WorkflowBuilder {
    steps: Vec<StepNode>,
    /// Descriptors collected by the open `in_parallel` block
    parallel: Option<Vec<TaskDescriptor>>,
    /// First build error; poisons `finish`
    error: Option<BuildError>,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single-unit step, or collect the unit into the open parallel block.
    pub fn run(
        &mut self,
        task_type: impl Into<TaskType>,
        args: impl IntoIterator<Item = Value>,
    ) -> &mut Self {
        let descriptor = TaskDescriptor::new(task_type, args);
        if descriptor.task_type.is_empty() {
            self.poison(BuildError::EmptyTaskType);
            return self;
        }

        match self.parallel.as_mut() {
            Some(collected) => collected.push(descriptor),
            None => self.steps.push(StepNode::Single(descriptor)),
        }
        self
    }

    /// Collect every `run` made inside `block` into one parallel step.
    ///
    /// A block that records nothing adds no step. Opening a block inside another block
    /// fails with [`BuildError::NestedParallel`].
    pub fn in_parallel<F>(&mut self, block: F) -> Result<&mut Self, BuildError>
    where
        F: FnOnce(&mut Self) -> Result<(), BuildError>,
    {
        if self.parallel.is_some() {
            self.poison(BuildError::NestedParallel);
            return Err(BuildError::NestedParallel);
        }

        self.parallel = Some(Vec::new());
        let outcome = block(self);
        let collected = self.parallel.take().unwrap_or_default();

        if let Err(e) = outcome {
            self.poison(e.clone());
            return Err(e);
        }
        if let Some(e) = &self.error {
            return Err(e.clone());
        }

        if !collected.is_empty() {
            self.steps.push(StepNode::Parallel(collected));
        }
        Ok(self)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// The recorded workflow, or the first error recorded while building
    pub fn finish(self) -> Result<Workflow, BuildError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(Workflow::new(self.steps)),
        }
    }

    fn poison(&mut self, error: BuildError) {
        self.error.get_or_insert(error);
    }
}
