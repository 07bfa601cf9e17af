//! Workflow step-tree
//!
//! A [`Workflow`] is an ordered list of [`StepNode`]s. Steps run strictly one after the
//! other; the units inside a [`StepNode::Parallel`] run in any order.
//!
//! The serialized form keeps single steps as descriptor objects and parallel steps as
//! arrays of descriptor objects:
//!
//! ```text
//! [
//!   {"task_type": "A", "args": ["some"]},
//!   [{"task_type": "B", "args": ["some"]}, {"task_type": "C", "args": ["args"]}]
//! ]
//! ```

use super::task_descriptor::TaskDescriptor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepNode {
    /// Exactly one unit.
    Single(TaskDescriptor),
    /// Units that may run concurrently; never empty.
    Parallel(Vec<TaskDescriptor>),
}

impl StepNode {
    /// Descriptors of this step in declaration order.
    pub fn descriptors(&self) -> &[TaskDescriptor] {
        match self {
            StepNode::Single(descriptor) => std::slice::from_ref(descriptor),
            StepNode::Parallel(descriptors) => descriptors,
        }
    }

    pub fn unit_count(&self) -> usize {
        self.descriptors().len()
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, StepNode::Parallel(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workflow(Vec<StepNode>);

impl Workflow {
    pub fn new(steps: Vec<StepNode>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[StepNode] {
        &self.0
    }

    pub fn step(&self, index: usize) -> Option<&StepNode> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every descriptor in execution order, flattening parallel steps.
    pub fn descriptors(&self) -> impl Iterator<Item = (usize, &TaskDescriptor)> {
        self.0
            .iter()
            .enumerate()
            .flat_map(|(index, step)| step.descriptors().iter().map(move |d| (index, d)))
    }

    pub fn unit_count(&self) -> usize {
        self.0.iter().map(StepNode::unit_count).sum()
    }
}

impl From<Vec<StepNode>> for Workflow {
    fn from(steps: Vec<StepNode>) -> Self {
        Self(steps)
    }
}
