//! # Workflow Models
//!
//! Inert data types describing what an orchestration runs: task descriptors and the
//! ordered step-tree built from them.

pub mod task_descriptor;
pub mod workflow;

pub use task_descriptor::{TaskDescriptor, TaskType};
pub use workflow::{StepNode, Workflow};
