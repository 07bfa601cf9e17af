#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Tasker Sequencer
//!
//! Sequential-then-parallel step orchestration on top of a group-tracking task queue.
//!
//! ## Overview
//!
//! A caller declares a multi-step process ("run A, then B and C together, then D").
//! The sequencer records it as a [`models::Workflow`] and drives it through a
//! [`queue::TaskQueueService`]: every step becomes one tracked group, and the next
//! step is only enqueued from the previous group's continuation.
//!
//! ## Module Organization
//!
//! - [`models`] - Task descriptors and the workflow step-tree
//! - [`orchestration`] - Builder, executor, composition guard and orchestrator
//! - [`queue`] - Task queue service contract plus in-memory queue and worker
//! - [`registry`] - Orchestration and unit registries
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//! use tasker_sequencer::config::SequencerConfig;
//! use tasker_sequencer::error::BuildError;
//! use tasker_sequencer::orchestration::{Orchestration, Orchestrator, WorkflowBuilder};
//! use tasker_sequencer::queue::{InMemoryTaskQueue, InMemoryWorker, TaskUnit};
//!
//! struct Noop;
//!
//! #[async_trait]
//! impl TaskUnit for Noop {
//!     async fn perform(&self, _args: &[Value]) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! struct Nightly;
//!
//! impl Orchestration for Nightly {
//!     fn name(&self) -> &str {
//!         "nightly"
//!     }
//!
//!     fn declare_steps(&self, steps: &mut WorkflowBuilder, args: &[Value]) -> Result<(), BuildError> {
//!         steps.run("Extract", args.to_vec());
//!         steps.in_parallel(|steps| {
//!             steps.run("Transform", args.to_vec());
//!             steps.run("Index", args.to_vec());
//!             Ok(())
//!         })?;
//!         steps.run("Publish", args.to_vec());
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SequencerConfig::default();
//! let queue = Arc::new(InMemoryTaskQueue::new());
//! let worker = InMemoryWorker::new(Arc::clone(&queue), &config.worker);
//! for task_type in ["Extract", "Transform", "Index", "Publish"] {
//!     worker.register_unit(task_type, Arc::new(Noop));
//! }
//!
//! let orchestrator = Orchestrator::new(queue, &config);
//! orchestrator.register(Arc::new(Nightly))?;
//! orchestrator.perform("nightly", vec![json!("2024-01-01")]).await?;
//!
//! let report = worker.run_until_idle(&orchestrator).await?;
//! assert_eq!(report.groups_completed, 3);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod queue;
pub mod registry;

pub use config::SequencerConfig;
pub use error::{BuildError, SequencerError, SequencerResult};
pub use models::{StepNode, TaskDescriptor, TaskType, Workflow};
pub use orchestration::{
    CompletionStatus, ExecutionOutcome, Orchestration, OrchestrationExecutor, Orchestrator,
    WorkflowBuilder,
};
pub use queue::{InMemoryTaskQueue, InMemoryWorker, TaskQueueService, TaskUnit};
