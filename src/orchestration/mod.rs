//! # Orchestration Engine
//!
//! Turns step declarations into chained queue groups.
//!
//! ## Core Components
//!
//! - **WorkflowBuilder**: Records `run` / `in_parallel` declarations into a workflow
//! - **OrchestrationExecutor**: Schedules one group per step and advances on each
//!   group's continuation
//! - **CompositionGuard**: Nests new groups in the group of the invoking unit, if any
//! - **Orchestrator**: Registry-backed `perform` / `workflow_plan` entry points
//! - **ExecutionContext**: Per-invocation state persisted in continuation records
//!
//! ## Flow
//!
//! ```text
//! Orchestrator::perform(name, args)
//!   -> Orchestration::declare_steps(WorkflowBuilder)   build
//!   -> CompositionGuard::within_enclosing_group        nest
//!   -> OrchestrationExecutor::execute                  validate + step 1
//! queue worker: step k group complete
//!   -> OrchestrationExecutor::advance                  step k+1 or hooks
//! ```

pub mod builder;
pub mod context;
pub mod executor;
pub mod guard;
pub mod orchestrator;
pub mod types;

pub use builder::WorkflowBuilder;
pub use context::ExecutionContext;
pub use executor::OrchestrationExecutor;
pub use guard::CompositionGuard;
pub use orchestrator::{OrchestrationUnit, Orchestrator};
pub use types::{CompletionStatus, ExecutionOutcome, Orchestration};
