//! # Task Queue Abstraction
//!
//! The group-tracking task queue the orchestration core schedules against, and an
//! in-memory implementation with a worker for tests and development.
//!
//! ## Architecture
//!
//! ```text
//! TaskQueueService (trait)        <- open/enqueue/register_continuation/close
//!   └── InMemoryTaskQueue         <- group tree + event log
//!
//! InMemoryWorker                  <- runs TaskUnits, dispatches completions
//!   ├── UnitRegistry              <- task type -> TaskUnit
//!   └── ContinuationHandler       <- usually the Orchestrator
//! ```
//!
//! Continuations are [`ContinuationRecord`]s (handler name + JSON payload) stored with
//! their group, never closures.

mod errors;
mod in_memory;
mod traits;
mod types;
mod worker;

pub use errors::{QueueError, QueueResult};
pub use in_memory::{within_group, GroupSnapshot, InMemoryTaskQueue, PendingUnit};
pub use traits::{ContinuationHandler, TaskQueueService, TaskUnit};
pub use types::{
    ContinuationRecord, GroupCompletion, GroupId, GroupStatus, QueueEvent, QueueEventKind,
    UnitHandle, UnitId, UnitOutcome,
};
pub use worker::{InMemoryWorker, WorkerReport};
