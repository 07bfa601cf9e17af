//! # Registry Infrastructure
//!
//! Name-keyed lookups resolved at validation or dispatch time rather than late at
//! runtime.
//!
//! ## Available Registries
//!
//! - **OrchestrationRegistry**: Orchestration name -> step declarations and hooks
//! - **UnitRegistry**: Task type -> unit business logic run by a worker

pub mod orchestration_registry;
pub mod unit_registry;

pub use orchestration_registry::OrchestrationRegistry;
pub use unit_registry::UnitRegistry;
