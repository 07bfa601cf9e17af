//! # Unit Registry
//!
//! Task type to unit business logic. Workers resolve the unit for each pending task
//! here; the queue only learns which task types are executable.

use crate::models::TaskType;
use crate::queue::TaskUnit;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Task type -> unit implementation, shared by worker tasks.
#[derive(Default, Clone)]
pub struct UnitRegistry {
    units: Arc<DashMap<TaskType, Arc<dyn TaskUnit>>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit, replacing any previous registration for the type
    pub fn register(&self, task_type: impl Into<TaskType>, unit: Arc<dyn TaskUnit>) {
        let task_type = task_type.into();
        if self.units.insert(task_type.clone(), unit).is_some() {
            warn!(task_type = %task_type, "Replaced existing unit registration");
        } else {
            debug!(task_type = %task_type, "Registered unit");
        }
    }

    pub fn resolve(&self, task_type: &TaskType) -> Option<Arc<dyn TaskUnit>> {
        self.units.get(task_type).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, task_type: &TaskType) -> bool {
        self.units.contains_key(task_type)
    }

    pub fn task_types(&self) -> Vec<TaskType> {
        let mut types: Vec<TaskType> = self.units.iter().map(|e| e.key().clone()).collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl std::fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitRegistry")
            .field("task_types", &self.task_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;

    struct Noop;

    #[async_trait]
    impl TaskUnit for Noop {
        async fn perform(&self, _args: &[Value]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = UnitRegistry::new();
        registry.register("B", Arc::new(Noop));
        registry.register("A", Arc::new(Noop));

        assert!(registry.contains(&TaskType::new("A")));
        assert!(registry.resolve(&TaskType::new("missing")).is_none());
        assert_eq!(
            registry.task_types(),
            vec![TaskType::new("A"), TaskType::new("B")]
        );
    }

    #[test]
    fn test_clones_share_registrations() {
        let registry = UnitRegistry::new();
        let shared = registry.clone();
        registry.register("A", Arc::new(Noop));
        assert_eq!(shared.len(), 1);
    }
}
