//! # Orchestration Registry
//!
//! Resolves orchestration names to their step declarations and completion hooks.
//!
//! Continuation records only carry the orchestration's name, so whichever process
//! handles a group completion looks the owner up here instead of relying on an
//! in-memory callback surviving from the scheduling process.

use crate::error::{SequencerError, SequencerResult};
use crate::orchestration::Orchestration;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Default)]
pub struct OrchestrationRegistry {
    orchestrations: DashMap<String, Arc<dyn Orchestration>>,
}

impl OrchestrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an orchestration under its own name
    pub fn register(&self, orchestration: Arc<dyn Orchestration>) -> SequencerResult<()> {
        let name = orchestration.name().to_string();
        if name.trim().is_empty() {
            return Err(SequencerError::Configuration(
                "Orchestration name cannot be empty".to_string(),
            ));
        }

        match self.orchestrations.entry(name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(SequencerError::DuplicateOrchestration(name))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(orchestration);
                info!(orchestration = %name, "Registered orchestration");
                Ok(())
            }
        }
    }

    pub fn resolve(&self, name: &str) -> SequencerResult<Arc<dyn Orchestration>> {
        self.orchestrations
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SequencerError::UnknownOrchestration(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.orchestrations.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .orchestrations
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.orchestrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orchestrations.is_empty()
    }
}

impl std::fmt::Debug for OrchestrationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestrationRegistry")
            .field("orchestrations", &self.names())
            .finish()
    }
}
