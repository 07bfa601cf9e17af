//! # Composition Guard
//!
//! When an orchestration is started from inside a unit that an outer group tracks,
//! its step groups are nested under that outer group. The outer group then only
//! completes after the embedded workflow has finished, giving one continuous
//! hierarchy instead of two unrelated trackers:
//!
//! ```text
//! enclosing group G
//! ├── unit that called perform()
//! ├── inner step 1 group
//! └── inner step 2 group  (opened from step 1's continuation)
//! ```

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::queue::{GroupId, TaskQueueService};

#[derive(Debug)]
pub struct CompositionGuard<Q: TaskQueueService> {
    queue: Arc<Q>,
}

impl<Q: TaskQueueService> CompositionGuard<Q> {
    pub fn new(queue: Arc<Q>) -> Self {
        Self { queue }
    }

    /// Group tracking the current invocation, if any
    pub fn enclosing_group(&self) -> Option<GroupId> {
        self.queue.current_enclosing_group()
    }

    /// Run `action` with the enclosing group new groups must be nested in
    pub async fn within_enclosing_group<F, Fut, T>(&self, action: F) -> T
    where
        F: FnOnce(Option<GroupId>) -> Fut,
        Fut: Future<Output = T>,
    {
        let enclosing = self.enclosing_group();
        match &enclosing {
            Some(group) => debug!(group = %group, "Nesting within enclosing group"),
            None => debug!("No enclosing group - starting a top-level hierarchy"),
        }
        action(enclosing).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{within_group, InMemoryTaskQueue};

    #[tokio::test]
    async fn test_top_level_invocation_has_no_enclosing_group() {
        let guard = CompositionGuard::new(Arc::new(InMemoryTaskQueue::new()));
        let seen = guard.within_enclosing_group(|group| async move { group }).await;
        assert!(seen.is_none());
    }

    #[tokio::test]
    async fn test_invocation_inside_unit_sees_its_group() {
        let guard = CompositionGuard::new(Arc::new(InMemoryTaskQueue::new()));
        let outer = GroupId::new();
        let seen = within_group(outer.clone(), async {
            guard.within_enclosing_group(|group| async move { group }).await
        })
        .await;
        assert_eq!(seen, Some(outer));
    }
}
