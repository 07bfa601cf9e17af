//! Shared units, orchestrations and a queue/worker/orchestrator harness.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tasker_sequencer::config::SequencerConfig;
use tasker_sequencer::error::BuildError;
use tasker_sequencer::orchestration::{
    CompletionStatus, Orchestration, OrchestrationUnit, Orchestrator, WorkflowBuilder,
};
use tasker_sequencer::queue::{
    GroupId, InMemoryTaskQueue, InMemoryWorker, QueueEvent, QueueEventKind, TaskUnit,
};

/// One executed unit, in the order units finished running.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCall {
    pub task_type: String,
    pub args: Vec<Value>,
}

pub type CallLog = Arc<Mutex<Vec<UnitCall>>>;

/// Appends every invocation to a shared call log.
pub struct RecordingUnit {
    task_type: String,
    calls: CallLog,
}

impl RecordingUnit {
    pub fn new(task_type: impl Into<String>, calls: CallLog) -> Self {
        Self {
            task_type: task_type.into(),
            calls,
        }
    }
}

#[async_trait]
impl TaskUnit for RecordingUnit {
    async fn perform(&self, args: &[Value]) -> anyhow::Result<()> {
        self.calls.lock().push(UnitCall {
            task_type: self.task_type.clone(),
            args: args.to_vec(),
        });
        Ok(())
    }
}

/// Always fails.
pub struct FailingUnit;

#[async_trait]
impl TaskUnit for FailingUnit {
    async fn perform(&self, _args: &[Value]) -> anyhow::Result<()> {
        anyhow::bail!("payment gateway unavailable")
    }
}

#[derive(Debug, Clone)]
pub struct HookCall {
    pub hook: &'static str,
    pub status: CompletionStatus,
    pub args: Vec<Value>,
}

pub type HookLog = Arc<Mutex<Vec<HookCall>>>;

/// Orchestration declared from a fixed shape.
///
/// Each inner list is one step: a single entry becomes `run`, several entries an
/// `in_parallel` block. Every unit gets the invocation's arguments.
pub struct ScriptedOrchestration {
    name: String,
    steps: Vec<Vec<&'static str>>,
    hooks: HookLog,
}

impl ScriptedOrchestration {
    pub fn new(name: impl Into<String>, steps: Vec<Vec<&'static str>>) -> Self {
        Self {
            name: name.into(),
            steps,
            hooks: HookLog::default(),
        }
    }

    pub fn hooks(&self) -> HookLog {
        Arc::clone(&self.hooks)
    }
}

#[async_trait]
impl Orchestration for ScriptedOrchestration {
    fn name(&self) -> &str {
        &self.name
    }

    fn declare_steps(&self, steps: &mut WorkflowBuilder, args: &[Value]) -> Result<(), BuildError> {
        for step in &self.steps {
            if let [task_type] = step.as_slice() {
                steps.run(*task_type, args.to_vec());
            } else {
                steps.in_parallel(|steps| {
                    for task_type in step {
                        steps.run(*task_type, args.to_vec());
                    }
                    Ok(())
                })?;
            }
        }
        Ok(())
    }

    async fn on_complete(&self, status: &CompletionStatus, args: &[Value]) -> anyhow::Result<()> {
        self.hooks.lock().push(HookCall {
            hook: "on_complete",
            status: status.clone(),
            args: args.to_vec(),
        });
        Ok(())
    }

    async fn on_success(&self, status: &CompletionStatus, args: &[Value]) -> anyhow::Result<()> {
        self.hooks.lock().push(HookCall {
            hook: "on_success",
            status: status.clone(),
            args: args.to_vec(),
        });
        Ok(())
    }
}

pub struct Harness {
    pub queue: Arc<InMemoryTaskQueue>,
    pub worker: InMemoryWorker,
    pub orchestrator: Arc<Orchestrator<InMemoryTaskQueue>>,
    pub calls: CallLog,
}

impl Harness {
    /// Queue, worker and orchestrator with a [`RecordingUnit`] per task type
    pub fn new(task_types: &[&str]) -> Self {
        let config = SequencerConfig::default();
        let queue = Arc::new(InMemoryTaskQueue::new());
        let worker = InMemoryWorker::new(Arc::clone(&queue), &config.worker);
        let calls = CallLog::default();
        for task_type in task_types {
            worker.register_unit(
                *task_type,
                Arc::new(RecordingUnit::new(*task_type, Arc::clone(&calls))),
            );
        }
        let orchestrator = Arc::new(Orchestrator::new(Arc::clone(&queue), &config));
        Self {
            queue,
            worker,
            orchestrator,
            calls,
        }
    }

    /// Register `orchestration` and return its hook log
    pub fn register(&self, orchestration: ScriptedOrchestration) -> HookLog {
        let hooks = orchestration.hooks();
        self.orchestrator
            .register(Arc::new(orchestration))
            .expect("orchestration registers");
        hooks
    }

    /// Make the orchestration registered as `name` runnable as a unit of other workflows
    pub fn register_as_unit(&self, name: &str) {
        self.worker.register_unit(
            name,
            Arc::new(OrchestrationUnit::new(Arc::clone(&self.orchestrator), name)),
        );
    }

    pub fn called_task_types(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|call| call.task_type.clone())
            .collect()
    }
}

/// Sequence number of the first event matching `predicate`
pub fn sequence_of(events: &[QueueEvent], predicate: impl Fn(&QueueEventKind) -> bool) -> u64 {
    events
        .iter()
        .find(|event| predicate(&event.kind))
        .map(|event| event.sequence)
        .expect("event recorded")
}

pub fn opened(group: &GroupId) -> impl Fn(&QueueEventKind) -> bool + '_ {
    move |kind| matches!(kind, QueueEventKind::GroupOpened { group: g, .. } if g == group)
}

pub fn continuation_fired(group: &GroupId) -> impl Fn(&QueueEventKind) -> bool + '_ {
    move |kind| matches!(kind, QueueEventKind::ContinuationFired { group: g } if g == group)
}

pub fn completed(group: &GroupId) -> impl Fn(&QueueEventKind) -> bool + '_ {
    move |kind| matches!(kind, QueueEventKind::GroupCompleted { group: g } if g == group)
}

/// Parent recorded when `group` was opened
pub fn parent_of(events: &[QueueEvent], group: &GroupId) -> Option<GroupId> {
    events.iter().find_map(|event| match &event.kind {
        QueueEventKind::GroupOpened {
            group: g, parent, ..
        } if g == group => parent.clone(),
        _ => None,
    })
}
