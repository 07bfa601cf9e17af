//! Workflow plans as produced through registered orchestrations.

mod common;

use common::*;
use serde_json::json;
use tasker_sequencer::error::{BuildError, SequencerError};
use tasker_sequencer::models::{StepNode, TaskDescriptor, Workflow};
use tasker_sequencer::orchestration::WorkflowBuilder;

#[test]
fn test_plan_mixes_sequential_and_parallel_steps() {
    let harness = Harness::new(&["A", "B", "C"]);
    harness.register(ScriptedOrchestration::new(
        "mixed",
        vec![vec!["A"], vec!["B", "C"], vec![], vec!["A"]],
    ));

    let plan = harness
        .orchestrator
        .workflow_plan("mixed", &[json!("some"), json!("args")])
        .unwrap();

    let args = [json!("some"), json!("args")];
    assert_eq!(
        plan.steps(),
        &[
            StepNode::Single(TaskDescriptor::new("A", args.clone())),
            StepNode::Parallel(vec![
                TaskDescriptor::new("B", args.clone()),
                TaskDescriptor::new("C", args.clone()),
            ]),
            StepNode::Single(TaskDescriptor::new("A", args.clone())),
        ]
    );
    assert_eq!(plan.unit_count(), 4);
    assert_eq!(harness.queue.group_count(), 0);
}

#[test]
fn test_each_plan_uses_a_fresh_builder() {
    let harness = Harness::new(&["A"]);
    harness.register(ScriptedOrchestration::new("single", vec![vec!["A"]]));

    let first = harness
        .orchestrator
        .workflow_plan("single", &[json!(1)])
        .unwrap();
    let second = harness
        .orchestrator
        .workflow_plan("single", &[json!(2)])
        .unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(second.steps()[0].descriptors()[0].args, vec![json!(2)]);
}

#[test]
fn test_serialized_plan_shape() {
    let mut steps = WorkflowBuilder::new();
    steps.run("A", [json!("some")]);
    steps
        .in_parallel(|steps| {
            steps.run("B", [json!("some")]);
            steps.run("C", [json!("args")]);
            Ok(())
        })
        .unwrap();
    let workflow = steps.finish().unwrap();

    let value = serde_json::to_value(&workflow).unwrap();
    assert_eq!(
        value,
        json!([
            {"task_type": "A", "args": ["some"]},
            [
                {"task_type": "B", "args": ["some"]},
                {"task_type": "C", "args": ["args"]}
            ]
        ])
    );
    let restored: Workflow = serde_json::from_value(value).unwrap();
    assert_eq!(restored, workflow);
}

#[test]
fn test_unknown_orchestration_has_no_plan() {
    let harness = Harness::new(&[]);
    assert!(matches!(
        harness.orchestrator.workflow_plan("nope", &[]),
        Err(SequencerError::UnknownOrchestration(_))
    ));
}

#[test]
fn test_nested_parallel_block_fails_the_build() {
    let mut steps = WorkflowBuilder::new();
    steps.run("A", []);
    let err = steps
        .in_parallel(|steps| {
            steps.in_parallel(|steps| {
                steps.run("B", []);
                Ok(())
            })?;
            Ok(())
        })
        .unwrap_err();

    assert_eq!(err, BuildError::NestedParallel);
    assert!(SequencerError::from(err).is_validation_error());
}
