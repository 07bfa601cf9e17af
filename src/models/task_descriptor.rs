//! Task descriptor definitions
//!
//! A descriptor is a task type plus the positional arguments it will be invoked with.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Strongly-typed task type identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for TaskType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskType {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&TaskType> for TaskType {
    fn from(value: &TaskType) -> Self {
        value.clone()
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for TaskType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<&str> for TaskType {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// One schedulable unit of work: which task type to run and with what arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub task_type: TaskType,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl TaskDescriptor {
    pub fn new(task_type: impl Into<TaskType>, args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            task_type: task_type.into(),
            args: args.into_iter().collect(),
        }
    }
}

impl fmt::Display for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({} args)", self.task_type, self.args.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_serializes_type_and_args() {
        let descriptor = TaskDescriptor::new("SendReceipt", [json!("order-1"), json!(3)]);
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            value,
            json!({"task_type": "SendReceipt", "args": ["order-1", 3]})
        );
    }

    #[test]
    fn test_missing_args_default_to_empty() {
        let descriptor: TaskDescriptor =
            serde_json::from_value(json!({"task_type": "Noop"})).unwrap();
        assert_eq!(descriptor.task_type, "Noop");
        assert!(descriptor.args.is_empty());
    }

    #[test]
    fn test_blank_task_type_is_empty() {
        assert!(TaskType::new("  ").is_empty());
        assert!(!TaskType::new("A").is_empty());
    }
}
