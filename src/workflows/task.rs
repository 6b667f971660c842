//! The task contract.
//!
//! A [`Task`] is a named unit of work that owns exactly one [`StateField`].
//! Implementations only provide [`Task::run`]; the provided
//! [`Task::execute`] is the failure boundary that turns any error into a
//! [`TaskOutcome::Failed`] so nothing escapes into the scheduler.

use super::state::StateField;
use super::target::Target;
use async_trait::async_trait;
use std::fmt;

/// Result of one task execution, consumed by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Written {
        task: String,
        field: StateField,
        value: String,
    },
    Failed {
        task: String,
        field: StateField,
        message: String,
    },
}

impl TaskOutcome {
    pub fn written(task: impl Into<String>, field: StateField, value: impl Into<String>) -> Self {
        TaskOutcome::Written {
            task: task.into(),
            field,
            value: value.into(),
        }
    }

    /// Builds a failure whose message is `"<field error label> Error: <reason>"`.
    pub fn failed(task: impl Into<String>, field: StateField, reason: impl fmt::Display) -> Self {
        TaskOutcome::Failed {
            task: task.into(),
            field,
            message: format!("{} Error: {}", field.error_label(), reason),
        }
    }

    pub fn task(&self) -> &str {
        match self {
            TaskOutcome::Written { task, .. } | TaskOutcome::Failed { task, .. } => task,
        }
    }

    pub fn field(&self) -> StateField {
        match self {
            TaskOutcome::Written { field, .. } | TaskOutcome::Failed { field, .. } => *field,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, TaskOutcome::Written { .. })
    }
}

#[async_trait]
pub trait Task: Send + Sync {
    /// Unique task name within a workflow.
    fn name(&self) -> &str;

    /// The single state field this task writes.
    fn field(&self) -> StateField;

    /// Human-readable description, used for tracing.
    fn description(&self) -> &str;

    /// Do the work. Any error is reported as the task's failure.
    async fn run(&self, target: &Target) -> anyhow::Result<String>;

    /// Run the task and capture its outcome. Never fails.
    async fn execute(&self, target: &Target) -> TaskOutcome {
        match self.run(target).await {
            Ok(value) => TaskOutcome::written(self.name(), self.field(), value),
            Err(e) => TaskOutcome::failed(self.name(), self.field(), format!("{:#}", e)),
        }
    }
}
