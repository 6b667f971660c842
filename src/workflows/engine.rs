//! Workflow Engine
//!
//! Declares the fixed fan-out/join shape of a reconnaissance run and drives
//! scheduler, reducer and report compiler in that order. A run always reaches
//! [`RunPhase::Done`]; individual task failures only show up in the errors
//! list of the returned state.

use super::reducer::Reducer;
use super::report::{Report, ReportCompiler};
use super::scheduler::Scheduler;
use super::state::{ReconState, StateField};
use super::target::Target;
use super::task::Task;
use crate::types::{AppError, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Output of a complete run: the report plus the errors collected on the way.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowOutput {
    pub report: Report,
    pub errors: Vec<String>,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Created,
    Running,
    Joined,
    Compiling,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Created => "created",
            RunPhase::Running => "running",
            RunPhase::Joined => "joined",
            RunPhase::Compiling => "compiling",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Registers fan-out tasks and checks the field ownership contract.
#[derive(Default)]
pub struct WorkflowBuilder {
    tasks: Vec<Arc<dyn Task>>,
    deadline: Option<Duration>,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(mut self, task: Arc<dyn Task>) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn tasks<I>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Task>>,
    {
        self.tasks.extend(tasks);
        self
    }

    /// Abort tasks still running after `deadline`. `None` waits indefinitely.
    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Validate the graph: at least one task, unique names, one owner per field.
    pub fn build(self) -> Result<ReconWorkflow> {
        if self.tasks.is_empty() {
            return Err(AppError::Configuration(
                "workflow has no tasks registered".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut owners: Vec<(StateField, &str)> = Vec::new();
        for task in &self.tasks {
            if !names.insert(task.name()) {
                return Err(AppError::ContractViolation(format!(
                    "task name '{}' registered twice",
                    task.name()
                )));
            }
            if let Some((_, owner)) = owners.iter().find(|(f, _)| *f == task.field()) {
                return Err(AppError::ContractViolation(format!(
                    "tasks '{}' and '{}' both claim field '{}'",
                    owner,
                    task.name(),
                    task.field()
                )));
            }
            owners.push((task.field(), task.name()));
        }

        Ok(ReconWorkflow {
            tasks: self.tasks,
            scheduler: Scheduler::with_deadline(self.deadline),
        })
    }
}

/// A validated fan-out/join graph, reusable across targets.
pub struct ReconWorkflow {
    tasks: Vec<Arc<dyn Task>>,
    scheduler: Scheduler,
}

impl fmt::Debug for ReconWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconWorkflow")
            .field("tasks", &self.task_names())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl ReconWorkflow {
    pub fn builder() -> WorkflowBuilder {
        WorkflowBuilder::new()
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    pub fn fields(&self) -> Vec<StateField> {
        self.tasks.iter().map(|t| t.field()).collect()
    }

    /// Run every task against the target and return the final state, report included.
    ///
    /// Errors only on a contract violation; task failures end up in `errors`.
    pub async fn invoke(&self, target: Target) -> Result<ReconState> {
        let mut phase = RunPhase::Created;
        let mut state = ReconState::new(target.clone(), &self.fields());
        debug!(%phase, target = %target, tasks = self.tasks.len(), "run created");

        phase = RunPhase::Running;
        info!(%phase, target = %target, "dispatching {} tasks", self.tasks.len());
        let outcomes = self.scheduler.run_all(&self.tasks, Arc::new(target)).await;

        phase = RunPhase::Joined;
        let failed = outcomes.iter().filter(|o| !o.is_written()).count();
        info!(%phase, completed = outcomes.len(), failed, "all tasks joined");
        Reducer::fold(&mut state, outcomes)?;

        phase = RunPhase::Compiling;
        debug!(%phase, "compiling report");
        let report = ReportCompiler::compile(&state);
        state.set_final_report(report);

        phase = RunPhase::Done;
        info!(%phase, errors = state.errors().len(), "run finished");
        Ok(state)
    }

    /// Entry point: `target -> { report, errors }`.
    pub async fn run(&self, target: &str) -> Result<WorkflowOutput> {
        let target = Target::parse(target)?;
        let start = std::time::Instant::now();
        let state = self.invoke(target).await?;

        let report = state
            .final_report()
            .cloned()
            .unwrap_or_else(|| ReportCompiler::compile(&state));

        Ok(WorkflowOutput {
            errors: state.errors().to_vec(),
            report,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Named(&'static str, StateField);

    #[async_trait]
    impl Task for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn field(&self) -> StateField {
            self.1
        }

        fn description(&self) -> &str {
            "test task"
        }

        async fn run(&self, target: &Target) -> anyhow::Result<String> {
            Ok(format!("{} on {}", self.0, target))
        }
    }

    #[test]
    fn test_build_rejects_empty_workflow() {
        let err = WorkflowBuilder::new().build().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_build_rejects_shared_field() {
        let err = WorkflowBuilder::new()
            .task(Arc::new(Named("web", StateField::WebRecon)))
            .task(Arc::new(Named("web2", StateField::WebRecon)))
            .build()
            .unwrap_err();
        assert!(matches!(err, AppError::ContractViolation(_)));
        assert!(err.to_string().contains("web_recon_results"));
    }

    #[test]
    fn test_build_rejects_duplicate_name() {
        let err = WorkflowBuilder::new()
            .task(Arc::new(Named("web", StateField::WebRecon)))
            .task(Arc::new(Named("web", StateField::Osint)))
            .build()
            .unwrap_err();
        assert!(matches!(err, AppError::ContractViolation(_)));
    }

    #[tokio::test]
    async fn test_invoke_populates_report() {
        let workflow = ReconWorkflow::builder()
            .task(Arc::new(Named("web", StateField::WebRecon)))
            .task(Arc::new(Named("subs", StateField::SubdomainRecon)))
            .build()
            .unwrap();

        let state = workflow
            .invoke(Target::parse("example.com").unwrap())
            .await
            .unwrap();
        let report = state.final_report().unwrap();

        assert_eq!(report.sections.len(), 2);
        assert_eq!(
            report.section("Subdomain_Reconnaissance"),
            Some("subs on example.com")
        );
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_target() {
        let workflow = ReconWorkflow::builder()
            .task(Arc::new(Named("web", StateField::WebRecon)))
            .build()
            .unwrap();
        let err = workflow.run("  ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(RunPhase::Compiling.to_string(), "compiling");
        assert_eq!(RunPhase::Done.to_string(), "done");
    }
}
