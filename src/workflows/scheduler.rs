//! Concurrent fan-out and full join.
//!
//! Every task is spawned onto its own tokio task. Outcomes are collected by a
//! single consumer in completion order and returned only after the last task
//! has finished. A failing or panicking task never affects the others.
//!
//! With a deadline configured, tasks still running when it elapses are
//! aborted and reported as failures, so the join always yields one outcome
//! per task. Aborting is cooperative: a task stuck in blocking code without
//! an `.await` point cannot be interrupted.

use super::state::StateField;
use super::target::Target;
use super::task::{Task, TaskOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{Id, JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{error, info, warn, Instrument};

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    deadline: Option<Duration>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Option<Duration>) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Run all tasks against the target and wait for every one of them.
    pub async fn run_all(&self, tasks: &[Arc<dyn Task>], target: Arc<Target>) -> Vec<TaskOutcome> {
        let mut set = JoinSet::new();
        let mut pending: HashMap<Id, (String, StateField)> = HashMap::with_capacity(tasks.len());

        for task in tasks {
            let task = Arc::clone(task);
            let target = Arc::clone(&target);
            let name = task.name().to_string();
            let field = task.field();
            let span = tracing::info_span!("task", name = %name, field = %field);

            let handle = set.spawn(
                async move {
                    info!(description = task.description(), "task started");
                    let outcome = task.execute(&target).await;
                    match &outcome {
                        TaskOutcome::Written { value, .. } => {
                            info!(bytes = value.len(), "task completed")
                        }
                        TaskOutcome::Failed { message, .. } => warn!(%message, "task failed"),
                    }
                    outcome
                }
                .instrument(span),
            );
            pending.insert(handle.id(), (name, field));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        let expires_at = self.deadline.map(|d| Instant::now() + d);

        loop {
            let next = match expires_at {
                Some(at) => match tokio::time::timeout_at(at, set.join_next_with_id()).await {
                    Ok(next) => next,
                    Err(_) => break,
                },
                None => set.join_next_with_id().await,
            };
            match next {
                Some(joined) => Self::collect(joined, &mut pending, &mut outcomes, self.deadline),
                None => break,
            }
        }

        if !set.is_empty() {
            warn!(
                in_flight = set.len(),
                deadline = ?self.deadline,
                "deadline exceeded, aborting remaining tasks"
            );
            set.abort_all();
            while let Some(joined) = set.join_next_with_id().await {
                Self::collect(joined, &mut pending, &mut outcomes, self.deadline);
            }
        }

        outcomes
    }

    fn collect(
        joined: Result<(Id, TaskOutcome), JoinError>,
        pending: &mut HashMap<Id, (String, StateField)>,
        outcomes: &mut Vec<TaskOutcome>,
        deadline: Option<Duration>,
    ) {
        match joined {
            Ok((id, outcome)) => {
                pending.remove(&id);
                outcomes.push(outcome);
            }
            Err(err) => {
                let Some((name, field)) = pending.remove(&err.id()) else {
                    error!(error = %err, "join error for an untracked task");
                    return;
                };
                let reason = if err.is_cancelled() {
                    match deadline {
                        Some(d) => format!("deadline of {:?} exceeded", d),
                        None => "task was cancelled".to_string(),
                    }
                } else {
                    format!("task panicked: {}", panic_message(err))
                };
                error!(task = %name, %field, %reason, "task did not complete");
                outcomes.push(TaskOutcome::failed(name, field, reason));
            }
        }
    }
}

fn panic_message(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => {
            if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            }
        }
        Err(err) => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Sleeper {
        name: &'static str,
        field: StateField,
        delay: Duration,
    }

    #[async_trait]
    impl Task for Sleeper {
        fn name(&self) -> &str {
            self.name
        }

        fn field(&self) -> StateField {
            self.field
        }

        fn description(&self) -> &str {
            "sleeps then succeeds"
        }

        async fn run(&self, _target: &Target) -> anyhow::Result<String> {
            tokio::time::sleep(self.delay).await;
            Ok(format!("{} done", self.name))
        }
    }

    struct Panicker;

    #[async_trait]
    impl Task for Panicker {
        fn name(&self) -> &str {
            "boom"
        }

        fn field(&self) -> StateField {
            StateField::Osint
        }

        fn description(&self) -> &str {
            "panics"
        }

        async fn run(&self, _target: &Target) -> anyhow::Result<String> {
            panic!("resolver exploded");
        }
    }

    fn target() -> Arc<Target> {
        Arc::new(Target::parse("example.com").unwrap())
    }

    fn sleeper(name: &'static str, field: StateField, ms: u64) -> Arc<dyn Task> {
        Arc::new(Sleeper {
            name,
            field,
            delay: Duration::from_millis(ms),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcomes_in_completion_order() {
        let tasks = vec![
            sleeper("slow", StateField::WebRecon, 300),
            sleeper("fast", StateField::Osint, 100),
            sleeper("mid", StateField::VulnerabilityScan, 200),
        ];

        let outcomes = Scheduler::new().run_all(&tasks, target()).await;
        let order: Vec<&str> = outcomes.iter().map(|o| o.task()).collect();
        assert_eq!(order, ["fast", "mid", "slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tasks_run_concurrently() {
        let tasks = vec![
            sleeper("a", StateField::WebRecon, 1000),
            sleeper("b", StateField::Osint, 1000),
            sleeper("c", StateField::SubdomainRecon, 1000),
        ];

        let start = Instant::now();
        let outcomes = Scheduler::new().run_all(&tasks, target()).await;
        assert_eq!(outcomes.len(), 3);
        assert!(start.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let tasks: Vec<Arc<dyn Task>> = vec![
            Arc::new(Panicker),
            sleeper("web", StateField::WebRecon, 10),
        ];

        let outcomes = Scheduler::new().run_all(&tasks, target()).await;
        assert_eq!(outcomes.len(), 2);

        let failed = outcomes.iter().find(|o| o.task() == "boom").unwrap();
        match failed {
            TaskOutcome::Failed { message, .. } => {
                assert_eq!(message, "OSINT Error: task panicked: resolver exploded");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(outcomes.iter().any(|o| o.task() == "web" && o.is_written()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_aborts_stragglers() {
        let tasks = vec![
            sleeper("quick", StateField::WebRecon, 100),
            sleeper("hung", StateField::Osint, 60_000),
        ];

        let scheduler = Scheduler::with_deadline(Some(Duration::from_secs(5)));
        let outcomes = scheduler.run_all(&tasks, target()).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_written());
        assert_eq!(
            outcomes[1],
            TaskOutcome::failed("hung", StateField::Osint, "deadline of 5s exceeded")
        );
    }

    #[tokio::test]
    async fn test_empty_task_list() {
        let outcomes = Scheduler::new().run_all(&[], target()).await;
        assert!(outcomes.is_empty());
    }
}
