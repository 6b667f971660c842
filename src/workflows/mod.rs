//! Orchestration Engine Module
//!
//! Fans a single [`Target`] out to independent [`Task`]s, runs them
//! concurrently, joins on all of them, folds their outcomes into a
//! [`ReconState`] and compiles the terminal [`Report`].
//!
//! ```text
//!            ┌─> web_recon ───────┐
//! target ────┼─> osint ───────────┼──> join ──> reduce ──> compile_report
//!            ├─> vuln_scan ───────┤
//!            └─> subdomain_recon ─┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let workflow = ReconWorkflow::builder()
//!     .task(web_agent)
//!     .task(osint_agent)
//!     .deadline(Some(Duration::from_secs(600)))
//!     .build()?;
//!
//! let output = workflow.run("example.com").await?;
//! println!("{}", output.report.to_json_pretty()?);
//! ```

pub mod engine;
pub mod recon;
pub mod reducer;
pub mod report;
pub mod scheduler;
pub mod state;
pub mod target;
pub mod task;

pub use engine::{ReconWorkflow, RunPhase, WorkflowBuilder, WorkflowOutput};
pub use recon::{build_recon_workflow, connect_llm, run_recon, ScanOptions};
pub use reducer::Reducer;
pub use report::{Report, ReportCompiler, ReportSection, PLACEHOLDER};
pub use scheduler::Scheduler;
pub use state::{ReconState, Slot, StateField};
pub use target::Target;
pub use task::{Task, TaskOutcome};
