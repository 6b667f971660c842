//! # Argus - Concurrent Reconnaissance Orchestrator
//!
//! Argus fans a single target (a domain or URL) out to independent recon
//! agents, runs them concurrently, waits for all of them, merges their results
//! into one state and compiles a report. One agent failing never stops the
//! others; its error is recorded and its report section gets a placeholder.
//!
//! ## Overview
//!
//! Argus can be used in two ways:
//!
//! 1. **As a CLI** - Run the `argus` binary (`argus scan example.com`)
//! 2. **As a library** - Build workflows from your own [`Task`]s
//!
//! ### Custom Tasks
//!
//! ```rust,ignore
//! use argus::{ReconWorkflow, StateField, Target, Task};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct Headers;
//!
//! #[async_trait]
//! impl Task for Headers {
//!     fn name(&self) -> &str { "headers" }
//!     fn field(&self) -> StateField { StateField::WebRecon }
//!     fn description(&self) -> &str { "Fetch response headers" }
//!     async fn run(&self, target: &Target) -> anyhow::Result<String> {
//!         let resp = reqwest::get(target.url().clone()).await?;
//!         Ok(format!("{:?}", resp.headers()))
//!     }
//! }
//!
//! let workflow = ReconWorkflow::builder().task(Arc::new(Headers)).build()?;
//! let output = workflow.run("example.com").await?;
//! println!("{}", output.report.to_json_pretty()?);
//! ```
//!
//! ### Configuration-Driven Setup
//!
//! ```rust,ignore
//! use argus::{run_recon, ArgusConfig, ScanOptions};
//!
//! let config = ArgusConfig::load(None)?;
//! let options = ScanOptions::from_config(&config);
//! let output = run_recon(&config, "example.com", &options).await?;
//! ```
//!
//! ## Modules
//!
//! - [`workflows`] - Orchestration engine: task contract, scheduler, reducer, report
//! - [`agents`] - Built-in recon agents
//! - [`tools`] - Recon tools and registry
//! - [`llm`] - LLM client implementations
//! - [`reporting`] - JSON and Markdown report files
//! - [`types`] - Common types and error handling
//! - [`utils`] - `argus.toml` configuration

/// Built-in recon agents.
pub mod agents;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Report persistence (JSON, Markdown).
pub mod reporting;
/// Built-in recon tools.
pub mod tools;
/// Core types and errors.
pub mod types;
/// Configuration utilities.
pub mod utils;
/// Fan-out/join orchestration engine.
pub mod workflows;

// Re-export commonly used types
pub use agents::AgentRegistry;
pub use llm::{LLMClient, LLMResponse, OpenAIClient};
pub use tools::registry::{Tool, ToolRegistry};
pub use types::{AppError, Result};
pub use utils::toml_config::ArgusConfig;
pub use workflows::{
    build_recon_workflow, run_recon, ReconState, ReconWorkflow, Report, ScanOptions, StateField,
    Target, Task, TaskOutcome, WorkflowOutput,
};
