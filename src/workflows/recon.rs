//! The concrete reconnaissance workflow: built-in agents wired into the engine.

use super::engine::{ReconWorkflow, WorkflowOutput};
use super::target::Target;
use crate::agents::AgentRegistry;
use crate::llm::{LLMClient, OpenAIClient};
use crate::tools::registry::ToolRegistry;
use crate::types::Result;
use crate::utils::toml_config::ArgusConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Per-run overrides on top of `argus.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Drive agents with the LLM. False runs each agent's tools directly.
    pub use_llm: bool,
    pub deadline: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            use_llm: true,
            deadline: None,
        }
    }
}

impl ScanOptions {
    pub fn from_config(config: &ArgusConfig) -> Self {
        Self {
            use_llm: config.llm.enabled,
            deadline: config.deadline(),
        }
    }
}

/// Client for the `[llm]` section, with the key read from its env var.
pub fn connect_llm(config: &ArgusConfig) -> Result<Arc<dyn LLMClient>> {
    let api_key = config.llm_api_key()?;
    Ok(Arc::new(OpenAIClient::from_config(&config.llm, api_key)?))
}

/// Register every enabled agent as a fan-out task.
pub fn build_recon_workflow(
    config: &ArgusConfig,
    llm: Option<Arc<dyn LLMClient>>,
    deadline: Option<Duration>,
) -> Result<ReconWorkflow> {
    let tools = Arc::new(ToolRegistry::with_config(config)?);
    let agents = AgentRegistry::from_config(config, tools, llm)?;

    ReconWorkflow::builder()
        .tasks(agents.tasks())
        .deadline(deadline)
        .build()
}

/// Validate configuration, build the workflow and run it against `target`.
///
/// Fails before any task starts when the target or the configuration is
/// unusable (for example a missing API key with the LLM enabled).
pub async fn run_recon(
    config: &ArgusConfig,
    target: &str,
    options: &ScanOptions,
) -> Result<WorkflowOutput> {
    Target::parse(target)?;

    let mut config = config.clone();
    config.llm.enabled = options.use_llm;
    config.validate()?;

    let llm = if options.use_llm {
        Some(connect_llm(&config)?)
    } else {
        None
    };

    let workflow = build_recon_workflow(&config, llm, options.deadline)?;
    info!(
        target,
        agents = ?workflow.task_names(),
        llm = options.use_llm,
        deadline = ?options.deadline,
        "starting reconnaissance"
    );
    workflow.run(target).await
}
