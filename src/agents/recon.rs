//! Recon agent: a [`Task`] driven by an LLM tool-calling loop, or by running
//! its tools directly when no model is configured.

use crate::agents::profiles::AgentProfile;
use crate::llm::{ConversationMessage, LLMClient};
use crate::tools::registry::ToolRegistry;
use crate::tools::render_output;
use crate::types::{ToolCall, ToolDefinition};
use crate::utils::toml_config::AgentConfig;
use crate::workflows::{StateField, Target, Task};
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct ReconAgent {
    profile: &'static AgentProfile,
    system_prompt: String,
    llm: Option<Arc<dyn LLMClient>>,
    tool_registry: Arc<ToolRegistry>,
    allowed_tools: Vec<String>,
    max_tool_iterations: usize,
    parallel_tools: bool,
    timeout: Duration,
}

/// One executed tool call, as fed back to the model.
struct ToolCallRecord {
    id: String,
    name: String,
    content: String,
    success: bool,
}

impl ReconAgent {
    pub fn new(
        profile: &'static AgentProfile,
        config: &AgentConfig,
        allowed_tools: Vec<String>,
        tool_registry: Arc<ToolRegistry>,
        llm: Option<Arc<dyn LLMClient>>,
    ) -> Self {
        let system_prompt = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| profile.system_prompt());

        Self {
            profile,
            system_prompt,
            llm,
            tool_registry,
            allowed_tools,
            max_tool_iterations: config.max_tool_iterations,
            parallel_tools: config.parallel_tools,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn profile(&self) -> &'static AgentProfile {
        self.profile
    }

    pub fn allowed_tools(&self) -> &[String] {
        &self.allowed_tools
    }

    pub fn uses_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub fn max_tool_iterations(&self) -> usize {
        self.max_tool_iterations
    }

    pub fn can_use_tool(&self, tool_name: &str) -> bool {
        self.allowed_tools.iter().any(|t| t == tool_name) && self.tool_registry.has_tool(tool_name)
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry.definitions_for(&self.allowed_tools)
    }

    async fn investigate(&self, target: &Target) -> anyhow::Result<String> {
        match self.llm {
            Some(ref llm) => self.run_with_llm(llm.as_ref(), target).await,
            None => self.run_direct(target).await,
        }
    }

    /// Let the model pick tools until it answers without requesting any.
    async fn run_with_llm(&self, llm: &dyn LLMClient, target: &Target) -> anyhow::Result<String> {
        let tools = self.tool_definitions();
        let mut messages = vec![
            ConversationMessage::system(&self.system_prompt),
            ConversationMessage::user(self.profile.instruction(target.as_str())),
        ];

        for iteration in 0..self.max_tool_iterations {
            let response = llm
                .chat_with_tools(&messages, &tools)
                .await
                .with_context(|| format!("{} request failed", llm.model_name()))?;

            if response.tool_calls.is_empty() {
                let answer = response.content.trim();
                if answer.is_empty() {
                    bail!("model returned an empty answer");
                }
                debug!(agent = self.profile.name, iterations = iteration + 1, "agent finished");
                return Ok(answer.to_string());
            }

            messages.push(ConversationMessage::assistant(
                &response.content,
                response.tool_calls.clone(),
            ));

            for record in self.execute_tool_calls(&response.tool_calls).await {
                if !record.success {
                    debug!(agent = self.profile.name, tool = %record.name, "tool call failed");
                }
                messages.push(ConversationMessage::tool_result(record.id, record.content));
            }
        }

        bail!(
            "no final answer after {} tool iterations",
            self.max_tool_iterations
        )
    }

    async fn execute_tool_calls(&self, calls: &[ToolCall]) -> Vec<ToolCallRecord> {
        if self.parallel_tools {
            join_all(calls.iter().map(|call| self.execute_single_tool(call))).await
        } else {
            let mut records = Vec::with_capacity(calls.len());
            for call in calls {
                records.push(self.execute_single_tool(call).await);
            }
            records
        }
    }

    async fn execute_single_tool(&self, call: &ToolCall) -> ToolCallRecord {
        let start = Instant::now();
        let result = if self.can_use_tool(&call.name) {
            self.tool_registry
                .execute(&call.name, call.arguments.clone())
                .await
                .map_err(|e| e.to_string())
        } else {
            Err(format!("Tool '{}' is not available to this agent", call.name))
        };
        debug!(
            tool = %call.name,
            duration_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "tool call"
        );

        match result {
            Ok(value) => ToolCallRecord {
                id: call.id.clone(),
                name: call.name.clone(),
                content: render_output(&value),
                success: true,
            },
            Err(e) => ToolCallRecord {
                id: call.id.clone(),
                name: call.name.clone(),
                content: json!({ "error": e }).to_string(),
                success: false,
            },
        }
    }

    /// Run every allowed tool against the target and concatenate the outputs.
    async fn run_direct(&self, target: &Target) -> anyhow::Result<String> {
        let tools: Vec<_> = self
            .allowed_tools
            .iter()
            .filter_map(|name| self.tool_registry.get(name))
            .collect();
        if tools.is_empty() {
            bail!("no tools available");
        }

        let runs = tools.iter().map(|tool| async move {
            let result = tool.execute(tool.target_args(target)).await;
            (tool.name().to_string(), result)
        });
        let results = join_all(runs).await;

        let mut sections = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (name, result) in results {
            match result {
                Ok(value) => {
                    let text = render_output(&value);
                    sections.push(format!("### {}\n{}", name, text.trim_end()));
                }
                Err(e) => {
                    warn!(agent = self.profile.name, tool = %name, error = %e, "tool failed");
                    sections.push(format!("### {}\nError: {}", name, e));
                    failures.push(format!("{}: {}", name, e));
                }
            }
        }

        if failures.len() == sections.len() {
            return Err(anyhow!("all tools failed ({})", failures.join("; ")));
        }
        Ok(sections.join("\n\n"))
    }
}

#[async_trait]
impl Task for ReconAgent {
    fn name(&self) -> &str {
        self.profile.name
    }

    fn field(&self) -> StateField {
        self.profile.field
    }

    fn description(&self) -> &str {
        self.profile.goal
    }

    async fn run(&self, target: &Target) -> anyhow::Result<String> {
        info!(
            agent = self.profile.name,
            mode = if self.uses_llm() { "llm" } else { "direct" },
            tools = self.allowed_tools.len(),
            "agent started"
        );
        tokio::time::timeout(self.timeout, self.investigate(target))
            .await
            .map_err(|_| anyhow!("agent timed out after {}s", self.timeout.as_secs()))?
    }
}
