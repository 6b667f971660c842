//! TOML-based configuration for Argus
//!
//! Declarative configuration for the LLM endpoint, the run deadline, report
//! output, per-agent overrides and per-tool settings via `argus.toml`.
//! Every section is optional; a missing file yields the built-in defaults.
//!
//! ```toml
//! [llm]
//! model = "gpt-4o-mini"
//! api_key_env = "OPENAI_API_KEY"
//!
//! [workflow]
//! deadline_secs = 600
//!
//! [agents.vuln_scan]
//! tools = ["shodan_lookup"]
//!
//! [tools.shodan_lookup]
//! api_key_env = "SHODAN_API_KEY"
//! ```

use crate::agents::profiles;
use crate::reporting::ReportFormat;
use crate::tools::BUILTIN_TOOLS;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "argus.toml";

/// Root configuration structure loaded from argus.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArgusConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Per-agent overrides, keyed by task name
    #[serde(default)]
    pub agents: HashMap<String, AgentConfig>,

    /// Tool configurations
    #[serde(default)]
    pub tools: HashMap<String, ToolConfig>,
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Drive agents through the LLM tool-calling loop. When false, agents run
    /// their tools directly and concatenate the raw output.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

// ============= Workflow Configuration =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Abort tasks still running after this many seconds. Unset waits forever.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

// ============= Output Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    #[serde(default)]
    pub format: ReportFormat,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: ReportFormat::default(),
        }
    }
}

// ============= Agent Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Tool names this agent may use. Unset keeps the agent's built-in set.
    #[serde(default)]
    pub tools: Option<Vec<String>>,

    /// Replaces the generated role/goal/backstory system prompt
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Maximum tool calling iterations
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,

    /// Whether to execute tools in parallel
    #[serde(default)]
    pub parallel_tools: bool,

    #[serde(default = "default_agent_timeout")]
    pub timeout_secs: u64,
}

fn default_max_tool_iterations() -> usize {
    10
}

fn default_agent_timeout() -> u64 {
    300
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tools: None,
            system_prompt: None,
            max_tool_iterations: default_max_tool_iterations(),
            parallel_tools: false,
            timeout_secs: default_agent_timeout(),
        }
    }
}

// ============= Tool Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,

    /// Additional tool-specific configuration (`base_url`, `api_key_env`, ...)
    #[serde(flatten)]
    pub extra: HashMap<String, toml::Value>,
}

fn default_true() -> bool {
    true
}

fn default_tool_timeout() -> u64 {
    30
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_tool_timeout(),
            extra: HashMap::new(),
        }
    }
}

impl ToolConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A string-valued tool-specific setting.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// An integer-valued tool-specific setting.
    pub fn extra_int(&self, key: &str) -> Option<i64> {
        self.extra.get(key).and_then(|v| v.as_integer())
    }
}

// ============= Configuration Loading & Validation =============

/// Configuration warnings that don't prevent operation but may indicate issues
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarningKind {
    UnusedTool,
    DisabledAgent,
    DisabledTool,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Tool '{0}' referenced by agent '{1}' does not exist")]
    MissingTool(String, String),

    #[error("Unknown agent '{0}'")]
    UnknownAgent(String),
}

impl ArgusConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `argus.toml` in the working
    /// directory is used when present and the defaults otherwise. The result
    /// is not validated so that command-line overrides can be applied first.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        let known_tools: HashSet<&str> = BUILTIN_TOOLS.iter().copied().collect();

        for (name, agent) in &self.agents {
            if profiles::profile(name).is_none() {
                return Err(ConfigError::UnknownAgent(name.clone()));
            }
            if let Some(ref tools) = agent.tools {
                for tool in tools {
                    if !known_tools.contains(tool.as_str()) {
                        return Err(ConfigError::MissingTool(tool.clone(), name.clone()));
                    }
                }
            }
            if agent.max_tool_iterations == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "agent '{}' must allow at least one tool iteration",
                    name
                )));
            }
        }

        for name in self.tools.keys() {
            if !known_tools.contains(name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Unknown tool '{}' in [tools]",
                    name
                )));
            }
        }

        if self.enabled_agents().is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one agent must be enabled".to_string(),
            ));
        }

        if self.workflow.deadline_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "workflow.deadline_secs must be greater than zero".to_string(),
            ));
        }

        if self.llm.enabled {
            if !(0.0..=2.0).contains(&self.llm.temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "llm.temperature must be between 0.0 and 2.0, got {}",
                    self.llm.temperature
                )));
            }
            self.validate_env_var(&self.llm.api_key_env)?;
        }

        Ok(())
    }

    /// Validate configuration with warnings for unused or disabled items
    ///
    /// Returns Ok with warnings, or Err if validation fails
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(self.check_disabled_agents());
        warnings.extend(self.check_unused_tools());
        warnings.extend(self.check_disabled_tools());
        Ok(warnings)
    }

    fn check_disabled_agents(&self) -> Vec<ConfigWarning> {
        let mut names: Vec<&String> = self
            .agents
            .iter()
            .filter(|(_, agent)| !agent.enabled)
            .map(|(name, _)| name)
            .collect();
        names.sort();

        names
            .into_iter()
            .map(|name| ConfigWarning {
                kind: ConfigWarningKind::DisabledAgent,
                message: format!(
                    "Agent '{}' is disabled; its report section will be omitted",
                    name
                ),
            })
            .collect()
    }

    /// Tools configured under [tools] that no enabled agent uses
    fn check_unused_tools(&self) -> Vec<ConfigWarning> {
        let referenced: HashSet<String> = self
            .enabled_agents()
            .into_iter()
            .flat_map(|name| self.agent_tools(name))
            .collect();

        let mut names: Vec<&String> = self
            .tools
            .keys()
            .filter(|name| !referenced.contains(name.as_str()))
            .collect();
        names.sort();

        names
            .into_iter()
            .map(|name| ConfigWarning {
                kind: ConfigWarningKind::UnusedTool,
                message: format!(
                    "Tool '{}' is configured but not used by any enabled agent",
                    name
                ),
            })
            .collect()
    }

    fn check_disabled_tools(&self) -> Vec<ConfigWarning> {
        let mut names: Vec<&String> = self
            .tools
            .iter()
            .filter(|(_, tool)| !tool.enabled)
            .map(|(name, _)| name)
            .collect();
        names.sort();

        names
            .into_iter()
            .map(|name| ConfigWarning {
                kind: ConfigWarningKind::DisabledTool,
                message: format!("Tool '{}' is disabled", name),
            })
            .collect()
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Get the LLM API key from the environment
    pub fn llm_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.llm.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.llm.api_key_env.clone()))
    }

    /// Agent settings, falling back to defaults for agents not listed in the file
    pub fn agent(&self, name: &str) -> AgentConfig {
        self.agents.get(name).cloned().unwrap_or_default()
    }

    /// Tool settings, falling back to defaults for tools not listed in the file
    pub fn tool(&self, name: &str) -> ToolConfig {
        self.tools.get(name).cloned().unwrap_or_default()
    }

    /// Names of enabled agents, in report order
    pub fn enabled_agents(&self) -> Vec<&'static str> {
        profiles::PROFILES
            .iter()
            .filter(|p| self.agents.get(p.name).map(|a| a.enabled).unwrap_or(true))
            .map(|p| p.name)
            .collect()
    }

    /// Enabled tools available to an agent (configured list or built-in set)
    pub fn agent_tools(&self, agent_name: &str) -> Vec<String> {
        let configured = self.agents.get(agent_name).and_then(|a| a.tools.clone());
        let tools = match configured {
            Some(tools) => tools,
            None => profiles::profile(agent_name)
                .map(|p| p.tools.iter().map(|t| t.to_string()).collect())
                .unwrap_or_default(),
        };

        tools
            .into_iter()
            .filter(|t| self.tools.get(t).map(|tc| tc.enabled).unwrap_or(true))
            .collect()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.workflow.deadline_secs.map(Duration::from_secs)
    }
}
