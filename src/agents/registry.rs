//! Agent Registry
//!
//! Builds the enabled recon agents from `argus.toml` and hands them to the
//! workflow as [`Task`]s, in report order.

use crate::agents::profiles::{self, AgentProfile};
use crate::agents::recon::ReconAgent;
use crate::llm::LLMClient;
use crate::tools::registry::ToolRegistry;
use crate::types::{AppError, Result};
use crate::utils::toml_config::ArgusConfig;
use crate::workflows::Task;
use std::sync::Arc;

pub struct AgentRegistry {
    agents: Vec<Arc<ReconAgent>>,
}

impl AgentRegistry {
    /// Create every enabled agent with its configured tool set.
    pub fn from_config(
        config: &ArgusConfig,
        tool_registry: Arc<ToolRegistry>,
        llm: Option<Arc<dyn LLMClient>>,
    ) -> Result<Self> {
        let mut agents = Vec::new();
        for name in config.enabled_agents() {
            let profile: &'static AgentProfile = profiles::profile(name)
                .ok_or_else(|| AppError::Configuration(format!("Unknown agent: {}", name)))?;
            agents.push(Arc::new(ReconAgent::new(
                profile,
                &config.agent(name),
                config.agent_tools(name),
                Arc::clone(&tool_registry),
                llm.clone(),
            )));
        }
        Ok(Self { agents })
    }

    pub fn get(&self, name: &str) -> Option<Arc<ReconAgent>> {
        self.agents
            .iter()
            .find(|a| a.profile().name == name)
            .cloned()
    }

    pub fn agent_names(&self) -> Vec<&'static str> {
        self.agents.iter().map(|a| a.profile().name).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// The agents as workflow tasks
    pub fn tasks(&self) -> Vec<Arc<dyn Task>> {
        self.agents
            .iter()
            .map(|a| Arc::clone(a) as Arc<dyn Task>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools(config: &ArgusConfig) -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::with_config(config).unwrap())
    }

    #[test]
    fn test_all_agents_by_default() {
        let config = ArgusConfig::default();
        let registry = AgentRegistry::from_config(&config, tools(&config), None).unwrap();
        assert_eq!(
            registry.agent_names(),
            vec!["web_recon", "osint", "subdomain_recon", "vuln_scan"]
        );
        assert_eq!(registry.tasks().len(), 4);
    }

    #[test]
    fn test_disabled_agent_is_skipped() {
        let config = ArgusConfig::from_toml_str("[agents.vuln_scan]\nenabled = false\n").unwrap();
        let registry = AgentRegistry::from_config(&config, tools(&config), None).unwrap();
        assert!(registry.get("vuln_scan").is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_configured_tool_subset() {
        let config =
            ArgusConfig::from_toml_str("[agents.osint]\ntools = [\"dns_lookup\"]\n").unwrap();
        let registry = AgentRegistry::from_config(&config, tools(&config), None).unwrap();
        let osint = registry.get("osint").unwrap();
        assert_eq!(osint.allowed_tools(), ["dns_lookup".to_string()]);
        assert!(!osint.uses_llm());
    }
}
