use crate::tools::{network, osint, subdomain, tls, web};
use crate::types::{AppError, Result, ToolDefinition};
use crate::utils::toml_config::ArgusConfig;
use crate::workflows::Target;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, args: Value) -> Result<Value>;

    /// Arguments for running this tool directly against a target, without an LLM
    /// choosing them. Defaults to the full target URL under `url`.
    fn target_args(&self, target: &Target) -> Value {
        json!({ "url": target.url().as_str() })
    }
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a registry with every built-in recon tool enabled in `config`
    pub fn with_config(config: &ArgusConfig) -> Result<Self> {
        let mut registry = Self::new();

        let tool = |name: &str| config.tool(name);
        let candidates: Vec<Arc<dyn Tool>> = vec![
            Arc::new(web::WebScraper::new(&tool("web_scraper"))?),
            Arc::new(web::HttpHeaderAnalyzer::new(&tool("http_header_analyzer"))?),
            Arc::new(web::TechnologyDetector::new(&tool("technology_detection"))?),
            Arc::new(web::DirectoryBruteForce::new(&tool("directory_brute_force"))?),
            Arc::new(web::EmailHarvester::new(&tool("email_harvester"))?),
            Arc::new(tls::SslCertificateInfo::new(&tool("ssl_certificate_info"))?),
            Arc::new(osint::WhoisLookup::new(&tool("whois_lookup"))),
            Arc::new(osint::DnsLookup::new(&tool("dns_lookup"))?),
            Arc::new(osint::WaybackMachine::new(&tool("wayback_machine"))?),
            Arc::new(network::ShodanLookup::new(&tool("shodan_lookup"))?),
            Arc::new(network::NmapPortScanner::new(&tool("nmap_port_scanner"))),
            Arc::new(subdomain::SubdomainEnumeration::new(&tool("subdomain_enumeration"))?),
        ];

        for candidate in candidates {
            if config.tool(candidate.name()).enabled {
                registry.register(candidate);
            }
        }

        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut names = self.tool_names();
        names.sort();
        self.definitions_for(&names)
    }

    /// Definitions for the named tools that are registered, in the given order
    pub fn definitions_for(&self, names: &[String]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        if let Some(tool) = self.tools.get(name) {
            tool.execute(args).await
        } else {
            Err(AppError::NotFound(format!("Tool not found: {}", name)))
        }
    }

    /// Get a list of all registered tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}
