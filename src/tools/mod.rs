//! Built-in Reconnaissance Tools
//!
//! Tools are the actions agents can take against a target. Each implements
//! [`Tool`](crate::tools::registry::Tool): a name, a description, a JSON schema
//! for its arguments and an async `execute`. All tools return a JSON object
//! with a human-readable `output` field and report failures as
//! [`AppError::Tool`](crate::types::AppError::Tool).
//!
//! # Module Structure
//!
//! - [`web`](crate::tools::web) - Scraping, headers, fingerprinting, path probing, e-mails
//! - [`osint`](crate::tools::osint) - WHOIS, DNS and Wayback Machine lookups
//! - [`network`](crate::tools::network) - Shodan host data and nmap port scans
//! - [`subdomain`](crate::tools::subdomain) - Certificate transparency enumeration
//! - [`tls`](crate::tools::tls) - TLS certificate details
//! - [`registry`](crate::tools::registry) - Tool registration and discovery
//!
//! # Tool Registry
//!
//! ```ignore
//! let registry = ToolRegistry::with_config(&config)?;
//! let result = registry.execute("dns_lookup", json!({"domain": "example.com"})).await?;
//! println!("{}", result["output"]);
//! ```

/// Shodan and nmap.
pub mod network;
/// WHOIS, DNS, Wayback Machine.
pub mod osint;
/// Tool registry for managing available tools.
pub mod registry;
/// crt.sh subdomain enumeration.
pub mod subdomain;
/// Certificate inspection over a TLS handshake.
pub mod tls;
/// HTTP-based web reconnaissance tools.
pub mod web;

use crate::types::{AppError, Result};
use crate::utils::toml_config::ToolConfig;
use serde_json::Value;

/// Names of every built-in tool.
pub const BUILTIN_TOOLS: &[&str] = &[
    "web_scraper",
    "http_header_analyzer",
    "technology_detection",
    "directory_brute_force",
    "email_harvester",
    "ssl_certificate_info",
    "whois_lookup",
    "dns_lookup",
    "wayback_machine",
    "shodan_lookup",
    "nmap_port_scanner",
    "subdomain_enumeration",
];

const USER_AGENT: &str = concat!("argus/", env!("CARGO_PKG_VERSION"));

/// HTTP client with the tool's timeout and the crate user agent.
pub(crate) fn http_client(config: &ToolConfig) -> Result<reqwest::Client> {
    client_builder(config)
        .build()
        .map_err(|e| AppError::Tool(format!("Failed to build HTTP client: {}", e)))
}

pub(crate) fn client_builder(config: &ToolConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(USER_AGENT)
}

/// Required string argument.
pub(crate) fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing '{}' parameter", key)))
}

/// Extract the host from a bare domain or a URL argument.
pub(crate) fn host_of(input: &str) -> Result<String> {
    let target = crate::workflows::Target::parse(input)?;
    Ok(target.host().to_string())
}

/// The text an agent sees for a tool result: the `output` field when present,
/// otherwise the JSON itself.
pub fn render_output(value: &Value) -> String {
    match value.get("output").and_then(|v| v.as_str()) {
        Some(text) => text.to_string(),
        None => match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}
