use crate::tools::registry::Tool;
use crate::tools::{host_of, http_client, str_arg};
use crate::types::{AppError, Result};
use crate::utils::toml_config::ToolConfig;
use crate::workflows::Target;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;

const DEFAULT_CRTSH_URL: &str = "https://crt.sh";
const MAX_LISTED: usize = 50;

#[derive(Debug, Deserialize)]
struct CertificateEntry {
    #[serde(default)]
    name_value: String,
}

/// Subdomain discovery through certificate transparency logs (crt.sh).
pub struct SubdomainEnumeration {
    client: reqwest::Client,
    base_url: String,
}

impl SubdomainEnumeration {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: config
                .extra_str("base_url")
                .unwrap_or(DEFAULT_CRTSH_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Unique, lowercased names under `domain`, skipping wildcard entries.
pub fn collect_subdomains<'a>(
    domain: &str,
    name_values: impl IntoIterator<Item = &'a str>,
) -> BTreeSet<String> {
    let domain = domain.to_ascii_lowercase();
    let suffix = format!(".{}", domain);
    name_values
        .into_iter()
        .flat_map(|value| value.split('\n'))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.starts_with('*') && (*name == domain || name.ends_with(&suffix)))
        .collect()
}

fn format_subdomains(domain: &str, subdomains: &BTreeSet<String>) -> String {
    if subdomains.is_empty() {
        return format!("No subdomains found for {} on crt.sh.", domain);
    }

    let mut output = format!(
        "Found {} unique subdomains for {} via crt.sh:\n",
        subdomains.len(),
        domain
    );
    for name in subdomains.iter().take(MAX_LISTED) {
        output.push_str(&format!("- {}\n", name));
    }
    if subdomains.len() > MAX_LISTED {
        output.push_str(&format!("... and {} more.\n", subdomains.len() - MAX_LISTED));
    }
    output
}

#[async_trait]
impl Tool for SubdomainEnumeration {
    fn name(&self) -> &str {
        "subdomain_enumeration"
    }

    fn description(&self) -> &str {
        "Enumerate subdomains of a domain from certificate transparency logs (crt.sh)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "domain": {
                    "type": "string",
                    "description": "The parent domain, e.g. example.com"
                }
            },
            "required": ["domain"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let domain = host_of(str_arg(&args, "domain")?)?;
        let query = format!("%.{}", domain);

        let entries: Vec<CertificateEntry> = self
            .client
            .get(&self.base_url)
            .query(&[("q", query.as_str()), ("output", "json")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| AppError::Tool(format!("Invalid crt.sh response: {}", e.without_url())))?;

        let names = entries.iter().map(|e| e.name_value.as_str());
        let subdomains = collect_subdomains(&domain, names);

        Ok(json!({
            "domain": domain,
            "count": subdomains.len(),
            "subdomains": subdomains,
            "output": format_subdomains(&domain, &subdomains)
        }))
    }

    fn target_args(&self, target: &Target) -> Value {
        json!({ "domain": target.domain() })
    }
}
