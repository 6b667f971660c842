//! Public-record lookups: WHOIS, DNS and the Internet Archive.

use crate::tools::registry::Tool;
use crate::tools::{host_of, http_client, str_arg};
use crate::types::{AppError, Result};
use crate::utils::toml_config::ToolConfig;
use crate::workflows::Target;
use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

fn domain_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "domain": {
                "type": "string",
                "description": description
            }
        },
        "required": ["domain"]
    })
}

// ============= whois_lookup =============

const DEFAULT_WHOIS_SERVER: &str = "whois.iana.org";
const WHOIS_PORT: u16 = 43;

/// WHOIS over TCP port 43. Queries IANA first and follows its `refer:` server.
pub struct WhoisLookup {
    server: String,
    timeout: Duration,
}

impl WhoisLookup {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            server: config
                .extra_str("server")
                .unwrap_or(DEFAULT_WHOIS_SERVER)
                .to_string(),
            timeout: config.timeout(),
        }
    }

    async fn query(&self, server: &str, domain: &str) -> Result<String> {
        let address = if server.contains(':') {
            server.to_string()
        } else {
            format!("{}:{}", server, WHOIS_PORT)
        };

        let exchange = async {
            let mut stream = TcpStream::connect(&address).await?;
            stream.write_all(format!("{}\r\n", domain).as_bytes()).await?;
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| AppError::Tool(format!("WHOIS query to {} timed out", address)))?
            .map_err(|e| AppError::Tool(format!("WHOIS query to {} failed: {}", address, e)))
    }
}

/// The `refer:` (or `whois:`) server named in a WHOIS response.
pub fn referral_server(response: &str) -> Option<String> {
    response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        if (key == "refer" || key == "whois") && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[async_trait]
impl Tool for WhoisLookup {
    fn name(&self) -> &str {
        "whois_lookup"
    }

    fn description(&self) -> &str {
        "Perform a WHOIS lookup for a domain name to retrieve registration details."
    }

    fn parameters_schema(&self) -> Value {
        domain_schema("The domain name, e.g. example.com")
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let domain = host_of(str_arg(&args, "domain")?)?;

        let mut server = self.server.clone();
        let mut response = self.query(&server, &domain).await?;

        if let Some(referral) = referral_server(&response) {
            if !referral.eq_ignore_ascii_case(&server) {
                debug!(from = %server, to = %referral, "following WHOIS referral");
                match self.query(&referral, &domain).await {
                    Ok(referred) => {
                        response = referred;
                        server = referral;
                    }
                    Err(e) => debug!(error = %e, "WHOIS referral failed, keeping registry answer"),
                }
            }
        }

        let response = response.trim().to_string();
        if response.is_empty() {
            return Err(AppError::Tool(format!(
                "Empty WHOIS response for {} from {}",
                domain, server
            )));
        }

        Ok(json!({
            "domain": domain,
            "server": server,
            "output": response
        }))
    }

    fn target_args(&self, target: &Target) -> Value {
        json!({ "domain": target.domain() })
    }
}

// ============= dns_lookup =============

const DEFAULT_DOH_URL: &str = "https://dns.google/resolve";

/// Record types queried, with their numeric RR type codes.
pub const RECORD_TYPES: &[(&str, u16)] = &[
    ("A", 1),
    ("AAAA", 28),
    ("MX", 15),
    ("NS", 2),
    ("TXT", 16),
];

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

/// DNS lookups over a DNS-over-HTTPS JSON API (Google / Cloudflare format).
pub struct DnsLookup {
    client: reqwest::Client,
    base_url: String,
}

impl DnsLookup {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: config
                .extra_str("base_url")
                .unwrap_or(DEFAULT_DOH_URL)
                .to_string(),
        })
    }

    async fn resolve(&self, domain: &str, record_type: &str, code: u16) -> Result<Vec<String>> {
        let response: DohResponse = self
            .client
            .get(&self.base_url)
            .header("accept", "application/dns-json")
            .query(&[("name", domain), ("type", record_type)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .answer
            .into_iter()
            .filter(|a| a.record_type == code)
            .map(|a| a.data.trim_matches('"').to_string())
            .collect())
    }
}

#[async_trait]
impl Tool for DnsLookup {
    fn name(&self) -> &str {
        "dns_lookup"
    }

    fn description(&self) -> &str {
        "Perform a DNS lookup for A, AAAA, MX, NS and TXT records of a domain."
    }

    fn parameters_schema(&self) -> Value {
        domain_schema("The domain name, e.g. example.com")
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let domain = host_of(str_arg(&args, "domain")?)?;

        let domain_ref = &domain;
        let lookups = RECORD_TYPES.iter().map(|(rtype, code)| async move {
            (*rtype, self.resolve(domain_ref, rtype, *code).await)
        });
        let results = join_all(lookups).await;

        let mut records = serde_json::Map::new();
        let mut output = format!("DNS Records for {}:\n", domain);
        let mut failures = Vec::new();
        for (rtype, result) in results {
            match result {
                Ok(values) if !values.is_empty() => {
                    output.push_str(&format!("- {}: {}\n", rtype, values.join(", ")));
                    records.insert(rtype.to_string(), json!(values));
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(record_type = rtype, error = %e, "DNS query failed");
                    failures.push(e.to_string());
                }
            }
        }

        if failures.len() == RECORD_TYPES.len() {
            return Err(AppError::Tool(format!(
                "DNS lookup for {} failed: {}",
                domain, failures[0]
            )));
        }
        if records.is_empty() {
            output = format!("No common DNS records found for {}.", domain);
        }

        Ok(json!({
            "domain": domain,
            "records": records,
            "output": output
        }))
    }

    fn target_args(&self, target: &Target) -> Value {
        json!({ "domain": target.host() })
    }
}

// ============= wayback_machine =============

const DEFAULT_WAYBACK_URL: &str = "http://archive.org/wayback/available";

#[derive(Debug, Deserialize)]
struct WaybackResponse {
    #[serde(default)]
    archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
struct ArchivedSnapshots {
    closest: Option<Snapshot>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    available: bool,
    url: String,
    timestamp: String,
    #[serde(default)]
    status: Option<String>,
}

/// Closest archived snapshot from the Internet Archive availability API.
pub struct WaybackMachine {
    client: reqwest::Client,
    base_url: String,
}

impl WaybackMachine {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: config
                .extra_str("base_url")
                .unwrap_or(DEFAULT_WAYBACK_URL)
                .to_string(),
        })
    }
}

#[async_trait]
impl Tool for WaybackMachine {
    fn name(&self) -> &str {
        "wayback_machine"
    }

    fn description(&self) -> &str {
        "Fetch the latest archived snapshot of a URL from the Internet Archive Wayback Machine."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL or domain to look up"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let url = str_arg(&args, "url")?;
        let response: WaybackResponse = self
            .client
            .get(&self.base_url)
            .query(&[("url", url)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| AppError::Tool(format!("Invalid Wayback Machine response: {}", e)))?;

        let Some(closest) = response.archived_snapshots.closest else {
            return Ok(json!({
                "url": url,
                "snapshot": null,
                "output": format!("No archived snapshots found for {} in the Wayback Machine.", url)
            }));
        };

        let mut output = format!("Wayback Machine Data for {}:\n", url);
        output.push_str(&format!("Found latest snapshot: {}\n", closest.available));
        output.push_str(&format!("Snapshot URL: {}\n", closest.url));
        output.push_str(&format!("Timestamp: {}\n", closest.timestamp));
        if let Some(ref status) = closest.status {
            output.push_str(&format!("Status: {}\n", status));
        }

        Ok(json!({
            "url": url,
            "snapshot": {
                "available": closest.available,
                "url": closest.url,
                "timestamp": closest.timestamp,
                "status": closest.status
            },
            "output": output
        }))
    }
}
