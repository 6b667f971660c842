//! Host-level reconnaissance: Shodan host data and nmap port scans.

use crate::tools::registry::Tool;
use crate::tools::{host_of, http_client, str_arg};
use crate::types::{AppError, Result};
use crate::utils::toml_config::ToolConfig;
use crate::workflows::Target;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::IpAddr;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

fn target_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "target": {
                "type": "string",
                "description": "Domain name or IP address"
            }
        },
        "required": ["target"]
    })
}

// ============= shodan_lookup =============

const DEFAULT_SHODAN_URL: &str = "https://api.shodan.io";
const DEFAULT_SHODAN_KEY_ENV: &str = "SHODAN_API_KEY";

#[derive(Debug, Deserialize)]
struct ShodanHost {
    #[serde(default)]
    org: Option<String>,
    #[serde(default)]
    os: Option<String>,
    #[serde(default)]
    ports: Vec<u16>,
}

/// Host information from the Shodan API.
pub struct ShodanLookup {
    client: reqwest::Client,
    base_url: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl ShodanLookup {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: config
                .extra_str("base_url")
                .unwrap_or(DEFAULT_SHODAN_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key_env: config
                .extra_str("api_key_env")
                .unwrap_or(DEFAULT_SHODAN_KEY_ENV)
                .to_string(),
            api_key: None,
        })
    }

    /// Use a fixed key instead of reading the environment.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Tool(format!("{} environment variable not set.", self.api_key_env))
            })
    }
}

async fn resolve_ip(host: &str) -> Result<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }
    let mut addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| AppError::Tool(format!("Could not resolve {}: {}", host, e)))?;
    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| AppError::Tool(format!("No addresses found for {}", host)))
}

#[async_trait]
impl Tool for ShodanLookup {
    fn name(&self) -> &str {
        "shodan_lookup"
    }

    fn description(&self) -> &str {
        "Query Shodan for open ports, organization and operating system of a host."
    }

    fn parameters_schema(&self) -> Value {
        target_schema()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let host = host_of(str_arg(&args, "target")?)?;
        let key = self.api_key()?;
        let ip = resolve_ip(&host).await?;
        debug!(%host, %ip, "querying Shodan");

        let response = self
            .client
            .get(format!("{}/shodan/host/{}", self.base_url, ip))
            .query(&[("key", key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Tool(format!(
                "Shodan API error ({}): {}",
                status,
                body.trim()
            )));
        }

        let data: ShodanHost = response
            .json()
            .await
            .map_err(|e| {
                AppError::Tool(format!("Invalid Shodan response: {}", e.without_url()))
            })?;

        let org = data.org.as_deref().unwrap_or("N/A");
        let os = data.os.as_deref().unwrap_or("N/A");
        let ports = if data.ports.is_empty() {
            "N/A".to_string()
        } else {
            data.ports
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let output = format!(
            "Shodan Info for {} ({}):\n- Organization: {}\n- Operating System: {}\n- Open Ports: {}\n",
            host, ip, org, os, ports
        );

        Ok(json!({
            "target": host,
            "ip": ip.to_string(),
            "org": data.org,
            "os": data.os,
            "ports": data.ports,
            "output": output
        }))
    }

    fn target_args(&self, target: &Target) -> Value {
        json!({ "target": target.host() })
    }
}

// ============= nmap_port_scanner =============

const DEFAULT_NMAP_BINARY: &str = "nmap";

/// One `Host:` line of nmap greppable output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NmapHost {
    pub address: String,
    pub hostname: Option<String>,
    pub ports: Vec<NmapPort>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NmapPort {
    pub port: u16,
    pub protocol: String,
    pub state: String,
    pub service: String,
}

/// Parse `nmap -oG -` output into hosts with their reported ports.
pub fn parse_greppable(output: &str) -> Vec<NmapHost> {
    let mut hosts: Vec<NmapHost> = Vec::new();

    for line in output.lines() {
        let Some(rest) = line.strip_prefix("Host: ") else {
            continue;
        };
        let mut fields = rest.split('\t');
        let Some(head) = fields.next() else {
            continue;
        };

        let (address, hostname) = match head.split_once(' ') {
            Some((addr, name)) => {
                let name = name.trim().trim_start_matches('(').trim_end_matches(')');
                (addr.to_string(), (!name.is_empty()).then(|| name.to_string()))
            }
            None => (head.trim().to_string(), None),
        };

        let ports: Vec<NmapPort> = fields
            .find_map(|f| f.strip_prefix("Ports: "))
            .map(|list| list.split(", ").filter_map(parse_port_entry).collect())
            .unwrap_or_default();

        // nmap emits a Status line and a Ports line for the same host
        match hosts.iter_mut().find(|h| h.address == address) {
            Some(existing) => {
                existing.ports.extend(ports);
                if existing.hostname.is_none() {
                    existing.hostname = hostname;
                }
            }
            None => hosts.push(NmapHost {
                address,
                hostname,
                ports,
            }),
        }
    }

    hosts
}

/// `80/open/tcp//http///`
fn parse_port_entry(entry: &str) -> Option<NmapPort> {
    let parts: Vec<&str> = entry.trim().split('/').collect();
    if parts.len() < 5 {
        return None;
    }
    Some(NmapPort {
        port: parts[0].parse().ok()?,
        state: parts[1].to_string(),
        protocol: parts[2].to_string(),
        service: if parts[4].is_empty() {
            "unknown".to_string()
        } else {
            parts[4].to_string()
        },
    })
}

/// Reject anything nmap could interpret as an option or a shell-ish token.
fn validate_scan_target(target: &str) -> Result<()> {
    let valid = !target.is_empty()
        && !target.starts_with('-')
        && target
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '_'));
    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "Invalid scan target: '{}'",
            target
        )))
    }
}

/// Fast scan of the top 100 ports with a local `nmap` binary.
pub struct NmapPortScanner {
    binary: String,
    timeout: Duration,
}

impl NmapPortScanner {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            binary: config
                .extra_str("binary")
                .unwrap_or(DEFAULT_NMAP_BINARY)
                .to_string(),
            timeout: config.timeout(),
        }
    }
}

fn format_scan(target: &str, hosts: &[NmapHost]) -> String {
    let mut output = format!("Nmap Scan Results for {}:\n", target);
    let mut found = false;

    for host in hosts {
        let open: Vec<&NmapPort> = host.ports.iter().filter(|p| p.state == "open").collect();
        if open.is_empty() {
            continue;
        }
        found = true;
        match host.hostname {
            Some(ref name) => output.push_str(&format!("Host: {} ({})\n", host.address, name)),
            None => output.push_str(&format!("Host: {}\n", host.address)),
        }
        for port in open {
            output.push_str(&format!(
                "  - Port: {}/{}, State: {}, Service: {}\n",
                port.port, port.protocol, port.state, port.service
            ));
        }
    }

    if found {
        output
    } else {
        format!(
            "Nmap found no open ports on {} in top 100 or host is down.",
            target
        )
    }
}

#[async_trait]
impl Tool for NmapPortScanner {
    fn name(&self) -> &str {
        "nmap_port_scanner"
    }

    fn description(&self) -> &str {
        "Scan the top 100 TCP ports of a host with nmap and report open services."
    }

    fn parameters_schema(&self) -> Value {
        target_schema()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let target = host_of(str_arg(&args, "target")?)?;
        validate_scan_target(&target)?;

        let child = Command::new(&self.binary)
            .args(["-F", "-oG", "-", &target])
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| {
                AppError::Tool(format!(
                    "nmap scan of {} timed out after {:?}",
                    target, self.timeout
                ))
            })?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AppError::Tool(format!(
                    "'{}' not found. Install nmap and make sure it is on PATH.",
                    self.binary
                )),
                _ => AppError::Tool(format!("Failed to run nmap: {}", e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Tool(format!(
                "nmap exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let hosts = parse_greppable(&stdout);
        let open_ports: Vec<Value> = hosts
            .iter()
            .flat_map(|h| h.ports.iter().filter(|p| p.state == "open"))
            .map(|p| json!({"port": p.port, "protocol": p.protocol, "service": p.service}))
            .collect();

        Ok(json!({
            "target": target,
            "open_ports": open_ports,
            "output": format_scan(&target, &hosts)
        }))
    }

    fn target_args(&self, target: &Target) -> Value {
        json!({ "target": target.host() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Nmap 7.94 scan initiated as: nmap -F -oG - scanme.nmap.org\n\
Host: 45.33.32.156 (scanme.nmap.org)\tStatus: Up\n\
Host: 45.33.32.156 (scanme.nmap.org)\tPorts: 22/open/tcp//ssh///, 80/open/tcp//http///, 9929/filtered/tcp//nping-echo///\tIgnored State: closed (97)\n\
# Nmap done at Sat Oct 17 10:00:00 2026 -- 1 IP address (1 host up) scanned in 2.10 seconds\n";

    #[test]
    fn test_parse_greppable() {
        let hosts = parse_greppable(SAMPLE);
        assert_eq!(hosts.len(), 1);
        let host = &hosts[0];
        assert_eq!(host.address, "45.33.32.156");
        assert_eq!(host.hostname.as_deref(), Some("scanme.nmap.org"));
        assert_eq!(host.ports.len(), 3);
        assert_eq!(
            host.ports[0],
            NmapPort {
                port: 22,
                protocol: "tcp".to_string(),
                state: "open".to_string(),
                service: "ssh".to_string(),
            }
        );
    }

    #[test]
    fn test_format_scan_lists_only_open_ports() {
        let output = format_scan("scanme.nmap.org", &parse_greppable(SAMPLE));
        assert!(output.starts_with("Nmap Scan Results for scanme.nmap.org:"));
        assert!(output.contains("Host: 45.33.32.156 (scanme.nmap.org)"));
        assert!(output.contains("Port: 80/tcp, State: open, Service: http"));
        assert!(!output.contains("9929"));
    }

    #[test]
    fn test_format_scan_no_open_ports() {
        let down = "Host: 10.0.0.1 ()\tStatus: Down\n";
        let output = format_scan("10.0.0.1", &parse_greppable(down));
        assert_eq!(
            output,
            "Nmap found no open ports on 10.0.0.1 in top 100 or host is down."
        );
    }

    #[test]
    fn test_validate_scan_target() {
        assert!(validate_scan_target("example.com").is_ok());
        assert!(validate_scan_target("10.0.0.1").is_ok());
        assert!(validate_scan_target("-sV").is_err());
        assert!(validate_scan_target("a;rm").is_err());
        assert!(validate_scan_target("").is_err());
    }

    #[tokio::test]
    async fn test_nmap_missing_binary() {
        let mut config = ToolConfig::default();
        config.extra.insert(
            "binary".to_string(),
            toml::Value::String("argus-test-no-such-nmap".to_string()),
        );
        let scanner = NmapPortScanner::new(&config);
        let err = scanner
            .execute(json!({"target": "127.0.0.1"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_shodan_requires_key() {
        let mut config = ToolConfig::default();
        config.extra.insert(
            "api_key_env".to_string(),
            toml::Value::String("ARGUS_TEST_SHODAN_KEY_NEVER_SET".to_string()),
        );
        let tool = ShodanLookup::new(&config).unwrap();
        let err = tool
            .execute(json!({"target": "127.0.0.1"}))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tool error: ARGUS_TEST_SHODAN_KEY_NEVER_SET environment variable not set."
        );
    }

    #[tokio::test]
    async fn test_resolve_ip_literal() {
        assert_eq!(
            resolve_ip("127.0.0.1").await.unwrap(),
            "127.0.0.1".parse::<IpAddr>().unwrap()
        );
    }
}
