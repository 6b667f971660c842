//! HTTP-based web reconnaissance tools.

use crate::tools::registry::Tool;
use crate::tools::{client_builder, http_client, str_arg};
use crate::types::{AppError, Result};
use crate::utils::toml_config::ToolConfig;
use crate::workflows::Target;
use async_trait::async_trait;
use futures::future::join_all;
use regex::Regex;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use scraper::{Html, Node, Selector};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Maximum characters of page text handed back to the model.
pub const MAX_SCRAPED_CHARS: usize = 5000;

/// Paths probed by [`DirectoryBruteForce`].
pub const COMMON_PATHS: &[&str] = &[
    "admin",
    "login",
    "api",
    "dashboard",
    "config",
    "backup",
    "robots.txt",
    ".git/",
    "wp-admin",
];

const SECURITY_HEADERS: &[&str] = &[
    "strict-transport-security",
    "content-security-policy",
    "x-frame-options",
    "x-content-type-options",
    "referrer-policy",
    "permissions-policy",
];

fn url_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "description": description
            }
        },
        "required": ["url"]
    })
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<(HeaderMap, String)> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Tool(format!("Error fetching {}: {}", url, e)))?
        .error_for_status()
        .map_err(|e| AppError::Tool(format!("Error fetching {}: {}", url, e)))?;
    let headers = response.headers().clone();
    let body = response.text().await?;
    Ok((headers, body))
}

/// Visible text of an HTML document, whitespace-collapsed, scripts and styles removed.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                matches!(
                    ancestor.value().as_element().map(|e| e.name()),
                    Some("script" | "style" | "noscript" | "template")
                )
            });
            if !hidden {
                words.extend(text.split_whitespace());
            }
        }
    }

    words.join(" ")
}

// ============= web_scraper =============

pub struct WebScraper {
    client: reqwest::Client,
}

impl WebScraper {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
        })
    }
}

#[async_trait]
impl Tool for WebScraper {
    fn name(&self) -> &str {
        "web_scraper"
    }

    fn description(&self) -> &str {
        "Scrape the visible text content of a web page. Requires the full URL including http/https."
    }

    fn parameters_schema(&self) -> Value {
        url_schema("The full URL to scrape")
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let url = str_arg(&args, "url")?;
        let (_, body) = fetch_page(&self.client, url).await?;

        let text = visible_text(&body);
        let total_chars = text.chars().count();
        let output: String = text.chars().take(MAX_SCRAPED_CHARS).collect();

        Ok(json!({
            "url": url,
            "output": output,
            "truncated": total_chars > MAX_SCRAPED_CHARS
        }))
    }
}

// ============= http_header_analyzer =============

pub struct HttpHeaderAnalyzer {
    client: reqwest::Client,
}

impl HttpHeaderAnalyzer {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
        })
    }
}

/// Security headers from the well-known set that are absent.
pub fn missing_security_headers(headers: &HeaderMap) -> Vec<&'static str> {
    SECURITY_HEADERS
        .iter()
        .copied()
        .filter(|h| !headers.contains_key(*h))
        .collect()
}

#[async_trait]
impl Tool for HttpHeaderAnalyzer {
    fn name(&self) -> &str {
        "http_header_analyzer"
    }

    fn description(&self) -> &str {
        "Extract and analyze the HTTP response headers of a URL, including missing security headers."
    }

    fn parameters_schema(&self) -> Value {
        url_schema("The full URL to inspect")
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let url = str_arg(&args, "url")?;
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| AppError::Tool(format!("Error extracting headers from {}: {}", url, e)))?;

        let status = response.status();
        let headers = response.headers();

        let mut output = format!("HTTP Headers ({}):\n", status);
        let mut header_map = serde_json::Map::new();
        for (name, value) in headers {
            let value = value.to_str().unwrap_or("<binary>");
            output.push_str(&format!("- {}: {}\n", name, value));
            header_map.insert(name.to_string(), json!(value));
        }

        let missing = missing_security_headers(headers);
        if !missing.is_empty() {
            output.push_str(&format!("Missing security headers: {}\n", missing.join(", ")));
        }

        Ok(json!({
            "url": url,
            "status": status.as_u16(),
            "headers": header_map,
            "missing_security_headers": missing,
            "output": output
        }))
    }
}

// ============= technology_detection =============

pub struct TechnologyDetector {
    client: reqwest::Client,
}

impl TechnologyDetector {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
        })
    }
}

const COOKIE_FINGERPRINTS: &[(&str, &str)] = &[
    ("phpsessid", "PHP"),
    ("jsessionid", "Java"),
    ("asp.net_sessionid", "ASP.NET"),
    ("laravel_session", "Laravel"),
    ("wordpress_", "WordPress"),
    ("_shopify", "Shopify"),
    ("csrftoken", "Django"),
];

const BODY_FINGERPRINTS: &[(&str, &str)] = &[
    ("wp-content/", "WordPress"),
    ("wp-includes/", "WordPress"),
    ("/sites/default/files", "Drupal"),
    ("cdn.shopify.com", "Shopify"),
    ("__next_data__", "Next.js"),
    ("data-reactroot", "React"),
    ("ng-version=", "Angular"),
    ("jquery", "jQuery"),
    ("bootstrap", "Bootstrap"),
    ("googletagmanager.com", "Google Tag Manager"),
    ("google-analytics.com", "Google Analytics"),
];

/// Technologies inferred from response headers and page markup, mapped to the evidence.
pub fn fingerprint(headers: &HeaderMap, body: &str) -> BTreeMap<String, String> {
    let mut found = BTreeMap::new();
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(server) = header("server") {
        found.insert(server.to_string(), "Server header".to_string());
    }
    if let Some(powered) = header("x-powered-by") {
        found.insert(powered.to_string(), "X-Powered-By header".to_string());
    }
    if let Some(version) = header("x-aspnet-version") {
        found.insert(format!("ASP.NET {}", version), "X-AspNet-Version header".to_string());
    }
    if headers.contains_key("cf-ray") {
        found.insert("Cloudflare".to_string(), "CF-Ray header".to_string());
    }
    if headers.contains_key("x-drupal-cache") {
        found.insert("Drupal".to_string(), "X-Drupal-Cache header".to_string());
    }

    for cookie in headers.get_all("set-cookie") {
        let Ok(cookie) = cookie.to_str() else { continue };
        let cookie = cookie.to_lowercase();
        for (marker, tech) in COOKIE_FINGERPRINTS {
            if cookie.starts_with(marker) {
                found
                    .entry(tech.to_string())
                    .or_insert_with(|| format!("cookie '{}'", marker));
            }
        }
    }

    let document = Html::parse_document(body);
    if let Ok(selector) = Selector::parse(r#"meta[name="generator"]"#) {
        for meta in document.select(&selector) {
            if let Some(content) = meta.value().attr("content") {
                found.insert(content.trim().to_string(), "meta generator".to_string());
            }
        }
    }

    let lowered = body.to_lowercase();
    for (marker, tech) in BODY_FINGERPRINTS {
        if lowered.contains(marker) {
            found
                .entry(tech.to_string())
                .or_insert_with(|| format!("page references '{}'", marker));
        }
    }

    found
}

#[async_trait]
impl Tool for TechnologyDetector {
    fn name(&self) -> &str {
        "technology_detection"
    }

    fn description(&self) -> &str {
        "Detect the technologies (server, framework, CMS, libraries) used by a website. Requires a full URL."
    }

    fn parameters_schema(&self) -> Value {
        url_schema("The full URL of the website")
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let url = str_arg(&args, "url")?;
        let (headers, body) = fetch_page(&self.client, url).await?;
        let technologies = fingerprint(&headers, &body);

        let output = if technologies.is_empty() {
            format!("No technologies identified on {}.", url)
        } else {
            let mut out = format!("Technologies detected on {}:\n", url);
            for (tech, evidence) in &technologies {
                out.push_str(&format!("- {} ({})\n", tech, evidence));
            }
            out
        };

        Ok(json!({
            "url": url,
            "technologies": technologies,
            "output": output
        }))
    }
}

// ============= directory_brute_force =============

pub struct DirectoryBruteForce {
    client: reqwest::Client,
}

impl DirectoryBruteForce {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        let client = client_builder(config)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Tool(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

/// Statuses that indicate a path exists, restricted or not.
fn indicates_presence(status: StatusCode) -> bool {
    matches!(status.as_u16(), 200 | 301 | 302 | 401 | 403)
}

#[async_trait]
impl Tool for DirectoryBruteForce {
    fn name(&self) -> &str {
        "directory_brute_force"
    }

    fn description(&self) -> &str {
        "Probe a website for common exposed paths such as /admin, /api or /.git/. Requires a full URL."
    }

    fn parameters_schema(&self) -> Value {
        url_schema("The full URL of the website; only scheme, host and port are used")
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let url = str_arg(&args, "url")?;
        let base = Target::parse(url)?.base_url();

        let probes = COMMON_PATHS.iter().map(|path| {
            let probe_url = format!("{}/{}", base, path);
            async move {
                match self.client.head(&probe_url).send().await {
                    Ok(response) => Some((probe_url, response.status())),
                    Err(e) => {
                        debug!(url = %probe_url, error = %e, "probe failed");
                        None
                    }
                }
            }
        });

        let found: Vec<(String, u16)> = join_all(probes)
            .await
            .into_iter()
            .flatten()
            .filter(|(_, status)| indicates_presence(*status))
            .map(|(url, status)| (url, status.as_u16()))
            .collect();

        let output = if found.is_empty() {
            format!("No common directories found on {}.", base)
        } else {
            let mut out = format!("Discovered Directories on {}:\n", base);
            for (url, status) in &found {
                out.push_str(&format!("- {} (HTTP {})\n", url, status));
            }
            out
        };

        let found_json: Vec<Value> = found
            .iter()
            .map(|(url, status)| json!({ "url": url, "status": status }))
            .collect();

        Ok(json!({
            "base_url": base,
            "found": found_json,
            "output": output
        }))
    }
}

// ============= email_harvester =============

pub struct EmailHarvester {
    client: reqwest::Client,
    pattern: Regex,
}

impl EmailHarvester {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        let pattern = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
            .map_err(|e| AppError::Internal(format!("Invalid e-mail pattern: {}", e)))?;
        Ok(Self {
            client: http_client(config)?,
            pattern,
        })
    }

    /// Distinct e-mail addresses in `text`, sorted.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

#[async_trait]
impl Tool for EmailHarvester {
    fn name(&self) -> &str {
        "email_harvester"
    }

    fn description(&self) -> &str {
        "Fetch a web page and extract any e-mail addresses it contains. Requires a full URL."
    }

    fn parameters_schema(&self) -> Value {
        url_schema("The full URL of the page to harvest")
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let url = str_arg(&args, "url")?;
        let (_, body) = fetch_page(&self.client, url).await?;
        let emails = self.extract(&body);

        let output = if emails.is_empty() {
            format!("No emails found on {}.", url)
        } else {
            let mut out = format!("Emails found on {}:\n", url);
            for email in &emails {
                out.push_str(&format!("- {}\n", email));
            }
            out
        };

        Ok(json!({
            "url": url,
            "emails": emails,
            "output": output
        }))
    }
}
