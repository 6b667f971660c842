//! The immutable input shared by every task in a run.

use crate::types::{AppError, Result};
use reqwest::Url;
use std::fmt;

/// A reconnaissance target: a bare domain (`example.com`) or a full URL.
///
/// The raw string is preserved verbatim for the report; tools use the
/// normalized [`Url`] and host derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    raw: String,
    url: Url,
}

impl Target {
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(AppError::InvalidInput("target must not be empty".to_string()));
        }

        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };

        let url = Url::parse(&with_scheme)
            .map_err(|e| AppError::InvalidInput(format!("invalid target '{}': {}", raw, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::InvalidInput(format!(
                "unsupported scheme '{}' in target '{}'",
                url.scheme(),
                raw
            )));
        }
        if url.host_str().map(str::is_empty).unwrap_or(true) {
            return Err(AppError::InvalidInput(format!(
                "target '{}' has no host",
                raw
            )));
        }

        Ok(Self {
            raw: raw.to_string(),
            url,
        })
    }

    /// The target exactly as the caller supplied it (trimmed).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Host name or IP literal, without port.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Host with a leading `www.` removed, for domain-level lookups.
    pub fn domain(&self) -> &str {
        let host = self.host();
        host.strip_prefix("www.").unwrap_or(host)
    }

    /// `scheme://host[:port]`, the root used for path probing.
    pub fn base_url(&self) -> String {
        match self.url.port() {
            Some(port) => format!("{}://{}:{}", self.url.scheme(), self.host(), port),
            None => format!("{}://{}", self.url.scheme(), self.host()),
        }
    }

    /// File-name safe form: scheme prefixes dropped, `/` replaced by `_`.
    pub fn sanitized(&self) -> String {
        self.raw
            .replace("https://", "")
            .replace("http://", "")
            .replace('/', "_")
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
