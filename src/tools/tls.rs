//! TLS certificate inspection.
//!
//! The handshake accepts any certificate so that expired or self-signed ones
//! can still be reported. Whether the chain validates against the webpki
//! roots is recorded separately and shown as `Trusted`.

use crate::tools::registry::Tool;
use crate::tools::{host_of, str_arg};
use crate::types::{AppError, Result};
use crate::utils::toml_config::ToolConfig;
use crate::workflows::Target;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::client::WebPkiServerVerifier;
use tokio_rustls::rustls::crypto::{self, CryptoProvider};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio_rustls::TlsConnector;
use tracing::debug;
use x509_parser::prelude::{AttributeTypeAndValue, FromDer, GeneralName, X509Certificate};

const DEFAULT_TLS_PORT: u16 = 443;

/// Fields reported for the leaf certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateSummary {
    pub issuer: String,
    pub subject: String,
    pub version: u32,
    pub serial: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub days_remaining: i64,
    pub alt_names: Vec<String>,
}

/// Parse a DER certificate into the reported fields, with days counted from `now`.
pub fn summarize_certificate(der: &[u8], now: DateTime<Utc>) -> Result<CertificateSummary> {
    let (_, cert) = X509Certificate::from_der(der)
        .map_err(|e| AppError::Tool(format!("Failed to parse certificate: {}", e)))?;

    let issuer = first_attr(cert.issuer().iter_organization())
        .or_else(|| first_attr(cert.issuer().iter_common_name()))
        .unwrap_or_else(|| "Unknown".to_string());
    let subject =
        first_attr(cert.subject().iter_common_name()).unwrap_or_else(|| "Unknown".to_string());

    let validity = cert.validity();
    let not_before = to_utc(validity.not_before.timestamp())?;
    let not_after = to_utc(validity.not_after.timestamp())?;

    let alt_names = match cert.subject_alternative_name() {
        Ok(Some(san)) => san
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns) => Some(dns.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(CertificateSummary {
        issuer,
        subject,
        version: cert.version().0 + 1,
        serial: cert
            .raw_serial()
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect(),
        not_before,
        not_after,
        days_remaining: (not_after - now).num_days(),
        alt_names,
    })
}

fn first_attr<'a, 'b: 'a>(
    mut attrs: impl Iterator<Item = &'a AttributeTypeAndValue<'b>>,
) -> Option<String> {
    attrs
        .next()
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_string)
}

fn to_utc(timestamp: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(|| AppError::Tool(format!("Certificate date out of range: {}", timestamp)))
}

fn format_summary(host: &str, summary: &CertificateSummary, rejection: Option<&str>) -> String {
    let mut output = format!("SSL Certificate Info for {}:\n", host);
    output.push_str(&format!("Issuer: {}\n", summary.issuer));
    output.push_str(&format!("Subject: {}\n", summary.subject));
    output.push_str(&format!("Version: {}\n", summary.version));
    output.push_str(&format!("Serial Number: {}\n", summary.serial));
    output.push_str(&format!(
        "Valid From: {}\n",
        summary.not_before.format("%Y-%m-%d %H:%M:%S")
    ));
    output.push_str(&format!(
        "Valid Until: {}\n",
        summary.not_after.format("%Y-%m-%d %H:%M:%S")
    ));
    output.push_str(&format!("Days Remaining: {}\n", summary.days_remaining));
    if !summary.alt_names.is_empty() {
        output.push_str(&format!("Alternative Names: {}\n", summary.alt_names.join(", ")));
    }
    match rejection {
        None => output.push_str("Trusted: yes\n"),
        Some(reason) => output.push_str(&format!("Trusted: no ({})\n", reason)),
    }
    output
}

/// Accepts every server certificate and keeps the webpki verdict for the report.
#[derive(Debug)]
struct RecordingVerifier {
    webpki: Arc<WebPkiServerVerifier>,
    provider: Arc<CryptoProvider>,
    rejection: Mutex<Option<String>>,
}

impl RecordingVerifier {
    fn rejection(&self) -> Option<String> {
        self.rejection.lock().ok().and_then(|r| r.clone())
    }
}

impl ServerCertVerifier for RecordingVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, tokio_rustls::rustls::Error> {
        if let Err(e) = self.webpki.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        ) {
            if let Ok(mut rejection) = self.rejection.lock() {
                *rejection = Some(e.to_string());
            }
        }
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Leaf certificate details of a host's TLS endpoint.
pub struct SslCertificateInfo {
    port: u16,
    timeout: Duration,
}

impl SslCertificateInfo {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        let port = match config.extra_int("port") {
            None => DEFAULT_TLS_PORT,
            Some(port) => u16::try_from(port).map_err(|_| {
                AppError::Configuration(format!("Invalid port for ssl_certificate_info: {}", port))
            })?,
        };
        Ok(Self {
            port,
            timeout: config.timeout(),
        })
    }

    fn verifier(&self) -> Result<Arc<RecordingVerifier>> {
        let provider = Arc::new(crypto::ring::default_provider());
        let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let webpki = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider.clone())
            .build()
            .map_err(|e| AppError::Tool(format!("Failed to build certificate verifier: {}", e)))?;
        Ok(Arc::new(RecordingVerifier {
            webpki,
            provider,
            rejection: Mutex::new(None),
        }))
    }

    async fn fetch_leaf(&self, host: &str) -> Result<(Vec<u8>, Option<String>)> {
        let verifier = self.verifier()?;
        let config = ClientConfig::builder_with_provider(verifier.provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| AppError::Tool(format!("TLS configuration error: {}", e)))?
            .dangerous()
            .with_custom_certificate_verifier(verifier.clone())
            .with_no_client_auth();

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| AppError::InvalidInput(format!("Invalid server name: '{}'", host)))?;

        let handshake = async {
            let stream = TcpStream::connect((host, self.port)).await?;
            TlsConnector::from(Arc::new(config))
                .connect(server_name, stream)
                .await
        };
        let tls = tokio::time::timeout(self.timeout, handshake)
            .await
            .map_err(|_| {
                AppError::Tool(format!(
                    "TLS handshake with {}:{} timed out after {:?}",
                    host, self.port, self.timeout
                ))
            })?
            .map_err(|e| {
                AppError::Tool(format!(
                    "Error connecting or retrieving SSL cert for {}: {}",
                    host, e
                ))
            })?;

        let (_, connection) = tls.get_ref();
        debug!(%host, protocol = ?connection.protocol_version(), "TLS handshake complete");
        let leaf = connection
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| AppError::Tool(format!("{} presented no certificate", host)))?;

        Ok((leaf.as_ref().to_vec(), verifier.rejection()))
    }
}

#[async_trait]
impl Tool for SslCertificateInfo {
    fn name(&self) -> &str {
        "ssl_certificate_info"
    }

    fn description(&self) -> &str {
        "Retrieve a domain's TLS certificate: issuer, subject, serial and validity dates."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "domain": {
                    "type": "string",
                    "description": "The domain name, e.g. example.com"
                }
            },
            "required": ["domain"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let host = host_of(str_arg(&args, "domain")?)?;
        let (der, rejection) = self.fetch_leaf(&host).await?;
        let summary = summarize_certificate(&der, Utc::now())?;

        Ok(json!({
            "domain": host,
            "certificate": summary,
            "trusted": rejection.is_none(),
            "output": format_summary(&host, &summary, rejection.as_deref())
        }))
    }

    fn target_args(&self, target: &Target) -> Value {
        json!({ "domain": target.host() })
    }
}
