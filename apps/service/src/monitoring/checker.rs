use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::types::{CheckResult, CheckStatus, Headers, TlsInfo};

/// HTTP/HTTPS prober.
///
/// Certificate verification is disabled: the monitor must still reach sites
/// with expired or self-signed certificates and report on them. Do not reuse
/// this client for anything security-sensitive.
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .tls_info(true)
            .build()?;

        Ok(Self { client })
    }

    /// Probe `url` with a single GET request.
    ///
    /// Never fails: DNS, connect, TLS and timeout errors all resolve to a
    /// `Down` result with no headers or certificate details. Call sites
    /// decide whether and where the result is persisted.
    pub async fn probe(&self, url: &str) -> CheckResult {
        let timestamp = Utc::now();
        let start = Instant::now();

        match self.client.get(url).send().await {
            Ok(response) => {
                let latency = start.elapsed();
                let status = if response.status().is_success() {
                    CheckStatus::Up
                } else {
                    CheckStatus::Down
                };
                let tls_info = response
                    .extensions()
                    .get::<reqwest::tls::TlsInfo>()
                    .and_then(|tls| tls.peer_certificate())
                    .and_then(parse_leaf_certificate);

                debug!(url, %status, code = response.status().as_u16(), "checked");

                CheckResult {
                    website_id: 0,
                    timestamp,
                    status,
                    latency,
                    headers: Some(collect_headers(response.headers())),
                    tls_info,
                }
            }
            Err(error) => {
                warn!(url, %error, "check failed");

                CheckResult {
                    website_id: 0,
                    timestamp,
                    status: CheckStatus::Down,
                    latency: start.elapsed(),
                    headers: None,
                    tls_info: None,
                }
            }
        }
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> Headers {
    let mut collected = Headers::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected.entry(name.as_str().to_owned()).or_default().push(value);
    }
    collected
}

/// Decode the DER leaf certificate handed back by the TLS layer.
///
/// `is_valid` means "not expired yet". The probe accepts invalid
/// certificates precisely so this information stays observable; it is a
/// report on the certificate, not a trust decision.
fn parse_leaf_certificate(der: &[u8]) -> Option<TlsInfo> {
    let (_, cert) = x509_parser::parse_x509_certificate(der).ok()?;

    let not_before = DateTime::from_timestamp(cert.validity().not_before.timestamp(), 0)?;
    let not_after = DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0)?;

    Some(TlsInfo {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        not_before,
        not_after,
        is_valid: Utc::now() < not_after,
    })
}
