use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Up,
    Down,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Up => write!(f, "up"),
            CheckStatus::Down => write!(f, "down"),
        }
    }
}

impl std::str::FromStr for CheckStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(CheckStatus::Up),
            "down" => Ok(CheckStatus::Down),
            other => Err(anyhow::anyhow!("unknown check status: {other}")),
        }
    }
}

/// Response header values keyed by header name. A header sent more than once
/// keeps every value.
pub type Headers = HashMap<String, Vec<String>>;

/// Leaf certificate details captured while checking an HTTPS site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsInfo {
    pub subject: String,
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// Whether the certificate has expired yet. `not_before` and chain trust
    /// are not consulted.
    pub is_valid: bool,
}

/// Result of one probe of one website.
///
/// Created fresh by every probe and never mutated afterwards; the store only
/// ever replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Id of the website this check belongs to. Zero for on-demand checks
    /// that bypass the registry.
    pub website_id: i64,

    /// When the check was performed.
    pub timestamp: DateTime<Utc>,

    /// Up iff the response status code was in the 2xx range.
    pub status: CheckStatus,

    /// Wall-clock time between request dispatch and response (or failure).
    pub latency: Duration,

    /// All response headers, if a response arrived at all.
    pub headers: Option<Headers>,

    /// Peer certificate details, if the connection was TLS.
    pub tls_info: Option<TlsInfo>,
}

impl CheckResult {
    /// Stamp the result with the website it belongs to.
    pub fn for_website(mut self, website_id: i64) -> Self {
        self.website_id = website_id;
        self
    }
}
