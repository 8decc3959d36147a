use anyhow::{Result, anyhow};
use url::Url;

/// Validate a website URL before it enters the registry.
///
/// Only the shape is checked; reachability is the scheduler's business.
pub fn validate_website_url(target: &str) -> Result<()> {
    let url = Url::parse(target).map_err(|e| anyhow!("invalid URL: {e}"))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("unsupported scheme for monitoring: {other}")),
    }

    if url.host_str().is_none() {
        return Err(anyhow!("URL has no host"));
    }

    Ok(())
}
