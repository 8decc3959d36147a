use std::sync::Arc;
use std::time::Duration;

use actix_web::{HttpResponse, get, post, web};
use futures::future::join_all;
use serde::Serialize;

use crate::error::ApiError;
use crate::models::Website;
use crate::monitoring::types::Headers;
use crate::monitoring::{CheckResult, CheckStatus, HttpChecker, TlsInfo};
use crate::storage::Store;

/// State shared by every handler.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub checker: Arc<HttpChecker>,
}

/// One entry of the status and check responses.
#[derive(Debug, Serialize)]
struct WebsiteStatus {
    website: WebsiteRef,
    status: CheckStatus,
    response_time: String,
    headers: Option<Headers>,
    ssl_info: Option<TlsInfo>,
}

/// Website identity as exposed on the wire. On-demand checks carry only the
/// submitted URL, with no registry id or name.
#[derive(Debug, Serialize)]
struct WebsiteRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    url: String,
}

impl From<Website> for WebsiteRef {
    fn from(website: Website) -> Self {
        Self { id: Some(website.id), name: Some(website.name), url: website.url }
    }
}

impl WebsiteStatus {
    fn new(website: WebsiteRef, check: CheckResult) -> Self {
        Self {
            website,
            status: check.status,
            response_time: format_response_time(check.latency),
            headers: check.headers,
            ssl_info: check.tls_info,
        }
    }
}

/// Render a latency the way the API promises it: base 10, exactly two
/// decimal places, `ms` suffix.
fn format_response_time(latency: Duration) -> String {
    format!("{:.2}ms", latency.as_secs_f64() * 1000.0)
}

/// Latest recorded result per registered website. Websites that have never
/// been checked are silently omitted.
#[get("/api/websites/status")]
pub async fn websites_status(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let websites = state.store.websites().await?;

    let mut entries = Vec::with_capacity(websites.len());
    for website in websites {
        let Some(check) = state.store.latest_check(website.id).await? else {
            continue;
        };
        entries.push(WebsiteStatus::new(website.into(), check));
    }

    Ok(HttpResponse::Ok().json(entries))
}

/// Probe the submitted URLs right now, bypassing the registry and the store.
#[post("/api/websites/check")]
pub async fn websites_check(
    state: web::Data<AppState>,
    urls: web::Json<Vec<String>>,
) -> HttpResponse {
    let urls = urls.into_inner();
    let checks = join_all(urls.iter().map(|url| state.checker.probe(url))).await;

    let entries: Vec<WebsiteStatus> = urls
        .into_iter()
        .zip(checks)
        .map(|(url, check)| WebsiteStatus::new(WebsiteRef { id: None, name: None, url }, check))
        .collect();

    HttpResponse::Ok().json(entries)
}
