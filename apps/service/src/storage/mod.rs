/// Storage layer: the `Store` contract plus the in-memory and SQLite
/// backends that satisfy it.
pub mod memory;
pub mod migrations;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Website;
use crate::monitoring::types::CheckResult;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage contract shared by the scheduler and the API layer.
///
/// Every operation is safe for arbitrarily many concurrent callers.
#[async_trait]
pub trait Store: Send + Sync {
    /// Add a website to the registry; the store assigns the id.
    ///
    /// Registration is idempotent by URL: a URL that is already registered
    /// returns the existing website unchanged.
    async fn register_website(&self, name: &str, url: &str) -> Result<Website>;

    /// Point-in-time snapshot of all registered websites.
    async fn websites(&self) -> Result<Vec<Website>>;

    /// Insert or replace the latest result for `check.website_id`.
    ///
    /// Last write wins: with overlapping check cycles a slow probe from an
    /// earlier cycle can land after, and overwrite, a fresher result.
    async fn record_check(&self, check: CheckResult) -> Result<()>;

    /// The most recently recorded result for a website, or `None` if it has
    /// never been checked.
    async fn latest_check(&self, website_id: i64) -> Result<Option<CheckResult>>;
}
