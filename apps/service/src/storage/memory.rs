use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Store;
use crate::models::Website;
use crate::monitoring::types::CheckResult;

/// In-memory store: a reader/writer lock over the registry and the map of
/// latest results. Keeps no history and nothing survives the process.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    websites: Vec<Website>,
    checks: HashMap<i64, CheckResult>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner::default()) }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn register_website(&self, name: &str, url: &str) -> Result<Website> {
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner.websites.iter().find(|website| website.url == url) {
            return Ok(existing.clone());
        }

        inner.next_id += 1;
        let website = Website { id: inner.next_id, name: name.to_owned(), url: url.to_owned() };
        inner.websites.push(website.clone());
        Ok(website)
    }

    async fn websites(&self) -> Result<Vec<Website>> {
        Ok(self.inner.read().await.websites.clone())
    }

    async fn record_check(&self, check: CheckResult) -> Result<()> {
        self.inner.write().await.checks.insert(check.website_id, check);
        Ok(())
    }

    async fn latest_check(&self, website_id: i64) -> Result<Option<CheckResult>> {
        Ok(self.inner.read().await.checks.get(&website_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeDelta, Utc};

    use super::*;
    use crate::monitoring::types::CheckStatus;

    fn check(website_id: i64, status: CheckStatus) -> CheckResult {
        CheckResult {
            website_id,
            timestamp: Utc::now(),
            status,
            latency: Duration::from_millis(100),
            headers: None,
            tls_info: None,
        }
    }

    #[tokio::test]
    async fn latest_check_is_none_for_an_unchecked_website() {
        let store = MemoryStore::new();
        let website = store.register_website("quiet", "https://quiet.test").await.unwrap();

        assert!(store.latest_check(website.id).await.unwrap().is_none());
        assert!(store.latest_check(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn registration_assigns_sequential_ids_and_is_idempotent_by_url() {
        let store = MemoryStore::new();

        let first = store.register_website("one", "https://one.test").await.unwrap();
        let second = store.register_website("two", "https://two.test").await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let again = store.register_website("renamed", "https://one.test").await.unwrap();
        assert_eq!(again, first, "re-registering a URL returns the existing website");

        assert_eq!(store.websites().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn record_then_read_round_trips() {
        let store = MemoryStore::new();
        let website = store.register_website("site", "https://site.test").await.unwrap();

        store.record_check(check(website.id, CheckStatus::Up)).await.unwrap();
        let latest = store.latest_check(website.id).await.unwrap().expect("recorded");
        assert_eq!(latest.status, CheckStatus::Up);

        store.record_check(check(website.id, CheckStatus::Down)).await.unwrap();
        let latest = store.latest_check(website.id).await.unwrap().expect("replaced");
        assert_eq!(latest.status, CheckStatus::Down, "latest write wins");
    }

    #[tokio::test]
    async fn concurrent_writes_to_the_same_website_never_tear() {
        let store = Arc::new(MemoryStore::new());
        let base = Utc::now();

        // Each writer submits a result whose fields are all derived from its
        // index, so a surviving hybrid of two results is detectable.
        let mut handles = Vec::new();
        for i in 0..32_i64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let result = CheckResult {
                    website_id: 1,
                    timestamp: base + TimeDelta::seconds(i),
                    status: if i % 2 == 0 { CheckStatus::Up } else { CheckStatus::Down },
                    latency: Duration::from_millis(i as u64),
                    headers: None,
                    tls_info: None,
                };
                store.record_check(result).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let survivor = store.latest_check(1).await.unwrap().expect("one result survives");
        let i = survivor.latency.as_millis() as i64;
        assert!((0..32).contains(&i));
        assert_eq!(survivor.timestamp, base + TimeDelta::seconds(i));
        let expected = if i % 2 == 0 { CheckStatus::Up } else { CheckStatus::Down };
        assert_eq!(survivor.status, expected);
    }

    #[tokio::test]
    async fn concurrent_writes_to_different_websites_all_land() {
        let store = Arc::new(MemoryStore::new());

        let mut handles = Vec::new();
        for id in 1..=8_i64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.record_check(check(id, CheckStatus::Up)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for id in 1..=8_i64 {
            assert!(store.latest_check(id).await.unwrap().is_some());
        }
    }
}
