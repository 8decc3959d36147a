use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use deadpool::managed::Object;
use libsql::params;

use super::{Store, migrations};
use crate::models::Website;
use crate::monitoring::types::CheckResult;
use crate::pool::{LibsqlManager, LibsqlPool};

/// Durable store on a local SQLite file via libsql.
///
/// Checks are appended rather than overwritten; `latest_check` answers from
/// the newest row, so the latest-result contract holds while the on-disk
/// history stays queryable.
pub struct SqliteStore {
    pool: LibsqlPool,
}

impl SqliteStore {
    /// Open the store and bring the schema up to date.
    pub async fn new(pool: LibsqlPool) -> Result<Self> {
        let conn = pool.get().await?;
        migrations::run_migrations(&conn).await?;
        Ok(Self { pool })
    }

    async fn get_conn(&self) -> Result<Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn register_website(&self, name: &str, url: &str) -> Result<Website> {
        let conn = self.get_conn().await?;

        let mut rows = conn
            .query("SELECT id, name, url FROM websites WHERE url = ?", params![url])
            .await?;
        if let Some(row) = rows.next().await? {
            return Ok(Website { id: row.get(0)?, name: row.get(1)?, url: row.get(2)? });
        }

        conn.execute("INSERT INTO websites (name, url) VALUES (?, ?)", params![name, url])
            .await?;

        Ok(Website { id: conn.last_insert_rowid(), name: name.to_owned(), url: url.to_owned() })
    }

    async fn websites(&self) -> Result<Vec<Website>> {
        let conn = self.get_conn().await?;
        let mut rows = conn.query("SELECT id, name, url FROM websites ORDER BY id", ()).await?;

        let mut websites = Vec::new();
        while let Some(row) = rows.next().await? {
            websites.push(Website { id: row.get(0)?, name: row.get(1)?, url: row.get(2)? });
        }

        Ok(websites)
    }

    async fn record_check(&self, check: CheckResult) -> Result<()> {
        let conn = self.get_conn().await?;
        let headers = serde_json::to_string(&check.headers)?;
        let ssl_info = serde_json::to_string(&check.tls_info)?;

        conn.execute(
            "INSERT INTO checks (website_id, timestamp_ms, status, latency_us, headers, ssl_info) \
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                check.website_id,
                check.timestamp.timestamp_millis(),
                check.status.to_string(),
                check.latency.as_micros() as i64,
                headers,
                ssl_info
            ],
        )
        .await?;

        Ok(())
    }

    async fn latest_check(&self, website_id: i64) -> Result<Option<CheckResult>> {
        let conn = self.get_conn().await?;

        // Tie-break on row id so two checks in the same millisecond still
        // resolve deterministically.
        let mut rows = conn
            .query(
                "SELECT website_id, timestamp_ms, status, latency_us, headers, ssl_info \
                 FROM checks WHERE website_id = ? \
                 ORDER BY timestamp_ms DESC, id DESC LIMIT 1",
                params![website_id],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        let timestamp_ms: i64 = row.get(1)?;
        let status: String = row.get(2)?;
        let latency_us: i64 = row.get(3)?;
        let headers: String = row.get(4)?;
        let ssl_info: String = row.get(5)?;

        Ok(Some(CheckResult {
            website_id: row.get(0)?,
            timestamp: DateTime::from_timestamp_millis(timestamp_ms)
                .context("check timestamp out of range")?,
            status: status.parse()?,
            latency: Duration::from_micros(latency_us as u64),
            headers: serde_json::from_str(&headers)?,
            tls_info: serde_json::from_str(&ssl_info)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::monitoring::types::{CheckStatus, Headers, TlsInfo};

    /// Store backed by a database file in a temp dir; the dir must outlive
    /// the store.
    async fn test_store() -> (SqliteStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let database = libsql::Builder::new_local(&db_path).build().await.unwrap();
        let pool = deadpool::managed::Pool::builder(LibsqlManager::new(database)).build().unwrap();

        (SqliteStore::new(pool).await.unwrap(), dir)
    }

    fn check(website_id: i64) -> CheckResult {
        CheckResult {
            website_id,
            timestamp: Utc::now(),
            status: CheckStatus::Up,
            latency: Duration::from_millis(100),
            headers: None,
            tls_info: None,
        }
    }

    #[tokio::test]
    async fn register_record_and_read_back() {
        let (store, _dir) = test_store().await;

        let website =
            store.register_website("Google", "https://www.google.com").await.unwrap();
        assert_eq!(website.id, 1);

        let websites = store.websites().await.unwrap();
        assert_eq!(websites.len(), 1);
        assert_eq!(websites[0].name, "Google");

        store.record_check(check(website.id)).await.unwrap();

        let latest = store.latest_check(website.id).await.unwrap().expect("check found");
        assert_eq!(latest.status, CheckStatus::Up);
        assert_eq!(latest.latency, Duration::from_millis(100));
        assert_eq!(latest.website_id, website.id);
    }

    #[tokio::test]
    async fn latest_check_is_none_before_any_check() {
        let (store, _dir) = test_store().await;
        let website = store.register_website("quiet", "https://quiet.test").await.unwrap();

        assert!(store.latest_check(website.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn registration_is_idempotent_by_url() {
        let (store, _dir) = test_store().await;

        let first = store.register_website("one", "https://one.test").await.unwrap();
        let again = store.register_website("renamed", "https://one.test").await.unwrap();

        assert_eq!(again, first);
        assert_eq!(store.websites().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn newest_check_wins() {
        let (store, _dir) = test_store().await;
        let website = store.register_website("site", "https://site.test").await.unwrap();

        let older = CheckResult {
            timestamp: Utc::now() - TimeDelta::seconds(30),
            status: CheckStatus::Down,
            ..check(website.id)
        };
        let newer = check(website.id);

        store.record_check(older).await.unwrap();
        store.record_check(newer).await.unwrap();

        let latest = store.latest_check(website.id).await.unwrap().expect("check found");
        assert_eq!(latest.status, CheckStatus::Up);
    }

    #[tokio::test]
    async fn headers_and_tls_info_round_trip_through_json_columns() {
        let (store, _dir) = test_store().await;
        let website = store.register_website("tls", "https://tls.test").await.unwrap();

        let mut headers = Headers::new();
        headers.insert("set-cookie".into(), vec!["a=1".into(), "b=2".into()]);

        let not_before = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let not_after = DateTime::from_timestamp(1_800_000_000, 0).unwrap();
        let recorded = CheckResult {
            headers: Some(headers.clone()),
            tls_info: Some(TlsInfo {
                subject: "CN=tls.test".into(),
                issuer: "CN=Test CA".into(),
                not_before,
                not_after,
                is_valid: true,
            }),
            ..check(website.id)
        };

        store.record_check(recorded).await.unwrap();

        let latest = store.latest_check(website.id).await.unwrap().expect("check found");
        assert_eq!(latest.headers, Some(headers));
        let tls = latest.tls_info.expect("tls info survives");
        assert_eq!(tls.subject, "CN=tls.test");
        assert_eq!(tls.not_after, not_after);
        assert!(tls.is_valid);
    }
}
