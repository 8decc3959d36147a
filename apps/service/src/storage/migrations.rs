use anyhow::Result;
use libsql::Connection;
use tracing::info;

/// Schema version - increment when making schema changes.
const SCHEMA_VERSION: i32 = 1;

/// Run database migrations. Safe to call on every startup.
pub async fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL,
            description TEXT
        )",
        (),
    )
    .await?;

    let current_version = get_current_version(conn).await?;
    if current_version >= SCHEMA_VERSION {
        return Ok(());
    }

    if current_version < 1 {
        run_migration_v1(conn).await?;
        record_migration(conn, 1, "websites and checks tables").await?;
    }

    info!(version = SCHEMA_VERSION, "database migrations applied");
    Ok(())
}

/// Get current schema version from the database.
async fn get_current_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn.query("SELECT MAX(version) FROM schema_migrations", ()).await?;

    if let Some(row) = rows.next().await? {
        let version: Option<i32> = row.get(0)?;
        Ok(version.unwrap_or(0))
    } else {
        Ok(0)
    }
}

/// Record that a migration was applied.
async fn record_migration(conn: &Connection, version: i32, description: &str) -> Result<()> {
    let applied_at = chrono::Utc::now().timestamp();

    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?, ?, ?)",
        libsql::params![version, applied_at, description],
    )
    .await?;

    Ok(())
}

async fn run_migration_v1(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE websites (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            url TEXT NOT NULL UNIQUE
        )",
        (),
    )
    .await?;

    conn.execute(
        "CREATE TABLE checks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            website_id INTEGER NOT NULL,
            timestamp_ms INTEGER NOT NULL,
            status TEXT NOT NULL,
            latency_us INTEGER NOT NULL,
            headers TEXT,
            ssl_info TEXT,
            FOREIGN KEY (website_id) REFERENCES websites (id)
        )",
        (),
    )
    .await?;

    conn.execute(
        "CREATE INDEX idx_checks_website_timestamp ON checks (website_id, timestamp_ms DESC)",
        (),
    )
    .await?;

    Ok(())
}
