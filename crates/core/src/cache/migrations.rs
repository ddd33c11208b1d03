//! Database schema migrations.
//!
//! Applied versions are tracked in a `_migrations` table; each entry in
//! [`MIGRATIONS`] runs at most once per database.

use std::num::ParseIntError;

use crate::Error;
use tokio_rusqlite::{Connection, params};

/// Migration list: (version, SQL), applied in order.
const MIGRATIONS: &[(&str, &str)] = &[("1", include_str!("../../migrations/001_feed_cache.sql"))];

/// Run any pending migrations.
///
/// # Errors
///
/// Returns an error if a migration's SQL fails to execute.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(Error::from)?;

        let current: i64 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))
            .map_err(Error::from)?;

        for (version, sql) in MIGRATIONS {
            let version_num: i64 = version
                .parse()
                .map_err(|e: ParseIntError| Error::MigrationFailed(e.to_string()))?;
            if version_num <= current {
                continue;
            }

            conn.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version_num}: {e}")))?;
            conn.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version_num, chrono::Utc::now().to_rfc3339()],
            )
            .map_err(Error::from)?;
            tracing::debug!(version = version_num, "applied feed cache migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
