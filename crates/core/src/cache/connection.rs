//! SQLite store handle with pragma configuration.
//!
//! Opening applies the pragmas below and runs pending migrations before the
//! store is handed out.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// SQLite-backed [`FeedStore`](super::FeedStore).
///
/// Wraps a tokio-rusqlite Connection; every operation runs on its single
/// background thread in the order it was submitted.
#[derive(Clone, Debug)]
pub struct SqliteFeedStore {
    pub(crate) conn: Connection,
}

impl SqliteFeedStore {
    /// Open a store at `path`, creating the file and its parent directory if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        tracing::debug!(path = %path.display(), "opened sqlite feed store");
        Self::configure(conn).await
    }

    /// Open a private in-memory store.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::configure(conn).await
    }

    async fn configure(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}
