//! Feed slot operations for the SQLite store.
//!
//! The slot is a single `feed_cache` row (slot = 1) with its records in
//! `feed_records`, ordered by `position`. Timestamps are stored as RFC 3339
//! text with nanosecond precision so they round-trip exactly.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use url::Url;
use uuid::Uuid;

use super::connection::SqliteFeedStore;
use super::store::{CachedFeed, FeedStore};
use crate::Error;
use crate::feed::LocalFeedRecord;

const SLOT: i64 = 1;

/// Raw record columns, decoded outside of rusqlite's row mapping so that
/// malformed content surfaces as [`Error::Corrupt`].
struct RecordRow {
    id: String,
    description: Option<String>,
    location: Option<String>,
    url: String,
}

impl TryFrom<RecordRow> for LocalFeedRecord {
    type Error = Error;

    fn try_from(row: RecordRow) -> Result<Self, Error> {
        let id = Uuid::parse_str(&row.id).map_err(|e| Error::Corrupt(format!("record id {:?}: {e}", row.id)))?;
        let url = Url::parse(&row.url).map_err(|e| Error::Corrupt(format!("record url {:?}: {e}", row.url)))?;
        Ok(LocalFeedRecord { id, description: row.description, location: row.location, url })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Corrupt(format!("cache timestamp {raw:?}: {e}")))
}

#[async_trait]
impl FeedStore for SqliteFeedStore {
    async fn delete_cached_feed(&self) -> Result<(), Error> {
        self.conn
            .call(|conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM feed_records WHERE slot = ?1", params![SLOT])?;
                let deleted = tx.execute("DELETE FROM feed_cache WHERE slot = ?1", params![SLOT])?;
                tx.commit()?;
                tracing::trace!(deleted, "deleted cached feed");
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn insert(&self, feed: Vec<LocalFeedRecord>, timestamp: DateTime<Utc>) -> Result<(), Error> {
        let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true);
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM feed_records WHERE slot = ?1", params![SLOT])?;
                tx.execute(
                    "INSERT INTO feed_cache (slot, timestamp) VALUES (?1, ?2)
                     ON CONFLICT(slot) DO UPDATE SET timestamp = excluded.timestamp",
                    params![SLOT, timestamp],
                )?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO feed_records (slot, position, id, description, location, url)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    )?;
                    for (position, record) in feed.iter().enumerate() {
                        stmt.execute(params![
                            SLOT,
                            position as i64,
                            record.id.to_string(),
                            &record.description,
                            &record.location,
                            record.url.as_str(),
                        ])?;
                    }
                }
                tx.commit()?;
                tracing::trace!(records = feed.len(), "inserted cached feed");
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, Error> {
        self.conn
            .call(|conn| -> Result<Option<CachedFeed>, Error> {
                let timestamp = match conn.query_row(
                    "SELECT timestamp FROM feed_cache WHERE slot = ?1",
                    params![SLOT],
                    |row| row.get::<_, String>(0),
                ) {
                    Ok(raw) => parse_timestamp(&raw)?,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let mut stmt = conn.prepare(
                    "SELECT id, description, location, url
                     FROM feed_records WHERE slot = ?1 ORDER BY position",
                )?;
                let rows = stmt.query_map(params![SLOT], |row| {
                    Ok(RecordRow { id: row.get(0)?, description: row.get(1)?, location: row.get(2)?, url: row.get(3)? })
                })?;

                let mut feed = Vec::new();
                for row in rows {
                    feed.push(LocalFeedRecord::try_from(row?)?);
                }

                Ok(Some(CachedFeed { feed, timestamp }))
            })
            .await
            .map_err(Error::from)
    }
}
