use serde::{de::DeserializeOwned, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};

use crate::errors::ClientResult;
use crate::queries::Queries;

/// Fixed keys for the three logical stores.
pub const LEADS_CACHE_KEY: &str = "leads_cache";
pub const OFFLINE_QUEUE_KEY: &str = "offline_queue";
pub const REMINDERS_KEY: &str = "reminders";

/// Durable local storage: a SQLite-backed blob-per-key store.
///
/// Fail-soft policy lives in the callers; this type reports storage errors
/// and leaves the degradation decision to the cache, queue and overlay
/// boundaries. The one exception is corruption: a blob that no longer parses
/// reads as absent, since no caller can do anything better with it.
pub struct LocalStore {
    pub pool: SqlitePool,
}

impl LocalStore {
    pub async fn new(database_url: &str) -> ClientResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> ClientResult<()> {
        sqlx::query(Queries::SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Read one store's blob. A missing row is `None`; corrupt JSON reads the
    /// same, with the parse failure logged.
    pub async fn read_blob<T: DeserializeOwned>(&self, key: &str) -> ClientResult<Option<T>> {
        let row = sqlx::query(Queries::GET_BLOB)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row.try_get("value")?;
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::error!("STORE: discarding corrupt blob under '{key}': {e}");
                Ok(None)
            }
        }
    }

    /// Overwrite one store's blob.
    pub async fn write_blob<T: Serialize>(&self, key: &str, value: &T) -> ClientResult<()> {
        let raw = serde_json::to_string(value)?;

        sqlx::query(Queries::PUT_BLOB)
            .bind(key)
            .bind(raw)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
