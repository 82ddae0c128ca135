//! SQLite-backed token store using sqlx.
//!
//! Schema: `token_cache(key, value, expires_at)` with `key` as primary key.
//! `expires_at` is a unix timestamp in seconds; rows past it read as absent.

use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use std::time::Duration;
use teamleader_types::{Result, TokenKey, TokenStore};

/// A persistent [`TokenStore`] backed by `SQLite`.
pub struct SqliteTokenStore {
    /// Connection pool to the `SQLite` database.
    pool: SqlitePool,
}

impl SqliteTokenStore {
    /// Connects to a `SQLite` database (e.g. `"sqlite:./tokens.db"` or `"sqlite::memory:"`).
    ///
    /// Automatically creates the database file if it does not exist and
    /// creates the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`sqlx::Error`] if the connection or table creation fails.
    pub async fn new(database_url: &str) -> std::result::Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // every connection to `:memory:` opens its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS token_cache (
                key         TEXT    PRIMARY KEY NOT NULL,
                value       TEXT    NOT NULL,
                expires_at  INTEGER NOT NULL,
                updated_at  INTEGER NOT NULL DEFAULT (unixepoch())
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Drop rows whose TTL has passed. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete statement fails.
    pub async fn purge_expired(&self) -> Result<u64> {
        let done = sqlx::query("DELETE FROM token_cache WHERE expires_at <= unixepoch()")
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn get(&self, key: TokenKey) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT value FROM token_cache WHERE key = ? AND expires_at > unixepoch()",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: TokenKey, value: &str, ttl: Duration) -> Result<()> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX / 2);
        sqlx::query(
            "INSERT INTO token_cache (key, value, expires_at)
             VALUES (?, ?, unixepoch() + ?)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 expires_at = excluded.expires_at,
                 updated_at = unixepoch()",
        )
        .bind(key.as_str())
        .bind(value)
        .bind(ttl_secs)
        .execute(&self.pool)
        .await?;
        tracing::trace!(key = %key, ttl_secs, "token cache entry written");
        Ok(())
    }

    async fn forget(&self, key: TokenKey) -> Result<()> {
        sqlx::query("DELETE FROM token_cache WHERE key = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    async fn make_store() -> SqliteTokenStore {
        SqliteTokenStore::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = make_store().await;
        store.set(TokenKey::AccessToken, "at", HOUR).await.unwrap();
        assert_eq!(
            store.get(TokenKey::AccessToken).await.unwrap().as_deref(),
            Some("at")
        );
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = make_store().await;
        assert!(store.get(TokenKey::RefreshToken).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert() {
        let store = make_store().await;
        store.set(TokenKey::RefreshToken, "one", HOUR).await.unwrap();
        store.set(TokenKey::RefreshToken, "two", HOUR).await.unwrap();
        assert_eq!(
            store.get(TokenKey::RefreshToken).await.unwrap().as_deref(),
            Some("two")
        );
    }

    #[tokio::test]
    async fn test_forget() {
        let store = make_store().await;
        store.set(TokenKey::TokenExpire, "1700000000", HOUR).await.unwrap();
        store.forget(TokenKey::TokenExpire).await.unwrap();
        assert!(store.get(TokenKey::TokenExpire).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_reads_absent_and_purges() {
        let store = make_store().await;
        store
            .set(TokenKey::AccessToken, "at", Duration::ZERO)
            .await
            .unwrap();
        store.set(TokenKey::RefreshToken, "rt", HOUR).await.unwrap();
        assert!(store.get(TokenKey::AccessToken).await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert!(store.get(TokenKey::RefreshToken).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("tokens.db").display());
        {
            let store = SqliteTokenStore::new(&url).await.unwrap();
            store.set(TokenKey::AccessToken, "kept", HOUR).await.unwrap();
        }
        let store = SqliteTokenStore::new(&url).await.unwrap();
        assert_eq!(
            store.get(TokenKey::AccessToken).await.unwrap().as_deref(),
            Some("kept")
        );
    }
}
