//! In-memory token store backed by a `HashMap` behind a `Mutex`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use teamleader_types::{Result, TeamleaderError, TokenKey, TokenStore};
use tokio::time::Instant;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// An in-memory [`TokenStore`] implementation for testing and ephemeral use.
#[derive(Default)]
pub struct InMemoryTokenStore {
    /// Key-indexed entries with their expiry instant.
    data: Mutex<HashMap<TokenKey, Entry>>,
}

impl InMemoryTokenStore {
    /// Creates a new empty in-memory token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<TokenKey, Entry>>> {
        self.data
            .lock()
            .map_err(|_| TeamleaderError::api("token store lock poisoned"))
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    /// Returns the value for `key` unless it is missing or past its TTL.
    async fn get(&self, key: TokenKey) -> Result<Option<String>> {
        let mut data = self.lock()?;
        match data.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                data.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: TokenKey, value: &str, ttl: Duration) -> Result<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.lock()?.insert(key, entry);
        Ok(())
    }

    async fn forget(&self, key: TokenKey) -> Result<()> {
        self.lock()?.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryTokenStore::new();
        store.set(TokenKey::AccessToken, "at", HOUR).await.unwrap();
        assert_eq!(
            store.get(TokenKey::AccessToken).await.unwrap().as_deref(),
            Some("at")
        );
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = InMemoryTokenStore::new();
        assert!(store.get(TokenKey::RefreshToken).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_forget() {
        let store = InMemoryTokenStore::new();
        store.set(TokenKey::TokenExpire, "123", HOUR).await.unwrap();
        store.forget(TokenKey::TokenExpire).await.unwrap();
        assert!(store.get(TokenKey::TokenExpire).await.unwrap().is_none());
        // forgetting twice is fine
        store.forget(TokenKey::TokenExpire).await.unwrap();
    }

    #[tokio::test]
    async fn test_overwrite() {
        let store = InMemoryTokenStore::new();
        store.set(TokenKey::AccessToken, "first", HOUR).await.unwrap();
        store.set(TokenKey::AccessToken, "second", HOUR).await.unwrap();
        assert_eq!(
            store.get(TokenKey::AccessToken).await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let store = InMemoryTokenStore::new();
        store
            .set(TokenKey::AccessToken, "at", Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.get(TokenKey::AccessToken).await.unwrap().is_some());
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get(TokenKey::AccessToken).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_already_expired() {
        let store = InMemoryTokenStore::new();
        store
            .set(TokenKey::AccessToken, "at", Duration::ZERO)
            .await
            .unwrap();
        assert!(store.get(TokenKey::AccessToken).await.unwrap().is_none());
    }
}
