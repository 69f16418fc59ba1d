use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::{cmd, AsyncCommands, Client, RedisError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

/// Lazily connected Redis handle. Every operation degrades to a no-op while
/// disconnected so callers can treat the cache as optional.
#[derive(Clone)]
pub(crate) struct RedisHandle {
    url: String,
    manager: Arc<RwLock<Option<ConnectionManager>>>,
}

#[derive(Debug, Clone)]
pub(crate) enum RedisHealth {
    Healthy,
    Disconnected,
    Unhealthy(String),
}

impl RedisHandle {
    pub(crate) fn new(url: String) -> Self {
        Self { url, manager: Arc::new(RwLock::new(None)) }
    }

    pub(crate) async fn connect(&self) -> Result<(), RedisError> {
        let client = Client::open(self.url.clone())?;
        let manager = ConnectionManager::new(client).await?;
        let mut guard = self.manager.write().await;
        *guard = Some(manager);
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        let mut guard = self.manager.write().await;
        *guard = None;
    }

    async fn manager(&self) -> Option<ConnectionManager> {
        self.manager.read().await.clone()
    }

    pub(crate) async fn health(&self) -> RedisHealth {
        let Some(mut manager) = self.manager().await else {
            return RedisHealth::Disconnected;
        };

        match cmd("PING").query_async::<_, String>(&mut manager).await {
            Ok(_) => RedisHealth::Healthy,
            Err(err) => RedisHealth::Unhealthy(err.to_string()),
        }
    }

    /// Cached JSON value under `key`. Misses, decode failures and a missing
    /// connection all read as `None`.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut manager = self.manager().await?;
        let raw: Option<String> = match manager.get(key).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, key, "Redis read failed");
                return None;
            }
        };

        raw.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(error = %err, key, "Discarding undecodable cache entry");
                None
            }
        })
    }

    pub(crate) async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        if ttl_seconds == 0 {
            return;
        }
        let Some(mut manager) = self.manager().await else {
            return;
        };
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, key, "Failed to encode cache entry");
                return;
            }
        };

        if let Err(err) = manager.set_ex::<_, _, ()>(key, payload, ttl_seconds).await {
            tracing::warn!(error = %err, key, "Redis write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RedisHandle, RedisHealth};

    #[tokio::test]
    async fn disconnected_handle_behaves_as_empty_cache() {
        let redis = RedisHandle::new("redis://127.0.0.1:1/0".to_string());

        assert!(matches!(redis.health().await, RedisHealth::Disconnected));
        redis.set_json("rankings:test", &vec![1, 2, 3], 30).await;
        assert_eq!(redis.get_json::<Vec<i32>>("rankings:test").await, None);
    }
}
