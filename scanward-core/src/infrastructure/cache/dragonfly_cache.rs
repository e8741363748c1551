//! Dragonfly database cache implementation
//!
//! Dragonfly speaks the Redis protocol, so the `redis` crate's connection
//! manager is used for all access. Values are stored as JSON.
// cspell:ignore Dragonfly LTRIM LRANGE

use redis::Client;
use redis::aio::ConnectionManager;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

/// Cache access errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to connect to the Dragonfly database: {0}")]
    Connection(String),
    #[error("Dragonfly {command} failed for key {key}: {message}")]
    Command {
        command: &'static str,
        key: String,
        message: String,
    },
    #[error("Cache value serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    fn command(command: &'static str, key: &str, error: redis::RedisError) -> Self {
        error!("Dragonfly {} failed for key {}: {}", command, key, error);
        Self::Command {
            command,
            key: key.to_string(),
            message: error.to_string(),
        }
    }
}

/// Dragonfly database cache implementation
#[derive(Clone)]
pub struct DragonflyCache {
    connection_manager: ConnectionManager,
}

impl DragonflyCache {
    /// Create a new Dragonfly cache instance
    ///
    /// # Arguments
    /// * `url` - Connection URL (e.g., "redis://127.0.0.1:6379")
    /// * `connect_timeout` - Upper bound for establishing and verifying the connection
    ///
    /// # Errors
    /// Returns an error if the connection to the Dragonfly database cannot be established
    pub async fn connect(url: &str, connect_timeout: Duration) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            CacheError::Connection(e.to_string())
        })?;

        let connection_manager = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                CacheError::Connection(format!(
                    "timed out after {}s",
                    connect_timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                error!("Failed to create connection manager: {}", e);
                CacheError::Connection(e.to_string())
            })?;

        let cache = Self { connection_manager };
        cache.ping().await?;

        debug!("Successfully connected to the Dragonfly database at {}", url);
        Ok(cache)
    }

    /// Round-trip a PING to verify the connection is usable.
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection_manager.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(())
    }

    /// Fetch and deserialize a JSON value. Missing or expired keys yield `None`.
    pub async fn get_json<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.connection_manager.clone();

        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async::<Option<String>>(&mut conn)
            .await
            .map_err(|e| CacheError::command("GET", key, e))?;

        match value {
            Some(raw) => {
                debug!("Cache hit for key: {}", key);
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => {
                debug!("Cache miss for key: {}", key);
                Ok(None)
            }
        }
    }

    /// Store a JSON value with an expiry.
    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let mut conn = self.connection_manager.clone();
        let payload = serde_json::to_string(value)?;

        redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::command("SET", key, e))?;

        debug!(
            "Stored entry for key: {} with TTL: {}s",
            key,
            ttl_seconds(ttl)
        );
        Ok(())
    }

    /// Overwrite a JSON value only if the key still exists, refreshing its expiry.
    ///
    /// Returns `false` when the key was absent (never written or already expired).
    pub async fn replace_json<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<bool, CacheError>
    where
        T: Serialize,
    {
        let mut conn = self.connection_manager.clone();
        let payload = serde_json::to_string(value)?;

        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .arg("XX")
            .query_async::<Option<String>>(&mut conn)
            .await
            .map_err(|e| CacheError::command("SET", key, e))?;

        Ok(reply.is_some())
    }

    /// Push a value to the head of a list, trim the list to `capacity` entries
    /// and refresh the list expiry, atomically.
    pub async fn push_capped(
        &self,
        key: &str,
        value: &str,
        capacity: usize,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection_manager.clone();
        let last_index = capacity.saturating_sub(1) as isize;

        redis::pipe()
            .atomic()
            .cmd("LPUSH")
            .arg(key)
            .arg(value)
            .ignore()
            .cmd("LTRIM")
            .arg(key)
            .arg(0)
            .arg(last_index)
            .ignore()
            .cmd("EXPIRE")
            .arg(key)
            .arg(ttl_seconds(ttl))
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::command("LPUSH", key, e))?;

        Ok(())
    }

    /// Read up to `count` entries from the head of a list.
    pub async fn list_head(&self, key: &str, count: usize) -> Result<Vec<String>, CacheError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.connection_manager.clone();
        let last_index = isize::try_from(count).unwrap_or(isize::MAX) - 1;
        redis::cmd("LRANGE")
            .arg(key)
            .arg(0)
            .arg(last_index)
            .query_async::<Vec<String>>(&mut conn)
            .await
            .map_err(|e| CacheError::command("LRANGE", key, e))
    }
}

fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}
