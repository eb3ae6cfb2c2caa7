//! Redis-backed limiter state.
//!
//! Lets several host processes share the tripped/enabled state of their
//! forms. Each form's state is stored as a bincode-encoded
//! [`LimiterState`] under `{key_prefix}{resource_id}`.
//!
//! Compare-and-swap uses `WATCH`/`MULTI`/`EXEC` through
//! [`redis::transaction`]: if another writer touches the key between the
//! read and the write, the transaction is retried against the new value.
//!
//! The connection is synchronous to match the ports. A fresh connection is
//! taken from the client per call.
//!
//! ## Example
//!
//! ```rust,ignore
//! use form_throttle::infrastructure::redis_persistence::{
//!     RedisPersistenceConfig, RedisStatePersistence,
//! };
//!
//! let persistence = RedisStatePersistence::open_with_config(
//!     "redis://127.0.0.1/",
//!     RedisPersistenceConfig {
//!         key_prefix: "contact-site:".to_string(),
//!     },
//! )
//! .expect("invalid Redis URL");
//! ```

use crate::application::error::StoreError;
use crate::application::ports::StatePersistence;
use crate::domain::{resource::ResourceId, state::LimiterState};
use redis::{Client, Commands, RedisError};
use std::fmt;

/// Configuration for Redis persistence.
#[derive(Debug, Clone)]
pub struct RedisPersistenceConfig {
    /// Key prefix for Redis keys (default: "form-throttle:")
    pub key_prefix: String,
}

impl Default for RedisPersistenceConfig {
    fn default() -> Self {
        Self {
            key_prefix: "form-throttle:".to_string(),
        }
    }
}

/// [`StatePersistence`] over a Redis server.
#[derive(Clone)]
pub struct RedisStatePersistence {
    client: Client,
    config: RedisPersistenceConfig,
}

impl fmt::Debug for RedisStatePersistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStatePersistence")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RedisStatePersistence {
    /// Open a client with the default configuration.
    ///
    /// # Errors
    /// Returns error if the URL is invalid. No connection is made yet.
    pub fn open(url: &str) -> Result<Self, RedisError> {
        Self::open_with_config(url, RedisPersistenceConfig::default())
    }

    /// Open a client with a custom configuration.
    ///
    /// # Errors
    /// Returns error if the URL is invalid.
    pub fn open_with_config(url: &str, config: RedisPersistenceConfig) -> Result<Self, RedisError> {
        Ok(Self {
            client: Client::open(url)?,
            config,
        })
    }

    /// Delete every key under the configured prefix.
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if Redis cannot be reached.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let pattern = format!("{}*", self.config.key_prefix);
        let keys: Vec<String> = conn
            .scan_match::<_, String>(&pattern)
            .map_err(unavailable)?
            .collect();
        if !keys.is_empty() {
            conn.del::<_, ()>(&keys).map_err(unavailable)?;
        }
        Ok(())
    }

    fn key(&self, resource: &ResourceId) -> String {
        format!("{}{}", self.config.key_prefix, resource)
    }

    fn connection(&self) -> Result<redis::Connection, StoreError> {
        self.client.get_connection().map_err(unavailable)
    }
}

fn unavailable(e: RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn encode(state: &LimiterState) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(state).map_err(|e| StoreError::Corrupted(e.to_string()))
}

fn decode(bytes: Option<Vec<u8>>) -> Result<LimiterState, StoreError> {
    match bytes {
        Some(bytes) => {
            bincode::deserialize(&bytes).map_err(|e| StoreError::Corrupted(e.to_string()))
        }
        None => Ok(LimiterState::default()),
    }
}

impl StatePersistence for RedisStatePersistence {
    fn load(&self, resource: &ResourceId) -> Result<LimiterState, StoreError> {
        let mut conn = self.connection()?;
        let bytes: Option<Vec<u8>> = conn.get(self.key(resource)).map_err(unavailable)?;
        decode(bytes)
    }

    fn save(&self, resource: &ResourceId, state: LimiterState) -> Result<(), StoreError> {
        let bytes = encode(&state)?;
        let mut conn = self.connection()?;
        conn.set::<_, _, ()>(self.key(resource), bytes)
            .map_err(unavailable)
    }

    fn compare_and_swap(
        &self,
        resource: &ResourceId,
        expected: LimiterState,
        next: LimiterState,
    ) -> Result<bool, StoreError> {
        let key = self.key(resource);
        let bytes = encode(&next)?;
        let mut conn = self.connection()?;

        // Decode errors are carried out of the transaction closure, which
        // can only return RedisError.
        let mut corrupted = None;
        let swapped = redis::transaction(&mut conn, &[&key], |conn, pipe| {
            let raw: Option<Vec<u8>> = conn.get(&key)?;
            let current = match decode(raw) {
                Ok(current) => current,
                Err(e) => {
                    corrupted = Some(e);
                    return Ok(Some(false));
                }
            };

            if current != expected || !current.permits(&next) {
                return Ok(Some(false));
            }

            // A nil EXEC reply means the key changed under WATCH; retry.
            let written: Option<()> = pipe.set(&key, bytes.as_slice()).ignore().query(conn)?;
            Ok(written.map(|_| true))
        })
        .map_err(unavailable)?;

        match corrupted {
            Some(e) => Err(e),
            None => Ok(swapped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_key_uses_prefix() {
        let persistence = RedisStatePersistence::open_with_config(
            "redis://127.0.0.1/",
            RedisPersistenceConfig {
                key_prefix: "site-a:".to_string(),
            },
        )
        .unwrap();
        assert_eq!(persistence.key(&ResourceId::from(7u64)), "site-a:7");
    }

    #[test]
    fn test_state_encoding() {
        let state = LimiterState::tripped(SystemTime::UNIX_EPOCH + Duration::from_secs(42));
        let bytes = encode(&state).unwrap();
        assert_eq!(decode(Some(bytes)).unwrap(), state);
        assert_eq!(decode(None).unwrap(), LimiterState::default());
    }

    #[test]
    fn test_garbage_is_corrupted() {
        let err = decode(Some(vec![7, 7, 7])).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }
}
