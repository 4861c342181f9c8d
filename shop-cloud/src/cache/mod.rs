//! Key/value cache
//!
//! [`Cacher`] is the seam for a shared cache. [`MemoryCache`] keeps entries in
//! process with per-key expiry; expired entries are ignored on read and
//! dropped by [`Cacher::cleanup`].

pub mod master_sync;

pub use master_sync::MasterSyncCacheRepository;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("WRONGTYPE operation against key {0}")]
    WrongType(String),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

#[async_trait]
pub trait Cacher: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value`; `ttl = None` keeps it until deleted
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    async fn del(&self, key: &str) -> CacheResult<()>;

    async fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()>;

    async fn hget_all(&self, key: &str) -> CacheResult<HashMap<String, String>>;

    /// Drop expired entries, returning how many were removed
    async fn cleanup(&self) -> usize;
}

enum CacheValue {
    Text(String),
    Hash(HashMap<String, String>),
}

struct Entry {
    value: CacheValue,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn drop_if_expired(&self, key: &str) {
        let now = Instant::now();
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
    }
}

#[async_trait]
impl Cacher for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.drop_if_expired(key);
        match self.entries.get(key).as_deref() {
            None => Ok(None),
            Some(Entry {
                value: CacheValue::Text(text),
                ..
            }) => Ok(Some(text.clone())),
            Some(_) => Err(CacheError::WrongType(key.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: CacheValue::Text(value.to_string()),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()> {
        self.drop_if_expired(key);
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: CacheValue::Hash(HashMap::new()),
            expires_at: None,
        });
        match &mut entry.value {
            CacheValue::Hash(map) => {
                map.insert(field.to_string(), value.to_string());
                Ok(())
            }
            CacheValue::Text(_) => Err(CacheError::WrongType(key.to_string())),
        }
    }

    async fn hget_all(&self, key: &str) -> CacheResult<HashMap<String, String>> {
        self.drop_if_expired(key);
        match self.entries.get(key).as_deref() {
            None => Ok(HashMap::new()),
            Some(Entry {
                value: CacheValue::Hash(map),
                ..
            }) => Ok(map.clone()),
            Some(_) => Err(CacheError::WrongType(key.to_string())),
        }
    }

    async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}
