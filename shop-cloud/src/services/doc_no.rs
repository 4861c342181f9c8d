//! Running document numbers: `{PREFIX}{yyyymmdd}{nnnnn}` per shop

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockKey = (String, String);

use crate::cache::Cacher;
use crate::db::repository::CrudRepository;
use crate::error::ServiceResult;

/// Date part of the prefix; document dates are taken in UTC
pub fn doc_prefix(module_prefix: &str, doc_date: DateTime<Utc>) -> String {
    format!("{module_prefix}{}", doc_date.format("%Y%m%d"))
}

pub fn format_doc_no(prefix: &str, number: i64) -> String {
    format!("{prefix}{number:05}")
}

fn cache_key(shop_id: &str, prefix: &str) -> String {
    format!("docno:{shop_id}:{prefix}")
}

pub struct DocNoGenerator {
    cache: Arc<dyn Cacher>,
    locks: DashMap<LockKey, Arc<Mutex<()>>>,
    ttl: Duration,
}

/// Held while a number is issued and stored. Dropping it releases the
/// mutex and removes the map entry when nobody else is waiting on it.
pub struct DocNoLock<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a DashMap<LockKey, Arc<Mutex<()>>>,
    key: LockKey,
}

impl Drop for DocNoLock<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // waiters hold a clone of the Arc, so a count of one is the map's own
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl DocNoGenerator {
    pub fn new(cache: Arc<dyn Cacher>, ttl: Duration) -> Self {
        Self {
            cache,
            locks: DashMap::new(),
            ttl,
        }
    }

    /// Serializes numbering and insert for one `(shop, prefix)`.
    /// Hold the guard until the document is stored.
    pub async fn lock(&self, shop_id: &str, prefix: &str) -> DocNoLock<'_> {
        let key = (shop_id.to_string(), prefix.to_string());
        let mutex = self.locks.entry(key.clone()).or_default().clone();
        DocNoLock {
            guard: Some(mutex.lock_owned().await),
            locks: &self.locks,
            key,
        }
    }

    /// Number of `(shop, prefix)` locks currently tracked
    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }

    /// Next number for `prefix`: the cached previous number, or the stored
    /// maximum when the cache has nothing.
    pub async fn next<T>(
        &self,
        crud: &CrudRepository<T>,
        shop_id: &str,
        prefix: &str,
    ) -> ServiceResult<i64>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let cached = match self.cache.get(&cache_key(shop_id, prefix)).await {
            Ok(value) => value.and_then(|v| v.parse::<i64>().ok()),
            Err(e) => {
                tracing::warn!(shop_id = %shop_id, prefix = %prefix, error = %e, "Doc number cache read failed");
                None
            }
        };

        let previous = match cached {
            Some(n) => n,
            None => crud
                .find_last_doc_no(shop_id, prefix)
                .await?
                .and_then(|last| last.strip_prefix(prefix).and_then(|n| n.parse::<i64>().ok()))
                .unwrap_or(0),
        };
        Ok(previous + 1)
    }

    /// Remember `number` as the latest issued for `prefix`
    pub async fn commit(&self, shop_id: &str, prefix: &str, number: i64) {
        if let Err(e) = self
            .cache
            .set(&cache_key(shop_id, prefix), &number.to_string(), Some(self.ttl))
            .await
        {
            tracing::warn!(shop_id = %shop_id, prefix = %prefix, error = %e, "Doc number cache write failed");
        }
    }

    /// Drop the cached counter so the next call reads the store again
    pub async fn forget(&self, shop_id: &str, prefix: &str) {
        if let Err(e) = self.cache.del(&cache_key(shop_id, prefix)).await {
            tracing::warn!(shop_id = %shop_id, prefix = %prefix, error = %e, "Doc number cache evict failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::db::repository::test_support::test_pool;
    use crate::services::new_document;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_format() {
        let date = Utc.with_ymd_and_hms(2024, 3, 7, 23, 59, 0).unwrap();
        let prefix = doc_prefix("SI", date);
        assert_eq!(prefix, "SI20240307");
        assert_eq!(format_doc_no(&prefix, 12), "SI2024030700012");
    }

    #[tokio::test]
    async fn test_next_falls_back_to_store() {
        let pool = test_pool().await;
        let crud: CrudRepository<serde_json::Value> = CrudRepository::new(pool, "saleinvoice");
        let generator = DocNoGenerator::new(Arc::new(MemoryCache::new()), Duration::from_secs(60));

        assert_eq!(generator.next(&crud, "s1", "SI20240307").await.unwrap(), 1);

        crud.create(&new_document("s1", "u", json!({"docno": "SI2024030700007"})))
            .await
            .unwrap();
        crud.create(&new_document("s1", "u", json!({"docno": "SI2024030600099"})))
            .await
            .unwrap();
        assert_eq!(generator.next(&crud, "s1", "SI20240307").await.unwrap(), 8);

        // the cache wins once committed
        generator.commit("s1", "SI20240307", 41).await;
        assert_eq!(generator.next(&crud, "s1", "SI20240307").await.unwrap(), 42);
        // other shops are independent
        assert_eq!(generator.next(&crud, "s2", "SI20240307").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unparsable_suffix_restarts() {
        let pool = test_pool().await;
        let crud: CrudRepository<serde_json::Value> = CrudRepository::new(pool, "paid");
        let generator = DocNoGenerator::new(Arc::new(MemoryCache::new()), Duration::from_secs(60));
        crud.create(&new_document("s1", "u", json!({"docno": "EE20240307-X"})))
            .await
            .unwrap();
        assert_eq!(generator.next(&crud, "s1", "EE20240307").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lock_is_per_key() {
        let generator = DocNoGenerator::new(Arc::new(MemoryCache::new()), Duration::from_secs(60));
        let _held = generator.lock("s1", "SI20240307").await;
        // a different prefix is not blocked
        let other = tokio::time::timeout(
            Duration::from_millis(100),
            generator.lock("s1", "ST20240307"),
        )
        .await;
        assert!(other.is_ok());
        let same = tokio::time::timeout(
            Duration::from_millis(100),
            generator.lock("s1", "SI20240307"),
        )
        .await;
        assert!(same.is_err());
    }

    #[tokio::test]
    async fn test_locks_released_after_use() {
        let generator = DocNoGenerator::new(Arc::new(MemoryCache::new()), Duration::from_secs(60));
        for day in 1..=500 {
            let _guard = generator.lock("s1", &format!("SI2024{day:04}")).await;
        }
        assert_eq!(generator.lock_count(), 0);

        let held = generator.lock("s1", "SI20240307").await;
        assert_eq!(generator.lock_count(), 1);
        drop(held);
        assert_eq!(generator.lock_count(), 0);
    }

    #[tokio::test]
    async fn test_waiter_keeps_lock_entry() {
        let generator = Arc::new(DocNoGenerator::new(
            Arc::new(MemoryCache::new()),
            Duration::from_secs(60),
        ));
        let held = generator.lock("s1", "SI20240307").await;

        let waiter = {
            let generator = generator.clone();
            tokio::spawn(async move {
                let _guard = generator.lock("s1", "SI20240307").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(held);
        // the waiter still needs the entry, so it survives the first release
        waiter.await.unwrap();
        assert_eq!(generator.lock_count(), 0);
    }
}
