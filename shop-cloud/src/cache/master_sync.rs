//! Per-shop, per-module "last write" timestamps polled by sync clients

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{CacheResult, Cacher};

#[derive(Clone)]
pub struct MasterSyncCacheRepository {
    cache: Arc<dyn Cacher>,
}

fn cache_key(shop_id: &str) -> String {
    format!("mastersync:{shop_id}")
}

impl MasterSyncCacheRepository {
    pub fn new(cache: Arc<dyn Cacher>) -> Self {
        Self { cache }
    }

    /// Record that `module` changed in `shop_id` at `at_millis`
    pub async fn save(&self, shop_id: &str, module: &str, at_millis: i64) -> CacheResult<()> {
        self.cache
            .hset(&cache_key(shop_id), module, &at_millis.to_string())
            .await
    }

    /// Last write time for each module, 0 for modules never written
    pub async fn get_status(
        &self,
        shop_id: &str,
        modules: &[&str],
    ) -> CacheResult<BTreeMap<String, i64>> {
        let stored = self.cache.hget_all(&cache_key(shop_id)).await?;
        Ok(modules
            .iter()
            .map(|module| {
                let at = stored
                    .get(*module)
                    .and_then(|v| v.parse::<i64>().ok())
                    .unwrap_or(0);
                (module.to_string(), at)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    #[tokio::test]
    async fn test_status_defaults_to_zero() {
        let repo = MasterSyncCacheRepository::new(Arc::new(MemoryCache::new()));
        repo.save("s1", "bankmaster", 1_700).await.unwrap();
        repo.save("s2", "bookbank", 9_999).await.unwrap();

        let status = repo
            .get_status("s1", &["bankmaster", "bookbank"])
            .await
            .unwrap();
        assert_eq!(status["bankmaster"], 1_700);
        assert_eq!(status["bookbank"], 0);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let repo = MasterSyncCacheRepository::new(Arc::new(MemoryCache::new()));
        repo.save("s1", "employee", 1).await.unwrap();
        repo.save("s1", "employee", 2).await.unwrap();
        let status = repo.get_status("s1", &["employee"]).await.unwrap();
        assert_eq!(status["employee"], 2);
    }
}
