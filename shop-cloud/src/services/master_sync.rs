//! Cross-module activity feed and last-write status

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::{Map, Value};
use shared::{Pageable, PageableStep, Pagination};

use super::activity::{ActivityAction, ActivityModuleManager};
use crate::cache::MasterSyncCacheRepository;
use crate::db::repository::Filter;
use crate::error::ServiceResult;

/// Parsed master-sync query, shared by the page and step variants
#[derive(Debug, Clone, Default)]
pub struct SyncQuery {
    pub modules: Vec<String>,
    pub action: ActivityAction,
    pub since: i64,
    pub filters: Vec<Filter>,
}

#[derive(Clone)]
pub struct MasterSyncService {
    manager: Arc<ActivityModuleManager>,
    cache: MasterSyncCacheRepository,
}

impl MasterSyncService {
    pub fn new(manager: Arc<ActivityModuleManager>, cache: MasterSyncCacheRepository) -> Self {
        Self { manager, cache }
    }

    pub fn manager(&self) -> &ActivityModuleManager {
        &self.manager
    }

    /// `{module: {new, remove}}` plus the pagination with the largest total
    pub async fn activity(
        &self,
        shop_id: &str,
        query: &SyncQuery,
        pageable: &Pageable,
    ) -> ServiceResult<(Map<String, Value>, Pagination)> {
        let modules = self.manager.select(&query.modules);
        let results = try_join_all(modules.iter().map(|module| async move {
            let (value, pagination) = module
                .last_activity(shop_id, query.action, query.since, &query.filters, pageable)
                .await?;
            Ok::<_, crate::error::ServiceError>((module.module_name(), value, pagination))
        }))
        .await?;

        let mut data = Map::new();
        let mut pagination = Pagination::new(0, pageable.page, pageable.limit);
        for (name, value, page) in results {
            if page.total > pagination.total {
                pagination = page;
            }
            data.insert(name.to_string(), value);
        }
        Ok((data, pagination))
    }

    pub async fn activity_step(
        &self,
        shop_id: &str,
        query: &SyncQuery,
        step: &PageableStep,
    ) -> ServiceResult<Map<String, Value>> {
        let modules = self.manager.select(&query.modules);
        let results = try_join_all(modules.iter().map(|module| async move {
            let value = module
                .last_activity_step(shop_id, query.action, query.since, &query.filters, step)
                .await?;
            Ok::<_, crate::error::ServiceError>((module.module_name(), value))
        }))
        .await?;

        Ok(results
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect())
    }

    /// Last write time of every registered module, 0 when never written
    pub async fn status(&self, shop_id: &str) -> ServiceResult<BTreeMap<String, i64>> {
        let names = self.manager.names();
        Ok(self.cache.get_status(shop_id, &names).await?)
    }
}
