//! Type-erased activity feeds for master sync

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use shared::{Pageable, PageableStep, Pagination};

use super::master::{MasterModule, MasterService};
use crate::db::repository::Filter;
use crate::error::ServiceResult;

/// Which side of the activity feed to return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivityAction {
    #[default]
    All,
    New,
    Remove,
}

impl ActivityAction {
    /// Unknown values fall back to `All`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => ActivityAction::New,
            "remove" => ActivityAction::Remove,
            _ => ActivityAction::All,
        }
    }

    pub fn includes_new(self) -> bool {
        self != ActivityAction::Remove
    }

    pub fn includes_remove(self) -> bool {
        self != ActivityAction::New
    }
}

#[async_trait]
pub trait ActivityModule: Send + Sync {
    fn module_name(&self) -> &'static str;

    async fn last_activity(
        &self,
        shop_id: &str,
        action: ActivityAction,
        since: i64,
        filters: &[Filter],
        pageable: &Pageable,
    ) -> ServiceResult<(Value, Pagination)>;

    async fn last_activity_step(
        &self,
        shop_id: &str,
        action: ActivityAction,
        since: i64,
        filters: &[Filter],
        step: &PageableStep,
    ) -> ServiceResult<Value>;
}

#[async_trait]
impl<M: MasterModule> ActivityModule for MasterService<M> {
    fn module_name(&self) -> &'static str {
        M::MODULE_NAME
    }

    async fn last_activity(
        &self,
        shop_id: &str,
        action: ActivityAction,
        since: i64,
        filters: &[Filter],
        pageable: &Pageable,
    ) -> ServiceResult<(Value, Pagination)> {
        let (activity, pagination) =
            MasterService::last_activity(self, shop_id, action, since, filters, pageable).await?;
        Ok((serde_json::to_value(activity).map_err(box_err)?, pagination))
    }

    async fn last_activity_step(
        &self,
        shop_id: &str,
        action: ActivityAction,
        since: i64,
        filters: &[Filter],
        step: &PageableStep,
    ) -> ServiceResult<Value> {
        let activity =
            MasterService::last_activity_step(self, shop_id, action, since, filters, step).await?;
        Ok(serde_json::to_value(activity).map_err(box_err)?)
    }
}

fn box_err(e: serde_json::Error) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(e)
}

/// Activity modules in registration order
#[derive(Default, Clone)]
pub struct ActivityModuleManager {
    modules: Vec<Arc<dyn ActivityModule>>,
}

impl ActivityModuleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, module: Arc<dyn ActivityModule>) -> &mut Self {
        self.modules.push(module);
        self
    }

    pub fn modules(&self) -> &[Arc<dyn ActivityModule>] {
        &self.modules
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.module_name()).collect()
    }

    /// Modules named in `requested` (case-insensitive, registration order).
    /// Empty, or a first entry of "all", selects every module.
    pub fn select(&self, requested: &[String]) -> Vec<Arc<dyn ActivityModule>> {
        let wanted: Vec<String> = requested
            .iter()
            .map(|m| m.trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        if wanted.first().is_none_or(|m| m == "all") {
            return self.modules.clone();
        }
        self.modules
            .iter()
            .filter(|m| wanted.iter().any(|w| w == m.module_name()))
            .cloned()
            .collect()
    }
}
