//! Generic master-data service
//!
//! Each business entity plugs in as a [`MasterModule`]: a model type plus a
//! handful of constants and hooks. [`MasterService`] supplies the shared
//! create/update/delete/search/bulk/activity behaviour on top of the generic
//! repositories.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{BulkImport, DeleteActivity, Document, LastActivity, NameX, retain_lang};
use shared::util::now_millis;
use shared::{AppError, FilterRequest, Pageable, PageableStep, Pagination};
use sqlx::SqlitePool;
use validator::Validate;

use super::activity::ActivityAction;
use super::notify::ChangeNotifier;
use super::new_document;
use crate::db::repository::{ActivityRepository, CrudRepository, Filter, SearchRepository};
use crate::error::{ServiceError, ServiceResult};
use crate::mq::MqAction;

/// One master-data entity
pub trait MasterModule: Send + Sync + 'static {
    type Model: Serialize + DeserializeOwned + Validate + Clone + Send + Sync + 'static;

    /// Module name used for master sync, topics and the activity feed
    const MODULE_NAME: &'static str;
    const COLLECTION: &'static str;
    /// Base path of the HTTP routes
    const ROUTE: &'static str;
    /// Business key, unique per shop among live documents
    const IDENTITY_FIELD: &'static str = "code";
    const SEARCH_FIELDS: &'static [&'static str];
    /// Query-string filters accepted by the search routes
    const FILTERS: &'static [FilterRequest] = &[];

    fn identity(model: &Self::Model) -> String;

    /// Runs before every write; `existing` is the stored payload on update
    fn prepare(_model: &mut Self::Model, _existing: Option<&Self::Model>) -> Result<(), AppError> {
        Ok(())
    }

    /// Strips anything that must not leave the service
    fn sanitize(_model: &mut Self::Model) {}

    fn names_mut(_model: &mut Self::Model) -> Option<&mut Vec<NameX>> {
        None
    }
}

pub struct MasterService<M: MasterModule> {
    crud: CrudRepository<M::Model>,
    search: SearchRepository<M::Model>,
    activity: ActivityRepository<M::Model>,
    notifier: ChangeNotifier,
}

impl<M: MasterModule> MasterService<M> {
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        Self {
            crud: CrudRepository::new(pool.clone(), M::COLLECTION),
            search: SearchRepository::new(pool.clone(), M::COLLECTION),
            activity: ActivityRepository::new(pool, M::COLLECTION),
            notifier,
        }
    }

    /// Unsanitized access for internal callers such as login
    pub fn crud(&self) -> &CrudRepository<M::Model> {
        &self.crud
    }

    fn clean(mut doc: Document<M::Model>) -> Document<M::Model> {
        M::sanitize(&mut doc.data);
        doc
    }

    pub async fn create(
        &self,
        shop_id: &str,
        username: &str,
        data: M::Model,
    ) -> ServiceResult<String> {
        data.validate()?;
        let identity = M::identity(&data);
        if self
            .crud
            .find_by_doc_identity_guid(shop_id, M::IDENTITY_FIELD, identity.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::code_exists(identity).into());
        }
        let doc = self.insert_new(shop_id, username, data).await?;
        Ok(doc.guidfixed)
    }

    /// Insert without the identity check; callers have already vetted `data`
    pub(crate) async fn insert_new(
        &self,
        shop_id: &str,
        username: &str,
        mut data: M::Model,
    ) -> ServiceResult<Document<M::Model>> {
        M::prepare(&mut data, None)?;
        let doc = new_document(shop_id, username, data);
        self.crud.create(&doc).await?;

        self.notifier.touch(shop_id, M::MODULE_NAME).await;
        let doc = Self::clean(doc);
        self.notifier
            .publish(M::MODULE_NAME, MqAction::Created, shop_id, &doc);
        Ok(doc)
    }

    pub async fn update(
        &self,
        shop_id: &str,
        guid: &str,
        username: &str,
        mut data: M::Model,
    ) -> ServiceResult<()> {
        data.validate()?;
        let existing = self
            .crud
            .find_by_guid(shop_id, guid)
            .await?
            .ok_or_else(AppError::document_not_found)?;
        M::prepare(&mut data, Some(&existing.data))?;

        let identity = M::identity(&data);
        if identity != M::identity(&existing.data)
            && let Some(other) = self
                .crud
                .find_by_doc_identity_guid(shop_id, M::IDENTITY_FIELD, identity.as_str())
                .await?
            && other.guidfixed != guid
        {
            return Err(AppError::code_exists(identity).into());
        }

        let now = now_millis();
        self.crud
            .update(shop_id, guid, &data, username, now)
            .await?;

        self.notifier.touch(shop_id, M::MODULE_NAME).await;
        let doc = Self::clean(Document {
            data,
            updatedby: Some(username.to_string()),
            updatedat: Some(now),
            ..existing
        });
        self.notifier
            .publish(M::MODULE_NAME, MqAction::Updated, shop_id, &doc);
        Ok(())
    }

    pub async fn delete(&self, shop_id: &str, guid: &str, username: &str) -> ServiceResult<()> {
        let existing = self
            .crud
            .find_by_guid(shop_id, guid)
            .await?
            .ok_or_else(AppError::document_not_found)?;
        let now = now_millis();
        self.crud
            .delete_by_guidfixed(shop_id, guid, username, now)
            .await?;

        self.notifier.touch(shop_id, M::MODULE_NAME).await;
        let removed = DeleteActivity {
            guidfixed: existing.guidfixed,
            shopid: existing.shopid,
            deletedat: now,
            deletedby: username.to_string(),
        };
        self.notifier
            .publish(M::MODULE_NAME, MqAction::Deleted, shop_id, &removed);
        Ok(())
    }

    /// Soft delete every listed document; unknown guids are ignored
    pub async fn delete_by_guids(
        &self,
        shop_id: &str,
        username: &str,
        guids: &[String],
    ) -> ServiceResult<u64> {
        if guids.is_empty() {
            return Ok(0);
        }
        let now = now_millis();
        let deleted = self
            .crud
            .delete_returning_guids(
                shop_id,
                username,
                now,
                &[Filter::in_values("guidfixed", guids.iter().cloned())],
            )
            .await?;

        if !deleted.is_empty() {
            self.notifier.touch(shop_id, M::MODULE_NAME).await;
            let removed: Vec<DeleteActivity> = deleted
                .iter()
                .map(|guid| DeleteActivity {
                    guidfixed: guid.clone(),
                    shopid: shop_id.to_string(),
                    deletedat: now,
                    deletedby: username.to_string(),
                })
                .collect();
            self.notifier
                .publish(M::MODULE_NAME, MqAction::BulkDeleted, shop_id, &removed);
        }
        Ok(deleted.len() as u64)
    }

    pub async fn info(&self, shop_id: &str, guid: &str) -> ServiceResult<Document<M::Model>> {
        let doc = self
            .crud
            .find_by_guid(shop_id, guid)
            .await?
            .ok_or_else(AppError::document_not_found)?;
        Ok(Self::clean(doc))
    }

    /// Lookup by the module's identity field
    pub async fn info_by_code(
        &self,
        shop_id: &str,
        code: &str,
    ) -> ServiceResult<Document<M::Model>> {
        let doc = self
            .crud
            .find_by_doc_identity_guid(shop_id, M::IDENTITY_FIELD, code)
            .await?
            .ok_or_else(AppError::document_not_found)?;
        Ok(Self::clean(doc))
    }

    pub async fn search(
        &self,
        shop_id: &str,
        filters: &[Filter],
        pageable: &Pageable,
    ) -> ServiceResult<(Vec<Document<M::Model>>, Pagination)> {
        let (docs, pagination) = self
            .search
            .find_page_filter(shop_id, filters, M::SEARCH_FIELDS, pageable)
            .await?;
        Ok((docs.into_iter().map(Self::clean).collect(), pagination))
    }

    /// Offset listing; with `lang`, multi-language names keep only that language
    pub async fn search_step(
        &self,
        shop_id: &str,
        lang: Option<&str>,
        filters: &[Filter],
        step: &PageableStep,
    ) -> ServiceResult<(Vec<Document<M::Model>>, i64)> {
        let (docs, total) = self
            .search
            .find_step(shop_id, filters, M::SEARCH_FIELDS, step)
            .await?;
        let lang = lang.filter(|l| !l.is_empty());
        let docs = docs
            .into_iter()
            .map(|mut doc| {
                if let Some(lang) = lang
                    && let Some(names) = M::names_mut(&mut doc.data)
                {
                    retain_lang(names, lang);
                }
                Self::clean(doc)
            })
            .collect();
        Ok((docs, total))
    }

    /// Upsert by identity: new identities are created in one batch, known
    /// ones are updated one by one.
    pub async fn save_in_batch(
        &self,
        shop_id: &str,
        username: &str,
        items: Vec<M::Model>,
    ) -> ServiceResult<BulkImport> {
        for item in &items {
            item.validate()?;
        }

        let mut result = BulkImport::default();
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(items.len());
        for item in items {
            let identity = M::identity(&item);
            if seen.insert(identity.clone()) {
                unique.push((identity, item));
            } else {
                result.payload_duplicate.push(identity);
            }
        }

        let identities: Vec<String> = unique.iter().map(|(id, _)| id.clone()).collect();
        let mut existing: HashMap<String, Document<M::Model>> = self
            .crud
            .find_by_doc_identity_guids(shop_id, M::IDENTITY_FIELD, &identities)
            .await?
            .into_iter()
            .map(|doc| (M::identity(&doc.data), doc))
            .collect();

        let mut created_docs = Vec::new();
        let mut to_update = Vec::new();
        for (identity, mut item) in unique {
            match existing.remove(&identity) {
                Some(current) => to_update.push((identity, current, item)),
                None => {
                    M::prepare(&mut item, None)?;
                    created_docs.push(new_document(shop_id, username, item));
                    result.created.push(identity);
                }
            }
        }
        self.crud.create_in_batch(&created_docs).await?;

        let now = now_millis();
        let mut updated_docs = Vec::with_capacity(to_update.len());
        for (identity, current, mut item) in to_update {
            let outcome = match M::prepare(&mut item, Some(&current.data)) {
                Ok(()) => self
                    .crud
                    .update(shop_id, &current.guidfixed, &item, username, now)
                    .await
                    .map_err(ServiceError::from),
                Err(e) => Err(e.into()),
            };
            match outcome {
                Ok(()) => {
                    result.updated.push(identity);
                    updated_docs.push(Self::clean(Document {
                        data: item,
                        updatedby: Some(username.to_string()),
                        updatedat: Some(now),
                        ..current
                    }));
                }
                Err(e) => {
                    tracing::warn!(module = M::MODULE_NAME, identity = %identity, error = %e, "Bulk update failed");
                    result.update_failed.push(identity);
                }
            }
        }

        if !created_docs.is_empty() || !updated_docs.is_empty() {
            self.notifier.touch(shop_id, M::MODULE_NAME).await;
        }
        if !created_docs.is_empty() {
            let created: Vec<_> = created_docs.into_iter().map(Self::clean).collect();
            self.notifier
                .publish(M::MODULE_NAME, MqAction::BulkCreated, shop_id, &created);
        }
        if !updated_docs.is_empty() {
            self.notifier
                .publish(M::MODULE_NAME, MqAction::BulkUpdated, shop_id, &updated_docs);
        }
        Ok(result)
    }

    /// Created/updated and deleted feeds since `since`; the pagination is
    /// the one with the larger total.
    pub async fn last_activity(
        &self,
        shop_id: &str,
        action: ActivityAction,
        since: i64,
        filters: &[Filter],
        pageable: &Pageable,
    ) -> ServiceResult<(LastActivity<Document<M::Model>, DeleteActivity>, Pagination)> {
        let new_feed = async {
            if action.includes_new() {
                self.activity
                    .find_created_or_updated_page(shop_id, since, filters, pageable)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        };
        let removed_feed = async {
            if action.includes_remove() {
                self.activity
                    .find_deleted_page(shop_id, since, filters, pageable)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        };
        let (new, removed) = tokio::try_join!(new_feed, removed_feed)?;

        let mut activity = LastActivity::default();
        let mut pagination = Pagination::new(0, pageable.page, pageable.limit);
        if let Some((docs, page)) = new {
            activity.new = Some(docs.into_iter().map(Self::clean).collect());
            pagination = page;
        }
        if let Some((docs, page)) = removed {
            if page.total > pagination.total {
                pagination = page;
            }
            activity.remove = Some(docs);
        }
        Ok((activity, pagination))
    }

    pub async fn last_activity_step(
        &self,
        shop_id: &str,
        action: ActivityAction,
        since: i64,
        filters: &[Filter],
        step: &PageableStep,
    ) -> ServiceResult<LastActivity<Document<M::Model>, DeleteActivity>> {
        let new_feed = async {
            if action.includes_new() {
                self.activity
                    .find_created_or_updated_step(shop_id, since, filters, step)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        };
        let removed_feed = async {
            if action.includes_remove() {
                self.activity
                    .find_deleted_step(shop_id, since, filters, step)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        };
        let (new, removed) = tokio::try_join!(new_feed, removed_feed)?;

        Ok(LastActivity {
            new: new.map(|(docs, _)| docs.into_iter().map(Self::clean).collect()),
            remove: removed.map(|(docs, _)| docs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::modules::employee::EmployeeModule;
    use crate::modules::payment::BankMasterModule;
    use crate::services::test_support::notifier;
    use shared::ErrorCode;
    use shared::models::{BankMaster, Employee, NameX};

    async fn service() -> MasterService<BankMasterModule> {
        let db = DbService::in_memory().await.unwrap();
        let (notifier, _) = notifier();
        MasterService::new(db.pool, notifier)
    }

    fn bank(code: &str) -> BankMaster {
        BankMaster {
            code: code.into(),
            names: vec![NameX::new("th", "กสิกร"), NameX::new("en", "Kasikorn")],
            logo: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_and_info() {
        let svc = service().await;
        let guid = svc.create("s1", "admin", bank("KBANK")).await.unwrap();
        assert_eq!(guid.len(), 32);

        let doc = svc.info("s1", &guid).await.unwrap();
        assert_eq!(doc.data.code, "KBANK");
        assert_eq!(doc.createdby, "admin");

        let by_code = svc.info_by_code("s1", "KBANK").await.unwrap();
        assert_eq!(by_code.guidfixed, guid);

        // other shops never see it
        let err = svc.info("s2", &guid).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DocumentNotFound);
    }

    #[tokio::test]
    async fn test_create_duplicate_code() {
        let svc = service().await;
        svc.create("s1", "admin", bank("KBANK")).await.unwrap();
        let err = svc.create("s1", "admin", bank("KBANK")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CodeExists);

        // same code in another shop is fine
        svc.create("s2", "admin", bank("KBANK")).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_validation() {
        let svc = service().await;
        let err = svc.create("s1", "admin", bank("")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let svc = service().await;
        let guid = svc.create("s1", "admin", bank("KBANK")).await.unwrap();
        let other = svc.create("s1", "admin", bank("SCB")).await.unwrap();

        let mut changed = bank("KBANK");
        changed.logo = "k.png".into();
        svc.update("s1", &guid, "editor", changed).await.unwrap();
        let doc = svc.info("s1", &guid).await.unwrap();
        assert_eq!(doc.data.logo, "k.png");
        assert_eq!(doc.updatedby.as_deref(), Some("editor"));

        // renaming onto another live code is rejected
        let err = svc
            .update("s1", &guid, "editor", bank("SCB"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CodeExists);

        svc.delete("s1", &other, "editor").await.unwrap();
        let err = svc.delete("s1", &other, "editor").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DocumentNotFound);
        let err = svc
            .update("s1", "missing", "editor", bank("X"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DocumentNotFound);
    }

    #[tokio::test]
    async fn test_delete_by_guids() {
        let svc = service().await;
        let a = svc.create("s1", "admin", bank("A")).await.unwrap();
        let b = svc.create("s1", "admin", bank("B")).await.unwrap();
        svc.create("s1", "admin", bank("C")).await.unwrap();

        let n = svc
            .delete_by_guids("s1", "admin", &[a, b, "nope".into()])
            .await
            .unwrap();
        assert_eq!(n, 2);

        let (docs, pagination) = svc
            .search("s1", &[], &Pageable::new(None, None, None, None))
            .await
            .unwrap();
        assert_eq!(pagination.total, 1);
        assert_eq!(docs[0].data.code, "C");
    }

    #[tokio::test]
    async fn test_delete_by_guids_publishes_only_deleted() {
        let db = DbService::in_memory().await.unwrap();
        let (notifier, queue) = notifier();
        let svc: MasterService<BankMasterModule> = MasterService::new(db.pool, notifier);
        let a = svc.create("s1", "admin", bank("A")).await.unwrap();
        let b = svc.create("s1", "admin", bank("B")).await.unwrap();
        svc.delete("s1", &b, "admin").await.unwrap();

        let mut rx = queue.subscribe();
        let n = svc
            .delete_by_guids("s1", "admin", &[a.clone(), b, "nope".into()])
            .await
            .unwrap();
        assert_eq!(n, 1);

        // earlier create/delete events may still be in flight
        let msg = loop {
            let msg = rx.recv().await.unwrap();
            if msg.topic == "bankmaster.bulk-deleted" {
                break msg;
            }
        };
        let payload = msg.payload.as_array().unwrap();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0]["guidfixed"], a.as_str());
    }

    #[tokio::test]
    async fn test_search_step_reduces_names() {
        let svc = service().await;
        svc.create("s1", "admin", bank("KBANK")).await.unwrap();

        let step = PageableStep::new(None, None, None, None);
        let (docs, total) = svc
            .search_step("s1", Some("en"), &[], &step)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(docs[0].data.names, vec![NameX::new("en", "Kasikorn")]);

        let (docs, _) = svc.search_step("s1", None, &[], &step).await.unwrap();
        assert_eq!(docs[0].data.names.len(), 2);
    }

    #[tokio::test]
    async fn test_save_in_batch() {
        let svc = service().await;
        svc.create("s1", "admin", bank("A")).await.unwrap();

        let mut a = bank("A");
        a.logo = "new.png".into();
        let result = svc
            .save_in_batch("s1", "admin", vec![a, bank("B"), bank("B"), bank("C")])
            .await
            .unwrap();
        assert_eq!(result.created, vec!["B".to_string(), "C".to_string()]);
        assert_eq!(result.updated, vec!["A".to_string()]);
        assert_eq!(result.payload_duplicate, vec!["B".to_string()]);
        assert!(result.update_failed.is_empty());

        let a = svc.info_by_code("s1", "A").await.unwrap();
        assert_eq!(a.data.logo, "new.png");
    }

    #[tokio::test]
    async fn test_last_activity() {
        let svc = service().await;
        let since = now_millis() - 1;
        let a = svc.create("s1", "admin", bank("A")).await.unwrap();
        svc.create("s1", "admin", bank("B")).await.unwrap();
        svc.delete("s1", &a, "admin").await.unwrap();

        let pageable = Pageable::new(None, None, None, None);
        let (activity, pagination) = svc
            .last_activity("s1", ActivityAction::All, since, &[], &pageable)
            .await
            .unwrap();
        assert_eq!(activity.new.as_ref().map(Vec::len), Some(1));
        assert_eq!(activity.remove.as_ref().map(Vec::len), Some(1));
        assert_eq!(pagination.total, 1);

        let (activity, _) = svc
            .last_activity("s1", ActivityAction::Remove, since, &[], &pageable)
            .await
            .unwrap();
        assert!(activity.new.is_none());

        let step = PageableStep::new(None, None, None, None);
        let activity = svc
            .last_activity_step("s1", ActivityAction::New, since, &[], &step)
            .await
            .unwrap();
        assert!(activity.remove.is_none());
        assert_eq!(activity.new.map(|v| v.len()), Some(1));
    }

    #[tokio::test]
    async fn test_publishes_created() {
        let db = DbService::in_memory().await.unwrap();
        let (notifier, queue) = notifier();
        let mut rx = queue.subscribe();
        let svc: MasterService<BankMasterModule> = MasterService::new(db.pool, notifier.clone());

        svc.create("s1", "admin", bank("KBANK")).await.unwrap();
        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.topic, "bankmaster.created");
        assert_eq!(msg.key, "s1");
        assert_eq!(msg.payload["code"], "KBANK");

        let status = notifier
            .master_sync()
            .get_status("s1", &["bankmaster"])
            .await
            .unwrap();
        assert!(status["bankmaster"] > 0);
    }

    #[tokio::test]
    async fn test_employee_password_never_returned() {
        let db = DbService::in_memory().await.unwrap();
        let (notifier, _) = notifier();
        let svc: MasterService<EmployeeModule> = MasterService::new(db.pool, notifier);

        let guid = svc
            .create(
                "s1",
                "admin",
                Employee {
                    code: "E01".into(),
                    name: "Somchai".into(),
                    password: Some("secret123".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let doc = svc.info("s1", &guid).await.unwrap();
        assert!(doc.data.password.is_none());

        let stored = svc.crud().find_by_guid("s1", &guid).await.unwrap().unwrap();
        let hash = stored.data.password.unwrap();
        assert!(hash.starts_with("$argon2"));

        // update without a password keeps the stored hash
        svc.update(
            "s1",
            &guid,
            "admin",
            Employee {
                code: "E01".into(),
                name: "Somchai J.".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let stored = svc.crud().find_by_guid("s1", &guid).await.unwrap().unwrap();
        assert_eq!(stored.data.password.as_deref(), Some(hash.as_str()));
    }
}
