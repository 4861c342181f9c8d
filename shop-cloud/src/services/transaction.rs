//! Transaction documents: master behaviour keyed by `docno`, plus numbering

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use shared::models::{BulkImport, Document, NameX, Transaction};
use shared::{AppError, Pageable, PageableStep, Pagination};
use sqlx::SqlitePool;
use validator::Validate;

use super::activity::{ActivityAction, ActivityModule};
use super::doc_no::{DocNoGenerator, doc_prefix, format_doc_no};
use super::master::{MasterModule, MasterService};
use super::notify::ChangeNotifier;
use crate::db::repository::Filter;
use crate::error::ServiceResult;

/// One transaction kind (sale invoice, purchase, ...)
pub trait TransactionModule: Send + Sync + 'static {
    const MODULE_NAME: &'static str;
    const COLLECTION: &'static str;
    const ROUTE: &'static str;
    /// Leading letters of generated doc numbers
    const DOC_PREFIX: &'static str;
    const TRANS_FLAG: i32;
    /// POS documents (`ispos = true`) bring their own doc number
    const ALLOW_CLIENT_DOC_NO: bool = false;
}

/// Adapts a [`TransactionModule`] to the generic master machinery
pub struct TransactionDocs<M>(PhantomData<fn() -> M>);

impl<M: TransactionModule> MasterModule for TransactionDocs<M> {
    type Model = Transaction;

    const MODULE_NAME: &'static str = M::MODULE_NAME;
    const COLLECTION: &'static str = M::COLLECTION;
    const ROUTE: &'static str = M::ROUTE;
    const IDENTITY_FIELD: &'static str = "docno";
    const SEARCH_FIELDS: &'static [&'static str] = &["docno", "custcode", "custnames.name"];

    fn identity(model: &Transaction) -> String {
        model.docno.clone()
    }

    fn prepare(model: &mut Transaction, existing: Option<&Transaction>) -> Result<(), AppError> {
        if let Some(existing) = existing {
            model.docno = existing.docno.clone();
        }
        model.transflag = M::TRANS_FLAG;
        if model.taxdocno.is_empty() {
            model.taxdocno = model.docno.clone();
        }
        Ok(())
    }

    fn names_mut(model: &mut Transaction) -> Option<&mut Vec<NameX>> {
        Some(&mut model.custnames)
    }
}

pub struct TransactionService<M: TransactionModule> {
    inner: MasterService<TransactionDocs<M>>,
    doc_no: Arc<DocNoGenerator>,
}

impl<M: TransactionModule> TransactionService<M> {
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier, doc_no: Arc<DocNoGenerator>) -> Self {
        Self {
            inner: MasterService::new(pool, notifier),
            doc_no,
        }
    }

    async fn ensure_doc_no_free(&self, shop_id: &str, doc_no: &str) -> ServiceResult<()> {
        if self
            .inner
            .crud()
            .find_by_doc_identity_guid(shop_id, "docno", doc_no)
            .await?
            .is_some()
        {
            return Err(AppError::doc_no_exists(doc_no).into());
        }
        Ok(())
    }

    /// Returns `(guidfixed, docno)`
    pub async fn create(
        &self,
        shop_id: &str,
        username: &str,
        mut data: Transaction,
    ) -> ServiceResult<(String, String)> {
        data.validate()?;

        if M::ALLOW_CLIENT_DOC_NO && data.ispos {
            if data.docno.trim().is_empty() {
                return Err(AppError::doc_no_required().into());
            }
            self.ensure_doc_no_free(shop_id, &data.docno).await?;
            let doc = self.inner.insert_new(shop_id, username, data).await?;
            return Ok((doc.guidfixed, doc.data.docno));
        }

        let prefix = doc_prefix(M::DOC_PREFIX, data.docdatetime);
        let _guard = self.doc_no.lock(shop_id, &prefix).await;
        let number = self.doc_no.next(self.inner.crud(), shop_id, &prefix).await?;
        let doc_no = format_doc_no(&prefix, number);
        if let Err(e) = self.ensure_doc_no_free(shop_id, &doc_no).await {
            // stale cached counter; the next attempt re-reads the store
            self.doc_no.forget(shop_id, &prefix).await;
            return Err(e);
        }
        data.docno = doc_no;

        let doc = self.inner.insert_new(shop_id, username, data).await?;
        self.doc_no.commit(shop_id, &prefix, number).await;
        Ok((doc.guidfixed, doc.data.docno))
    }

    /// Doc number and trans flag always keep their stored values
    pub async fn update(
        &self,
        shop_id: &str,
        guid: &str,
        username: &str,
        data: Transaction,
    ) -> ServiceResult<()> {
        self.inner.update(shop_id, guid, username, data).await
    }

    pub async fn delete(&self, shop_id: &str, guid: &str, username: &str) -> ServiceResult<()> {
        self.inner.delete(shop_id, guid, username).await
    }

    pub async fn delete_by_guids(
        &self,
        shop_id: &str,
        username: &str,
        guids: &[String],
    ) -> ServiceResult<u64> {
        self.inner.delete_by_guids(shop_id, username, guids).await
    }

    pub async fn info(&self, shop_id: &str, guid: &str) -> ServiceResult<Document<Transaction>> {
        self.inner.info(shop_id, guid).await
    }

    pub async fn info_by_docno(
        &self,
        shop_id: &str,
        doc_no: &str,
    ) -> ServiceResult<Document<Transaction>> {
        self.inner.info_by_code(shop_id, doc_no).await
    }

    pub async fn search(
        &self,
        shop_id: &str,
        filters: &[Filter],
        pageable: &Pageable,
    ) -> ServiceResult<(Vec<Document<Transaction>>, Pagination)> {
        self.inner.search(shop_id, filters, pageable).await
    }

    pub async fn search_step(
        &self,
        shop_id: &str,
        lang: Option<&str>,
        filters: &[Filter],
        step: &PageableStep,
    ) -> ServiceResult<(Vec<Document<Transaction>>, i64)> {
        self.inner.search_step(shop_id, lang, filters, step).await
    }

    /// Upsert keyed by `docno`; every item must carry one
    pub async fn save_in_batch(
        &self,
        shop_id: &str,
        username: &str,
        items: Vec<Transaction>,
    ) -> ServiceResult<BulkImport> {
        if items.iter().any(|item| item.docno.trim().is_empty()) {
            return Err(AppError::doc_no_required().into());
        }
        self.inner.save_in_batch(shop_id, username, items).await
    }
}

#[async_trait]
impl<M: TransactionModule> ActivityModule for TransactionService<M> {
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
        ActivityModule::last_activity(&self.inner, shop_id, action, since, filters, pageable).await
    }

    async fn last_activity_step(
        &self,
        shop_id: &str,
        action: ActivityAction,
        since: i64,
        filters: &[Filter],
        step: &PageableStep,
    ) -> ServiceResult<Value> {
        ActivityModule::last_activity_step(&self.inner, shop_id, action, since, filters, step)
            .await
    }
}
