//! Create, update, soft-delete and point lookups for one collection

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::Document;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::filter::{Filter, push_filters};
use super::{
    DocumentRow, RepoError, RepoResult, SELECT_DOCUMENT, Visibility, encode_payload,
    into_documents, push_scope,
};

pub struct CrudRepository<T> {
    pool: SqlitePool,
    collection: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for CrudRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            collection: self.collection,
            _marker: PhantomData,
        }
    }
}

impl<T> CrudRepository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(pool: SqlitePool, collection: &'static str) -> Self {
        Self {
            pool,
            collection,
            _marker: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn count(&self, shop_id: &str, filters: &[Filter]) -> RepoResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM documents");
        push_scope(&mut qb, self.collection, shop_id, Visibility::Live);
        push_filters(&mut qb, filters)?;
        Ok(qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    pub async fn count_by_key(
        &self,
        shop_id: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> RepoResult<i64> {
        self.count(shop_id, &[Filter::eq(key, value)]).await
    }

    pub async fn count_by_in_keys(
        &self,
        shop_id: &str,
        key: &str,
        values: &[String],
    ) -> RepoResult<i64> {
        self.count(shop_id, &[Filter::in_values(key, values.iter().cloned())])
            .await
    }

    /// Insert a new document, returning its GuidFixed
    pub async fn create(&self, doc: &Document<T>) -> RepoResult<String> {
        let (payload, folded) = encode_payload(&doc.data)?;
        sqlx::query(
            "INSERT INTO documents \
             (collection, shop_id, guid_fixed, doc, doc_folded, created_by, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(self.collection)
        .bind(&doc.shopid)
        .bind(&doc.guidfixed)
        .bind(payload)
        .bind(folded)
        .bind(&doc.createdby)
        .bind(doc.createdat)
        .execute(&self.pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => RepoError::Duplicate(doc.guidfixed.clone()),
            other => other,
        })?;
        Ok(doc.guidfixed.clone())
    }

    /// Insert many documents atomically
    pub async fn create_in_batch(&self, docs: &[Document<T>]) -> RepoResult<()> {
        if docs.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for doc in docs {
            let (payload, folded) = encode_payload(&doc.data)?;
            sqlx::query(
                "INSERT INTO documents \
                 (collection, shop_id, guid_fixed, doc, doc_folded, created_by, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(self.collection)
            .bind(&doc.shopid)
            .bind(&doc.guidfixed)
            .bind(payload)
            .bind(folded)
            .bind(&doc.createdby)
            .bind(doc.createdat)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Replace the payload of a live document and stamp the update
    pub async fn update(
        &self,
        shop_id: &str,
        guid: &str,
        data: &T,
        username: &str,
        updated_at: i64,
    ) -> RepoResult<()> {
        let (payload, folded) = encode_payload(data)?;
        let result = sqlx::query(
            "UPDATE documents SET doc = ?, doc_folded = ?, updated_by = ?, updated_at = ? \
             WHERE collection = ? AND shop_id = ? AND guid_fixed = ? AND deleted_at IS NULL",
        )
        .bind(payload)
        .bind(folded)
        .bind(username)
        .bind(updated_at)
        .bind(self.collection)
        .bind(shop_id)
        .bind(guid)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(guid.to_string()));
        }
        Ok(())
    }

    fn soft_delete_query(
        &self,
        shop_id: &str,
        username: &str,
        deleted_at: i64,
        filters: &[Filter],
    ) -> RepoResult<QueryBuilder<'static, Sqlite>> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE documents SET deleted_by = ");
        qb.push_bind(username.to_string())
            .push(", deleted_at = ")
            .push_bind(deleted_at);
        push_scope(&mut qb, self.collection, shop_id, Visibility::Live);
        push_filters(&mut qb, filters)?;
        Ok(qb)
    }

    /// Soft delete every live document matching `filters`
    pub async fn delete(
        &self,
        shop_id: &str,
        username: &str,
        deleted_at: i64,
        filters: &[Filter],
    ) -> RepoResult<u64> {
        let mut qb = self.soft_delete_query(shop_id, username, deleted_at, filters)?;
        Ok(qb.build().execute(&self.pool).await?.rows_affected())
    }

    /// Same as [`delete`](Self::delete), returning the GuidFixed of each row it hit
    pub async fn delete_returning_guids(
        &self,
        shop_id: &str,
        username: &str,
        deleted_at: i64,
        filters: &[Filter],
    ) -> RepoResult<Vec<String>> {
        let mut qb = self.soft_delete_query(shop_id, username, deleted_at, filters)?;
        qb.push(" RETURNING guid_fixed");
        Ok(qb.build_query_scalar::<String>().fetch_all(&self.pool).await?)
    }

    pub async fn delete_by_guidfixed(
        &self,
        shop_id: &str,
        guid: &str,
        username: &str,
        deleted_at: i64,
    ) -> RepoResult<()> {
        let affected = self
            .delete(shop_id, username, deleted_at, &[Filter::eq("guidfixed", guid)])
            .await?;
        if affected == 0 {
            return Err(RepoError::NotFound(guid.to_string()));
        }
        Ok(())
    }

    pub async fn find_filter(
        &self,
        shop_id: &str,
        filters: &[Filter],
    ) -> RepoResult<Vec<Document<T>>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_DOCUMENT);
        push_scope(&mut qb, self.collection, shop_id, Visibility::Live);
        push_filters(&mut qb, filters)?;
        qb.push(" ORDER BY created_at ASC, id ASC");
        let rows = qb.build_query_as::<DocumentRow>().fetch_all(&self.pool).await?;
        into_documents(rows)
    }

    pub async fn find_one(
        &self,
        shop_id: &str,
        filters: &[Filter],
    ) -> RepoResult<Option<Document<T>>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_DOCUMENT);
        push_scope(&mut qb, self.collection, shop_id, Visibility::Live);
        push_filters(&mut qb, filters)?;
        qb.push(" ORDER BY id ASC LIMIT 1");
        let row = qb
            .build_query_as::<DocumentRow>()
            .fetch_optional(&self.pool)
            .await?;
        row.map(DocumentRow::into_document).transpose()
    }

    pub async fn find_by_guid(&self, shop_id: &str, guid: &str) -> RepoResult<Option<Document<T>>> {
        self.find_one(shop_id, &[Filter::eq("guidfixed", guid)]).await
    }

    pub async fn find_by_guids(
        &self,
        shop_id: &str,
        guids: &[String],
    ) -> RepoResult<Vec<Document<T>>> {
        self.find_filter(shop_id, &[Filter::in_values("guidfixed", guids.iter().cloned())])
            .await
    }

    /// Live document whose business identity field `key` equals `value`
    pub async fn find_by_doc_identity_guid(
        &self,
        shop_id: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> RepoResult<Option<Document<T>>> {
        self.find_one(shop_id, &[Filter::eq(key, value)]).await
    }

    pub async fn find_by_doc_identity_guids(
        &self,
        shop_id: &str,
        key: &str,
        values: &[String],
    ) -> RepoResult<Vec<Document<T>>> {
        self.find_filter(shop_id, &[Filter::in_values(key, values.iter().cloned())])
            .await
    }

    /// Greatest `docno` starting with `prefix`, soft-deleted rows included.
    /// Longer numbers sort first so `...100000` beats `...99999`.
    pub async fn find_last_doc_no(&self, shop_id: &str, prefix: &str) -> RepoResult<Option<String>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT json_extract(doc, '$.docno') AS docno FROM documents",
        );
        push_scope(&mut qb, self.collection, shop_id, Visibility::Any);
        push_filters(&mut qb, &[Filter::Prefix("docno".into(), prefix.to_string())])?;
        qb.push(" ORDER BY length(docno) DESC, docno DESC LIMIT 1");
        Ok(qb
            .build_query_scalar::<Option<String>>()
            .fetch_optional(&self.pool)
            .await?
            .flatten())
    }
}
