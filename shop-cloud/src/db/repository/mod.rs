//! Repository Module
//!
//! Generic, collection-parameterised persistence over the `documents` table:
//! - [`CrudRepository`]: writes and point lookups
//! - [`SearchRepository`]: free-text search with paging
//! - [`ActivityRepository`]: created/updated/deleted feeds since a timestamp
//!
//! Every query is scoped by collection and shop.

pub mod activity;
pub mod crud;
pub mod filter;
pub mod search;

pub use activity::ActivityRepository;
pub use crud::CrudRepository;
pub use filter::Filter;
pub use search::SearchRepository;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::{DeleteActivity, Document};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error()
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

pub(crate) const SELECT_DOCUMENT: &str = "SELECT id, collection, shop_id, guid_fixed, doc, \
     created_by, created_at, updated_by, updated_at, deleted_by, deleted_at FROM documents";

/// Raw `documents` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: i64,
    pub collection: String,
    pub shop_id: String,
    pub guid_fixed: String,
    pub doc: String,
    pub created_by: String,
    pub created_at: i64,
    pub updated_by: Option<String>,
    pub updated_at: Option<i64>,
    pub deleted_by: Option<String>,
    pub deleted_at: Option<i64>,
}

impl DocumentRow {
    pub fn into_document<T: DeserializeOwned>(self) -> RepoResult<Document<T>> {
        Ok(Document {
            data: serde_json::from_str(&self.doc)?,
            guidfixed: self.guid_fixed,
            shopid: self.shop_id,
            createdby: self.created_by,
            createdat: self.created_at,
            updatedby: self.updated_by,
            updatedat: self.updated_at,
            deletedby: self.deleted_by,
            deletedat: self.deleted_at,
        })
    }

    pub fn into_delete_activity(self) -> DeleteActivity {
        DeleteActivity {
            guidfixed: self.guid_fixed,
            shopid: self.shop_id,
            deletedat: self.deleted_at.unwrap_or_default(),
            deletedby: self.deleted_by.unwrap_or_default(),
        }
    }
}

pub(crate) fn into_documents<T: DeserializeOwned>(
    rows: Vec<DocumentRow>,
) -> RepoResult<Vec<Document<T>>> {
    rows.into_iter().map(DocumentRow::into_document).collect()
}

/// Lowercase every string value of a JSON document. SQLite's own `lower()`
/// and `LIKE` only fold ASCII, so search runs against this copy instead.
pub fn fold_case(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_lowercase()),
        Value::Array(items) => Value::Array(items.iter().map(fold_case).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), fold_case(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Serialize `data` into the stored `doc` text and its folded search copy
pub fn encode_payload<T: Serialize>(data: &T) -> RepoResult<(String, String)> {
    let value = serde_json::to_value(data)?;
    let folded = serde_json::to_string(&fold_case(&value))?;
    Ok((serde_json::to_string(&value)?, folded))
}

/// Fill `doc_folded` for rows stored before the column existed
pub async fn backfill_folded(pool: &SqlitePool) -> RepoResult<u64> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, doc FROM documents WHERE doc_folded IS NULL")
            .fetch_all(pool)
            .await?;
    if rows.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for (id, doc) in &rows {
        let value: Value = serde_json::from_str(doc)?;
        sqlx::query("UPDATE documents SET doc_folded = ? WHERE id = ?")
            .bind(serde_json::to_string(&fold_case(&value))?)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

/// Which rows a query may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visibility {
    Live,
    Deleted,
    Any,
}

/// Append ` WHERE collection = ? AND shop_id = ?` plus the soft-delete guard
pub(crate) fn push_scope(
    qb: &mut QueryBuilder<'_, Sqlite>,
    collection: &str,
    shop_id: &str,
    visibility: Visibility,
) {
    qb.push(" WHERE collection = ")
        .push_bind(collection.to_string())
        .push(" AND shop_id = ")
        .push_bind(shop_id.to_string());
    match visibility {
        Visibility::Live => {
            qb.push(" AND deleted_at IS NULL");
        }
        Visibility::Deleted => {
            qb.push(" AND deleted_at IS NOT NULL");
        }
        Visibility::Any => {}
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use super::test_support::test_pool;

    #[test]
    fn test_fold_case_keeps_keys() {
        let folded = fold_case(&json!({
            "shopName": "CAFÉ",
            "names": [{"code": "TH", "name": "ÜMLAUT Straße"}],
            "price": 10,
            "active": true
        }));
        assert_eq!(
            folded,
            json!({
                "shopName": "café",
                "names": [{"code": "th", "name": "ümlaut straße"}],
                "price": 10,
                "active": true
            })
        );
    }

    #[tokio::test]
    async fn test_backfill_folded() {
        let pool = test_pool().await;
        sqlx::query(
            "INSERT INTO documents (collection, shop_id, guid_fixed, doc, created_at) \
             VALUES ('item', 's1', 'g1', '{\"code\":\"ÉCLAIR\"}', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();

        assert_eq!(backfill_folded(&pool).await.unwrap(), 1);
        assert_eq!(backfill_folded(&pool).await.unwrap(), 0);

        let folded: String = sqlx::query_scalar("SELECT doc_folded FROM documents WHERE guid_fixed = 'g1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(folded, r#"{"code":"éclair"}"#);
    }
}
