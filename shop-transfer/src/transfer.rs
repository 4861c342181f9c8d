//! Copy one shop's documents from a source database to a target database

use anyhow::{Context, Result, bail};
use serde_json::Value;
use shop_cloud::db::repository::fold_case;
use shop_cloud::modules::transaction::TRANSACTION_COLLECTIONS;
use shop_cloud::modules::{MASTER_COLLECTIONS, SHOP_COLLECTION};
use sqlx::{FromRow, SqlitePool};

use crate::config::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub shop_id: String,
    /// Rewrite `shop_id` to this shop; it must already exist in the target
    pub target_shop_id: Option<String>,
    pub page_size: i64,
}

impl TransferOptions {
    pub fn new(shop_id: impl Into<String>) -> Self {
        Self {
            shop_id: shop_id.into(),
            target_shop_id: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    fn destination_shop(&self) -> &str {
        self.target_shop_id.as_deref().unwrap_or(&self.shop_id)
    }
}

/// Rows read and inserted for one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    pub collection: String,
    pub read: u64,
    pub inserted: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TransferReport {
    pub shop_id: String,
    pub target_shop_id: String,
    pub collections: Vec<CollectionReport>,
}

impl TransferReport {
    pub fn total_inserted(&self) -> u64 {
        self.collections.iter().map(|c| c.inserted).sum()
    }

    pub fn get(&self, collection: &str) -> Option<&CollectionReport> {
        self.collections.iter().find(|c| c.collection == collection)
    }
}

#[derive(Debug, FromRow)]
struct RawRow {
    id: i64,
    guid_fixed: String,
    doc: String,
    created_by: String,
    created_at: i64,
    updated_by: Option<String>,
    updated_at: Option<i64>,
    deleted_by: Option<String>,
    deleted_at: Option<i64>,
}

pub struct ShopTransfer {
    source: SqlitePool,
    target: SqlitePool,
}

impl ShopTransfer {
    pub fn new(source: SqlitePool, target: SqlitePool) -> Self {
        Self { source, target }
    }

    pub async fn run(&self, options: &TransferOptions) -> Result<TransferReport> {
        if options.shop_id.trim().is_empty() {
            bail!("shop id is required");
        }
        let page_size = if options.page_size > 0 {
            options.page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        let destination = options.destination_shop();

        let mut report = TransferReport {
            shop_id: options.shop_id.clone(),
            target_shop_id: destination.to_string(),
            collections: Vec::new(),
        };

        match options.target_shop_id.as_deref() {
            None => {
                if !shop_exists(&self.source, &options.shop_id).await? {
                    bail!("Shop not found");
                }
                let shop = self
                    .copy_collection(SHOP_COLLECTION, &options.shop_id, destination, page_size)
                    .await?;
                report.collections.push(shop);
            }
            Some(target) => {
                if !shop_exists(&self.target, target).await? {
                    bail!("Shop not found");
                }
            }
        }

        for &collection in MASTER_COLLECTIONS.iter().chain(TRANSACTION_COLLECTIONS) {
            let copied = self
                .copy_collection(collection, &options.shop_id, destination, page_size)
                .await?;
            report.collections.push(copied);
        }

        tracing::info!(
            shop_id = %options.shop_id,
            target_shop_id = %destination,
            inserted = report.total_inserted(),
            "Shop transfer finished"
        );
        Ok(report)
    }

    async fn copy_collection(
        &self,
        collection: &str,
        shop_id: &str,
        destination: &str,
        page_size: i64,
    ) -> Result<CollectionReport> {
        let mut report = CollectionReport {
            collection: collection.to_string(),
            read: 0,
            inserted: 0,
        };
        let mut last_id = 0_i64;

        loop {
            let rows: Vec<RawRow> = sqlx::query_as(
                "SELECT id, guid_fixed, doc, created_by, created_at, updated_by, updated_at, \
                 deleted_by, deleted_at FROM documents \
                 WHERE collection = ? AND shop_id = ? AND id > ? ORDER BY id LIMIT ?",
            )
            .bind(collection)
            .bind(shop_id)
            .bind(last_id)
            .bind(page_size)
            .fetch_all(&self.source)
            .await
            .with_context(|| format!("read {collection} page after id {last_id}"))?;

            let fetched = rows.len() as i64;
            if let Some(last) = rows.last() {
                last_id = last.id;
            }

            if !rows.is_empty() {
                let mut tx = self.target.begin().await?;
                for row in &rows {
                    let value: Value = serde_json::from_str(&row.doc)
                        .with_context(|| format!("parse {collection} {}", row.guid_fixed))?;
                    let result = sqlx::query(
                        "INSERT OR IGNORE INTO documents \
                         (collection, shop_id, guid_fixed, doc, doc_folded, created_by, created_at, \
                          updated_by, updated_at, deleted_by, deleted_at) \
                         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    )
                    .bind(collection)
                    .bind(destination)
                    .bind(&row.guid_fixed)
                    .bind(&row.doc)
                    .bind(serde_json::to_string(&fold_case(&value))?)
                    .bind(&row.created_by)
                    .bind(row.created_at)
                    .bind(&row.updated_by)
                    .bind(row.updated_at)
                    .bind(&row.deleted_by)
                    .bind(row.deleted_at)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("insert {collection} {}", row.guid_fixed))?;
                    report.inserted += result.rows_affected();
                }
                tx.commit().await?;
                report.read += rows.len() as u64;
            }

            if fetched < page_size {
                break;
            }
        }

        tracing::info!(
            collection,
            read = report.read,
            inserted = report.inserted,
            "Collection transferred"
        );
        Ok(report)
    }
}

pub(crate) async fn shop_exists(pool: &SqlitePool, shop_id: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM documents WHERE collection = ? AND guid_fixed = ? AND deleted_at IS NULL",
    )
    .bind(SHOP_COLLECTION)
    .bind(shop_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::{Value, json};
    use shared::models::Document;
    use shop_cloud::db::DbService;
    use shop_cloud::db::repository::CrudRepository;
    use sqlx::SqlitePool;

    pub async fn pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    pub async fn seed(
        pool: &SqlitePool,
        collection: &'static str,
        shop_id: &str,
        guid: &str,
        data: Value,
    ) {
        let repo = CrudRepository::<Value>::new(pool.clone(), collection);
        repo.create(&Document {
            guidfixed: guid.to_string(),
            shopid: shop_id.to_string(),
            data,
            createdby: "owner".to_string(),
            createdat: chrono::Utc::now().timestamp_millis(),
            updatedby: None,
            updatedat: None,
            deletedby: None,
            deletedat: None,
        })
        .await
        .unwrap();
    }

    pub async fn seed_shop(pool: &SqlitePool, shop_id: &str, name: &str) {
        seed(pool, super::SHOP_COLLECTION, shop_id, shop_id, json!({ "name1": name })).await;
    }

    pub async fn count(pool: &SqlitePool, collection: &str, shop_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ? AND shop_id = ?")
            .bind(collection)
            .bind(shop_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_copies_shop_and_collections_in_pages() {
        let source = pool().await;
        let target = pool().await;
        seed_shop(&source, "s1", "Coffee").await;
        for i in 0..5 {
            seed(&source, "bankmaster", "s1", &format!("b{i}"), json!({"code": format!("B{i}")}))
                .await;
        }
        seed(&source, "bankmaster", "s2", "other", json!({"code": "X"})).await;
        seed(&source, "saleinvoice", "s1", "inv1", json!({"docno": "SI1"})).await;

        let options = TransferOptions {
            page_size: 2,
            ..TransferOptions::new("s1")
        };
        let report = ShopTransfer::new(source, target.clone())
            .run(&options)
            .await
            .unwrap();

        assert_eq!(report.collections[0].collection, SHOP_COLLECTION);
        assert_eq!(report.get("bankmaster").unwrap().inserted, 5);
        assert_eq!(count(&target, SHOP_COLLECTION, "s1").await, 1);
        assert_eq!(count(&target, "bankmaster", "s1").await, 5);
        assert_eq!(count(&target, "bankmaster", "s2").await, 0);
        assert_eq!(count(&target, "saleinvoice", "s1").await, 1);

        let folded: String = sqlx::query_scalar(
            "SELECT doc_folded FROM documents WHERE collection = ? AND guid_fixed = ?",
        )
        .bind(SHOP_COLLECTION)
        .bind("s1")
        .fetch_one(&target)
        .await
        .unwrap();
        assert_eq!(folded, r#"{"name1":"coffee"}"#);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let source = pool().await;
        let target = pool().await;
        seed_shop(&source, "s1", "Coffee").await;
        seed(&source, "restaurant-zone", "s1", "z1", json!({"code": "Z1"})).await;

        let transfer = ShopTransfer::new(source, target.clone());
        transfer.run(&TransferOptions::new("s1")).await.unwrap();
        let again = transfer.run(&TransferOptions::new("s1")).await.unwrap();

        assert_eq!(again.total_inserted(), 0);
        assert_eq!(again.get("restaurant-zone").unwrap().read, 1);
        assert_eq!(count(&target, "restaurant-zone", "s1").await, 1);
    }

    #[tokio::test]
    async fn test_missing_source_shop() {
        let transfer = ShopTransfer::new(pool().await, pool().await);
        let err = transfer.run(&TransferOptions::new("nope")).await.unwrap_err();
        assert_eq!(err.to_string(), "Shop not found");
    }

    #[tokio::test]
    async fn test_rewrites_to_target_shop() {
        let source = pool().await;
        let target = pool().await;
        seed(&source, "employee", "s1", "e1", json!({"code": "E1"})).await;

        let options = TransferOptions {
            target_shop_id: Some("t1".into()),
            ..TransferOptions::new("s1")
        };
        let transfer = ShopTransfer::new(source, target.clone());
        let err = transfer.run(&options).await.unwrap_err();
        assert_eq!(err.to_string(), "Shop not found");

        seed_shop(&target, "t1", "Target").await;
        let report = transfer.run(&options).await.unwrap();
        assert_eq!(report.target_shop_id, "t1");
        assert!(report.get(SHOP_COLLECTION).is_none());
        assert_eq!(count(&target, "employee", "t1").await, 1);
        assert_eq!(count(&target, "employee", "s1").await, 0);
    }
}
