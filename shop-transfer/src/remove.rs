//! Hard-delete a shop's data

use anyhow::{Result, bail};
use shop_cloud::modules::transaction::TRANSACTION_COLLECTIONS;
use shop_cloud::modules::{MASTER_COLLECTIONS, SHOP_COLLECTION, SHOP_USER_COLLECTION};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ShopInfo {
    pub guid: String,
    pub name: String,
    pub created_by: String,
}

impl ShopInfo {
    pub fn confirm_prompt(&self) -> String {
        format!(
            "Are you sure to Remove Shop {} - {} by {} ? (y/n)",
            self.name, self.guid, self.created_by
        )
    }
}

pub fn is_confirmed(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y")
}

pub async fn find_shop(pool: &SqlitePool, shop_id: &str) -> Result<Option<ShopInfo>> {
    let shop = sqlx::query_as::<_, ShopInfo>(
        "SELECT guid_fixed AS guid, \
         COALESCE(json_extract(doc, '$.names[0].name'), json_extract(doc, '$.name1'), '') AS name, \
         created_by FROM documents \
         WHERE collection = ? AND guid_fixed = ? AND deleted_at IS NULL",
    )
    .bind(SHOP_COLLECTION)
    .bind(shop_id)
    .fetch_optional(pool)
    .await?;
    Ok(shop)
}

/// Delete every module collection of `shop` except the creator's own
/// shop-user row. The shop document itself stays.
pub async fn remove_shop(pool: &SqlitePool, shop: &ShopInfo) -> Result<u64> {
    if shop.guid.is_empty() {
        bail!("shop id is required");
    }

    let mut removed = 0;
    let mut tx = pool.begin().await?;
    for &collection in MASTER_COLLECTIONS.iter().chain(TRANSACTION_COLLECTIONS) {
        let result = if collection == SHOP_USER_COLLECTION {
            sqlx::query(
                "DELETE FROM documents WHERE collection = ? AND shop_id = ? \
                 AND COALESCE(json_extract(doc, '$.username'), '') <> ?",
            )
            .bind(collection)
            .bind(&shop.guid)
            .bind(&shop.created_by)
            .execute(&mut *tx)
            .await?
        } else {
            sqlx::query("DELETE FROM documents WHERE collection = ? AND shop_id = ?")
                .bind(collection)
                .bind(&shop.guid)
                .execute(&mut *tx)
                .await?
        };
        if result.rows_affected() > 0 {
            tracing::info!(collection, removed = result.rows_affected(), "Collection removed");
        }
        removed += result.rows_affected();
    }
    tx.commit().await?;

    tracing::info!(shop_id = %shop.guid, removed, "Shop data removed");
    Ok(removed)
}
