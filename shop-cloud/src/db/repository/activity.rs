//! Change feeds: what was created, updated or deleted since a timestamp

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use shared::models::{DeleteActivity, Document};
use shared::request::{Pageable, PageableStep};
use shared::response::Pagination;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::filter::{Filter, push_filters, push_order};
use super::{DocumentRow, RepoResult, SELECT_DOCUMENT, Visibility, into_documents, push_scope};

pub struct ActivityRepository<T> {
    pool: SqlitePool,
    collection: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ActivityRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            collection: self.collection,
            _marker: PhantomData,
        }
    }
}

#[derive(Clone, Copy)]
enum Feed {
    CreatedOrUpdated,
    Deleted,
}

impl<T: DeserializeOwned + Send> ActivityRepository<T> {
    pub fn new(pool: SqlitePool, collection: &'static str) -> Self {
        Self {
            pool,
            collection,
            _marker: PhantomData,
        }
    }

    fn push_where(
        &self,
        qb: &mut QueryBuilder<'_, Sqlite>,
        shop_id: &str,
        feed: Feed,
        since: i64,
        filters: &[Filter],
    ) -> RepoResult<()> {
        match feed {
            Feed::CreatedOrUpdated => {
                push_scope(qb, self.collection, shop_id, Visibility::Live);
                qb.push(" AND (created_at >= ")
                    .push_bind(since)
                    .push(" OR updated_at >= ")
                    .push_bind(since)
                    .push(")");
            }
            Feed::Deleted => {
                push_scope(qb, self.collection, shop_id, Visibility::Deleted);
                qb.push(" AND deleted_at >= ").push_bind(since);
            }
        }
        push_filters(qb, filters)
    }

    async fn query(
        &self,
        shop_id: &str,
        feed: Feed,
        since: i64,
        filters: &[Filter],
        limit: i64,
        offset: i64,
    ) -> RepoResult<(Vec<DocumentRow>, i64)> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM documents");
        self.push_where(&mut count_qb, shop_id, feed, since, filters)?;
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_DOCUMENT);
        self.push_where(&mut qb, shop_id, feed, since, filters)?;
        push_order(&mut qb, &[])?;
        qb.push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = qb.build_query_as::<DocumentRow>().fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    pub async fn find_created_or_updated_page(
        &self,
        shop_id: &str,
        since: i64,
        filters: &[Filter],
        pageable: &Pageable,
    ) -> RepoResult<(Vec<Document<T>>, Pagination)> {
        let (rows, total) = self
            .query(
                shop_id,
                Feed::CreatedOrUpdated,
                since,
                filters,
                pageable.limit,
                pageable.offset(),
            )
            .await?;
        Ok((
            into_documents(rows)?,
            Pagination::new(total, pageable.page, pageable.limit),
        ))
    }

    pub async fn find_deleted_page(
        &self,
        shop_id: &str,
        since: i64,
        filters: &[Filter],
        pageable: &Pageable,
    ) -> RepoResult<(Vec<DeleteActivity>, Pagination)> {
        let (rows, total) = self
            .query(
                shop_id,
                Feed::Deleted,
                since,
                filters,
                pageable.limit,
                pageable.offset(),
            )
            .await?;
        Ok((
            rows.into_iter()
                .map(DocumentRow::into_delete_activity)
                .collect(),
            Pagination::new(total, pageable.page, pageable.limit),
        ))
    }

    pub async fn find_created_or_updated_step(
        &self,
        shop_id: &str,
        since: i64,
        filters: &[Filter],
        step: &PageableStep,
    ) -> RepoResult<(Vec<Document<T>>, i64)> {
        let (rows, total) = self
            .query(
                shop_id,
                Feed::CreatedOrUpdated,
                since,
                filters,
                step.limit,
                step.skip,
            )
            .await?;
        Ok((into_documents(rows)?, total))
    }

    pub async fn find_deleted_step(
        &self,
        shop_id: &str,
        since: i64,
        filters: &[Filter],
        step: &PageableStep,
    ) -> RepoResult<(Vec<DeleteActivity>, i64)> {
        let (rows, total) = self
            .query(shop_id, Feed::Deleted, since, filters, step.limit, step.skip)
            .await?;
        Ok((
            rows.into_iter()
                .map(DocumentRow::into_delete_activity)
                .collect(),
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::CrudRepository;
    use crate::db::repository::test_support::{Item, item_doc, test_pool};

    async fn seeded() -> (CrudRepository<Item>, ActivityRepository<Item>) {
        let pool = test_pool().await;
        let crud = CrudRepository::new(pool.clone(), "items");
        crud.create_in_batch(&[
            item_doc("s1", "old", "OLD", "Old", 100),
            item_doc("s1", "new", "NEW", "New", 2_000),
            item_doc("s1", "edited", "EDT", "Edited", 100),
            item_doc("s1", "gone", "GON", "Gone", 100),
            item_doc("s2", "other", "OTH", "Other", 2_000),
        ])
        .await
        .unwrap();
        let edited = item_doc("s1", "edited", "EDT", "Edited again", 100).data;
        crud.update("s1", "edited", &edited, "u", 3_000).await.unwrap();
        crud.delete_by_guidfixed("s1", "gone", "u", 4_000).await.unwrap();
        (crud, ActivityRepository::new(pool, "items"))
    }

    #[tokio::test]
    async fn test_created_or_updated_since() {
        let (_, activity) = seeded().await;
        let (docs, pagination) = activity
            .find_created_or_updated_page("s1", 1_000, &[], &Pageable::default())
            .await
            .unwrap();
        let guids: Vec<_> = docs.iter().map(|d| d.guidfixed.as_str()).collect();
        assert_eq!(guids, vec!["edited", "new"]);
        assert_eq!(pagination.total, 2);
    }

    #[tokio::test]
    async fn test_deleted_since() {
        let (_, activity) = seeded().await;
        let (removed, pagination) = activity
            .find_deleted_page("s1", 1_000, &[], &Pageable::default())
            .await
            .unwrap();
        assert_eq!(pagination.total, 1);
        assert_eq!(
            removed[0],
            DeleteActivity {
                guidfixed: "gone".into(),
                shopid: "s1".into(),
                deletedat: 4_000,
                deletedby: "u".into(),
            }
        );

        let (removed, total) = activity
            .find_deleted_step("s1", 5_000, &[], &PageableStep::default())
            .await
            .unwrap();
        assert!(removed.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_step_with_filter() {
        let (_, activity) = seeded().await;
        let step = PageableStep::new(None, Some(0), Some(10), None);
        let (docs, total) = activity
            .find_created_or_updated_step("s1", 0, &[Filter::Text("code".into(), "NEW".into())], &step)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(docs[0].data.code, "NEW");
    }
}
