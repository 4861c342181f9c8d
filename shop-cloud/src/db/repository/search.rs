//! Free-text search with page and step (offset) paging

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use shared::models::Document;
use shared::request::{Pageable, PageableStep, SortKey};
use shared::response::Pagination;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::filter::{Filter, push_filters, push_order, push_search};
use super::{DocumentRow, RepoResult, SELECT_DOCUMENT, Visibility, into_documents, push_scope};
use crate::db::tokenizer;

pub struct SearchRepository<T> {
    pool: SqlitePool,
    collection: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for SearchRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            collection: self.collection,
            _marker: PhantomData,
        }
    }
}

struct Criteria<'a> {
    filters: &'a [Filter],
    fields: &'a [&'a str],
    tokens: Vec<String>,
}

impl<T: DeserializeOwned + Send> SearchRepository<T> {
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
        criteria: &Criteria<'_>,
    ) -> RepoResult<()> {
        push_scope(qb, self.collection, shop_id, Visibility::Live);
        push_filters(qb, criteria.filters)?;
        push_search(qb, criteria.fields, &criteria.tokens)
    }

    async fn count(&self, shop_id: &str, criteria: &Criteria<'_>) -> RepoResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM documents");
        self.push_where(&mut qb, shop_id, criteria)?;
        Ok(qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn fetch(
        &self,
        shop_id: &str,
        criteria: &Criteria<'_>,
        sorts: &[SortKey],
        window: Option<(i64, i64)>,
    ) -> RepoResult<Vec<Document<T>>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_DOCUMENT);
        self.push_where(&mut qb, shop_id, criteria)?;
        push_order(&mut qb, sorts)?;
        if let Some((limit, offset)) = window {
            qb.push(" LIMIT ")
                .push_bind(limit)
                .push(" OFFSET ")
                .push_bind(offset);
        }
        let rows = qb.build_query_as::<DocumentRow>().fetch_all(&self.pool).await?;
        into_documents(rows)
    }

    /// Every live document matching `q` in any of `fields`
    pub async fn find(
        &self,
        shop_id: &str,
        fields: &[&str],
        q: &str,
    ) -> RepoResult<Vec<Document<T>>> {
        let criteria = Criteria {
            filters: &[],
            fields,
            tokens: tokenizer::tokenize(q),
        };
        self.fetch(shop_id, &criteria, &[], None).await
    }

    pub async fn find_page(
        &self,
        shop_id: &str,
        fields: &[&str],
        pageable: &Pageable,
    ) -> RepoResult<(Vec<Document<T>>, Pagination)> {
        self.find_page_filter(shop_id, &[], fields, pageable).await
    }

    pub async fn find_page_filter(
        &self,
        shop_id: &str,
        filters: &[Filter],
        fields: &[&str],
        pageable: &Pageable,
    ) -> RepoResult<(Vec<Document<T>>, Pagination)> {
        let criteria = Criteria {
            filters,
            fields,
            tokens: tokenizer::tokenize(&pageable.q),
        };
        let total = self.count(shop_id, &criteria).await?;
        let docs = self
            .fetch(
                shop_id,
                &criteria,
                &pageable.sorts,
                Some((pageable.limit, pageable.offset())),
            )
            .await?;
        Ok((docs, Pagination::new(total, pageable.page, pageable.limit)))
    }

    /// Offset window plus the total match count
    pub async fn find_step(
        &self,
        shop_id: &str,
        filters: &[Filter],
        fields: &[&str],
        step: &PageableStep,
    ) -> RepoResult<(Vec<Document<T>>, i64)> {
        let criteria = Criteria {
            filters,
            fields,
            tokens: tokenizer::tokenize(&step.q),
        };
        let total = self.count(shop_id, &criteria).await?;
        let docs = self
            .fetch(shop_id, &criteria, &step.sorts, Some((step.limit, step.skip)))
            .await?;
        Ok((docs, total))
    }
}
