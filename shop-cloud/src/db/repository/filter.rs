//! SQL fragments for field filters, text search and sorting
//!
//! Document fields are addressed by their JSON key (`code`, `names.name`).
//! Envelope fields (`guidfixed`, `createdat`, ...) map to table columns.
//! Paths are validated before being inlined; values are always bound.

use serde_json::Value;
use shared::request::SortKey;
use sqlx::{QueryBuilder, Sqlite};

use super::{RepoError, RepoResult};

/// Equality-style condition on one field
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Ne(String, Value),
    In(String, Vec<Value>),
    /// Value starts with the given text
    Prefix(String, String),
    /// Field compared as text, for loosely typed query-string filters
    Text(String, String),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn in_values<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In(field.into(), values.into_iter().map(Into::into).collect())
    }
}

fn valid_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|seg| {
            !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// SQL expression for a field name
pub fn column_expr(field: &str) -> RepoResult<String> {
    let column = match field {
        "guidfixed" => "guid_fixed",
        "shopid" => "shop_id",
        "createdby" => "created_by",
        "createdat" => "created_at",
        "updatedby" => "updated_by",
        "updatedat" => "updated_at",
        "deletedby" => "deleted_by",
        "deletedat" => "deleted_at",
        path if valid_path(path) => return Ok(format!("json_extract(doc, '$.{path}')")),
        other => return Err(RepoError::Validation(format!("invalid field: {other}"))),
    };
    Ok(column.to_string())
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::String(s) => {
            qb.push_bind(s.clone());
        }
        Value::Bool(b) => {
            qb.push_bind(*b);
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                qb.push_bind(i);
            }
            None => {
                qb.push_bind(n.as_f64().unwrap_or_default());
            }
        },
        Value::Null => {
            qb.push("NULL");
        }
        other => {
            qb.push_bind(other.to_string());
        }
    }
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Append ` AND <condition>` for every filter
pub fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filters: &[Filter]) -> RepoResult<()> {
    for filter in filters {
        qb.push(" AND ");
        match filter {
            Filter::Eq(field, Value::Null) => {
                qb.push(column_expr(field)?).push(" IS NULL");
            }
            Filter::Eq(field, value) => {
                qb.push(column_expr(field)?).push(" = ");
                push_value(qb, value);
            }
            Filter::Ne(field, Value::Null) => {
                qb.push(column_expr(field)?).push(" IS NOT NULL");
            }
            Filter::Ne(field, value) => {
                qb.push(column_expr(field)?).push(" IS NOT ");
                push_value(qb, value);
            }
            Filter::In(_, values) if values.is_empty() => {
                qb.push("0");
            }
            Filter::In(field, values) => {
                qb.push(column_expr(field)?).push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        qb.push(", ");
                    }
                    push_value(qb, value);
                }
                qb.push(")");
            }
            Filter::Prefix(field, prefix) => {
                qb.push(column_expr(field)?)
                    .push(" LIKE ")
                    .push_bind(format!("{}%", escape_like(prefix)))
                    .push(" ESCAPE '\\'");
            }
            Filter::Text(field, text) => {
                qb.push("CAST(")
                    .push(column_expr(field)?)
                    .push(" AS TEXT) = ")
                    .push_bind(text.clone());
            }
        }
    }
    Ok(())
}

/// Like [`column_expr`], but JSON paths read the case-folded copy
fn search_expr(field: &str) -> RepoResult<String> {
    Ok(column_expr(field)?.replacen("json_extract(doc,", "json_extract(doc_folded,", 1))
}

fn push_token_likes(qb: &mut QueryBuilder<'_, Sqlite>, expr: &str, tokens: &[String]) {
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            qb.push(" AND ");
        }
        qb.push(expr)
            .push(" LIKE ")
            .push_bind(format!("%{}%", escape_like(&token.to_lowercase())))
            .push(" ESCAPE '\\'");
    }
}

/// Append ` AND (field1 matches all tokens OR field2 matches all tokens ...)`
///
/// A dotted field such as `names.name` matches when any nested `name` under
/// `names` contains every token.
pub fn push_search(
    qb: &mut QueryBuilder<'_, Sqlite>,
    fields: &[&str],
    tokens: &[String],
) -> RepoResult<()> {
    if fields.is_empty() || tokens.is_empty() {
        return Ok(());
    }

    qb.push(" AND (");
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        match field.rsplit_once('.') {
            Some((parent, key)) => {
                if !valid_path(parent) || !valid_path(key) {
                    return Err(RepoError::Validation(format!("invalid field: {field}")));
                }
                qb.push(format!(
                    "EXISTS (SELECT 1 FROM json_tree(documents.doc_folded, '$.{parent}') jt WHERE jt.key = '{key}' AND "
                ));
                push_token_likes(qb, "jt.value", tokens);
                qb.push(")");
            }
            None => {
                let expr = search_expr(field)?;
                qb.push("(");
                push_token_likes(qb, &expr, tokens);
                qb.push(")");
            }
        }
    }
    qb.push(")");
    Ok(())
}

/// Append ` ORDER BY ...`; defaults to creation order
pub fn push_order(qb: &mut QueryBuilder<'_, Sqlite>, sorts: &[SortKey]) -> RepoResult<()> {
    qb.push(" ORDER BY ");
    if sorts.is_empty() {
        qb.push("created_at ASC");
    } else {
        for (i, sort) in sorts.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(column_expr(&sort.key)?)
                .push(if sort.ascending { " ASC" } else { " DESC" });
        }
    }
    qb.push(", id ASC");
    Ok(())
}
