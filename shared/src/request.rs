//! Query-string types for search, paging and filter requests

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 10_000;

/// Sort key parsed from `field:1` (ascending) or `field:-1` (descending)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub key: String,
    pub ascending: bool,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        let (key, dir) = match raw.split_once(':') {
            Some((k, d)) => (k.trim(), d.trim()),
            None => (raw.trim(), "1"),
        };
        if key.is_empty() {
            return None;
        }
        let ascending = match dir {
            "1" => true,
            "-1" => false,
            _ => return None,
        };
        Some(Self {
            key: key.to_string(),
            ascending,
        })
    }

    /// Parses a comma separated list, skipping malformed entries
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',').filter_map(Self::parse).collect()
    }
}

/// Page based search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageable {
    pub q: String,
    pub page: i64,
    pub limit: i64,
    pub sorts: Vec<SortKey>,
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            q: String::new(),
            page: 1,
            limit: DEFAULT_LIMIT,
            sorts: Vec::new(),
        }
    }
}

impl Pageable {
    /// Builds a pageable from raw query values, clamping to sane bounds
    pub fn new(q: Option<String>, page: Option<i64>, limit: Option<i64>, sort: Option<&str>) -> Self {
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        Self {
            q: q.unwrap_or_default().trim().to_string(),
            // (page - 1) * limit must fit in an i64 offset
            page: page.filter(|p| *p > 0).unwrap_or(1).min(i64::MAX / limit),
            limit,
            sorts: sort.map(SortKey::parse_list).unwrap_or_default(),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.limit.max(0))
    }
}

/// Offset based list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageableStep {
    pub q: String,
    pub skip: i64,
    pub limit: i64,
    pub sorts: Vec<SortKey>,
}

impl Default for PageableStep {
    fn default() -> Self {
        Self {
            q: String::new(),
            skip: 0,
            limit: DEFAULT_LIMIT,
            sorts: Vec::new(),
        }
    }
}

impl PageableStep {
    pub fn new(q: Option<String>, skip: Option<i64>, limit: Option<i64>, sort: Option<&str>) -> Self {
        Self {
            q: q.unwrap_or_default().trim().to_string(),
            skip: skip.filter(|s| *s >= 0).unwrap_or(0),
            limit: limit
                .filter(|l| *l > 0)
                .unwrap_or(DEFAULT_LIMIT)
                .min(MAX_LIMIT),
            sorts: sort.map(SortKey::parse_list).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Bool,
}

/// Maps a query parameter onto a document field
///
/// `group-number=2` with `{param: "group-number", field: "groupnumber", Int}`
/// becomes an equality filter on `groupnumber = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRequest {
    pub param: &'static str,
    pub field: &'static str,
    pub field_type: FieldType,
}

impl FilterRequest {
    pub const fn new(param: &'static str, field: &'static str, field_type: FieldType) -> Self {
        Self {
            param,
            field,
            field_type,
        }
    }

    /// Converts the raw parameter into a typed JSON value, `None` if it does not parse
    pub fn parse_value(&self, raw: &str) -> Option<serde_json::Value> {
        match self.field_type {
            FieldType::String => Some(serde_json::Value::String(raw.to_string())),
            FieldType::Int => raw.trim().parse::<i64>().ok().map(Into::into),
            FieldType::Bool => raw.trim().parse::<bool>().ok().map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(
            SortKey::parse("code:-1"),
            Some(SortKey {
                key: "code".into(),
                ascending: false
            })
        );
        assert!(SortKey::parse("code").unwrap().ascending);
        assert_eq!(SortKey::parse("code:2"), None);
        assert_eq!(SortKey::parse(":1"), None);
    }

    #[test]
    fn test_sort_key_list_skips_bad_entries() {
        let keys = SortKey::parse_list("code:1,bad:x,createdat:-1");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].key, "createdat");
    }

    #[test]
    fn test_pageable_defaults_and_clamps() {
        let p = Pageable::new(None, Some(0), Some(50_000), None);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, MAX_LIMIT);
        assert_eq!(p.offset(), 0);

        let p = Pageable::new(Some("  abc ".into()), Some(3), None, Some("code:1"));
        assert_eq!(p.q, "abc");
        assert_eq!(p.limit, DEFAULT_LIMIT);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.sorts.len(), 1);
    }

    #[test]
    fn test_pageable_huge_page_does_not_overflow() {
        let p = Pageable::new(None, Some(i64::MAX), Some(20), None);
        assert_eq!(p.page, i64::MAX / 20);
        assert_eq!(p.offset(), (i64::MAX / 20 - 1) * 20);

        let p = Pageable {
            page: i64::MAX,
            limit: MAX_LIMIT,
            ..Pageable::default()
        };
        assert_eq!(p.offset(), i64::MAX);
    }

    #[test]
    fn test_pageable_step_defaults() {
        let p = PageableStep::new(None, Some(-5), Some(0), None);
        assert_eq!(p.skip, 0);
        assert_eq!(p.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_filter_request_parse_value() {
        let f = FilterRequest::new("group-number", "groupnumber", FieldType::Int);
        assert_eq!(f.parse_value("2"), Some(serde_json::json!(2)));
        assert_eq!(f.parse_value("two"), None);

        let f = FilterRequest::new("active", "isactive", FieldType::Bool);
        assert_eq!(f.parse_value("true"), Some(serde_json::json!(true)));
    }
}
