//! Query-string parsing shared by the module and master-sync routes

use std::collections::HashMap;

use shared::util::parse_last_update;
use shared::{AppError, ErrorCode, FilterRequest, Pageable, PageableStep};

use crate::db::repository::Filter;
use crate::services::ActivityAction;
use crate::services::master_sync::SyncQuery;

pub type Params = HashMap<String, String>;

fn int_param(params: &Params, key: &str) -> Option<i64> {
    params.get(key).and_then(|v| v.trim().parse().ok())
}

/// `q`, `page`, `limit`, `sort`
pub fn pageable(params: &Params) -> Pageable {
    Pageable::new(
        params.get("q").cloned(),
        int_param(params, "page"),
        int_param(params, "limit"),
        params.get("sort").map(String::as_str),
    )
}

/// `q`, `skip`, `limit`, `sort`
pub fn pageable_step(params: &Params) -> PageableStep {
    PageableStep::new(
        params.get("q").cloned(),
        int_param(params, "skip"),
        int_param(params, "limit"),
        params.get("sort").map(String::as_str),
    )
}

/// Typed equality filters for the parameters a module accepts; values that
/// do not parse are ignored
pub fn module_filters(requests: &[FilterRequest], params: &Params) -> Vec<Filter> {
    requests
        .iter()
        .filter_map(|req| {
            let value = req.parse_value(params.get(req.param)?)?;
            Some(Filter::Eq(req.field.to_string(), value))
        })
        .collect()
}

/// `k:v,k2:v2` into text-equality filters on the document
pub fn parse_filter_param(raw: &str) -> Vec<Filter> {
    raw.split(',')
        .filter_map(|pair| {
            let (key, value) = pair.split_once(':')?;
            let key = key.trim();
            (!key.is_empty()).then(|| Filter::Text(key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// `lastupdate` (or `lastUpdate`), `module`, `action`, `filter`
pub fn sync_query(params: &Params) -> Result<SyncQuery, AppError> {
    let since = params
        .get("lastupdate")
        .or_else(|| params.get("lastUpdate"))
        .and_then(|raw| parse_last_update(raw.trim()))
        .ok_or_else(|| AppError::new(ErrorCode::LastUpdateInvalid))?;

    let modules = params
        .get("module")
        .map(|raw| {
            raw.split(',')
                .map(|m| m.trim().to_ascii_lowercase())
                .filter(|m| !m.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(SyncQuery {
        modules,
        action: params
            .get("action")
            .map(|a| ActivityAction::parse(a))
            .unwrap_or_default(),
        since,
        filters: params
            .get("filter")
            .map(|f| parse_filter_param(f))
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::FieldType;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_pageable_defaults_and_bad_numbers() {
        let p = pageable(&params(&[("q", "kbank"), ("page", "x"), ("limit", "5")]));
        assert_eq!(p.q, "kbank");
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 5);

        let s = pageable_step(&params(&[("skip", "40")]));
        assert_eq!(s.skip, 40);
        assert_eq!(s.limit, 20);
    }

    #[test]
    fn test_module_filters() {
        const REQS: &[FilterRequest] =
            &[FilterRequest::new("group-number", "groupnumber", FieldType::Int)];
        let filters = module_filters(REQS, &params(&[("group-number", "3")]));
        assert_eq!(filters, vec![Filter::Eq("groupnumber".into(), 3.into())]);
        assert!(module_filters(REQS, &params(&[("group-number", "x")])).is_empty());
        assert!(module_filters(REQS, &params(&[])).is_empty());
    }

    #[test]
    fn test_filter_param() {
        let filters = parse_filter_param("zone:Z1, isactive:true,broken,:x");
        assert_eq!(
            filters,
            vec![
                Filter::Text("zone".into(), "Z1".into()),
                Filter::Text("isactive".into(), "true".into()),
            ]
        );
    }

    #[test]
    fn test_sync_query() {
        let q = sync_query(&params(&[
            ("lastUpdate", "2024-01-02T03:04:05"),
            ("module", "BankMaster, restaurant-zone"),
            ("action", "remove"),
        ]))
        .unwrap();
        assert_eq!(q.modules, vec!["bankmaster", "restaurant-zone"]);
        assert_eq!(q.action, ActivityAction::Remove);
        assert_eq!(q.since, 1_704_164_645_000);

        for bad in [vec![], vec![("lastupdate", "2024-01-02")]] {
            let err = sync_query(&params(&bad)).unwrap_err();
            assert_eq!(err.code, ErrorCode::LastUpdateInvalid);
            assert_eq!(err.message, "lastupdate format invalid.");
        }
    }
}
