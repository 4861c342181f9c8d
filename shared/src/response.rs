//! Response payload types shared by every module

use crate::models::BulkImport;
use serde::{Deserialize, Serialize};

/// Page metadata returned next to page searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    /// Previous page number, 0 when on the first page
    pub prev: i64,
    /// Next page number, 0 when on the last page
    pub next: i64,
    pub total_page: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let total_page = if total <= 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            total,
            page,
            per_page,
            prev: if page > 1 { page - 1 } else { 0 },
            next: if page < total_page { page + 1 } else { 0 },
            total_page,
        }
    }
}

/// Result body of a bulk import
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: BulkImport,
}

impl From<BulkImport> for BulkResponse {
    fn from(result: BulkImport) -> Self {
        Self {
            success: true,
            result,
        }
    }
}
