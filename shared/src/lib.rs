//! Shared types for the shop platform
//!
//! Error codes, the API response envelope, paging/filter request types,
//! document models and small utilities used by every crate.

pub mod error;
pub mod models;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use request::{FieldType, FilterRequest, Pageable, PageableStep, SortKey};
pub use response::{BulkResponse, Pagination};
