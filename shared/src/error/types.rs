//! Error types and API response structures

use super::codes::ErrorCode;
use crate::response::Pagination;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// Every handler failure is turned into one of these before it reaches the
/// wire, so clients always receive `{success: false, code, message}`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// The document addressed by guid, code or docno does not exist in the shop
    pub fn document_not_found() -> Self {
        Self::new(ErrorCode::DocumentNotFound)
    }

    pub fn code_exists(code: impl Into<String>) -> Self {
        Self::new(ErrorCode::CodeExists).with_detail("code", code.into())
    }

    pub fn doc_no_exists(doc_no: impl Into<String>) -> Self {
        Self::new(ErrorCode::DocNoExists).with_detail("docno", doc_no.into())
    }

    pub fn doc_no_required() -> Self {
        Self::new(ErrorCode::DocNoRequired)
    }

    pub fn shop_not_found() -> Self {
        Self::new(ErrorCode::ShopNotFound)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut err = AppError::validation(errors.to_string());
        for (field, field_errors) in errors.field_errors() {
            let codes: Vec<Value> = field_errors
                .iter()
                .map(|e| Value::String(e.code.to_string()))
                .collect();
            err = err.with_detail(field.to_string(), Value::Array(codes));
        }
        err
    }
}

/// Unified API response structure
///
/// The envelope every endpoint answers with:
/// - `success`: whether the call succeeded
/// - `code` / `message`: only present on failures
/// - `id`: identifier of a created/updated/deleted document
/// - `data`: payload
/// - `pagination`: paging info for page searches
/// - `total`: row count for step lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    fn empty(success: bool) -> Self {
        Self {
            success,
            code: None,
            message: None,
            id: None,
            data: None,
            pagination: None,
            total: None,
            details: None,
        }
    }

    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::empty(true)
        }
    }

    /// Page search result
    pub fn paged(data: T, pagination: Pagination) -> Self {
        Self {
            data: Some(data),
            pagination: Some(pagination),
            ..Self::empty(true)
        }
    }

    /// Step list result
    pub fn with_total(data: T, total: i64) -> Self {
        Self {
            data: Some(data),
            total: Some(total),
            ..Self::empty(true)
        }
    }

    /// Success carrying both an id and a payload
    pub fn created_with(id: impl Into<String>, data: T) -> Self {
        Self {
            id: Some(id.into()),
            data: Some(data),
            ..Self::empty(true)
        }
    }
}

impl ApiResponse<()> {
    /// Create a success response without data
    pub fn ok() -> Self {
        Self::empty(true)
    }

    /// Success that only echoes the affected document id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::empty(true)
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: Some(err.message.clone()),
            details: err.details.clone(),
            ..Self::empty(false)
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: Some(err.message),
            details: err.details,
            ..Self::empty(false)
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);

        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = match self.code {
            None | Some(0) => StatusCode::OK,
            Some(code) => ErrorCode::try_from(code)
                .map(|c| c.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        };

        (status, Json(self)).into_response()
    }
}
