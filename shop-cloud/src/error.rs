//! Unified service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `RepoError`) and the
//! API-layer error (`AppError`) so handlers can use `?` all the way down.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::cache::CacheError;
use crate::db::repository::RepoError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error with two variants
///
/// - `Db`: Database/infrastructure errors (logged, mapped to a system error)
/// - `App`: Business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Db(e) => write!(f, "database error: {e}"),
            ServiceError::App(e) => write!(f, "{}", e.message),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(e: validator::ValidationErrors) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(_) => ServiceError::App(AppError::document_not_found()),
            RepoError::Duplicate(code) => ServiceError::App(AppError::code_exists(code)),
            RepoError::Validation(msg) => ServiceError::App(AppError::validation(msg)),
            other => ServiceError::Db(Box::new(other)),
        }
    }
}

impl From<CacheError> for ServiceError {
    fn from(e: CacheError) -> Self {
        tracing::error!(error = %e, "Cache error");
        ServiceError::App(AppError::with_message(ErrorCode::CacheError, e.to_string()))
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl ServiceError {
    /// Error code the client will see
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::App(e) => e.code,
            ServiceError::Db(_) => ErrorCode::DatabaseError,
        }
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_not_found_maps_to_document_not_found() {
        let err: ServiceError = RepoError::NotFound("g1".into()).into();
        assert_eq!(err.code(), ErrorCode::DocumentNotFound);
    }

    #[test]
    fn test_repo_duplicate_maps_to_code_exists() {
        let err: ServiceError = RepoError::Duplicate("BK01".into()).into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::CodeExists);
        assert_eq!(app.message, "Code is exists");
    }

    #[test]
    fn test_db_error_hides_detail() {
        let err: ServiceError = RepoError::Database("disk I/O error".into()).into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::DatabaseError);
        assert_eq!(app.message, "Database error");
    }
}
