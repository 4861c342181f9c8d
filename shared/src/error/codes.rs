//! Unified error codes for the shop platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Shop errors
//! - 4xxx: Document errors
//! - 5xxx: Employee errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients in any language
/// can switch on them without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Shop ====================
    /// Request carries no shop
    ShopNotSelected = 3001,
    /// Shop not found
    ShopNotFound = 3002,

    // ==================== 4xxx: Document ====================
    /// Document not found in the shop
    DocumentNotFound = 4001,
    /// Identity code already used by another document
    CodeExists = 4002,
    /// Generated or supplied document number already used
    DocNoExists = 4003,
    /// Client-numbered document without a document number
    DocNoRequired = 4004,
    /// `lastupdate` parameter missing or malformed
    LastUpdateInvalid = 4005,

    // ==================== 5xxx: Employee ====================
    /// Password below minimum length
    PasswordTooShort = 5002,
    /// Employee account disabled
    EmployeeDisabled = 5003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Cache error
    CacheError = 9003,
}

impl ErrorCode {
    /// Numeric value of the code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether this code denotes success
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Success",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Token expired",
            ErrorCode::TokenInvalid => "Invalid token",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Shop
            ErrorCode::ShopNotSelected => "Shop not selected",
            ErrorCode::ShopNotFound => "Shop not found",

            // Document
            ErrorCode::DocumentNotFound => "document not found",
            ErrorCode::CodeExists => "Code is exists",
            ErrorCode::DocNoExists => "DocNo is exists",
            ErrorCode::DocNoRequired => "docno is required",
            ErrorCode::LastUpdateInvalid => "lastupdate format invalid.",

            // Employee
            ErrorCode::PasswordTooShort => "Password is too short",
            ErrorCode::EmployeeDisabled => "Employee is disabled",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::CacheError => "Cache error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Shop
            3001 => Ok(ErrorCode::ShopNotSelected),
            3002 => Ok(ErrorCode::ShopNotFound),

            // Document
            4001 => Ok(ErrorCode::DocumentNotFound),
            4002 => Ok(ErrorCode::CodeExists),
            4003 => Ok(ErrorCode::DocNoExists),
            4004 => Ok(ErrorCode::DocNoRequired),
            4005 => Ok(ErrorCode::LastUpdateInvalid),

            // Employee
            5002 => Ok(ErrorCode::PasswordTooShort),
            5003 => Ok(ErrorCode::EmployeeDisabled),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::CacheError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
