//! Employee Model

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MIN_PASSWORD_LEN: u64 = 6;

/// Shop employee. `code` doubles as the login username.
///
/// `password` is accepted on writes, stored as an argon2 hash and stripped
/// from every read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Employee {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub isdisabled: bool,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub shopid: String,
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub shopid: String,
    pub username: String,
    pub name: String,
}
