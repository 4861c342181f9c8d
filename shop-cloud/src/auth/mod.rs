//! Authentication for the business API

pub mod shop_auth;

pub use shop_auth::{AuthIdentity, Claims, auth_middleware, create_token, verify_token};
