//! shop-cloud: multi-shop back-office service
//!
//! Master data, sale/purchase/stock transactions, doc-number generation and
//! a master-sync activity feed, all persisted as JSON documents in SQLite
//! and served over a JWT-protected HTTP API.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod modules;
pub mod mq;
pub mod services;
pub mod state;
pub mod util;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;
