//! Document models
//!
//! Payload types stored inside [`Document`] envelopes. Field names are the
//! lowercase JSON keys clients exchange; they double as `json_extract` paths.

pub mod common;
pub mod document;
pub mod employee;
pub mod payment;
pub mod product;
pub mod restaurant;
pub mod shop;
pub mod transaction;

// Re-exports
pub use common::*;
pub use document::*;
pub use employee::*;
pub use payment::*;
pub use product::*;
pub use restaurant::*;
pub use shop::*;
pub use transaction::*;
