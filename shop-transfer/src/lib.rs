//! shop-transfer: offline tools for moving and removing shop data
//!
//! - [`transfer`]: copy one shop from a source database into a target database
//! - [`remove`]: hard-delete a shop's module data

pub mod config;
pub mod remove;
pub mod transfer;

pub use config::TransferConfig;
pub use remove::{ShopInfo, find_shop, is_confirmed, remove_shop};
pub use transfer::{CollectionReport, ShopTransfer, TransferOptions, TransferReport};
