//! Business services
//!
//! - [`MasterService`]: generic CRUD/search/bulk/activity for master data
//! - [`TransactionService`]: master service plus document numbering
//! - [`DocNoGenerator`]: per-shop, per-day running numbers
//! - [`MasterSyncService`]: activity feed across every registered module
//! - [`ShopService`]: shop registration and user permissions

pub mod activity;
pub mod doc_no;
pub mod master;
pub mod master_sync;
pub mod notify;
pub mod shop;
pub mod transaction;

pub use activity::{ActivityAction, ActivityModule, ActivityModuleManager};
pub use doc_no::DocNoGenerator;
pub use master::{MasterModule, MasterService};
pub use master_sync::MasterSyncService;
pub use notify::ChangeNotifier;
pub use shop::ShopService;
pub use transaction::{TransactionModule, TransactionService};

use shared::models::Document;
use shared::util::{new_guid, now_millis};

/// Fresh envelope with a new GuidFixed
pub(crate) fn new_document<T>(shop_id: &str, username: &str, data: T) -> Document<T> {
    Document {
        guidfixed: new_guid(),
        shopid: shop_id.to_string(),
        data,
        createdby: username.to_string(),
        createdat: now_millis(),
        updatedby: None,
        updatedat: None,
        deletedby: None,
        deletedat: None,
    }
}
