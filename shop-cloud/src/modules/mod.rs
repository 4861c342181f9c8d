//! Business modules
//!
//! Each entity is a zero-sized type implementing [`MasterModule`] or
//! [`TransactionModule`]; the generic services and routers do the rest.
//!
//! [`MasterModule`]: crate::services::MasterModule
//! [`TransactionModule`]: crate::services::TransactionModule

pub mod employee;
pub mod payment;
pub mod product;
pub mod restaurant;
pub mod transaction;

use crate::services::MasterModule;

/// Collection of shop documents; a shop's `guidfixed` is its shop id
pub const SHOP_COLLECTION: &str = "shops";
/// Collection of user-to-shop memberships
pub const SHOP_USER_COLLECTION: &str = "shopusers";

/// Master collections in transfer order (shop users first)
pub const MASTER_COLLECTIONS: &[&str] = &[
    SHOP_USER_COLLECTION,
    employee::EmployeeModule::COLLECTION,
    product::ProductCategoryModule::COLLECTION,
    restaurant::KitchenModule::COLLECTION,
    payment::BankMasterModule::COLLECTION,
    payment::BookBankModule::COLLECTION,
    payment::QrPaymentModule::COLLECTION,
    restaurant::DeviceModule::COLLECTION,
    product::OrderTypeModule::COLLECTION,
    restaurant::TableModule::COLLECTION,
    restaurant::ZoneModule::COLLECTION,
    restaurant::PrinterModule::COLLECTION,
    restaurant::StaffModule::COLLECTION,
];
