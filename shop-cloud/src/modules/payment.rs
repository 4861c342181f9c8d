//! Payment master data

use shared::models::{BankMaster, BookBank, NameX, QrPayment};

use crate::services::MasterModule;

pub struct BankMasterModule;

impl MasterModule for BankMasterModule {
    type Model = BankMaster;

    const MODULE_NAME: &'static str = "bankmaster";
    const COLLECTION: &'static str = "bankmaster";
    const ROUTE: &'static str = "/payment/bankmaster";
    const SEARCH_FIELDS: &'static [&'static str] = &["code", "names.name"];

    fn identity(model: &BankMaster) -> String {
        model.code.clone()
    }

    fn names_mut(model: &mut BankMaster) -> Option<&mut Vec<NameX>> {
        Some(&mut model.names)
    }
}

/// Keyed by passbook number
pub struct BookBankModule;

impl MasterModule for BookBankModule {
    type Model = BookBank;

    const MODULE_NAME: &'static str = "bookbank";
    const COLLECTION: &'static str = "bookbank";
    const ROUTE: &'static str = "/payment/bookbank";
    const IDENTITY_FIELD: &'static str = "passbook";
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "bookcode",
        "bankcode",
        "passbook",
        "names.name",
        "banknames.name",
    ];

    fn identity(model: &BookBank) -> String {
        model.passbook.clone()
    }

    fn names_mut(model: &mut BookBank) -> Option<&mut Vec<NameX>> {
        Some(&mut model.names)
    }
}

pub struct QrPaymentModule;

impl MasterModule for QrPaymentModule {
    type Model = QrPayment;

    const MODULE_NAME: &'static str = "qrpayment";
    const COLLECTION: &'static str = "qrpayment";
    const ROUTE: &'static str = "/payment/qrpayment";
    const SEARCH_FIELDS: &'static [&'static str] = &["code", "qrnames.name"];

    fn identity(model: &QrPayment) -> String {
        model.code.clone()
    }

    fn names_mut(model: &mut QrPayment) -> Option<&mut Vec<NameX>> {
        Some(&mut model.qrnames)
    }
}
