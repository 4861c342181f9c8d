//! Payment master data: banks, book banks and QR payment channels

use super::common::NameX;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BankMaster {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(default)]
    #[validate(nested)]
    pub names: Vec<NameX>,
    #[serde(default)]
    pub logo: String,
}

/// A shop's bank account passbook
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BookBank {
    #[validate(length(min = 1, max = 100))]
    pub passbook: String,
    #[serde(default)]
    pub bookcode: String,
    #[serde(default)]
    pub bankcode: String,
    #[serde(default)]
    pub bankbranch: String,
    #[serde(default)]
    pub accounttype: i16,
    #[serde(default)]
    pub accountcode: String,
    #[serde(default)]
    #[validate(nested)]
    pub names: Vec<NameX>,
    #[serde(default)]
    #[validate(nested)]
    pub banknames: Vec<NameX>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct QrPayment {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(default)]
    #[validate(nested)]
    pub qrnames: Vec<NameX>,
    #[serde(default)]
    pub qrtype: i16,
    #[serde(default)]
    pub bookbankcode: String,
    #[serde(default)]
    pub billerid: String,
    #[serde(default)]
    pub apikey: String,
    #[serde(default)]
    pub isactive: bool,
}
