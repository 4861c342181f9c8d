//! Sale, purchase and stock transaction documents
//!
//! All transaction modules share one document shape; they differ only in
//! doc-number prefix and trans flag.

use super::common::NameX;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Transaction {
    #[serde(default)]
    #[validate(length(max = 50))]
    pub docno: String,
    #[serde(default)]
    pub docdatetime: DateTime<Utc>,
    #[serde(default)]
    pub taxdocno: String,
    #[serde(default)]
    pub taxdocdate: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transflag: i32,
    #[serde(default)]
    pub doctype: i16,
    #[serde(default)]
    pub docrefno: String,
    #[serde(default)]
    pub custcode: String,
    #[serde(default)]
    #[validate(nested)]
    pub custnames: Vec<NameX>,
    #[serde(default)]
    pub branchcode: String,
    #[serde(default)]
    pub posid: String,
    #[serde(default)]
    pub cashiercode: String,
    #[serde(default)]
    pub tablenumber: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vattype: i16,
    #[serde(default)]
    pub vatrate: f64,
    #[serde(default)]
    pub totalvalue: f64,
    #[serde(default)]
    pub totaldiscount: f64,
    #[serde(default)]
    pub discountword: String,
    #[serde(default)]
    pub totalbeforevat: f64,
    #[serde(default)]
    pub totalvatvalue: f64,
    #[serde(default)]
    pub totalexceptvat: f64,
    #[serde(default)]
    pub totalaftervat: f64,
    #[serde(default)]
    pub totalamount: f64,
    #[serde(default)]
    pub iscancel: bool,
    #[serde(default)]
    pub status: i16,
    /// Client-numbered document from a POS terminal
    #[serde(default)]
    pub ispos: bool,
    #[serde(default)]
    pub paymentdetail: PaymentDetail,
    #[serde(default)]
    #[validate(nested)]
    pub details: Vec<TransactionDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TransactionDetail {
    #[serde(default)]
    pub linenumber: i32,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub itemcode: String,
    #[serde(default)]
    #[validate(nested)]
    pub itemnames: Vec<NameX>,
    #[serde(default)]
    pub unitcode: String,
    #[serde(default)]
    pub qty: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub discount: String,
    #[serde(default)]
    pub discountamount: f64,
    #[serde(default)]
    pub sumamount: f64,
    #[serde(default)]
    pub whcode: String,
    #[serde(default)]
    pub locationcode: String,
    #[serde(default)]
    pub towhcode: String,
    #[serde(default)]
    pub tolocationcode: String,
    #[serde(default)]
    pub remark: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentDetail {
    #[serde(default)]
    pub cashamount: f64,
    #[serde(default)]
    pub cashamounttext: String,
    #[serde(default)]
    pub paymentcreditcards: Vec<PaymentCreditCard>,
    #[serde(default)]
    pub paymenttransfers: Vec<PaymentTransfer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentCreditCard {
    #[serde(default)]
    pub bankcode: String,
    #[serde(default)]
    pub names: Vec<NameX>,
    #[serde(default)]
    pub cardnumber: String,
    #[serde(default)]
    pub approvedcode: String,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentTransfer {
    #[serde(default)]
    pub bankcode: String,
    #[serde(default)]
    pub names: Vec<NameX>,
    #[serde(default)]
    pub accountnumber: String,
    #[serde(default)]
    pub amount: f64,
}
