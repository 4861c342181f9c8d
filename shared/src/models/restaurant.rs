//! Restaurant front-of-house master data

use super::common::NameX;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Dining area (hall, terrace, private room)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Zone {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(default)]
    #[validate(nested)]
    pub names: Vec<NameX>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Table {
    #[validate(length(min = 1, max = 100))]
    pub number: String,
    #[serde(default)]
    #[validate(nested)]
    pub names: Vec<NameX>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub seat: i32,
    #[serde(default)]
    pub zone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Printer {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(default)]
    #[validate(nested)]
    pub names: Vec<NameX>,
    #[serde(default)]
    pub name1: String,
    #[serde(default)]
    pub name2: String,
    #[serde(default)]
    pub name3: String,
    #[serde(default)]
    pub name4: String,
    #[serde(default)]
    pub name5: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub printertype: i16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Kitchen {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(default)]
    #[validate(nested)]
    pub names: Vec<NameX>,
    #[serde(default)]
    pub name1: String,
    #[serde(default)]
    pub name2: String,
    #[serde(default)]
    pub name3: String,
    #[serde(default)]
    pub name4: String,
    #[serde(default)]
    pub name5: String,
    #[serde(default)]
    pub groupnumber: i32,
    /// Printer codes receiving this kitchen's tickets
    #[serde(default)]
    pub printers: Vec<String>,
    /// Product barcodes prepared here
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub zones: Vec<String>,
}

/// POS terminal or tablet registered to the shop
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Device {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(default)]
    #[validate(nested)]
    pub names: Vec<NameX>,
    #[serde(default)]
    pub devicetype: i16,
    #[serde(default)]
    pub printercode: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Staff {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(default)]
    #[validate(nested)]
    pub names: Vec<NameX>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub isdisabled: bool,
}
