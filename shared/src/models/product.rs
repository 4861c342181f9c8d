//! Product-side master data

use super::common::NameX;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProductCategory {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(default)]
    #[validate(nested)]
    pub names: Vec<NameX>,
    /// GuidFixed of the parent category, empty for roots
    #[serde(default)]
    pub parentguid: String,
    #[serde(default)]
    pub imageuri: String,
    #[serde(default)]
    pub xsort: i32,
}

/// Dine-in, take-away, delivery and similar sale channels with their own pricing
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrderType {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(default)]
    #[validate(nested)]
    pub names: Vec<NameX>,
    #[serde(default)]
    pub isdefault: bool,
    #[serde(default)]
    pub usepricelevel: bool,
    #[serde(default)]
    pub pricelevel: i16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_validation() {
        assert!(ProductCategory::default().validate().is_err());
        let cat = ProductCategory {
            code: "DRINK".into(),
            ..Default::default()
        };
        assert!(cat.validate().is_ok());
    }
}
