//! Shop (tenant) records and memberships

use super::common::NameX;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Shop-user roles, lowest to highest
pub const ROLE_USER: i16 = 0;
pub const ROLE_ADMIN: i16 = 1;
pub const ROLE_OWNER: i16 = 2;

/// Stored in the `shops` collection with `guidfixed == shopid`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Shop {
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub name1: String,
    #[serde(default)]
    #[validate(nested)]
    pub names: Vec<NameX>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub telephone: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub branchcode: String,
}

/// Membership of a user in a shop
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ShopUser {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 2))]
    pub role: i16,
    #[serde(default)]
    pub isfavorite: bool,
}

/// New shop plus the owner account that signs in to it
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterShopRequest {
    #[validate(nested)]
    pub shop: Shop,
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

/// One shop the caller belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopMembership {
    pub shopid: String,
    pub name: String,
    pub role: i16,
    pub isfavorite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_requires_name() {
        assert!(Shop::default().validate().is_err());
        let shop = Shop {
            name1: "Coffee".into(),
            ..Default::default()
        };
        assert!(shop.validate().is_ok());
    }

    #[test]
    fn test_role_out_of_range() {
        let user = ShopUser {
            username: "u1".into(),
            role: 3,
            isfavorite: false,
        };
        assert!(user.validate().is_err());
    }
}
