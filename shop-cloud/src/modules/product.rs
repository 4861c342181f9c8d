use shared::models::{NameX, OrderType, ProductCategory};

use crate::services::MasterModule;

pub struct ProductCategoryModule;

impl MasterModule for ProductCategoryModule {
    type Model = ProductCategory;

    const MODULE_NAME: &'static str = "productcategory";
    const COLLECTION: &'static str = "productcategory";
    const ROUTE: &'static str = "/product/category";
    const SEARCH_FIELDS: &'static [&'static str] = &["code", "names.name"];

    fn identity(model: &ProductCategory) -> String {
        model.code.clone()
    }

    fn names_mut(model: &mut ProductCategory) -> Option<&mut Vec<NameX>> {
        Some(&mut model.names)
    }
}

pub struct OrderTypeModule;

impl MasterModule for OrderTypeModule {
    type Model = OrderType;

    const MODULE_NAME: &'static str = "ordertype";
    const COLLECTION: &'static str = "ordertype";
    const ROUTE: &'static str = "/product/ordertype";
    const SEARCH_FIELDS: &'static [&'static str] = &["code", "names.name"];

    fn identity(model: &OrderType) -> String {
        model.code.clone()
    }

    fn names_mut(model: &mut OrderType) -> Option<&mut Vec<NameX>> {
        Some(&mut model.names)
    }
}
