//! Sale, purchase and stock transaction kinds

use crate::services::TransactionModule;

macro_rules! transaction_module {
    ($module:ident, $name:literal, $route:literal, $prefix:literal, $flag:literal $(, client_doc_no = $client:literal)?) => {
        pub struct $module;

        impl TransactionModule for $module {
            const MODULE_NAME: &'static str = $name;
            const COLLECTION: &'static str = $name;
            const ROUTE: &'static str = $route;
            const DOC_PREFIX: &'static str = $prefix;
            const TRANS_FLAG: i32 = $flag;
            $(const ALLOW_CLIENT_DOC_NO: bool = $client;)?
        }
    };
}

transaction_module!(SaleInvoice, "saleinvoice", "/transaction/sale-invoice", "SI", 44, client_doc_no = true);
transaction_module!(SaleInvoiceReturn, "saleinvoicereturn", "/transaction/sale-invoice-return", "ST", 48);
transaction_module!(Purchase, "purchase", "/transaction/purchase", "PU", 12);
transaction_module!(PurchaseReturn, "purchasereturn", "/transaction/purchase-return", "PT", 16);
transaction_module!(StockAdjustment, "stockadjustment", "/transaction/stock-adjustment", "AJ", 66);
transaction_module!(StockTransfer, "stocktransfer", "/transaction/stock-transfer", "TF", 72);
transaction_module!(StockPickupProduct, "stockpickupproduct", "/transaction/stock-pickup-product", "IM", 56);
transaction_module!(PurchaseOrder, "purchaseorder", "/transaction/purchase-order", "PO", 6);
transaction_module!(Paid, "paid", "/transaction/paid", "EE", 239);

/// Every transaction collection, in transfer order
pub const TRANSACTION_COLLECTIONS: &[&str] = &[
    SaleInvoice::COLLECTION,
    SaleInvoiceReturn::COLLECTION,
    Purchase::COLLECTION,
    PurchaseReturn::COLLECTION,
    StockAdjustment::COLLECTION,
    StockTransfer::COLLECTION,
    StockPickupProduct::COLLECTION,
    PurchaseOrder::COLLECTION,
    Paid::COLLECTION,
];
