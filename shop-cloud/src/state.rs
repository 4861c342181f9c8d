//! Application state for shop-cloud

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::cache::{Cacher, MasterSyncCacheRepository, MemoryCache};
use crate::config::Config;
use crate::modules::employee::EmployeeModule;
use crate::modules::payment::{BankMasterModule, BookBankModule, QrPaymentModule};
use crate::modules::product::{OrderTypeModule, ProductCategoryModule};
use crate::modules::restaurant::{
    DeviceModule, KitchenModule, PrinterModule, StaffModule, TableModule, ZoneModule,
};
use crate::modules::transaction::{
    Paid, Purchase, PurchaseOrder, PurchaseReturn, SaleInvoice, SaleInvoiceReturn,
    StockAdjustment, StockPickupProduct, StockTransfer,
};
use crate::mq::{BroadcastQueue, MessageQueue, NoopQueue};
use crate::services::{
    ActivityModuleManager, ChangeNotifier, DocNoGenerator, MasterModule, MasterService,
    MasterSyncService, ShopService, TransactionModule, TransactionService,
};

/// One service per business module
pub struct Services {
    pub bank_master: Arc<MasterService<BankMasterModule>>,
    pub book_bank: Arc<MasterService<BookBankModule>>,
    pub qr_payment: Arc<MasterService<QrPaymentModule>>,
    pub zone: Arc<MasterService<ZoneModule>>,
    pub table: Arc<MasterService<TableModule>>,
    pub printer: Arc<MasterService<PrinterModule>>,
    pub kitchen: Arc<MasterService<KitchenModule>>,
    pub device: Arc<MasterService<DeviceModule>>,
    pub staff: Arc<MasterService<StaffModule>>,
    pub employee: Arc<MasterService<EmployeeModule>>,
    pub product_category: Arc<MasterService<ProductCategoryModule>>,
    pub order_type: Arc<MasterService<OrderTypeModule>>,

    pub sale_invoice: Arc<TransactionService<SaleInvoice>>,
    pub sale_invoice_return: Arc<TransactionService<SaleInvoiceReturn>>,
    pub purchase: Arc<TransactionService<Purchase>>,
    pub purchase_return: Arc<TransactionService<PurchaseReturn>>,
    pub stock_adjustment: Arc<TransactionService<StockAdjustment>>,
    pub stock_transfer: Arc<TransactionService<StockTransfer>>,
    pub stock_pickup_product: Arc<TransactionService<StockPickupProduct>>,
    pub purchase_order: Arc<TransactionService<PurchaseOrder>>,
    pub paid: Arc<TransactionService<Paid>>,

    pub shop: Arc<ShopService>,
}

/// Builds services and registers each one as an activity module
struct Registrar {
    pool: SqlitePool,
    notifier: ChangeNotifier,
    doc_no: Arc<DocNoGenerator>,
    manager: ActivityModuleManager,
}

impl Registrar {
    fn master<M: MasterModule>(&mut self) -> Arc<MasterService<M>> {
        let svc = Arc::new(MasterService::new(self.pool.clone(), self.notifier.clone()));
        self.manager.add(svc.clone());
        svc
    }

    fn transaction<M: TransactionModule>(&mut self) -> Arc<TransactionService<M>> {
        let svc = Arc::new(TransactionService::new(
            self.pool.clone(),
            self.notifier.clone(),
            self.doc_no.clone(),
        ));
        self.manager.add(svc.clone());
        svc
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    /// JWT secret for shop user authentication
    pub jwt_secret: String,
    pub cache: Arc<dyn Cacher>,
    pub mq: Arc<dyn MessageQueue>,
    /// Set when `mq` is the in-process broadcast queue, for local subscribers
    pub events: Option<BroadcastQueue>,
    pub services: Arc<Services>,
    pub master_sync: MasterSyncService,
}

impl AppState {
    /// In-memory cache; broadcast queue when `MQ_ENABLED`, no-op otherwise
    pub fn new(config: &Config, pool: SqlitePool) -> Self {
        let events = config
            .mq_enabled
            .then(|| BroadcastQueue::new(config.mq_channel_capacity));
        let mq: Arc<dyn MessageQueue> = match &events {
            Some(queue) => Arc::new(queue.clone()),
            None => Arc::new(NoopQueue),
        };
        Self {
            events,
            ..Self::with_parts(config, pool, Arc::new(MemoryCache::new()), mq)
        }
    }

    pub fn with_parts(
        config: &Config,
        pool: SqlitePool,
        cache: Arc<dyn Cacher>,
        mq: Arc<dyn MessageQueue>,
    ) -> Self {
        let sync_cache = MasterSyncCacheRepository::new(cache.clone());
        let mut reg = Registrar {
            pool: pool.clone(),
            notifier: ChangeNotifier::new(sync_cache.clone(), mq.clone()),
            doc_no: Arc::new(DocNoGenerator::new(cache.clone(), config.doc_no_cache_ttl)),
            manager: ActivityModuleManager::new(),
        };

        // registration order is the master-sync order
        let bank_master = reg.master();
        let book_bank = reg.master();
        let qr_payment = reg.master();
        let zone = reg.master();
        let table = reg.master();
        let printer = reg.master();
        let kitchen = reg.master();
        let device = reg.master();
        let staff = reg.master();
        let employee = reg.master();
        let services = Services {
            shop: Arc::new(ShopService::new(pool.clone(), Arc::clone(&employee))),
            bank_master,
            book_bank,
            qr_payment,
            zone,
            table,
            printer,
            kitchen,
            device,
            staff,
            employee,
            product_category: reg.master(),
            order_type: reg.master(),
            sale_invoice: reg.transaction(),
            sale_invoice_return: reg.transaction(),
            purchase: reg.transaction(),
            purchase_return: reg.transaction(),
            stock_adjustment: reg.transaction(),
            stock_transfer: reg.transaction(),
            stock_pickup_product: reg.transaction(),
            purchase_order: reg.transaction(),
            paid: reg.transaction(),
        };
        tracing::info!(modules = ?reg.manager.names(), "Activity modules registered");

        Self {
            pool,
            config: Arc::new(config.clone()),
            jwt_secret: config.jwt_secret.clone(),
            cache,
            mq,
            events: None,
            services: Arc::new(services),
            master_sync: MasterSyncService::new(Arc::new(reg.manager), sync_cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_every_module_registered_once() {
        let db = DbService::in_memory().await.unwrap();
        let state = AppState::new(&Config::default(), db.pool);
        let names = state.master_sync.manager().names();
        assert_eq!(names.len(), 21);
        assert_eq!(names[0], "bankmaster");
        assert_eq!(names[20], "paid");

        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[tokio::test]
    async fn test_events_follow_mq_enabled() {
        let db = DbService::in_memory().await.unwrap();
        let disabled = Config {
            mq_enabled: false,
            ..Config::default()
        };
        assert!(AppState::new(&disabled, db.pool.clone()).events.is_none());

        let enabled = Config {
            mq_enabled: true,
            ..Config::default()
        };
        let state = AppState::new(&enabled, db.pool);
        let mut rx = state.events.as_ref().unwrap().subscribe();
        state
            .mq
            .publish("bankmaster.created", "s1", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().topic, "bankmaster.created");
    }
}
