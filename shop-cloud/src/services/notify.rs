//! Post-write side effects: master-sync touch and event publishing

use std::sync::Arc;

use serde::Serialize;
use shared::util::now_millis;

use crate::cache::MasterSyncCacheRepository;
use crate::mq::{MessageQueue, MqAction, MqError};

#[derive(Clone)]
pub struct ChangeNotifier {
    master_sync: MasterSyncCacheRepository,
    mq: Arc<dyn MessageQueue>,
}

impl ChangeNotifier {
    pub fn new(master_sync: MasterSyncCacheRepository, mq: Arc<dyn MessageQueue>) -> Self {
        Self { master_sync, mq }
    }

    pub fn master_sync(&self) -> &MasterSyncCacheRepository {
        &self.master_sync
    }

    /// Stamp the module's last-write time; failures are logged, never returned
    pub async fn touch(&self, shop_id: &str, module: &str) {
        if let Err(e) = self.master_sync.save(shop_id, module, now_millis()).await {
            tracing::warn!(shop_id = %shop_id, module = %module, error = %e, "Failed to update master sync cache");
        }
    }

    /// Publish on a background task; failures are logged
    pub fn publish<P: Serialize + ?Sized>(
        &self,
        module: &str,
        action: MqAction,
        shop_id: &str,
        payload: &P,
    ) {
        let topic = action.topic(module);
        let payload = match serde_json::to_value(payload).map_err(MqError::from) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(topic = %topic, error = %e, "Failed to encode message");
                return;
            }
        };
        let mq = self.mq.clone();
        let key = shop_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = mq.publish(&topic, &key, payload).await {
                tracing::error!(topic = %topic, error = %e, "Failed to publish message");
            }
        });
    }
}
