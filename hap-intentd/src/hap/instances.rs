use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use shared::types::BridgeInstance;

/// Bridges currently resolved by the mDNS browser, keyed by instance name
#[derive(Clone, Default)]
pub struct InstanceTable {
    inner: Arc<RwLock<HashMap<String, BridgeInstance>>>,
}

impl InstanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a bridge. Returns true if routing data changed.
    pub async fn upsert(&self, instance: BridgeInstance) -> bool {
        let mut table = self.inner.write().await;
        let changed = match table.get(&instance.instance_name) {
            Some(old) => routing_changed(old, &instance),
            None => true,
        };
        table.insert(instance.instance_name.clone(), instance);
        changed
    }

    /// Remove a bridge. Returns true if it was present.
    pub async fn remove(&self, instance_name: &str) -> bool {
        self.inner.write().await.remove(instance_name).is_some()
    }

    /// All bridges, sorted by instance name
    pub async fn all(&self) -> Vec<BridgeInstance> {
        let mut instances: Vec<BridgeInstance> = self.inner.read().await.values().cloned().collect();
        instances.sort_by(|a, b| a.instance_name.cmp(&b.instance_name));
        instances
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Only fields that change where requests go count; `last_seen` moves on every resolve
fn routing_changed(old: &BridgeInstance, new: &BridgeInstance) -> bool {
    old.address != new.address || old.port != new.port || old.username != new.username
}
