//! Identity derivation and the in-memory service registry.
//!
//! The registry is an immutable snapshot published through a watch channel;
//! a refresh builds a whole new snapshot and swaps it in.

pub mod identity;
pub mod service;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex, MutexGuard};
use self::service::Service;

/// One registered service.
///
/// `discovered` is frozen at refresh time and backs SYNC. Status reads and
/// writes go through `live`, whose mutex serializes operations on the service.
#[derive(Debug)]
pub struct RegistryEntry {
    discovered: Service,
    live: Mutex<Service>,
}

impl RegistryEntry {
    fn new(service: Service) -> Self {
        Self {
            discovered: service.clone(),
            live: Mutex::new(service),
        }
    }

    pub fn discovered(&self) -> &Service {
        &self.discovered
    }

    pub async fn lock(&self) -> MutexGuard<'_, Service> {
        self.live.lock().await
    }
}

pub type SharedService = Arc<RegistryEntry>;

/// One complete generation of discovered services
#[derive(Debug)]
pub struct RegistrySnapshot {
    order: Vec<String>,
    services: HashMap<String, SharedService>,
    fingerprint: String,
    built_at: DateTime<Utc>,
}

impl RegistrySnapshot {
    /// Build a snapshot keyed by identity. Services without an identity are
    /// dropped; a repeated identity keeps its first occurrence.
    pub fn build(services: Vec<Service>) -> Self {
        let mut kept = Vec::with_capacity(services.len());
        let mut seen = HashSet::new();
        for service in services {
            if service.identity.is_empty() {
                tracing::warn!("Dropping service {} without identity", service.display_name);
                continue;
            }
            if !seen.insert(service.identity.clone()) {
                tracing::warn!(
                    "Duplicate identity {} for {}, keeping first",
                    service.identity,
                    service.display_name
                );
                continue;
            }
            kept.push(service);
        }

        let fingerprint = identity::compute_fingerprint(&kept);
        let order = kept.iter().map(|s| s.identity.clone()).collect();
        let services = kept
            .into_iter()
            .map(|s| (s.identity.clone(), Arc::new(RegistryEntry::new(s))))
            .collect();

        Self {
            order,
            services,
            fingerprint,
            built_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::build(Vec::new())
    }

    pub fn lookup(&self, identity: &str) -> Option<SharedService> {
        self.services.get(identity).cloned()
    }

    /// Services in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &SharedService> + '_ {
        self.order.iter().filter_map(|id| self.services.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Handle to the current registry snapshot
#[derive(Clone)]
pub struct ServiceRegistry {
    tx: Arc<watch::Sender<Arc<RegistrySnapshot>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(RegistrySnapshot::empty()));
        Self { tx: Arc::new(tx) }
    }

    /// Replace the entire contents. Readers holding the previous snapshot keep
    /// seeing it unchanged.
    pub fn rebuild(&self, services: Vec<Service>) -> Arc<RegistrySnapshot> {
        let snapshot = Arc::new(RegistrySnapshot::build(services));
        self.tx.send_replace(snapshot.clone());
        snapshot
    }

    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.tx.borrow().clone()
    }

    pub fn lookup(&self, identity: &str) -> Option<SharedService> {
        self.snapshot().lookup(identity)
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::service::tests::switch_service;

    fn generation(count: usize, gen: usize) -> Vec<Service> {
        (0..count)
            .map(|i| {
                let mut s = switch_service();
                s.identity = format!("svc-{}", i);
                s.display_name = format!("gen-{}", gen);
                s
            })
            .collect()
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let registry = ServiceRegistry::new();
        registry.rebuild(generation(3, 0));
        assert_eq!(registry.snapshot().len(), 3);

        let mut next = generation(1, 1);
        next[0].identity = "other".into();
        registry.rebuild(next);

        assert!(registry.lookup("svc-0").is_none());
        assert!(registry.lookup("other").is_some());
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_duplicate_identity_keeps_first() {
        let mut services = generation(2, 0);
        services[1].identity = "svc-0".into();
        services[1].display_name = "second".into();

        let snapshot = RegistrySnapshot::build(services);
        assert_eq!(snapshot.len(), 1);
        let kept = snapshot.lookup("svc-0").unwrap();
        assert_eq!(kept.discovered().display_name, "gen-0");
    }

    #[test]
    fn test_iteration_follows_discovery_order() {
        let snapshot = RegistrySnapshot::build(generation(5, 0));
        let ids: Vec<String> = snapshot
            .iter()
            .map(|s| s.discovered().identity.clone())
            .collect();
        assert_eq!(ids, vec!["svc-0", "svc-1", "svc-2", "svc-3", "svc-4"]);
    }

    #[tokio::test]
    async fn test_live_updates_leave_discovered_copy_alone() {
        let snapshot = RegistrySnapshot::build(generation(1, 0));
        let entry = snapshot.lookup("svc-0").unwrap();

        entry.lock().await.characteristics[1].value = Some(serde_json::Value::Bool(true));

        assert_eq!(entry.lock().await.value_bool(shared::protocol::characteristic::ON), Some(true));
        assert_eq!(entry.discovered().characteristics[1].value, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_mixed_generations() {
        let registry = ServiceRegistry::new();
        registry.rebuild(generation(50, 0));

        let writer = {
            let registry = registry.clone();
            tokio::spawn(async move {
                for gen in 1..200 {
                    registry.rebuild(generation(50, gen));
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let snapshot = registry.snapshot();
                        let mut names = HashSet::new();
                        for service in snapshot.iter() {
                            names.insert(service.lock().await.display_name.clone());
                            tokio::task::yield_now().await;
                        }
                        assert_eq!(snapshot.len(), 50);
                        assert_eq!(names.len(), 1, "mixed generations: {:?}", names);
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
