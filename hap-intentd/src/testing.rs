//! In-memory bridge network for orchestrator and API tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use serde_json::Value;
use shared::types::{BridgeAccessories, CharacteristicBatch, CharacteristicValue};
use crate::error::BridgeError;
use crate::hap::BridgeClient;
use crate::registry::service::Routing;

#[derive(Default)]
pub(crate) struct FakeBridge {
    bridges: Mutex<Vec<BridgeAccessories>>,
    /// (port, aid, iid) -> live value
    values: Mutex<HashMap<(u16, u64, u64), Value>>,
    failing_ports: Mutex<HashSet<u16>>,
    writes: Mutex<Vec<(Routing, CharacteristicBatch)>>,
    reads: Mutex<Vec<String>>,
    latency: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeBridge {
    pub(crate) fn new(bridges: Vec<BridgeAccessories>) -> Self {
        let fake = Self::default();
        fake.set_bridges(bridges);
        fake
    }

    pub(crate) fn set_bridges(&self, bridges: Vec<BridgeAccessories>) {
        *self.bridges.lock().unwrap() = bridges;
    }

    /// Every read and write to this port fails
    pub(crate) fn fail_port(&self, port: u16) {
        self.failing_ports.lock().unwrap().insert(port);
    }

    pub(crate) fn set_value(&self, port: u16, aid: u64, iid: u64, value: Value) {
        self.values.lock().unwrap().insert((port, aid, iid), value);
    }

    pub(crate) fn writes(&self) -> Vec<(Routing, CharacteristicBatch)> {
        self.writes.lock().unwrap().clone()
    }

    pub(crate) fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    /// Every read and write takes this long to answer
    pub(crate) fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Highest number of reads and writes seen in progress at once
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn round_trip(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn check(&self, routing: &Routing) -> Result<(), BridgeError> {
        if self.failing_ports.lock().unwrap().contains(&routing.port) {
            return Err(BridgeError::Status {
                endpoint: routing.socket_addr().to_string(),
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BridgeClient for FakeBridge {
    async fn enumerate_instances(&self) -> Vec<BridgeAccessories> {
        self.bridges.lock().unwrap().clone()
    }

    async fn read_characteristics(
        &self,
        routing: &Routing,
        ids: &str,
    ) -> Result<Vec<CharacteristicValue>, BridgeError> {
        self.check(routing)?;
        self.round_trip().await;
        self.reads.lock().unwrap().push(ids.to_string());

        let values = self.values.lock().unwrap();
        Ok(ids
            .split(',')
            .filter_map(|pair| {
                let (aid, iid) = pair.split_once('.')?;
                let (aid, iid) = (aid.parse().ok()?, iid.parse().ok()?);
                let value = values.get(&(routing.port, aid, iid))?.clone();
                Some(CharacteristicValue { aid, iid, value })
            })
            .collect())
    }

    async fn write_characteristics(
        &self,
        routing: &Routing,
        payload: &CharacteristicBatch,
    ) -> Result<(), BridgeError> {
        self.check(routing)?;
        self.round_trip().await;

        let mut values = self.values.lock().unwrap();
        for c in &payload.characteristics {
            values.insert((routing.port, c.aid, c.iid), c.value.clone());
        }
        self.writes.lock().unwrap().push((routing.clone(), payload.clone()));
        Ok(())
    }
}
