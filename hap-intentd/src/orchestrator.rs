//! Coordinates discovery refresh, SYNC assembly, and the QUERY/EXECUTE paths.
//!
//! Category-specific work goes through the [`TypeRegistry`]; all network I/O
//! goes through the [`BridgeClient`]. Every fault is caught per device.

use std::sync::Arc;
use futures::future::join_all;
use serde_json::{Map, Value};
use shared::intent::{CommandResult, CommandStatus, ExecuteCommand, Execution, QueryState, SyncDevice};
use shared::types::CharacteristicBatch;
use crate::devices::{TypeAdapter, TypeRegistry};
use crate::discovery;
use crate::error::{BridgeError, CommandError};
use crate::hap::BridgeClient;
use crate::registry::service::Service;
use crate::registry::{RegistrySnapshot, ServiceRegistry};

/// Result of one refresh cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub services: usize,
    pub fingerprint: String,
    /// The device set differs from the previous snapshot
    pub changed: bool,
}

pub struct Orchestrator {
    client: Arc<dyn BridgeClient>,
    types: Arc<TypeRegistry>,
    registry: ServiceRegistry,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn BridgeClient>, types: Arc<TypeRegistry>) -> Self {
        Self {
            client,
            types,
            registry: ServiceRegistry::new(),
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Rediscover every service and replace the registry wholesale.
    pub async fn refresh(&self) -> RefreshOutcome {
        let previous = self.registry.snapshot();

        let bridges = self.client.enumerate_instances().await;
        let services = discovery::discover(&bridges, &self.types);
        tracing::info!(
            "Discovered {} services across {} bridges",
            services.len(),
            bridges.len()
        );

        let snapshot = self.registry.rebuild(services);
        if snapshot.is_empty() {
            tracing::warn!("No controllable services found");
        }
        RefreshOutcome {
            services: snapshot.len(),
            fingerprint: snapshot.fingerprint().to_string(),
            changed: snapshot.fingerprint() != previous.fingerprint(),
        }
    }

    /// SYNC: one descriptor per registered service, in registry order.
    /// Built from discovery-time state only, so it never waits on device I/O.
    pub fn build_sync_response(&self) -> Vec<SyncDevice> {
        let snapshot = self.registry.snapshot();
        let mut devices = Vec::with_capacity(snapshot.len());

        for entry in snapshot.iter() {
            let service = entry.discovered();
            match self.types.get(service.category) {
                Some(adapter) => devices.push(adapter.sync(service)),
                None => tracing::warn!("No adapter for {} ({})", service.display_name, service.category),
            }
        }
        devices
    }

    /// SYNC descriptor of a single device, if registered
    pub fn sync_device(&self, id: &str) -> Option<SyncDevice> {
        let entry = self.registry.lookup(id)?;
        let service = entry.discovered();
        Some(self.types.get(service.category)?.sync(service))
    }

    /// QUERY: unknown ids map to `{}`; unreadable devices report offline.
    pub async fn query_devices(&self, ids: &[String]) -> Map<String, Value> {
        let snapshot = self.registry.snapshot();

        let states = join_all(ids.iter().map(|id| self.query_device(&snapshot, id))).await;

        ids.iter()
            .cloned()
            .zip(states.into_iter().map(Value::Object))
            .collect()
    }

    async fn query_device(&self, snapshot: &RegistrySnapshot, id: &str) -> QueryState {
        let Some(entry) = snapshot.lookup(id) else {
            tracing::debug!("Query for unknown device {}", id);
            return QueryState::new();
        };

        let mut service = entry.lock().await;
        let Some(adapter) = self.types.get(service.category) else {
            return offline_state();
        };

        match self.read_status(&mut service).await {
            Ok(()) => adapter.query(&service),
            Err(e) => {
                tracing::warn!("Failed to read status of {}: {}", service.display_name, e);
                offline_state()
            }
        }
    }

    /// Refresh a service's characteristic values with one batched read.
    pub async fn read_status(&self, service: &mut Service) -> Result<(), BridgeError> {
        if service.characteristics.is_empty() {
            return Ok(());
        }

        let values = self
            .client
            .read_characteristics(&service.routing, &service.status_ids())
            .await?;
        service.apply_values(&values);
        Ok(())
    }

    /// EXECUTE: one result per known target device, in input order.
    /// Unknown ids produce no entry.
    pub async fn execute_commands(&self, commands: &[ExecuteCommand]) -> Vec<CommandResult> {
        let snapshot = self.registry.snapshot();

        let units = commands.iter().flat_map(|command| {
            command
                .devices
                .iter()
                .map(move |device| (device.id.as_str(), command.execution.as_slice()))
        });

        join_all(units.map(|(id, execution)| self.execute_device(&snapshot, id, execution)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn execute_device(
        &self,
        snapshot: &RegistrySnapshot,
        id: &str,
        execution: &[Execution],
    ) -> Option<CommandResult> {
        let Some(entry) = snapshot.lookup(id) else {
            tracing::debug!("Execute for unknown device {}", id);
            return None;
        };

        let service = entry.lock().await;
        let result = match self.types.get(service.category) {
            Some(adapter) => build_payload(adapter, &service, execution),
            None => Err(CommandError::Unsupported {
                category: service.category,
                command: execution.first().map(|e| e.command.clone()).unwrap_or_default(),
            }),
        };

        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Cannot execute on {}: {}", service.display_name, e);
                return Some(command_result(id, Err(e.error_code())));
            }
        };

        // Success means the bridge accepted the write; state is not read back.
        match self.client.write_characteristics(&service.routing, &payload).await {
            Ok(()) => Some(command_result(id, Ok(()))),
            Err(e) => {
                tracing::error!(
                    "Failed to control {}. Make sure all your bridges use the same PIN.",
                    service.display_name
                );
                tracing::error!("{}", e);
                Some(command_result(id, Err("deviceOffline")))
            }
        }
    }
}

/// Merge every execution step of a command into a single write
fn build_payload(
    adapter: &dyn TypeAdapter,
    service: &Service,
    execution: &[Execution],
) -> Result<CharacteristicBatch, CommandError> {
    if execution.is_empty() {
        return Err(CommandError::Empty);
    }

    let mut payload = CharacteristicBatch::default();
    for step in execution {
        payload
            .characteristics
            .extend(adapter.execute(service, step)?.characteristics);
    }
    Ok(payload)
}

fn command_result(id: &str, outcome: Result<(), &str>) -> CommandResult {
    match outcome {
        Ok(()) => CommandResult {
            ids: vec![id.to_string()],
            status: CommandStatus::Success,
            error_code: None,
        },
        Err(code) => CommandResult {
            ids: vec![id.to_string()],
            status: CommandStatus::Error,
            error_code: Some(code.to_string()),
        },
    }
}

fn offline_state() -> QueryState {
    let mut state = QueryState::new();
    state.insert("online".into(), Value::Bool(false));
    state.insert("status".into(), Value::from("ERROR"));
    state.insert("errorCode".into(), Value::from("deviceOffline"));
    state
}
