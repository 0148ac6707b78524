use std::time::Duration;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::StatusCode;
use shared::types::{AccessoryDatabase, BridgeAccessories, BridgeInstance, CharacteristicBatch, CharacteristicValue};
use crate::error::BridgeError;
use crate::registry::service::Routing;
use super::instances::InstanceTable;

/// Network access to HAP bridges
#[async_trait]
pub trait BridgeClient: Send + Sync {
    /// Fetch the accessory database of every known bridge. Bridges that fail to
    /// answer are logged and left out.
    async fn enumerate_instances(&self) -> Vec<BridgeAccessories>;

    /// Read characteristics by `aid.iid` list, e.g. `2.9,2.10`
    async fn read_characteristics(
        &self,
        routing: &Routing,
        ids: &str,
    ) -> Result<Vec<CharacteristicValue>, BridgeError>;

    async fn write_characteristics(
        &self,
        routing: &Routing,
        payload: &CharacteristicBatch,
    ) -> Result<(), BridgeError>;
}

/// HTTP client for bridges running in insecure mode, authenticated by PIN
pub struct HapClient {
    http: reqwest::Client,
    pin: String,
    instances: InstanceTable,
}

impl HapClient {
    pub fn new(pin: &str, timeout: Duration, instances: InstanceTable) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            pin: pin.to_string(),
            instances,
        })
    }

    async fn fetch_accessories(&self, instance: &BridgeInstance) -> Result<AccessoryDatabase, BridgeError> {
        let endpoint = format!(
            "http://{}/accessories",
            std::net::SocketAddr::new(instance.address, instance.port)
        );

        let response = self
            .http
            .get(&endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.pin)
            .send()
            .await
            .map_err(|source| BridgeError::Transport { endpoint: endpoint.clone(), source })?;

        check_status(&endpoint, response.status())?;

        response
            .json::<AccessoryDatabase>()
            .await
            .map_err(|e| BridgeError::Protocol { endpoint, reason: e.to_string() })
    }
}

fn check_status(endpoint: &str, status: StatusCode) -> Result<(), BridgeError> {
    // 207 Multi-Status carries per-characteristic results and is still a success
    if status.is_success() {
        Ok(())
    } else {
        Err(BridgeError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl BridgeClient for HapClient {
    async fn enumerate_instances(&self) -> Vec<BridgeAccessories> {
        let instances = self.instances.all().await;

        let fetched = join_all(instances.iter().map(|i| self.fetch_accessories(i))).await;

        instances
            .into_iter()
            .zip(fetched)
            .filter_map(|(instance, result)| match result {
                Ok(db) => Some(BridgeAccessories {
                    instance,
                    accessories: db.accessories,
                }),
                Err(e) => {
                    tracing::error!(
                        "Failed to load accessories from {}: {}. Make sure all your bridges use the same PIN.",
                        instance.instance_name,
                        e
                    );
                    None
                }
            })
            .collect()
    }

    async fn read_characteristics(
        &self,
        routing: &Routing,
        ids: &str,
    ) -> Result<Vec<CharacteristicValue>, BridgeError> {
        let endpoint = format!("http://{}/characteristics?id={}", routing.socket_addr(), ids);

        let response = self
            .http
            .get(&endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.pin)
            .send()
            .await
            .map_err(|source| BridgeError::Transport { endpoint: endpoint.clone(), source })?;

        check_status(&endpoint, response.status())?;

        let batch = response
            .json::<CharacteristicBatch>()
            .await
            .map_err(|e| BridgeError::Protocol { endpoint, reason: e.to_string() })?;

        Ok(batch.characteristics)
    }

    async fn write_characteristics(
        &self,
        routing: &Routing,
        payload: &CharacteristicBatch,
    ) -> Result<(), BridgeError> {
        let endpoint = format!("http://{}/characteristics", routing.socket_addr());

        let response = self
            .http
            .put(&endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.pin)
            .json(payload)
            .send()
            .await
            .map_err(|source| BridgeError::Transport { endpoint: endpoint.clone(), source })?;

        check_status(&endpoint, response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_status_is_success() {
        assert!(check_status("x", StatusCode::NO_CONTENT).is_ok());
        assert!(check_status("x", StatusCode::MULTI_STATUS).is_ok());

        let err = check_status("http://10.0.0.2:51826/characteristics", StatusCode::UNAUTHORIZED)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "http://10.0.0.2:51826/characteristics responded with HTTP 401"
        );
    }

    #[tokio::test]
    async fn test_enumerate_with_no_bridges() {
        let client = HapClient::new("031-45-154", Duration::from_secs(1), InstanceTable::new()).unwrap();
        assert!(client.enumerate_instances().await.is_empty());
    }
}
