use std::path::Path;
use serde::Deserialize;
use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub hap: HapConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HapConfig {
    /// Setup code shared by every bridge, e.g. "031-45-154"
    pub pin: String,
    /// Restrict mDNS browsing to one interface
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Quiet period after the last bridge change before refreshing
    #[serde(default = "default_settle")]
    pub settle_secs: u64,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Reported in SYNC responses; defaults to one derived from the hostname
    #[serde(default)]
    pub agent_user_id: Option<String>,
}

fn default_request_timeout() -> u64 {
    5
}

fn default_settle() -> u64 {
    3
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_listen() -> String {
    "[::]:8054".to_string()
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            settle_secs: default_settle(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            agent_user_id: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !is_valid_pin(&self.hap.pin) {
            bail!("hap.pin must look like XXX-XX-XXX, got {:?}", self.hap.pin);
        }
        if self.discovery.refresh_interval_secs == 0 {
            bail!("discovery.refresh_interval_secs must be greater than zero");
        }
        Ok(())
    }
}

fn is_valid_pin(pin: &str) -> bool {
    let groups: Vec<&str> = pin.split('-').collect();
    groups.len() == 3
        && groups
            .iter()
            .zip([3, 2, 3])
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_digit()))
}
