use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use dap_store::{
    AvailabilityConfig, AvailabilityStore, ObjectStoreBackend, ObjectStoreConfig, Router, Store,
};

use crate::error::{ServerError, ServerResult};

/// Full proxy configuration, as read from a TOML file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub server: ServerConfig,
    pub object_store: Option<ObjectStoreConfig>,
    pub availability: Option<AvailabilityConfig>,
    pub metrics: MetricsConfig,
}

impl ProxyConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.object_store.is_none() && self.availability.is_none() {
            return Err(ServerError::Config(
                "at least one of [object_store] or [availability] must be configured".into(),
            ));
        }
        if let Some(object) = &self.object_store {
            object.validate()?;
        }
        if self.server.write_timeout_secs < self.server.read_header_timeout_secs {
            return Err(ServerError::Config(
                "write_timeout_secs must not be shorter than read_header_timeout_secs".into(),
            ));
        }
        Ok(())
    }

    /// Construct the backends and the router that fronts them.
    pub fn build_storage(&self) -> ServerResult<Router> {
        self.validate()?;
        let availability = self
            .availability
            .as_ref()
            .map(|cfg| Arc::new(AvailabilityStore::from_config(cfg)) as Arc<dyn Store>);
        let object = self
            .object_store
            .as_ref()
            .map(|cfg| ObjectStoreBackend::new(cfg).map(|s| Arc::new(s) as Arc<dyn Store>))
            .transpose()?;
        let backup = self.object_store.as_ref().is_some_and(|cfg| cfg.backup);
        Ok(Router::new(availability, object, backup))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub read_header_timeout_secs: u64,
    /// Deadline for a whole request, body transfer and backend calls included.
    pub write_timeout_secs: u64,
    /// How long shutdown waits for in-flight requests to finish.
    pub shutdown_timeout_secs: u64,
    pub max_blob_size: usize,
}

impl ServerConfig {
    pub fn read_header_timeout(&self) -> Duration {
        Duration::from_secs(self.read_header_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3100)),
            read_header_timeout_secs: 10,
            // aligned with blob finalization times on the availability network
            write_timeout_secs: 40 * 60,
            shutdown_timeout_secs: 5,
            max_blob_size: 16 * 1024 * 1024,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub bind_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7300)),
        }
    }
}
