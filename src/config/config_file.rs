//! Connection configuration from YAML files
//!
//! Example:
//!
//! ```yaml
//! cluster_mode: true
//! addresses:
//!   - "cache-0001.example.com:6379"
//!   - { host: "cache-0002.example.com", port: 6380 }
//! use_tls: true
//! tls:
//!   root_cert_file: /etc/ssl/ca.pem
//! credentials:
//!   username: app
//!   iam:
//!     cluster_name: my-cluster
//!     service: elasticache
//!     region: us-east-1
//! read_from: az_affinity
//! client_az: us-east-1a
//! request_timeout_ms: 500
//! reconnect_strategy: { num_of_retries: 5, factor: 100, exponent_base: 2 }
//! compression: { backend: zstd, min_compression_size: 128 }
//! protocol: resp3
//! inflight_requests_limit: 500
//! periodic_checks: 30
//! ```
//!
//! Sections are lowered through the same builder API as programmatic
//! configuration, so every invariant is checked by the same translation path.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::address::NodeAddress;
use super::backoff::BackoffStrategy;
use super::client_config::{
    ClientConfiguration, ClientConfigurationExt, ClusterClientConfiguration, ConnectionConfig,
    PeriodicChecks, ProtocolVersion, ReadFrom,
};
use super::compression::{CompressionBackend, CompressionConfiguration};
use super::credentials::{IamAuthConfig, ServerCredentials, ServiceType};
use super::tls_config::{load_root_certificates_from_file, TlsConfiguration};
use crate::utils::{signed_millis_to_duration, GlideConfigError, Result};

/// Address given either as "host[:port]" or as a map
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AddressEntry {
    Text(String),
    Node(NodeAddress),
}

impl AddressEntry {
    fn to_node_address(&self) -> Result<NodeAddress> {
        match self {
            AddressEntry::Text(s) => Ok(NodeAddress::parse_with_default_port(s, 0)?),
            AddressEntry::Node(node) => Ok(node.clone()),
        }
    }
}

/// Periodic checks given as "enabled", "disabled" or an interval in seconds
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PeriodicChecksEntry {
    Seconds(u32),
    Text(String),
}

impl From<PeriodicChecks> for PeriodicChecksEntry {
    fn from(checks: PeriodicChecks) -> Self {
        match checks {
            PeriodicChecks::ManualInterval(secs) => PeriodicChecksEntry::Seconds(secs),
            PeriodicChecks::EnabledDefault => PeriodicChecksEntry::Text("enabled".to_string()),
            PeriodicChecks::Disabled => PeriodicChecksEntry::Text("disabled".to_string()),
        }
    }
}

impl PeriodicChecksEntry {
    fn to_periodic_checks(&self) -> Result<PeriodicChecks> {
        match self {
            PeriodicChecksEntry::Seconds(secs) => Ok(PeriodicChecks::ManualInterval(*secs)),
            PeriodicChecksEntry::Text(s) => Ok(s.parse()?),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsSection {
    /// PEM file with trusted roots
    pub root_cert_file: Option<PathBuf>,
    /// Inline PEM; an empty string is rejected at translation
    pub root_certificates: Option<String>,
    #[serde(default)]
    pub insecure: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IamSection {
    pub cluster_name: String,
    #[serde(default)]
    pub service: ServiceType,
    pub region: String,
    pub refresh_interval_seconds: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsSection {
    pub username: Option<String>,
    pub password: Option<String>,
    pub iam: Option<IamSection>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompressionSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub backend: CompressionBackend,
    pub level: Option<i32>,
    pub min_compression_size: Option<usize>,
}

/// Connection settings as written in a config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub cluster_mode: bool,
    #[serde(default)]
    pub addresses: Vec<AddressEntry>,
    #[serde(default)]
    pub use_tls: bool,
    pub tls: Option<TlsSection>,
    pub credentials: Option<CredentialsSection>,
    #[serde(default)]
    pub read_from: ReadFrom,
    pub client_az: Option<String>,
    pub client_name: Option<String>,
    pub request_timeout_ms: Option<i64>,
    pub connection_timeout_ms: Option<i64>,
    pub database_id: Option<i64>,
    #[serde(default)]
    pub lazy_connect: bool,
    pub tcp_nodelay: Option<bool>,
    pub reconnect_strategy: Option<BackoffStrategy>,
    pub compression: Option<CompressionSection>,
    #[serde(default)]
    pub refresh_topology_from_initial_nodes: bool,
    #[serde(default)]
    pub protocol: ProtocolVersion,
    pub inflight_requests_limit: Option<u32>,
    /// Cluster mode only
    pub periodic_checks: Option<PeriodicChecksEntry>,
}

impl ConfigFile {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Loading connection configuration from {:?}", path.as_ref());
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| GlideConfigError::ConfigFile(e.to_string()))
    }

    fn credentials(&self) -> Result<Option<ServerCredentials>> {
        let Some(ref section) = self.credentials else {
            return Ok(None);
        };

        match (&section.password, &section.iam) {
            (Some(_), Some(_)) => Err(GlideConfigError::ConfigFile(
                "credentials: password and iam are mutually exclusive".to_string(),
            )),
            (Some(password), None) => Ok(Some(match section.username {
                Some(ref username) => ServerCredentials::new(username.clone(), password.clone()),
                None => ServerCredentials::with_default_username(password.clone()),
            })),
            (None, Some(iam)) => {
                let mut iam_config =
                    IamAuthConfig::new(iam.cluster_name.clone(), iam.service, iam.region.clone());
                if let Some(seconds) = iam.refresh_interval_seconds {
                    iam_config = iam_config.with_refresh_interval_seconds(seconds);
                }
                let username = section.username.clone().unwrap_or_default();
                Ok(Some(ServerCredentials::with_iam(username, Some(iam_config))?))
            }
            (None, None) => Err(GlideConfigError::ConfigFile(
                "credentials: either password or iam must be set".to_string(),
            )),
        }
    }

    fn tls_configuration(&self) -> Result<Option<TlsConfiguration>> {
        let Some(ref section) = self.tls else {
            return Ok(None);
        };

        let mut tls = TlsConfiguration::new().with_insecure_tls(section.insecure);
        match (&section.root_cert_file, &section.root_certificates) {
            (Some(_), Some(_)) => {
                return Err(GlideConfigError::ConfigFile(
                    "tls: root_cert_file and root_certificates are mutually exclusive".to_string(),
                ))
            }
            (Some(path), None) => {
                tls = tls.with_root_certificates(load_root_certificates_from_file(path)?);
            }
            (None, Some(pem)) => {
                tls = tls.with_root_certificates(pem.as_bytes().to_vec());
            }
            (None, None) => {}
        }
        Ok(Some(tls))
    }

    /// Lower into a builder configuration
    ///
    /// Construction errors (credentials, addresses, signed timeouts) surface
    /// here; cross-field validation happens at translation.
    pub fn into_connection_config(self) -> Result<ConnectionConfig> {
        let mut config = if self.cluster_mode {
            let mut cluster = ClusterClientConfiguration::new()
                .with_refresh_topology_from_initial_nodes(self.refresh_topology_from_initial_nodes);
            if let Some(ref entry) = self.periodic_checks {
                cluster = cluster.with_periodic_checks(entry.to_periodic_checks()?);
            }
            ConnectionConfig::Cluster(cluster)
        } else {
            if self.periodic_checks.is_some() {
                return Err(GlideConfigError::ConfigFile(
                    "periodic_checks requires cluster_mode".to_string(),
                ));
            }
            ConnectionConfig::Standalone(ClientConfiguration::new())
        };

        for entry in &self.addresses {
            config = config.with_address(entry.to_node_address()?);
        }

        config = config
            .with_use_tls(self.use_tls)
            .with_read_from(self.read_from)
            .with_lazy_connect(self.lazy_connect)
            .with_protocol(self.protocol);

        if let Some(limit) = self.inflight_requests_limit {
            config = config.with_inflight_requests_limit(limit);
        }

        if let Some(credentials) = self.credentials()? {
            config = config.with_credentials(credentials);
        }
        if let Some(tls) = self.tls_configuration()? {
            config = config.with_tls_configuration(tls);
        }
        if let Some(ref az) = self.client_az {
            config = config.with_client_az(az.clone());
        }
        if let Some(ref name) = self.client_name {
            config = config.with_client_name(name.clone());
        }
        if let Some(ms) = self.request_timeout_ms {
            config = config.with_request_timeout(signed_millis_to_duration("request timeout", ms)?);
        }
        if let Some(ms) = self.connection_timeout_ms {
            config =
                config.with_connection_timeout(signed_millis_to_duration("connection timeout", ms)?);
        }
        if let Some(id) = self.database_id {
            config = config.with_database_id(id);
        }
        if let Some(nodelay) = self.tcp_nodelay {
            config = config.with_tcp_nodelay(nodelay);
        }
        if let Some(strategy) = self.reconnect_strategy {
            config = config.with_reconnect_strategy(strategy);
        }
        if let Some(ref section) = self.compression {
            let mut compression = CompressionConfiguration::new(section.backend);
            compression.enabled = section.enabled;
            if section.level.is_some() {
                compression = compression.with_compression_level(section.level);
            }
            if let Some(size) = section.min_compression_size {
                compression = compression.with_min_compression_size(size);
            }
            config = config.with_compression(compression);
        }

        debug!(
            "Lowered config file: cluster={}, {} address(es)",
            self.cluster_mode,
            self.addresses.len()
        );
        Ok(config)
    }
}
