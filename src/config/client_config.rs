//! Client connection configuration
//!
//! Standalone and cluster configurations share one set of fields
//! ([`BaseClientConfiguration`]) and one translation path. Setters come from
//! [`ClientConfigurationExt`], so both variants chain the same way:
//!
//! ```ignore
//! let request = ClusterClientConfiguration::new()
//!     .with_address(NodeAddress::new("cache-0001.example.com", 6379))
//!     .with_use_tls(true)
//!     .with_read_from(ReadFrom::AzAffinity)
//!     .with_client_az("us-east-1a")
//!     .to_wire_descriptor()?;
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use super::address::NodeAddress;
use super::backoff::BackoffStrategy;
use super::compression::CompressionConfiguration;
use super::credentials::ServerCredentials;
use super::tls_config::TlsConfiguration;
use crate::utils::{duration_to_millis, FormatError, ValidationError};
use crate::wire::{ConnectionRequest, TlsMode};

/// Read routing strategy
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadFrom {
    /// Always read from the primary, for the freshest data
    #[default]
    Primary,
    /// Round-robin across replicas, falling back to the primary
    PreferReplica,
    /// Prefer replicas in the client's availability zone
    AzAffinity,
    /// Prefer replicas, then the primary, in the client's availability zone
    AzAffinityReplicaAndPrimary,
}

impl ReadFrom {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadFrom::Primary => "Primary",
            ReadFrom::PreferReplica => "PreferReplica",
            ReadFrom::AzAffinity => "AZAffinity",
            ReadFrom::AzAffinityReplicaAndPrimary => "AZAffinityReplicasAndPrimary",
        }
    }

    /// Strategies that need `client_az`
    pub fn requires_client_az(&self) -> bool {
        matches!(
            self,
            ReadFrom::AzAffinity | ReadFrom::AzAffinityReplicaAndPrimary
        )
    }
}

/// RESP protocol version negotiated with the server
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    Resp2,
    #[default]
    Resp3,
}

impl ProtocolVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::Resp2 => "RESP2",
            ProtocolVersion::Resp3 => "RESP3",
        }
    }
}

/// Interval used by [`PeriodicChecks::EnabledDefault`]
pub const DEFAULT_PERIODIC_CHECKS_INTERVAL: Duration = Duration::from_secs(60);

/// Periodic topology checks of a cluster client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodicChecks {
    /// Check every [`DEFAULT_PERIODIC_CHECKS_INTERVAL`]
    #[default]
    EnabledDefault,
    /// Only refresh topology on errors such as MOVED
    Disabled,
    /// Check every given number of seconds
    ManualInterval(u32),
}

impl PeriodicChecks {
    /// Time between checks, or `None` when disabled
    pub fn interval(&self) -> Option<Duration> {
        match self {
            PeriodicChecks::EnabledDefault => Some(DEFAULT_PERIODIC_CHECKS_INTERVAL),
            PeriodicChecks::Disabled => None,
            PeriodicChecks::ManualInterval(secs) => Some(Duration::from_secs(u64::from(*secs))),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            PeriodicChecks::ManualInterval(0) => Err(ValidationError::ZeroPeriodicChecksInterval),
            _ => Ok(()),
        }
    }
}

impl FromStr for PeriodicChecks {
    type Err = FormatError;

    /// "enabled", "disabled", or an interval in seconds
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enabled" | "enabled-default" | "enabled_default" => Ok(PeriodicChecks::EnabledDefault),
            "disabled" => Ok(PeriodicChecks::Disabled),
            other => other
                .parse()
                .map(PeriodicChecks::ManualInterval)
                .map_err(|_| FormatError::InvalidPeriodicChecks(s.to_string())),
        }
    }
}

impl fmt::Display for PeriodicChecks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodicChecks::EnabledDefault => f.write_str("enabled"),
            PeriodicChecks::Disabled => f.write_str("disabled"),
            PeriodicChecks::ManualInterval(secs) => write!(f, "every {}s", secs),
        }
    }
}

/// Cluster-only settings carried into translation
#[derive(Debug, Clone, Copy)]
struct ClusterSettings {
    refresh_topology_from_initial_nodes: bool,
    periodic_checks: PeriodicChecks,
}

/// Fields shared by standalone and cluster configurations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseClientConfiguration {
    pub(crate) addresses: Vec<NodeAddress>,
    pub(crate) use_tls: bool,
    pub(crate) credentials: Option<ServerCredentials>,
    pub(crate) read_from: ReadFrom,
    pub(crate) request_timeout: Option<Duration>,
    pub(crate) client_name: String,
    pub(crate) client_az: String,
    pub(crate) reconnect_strategy: Option<BackoffStrategy>,
    pub(crate) lazy_connect: bool,
    pub(crate) database_id: Option<i64>,
    pub(crate) connection_timeout: Option<Duration>,
    pub(crate) tls_configuration: Option<TlsConfiguration>,
    pub(crate) tcp_nodelay: Option<bool>,
    pub(crate) compression: Option<CompressionConfiguration>,
    pub(crate) protocol: ProtocolVersion,
    pub(crate) inflight_requests_limit: Option<u32>,
}

impl BaseClientConfiguration {
    pub fn addresses(&self) -> &[NodeAddress] {
        &self.addresses
    }

    pub fn read_from(&self) -> ReadFrom {
        self.read_from
    }

    pub fn credentials(&self) -> Option<&ServerCredentials> {
        self.credentials.as_ref()
    }

    /// Validate and build the wire descriptor
    ///
    /// Every check runs before any field is written, so a failure leaves the
    /// configuration untouched. On success the addresses are defaulted in place.
    fn to_wire(
        &mut self,
        cluster: Option<ClusterSettings>,
    ) -> Result<ConnectionRequest, ValidationError> {
        let cluster_mode_enabled = cluster.is_some();
        if let Some(settings) = cluster {
            settings.periodic_checks.validate()?;
        }

        let request_timeout = self
            .request_timeout
            .map(|d| duration_to_millis("request timeout", d))
            .transpose()?;
        let connection_timeout = self
            .connection_timeout
            .map(|d| duration_to_millis("connection timeout", d))
            .transpose()?;

        let tls = self.tls_configuration.clone().unwrap_or_default();
        let tls_mode = tls.resolve_mode(self.use_tls)?;
        let root_certs = tls.root_certs()?;

        if self.read_from.requires_client_az() && self.client_az.is_empty() {
            return Err(ValidationError::MissingClientAz);
        }

        let database_id = match self.database_id {
            Some(id) if id < 0 => return Err(ValidationError::NegativeDatabaseId(id)),
            Some(id) => Some(u32::try_from(id).map_err(|_| ValidationError::DatabaseIdOutOfRange(id))?),
            None => None,
        };

        let compression_config = self
            .compression
            .as_ref()
            .map(|c| c.to_wire())
            .transpose()?;

        if self.inflight_requests_limit == Some(0) {
            return Err(ValidationError::ZeroInflightRequestsLimit);
        }

        if tls_mode == TlsMode::InsecureTls {
            warn!("TLS certificate verification is disabled; do not use insecure TLS in production");
        }

        let addresses = self.addresses.iter_mut().map(|a| a.to_wire()).collect::<Vec<_>>();

        debug!(
            "Translated {} configuration: {} address(es), tls={}, read_from={}",
            if cluster_mode_enabled { "cluster" } else { "standalone" },
            addresses.len(),
            tls_mode,
            self.read_from.as_str()
        );

        Ok(ConnectionRequest {
            addresses,
            tls_mode,
            authentication_info: self.credentials.as_ref().map(|c| c.to_wire()),
            read_from: self.read_from,
            request_timeout,
            client_name: non_empty(&self.client_name),
            client_az: non_empty(&self.client_az),
            connection_retry_strategy: self.reconnect_strategy.as_ref().map(|s| s.to_wire()),
            lazy_connect: self.lazy_connect,
            database_id,
            cluster_mode_enabled,
            connection_timeout,
            root_certs,
            tcp_nodelay: self.tcp_nodelay,
            compression_config,
            refresh_topology_from_initial_nodes: cluster
                .map_or(false, |c| c.refresh_topology_from_initial_nodes),
            protocol: self.protocol,
            inflight_requests_limit: self.inflight_requests_limit,
            periodic_checks: cluster.map(|c| c.periodic_checks),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Access to the shared fields of a configuration variant
pub trait ClientConfigurationBase {
    fn base(&self) -> &BaseClientConfiguration;
    fn base_mut(&mut self) -> &mut BaseClientConfiguration;
}

/// Chained setters shared by every configuration variant
pub trait ClientConfigurationExt: ClientConfigurationBase + Sized {
    /// Add a known node. In cluster mode the list may be partial; the client
    /// discovers the rest. In standalone mode only these nodes are used.
    fn with_address(mut self, address: NodeAddress) -> Self {
        self.base_mut().addresses.push(address);
        self
    }

    /// Must match the server's TLS setting
    fn with_use_tls(mut self, use_tls: bool) -> Self {
        self.base_mut().use_tls = use_tls;
        self
    }

    /// Without credentials the client does not authenticate
    fn with_credentials(mut self, credentials: ServerCredentials) -> Self {
        self.base_mut().credentials = Some(credentials);
        self
    }

    fn with_read_from(mut self, read_from: ReadFrom) -> Self {
        self.base_mut().read_from = read_from;
        self
    }

    /// Time allowed for a request, including reconnections and retries.
    /// Values above 2^32 - 1 ms make the configuration invalid.
    fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.base_mut().request_timeout = Some(timeout);
        self
    }

    /// Sent with CLIENT SETNAME on connect
    fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.base_mut().client_name = name.into();
        self
    }

    fn with_client_az(mut self, az: impl Into<String>) -> Self {
        self.base_mut().client_az = az.into();
        self
    }

    fn with_reconnect_strategy(mut self, strategy: BackoffStrategy) -> Self {
        self.base_mut().reconnect_strategy = Some(strategy);
        self
    }

    /// Connect on first use instead of at creation
    fn with_lazy_connect(mut self, lazy_connect: bool) -> Self {
        self.base_mut().lazy_connect = lazy_connect;
        self
    }

    /// Logical database index; negative values are rejected at translation
    fn with_database_id(mut self, id: i64) -> Self {
        self.base_mut().database_id = Some(id);
        self
    }

    /// Time allowed for a TCP/TLS connection to complete
    fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.base_mut().connection_timeout = Some(timeout);
        self
    }

    fn with_tls_configuration(mut self, tls: TlsConfiguration) -> Self {
        self.base_mut().tls_configuration = Some(tls);
        self
    }

    /// TCP_NODELAY on client sockets; the engine enables it when unset
    fn with_tcp_nodelay(mut self, nodelay: bool) -> Self {
        self.base_mut().tcp_nodelay = Some(nodelay);
        self
    }

    fn with_compression(mut self, compression: CompressionConfiguration) -> Self {
        self.base_mut().compression = Some(compression);
        self
    }

    /// RESP3 unless set
    fn with_protocol(mut self, protocol: ProtocolVersion) -> Self {
        self.base_mut().protocol = protocol;
        self
    }

    /// Maximum concurrent in-flight requests; the engine default applies when unset
    fn with_inflight_requests_limit(mut self, limit: u32) -> Self {
        self.base_mut().inflight_requests_limit = Some(limit);
        self
    }
}

impl<T: ClientConfigurationBase> ClientConfigurationExt for T {}

/// Configuration for a standalone (non-cluster) client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientConfiguration {
    base: BaseClientConfiguration,
}

impl ClientConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_wire_descriptor(&mut self) -> Result<ConnectionRequest, ValidationError> {
        self.base.to_wire(None)
    }
}

impl ClientConfigurationBase for ClientConfiguration {
    fn base(&self) -> &BaseClientConfiguration {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseClientConfiguration {
        &mut self.base
    }
}

/// Configuration for a cluster-aware client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterClientConfiguration {
    base: BaseClientConfiguration,
    refresh_topology_from_initial_nodes: bool,
    periodic_checks: PeriodicChecks,
}

impl ClusterClientConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query only the initially supplied nodes for topology updates
    pub fn with_refresh_topology_from_initial_nodes(mut self, enabled: bool) -> Self {
        self.refresh_topology_from_initial_nodes = enabled;
        self
    }

    pub fn with_periodic_checks(mut self, periodic_checks: PeriodicChecks) -> Self {
        self.periodic_checks = periodic_checks;
        self
    }

    pub fn to_wire_descriptor(&mut self) -> Result<ConnectionRequest, ValidationError> {
        self.base.to_wire(Some(ClusterSettings {
            refresh_topology_from_initial_nodes: self.refresh_topology_from_initial_nodes,
            periodic_checks: self.periodic_checks,
        }))
    }
}

impl ClientConfigurationBase for ClusterClientConfiguration {
    fn base(&self) -> &BaseClientConfiguration {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseClientConfiguration {
        &mut self.base
    }
}

/// Either configuration variant, for callers that pick the mode at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionConfig {
    Standalone(ClientConfiguration),
    Cluster(ClusterClientConfiguration),
}

impl ConnectionConfig {
    pub fn is_cluster(&self) -> bool {
        matches!(self, ConnectionConfig::Cluster(_))
    }

    pub fn to_wire_descriptor(&mut self) -> Result<ConnectionRequest, ValidationError> {
        match self {
            ConnectionConfig::Standalone(config) => config.to_wire_descriptor(),
            ConnectionConfig::Cluster(config) => config.to_wire_descriptor(),
        }
    }
}

impl ClientConfigurationBase for ConnectionConfig {
    fn base(&self) -> &BaseClientConfiguration {
        match self {
            ConnectionConfig::Standalone(config) => config.base(),
            ConnectionConfig::Cluster(config) => config.base(),
        }
    }

    fn base_mut(&mut self) -> &mut BaseClientConfiguration {
        match self {
            ConnectionConfig::Standalone(config) => config.base_mut(),
            ConnectionConfig::Cluster(config) => config.base_mut(),
        }
    }
}
