//! Command-line argument parsing
//!
//! Flags mirror the connection configuration fields. They are collected into
//! a [`ConfigFile`] so that flags and YAML files share one lowering path.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::warn;

use super::address::NodeAddress;
use super::backoff::BackoffStrategy;
use super::client_config::{ConnectionConfig, PeriodicChecks, ProtocolVersion, ReadFrom};
use super::compression::CompressionBackend;
use super::config_file::{
    AddressEntry, CompressionSection, ConfigFile, CredentialsSection, IamSection,
    PeriodicChecksEntry, TlsSection,
};
use super::credentials::ServiceType;
use crate::utils::{GlideConfigError, Result};

/// Validate connection settings and print the resulting connection request
#[derive(Parser, Debug, Clone)]
#[command(name = "glide-config")]
#[command(version, about, long_about = None)]
#[command(disable_help_flag = true)]
#[allow(clippy::manual_non_exhaustive)]
pub struct CliArgs {
    /// Print help information
    #[arg(long = "help", action = clap::ArgAction::Help)]
    help: (),

    // ===== Source =====
    /// YAML configuration file (connection flags are ignored when set)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    // ===== Connection Options =====
    /// Server host, optionally host:port (repeat for several seed nodes)
    #[arg(short = 'h', long = "host", action = clap::ArgAction::Append)]
    pub hosts: Vec<String>,

    /// Port for hosts given without one
    #[arg(short = 'p', long = "port", default_value_t = 6379)]
    pub port: u16,

    /// Connect in cluster mode
    #[arg(long = "cluster")]
    pub cluster_mode: bool,

    /// Query only the seed nodes for topology refreshes (cluster mode)
    #[arg(long = "refresh-topology-from-initial-nodes")]
    pub refresh_topology_from_initial_nodes: bool,

    /// Periodic topology checks: enabled, disabled or an interval in seconds (cluster mode)
    #[arg(long = "periodic-checks")]
    pub periodic_checks: Option<PeriodicChecks>,

    /// RESP protocol version
    #[arg(long = "protocol", value_enum, default_value_t = ProtocolVersion::Resp3)]
    pub protocol: ProtocolVersion,

    /// Maximum concurrent in-flight requests
    #[arg(long = "inflight-requests-limit")]
    pub inflight_requests_limit: Option<u32>,

    /// Connect on first command instead of at startup
    #[arg(long = "lazy-connect")]
    pub lazy_connect: bool,

    /// TCP_NODELAY on client sockets
    #[arg(long = "tcp-nodelay")]
    pub tcp_nodelay: Option<bool>,

    /// Logical database index
    #[arg(long = "dbnum", allow_negative_numbers = true)]
    pub dbnum: Option<i64>,

    /// Client name sent with CLIENT SETNAME
    #[arg(long = "client-name")]
    pub client_name: Option<String>,

    // ===== Authentication =====
    /// Password for AUTH
    #[arg(short = 'a', long = "auth")]
    pub password: Option<String>,

    /// Username for ACL AUTH or IAM
    #[arg(long = "user")]
    pub username: Option<String>,

    /// ElastiCache / MemoryDB cluster name for IAM authentication
    #[arg(long = "iam-cluster")]
    pub iam_cluster: Option<String>,

    /// AWS region for IAM authentication
    #[arg(long = "iam-region")]
    pub iam_region: Option<String>,

    /// AWS service for IAM authentication (elasticache or memorydb)
    #[arg(long = "iam-service", default_value = "elasticache")]
    pub iam_service: ServiceType,

    /// IAM token refresh interval in seconds
    #[arg(long = "iam-refresh-secs")]
    pub iam_refresh_secs: Option<u32>,

    // ===== TLS Options =====
    /// Enable TLS connection
    #[arg(long = "tls")]
    pub tls: bool,

    /// Skip TLS certificate verification (insecure)
    #[arg(long = "tls-skip-verify")]
    pub tls_skip_verify: bool,

    /// CA certificate file for TLS
    #[arg(long = "tls-ca-cert")]
    pub tls_ca_cert: Option<PathBuf>,

    // ===== Routing =====
    /// Read strategy
    #[arg(long = "read-from", visible_alias = "rfr", value_enum, default_value_t = ReadFrom::Primary)]
    pub read_from: ReadFrom,

    /// Client availability zone (required for AZ affinity)
    #[arg(long = "client-az")]
    pub client_az: Option<String>,

    /// Route expression to classify (repeatable)
    #[arg(long = "route", action = clap::ArgAction::Append)]
    pub routes: Vec<String>,

    // ===== Timeouts =====
    /// Request timeout in milliseconds
    #[arg(long = "request-timeout-ms", allow_negative_numbers = true)]
    pub request_timeout_ms: Option<i64>,

    /// Connection timeout in milliseconds
    #[arg(long = "connect-timeout-ms", allow_negative_numbers = true)]
    pub connect_timeout_ms: Option<i64>,

    // ===== Reconnect Strategy =====
    /// Retries during which the reconnect interval grows
    #[arg(long = "retries")]
    pub retries: Option<u32>,

    /// Reconnect interval multiplier in milliseconds
    #[arg(long = "retry-factor")]
    pub retry_factor: Option<u32>,

    /// Reconnect interval exponent base
    #[arg(long = "retry-exponent-base")]
    pub retry_exponent_base: Option<u32>,

    /// Reconnect jitter percentage
    #[arg(long = "retry-jitter")]
    pub retry_jitter: Option<u32>,

    // ===== Compression =====
    /// Compression backend (zstd or lz4)
    #[arg(long = "compression")]
    pub compression: Option<CompressionBackend>,

    /// Compression level
    #[arg(long = "compression-level", allow_negative_numbers = true)]
    pub compression_level: Option<i32>,

    /// Minimum value size to compress, in bytes
    #[arg(long = "compression-min-size")]
    pub compression_min_size: Option<usize>,

    // ===== Output =====
    /// Output format
    #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

/// Output format for results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.password.is_some() && self.iam_cluster.is_some() {
            return Err("--auth and --iam-cluster are mutually exclusive".to_string());
        }

        // Username requires password or IAM
        if self.username.is_some() && self.password.is_none() && self.iam_cluster.is_none() {
            return Err("--user requires --auth or --iam-cluster to be set".to_string());
        }

        if self.iam_cluster.is_some() != self.iam_region.is_some() {
            return Err("--iam-cluster and --iam-region must both be specified".to_string());
        }

        if self.iam_refresh_secs.is_some() && self.iam_cluster.is_none() {
            return Err("--iam-refresh-secs requires --iam-cluster".to_string());
        }

        let retry_flags = [self.retries, self.retry_factor, self.retry_exponent_base];
        let set = retry_flags.iter().filter(|f| f.is_some()).count();
        if set != 0 && set != retry_flags.len() {
            return Err(
                "--retries, --retry-factor and --retry-exponent-base must be specified together"
                    .to_string(),
            );
        }
        if self.retry_jitter.is_some() && set == 0 {
            return Err("--retry-jitter requires --retries".to_string());
        }

        if (self.compression_level.is_some() || self.compression_min_size.is_some())
            && self.compression.is_none()
        {
            return Err("compression options require --compression".to_string());
        }

        if self.periodic_checks.is_some() && !self.cluster_mode {
            return Err("--periodic-checks requires --cluster".to_string());
        }

        Ok(())
    }

    /// Collect connection flags into a config file representation
    pub fn to_config_file(&self) -> Result<ConfigFile> {
        self.validate().map_err(GlideConfigError::InvalidArguments)?;

        let addresses = self
            .hosts
            .iter()
            .map(|h| NodeAddress::parse_with_default_port(h, self.port).map(AddressEntry::Node))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let credentials = if let Some(ref cluster_name) = self.iam_cluster {
            Some(CredentialsSection {
                username: self.username.clone(),
                password: None,
                iam: Some(IamSection {
                    cluster_name: cluster_name.clone(),
                    service: self.iam_service,
                    region: self.iam_region.clone().unwrap_or_default(),
                    refresh_interval_seconds: self.iam_refresh_secs,
                }),
            })
        } else {
            self.password.as_ref().map(|password| CredentialsSection {
                username: self.username.clone(),
                password: Some(password.clone()),
                iam: None,
            })
        };

        if self.tls_ca_cert.is_some() && self.tls_skip_verify {
            warn!("--tls-ca-cert has no effect with --tls-skip-verify; certificates are not verified");
        }

        let tls = if self.tls_ca_cert.is_some() || self.tls_skip_verify {
            Some(TlsSection {
                root_cert_file: self.tls_ca_cert.clone(),
                root_certificates: None,
                insecure: self.tls_skip_verify,
            })
        } else {
            None
        };

        let reconnect_strategy = match (self.retries, self.retry_factor, self.retry_exponent_base) {
            (Some(retries), Some(factor), Some(base)) => {
                let strategy = BackoffStrategy::new(retries, factor, base);
                Some(match self.retry_jitter {
                    Some(jitter) => strategy.with_jitter_percent(jitter),
                    None => strategy,
                })
            }
            _ => None,
        };

        let compression = self.compression.map(|backend| CompressionSection {
            enabled: true,
            backend,
            level: self.compression_level,
            min_compression_size: self.compression_min_size,
        });

        Ok(ConfigFile {
            cluster_mode: self.cluster_mode,
            addresses,
            use_tls: self.tls,
            tls,
            credentials,
            read_from: self.read_from,
            client_az: self.client_az.clone(),
            client_name: self.client_name.clone(),
            request_timeout_ms: self.request_timeout_ms,
            connection_timeout_ms: self.connect_timeout_ms,
            database_id: self.dbnum,
            lazy_connect: self.lazy_connect,
            tcp_nodelay: self.tcp_nodelay,
            reconnect_strategy,
            compression,
            refresh_topology_from_initial_nodes: self.refresh_topology_from_initial_nodes,
            protocol: self.protocol,
            inflight_requests_limit: self.inflight_requests_limit,
            periodic_checks: self.periodic_checks.map(PeriodicChecksEntry::from),
        })
    }

    /// Build the connection configuration from `--config` or from flags
    pub fn to_connection_config(&self) -> Result<ConnectionConfig> {
        let file = match self.config {
            Some(ref path) => ConfigFile::load(path)?,
            None => self.to_config_file()?,
        };
        file.into_connection_config()
    }
}
