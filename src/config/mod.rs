//! Configuration module

pub mod address;
pub mod backoff;
pub mod cli;
pub mod client_config;
pub mod compression;
pub mod config_file;
pub mod credentials;
pub mod tls_config;

pub use address::{NodeAddress, DEFAULT_HOST, DEFAULT_PORT};
pub use backoff::{BackoffStrategy, DEFAULT_JITTER_PERCENT};
pub use cli::{CliArgs, OutputFormat};
pub use client_config::{
    BaseClientConfiguration, ClientConfiguration, ClientConfigurationBase, ClientConfigurationExt,
    ClusterClientConfiguration, ConnectionConfig, PeriodicChecks, ProtocolVersion, ReadFrom,
    DEFAULT_PERIODIC_CHECKS_INTERVAL,
};
pub use compression::{
    CompressionBackend, CompressionConfiguration, DEFAULT_MIN_COMPRESSION_SIZE, HEADER_SIZE,
    MIN_COMPRESSED_SIZE,
};
pub use config_file::ConfigFile;
pub use credentials::{IamAuthConfig, ServerCredentials, ServiceType, DEFAULT_USERNAME};
pub use tls_config::{load_root_certificates_from_file, TlsConfiguration};
