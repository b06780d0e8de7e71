//! valkey-glide-config library
//!
//! Connection configuration and request routing descriptors for Valkey
//! GLIDE clients. Configurations are assembled with builders, validated, and
//! translated into a [`wire::ConnectionRequest`] for the transport layer.

pub mod config;
pub mod routing;
pub mod utils;
pub mod wire;

pub use config::{
    BackoffStrategy, ClientConfiguration, ClientConfigurationExt, ClusterClientConfiguration,
    CompressionBackend, CompressionConfiguration, ConnectionConfig, IamAuthConfig, NodeAddress,
    PeriodicChecks, ProtocolVersion, ReadFrom, ServerCredentials, ServiceType, TlsConfiguration,
};
pub use routing::{Route, SlotType};
pub use utils::{ConstructionError, FormatError, GlideConfigError, ValidationError};
pub use wire::ConnectionRequest;
