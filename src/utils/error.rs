//! Error types for valkey-glide-config

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error
#[derive(Error, Debug)]
pub enum GlideConfigError {
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config file error: {0}")]
    ConfigFile(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Raised immediately when a value object is built from an inconsistent combination
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("username is required for IAM authentication")]
    MissingIamUsername,

    #[error("iamConfig cannot be nil")]
    MissingIamConfig,

    #[error("slot id {0} is outside the valid range [0, 16384)")]
    SlotOutOfRange(u32),
}

/// Raised while translating a configuration into a wire descriptor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("setting {field} returned an error: {millis}ms is outside the range [0, 4294967295] ms")]
    DurationOutOfRange { field: &'static str, millis: i128 },

    #[error("client AZ must be set when using AZ affinity or AZ affinity with replicas and primary")]
    MissingClientAz,

    #[error("database_id must be non-negative, got {0}")]
    NegativeDatabaseId(i64),

    #[error("database_id {0} does not fit in 32 bits")]
    DatabaseIdOutOfRange(i64),

    #[error("root certificates cannot be an empty byte array; use None to use platform verifier")]
    EmptyRootCertificates,

    #[error("insecure TLS requires TLS enabled: use_insecure_tls cannot be set when use_tls is disabled")]
    InsecureTlsWithoutTls,

    #[error("invalid compression configuration for '{backend}': min_compression_size ({size}) must be at least {minimum}")]
    CompressionThreshold {
        backend: &'static str,
        size: usize,
        minimum: usize,
    },

    #[error("invalid compression configuration for '{backend}': compression level {level} is out of valid range {min}..={max}")]
    CompressionLevel {
        backend: &'static str,
        level: i32,
        min: i32,
        max: i32,
    },

    #[error("invalid compression configuration for '{backend}': min_compression_size ({size}) does not fit in 32 bits")]
    CompressionThresholdTooLarge { backend: &'static str, size: usize },

    #[error("inflight_requests_limit must be positive")]
    ZeroInflightRequestsLimit,

    #[error("periodic checks interval must be at least one second")]
    ZeroPeriodicChecksInterval,

    #[error("certificate file is empty: {0}")]
    EmptyCertificateFile(PathBuf),
}

/// Raised when parsing textual addresses, routes or enum names fails
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid address format '{0}': expected host:port")]
    InvalidAddress(String),

    #[error("invalid port in address '{address}': {source}")]
    InvalidPort {
        address: String,
        source: ParseIntError,
    },

    #[error("invalid route '{0}'")]
    InvalidRoute(String),

    #[error("invalid slot type '{0}': expected primary or replica")]
    InvalidSlotType(String),

    #[error("unsupported compression backend: '{0}'")]
    UnsupportedBackend(String),

    #[error("unknown service type: '{0}'")]
    UnknownServiceType(String),

    #[error("invalid periodic checks '{0}': expected enabled, disabled or an interval in seconds")]
    InvalidPeriodicChecks(String),
}

pub type Result<T> = std::result::Result<T, GlideConfigError>;
