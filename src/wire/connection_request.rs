//! Wire-level connection descriptor
//!
//! These records are the fully validated output of configuration translation.
//! They hold no optional-but-invalid states: every field is either absent
//! (the engine applies its own default) or already checked.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::config::{CompressionBackend, PeriodicChecks, ProtocolVersion, ReadFrom, ServiceType};

/// TLS mode sent to the transport layer; exactly one is always set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TlsMode {
    #[default]
    NoTls,
    SecureTls,
    InsecureTls,
}

impl TlsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TlsMode::NoTls => "NoTls",
            TlsMode::SecureTls => "SecureTls",
            TlsMode::InsecureTls => "InsecureTls",
        }
    }
}

impl fmt::Display for TlsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved node address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireNodeAddress {
    pub host: String,
    pub port: u16,
}

/// IAM token generation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IamCredentials {
    pub cluster_name: String,
    pub region: String,
    pub service_type: ServiceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval_seconds: Option<u32>,
}

/// Authentication section; `password` is empty when IAM is used
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticationInfo {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_credentials: Option<IamCredentials>,
}

/// Reconnect backoff parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionRetryStrategy {
    pub number_of_retries: u32,
    pub factor: u32,
    pub exponent_base: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter_percent: Option<u32>,
}

/// Compression settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WireCompressionConfig {
    pub enabled: bool,
    pub backend: CompressionBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<i32>,
    pub min_compression_size: u32,
}

/// Complete connection request consumed by the execution layer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConnectionRequest {
    pub addresses: Vec<WireNodeAddress>,
    pub tls_mode: TlsMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_info: Option<AuthenticationInfo>,
    pub read_from: ReadFrom,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_az: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_retry_strategy: Option<ConnectionRetryStrategy>,
    pub lazy_connect: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_id: Option<u32>,
    pub cluster_mode_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<u32>,
    #[serde(serialize_with = "serialize_certs", skip_serializing_if = "Vec::is_empty")]
    pub root_certs: Vec<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_nodelay: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_config: Option<WireCompressionConfig>,
    pub refresh_topology_from_initial_nodes: bool,
    pub protocol: ProtocolVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflight_requests_limit: Option<u32>,
    /// Set only for cluster clients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodic_checks: Option<PeriodicChecks>,
}

/// PEM bundles are emitted as strings; anything that is not UTF-8 (DER)
/// keeps its raw bytes
fn serialize_certs<S: Serializer>(certs: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(certs.len()))?;
    for cert in certs {
        match std::str::from_utf8(cert) {
            Ok(pem) => seq.serialize_element(pem)?,
            Err(_) => seq.serialize_element(cert)?,
        }
    }
    seq.end()
}

impl ConnectionRequest {
    /// Multi-line human readable summary
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        let addresses: Vec<String> = self
            .addresses
            .iter()
            .map(|a| format!("{}:{}", a.host, a.port))
            .collect();
        lines.push(format!("Addresses: {}", addresses.join(", ")));
        lines.push(format!(
            "Mode: {}",
            if self.cluster_mode_enabled { "cluster" } else { "standalone" }
        ));
        lines.push(format!("TLS: {}", self.tls_mode));
        if !self.root_certs.is_empty() {
            lines.push(format!("Root certificates: {}", self.root_certs.len()));
        }
        lines.push(format!("Read from: {}", self.read_from.as_str()));
        lines.push(format!("Protocol: {}", self.protocol.as_str()));
        if let Some(ref az) = self.client_az {
            lines.push(format!("Client AZ: {}", az));
        }
        if let Some(ref auth) = self.authentication_info {
            match auth.iam_credentials {
                Some(ref iam) => lines.push(format!(
                    "Auth: IAM user={} cluster={} region={} service={}",
                    auth.username,
                    iam.cluster_name,
                    iam.region,
                    iam.service_type.as_str()
                )),
                None => lines.push(format!("Auth: password user={}", auth.username)),
            }
        }
        if let Some(ms) = self.request_timeout {
            lines.push(format!("Request timeout: {}ms", ms));
        }
        if let Some(ms) = self.connection_timeout {
            lines.push(format!("Connection timeout: {}ms", ms));
        }
        if let Some(ref name) = self.client_name {
            lines.push(format!("Client name: {}", name));
        }
        if let Some(db) = self.database_id {
            lines.push(format!("Database: {}", db));
        }
        if let Some(ref retry) = self.connection_retry_strategy {
            lines.push(format!(
                "Reconnect: retries={} factor={}ms base={}",
                retry.number_of_retries, retry.factor, retry.exponent_base
            ));
        }
        if let Some(ref compression) = self.compression_config {
            lines.push(format!(
                "Compression: {} enabled={} min_size={}",
                compression.backend, compression.enabled, compression.min_compression_size
            ));
        }
        if let Some(limit) = self.inflight_requests_limit {
            lines.push(format!("Inflight requests limit: {}", limit));
        }
        if let Some(ref checks) = self.periodic_checks {
            lines.push(format!("Periodic checks: {}", checks));
        }
        if self.lazy_connect {
            lines.push("Lazy connect: yes".to_string());
        }
        if self.refresh_topology_from_initial_nodes {
            lines.push("Refresh topology from initial nodes: yes".to_string());
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request() {
        let request = ConnectionRequest::default();
        assert_eq!(request.tls_mode, TlsMode::NoTls);
        assert_eq!(request.read_from, ReadFrom::Primary);
        assert!(!request.cluster_mode_enabled);
        assert!(request.addresses.is_empty());
    }

    #[test]
    fn test_json_skips_absent_fields() {
        let request = ConnectionRequest {
            addresses: vec![WireNodeAddress {
                host: "localhost".to_string(),
                port: 6379,
            }],
            root_certs: vec![b"-----BEGIN CERTIFICATE-----".to_vec()],
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tls_mode"], "NoTls");
        assert_eq!(json["addresses"][0]["port"], 6379);
        assert_eq!(json["root_certs"][0], "-----BEGIN CERTIFICATE-----");
        assert!(json.get("authentication_info").is_none());
        assert!(json.get("request_timeout").is_none());
    }

    #[test]
    fn test_json_keeps_der_bytes() {
        let der = vec![0x30, 0x82, 0xff, 0x0a];
        let request = ConnectionRequest {
            root_certs: vec![der.clone()],
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        let bytes: Vec<u8> = json["root_certs"][0]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b.as_u64().unwrap() as u8)
            .collect();
        assert_eq!(bytes, der);
        assert_eq!(json["protocol"], "resp3");
    }

    #[test]
    fn test_json_cluster_fields() {
        let request = ConnectionRequest {
            cluster_mode_enabled: true,
            inflight_requests_limit: Some(250),
            periodic_checks: Some(PeriodicChecks::ManualInterval(10)),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["inflight_requests_limit"], 250);
        assert_eq!(json["periodic_checks"]["manual_interval"], 10);

        let json = serde_json::to_value(ConnectionRequest::default()).unwrap();
        assert!(json.get("periodic_checks").is_none());
        assert!(json.get("inflight_requests_limit").is_none());
    }

    #[test]
    fn test_summary_mentions_mode_and_tls() {
        let request = ConnectionRequest {
            cluster_mode_enabled: true,
            tls_mode: TlsMode::SecureTls,
            ..Default::default()
        };
        let summary = request.summary();
        assert!(summary.contains("Mode: cluster"));
        assert!(summary.contains("TLS: SecureTls"));
    }
}
