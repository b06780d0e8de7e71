//! Node addresses

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::utils::FormatError;
use crate::wire::WireNodeAddress;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 6379;

/// Host and port of a known node
///
/// An empty host or a zero port means "unset"; both are rewritten to
/// [`DEFAULT_HOST`] / [`DEFAULT_PORT`] when the configuration is translated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct NodeAddress {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
}

impl NodeAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Fill in the default host and port, in place
    pub fn apply_defaults(&mut self) {
        if self.host.is_empty() {
            self.host = DEFAULT_HOST.to_string();
        }
        if self.port == 0 {
            self.port = DEFAULT_PORT;
        }
    }

    pub(crate) fn to_wire(&mut self) -> WireNodeAddress {
        self.apply_defaults();
        WireNodeAddress {
            host: self.host.clone(),
            port: self.port,
        }
    }

    /// Parse "host" or "host:port"; a bare host keeps `default_port`
    pub fn parse_with_default_port(s: &str, default_port: u16) -> Result<Self, FormatError> {
        if s.contains(':') {
            return s.parse();
        }
        Ok(Self::new(s, default_port))
    }
}

impl FromStr for NodeAddress {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = split_host_port(s)?;
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Split "host:port" into exactly two parts with a base-10 port
pub(crate) fn split_host_port(s: &str) -> Result<(String, u16), FormatError> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(FormatError::InvalidAddress(s.to_string()));
    }
    let port = parts[1]
        .parse::<u16>()
        .map_err(|source| FormatError::InvalidPort {
            address: s.to_string(),
            source,
        })?;
    Ok((parts[0].to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_address_gets_defaults() {
        let mut addr = NodeAddress::default();
        let wire = addr.to_wire();
        assert_eq!(wire.host, "localhost");
        assert_eq!(wire.port, 6379);
        // defaulting happens in place
        assert_eq!(addr, NodeAddress::new("localhost", 6379));
    }

    #[test]
    fn test_partial_address_keeps_given_parts() {
        let mut host_only = NodeAddress::new("cache-1", 0);
        assert_eq!(host_only.to_wire().port, 6379);
        assert_eq!(host_only.host, "cache-1");

        let mut port_only = NodeAddress::new("", 7000);
        let wire = port_only.to_wire();
        assert_eq!(wire.host, "localhost");
        assert_eq!(wire.port, 7000);
    }

    #[test]
    fn test_parse_host_port() {
        let addr: NodeAddress = "10.0.0.1:6380".parse().unwrap();
        assert_eq!(addr.host, "10.0.0.1");
        assert_eq!(addr.port, 6380);
        assert_eq!(addr.to_string(), "10.0.0.1:6380");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "host".parse::<NodeAddress>(),
            Err(FormatError::InvalidAddress(_))
        ));
        assert!(matches!(
            "host:abc".parse::<NodeAddress>(),
            Err(FormatError::InvalidPort { .. })
        ));
        assert!("a:b:c".parse::<NodeAddress>().is_err());
    }

    #[test]
    fn test_parse_with_default_port() {
        let addr = NodeAddress::parse_with_default_port("cache-1", 7001).unwrap();
        assert_eq!(addr, NodeAddress::new("cache-1", 7001));
        let addr = NodeAddress::parse_with_default_port("cache-1:7002", 7001).unwrap();
        assert_eq!(addr.port, 7002);
    }
}
