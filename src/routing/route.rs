//! Request routes
//!
//! A [`Route`] tells the execution layer which cluster member(s) a single
//! command goes to. The set of strategies is closed; the only behavior the
//! execution layer relies on is [`Route::is_multi_node`].
//!
//! Multi-node routes must not be used for write commands that only a single
//! primary accepts. The execution layer enforces this.
//!
//! Textual form (used by the CLI):
//! - `all-nodes`, `all-primaries`, `random`
//! - `slot:<primary|replica>:<slot id>`
//! - `key:<primary|replica>:<key>`
//! - `<host>:<port>`

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::slot::{slot_for_key, SLOT_COUNT};
use crate::config::address::split_host_port;
use crate::utils::{ConstructionError, FormatError};

/// Routes that need no parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SimpleRoute {
    /// Every node in the cluster
    AllNodes,
    /// Every primary in the cluster
    AllPrimaries,
    /// One node picked at random
    Random,
}

/// Which member of a slot's shard to address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SlotType {
    #[default]
    Primary,
    Replica,
}

impl SlotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotType::Primary => "primary",
            SlotType::Replica => "replica",
        }
    }
}

impl FromStr for SlotType {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(SlotType::Primary),
            "replica" => Ok(SlotType::Replica),
            _ => Err(FormatError::InvalidSlotType(s.to_string())),
        }
    }
}

/// Node owning a given slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SlotIdRoute {
    slot_type: SlotType,
    slot_id: u16,
}

impl SlotIdRoute {
    /// Fails when `slot_id` is not in `[0, 16384)`
    pub fn new(slot_type: SlotType, slot_id: u32) -> Result<Self, ConstructionError> {
        if slot_id >= SLOT_COUNT as u32 {
            return Err(ConstructionError::SlotOutOfRange(slot_id));
        }
        Ok(Self {
            slot_type,
            slot_id: slot_id as u16,
        })
    }

    pub fn slot_type(&self) -> SlotType {
        self.slot_type
    }

    pub fn slot_id(&self) -> u16 {
        self.slot_id
    }
}

/// Node owning the slot of a given key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SlotKeyRoute {
    pub slot_type: SlotType,
    pub slot_key: String,
}

impl SlotKeyRoute {
    pub fn new(slot_type: SlotType, slot_key: impl Into<String>) -> Self {
        Self {
            slot_type,
            slot_key: slot_key.into(),
        }
    }

    pub fn slot(&self) -> u16 {
        slot_for_key(self.slot_key.as_bytes())
    }
}

/// Explicit node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ByAddressRoute {
    pub host: String,
    pub port: u16,
}

impl ByAddressRoute {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl FromStr for ByAddressRoute {
    type Err = FormatError;

    /// Parse "host:port"; anything other than exactly two parts, or a
    /// non-numeric port, is a format error
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = split_host_port(s)?;
        Ok(Self { host, port })
    }
}

/// Routing strategy for a single command
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Route {
    Simple(SimpleRoute),
    SlotId(SlotIdRoute),
    SlotKey(SlotKeyRoute),
    ByAddress(ByAddressRoute),
}

impl Route {
    pub fn all_nodes() -> Self {
        Route::Simple(SimpleRoute::AllNodes)
    }

    pub fn all_primaries() -> Self {
        Route::Simple(SimpleRoute::AllPrimaries)
    }

    pub fn random() -> Self {
        Route::Simple(SimpleRoute::Random)
    }

    pub fn slot_id(slot_type: SlotType, slot_id: u32) -> Result<Self, ConstructionError> {
        SlotIdRoute::new(slot_type, slot_id).map(Route::SlotId)
    }

    pub fn slot_key(slot_type: SlotType, key: impl Into<String>) -> Self {
        Route::SlotKey(SlotKeyRoute::new(slot_type, key))
    }

    pub fn by_address(host: impl Into<String>, port: u16) -> Self {
        Route::ByAddress(ByAddressRoute::new(host, port))
    }

    /// Whether the command fans out to more than one node
    pub fn is_multi_node(&self) -> bool {
        match self {
            Route::Simple(SimpleRoute::AllNodes) | Route::Simple(SimpleRoute::AllPrimaries) => true,
            Route::Simple(SimpleRoute::Random) => false,
            Route::SlotId(_) | Route::SlotKey(_) | Route::ByAddress(_) => false,
        }
    }

    /// Slot addressed by slot-based routes
    pub fn slot(&self) -> Option<u16> {
        match self {
            Route::SlotId(route) => Some(route.slot_id()),
            Route::SlotKey(route) => Some(route.slot()),
            Route::Simple(_) | Route::ByAddress(_) => None,
        }
    }

    pub fn slot_type(&self) -> Option<SlotType> {
        match self {
            Route::SlotId(route) => Some(route.slot_type()),
            Route::SlotKey(route) => Some(route.slot_type),
            Route::Simple(_) | Route::ByAddress(_) => None,
        }
    }
}

impl From<SimpleRoute> for Route {
    fn from(route: SimpleRoute) -> Self {
        Route::Simple(route)
    }
}

impl From<SlotIdRoute> for Route {
    fn from(route: SlotIdRoute) -> Self {
        Route::SlotId(route)
    }
}

impl From<SlotKeyRoute> for Route {
    fn from(route: SlotKeyRoute) -> Self {
        Route::SlotKey(route)
    }
}

impl From<ByAddressRoute> for Route {
    fn from(route: ByAddressRoute) -> Self {
        Route::ByAddress(route)
    }
}

impl FromStr for Route {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all-nodes" => return Ok(Route::all_nodes()),
            "all-primaries" => return Ok(Route::all_primaries()),
            "random" => return Ok(Route::random()),
            _ => {}
        }

        // "slot:6379" and "key:6379" are plain addresses of hosts named slot/key
        if let Some((slot_type, slot_id)) = s.strip_prefix("slot:").and_then(|r| r.split_once(':')) {
            let slot_id: u32 = slot_id
                .parse()
                .map_err(|_| FormatError::InvalidRoute(s.to_string()))?;
            return Route::slot_id(slot_type.parse()?, slot_id)
                .map_err(|_| FormatError::InvalidRoute(s.to_string()));
        }

        // the key itself may contain ':'
        if let Some((slot_type, key)) = s.strip_prefix("key:").and_then(|r| r.split_once(':')) {
            return Ok(Route::slot_key(slot_type.parse()?, key));
        }

        s.parse::<ByAddressRoute>().map(Route::ByAddress)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Simple(SimpleRoute::AllNodes) => f.write_str("all-nodes"),
            Route::Simple(SimpleRoute::AllPrimaries) => f.write_str("all-primaries"),
            Route::Simple(SimpleRoute::Random) => f.write_str("random"),
            Route::SlotId(route) => write!(f, "slot:{}:{}", route.slot_type.as_str(), route.slot_id),
            Route::SlotKey(route) => write!(f, "key:{}:{}", route.slot_type.as_str(), route.slot_key),
            Route::ByAddress(route) => write!(f, "{}:{}", route.host, route.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_route_classification() {
        assert!(Route::all_nodes().is_multi_node());
        assert!(Route::all_primaries().is_multi_node());
        assert!(!Route::random().is_multi_node());
    }

    #[test]
    fn test_single_node_routes() {
        assert!(!Route::slot_id(SlotType::Primary, 0).unwrap().is_multi_node());
        assert!(!Route::slot_id(SlotType::Replica, 16383).unwrap().is_multi_node());
        assert!(!Route::slot_key(SlotType::Primary, "user:1").is_multi_node());
        assert!(!Route::by_address("10.0.0.1", 6379).is_multi_node());
    }

    #[test]
    fn test_slot_id_range() {
        assert_eq!(
            Route::slot_id(SlotType::Primary, 16384),
            Err(ConstructionError::SlotOutOfRange(16384))
        );
        let route = SlotIdRoute::new(SlotType::Replica, 42).unwrap();
        assert_eq!(route.slot_id(), 42);
        assert_eq!(route.slot_type(), SlotType::Replica);
    }

    #[test]
    fn test_slot_key_resolves_slot() {
        let route = Route::slot_key(SlotType::Primary, "foo");
        assert_eq!(route.slot(), Some(12182));
        assert_eq!(route.slot_type(), Some(SlotType::Primary));
        assert_eq!(Route::random().slot(), None);
    }

    #[test]
    fn test_by_address_parse() {
        let route: ByAddressRoute = "host:1234".parse().unwrap();
        assert_eq!(route, ByAddressRoute::new("host", 1234));

        assert!(matches!(
            "host".parse::<ByAddressRoute>(),
            Err(FormatError::InvalidAddress(_))
        ));
        assert!(matches!(
            "host:abc".parse::<ByAddressRoute>(),
            Err(FormatError::InvalidPort { .. })
        ));
        assert!("host:1:2".parse::<ByAddressRoute>().is_err());
    }

    #[test]
    fn test_route_from_str() {
        assert_eq!("all-nodes".parse::<Route>().unwrap(), Route::all_nodes());
        assert_eq!("all-primaries".parse::<Route>().unwrap(), Route::all_primaries());
        assert_eq!("random".parse::<Route>().unwrap(), Route::random());
        assert_eq!(
            "slot:replica:100".parse::<Route>().unwrap(),
            Route::slot_id(SlotType::Replica, 100).unwrap()
        );
        assert_eq!(
            "key:primary:user:{42}:profile".parse::<Route>().unwrap(),
            Route::slot_key(SlotType::Primary, "user:{42}:profile")
        );
        assert_eq!(
            "cache-1:7000".parse::<Route>().unwrap(),
            Route::by_address("cache-1", 7000)
        );
    }

    #[test]
    fn test_hosts_named_like_prefixes() {
        assert_eq!("key:6379".parse::<Route>().unwrap(), Route::by_address("key", 6379));
        assert_eq!("slot:7000".parse::<Route>().unwrap(), Route::by_address("slot", 7000));
        assert!(!"key:6379".parse::<Route>().unwrap().is_multi_node());
    }

    #[test]
    fn test_route_from_str_errors() {
        assert!("slot:primary:99999".parse::<Route>().is_err());
        assert!("slot:leader:1".parse::<Route>().is_err());
        assert!("slot:primary".parse::<Route>().is_err());
        assert!("nonsense".parse::<Route>().is_err());
    }

    #[test]
    fn test_route_display_round_trip() {
        for text in ["all-nodes", "random", "slot:primary:7", "key:replica:k", "h:1"] {
            let route: Route = text.parse().unwrap();
            assert_eq!(route.to_string(), text);
        }
    }
}
