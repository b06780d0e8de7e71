//! Server credentials
//!
//! Two mutually exclusive forms:
//! - password based, with an optional username (the server's `default` user
//!   is assumed when none is given)
//! - IAM based (ElastiCache / MemoryDB), where the engine generates and
//!   refreshes short-lived tokens itself

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::{ConstructionError, FormatError};
use crate::wire::{AuthenticationInfo, IamCredentials};

pub const DEFAULT_USERNAME: &str = "default";

/// AWS service hosting the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    #[default]
    ElastiCache,
    MemoryDB,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ElastiCache => "elasticache",
            ServiceType::MemoryDB => "memorydb",
        }
    }
}

impl FromStr for ServiceType {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elasticache" => Ok(ServiceType::ElastiCache),
            "memorydb" => Ok(ServiceType::MemoryDB),
            _ => Err(FormatError::UnknownServiceType(s.to_string())),
        }
    }
}

/// IAM authentication settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IamAuthConfig {
    pub cluster_name: String,
    pub service: ServiceType,
    pub region: String,
    /// Token refresh interval; the engine default is used when unset
    pub refresh_interval_seconds: Option<u32>,
}

impl IamAuthConfig {
    pub fn new(cluster_name: impl Into<String>, service: ServiceType, region: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            service,
            region: region.into(),
            refresh_interval_seconds: None,
        }
    }

    pub fn with_refresh_interval_seconds(mut self, seconds: u32) -> Self {
        self.refresh_interval_seconds = Some(seconds);
        self
    }

    fn to_wire(&self) -> IamCredentials {
        IamCredentials {
            cluster_name: self.cluster_name.clone(),
            region: self.region.clone(),
            service_type: self.service,
            refresh_interval_seconds: self.refresh_interval_seconds,
        }
    }
}

/// Credentials used to authenticate every connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCredentials {
    Password {
        username: Option<String>,
        password: String,
    },
    Iam {
        username: String,
        config: IamAuthConfig,
    },
}

impl ServerCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        ServerCredentials::Password {
            username: Some(username.into()),
            password: password.into(),
        }
    }

    /// Password credentials for the server's `default` user
    pub fn with_default_username(password: impl Into<String>) -> Self {
        ServerCredentials::Password {
            username: None,
            password: password.into(),
        }
    }

    /// IAM credentials; both the username and the IAM settings are required
    pub fn with_iam(
        username: impl Into<String>,
        iam_config: Option<IamAuthConfig>,
    ) -> Result<Self, ConstructionError> {
        let username = username.into();
        if username.is_empty() {
            return Err(ConstructionError::MissingIamUsername);
        }
        let config = iam_config.ok_or(ConstructionError::MissingIamConfig)?;
        Ok(ServerCredentials::Iam { username, config })
    }

    pub fn is_iam_auth(&self) -> bool {
        matches!(self, ServerCredentials::Iam { .. })
    }

    pub fn username(&self) -> &str {
        match self {
            ServerCredentials::Password { username, .. } => {
                username.as_deref().unwrap_or(DEFAULT_USERNAME)
            }
            ServerCredentials::Iam { username, .. } => username,
        }
    }

    pub(crate) fn to_wire(&self) -> AuthenticationInfo {
        match self {
            ServerCredentials::Password { password, .. } => AuthenticationInfo {
                username: self.username().to_string(),
                password: password.clone(),
                iam_credentials: None,
            },
            ServerCredentials::Iam { username, config } => AuthenticationInfo {
                username: username.clone(),
                password: String::new(),
                iam_credentials: Some(config.to_wire()),
            },
        }
    }
}
