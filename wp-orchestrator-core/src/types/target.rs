//! 远程主机连接参数

use serde::{Deserialize, Serialize};
use wp_orchestrator_provider::mask_secret;

fn default_port() -> u16 {
    22
}

fn default_login() -> String {
    "root".to_string()
}

/// Where and as whom to connect. Key-pair auth needs nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTarget {
    /// Server address, also the key repository lookup key
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_login")]
    pub login: String,
}

impl HostTarget {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: default_port(),
            login: default_login(),
        }
    }
}

/// Password credentials, only needed while the key pair is not yet installed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAccess {
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_login")]
    pub login: String,
    pub password: String,
}

impl ServerAccess {
    pub fn target(&self) -> HostTarget {
        HostTarget {
            address: self.address.clone(),
            port: self.port,
            login: self.login.clone(),
        }
    }
}

impl std::fmt::Debug for ServerAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerAccess")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("password", &mask_secret(&self.password))
            .finish()
    }
}

/// How a session authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// First contact with a fresh host
    Password(String),
    /// The per-server key pair, resolved by the executor's key repository
    KeyPair,
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(****)"),
            Self::KeyPair => f.write_str("KeyPair"),
        }
    }
}
