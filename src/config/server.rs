use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

const API_KEY_ENV: &str = "SKYWATCH_API_KEY";

/// Settings for the trigger and status API.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Whether the supervisor starts the API at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Socket the API binds to.
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,

    /// Bearer token for `POST /cycle`. Read from `SKYWATCH_API_KEY` when the
    /// file leaves it out; never written back out.
    #[serde(default = "api_key_from_env", skip_serializing)]
    pub api_key: Option<String>,
}

impl ServerConfig {
    /// True when `token` equals the configured key. With no key configured
    /// nothing is accepted.
    pub fn accepts(&self, token: &str) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty() && key == token)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            listen_address: default_listen_address(),
            api_key: api_key_from_env(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty())
}
