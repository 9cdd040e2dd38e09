//! LAN transport configuration.

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Deserialize;

/// Where and how patiently to talk to bulbs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LanConfig {
    /// Destination of discovery broadcasts.
    pub broadcast: Ipv4Addr,
    /// UDP port bulbs listen on.
    pub port: u16,
    /// How long to wait for a reply before re-sending a request, in milliseconds.
    pub request_timeout_ms: u64,
    /// How many times a request is sent before giving up.
    pub send_attempts: u32,
    /// How long discovery collects replies, in milliseconds.
    pub discovery_timeout_ms: u64,
}

impl Default for LanConfig {
    fn default() -> Self {
        Self {
            broadcast: Ipv4Addr::BROADCAST,
            port: 56700,
            request_timeout_ms: 1000,
            send_attempts: 3,
            discovery_timeout_ms: 2000,
        }
    }
}

impl LanConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }
}
