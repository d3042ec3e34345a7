use std::net::Ipv6Addr;

use crate::payload::Payload;

pub const DEFAULT_HOST: &str = "192.168.1.4";
pub const DEFAULT_PORT: u16 = 50000;

/// Where to send, and what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderConfig {
    pub host: String,
    pub port: u16,
    pub payload: Payload,
}

impl SenderConfig {
    pub fn new(host: impl Into<String>, port: u16, payload: Payload) -> Self {
        SenderConfig {
            host: host.into(),
            port,
            payload,
        }
    }

    /// `host:port`, with IPv6 literals bracketed so the address can be resolved.
    pub fn addr(&self) -> String {
        match self.host.parse::<Ipv6Addr>() {
            Ok(_) => format!("[{}]:{}", self.host, self.port),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        SenderConfig::new(DEFAULT_HOST, DEFAULT_PORT, Payload::default())
    }
}
