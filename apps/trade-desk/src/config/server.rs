//! Listener settings for the REST API.

use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Where the REST API listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port for `/health` and `/api/v1/*`.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Interface to bind, as an IP literal.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl ServerConfig {
    /// Socket address the listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.bind_address.trim().parse()?;
        Ok(SocketAddr::new(ip, self.http_port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            bind_address: default_bind_address(),
        }
    }
}

pub(crate) const fn default_http_port() -> u16 {
    8080
}

pub(crate) fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_listens_on_all_interfaces() {
        let addr = ServerConfig::default().socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn ipv6_bind_address() {
        let config = ServerConfig {
            http_port: 9000,
            bind_address: "::1".to_string(),
        };
        assert_eq!(config.socket_addr().unwrap().to_string(), "[::1]:9000");
    }

    #[test]
    fn hostname_is_not_an_address() {
        let config = ServerConfig {
            http_port: 9000,
            bind_address: "localhost".to_string(),
        };
        assert!(config.socket_addr().is_err());
    }
}
