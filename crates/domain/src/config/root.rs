use serde::{Deserialize, Serialize};

use super::doh::DohConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;

/// Main configuration structure for relay-dns.
///
/// Read once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (bind address, port, concurrency ceiling)
    #[serde(default)]
    pub server: ServerConfig,

    /// Plain-UDP upstream configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// DNS-over-HTTPS JSON endpoint configuration
    #[serde(default)]
    pub doh: DohConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. relay-dns.toml in current directory
    /// 3. /etc/relay-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("relay-dns.toml").exists() {
            Self::from_file("relay-dns.toml")?
        } else if std::path::Path::new("/etc/relay-dns/config.toml").exists() {
            Self::from_file("/etc/relay-dns/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(upstream) = overrides.upstream {
            self.upstream.server = upstream;
        }
        if let Some(endpoint) = overrides.doh_endpoint {
            self.doh.endpoint = endpoint;
        }
        if overrides.no_doh {
            self.doh.enabled = false;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.upstream.server.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Upstream server '{}' is not a valid ip:port",
                self.upstream.server
            )));
        }

        if self.upstream.retries == 0 {
            return Err(ConfigError::Validation(
                "Upstream retries must be at least 1".to_string(),
            ));
        }

        if self.doh.enabled && !self.doh.endpoint.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "DoH endpoint '{}' must be an https:// URL",
                self.doh.endpoint
            )));
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub upstream: Option<String>,
    pub doh_endpoint: Option<String>,
    pub no_doh: bool,
    pub log_level: Option<String>,
}
