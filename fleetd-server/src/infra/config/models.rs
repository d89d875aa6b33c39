use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub shutdown: ShutdownConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

impl Config {
    /// Port the public surface listens on.
    pub fn public_port(&self) -> u16 {
        self.server.public_port.unwrap_or(self.server.base_port)
    }

    /// Port the gateway surface listens on. Adjacent to the base port unless
    /// configured explicitly.
    pub fn gateway_port(&self) -> u16 {
        self.server
            .gateway_port
            .unwrap_or(self.server.base_port.wrapping_add(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cors: CorsConfig::default(),
            shutdown: ShutdownConfig::default(),
            dev_mode: false,
            metadata: ConfigMetadata::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub base_port: u16,
    pub public_port: Option<u16>,
    pub gateway_port: Option<u16>,
    /// URL path prefix the public API is served under, e.g. `/fleetd`.
    pub public_url_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            base_port: 8000,
            public_port: None,
            gateway_port: None,
            public_url_prefix: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// PostgreSQL URL. Absent means the in-memory store.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    pub drain_timeout_secs: u64,
}

impl ShutdownConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_port_is_adjacent_by_default() {
        let config = Config::default();
        assert_eq!(config.gateway_port(), config.public_port() + 1);
    }

    #[test]
    fn explicit_ports_override_the_base() {
        let mut config = Config::default();
        config.server.public_port = Some(9100);
        config.server.gateway_port = Some(9300);
        assert_eq!(config.public_port(), 9100);
        assert_eq!(config.gateway_port(), 9300);
    }
}
