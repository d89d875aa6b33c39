//! Raw configuration sources before composition.

use std::path::PathBuf;

use serde::Deserialize;

use super::validation::ConfigWarnings;

/// Shape of `fleetd.toml`. Every field is optional; absent values fall back
/// to defaults or environment overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server: Option<FileServerConfig>,
    pub database: Option<FileDatabaseConfig>,
    pub cors: Option<FileCorsConfig>,
    pub shutdown: Option<FileShutdownConfig>,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileServerConfig {
    pub host: Option<String>,
    pub base_port: Option<u16>,
    pub public_port: Option<u16>,
    pub gateway_port: Option<u16>,
    pub public_url_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileDatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileCorsConfig {
    pub allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileShutdownConfig {
    pub drain_timeout_secs: Option<u64>,
}

/// Environment overrides, gathered once. Unparseable numeric values are
/// dropped with a warning rather than failing startup.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub host: Option<String>,
    pub base_port: Option<u16>,
    pub public_port: Option<u16>,
    pub gateway_port: Option<u16>,
    pub public_url_prefix: Option<String>,
    pub database_url: Option<String>,
    pub dev_mode: Option<bool>,
    pub drain_timeout_secs: Option<u64>,
    pub config_path: Option<PathBuf>,
}

impl EnvConfig {
    pub fn gather(warnings: &mut ConfigWarnings) -> Self {
        Self {
            host: var("FLEETD_HOST"),
            base_port: parsed_var("FLEETD_BASE_PORT", warnings),
            public_port: parsed_var("FLEETD_PUBLIC_PORT", warnings),
            gateway_port: parsed_var("FLEETD_GATEWAY_PORT", warnings),
            public_url_prefix: var("FLEETD_PUBLIC_URL_PREFIX"),
            database_url: var("DATABASE_URL"),
            dev_mode: parsed_var("FLEETD_DEV_MODE", warnings),
            drain_timeout_secs: parsed_var("FLEETD_DRAIN_TIMEOUT_SECS", warnings),
            config_path: var("FLEETD_CONFIG").map(PathBuf::from),
        }
    }
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(
    key: &str,
    warnings: &mut ConfigWarnings,
) -> Option<T> {
    let raw = var(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warnings.push(format!("ignoring unparseable {key}={raw}"));
            None
        }
    }
}
