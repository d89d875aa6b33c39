use once_cell::sync::Lazy;
use std::{fs, path::PathBuf};
use thiserror::Error;

use super::{
    models::{
        Config, ConfigMetadata, CorsConfig, DatabaseConfig, ServerConfig,
        ShutdownConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::ConfigWarnings,
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("fleetd.toml"),
        PathBuf::from("config/fleetd.toml"),
    ]
});

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file not found: {path}")]
    MissingConfig { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to load env file: {0}")]
    Env(#[from] dotenvy::Error),
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let mut warnings = ConfigWarnings::default();
        let env_config = EnvConfig::gather(&mut warnings);

        let (file_config, config_path) =
            self.load_file_config(&env_config, &mut warnings)?;

        let config = compose_config(
            file_config,
            env_config,
            config_path,
            env_file_loaded,
            &mut warnings,
        );

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
        warnings: &mut ConfigWarnings,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        // Explicit path (CLI or env) must exist; default locations are
        // optional.
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env_config.config_path.clone());

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::MissingConfig { path });
                }
                Some(path)
            }
            None => DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
                .cloned(),
        };

        let Some(path) = path else {
            warnings.push_with_hint(
                "no fleetd.toml detected; falling back to environment variables",
                "place a fleetd.toml next to the binary or set FLEETD_CONFIG",
            );
            return Ok((None, None));
        };

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
    warnings: &mut ConfigWarnings,
) -> Config {
    let file = file_config.unwrap_or_default();
    let file_server = file.server.unwrap_or_default();
    let file_database = file.database.unwrap_or_default();
    let file_cors = file.cors.unwrap_or_default();
    let file_shutdown = file.shutdown.unwrap_or_default();

    let defaults = ServerConfig::default();
    let server = ServerConfig {
        host: env.host.or(file_server.host).unwrap_or(defaults.host),
        base_port: env
            .base_port
            .or(file_server.base_port)
            .unwrap_or(defaults.base_port),
        public_port: env.public_port.or(file_server.public_port),
        gateway_port: env.gateway_port.or(file_server.gateway_port),
        public_url_prefix: normalize_prefix(
            env.public_url_prefix
                .or(file_server.public_url_prefix)
                .unwrap_or(defaults.public_url_prefix),
            warnings,
        ),
    };

    let config = Config {
        server,
        database: DatabaseConfig {
            url: env.database_url.or(file_database.url),
        },
        cors: CorsConfig {
            allowed_origins: file_cors.allowed_origins.unwrap_or_default(),
        },
        shutdown: ShutdownConfig {
            drain_timeout_secs: env
                .drain_timeout_secs
                .or(file_shutdown.drain_timeout_secs)
                .unwrap_or(ShutdownConfig::default().drain_timeout_secs),
        },
        dev_mode: env.dev_mode.or(file.dev_mode).unwrap_or(false),
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded,
        },
    };

    if config.public_port() == config.gateway_port() && config.public_port() != 0
    {
        warnings.push(format!(
            "public and gateway surfaces both resolve to port {}; one of them will fail to bind",
            config.public_port()
        ));
    }

    config
}

/// Prefixes must be rooted and carry no trailing slash; `/` means "no
/// prefix".
fn normalize_prefix(raw: String, warnings: &mut ConfigWarnings) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return "/".to_string();
    }
    let rooted = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        warnings.push(format!(
            "public_url_prefix {trimmed:?} is not rooted; prepending '/'"
        ));
        format!("/{trimmed}")
    };
    rooted.trim_end_matches('/').to_string()
}
