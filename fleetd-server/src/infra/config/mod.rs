//! Configuration loading and composition.
//!
//! Precedence, lowest to highest: built-in defaults, `fleetd.toml`,
//! environment variables, CLI flags (applied by `main`).

pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, ServerConfig,
    ShutdownConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
