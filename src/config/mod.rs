//! Application configuration module
//!
//! Configuration is read from environment variables with the
//! `MICROTONAL_BRIDGE` prefix, nested values separated by `__`, after an
//! optional `.env` file. Every section has defaults, so an empty
//! environment yields a working bridge on the standard ports.
//!
//! # Example
//!
//! ```no_run
//! use microtonal_bridge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("WebSocket server on {}", config.server.ws_addr());
//! ```

mod error;
mod osc;
mod server;
mod static_files;

pub use error::{ConfigError, ValidationError};
pub use osc::{OscConfig, OSC_LOCAL_PORT, OSC_REMOTE_HOST, OSC_REMOTE_PORT};
pub use server::{ServerConfig, HTTP_PORT, WS_PORT};
pub use static_files::StaticFilesConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Listener host, ports and logging
    #[serde(default)]
    pub server: ServerConfig,

    /// UDP endpoints for control messages
    #[serde(default)]
    pub osc: OscConfig,

    /// Static asset root
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `MICROTONAL_BRIDGE__SERVER__WS_PORT=9090` -> `server.ws_port = 9090`
    /// - `MICROTONAL_BRIDGE__OSC__REMOTE_HOST=10.0.0.5` -> `osc.remote_host = "10.0.0.5"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its expected type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MICROTONAL_BRIDGE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.osc.validate()?;
        self.static_files.validate()?;
        Ok(())
    }
}
