//! Server configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Default port for static assets and directory listings
pub const HTTP_PORT: u16 = 8001;

/// Default port for keyboard WebSocket connections
pub const WS_PORT: u16 = 8080;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address both listeners bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the HTTP listener
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Port for the WebSocket listener
    #[serde(default = "default_ws_port")]
    pub ws_port: u16,

    /// Rust log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dump every inbound event at debug level
    #[serde(default)]
    pub verbose_logging: bool,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub log_json: bool,
}

impl ServerConfig {
    /// Address the HTTP listener binds to
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// Address the WebSocket listener binds to
    pub fn ws_addr(&self) -> String {
        format!("{}:{}", self.host, self.ws_port)
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::MissingRequired("server.host"));
        }
        if self.http_port == 0 {
            return Err(ValidationError::InvalidPort("server.http_port"));
        }
        if self.ws_port == 0 {
            return Err(ValidationError::InvalidPort("server.ws_port"));
        }
        if self.ws_port == self.http_port {
            return Err(ValidationError::PortConflict(self.ws_port));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            ws_port: default_ws_port(),
            log_level: default_log_level(),
            verbose_logging: false,
            log_json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    HTTP_PORT
}

fn default_ws_port() -> u16 {
    WS_PORT
}

fn default_log_level() -> String {
    "info,microtonal_bridge=debug".to_string()
}
