//! OSC transport configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Default local UDP port the bridge sends from
pub const OSC_LOCAL_PORT: u16 = 57121;

/// Default host receiving control messages
pub const OSC_REMOTE_HOST: &str = "127.0.0.1";

/// Default port receiving control messages
pub const OSC_REMOTE_PORT: u16 = 57120;

/// UDP endpoints for outbound control messages
#[derive(Debug, Clone, Deserialize)]
pub struct OscConfig {
    #[serde(default = "default_local_address")]
    pub local_address: String,

    #[serde(default = "default_local_port")]
    pub local_port: u16,

    #[serde(default = "default_remote_host")]
    pub remote_host: String,

    #[serde(default = "default_remote_port")]
    pub remote_port: u16,
}

impl OscConfig {
    pub fn local_addr(&self) -> String {
        format!("{}:{}", self.local_address, self.local_port)
    }

    pub fn remote_addr(&self) -> String {
        format!("{}:{}", self.remote_host, self.remote_port)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.remote_host.trim().is_empty() {
            return Err(ValidationError::MissingRequired("osc.remote_host"));
        }
        if self.local_port == 0 {
            return Err(ValidationError::InvalidPort("osc.local_port"));
        }
        if self.remote_port == 0 {
            return Err(ValidationError::InvalidPort("osc.remote_port"));
        }
        Ok(())
    }
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            local_address: default_local_address(),
            local_port: default_local_port(),
            remote_host: default_remote_host(),
            remote_port: default_remote_port(),
        }
    }
}

fn default_local_address() -> String {
    "0.0.0.0".to_string()
}

fn default_local_port() -> u16 {
    OSC_LOCAL_PORT
}

fn default_remote_host() -> String {
    OSC_REMOTE_HOST.to_string()
}

fn default_remote_port() -> u16 {
    OSC_REMOTE_PORT
}
