//! # Application Configuration
//!
//! Bind address, token secret and upload destination. Values come from
//! the environment with serde defaults, so a config file and plain env
//! vars both work.

use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 4000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// HMAC secret for session tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Directory accepted uploads are written to (default: "upload")
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_jwt_secret() -> String {
    "insecure-dev-secret".to_string()
}

fn default_upload_dir() -> String {
    "upload".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            jwt_secret: default_jwt_secret(),
            upload_dir: default_upload_dir(),
        }
    }
}

impl AppConfig {
    /// Build a config from `LODGELY_*` environment variables, falling
    /// back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("LODGELY_HOST") {
            config.host = host;
        }
        if let Some(port) = std::env::var("LODGELY_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
        {
            config.port = port;
        }
        if let Ok(secret) = std::env::var("LODGELY_JWT_SECRET") {
            config.jwt_secret = secret;
        }
        if let Ok(dir) = std::env::var("LODGELY_UPLOAD_DIR") {
            config.upload_dir = dir;
        }
        config
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
