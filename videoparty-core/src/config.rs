use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::resilience::timeout::PERSISTENCE_TIMEOUT;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub logging: LoggingConfig,
    pub room: RoomConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    /// Origins allowed by CORS; empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 8080,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL URL. Empty selects the in-memory store.
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HMAC secret used to sign and verify bearer tokens
    pub secret: String,
    pub access_token_duration_hours: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_duration_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// Room session tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Length of generated room codes
    pub code_length: usize,
    /// How many codes to try before giving up on a collision streak
    pub max_code_attempts: u32,
    /// Upper bound for a single persistence call
    pub persistence_timeout_ms: u64,
    /// Per-room playback event buffer for live subscribers
    pub event_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            max_code_attempts: 5,
            persistence_timeout_ms: PERSISTENCE_TIMEOUT.as_millis() as u64,
            event_buffer: 64,
        }
    }
}

impl RoomConfig {
    #[must_use]
    pub const fn persistence_timeout(&self) -> Duration {
        Duration::from_millis(self.persistence_timeout_ms)
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // VIDEOPARTY_SERVER__HTTP_PORT, VIDEOPARTY_ROOM__CODE_LENGTH, ...
        builder = builder.add_source(
            Environment::with_prefix("VIDEOPARTY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    #[must_use]
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }

    #[must_use]
    pub fn uses_database(&self) -> bool {
        !self.database.url.is_empty()
    }

    /// Check the configuration, collecting every problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.http_port == 0 {
            errors.push("server.http_port must be non-zero".to_string());
        }
        if self.jwt.secret.is_empty() {
            errors.push("JWT secret is not set (jwt.secret)".to_string());
        }
        if self.jwt.access_token_duration_hours == 0 {
            errors.push("jwt.access_token_duration_hours must be at least 1".to_string());
        }
        if !(4..=16).contains(&self.room.code_length) {
            errors.push(format!(
                "room.code_length must be between 4 and 16, got {}",
                self.room.code_length
            ));
        }
        if self.room.max_code_attempts == 0 {
            errors.push("room.max_code_attempts must be at least 1".to_string());
        }
        if self.room.persistence_timeout_ms == 0 {
            errors.push("room.persistence_timeout_ms must be non-zero".to_string());
        }
        if self.room.event_buffer == 0 {
            errors.push("room.event_buffer must be non-zero".to_string());
        }
        if self.uses_database() && self.database.min_connections > self.database.max_connections {
            errors.push("database.min_connections exceeds database.max_connections".to_string());
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            errors.push(format!(
                "logging.format must be \"json\" or \"pretty\", got {:?}",
                self.logging.format
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
