//! Pizza Hub Configuration System
//!
//! TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub mongodb: MongoConfig,
    pub auth: AuthConfig,

    /// Seed development users and log their session tokens
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            storage: StorageConfig::default(),
            mongodb: MongoConfig::default(),
            auth: AuthConfig::default(),
            dev_mode: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Which user store backs the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mongodb,
    Memory,
}

impl StorageBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Some(Self::Mongodb),
            "memory" | "in-memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Mongodb,
        }
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub users_collection: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "pizzahub".to_string(),
            users_collection: "users".to_string(),
        }
    }
}

/// Session and authorization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub session_ttl_secs: i64,
    pub cookie_name: String,
    /// Emails granted super-admin capability. Never stored as a role.
    pub super_admin_emails: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: "pizzahub".to_string(),
            audience: "pizzahub".to_string(),
            session_ttl_secs: 2_592_000, // 30 days
            cookie_name: "ph_session".to_string(),
            super_admin_emails: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::ValidationError("http.port must be non-zero".to_string()));
        }
        if self.auth.jwt_secret.is_empty() && !self.dev_mode {
            return Err(ConfigError::ValidationError(
                "auth.jwt_secret is required outside dev mode".to_string(),
            ));
        }
        if self.auth.session_ttl_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.session_ttl_secs must be positive".to_string(),
            ));
        }
        if self.storage.backend == StorageBackend::Mongodb && self.mongodb.uri.trim().is_empty() {
            return Err(ConfigError::ValidationError("mongodb.uri is required".to_string()));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Pizza Hub Configuration
# Environment variables (PIZZAHUB_*) override these settings

dev_mode = false

[http]
port = 8080
host = "0.0.0.0"
cors_origins = ["http://localhost:3000"]

[storage]
backend = "mongodb"  # mongodb or memory

[mongodb]
uri = "mongodb://localhost:27017"
database = "pizzahub"
users_collection = "users"

[auth]
jwt_secret = ""
issuer = "pizzahub"
audience = "pizzahub"
session_ttl_secs = 2592000
cookie_name = "ph_session"
super_admin_emails = []
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Mongodb);
        assert_eq!(config.mongodb.users_collection, "users");
        assert_eq!(config.auth.cookie_name, "ph_session");
        assert!(config.auth.super_admin_emails.is_empty());
    }

    #[test]
    fn test_example_toml_parses() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.mongodb.database, "pizzahub");
        assert_eq!(config.auth.session_ttl_secs, 2_592_000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[auth]
super_admin_emails = ["owner@pizzahub.test"]

[storage]
backend = "memory"
"#,
        )
        .unwrap();
        assert_eq!(config.auth.super_admin_emails, vec!["owner@pizzahub.test"]);
        assert_eq!(config.auth.issuer, "pizzahub");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn test_validate_requires_secret_outside_dev_mode() {
        let mut config = AppConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.dev_mode = true;
        assert!(config.validate().is_ok());

        config.dev_mode = false;
        config.auth.jwt_secret = "secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "secret".to_string();
        config.http.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(StorageBackend::parse("MongoDB"), Some(StorageBackend::Mongodb));
        assert_eq!(StorageBackend::parse("memory"), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::parse("postgres"), None);
    }
}
