//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError, StorageBackend};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "pizzahub.toml",
    "./config/config.toml",
    "/etc/pizzahub/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok())?;

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("PIZZAHUB_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `PIZZAHUB_*` overrides read through `lookup`.
/// An unknown storage backend is rejected rather than defaulted.
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(val) = lookup("PIZZAHUB_HTTP_PORT") {
        match val.parse() {
            Ok(port) => config.http.port = port,
            Err(_) => warn!(value = %val, "Ignoring invalid PIZZAHUB_HTTP_PORT"),
        }
    }
    if let Some(val) = lookup("PIZZAHUB_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("PIZZAHUB_CORS_ORIGINS") {
        config.http.cors_origins = split_list(&val);
    }

    // Storage
    if let Some(val) = lookup("PIZZAHUB_STORAGE_BACKEND") {
        match StorageBackend::parse(&val) {
            Some(backend) => config.storage.backend = backend,
            None => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown PIZZAHUB_STORAGE_BACKEND '{}' (expected mongodb or memory)",
                    val
                )));
            }
        }
    }

    // MongoDB
    if let Some(val) = lookup("PIZZAHUB_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("PIZZAHUB_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }
    if let Some(val) = lookup("PIZZAHUB_MONGODB_USERS_COLLECTION") {
        config.mongodb.users_collection = val;
    }

    // Auth
    if let Some(val) = lookup("PIZZAHUB_JWT_SECRET") {
        config.auth.jwt_secret = val;
    }
    if let Some(val) = lookup("PIZZAHUB_JWT_ISSUER") {
        config.auth.issuer = val;
    }
    if let Some(val) = lookup("PIZZAHUB_JWT_AUDIENCE") {
        config.auth.audience = val;
    }
    if let Some(val) = lookup("PIZZAHUB_SESSION_TTL_SECS") {
        if let Ok(ttl) = val.parse() {
            config.auth.session_ttl_secs = ttl;
        }
    }
    if let Some(val) = lookup("PIZZAHUB_SESSION_COOKIE") {
        config.auth.cookie_name = val;
    }
    if let Some(val) = lookup("PIZZAHUB_SUPER_ADMIN_EMAILS") {
        config.auth.super_admin_emails = split_list(&val);
    }

    // General
    if let Some(val) = lookup("PIZZAHUB_DEV_MODE") {
        config.dev_mode = val == "1" || val.eq_ignore_ascii_case("true");
    }

    Ok(())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
