//! Configuration module for ccms-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables. Also handles admin password hashing.

pub mod file;

use crate::config::file::{FileConfig, StoreBackend};
use ccms_core::config::{ServerConfig, SessionConfig, SharedConfig};
use ccms_core::password::{PasswordError, hash_password};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    HashError(#[from] PasswordError),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Admin account to seed, with its password already hashed.
#[derive(Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password_hash: String,
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub admin: Option<AdminSeed>,
    pub backend: StoreBackend,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with Arc<RwLock<T>> wrappers.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(self.server, self.session)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Validate the configuration
    /// 3. Hash the admin password if it's plaintext (and rewrite the file)
    /// 4. Apply CLI overrides
    /// 5. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        self.validate(&file_config)?;

        if !file_config.is_admin_password_hashed()
            && let Some(admin) = file_config.admin.as_mut()
        {
            admin.password = hash_password(&admin.password)?;
            self.rewrite_config(&file_config)?;
            tracing::info!("Admin password hashed and config file updated");
        }

        // Applied after the rewrite so the override never lands in the file.
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        Ok(build_loaded_config(file_config))
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if config.session.ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "session.ttl_secs must be positive".to_string(),
            ));
        }
        let max_ttl_secs = SessionConfig::MAX_TTL.whole_seconds().unsigned_abs();
        if config.session.ttl_secs > max_ttl_secs {
            return Err(ConfigError::ValidationError(format!(
                "session.ttl_secs must be at most {max_ttl_secs}"
            )));
        }
        if let Some(admin) = &config.admin {
            if admin.username.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "admin.username must not be empty".to_string(),
                ));
            }
            if admin.password.is_empty() {
                return Err(ConfigError::ValidationError(
                    "admin.password must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)?;

        // Write atomically: write to temp file, then rename
        let temp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string)?;
        std::fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    // ttl_secs was capped by validate().
    let ttl_secs = i64::try_from(file_config.session.ttl_secs).unwrap_or(i64::MAX);
    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
        },
        session: SessionConfig {
            ttl: time::Duration::seconds(ttl_secs),
            secure_cookie: file_config.session.secure_cookie,
        },
        admin: file_config.admin.map(|admin| AdminSeed {
            username: admin.username.trim().to_string(),
            password_hash: admin.password,
        }),
        backend: file_config.store.backend,
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
