//! Configuration Loading.
//!
//! This module provides the [`ConfigLoader`] struct, which loads, merges,
//! overrides and validates the [`CoreConfig`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use cff_core::config::ConfigLoader;
//!
//! match ConfigLoader::load() {
//!     Ok(config) => println!("Backend: {}", config.api.base_url),
//!     Err(e) => {
//!         cff_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration loading failed: {}", e);
//!     }
//! }
//! ```
//!
//! ## Sources, lowest precedence first
//!
//! 1. Built-in defaults.
//! 2. The system file (`/etc/cff/config.toml`, or `CFF_SYSTEM_CONFIG_PATH`).
//! 3. The user file (`<XDG config>/cff-admin/config.toml`), or an explicit path
//!    passed to [`ConfigLoader::load_from_path`].
//! 4. Environment: `CFF_API_BASE_URL`, `CFF_NOTIFICATION_TRANSPORT`.
//!
//! Tables are merged key by key, so a user file may override a single field of
//! a section defined by the system file. Missing files are skipped.

use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;
use url::Url;

use crate::config::{CoreConfig, TransportKind};
use crate::error::{ConfigError, CoreError};
use crate::utils::fs as cff_fs;
use crate::utils::paths::{get_app_config_dir, get_app_state_dir, get_system_config_path};

/// Environment variable overriding `api.base_url`.
pub const BASE_URL_ENV: &str = "CFF_API_BASE_URL";
/// Environment variable overriding `notifications.transport`.
pub const TRANSPORT_ENV: &str = "CFF_NOTIFICATION_TRANSPORT";

/// `ConfigLoader` provides static methods to load and validate `CoreConfig`.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the configuration from the system file and the per-user file.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DirectoryUnavailable`] if the user config dir cannot be resolved.
    /// - [`ConfigError::ReadError`] for unreadable (but existing) files.
    /// - [`ConfigError::ParseError`] for invalid TOML or unknown fields.
    /// - [`ConfigError::ValidationError`] for out-of-range values.
    pub fn load() -> Result<CoreConfig, CoreError> {
        let user_config_path = get_app_config_dir()?.join("config.toml");
        Self::load_layers(&get_system_config_path(), &user_config_path, false)
    }

    /// Loads the configuration using `path` in place of the per-user file.
    ///
    /// Unlike the implicit user file, an explicitly requested file must exist.
    pub fn load_from_path(path: &Path) -> Result<CoreConfig, CoreError> {
        Self::load_layers(&get_system_config_path(), path, true)
    }

    /// Parses a single TOML document, applies environment overrides and validates.
    pub fn from_toml_str(content: &str) -> Result<CoreConfig, CoreError> {
        let mut config: CoreConfig = toml::from_str(content)
            .map_err(|e| CoreError::Config(ConfigError::ParseError(e)))?;
        Self::apply_env_overrides(&mut config)?;
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    fn load_layers(system_path: &Path, user_path: &Path, user_required: bool) -> Result<CoreConfig, CoreError> {
        let system_toml = Self::read_toml(system_path, false)?;
        let user_toml = Self::read_toml(user_path, user_required)?;

        let mut config: CoreConfig = match Self::merge_toml_values(system_toml, user_toml) {
            Some(value) => value
                .try_into::<CoreConfig>()
                .map_err(|e| CoreError::Config(ConfigError::ParseError(e)))?,
            None => CoreConfig::default(),
        };

        Self::apply_env_overrides(&mut config)?;
        Self::validate_config(&mut config)?;
        tracing::debug!(
            system = %system_path.display(),
            user = %user_path.display(),
            transport = %config.notifications.transport,
            "configuration loaded"
        );
        Ok(config)
    }

    fn read_toml(path: &Path, required: bool) -> Result<Option<Value>, CoreError> {
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => content
                .parse::<Value>()
                .map(Some)
                .map_err(|e| CoreError::Config(ConfigError::ParseError(e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(None),
            Err(e) => Err(CoreError::Config(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })),
        }
    }

    /// Merges two optional TOML values. `override_val` takes precedence.
    fn merge_toml_values(base: Option<Value>, override_val: Option<Value>) -> Option<Value> {
        match (base, override_val) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(Value::Table(mut base_table)), Some(Value::Table(override_table))) => {
                Self::merge_toml_tables(&mut base_table, &override_table);
                Some(Value::Table(base_table))
            }
            (_, Some(o)) => Some(o),
        }
    }

    /// Recursively merges `override_table` into `base_table`.
    fn merge_toml_tables(base_table: &mut toml::map::Map<String, Value>, override_table: &toml::map::Map<String, Value>) {
        for (key, override_item) in override_table {
            match base_table.get_mut(key) {
                Some(base_item) => match (base_item, override_item) {
                    (Value::Table(bt), Value::Table(ot)) => Self::merge_toml_tables(bt, ot),
                    (slot, _) => *slot = override_item.clone(),
                },
                None => {
                    base_table.insert(key.clone(), override_item.clone());
                }
            }
        }
    }

    fn apply_env_overrides(config: &mut CoreConfig) -> Result<(), CoreError> {
        Self::apply_overrides(
            config,
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(TRANSPORT_ENV).ok(),
        )
    }

    /// Applies explicit overrides of the backend URL and transport.
    ///
    /// Empty values are ignored. Used for environment variables and command-line flags.
    pub fn apply_overrides(
        config: &mut CoreConfig,
        base_url: Option<String>,
        transport: Option<String>,
    ) -> Result<(), CoreError> {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            config.api.base_url = url.trim().to_string();
        }
        if let Some(kind) = transport.filter(|t| !t.trim().is_empty()) {
            config.notifications.transport = kind
                .parse::<TransportKind>()
                .map_err(|e| CoreError::Config(ConfigError::ValidationError(e)))?;
        }
        Ok(())
    }

    /// Validates the configuration and normalizes it in place.
    ///
    /// - Log level and format are lower-cased and checked.
    /// - `api.base_url` must be an absolute http(s) URL; a trailing `/` is stripped.
    /// - Resource paths must start with `/`.
    /// - Intervals, timeouts and the panel limit must be positive, and the
    ///   reconnect backoff must not start above its ceiling.
    /// - A relative log file path is made absolute against the app state directory
    ///   and its parent directory is created.
    pub fn validate_config(config: &mut CoreConfig) -> Result<(), CoreError> {
        let invalid = |msg: String| CoreError::Config(ConfigError::ValidationError(msg));

        let level_lower = config.logging.level.to_lowercase();
        match level_lower.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.logging.level = level_lower,
            _ => {
                return Err(invalid(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                )))
            }
        }

        let format_lower = config.logging.format.to_lowercase();
        match format_lower.as_str() {
            "text" | "json" => config.logging.format = format_lower,
            _ => {
                return Err(invalid(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                )))
            }
        }

        let parsed = Url::parse(&config.api.base_url)
            .map_err(|e| invalid(format!("Invalid api.base_url '{}': {}", config.api.base_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(invalid(format!(
                "api.base_url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();

        for (name, path) in [
            ("api.notifications_path", &config.api.notifications_path),
            ("api.socket_path", &config.api.socket_path),
            ("notifications.assign_path", &config.notifications.assign_path),
        ] {
            if !path.starts_with('/') {
                return Err(invalid(format!("{} must start with '/', got '{}'", name, path)));
            }
        }

        if config.api.request_timeout_ms == 0 {
            return Err(invalid("api.request_timeout_ms must be greater than zero".to_string()));
        }
        let n = &config.notifications;
        if n.poll_interval_ms == 0 {
            return Err(invalid("notifications.poll_interval_ms must be greater than zero".to_string()));
        }
        if n.panel_limit == 0 {
            return Err(invalid("notifications.panel_limit must be greater than zero".to_string()));
        }
        if n.reconnect_initial_ms == 0 || n.reconnect_initial_ms > n.reconnect_max_ms {
            return Err(invalid(format!(
                "notifications.reconnect_initial_ms ({}) must be in 1..=reconnect_max_ms ({})",
                n.reconnect_initial_ms, n.reconnect_max_ms
            )));
        }

        if let Some(log_path) = config.logging.file_path.clone() {
            let absolute: PathBuf = if log_path.is_absolute() {
                log_path
            } else {
                get_app_state_dir()?.join(log_path)
            };
            if let Some(parent_dir) = absolute.parent() {
                if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                    cff_fs::ensure_dir_exists(parent_dir)?;
                }
            }
            config.logging.file_path = Some(absolute);
        }

        Ok(())
    }
}
