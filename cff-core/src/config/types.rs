//! Configuration Data Structures.
//!
//! This module defines the structures that represent the configuration of the
//! admin tooling. They are populated by deserializing `config.toml`.
//!
//! # Key Structs
//! - [`CoreConfig`]: The root configuration structure.
//! - [`LoggingConfig`]: Configuration of the logging subsystem.
//! - [`ApiConfig`]: Where the backend REST API and its real-time channel live.
//! - [`NotificationsConfig`]: Behaviour of the order-notification bell.
//!
//! Missing fields take their values from [`super::defaults`]; unknown fields are
//! rejected via `#[serde(deny_unknown_fields)]`.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use super::defaults;

/// Configuration settings for the logging subsystem.
///
/// # Examples
///
/// ```
/// use cff_core::config::LoggingConfig;
/// use std::path::PathBuf;
///
/// let default_log_config = LoggingConfig::default();
/// assert_eq!(default_log_config.level, "info");
/// assert_eq!(default_log_config.file_path, None);
/// assert_eq!(default_log_config.format, "text");
///
/// let toml_str = r#"
/// level = "debug"
/// file_path = "/var/log/cff/bell.log"
/// format = "json"
/// "#;
/// let log_config: LoggingConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(log_config.level, "debug");
/// assert_eq!(log_config.file_path, Some(PathBuf::from("/var/log/cff/bell.log")));
/// assert_eq!(log_config.format, "json");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// The minimum log level to record.
    /// Valid values (case-insensitive): "trace", "debug", "info", "warn", "error".
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional path to a file where logs should be written.
    /// Relative paths are resolved against the application's state directory.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// The format for log messages. Valid values (case-insensitive): "text", "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Location of the backend the tooling talks to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the REST API, e.g. `https://api.calcuttafreshfoods.com`.
    /// Overridden by the `CFF_API_BASE_URL` environment variable.
    #[serde(default = "defaults::default_base_url")]
    pub base_url: String,
    /// Path of the notifications resource, relative to `base_url`.
    #[serde(default = "defaults::default_notifications_path")]
    pub notifications_path: String,
    /// Path of the real-time channel, relative to `base_url`.
    #[serde(default = "defaults::default_socket_path")]
    pub socket_path: String,
    /// Upper bound for a single HTTP request, in milliseconds.
    #[serde(default = "defaults::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        defaults::default_api_config()
    }
}

/// How new notifications reach the bell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Periodic `GET` of the notifications endpoint.
    Polling,
    /// Persistent WebSocket connection delivering one event per new order.
    Push,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Polling => write!(f, "polling"),
            TransportKind::Push => write!(f, "push"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "polling" | "poll" => Ok(TransportKind::Polling),
            "push" | "socket" | "websocket" => Ok(TransportKind::Push),
            other => Err(format!("unknown transport '{}', expected polling or push", other)),
        }
    }
}

/// Settings of the order-notification bell.
///
/// ```
/// use cff_core::config::{NotificationsConfig, TransportKind};
///
/// let cfg: NotificationsConfig = toml::from_str(r#"
/// transport = "push"
/// panel_limit = 10
/// "#).unwrap();
/// assert_eq!(cfg.transport, TransportKind::Push);
/// assert_eq!(cfg.panel_limit, 10);
/// assert_eq!(cfg.poll_interval_ms, 2000);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Which source strategy feeds the bell.
    #[serde(default = "defaults::default_transport")]
    pub transport: TransportKind,
    /// Poll period for the polling transport, in milliseconds.
    #[serde(default = "defaults::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Maximum number of entries listed in the panel.
    #[serde(default = "defaults::default_panel_limit")]
    pub panel_limit: usize,
    /// Directory of the local key-value store. Defaults to the app data dir.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
    /// Whether alerts may play a sound at all.
    #[serde(default = "defaults::default_true")]
    pub sound_enabled: bool,
    /// Force `wss://` for the push channel even when `base_url` is plain http.
    #[serde(default)]
    pub secure_origin: bool,
    /// Path of the order-assignment screen that panel entries link to.
    #[serde(default = "defaults::default_assign_path")]
    pub assign_path: String,
    /// First reconnect delay of the push transport, in milliseconds.
    #[serde(default = "defaults::default_reconnect_initial_ms")]
    pub reconnect_initial_ms: u64,
    /// Ceiling of the push transport's exponential backoff, in milliseconds.
    #[serde(default = "defaults::default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        defaults::default_notifications_config()
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use cff_core::config::CoreConfig;
///
/// let core_config = CoreConfig::default();
/// assert_eq!(core_config.logging.level, "info");
///
/// let toml_str = r#"
/// [logging]
/// level = "warn"
///
/// [api]
/// base_url = "https://api.example.com"
/// "#;
/// let loaded: CoreConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(loaded.logging.level, "warn");
/// assert_eq!(loaded.api.base_url, "https://api.example.com");
/// assert_eq!(loaded.notifications.panel_limit, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_api_config")]
    pub api: ApiConfig,
    #[serde(default = "defaults::default_notifications_config")]
    pub notifications: NotificationsConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            logging: defaults::default_logging_config(),
            api: defaults::default_api_config(),
            notifications: defaults::default_notifications_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_core_config_deserialize_empty() {
        let config: CoreConfig = toml::from_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn test_logging_config_deserialize_partial() {
        let config: LoggingConfig = serde_json::from_str(r#"{"level": "debug"}"#).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.file_path, None);
        assert_eq!(config.format, "text");
    }

    #[test]
    fn test_notifications_config_full() {
        let config: CoreConfig = toml::from_str(
            r#"
            [notifications]
            transport = "push"
            poll_interval_ms = 500
            panel_limit = 5
            storage_dir = "/tmp/cff"
            sound_enabled = false
            secure_origin = true
            assign_path = "/orders/assign"
            reconnect_initial_ms = 250
            reconnect_max_ms = 4000
            "#,
        )
        .unwrap();
        let n = config.notifications;
        assert_eq!(n.transport, TransportKind::Push);
        assert_eq!(n.poll_interval_ms, 500);
        assert_eq!(n.panel_limit, 5);
        assert_eq!(n.storage_dir, Some(PathBuf::from("/tmp/cff")));
        assert!(!n.sound_enabled);
        assert!(n.secure_origin);
        assert_eq!(n.assign_path, "/orders/assign");
        assert_eq!(n.reconnect_initial_ms, 250);
        assert_eq!(n.reconnect_max_ms, 4000);
    }

    #[test]
    fn test_core_config_rejects_unknown_section() {
        let result = toml::from_str::<CoreConfig>("[products]\npage_size = 10\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_api_config_rejects_unknown_field() {
        let result = toml::from_str::<ApiConfig>("base_url = \"http://x\"\ntoken = \"abc\"\n");
        assert!(result.is_err());
    }

    #[rstest]
    #[case("polling", TransportKind::Polling)]
    #[case("POLL", TransportKind::Polling)]
    #[case("push", TransportKind::Push)]
    #[case(" websocket ", TransportKind::Push)]
    fn test_transport_kind_from_str(#[case] input: &str, #[case] expected: TransportKind) {
        assert_eq!(input.parse::<TransportKind>().unwrap(), expected);
    }

    #[test]
    fn test_transport_kind_from_str_rejects_unknown() {
        assert!("carrier-pigeon".parse::<TransportKind>().is_err());
    }
}
