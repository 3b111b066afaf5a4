//! Default configuration values.
//!
//! These functions are used by `serde`'s `default` attribute in the configuration
//! structures to provide sensible values when a setting is absent from the
//! configuration file.

use crate::config::{ApiConfig, LoggingConfig, NotificationsConfig, TransportKind};
use std::path::PathBuf;

/// Returns the default `LoggingConfig`.
///
/// Used by `CoreConfig` if the `logging` section is missing from `config.toml`.
pub(super) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

/// Returns the default log level string (`"info"`).
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

/// Returns the default log file path (`None`, no file logging).
pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

/// Returns the default log format string (`"text"`).
pub(super) fn default_log_format() -> String {
    "text".to_string()
}

/// Returns the default `ApiConfig`.
pub(super) fn default_api_config() -> ApiConfig {
    ApiConfig {
        base_url: default_base_url(),
        notifications_path: default_notifications_path(),
        socket_path: default_socket_path(),
        request_timeout_ms: default_request_timeout_ms(),
    }
}

/// Backend address used when neither the file nor `CFF_API_BASE_URL` set one.
pub(super) fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

pub(super) fn default_notifications_path() -> String {
    "/api/notifications".to_string()
}

pub(super) fn default_socket_path() -> String {
    "/ws".to_string()
}

pub(super) fn default_request_timeout_ms() -> u64 {
    5_000
}

/// Returns the default `NotificationsConfig`.
pub(super) fn default_notifications_config() -> NotificationsConfig {
    NotificationsConfig {
        transport: default_transport(),
        poll_interval_ms: default_poll_interval_ms(),
        panel_limit: default_panel_limit(),
        storage_dir: None,
        sound_enabled: default_true(),
        secure_origin: false,
        assign_path: default_assign_path(),
        reconnect_initial_ms: default_reconnect_initial_ms(),
        reconnect_max_ms: default_reconnect_max_ms(),
    }
}

pub(super) fn default_transport() -> TransportKind {
    TransportKind::Polling
}

/// Poll period of the notifications endpoint (2 s).
pub(super) fn default_poll_interval_ms() -> u64 {
    2_000
}

/// Number of entries the panel shows.
pub(super) fn default_panel_limit() -> usize {
    20
}

pub(super) fn default_assign_path() -> String {
    "/assign".to_string()
}

pub(super) fn default_reconnect_initial_ms() -> u64 {
    1_000
}

pub(super) fn default_reconnect_max_ms() -> u64 {
    30_000
}

pub(super) fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config_values() {
        let lc = default_logging_config();
        assert_eq!(lc.level, "info");
        assert_eq!(lc.file_path, None);
        assert_eq!(lc.format, "text");
    }

    #[test]
    fn test_default_api_config_values() {
        let api = default_api_config();
        assert_eq!(api.base_url, "http://localhost:5000");
        assert_eq!(api.notifications_path, "/api/notifications");
        assert_eq!(api.request_timeout_ms, 5_000);
    }

    #[test]
    fn test_default_notifications_config_values() {
        let n = default_notifications_config();
        assert_eq!(n.transport, TransportKind::Polling);
        assert_eq!(n.poll_interval_ms, 2_000);
        assert_eq!(n.panel_limit, 20);
        assert!(n.sound_enabled);
        assert!(!n.secure_origin);
        assert_eq!(n.assign_path, "/assign");
        assert!(n.reconnect_initial_ms <= n.reconnect_max_ms);
    }
}
