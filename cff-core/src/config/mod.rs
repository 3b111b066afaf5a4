//! Configuration Management.
//!
//! This module defines how configuration is structured, loaded, validated and
//! accessed.
//!
//! ## Key Components
//!
//! - [`types`]: [`CoreConfig`] and its sections ([`LoggingConfig`], [`ApiConfig`],
//!   [`NotificationsConfig`]).
//! - [`defaults`]: Functions returning the default value of every setting.
//! - [`loader`]: [`ConfigLoader`], which reads the system and user TOML files,
//!   merges them, applies environment overrides and validates the result.
//!
//! ## Configuration Loading Process
//!
//! 1. `ConfigLoader::load()` (or `load_from_path`) is called.
//! 2. The system file and the user file are read; missing files are skipped.
//! 3. Both TOML documents are merged table by table, the user file winning.
//! 4. The merged document is deserialized into `CoreConfig`; absent settings use
//!    their defaults, unknown settings are a [`crate::error::ConfigError::ParseError`].
//! 5. `CFF_API_BASE_URL` and `CFF_NOTIFICATION_TRANSPORT` override the file values.
//! 6. The result is validated and normalized; failures are
//!    [`crate::error::ConfigError::ValidationError`].

pub mod defaults;
pub mod types;
pub mod loader;

pub use types::{ApiConfig, CoreConfig, LoggingConfig, NotificationsConfig, TransportKind};
pub use loader::ConfigLoader;
