//! # Calcutta Fresh Foods Core Library (`cff-core`)
//!
//! `cff-core` is the foundational library shared by the Calcutta Fresh Foods
//! admin tooling. It carries the ambient concerns every other crate in the
//! workspace relies on, so that domain crates such as `cff-notifications` only
//! deal with their own semantics.
//!
//! ## Purpose
//!
//! - **Error Handling**: A unified error system through the [`CoreError`] enum and
//!   the more specific [`ConfigError`].
//! - **Configuration Management**: TOML configuration loading, merging of the
//!   system-wide and per-user files, environment overrides and validation through
//!   [`ConfigLoader`] and [`CoreConfig`].
//! - **Logging**: A logging setup built on the `tracing` ecosystem, configurable
//!   for console and rolling-file output in text or JSON.
//! - **Utility Functions**: Filesystem helpers (`utils::fs`) including atomic
//!   writes, and XDG path resolution (`utils::paths`).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cff_core::config::ConfigLoader;
//! use cff_core::logging::initialize_logging;
//! use cff_core::error::CoreError;
//!
//! fn main() -> Result<(), CoreError> {
//!     let config = ConfigLoader::load()?;
//!     initialize_logging(&config.logging, false)?;
//!     tracing::info!(base_url = %config.api.base_url, "core initialized");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod config;
pub mod logging;
pub mod utils;

// Re-export key types for convenience
pub use error::{CoreError, ConfigError};
pub use config::{
    ApiConfig, ConfigLoader, CoreConfig, LoggingConfig, NotificationsConfig, TransportKind,
};
pub use logging::{initialize_logging, init_minimal_logging};
pub use utils::{ensure_dir_exists, read_to_string, write_string_atomically};
