//! XDG Base Directory and Application-Specific Path Resolution.
//!
//! This module resolves the directories the admin tooling reads configuration
//! from and writes state to. It relies on the `directories-next` crate.
//!
//! # Key Functions
//!
//! - [`get_app_config_dir()`]: e.g., `~/.config/cff-admin`.
//! - [`get_app_data_dir()`]: e.g., `~/.local/share/cff-admin`. Home of the local
//!   key-value store (the stand-in for browser local storage).
//! - [`get_app_state_dir()`]: e.g., `~/.local/state/cff-admin`. Relative log
//!   file paths are resolved against it.
//! - [`get_system_config_path()`]: `/etc/cff/config.toml`, or the value of
//!   `CFF_SYSTEM_CONFIG_PATH`.
//!
//! All functions return `Result<PathBuf, CoreError>`, yielding
//! [`ConfigError::DirectoryUnavailable`] if a directory cannot be determined
//! (e.g., when the HOME directory is not found).

use std::path::PathBuf;
use directories_next::{BaseDirs, ProjectDirs};
use crate::error::{ConfigError, CoreError};

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "CalcuttaFreshFoods";
const APPLICATION: &str = "cff-admin";

/// Environment variable overriding the system-wide configuration file.
pub const SYSTEM_CONFIG_PATH_ENV: &str = "CFF_SYSTEM_CONFIG_PATH";
const DEFAULT_SYSTEM_CONFIG_PATH: &str = "/etc/cff/config.toml";

fn project_dirs(dir_type: &str) -> Result<ProjectDirs, CoreError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or_else(|| {
        CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: dir_type.to_string(),
        })
    })
}

/// Returns the application-specific configuration directory.
///
/// # Errors
/// Returns [`ConfigError::DirectoryUnavailable`] if `ProjectDirs` cannot be initialized.
pub fn get_app_config_dir() -> Result<PathBuf, CoreError> {
    project_dirs("App Config").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the application-specific data directory.
///
/// # Errors
/// Returns [`ConfigError::DirectoryUnavailable`] if `ProjectDirs` cannot be initialized.
pub fn get_app_data_dir() -> Result<PathBuf, CoreError> {
    project_dirs("App Data").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Returns the primary base directory for user-specific state files.
///
/// On Linux this is `$XDG_STATE_HOME`, falling back to `$HOME/.local/state`.
/// Other platforms use the local data directory, since `directories-next`
/// offers no generic state directory.
pub fn get_state_base_dir() -> Result<PathBuf, CoreError> {
    BaseDirs::new()
        .map(|dirs| {
            #[cfg(target_os = "linux")]
            {
                match std::env::var("XDG_STATE_HOME") {
                    Ok(state_home) if !state_home.is_empty() => PathBuf::from(state_home),
                    _ => dirs.home_dir().join(".local/state"),
                }
            }
            #[cfg(not(target_os = "linux"))]
            {
                dirs.data_local_dir().to_path_buf()
            }
        })
        .ok_or_else(|| CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: "State Base".to_string(),
        }))
}

/// Returns the application-specific state directory (`<state base>/cff-admin`).
pub fn get_app_state_dir() -> Result<PathBuf, CoreError> {
    get_state_base_dir().map(|base| base.join(APPLICATION))
}

/// Returns the path of the system-wide configuration file.
///
/// `CFF_SYSTEM_CONFIG_PATH` takes precedence when set and non-empty.
pub fn get_system_config_path() -> PathBuf {
    match std::env::var(SYSTEM_CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_SYSTEM_CONFIG_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_dirs_end_with_application_name() {
        // Resolution can legitimately fail in HOME-less sandboxes; only check successes.
        if let Ok(dir) = get_app_state_dir() {
            assert!(dir.ends_with(APPLICATION));
        }
        if let Ok(dir) = get_app_config_dir() {
            assert!(dir.to_string_lossy().contains(APPLICATION));
        }
        if let Ok(dir) = get_app_data_dir() {
            assert!(dir.to_string_lossy().contains(APPLICATION));
        }
    }

    #[test]
    fn test_system_config_path_is_toml_file() {
        let path = get_system_config_path();
        assert!(path.is_absolute() || std::env::var(SYSTEM_CONFIG_PATH_ENV).is_ok());
    }
}
