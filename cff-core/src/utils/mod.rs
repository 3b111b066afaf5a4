//! General Utilities.
//!
//! # Submodules
//!
//! - [`fs`]: Filesystem utilities for ensuring directory existence, reading
//!   files, and atomic file replacement.
//! - [`paths`]: Resolution of XDG and application-specific directories.

pub mod fs;
pub mod paths;

pub use fs::{ensure_dir_exists, read_to_string, write_string_atomically};
