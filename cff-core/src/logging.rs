//! Logging setup.
//!
//! Built on the `tracing` ecosystem. Supports console output and optional
//! daily-rolling file output, each in text or JSON format.

use crate::config::LoggingConfig;
use crate::error::CoreError;
use crate::utils;

use std::io::stderr;
use std::path::Path;
use std::sync::Mutex;
use once_cell::sync::Lazy;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
    Registry,
};

/// Initializes a minimal logging setup, directing messages to `stderr`.
///
/// Intended for tests, early start-up before configuration is loaded, or as a
/// fallback if configured initialization fails. Filters on `RUST_LOG`,
/// defaulting to "info". Errors (e.g. a global subscriber already set) are ignored.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Creates the console layer over `writer`.
fn create_console_layer<W>(format: &str, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        "json" => fmt::layer().json().with_writer(writer).with_ansi(false).boxed(),
        _ => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
    }
}

/// Creates a file logging layer writing to a daily-rolling file.
///
/// Ensures the parent directory of `log_path` exists.
fn create_file_layer(log_path: &Path, format: &str) -> Result<(BoxedLayer, WorkerGuard), CoreError> {
    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    utils::fs::ensure_dir_exists(directory)?;

    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("cff-bell.log"));
    let file_appender = tracing_appender::rolling::daily(directory, file_name);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let layer: BoxedLayer = match format {
        "json" => fmt::layer()
            .json()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .boxed(),
        _ => fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .boxed(),
    };
    Ok((layer, guard))
}

/// Keeps the file writer's guard alive so buffered lines are flushed on exit.
static LOG_WORKER_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

fn level_filter(level: &str) -> Result<String, CoreError> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        invalid_level => {
            return Err(CoreError::LoggingInitialization(format!(
                "Invalid log level in config: {}",
                invalid_level
            )))
        }
    };
    Ok(level.to_string())
}

/// Initializes the global logging system from a [`LoggingConfig`].
///
/// Installs a console layer on stderr and, when `file_path` is set, a file
/// layer. Stdout is left to the frontend.
///
/// # Arguments
///
/// * `config`: The logging section of the configuration.
/// * `is_reload`: If `true`, an already-installed subscriber is tolerated and
///   only reported on stderr; if `false`, it is an error.
///
/// # Errors
///
/// Returns `CoreError::LoggingInitialization` for an invalid level or when the
/// global subscriber cannot be installed on first setup.
pub fn initialize_logging(config: &LoggingConfig, is_reload: bool) -> Result<(), CoreError> {
    let level = level_filter(&config.level)?;

    let console_layer = create_console_layer(
        &config.format.to_lowercase(),
        stderr,
        atty::is(atty::Stream::Stderr),
    )
    .with_filter(EnvFilter::new(level.clone()))
    .boxed();

    let mut layers: Vec<BoxedLayer> = vec![console_layer];
    let mut new_file_guard: Option<WorkerGuard> = None;
    if let Some(log_path) = &config.file_path {
        let (file_layer, guard) = create_file_layer(log_path, &config.format.to_lowercase())?;
        new_file_guard = Some(guard);
        layers.push(file_layer.with_filter(EnvFilter::new(level)).boxed());
    }

    let result = Registry::default().with(layers).try_init();

    match LOG_WORKER_GUARD.lock() {
        Ok(mut guard_slot) => *guard_slot = new_file_guard,
        Err(e) => eprintln!("[ERROR] Failed to lock log guard slot: {}. Log flushing may be affected.", e),
    }

    match result {
        Ok(()) => Ok(()),
        Err(e) if is_reload => {
            eprintln!("[INFO] Logging re-initialization attempted; previous subscriber stays active: {}", e);
            Ok(())
        }
        Err(e) => Err(CoreError::LoggingInitialization(format!(
            "Failed to set global tracing subscriber. Was it already initialized? Error: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_minimal_logging_is_idempotent() {
        init_minimal_logging();
        init_minimal_logging();
        tracing::info!("minimal logging initialized twice");
    }

    #[test]
    fn test_create_file_layer_formats() {
        let temp_dir = TempDir::new().unwrap();
        for format in ["text", "json"] {
            let log_path = temp_dir.path().join(format!("bell_{}.log", format));
            let result = create_file_layer(&log_path, format);
            assert!(result.is_ok(), "create_file_layer failed for {}: {:?}", format, result.err());
        }
    }

    #[test]
    fn test_create_file_layer_ensures_parent_dir_exists() {
        let temp_dir = TempDir::new().unwrap();
        let nested_log_path = temp_dir.path().join("logs/nested/bell.log");
        assert!(!nested_log_path.parent().unwrap().exists());

        create_file_layer(&nested_log_path, "text").unwrap();
        assert!(nested_log_path.parent().unwrap().exists());
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_console_layer_writes_to_given_writer() {
        for format in ["text", "json"] {
            let captured = Captured::default();
            let subscriber = Registry::default().with(create_console_layer(format, captured.clone(), false));
            tracing::subscriber::with_default(subscriber, || {
                tracing::info!(order_id = 7, "bell mounted");
            });
            let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
            assert!(output.contains("bell mounted"), "{} output: {}", format, output);
            assert!(output.contains('7'), "{} output: {}", format, output);
        }
    }

    #[test]
    fn test_initialize_logging_tolerates_reload() {
        let config = LoggingConfig {
            level: "info".to_string(),
            file_path: None,
            format: "text".to_string(),
        };
        // Another test may already own the global subscriber.
        initialize_logging(&config, true).unwrap();
        tracing::info!("console layer writes to stderr");
    }

    #[test]
    fn test_initialize_logging_invalid_level_returns_error() {
        let config = LoggingConfig {
            level: "supertrace".to_string(),
            file_path: None,
            format: "text".to_string(),
        };
        match initialize_logging(&config, false) {
            Err(CoreError::LoggingInitialization(msg)) => {
                assert!(msg.contains("Invalid log level in config: supertrace"));
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }
}
