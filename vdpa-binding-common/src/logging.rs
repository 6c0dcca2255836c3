//! Logging initialization using tracing.
//!
//! Every initializer installs a global subscriber with `try_init`, so a second
//! call returns an error instead of panicking.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log file the vDPA binding writes to when running next to virt-launcher.
pub const VDPA_LOG_FILE_PATH: &str = "/var/run/kubevirt/vdpa.log";

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the tracing subscriber with the specified log level.
///
/// `RUST_LOG` takes precedence over `level` when it is set.
///
/// # Arguments
/// * `level` - Log level string (trace, debug, info, warn, error)
pub fn init_logging(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

/// Initialize logging with JSON output format.
/// Suitable for production environments with log aggregation.
pub fn init_logging_json(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
        )
        .try_init()
        .context("Failed to initialize JSON logging")?;

    Ok(())
}

/// Initialize logging into a plain (non-rotating) log file.
///
/// Parent directories are created if needed. The file is appended to.
pub fn init_logging_to_file<P: AsRef<Path>>(level: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Log path has no file name: {}", path.display()))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(appender)
        )
        .try_init()
        .with_context(|| format!("Failed to initialize file logging: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vdpa_log_file_path() {
        assert_eq!(VDPA_LOG_FILE_PATH, "/var/run/kubevirt/vdpa.log");
        let path = Path::new(VDPA_LOG_FILE_PATH);
        assert_eq!(path.parent(), Some(Path::new("/var/run/kubevirt")));
    }

    #[test]
    fn test_file_logging_rejects_path_without_file_name() {
        assert!(init_logging_to_file("info", "/").is_err());
    }

    #[test]
    fn test_second_init_fails_instead_of_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("logs").join("vdpa.log");

        // Other tests in this binary may already own the global subscriber,
        // so only the second call is asserted.
        let _ = init_logging_to_file("debug", &log_path);
        assert!(init_logging("info").is_err());
    }
}
