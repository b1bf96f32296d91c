//! Logging infrastructure for Pixelift.
//!
//! Provides structured logging with file output and console output:
//! - Writes to the configured log file (cleared on session start)
//! - Also prints to stdout for CLI tailing, unless `quiet` is set
//! - Multi-line pretty format for readability
//! - Configurable via RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
#[derive(Debug)]
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize logging system.
///
/// Creates the log file's directory if needed, clears the previous log
/// file, and sets up output to the file plus (when not quiet) stdout.
/// Commands that render live progress pass `quiet = true` so log lines
/// do not interleave with the progress display.
///
/// # Arguments
///
/// * `log_path` - Full path of the log file (e.g., `~/.pixelift/pixelift.log`)
/// * `quiet` - Suppress the stdout layer, logging to the file only
///
/// # Returns
///
/// LoggingGuard that must be kept alive for logging to work
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the log file
/// cannot be cleared
pub fn init_logging(log_path: &Path, quiet: bool) -> Result<LoggingGuard, io::Error> {
    let log_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let log_file = log_path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;

    // Create the log directory if it doesn't exist
    fs::create_dir_all(log_dir)?;

    // Clear previous log file by writing empty content
    // This handles both existing and non-existing files
    fs::write(log_path, "")?;

    // Create file appender with non-blocking writer
    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    // Create file layer with pretty multi-line format
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false) // No ANSI colors in file
        .with_span_events(FmtSpan::CLOSE)
        .pretty();

    // Create stdout layer with pretty multi-line format
    let stdout_layer = (!quiet).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true) // ANSI colors for terminal
            .with_span_events(FmtSpan::CLOSE)
            .pretty()
    });

    // Create env filter (defaults to INFO if RUST_LOG not set)
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Initialize global subscriber
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_log_path() -> PathBuf {
        // Use a unique directory for each test to avoid conflicts
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = PathBuf::from(format!("test_logs_{}", timestamp));
        let _ = fs::remove_dir_all(&dir);
        dir.join("pixelift.log")
    }

    #[test]
    fn test_creates_directory_and_file() {
        let log_path = test_log_path();
        let log_dir = log_path.parent().unwrap().to_path_buf();

        assert!(!log_dir.exists(), "Test directory should not exist yet");

        // Can't call init_logging because of the global subscriber, but
        // the file preparation steps can be exercised directly
        fs::create_dir_all(&log_dir).expect("Failed to create directory");
        fs::write(&log_path, "").expect("Failed to create log file");

        assert!(log_dir.exists(), "Log directory should be created");
        assert!(log_path.exists(), "Log file should be created");
        assert_eq!(
            fs::read_to_string(&log_path).unwrap(),
            "",
            "Log file should be empty"
        );

        fs::remove_dir_all(&log_dir).expect("Failed to cleanup");
    }

    #[test]
    fn test_clears_existing_file() {
        let log_path = test_log_path();
        let log_dir = log_path.parent().unwrap().to_path_buf();

        fs::create_dir_all(&log_dir).expect("Failed to create test dir");
        fs::write(&log_path, "old log data").expect("Failed to write test data");

        assert_eq!(
            fs::read_to_string(&log_path).unwrap(),
            "old log data",
            "Test file should contain old data"
        );

        // Clear the file by writing empty content
        fs::write(&log_path, "").expect("Failed to clear log file");

        let contents = fs::read_to_string(&log_path).expect("Failed to read log file");
        assert_eq!(contents, "", "File should be cleared");

        fs::remove_dir_all(&log_dir).expect("Failed to cleanup");
    }

    #[test]
    fn test_rejects_path_without_file_name() {
        let err = init_logging(Path::new("/"), true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_guard_structure() {
        // Verifies the struct compiles and can be instantiated
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let _logging_guard = LoggingGuard { _file_guard: guard };
    }

    // Note: Testing actual log output requires integration tests because
    // tracing uses a global subscriber that can only be set once per
    // process. The unit tests above verify the file operations work.
}
