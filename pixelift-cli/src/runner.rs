//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, configuration loading, and
//! service creation to reduce duplication across command handlers.

use crate::error::CliError;
use pixelift::config::ConfigFile;
use pixelift::events::EventSink;
use pixelift::logging::{init_logging, LoggingGuard};
use pixelift::service::{build_service, UpscaleService};
use std::sync::Arc;
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// Log output goes to the configured log file. Stdout logging is off
    /// unless `verbose` is set, so command output and progress rendering
    /// stay clean.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load().map_err(|e| CliError::Config(e.to_string()))?;

        let logging_guard = init_logging(&config.logging.file, !verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Mutable access for command-line overrides.
    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("Pixelift v{}", pixelift::VERSION);
        info!("Pixelift CLI: {} command", command);
    }

    /// Create a fully wired service over the given event sink.
    pub async fn create_service(
        &self,
        offline: bool,
        sink: Arc<dyn EventSink>,
    ) -> Result<UpscaleService, CliError> {
        build_service(&self.config, offline, sink)
            .await
            .map_err(CliError::ServiceCreation)
            .inspect(|_| info!("Service created successfully"))
    }
}
