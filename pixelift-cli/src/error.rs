//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use pixelift::service::ServiceError;
use pixelift::validator::ValidationError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to create service
    ServiceCreation(ServiceError),
    /// Failed to read the input file
    FileRead { path: String, error: std::io::Error },
    /// Upscale request refused or failed
    Upscale(ServiceError),
    /// The submitted job ended in failure
    JobFailed(String),
    /// History operation failed
    History(ServiceError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::ServiceCreation(_) => {
                eprintln!();
                eprintln!("Check service.api_url in the config file, or pass --offline");
                eprintln!("to run against the built-in client.");
            }
            CliError::Upscale(ServiceError::Rejected(ValidationError::NotInPlan { .. })) => {
                eprintln!();
                eprintln!("Higher scale factors need an upgraded plan. Use --tier to try");
                eprintln!("another plan, or set account.plan in the config file.");
            }
            CliError::Upscale(ServiceError::Rejected(
                ValidationError::ExceedsPixelCeiling { suggested_scale, .. },
            )) => {
                if let Some(scale) = suggested_scale {
                    eprintln!();
                    eprintln!("Try again with --scale {}.", scale);
                }
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ServiceCreation(e) => write!(f, "Failed to create service: {}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path, error)
            }
            CliError::Upscale(e) => write!(f, "Upscale request failed: {}", e),
            CliError::JobFailed(reason) => write!(f, "Upscale failed: {}", reason),
            CliError::History(e) => write!(f, "History operation failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ServiceCreation(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::Upscale(e) => Some(e),
            CliError::History(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Upscale(e)
    }
}
