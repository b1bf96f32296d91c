//! User configuration loaded from ~/.pixelift/config.ini.
//!
//! [`ConfigFile`] is the loaded representation; a missing file or missing keys
//! fall back to defaults, so `ConfigFile::load()` always succeeds on a fresh
//! machine. Sections reuse the settings structs owned by their domain modules
//! ([`crate::queue::QueueSettings`], [`crate::history::HistorySettings`]) so a
//! loaded config can be handed to those components directly.
//!
//! # Example
//!
//! ```no_run
//! use pixelift::config::ConfigFile;
//!
//! let config = ConfigFile::load().unwrap();
//! println!("tier: {}", config.plan_tier());
//! ```

pub mod defaults;

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    AccountSettings, ConfigFile, LoggingSettings, ServiceSettings, ValidatorSettings,
};
