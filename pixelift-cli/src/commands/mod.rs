//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (show, init, path)
//! - [`history`] - History inspection and pruning (list, delete, clear)
//! - [`upscale`] - Submit an image and follow it to completion
//! - [`usage`] - Plan consumption for the current period

pub mod common;
pub mod config;
pub mod history;
pub mod upscale;
pub mod usage;
