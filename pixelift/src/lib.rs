//! Pixelift - client-side core for the Pixelift image upscaling service
//!
//! This library provides the browser-equivalent application core: upload
//! staging, plan-aware scale validation, a single-flight job queue with
//! simulated progress, and a bounded, persisted history of completed
//! upscales.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use pixelift::config::ConfigFile;
//! use pixelift::events::NullEventSink;
//! use pixelift::plan::QualityPreset;
//! use pixelift::service::build_service;
//! use std::sync::Arc;
//!
//! let config = ConfigFile::load()?;
//! let service = build_service(&config, false, Arc::new(NullEventSink)).await?;
//!
//! // Stage a file, then submit it for x4 upscaling
//! service.select_upload("photo.png", bytes).await?;
//! let mut handle = service.submit(4, QualityPreset::Photo, None)?;
//! let status = handle.wait().await;
//! ```

pub mod config;
pub mod events;
pub mod history;
pub mod logging;
pub mod plan;
pub mod queue;
pub mod remote;
pub mod service;
pub mod upload;
pub mod validator;

/// Version of the Pixelift library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
