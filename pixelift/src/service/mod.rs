//! High-level service facade for the upscaling core.
//!
//! This module wires the upload registry, validator, job queue, and
//! history cache into one [`UpscaleService`], following the Facade
//! pattern. Collaborators are injected, so hosts can swap the remote
//! seams (offline runs, tests) without touching the core.
//!
//! # Example
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
//! service.select_upload("photo.png", bytes).await?;
//! let mut handle = service.submit(4, QualityPreset::Photo, None)?;
//! let status = handle.wait().await;
//! ```

mod builder;
mod error;
mod facade;

pub use builder::{build_service, create_offline_remote, create_remote, create_store, RemoteComponents};
pub use error::ServiceError;
pub use facade::UpscaleService;
