//! Wiring helpers for constructing [`UpscaleService`] from configuration.
//!
//! The facade takes its collaborators fully formed; these functions build
//! the standard ones. Remote clients implement both [`UpscaleClient`] and
//! [`UsageTracker`], and both seams must see the same instance so usage
//! accounting lines up with the upscale calls, so the pair is returned
//! together.

use super::error::ServiceError;
use super::facade::UpscaleService;
use crate::config::ConfigFile;
use crate::events::EventSink;
use crate::history::{FileStateStore, StateStore};
use crate::remote::{HttpApiClient, OfflineUpscaleClient, UpscaleClient, UsageTracker};
use std::sync::Arc;
use tracing::info;

/// The two remote seams, backed by one shared client.
pub struct RemoteComponents {
    /// Performs the upscale calls.
    pub client: Arc<dyn UpscaleClient>,
    /// Tracks per-user usage.
    pub usage: Arc<dyn UsageTracker>,
}

impl std::fmt::Debug for RemoteComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteComponents").finish_non_exhaustive()
    }
}

/// Create the production HTTP remote from configuration.
pub fn create_remote(config: &ConfigFile) -> Result<RemoteComponents, ServiceError> {
    let mut client = HttpApiClient::new(config.service.api_url.clone())?;
    if let Some(key) = &config.service.api_key {
        client = client.with_api_key(key.clone());
    }
    let client = Arc::new(client);

    Ok(RemoteComponents {
        client: client.clone(),
        usage: client,
    })
}

/// Create the canned in-process remote for offline runs.
///
/// The monthly limit mirrors the configured plan so quota behavior
/// matches what the live service would enforce.
pub fn create_offline_remote(config: &ConfigFile) -> RemoteComponents {
    let client = Arc::new(
        OfflineUpscaleClient::new().with_monthly_limit(config.plan_tier().monthly_quota()),
    );

    RemoteComponents {
        client: client.clone(),
        usage: client,
    }
}

/// Create the persistent state store rooted at the configured directory.
pub fn create_store(config: &ConfigFile) -> Arc<dyn StateStore> {
    Arc::new(FileStateStore::new(config.service.state_dir.clone()))
}

/// Build a fully wired service from configuration.
///
/// With `offline` set, upscale calls are served by the canned in-process
/// remote instead of the HTTP API; history persistence and everything
/// else behaves identically.
pub async fn build_service(
    config: &ConfigFile,
    offline: bool,
    sink: Arc<dyn EventSink>,
) -> Result<UpscaleService, ServiceError> {
    let remote = if offline {
        info!("Using offline remote; no network calls will be made");
        create_offline_remote(config)
    } else {
        create_remote(config)?
    };
    let store = create_store(config);

    UpscaleService::new(config, remote.client, remote.usage, store, sink).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullEventSink;
    use crate::plan::{PlanTier, QualityPreset};
    use bytes::Bytes;
    use std::io::Cursor;
    use std::time::Duration;

    fn png_bytes(width: u32, height: u32) -> Bytes {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    #[test]
    fn test_create_remote_rejects_bad_url() {
        let mut config = ConfigFile::default();
        config.service.api_url = "not a url".to_string();
        let err = create_remote(&config).unwrap_err();
        assert!(matches!(err, ServiceError::Remote(_)));
    }

    #[tokio::test]
    async fn test_offline_service_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ConfigFile::default();
        config.account.plan = Some("starter".to_string());
        config.service.state_dir = dir.path().to_path_buf();
        config.queue.progress_tick_ms = 20;

        let service = build_service(&config, true, Arc::new(NullEventSink))
            .await
            .unwrap();
        assert_eq!(service.tier(), PlanTier::Starter);

        service.select_upload("demo.png", png_bytes(6, 6)).await.unwrap();
        let mut handle = service.submit(2, QualityPreset::Photo, None).unwrap();
        let status = tokio::time::timeout(Duration::from_secs(10), handle.wait())
            .await
            .expect("job did not finish");
        assert!(status.is_success());

        // The offline tracker counted the completed job.
        let stats = service.usage().await.unwrap();
        assert_eq!(stats.upscales_used, 1);
        assert_eq!(stats.monthly_limit, Some(250));
    }

    #[tokio::test]
    async fn test_store_persists_under_state_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ConfigFile::default();
        config.service.state_dir = dir.path().join("state");

        let store = create_store(&config);
        store.write("pixelift.history", "[]").await.unwrap();
        assert!(config.service.state_dir.join("pixelift.history").exists());
    }
}
