//! Background daemon that drives periodic history cleanup.
//!
//! The cache itself rate-limits passes to once per configured interval,
//! so the janitor can wake much more often than that: every wake it
//! simply asks the cache to try, and the cache decides whether anything
//! actually happens.
//!
//! # Example
//!
//! ```ignore
//! use pixelift::history::HistoryJanitor;
//!
//! let janitor = HistoryJanitor::new(history);
//! tokio::spawn(janitor.run(shutdown_token));
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache::HistoryCache;

/// Background driver for [`HistoryCache::run_cleanup`].
pub struct HistoryJanitor {
    history: Arc<HistoryCache>,
    check_interval: Duration,
}

impl HistoryJanitor {
    /// Creates a janitor with the check interval from the cache settings.
    pub fn new(history: Arc<HistoryCache>) -> Self {
        let check_interval = Duration::from_secs(history.settings().janitor_check_secs.max(1));
        Self {
            history,
            check_interval,
        }
    }

    /// Sets a custom wake interval.
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Runs the janitor until shutdown is signalled.
    ///
    /// One cleanup attempt is made immediately on startup so stale state
    /// from a previous session is pruned without waiting a full interval.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            check_interval_secs = self.check_interval.as_secs(),
            "History janitor starting"
        );

        self.attempt_pass().await;

        let mut interval = tokio::time::interval(self.check_interval);
        // Skip the first immediate tick
        interval.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("History janitor shutting down");
                    break;
                }

                _ = interval.tick() => {
                    self.attempt_pass().await;
                }
            }
        }
    }

    async fn attempt_pass(&self) {
        match self.history.run_cleanup().await {
            Ok(report) if report.ran => {
                debug!(
                    expired = report.expired,
                    evicted = report.evicted,
                    "History cleanup pass completed"
                );
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "History cleanup pass failed");
            }
        }
    }
}
