//! Stateful history cache with persistence and bounded retention.

use super::cleanup::cleanup_pass;
use super::item::HistoryItem;
use super::query::{apply_query, HistoryFilter, HistorySort};
use super::store::{StateStore, StoreError};
use crate::config::defaults::{
    DEFAULT_CLEANUP_INTERVAL_HOURS, DEFAULT_JANITOR_CHECK_SECS, DEFAULT_MAX_HISTORY_ITEMS,
    DEFAULT_RETENTION_DAYS,
};
use crate::events::{CoreEvent, EventSink};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Storage key for the serialized item array.
pub const HISTORY_STORAGE_KEY: &str = "pixelift.history";

/// Storage key for the last-cleanup epoch timestamp.
pub const LAST_CLEANUP_STORAGE_KEY: &str = "pixelift.last_cleanup";

/// History cache errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Persistence failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Items could not be serialized for persistence
    #[error("failed to serialize history: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Tunables for the history subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySettings {
    /// Age bound in days.
    pub retention_days: u32,
    /// Count bound.
    pub max_items: usize,
    /// Minimum hours between automatic cleanup passes.
    pub cleanup_interval_hours: u32,
    /// How often the janitor wakes to attempt a pass, in seconds.
    pub janitor_check_secs: u64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            max_items: DEFAULT_MAX_HISTORY_ITEMS,
            cleanup_interval_hours: DEFAULT_CLEANUP_INTERVAL_HOURS,
            janitor_check_secs: DEFAULT_JANITOR_CHECK_SECS,
        }
    }
}

/// What a cleanup call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// False when the call was rate-limited into a no-op.
    pub ran: bool,
    /// Items removed for age.
    pub expired: usize,
    /// Items removed for count.
    pub evicted: usize,
}

impl CleanupReport {
    /// Total removals.
    pub fn removed(&self) -> usize {
        self.expired + self.evicted
    }
}

struct CacheState {
    items: Vec<HistoryItem>,
    last_cleanup: Option<DateTime<Utc>>,
}

/// Persisted, bounded collection of completed upscales.
///
/// All mutation goes through one internal lock, so a cleanup pass and a
/// concurrent append serialize; removal is applied by ID from the pass
/// snapshot, so the appended item survives regardless of ordering. The
/// count bound also holds after every single mutation: an append that
/// would exceed it drops the oldest item immediately rather than waiting
/// for the next pass.
///
/// Automatic cleanup is rate-limited to once per configured interval via
/// a persisted timestamp; [`delete`] and [`clear_all`] are user actions
/// and bypass the limiter entirely.
///
/// [`delete`]: HistoryCache::delete
/// [`clear_all`]: HistoryCache::clear_all
pub struct HistoryCache {
    store: Arc<dyn StateStore>,
    sink: Arc<dyn EventSink>,
    settings: HistorySettings,
    state: Mutex<CacheState>,
}

impl HistoryCache {
    /// Loads persisted history from the store.
    ///
    /// Corrupt blobs are logged and treated as empty state; only a
    /// failing store itself is an error.
    pub async fn load(
        store: Arc<dyn StateStore>,
        sink: Arc<dyn EventSink>,
        settings: HistorySettings,
    ) -> Result<Self, HistoryError> {
        let items = match store.read(HISTORY_STORAGE_KEY).await? {
            Some(raw) => match serde_json::from_str::<Vec<HistoryItem>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!(error = %e, "persisted history is corrupt, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let last_cleanup = match store.read(LAST_CLEANUP_STORAGE_KEY).await? {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(secs) => DateTime::from_timestamp(secs, 0),
                Err(e) => {
                    warn!(error = %e, "persisted cleanup timestamp is corrupt, ignoring");
                    None
                }
            },
            None => None,
        };

        debug!(
            items = items.len(),
            last_cleanup = ?last_cleanup,
            "history loaded"
        );

        Ok(Self {
            store,
            sink,
            settings,
            state: Mutex::new(CacheState { items, last_cleanup }),
        })
    }

    /// The tunables this cache was built with.
    pub fn settings(&self) -> &HistorySettings {
        &self.settings
    }

    /// Number of retained items.
    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    /// Whether the history is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of all retained items in insertion order.
    pub async fn items(&self) -> Vec<HistoryItem> {
        self.state.lock().await.items.clone()
    }

    /// When the last automatic cleanup pass ran, if ever.
    pub async fn last_cleanup(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.last_cleanup
    }

    /// Filtered, sorted view of the current items.
    pub async fn query(&self, filter: &HistoryFilter, sort: HistorySort) -> Vec<HistoryItem> {
        self.query_at(filter, sort, Utc::now()).await
    }

    /// Like [`query`](Self::query) with an explicit clock.
    pub async fn query_at(
        &self,
        filter: &HistoryFilter,
        sort: HistorySort,
        now: DateTime<Utc>,
    ) -> Vec<HistoryItem> {
        let state = self.state.lock().await;
        apply_query(&state.items, filter, sort, now, self.settings.retention_days)
    }

    /// Appends a freshly completed record.
    ///
    /// Enforces the count bound immediately: when full, the oldest item
    /// is dropped to make room.
    pub async fn append(&self, item: HistoryItem) -> Result<(), HistoryError> {
        let mut state = self.state.lock().await;
        state.items.push(item);

        while state.items.len() > self.settings.max_items {
            if let Some(oldest) = state
                .items
                .iter()
                .enumerate()
                .min_by_key(|(_, item)| item.timestamp)
                .map(|(idx, _)| idx)
            {
                let dropped = state.items.remove(oldest);
                debug!(id = %dropped.id, "history full, dropped oldest item on append");
            }
        }

        self.persist_items(&state.items).await?;
        let len = state.items.len();
        drop(state);
        self.sink.emit(CoreEvent::HistoryChanged { len });
        Ok(())
    }

    /// Attempts an automatic cleanup pass at the current time.
    pub async fn run_cleanup(&self) -> Result<CleanupReport, HistoryError> {
        self.run_cleanup_at(Utc::now()).await
    }

    /// Attempts an automatic cleanup pass with an explicit clock.
    ///
    /// Rate-limited: if the previous pass ran less than the cleanup
    /// interval ago the call is a silent no-op. A pass that does run
    /// refreshes the persisted last-cleanup timestamp whether or not it
    /// removed anything, and emits [`CoreEvent::HistoryPruned`] only when
    /// at least one item went away.
    pub async fn run_cleanup_at(&self, now: DateTime<Utc>) -> Result<CleanupReport, HistoryError> {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_cleanup {
            let interval = Duration::hours(i64::from(self.settings.cleanup_interval_hours));
            if now - last < interval {
                debug!(last_cleanup = %last, "cleanup rate-limited, skipping");
                return Ok(CleanupReport::default());
            }
        }

        let outcome = cleanup_pass(
            &state.items,
            now,
            self.settings.retention_days,
            self.settings.max_items,
        );

        if !outcome.remove_ids.is_empty() {
            let doomed: HashSet<&String> = outcome.remove_ids.iter().collect();
            state.items.retain(|item| !doomed.contains(&item.id));
            self.persist_items(&state.items).await?;
        }

        state.last_cleanup = Some(now);
        self.store
            .write(LAST_CLEANUP_STORAGE_KEY, &now.timestamp().to_string())
            .await?;
        drop(state);

        let report = CleanupReport {
            ran: true,
            expired: outcome.expired,
            evicted: outcome.evicted,
        };
        if report.removed() > 0 {
            info!(
                expired = report.expired,
                evicted = report.evicted,
                "history cleanup removed items"
            );
            self.sink.emit(CoreEvent::HistoryPruned {
                expired: report.expired,
                evicted: report.evicted,
            });
        }
        Ok(report)
    }

    /// Removes the given items. Unknown IDs are ignored, so repeated
    /// deletes are harmless.
    pub async fn delete(&self, ids: &[String]) -> Result<usize, HistoryError> {
        let doomed: HashSet<&String> = ids.iter().collect();
        let mut state = self.state.lock().await;
        let before = state.items.len();
        state.items.retain(|item| !doomed.contains(&item.id));
        let removed = before - state.items.len();

        if removed > 0 {
            self.persist_items(&state.items).await?;
            let len = state.items.len();
            drop(state);
            self.sink.emit(CoreEvent::HistoryChanged { len });
        }
        Ok(removed)
    }

    /// Removes everything.
    pub async fn clear_all(&self) -> Result<usize, HistoryError> {
        let mut state = self.state.lock().await;
        let removed = state.items.len();
        if removed > 0 {
            state.items.clear();
            self.persist_items(&state.items).await?;
            drop(state);
            self.sink.emit(CoreEvent::HistoryChanged { len: 0 });
        }
        Ok(removed)
    }

    async fn persist_items(&self, items: &[HistoryItem]) -> Result<(), HistoryError> {
        let raw = serde_json::to_string(items)?;
        self.store.write(HISTORY_STORAGE_KEY, &raw).await?;
        Ok(())
    }
}

impl std::fmt::Debug for HistoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryCache")
            .field("settings", &self.settings)
            .finish()
    }
}
