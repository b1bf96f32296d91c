//! Bounded, persisted history of completed upscales.
//!
//! Completed jobs are frozen into [`HistoryItem`] records and retained
//! subject to two independent bounds: an age bound (`retention_days`) and
//! a count bound (`max_items`). The automatic cleanup pass enforcing them
//! is a pure function over the current items and an explicit `now`, which
//! keeps eviction decisions testable and divorced from any runtime
//! timing. [`HistoryJanitor`] drives the pass on a schedule; the cache
//! itself rate-limits passes to once per cleanup interval.
//!
//! Persistence is two JSON blobs in a [`StateStore`]: the item array and
//! the last-cleanup timestamp. Corrupt or missing blobs load as empty
//! state rather than failing startup.

mod cache;
mod cleanup;
mod item;
mod janitor;
mod query;
mod store;

pub use cache::{CleanupReport, HistoryCache, HistoryError, HistorySettings};
pub use cleanup::{cleanup_pass, CleanupOutcome};
pub use item::HistoryItem;
pub use janitor::HistoryJanitor;
pub use query::{apply_query, HistoryFilter, HistorySort};
pub use store::{FileStateStore, MemoryStateStore, StateStore, StoreError};
