//! Read-side filtering and sorting of history items.

use super::item::HistoryItem;
use crate::upload::ImageFormat;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Reverse;

/// Which items a history view includes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Keep only items of this content type.
    pub image_type: Option<ImageFormat>,
    /// Keep only items whose retention window closes within this many
    /// days. Already-expired items never match.
    pub expiring_within_days: Option<u32>,
}

impl HistoryFilter {
    fn matches(&self, item: &HistoryItem, now: DateTime<Utc>, retention_days: u32) -> bool {
        if let Some(wanted) = self.image_type {
            if item.image_type != wanted {
                return false;
            }
        }
        if let Some(days) = self.expiring_within_days {
            let until = item.expires_at(retention_days) - now;
            if until < Duration::zero() || until > Duration::days(i64::from(days)) {
                return false;
            }
        }
        true
    }
}

/// How a history view is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistorySort {
    /// Most recent completion first.
    #[default]
    NewestFirst,
    /// Oldest completion first.
    OldestFirst,
    /// Largest scale factor first.
    ScaleDescending,
    /// Closest to expiry first.
    ExpiryAscending,
}

/// Produces a filtered, sorted view of `items`.
///
/// The input set is never modified; views are computed on demand.
pub fn apply_query(
    items: &[HistoryItem],
    filter: &HistoryFilter,
    sort: HistorySort,
    now: DateTime<Utc>,
    retention_days: u32,
) -> Vec<HistoryItem> {
    let mut view: Vec<HistoryItem> = items
        .iter()
        .filter(|item| filter.matches(item, now, retention_days))
        .cloned()
        .collect();

    match sort {
        HistorySort::NewestFirst => view.sort_by_key(|item| Reverse(item.timestamp)),
        HistorySort::OldestFirst => view.sort_by_key(|item| item.timestamp),
        HistorySort::ScaleDescending => view.sort_by_key(|item| Reverse(item.scale)),
        HistorySort::ExpiryAscending => {
            view.sort_by_key(|item| item.expires_at(retention_days));
        }
    }
    view
}
