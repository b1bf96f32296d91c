//! Pure eviction pass over the history set.

use super::item::HistoryItem;
use chrono::{DateTime, Utc};

/// What one cleanup pass decided to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    /// IDs to remove, in no particular order.
    pub remove_ids: Vec<String>,
    /// Count removed for outliving the retention window.
    pub expired: usize,
    /// Count removed to satisfy the item bound.
    pub evicted: usize,
}

impl CleanupOutcome {
    /// Total number of removals this pass decided on.
    pub fn removed(&self) -> usize {
        self.expired + self.evicted
    }
}

/// Decides which items a cleanup at `now` removes.
///
/// Age-based removal runs first: anything older than the retention window
/// goes. If more than `max_items` survive, the overflow is evicted oldest
/// first. Eviction is by creation time; reading an item never protects it.
///
/// The function only inspects the snapshot it is given and removals are
/// applied by ID, so an item appended while a pass is in flight can never
/// be swept up by it.
pub fn cleanup_pass(
    items: &[HistoryItem],
    now: DateTime<Utc>,
    retention_days: u32,
    max_items: usize,
) -> CleanupOutcome {
    let mut outcome = CleanupOutcome::default();

    let mut survivors: Vec<&HistoryItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.is_expired(now, retention_days) {
            outcome.remove_ids.push(item.id.clone());
            outcome.expired += 1;
        } else {
            survivors.push(item);
        }
    }

    if survivors.len() > max_items {
        // Newest first; everything past the bound is the oldest tail.
        survivors.sort_by_key(|item| std::cmp::Reverse(item.timestamp));
        for item in survivors.drain(max_items..) {
            outcome.remove_ids.push(item.id.clone());
            outcome.evicted += 1;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::ImageFormat;
    use chrono::{Duration, TimeZone};

    fn item(id: &str, timestamp: DateTime<Utc>) -> HistoryItem {
        HistoryItem {
            id: id.to_string(),
            file_name: format!("{id}.png"),
            url: format!("https://cdn.example.com/{id}.png"),
            timestamp,
            file_size_bytes: 1_024,
            scale: 2,
            image_type: ImageFormat::Png,
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_no_removals_when_within_bounds() {
        let now = base();
        let items = vec![item("a", now - Duration::days(1)), item("b", now)];
        let outcome = cleanup_pass(&items, now, 30, 100);
        assert_eq!(outcome, CleanupOutcome::default());
    }

    #[test]
    fn test_expired_items_are_removed() {
        let now = base();
        let items = vec![
            item("old", now - Duration::days(31)),
            item("fresh", now - Duration::days(29)),
        ];
        let outcome = cleanup_pass(&items, now, 30, 100);
        assert_eq!(outcome.remove_ids, vec!["old".to_string()]);
        assert_eq!(outcome.expired, 1);
        assert_eq!(outcome.evicted, 0);
    }

    #[test]
    fn test_count_bound_evicts_exactly_the_oldest_tail() {
        let now = base();
        // 105 non-expired items, oldest first: item-0 .. item-104.
        let items: Vec<_> = (0..105)
            .map(|i| item(&format!("item-{i}"), now - Duration::hours(105 - i)))
            .collect();

        let outcome = cleanup_pass(&items, now, 30, 100);
        assert_eq!(outcome.expired, 0);
        assert_eq!(outcome.evicted, 5);

        let mut removed = outcome.remove_ids.clone();
        removed.sort();
        let mut expected: Vec<_> = (0..5).map(|i| format!("item-{i}")).collect();
        expected.sort();
        assert_eq!(removed, expected);
    }

    #[test]
    fn test_expiry_runs_before_count_eviction() {
        let now = base();
        // 3 expired + 4 fresh against a bound of 2: the expired ones
        // count as expired, then the two oldest fresh ones are evicted.
        let mut items: Vec<_> = (0..3)
            .map(|i| item(&format!("expired-{i}"), now - Duration::days(40 + i)))
            .collect();
        items.extend((0..4).map(|i| item(&format!("fresh-{i}"), now - Duration::hours(10 - i))));

        let outcome = cleanup_pass(&items, now, 30, 2);
        assert_eq!(outcome.expired, 3);
        assert_eq!(outcome.evicted, 2);
        assert!(outcome.remove_ids.contains(&"fresh-0".to_string()));
        assert!(outcome.remove_ids.contains(&"fresh-1".to_string()));
        assert!(!outcome.remove_ids.contains(&"fresh-3".to_string()));
    }

    #[test]
    fn test_removed_total() {
        let outcome = CleanupOutcome {
            remove_ids: vec!["a".into(), "b".into()],
            expired: 1,
            evicted: 1,
        };
        assert_eq!(outcome.removed(), 2);
    }
}
