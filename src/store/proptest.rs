//! Property-Based Tests for the Telemetry Store
//!
//! # Test Properties
//!
//! 1. **Bounded Growth**: a series never exceeds its cap and keeps exactly
//!    the most recent insertions, in insertion order
//! 2. **Ordering**: `query_all` is sorted by timestamp, newest first
//! 3. **Latest Consistency**: `query_latest` is the head of `query_all`
//! 4. **Recent-N**: `query_recent(k)` is the `min(k, len)` prefix of `query_all`

#![cfg(test)]

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use super::{StoreConfig, TelemetryStore};
use crate::domain::Reading;

// =============================================================================
// Property Strategies
// =============================================================================

/// Strategy for small caps so eviction is exercised often.
fn cap_strategy() -> impl Strategy<Value = usize> {
    1usize..=32
}

/// Strategy for timestamp offsets; a narrow range forces ties.
fn offsets_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..50, 0..120)
}

fn store_with_cap(cap: usize) -> TelemetryStore {
    TelemetryStore::with_config(StoreConfig {
        max_readings_per_equipment: cap,
    })
    .unwrap()
}

/// Ingest one reading per offset; temperature records the insertion index.
fn fill(store: &TelemetryStore, id: &str, offsets: &[i64]) {
    for (i, offset) in offsets.iter().enumerate() {
        let ts = Utc.timestamp_opt(1_700_000_000 + offset, 0).unwrap();
        store
            .ingest(Reading::new(id, ts, i as f64, 0.1, 100.0))
            .unwrap();
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: the series keeps the last `cap` insertions in order.
    #[test]
    fn prop_bounded_growth(cap in cap_strategy(), offsets in offsets_strategy()) {
        let store = store_with_cap(cap);
        fill(&store, "EQ", &offsets);

        let kept: Vec<usize> = store
            .snapshot("EQ")
            .iter()
            .map(|r| r.temperature as usize)
            .collect();

        let expected_len = offsets.len().min(cap);
        let expected: Vec<usize> = (offsets.len() - expected_len..offsets.len()).collect();
        prop_assert_eq!(kept, expected);
    }

    /// Property: query_all is sorted newest first, ties in insertion order.
    #[test]
    fn prop_query_all_sorted(cap in cap_strategy(), offsets in offsets_strategy()) {
        let store = store_with_cap(cap);
        fill(&store, "EQ", &offsets);

        let all = store.query_all("EQ");
        prop_assert_eq!(all.len(), offsets.len().min(cap));
        for pair in all.windows(2) {
            prop_assert!(pair[0].timestamp >= pair[1].timestamp);
            if pair[0].timestamp == pair[1].timestamp {
                prop_assert!(pair[0].temperature < pair[1].temperature);
            }
        }
    }

    /// Property: query_latest is the first element of query_all.
    #[test]
    fn prop_latest_is_head(cap in cap_strategy(), offsets in offsets_strategy()) {
        let store = store_with_cap(cap);
        fill(&store, "EQ", &offsets);

        let all = store.query_all("EQ");
        prop_assert_eq!(store.query_latest("EQ"), all.first().cloned());
    }

    /// Property: query_recent is a prefix of query_all.
    #[test]
    fn prop_recent_is_prefix(
        cap in cap_strategy(),
        offsets in offsets_strategy(),
        limit in 0usize..64,
    ) {
        let store = store_with_cap(cap);
        fill(&store, "EQ", &offsets);

        let all = store.query_all("EQ");
        let recent = store.query_recent("EQ", limit);
        prop_assert_eq!(recent.len(), limit.min(all.len()));
        prop_assert_eq!(&recent[..], &all[..recent.len()]);
    }
}
