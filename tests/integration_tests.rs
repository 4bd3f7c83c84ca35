//! Telemetry Store Integration Tests
//!
//! Exercises the public store API the way the transport uses it:
//! - Feature 1: Query patterns (all / latest / recent-N)
//! - Feature 2: Bounded sliding window
//! - Feature 3: Concurrent producers and consumers

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use telemetry_ingest::{Reading, StoreConfig, TelemetryRepository, TelemetryStore};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_714_557_600 + secs, 0).unwrap()
}

// =============================================================================
// Feature 1: Query Patterns
// =============================================================================

mod query_tests {
    use super::*;

    #[test]
    fn test_cnc_scenario_through_port() {
        let store = TelemetryStore::new();
        let repo: &dyn TelemetryRepository = &store;

        repo.ingest(Reading::new("CNC-001", ts(10), 75.5, 0.18, 102.3))
            .unwrap();
        repo.ingest(Reading::new("CNC-001", ts(20), 80.1, 0.22, 101.0))
            .unwrap();
        repo.ingest(Reading::new("CNC-001", ts(30), 76.0, 0.19, 103.5))
            .unwrap();

        let all = repo.query_all("CNC-001");
        assert_eq!(
            all.iter().map(|r| r.temperature).collect::<Vec<_>>(),
            vec![76.0, 80.1, 75.5]
        );
        assert_eq!(repo.query_latest("CNC-001"), Some(all[0].clone()));
        assert_eq!(repo.query_recent("CNC-001", 2), all[..2].to_vec());
    }

    #[test]
    fn test_unknown_equipment_is_empty() {
        let store = TelemetryStore::new();
        assert!(store.query_all("UNKNOWN").is_empty());
        assert!(store.query_latest("UNKNOWN").is_none());
        assert!(store.query_recent("UNKNOWN", 0).is_empty());
    }

    #[test]
    fn test_out_of_order_arrival_sorted_on_read() {
        let store = TelemetryStore::new();
        for secs in [50, 10, 40, 20, 30] {
            store
                .ingest(Reading::new("LATHE-3", ts(secs), secs as f64, 0.1, 99.0))
                .unwrap();
        }

        let stamps: Vec<_> = store
            .query_all("LATHE-3")
            .into_iter()
            .map(|r| r.timestamp)
            .collect();
        assert_eq!(stamps, vec![ts(50), ts(40), ts(30), ts(20), ts(10)]);

        // Arrival order is preserved underneath
        let arrival: Vec<f64> = store
            .snapshot("LATHE-3")
            .into_iter()
            .map(|r| r.temperature)
            .collect();
        assert_eq!(arrival, vec![50.0, 10.0, 40.0, 20.0, 30.0]);
    }

    #[test]
    fn test_recent_equals_prefix_for_all_limits() {
        let store = TelemetryStore::new();
        for i in 0..25 {
            store
                .ingest(Reading::new("M", ts((i * 7) % 11), i as f64, 0.0, 0.0))
                .unwrap();
        }

        let all = store.query_all("M");
        for k in 0..30 {
            let recent = store.query_recent("M", k);
            assert_eq!(recent, all[..k.min(all.len())].to_vec());
        }
    }
}

// =============================================================================
// Feature 2: Sliding Window
// =============================================================================

mod window_tests {
    use super::*;

    #[test]
    fn test_exactly_cap_after_many_ingests() {
        let store = TelemetryStore::new();
        for i in 0..2500 {
            store
                .ingest(Reading::new("PRESS-1", ts(i), i as f64, 0.0, 0.0))
                .unwrap();
        }

        let kept = store.snapshot("PRESS-1");
        assert_eq!(kept.len(), 1000);
        assert_eq!(kept.first().unwrap().temperature, 1500.0);
        assert_eq!(kept.last().unwrap().temperature, 2499.0);
    }

    #[test]
    fn test_first_inserted_evicted_despite_newest_timestamp() {
        let store = TelemetryStore::new();
        store
            .ingest(Reading::new("PRESS-2", ts(1_000_000), -1.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(store.query_latest("PRESS-2").unwrap().temperature, -1.0);

        for i in 0..1000 {
            store
                .ingest(Reading::new("PRESS-2", ts(i), i as f64, 0.0, 0.0))
                .unwrap();
        }

        assert_eq!(store.series_len("PRESS-2"), 1000);
        assert_eq!(store.query_latest("PRESS-2").unwrap().temperature, 999.0);
    }

    #[test]
    fn test_custom_cap() {
        let store = TelemetryStore::with_config(StoreConfig {
            max_readings_per_equipment: 3,
        })
        .unwrap();
        for i in 0..10 {
            store
                .ingest(Reading::new("SMALL", ts(i), i as f64, 0.0, 0.0))
                .unwrap();
        }

        let temps: Vec<f64> = store
            .query_all("SMALL")
            .into_iter()
            .map(|r| r.temperature)
            .collect();
        assert_eq!(temps, vec![9.0, 8.0, 7.0]);
        assert_eq!(store.stats().evicted_total, 7);
    }
}

// =============================================================================
// Feature 3: Concurrency
// =============================================================================

mod concurrency_tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_producers_and_consumers() {
        let store = Arc::new(TelemetryStore::new());
        let producers = 6;
        let per_producer = 300;

        let mut tasks = Vec::new();
        for p in 0..producers {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                for i in 0..per_producer {
                    let tag = (p * per_producer + i) as f64;
                    store
                        .ingest(Reading::new("SHARED", ts(i as i64), tag, 0.0, 0.0))
                        .unwrap();
                    if i % 25 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            }));
        }
        for _ in 0..3 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                for _ in 0..200 {
                    let all = store.query_all("SHARED");
                    assert!(all.len() <= 1000);
                    assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
                    tokio::task::yield_now().await;
                }
            }));
        }

        for task in tasks {
            task.await.unwrap();
        }

        let kept = store.snapshot("SHARED");
        assert_eq!(kept.len(), 1000usize.min(producers * per_producer));
        let unique: HashSet<u64> = kept.iter().map(|r| r.temperature as u64).collect();
        assert_eq!(unique.len(), kept.len());
    }

    #[test]
    fn test_distinct_equipment_in_parallel() {
        let store = Arc::new(TelemetryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let id = format!("EQ-{}", t);
                    for i in 0..1200 {
                        store
                            .ingest(Reading::new(id.as_str(), ts(i), i as f64, 0.0, 0.0))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = store.stats();
        assert_eq!(stats.equipment_count, 8);
        assert_eq!(stats.stored_readings, 8000);
        assert_eq!(stats.ingested_total, 9600);
        assert_eq!(stats.evicted_total, 1600);
        for t in 0..8 {
            assert_eq!(store.series_len(&format!("EQ-{}", t)), 1000);
        }
    }
}
