//! Poll cycle scenario tests.
//!
//! Drives `Poller::run_cycle` against stub listing sources and a recording
//! notifier, with real stores in a temp directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone};
use chrono_tz::Asia::Shanghai;
use chrono_tz::Tz;
use tempfile::{tempdir, TempDir};

use mapwatch::catalog::{Beatmap, Beatmapset, ListingSource};
use mapwatch::notify::{Notifier, Poller};
use mapwatch::store::{SubscriptionStore, WatermarkStore};
use mapwatch::{MapwatchError, Result};

#[derive(Clone)]
struct StubSource {
    sets: Vec<Beatmapset>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl StubSource {
    fn with_sets(sets: Vec<Beatmapset>) -> Self {
        Self {
            sets,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing() -> Self {
        Self {
            sets: Vec::new(),
            fail: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ListingSource for StubSource {
    async fn fetch(&self) -> Result<Vec<Beatmapset>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MapwatchError::Fetch("stub failure".to_string()));
        }
        Ok(self.sets.clone())
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(i64, String)>>>,
    fail_for: Option<i64>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, group_id: i64, text: &str) -> Result<()> {
        if self.fail_for == Some(group_id) {
            return Err(MapwatchError::Notify("stub delivery failure".to_string()));
        }
        self.sent.lock().unwrap().push((group_id, text.to_string()));
        Ok(())
    }
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Tz> {
    Shanghai.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

fn ranked_set(id: u64, title: &str, ranked_at: DateTime<Tz>) -> Beatmapset {
    Beatmapset {
        id,
        title: title.to_string(),
        artist: "Artist".to_string(),
        creator: "Mapper".to_string(),
        ranked_at,
        url: format!("https://osu.ppy.sh/beatmapsets/{id}"),
        beatmaps: vec![Beatmap {
            mode: "osu".to_string(),
            version: "Insane".to_string(),
            stars: 5.25,
        }],
    }
}

fn open_stores(dir: &TempDir) -> (Arc<SubscriptionStore>, Arc<WatermarkStore>) {
    (
        Arc::new(SubscriptionStore::open(dir.path()).unwrap()),
        Arc::new(WatermarkStore::open(dir.path()).unwrap()),
    )
}

#[tokio::test]
async fn test_cycle_delivers_new_maps_and_advances_watermark() {
    let dir = tempdir().unwrap();
    let (subscriptions, watermark) = open_stores(&dir);
    subscriptions.enable(123).await.unwrap();
    watermark.save(at(2024, 1, 1, 0, 0, 0)).await.unwrap();

    let source = StubSource::with_sets(vec![
        ranked_set(1, "Fresh Map", at(2024, 1, 1, 0, 2, 0)),
        ranked_set(2, "Stale Map", at(2023, 12, 31, 23, 0, 0)),
    ]);
    let notifier = RecordingNotifier::default();
    let poller = Poller::new(
        source,
        notifier.clone(),
        subscriptions.clone(),
        watermark.clone(),
    );

    poller.run_cycle(at(2024, 1, 1, 0, 5, 0)).await.unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 123);
    assert!(sent[0].1.starts_with("Recent ranked map:"));
    assert!(sent[0].1.contains("Fresh Map"));
    assert!(!sent[0].1.contains("Stale Map"));

    assert_eq!(watermark.load().await.unwrap(), at(2024, 1, 1, 0, 2, 0));
}

#[tokio::test]
async fn test_fetch_failure_leaves_state_untouched() {
    let dir = tempdir().unwrap();
    let (subscriptions, watermark) = open_stores(&dir);
    subscriptions.enable(123).await.unwrap();
    watermark.save(at(2024, 1, 1, 0, 0, 0)).await.unwrap();

    let notifier = RecordingNotifier::default();
    let poller = Poller::new(
        StubSource::failing(),
        notifier.clone(),
        subscriptions.clone(),
        watermark.clone(),
    );

    let err = poller.run_cycle(at(2024, 1, 1, 0, 5, 0)).await.unwrap_err();
    assert!(matches!(err, MapwatchError::Fetch(_)));

    assert!(notifier.sent().is_empty());
    assert_eq!(watermark.load().await.unwrap(), at(2024, 1, 1, 0, 0, 0));
}

#[tokio::test]
async fn test_empty_subscription_set_skips_fetch() {
    let dir = tempdir().unwrap();
    let (subscriptions, watermark) = open_stores(&dir);

    let source = StubSource::with_sets(vec![ranked_set(1, "Fresh Map", at(2024, 1, 1, 0, 2, 0))]);
    let notifier = RecordingNotifier::default();
    let poller = Poller::new(
        source.clone(),
        notifier.clone(),
        subscriptions,
        watermark,
    );

    poller.run_cycle(at(2024, 1, 1, 0, 5, 0)).await.unwrap();

    assert_eq!(source.call_count(), 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_quiet_cycles_are_idempotent() {
    let dir = tempdir().unwrap();
    let (subscriptions, watermark) = open_stores(&dir);
    subscriptions.enable(123).await.unwrap();
    watermark.save(at(2024, 1, 1, 12, 0, 0)).await.unwrap();

    // Everything upstream is older than the watermark.
    let source = StubSource::with_sets(vec![ranked_set(1, "Old Map", at(2024, 1, 1, 11, 0, 0))]);
    let notifier = RecordingNotifier::default();
    let poller = Poller::new(
        source,
        notifier.clone(),
        subscriptions.clone(),
        watermark.clone(),
    );

    poller.run_cycle(at(2024, 1, 1, 12, 5, 0)).await.unwrap();
    poller.run_cycle(at(2024, 1, 1, 12, 15, 0)).await.unwrap();

    assert!(notifier.sent().is_empty());
    assert_eq!(watermark.load().await.unwrap(), at(2024, 1, 1, 12, 0, 0));
    assert_eq!(subscriptions.list().await.unwrap(), vec![123]);
}

#[tokio::test]
async fn test_second_cycle_does_not_redeliver() {
    let dir = tempdir().unwrap();
    let (subscriptions, watermark) = open_stores(&dir);
    subscriptions.enable(123).await.unwrap();
    watermark.save(at(2024, 1, 1, 0, 0, 0)).await.unwrap();

    let source = StubSource::with_sets(vec![ranked_set(1, "Fresh Map", at(2024, 1, 1, 0, 2, 0))]);
    let notifier = RecordingNotifier::default();
    let poller = Poller::new(
        source,
        notifier.clone(),
        subscriptions.clone(),
        watermark.clone(),
    );

    poller.run_cycle(at(2024, 1, 1, 0, 5, 0)).await.unwrap();
    // Same upstream snapshot on the next tick.
    poller.run_cycle(at(2024, 1, 1, 0, 15, 0)).await.unwrap();

    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(watermark.load().await.unwrap(), at(2024, 1, 1, 0, 2, 0));
}

#[tokio::test]
async fn test_window_bounds_stale_watermark() {
    let dir = tempdir().unwrap();
    let (subscriptions, watermark) = open_stores(&dir);
    subscriptions.enable(123).await.unwrap();
    // Watermark is months behind.
    watermark.save(at(2024, 1, 1, 0, 0, 0)).await.unwrap();

    let source = StubSource::with_sets(vec![
        ranked_set(1, "In Window", at(2024, 6, 1, 11, 45, 0)),
        ranked_set(2, "Out Of Window", at(2024, 6, 1, 10, 0, 0)),
    ]);
    let notifier = RecordingNotifier::default();
    let poller = Poller::new(
        source,
        notifier.clone(),
        subscriptions.clone(),
        watermark.clone(),
    );

    poller.run_cycle(at(2024, 6, 1, 12, 0, 0)).await.unwrap();

    // Only the entry inside the last 30 minutes is announced, but the
    // watermark still advances past the excluded one.
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("In Window"));
    assert!(!sent[0].1.contains("Out Of Window"));
    assert_eq!(watermark.load().await.unwrap(), at(2024, 6, 1, 11, 45, 0));
}

#[tokio::test]
async fn test_delivery_failure_does_not_block_other_groups() {
    let dir = tempdir().unwrap();
    let (subscriptions, watermark) = open_stores(&dir);
    for group_id in [1, 2, 3] {
        subscriptions.enable(group_id).await.unwrap();
    }
    watermark.save(at(2024, 1, 1, 0, 0, 0)).await.unwrap();

    let source = StubSource::with_sets(vec![ranked_set(1, "Fresh Map", at(2024, 1, 1, 0, 2, 0))]);
    let notifier = RecordingNotifier {
        fail_for: Some(2),
        ..RecordingNotifier::default()
    };
    let poller = Poller::new(
        source,
        notifier.clone(),
        subscriptions.clone(),
        watermark.clone(),
    );

    poller.run_cycle(at(2024, 1, 1, 0, 5, 0)).await.unwrap();

    let delivered: Vec<i64> = notifier.sent().iter().map(|(group_id, _)| *group_id).collect();
    assert_eq!(delivered, vec![1, 3]);
    assert_eq!(watermark.load().await.unwrap(), at(2024, 1, 1, 0, 2, 0));
}
