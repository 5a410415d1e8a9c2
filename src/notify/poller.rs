//! Poll scheduler.
//!
//! One timer task drives the fetch-filter-deliver cycle. Cycles run to
//! completion before the next tick is processed, so at most one cycle is in
//! flight per process.

use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::catalog::{render_digest, ListingSource};
use crate::datetime::now_local;
use crate::notify::sender::Notifier;
use crate::store::{SubscriptionStore, WatermarkStore};
use crate::Result;

/// Default poll interval in seconds (10 minutes).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

/// Default notification window in minutes.
///
/// Bounds the filter lower bound to the recent past even when the persisted
/// watermark is stale after long downtime.
pub const DEFAULT_WINDOW_MINUTES: i64 = 30;

/// Periodic poller pushing newly ranked beatmapsets to subscribed groups.
pub struct Poller<S, N> {
    source: S,
    notifier: N,
    subscriptions: Arc<SubscriptionStore>,
    watermark: Arc<WatermarkStore>,
    poll_interval: Duration,
    window: chrono::Duration,
}

impl<S: ListingSource, N: Notifier> Poller<S, N> {
    /// Create a poller with the default schedule.
    pub fn new(
        source: S,
        notifier: N,
        subscriptions: Arc<SubscriptionStore>,
        watermark: Arc<WatermarkStore>,
    ) -> Self {
        Self {
            source,
            notifier,
            subscriptions,
            watermark,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            window: chrono::Duration::minutes(DEFAULT_WINDOW_MINUTES),
        }
    }

    /// Override the poll interval.
    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.poll_interval = Duration::from_secs(interval_secs);
        self
    }

    /// Override the notification window.
    pub fn with_window(mut self, window_minutes: i64) -> Self {
        self.window = chrono::Duration::minutes(window_minutes);
        self
    }

    /// Run the poll loop indefinitely.
    pub async fn run(&self) {
        info!(
            "poller started (interval: {}s, window: {}min)",
            self.poll_interval.as_secs(),
            self.window.num_minutes()
        );

        let mut timer = interval(self.poll_interval);

        loop {
            timer.tick().await;
            if let Err(e) = self.run_cycle(now_local()).await {
                warn!("poll cycle aborted: {e}");
            }
        }
    }

    /// Run one fetch-filter-deliver cycle against the given current time.
    ///
    /// A fetch, parse, or persistence failure aborts the whole cycle: the
    /// watermark is not advanced and nothing is delivered, so the next tick
    /// retries the same window.
    pub async fn run_cycle(&self, now: DateTime<Tz>) -> Result<()> {
        let groups = self.subscriptions.list().await?;
        if groups.is_empty() {
            debug!("no subscribed groups, skipping poll");
            return Ok(());
        }

        let last = self.watermark.load().await?;
        let begin = last.max(now - self.window);

        let sets = self.source.fetch().await?;

        // Single pass: entries newer than the window start are delivered;
        // the candidate watermark is the newest ranked time across ALL
        // fetched entries, not just the delivered ones.
        let mut newest = begin;
        let mut fresh = Vec::new();
        for set in sets {
            if set.ranked_at > newest {
                newest = set.ranked_at;
            }
            if set.ranked_at > begin {
                fresh.push(set);
            }
        }

        if newest == begin {
            debug!("no newly ranked maps");
            return Ok(());
        }

        // Persist before delivery: a crash after sending but before saving
        // would repeat the push next cycle.
        self.watermark.save(newest).await?;

        for set in &fresh {
            info!("new ranked map [{}]", set.title);
        }
        let message = render_digest(&fresh);

        for group_id in groups {
            if let Err(e) = self.notifier.send(group_id, &message).await {
                warn!("failed to push to group {group_id}: {e}");
            }
        }

        Ok(())
    }
}
