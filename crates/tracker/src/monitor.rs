//! Periodic monitoring loop. Polls a snapshot source on a timer, records
//! into the shared tracker and logs the active alert count.
//!
//! Waiting for the next tick or a retry races against the
//! `CancellationToken`, so cancelling stops the loop without waiting out
//! the interval.

use insight_core::config::MonitoringConfig;
use insight_core::CancellationToken;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::snapshot::CampaignSnapshot;
use crate::tracker::RoiTracker;

/// Where the monitor pulls fresh snapshots from on each tick.
pub trait SnapshotSource: Send {
    fn poll(&mut self) -> anyhow::Result<Vec<CampaignSnapshot>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
    pub ticks: u64,
    pub snapshots: u64,
    pub alerts_raised: u64,
    pub errors: u64,
}

pub struct Monitor<S> {
    tracker: Arc<Mutex<RoiTracker>>,
    source: S,
    interval: Duration,
    retry_delay: Duration,
}

impl<S: SnapshotSource> Monitor<S> {
    pub fn new(tracker: Arc<Mutex<RoiTracker>>, source: S, config: &MonitoringConfig) -> Self {
        Self {
            tracker,
            source,
            interval: Duration::from_secs(config.check_interval_secs.max(1)),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        }
    }

    /// Override the tick and retry periods.
    pub fn with_timing(mut self, interval: Duration, retry_delay: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self.retry_delay = retry_delay;
        self
    }

    /// Run until `token` is cancelled or `max_ticks` checks have run.
    pub async fn run(mut self, token: CancellationToken, max_ticks: Option<u64>) -> MonitorStats {
        let mut stats = MonitorStats::default();
        let mut interval = tokio::time::interval(self.interval);
        info!(interval_ms = self.interval.as_millis() as u64, "Started monitoring");

        while !token.is_cancelled() {
            if max_ticks.is_some_and(|max| stats.ticks >= max) {
                break;
            }
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {}
            }
            stats.ticks += 1;

            match self.source.poll() {
                Ok(batch) => {
                    let mut tracker = self.tracker.lock();
                    for snapshot in batch {
                        stats.snapshots += 1;
                        stats.alerts_raised += tracker.record(snapshot).len() as u64;
                    }
                    let active = tracker.active_alerts().count();
                    if active > 0 {
                        info!(active_alerts = active, "Monitoring: active alerts outstanding");
                    }
                }
                Err(e) => {
                    stats.errors += 1;
                    error!(error = %e, "Monitoring check failed");
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }

        info!(ticks = stats.ticks, "Monitoring stopped");
        stats
    }
}
