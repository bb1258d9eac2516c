//! ROI tracker: bounded snapshot history with alerting on every record.
//!
//! History is kept ordered by snapshot timestamp. When it grows past the
//! configured capacity the oldest snapshots are evicted first.

use chrono::{DateTime, Duration, Utc};
use insight_core::config::{SeverityThresholds, TrackerConfig};
use insight_core::{stats, CampaignId};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::alert::{Alert, AlertObserver, AlertSeverity};
use crate::snapshot::{CampaignSnapshot, Direction, MetricKind};

/// Per-campaign metric targets.
pub type PerformanceTargets = BTreeMap<CampaignId, BTreeMap<MetricKind, f64>>;

pub struct RoiTracker {
    pub(crate) config: TrackerConfig,
    history: VecDeque<CampaignSnapshot>,
    alerts: Vec<Alert>,
    observers: Vec<Arc<dyn AlertObserver>>,
    targets: PerformanceTargets,
}

impl RoiTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            history: VecDeque::with_capacity(config.history_capacity.min(1_024)),
            config,
            alerts: Vec::new(),
            observers: Vec::new(),
            targets: PerformanceTargets::new(),
        }
    }

    pub fn add_alert_observer(&mut self, observer: Arc<dyn AlertObserver>) {
        self.observers.push(observer);
    }

    /// Record a snapshot, raise alerts against the campaign's prior-day
    /// baseline and notify observers. Returns the alerts raised.
    pub fn record(&mut self, snapshot: CampaignSnapshot) -> Vec<Alert> {
        let raised = self.evaluate_alerts(&snapshot);
        debug!(
            campaign = %snapshot.campaign_id,
            alerts = raised.len(),
            "Recorded campaign snapshot"
        );

        let idx = self
            .history
            .partition_point(|s| s.timestamp <= snapshot.timestamp);
        self.history.insert(idx, snapshot);
        while self.history.len() > self.config.history_capacity {
            self.history.pop_front();
        }

        for alert in &raised {
            debug!(alert_id = %alert.id, campaign = %alert.campaign_id, metric = %alert.metric, "Alert raised");
            self.notify(alert);
        }
        self.alerts.extend(raised.iter().cloned());
        raised
    }

    fn notify(&self, alert: &Alert) {
        for observer in &self.observers {
            if let Err(e) = observer.on_alert(alert) {
                warn!(observer = observer.name(), error = %e, "Alert observer failed");
            }
        }
    }

    /// Mean of each alerted metric over the campaign's snapshots from 24 to
    /// 48 hours before `at`. ROAS only averages positive values and CPA only
    /// defined ones.
    fn baseline(&self, campaign: &CampaignId, at: DateTime<Utc>) -> BTreeMap<MetricKind, f64> {
        let from = at - Duration::hours(48);
        let to = at - Duration::hours(24);
        let window: Vec<&CampaignSnapshot> = self
            .history
            .iter()
            .filter(|s| &s.campaign_id == campaign && s.timestamp >= from && s.timestamp < to)
            .collect();

        MetricKind::ALERTED
            .iter()
            .filter_map(|kind| {
                let values: Vec<f64> = window
                    .iter()
                    .filter_map(|s| s.metric(*kind).finite())
                    .filter(|v| *kind != MetricKind::Roas || *v > 0.0)
                    .collect();
                stats::mean(&values).map(|mean| (*kind, mean))
            })
            .collect()
    }

    fn evaluate_alerts(&self, snapshot: &CampaignSnapshot) -> Vec<Alert> {
        let baseline = self.baseline(&snapshot.campaign_id, snapshot.timestamp);
        if baseline.is_empty() {
            return Vec::new();
        }

        let mut raised = Vec::new();
        for kind in MetricKind::ALERTED {
            let Some(current) = snapshot.metric(kind).finite() else {
                continue;
            };
            let Some(base) = baseline.get(&kind).copied() else {
                continue;
            };
            if current == 0.0 || base == 0.0 {
                continue;
            }

            let variance_pct = (current - base) / base * 100.0;
            let Some(severity) = classify(variance_pct, self.thresholds(kind), kind.direction()) else {
                continue;
            };

            raised.push(Alert {
                id: Uuid::new_v4(),
                campaign_id: snapshot.campaign_id.clone(),
                channel: snapshot.channel,
                metric: kind,
                severity,
                message: format!("{} {:+.1}% vs yesterday", kind.label(), variance_pct),
                current_value: current,
                baseline_value: base,
                variance_pct,
                triggered_at: Utc::now(),
                resolved_at: None,
                resolution_note: None,
            });
        }
        raised
    }

    fn thresholds(&self, kind: MetricKind) -> SeverityThresholds {
        let t = &self.config.alert_thresholds;
        match kind {
            MetricKind::Roas => t.roas,
            MetricKind::Ctr => t.ctr,
            MetricKind::ConversionRate => t.conversion_rate,
            MetricKind::Cpa => t.cpa,
            _ => t.cost,
        }
    }

    /// Mark an active alert resolved. Returns false when no active alert has
    /// that id.
    pub fn resolve_alert(&mut self, id: Uuid, note: &str) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id && !a.is_resolved()) {
            Some(alert) => {
                alert.resolved_at = Some(Utc::now());
                alert.resolution_note = (!note.is_empty()).then(|| note.to_string());
                info!(alert_id = %id, note, "Alert resolved");
                true
            }
            None => false,
        }
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn active_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| !a.is_resolved())
    }

    /// Snapshots ordered by timestamp, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &CampaignSnapshot> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Snapshots at or after `cutoff`, oldest first.
    pub(crate) fn since(&self, cutoff: DateTime<Utc>) -> impl Iterator<Item = &CampaignSnapshot> + Clone {
        let start = self.history.partition_point(|s| s.timestamp < cutoff);
        self.history.range(start..)
    }

    /// Latest snapshot for `campaign` within the trailing `window`.
    pub fn current_performance(&self, campaign: &CampaignId, window: Duration) -> Option<&CampaignSnapshot> {
        self.since(Utc::now() - window)
            .filter(|s| &s.campaign_id == campaign)
            .last()
    }

    /// Time-ordered `(timestamp, value)` points for one campaign metric over
    /// the trailing `days`. Points with an undefined value (CPA without
    /// conversions) are skipped. The iterator is lazy and can be cloned to
    /// restart it; each call reads the history afresh.
    pub fn trend<'a>(
        &'a self,
        campaign: &'a CampaignId,
        metric: MetricKind,
        days: i64,
    ) -> impl Iterator<Item = (DateTime<Utc>, f64)> + Clone + 'a {
        self.since(Utc::now() - Duration::days(days))
            .filter(move |s| &s.campaign_id == campaign)
            .filter_map(move |s| s.metric(metric).finite().map(|v| (s.timestamp, v)))
    }

    pub fn set_performance_targets(&mut self, targets: PerformanceTargets) {
        info!(campaigns = targets.len(), "Performance targets set");
        self.targets = targets;
    }

    pub fn performance_targets(&self) -> &PerformanceTargets {
        &self.targets
    }

    /// Percentage gap between the campaign's current value and its target.
    /// `None` without a target, a current snapshot or a defined value.
    pub fn target_variance(&self, campaign: &CampaignId, metric: MetricKind) -> Option<f64> {
        let target = *self.targets.get(campaign)?.get(&metric)?;
        if target == 0.0 {
            return None;
        }
        let window = Duration::hours(self.config.summary_window_hours);
        let current = self.current_performance(campaign, window)?.metric(metric).finite()?;
        Some((current - target) / target * 100.0)
    }
}

impl Default for RoiTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

/// Map a signed swing onto a severity tier. Drops are compared with `<=`
/// against negative cut-offs, rises with `>=` against positive ones.
pub fn classify(variance_pct: f64, thresholds: SeverityThresholds, direction: Direction) -> Option<AlertSeverity> {
    let tiers = [
        (thresholds.critical, AlertSeverity::Critical),
        (thresholds.high, AlertSeverity::High),
        (thresholds.medium, AlertSeverity::Medium),
        (thresholds.low, AlertSeverity::Low),
    ];
    let hit = match direction {
        Direction::HigherIsBetter => tiers.iter().find(|(cut, _)| variance_pct <= *cut),
        Direction::LowerIsBetter => tiers.iter().find(|(cut, _)| variance_pct >= *cut),
        Direction::Neutral => None,
    };
    hit.map(|(_, severity)| *severity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::alert::CaptureObserver;
    use insight_core::Channel;

    fn snap(campaign: &str, at: DateTime<Utc>, cost: f64, revenue: f64) -> CampaignSnapshot {
        CampaignSnapshot::new(campaign, Channel::PaidSearch, at)
            .with_spend(cost, revenue)
            .with_funnel(10_000, 200, 10)
    }

    #[test]
    fn test_classify_tiers() {
        let drop = SeverityThresholds::new(-10.0, -20.0, -30.0, -50.0);
        let rise = SeverityThresholds::new(10.0, 25.0, 50.0, 100.0);
        assert_eq!(classify(-35.0, drop, Direction::HigherIsBetter), Some(AlertSeverity::High));
        assert_eq!(classify(-50.0, drop, Direction::HigherIsBetter), Some(AlertSeverity::Critical));
        assert_eq!(classify(-5.0, drop, Direction::HigherIsBetter), None);
        assert_eq!(classify(35.0, drop, Direction::HigherIsBetter), None);
        assert_eq!(classify(30.0, rise, Direction::LowerIsBetter), Some(AlertSeverity::Medium));
        assert_eq!(classify(10.0, rise, Direction::LowerIsBetter), Some(AlertSeverity::Low));
        assert_eq!(classify(-80.0, rise, Direction::LowerIsBetter), None);
    }

    #[test]
    fn test_roas_drop_raises_single_high_alert() {
        let mut tracker = RoiTracker::default();
        let capture = Arc::new(CaptureObserver::new());
        tracker.add_alert_observer(capture.clone());

        let now = Utc::now();
        assert!(tracker.record(snap("c1", now - Duration::hours(30), 100.0, 400.0)).is_empty());
        let raised = tracker.record(snap("c1", now, 100.0, 260.0));

        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].metric, MetricKind::Roas);
        assert_eq!(raised[0].severity, AlertSeverity::High);
        assert!((raised[0].variance_pct + 35.0).abs() < 1e-9);
        assert_eq!(capture.count(), 1);
        assert_eq!(tracker.alerts().len(), 1);
    }

    #[test]
    fn test_no_baseline_no_alert() {
        let mut tracker = RoiTracker::default();
        let now = Utc::now();
        tracker.record(snap("c1", now - Duration::hours(3), 100.0, 400.0));
        assert!(tracker.record(snap("c1", now, 100.0, 50.0)).is_empty());
    }

    #[test]
    fn test_cost_spike_is_lower_is_better() {
        let mut tracker = RoiTracker::default();
        let now = Utc::now();
        tracker.record(snap("c1", now - Duration::hours(36), 100.0, 400.0));
        let raised = tracker.record(snap("c1", now, 210.0, 840.0));
        let cost = raised.iter().find(|a| a.metric == MetricKind::Cost).unwrap();
        assert_eq!(cost.severity, AlertSeverity::Critical);
        let cpa = raised.iter().find(|a| a.metric == MetricKind::Cpa).unwrap();
        assert_eq!(cpa.severity, AlertSeverity::Critical);
        assert!(raised.iter().all(|a| a.metric != MetricKind::Roas));
    }

    #[test]
    fn test_failing_observer_does_not_block_others() {
        let mut tracker = RoiTracker::default();
        let capture = Arc::new(CaptureObserver::new());
        tracker.add_alert_observer(Arc::new(|_: &Alert| -> anyhow::Result<()> {
            anyhow::bail!("webhook unreachable")
        }));
        tracker.add_alert_observer(capture.clone());

        let now = Utc::now();
        tracker.record(snap("c1", now - Duration::hours(30), 100.0, 400.0));
        tracker.record(snap("c1", now, 100.0, 100.0));
        assert_eq!(capture.count(), 1);
    }

    #[test]
    fn test_observers_called_in_registration_order() {
        let calls: Arc<parking_lot::Mutex<Vec<&'static str>>> = Arc::default();
        let recorder = |name: &'static str, fail: bool| {
            let calls = calls.clone();
            Arc::new(move |_: &Alert| -> anyhow::Result<()> {
                calls.lock().push(name);
                if fail {
                    anyhow::bail!("{} unreachable", name);
                }
                Ok(())
            })
        };

        let mut tracker = RoiTracker::default();
        tracker.add_alert_observer(recorder("slack", false));
        tracker.add_alert_observer(recorder("webhook", true));
        tracker.add_alert_observer(recorder("pager", false));

        let now = Utc::now();
        tracker.record(snap("c1", now - Duration::hours(30), 100.0, 400.0));
        let raised = tracker.record(snap("c1", now, 100.0, 100.0));
        assert_eq!(raised.len(), 1);
        assert_eq!(*calls.lock(), vec!["slack", "webhook", "pager"]);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let config = TrackerConfig {
            history_capacity: 3,
            ..TrackerConfig::default()
        };
        let mut tracker = RoiTracker::new(config);
        let now = Utc::now();
        for h in 0..5 {
            tracker.record(snap("c1", now - Duration::hours(10 - h), 10.0, 20.0));
        }
        assert_eq!(tracker.len(), 3);
        let oldest = tracker.history().next().unwrap();
        assert_eq!(oldest.timestamp, now - Duration::hours(8));
    }

    #[test]
    fn test_resolve_alert_once() {
        let mut tracker = RoiTracker::default();
        let now = Utc::now();
        tracker.record(snap("c1", now - Duration::hours(30), 100.0, 400.0));
        let id = tracker.record(snap("c1", now, 100.0, 100.0))[0].id;

        assert!(tracker.resolve_alert(id, "creative refreshed"));
        assert!(!tracker.resolve_alert(id, "again"));
        assert!(!tracker.resolve_alert(Uuid::new_v4(), ""));
        assert_eq!(tracker.active_alerts().count(), 0);
        assert_eq!(tracker.alerts()[0].resolution_note.as_deref(), Some("creative refreshed"));
    }

    #[test]
    fn test_trend_is_ordered_and_restartable() {
        let mut tracker = RoiTracker::default();
        let now = Utc::now();
        tracker.record(snap("c1", now - Duration::hours(2), 100.0, 300.0));
        tracker.record(snap("c1", now - Duration::hours(5), 100.0, 200.0));
        tracker.record(snap("c2", now - Duration::hours(4), 100.0, 900.0));

        let campaign = CampaignId::from("c1");
        let trend = tracker.trend(&campaign, MetricKind::Roas, 7);
        let first: Vec<f64> = trend.clone().map(|(_, v)| v).collect();
        let second: Vec<f64> = trend.map(|(_, v)| v).collect();
        assert_eq!(first, vec![2.0, 3.0]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_current_performance_and_target_variance() {
        let mut tracker = RoiTracker::default();
        let now = Utc::now();
        tracker.record(snap("c1", now - Duration::hours(6), 100.0, 300.0));
        tracker.record(snap("c1", now - Duration::hours(1), 100.0, 500.0));

        let campaign = CampaignId::from("c1");
        let current = tracker.current_performance(&campaign, Duration::hours(24)).unwrap();
        assert_eq!(current.revenue, 500.0);
        assert!(tracker.current_performance(&CampaignId::from("c9"), Duration::hours(24)).is_none());

        let mut targets = PerformanceTargets::new();
        targets.insert(campaign.clone(), BTreeMap::from([(MetricKind::Roas, 4.0)]));
        tracker.set_performance_targets(targets);
        assert!((tracker.target_variance(&campaign, MetricKind::Roas).unwrap() - 25.0).abs() < 1e-9);
        assert!(tracker.target_variance(&campaign, MetricKind::Ctr).is_none());
    }
}
