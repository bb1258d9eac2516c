//! Statistical anomaly detection on a campaign metric's recent trend.

use chrono::{DateTime, Utc};
use insight_core::{stats, CampaignId};
use serde::{Deserialize, Serialize};

use crate::snapshot::MetricKind;
use crate::tracker::RoiTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Value above the normal range.
    Spike,
    /// Value below the normal range.
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub kind: AnomalyKind,
    pub mean: f64,
    pub std_dev: f64,
}

impl RoiTracker {
    /// Flag recent observations that sit more than `sensitivity` standard
    /// deviations from the trailing-window mean.
    ///
    /// Mean and (population) deviation cover the whole anomaly window; only
    /// the most recent points are tested. Too few points yields nothing.
    pub fn detect_anomalies(&self, campaign: &CampaignId, metric: MetricKind, sensitivity: f64) -> Vec<Anomaly> {
        let points: Vec<(DateTime<Utc>, f64)> = self
            .trend(campaign, metric, self.config.anomaly_window_days)
            .collect();
        if points.len() < self.config.anomaly_min_points {
            return Vec::new();
        }

        let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
        let (Some(mean), Some(std_dev)) = (stats::mean(&values), stats::std_dev(&values)) else {
            return Vec::new();
        };
        let band = sensitivity * std_dev;
        let recent_from = points.len().saturating_sub(self.config.anomaly_recent_points);

        points[recent_from..]
            .iter()
            .filter(|(_, value)| (value - mean).abs() > band)
            .map(|(timestamp, value)| Anomaly {
                timestamp: *timestamp,
                value: *value,
                kind: if *value > mean { AnomalyKind::Spike } else { AnomalyKind::Drop },
                mean,
                std_dev,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::snapshot::CampaignSnapshot;
    use chrono::Duration;
    use insight_core::Channel;

    fn tracker_with_roas(values: &[f64]) -> RoiTracker {
        let mut tracker = RoiTracker::default();
        let now = Utc::now();
        let n = values.len() as i64;
        for (i, roas) in values.iter().enumerate() {
            // Six hours apart; alerts raised along the way don't matter here.
            tracker.record(
                CampaignSnapshot::new("c1", Channel::PaidSearch, now - Duration::hours(6 * (n - i as i64)))
                    .with_spend(100.0, 100.0 * roas),
            );
        }
        tracker
    }

    #[test]
    fn test_too_few_points_is_empty() {
        let tracker = tracker_with_roas(&[1.0, 50.0, 1.0, 90.0, 2.0, 3.0, 100.0, 0.5, 70.0]);
        let campaign = CampaignId::from("c1");
        assert!(tracker.detect_anomalies(&campaign, MetricKind::Roas, 0.1).is_empty());
    }

    #[test]
    fn test_recent_spike_detected() {
        let mut values = vec![4.0; 12];
        values.push(20.0);
        let tracker = tracker_with_roas(&values);
        let campaign = CampaignId::from("c1");
        let anomalies = tracker.detect_anomalies(&campaign, MetricKind::Roas, 2.0);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::Spike);
        assert_eq!(anomalies[0].value, 20.0);
    }

    #[test]
    fn test_old_outlier_outside_recent_points_ignored() {
        let mut values = vec![1.0];
        values.extend(std::iter::repeat(4.0).take(12));
        let tracker = tracker_with_roas(&values);
        let campaign = CampaignId::from("c1");
        assert!(tracker.detect_anomalies(&campaign, MetricKind::Roas, 2.0).is_empty());
    }

    #[test]
    fn test_drop_detected() {
        let mut values = vec![5.0; 15];
        values.push(0.5);
        let tracker = tracker_with_roas(&values);
        let campaign = CampaignId::from("c1");
        let anomalies = tracker.detect_anomalies(&campaign, MetricKind::Roas, 2.0);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::Drop);
    }
}
