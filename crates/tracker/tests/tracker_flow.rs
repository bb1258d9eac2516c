use chrono::{Duration, Utc};
use insight_core::config::TrackerConfig;
use insight_core::{CampaignId, Channel, Ratio};
use insight_tracker::dashboard::render_dashboard;
use insight_tracker::{AlertSeverity, CampaignSnapshot, CaptureObserver, MetricKind, RoiTracker};
use std::sync::Arc;

fn reading(campaign: &str, hours_ago: i64, cost: f64, revenue: f64) -> CampaignSnapshot {
    CampaignSnapshot::new(campaign, Channel::SocialMedia, Utc::now() - Duration::hours(hours_ago))
        .with_spend(cost, revenue)
        .with_funnel(20_000, 400, 16)
}

#[test]
fn roas_drop_of_35_percent_is_one_high_alert() {
    let mut tracker = RoiTracker::new(TrackerConfig::default());
    let capture = Arc::new(CaptureObserver::new());
    tracker.add_alert_observer(capture.clone());

    // Two prior-day readings averaging ROAS 5.0.
    tracker.record(reading("summer", 40, 200.0, 900.0));
    tracker.record(reading("summer", 28, 200.0, 1_100.0));
    tracker.record(reading("summer", 0, 200.0, 650.0));

    let alerts = capture.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].metric, MetricKind::Roas);
    assert_eq!(alerts[0].severity, AlertSeverity::High);
    assert!((alerts[0].baseline_value - 5.0).abs() < 1e-9);
    assert_eq!(tracker.active_alerts().count(), 1);
}

#[test]
fn anomalies_need_ten_points() {
    let mut tracker = RoiTracker::default();
    for h in 0..9 {
        let revenue = if h == 0 { 10_000.0 } else { 400.0 };
        tracker.record(reading("sparse", 10 * (9 - h), 100.0, revenue));
    }
    let campaign = CampaignId::from("sparse");
    assert!(tracker.detect_anomalies(&campaign, MetricKind::Roas, 1.0).is_empty());
}

#[test]
fn zero_conversion_cpa_is_undefined_not_infinite() {
    let snapshot = CampaignSnapshot::new("new", Channel::Affiliate, Utc::now()).with_spend(75.0, 0.0);
    assert_eq!(snapshot.cpa(), Ratio::Undefined);
    assert_eq!(snapshot.roas(), 0.0);
    assert_eq!(snapshot.ctr(), 0.0);
    assert_eq!(snapshot.conversion_rate(), 0.0);
}

#[test]
fn dashboard_reflects_recorded_state() {
    let mut tracker = RoiTracker::default();
    tracker.record(reading("alpha", 3, 100.0, 600.0));
    tracker.record(reading("beta", 2, 100.0, 150.0));

    let text = render_dashboard(&tracker);
    assert!(text.contains("Campaigns: 2"));
    assert!(text.contains("1. alpha"));
    assert!(text.contains("2. beta"));
}
