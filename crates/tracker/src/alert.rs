//! Performance alerts and the observers notified when one fires.
//!
//! Observers are registered on the tracker as `Arc<dyn AlertObserver>` and
//! called in registration order. A failing observer is logged and skipped.

use chrono::{DateTime, Utc};
use insight_core::{CampaignId, Channel};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

use crate::snapshot::MetricKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        })
    }
}

/// A metric swing against the campaign's prior-day baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub campaign_id: CampaignId,
    pub channel: Channel,
    pub metric: MetricKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub current_value: f64,
    pub baseline_value: f64,
    /// Signed percentage change from the baseline.
    pub variance_pct: f64,
    pub triggered_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_note: Option<String>,
}

impl Alert {
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

/// Receives every alert the tracker raises.
pub trait AlertObserver: Send + Sync {
    fn name(&self) -> &str {
        "observer"
    }

    fn on_alert(&self, alert: &Alert) -> anyhow::Result<()>;
}

impl<F> AlertObserver for F
where
    F: Fn(&Alert) -> anyhow::Result<()> + Send + Sync,
{
    fn on_alert(&self, alert: &Alert) -> anyhow::Result<()> {
        self(alert)
    }
}

/// Writes each alert to the log at warn level.
pub struct LoggingObserver;

impl AlertObserver for LoggingObserver {
    fn name(&self) -> &str {
        "logging"
    }

    fn on_alert(&self, alert: &Alert) -> anyhow::Result<()> {
        warn!(
            campaign = %alert.campaign_id,
            metric = %alert.metric,
            severity = %alert.severity,
            variance_pct = alert.variance_pct,
            "{}",
            alert.message
        );
        Ok(())
    }
}

/// Keeps every alert in memory for later inspection.
#[derive(Default)]
pub struct CaptureObserver {
    alerts: Mutex<Vec<Alert>>,
}

impl CaptureObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.alerts.lock().len()
    }
}

impl AlertObserver for CaptureObserver {
    fn name(&self) -> &str {
        "capture"
    }

    fn on_alert(&self, alert: &Alert) -> anyhow::Result<()> {
        self.alerts.lock().push(alert.clone());
        Ok(())
    }
}
