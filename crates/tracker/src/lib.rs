//! Live campaign ROI tracking: bounded snapshot history, direction-aware
//! alerts with observers, trends and anomalies, budget recommendations,
//! dashboard text and a cancellable monitoring loop.

pub mod alert;
pub mod anomaly;
pub mod dashboard;
pub mod export;
pub mod monitor;
pub mod recommendations;
pub mod snapshot;
pub mod summary;
pub mod tracker;

pub use alert::{Alert, AlertObserver, AlertSeverity, CaptureObserver, LoggingObserver};
pub use anomaly::{Anomaly, AnomalyKind};
pub use monitor::{Monitor, MonitorStats, SnapshotSource};
pub use recommendations::{BudgetAction, BudgetRecommendation};
pub use snapshot::{CampaignSnapshot, MetricKind};
pub use summary::CampaignSummary;
pub use tracker::{PerformanceTargets, RoiTracker};
