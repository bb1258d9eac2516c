//! Campaign-level optimization: bid adjustments against a target ROAS,
//! efficiency-weighted budget allocation, budget-change forecasts and an
//! executive report.

pub mod metrics;
pub mod optimizer;
pub mod report;

pub use metrics::CampaignMetrics;
pub use optimizer::{BidOptimization, CampaignOptimizer, PerformanceForecast};
pub use report::{executive_report, projected_impact, ProjectedImpact};
