use chrono::{DateTime, Utc};
use insight_core::types::safe_div;
use insight_core::{CampaignId, Ratio};
use serde::{Deserialize, Serialize};

/// Aggregated performance of one campaign over a reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignMetrics {
    pub campaign_id: CampaignId,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cost: f64,
    pub revenue: f64,
    pub timestamp: DateTime<Utc>,
}

impl CampaignMetrics {
    pub fn ctr(&self) -> f64 {
        safe_div(self.clicks as f64, self.impressions as f64)
    }

    pub fn conversion_rate(&self) -> f64 {
        safe_div(self.conversions as f64, self.clicks as f64)
    }

    pub fn roas(&self) -> f64 {
        safe_div(self.revenue, self.cost)
    }

    /// `Undefined` when there are no conversions.
    pub fn cpa(&self) -> Ratio {
        Ratio::of(self.cost, self.conversions as f64)
    }
}
