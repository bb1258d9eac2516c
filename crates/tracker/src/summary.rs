//! Per-campaign roll-ups over a trailing window.

use chrono::{DateTime, Duration, Utc};
use insight_core::types::safe_div;
use insight_core::{CampaignId, Channel, Ratio};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tracker::RoiTracker;

/// Totals and derived ratios for one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    /// Channel of the latest snapshot in the window.
    pub channel: Channel,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub total_conversions: u64,
    pub total_clicks: u64,
    pub total_impressions: u64,
    pub roas: f64,
    pub cpa: Ratio,
    pub ctr: f64,
    pub conversion_rate: f64,
    pub data_points: usize,
    pub last_updated: DateTime<Utc>,
}

impl RoiTracker {
    /// Roll up every campaign seen in the trailing `window`.
    pub fn summary(&self, window: Duration) -> BTreeMap<CampaignId, CampaignSummary> {
        let mut out: BTreeMap<CampaignId, CampaignSummary> = BTreeMap::new();
        for snap in self.since(Utc::now() - window) {
            let entry = out.entry(snap.campaign_id.clone()).or_insert_with(|| CampaignSummary {
                channel: snap.channel,
                total_cost: 0.0,
                total_revenue: 0.0,
                total_conversions: 0,
                total_clicks: 0,
                total_impressions: 0,
                roas: 0.0,
                cpa: Ratio::Undefined,
                ctr: 0.0,
                conversion_rate: 0.0,
                data_points: 0,
                last_updated: snap.timestamp,
            });
            entry.total_cost += snap.cost;
            entry.total_revenue += snap.revenue;
            entry.total_conversions += snap.conversions;
            entry.total_clicks += snap.clicks;
            entry.total_impressions += snap.impressions;
            entry.data_points += 1;
            // History is time-ordered, so the last one seen is the latest.
            entry.channel = snap.channel;
            entry.last_updated = snap.timestamp;
        }

        for s in out.values_mut() {
            s.roas = safe_div(s.total_revenue, s.total_cost);
            s.cpa = Ratio::of(s.total_cost, s.total_conversions as f64);
            s.ctr = safe_div(s.total_clicks as f64, s.total_impressions as f64);
            s.conversion_rate = safe_div(s.total_conversions as f64, s.total_clicks as f64);
        }
        out
    }

    /// Summary over the configured default window.
    pub fn default_summary(&self) -> BTreeMap<CampaignId, CampaignSummary> {
        self.summary(Duration::hours(self.config.summary_window_hours))
    }
}
