use chrono::{DateTime, Duration, Utc};
use insight_core::{CampaignId, Channel, InsightResult, Ratio};
use serde::{Deserialize, Serialize};

use crate::tracker::RoiTracker;

/// Flat export record: raw snapshot fields plus derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub campaign_id: CampaignId,
    pub channel: Channel,
    pub timestamp: DateTime<Utc>,
    pub roas: f64,
    pub cpa: Ratio,
    pub ctr: f64,
    pub conversion_rate: f64,
    pub cost: f64,
    pub revenue: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
}

impl RoiTracker {
    /// Snapshots from the trailing `days`, optionally limited to some
    /// campaigns, oldest first.
    pub fn export(&self, campaigns: Option<&[CampaignId]>, days: i64) -> Vec<ExportRow> {
        self.since(Utc::now() - Duration::days(days))
            .filter(|s| campaigns.map_or(true, |ids| ids.contains(&s.campaign_id)))
            .map(|s| ExportRow {
                campaign_id: s.campaign_id.clone(),
                channel: s.channel,
                timestamp: s.timestamp,
                roas: s.roas(),
                cpa: s.cpa(),
                ctr: s.ctr(),
                conversion_rate: s.conversion_rate(),
                cost: s.cost,
                revenue: s.revenue,
                impressions: s.impressions,
                clicks: s.clicks,
                conversions: s.conversions,
            })
            .collect()
    }

    pub fn export_json(&self, campaigns: Option<&[CampaignId]>, days: i64) -> InsightResult<String> {
        Ok(serde_json::to_string_pretty(&self.export(campaigns, days))?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::snapshot::CampaignSnapshot;

    #[test]
    fn test_export_filters_by_campaign_and_age() {
        let mut tracker = RoiTracker::default();
        let now = Utc::now();
        tracker.record(CampaignSnapshot::new("a", Channel::Email, now - Duration::days(2)).with_spend(5.0, 10.0));
        tracker.record(CampaignSnapshot::new("b", Channel::Email, now - Duration::days(1)).with_spend(5.0, 10.0));
        tracker.record(CampaignSnapshot::new("a", Channel::Email, now - Duration::days(45)).with_spend(5.0, 10.0));

        assert_eq!(tracker.export(None, 30).len(), 2);
        let only_a = [CampaignId::from("a")];
        let rows = tracker.export(Some(&only_a), 30);
        assert_eq!(rows.len(), 1);
        assert!((rows[0].roas - 2.0).abs() < 1e-12);
        assert!(rows[0].cpa.is_undefined());
    }

    #[test]
    fn test_export_json_shape() {
        let mut tracker = RoiTracker::default();
        tracker.record(
            CampaignSnapshot::new("a", Channel::SocialMedia, Utc::now())
                .with_spend(50.0, 100.0)
                .with_funnel(1_000, 20, 2),
        );
        let json: serde_json::Value = serde_json::from_str(&tracker.export_json(None, 1).unwrap()).unwrap();
        assert_eq!(json[0]["campaign_id"], "a");
        assert_eq!(json[0]["channel"], "social_media");
        assert_eq!(json[0]["cpa"]["finite"], 25.0);
    }
}
