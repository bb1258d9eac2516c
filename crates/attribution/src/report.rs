//! Plain-text rendering of an attribution result.

use insight_core::Channel;

use crate::engine::AttributionResult;
use crate::metrics::ConfidenceInterval;

const TOP_CAMPAIGNS: usize = 5;

pub fn render_text(result: &AttributionResult) -> String {
    let mut out = String::new();
    out.push_str("=== Marketing Attribution Report ===\n");
    out.push_str(&format!("Model: {}\n", result.model.title()));
    out.push_str(&format!(
        "Generated: {}\n",
        result.computed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Model Accuracy: {:.1}%\n", result.model_accuracy * 100.0));
    out.push_str(&format!(
        "Statistical Significance: {:.1}%\n\n",
        result.statistical_significance * 100.0
    ));

    out.push_str("Channel Attribution:\n");
    if result.channel_attribution.is_empty() {
        out.push_str("  (no converted journeys)\n");
    }
    let mut channels: Vec<(&Channel, &f64)> = result.channel_attribution.iter().collect();
    channels.sort_by(|a, b| b.1.total_cmp(a.1));
    for (channel, share) in channels {
        let roi = result.roi_by_channel.get(channel).copied().unwrap_or(0.0);
        let ci = result
            .confidence_intervals
            .get(channel)
            .copied()
            .unwrap_or(ConfidenceInterval { low: 0.0, high: 0.0 });
        out.push_str(&format!("  {}\n", channel.label()));
        out.push_str(&format!("    Attribution: {:.1}%\n", share * 100.0));
        out.push_str(&format!("    ROI: {:.1}%\n", roi * 100.0));
        out.push_str(&format!(
            "    Confidence Interval: ({:.1}%, {:.1}%)\n",
            ci.low * 100.0,
            ci.high * 100.0
        ));
    }

    out.push_str("\nTop Campaigns:\n");
    let mut campaigns: Vec<_> = result.campaign_attribution.iter().collect();
    campaigns.sort_by(|a, b| b.1.total_cmp(a.1));
    for (rank, (campaign, share)) in campaigns.into_iter().take(TOP_CAMPAIGNS).enumerate() {
        out.push_str(&format!("  {}. {}: {:.1}%\n", rank + 1, campaign, share * 100.0));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributionModel;
    use chrono::Utc;
    use insight_core::CampaignId;
    use std::collections::BTreeMap;

    #[test]
    fn test_report_sorts_channels_and_caps_campaigns() {
        let mut campaigns = BTreeMap::new();
        for i in 0..7 {
            campaigns.insert(CampaignId::new(format!("camp_{i}")), (i + 1) as f64 / 28.0);
        }
        let mut channels = BTreeMap::new();
        channels.insert(Channel::Email, 0.25);
        channels.insert(Channel::PaidSearch, 0.75);
        let result = AttributionResult {
            model: AttributionModel::TimeDecay,
            channel_attribution: channels,
            campaign_attribution: campaigns,
            roi_by_channel: BTreeMap::new(),
            confidence_intervals: BTreeMap::new(),
            model_accuracy: 0.85,
            statistical_significance: 0.88,
            computed_at: Utc::now(),
        };

        let text = render_text(&result);
        assert!(text.contains("Model: Time Decay"));
        assert!(text.contains("Model Accuracy: 85.0%"));
        let search = text.find("Paid Search").unwrap();
        let email = text.find("Email").unwrap();
        assert!(search < email);
        assert!(text.contains("1. camp_6"));
        assert!(text.contains("5. camp_2"));
        assert!(!text.contains("camp_1:"));
    }
}
