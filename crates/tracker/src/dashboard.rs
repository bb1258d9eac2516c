//! Executive dashboard text for the tracker's current state.

use chrono::Utc;

use crate::alert::AlertSeverity;
use crate::tracker::RoiTracker;

const TOP_CAMPAIGNS: usize = 5;
const MAX_CRITICAL: usize = 5;
const MAX_HIGH_IMPACT: usize = 3;

pub fn render_dashboard(tracker: &RoiTracker) -> String {
    let summary = tracker.default_summary();
    let active: Vec<_> = tracker.active_alerts().collect();
    let critical: Vec<_> = active
        .iter()
        .filter(|a| a.severity == AlertSeverity::Critical)
        .collect();

    let mut out = String::new();
    out.push_str("=== Marketing ROI Dashboard ===\n");
    out.push_str(&format!(
        "Generated: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "Monitoring Period: last {} hours\n\n",
        tracker.config.summary_window_hours
    ));
    out.push_str(&format!(
        "Campaigns: {} | Active Alerts: {} | Critical Alerts: {}\n\n",
        summary.len(),
        active.len(),
        critical.len()
    ));

    if summary.is_empty() {
        return out;
    }

    let total_cost: f64 = summary.values().map(|s| s.total_cost).sum();
    let total_revenue: f64 = summary.values().map(|s| s.total_revenue).sum();
    let portfolio_roas = insight_core::types::safe_div(total_revenue, total_cost);
    out.push_str("Portfolio:\n");
    out.push_str(&format!("  Ad Spend: ${total_cost:.2}\n"));
    out.push_str(&format!("  Revenue: ${total_revenue:.2}\n"));
    out.push_str(&format!("  ROAS: {portfolio_roas:.2}x\n\n"));

    let mut ranked: Vec<_> = summary.iter().collect();
    ranked.sort_by(|a, b| b.1.roas.total_cmp(&a.1.roas));
    out.push_str("Top Campaigns:\n");
    for (rank, (campaign, s)) in ranked.into_iter().take(TOP_CAMPAIGNS).enumerate() {
        out.push_str(&format!(
            "  {}. {} ({})  ROAS: {:.2}x | CPA: {} | Revenue: ${:.2}\n",
            rank + 1,
            campaign,
            s.channel.label(),
            s.roas,
            s.cpa,
            s.total_revenue
        ));
    }

    if !critical.is_empty() {
        out.push_str("\nCritical Alerts:\n");
        for alert in critical.iter().take(MAX_CRITICAL) {
            out.push_str(&format!(
                "  [{}] {} ({}): {} | current {:.2} | change {:+.1}%\n",
                alert.severity,
                alert.campaign_id,
                alert.channel.label(),
                alert.message,
                alert.current_value,
                alert.variance_pct
            ));
        }
    }

    let recommendations = tracker.recommend_budget_actions();
    if !recommendations.is_empty() {
        out.push_str("\nOptimization Recommendations:\n");
        let high_impact: Vec<_> = recommendations
            .iter()
            .filter(|(_, r)| r.is_high_impact())
            .take(MAX_HIGH_IMPACT)
            .collect();
        if !high_impact.is_empty() {
            out.push_str("  High impact:\n");
            for (campaign, rec) in high_impact {
                out.push_str(&format!("    - {}: {}\n", campaign, rec.rationale));
            }
        }

        let scale_up = recommendations.values().filter(|r| r.action.is_increase()).count();
        let scale_down = recommendations.values().filter(|r| r.action.is_decrease()).count();
        if scale_up > 0 && scale_down > 0 {
            out.push_str(&format!(
                "  Reallocation: scale up {scale_up} campaigns, scale down {scale_down} campaigns\n"
            ));
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::snapshot::CampaignSnapshot;
    use chrono::Duration;
    use insight_core::Channel;

    #[test]
    fn test_empty_dashboard() {
        let text = render_dashboard(&RoiTracker::default());
        assert!(text.contains("Campaigns: 0 | Active Alerts: 0 | Critical Alerts: 0"));
        assert!(!text.contains("Portfolio:"));
    }

    #[test]
    fn test_dashboard_sections() {
        let mut tracker = RoiTracker::default();
        let now = Utc::now();
        tracker.record(
            CampaignSnapshot::new("star", Channel::PaidSearch, now - Duration::hours(30))
                .with_spend(100.0, 800.0)
                .with_funnel(10_000, 100, 8),
        );
        // ROAS collapses to 2x: critical alert.
        tracker.record(
            CampaignSnapshot::new("star", Channel::PaidSearch, now - Duration::hours(1))
                .with_spend(100.0, 200.0)
                .with_funnel(10_000, 100, 8),
        );
        tracker.record(
            CampaignSnapshot::new("steady", Channel::Email, now - Duration::hours(2))
                .with_spend(100.0, 100.0)
                .with_funnel(10_000, 100, 2),
        );

        let text = render_dashboard(&tracker);
        assert!(text.contains("Campaigns: 2 | Active Alerts: 1 | Critical Alerts: 1"));
        assert!(text.contains("ROAS: 1.50x"));
        assert!(text.contains("1. star (Paid Search)"));
        assert!(text.contains("Critical Alerts:"));
        assert!(text.contains("Optimization Recommendations:"));
    }
}
