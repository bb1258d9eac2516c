//! Executive optimization report.

use chrono::Utc;
use insight_core::types::safe_div;
use insight_core::CampaignId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::metrics::CampaignMetrics;
use crate::optimizer::BidOptimization;

/// Projected effect of applying every bid adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectedImpact {
    /// Spend removed by bid cuts.
    pub cost_savings: f64,
    /// Revenue added by bid increases.
    pub revenue_increase: f64,
    /// `(revenue_increase - cost_savings) / total_spend`, in percent.
    pub net_roi_improvement_pct: f64,
}

pub fn projected_impact(
    campaigns: &[CampaignMetrics],
    optimizations: &BTreeMap<CampaignId, BidOptimization>,
) -> ProjectedImpact {
    let mut impact = ProjectedImpact::default();
    for (campaign_id, opt) in optimizations {
        let Some(campaign) = campaigns.iter().find(|c| &c.campaign_id == campaign_id) else {
            continue;
        };
        if opt.bid_adjustment < 0.0 {
            impact.cost_savings += campaign.cost * opt.bid_adjustment.abs();
        } else {
            impact.revenue_increase += campaign.revenue * opt.bid_adjustment;
        }
    }
    let total_spend: f64 = campaigns.iter().map(|c| c.cost).sum();
    impact.net_roi_improvement_pct = safe_div(impact.revenue_increase - impact.cost_savings, total_spend) * 100.0;
    impact
}

pub fn executive_report(
    campaigns: &[CampaignMetrics],
    optimizations: &BTreeMap<CampaignId, BidOptimization>,
) -> String {
    let total_spend: f64 = campaigns.iter().map(|c| c.cost).sum();
    let total_revenue: f64 = campaigns.iter().map(|c| c.revenue).sum();

    let mut out = String::new();
    out.push_str("=== Campaign Optimization Report ===\n");
    out.push_str(&format!("Generated: {}\n\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC")));
    out.push_str("Executive Summary:\n");
    out.push_str(&format!("  Total Ad Spend: ${total_spend:.2}\n"));
    out.push_str(&format!("  Total Revenue: ${total_revenue:.2}\n"));
    out.push_str(&format!("  Overall ROAS: {:.2}x\n", safe_div(total_revenue, total_spend)));
    out.push_str(&format!("  Active Campaigns: {}\n\n", campaigns.len()));

    out.push_str("Optimization Opportunities:\n");
    for (campaign_id, opt) in optimizations {
        out.push_str(&format!("  {campaign_id}\n"));
        out.push_str(&format!("    Current ROAS: {:.2}x\n", opt.current_roas));
        out.push_str(&format!("    Recommendation: {}\n", opt.recommendation));
        out.push_str(&format!(
            "    Statistical Confidence: {:.1}%\n",
            opt.statistical_significance * 100.0
        ));
    }

    let impact = projected_impact(campaigns, optimizations);
    out.push_str("\nProjected Impact:\n");
    out.push_str(&format!("  Potential Cost Savings: ${:.2}\n", impact.cost_savings));
    out.push_str(&format!("  Potential Revenue Increase: ${:.2}\n", impact.revenue_increase));
    out.push_str(&format!("  Net ROI Improvement: {:.1}%\n", impact.net_roi_improvement_pct));
    out
}
