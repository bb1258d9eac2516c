//! Campaign optimizer: performance forecasts, ROAS-driven bid adjustments
//! and efficiency-weighted budget allocation.

use insight_core::config::OptimizerConfig;
use insight_core::types::safe_div;
use insight_core::{stats, CampaignId, InsightError, InsightResult};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::metrics::CampaignMetrics;

/// Expected outcome of scaling a campaign's budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceForecast {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cost: f64,
    pub revenue: f64,
    pub roas: f64,
    /// 0..1, from history volume and ROAS consistency.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidOptimization {
    /// Relative change, e.g. -0.15 for a 15% cut.
    pub bid_adjustment: f64,
    pub current_roas: f64,
    pub target_roas: f64,
    pub recommendation: String,
    /// `1 - p` of a two-sided z-test of conversions against the baseline
    /// conversion rate.
    pub statistical_significance: f64,
}

pub struct CampaignOptimizer {
    config: OptimizerConfig,
}

impl CampaignOptimizer {
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn target_roas(&self) -> f64 {
        self.config.target_roas
    }

    /// Forecast a period at `budget_change` times the historical average
    /// spend. Impressions scale with `budget_change^elasticity`; clicks and
    /// conversions follow the historical mean CTR and conversion rate, and
    /// revenue the historical revenue per conversion.
    pub fn predict_performance(
        &self,
        history: &[CampaignMetrics],
        budget_change: f64,
    ) -> InsightResult<PerformanceForecast> {
        if history.is_empty() {
            return Err(InsightError::InsufficientData(
                "historical data required for performance prediction".into(),
            ));
        }
        if !(budget_change.is_finite() && budget_change > 0.0) {
            return Err(InsightError::InvalidInput(format!(
                "budget change multiplier must be positive, got {budget_change}"
            )));
        }

        let mean_of = |f: fn(&CampaignMetrics) -> f64| {
            stats::mean(&history.iter().map(f).collect::<Vec<_>>()).unwrap_or(0.0)
        };
        let avg_ctr = mean_of(CampaignMetrics::ctr);
        let avg_conversion_rate = mean_of(CampaignMetrics::conversion_rate);
        let avg_impressions = mean_of(|m| m.impressions as f64);
        let avg_cost = mean_of(|m| m.cost);

        let total_revenue: f64 = history.iter().map(|m| m.revenue).sum();
        let total_conversions: u64 = history.iter().map(|m| m.conversions).sum();
        let revenue_per_conversion = safe_div(total_revenue, total_conversions as f64);

        let impressions = avg_impressions * budget_change.powf(self.config.impression_elasticity);
        let clicks = impressions * avg_ctr;
        let conversions = clicks * avg_conversion_rate;
        let cost = avg_cost * budget_change;
        let revenue = conversions * revenue_per_conversion;

        let forecast = PerformanceForecast {
            impressions: impressions.round() as u64,
            clicks: clicks.round() as u64,
            conversions: conversions.round() as u64,
            cost,
            revenue,
            roas: safe_div(revenue, cost),
            confidence: confidence_score(history),
        };
        debug!(
            budget_change,
            predicted_roas = forecast.roas,
            confidence = forecast.confidence,
            "Predicted campaign performance"
        );
        Ok(forecast)
    }

    /// Bid change per campaign from its ROAS relative to `target_roas`.
    pub fn optimize_bid_adjustments(
        &self,
        campaigns: &[CampaignMetrics],
        target_roas: f64,
    ) -> BTreeMap<CampaignId, BidOptimization> {
        let out: BTreeMap<CampaignId, BidOptimization> = campaigns
            .iter()
            .map(|m| {
                let roas = m.roas();
                let (bid_adjustment, recommendation) = if roas < target_roas * 0.5 {
                    (-0.30, "Reduce bids by 30% - underperforming campaign")
                } else if roas < target_roas * 0.8 {
                    (-0.15, "Reduce bids by 15% - below target ROAS")
                } else if roas > target_roas * 1.5 {
                    (0.25, "Increase bids by 25% - high-performing campaign")
                } else if roas > target_roas * 1.2 {
                    (0.10, "Increase bids by 10% - above target ROAS")
                } else {
                    (0.0, "Maintain current bids - on target")
                };
                let opt = BidOptimization {
                    bid_adjustment,
                    current_roas: roas,
                    target_roas,
                    recommendation: recommendation.to_string(),
                    statistical_significance: self.significance(m),
                };
                (m.campaign_id.clone(), opt)
            })
            .collect();
        info!(campaigns = out.len(), target_roas, "Computed bid adjustments");
        out
    }

    /// Split `total_budget` by efficiency `min(roas / 4, 2) + ln(1 + conversions) / 10`.
    /// Campaigns without spend score 0; if nothing scores, split equally.
    pub fn allocate_budget(&self, campaigns: &[CampaignMetrics], total_budget: f64) -> BTreeMap<CampaignId, f64> {
        if campaigns.is_empty() {
            return BTreeMap::new();
        }

        let scores: Vec<f64> = campaigns
            .iter()
            .map(|c| {
                if c.cost > 0.0 {
                    (c.roas() / 4.0).min(2.0) + (c.conversions as f64).ln_1p() / 10.0
                } else {
                    0.0
                }
            })
            .collect();
        let total: f64 = scores.iter().sum();

        let mut allocation = BTreeMap::new();
        for (campaign, score) in campaigns.iter().zip(scores) {
            let amount = if total > 0.0 {
                total_budget * score / total
            } else {
                total_budget / campaigns.len() as f64
            };
            *allocation.entry(campaign.campaign_id.clone()).or_insert(0.0) += amount;
        }
        allocation
    }

    fn significance(&self, m: &CampaignMetrics) -> f64 {
        if m.clicks < self.config.min_clicks_for_significance {
            return 0.0;
        }
        let expected = m.clicks as f64 * self.config.baseline_conversion_rate;
        if expected <= 0.0 {
            return 0.5;
        }
        let z = (m.conversions as f64 - expected).abs() / expected.sqrt();
        match Normal::new(0.0, 1.0) {
            Ok(normal) => {
                let p_value = 2.0 * (1.0 - normal.cdf(z));
                1.0 - p_value
            }
            Err(_) => 0.5,
        }
    }
}

impl Default for CampaignOptimizer {
    fn default() -> Self {
        Self::new(&OptimizerConfig::default())
    }
}

/// Fewer than seven periods: 0.3. No positive ROAS: 0.2. Otherwise the mean
/// of a volume score (periods / 30, capped at 1) and a consistency score
/// (1 - coefficient of variation of positive ROAS, floored at 0).
fn confidence_score(history: &[CampaignMetrics]) -> f64 {
    if history.len() < 7 {
        return 0.3;
    }
    let roas: Vec<f64> = history.iter().map(|m| m.roas()).filter(|r| *r > 0.0).collect();
    let (Some(mean), Some(std)) = (stats::mean(&roas), stats::std_dev(&roas)) else {
        return 0.2;
    };
    let volume = (history.len() as f64 / 30.0).min(1.0);
    let consistency = (1.0 - std / mean).max(0.0);
    (volume + consistency) / 2.0
}
