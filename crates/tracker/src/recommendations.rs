//! Budget actions from trailing-week ROAS and CPA against the portfolio
//! medians.

use chrono::Duration;
use insight_core::{stats, CampaignId, Ratio};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::tracker::RoiTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetAction {
    IncreaseBudget,
    ModerateIncrease,
    DecreaseBudget,
    Optimize,
    Maintain,
}

impl BudgetAction {
    pub fn rationale(&self) -> &'static str {
        match self {
            BudgetAction::IncreaseBudget => "High ROI opportunity - consider 25-50% budget increase",
            BudgetAction::ModerateIncrease => "Above average performance - consider 10-25% budget increase",
            BudgetAction::DecreaseBudget => "Poor performance - consider 30-50% budget reduction",
            BudgetAction::Optimize => "Below average performance - optimize targeting and creative",
            BudgetAction::Maintain => "Performance in line with portfolio average",
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            BudgetAction::IncreaseBudget => 0.9,
            BudgetAction::ModerateIncrease => 0.75,
            BudgetAction::DecreaseBudget => 0.85,
            BudgetAction::Optimize => 0.7,
            BudgetAction::Maintain => 0.6,
        }
    }

    pub fn is_increase(&self) -> bool {
        matches!(self, BudgetAction::IncreaseBudget | BudgetAction::ModerateIncrease)
    }

    pub fn is_decrease(&self) -> bool {
        matches!(self, BudgetAction::DecreaseBudget)
    }
}

impl fmt::Display for BudgetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BudgetAction::IncreaseBudget => "INCREASE_BUDGET",
            BudgetAction::ModerateIncrease => "MODERATE_INCREASE",
            BudgetAction::DecreaseBudget => "DECREASE_BUDGET",
            BudgetAction::Optimize => "OPTIMIZE",
            BudgetAction::Maintain => "MAINTAIN",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecommendation {
    pub action: BudgetAction,
    pub rationale: String,
    pub confidence: f64,
    pub current_roas: f64,
    pub median_roas: f64,
    pub current_cpa: Ratio,
    /// `None` when no campaign in the window has a defined CPA.
    pub median_cpa: Option<f64>,
}

impl BudgetRecommendation {
    /// Budget moves worth surfacing first.
    pub fn is_high_impact(&self) -> bool {
        (self.action == BudgetAction::IncreaseBudget || self.action == BudgetAction::DecreaseBudget)
            && self.confidence > 0.8
    }
}

/// Pick an action for one campaign. An undefined CPA or missing median CPA
/// never satisfies a CPA condition.
pub fn classify(roas: f64, cpa: Ratio, median_roas: f64, median_cpa: Option<f64>) -> BudgetAction {
    let cpa_vs_median = |pred: fn(f64, f64) -> bool| match (cpa.finite(), median_cpa) {
        (Some(c), Some(m)) => pred(c, m),
        _ => false,
    };

    if roas > median_roas * 1.5 && cpa_vs_median(|c, m| c < m * 0.7) {
        BudgetAction::IncreaseBudget
    } else if roas > median_roas * 1.2 {
        BudgetAction::ModerateIncrease
    } else if roas < median_roas * 0.5 || cpa_vs_median(|c, m| c > m * 2.0) {
        BudgetAction::DecreaseBudget
    } else if roas < median_roas * 0.8 {
        BudgetAction::Optimize
    } else {
        BudgetAction::Maintain
    }
}

impl RoiTracker {
    /// One recommendation per campaign seen in the trailing recommendation
    /// window. Fewer than two campaigns gives nothing to compare against.
    pub fn recommend_budget_actions(&self) -> BTreeMap<CampaignId, BudgetRecommendation> {
        let summary = self.summary(Duration::hours(self.config.recommendation_window_hours));
        if summary.len() < 2 {
            return BTreeMap::new();
        }

        let roas_values: Vec<f64> = summary.values().map(|s| s.roas).collect();
        let cpa_values: Vec<f64> = summary
            .values()
            .filter_map(|s| s.cpa.finite())
            .filter(|c| *c > 0.0)
            .collect();
        let median_roas = stats::median(&roas_values).unwrap_or(0.0);
        let median_cpa = stats::median(&cpa_values);

        summary
            .into_iter()
            .map(|(campaign, s)| {
                let action = classify(s.roas, s.cpa, median_roas, median_cpa);
                let rec = BudgetRecommendation {
                    action,
                    rationale: action.rationale().to_string(),
                    confidence: action.confidence(),
                    current_roas: s.roas,
                    median_roas,
                    current_cpa: s.cpa,
                    median_cpa,
                };
                (campaign, rec)
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::snapshot::CampaignSnapshot;
    use chrono::Utc;
    use insight_core::Channel;

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify(6.0, Ratio::Finite(10.0), 3.0, Some(20.0)), BudgetAction::IncreaseBudget);
        assert_eq!(classify(6.0, Ratio::Finite(19.0), 3.0, Some(20.0)), BudgetAction::ModerateIncrease);
        assert_eq!(classify(1.0, Ratio::Finite(20.0), 3.0, Some(20.0)), BudgetAction::DecreaseBudget);
        assert_eq!(classify(3.0, Ratio::Finite(45.0), 3.0, Some(20.0)), BudgetAction::DecreaseBudget);
        assert_eq!(classify(2.0, Ratio::Finite(20.0), 3.0, Some(20.0)), BudgetAction::Optimize);
        assert_eq!(classify(3.0, Ratio::Finite(20.0), 3.0, Some(20.0)), BudgetAction::Maintain);
        assert_eq!(classify(6.0, Ratio::Undefined, 3.0, Some(20.0)), BudgetAction::ModerateIncrease);
    }

    #[test]
    fn test_single_campaign_gets_no_recommendations() {
        let mut tracker = RoiTracker::default();
        tracker.record(
            CampaignSnapshot::new("solo", Channel::Email, Utc::now())
                .with_spend(10.0, 50.0)
                .with_funnel(100, 10, 1),
        );
        assert!(tracker.recommend_budget_actions().is_empty());
    }

    #[test]
    fn test_portfolio_recommendations() {
        let mut tracker = RoiTracker::default();
        let now = Utc::now();
        // ROAS 8, 4, 1 and CPA 12.5, 50, 100.
        for (campaign, revenue, conversions) in [("star", 800.0, 8), ("steady", 400.0, 2), ("laggard", 100.0, 1)] {
            tracker.record(
                CampaignSnapshot::new(campaign, Channel::PaidSearch, now - Duration::hours(12))
                    .with_spend(100.0, revenue)
                    .with_funnel(10_000, 100, conversions),
            );
        }
        let recs = tracker.recommend_budget_actions();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[&CampaignId::from("star")].action, BudgetAction::IncreaseBudget);
        assert_eq!(recs[&CampaignId::from("steady")].action, BudgetAction::Maintain);
        assert_eq!(recs[&CampaignId::from("laggard")].action, BudgetAction::DecreaseBudget);
        assert_eq!(recs[&CampaignId::from("laggard")].confidence, 0.85);
        assert!(recs[&CampaignId::from("star")].is_high_impact());
    }
}
