//! Point-in-time campaign performance readings and the metrics derived from
//! them.

use chrono::{DateTime, Utc};
use insight_core::types::safe_div;
use insight_core::{CampaignId, Channel, Ratio};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics a snapshot can report, raw or derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Roas,
    Cpa,
    Ctr,
    ConversionRate,
    Cost,
    Revenue,
    Impressions,
    Clicks,
    Conversions,
}

/// Which way a metric has to move to be a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
    Neutral,
}

impl MetricKind {
    /// Metrics evaluated for alerts on every recorded snapshot.
    pub const ALERTED: [MetricKind; 5] = [
        MetricKind::Roas,
        MetricKind::Cpa,
        MetricKind::Ctr,
        MetricKind::ConversionRate,
        MetricKind::Cost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Roas => "roas",
            MetricKind::Cpa => "cpa",
            MetricKind::Ctr => "ctr",
            MetricKind::ConversionRate => "conversion_rate",
            MetricKind::Cost => "cost",
            MetricKind::Revenue => "revenue",
            MetricKind::Impressions => "impressions",
            MetricKind::Clicks => "clicks",
            MetricKind::Conversions => "conversions",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Roas => "ROAS",
            MetricKind::Cpa => "CPA",
            MetricKind::Ctr => "CTR",
            MetricKind::ConversionRate => "Conversion Rate",
            MetricKind::Cost => "Cost",
            MetricKind::Revenue => "Revenue",
            MetricKind::Impressions => "Impressions",
            MetricKind::Clicks => "Clicks",
            MetricKind::Conversions => "Conversions",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            MetricKind::Roas | MetricKind::Ctr | MetricKind::ConversionRate => Direction::HigherIsBetter,
            MetricKind::Cpa | MetricKind::Cost => Direction::LowerIsBetter,
            _ => Direction::Neutral,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Campaign performance observed at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    pub campaign_id: CampaignId,
    pub channel: Channel,
    pub timestamp: DateTime<Utc>,
    pub cost: f64,
    pub revenue: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
}

impl CampaignSnapshot {
    pub fn new(campaign_id: impl Into<CampaignId>, channel: Channel, timestamp: DateTime<Utc>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            channel,
            timestamp,
            cost: 0.0,
            revenue: 0.0,
            impressions: 0,
            clicks: 0,
            conversions: 0,
        }
    }

    pub fn with_spend(mut self, cost: f64, revenue: f64) -> Self {
        self.cost = cost;
        self.revenue = revenue;
        self
    }

    pub fn with_funnel(mut self, impressions: u64, clicks: u64, conversions: u64) -> Self {
        self.impressions = impressions;
        self.clicks = clicks;
        self.conversions = conversions;
        self
    }

    /// Revenue per unit of cost; 0.0 without spend.
    pub fn roas(&self) -> f64 {
        safe_div(self.revenue, self.cost)
    }

    /// Cost per conversion; `Undefined` without conversions.
    pub fn cpa(&self) -> Ratio {
        Ratio::of(self.cost, self.conversions as f64)
    }

    pub fn ctr(&self) -> f64 {
        safe_div(self.clicks as f64, self.impressions as f64)
    }

    pub fn conversion_rate(&self) -> f64 {
        safe_div(self.conversions as f64, self.clicks as f64)
    }

    pub fn metric(&self, kind: MetricKind) -> Ratio {
        match kind {
            MetricKind::Roas => Ratio::Finite(self.roas()),
            MetricKind::Cpa => self.cpa(),
            MetricKind::Ctr => Ratio::Finite(self.ctr()),
            MetricKind::ConversionRate => Ratio::Finite(self.conversion_rate()),
            MetricKind::Cost => Ratio::Finite(self.cost),
            MetricKind::Revenue => Ratio::Finite(self.revenue),
            MetricKind::Impressions => Ratio::Finite(self.impressions as f64),
            MetricKind::Clicks => Ratio::Finite(self.clicks as f64),
            MetricKind::Conversions => Ratio::Finite(self.conversions as f64),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_metrics() {
        let snap = CampaignSnapshot::new("spring_sale", Channel::PaidSearch, Utc::now())
            .with_spend(200.0, 900.0)
            .with_funnel(10_000, 250, 10);
        assert!((snap.roas() - 4.5).abs() < 1e-12);
        assert_eq!(snap.cpa(), Ratio::Finite(20.0));
        assert!((snap.ctr() - 0.025).abs() < 1e-12);
        assert!((snap.conversion_rate() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominators_never_nan() {
        let snap = CampaignSnapshot::new("idle", Channel::Display, Utc::now());
        assert_eq!(snap.roas(), 0.0);
        assert_eq!(snap.ctr(), 0.0);
        assert_eq!(snap.conversion_rate(), 0.0);
        assert!(snap.cpa().is_undefined());
        for kind in [MetricKind::Roas, MetricKind::Ctr, MetricKind::ConversionRate, MetricKind::Cost] {
            assert!(!snap.metric(kind).value_or(f64::NAN).is_nan());
        }
    }

    #[test]
    fn test_metric_directions() {
        assert_eq!(MetricKind::Roas.direction(), Direction::HigherIsBetter);
        assert_eq!(MetricKind::Cost.direction(), Direction::LowerIsBetter);
        assert_eq!(MetricKind::Clicks.direction(), Direction::Neutral);
    }
}
