//! Attribution engine: dispatches a journey set to one of the attribution
//! models and packages shares, ROI and confidence bands into a result.

use chrono::{DateTime, Utc};
use insight_core::config::AttributionConfig;
use insight_core::{CampaignId, Channel, InsightError, InsightResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

use crate::algorithmic;
use crate::credit::CreditLedger;
use crate::data_driven;
use crate::journey::CustomerJourney;
use crate::metrics::{self, ConfidenceInterval};
use crate::model::{AttributionModel, ModelParams};
use crate::rules;

/// Attribution analysis output for one model run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionResult {
    /// Model that produced the shares. Differs from the requested model when
    /// the data-driven model falls back to position based.
    pub model: AttributionModel,
    pub channel_attribution: BTreeMap<Channel, f64>,
    pub campaign_attribution: BTreeMap<CampaignId, f64>,
    pub roi_by_channel: BTreeMap<Channel, f64>,
    pub confidence_intervals: BTreeMap<Channel, ConfidenceInterval>,
    pub model_accuracy: f64,
    pub statistical_significance: f64,
    pub computed_at: DateTime<Utc>,
}

pub struct AttributionEngine {
    confidence_level: f64,
    min_data_driven_journeys: usize,
    pub(crate) minimum_budget_share: f64,
}

impl AttributionEngine {
    pub fn new(config: &AttributionConfig) -> Self {
        Self {
            confidence_level: config.confidence_level,
            min_data_driven_journeys: config.min_data_driven_journeys,
            minimum_budget_share: config.minimum_budget_share,
        }
    }

    /// Run one attribution model over `journeys`.
    ///
    /// Fails with `InsufficientData` for an empty journey set. Journey sets
    /// without conversions produce empty share maps.
    pub fn compute(
        &self,
        journeys: &[CustomerJourney],
        model: AttributionModel,
        params: &ModelParams,
    ) -> InsightResult<AttributionResult> {
        if journeys.is_empty() {
            return Err(InsightError::InsufficientData(format!(
                "{model} attribution needs at least one journey"
            )));
        }

        let (accuracy, significance) = model.descriptive_scores();
        let ledger = match model {
            AttributionModel::FirstTouch => rules::first_touch(journeys),
            AttributionModel::LastTouch => rules::last_touch(journeys),
            AttributionModel::Linear => rules::linear(journeys),
            AttributionModel::TimeDecay => rules::time_decay(journeys, params.time_decay_factor),
            AttributionModel::PositionBased => rules::position_based(journeys),
            AttributionModel::MarkovChain => {
                let transitions = algorithmic::transition_counts(journeys);
                debug!(states = transitions.len(), "Built journey transition counts");
                algorithmic::markov_removal(journeys)
            }
            AttributionModel::ShapleyValue => algorithmic::shapley_split(journeys),
            AttributionModel::DataDriven => return Ok(self.data_driven(journeys)),
        };

        Ok(self.package(journeys, model, ledger, accuracy, significance))
    }

    /// Same as [`compute`](Self::compute) with the model given by its tag.
    /// Unknown tags fail with `InvalidModel`.
    pub fn compute_tag(
        &self,
        journeys: &[CustomerJourney],
        tag: &str,
        params: &ModelParams,
    ) -> InsightResult<AttributionResult> {
        let model: AttributionModel = tag.parse()?;
        self.compute(journeys, model, params)
    }

    /// Run every model over the same data. A failing model is logged and left
    /// out of the map.
    pub fn compare_models(
        &self,
        journeys: &[CustomerJourney],
        params: &ModelParams,
    ) -> BTreeMap<AttributionModel, AttributionResult> {
        let mut results = BTreeMap::new();
        for model in AttributionModel::ALL {
            match self.compute(journeys, model, params) {
                Ok(result) => {
                    info!(model = %model, "Built attribution model");
                    results.insert(model, result);
                }
                Err(e) => error!(model = %model, error = %e, "Failed to build attribution model"),
            }
        }
        results
    }

    fn data_driven(&self, journeys: &[CustomerJourney]) -> AttributionResult {
        if journeys.len() < self.min_data_driven_journeys {
            warn!(
                journeys = journeys.len(),
                required = self.min_data_driven_journeys,
                "Insufficient data for data-driven model, falling back to position based"
            );
            return self.fallback(journeys);
        }

        let Some(fit) = data_driven::fit(journeys) else {
            warn!("Journey outcomes are single-class, falling back to position based");
            return self.fallback(journeys);
        };

        let (_, significance) = AttributionModel::DataDriven.descriptive_scores();
        let ledger = CreditLedger {
            channels: fit.channel_importance,
            campaigns: fit.campaign_weights,
        };
        self.package(
            journeys,
            AttributionModel::DataDriven,
            ledger,
            fit.training_accuracy,
            significance,
        )
    }

    fn fallback(&self, journeys: &[CustomerJourney]) -> AttributionResult {
        let model = AttributionModel::PositionBased;
        let (accuracy, significance) = model.descriptive_scores();
        self.package(journeys, model, rules::position_based(journeys), accuracy, significance)
    }

    fn package(
        &self,
        journeys: &[CustomerJourney],
        model: AttributionModel,
        ledger: CreditLedger,
        model_accuracy: f64,
        statistical_significance: f64,
    ) -> AttributionResult {
        let (channel_attribution, campaign_attribution) = ledger.into_shares();
        let roi_by_channel = metrics::roi_by_channel(journeys, &channel_attribution);
        let confidence_intervals =
            metrics::confidence_intervals(journeys, &channel_attribution, self.confidence_level);

        AttributionResult {
            model,
            channel_attribution,
            campaign_attribution,
            roi_by_channel,
            confidence_intervals,
            model_accuracy,
            statistical_significance,
            computed_at: Utc::now(),
        }
    }
}

impl Default for AttributionEngine {
    fn default() -> Self {
        Self::new(&AttributionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::Touchpoint;
    use chrono::Duration;

    fn base() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn mixed_journeys() -> Vec<CustomerJourney> {
        let channels = [Channel::PaidSearch, Channel::SocialMedia, Channel::Email, Channel::Display];
        (0..12)
            .map(|i| {
                let tps: Vec<Touchpoint> = (0..=(i % 4))
                    .map(|k| {
                        Touchpoint::new(
                            base() + Duration::days(k as i64 * 3),
                            channels[(i + k) % 4],
                            format!("camp_{}", (i + k) % 3),
                            10.0 + k as f64,
                            format!("c{i}"),
                        )
                    })
                    .collect();
                if i % 3 == 0 {
                    CustomerJourney::unconverted(format!("c{i}"), tps)
                } else {
                    CustomerJourney::converted(format!("c{i}"), tps, 40.0 + i as f64, base() + Duration::days(14))
                        .unwrap()
                }
            })
            .collect()
    }

    #[test]
    fn test_every_model_shares_sum_to_one() {
        let engine = AttributionEngine::default();
        let journeys = mixed_journeys();
        for model in AttributionModel::ALL {
            let result = engine.compute(&journeys, model, &ModelParams::default()).unwrap();
            let channel_total: f64 = result.channel_attribution.values().sum();
            let campaign_total: f64 = result.campaign_attribution.values().sum();
            assert!((channel_total - 1.0).abs() < 1e-9, "{model}: {channel_total}");
            assert!((campaign_total - 1.0).abs() < 1e-9, "{model}: {campaign_total}");
        }
    }

    #[test]
    fn test_empty_journeys_is_insufficient_data() {
        let engine = AttributionEngine::default();
        let err = engine
            .compute(&[], AttributionModel::Linear, &ModelParams::default())
            .unwrap_err();
        assert!(matches!(err, InsightError::InsufficientData(_)));
    }

    #[test]
    fn test_no_conversions_yields_empty_maps() {
        let engine = AttributionEngine::default();
        let journeys: Vec<_> = mixed_journeys()
            .into_iter()
            .map(|j| CustomerJourney::unconverted(j.customer_id.clone(), j.touchpoints().to_vec()))
            .collect();
        for model in AttributionModel::ALL {
            let result = engine.compute(&journeys, model, &ModelParams::default()).unwrap();
            assert!(result.channel_attribution.is_empty(), "{model}");
            assert!(result.roi_by_channel.values().all(|v| !v.is_nan()));
        }
    }

    #[test]
    fn test_data_driven_falls_back_below_minimum() {
        let engine = AttributionEngine::default();
        let result = engine
            .compute(&mixed_journeys(), AttributionModel::DataDriven, &ModelParams::default())
            .unwrap();
        assert_eq!(result.model, AttributionModel::PositionBased);
        assert_eq!(result.model_accuracy, 0.83);
    }

    #[test]
    fn test_compare_models_returns_all_models() {
        let engine = AttributionEngine::default();
        let results = engine.compare_models(&mixed_journeys(), &ModelParams::default());
        assert_eq!(results.len(), AttributionModel::ALL.len());
        assert!(engine.compare_models(&[], &ModelParams::default()).is_empty());
    }

    #[test]
    fn test_unknown_tag_is_invalid_model() {
        let engine = AttributionEngine::default();
        let err = engine
            .compute_tag(&mixed_journeys(), "last_click_wins", &ModelParams::default())
            .unwrap_err();
        assert!(matches!(err, InsightError::InvalidModel(tag) if tag == "last_click_wins"));
    }

    #[test]
    fn test_static_scores_per_model() {
        let engine = AttributionEngine::default();
        let result = engine
            .compute(&mixed_journeys(), AttributionModel::Linear, &ModelParams::default())
            .unwrap();
        assert_eq!(result.model_accuracy, 0.82);
        assert_eq!(result.statistical_significance, 0.85);
    }
}
