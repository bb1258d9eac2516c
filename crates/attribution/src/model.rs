use insight_core::config::AttributionConfig;
use insight_core::InsightError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported attribution models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionModel {
    FirstTouch,
    LastTouch,
    Linear,
    TimeDecay,
    PositionBased,
    DataDriven,
    MarkovChain,
    ShapleyValue,
}

impl AttributionModel {
    pub const ALL: [AttributionModel; 8] = [
        AttributionModel::FirstTouch,
        AttributionModel::LastTouch,
        AttributionModel::Linear,
        AttributionModel::TimeDecay,
        AttributionModel::PositionBased,
        AttributionModel::DataDriven,
        AttributionModel::MarkovChain,
        AttributionModel::ShapleyValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionModel::FirstTouch => "first_touch",
            AttributionModel::LastTouch => "last_touch",
            AttributionModel::Linear => "linear",
            AttributionModel::TimeDecay => "time_decay",
            AttributionModel::PositionBased => "position_based",
            AttributionModel::DataDriven => "data_driven",
            AttributionModel::MarkovChain => "markov_chain",
            AttributionModel::ShapleyValue => "shapley_value",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AttributionModel::FirstTouch => "First Touch",
            AttributionModel::LastTouch => "Last Touch",
            AttributionModel::Linear => "Linear",
            AttributionModel::TimeDecay => "Time Decay",
            AttributionModel::PositionBased => "Position Based",
            AttributionModel::DataDriven => "Data Driven",
            AttributionModel::MarkovChain => "Markov Chain",
            AttributionModel::ShapleyValue => "Shapley Value",
        }
    }

    /// Descriptive (accuracy, significance) pair attached to rule-based
    /// results. These are fixed per model, not measured. The data-driven
    /// model reports its training accuracy instead.
    pub fn descriptive_scores(&self) -> (f64, f64) {
        match self {
            AttributionModel::FirstTouch | AttributionModel::LastTouch => (0.75, 0.80),
            AttributionModel::Linear => (0.82, 0.85),
            AttributionModel::TimeDecay => (0.85, 0.88),
            AttributionModel::PositionBased => (0.83, 0.86),
            AttributionModel::DataDriven => (0.0, 0.92),
            AttributionModel::MarkovChain => (0.88, 0.90),
            AttributionModel::ShapleyValue => (0.91, 0.93),
        }
    }
}

impl fmt::Display for AttributionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributionModel {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let model = match s.trim().to_ascii_lowercase().as_str() {
            "first_touch" => AttributionModel::FirstTouch,
            "last_touch" => AttributionModel::LastTouch,
            "linear" => AttributionModel::Linear,
            "time_decay" => AttributionModel::TimeDecay,
            "position_based" => AttributionModel::PositionBased,
            "data_driven" => AttributionModel::DataDriven,
            "markov_chain" | "markov_removal" | "markov" => AttributionModel::MarkovChain,
            "shapley_value" | "shapley" => AttributionModel::ShapleyValue,
            other => return Err(InsightError::InvalidModel(other.to_string())),
        };
        Ok(model)
    }
}

/// Tunable parameters for a single attribution run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// λ in `exp(-λ · days_before_conversion)`.
    pub time_decay_factor: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            time_decay_factor: 0.1,
        }
    }
}

impl From<&AttributionConfig> for ModelParams {
    fn from(config: &AttributionConfig) -> Self {
        Self {
            time_decay_factor: config.time_decay_factor,
        }
    }
}
