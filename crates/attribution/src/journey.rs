//! Customer journeys: ordered touchpoint sequences ending in a conversion
//! or not.

use chrono::{DateTime, Utc};
use insight_core::{CampaignId, Channel, InsightError, InsightResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single marketing exposure tied to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Touchpoint {
    pub timestamp: DateTime<Utc>,
    pub channel: Channel,
    pub campaign: CampaignId,
    pub cost: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub customer_id: String,
}

impl Touchpoint {
    pub fn new(
        timestamp: DateTime<Utc>,
        channel: Channel,
        campaign: impl Into<CampaignId>,
        cost: f64,
        customer_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            channel,
            campaign: campaign.into(),
            cost,
            impressions: 0,
            clicks: 0,
            customer_id: customer_id.into(),
        }
    }

    pub fn with_engagement(mut self, impressions: u64, clicks: u64) -> Self {
        self.impressions = impressions;
        self.clicks = clicks;
        self
    }
}

/// How a journey ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JourneyOutcome {
    Converted { value: f64, at: DateTime<Utc> },
    NotConverted,
}

/// Touchpoints for one customer, sorted by time ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerJourney {
    pub customer_id: String,
    touchpoints: Vec<Touchpoint>,
    outcome: JourneyOutcome,
}

impl CustomerJourney {
    /// A journey that ended in a conversion worth `value`.
    pub fn converted(
        customer_id: impl Into<String>,
        touchpoints: Vec<Touchpoint>,
        value: f64,
        at: DateTime<Utc>,
    ) -> InsightResult<Self> {
        let customer_id = customer_id.into();
        if !value.is_finite() || value <= 0.0 {
            return Err(InsightError::InvalidJourney(format!(
                "converted journey for {customer_id} must have a positive value, got {value}"
            )));
        }
        Ok(Self::build(
            customer_id,
            touchpoints,
            JourneyOutcome::Converted { value, at },
        ))
    }

    /// A journey that has not (yet) converted.
    pub fn unconverted(customer_id: impl Into<String>, touchpoints: Vec<Touchpoint>) -> Self {
        Self::build(customer_id.into(), touchpoints, JourneyOutcome::NotConverted)
    }

    fn build(customer_id: String, mut touchpoints: Vec<Touchpoint>, outcome: JourneyOutcome) -> Self {
        touchpoints.sort_by_key(|tp| tp.timestamp);
        Self {
            customer_id,
            touchpoints,
            outcome,
        }
    }

    pub fn touchpoints(&self) -> &[Touchpoint] {
        &self.touchpoints
    }

    pub fn outcome(&self) -> &JourneyOutcome {
        &self.outcome
    }

    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, JourneyOutcome::Converted { .. })
    }

    /// Conversion value, 0.0 for unconverted journeys.
    pub fn conversion_value(&self) -> f64 {
        match self.outcome {
            JourneyOutcome::Converted { value, .. } => value,
            JourneyOutcome::NotConverted => 0.0,
        }
    }

    pub fn conversion_time(&self) -> Option<DateTime<Utc>> {
        match self.outcome {
            JourneyOutcome::Converted { at, .. } => Some(at),
            JourneyOutcome::NotConverted => None,
        }
    }

    pub fn touchpoint_count(&self) -> usize {
        self.touchpoints.len()
    }

    pub fn unique_channels(&self) -> BTreeSet<Channel> {
        self.touchpoints.iter().map(|tp| tp.channel).collect()
    }

    pub fn contains_channel(&self, channel: Channel) -> bool {
        self.touchpoints.iter().any(|tp| tp.channel == channel)
    }

    /// Whole days from the first touchpoint to the conversion (or the last
    /// touchpoint when unconverted).
    pub fn duration_days(&self) -> i64 {
        let (Some(first), Some(last)) = (self.touchpoints.first(), self.touchpoints.last()) else {
            return 0;
        };
        let end = self.conversion_time().unwrap_or(last.timestamp);
        (end - first.timestamp).num_days()
    }

    /// Converted journeys that actually have touchpoints to credit.
    pub(crate) fn is_creditable(&self) -> bool {
        self.is_converted() && !self.touchpoints.is_empty()
    }
}
