//! Path-based approximations: Markov removal effect and Shapley split.
//!
//! Both are deliberately simplified. The removal effect compares raw
//! conversion counts instead of absorbing-state probabilities over the full
//! transition matrix, and the Shapley split divides each conversion equally
//! among the distinct channels present rather than enumerating coalitions.

use insight_core::Channel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::credit::CreditLedger;
use crate::journey::CustomerJourney;

/// A node in the first-order journey path graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathState {
    Start,
    Channel(Channel),
    Conversion,
    NoConversion,
}

pub type TransitionCounts = BTreeMap<PathState, BTreeMap<PathState, u64>>;

/// Count transitions over `START → c₁ → … → cₙ → {CONVERSION, NO_CONVERSION}`
/// for every journey with at least one touchpoint.
pub fn transition_counts(journeys: &[CustomerJourney]) -> TransitionCounts {
    let mut counts = TransitionCounts::new();
    for journey in journeys.iter().filter(|j| j.touchpoint_count() > 0) {
        let terminal = if journey.is_converted() {
            PathState::Conversion
        } else {
            PathState::NoConversion
        };
        let path: Vec<PathState> = std::iter::once(PathState::Start)
            .chain(journey.touchpoints().iter().map(|tp| PathState::Channel(tp.channel)))
            .chain(std::iter::once(terminal))
            .collect();

        for pair in path.windows(2) {
            *counts
                .entry(pair[0])
                .or_default()
                .entry(pair[1])
                .or_insert(0) += 1;
        }
    }
    counts
}

pub(crate) fn markov_removal(journeys: &[CustomerJourney]) -> CreditLedger {
    let mut ledger = CreditLedger::new();
    let total_conversions = journeys.iter().filter(|j| j.is_converted()).count();

    let channels: BTreeSet<Channel> = journeys
        .iter()
        .flat_map(|j| j.touchpoints().iter().map(|tp| tp.channel))
        .collect();

    for channel in channels {
        let conversions_without = journeys
            .iter()
            .filter(|j| j.is_converted() && !j.contains_channel(channel))
            .count();
        let removal_effect = total_conversions.saturating_sub(conversions_without);
        ledger.credit_channel(channel, removal_effect as f64);
    }

    for journey in journeys.iter().filter(|j| j.is_converted()) {
        for touchpoint in journey.touchpoints() {
            ledger.credit_campaign(&touchpoint.campaign, 1.0);
        }
    }
    ledger
}

pub(crate) fn shapley_split(journeys: &[CustomerJourney]) -> CreditLedger {
    let mut ledger = CreditLedger::new();
    for journey in journeys.iter().filter(|j| j.is_creditable()) {
        let value = journey.conversion_value();
        let present = journey.unique_channels();
        let share = value / present.len() as f64;
        for channel in present {
            ledger.credit_channel(channel, share);
        }
        for touchpoint in journey.touchpoints() {
            ledger.credit_campaign(&touchpoint.campaign, value);
        }
    }
    ledger
}
