//! Rule-based attribution: first touch, last touch, linear, time decay and
//! position based.

use crate::credit::CreditLedger;
use crate::journey::CustomerJourney;

pub(crate) fn first_touch(journeys: &[CustomerJourney]) -> CreditLedger {
    let mut ledger = CreditLedger::new();
    for journey in journeys.iter().filter(|j| j.is_creditable()) {
        if let Some(first) = journey.touchpoints().first() {
            ledger.credit(first, journey.conversion_value());
        }
    }
    ledger
}

pub(crate) fn last_touch(journeys: &[CustomerJourney]) -> CreditLedger {
    let mut ledger = CreditLedger::new();
    for journey in journeys.iter().filter(|j| j.is_creditable()) {
        if let Some(last) = journey.touchpoints().last() {
            ledger.credit(last, journey.conversion_value());
        }
    }
    ledger
}

pub(crate) fn linear(journeys: &[CustomerJourney]) -> CreditLedger {
    let mut ledger = CreditLedger::new();
    for journey in journeys.iter().filter(|j| j.is_creditable()) {
        let per_touch = journey.conversion_value() / journey.touchpoint_count() as f64;
        for touchpoint in journey.touchpoints() {
            ledger.credit(touchpoint, per_touch);
        }
    }
    ledger
}

/// Per-touchpoint weights `exp(-λ · days_before_conversion)`, normalized to
/// sum to 1. Touchpoints after the conversion count as zero days.
pub(crate) fn time_decay_weights(journey: &CustomerJourney, decay_factor: f64) -> Vec<f64> {
    let Some(converted_at) = journey.conversion_time() else {
        return Vec::new();
    };
    let raw: Vec<f64> = journey
        .touchpoints()
        .iter()
        .map(|tp| {
            let days = (converted_at - tp.timestamp).num_days().max(0) as f64;
            (-decay_factor * days).exp()
        })
        .collect();
    let total: f64 = raw.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return Vec::new();
    }
    raw.into_iter().map(|w| w / total).collect()
}

pub(crate) fn time_decay(journeys: &[CustomerJourney], decay_factor: f64) -> CreditLedger {
    let mut ledger = CreditLedger::new();
    for journey in journeys.iter().filter(|j| j.is_creditable()) {
        let weights = time_decay_weights(journey, decay_factor);
        for (touchpoint, weight) in journey.touchpoints().iter().zip(weights) {
            ledger.credit(touchpoint, journey.conversion_value() * weight);
        }
    }
    ledger
}

/// Position-based weights: 100% for one touch, 50/50 for two, otherwise 40%
/// first, 40% last and 20% spread over the middle.
pub(crate) fn position_weights(touch_count: usize) -> Vec<f64> {
    match touch_count {
        0 => Vec::new(),
        1 => vec![1.0],
        2 => vec![0.5, 0.5],
        n => {
            let middle = 0.2 / (n - 2) as f64;
            let mut weights = vec![middle; n];
            weights[0] = 0.4;
            weights[n - 1] = 0.4;
            weights
        }
    }
}

pub(crate) fn position_based(journeys: &[CustomerJourney]) -> CreditLedger {
    let mut ledger = CreditLedger::new();
    for journey in journeys.iter().filter(|j| j.is_creditable()) {
        let weights = position_weights(journey.touchpoint_count());
        for (touchpoint, weight) in journey.touchpoints().iter().zip(weights) {
            ledger.credit(touchpoint, journey.conversion_value() * weight);
        }
    }
    ledger
}
