//! Channel ROI and heuristic confidence bands derived from an attribution
//! split.

use insight_core::stats;
use insight_core::types::safe_div;
use insight_core::Channel;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::BTreeMap;

use crate::journey::CustomerJourney;

/// Lower and upper bound around a channel's attribution share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

/// `(attributed_revenue - cost) / cost` per credited channel. Every touch
/// on a channel inside a converted journey adds `conversion_value × share`
/// to that channel's revenue, so repeated touches count once each and
/// journeys that never touched the channel add nothing. Cost sums every
/// touchpoint cost on the channel. Zero cost gives 0.0.
pub fn roi_by_channel(
    journeys: &[CustomerJourney],
    channel_shares: &BTreeMap<Channel, f64>,
) -> BTreeMap<Channel, f64> {
    let mut costs: BTreeMap<Channel, f64> = BTreeMap::new();
    let mut revenue: BTreeMap<Channel, f64> = BTreeMap::new();
    for journey in journeys {
        let value = journey.conversion_value();
        for touchpoint in journey.touchpoints() {
            *costs.entry(touchpoint.channel).or_insert(0.0) += touchpoint.cost;
            if journey.is_converted() {
                let share = channel_shares.get(&touchpoint.channel).copied().unwrap_or(0.0);
                *revenue.entry(touchpoint.channel).or_insert(0.0) += value * share;
            }
        }
    }

    channel_shares
        .keys()
        .map(|channel| {
            let cost = costs.get(channel).copied().unwrap_or(0.0);
            let attributed = revenue.get(channel).copied().unwrap_or(0.0);
            (*channel, safe_div(attributed - cost, cost))
        })
        .collect()
}

/// Two-sided z-score for `confidence_level` (1.96 at 0.95).
pub fn z_score(confidence_level: f64) -> f64 {
    let level = confidence_level.clamp(0.5, 0.999_999);
    Normal::new(0.0, 1.0)
        .map(|n| n.inverse_cdf(1.0 - (1.0 - level) / 2.0))
        .unwrap_or(1.96)
}

/// Heuristic band around each share, not a rigorous interval.
///
/// The sample for a channel is the conversion values of converted journeys
/// that touched it. With two or more samples the relative standard error of
/// the mean, times the z-score, is applied to the share (floored at zero).
/// Otherwise the band is a fixed ±50%.
pub fn confidence_intervals(
    journeys: &[CustomerJourney],
    channel_shares: &BTreeMap<Channel, f64>,
    confidence_level: f64,
) -> BTreeMap<Channel, ConfidenceInterval> {
    let z = z_score(confidence_level);

    channel_shares
        .iter()
        .map(|(channel, share)| {
            let samples: Vec<f64> = journeys
                .iter()
                .filter(|j| j.is_converted() && j.contains_channel(*channel))
                .map(|j| j.conversion_value())
                .collect();

            let interval = match (stats::mean(&samples), stats::std_dev(&samples)) {
                (Some(mean), Some(std)) if samples.len() > 1 && mean > 0.0 => {
                    let relative_margin = z * std / (samples.len() as f64).sqrt() / mean;
                    ConfidenceInterval {
                        low: (share * (1.0 - relative_margin)).max(0.0),
                        high: share * (1.0 + relative_margin),
                    }
                }
                _ => ConfidenceInterval {
                    low: share * 0.5,
                    high: share * 1.5,
                },
            };
            (*channel, interval)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::journey::Touchpoint;
    use chrono::{Duration, Utc};

    fn converted(channel: Channel, cost: f64, value: f64) -> CustomerJourney {
        let now = Utc::now();
        let tp = Touchpoint::new(now - Duration::days(1), channel, "camp", cost, "c");
        CustomerJourney::converted("c", vec![tp], value, now).unwrap()
    }

    #[test]
    fn test_roi_counts_only_touched_journeys() {
        let journeys = vec![converted(Channel::Email, 20.0, 100.0), converted(Channel::Display, 80.0, 100.0)];
        let mut shares = BTreeMap::new();
        shares.insert(Channel::Email, 0.5);
        shares.insert(Channel::Display, 0.5);
        let roi = roi_by_channel(&journeys, &shares);
        // Each channel earns half of the one journey it touched.
        assert!((roi[&Channel::Email] - 1.5).abs() < 1e-9);
        assert!((roi[&Channel::Display] + 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_roi_credits_every_touch_on_a_channel() {
        let now = Utc::now();
        let tp = |channel, hours| Touchpoint::new(now - Duration::hours(hours), channel, "camp", 10.0, "c");
        let journeys = vec![
            CustomerJourney::converted(
                "c1",
                vec![tp(Channel::Email, 30), tp(Channel::Email, 20), tp(Channel::Display, 10)],
                100.0,
                now,
            )
            .unwrap(),
            CustomerJourney::converted("c2", vec![tp(Channel::Display, 5)], 300.0, now).unwrap(),
        ];
        let mut shares = BTreeMap::new();
        shares.insert(Channel::Email, 0.5);
        shares.insert(Channel::Display, 0.5);
        let roi = roi_by_channel(&journeys, &shares);
        // Email: 2 × 50 against 20; display: 50 + 150 against 20.
        assert!((roi[&Channel::Email] - 4.0).abs() < 1e-9);
        assert!((roi[&Channel::Display] - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_roi_zero_cost_is_zero() {
        let journeys = vec![converted(Channel::Direct, 0.0, 100.0)];
        let mut shares = BTreeMap::new();
        shares.insert(Channel::Direct, 1.0);
        assert_eq!(roi_by_channel(&journeys, &shares)[&Channel::Direct], 0.0);
    }

    #[test]
    fn test_single_sample_gets_fixed_band() {
        let journeys = vec![converted(Channel::Email, 1.0, 100.0)];
        let mut shares = BTreeMap::new();
        shares.insert(Channel::Email, 0.4);
        let ci = confidence_intervals(&journeys, &shares, 0.95)[&Channel::Email];
        assert!((ci.low - 0.2).abs() < 1e-12);
        assert!((ci.high - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_identical_samples_collapse_band() {
        let journeys = vec![converted(Channel::Email, 1.0, 100.0), converted(Channel::Email, 1.0, 100.0)];
        let mut shares = BTreeMap::new();
        shares.insert(Channel::Email, 1.0);
        let ci = confidence_intervals(&journeys, &shares, 0.95)[&Channel::Email];
        assert!((ci.low - 1.0).abs() < 1e-12);
        assert!((ci.high - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_z_score_at_95() {
        assert!((z_score(0.95) - 1.959_963_985).abs() < 1e-6);
    }
}
