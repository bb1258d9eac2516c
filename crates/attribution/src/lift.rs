use insight_core::{Channel, InsightError, InsightResult};
use std::collections::{BTreeMap, BTreeSet};

use crate::engine::AttributionEngine;
use crate::journey::CustomerJourney;

fn conversion_rate<'a>(journeys: impl Iterator<Item = &'a CustomerJourney>) -> Option<f64> {
    let (total, converted) = journeys.fold((0usize, 0usize), |(t, c), j| {
        (t + 1, c + usize::from(j.is_converted()))
    });
    (total > 0).then(|| converted as f64 / total as f64)
}

impl AttributionEngine {
    /// Relative conversion-rate lift per channel: test journeys exposed to
    /// the channel against control journeys that never saw it.
    ///
    /// Channels missing from either side are omitted. A zero control rate
    /// gives 0.0.
    pub fn incremental_lift(
        &self,
        test: &[CustomerJourney],
        control: &[CustomerJourney],
    ) -> InsightResult<BTreeMap<Channel, f64>> {
        if test.is_empty() || control.is_empty() {
            return Err(InsightError::InsufficientData(
                "incremental lift needs both test and control journeys".into(),
            ));
        }

        let channels: BTreeSet<Channel> = test.iter().flat_map(|j| j.unique_channels()).collect();
        let mut lift = BTreeMap::new();
        for channel in channels {
            let exposed = conversion_rate(test.iter().filter(|j| j.contains_channel(channel)));
            let holdout = conversion_rate(control.iter().filter(|j| !j.contains_channel(channel)));
            if let (Some(test_cr), Some(control_cr)) = (exposed, holdout) {
                let value = if control_cr > 0.0 {
                    (test_cr - control_cr) / control_cr
                } else {
                    0.0
                };
                lift.insert(channel, value);
            }
        }
        Ok(lift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::Touchpoint;
    use chrono::{Duration, Utc};

    fn journey(channel: Channel, converted: bool) -> CustomerJourney {
        let now = Utc::now();
        let tps = vec![Touchpoint::new(now - Duration::days(3), channel, "camp", 2.0, "c")];
        if converted {
            CustomerJourney::converted("c", tps, 80.0, now).unwrap()
        } else {
            CustomerJourney::unconverted("c", tps)
        }
    }

    #[test]
    fn test_lift_against_unexposed_control() {
        let test = vec![
            journey(Channel::Email, true),
            journey(Channel::Email, true),
            journey(Channel::Email, false),
            journey(Channel::Email, true),
        ];
        let control = vec![
            journey(Channel::Direct, true),
            journey(Channel::Direct, false),
            journey(Channel::Direct, false),
            journey(Channel::Direct, false),
        ];
        let lift = AttributionEngine::default().incremental_lift(&test, &control).unwrap();
        // 0.75 vs 0.25
        assert!((lift[&Channel::Email] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_control_rate_gives_zero_lift() {
        let test = vec![journey(Channel::Video, true)];
        let control = vec![journey(Channel::Direct, false)];
        let lift = AttributionEngine::default().incremental_lift(&test, &control).unwrap();
        assert_eq!(lift[&Channel::Video], 0.0);
    }

    #[test]
    fn test_channel_without_holdout_is_omitted() {
        let test = vec![journey(Channel::Email, true)];
        let control = vec![journey(Channel::Email, false)];
        let lift = AttributionEngine::default().incremental_lift(&test, &control).unwrap();
        assert!(lift.is_empty());
    }

    #[test]
    fn test_empty_groups_rejected() {
        let err = AttributionEngine::default()
            .incremental_lift(&[], &[journey(Channel::Email, false)])
            .unwrap_err();
        assert!(matches!(err, InsightError::InsufficientData(_)));
    }
}
