//! Budget reallocation driven by an attribution result.

use insight_core::Channel;
use std::collections::BTreeMap;
use tracing::debug;

use crate::engine::{AttributionEngine, AttributionResult};

impl AttributionEngine {
    /// Redistribute `total_budget` across the channels of `current_budget`.
    ///
    /// Efficiency is `roi × share` for channels with positive ROI that are in
    /// the current budget. Those channels split the total proportionally to
    /// efficiency; the rest keep the configured minimum share of the total,
    /// so the sum may exceed `total_budget`. Without any efficient channel
    /// the total is split equally.
    pub fn optimize_budget_allocation(
        &self,
        result: &AttributionResult,
        current_budget: &BTreeMap<Channel, f64>,
        total_budget: f64,
    ) -> BTreeMap<Channel, f64> {
        if current_budget.is_empty() {
            return BTreeMap::new();
        }

        let efficiency: BTreeMap<Channel, f64> = result
            .roi_by_channel
            .iter()
            .filter(|(channel, roi)| **roi > 0.0 && current_budget.contains_key(channel))
            .map(|(channel, roi)| {
                let share = result.channel_attribution.get(channel).copied().unwrap_or(0.0);
                (*channel, roi * share)
            })
            .collect();
        let total_efficiency: f64 = efficiency.values().sum();

        if total_efficiency <= 0.0 {
            debug!("No channel with positive efficiency, splitting budget equally");
            let equal = total_budget / current_budget.len() as f64;
            return current_budget.keys().map(|channel| (*channel, equal)).collect();
        }

        current_budget
            .keys()
            .map(|channel| {
                let amount = match efficiency.get(channel) {
                    Some(score) => total_budget * score / total_efficiency,
                    None => total_budget * self.minimum_budget_share,
                };
                (*channel, amount)
            })
            .collect()
    }
}
