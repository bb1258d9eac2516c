use insight_core::{CampaignId, Channel};
use std::collections::BTreeMap;

use crate::journey::Touchpoint;

/// Unnormalized credit accumulated per channel and per campaign.
#[derive(Debug, Clone, Default)]
pub(crate) struct CreditLedger {
    pub channels: BTreeMap<Channel, f64>,
    pub campaigns: BTreeMap<CampaignId, f64>,
}

impl CreditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit both the touchpoint's channel and its campaign.
    pub fn credit(&mut self, touchpoint: &Touchpoint, amount: f64) {
        self.credit_channel(touchpoint.channel, amount);
        self.credit_campaign(&touchpoint.campaign, amount);
    }

    pub fn credit_channel(&mut self, channel: Channel, amount: f64) {
        *self.channels.entry(channel).or_insert(0.0) += amount;
    }

    pub fn credit_campaign(&mut self, campaign: &CampaignId, amount: f64) {
        *self.campaigns.entry(campaign.clone()).or_insert(0.0) += amount;
    }

    /// Convert both maps into shares that sum to 1.
    pub fn into_shares(self) -> (BTreeMap<Channel, f64>, BTreeMap<CampaignId, f64>) {
        (normalize(self.channels), normalize(self.campaigns))
    }
}

/// Divide every entry by the total. A non-positive total yields an empty map.
pub(crate) fn normalize<K: Ord>(map: BTreeMap<K, f64>) -> BTreeMap<K, f64> {
    let total: f64 = map.values().sum();
    if !(total > 0.0 && total.is_finite()) {
        return BTreeMap::new();
    }
    map.into_iter().map(|(k, v)| (k, v / total)).collect()
}
