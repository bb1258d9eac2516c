//! Seeded synthetic data for the CLI commands.

use chrono::{DateTime, Duration, Utc};
use insight_attribution::{CustomerJourney, Touchpoint};
use insight_core::{CampaignId, Channel};
use insight_optimizer::CampaignMetrics;
use insight_tracker::{CampaignSnapshot, SnapshotSource};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Channels that appear in demo journeys, with a per-touch cost.
const JOURNEY_CHANNELS: [(Channel, f64); 6] = [
    (Channel::PaidSearch, 2.5),
    (Channel::SocialMedia, 1.2),
    (Channel::Display, 0.8),
    (Channel::Email, 0.1),
    (Channel::Video, 3.0),
    (Channel::Affiliate, 1.5),
];

/// Tracked campaigns: id, channel, typical ROAS.
const TRACKED: [(&str, Channel, f64); 3] = [
    ("campaign_1", Channel::PaidSearch, 3.5),
    ("campaign_2", Channel::SocialMedia, 3.5),
    ("campaign_3", Channel::Display, 3.5),
];

/// Campaign that underperforms from day five of the history onwards.
const DEGRADING: &str = "campaign_2";

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Journeys of one to four touches that start inside the trailing
/// `lookback_days` and end by now. Email and paid search exposure raise the
/// conversion odds.
pub fn journeys(rng: &mut StdRng, count: usize, lookback_days: u32) -> anyhow::Result<Vec<CustomerJourney>> {
    let now = Utc::now();
    let window = i64::from(lookback_days.max(1));
    let mut out = Vec::with_capacity(count);

    for i in 0..count {
        let customer = format!("cust_{i:04}");
        let touches = rng.gen_range(1..=4);
        let mut at = now - Duration::days(rng.gen_range(window / 2..=window));
        let mut touchpoints = Vec::with_capacity(touches);
        for _ in 0..touches {
            let &(channel, unit_cost) = JOURNEY_CHANNELS
                .choose(rng)
                .unwrap_or(&JOURNEY_CHANNELS[0]);
            let campaign = format!("{}_{}", channel.as_str(), rng.gen_range(0..3));
            let impressions = rng.gen_range(1..=20);
            touchpoints.push(
                Touchpoint::new(at, channel, campaign, unit_cost * impressions as f64, customer.clone())
                    .with_engagement(impressions, rng.gen_range(0..=impressions.min(3))),
            );
            at = (at + Duration::hours(rng.gen_range(6..=96))).min(now);
        }

        let has = |c: Channel| touchpoints.iter().any(|t| t.channel == c);
        let mut p = 0.15;
        if has(Channel::Email) {
            p += 0.12;
        }
        if has(Channel::PaidSearch) {
            p += 0.10;
        }

        let journey = if rng.gen_bool(p) {
            let value = rng.gen_range(50.0..250.0);
            CustomerJourney::converted(customer, touchpoints, value, at)?
        } else {
            CustomerJourney::unconverted(customer, touchpoints)
        };
        out.push(journey);
    }
    Ok(out)
}

/// Current spend per journey channel.
pub fn current_budget() -> BTreeMap<Channel, f64> {
    BTreeMap::from([
        (Channel::PaidSearch, 12_000.0),
        (Channel::SocialMedia, 8_000.0),
        (Channel::Display, 5_000.0),
        (Channel::Email, 1_500.0),
        (Channel::Video, 9_000.0),
        (Channel::Affiliate, 4_500.0),
    ])
}

fn snapshot(
    campaign: &str,
    channel: Channel,
    at: DateTime<Utc>,
    cost: f64,
    roas: f64,
) -> CampaignSnapshot {
    CampaignSnapshot::new(campaign, channel, at)
        .with_spend(cost, cost * roas)
        .with_funnel((cost * 20.0) as u64, (cost * 0.5) as u64, (cost * 0.02) as u64)
}

/// Seven days of six-hourly snapshots for the tracked campaigns, oldest
/// first. One campaign loses ROAS and overspends over the last two days.
pub fn tracker_history(rng: &mut StdRng) -> Vec<CampaignSnapshot> {
    let start = Utc::now() - Duration::days(7);
    let mut out = Vec::new();
    for day in 0..7 {
        for hour in (0..24).step_by(6) {
            let at = start + Duration::days(day) + Duration::hours(hour);
            for (campaign, channel, base_roas) in TRACKED {
                let mut roas = base_roas + rng.gen_range(-0.5..0.5);
                let mut cost = 1_000.0 + rng.gen_range(-200.0..200.0);
                if campaign == DEGRADING && day >= 5 {
                    roas *= 0.7;
                    cost *= 1.3;
                }
                out.push(snapshot(campaign, channel, at, cost, roas));
            }
        }
    }
    out
}

/// Live feed for the monitor: one fresh snapshot per tracked campaign on
/// every poll. The degrading campaign keeps sliding.
pub struct LiveFeed {
    rng: StdRng,
    polls: u32,
}

impl LiveFeed {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: rng(seed),
            polls: 0,
        }
    }
}

impl SnapshotSource for LiveFeed {
    fn poll(&mut self) -> anyhow::Result<Vec<CampaignSnapshot>> {
        self.polls += 1;
        let now = Utc::now();
        let slide = 0.85_f64.powi(self.polls as i32);
        Ok(TRACKED
            .iter()
            .map(|&(campaign, channel, base_roas)| {
                let mut roas = base_roas + self.rng.gen_range(-0.3..0.3);
                if campaign == DEGRADING {
                    roas *= 0.7 * slide;
                }
                let cost = 1_000.0 + self.rng.gen_range(-100.0..100.0);
                snapshot(campaign, channel, now, cost, roas)
            })
            .collect())
    }
}

/// Portfolio name and typical ROAS.
const PORTFOLIO: [(&str, f64); 6] = [
    ("brand_search", 6.0),
    ("generic_search", 3.8),
    ("retargeting_display", 4.5),
    ("prospecting_social", 1.9),
    ("newsletter", 8.0),
    ("video_awareness", 1.2),
];

fn campaign_metrics(rng: &mut StdRng, campaign: &str, roas: f64, cost: f64, at: DateTime<Utc>) -> CampaignMetrics {
    let impressions = (cost * rng.gen_range(15.0..30.0)).round() as u64;
    let clicks = (impressions as f64 * rng.gen_range(0.01..0.04)).round() as u64;
    let conversions = (clicks as f64 * rng.gen_range(0.02..0.06)).round() as u64;
    CampaignMetrics {
        campaign_id: CampaignId::from(campaign),
        impressions,
        clicks,
        conversions,
        cost,
        revenue: cost * roas,
        timestamp: at,
    }
}

/// Last month's totals for the demo portfolio.
pub fn portfolio(rng: &mut StdRng) -> Vec<CampaignMetrics> {
    let now = Utc::now();
    PORTFOLIO
        .iter()
        .map(|&(campaign, roas)| {
            let roas = roas * rng.gen_range(0.9..1.1);
            let cost = rng.gen_range(2_000.0..8_000.0);
            campaign_metrics(rng, campaign, roas, cost, now)
        })
        .collect()
}

/// Daily history for one portfolio campaign, used for forecasts.
pub fn daily_history(rng: &mut StdRng, campaign: &CampaignId, days: i64) -> Vec<CampaignMetrics> {
    let base_roas = PORTFOLIO
        .iter()
        .find(|(name, _)| *name == campaign.as_str())
        .map_or(3.0, |(_, roas)| *roas);
    let now = Utc::now();
    (0..days)
        .map(|d| {
            let roas = base_roas * rng.gen_range(0.85..1.15);
            let cost = rng.gen_range(150.0..300.0);
            campaign_metrics(rng, campaign.as_str(), roas, cost, now - Duration::days(days - d))
        })
        .collect()
}
