use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InsightError;

/// Marketing channel a touchpoint was delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    PaidSearch,
    OrganicSearch,
    SocialMedia,
    Email,
    Display,
    Video,
    Affiliate,
    Direct,
    Referral,
    Pr,
}

impl Channel {
    pub const ALL: [Channel; 10] = [
        Channel::PaidSearch,
        Channel::OrganicSearch,
        Channel::SocialMedia,
        Channel::Email,
        Channel::Display,
        Channel::Video,
        Channel::Affiliate,
        Channel::Direct,
        Channel::Referral,
        Channel::Pr,
    ];

    /// Wire tag, e.g. `paid_search`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::PaidSearch => "paid_search",
            Channel::OrganicSearch => "organic_search",
            Channel::SocialMedia => "social_media",
            Channel::Email => "email",
            Channel::Display => "display",
            Channel::Video => "video",
            Channel::Affiliate => "affiliate",
            Channel::Direct => "direct",
            Channel::Referral => "referral",
            Channel::Pr => "pr",
        }
    }

    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::PaidSearch => "Paid Search",
            Channel::OrganicSearch => "Organic Search",
            Channel::SocialMedia => "Social Media",
            Channel::Email => "Email",
            Channel::Display => "Display",
            Channel::Video => "Video",
            Channel::Affiliate => "Affiliate",
            Channel::Direct => "Direct",
            Channel::Referral => "Referral",
            Channel::Pr => "PR",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| InsightError::InvalidInput(format!("unknown channel '{s}'")))
    }
}

/// Campaign identifier as supplied by the ad platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(String);

impl CampaignId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CampaignId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CampaignId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A ratio whose denominator may be zero (CPA with no conversions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    Finite(f64),
    Undefined,
}

impl Ratio {
    /// `numerator / denominator`, or `Undefined` when the denominator is not positive.
    pub fn of(numerator: f64, denominator: f64) -> Self {
        if denominator > 0.0 {
            Ratio::Finite(numerator / denominator)
        } else {
            Ratio::Undefined
        }
    }

    pub fn finite(&self) -> Option<f64> {
        match self {
            Ratio::Finite(v) => Some(*v),
            Ratio::Undefined => None,
        }
    }

    pub fn value_or(&self, fallback: f64) -> f64 {
        self.finite().unwrap_or(fallback)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Ratio::Undefined)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Finite(v) => write!(f, "{v:.2}"),
            Ratio::Undefined => f.write_str("n/a"),
        }
    }
}

/// `numerator / denominator`, 0.0 when the denominator is not positive.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
