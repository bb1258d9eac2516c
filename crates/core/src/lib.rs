pub mod cancel;
pub mod config;
pub mod error;
pub mod stats;
pub mod types;

pub use cancel::CancellationToken;
pub use config::AppConfig;
pub use error::{InsightError, InsightResult};
pub use types::{CampaignId, Channel, Ratio};
