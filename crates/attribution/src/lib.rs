//! Multi-touch marketing attribution.
//!
//! Journeys go in, an [`AttributionResult`] comes out: normalized channel
//! and campaign shares, channel ROI and a confidence band per channel.

pub mod algorithmic;
pub mod budget;
pub(crate) mod credit;
pub mod data_driven;
pub mod engine;
pub mod journey;
pub mod lift;
pub mod metrics;
pub mod model;
pub mod report;
pub(crate) mod rules;

pub use engine::{AttributionEngine, AttributionResult};
pub use journey::{CustomerJourney, JourneyOutcome, Touchpoint};
pub use metrics::ConfidenceInterval;
pub use model::{AttributionModel, ModelParams};
