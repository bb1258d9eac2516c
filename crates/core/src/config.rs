use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `INSIGHT__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub attribution: AttributionConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ─── Attribution Config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct AttributionConfig {
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_time_decay_factor")]
    pub time_decay_factor: f64,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    #[serde(default = "default_min_data_driven_journeys")]
    pub min_data_driven_journeys: usize,
    #[serde(default = "default_minimum_budget_share")]
    pub minimum_budget_share: f64,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

fn default_model() -> String {
    "position_based".to_string()
}
fn default_time_decay_factor() -> f64 {
    0.1
}
fn default_confidence_level() -> f64 {
    0.95
}
fn default_min_data_driven_journeys() -> usize {
    100
}
fn default_minimum_budget_share() -> f64 {
    0.02
}
fn default_lookback_days() -> u32 {
    30
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            time_decay_factor: default_time_decay_factor(),
            confidence_level: default_confidence_level(),
            min_data_driven_journeys: default_min_data_driven_journeys(),
            minimum_budget_share: default_minimum_budget_share(),
            lookback_days: default_lookback_days(),
        }
    }
}

// ─── Tracker Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default)]
    pub alert_thresholds: AlertThresholdConfig,
    #[serde(default = "default_anomaly_window_days")]
    pub anomaly_window_days: i64,
    #[serde(default = "default_anomaly_recent_points")]
    pub anomaly_recent_points: usize,
    #[serde(default = "default_anomaly_min_points")]
    pub anomaly_min_points: usize,
    #[serde(default = "default_summary_window_hours")]
    pub summary_window_hours: i64,
    #[serde(default = "default_recommendation_window_hours")]
    pub recommendation_window_hours: i64,
}

fn default_history_capacity() -> usize {
    10_000
}
fn default_anomaly_window_days() -> i64 {
    30
}
fn default_anomaly_recent_points() -> usize {
    7
}
fn default_anomaly_min_points() -> usize {
    10
}
fn default_summary_window_hours() -> i64 {
    24
}
fn default_recommendation_window_hours() -> i64 {
    168
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            alert_thresholds: AlertThresholdConfig::default(),
            anomaly_window_days: default_anomaly_window_days(),
            anomaly_recent_points: default_anomaly_recent_points(),
            anomaly_min_points: default_anomaly_min_points(),
            summary_window_hours: default_summary_window_hours(),
            recommendation_window_hours: default_recommendation_window_hours(),
        }
    }
}

/// Percentage-swing cut-offs for the four alert tiers. Negative values for
/// metrics where a drop is bad, positive values where a rise is bad.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SeverityThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl SeverityThresholds {
    pub const fn new(low: f64, medium: f64, high: f64, critical: f64) -> Self {
        Self { low, medium, high, critical }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertThresholdConfig {
    #[serde(default = "default_drop_thresholds")]
    pub roas: SeverityThresholds,
    #[serde(default = "default_drop_thresholds")]
    pub ctr: SeverityThresholds,
    #[serde(default = "default_drop_thresholds")]
    pub conversion_rate: SeverityThresholds,
    #[serde(default = "default_rise_thresholds")]
    pub cpa: SeverityThresholds,
    #[serde(default = "default_rise_thresholds")]
    pub cost: SeverityThresholds,
}

fn default_drop_thresholds() -> SeverityThresholds {
    SeverityThresholds::new(-10.0, -20.0, -30.0, -50.0)
}
fn default_rise_thresholds() -> SeverityThresholds {
    SeverityThresholds::new(10.0, 25.0, 50.0, 100.0)
}

impl Default for AlertThresholdConfig {
    fn default() -> Self {
        Self {
            roas: default_drop_thresholds(),
            ctr: default_drop_thresholds(),
            conversion_rate: default_drop_thresholds(),
            cpa: default_rise_thresholds(),
            cost: default_rise_thresholds(),
        }
    }
}

// ─── Optimizer Config ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_target_roas")]
    pub target_roas: f64,
    #[serde(default = "default_impression_elasticity")]
    pub impression_elasticity: f64,
    #[serde(default = "default_baseline_conversion_rate")]
    pub baseline_conversion_rate: f64,
    #[serde(default = "default_min_clicks_for_significance")]
    pub min_clicks_for_significance: u64,
}

fn default_target_roas() -> f64 {
    4.0
}
fn default_impression_elasticity() -> f64 {
    0.8
}
fn default_baseline_conversion_rate() -> f64 {
    0.02
}
fn default_min_clicks_for_significance() -> u64 {
    100
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            target_roas: default_target_roas(),
            impression_elasticity: default_impression_elasticity(),
            baseline_conversion_rate: default_baseline_conversion_rate(),
            min_clicks_for_significance: default_min_clicks_for_significance(),
        }
    }
}

// ─── Monitoring / Logging Config ────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

fn default_check_interval_secs() -> u64 {
    300
}
fn default_retry_delay_secs() -> u64 {
    60
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            attribution: AttributionConfig::default(),
            tracker: TrackerConfig::default(),
            optimizer: OptimizerConfig::default(),
            monitoring: MonitoringConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from an optional TOML file, overridden by
    /// `INSIGHT__`-prefixed environment variables.
    pub fn load_from(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("INSIGHT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
