mod demo;

use anyhow::Context;
use clap::{Parser, Subcommand};
use insight_attribution::{AttributionEngine, ModelParams};
use insight_core::config::LoggingConfig;
use insight_core::{AppConfig, CancellationToken};
use insight_optimizer::{executive_report, projected_impact, CampaignOptimizer};
use insight_tracker::{LoggingObserver, MetricKind, Monitor, RoiTracker};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "insight",
    about = "Marketing attribution, ROI tracking and campaign optimization",
    version
)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short, env = "INSIGHT_CONFIG")]
    config: Option<String>,

    /// Seed for the synthetic demo data
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Print results as JSON instead of text reports
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Attribute conversions to channels and campaigns with one model
    Attribute {
        /// Model tag, e.g. linear, time_decay, markov, shapley
        #[arg(long, short)]
        model: Option<String>,
        /// Time-decay rate per day
        #[arg(long)]
        decay: Option<f64>,
        /// Number of synthetic journeys
        #[arg(long, default_value_t = 400)]
        journeys: usize,
        /// Reallocate this total budget by attributed efficiency
        #[arg(long)]
        reallocate: Option<f64>,
        /// Also estimate per-channel incremental lift
        #[arg(long)]
        lift: bool,
    },
    /// Run every attribution model over the same journeys
    Compare {
        #[arg(long, default_value_t = 400)]
        journeys: usize,
    },
    /// Executive ROI dashboard over a week of tracked campaigns
    Dashboard {
        /// Anomaly threshold in standard deviations
        #[arg(long, default_value_t = 2.0)]
        sensitivity: f64,
    },
    /// Bid adjustments, budget allocation and a forecast for a portfolio
    Optimize {
        /// Total budget to allocate
        #[arg(long, default_value_t = 25_000.0)]
        budget: f64,
        /// Override the configured target ROAS
        #[arg(long)]
        target_roas: Option<f64>,
        /// Budget multiplier for the forecast
        #[arg(long, default_value_t = 1.2)]
        budget_change: f64,
    },
    /// Poll a live feed into the tracker until stopped
    Monitor {
        /// Stop after this many checks (default: until Ctrl-C)
        #[arg(long)]
        ticks: Option<u64>,
        /// Override the configured check interval
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load_from(cli.config.as_deref());
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    };
    init_tracing(&config.logging);
    if let Err(e) = loaded {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    info!(command = ?cli.command, seed = cli.seed, "Starting insight");

    match cli.command {
        Commands::Attribute {
            model,
            decay,
            journeys,
            reallocate,
            lift,
        } => {
            let mut rng = demo::rng(cli.seed);
            let journeys = demo::journeys(&mut rng, journeys, config.attribution.lookback_days)?;
            let engine = AttributionEngine::new(&config.attribution);
            let mut params = ModelParams::from(&config.attribution);
            if let Some(decay) = decay {
                params.time_decay_factor = decay;
            }
            let tag = model.unwrap_or_else(|| config.attribution.default_model.clone());
            let result = engine
                .compute_tag(&journeys, &tag, &params)
                .with_context(|| format!("attribution with model '{tag}'"))?;

            let reallocation =
                reallocate.map(|total| engine.optimize_budget_allocation(&result, &demo::current_budget(), total));
            let lift = if lift {
                let (test, control): (Vec<_>, Vec<_>) =
                    journeys.iter().cloned().enumerate().partition(|(i, _)| i % 2 == 0);
                let test: Vec<_> = test.into_iter().map(|(_, j)| j).collect();
                let control: Vec<_> = control.into_iter().map(|(_, j)| j).collect();
                Some(engine.incremental_lift(&test, &control)?)
            } else {
                None
            };

            if cli.json {
                #[derive(Serialize)]
                struct AttributeOutput<'a> {
                    result: &'a insight_attribution::AttributionResult,
                    #[serde(skip_serializing_if = "Option::is_none")]
                    reallocation: Option<&'a BTreeMap<insight_core::Channel, f64>>,
                    #[serde(skip_serializing_if = "Option::is_none")]
                    lift: Option<&'a BTreeMap<insight_core::Channel, f64>>,
                }
                print_json(&AttributeOutput {
                    result: &result,
                    reallocation: reallocation.as_ref(),
                    lift: lift.as_ref(),
                })?;
            } else {
                print!("{}", insight_attribution::report::render_text(&result));
                if let Some(plan) = reallocation {
                    println!("\nBudget Reallocation:");
                    for (channel, amount) in plan {
                        println!("  {}: ${amount:.2}", channel.label());
                    }
                }
                if let Some(lift) = lift {
                    println!("\nIncremental Lift:");
                    for (channel, value) in lift {
                        println!("  {}: {:+.1}%", channel.label(), value * 100.0);
                    }
                }
            }
        }

        Commands::Compare { journeys } => {
            let mut rng = demo::rng(cli.seed);
            let journeys = demo::journeys(&mut rng, journeys, config.attribution.lookback_days)?;
            let engine = AttributionEngine::new(&config.attribution);
            let results = engine.compare_models(&journeys, &ModelParams::from(&config.attribution));

            if cli.json {
                print_json(&results)?;
            } else {
                println!("=== Attribution Model Comparison ===");
                for (model, result) in &results {
                    let mut shares: Vec<_> = result.channel_attribution.iter().collect();
                    shares.sort_by(|a, b| b.1.total_cmp(a.1));
                    let top = shares
                        .iter()
                        .take(3)
                        .map(|(c, s)| format!("{} {:.1}%", c.label(), *s * 100.0))
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!(
                        "{:<16} accuracy {:.2} | significance {:.2} | {}",
                        model.title(),
                        result.model_accuracy,
                        result.statistical_significance,
                        top
                    );
                }
            }
        }

        Commands::Dashboard { sensitivity } => {
            let mut rng = demo::rng(cli.seed);
            let mut tracker = RoiTracker::new(config.tracker.clone());
            for snapshot in demo::tracker_history(&mut rng) {
                tracker.record(snapshot);
            }

            if cli.json {
                print_json(&tracker.export(None, 7))?;
            } else {
                print!("{}", insight_tracker::dashboard::render_dashboard(&tracker));
                let campaigns: Vec<_> = tracker.default_summary().into_keys().collect();
                for campaign in &campaigns {
                    for anomaly in tracker.detect_anomalies(campaign, MetricKind::Roas, sensitivity) {
                        println!(
                            "Anomaly: {} ROAS {:.2} at {} ({:?}, mean {:.2} ± {:.2})",
                            campaign,
                            anomaly.value,
                            anomaly.timestamp.format("%Y-%m-%d %H:%M"),
                            anomaly.kind,
                            anomaly.mean,
                            anomaly.std_dev
                        );
                    }
                }
            }
        }

        Commands::Optimize {
            budget,
            target_roas,
            budget_change,
        } => {
            let mut rng = demo::rng(cli.seed);
            let campaigns = demo::portfolio(&mut rng);
            let optimizer = CampaignOptimizer::new(&config.optimizer);
            let target = target_roas.unwrap_or_else(|| optimizer.target_roas());

            let bids = optimizer.optimize_bid_adjustments(&campaigns, target);
            let allocation = optimizer.allocate_budget(&campaigns, budget);
            let forecast = match campaigns.first() {
                Some(first) => {
                    let history = demo::daily_history(&mut rng, &first.campaign_id, 30);
                    Some((first.campaign_id.clone(), optimizer.predict_performance(&history, budget_change)?))
                }
                None => None,
            };

            if cli.json {
                #[derive(Serialize)]
                struct OptimizeOutput<'a> {
                    bid_adjustments: &'a BTreeMap<insight_core::CampaignId, insight_optimizer::BidOptimization>,
                    allocation: &'a BTreeMap<insight_core::CampaignId, f64>,
                    impact: insight_optimizer::ProjectedImpact,
                    forecast: Option<&'a (insight_core::CampaignId, insight_optimizer::PerformanceForecast)>,
                }
                print_json(&OptimizeOutput {
                    bid_adjustments: &bids,
                    allocation: &allocation,
                    impact: projected_impact(&campaigns, &bids),
                    forecast: forecast.as_ref(),
                })?;
            } else {
                print!("{}", executive_report(&campaigns, &bids));
                println!("\nBudget Allocation (${budget:.2}):");
                for (campaign, amount) in &allocation {
                    println!("  {campaign}: ${amount:.2}");
                }
                if let Some((campaign, f)) = forecast {
                    println!("\nForecast for {campaign} at {budget_change:.2}x budget:");
                    println!(
                        "  Impressions: {} | Clicks: {} | Conversions: {}",
                        f.impressions, f.clicks, f.conversions
                    );
                    println!(
                        "  Cost: ${:.2} | Revenue: ${:.2} | ROAS: {:.2}x | Confidence: {:.0}%",
                        f.cost,
                        f.revenue,
                        f.roas,
                        f.confidence * 100.0
                    );
                }
            }
        }

        Commands::Monitor { ticks, interval_ms } => {
            let mut rng = demo::rng(cli.seed);
            let mut tracker = RoiTracker::new(config.tracker.clone());
            for snapshot in demo::tracker_history(&mut rng) {
                tracker.record(snapshot);
            }
            tracker.add_alert_observer(Arc::new(LoggingObserver));
            let tracker = Arc::new(Mutex::new(tracker));

            let token = CancellationToken::new();
            let ctrl_c = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Shutdown signal received");
                    ctrl_c.cancel();
                }
            });

            let mut monitor = Monitor::new(tracker.clone(), demo::LiveFeed::new(cli.seed), &config.monitoring);
            if let Some(ms) = interval_ms {
                monitor = monitor.with_timing(
                    Duration::from_millis(ms),
                    Duration::from_secs(config.monitoring.retry_delay_secs),
                );
            }
            let stats = monitor.run(token, ticks).await;

            if cli.json {
                print_json(&stats)?;
            } else {
                println!(
                    "Monitoring finished: {} checks, {} snapshots, {} alerts raised, {} errors",
                    stats.ticks, stats.snapshots, stats.alerts_raised, stats.errors
                );
                print!("{}", insight_tracker::dashboard::render_dashboard(&tracker.lock()));
            }
        }
    }

    Ok(())
}
