//! Simulator Binary - bounded detection feed driving the analytics loop
//!
//! Generates random detection batches offset forward in simulated
//! time, persists them, recomputes activity sessions per group, and
//! watches for consecutive detections of the watched group.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin simulator
//! ```
//!
//! ## Environment Variables
//!
//! - DETFLOW_DB_PATH - SQLite database path (default: data/detflow.db)
//! - SESSION_GAP_SECS - session merge gap in seconds (default: 60)
//! - ALERT_THRESHOLD - occurrences that trigger an alert (default: 5)
//! - WATCHED_GROUP - group that may fire alerts (default: people)
//! - DETECTION_CATEGORIES - comma-separated category set
//! - ITERATION_COUNT - iterations before the loop stops (default: 10)
//! - TIME_STEP_SECS - simulated step per iteration (default: 60)
//! - MAX_BATCH_SIZE - detections per batch upper bound (default: 10)
//! - ALERT_SEMANTICS - "window" or "run" (default: window)
//! - TICK_INTERVAL_MS - pacing between iterations (default: 500)
//! - REPORT_PATH - JSONL report file, empty disables (default: data/reports.jsonl)
//! - RUST_LOG - logging level (optional, default: info)

use detflow::aggregator_core::jsonl_writer::JsonlReportWriter;
use detflow::config::SimulatorConfig;
use detflow::pipeline::SimulationEngine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = SimulatorConfig::from_env()?;

    log::info!("🚀 Starting DetFlow simulator");
    log::info!("   Database: {}", config.db_path);
    log::info!("   Session gap: {}s", config.session_gap_secs);
    log::info!("   Alert threshold: {}", config.alert_threshold);
    log::info!("   Watched group: {}", config.watched_group.as_str());
    log::info!("   Alert semantics: {}", config.alert_semantics.as_str());
    log::info!("   Categories: {:?}", config.categories);
    log::info!("   Iterations: {}", config.iteration_count);

    let mut engine = SimulationEngine::new(config.clone());
    if let Some(path) = config.report_path.as_deref() {
        engine = engine.with_report_sink(Box::new(JsonlReportWriter::new(path)?));
    }

    engine.run().await;

    Ok(())
}
