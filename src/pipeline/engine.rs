//! Simulation engine - bounded ingest → aggregate → alert loop

use crate::aggregator_core::alert::ConsecutiveAlertDetector;
use crate::aggregator_core::jsonl_writer::{IterationReport, ReportSink};
use crate::aggregator_core::session::{aggregate_sessions, SessionMap};
use crate::config::SimulatorConfig;
use crate::ingest_core::generator::DetectionGenerator;
use crate::ingest_core::store::DetectionStore;
use chrono::Utc;
use tokio::time::{interval, Duration};

/// Drives the full pipeline for a fixed number of iterations.
///
/// The alert detector is the only state carried across iterations;
/// store connections are opened per step and dropped on every exit
/// path, never held across iteration boundaries.
pub struct SimulationEngine {
    config: SimulatorConfig,
    generator: DetectionGenerator,
    detector: ConsecutiveAlertDetector,
    report_sink: Option<Box<dyn ReportSink>>,
}

impl SimulationEngine {
    pub fn new(config: SimulatorConfig) -> Self {
        let generator =
            DetectionGenerator::new(config.categories.clone(), config.max_batch_size);
        let detector = ConsecutiveAlertDetector::new(
            config.alert_threshold,
            config.watched_group,
            config.alert_semantics,
        );

        Self {
            config,
            generator,
            detector,
            report_sink: None,
        }
    }

    /// Replace the detection source, e.g. with a seeded generator.
    pub fn with_generator(mut self, generator: DetectionGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_report_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        log::info!("📊 Report backend: {}", sink.backend_type());
        self.report_sink = Some(sink);
        self
    }

    /// Run the bounded loop; returns one report per iteration.
    pub async fn run(&mut self) -> Vec<IterationReport> {
        let total = self.config.iteration_count;
        log::info!("✅ Simulator running - {} iterations", total);

        let mut ticker = interval(Duration::from_millis(self.config.tick_interval_ms.max(1)));
        let mut reports = Vec::with_capacity(total as usize);

        // Countdown counter: the forward offset shrinks toward "now"
        // as the simulation progresses, matching a feed that catches
        // up to the present.
        for counter in (1..=total).rev() {
            ticker.tick().await;

            let iteration = total - counter + 1;
            let forward_secs = self.config.time_step_secs * counter as i64;
            log::info!("📥 Ingesting data (iteration {}/{})", iteration, total);

            let batch = self.generator.generate(forward_secs);

            // Ingest step. The connection lives only for this block;
            // a persistence failure is contained here and the
            // iteration continues on whatever is already durable.
            if batch.is_empty() {
                log::info!("No detections generated this iteration");
            } else {
                match DetectionStore::open(&self.config.db_path) {
                    Ok(mut store) => {
                        if let Err(e) = store.append(&batch) {
                            log::error!(
                                "❌ Failed to persist {} detections: {}",
                                batch.len(),
                                e
                            );
                        }
                    }
                    Err(e) => {
                        log::error!("❌ Failed to open detection store: {}", e);
                    }
                }
            }

            // Aggregate step: fresh connection, full recompute over
            // everything durable. A failed read skips aggregation for
            // this iteration rather than feeding the aggregator a
            // partial view.
            let sessions: SessionMap = match DetectionStore::open(&self.config.db_path)
                .and_then(|store| store.query_all())
            {
                Ok(events) => aggregate_sessions(&events, self.config.session_gap_secs),
                Err(e) => {
                    log::error!("❌ Failed to read detections, skipping aggregation: {}", e);
                    SessionMap::new()
                }
            };

            // Alert step: only this iteration's batch, in generation
            // order.
            let alerts = self.detector.process(&batch);

            let report = IterationReport::new(
                iteration,
                batch.len(),
                &sessions,
                alerts,
                Utc::now().timestamp(),
            );

            log::info!(
                "📊 Aggregated result: {}",
                serde_json::to_string(&report.sessions).unwrap_or_default()
            );
            if !report.alerts.is_empty() {
                log::info!("🚨 {} alert(s) this iteration", report.alerts.len());
            }

            if let Some(sink) = self.report_sink.as_mut() {
                if let Err(e) = sink.write_report(&report).await {
                    log::error!("❌ Failed to write iteration report: {}", e);
                }
            }

            reports.push(report);
        }

        if let Some(sink) = self.report_sink.as_mut() {
            if let Err(e) = sink.flush().await {
                log::error!("❌ Failed to flush report sink: {}", e);
            }
        }

        log::info!("✅ Simulation complete: {} iterations", reports.len());
        reports
    }
}
