//! Simulator configuration from environment variables

use crate::aggregator_core::alert::AlertSemantics;
use crate::ingest_core::types::{DetectionGroup, DEFAULT_CATEGORIES};
use std::env;

#[derive(Debug)]
pub enum ConfigError {
    InvalidThreshold(i64),
    InvalidSessionGap(i64),
    InvalidIterationCount(i64),
    InvalidMaxBatch(i64),
    InvalidTimeStep(i64),
    UnknownGroup(String),
    UnknownSemantics(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidThreshold(v) => {
                write!(f, "ALERT_THRESHOLD must be positive, got {}", v)
            }
            ConfigError::InvalidSessionGap(v) => {
                write!(f, "SESSION_GAP_SECS must not be negative, got {}", v)
            }
            ConfigError::InvalidIterationCount(v) => {
                write!(f, "ITERATION_COUNT must be positive, got {}", v)
            }
            ConfigError::InvalidMaxBatch(v) => {
                write!(f, "MAX_BATCH_SIZE must be positive, got {}", v)
            }
            ConfigError::InvalidTimeStep(v) => {
                write!(f, "TIME_STEP_SECS must not be negative, got {}", v)
            }
            ConfigError::UnknownGroup(s) => {
                write!(f, "WATCHED_GROUP must be 'people' or 'vehicles', got '{}'", s)
            }
            ConfigError::UnknownSemantics(s) => {
                write!(f, "ALERT_SEMANTICS must be 'window' or 'run', got '{}'", s)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for the simulation pipeline.
///
/// Loaded from environment variables with sensible defaults; invalid
/// values are fatal at startup, never patched up at runtime.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Path to the SQLite detection log
    pub db_path: String,

    /// Maximum gap (seconds) between adjacent detections merged into
    /// one session
    pub session_gap_secs: i64,

    /// Occurrences within the rolling history that trigger an alert
    pub alert_threshold: u32,

    /// Group whose categories may fire alerts
    pub watched_group: DetectionGroup,

    /// Categories the generator draws from
    pub categories: Vec<String>,

    /// Number of simulation iterations before the loop stops
    pub iteration_count: u32,

    /// Simulated seconds each remaining iteration is offset forward
    pub time_step_secs: i64,

    /// Upper bound on detections generated per iteration
    pub max_batch_size: usize,

    /// Occurrence-window (default) or run-length alert counting
    pub alert_semantics: AlertSemantics,

    /// Pacing between iterations in milliseconds
    pub tick_interval_ms: u64,

    /// JSONL report file; None disables the sink
    pub report_path: Option<String>,
}

impl SimulatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DETFLOW_DB_PATH` (default: data/detflow.db)
    /// - `SESSION_GAP_SECS` (default: 60)
    /// - `ALERT_THRESHOLD` (default: 5)
    /// - `WATCHED_GROUP` (default: people)
    /// - `DETECTION_CATEGORIES` (default: pedestrian,bicycle,car,truck,van)
    /// - `ITERATION_COUNT` (default: 10)
    /// - `TIME_STEP_SECS` (default: 60)
    /// - `MAX_BATCH_SIZE` (default: 10)
    /// - `ALERT_SEMANTICS` (default: window)
    /// - `TICK_INTERVAL_MS` (default: 500)
    /// - `REPORT_PATH` (default: data/reports.jsonl; empty disables)
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_gap_secs = env_i64("SESSION_GAP_SECS", 60);
        let alert_threshold = env_i64("ALERT_THRESHOLD", 5);
        let iteration_count = env_i64("ITERATION_COUNT", 10);
        let time_step_secs = env_i64("TIME_STEP_SECS", 60);
        let max_batch_size = env_i64("MAX_BATCH_SIZE", 10);

        if alert_threshold <= 0 {
            return Err(ConfigError::InvalidThreshold(alert_threshold));
        }
        if session_gap_secs < 0 {
            return Err(ConfigError::InvalidSessionGap(session_gap_secs));
        }
        if iteration_count <= 0 {
            return Err(ConfigError::InvalidIterationCount(iteration_count));
        }
        if max_batch_size <= 0 {
            return Err(ConfigError::InvalidMaxBatch(max_batch_size));
        }
        if time_step_secs < 0 {
            return Err(ConfigError::InvalidTimeStep(time_step_secs));
        }

        let group_str = env::var("WATCHED_GROUP").unwrap_or_else(|_| "people".to_string());
        let watched_group =
            DetectionGroup::from_str(&group_str).ok_or(ConfigError::UnknownGroup(group_str))?;

        let semantics_str = env::var("ALERT_SEMANTICS").unwrap_or_else(|_| "window".to_string());
        let alert_semantics = AlertSemantics::from_str(&semantics_str)
            .ok_or(ConfigError::UnknownSemantics(semantics_str))?;

        let categories = env::var("DETECTION_CATEGORIES")
            .map(|s| parse_categories(&s))
            .unwrap_or_else(|_| default_categories());

        let report_path = match env::var("REPORT_PATH") {
            Ok(s) if s.is_empty() => None,
            Ok(s) => Some(s),
            Err(_) => Some("data/reports.jsonl".to_string()),
        };

        Ok(Self {
            db_path: env::var("DETFLOW_DB_PATH")
                .unwrap_or_else(|_| "data/detflow.db".to_string()),
            session_gap_secs,
            alert_threshold: alert_threshold as u32,
            watched_group,
            categories,
            iteration_count: iteration_count as u32,
            time_step_secs,
            max_batch_size: max_batch_size as usize,
            alert_semantics,
            tick_interval_ms: env::var("TICK_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(500),
            report_path,
        })
    }
}

pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect()
}

fn parse_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
