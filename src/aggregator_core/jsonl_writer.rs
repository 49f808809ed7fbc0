//! JSONL report sink - one line of observable output per pipeline iteration

use super::alert::Alert;
use super::session::SessionMap;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Everything one iteration produced: the per-group session mapping
/// and the alerts that fired.
#[derive(Debug, Serialize)]
pub struct IterationReport {
    pub iteration: u32,
    pub generated: usize,
    pub sessions: BTreeMap<String, Vec<(i64, i64)>>,
    pub alerts: Vec<Alert>,
    pub emitted_at: i64,
}

impl IterationReport {
    pub fn new(
        iteration: u32,
        generated: usize,
        session_map: &SessionMap,
        alerts: Vec<Alert>,
        emitted_at: i64,
    ) -> Self {
        let sessions = session_map
            .iter()
            .map(|(group, list)| {
                (
                    group.as_str().to_string(),
                    list.iter().map(|s| (s.start, s.end)).collect(),
                )
            })
            .collect();

        Self {
            iteration,
            generated,
            sessions,
            alerts,
            emitted_at,
        }
    }
}

/// Transport for iteration reports; the pipeline only logs when no
/// sink is configured.
#[async_trait]
pub trait ReportSink: Send {
    async fn write_report(&mut self, report: &IterationReport) -> Result<(), std::io::Error>;

    async fn flush(&mut self) -> Result<(), std::io::Error>;

    fn backend_type(&self) -> &'static str;
}

pub struct JsonlReportWriter {
    writer: BufWriter<std::fs::File>,
}

impl JsonlReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        log::info!("📝 Writing iteration reports to: {}", path.display());

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

#[async_trait]
impl ReportSink for JsonlReportWriter {
    async fn write_report(&mut self, report: &IterationReport) -> Result<(), std::io::Error> {
        let json = serde_json::to_string(report)?;
        writeln!(self.writer, "{}", json)?;
        // One line per iteration and iterations are seconds apart, so
        // flush eagerly to keep the file tail-able.
        self.writer.flush()
    }

    async fn flush(&mut self) -> Result<(), std::io::Error> {
        self.writer.flush()
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}

impl Drop for JsonlReportWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator_core::session::Session;
    use crate::ingest_core::types::DetectionGroup;
    use tempfile::tempdir;

    fn sample_report() -> IterationReport {
        let mut session_map = SessionMap::new();
        session_map.insert(
            DetectionGroup::People,
            vec![Session {
                group: DetectionGroup::People,
                start: 1000,
                end: 1060,
            }],
        );

        let alerts = vec![Alert {
            category: "pedestrian".to_string(),
            detected_at: 1060,
            occurrences: 5,
        }];

        IterationReport::new(1, 6, &session_map, alerts, 1700000000)
    }

    #[tokio::test]
    async fn test_writes_one_json_line_per_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports.jsonl");

        let mut writer = JsonlReportWriter::new(&path).unwrap();
        writer.write_report(&sample_report()).await.unwrap();
        writer.write_report(&sample_report()).await.unwrap();
        writer.flush().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["iteration"], 1);
        assert_eq!(parsed["sessions"]["people"][0][0], 1000);
        assert_eq!(parsed["sessions"]["people"][0][1], 1060);
        assert_eq!(parsed["alerts"][0]["category"], "pedestrian");
    }

    #[tokio::test]
    async fn test_appends_across_writers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports.jsonl");

        {
            let mut writer = JsonlReportWriter::new(&path).unwrap();
            writer.write_report(&sample_report()).await.unwrap();
        }
        {
            let mut writer = JsonlReportWriter::new(&path).unwrap();
            writer.write_report(&sample_report()).await.unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_report_session_map_uses_group_names() {
        let report = sample_report();
        assert!(report.sessions.contains_key("people"));
        assert_eq!(report.generated, 6);
    }
}
