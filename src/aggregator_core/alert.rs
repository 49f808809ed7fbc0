//! Consecutive-detection alerting over a bounded category history

use crate::ingest_core::types::{Detection, DetectionGroup};
use serde::Serialize;
use std::collections::VecDeque;

/// How repeated detections are counted toward the alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSemantics {
    /// Count occurrences of the category anywhere in the bounded
    /// history window (capacity = threshold). The window holds the
    /// last N events, so the count reaches N only once an interleaved
    /// category has been evicted.
    OccurrenceWindow,
    /// Count only an unbroken run; any other category resets it.
    RunLength,
}

impl AlertSemantics {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSemantics::OccurrenceWindow => "window",
            AlertSemantics::RunLength => "run",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "window" => Some(AlertSemantics::OccurrenceWindow),
            "run" => Some(AlertSemantics::RunLength),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub category: String,
    /// Timestamp of the detection that triggered the alert.
    pub detected_at: i64,
    pub occurrences: u32,
}

/// Fixed-capacity FIFO of the most recent detection categories.
///
/// Invariant: len ≤ capacity always; empty immediately after a clear.
#[derive(Debug)]
pub struct RollingHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl RollingHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a category, evicting the oldest entry at capacity.
    pub fn push(&mut self, category: &str) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(category.to_string());
    }

    pub fn count(&self, category: &str) -> usize {
        self.entries.iter().filter(|c| c.as_str() == category).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stateful alert detector, owned by the pipeline for the process
/// lifetime. A single "accumulating" state with a fire-and-reset
/// transition; it never fails.
pub struct ConsecutiveAlertDetector {
    history: RollingHistory,
    threshold: u32,
    watched_group: DetectionGroup,
    semantics: AlertSemantics,
    run_category: Option<String>,
    run_length: u32,
}

impl ConsecutiveAlertDetector {
    pub fn new(threshold: u32, watched_group: DetectionGroup, semantics: AlertSemantics) -> Self {
        Self {
            history: RollingHistory::new(threshold as usize),
            threshold,
            watched_group,
            semantics,
            run_category: None,
            run_length: 0,
        }
    }

    /// Feed one iteration's batch in arrival order; returns every
    /// alert that fired.
    pub fn process(&mut self, batch: &[Detection]) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for detection in batch {
            let fired = match self.semantics {
                AlertSemantics::OccurrenceWindow => self.observe_windowed(detection),
                AlertSemantics::RunLength => self.observe_run(detection),
            };

            if let Some(alert) = fired {
                log::warn!(
                    "🚨 Alert: {} detected {} times consecutively, last detected at {}",
                    alert.category,
                    alert.occurrences,
                    alert.detected_at
                );
                alerts.push(alert);
            }
        }

        alerts
    }

    fn observe_windowed(&mut self, detection: &Detection) -> Option<Alert> {
        // Unwatched categories still occupy window slots; they just
        // never fire and never cause a clear.
        self.history.push(&detection.category);

        if detection.group != self.watched_group {
            return None;
        }
        if self.history.count(&detection.category) as u32 != self.threshold {
            return None;
        }

        self.history.clear();
        Some(Alert {
            category: detection.category.clone(),
            detected_at: detection.detected_at,
            occurrences: self.threshold,
        })
    }

    fn observe_run(&mut self, detection: &Detection) -> Option<Alert> {
        let continues = self.run_category.as_deref() == Some(detection.category.as_str());
        if continues {
            self.run_length += 1;
        } else {
            self.run_category = Some(detection.category.clone());
            self.run_length = 1;
        }

        if detection.group != self.watched_group || self.run_length != self.threshold {
            return None;
        }

        self.run_category = None;
        self.run_length = 0;
        Some(Alert {
            category: detection.category.clone(),
            detected_at: detection.detected_at,
            occurrences: self.threshold,
        })
    }

    #[cfg(test)]
    fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(categories: &[&str], start_at: i64) -> Vec<Detection> {
        categories
            .iter()
            .enumerate()
            .map(|(i, c)| Detection::new(*c, start_at + i as i64, start_at))
            .collect()
    }

    fn windowed_detector() -> ConsecutiveAlertDetector {
        ConsecutiveAlertDetector::new(5, DetectionGroup::People, AlertSemantics::OccurrenceWindow)
    }

    #[test]
    fn test_rolling_history_evicts_oldest() {
        let mut history = RollingHistory::new(3);
        for c in ["a", "b", "c", "d"] {
            history.push(c);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.count("a"), 0);
        assert_eq!(history.count("d"), 1);
    }

    #[test]
    fn test_no_alert_while_window_holds_interloper() {
        let mut detector = windowed_detector();

        // After the 6th event the window is [car, p, p, p, p]: count 4
        let batch = feed(
            &["pedestrian", "car", "pedestrian", "pedestrian", "pedestrian", "pedestrian"],
            1000,
        );

        assert!(detector.process(&batch).is_empty());
        assert_eq!(detector.history_len(), 5);
    }

    #[test]
    fn test_alert_fires_once_window_is_all_watched_category() {
        let mut detector = windowed_detector();

        let mut categories = vec!["pedestrian", "car"];
        categories.extend(["pedestrian"; 5]);
        let batch = feed(&categories, 1000);

        let alerts = detector.process(&batch);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category, "pedestrian");
        assert_eq!(alerts[0].occurrences, 5);
        // Fired on the last event of the feed
        assert_eq!(alerts[0].detected_at, 1006);
        // History cleared on fire
        assert_eq!(detector.history_len(), 0);
    }

    #[test]
    fn test_fresh_window_after_fire() {
        let mut detector = windowed_detector();

        detector.process(&feed(&["pedestrian"; 5], 1000));

        // Four more pedestrians do not reach the threshold again
        assert!(detector.process(&feed(&["pedestrian"; 4], 2000)).is_empty());
        // The fifth does
        let alerts = detector.process(&feed(&["pedestrian"], 3000));
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn test_unwatched_group_never_fires() {
        let mut detector = windowed_detector();

        let alerts = detector.process(&feed(&["car"; 10], 1000));
        assert!(alerts.is_empty());
        // No clear either: window still full of cars
        assert_eq!(detector.history_len(), 5);
    }

    #[test]
    fn test_watched_category_fires_after_unwatched_roll_out() {
        let mut detector = windowed_detector();

        let mut categories = vec!["car"; 5];
        categories.extend(["pedestrian"; 5]);
        let alerts = detector.process(&feed(&categories, 1000));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].detected_at, 1009);
    }

    #[test]
    fn test_empty_batch_no_alerts() {
        let mut detector = windowed_detector();
        assert!(detector.process(&[]).is_empty());
    }

    #[test]
    fn test_state_carries_across_batches() {
        let mut detector = windowed_detector();

        assert!(detector.process(&feed(&["pedestrian"; 3], 1000)).is_empty());
        let alerts = detector.process(&feed(&["pedestrian"; 2], 2000));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].detected_at, 2001);
    }

    #[test]
    fn test_run_length_resets_on_category_change() {
        let mut detector =
            ConsecutiveAlertDetector::new(3, DetectionGroup::People, AlertSemantics::RunLength);

        // Run of 2, broken by a car, then a full run of 3
        let batch = feed(
            &["pedestrian", "pedestrian", "car", "pedestrian", "pedestrian", "pedestrian"],
            1000,
        );
        let alerts = detector.process(&batch);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].detected_at, 1005);
    }

    #[test]
    fn test_run_length_unwatched_never_fires() {
        let mut detector =
            ConsecutiveAlertDetector::new(3, DetectionGroup::People, AlertSemantics::RunLength);

        assert!(detector.process(&feed(&["truck"; 6], 1000)).is_empty());
    }

    #[test]
    fn test_run_length_restarts_after_fire() {
        let mut detector =
            ConsecutiveAlertDetector::new(2, DetectionGroup::People, AlertSemantics::RunLength);

        let alerts = detector.process(&feed(&["bicycle"; 5], 1000));

        // Fires at events 2 and 4; the trailing single bicycle starts a
        // new run of 1
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].detected_at, 1001);
        assert_eq!(alerts[1].detected_at, 1003);
    }

    #[test]
    fn test_semantics_string_roundtrip() {
        for semantics in [AlertSemantics::OccurrenceWindow, AlertSemantics::RunLength] {
            assert_eq!(AlertSemantics::from_str(semantics.as_str()), Some(semantics));
        }
        assert_eq!(AlertSemantics::from_str("strict"), None);
    }
}
