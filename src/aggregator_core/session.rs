//! Session aggregation: merging per-group detection timestamps into
//! contiguous activity windows

use crate::ingest_core::types::{Detection, DetectionGroup};
use serde::Serialize;
use std::collections::BTreeMap;

/// A maximal run of same-group detections where every temporally
/// adjacent pair is at most the configured gap apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Session {
    pub group: DetectionGroup,
    pub start: i64,
    pub end: i64,
}

pub type SessionMap = BTreeMap<DetectionGroup, Vec<Session>>;

/// Merge detections into sessions, one ascending pass per group.
///
/// `events` must be ordered by (group, detected_at) — the store's read
/// contract. The gap comparison is inclusive: a gap of exactly
/// `gap_secs` merges, one second more splits. Pure function: no side
/// effects, recomputed from scratch on every call.
pub fn aggregate_sessions(events: &[Detection], gap_secs: i64) -> SessionMap {
    let mut sessions: SessionMap = BTreeMap::new();
    let mut current: Option<Session> = None;

    for event in events {
        match current {
            Some(ref mut session)
                if session.group == event.group
                    && event.detected_at - session.end <= gap_secs =>
            {
                session.end = event.detected_at;
            }
            _ => {
                if let Some(done) = current.take() {
                    sessions.entry(done.group).or_default().push(done);
                }
                current = Some(Session {
                    group: event.group,
                    start: event.detected_at,
                    end: event.detected_at,
                });
            }
        }
    }

    if let Some(done) = current {
        sessions.entry(done.group).or_default().push(done);
    }

    sessions
}
