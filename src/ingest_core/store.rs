//! SQLite-backed append-only detection log
//!
//! Connections are opened fresh per use and released on drop; the
//! pipeline never holds one across iteration boundaries.

use super::types::{Detection, DetectionGroup};
use rusqlite::{params, Connection};
use std::path::Path;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Database(rusqlite::Error),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

pub struct DetectionStore {
    conn: Connection,
}

impl DetectionStore {
    /// Open (creating if needed) the detection log at `db_path`.
    ///
    /// Applies WAL journal mode and NORMAL synchronous, and creates the
    /// schema idempotently.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS detections (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                category        TEXT NOT NULL,
                detection_group TEXT NOT NULL,
                detected_at     INTEGER NOT NULL,
                recorded_at     INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_group_time
             ON detections(detection_group, detected_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_category ON detections(category)",
            [],
        )?;

        Ok(Self { conn })
    }

    /// Append a batch inside a single transaction.
    ///
    /// Either every detection in the batch becomes visible or none
    /// does: the transaction rolls back on drop if any insert fails.
    pub fn append(&mut self, batch: &[Detection]) -> Result<usize, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;

        for detection in batch {
            tx.execute(
                "INSERT INTO detections (category, detection_group, detected_at, recorded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    detection.category,
                    detection.group.as_str(),
                    detection.detected_at,
                    detection.recorded_at,
                ],
            )?;
        }

        tx.commit()?;

        log::debug!("✅ Flushed {} detections to SQLite", batch.len());
        Ok(batch.len())
    }

    /// Read every stored detection ordered by (group, timestamp).
    ///
    /// The id tiebreak keeps insertion order for equal timestamps, so
    /// nothing within a group is ever reordered.
    pub fn query_all(&self) -> Result<Vec<Detection>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT category, detection_group, detected_at, recorded_at
             FROM detections
             ORDER BY detection_group ASC, detected_at ASC, id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let group_str: String = row.get(1)?;
            let group = match DetectionGroup::from_str(&group_str) {
                Some(g) => g,
                None => return Err(rusqlite::Error::InvalidQuery),
            };

            Ok(Detection {
                category: row.get(0)?,
                group,
                detected_at: row.get(2)?,
                recorded_at: row.get(3)?,
            })
        })?;

        let mut detections = Vec::new();
        for row in rows {
            detections.push(row?);
        }

        Ok(detections)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM detections", [], |row| row.get(0))?;
        Ok(n)
    }
}
