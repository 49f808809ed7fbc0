//! Pipeline - the bounded simulation loop
//!
//! Wires the detection generator, the SQLite log, the session
//! aggregator, and the alert detector into one iteration cycle:
//! generate → persist → aggregate → alert → report.

pub mod engine;

pub use engine::SimulationEngine;
