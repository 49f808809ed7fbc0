//! Ingest Core - detection generation and durable persistence
//!
//! The feed side of the pipeline: a random detection source standing in
//! for live sensor input, and the append-only SQLite log it lands in.

pub mod generator;
pub mod store;
pub mod types;

pub use generator::DetectionGenerator;
pub use store::{DetectionStore, StoreError};
pub use types::{group_for_category, Detection, DetectionGroup, DEFAULT_CATEGORIES};
