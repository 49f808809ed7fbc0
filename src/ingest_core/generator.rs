//! Random detection source simulating a live sensor feed

use super::types::Detection;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct DetectionGenerator {
    categories: Vec<String>,
    max_batch: usize,
    rng: StdRng,
}

impl DetectionGenerator {
    pub fn new(categories: Vec<String>, max_batch: usize) -> Self {
        Self {
            categories,
            max_batch,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for tests.
    pub fn with_seed(categories: Vec<String>, max_batch: usize, seed: u64) -> Self {
        Self {
            categories,
            max_batch,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a batch stamped relative to the current wall clock.
    pub fn generate(&mut self, forward_secs: i64) -> Vec<Detection> {
        self.generate_at(Utc::now().timestamp(), forward_secs)
    }

    /// Generate 1..=max_batch detections starting at `base_secs + forward_secs`,
    /// one second apart, in ascending timestamp order.
    ///
    /// An empty category set yields an empty batch.
    pub fn generate_at(&mut self, base_secs: i64, forward_secs: i64) -> Vec<Detection> {
        if self.categories.is_empty() || self.max_batch == 0 {
            return Vec::new();
        }

        let count = self.rng.gen_range(1..=self.max_batch);
        let mut batch = Vec::with_capacity(count);

        for offset in 0..count {
            let idx = self.rng.gen_range(0..self.categories.len());
            batch.push(Detection::new(
                self.categories[idx].clone(),
                base_secs + forward_secs + offset as i64,
                base_secs,
            ));
        }

        batch
    }
}
