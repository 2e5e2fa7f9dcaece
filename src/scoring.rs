use serde::{Deserialize, Serialize};

use crate::document::DrawingDocument;

/// Opaque classifier output attached to a drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// In `[0, 1]`
    pub score: f32,
    pub confidence: f32,
}

pub trait Scorer {
    /// Score a drawing, or `None` when there is nothing to judge.
    fn score(&mut self, document: &DrawingDocument) -> Option<ScoreReport>;
}

/// Stand-in classifier: a random score in `[0.1, 0.9]` with a confidence in
/// `[0.7, 1.0]`.
#[derive(Debug, Clone)]
pub struct RandomScorer {
    rng: fastrand::Rng,
}

impl RandomScorer {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for RandomScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for RandomScorer {
    fn score(&mut self, document: &DrawingDocument) -> Option<ScoreReport> {
        if document.is_empty() {
            return None;
        }
        Some(ScoreReport {
            score: 0.1 + self.rng.f32() * 0.8,
            confidence: 0.7 + self.rng.f32() * 0.3,
        })
    }
}
