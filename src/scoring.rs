//! Composite relevance score.
//!
//! ```text
//! score = (structural marker ? key_attr_weight : 0)
//!       + (any attribute     ? minor_attr_weight : 0)
//!       + sentiment * sentiment_multiplier
//! ```

use crate::attributes::any_detected;
use crate::models::{AnnotatedReview, AttributeHits};

/// Substrings that mark a pros/cons style review. Matched as raw substrings,
/// so "professional" and "continue" count as well.
const STRUCTURAL_MARKERS: [&str; 4] = ["pro", "pros", "con", "cons"];

/// Weights applied by the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub key_attr_weight: f64,
    pub minor_attr_weight: f64,
    pub sentiment_multiplier: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            key_attr_weight: 10.0,
            minor_attr_weight: 1.0,
            sentiment_multiplier: 10.0,
        }
    }
}

/// True if any key phrase contains a pros/cons marker, case-insensitively.
pub fn has_structural_marker(key_phrases: &[String]) -> bool {
    key_phrases.iter().any(|phrase| {
        let phrase = phrase.to_lowercase();
        STRUCTURAL_MARKERS.iter().any(|m| phrase.contains(m))
    })
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoreWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Scores one review from its own fields only.
    pub fn score(&self, review: &AnnotatedReview, hits: &AttributeHits) -> f64 {
        let mut score = 0.0;

        if has_structural_marker(&review.key_phrases) {
            score += self.weights.key_attr_weight;
        }
        if any_detected(hits) {
            score += self.weights.minor_attr_weight;
        }
        score += review.sentiment_score * self.weights.sentiment_multiplier;

        score
    }
}
