//! Classification result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of classifying a single rice-grain image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Whether the grain is classified as infected
    pub infected: bool,

    /// Raw scalar output from the model (probability-like, 0.0 - 1.0)
    pub score: f32,

    /// When the classification was produced
    pub timestamp: DateTime<Utc>,
}

impl Prediction {
    /// Apply the decision threshold to a raw model score.
    ///
    /// The cutoff is strict: a score exactly at the threshold is
    /// classified as not infected.
    pub fn from_score(score: f32, threshold: f32) -> Self {
        Self {
            infected: score > threshold,
            score,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_at_threshold_is_not_infected() {
        assert!(!Prediction::from_score(0.5, 0.5).infected);
    }

    #[test]
    fn score_just_above_threshold_is_infected() {
        assert!(Prediction::from_score(0.50001, 0.5).infected);
    }

    #[test]
    fn extreme_scores() {
        assert!(!Prediction::from_score(0.0, 0.5).infected);
        assert!(Prediction::from_score(1.0, 0.5).infected);
    }

    #[test]
    fn serializes_with_score_and_verdict() {
        let prediction = Prediction::from_score(0.9, 0.5);
        let json = serde_json::to_string(&prediction).unwrap();
        assert!(json.contains("\"infected\":true"));
        assert!(json.contains("\"score\":0.9"));
    }
}
