// Training hyperparameters for the topic model.

use serde::{Deserialize, Serialize};

/// Default number of topics.
pub const DEFAULT_NUM_TOPICS: usize = 10;

/// Default number of full passes over the corpus.
pub const DEFAULT_PASSES: usize = 15;

/// Knobs for fitting a topic model.
///
/// Priors default to the symmetric `1 / num_topics` when left as `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingParams {
    pub num_topics: usize,
    pub passes: usize,
    /// Maximum E-step iterations per document
    pub iterations: usize,
    /// E-step stops when the mean change in gamma falls below this
    pub gamma_threshold: f64,
    /// Topics below this probability are omitted from document distributions
    pub minimum_probability: f64,
    /// Document-topic prior
    pub alpha: Option<f64>,
    /// Topic-term prior
    pub eta: Option<f64>,
    /// RNG seed; a random seed is drawn (and recorded on the model) when unset
    pub seed: Option<u64>,
    /// Terms used to designate the target topics after training
    pub seed_terms: Vec<String>,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            num_topics: DEFAULT_NUM_TOPICS,
            passes: DEFAULT_PASSES,
            iterations: 50,
            gamma_threshold: 0.001,
            minimum_probability: 0.01,
            alpha: None,
            eta: None,
            seed: None,
            seed_terms: vec!["covid".to_string()],
        }
    }
}

impl TrainingParams {
    pub fn alpha(&self) -> f64 {
        self.alpha.unwrap_or(1.0 / self.num_topics.max(1) as f64)
    }

    pub fn eta(&self) -> f64 {
        self.eta.unwrap_or(1.0 / self.num_topics.max(1) as f64)
    }
}
