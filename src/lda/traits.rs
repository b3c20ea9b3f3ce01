// Topic model traits — the pluggable backend seam.
//
// Training and scoring only talk to these traits, so the variational LDA in
// `vb.rs` can be replaced by another topic model without touching the rest
// of the pipeline.

use anyhow::Result;

use super::params::TrainingParams;
use crate::corpus::bow::BowVector;
use crate::corpus::dictionary::Dictionary;

/// A trained model that maps a bag-of-words to a topic distribution.
pub trait TopicDistribution {
    fn num_topics(&self) -> usize;

    /// Sparse (topic id, probability) pairs ordered by topic id.
    /// Topics with negligible mass may be omitted.
    fn topic_distribution(&self, bow: &[(u32, u32)]) -> Vec<(usize, f64)>;
}

/// Something that can fit a topic model over a corpus.
pub trait TopicModelBackend {
    type Model: TopicDistribution;

    fn fit(
        &self,
        corpus: &[BowVector],
        dictionary: &Dictionary,
        params: &TrainingParams,
    ) -> Result<Self::Model>;
}
