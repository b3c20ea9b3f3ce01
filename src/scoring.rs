// Relevance scoring — how much of a text's topic mass lands on the target topics.
//
// The score is the sum of the probabilities of the selected topics in the
// model's sparse, id-ordered distribution for the text. It is not normalized
// and says nothing about topics outside the selection.

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::corpus::bow::BowVector;
use crate::corpus::dictionary::Dictionary;
use crate::lda::traits::TopicDistribution;
use crate::lda::vb::LdaModel;
use crate::store;
use crate::text::Preprocessor;

/// Number of trailing entries summed by the legacy positional selection.
pub const LEGACY_LAST_LISTED: usize = 2;

/// Which topics contribute to the relevance score.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicSelection {
    /// Sum the weights of these topic ids (absent topics contribute nothing)
    Designated(Vec<usize>),
    /// Sum the last `n` entries of the distribution, whatever topics they are.
    /// Fewer than `n` entries sums what is there.
    LastListed(usize),
}

impl Default for TopicSelection {
    fn default() -> Self {
        TopicSelection::LastListed(LEGACY_LAST_LISTED)
    }
}

impl TopicSelection {
    /// Pick the selection for a loaded model.
    ///
    /// An explicit override wins, then the target topics recorded at training
    /// time, then the legacy "last two listed" rule.
    pub fn for_model(model: &LdaModel, override_topics: Option<Vec<usize>>) -> Self {
        match override_topics {
            Some(topics) if !topics.is_empty() => TopicSelection::Designated(topics),
            _ if !model.target_topics().is_empty() => {
                TopicSelection::Designated(model.target_topics().to_vec())
            }
            _ => TopicSelection::default(),
        }
    }

    /// Reduce a sparse topic distribution to a single score.
    pub fn reduce(&self, distribution: &[(usize, f64)]) -> f64 {
        match self {
            TopicSelection::Designated(topics) => distribution
                .iter()
                .filter(|(topic, _)| topics.contains(topic))
                .map(|&(_, weight)| weight)
                .sum(),
            TopicSelection::LastListed(n) => {
                let start = distribution.len().saturating_sub(*n);
                distribution[start..].iter().map(|&(_, weight)| weight).sum()
            }
        }
    }
}

/// Intermediate values behind a score, for display and debugging.
#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    pub document: Vec<String>,
    pub bow: BowVector,
    pub distribution: Vec<(usize, f64)>,
    pub score: f64,
}

/// Score `text` against a model and dictionary.
///
/// Text with no in-vocabulary terms scores 0.0 without querying the model.
pub fn predict_label<M: TopicDistribution>(
    text: &str,
    model: &M,
    dictionary: &Dictionary,
    preprocessor: &Preprocessor,
    selection: &TopicSelection,
) -> f64 {
    explain(text, model, dictionary, preprocessor, selection).score
}

/// Like [`predict_label`] but keeps every intermediate step.
pub fn explain<M: TopicDistribution>(
    text: &str,
    model: &M,
    dictionary: &Dictionary,
    preprocessor: &Preprocessor,
    selection: &TopicSelection,
) -> ScoreBreakdown {
    let document = preprocessor.prepare(text);
    let bow = dictionary.doc2bow(&document);

    if bow.is_empty() {
        debug!(lemmas = document.len(), "No in-vocabulary terms, scoring 0");
        return ScoreBreakdown {
            document,
            bow,
            distribution: Vec::new(),
            score: 0.0,
        };
    }

    let distribution = model.topic_distribution(&bow);
    let score = selection.reduce(&distribution);

    debug!(
        lemmas = document.len(),
        terms = bow.len(),
        listed_topics = distribution.len(),
        score,
        "Scored text"
    );

    ScoreBreakdown {
        document,
        bow,
        distribution,
        score,
    }
}

/// A loaded model ready to score text.
pub struct RelevanceScorer {
    preprocessor: Preprocessor,
    dictionary: Dictionary,
    model: LdaModel,
    selection: TopicSelection,
}

impl RelevanceScorer {
    pub fn new(
        preprocessor: Preprocessor,
        dictionary: Dictionary,
        model: LdaModel,
        selection: TopicSelection,
    ) -> Self {
        Self {
            preprocessor,
            dictionary,
            model,
            selection,
        }
    }

    /// Load artifacts from `dir` and resolve the topic selection.
    pub fn load(
        dir: &Path,
        preprocessor: Preprocessor,
        override_topics: Option<Vec<usize>>,
    ) -> Result<Self> {
        let (dictionary, model) = store::load_model(dir)?;

        if let Some(bad) = override_topics
            .iter()
            .flatten()
            .find(|&&t| t >= model.num_topics())
        {
            anyhow::bail!(
                "Target topic {} is out of range — the model has {} topics (0..{})",
                bad,
                model.num_topics(),
                model.num_topics()
            );
        }

        let selection = TopicSelection::for_model(&model, override_topics);
        Ok(Self::new(preprocessor, dictionary, model, selection))
    }

    /// Replace the topic selection resolved at load time.
    pub fn with_selection(mut self, selection: TopicSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn selection(&self) -> &TopicSelection {
        &self.selection
    }

    pub fn model(&self) -> &LdaModel {
        &self.model
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn score(&self, text: &str) -> f64 {
        self.explain(text).score
    }

    pub fn explain(&self, text: &str) -> ScoreBreakdown {
        explain(
            text,
            &self.model,
            &self.dictionary,
            &self.preprocessor,
            &self.selection,
        )
    }
}
