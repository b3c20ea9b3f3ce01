use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::lda::params::TrainingParams;
use crate::store::DEFAULT_MODEL_DIR;
use crate::text::PreprocessOptions;
use crate::training::DEFAULT_TRAINING_DATA;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// value has a default, and CLI flags override whatever is set here.
pub struct Config {
    /// Line-delimited training file
    pub training_data: PathBuf,
    /// Directory holding corpus, dictionary and model
    pub model_dir: PathBuf,
    pub num_topics: Option<usize>,
    pub passes: Option<usize>,
    pub seed: Option<u64>,
    /// Topic ids to score against, overriding the ones recorded on the model
    pub target_topics: Option<Vec<usize>>,
    /// Terms whose best topic becomes a target topic at training time
    pub seed_terms: Option<Vec<String>>,
    /// Extra lemmas on top of the bundled lexicon (one word per line)
    pub lexicon: Option<PathBuf>,
    pub extra_stop_words: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Ok(Self {
            training_data: env::var("COVID_LDA_TRAINING_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TRAINING_DATA)),
            model_dir: env::var("COVID_LDA_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_DIR)),
            num_topics: parse_var("COVID_LDA_TOPICS")?,
            passes: parse_var("COVID_LDA_PASSES")?,
            seed: parse_var("COVID_LDA_SEED")?,
            target_topics: match env::var("COVID_LDA_TARGET_TOPICS") {
                Ok(raw) => Some(parse_topic_list(&raw)?),
                Err(_) => None,
            },
            seed_terms: env::var("COVID_LDA_SEED_TERMS")
                .ok()
                .map(|raw| split_list(&raw)),
            lexicon: env::var("COVID_LDA_LEXICON").ok().map(PathBuf::from),
            extra_stop_words: env::var("COVID_LDA_EXTRA_STOPWORDS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
        })
    }

    /// Training parameters with config values applied over the defaults.
    pub fn training_params(&self) -> TrainingParams {
        let mut params = TrainingParams::default();
        if let Some(topics) = self.num_topics {
            params.num_topics = topics;
        }
        if let Some(passes) = self.passes {
            params.passes = passes;
        }
        if let Some(ref terms) = self.seed_terms {
            params.seed_terms = terms.clone();
        }
        params.seed = self.seed;
        params
    }

    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions {
            lexicon: self.lexicon.clone(),
            extra_stop_words: self.extra_stop_words.clone(),
        }
    }

    /// Check that a trained model exists in the configured directory.
    /// Call this before any operation that scores text.
    pub fn require_model(&self) -> Result<()> {
        if !crate::store::artifacts_present(&self.model_dir) {
            anyhow::bail!(
                "No trained model found in {}\n\
                 Run `covid-lda train` first, or set COVID_LDA_MODEL_DIR.",
                self.model_dir.display()
            );
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a number, got {raw:?}")),
        _ => Ok(None),
    }
}

/// Split a comma-separated list, dropping empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a comma-separated list of topic ids like `3, 7`.
pub fn parse_topic_list(raw: &str) -> Result<Vec<usize>> {
    split_list(raw)
        .iter()
        .map(|s| {
            s.parse::<usize>()
                .with_context(|| format!("Invalid topic id {s:?}"))
        })
        .collect()
}
