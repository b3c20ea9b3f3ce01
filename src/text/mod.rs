// Text preprocessing — tokenize, filter, lemmatize.

pub mod filter;
pub mod lemma;
pub mod tokenizer;

use std::path::PathBuf;

use anyhow::Result;

use filter::LemmaFilter;
use lemma::Lemmatizer;
use tokenizer::Tokenizer;

/// An ordered sequence of lemmas: one training example or one query text.
pub type Document = Vec<String>;

/// Reference data for the preprocessing pipeline.
#[derive(Debug, Clone, Default)]
pub struct PreprocessOptions {
    /// Optional word list added to the bundled lemma lexicon
    pub lexicon: Option<PathBuf>,
    /// Stopwords added on top of the English list
    pub extra_stop_words: Vec<String>,
}

/// Tokenizer plus lemma/stopword filter, built once and reused.
///
/// Training and scoring must go through the same preprocessor settings,
/// otherwise query terms will not line up with the dictionary.
pub struct Preprocessor {
    tokenizer: Tokenizer,
    filter: LemmaFilter,
}

impl Preprocessor {
    pub fn new() -> Result<Self> {
        Self::from_options(&PreprocessOptions::default())
    }

    pub fn from_options(options: &PreprocessOptions) -> Result<Self> {
        let lemmatizer = match &options.lexicon {
            Some(path) => Lemmatizer::from_lexicon_file(path)?,
            None => Lemmatizer::default(),
        };

        Ok(Self {
            tokenizer: Tokenizer::new()?,
            filter: LemmaFilter::new(lemmatizer, &options.extra_stop_words),
        })
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn filter(&self) -> &LemmaFilter {
        &self.filter
    }

    /// Lowercase and lemmatize a single term without the length or stopword
    /// checks, so that user-supplied terms match dictionary entries.
    pub fn normalize_term(&self, term: &str) -> String {
        self.filter.lemmatizer().lemmatize(&term.trim().to_lowercase())
    }

    /// Run raw text through the full pipeline.
    pub fn prepare(&self, text: &str) -> Document {
        let tokens = self.tokenizer.tokenize(text);
        self.filter.apply(&tokens)
    }
}
