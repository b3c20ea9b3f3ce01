// Training pipeline — read documents, build dictionary and corpus, fit, persist.
//
// Persist order: corpus, dictionary, then the model once fitting finishes.
// There is no rollback; a failed fit leaves the first two files behind.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::corpus::bow::{build_corpus, save_corpus};
use crate::corpus::dictionary::Dictionary;
use crate::lda::params::TrainingParams;
use crate::lda::traits::TopicModelBackend;
use crate::lda::vb::{LdaModel, VariationalLda};
use crate::output::terminal::display_topics;
use crate::store;
use crate::text::{Document, Preprocessor};

/// Default training file: one raw document per line.
pub const DEFAULT_TRAINING_DATA: &str = "data/training/training_articles.csv";

/// Words shown per topic in the post-training listing.
pub const TOPIC_LISTING_WORDS: usize = 20;

/// Read a line-delimited text file and preprocess every line into a document.
///
/// Despite the usual `.csv` extension the file is not parsed as CSV; each
/// line is raw text.
pub fn load_training_data(path: &Path, preprocessor: &Preprocessor) -> Result<Vec<Document>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read training data from {}", path.display()))?;
    let documents: Vec<Document> = raw.lines().map(|line| preprocessor.prepare(line)).collect();

    info!(
        path = %path.display(),
        documents = documents.len(),
        "Loaded training data"
    );
    Ok(documents)
}

/// Train on a training file and persist all artifacts into `output_dir`.
///
/// `training_data` defaults to [`DEFAULT_TRAINING_DATA`]. Seed terms are
/// lemmatized with the same preprocessor as the documents.
pub fn train(
    training_data: Option<&Path>,
    output_dir: &Path,
    params: &TrainingParams,
    preprocessor: &Preprocessor,
    backend: &VariationalLda,
) -> Result<()> {
    let path = training_data.unwrap_or_else(|| Path::new(DEFAULT_TRAINING_DATA));
    let documents = load_training_data(path, preprocessor)?;

    let mut params = params.clone();
    params.seed_terms = params
        .seed_terms
        .iter()
        .map(|term| preprocessor.normalize_term(term))
        .collect();

    train_documents(&documents, output_dir, &params, backend)?;
    Ok(())
}

/// Train on already-preprocessed documents, persist, and print the topics.
///
/// `params.seed_terms` are looked up as given and must already be in
/// dictionary form.
pub fn train_documents<B>(
    documents: &[Document],
    output_dir: &Path,
    params: &TrainingParams,
    backend: &B,
) -> Result<(Dictionary, LdaModel)>
where
    B: TopicModelBackend<Model = LdaModel>,
{
    if !output_dir.is_dir() {
        anyhow::bail!("Output directory does not exist: {}", output_dir.display());
    }

    let dictionary = Dictionary::from_documents(documents);
    let corpus = build_corpus(&dictionary, documents);

    save_corpus(&store::corpus_path(output_dir), &corpus)?;
    dictionary.save(&store::dictionary_path(output_dir))?;

    let mut model = backend.fit(&corpus, &dictionary, params)?;

    let targets = model.topics_for_terms(&dictionary, &params.seed_terms);
    if targets.is_empty() && !params.seed_terms.is_empty() {
        warn!(
            seed_terms = ?params.seed_terms,
            "None of the seed terms are in the vocabulary; no target topics designated"
        );
    }
    model.set_target_topics(targets);

    model.save(&store::model_path(output_dir))?;

    info!(
        dir = %output_dir.display(),
        terms = dictionary.len(),
        target_topics = ?model.target_topics(),
        "Saved corpus, dictionary and model"
    );

    display_topics(
        &model.print_topics(&dictionary, TOPIC_LISTING_WORDS),
        model.target_topics(),
    );

    Ok((dictionary, model))
}
