// Model directory layout — three artifacts under fixed filenames.
//
// Artifacts are written independently; a failure partway through can leave
// the directory with some but not all of them. `artifacts_present` is the
// check to run before loading.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::corpus::dictionary::Dictionary;
use crate::lda::traits::TopicDistribution;
use crate::lda::vb::LdaModel;

/// Default directory for trained artifacts, relative to the working directory.
pub const DEFAULT_MODEL_DIR: &str = "models/covid_topic_labelling";

pub const CORPUS_FILE: &str = "corpus.json";
pub const DICTIONARY_FILE: &str = "dictionary.json";
pub const MODEL_FILE: &str = "model.json";

pub fn corpus_path(dir: &Path) -> PathBuf {
    dir.join(CORPUS_FILE)
}

pub fn dictionary_path(dir: &Path) -> PathBuf {
    dir.join(DICTIONARY_FILE)
}

pub fn model_path(dir: &Path) -> PathBuf {
    dir.join(MODEL_FILE)
}

/// Whether the dictionary and model needed for scoring both exist.
pub fn artifacts_present(dir: &Path) -> bool {
    dictionary_path(dir).exists() && model_path(dir).exists()
}

/// Load the (dictionary, model) pair persisted by training.
pub fn load_model(dir: &Path) -> Result<(Dictionary, LdaModel)> {
    if !dir.is_dir() {
        anyhow::bail!(
            "Model directory not found: {}\nRun `covid-lda train` first.",
            dir.display()
        );
    }

    let dictionary = Dictionary::load(&dictionary_path(dir))?;
    let model = LdaModel::load(&model_path(dir))?;

    if dictionary.len() != model.num_terms() {
        anyhow::bail!(
            "Dictionary has {} terms but the model was trained on {} — artifacts in {} are from different runs",
            dictionary.len(),
            model.num_terms(),
            dir.display()
        );
    }

    debug!(
        dir = %dir.display(),
        terms = dictionary.len(),
        topics = model.num_topics(),
        "Loaded topic model"
    );
    Ok((dictionary, model))
}
