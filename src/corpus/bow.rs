// Bag-of-words corpus construction and persistence.

use std::path::Path;

use anyhow::{Context, Result};

use super::dictionary::Dictionary;
use crate::text::Document;

/// Sparse (term id, count) pairs for one document, sorted by term id.
pub type BowVector = Vec<(u32, u32)>;

/// Convert every document against the same dictionary.
pub fn build_corpus(dictionary: &Dictionary, documents: &[Document]) -> Vec<BowVector> {
    documents.iter().map(|doc| dictionary.doc2bow(doc)).collect()
}

/// Total token count of a bag-of-words vector.
pub fn bow_len(bow: &[(u32, u32)]) -> u64 {
    bow.iter().map(|&(_, count)| count as u64).sum()
}

pub fn save_corpus(path: &Path, corpus: &[BowVector]) -> Result<()> {
    let json = serde_json::to_string(corpus).context("Failed to serialize corpus")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write corpus to {}", path.display()))?;
    Ok(())
}

pub fn load_corpus(path: &Path) -> Result<Vec<BowVector>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Corrupt corpus file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_corpus_one_vector_per_document() {
        let docs: Vec<Document> = vec![
            vec!["covid".into(), "virus".into(), "covid".into()],
            vec![],
            vec!["coding".into()],
        ];
        let dct = Dictionary::from_documents(&docs);
        let corpus = build_corpus(&dct, &docs);

        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus[0], vec![(0, 2), (1, 1)]);
        assert!(corpus[1].is_empty());
        assert_eq!(bow_len(&corpus[0]), 3);
    }

    #[test]
    fn test_corpus_file_roundtrip() {
        let corpus: Vec<BowVector> = vec![vec![(0, 2), (3, 1)], vec![]];
        let path = std::env::temp_dir().join(format!("covid-lda-corpus-{}.json", std::process::id()));

        save_corpus(&path, &corpus).unwrap();
        assert_eq!(load_corpus(&path).unwrap(), corpus);

        std::fs::remove_file(&path).unwrap();
    }
}
