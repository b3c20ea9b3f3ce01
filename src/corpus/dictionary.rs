// Term dictionary — bidirectional term <-> id mapping.
//
// Ids are handed out in first-seen order across the training documents and
// are only meaningful within one dictionary instance. Alongside the mapping
// we track document frequencies and corpus totals for diagnostics.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bow::BowVector;
use crate::text::Document;

/// Vocabulary built from a training corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "DictionaryData")]
pub struct Dictionary {
    /// Term for each id, indexed by id
    id2token: Vec<String>,
    /// Number of documents each term appears in, indexed by id
    doc_freqs: Vec<u32>,
    /// Number of documents processed
    num_docs: u32,
    /// Number of tokens processed (including repeats)
    num_pos: u64,
    #[serde(skip)]
    token2id: HashMap<String, u32>,
}

/// On-disk shape of a dictionary; the reverse index is rebuilt on load.
#[derive(Deserialize)]
struct DictionaryData {
    id2token: Vec<String>,
    doc_freqs: Vec<u32>,
    num_docs: u32,
    num_pos: u64,
}

impl From<DictionaryData> for Dictionary {
    fn from(data: DictionaryData) -> Self {
        let token2id = data
            .id2token
            .iter()
            .enumerate()
            .map(|(id, term)| (term.clone(), id as u32))
            .collect();
        Self {
            id2token: data.id2token,
            doc_freqs: data.doc_freqs,
            num_docs: data.num_docs,
            num_pos: data.num_pos,
            token2id,
        }
    }
}

impl Dictionary {
    pub fn from_documents(documents: &[Document]) -> Self {
        let mut dictionary = Self::default();
        dictionary.add_documents(documents);
        dictionary
    }

    /// Add every unseen term in `documents`, in order of first appearance.
    pub fn add_documents(&mut self, documents: &[Document]) {
        for doc in documents {
            let mut seen_in_doc: HashSet<u32> = HashSet::new();
            for term in doc {
                let id = match self.token2id.get(term) {
                    Some(&id) => id,
                    None => {
                        let id = self.id2token.len() as u32;
                        self.id2token.push(term.clone());
                        self.doc_freqs.push(0);
                        self.token2id.insert(term.clone(), id);
                        id
                    }
                };
                if seen_in_doc.insert(id) {
                    self.doc_freqs[id as usize] += 1;
                }
            }
            self.num_docs += 1;
            self.num_pos += doc.len() as u64;
        }
        debug!(
            terms = self.id2token.len(),
            docs = self.num_docs,
            "Updated dictionary"
        );
    }

    /// Convert a document to a sparse (id, count) vector sorted by id.
    /// Terms missing from the vocabulary are dropped.
    pub fn doc2bow(&self, document: &[String]) -> BowVector {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for term in document {
            if let Some(&id) = self.token2id.get(term) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }

    pub fn token_id(&self, term: &str) -> Option<u32> {
        self.token2id.get(term).copied()
    }

    pub fn term(&self, id: u32) -> Option<&str> {
        self.id2token.get(id as usize).map(String::as_str)
    }

    /// Terms in id order.
    pub fn terms(&self) -> &[String] {
        &self.id2token
    }

    pub fn doc_freq(&self, id: u32) -> Option<u32> {
        self.doc_freqs.get(id as usize).copied()
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn num_pos(&self) -> u64 {
        self.num_pos
    }

    pub fn len(&self) -> usize {
        self.id2token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2token.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).context("Failed to serialize dictionary")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write dictionary to {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary from {}", path.display()))?;
        let dictionary: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt dictionary file {}", path.display()))?;
        if dictionary.doc_freqs.len() != dictionary.id2token.len() {
            anyhow::bail!(
                "Dictionary {} is inconsistent: {} terms but {} document frequencies",
                path.display(),
                dictionary.id2token.len(),
                dictionary.doc_freqs.len()
            );
        }
        Ok(dictionary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &[&str]) -> Document {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_ids_in_first_seen_order() {
        let dct = Dictionary::from_documents(&[
            doc(&["virus", "covid", "virus"]),
            doc(&["algorithm", "covid"]),
        ]);
        assert_eq!(dct.token_id("virus"), Some(0));
        assert_eq!(dct.token_id("covid"), Some(1));
        assert_eq!(dct.token_id("algorithm"), Some(2));
        assert_eq!(dct.term(2), Some("algorithm"));
        assert_eq!(dct.len(), 3);
    }

    #[test]
    fn test_doc_freqs_and_totals() {
        let dct = Dictionary::from_documents(&[
            doc(&["virus", "covid", "virus"]),
            doc(&["algorithm", "covid"]),
        ]);
        assert_eq!(dct.doc_freq(0), Some(1));
        assert_eq!(dct.doc_freq(1), Some(2));
        assert_eq!(dct.num_docs(), 2);
        assert_eq!(dct.num_pos(), 5);
    }

    #[test]
    fn test_doc2bow_counts_sorted_and_drops_oov() {
        let dct = Dictionary::from_documents(&[doc(&["virus", "covid", "vaccine"])]);
        let bow = dct.doc2bow(&doc(&["vaccine", "covid", "fever", "vaccine"]));
        assert_eq!(bow, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_serde_rebuilds_reverse_index() {
        let dct = Dictionary::from_documents(&[doc(&["virus", "covid"])]);
        let json = serde_json::to_string(&dct).unwrap();
        assert!(!json.contains("token2id"));

        let back: Dictionary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.token_id("covid"), Some(1));
        assert_eq!(back.terms(), dct.terms());
    }
}
