// Dictionary-style lemmatizer modelled on WordNet's morphy.
//
// Lookup order: irregular-form exceptions, then the word itself if it is a
// known lemma, then suffix detachment rules whose output must be a known lemma.
// A word with no known base form is returned unchanged. The lexicon of known
// lemmas ships with the crate and can be extended from a word-list file.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Lemmas bundled into the binary: one per line, `#` starts a comment line.
const BUNDLED_LEXICON: &str = include_str!("lemmas.txt");

/// Noun detachment rules: (suffix, replacement).
const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

const VERB_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
];

const ADJ_RULES: &[(&str, &str)] = &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")];

/// Irregular inflections that no suffix rule can recover.
const EXCEPTIONS: &[(&str, &str)] = &[
    ("analyses", "analysis"),
    ("bacteria", "bacterium"),
    ("children", "child"),
    ("crises", "crisis"),
    ("criteria", "criterion"),
    ("diagnoses", "diagnosis"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("given", "give"),
    ("lives", "life"),
    ("mice", "mouse"),
    ("people", "person"),
    ("phenomena", "phenomenon"),
    ("taken", "take"),
    ("teeth", "tooth"),
    ("viruses", "virus"),
    ("wives", "wife"),
    ("women", "woman"),
    ("written", "write"),
];

/// Maps inflected words to their base form.
///
/// Built once and shared read-only by every preprocessing call.
pub struct Lemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
    lexicon: HashSet<String>,
}

impl Default for Lemmatizer {
    /// Lemmatizer over the bundled lexicon.
    fn default() -> Self {
        Self::with_lexicon(lexicon_lines(BUNDLED_LEXICON))
    }
}

impl Lemmatizer {
    /// Lemmatizer that knows exactly `words` (the bundled lexicon is not included).
    pub fn with_lexicon<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lexicon = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            exceptions: EXCEPTIONS.iter().copied().collect(),
            lexicon,
        }
    }

    /// Bundled lexicon extended with a word-list file in the same format.
    pub fn from_lexicon_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lemma lexicon {}", path.display()))?;
        let extra = Self::with_lexicon(lexicon_lines(&raw));
        let mut lemmatizer = Self::default();
        lemmatizer.lexicon.extend(extra.lexicon);
        debug!(
            path = %path.display(),
            entries = lemmatizer.lexicon.len(),
            "Loaded lemma lexicon"
        );
        Ok(lemmatizer)
    }

    /// Number of known lemmas.
    pub fn lexicon_len(&self) -> usize {
        self.lexicon.len()
    }

    /// Base form of `word`, or `None` when no base form is known.
    pub fn base_form(&self, word: &str) -> Option<String> {
        if let Some(base) = self.exceptions.get(word) {
            return Some((*base).to_string());
        }
        morphy(word, &self.lexicon)
    }

    /// Base form of `word`, falling back to the word itself.
    pub fn lemmatize(&self, word: &str) -> String {
        self.base_form(word).unwrap_or_else(|| word.to_string())
    }
}

fn lexicon_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().filter(|line| !line.trim_start().starts_with('#'))
}

fn morphy(word: &str, lexicon: &HashSet<String>) -> Option<String> {
    if lexicon.contains(word) {
        return Some(word.to_string());
    }

    for rules in [NOUN_RULES, VERB_RULES, ADJ_RULES] {
        for (suffix, replacement) in rules {
            if let Some(stem) = word.strip_suffix(suffix) {
                if stem.is_empty() {
                    continue;
                }
                let candidate = format!("{stem}{replacement}");
                if lexicon.contains(&candidate) {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_lexicon_plurals() {
        let lem = Lemmatizer::default();
        assert_eq!(lem.lemmatize("symptoms"), "symptom");
        assert_eq!(lem.lemmatize("vaccines"), "vaccine");
        assert_eq!(lem.lemmatize("boxes"), "box");
        assert_eq!(lem.lemmatize("stories"), "story");
    }

    #[test]
    fn test_plural_lookalikes_are_untouched() {
        let lem = Lemmatizer::default();
        assert_eq!(lem.lemmatize("virus"), "virus");
        assert_eq!(lem.lemmatize("analysis"), "analysis");
        assert_eq!(lem.lemmatize("congress"), "congress");
    }

    #[test]
    fn test_unverifiable_rule_output_is_not_invented() {
        let lem = Lemmatizer::default();
        for word in ["diabetes", "series", "species", "measles", "mathematics", "texas"] {
            assert_eq!(lem.lemmatize(word), word);
        }
        assert_eq!(lem.base_form("texas"), None);
    }

    #[test]
    fn test_exceptions_win() {
        let lem = Lemmatizer::default();
        assert_eq!(lem.lemmatize("viruses"), "virus");
        assert_eq!(lem.lemmatize("children"), "child");
    }

    #[test]
    fn test_unknown_word_kept() {
        let lem = Lemmatizer::default();
        assert_eq!(lem.base_form("covids"), None);
        assert_eq!(lem.lemmatize("covids"), "covids");
    }

    #[test]
    fn test_lexicon_validates_rule_output() {
        let lem = Lemmatizer::with_lexicon(["code", "case", "test", "fever"]);
        assert_eq!(lem.lemmatize("coding"), "code");
        assert_eq!(lem.lemmatize("cases"), "case");
        assert_eq!(lem.lemmatize("tested"), "test");
        assert_eq!(lem.lemmatize("fever"), "fever");
        // Rule output not in lexicon falls back to the word itself
        assert_eq!(lem.lemmatize("leetcoding"), "leetcoding");
        assert_eq!(lem.lemmatize("symptoms"), "symptoms");
    }

    #[test]
    fn test_lexicon_file_extends_bundled() {
        let path = std::env::temp_dir().join("covid-lda-lexicon-test.txt");
        std::fs::write(&path, "# lemmas\nleetcode\n\nBooster\n").unwrap();

        let lem = Lemmatizer::from_lexicon_file(&path).unwrap();
        assert!(lem.lexicon_len() > Lemmatizer::default().lexicon_len());
        assert_eq!(lem.lemmatize("leetcodes"), "leetcode");
        assert_eq!(lem.lemmatize("vaccines"), "vaccine");
        assert_eq!(lem.lemmatize("# lemmas"), "# lemmas");

        std::fs::remove_file(&path).unwrap();
    }
}
