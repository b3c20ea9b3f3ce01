// Length/stopword filter followed by lemmatization.
//
// The filter runs on the raw token, before lemmatization. A surviving token
// whose lemma is short or a stopword is still kept; only the original token
// is ever tested.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

use super::lemma::Lemmatizer;

/// Tokens must be strictly longer than this many characters to survive.
pub const MIN_TOKEN_CHARS: usize = 4;

/// Drops short tokens and stopwords, then maps survivors to their lemma.
pub struct LemmaFilter {
    stop_words: HashSet<String>,
    lemmatizer: Lemmatizer,
}

impl LemmaFilter {
    /// Filter with NLTK's English stopword list plus `extra_stop_words`.
    pub fn new(lemmatizer: Lemmatizer, extra_stop_words: &[String]) -> Self {
        let mut stop_words: HashSet<String> = get(LANGUAGE::English).into_iter().collect();
        stop_words.extend(extra_stop_words.iter().map(|w| w.trim().to_lowercase()));

        Self {
            stop_words,
            lemmatizer,
        }
    }

    /// Whether a raw token passes the length and stopword checks.
    pub fn keeps(&self, token: &str) -> bool {
        token.chars().count() > MIN_TOKEN_CHARS && !self.stop_words.contains(token)
    }

    pub fn lemmatizer(&self) -> &Lemmatizer {
        &self.lemmatizer
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Filter then lemmatize, preserving order and duplicates.
    pub fn apply(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .filter(|t| self.keeps(t))
            .map(|t| self.lemmatizer.lemmatize(t))
            .collect()
    }
}

impl Default for LemmaFilter {
    fn default() -> Self {
        Self::new(Lemmatizer::default(), &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_short_tokens_dropped() {
        let filter = LemmaFilter::default();
        let out = filter.apply(&tokens(&["covid", "flu", "test", "virus"]));
        assert_eq!(out, vec!["covid", "virus"]);
    }

    #[test]
    fn test_stop_words_dropped() {
        let filter = LemmaFilter::default();
        assert!(filter.is_stop_word("which"));
        assert!(!filter.keeps("which"));
        assert!(!filter.keeps("their"));
        assert!(!filter.keeps("ourselves"));
    }

    #[test]
    fn test_content_words_are_not_stop_words() {
        let filter = LemmaFilter::default();
        for word in ["problem", "world", "test", "important", "information", "system", "number"] {
            assert!(!filter.is_stop_word(word), "{word} should not be a stopword");
        }
    }

    #[test]
    fn test_extra_stop_words() {
        let filter = LemmaFilter::new(Lemmatizer::default(), &["Pandemic".to_string()]);
        let out = filter.apply(&tokens(&["pandemic", "vaccine"]));
        assert_eq!(out, vec!["vaccine"]);
    }

    #[test]
    fn test_duplicates_and_order_preserved() {
        let filter = LemmaFilter::default();
        let out = filter.apply(&tokens(&["vaccines", "covid", "vaccines"]));
        assert_eq!(out, vec!["vaccine", "covid", "vaccine"]);
    }

    #[test]
    fn test_length_checked_before_lemmatization() {
        // "boxes" passes the length check, its lemma "box" would not
        let filter = LemmaFilter::default();
        let out = filter.apply(&tokens(&["boxes", "box"]));
        assert_eq!(out, vec!["box"]);
    }
}
