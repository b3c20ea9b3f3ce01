// Unit tests for text preprocessing.
//
// Tests isolated pure functions: Tokenizer determinism and sentinel
// substitution, LemmaFilter length/stopword invariants, and the order of
// filtering relative to lemmatization.

use covid_lda::text::filter::{LemmaFilter, MIN_TOKEN_CHARS};
use covid_lda::text::lemma::Lemmatizer;
use covid_lda::text::tokenizer::{Tokenizer, SCREEN_NAME_TOKEN, URL_TOKEN};
use covid_lda::text::{PreprocessOptions, Preprocessor};

// ============================================================
// Tokenizer — determinism and sentinels
// ============================================================

#[test]
fn tokenizer_is_deterministic() {
    let tokenizer = Tokenizer::new().unwrap();
    let text = "Omicron is coming, they say. Check https://who.int/news or ask @drsmith!";
    let first = tokenizer.tokenize(text);
    for _ in 0..5 {
        assert_eq!(tokenizer.tokenize(text), first);
    }
}

#[test]
fn tokenizer_empty_and_whitespace_input() {
    let tokenizer = Tokenizer::new().unwrap();
    assert!(tokenizer.tokenize("").is_empty());
    assert!(tokenizer.tokenize("   \n\t  ").is_empty());
}

#[test]
fn urls_become_exact_sentinel() {
    let tokenizer = Tokenizer::new().unwrap();
    for url in [
        "http://example.com",
        "https://www.cdc.gov/coronavirus/2019-ncov/index.html",
        "www.nytimes.com",
        "bit.ly/3xYz",
    ] {
        assert_eq!(tokenizer.tokenize(url), vec![URL_TOKEN], "url: {url}");
    }
}

#[test]
fn mentions_become_exact_sentinel() {
    let tokenizer = Tokenizer::new().unwrap();
    assert_eq!(tokenizer.tokenize("@WHO"), vec![SCREEN_NAME_TOKEN]);
    assert_eq!(
        tokenizer.tokenize("thanks @nurse_jane, stay safe"),
        vec!["thanks", SCREEN_NAME_TOKEN, ",", "stay", "safe"]
    );
}

#[test]
fn sentinels_are_not_lowercased() {
    let tokenizer = Tokenizer::new().unwrap();
    let tokens = tokenizer.tokenize("READ http://x.com NOW @Someone");
    assert_eq!(tokens, vec!["read", "URL", "now", "SCREEN_NAME"]);
}

#[test]
fn email_is_not_a_url_or_mention() {
    let tokenizer = Tokenizer::new().unwrap();
    let tokens = tokenizer.tokenize("nurse@hospital.org");
    assert_eq!(tokens, vec!["nurse@hospital.org"]);
}

#[test]
fn all_other_tokens_lowercased() {
    let tokenizer = Tokenizer::new().unwrap();
    for token in tokenizer.tokenize("The PANDEMIC Hit Hard In 2020") {
        assert_eq!(token, token.to_lowercase());
    }
}

// ============================================================
// LemmaFilter — length and stopword invariants
// ============================================================

#[test]
fn survivors_are_long_and_not_stopwords() {
    let tokenizer = Tokenizer::new().unwrap();
    let filter = LemmaFilter::default();
    let tokens = tokenizer.tokenize(
        "The president is a patient and is contagious, the symptoms are bad and \
         everyone would rather stay home with their families",
    );

    let survivors: Vec<&String> = tokens.iter().filter(|t| filter.keeps(t)).collect();
    assert!(!survivors.is_empty());
    for token in survivors {
        assert!(token.chars().count() > MIN_TOKEN_CHARS, "{token} too short");
        assert!(!filter.is_stop_word(token), "{token} is a stopword");
    }
}

#[test]
fn exactly_four_chars_is_dropped_five_is_kept() {
    let filter = LemmaFilter::default();
    assert!(!filter.keeps("test"));
    assert!(filter.keeps("fever"));
}

#[test]
fn filter_runs_before_lemmatization() {
    // The lexicon maps "boxes" to "box"; "box" alone is too short
    let filter = LemmaFilter::new(Lemmatizer::with_lexicon(["box"]), &[]);
    let out = filter.apply(&["boxes".to_string(), "box".to_string()]);
    assert_eq!(out, vec!["box"]);
}

#[test]
fn lemma_that_is_a_stopword_survives() {
    // "vaccines" passes the stopword check; its lemma "vaccine" would not
    let filter = LemmaFilter::new(Lemmatizer::with_lexicon(["vaccine"]), &["vaccine".to_string()]);
    assert_eq!(filter.apply(&["vaccines".to_string()]), vec!["vaccine"]);
    assert!(filter.apply(&["vaccine".to_string()]).is_empty());
}

// ============================================================
// Preprocessor — end to end
// ============================================================

#[test]
fn prepare_covid_sentence() {
    let pre = Preprocessor::new().unwrap();
    assert_eq!(
        pre.prepare("I have covid symptoms and a fever"),
        vec!["covid", "symptom", "fever"]
    );
}

#[test]
fn prepare_keeps_screen_name_sentinel_but_drops_url() {
    // "URL" is three characters and fails the length check; "SCREEN_NAME" passes
    let pre = Preprocessor::new().unwrap();
    assert_eq!(
        pre.prepare("@someone https://example.com vaccines"),
        vec!["SCREEN_NAME", "vaccine"]
    );
}

#[test]
fn prepare_keeps_ordinary_content_words() {
    let pre = Preprocessor::new().unwrap();
    assert_eq!(
        pre.prepare("I solved a leetcode algorithm problem"),
        vec!["solve", "leetcode", "algorithm", "problem"]
    );

    let doc = pre.prepare("omicron is coming to the world they say. I have to get a test");
    assert!(doc.contains(&"world".to_string()), "{doc:?}");
}

#[test]
fn prepare_leaves_words_without_known_lemma_alone() {
    let pre = Preprocessor::new().unwrap();
    assert_eq!(
        pre.prepare("diabetes and measles species"),
        vec!["diabetes", "measles", "species"]
    );
}

#[test]
fn normalize_term_lemmatizes_without_filtering() {
    let pre = Preprocessor::new().unwrap();
    assert_eq!(pre.normalize_term("Vaccines"), "vaccine");
    assert_eq!(pre.normalize_term(" COVID "), "covid");
    // Short terms and stopwords are not dropped
    assert_eq!(pre.normalize_term("flu"), "flu");
}

#[test]
fn prepare_empty_text() {
    let pre = Preprocessor::new().unwrap();
    assert!(pre.prepare("").is_empty());
}

#[test]
fn preprocess_options_extra_stopwords_apply() {
    let pre = Preprocessor::from_options(&PreprocessOptions {
        lexicon: None,
        extra_stop_words: vec!["omicron".to_string()],
    })
    .unwrap();
    assert_eq!(pre.prepare("omicron variant"), vec!["variant"]);
}

#[test]
fn preprocess_options_missing_lexicon_fails() {
    let result = Preprocessor::from_options(&PreprocessOptions {
        lexicon: Some(std::env::temp_dir().join("covid-lda-no-such-lexicon.txt")),
        extra_stop_words: vec![],
    });
    assert!(result.is_err());
}
