// Rule-based English tokenizer.
//
// Splits raw text on whitespace, then peels punctuation off both ends of each
// piece, splits English clitics ("don't" -> "do" + "n't") and letter-hyphen-letter
// compounds. URLs and @-mentions are collapsed into sentinel tokens so that
// every link or handle looks the same to the topic model.

use anyhow::{Context, Result};
use regex_lite::Regex;

/// Sentinel emitted in place of any URL-like token.
pub const URL_TOKEN: &str = "URL";

/// Sentinel emitted in place of any token starting with `@`.
pub const SCREEN_NAME_TOKEN: &str = "SCREEN_NAME";

/// Characters split off the front of a piece as their own tokens.
const PREFIX_CHARS: &[char] = &[
    '(', '[', '{', '<', '"', '\'', '`', '\u{201c}', '\u{2018}', '*', '#', '$', '\u{a3}', '\u{20ac}',
    '\u{bf}', '\u{a1}',
];

/// Characters split off the end of a piece as their own tokens.
const SUFFIX_CHARS: &[char] = &[
    ')', ']', '}', '>', '"', '\'', '`', '\u{201d}', '\u{2019}', ',', '.', '!', '?', ';', ':', '*',
    '%', '\u{2026}',
];

/// English clitics split off the end of a word ("they're" -> "they" + "'re").
const CLITICS: &[&str] = &[
    "n't", "'s", "'re", "'ve", "'ll", "'d", "'m", "n\u{2019}t", "\u{2019}s", "\u{2019}re",
    "\u{2019}ve", "\u{2019}ll", "\u{2019}d", "\u{2019}m",
];

/// Top-level domains recognized for scheme-less URLs like `cdc.gov/covid`.
const URL_TLDS: &str = "com|org|net|edu|gov|mil|int|io|co|uk|us|ca|au|de|fr|es|it|nl|se|no|\
                        ch|jp|cn|in|ru|br|eu|info|biz|me|tv|ly|gl|app|dev|ai|gg|news|health";

/// Tokenizer with its URL patterns compiled once at construction.
///
/// Build one per process (or per `Preprocessor`) and reuse it for every call.
pub struct Tokenizer {
    url_scheme: Regex,
    url_host: Regex,
}

impl Tokenizer {
    pub fn new() -> Result<Self> {
        let url_scheme = Regex::new(r"(?i)^(?:https?://|ftp://|www\.)\S+$")
            .context("Failed to compile URL scheme pattern")?;
        let url_host = Regex::new(&format!(
            r"(?i)^(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+(?:{URL_TLDS})(?::[0-9]+)?(?:[/?#]\S*)?$"
        ))
        .context("Failed to compile URL host pattern")?;

        Ok(Self {
            url_scheme,
            url_host,
        })
    }

    /// Split `text` into normalized tokens.
    ///
    /// Whitespace is never emitted. URLs become [`URL_TOKEN`], anything
    /// starting with `@` becomes [`SCREEN_NAME_TOKEN`], everything else is
    /// lowercased.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for piece in text.split_whitespace() {
            self.split_piece(piece, &mut tokens);
        }
        tokens
    }

    /// Whether a single token looks like a URL.
    pub fn is_url(&self, token: &str) -> bool {
        if self.url_scheme.is_match(token) {
            return true;
        }
        // Emails share the dotted-host shape but are not links
        if token.contains('@') || !token.contains('.') {
            return false;
        }
        self.url_host.is_match(token)
    }

    fn split_piece(&self, piece: &str, out: &mut Vec<String>) {
        let mut rest = piece;

        // Opening punctuation, always leaving at least one char behind
        while let Some(c) = rest.chars().next() {
            if PREFIX_CHARS.contains(&c) && rest.len() > c.len_utf8() {
                out.push(c.to_string());
                rest = &rest[c.len_utf8()..];
            } else {
                break;
            }
        }

        // Closing punctuation, collected innermost-last
        let mut suffixes: Vec<&str> = Vec::new();
        loop {
            if rest.len() > 3 && rest.ends_with("...") {
                suffixes.push("...");
                rest = &rest[..rest.len() - 3];
                continue;
            }
            match rest.chars().next_back() {
                Some(c) if SUFFIX_CHARS.contains(&c) && rest.len() > c.len_utf8() => {
                    let cut = rest.len() - c.len_utf8();
                    suffixes.push(&rest[cut..]);
                    rest = &rest[..cut];
                }
                _ => break,
            }
        }

        if rest.starts_with('@') {
            out.push(SCREEN_NAME_TOKEN.to_string());
        } else if self.is_url(rest) {
            out.push(URL_TOKEN.to_string());
        } else {
            let lower = rest.to_lowercase();
            let (word, clitic) = split_clitic(&lower);
            split_infixes(word, out);
            if let Some(clitic) = clitic {
                out.push(clitic.to_string());
            }
        }

        out.extend(suffixes.into_iter().rev().map(str::to_string));
    }
}

/// Split a trailing clitic off a lowercased word, if it has one and
/// something remains in front of it.
fn split_clitic(word: &str) -> (&str, Option<&str>) {
    for clitic in CLITICS {
        if word.len() > clitic.len() && word.ends_with(clitic) {
            let cut = word.len() - clitic.len();
            return (&word[..cut], Some(&word[cut..]));
        }
    }
    (word, None)
}

/// Split on hyphens that sit between two letters ("long-term" -> "long", "-", "term").
/// Hyphens next to digits ("covid-19") are left in place.
fn split_infixes(word: &str, out: &mut Vec<String>) {
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    let mut start = 0;

    for i in 1..chars.len().saturating_sub(1) {
        let (pos, c) = chars[i];
        if c == '-' && chars[i - 1].1.is_alphabetic() && chars[i + 1].1.is_alphabetic() {
            out.push(word[start..pos].to_string());
            out.push("-".to_string());
            start = pos + c.len_utf8();
        }
    }

    if start < word.len() {
        out.push(word[start..].to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str) -> Vec<String> {
        Tokenizer::new().unwrap().tokenize(text)
    }

    #[test]
    fn test_lowercases_and_splits_punctuation() {
        assert_eq!(
            tok("Covid is SO common, everyone is positive!"),
            vec!["covid", "is", "so", "common", ",", "everyone", "is", "positive", "!"]
        );
    }

    #[test]
    fn test_clitics_are_split() {
        assert_eq!(tok("don't"), vec!["do", "n't"]);
        assert_eq!(tok("they're"), vec!["they", "'re"]);
    }

    #[test]
    fn test_letter_hyphen_splits_but_digit_hyphen_does_not() {
        assert_eq!(tok("long-term"), vec!["long", "-", "term"]);
        assert_eq!(tok("covid-19"), vec!["covid-19"]);
    }

    #[test]
    fn test_wrapped_mention_keeps_punctuation() {
        assert_eq!(tok("(@someone)"), vec!["(", "SCREEN_NAME", ")"]);
    }

    #[test]
    fn test_url_with_trailing_period() {
        assert_eq!(
            tok("See https://cdc.gov/covid."),
            vec!["see", "URL", "."]
        );
    }

    #[test]
    fn test_is_url_variants() {
        let t = Tokenizer::new().unwrap();
        assert!(t.is_url("http://example.com"));
        assert!(t.is_url("www.who.int"));
        assert!(t.is_url("cdc.gov/coronavirus/2019-ncov"));
        assert!(!t.is_url("someone@example.com"));
        assert!(!t.is_url("e.g"));
        assert!(!t.is_url("covid"));
    }

    #[test]
    fn test_ellipsis_suffix() {
        assert_eq!(tok("wait..."), vec!["wait", "..."]);
    }

    #[test]
    fn test_lone_punctuation_survives() {
        assert_eq!(tok("( )"), vec!["(", ")"]);
    }
}
