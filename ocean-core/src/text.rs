//! Token normalization and stopword/punctuation filtering.

use crate::graph::normalize_identifier;
use std::collections::HashSet;

/// English stopwords (NLTK list).
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Single-character tokens that never become graph entities.
const PUNCTUATION: &[&str] = &[
    ",", ".", ":", ";", "(", ")", "[", "]", "!", "?", "+", "-", "*", "'", "\"", "/", " ",
];

lazy_static::lazy_static! {
    static ref DEFAULT_STOPWORDS: HashSet<String> =
        ENGLISH_STOPWORDS.iter().map(|w| w.to_string()).collect();
}

/// Normalize a surface token: lowercase, non-alphanumerics become `_`, then
/// leading/trailing `_` and whitespace are stripped.
pub fn normalize_token(raw: &str) -> String {
    normalize_identifier(raw)
        .trim_matches('_')
        .trim()
        .to_string()
}

/// Decides which normalized tokens become graph entities.
#[derive(Debug, Clone)]
pub struct TokenFilter {
    stopwords: HashSet<String>,
}

impl Default for TokenFilter {
    fn default() -> Self {
        Self {
            stopwords: DEFAULT_STOPWORDS.clone(),
        }
    }
}

impl TokenFilter {
    /// Filter with the English stopword list.
    pub fn english() -> Self {
        Self::default()
    }

    /// Filter with a custom stopword list.
    pub fn with_stopwords<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stopwords: stopwords.into_iter().map(Into::into).collect(),
        }
    }

    /// Normalize `raw` and return it if it should be kept.
    ///
    /// Empty results, stopwords and punctuation are dropped.
    pub fn retain(&self, raw: &str) -> Option<String> {
        let token = normalize_token(raw);
        if token.is_empty()
            || self.stopwords.contains(&token)
            || PUNCTUATION.contains(&token.as_str())
        {
            None
        } else {
            Some(token)
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}
