use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+(?:['’_][\p{L}\p{N}]+)*").expect("valid regex");
}

/// A token with its byte span in the original (unnormalized) text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub position: usize,
    pub start: usize,
    pub end: usize,
}

/// Lowercase and fold diacritics: compatibility-decompose, then drop combining marks.
pub fn normalize(word: &str) -> String {
    word.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c == '’' { '\'' } else { c })
        .collect()
}

/// Tokenize text into (term, position) on word boundaries. No stemming, no stopwords.
pub fn tokenize(text: &str) -> Vec<(String, usize)> {
    tokenize_with_offsets(text)
        .into_iter()
        .map(|t| (t.term, t.position))
        .collect()
}

/// Same tokens as [`tokenize`], keeping byte offsets so matches can be highlighted in place.
pub fn tokenize_with_offsets(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for mat in RE.find_iter(text) {
        let term = normalize(mat.as_str());
        if term.is_empty() {
            continue;
        }
        tokens.push(Token { term, position: tokens.len(), start: mat.start(), end: mat.end() });
    }
    tokens
}
