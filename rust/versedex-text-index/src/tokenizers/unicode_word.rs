//! Unicode Word Tokenizer - extracts alphanumeric words using Unicode properties.

use std::str::CharIndices;

use super::{DEFAULT_MAX_TERM_LENGTH, Tokenizer, TokenizerKind, truncate_str};

/// Extracts the longest continuous sequences of alphanumeric characters.
///
/// Unlike [`PlainWordTokenizer`](super::PlainWordTokenizer) every
/// non-alphanumeric character separates words, hyphens included.
pub struct UnicodeWordTokenizer {
    max_term_length: usize,
}

impl UnicodeWordTokenizer {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_TERM_LENGTH)
    }

    pub fn with_max_length(max_term_length: usize) -> Self {
        Self { max_term_length }
    }
}

impl Default for UnicodeWordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

pub struct WordTokenIterator<'a> {
    input: &'a str,
    char_indices: CharIndices<'a>,
    max_term_length: usize,
}

impl<'a> Iterator for WordTokenIterator<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let mut word_start = None;
        let mut word_end = self.input.len();

        for (pos, ch) in self.char_indices.by_ref() {
            if ch.is_alphanumeric() {
                if word_start.is_none() {
                    word_start = Some(pos);
                }
            } else if word_start.is_some() {
                word_end = pos;
                break;
            }
        }

        let start = word_start?;
        Some(truncate_str(&self.input[start..word_end], self.max_term_length))
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    type TokenIter<'a> = WordTokenIterator<'a>;

    fn tokenize<'a>(&'a self, input: &'a str) -> Self::TokenIter<'a> {
        WordTokenIterator {
            input,
            char_indices: input.char_indices(),
            max_term_length: self.max_term_length,
        }
    }

    fn kind(&self) -> TokenizerKind {
        TokenizerKind::UnicodeWord
    }

    fn max_term_length(&self) -> usize {
        self.max_term_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_word_tokenizer() {
        let tokenizer = UnicodeWordTokenizer::new();

        let terms: Vec<&str> = tokenizer.tokenize("abel-beth-maacah, 3-4 times").collect();
        assert_eq!(terms, vec!["abel", "beth", "maacah", "3", "4", "times"]);

        assert_eq!(tokenizer.tokenize("").count(), 0);
        assert_eq!(tokenizer.tokenize("!@#$%^&*()").count(), 0);

        let terms: Vec<&str> = tokenizer.tokenize("Schöne Grüße aus München.").collect();
        assert_eq!(terms, vec!["Schöne", "Grüße", "aus", "München"]);

        let terms: Vec<&str> = tokenizer.tokenize("שלום עולם! 2024").collect();
        assert_eq!(terms, vec!["שלום", "עולם", "2024"]);
    }

    #[test]
    fn test_word_truncation() {
        let tokenizer = UnicodeWordTokenizer::with_max_length(3);
        let terms: Vec<&str> = tokenizer.tokenize("cat elephant café").collect();
        assert_eq!(terms, vec!["cat", "ele", "caf"]);
    }
}
