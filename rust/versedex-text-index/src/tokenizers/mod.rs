//! Tokenizers for extracting words from unit text.
//!
//! The same tokenizer runs when the index is built and when a query term is
//! normalized, so a query word and an indexed word compare equal exactly when
//! they produce the same token. Tokenizers return string slices of the input
//! and never allocate; case folding is the job of the
//! [collation](crate::collation).

pub mod plain_word;
pub mod unicode_word;

use versedex_common::{Result, error::Error};

pub use plain_word::PlainWordTokenizer;
pub use unicode_word::UnicodeWordTokenizer;

/// Maximum length of a single term in bytes before truncation.
pub const DEFAULT_MAX_TERM_LENGTH: usize = 128;

/// A tokenizer splits unit text into words.
///
/// Terms longer than [`max_term_length`](Tokenizer::max_term_length) are
/// truncated at a UTF-8 character boundary. Empty terms are never produced.
pub trait Tokenizer: Send + Sync {
    type TokenIter<'a>: Iterator<Item = &'a str>
    where
        Self: 'a;

    fn tokenize<'a>(&'a self, input: &'a str) -> Self::TokenIter<'a>;

    fn kind(&self) -> TokenizerKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn max_term_length(&self) -> usize;
}

/// Creates a tokenizer by its configuration name.
///
/// # Errors
///
/// Returns [`Error::invalid_arg`] if the name is not recognized.
pub fn create_tokenizer(name: &str) -> Result<TokenizerType> {
    match name.try_into()? {
        TokenizerKind::PlainWord => Ok(TokenizerType::PlainWord(PlainWordTokenizer::new())),
        TokenizerKind::UnicodeWord => Ok(TokenizerType::UnicodeWord(UnicodeWordTokenizer::new())),
    }
}

/// Truncates `input` to at most `max_term_length` bytes at a codepoint boundary.
pub(crate) fn truncate_str(input: &str, max_term_length: usize) -> &str {
    if input.len() <= max_term_length {
        return input;
    }
    let mut boundary = max_term_length;
    while boundary > 0 && !input.is_char_boundary(boundary) {
        boundary -= 1;
    }
    &input[..boundary]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerKind {
    /// Splits on whitespace and sentence punctuation, keeps inner hyphens.
    PlainWord,
    /// Maximal runs of alphanumeric characters.
    UnicodeWord,
}

impl TryFrom<&str> for TokenizerKind {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        match name {
            "plain-word" => Ok(TokenizerKind::PlainWord),
            "unicode-word" => Ok(TokenizerKind::UnicodeWord),
            _ => Err(Error::invalid_arg(
                "tokenizer",
                format!("Unrecognized tokenizer: {name}"),
            )),
        }
    }
}

impl TokenizerKind {
    pub const fn name(&self) -> &'static str {
        match self {
            TokenizerKind::PlainWord => "plain-word",
            TokenizerKind::UnicodeWord => "unicode-word",
        }
    }
}

/// All available tokenizers, for configuration-driven selection.
pub enum TokenizerType {
    PlainWord(PlainWordTokenizer),
    UnicodeWord(UnicodeWordTokenizer),
}

impl Tokenizer for TokenizerType {
    type TokenIter<'a> = Box<dyn Iterator<Item = &'a str> + 'a>;

    fn tokenize<'a>(&'a self, input: &'a str) -> Self::TokenIter<'a> {
        match self {
            TokenizerType::PlainWord(tokenizer) => Box::new(tokenizer.tokenize(input)),
            TokenizerType::UnicodeWord(tokenizer) => Box::new(tokenizer.tokenize(input)),
        }
    }

    fn kind(&self) -> TokenizerKind {
        match self {
            TokenizerType::PlainWord(tokenizer) => tokenizer.kind(),
            TokenizerType::UnicodeWord(tokenizer) => tokenizer.kind(),
        }
    }

    fn max_term_length(&self) -> usize {
        match self {
            TokenizerType::PlainWord(tokenizer) => tokenizer.max_term_length(),
            TokenizerType::UnicodeWord(tokenizer) => tokenizer.max_term_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tokenizer() {
        assert_eq!(create_tokenizer("plain-word").unwrap().name(), "plain-word");
        assert_eq!(
            create_tokenizer("unicode-word").unwrap().name(),
            "unicode-word"
        );
        assert!(create_tokenizer("trivial").is_err());
    }

    #[test]
    fn test_term_truncation() {
        let long_term = "a".repeat(150);
        assert_eq!(
            truncate_str(&long_term, DEFAULT_MAX_TERM_LENGTH).len(),
            DEFAULT_MAX_TERM_LENGTH
        );

        // 2-byte characters: 129 bytes would split one.
        let unicode_term = "é".repeat(70);
        let truncated = truncate_str(&unicode_term, DEFAULT_MAX_TERM_LENGTH);
        assert_eq!(truncated.len(), DEFAULT_MAX_TERM_LENGTH);
        let truncated = truncate_str(&unicode_term, 127);
        assert_eq!(truncated.len(), 126);
    }
}
