//! Plain Word Tokenizer - sentence-oriented word splitting.

use super::{DEFAULT_MAX_TERM_LENGTH, Tokenizer, TokenizerKind, truncate_str};

/// Splits text on whitespace, on sentence punctuation (`. ! ? : ; " ' ( ) ,`)
/// and on a double hyphen, then strips non-alphanumeric characters from both
/// ends of every piece.
///
/// A single hyphen is not a separator, so compound names such as
/// `abel-beth-maacah` stay one word. Pieces without any alphanumeric
/// character are dropped.
pub struct PlainWordTokenizer {
    max_term_length: usize,
}

impl PlainWordTokenizer {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_TERM_LENGTH)
    }

    pub fn with_max_length(max_term_length: usize) -> Self {
        Self { max_term_length }
    }
}

impl Default for PlainWordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | '!' | '?' | ':' | ';' | '"' | '\'' | '(' | ')' | ',')
}

/// Byte offset of the first separator in `s`, or `s.len()`.
fn token_end(s: &str) -> usize {
    let bytes = s.as_bytes();
    for (pos, ch) in s.char_indices() {
        if is_delimiter(ch) || (ch == '-' && bytes.get(pos + 1) == Some(&b'-')) {
            return pos;
        }
    }
    s.len()
}

pub struct PlainWordIterator<'a> {
    rest: &'a str,
    max_term_length: usize,
}

impl<'a> Iterator for PlainWordIterator<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let s = self.rest.trim_start_matches(is_delimiter);
            if s.is_empty() {
                self.rest = s;
                return None;
            }
            if let Some(after) = s.strip_prefix("--") {
                self.rest = after;
                continue;
            }

            let (piece, rest) = s.split_at(token_end(s));
            self.rest = rest;

            let word = piece.trim_matches(|c: char| !c.is_alphanumeric());
            if !word.is_empty() {
                return Some(truncate_str(word, self.max_term_length));
            }
        }
    }
}

impl Tokenizer for PlainWordTokenizer {
    type TokenIter<'a> = PlainWordIterator<'a>;

    fn tokenize<'a>(&'a self, input: &'a str) -> Self::TokenIter<'a> {
        PlainWordIterator {
            rest: input,
            max_term_length: self.max_term_length,
        }
    }

    fn kind(&self) -> TokenizerKind {
        TokenizerKind::PlainWord
    }

    fn max_term_length(&self) -> usize {
        self.max_term_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        PlainWordTokenizer::new()
            .tokenize(text)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_sentence_punctuation() {
        assert_eq!(
            words("In the beginning God created the heaven and the earth."),
            vec![
                "In",
                "the",
                "beginning",
                "God",
                "created",
                "the",
                "heaven",
                "and",
                "the",
                "earth"
            ]
        );
        assert_eq!(
            words("(Selah.) \"Behold!\" he said; 'come'"),
            vec!["Selah", "Behold", "he", "said", "come"]
        );
        assert_eq!(words("God's word"), vec!["God", "s", "word"]);
    }

    #[test]
    fn test_hyphens() {
        assert_eq!(
            words("they came to abel-beth-maacah"),
            vec!["they", "came", "to", "abel-beth-maacah"]
        );
        assert_eq!(words("peace--and war"), vec!["peace", "and", "war"]);
        assert_eq!(words("--begin- -end"), vec!["begin", "end"]);
    }

    #[test]
    fn test_strips_non_alphanumeric_ends() {
        assert_eq!(words("[word] *bold* 42%"), vec!["word", "bold", "42"]);
        assert_eq!(words("& -- ... ,,"), Vec::<&str>::new());
        assert_eq!(words(""), Vec::<&str>::new());
    }

    #[test]
    fn test_truncation() {
        let tokenizer = PlainWordTokenizer::with_max_length(3);
        let terms: Vec<&str> = tokenizer.tokenize("earth is").collect();
        assert_eq!(terms, vec!["ear", "is"]);
    }
}
