//! English word helpers used by best-match search.

/// Endings stripped to find a word's root, tried in order; the first match wins.
const ENDINGS: [&str; 7] = ["es", "'s", "s", "ing", "ed", "er", "ly"];

/// The most frequent words of the corpus language. Including them in a
/// best-match query would match nearly every unit.
const SMALL_WORDS: &[&str] = &[
    "the", "and", "of", "to", "in", "he", "that", "i", "a", "for", "you", "his", "is", "will",
    "they", "not", "with", "him", "it", "be", "them", "shall", "all", "my", "from", "was",
    "your", "have", "me", "but", "their", "as", "who", "said", "are", "on", "this", "when",
    "thou", "thy", "by", "were", "had", "then", "out", "so", "there", "which", "do", "one",
    "ye", "up", "thee", "at", "we", "her", "what", "men", "come", "if", "into", "came", "upon",
    "before", "or", "us", "because", "go", "an", "went", "also", "now", "let", "hath", "may",
    "has", "our", "these", "o", "am",
];

/// Strips one grammatical ending from `word`.
///
/// Only a single ending is removed, and never the whole word.
pub fn root(word: &str) -> &str {
    ENDINGS
        .iter()
        .find_map(|ending| {
            word.strip_suffix(ending)
                .filter(|stem| !stem.is_empty())
        })
        .unwrap_or(word)
}

/// True for blank input and for the most frequent words, case-insensitively.
pub fn is_small_word(word: &str) -> bool {
    let word = word.trim();
    word.is_empty()
        || SMALL_WORDS.iter().any(|small| small.eq_ignore_ascii_case(word))
}
