//! The text index file: one `word:offset:length` line per word, sorted by word.

use std::collections::BTreeMap;

use versedex_common::{Result, error::Error};

use super::{INDEX_FILE, Section};

/// Appends the line for one entry, newline included.
pub fn write_line(out: &mut String, word: &str, section: Section) {
    use std::fmt::Write;
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{word}:{}:{}", section.offset, section.length);
}

/// Parses a whole index file into the word map.
///
/// The word is everything before the last two colons, so a word may itself
/// contain a colon. Blank lines, empty words, unparsable numbers and duplicate
/// words are reported as corruption together with the line number.
pub fn parse(text: &str) -> Result<BTreeMap<String, Section>> {
    let mut map = BTreeMap::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let (word, section) = parse_line(line).ok_or_else(|| {
            Error::corrupt_index(INDEX_FILE, format!("line {line_no}: malformed entry {line:?}"))
        })?;
        if map.insert(word.to_string(), section).is_some() {
            return Err(Error::corrupt_index(
                INDEX_FILE,
                format!("line {line_no}: duplicate word {word:?}"),
            ));
        }
    }
    Ok(map)
}

fn parse_line(line: &str) -> Option<(&str, Section)> {
    let mut parts = line.rsplitn(3, ':');
    let length = parts.next()?.parse::<u32>().ok()?;
    let offset = parts.next()?.parse::<u64>().ok()?;
    let word = parts.next().filter(|w| !w.is_empty())?;
    Some((word, Section { offset, length }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_round_trip() {
        let mut text = String::new();
        write_line(&mut text, "and", Section { offset: 0, length: 3 });
        write_line(&mut text, "earth", Section { offset: 3, length: 3 });
        assert_eq!(text, "and:0:3\nearth:3:3\n");

        let map = parse(&text).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["earth"], Section { offset: 3, length: 3 });
    }

    #[test]
    fn test_word_with_colon() {
        let map = parse("a:b:10:2\n").unwrap();
        assert_eq!(map["a:b"], Section { offset: 10, length: 2 });
    }

    #[test]
    fn test_malformed_lines() {
        for text in [
            "earth:3\n",
            "earth:x:3\n",
            ":0:3\n",
            "earth:0:-1\n",
            "and:0:3\n\nearth:3:3\n",
            "and:0:3\nand:3:3\n",
        ] {
            let err = parse(text).unwrap_err();
            assert!(err.is_corrupt_index(), "{text:?}: {err}");
        }
    }
}
