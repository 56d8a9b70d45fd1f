//! Query trees and their evaluation.
//!
//! A [`Query`] is an immutable tree built once, either through the validating
//! constructors or by [`Query::parse`]. Evaluation is a depth-first walk that
//! combines the reference sets of the leaves with set algebra; it has no side
//! effects, so one tree may be evaluated any number of times and from several
//! threads.

mod parser;

use std::fmt;

use versedex_common::{Result, error::Error};
use versedex_ranges::ReferenceSet;

use crate::{backend::IndexSearcher, grammar};

/// Characters with a meaning in query text. A word may not contain them,
/// except `-` between two alphanumeric characters.
const SYNTAX_CHARS: &[char] = &['|', '/', '&', '+', ',', '!', '~', '(', ')', '*', '-'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Units containing the word.
    Base(String),
    /// Units containing any word that starts with the prefix.
    StartsWith(String),
    /// Units containing a grammatical form of the word: any word starting
    /// with its root.
    Grammar(String),
    /// Units of `left` within `factor` units of a unit of `right`, without
    /// crossing the searcher's restriction.
    Blur {
        left: Box<Query>,
        right: Box<Query>,
        factor: u32,
    },
    And(Box<Query>, Box<Query>),
    Or(Box<Query>, Box<Query>),
    /// Units of the left side that are not in the right side.
    AndNot(Box<Query>, Box<Query>),
}

impl Query {
    /// A single word query.
    ///
    /// # Errors
    ///
    /// `Query` if the word is empty, contains whitespace, or contains query
    /// syntax other than an inner hyphen.
    pub fn base(word: impl Into<String>) -> Result<Query> {
        let word = word.into();
        validate_word(&word)?;
        Ok(Query::Base(word))
    }

    pub fn starts_with(prefix: impl Into<String>) -> Result<Query> {
        let prefix = prefix.into();
        validate_word(&prefix)?;
        Ok(Query::StartsWith(prefix))
    }

    pub fn grammar(word: impl Into<String>) -> Result<Query> {
        let word = word.into();
        validate_word(&word)?;
        Ok(Query::Grammar(word))
    }

    pub fn blur(left: Query, right: Query, factor: u32) -> Query {
        Query::Blur {
            left: Box::new(left),
            right: Box::new(right),
            factor,
        }
    }

    pub fn and(left: Query, right: Query) -> Query {
        Query::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Query, right: Query) -> Query {
        Query::Or(Box::new(left), Box::new(right))
    }

    pub fn and_not(left: Query, right: Query) -> Query {
        Query::AndNot(Box::new(left), Box::new(right))
    }

    /// Parses query text.
    ///
    /// Operators, from lowest to highest precedence, all left associative:
    /// `a | b`, `a / b` or `a b` (`Or`), `a & b`, `a + b` or `a, b` (`And`),
    /// `a - b` or `a ! b` (`AndNot`), `a ~N b` or `a ~N , b` (`Blur` by `N`).
    /// Primaries are `word`, `word*`, `grammar word` (or `gr word`) and
    /// `( expr )`. A `-` between two alphanumeric characters is part of the
    /// word.
    pub fn parse(text: &str) -> Result<Query> {
        parser::parse(text)
    }

    /// Evaluates the query against `searcher`.
    pub fn find(&self, searcher: &dyn IndexSearcher) -> Result<ReferenceSet> {
        match self {
            Query::Base(word) => searcher.find(word),
            Query::StartsWith(prefix) => prefix_matches(searcher, prefix),
            Query::Grammar(word) => grammar_matches(searcher, word),
            Query::Blur {
                left,
                right,
                factor,
            } => {
                let left = left.find(searcher)?;
                if left.is_empty() {
                    return Ok(left);
                }
                let right = right.find(searcher)?;
                if right.is_empty() {
                    return Ok(right);
                }
                Ok(left.intersection(&right.blur(*factor, searcher.restriction())))
            }
            Query::And(left, right) => {
                let mut result = left.find(searcher)?;
                if !result.is_empty() {
                    result.retain_all(&right.find(searcher)?);
                }
                Ok(result)
            }
            Query::Or(left, right) => {
                let mut result = left.find(searcher)?;
                result.add_all(&right.find(searcher)?);
                Ok(result)
            }
            Query::AndNot(left, right) => {
                let mut result = left.find(searcher)?;
                if !result.is_empty() {
                    result.remove_all(&right.find(searcher)?);
                }
                Ok(result)
            }
        }
    }

    /// True if evaluating the query blurs, which depends on the searcher's
    /// restriction.
    pub fn has_blur(&self) -> bool {
        match self {
            Query::Base(_) | Query::StartsWith(_) | Query::Grammar(_) => false,
            Query::Blur { .. } => true,
            Query::And(left, right) | Query::Or(left, right) | Query::AndNot(left, right) => {
                left.has_blur() || right.has_blur()
            }
        }
    }

    /// Words and prefixes at the leaves, left to right.
    pub fn leaves(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Query::Base(word) | Query::StartsWith(word) | Query::Grammar(word) => out.push(word),
            Query::Blur { left, right, .. }
            | Query::And(left, right)
            | Query::Or(left, right)
            | Query::AndNot(left, right) => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }
}

fn prefix_matches(searcher: &dyn IndexSearcher, prefix: &str) -> Result<ReferenceSet> {
    let mut result = ReferenceSet::new();
    for word in searcher.prefix_search(prefix) {
        result.add_all(&searcher.find(&word)?);
    }
    Ok(result)
}

/// Units containing a word that starts with the grammatical root of `word`.
///
/// The root is used only when it is an indexed word itself, and only for
/// English analyzers; otherwise the normalized word is the prefix.
pub(crate) fn grammar_matches(searcher: &dyn IndexSearcher, word: &str) -> Result<ReferenceSet> {
    let Some(word) = searcher.analyzer().normalize(word) else {
        return Ok(ReferenceSet::new());
    };
    let mut stem = word.as_str();
    if searcher.analyzer().is_english() {
        let root = grammar::root(&word);
        if root != word && !searcher.find(root)?.is_empty() {
            stem = root;
        }
    }
    log::trace!("grammar: {word:?} via {stem:?}");
    prefix_matches(searcher, stem)
}

fn validate_word(word: &str) -> Result<()> {
    let message = if word.is_empty() {
        Some("empty word")
    } else if word.chars().any(char::is_whitespace) {
        Some("a word cannot contain whitespace")
    } else if !is_plain_word(word) {
        Some("a word cannot contain query operators")
    } else {
        None
    };
    match message {
        Some(message) => Err(Error::query(word, message)),
        None => Ok(()),
    }
}

/// True if `word` has no syntax characters other than hyphens between two
/// alphanumeric characters.
fn is_plain_word(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    chars.iter().enumerate().all(|(i, &c)| {
        if c == '-' {
            i > 0
                && chars[i - 1].is_alphanumeric()
                && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric())
        } else {
            !SYNTAX_CHARS.contains(&c)
        }
    })
}

/// Renders the query as text that [`Query::parse`] reads back to an equal tree.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Base(word) => f.write_str(word),
            Query::StartsWith(prefix) => write!(f, "{prefix}*"),
            Query::Grammar(word) => write!(f, "(grammar {word})"),
            Query::Blur {
                left,
                right,
                factor,
            } => write!(f, "({left} ~{factor} {right})"),
            Query::And(left, right) => write!(f, "({left} & {right})"),
            Query::Or(left, right) => write!(f, "({left} | {right})"),
            Query::AndNot(left, right) => write!(f, "({left} - {right})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_validate() {
        assert!(Query::base("love").is_ok());
        assert!(Query::base("abel-beth-maacah").is_ok());
        assert!(Query::base("").is_err());
        assert!(Query::base("two words").is_err());
        assert!(Query::base("love|hate").is_err());
        assert!(Query::base("-love").is_err());
        assert!(Query::base("love-").is_err());
        assert!(Query::starts_with("lov*").is_err());

        let err = Query::base("a~b").unwrap_err();
        assert!(err.to_string().contains("a~b"));
    }

    #[test]
    fn test_display_round_trips() {
        let query = Query::or(
            Query::blur(
                Query::base("love").unwrap(),
                Query::starts_with("hat").unwrap(),
                2,
            ),
            Query::and_not(
                Query::base("god").unwrap(),
                Query::and(Query::base("a").unwrap(), Query::base("b").unwrap()),
            ),
        );
        let text = query.to_string();
        assert_eq!(text, "((love ~2 hat*) | (god - (a & b)))");
        assert_eq!(Query::parse(&text).unwrap(), query);
    }

    #[test]
    fn test_leaves() {
        let query = Query::parse("love ~2 hate* - god").unwrap();
        assert_eq!(query.leaves(), vec!["love", "hate", "god"]);
        assert_eq!(Query::parse("gr loves, god").unwrap().leaves(), vec!["loves", "god"]);
    }

    #[test]
    fn test_has_blur() {
        assert!(Query::parse("a | (b & c ~1 d)").unwrap().has_blur());
        assert!(!Query::parse("a | (b & c*) - grammar d").unwrap().has_blur());
    }

    #[test]
    fn test_grammar_round_trips() {
        let query = Query::and(
            Query::grammar("loves").unwrap(),
            Query::base("god").unwrap(),
        );
        assert_eq!(query.to_string(), "((grammar loves) & god)");
        assert_eq!(Query::parse(&query.to_string()).unwrap(), query);
        assert!(Query::grammar("a,b").is_err());
        assert!(Query::base("a/b").is_err());
    }
}
