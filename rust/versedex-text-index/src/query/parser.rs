use versedex_common::{Result, error::Error};

use super::Query;

/// Deepest accepted nesting of parentheses.
const MAX_NESTING: usize = 256;

/// Most tokens accepted in one query. Operator chains nest the tree one level
/// per operator, so this also bounds the depth of evaluation.
const MAX_TOKENS: usize = 1024;

/// Command words that turn the following word into a grammar query.
const GRAMMAR_WORDS: [&str; 2] = ["grammar", "gr"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Prefix(String),
    Or,
    And,
    AndNot,
    Blur(u32),
    Open,
    Close,
}

impl Token {
    fn starts_primary(&self) -> bool {
        matches!(self, Token::Word(_) | Token::Prefix(_) | Token::Open)
    }

    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("word '{w}'"),
            Token::Prefix(p) => format!("prefix '{p}*'"),
            Token::Or => "'|'".to_string(),
            Token::And => "'&'".to_string(),
            Token::AndNot => "'-'".to_string(),
            Token::Blur(n) => format!("'~{n}'"),
            Token::Open => "'('".to_string(),
            Token::Close => "')'".to_string(),
        }
    }
}

/// Parses query text.
///
/// Operators, from lowest to highest precedence, all left associative:
///
/// | Syntax | Meaning |
/// |---|---|
/// | `a \| b`, `a / b`, `a b` | `Or` |
/// | `a & b`, `a + b`, `a, b` | `And` |
/// | `a - b`, `a ! b` | `AndNot` |
/// | `a ~N b`, `a ~N , b` | `Blur` by `N` units |
///
/// Primaries are `word`, `word*` (any word with that prefix), `grammar word`
/// or `gr word` (any form of the word) and `( expr )`.
/// A `-` between two alphanumeric characters belongs to the word, so
/// `abel-beth-maacah` is one word while `love - hate` and `love -hate` are not.
pub(super) fn parse(text: &str) -> Result<Query> {
    let tokens = lex(text)?;
    if tokens.is_empty() {
        return Err(Error::query(text, "empty query"));
    }
    if tokens.len() > MAX_TOKENS {
        return Err(Error::query(
            text,
            format!("query has more than {MAX_TOKENS} terms and operators"),
        ));
    }
    let mut parser = Parser {
        text,
        tokens,
        pos: 0,
        depth: 0,
    };
    let query = parser.or_expr()?;
    if let Some(token) = parser.peek() {
        return Err(parser.error(format!("unexpected {}", token.describe())));
    }
    Ok(query)
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '|' | '/' | '&' | '+' | ',' | '!' | '~' | '(' | ')' | '*')
}

fn lex(text: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '|' | '/' => Token::Or,
            '&' | '+' | ',' => Token::And,
            '-' | '!' => Token::AndNot,
            '(' => Token::Open,
            ')' => Token::Close,
            '*' => return Err(Error::query(text, "'*' must follow a word")),
            '~' => {
                i += 1;
                while i < chars.len() && chars[i].is_whitespace() {
                    i += 1;
                }
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if start == i {
                    return Err(Error::query(text, "expected a number after '~'"));
                }
                let digits: String = chars[start..i].iter().collect();
                let factor = digits
                    .parse::<u32>()
                    .map_err(|_| Error::query(text, format!("blur factor {digits} is too large")))?;
                tokens.push(Token::Blur(factor));
                continue;
            }
            _ => {
                let start = i;
                while i < chars.len() {
                    let c = chars[i];
                    if c.is_whitespace() || is_operator_char(c) {
                        break;
                    }
                    if c == '-' {
                        let inner = i > start
                            && chars[i - 1].is_alphanumeric()
                            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
                        if !inner {
                            break;
                        }
                    }
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if chars.get(i) == Some(&'*') {
                    i += 1;
                    tokens.push(Token::Prefix(word));
                } else {
                    tokens.push(Token::Word(word));
                }
                continue;
            }
        };
        tokens.push(token);
        i += 1;
    }
    Ok(tokens)
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::query(self.text, message)
    }

    fn or_expr(&mut self) -> Result<Query> {
        let mut left = self.and_expr()?;
        loop {
            match self.peek() {
                Some(Token::Or) => {
                    self.advance();
                }
                Some(token) if token.starts_primary() => {}
                _ => return Ok(left),
            }
            let right = self.and_expr()?;
            left = Query::or(left, right);
        }
    }

    fn and_expr(&mut self) -> Result<Query> {
        let mut left = self.not_expr()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.not_expr()?;
            left = Query::and(left, right);
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Query> {
        let mut left = self.blur_expr()?;
        while self.peek() == Some(&Token::AndNot) {
            self.advance();
            let right = self.blur_expr()?;
            left = Query::and_not(left, right);
        }
        Ok(left)
    }

    fn blur_expr(&mut self) -> Result<Query> {
        let mut left = self.primary()?;
        while let Some(&Token::Blur(factor)) = self.peek() {
            self.advance();
            // `a ~5 , b` reads as `a ~5 b`.
            if self.peek() == Some(&Token::And) {
                self.advance();
            }
            let right = self.primary()?;
            left = Query::blur(left, right, factor);
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<Query> {
        match self.advance() {
            // The lexer only produces valid words.
            Some(Token::Word(word)) => match self.peek() {
                Some(Token::Word(_)) if is_grammar_word(&word) => match self.advance() {
                    Some(Token::Word(target)) => Ok(Query::Grammar(target)),
                    _ => Err(self.error("expected a word after 'grammar'")),
                },
                _ => Ok(Query::Base(word)),
            },
            Some(Token::Prefix(prefix)) => Ok(Query::StartsWith(prefix)),
            Some(Token::Open) => {
                if self.depth == MAX_NESTING {
                    return Err(self.error("query nested too deeply"));
                }
                self.depth += 1;
                let inner = self.or_expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token::Close) => Ok(inner),
                    Some(token) => Err(self.error(format!("expected ')' but found {}", token.describe()))),
                    None => Err(self.error("missing ')'")),
                }
            }
            Some(token) => Err(self.error(format!("expected a word but found {}", token.describe()))),
            None => Err(self.error("query ends where a word was expected")),
        }
    }
}

fn is_grammar_word(word: &str) -> bool {
    GRAMMAR_WORDS.iter().any(|g| g.eq_ignore_ascii_case(word))
}
