//! Lexer (tokenizer) for filter expressions.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::error::FilterError;

/// Error encountered during lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    /// A character that cannot start any token.
    UnexpectedCharacter {
        /// The character that could not be tokenized.
        character: char,
        /// The position (0-indexed byte offset) where the error occurred.
        position: usize,
    },

    /// A quoted string without its closing quote.
    UnterminatedString {
        /// Byte offset of the opening quote.
        position: usize,
    },
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnexpectedCharacter {
                character,
                position,
            } => write!(
                f,
                "unexpected character '{character}' at position {position}"
            ),
            LexerError::UnterminatedString { position } => {
                write!(f, "unterminated string starting at position {position}")
            }
        }
    }
}

impl std::error::Error for LexerError {}

impl From<LexerError> for FilterError {
    fn from(error: LexerError) -> Self {
        match error {
            LexerError::UnexpectedCharacter {
                character,
                position,
            } => FilterError::unexpected_token(character.to_string(), position),
            LexerError::UnterminatedString { .. } => FilterError::invalid_literal(error.to_string()),
        }
    }
}

/// Result of tokenizing a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// The tokens successfully parsed, with their positions.
    pub tokens: Vec<PositionedToken>,
    /// Any errors encountered.
    pub errors: Vec<LexerError>,
}

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken {
    /// The token.
    pub token: FilterToken,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

/// A token in a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterToken {
    // ==================== Words and Literals ====================
    /// A bare word: a property path or a keyword such as `like`.
    Word(String),

    /// A quoted string literal, with escapes resolved.
    Text(String),

    /// An unquoted literal starting with a digit or sign: a number, a date
    /// or a timestamp. Interpreted by the parser.
    Number(String),

    // ==================== Operators ====================
    /// The equality operator (`=`).
    Equals,

    /// The AND operator (`&`).
    And,

    /// The OR operator (`|`).
    Or,

    /// The NOT operator (`!`).
    Not,

    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,

    /// List separator `,`.
    Comma,
}

impl FilterToken {
    /// Returns true if this is a word equal to `keyword`, ignoring case.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, FilterToken::Word(word) if word.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for FilterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterToken::Word(word) => f.write_str(word),
            FilterToken::Text(text) => write!(f, "'{text}'"),
            FilterToken::Number(raw) => f.write_str(raw),
            FilterToken::Equals => f.write_str("="),
            FilterToken::And => f.write_str("&"),
            FilterToken::Or => f.write_str("|"),
            FilterToken::Not => f.write_str("!"),
            FilterToken::OpenParen => f.write_str("("),
            FilterToken::CloseParen => f.write_str(")"),
            FilterToken::Comma => f.write_str(","),
        }
    }
}

/// Lexer for tokenizing filter expressions.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current byte position in the input string.
    position: usize,
    /// Errors encountered during tokenization.
    errors: Vec<LexerError>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
            errors: Vec::new(),
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            self.position += ch.len_utf8();
        }
        c
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.next_char();
        }
    }

    /// Consumes characters while `accept` holds.
    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(&c) = self.peek() {
            if !accept(c) {
                break;
            }
            out.push(c);
            self.next_char();
        }
        out
    }

    /// Reads a quoted string (single or double quotes).
    ///
    /// Returns `None` if the closing quote is missing.
    fn read_quoted_string(&mut self, quote_char: char) -> Option<String> {
        // Consume the opening quote
        self.next_char();

        let mut result = String::new();
        while let Some(c) = self.next_char() {
            if c == quote_char {
                return Some(result);
            }
            if c == '\\' {
                if let Some(escaped) = self.next_char() {
                    result.push(escaped);
                }
            } else {
                result.push(c);
            }
        }
        None
    }

    /// Returns the next token with its position, or None if at end of input.
    pub fn next_token(&mut self) -> Option<PositionedToken> {
        loop {
            self.skip_whitespace();

            let c = *self.peek()?;
            let position = self.position;

            let token = match c {
                '=' => self.single(FilterToken::Equals),
                '&' => self.single(FilterToken::And),
                '|' => self.single(FilterToken::Or),
                '!' => self.single(FilterToken::Not),
                '(' => self.single(FilterToken::OpenParen),
                ')' => self.single(FilterToken::CloseParen),
                ',' => self.single(FilterToken::Comma),

                '"' | '\'' => match self.read_quoted_string(c) {
                    Some(text) => FilterToken::Text(text),
                    None => {
                        self.errors.push(LexerError::UnterminatedString { position });
                        return None;
                    }
                },

                _ if c.is_ascii_digit() || c == '-' || c == '+' => {
                    FilterToken::Number(self.read_while(is_literal_char))
                }

                _ if c.is_alphabetic() || c == '_' => {
                    FilterToken::Word(self.read_while(|c| c.is_alphanumeric() || c == '_' || c == '.'))
                }

                // Unknown character - record error and continue
                _ => {
                    self.next_char();
                    self.errors.push(LexerError::UnexpectedCharacter {
                        character: c,
                        position,
                    });
                    continue;
                }
            };

            return Some(PositionedToken { token, position });
        }
    }

    fn single(&mut self, token: FilterToken) -> FilterToken {
        self.next_char();
        token
    }

    /// Collects all tokens into a vector (without positions).
    #[cfg(test)]
    pub fn tokenize(self) -> Vec<FilterToken> {
        self.tokenize_with_errors()
            .tokens
            .into_iter()
            .map(|pt| pt.token)
            .collect()
    }

    /// Collects all tokens and any errors encountered.
    ///
    /// Returns a [`LexerResult`] containing both the successfully parsed tokens
    /// (with positions) and any errors.
    pub fn tokenize_with_errors(mut self) -> LexerResult {
        let mut tokens = Vec::new();
        while let Some(positioned_token) = self.next_token() {
            tokens.push(positioned_token);
        }
        LexerResult {
            tokens,
            errors: self.errors,
        }
    }
}

/// Characters that may appear in an unquoted numeric, date or timestamp
/// literal (`-12`, `2.5e3`, `2024-03-05`, `2024-03-05T10:30:00Z`).
fn is_literal_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> FilterToken {
        FilterToken::Word(s.to_string())
    }

    fn number(s: &str) -> FilterToken {
        FilterToken::Number(s.to_string())
    }

    #[test]
    fn test_tokenize_comparison() {
        let tokens = Lexer::new("age = 30").tokenize();
        assert_eq!(tokens, vec![word("age"), FilterToken::Equals, number("30")]);
    }

    #[test]
    fn test_tokenize_without_spaces() {
        let tokens = Lexer::new("age=30&name='Joe'").tokenize();
        assert_eq!(
            tokens,
            vec![
                word("age"),
                FilterToken::Equals,
                number("30"),
                FilterToken::And,
                word("name"),
                FilterToken::Equals,
                FilterToken::Text("Joe".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_dotted_path() {
        let tokens = Lexer::new("address.city").tokenize();
        assert_eq!(tokens, vec![word("address.city")]);
    }

    #[test]
    fn test_tokenize_quoted_strings() {
        assert_eq!(
            Lexer::new(r#""a b""#).tokenize(),
            vec![FilterToken::Text("a b".to_string())]
        );
        assert_eq!(
            Lexer::new(r"'it\'s'").tokenize(),
            vec![FilterToken::Text("it's".to_string())]
        );
    }

    #[test]
    fn test_tokenize_literals() {
        let tokens = Lexer::new("-12 2.5 2024-03-05 2024-03-05T10:30:00Z").tokenize();
        assert_eq!(
            tokens,
            vec![
                number("-12"),
                number("2.5"),
                number("2024-03-05"),
                number("2024-03-05T10:30:00Z"),
            ]
        );
    }

    #[test]
    fn test_tokenize_operators() {
        let tokens = Lexer::new("! ( ) , | &").tokenize();
        assert_eq!(
            tokens,
            vec![
                FilterToken::Not,
                FilterToken::OpenParen,
                FilterToken::CloseParen,
                FilterToken::Comma,
                FilterToken::Or,
                FilterToken::And,
            ]
        );
    }

    #[test]
    fn test_tokenize_in_list() {
        let tokens = Lexer::new("id in (1,2)").tokenize();
        assert_eq!(
            tokens,
            vec![
                word("id"),
                word("in"),
                FilterToken::OpenParen,
                number("1"),
                FilterToken::Comma,
                number("2"),
                FilterToken::CloseParen,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let result = Lexer::new("a = 'x'").tokenize_with_errors();
        let positions: Vec<usize> = result.tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 2, 4]);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_unknown_character_is_recorded() {
        let result = Lexer::new("a = 1 $ b").tokenize_with_errors();
        assert_eq!(
            result.errors,
            vec![LexerError::UnexpectedCharacter {
                character: '$',
                position: 6
            }]
        );
        assert_eq!(result.tokens.len(), 4);
    }

    #[test]
    fn test_unterminated_string() {
        let result = Lexer::new("name = 'Joe").tokenize_with_errors();
        assert_eq!(
            result.errors,
            vec![LexerError::UnterminatedString { position: 7 }]
        );
    }

    #[test]
    fn test_is_keyword_ignores_case() {
        assert!(word("LIKE").is_keyword("like"));
        assert!(!FilterToken::Text("like".to_string()).is_keyword("like"));
    }

    #[test]
    fn test_lexer_error_into_filter_error() {
        let error: FilterError = LexerError::UnexpectedCharacter {
            character: '#',
            position: 3,
        }
        .into();
        assert_eq!(error, FilterError::unexpected_token("#", 3));
    }
}
