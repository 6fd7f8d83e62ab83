//! Recursive descent parser for filter expressions.

use chrono::{DateTime, NaiveDate, Utc};
use lazygrid_store::Value;

use super::ast::Predicate;
use super::error::{FilterError, FilterResult};
use super::lexer::{FilterToken, Lexer, PositionedToken};

/// Parser for textual filter expressions.
///
/// This parser implements a recursive descent parser for the filter grammar.
/// Keywords are case-insensitive; property paths are taken verbatim.
///
/// # Grammar
///
/// ```text
/// expression ::= or_expr
/// or_expr    ::= and_expr ("|" and_expr)*
/// and_expr   ::= unary_expr ("&" unary_expr)*
/// unary_expr ::= "!" unary_expr | primary
/// primary    ::= "(" expression ")" | comparison
/// comparison ::= path "=" literal
///              | path "like" string | path "ilike" string
///              | path "between" literal "and" literal
///              | path "in" "(" [literal ("," literal)*] ")"
/// literal    ::= string | integer | float | YYYY-MM-DD | RFC 3339
///              | "true" | "false" | "null"
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `!` (NOT) - unary
/// 2. `&` (AND) - binary, left-associative
/// 3. `|` (OR) - binary, left-associative
///
/// `like` is case-sensitive and `ilike` is not. An empty `in ()` rejects
/// everything.
///
/// # Example
///
/// ```
/// use lazygrid_core::filter::{FilterParser, Predicate};
///
/// let filter = FilterParser::parse("name ilike '%oe%' & age between 18 and 65").unwrap();
/// assert!(matches!(filter, Predicate::And(_, _)));
///
/// let filter = FilterParser::parse("status in ('open', 'blocked')").unwrap();
/// assert!(matches!(filter, Predicate::In { .. }));
/// ```
pub struct FilterParser {
    tokens: Vec<PositionedToken>,
    position: usize,
}

impl FilterParser {
    /// Parses a filter expression string into a Predicate AST.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::EmptyExpression` if the input is empty or contains
    /// no valid tokens.
    ///
    /// Returns `FilterError::UnexpectedToken` if an unexpected token or
    /// character is encountered.
    ///
    /// Returns `FilterError::UnclosedParenthesis` if parentheses are not balanced.
    ///
    /// Returns `FilterError::InvalidLiteral` for malformed literals.
    pub fn parse(input: &str) -> FilterResult<Predicate> {
        if input.trim().is_empty() {
            return Err(FilterError::EmptyExpression);
        }

        let result = Lexer::new(input).tokenize_with_errors();
        if let Some(error) = result.errors.into_iter().next() {
            return Err(error.into());
        }
        if result.tokens.is_empty() {
            return Err(FilterError::EmptyExpression);
        }

        let mut parser = Self {
            tokens: result.tokens,
            position: 0,
        };
        let predicate = parser.parse_expression()?;

        // Check that we consumed all tokens
        if let Some(remaining) = parser.peek_positioned() {
            return Err(FilterError::unexpected_token(
                remaining.token.to_string(),
                remaining.position,
            ));
        }

        Ok(predicate)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&FilterToken> {
        self.peek_positioned().map(|pt| &pt.token)
    }

    fn peek_positioned(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<PositionedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Consumes the current token, failing at end of input.
    fn expect_any(&mut self) -> FilterResult<PositionedToken> {
        self.advance().ok_or(FilterError::UnexpectedEndOfInput)
    }

    /// Checks if the current token matches the expected token type.
    fn check(&self, expected: &FilterToken) -> bool {
        self.peek() == Some(expected)
    }

    /// Parses the top-level expression (OR expression).
    fn parse_expression(&mut self) -> FilterResult<Predicate> {
        self.parse_or_expr()
    }

    /// Parses OR expressions: `and_expr ("|" and_expr)*`
    fn parse_or_expr(&mut self) -> FilterResult<Predicate> {
        let mut left = self.parse_and_expr()?;

        while self.check(&FilterToken::Or) {
            self.advance(); // consume '|'
            let right = self.parse_and_expr()?;
            left = Predicate::or(left, right);
        }

        Ok(left)
    }

    /// Parses AND expressions: `unary_expr ("&" unary_expr)*`
    fn parse_and_expr(&mut self) -> FilterResult<Predicate> {
        let mut left = self.parse_unary_expr()?;

        while self.check(&FilterToken::And) {
            self.advance(); // consume '&'
            let right = self.parse_unary_expr()?;
            left = Predicate::and(left, right);
        }

        Ok(left)
    }

    /// Parses unary expressions: `"!" unary_expr | primary`
    fn parse_unary_expr(&mut self) -> FilterResult<Predicate> {
        let mut negations = 0usize;
        while self.check(&FilterToken::Not) {
            self.advance(); // consume '!'
            negations += 1;
        }

        let mut predicate = self.parse_primary()?;
        for _ in 0..negations {
            predicate = Predicate::negate(predicate);
        }
        Ok(predicate)
    }

    /// Parses primary expressions: `"(" expression ")" | comparison`
    fn parse_primary(&mut self) -> FilterResult<Predicate> {
        let PositionedToken { token, position } = self.expect_any()?;

        match token {
            FilterToken::OpenParen => {
                let inner = self.parse_expression()?;
                if !self.check(&FilterToken::CloseParen) {
                    return Err(FilterError::UnclosedParenthesis);
                }
                self.advance(); // consume ')'
                Ok(inner)
            }
            FilterToken::Word(path) => self.parse_comparison(path),
            other => Err(FilterError::unexpected_token(other.to_string(), position)),
        }
    }

    /// Parses the operator and operands following a property path.
    fn parse_comparison(&mut self, property: String) -> FilterResult<Predicate> {
        let PositionedToken { token, position } = self.expect_any()?;

        if token == FilterToken::Equals {
            let value = self.parse_literal()?;
            return Ok(Predicate::Equals { property, value });
        }

        if token.is_keyword("like") || token.is_keyword("ilike") {
            let case_sensitive = token.is_keyword("like");
            let pattern = self.parse_pattern()?;
            return Ok(Predicate::Like {
                property,
                pattern,
                case_sensitive,
            });
        }

        if token.is_keyword("between") {
            let lower = self.parse_literal()?;
            self.expect_keyword("and")?;
            let upper = self.parse_literal()?;
            return Ok(Predicate::Between {
                property,
                lower,
                upper,
            });
        }

        if token.is_keyword("in") {
            let values = self.parse_list()?;
            return Ok(Predicate::In {
                property,
                values,
                empty_values_is_pass: false,
            });
        }

        Err(FilterError::unexpected_token(token.to_string(), position))
    }

    fn expect_keyword(&mut self, keyword: &str) -> FilterResult<()> {
        let PositionedToken { token, position } = self.expect_any()?;
        if token.is_keyword(keyword) {
            Ok(())
        } else {
            Err(FilterError::unexpected_token(token.to_string(), position))
        }
    }

    /// Parses `"(" [literal ("," literal)*] ")"`.
    fn parse_list(&mut self) -> FilterResult<Vec<Value>> {
        let PositionedToken { token, position } = self.expect_any()?;
        if token != FilterToken::OpenParen {
            return Err(FilterError::unexpected_token(token.to_string(), position));
        }

        let mut values = Vec::new();
        if self.check(&FilterToken::CloseParen) {
            self.advance();
            return Ok(values);
        }

        loop {
            values.push(self.parse_literal()?);
            match self.advance() {
                Some(PositionedToken {
                    token: FilterToken::Comma,
                    ..
                }) => continue,
                Some(PositionedToken {
                    token: FilterToken::CloseParen,
                    ..
                }) => return Ok(values),
                Some(PositionedToken { token, position }) => {
                    return Err(FilterError::unexpected_token(token.to_string(), position))
                }
                None => return Err(FilterError::UnclosedParenthesis),
            }
        }
    }

    /// Parses a LIKE pattern, which must be a quoted string.
    fn parse_pattern(&mut self) -> FilterResult<String> {
        match self.expect_any()? {
            PositionedToken {
                token: FilterToken::Text(pattern),
                ..
            } => Ok(pattern),
            PositionedToken { token, position } => {
                Err(FilterError::unexpected_token(token.to_string(), position))
            }
        }
    }

    /// Parses a literal value.
    fn parse_literal(&mut self) -> FilterResult<Value> {
        let Some(PositionedToken { token, position }) = self.advance() else {
            return Err(FilterError::UnexpectedEndOfInput);
        };

        match token {
            FilterToken::Text(text) => Ok(Value::Text(text)),
            FilterToken::Number(raw) => parse_unquoted_literal(&raw),
            FilterToken::Word(word) => match word.to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" => Ok(Value::Null),
                _ => Err(FilterError::invalid_literal(word)),
            },
            other => Err(FilterError::unexpected_token(other.to_string(), position)),
        }
    }
}

/// Interprets an unquoted literal as an integer, float, date or timestamp.
fn parse_unquoted_literal(raw: &str) -> FilterResult<Value> {
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(Value::Int(int));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Value::Date(date));
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Value::Timestamp(timestamp.with_timezone(&Utc)));
    }
    match raw.parse::<f64>() {
        Ok(float) if float.is_finite() => Ok(Value::Float(float)),
        _ => Err(FilterError::invalid_literal(raw)),
    }
}
