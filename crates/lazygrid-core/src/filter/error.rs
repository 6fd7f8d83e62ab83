//! Error types for filter parsing, evaluation and conversion.

use thiserror::Error;

/// A specialized Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while parsing, evaluating or converting a filter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// A property path is not known to the entity metadata.
    #[error("unknown property '{path}'{}", did_you_mean(.suggestion))]
    PropertyResolution {
        /// The path that failed to resolve.
        path: String,
        /// The closest known property name, if any is close enough.
        suggestion: Option<String>,
    },

    /// The predicate cannot be expressed as a native store query.
    #[error("unsupported predicate: {reason}")]
    UnsupportedPredicate {
        /// Why the predicate was rejected.
        reason: String,
    },

    /// The filter expression is empty.
    #[error("filter expression is empty")]
    EmptyExpression,

    /// An unexpected token was encountered during parsing.
    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The unexpected token that was encountered.
        token: String,
        /// Byte offset of the token in the input.
        position: usize,
    },

    /// An unexpected end of input was encountered.
    #[error("unexpected end of expression")]
    UnexpectedEndOfInput,

    /// An unclosed parenthesis was found.
    #[error("unclosed parenthesis")]
    UnclosedParenthesis,

    /// A literal could not be parsed.
    #[error("invalid literal: {literal}")]
    InvalidLiteral {
        /// The offending literal text.
        literal: String,
    },
}

impl FilterError {
    /// Creates a property resolution error.
    pub fn property_resolution(path: impl Into<String>, suggestion: Option<String>) -> Self {
        FilterError::PropertyResolution {
            path: path.into(),
            suggestion,
        }
    }

    /// Creates an unsupported predicate error.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        FilterError::UnsupportedPredicate {
            reason: reason.into(),
        }
    }

    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>, position: usize) -> Self {
        FilterError::UnexpectedToken {
            token: token.into(),
            position,
        }
    }

    /// Creates an invalid literal error.
    pub fn invalid_literal(literal: impl Into<String>) -> Self {
        FilterError::InvalidLiteral {
            literal: literal.into(),
        }
    }

    /// Returns true for errors raised by the expression parser.
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            FilterError::EmptyExpression
                | FilterError::UnexpectedToken { .. }
                | FilterError::UnexpectedEndOfInput
                | FilterError::UnclosedParenthesis
                | FilterError::InvalidLiteral { .. }
        )
    }
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(". Did you mean '{name}'?"),
        None => String::new(),
    }
}
