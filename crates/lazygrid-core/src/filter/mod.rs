//! Predicate AST, evaluation, native conversion and textual filter syntax.
//!
//! This module provides a composable [`Predicate`] tree that can be
//! evaluated against in-memory entities with [`FilterEvaluator`] or
//! translated into a store's native [`Criterion`](lazygrid_store::Criterion)
//! with [`FilterConverter`]. Both resolve property paths through
//! [`EntityMetadata`](lazygrid_store::EntityMetadata) first.
//!
//! # Supported Syntax
//!
//! [`FilterParser`] builds predicates from text:
//!
//! ## Comparisons
//! - `path = literal` - Equality (`name = null` matches absent values)
//! - `path like 'pattern'` - Case-sensitive `%`-wildcard match
//! - `path ilike 'pattern'` - Case-insensitive `%`-wildcard match
//! - `path between low and high` - Inclusive range
//! - `path in (a, b, ...)` - Set membership; `in ()` matches nothing
//!
//! ## Literals
//! - `'text'` or `"text"`, integers, floats, `true`, `false`, `null`
//! - `2024-03-05` dates and `2024-03-05T10:30:00Z` timestamps
//!
//! ## Boolean Operators
//! - `&` - AND
//! - `|` - OR
//! - `!` - NOT
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use lazygrid_core::filter::{FilterConverter, FilterParser, Predicate};
//! use lazygrid_store::{Criterion, Schema, ValueType};
//!
//! let schema = Schema::new("id", ValueType::Int)
//!     .with_property("name", ValueType::Text)
//!     .with_property("age", ValueType::Int);
//!
//! // Parse a filter expression
//! let filter = FilterParser::parse("name ilike 'jo%' & !(age = 30)").unwrap();
//! assert!(matches!(filter, Predicate::And(_, _)));
//!
//! // Convert it for the store
//! let criterion = FilterConverter::new(&schema).convert(&filter).unwrap();
//! assert!(matches!(criterion, Criterion::And(_)));
//! ```

mod ast;
mod converter;
mod error;
mod evaluator;
mod lexer;
mod parser;
mod resolve;

pub use ast::Predicate;
pub use converter::FilterConverter;
pub use error::{FilterError, FilterResult};
pub use evaluator::FilterEvaluator;
pub use lazygrid_store::LikePattern;
pub use lexer::{FilterToken, Lexer, LexerError, LexerResult, PositionedToken};
pub use parser::FilterParser;

pub(crate) use resolve::resolve_property;
