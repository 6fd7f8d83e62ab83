//! Native boolean predicates over columns.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Value;

/// A store-native predicate.
///
/// Criteria use two-valued logic: a comparison against an absent or null
/// column is `false`, and [`Criterion::Not`] is the plain complement. An
/// empty [`Criterion::And`] is `true` and an empty [`Criterion::Or`] is
/// `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Matches every row.
    All,

    /// Matches no row.
    Nothing,

    /// Column equals the value.
    Eq {
        /// Column path.
        column: String,
        /// Value to compare with.
        value: Value,
    },

    /// Column is absent or null.
    IsNull {
        /// Column path.
        column: String,
    },

    /// Text column matches a `%`-wildcard pattern.
    Like {
        /// Column path.
        column: String,
        /// Pattern with `%` wildcards.
        pattern: String,
        /// Whether matching is case-sensitive.
        case_sensitive: bool,
    },

    /// Column lies within `lower..=upper`.
    Range {
        /// Column path.
        column: String,
        /// Inclusive lower bound.
        lower: Value,
        /// Inclusive upper bound.
        upper: Value,
    },

    /// Column equals one of the values.
    InList {
        /// Column path.
        column: String,
        /// Candidate values.
        values: Vec<Value>,
    },

    /// All criteria hold.
    And(Vec<Criterion>),

    /// At least one criterion holds.
    Or(Vec<Criterion>),

    /// The criterion does not hold.
    Not(Box<Criterion>),
}

impl Criterion {
    /// Creates an equality criterion.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Criterion::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Creates a negated criterion.
    pub fn negate(inner: Criterion) -> Self {
        Criterion::Not(Box::new(inner))
    }

    /// Returns every column path this criterion reads, in first-use order.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Criterion::All | Criterion::Nothing => {}
            Criterion::Eq { column, .. }
            | Criterion::IsNull { column }
            | Criterion::Like { column, .. }
            | Criterion::Range { column, .. }
            | Criterion::InList { column, .. } => {
                if !out.contains(&column.as_str()) {
                    out.push(column);
                }
            }
            Criterion::And(children) | Criterion::Or(children) => {
                for child in children {
                    child.collect_columns(out);
                }
            }
            Criterion::Not(inner) => inner.collect_columns(out),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::All => f.write_str("TRUE"),
            Criterion::Nothing => f.write_str("FALSE"),
            Criterion::Eq { column, value } => write!(f, "{column} = {}", Literal(value)),
            Criterion::IsNull { column } => write!(f, "{column} IS NULL"),
            Criterion::Like {
                column,
                pattern,
                case_sensitive,
            } => {
                let op = if *case_sensitive { "LIKE" } else { "ILIKE" };
                write!(f, "{column} {op} '{}'", pattern.replace('\'', "''"))
            }
            Criterion::Range {
                column,
                lower,
                upper,
            } => write!(
                f,
                "{column} BETWEEN {} AND {}",
                Literal(lower),
                Literal(upper)
            ),
            Criterion::InList { column, values } => {
                let list: Vec<String> = values.iter().map(|v| Literal(v).to_string()).collect();
                write!(f, "{column} IN ({})", list.join(", "))
            }
            Criterion::And(children) => write_joined(f, children, " AND ", "TRUE"),
            Criterion::Or(children) => write_joined(f, children, " OR ", "FALSE"),
            Criterion::Not(inner) => write!(f, "NOT ({inner})"),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    children: &[Criterion],
    separator: &str,
    empty: &str,
) -> fmt::Result {
    if children.is_empty() {
        return f.write_str(empty);
    }
    let parts: Vec<String> = children.iter().map(|c| format!("({c})")).collect();
    f.write_str(&parts.join(separator))
}

/// Renders a value as a quoted literal.
struct Literal<'a>(&'a Value);

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Null => f.write_str("NULL"),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => write!(f, "{}", self.0),
            other => write!(f, "'{}'", other.to_string().replace('\'', "''")),
        }
    }
}
