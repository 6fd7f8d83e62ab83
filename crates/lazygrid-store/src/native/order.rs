//! Native ordering clauses.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Entity, Value};

/// One column of an ORDER BY clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderClause {
    /// Column path.
    pub column: String,
    /// Whether values are ordered largest first.
    #[serde(default)]
    pub descending: bool,
}

impl OrderClause {
    /// Ascending clause.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Descending clause.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// A store-native ORDER BY, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeSort {
    clauses: Vec<OrderClause>,
}

impl NativeSort {
    /// Creates an empty ordering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a clause, returning the extended ordering.
    pub fn then(mut self, clause: OrderClause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Appends a clause in place.
    pub fn push(&mut self, clause: OrderClause) {
        self.clauses.push(clause);
    }

    /// Returns the clauses in priority order.
    pub fn clauses(&self) -> &[OrderClause] {
        &self.clauses
    }

    /// Returns true if there are no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns true if some clause orders by `column`.
    pub fn orders_by(&self, column: &str) -> bool {
        self.clauses.iter().any(|c| c.column == column)
    }

    /// Compares two entities clause by clause.
    ///
    /// Absent values sort as null, which sorts before every other value.
    pub fn compare<E: Entity>(&self, a: &E, b: &E) -> Ordering {
        for clause in &self.clauses {
            let left = a.property(&clause.column).unwrap_or(Value::Null);
            let right = b.property(&clause.column).unwrap_or(Value::Null);
            let ordering = left.total_cmp(&right);
            let ordering = if clause.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl FromIterator<OrderClause> for NativeSort {
    fn from_iter<I: IntoIterator<Item = OrderClause>>(iter: I) -> Self {
        Self {
            clauses: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for NativeSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|c| {
                let direction = if c.descending { "DESC" } else { "ASC" };
                format!("{} {direction}", c.column)
            })
            .collect();
        f.write_str(&parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    #[test]
    fn test_compare_by_priority() {
        let sort = NativeSort::new()
            .then(OrderClause::asc("team"))
            .then(OrderClause::desc("score"));

        let a = Record::new("id", 1).with("team", "red").with("score", 5);
        let b = Record::new("id", 2).with("team", "red").with("score", 9);
        let c = Record::new("id", 3).with("team", "blue").with("score", 1);

        let mut rows = vec![a.clone(), b.clone(), c.clone()];
        rows.sort_by(|x, y| sort.compare(x, y));
        assert_eq!(rows, vec![c, b, a]);
    }

    #[test]
    fn test_absent_values_sort_first() {
        let sort = NativeSort::new().then(OrderClause::asc("score"));
        let with = Record::new("id", 1).with("score", 0);
        let without = Record::new("id", 2);
        assert_eq!(sort.compare(&without, &with), Ordering::Less);
    }

    #[test]
    fn test_display() {
        let sort: NativeSort = vec![OrderClause::asc("name"), OrderClause::desc("id")]
            .into_iter()
            .collect();
        assert_eq!(sort.to_string(), "name ASC, id DESC");
        assert!(sort.orders_by("id"));
        assert!(!sort.orders_by("age"));
    }
}
