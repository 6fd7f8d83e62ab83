//! Abstract Syntax Tree (AST) for filter predicates.

use lazygrid_store::{Entity, EntityMetadata, Value};
use serde::{Deserialize, Serialize};

use super::error::FilterResult;
use super::evaluator::FilterEvaluator;

/// A filter predicate over entity properties.
///
/// `Predicate` is a closed sum type: leaves compare one property path with
/// literal values and compound nodes combine other predicates. Nodes are
/// never mutated after construction; the combinators build new nodes.
///
/// Equality and hashing are structural, so predicates can be used as cache
/// keys, and they serialize with serde for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    // ==================== Leaf Predicates ====================
    /// Matches when the property value equals `value`.
    ///
    /// An absent or null property only equals [`Value::Null`].
    Equals {
        /// Property path.
        property: String,
        /// Literal to compare with.
        value: Value,
    },

    /// Matches when a text property matches a `%`-wildcard pattern.
    ///
    /// `%` matches zero or more characters and the whole value must match.
    Like {
        /// Property path.
        property: String,
        /// Pattern with `%` wildcards.
        pattern: String,
        /// Whether matching is case-sensitive.
        case_sensitive: bool,
    },

    /// Matches when `lower <= value <= upper`.
    Between {
        /// Property path.
        property: String,
        /// Inclusive lower bound.
        lower: Value,
        /// Inclusive upper bound.
        upper: Value,
    },

    /// Matches when the property value equals one of `values`.
    ///
    /// With an empty `values` list the result is `empty_values_is_pass`.
    In {
        /// Property path.
        property: String,
        /// Candidate values.
        values: Vec<Value>,
        /// Result when `values` is empty.
        #[serde(default)]
        empty_values_is_pass: bool,
    },

    // ==================== Boolean Operators ====================
    /// Logical AND of two predicates.
    And(Box<Predicate>, Box<Predicate>),

    /// Logical OR of two predicates.
    Or(Box<Predicate>, Box<Predicate>),

    /// Logical NOT of a predicate.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Creates an equality predicate.
    pub fn equals(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Equals {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Creates a LIKE predicate.
    ///
    /// # Example
    ///
    /// ```
    /// use lazygrid_core::filter::Predicate;
    ///
    /// let filter = Predicate::like("name", "%oe%", false);
    /// assert!(matches!(filter, Predicate::Like { case_sensitive: false, .. }));
    /// ```
    pub fn like(property: impl Into<String>, pattern: impl Into<String>, case_sensitive: bool) -> Self {
        Predicate::Like {
            property: property.into(),
            pattern: pattern.into(),
            case_sensitive,
        }
    }

    /// Creates an inclusive range predicate.
    pub fn between(
        property: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        Predicate::Between {
            property: property.into(),
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    /// Creates a set membership predicate.
    pub fn in_values(
        property: impl Into<String>,
        values: impl IntoIterator<Item = Value>,
        empty_values_is_pass: bool,
    ) -> Self {
        Predicate::In {
            property: property.into(),
            values: values.into_iter().collect(),
            empty_values_is_pass,
        }
    }

    /// Creates an AND predicate from two predicates.
    ///
    /// # Example
    ///
    /// ```
    /// use lazygrid_core::filter::Predicate;
    ///
    /// let filter = Predicate::and(
    ///     Predicate::equals("status", "open"),
    ///     Predicate::between("age", 18, 65),
    /// );
    /// assert!(matches!(filter, Predicate::And(_, _)));
    /// ```
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Predicate::And(Box::new(left), Box::new(right))
    }

    /// Creates an OR predicate from two predicates.
    pub fn or(left: Predicate, right: Predicate) -> Self {
        Predicate::Or(Box::new(left), Box::new(right))
    }

    /// Creates a NOT predicate from another predicate.
    ///
    /// # Example
    ///
    /// ```
    /// use lazygrid_core::filter::Predicate;
    ///
    /// let filter = Predicate::negate(Predicate::equals("archived", true));
    /// assert!(matches!(filter, Predicate::Not(_)));
    /// ```
    pub fn negate(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Returns every property path referenced, in first-use order.
    pub fn properties(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Predicate::Equals { property, .. }
                | Predicate::Like { property, .. }
                | Predicate::Between { property, .. }
                | Predicate::In { property, .. } => {
                    if !paths.contains(&property.as_str()) {
                        paths.push(property);
                    }
                }
                Predicate::And(left, right) | Predicate::Or(left, right) => {
                    pending.push(right);
                    pending.push(left);
                }
                Predicate::Not(inner) => pending.push(inner),
            }
        }
        paths
    }

    /// Evaluates this predicate against one entity.
    ///
    /// Shorthand for building a [`FilterEvaluator`] and calling
    /// [`FilterEvaluator::matches`].
    ///
    /// # Errors
    ///
    /// Returns `FilterError::PropertyResolution` if an evaluated branch
    /// references a path `metadata` does not know.
    pub fn evaluate<E, M>(&self, entity: &E, metadata: &M) -> FilterResult<bool>
    where
        E: Entity,
        M: EntityMetadata + ?Sized,
    {
        FilterEvaluator::new(self, metadata).matches(entity)
    }
}

impl Drop for Predicate {
    /// Tears compound trees down with a worklist, so dropping a deeply
    /// nested predicate does not recurse once per level.
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_compound_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_compound_children(&mut pending);
        }
    }
}

impl Predicate {
    /// Moves compound children into `out`, leaving empty leaves behind.
    fn detach_compound_children(&mut self, out: &mut Vec<Predicate>) {
        let mut detach = |child: &mut Predicate| {
            if matches!(child, Predicate::And(..) | Predicate::Or(..) | Predicate::Not(_)) {
                out.push(std::mem::replace(
                    child,
                    Predicate::In {
                        property: String::new(),
                        values: Vec::new(),
                        empty_values_is_pass: false,
                    },
                ));
            }
        };
        match self {
            Predicate::And(left, right) | Predicate::Or(left, right) => {
                detach(left.as_mut());
                detach(right.as_mut());
            }
            Predicate::Not(inner) => detach(inner.as_mut()),
            _ => {}
        }
    }
}
