//! Filter evaluation against in-memory entities.
//!
//! This module provides the [`FilterEvaluator`] for evaluating predicates
//! against any [`Entity`], resolving property paths through
//! [`EntityMetadata`].
//!
//! # Example
//!
//! ```
//! use lazygrid_core::filter::{FilterEvaluator, Predicate};
//! use lazygrid_store::{Record, Schema, ValueType};
//!
//! let schema = Schema::new("id", ValueType::Int).with_property("age", ValueType::Int);
//! let filter = Predicate::between("age", 10, 20);
//!
//! let evaluator = FilterEvaluator::new(&filter, &schema);
//! assert!(evaluator.matches(&Record::new("id", 1).with("age", 15)).unwrap());
//! assert!(!evaluator.matches(&Record::new("id", 2).with("age", 21)).unwrap());
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use lazygrid_store::{Entity, EntityMetadata, LikePattern, Value};

use super::ast::Predicate;
use super::error::{FilterError, FilterResult};
use super::resolve::resolve_property;

/// Evaluates a predicate against entities.
///
/// Construction never fails. Property paths are resolved when a node is
/// evaluated, before the entity is consulted, so branches skipped by
/// short-circuiting are never resolved. LIKE patterns are compiled on first
/// use and reused for every later entity.
pub struct FilterEvaluator<'a, M: ?Sized> {
    predicate: &'a Predicate,
    metadata: &'a M,
    patterns: RefCell<HashMap<(&'a str, bool), LikePattern>>,
}

impl<'a, M> FilterEvaluator<'a, M>
where
    M: EntityMetadata + ?Sized,
{
    /// Creates a new filter evaluator.
    ///
    /// # Arguments
    ///
    /// * `predicate` - The predicate to evaluate
    /// * `metadata` - Metadata used to resolve property paths
    pub fn new(predicate: &'a Predicate, metadata: &'a M) -> Self {
        Self {
            predicate,
            metadata,
            patterns: RefCell::new(HashMap::new()),
        }
    }

    /// Returns true if the entity matches the predicate.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::PropertyResolution` if an evaluated node
    /// references an unknown property path.
    pub fn matches<E: Entity>(&self, entity: &E) -> FilterResult<bool> {
        self.evaluate(self.predicate, entity)
    }

    /// Filters a slice of entities, returning only those that match.
    ///
    /// # Errors
    ///
    /// Fails on the first entity whose evaluation fails.
    pub fn filter_entities<'b, E: Entity>(&self, entities: &'b [E]) -> FilterResult<Vec<&'b E>> {
        let mut matching = Vec::new();
        for entity in entities {
            if self.matches(entity)? {
                matching.push(entity);
            }
        }
        Ok(matching)
    }

    /// Evaluates a predicate tree against an entity.
    ///
    /// Walks the tree with an explicit stack so nesting depth costs heap,
    /// not call frames. The right operand of AND/OR is only scheduled once
    /// the left result is known.
    fn evaluate<E: Entity>(&self, root: &'a Predicate, entity: &E) -> FilterResult<bool> {
        let mut stack = vec![Step::Visit(root)];
        let mut last = false;

        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Visit(node) => node,
                Step::AndRight(right) => {
                    if last {
                        stack.push(Step::Visit(right));
                    }
                    continue;
                }
                Step::OrRight(right) => {
                    if !last {
                        stack.push(Step::Visit(right));
                    }
                    continue;
                }
                Step::Negate => {
                    last = !last;
                    continue;
                }
            };

            last = match node {
                Predicate::Equals { property, value } => {
                    self.value_of(entity, property)?.loosely_eq(value)
                }

                Predicate::Like {
                    property,
                    pattern,
                    case_sensitive,
                } => match self.value_of(entity, property)?.as_text() {
                    Some(text) => self.like_matches(pattern, *case_sensitive, text)?,
                    None => false,
                },

                Predicate::Between {
                    property,
                    lower,
                    upper,
                } => {
                    let actual = self.value_of(entity, property)?;
                    actual.compare(lower).is_some_and(|o| o.is_ge())
                        && actual.compare(upper).is_some_and(|o| o.is_le())
                }

                Predicate::In {
                    property,
                    values,
                    empty_values_is_pass,
                } => {
                    let actual = self.value_of(entity, property)?;
                    if values.is_empty() {
                        *empty_values_is_pass
                    } else {
                        values.iter().any(|candidate| actual.loosely_eq(candidate))
                    }
                }

                // Boolean operators
                Predicate::And(left, right) => {
                    stack.push(Step::AndRight(right));
                    stack.push(Step::Visit(left));
                    continue;
                }
                Predicate::Or(left, right) => {
                    stack.push(Step::OrRight(right));
                    stack.push(Step::Visit(left));
                    continue;
                }
                Predicate::Not(inner) => {
                    stack.push(Step::Negate);
                    stack.push(Step::Visit(inner));
                    continue;
                }
            };
        }

        Ok(last)
    }

    /// Resolves `path` and reads it from the entity; absent values read as null.
    fn value_of<E: Entity>(&self, entity: &E, path: &str) -> FilterResult<Value> {
        resolve_property(self.metadata, path)?;
        Ok(entity.property(path).unwrap_or(Value::Null))
    }

    fn like_matches(&self, pattern: &'a str, case_sensitive: bool, text: &str) -> FilterResult<bool> {
        let mut patterns = self.patterns.borrow_mut();
        if let Some(compiled) = patterns.get(&(pattern, case_sensitive)) {
            return Ok(compiled.is_match(text));
        }

        let compiled = LikePattern::new(pattern, case_sensitive).map_err(|e| {
            FilterError::unsupported(format!("LIKE pattern '{pattern}' is too large: {e}"))
        })?;
        let is_match = compiled.is_match(text);
        patterns.insert((pattern, case_sensitive), compiled);
        Ok(is_match)
    }
}

impl<M: ?Sized> std::fmt::Debug for FilterEvaluator<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterEvaluator")
            .field("predicate", self.predicate)
            .finish_non_exhaustive()
    }
}

/// Pending work for [`FilterEvaluator::evaluate`].
enum Step<'a> {
    Visit(&'a Predicate),
    /// Visit the right operand of an AND if the left one held.
    AndRight(&'a Predicate),
    /// Visit the right operand of an OR if the left one failed.
    OrRight(&'a Predicate),
    Negate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazygrid_store::{Record, Schema, ValueType};

    // ==================== Test Helpers ====================

    fn schema() -> Schema {
        Schema::new("id", ValueType::Int)
            .with_property("name", ValueType::Text)
            .with_property("age", ValueType::Int)
            .with_property("score", ValueType::Float)
            .with_property("address.city", ValueType::Text)
    }

    fn person(id: i64, name: &str, age: i64) -> Record {
        Record::new("id", id).with("name", name).with("age", age)
    }

    fn eval(predicate: &Predicate, record: &Record) -> bool {
        predicate.evaluate(record, &schema()).unwrap()
    }

    // ==================== Equals Tests ====================

    #[test]
    fn test_equals_matches_same_value() {
        let filter = Predicate::equals("name", "Joe");
        assert!(eval(&filter, &person(1, "Joe", 30)));
        assert!(!eval(&filter, &person(2, "Ann", 30)));
    }

    #[test]
    fn test_equals_widens_numbers() {
        let record = Record::new("id", 1).with("score", 2.0);
        assert!(eval(&Predicate::equals("score", 2), &record));
    }

    #[test]
    fn test_equals_absent_never_matches_non_null() {
        let record = Record::new("id", 1);
        assert!(!eval(&Predicate::equals("name", "Joe"), &record));
    }

    #[test]
    fn test_equals_null_matches_absent_and_null() {
        let filter = Predicate::equals("name", Value::Null);
        assert!(eval(&filter, &Record::new("id", 1)));
        assert!(eval(&filter, &Record::new("id", 2).with("name", Value::Null)));
        assert!(!eval(&filter, &person(3, "Joe", 1)));
    }

    // ==================== Like Tests ====================

    #[test]
    fn test_like_case_insensitive() {
        let filter = Predicate::like("name", "%oe%", false);
        assert!(eval(&filter, &person(1, "Joe", 1)));
        assert!(eval(&filter, &person(2, "JOE", 1)));
        assert!(!eval(&filter, &person(3, "Ann", 1)));
    }

    #[test]
    fn test_like_case_sensitive() {
        let filter = Predicate::like("name", "%oe%", true);
        assert!(eval(&filter, &person(1, "Joe", 1)));
        assert!(!eval(&filter, &person(2, "JOE", 1)));
    }

    #[test]
    fn test_like_on_non_text_is_false() {
        let filter = Predicate::like("age", "%3%", false);
        assert!(!eval(&filter, &person(1, "Joe", 33)));
    }

    #[test]
    fn test_like_absent_is_false() {
        let filter = Predicate::like("name", "%", false);
        assert!(!eval(&filter, &Record::new("id", 1)));
    }

    #[test]
    fn test_like_pattern_reused_across_entities() {
        let schema = schema();
        let filter = Predicate::like("name", "J%", true);
        let evaluator = FilterEvaluator::new(&filter, &schema);
        let people = vec![person(1, "Joe", 1), person(2, "Ann", 2), person(3, "Jim", 3)];

        let matching = evaluator.filter_entities(&people).unwrap();
        assert_eq!(matching.len(), 2);
        assert_eq!(evaluator.patterns.borrow().len(), 1);
    }

    // ==================== Between Tests ====================

    #[test]
    fn test_between_is_inclusive() {
        let filter = Predicate::between("age", 10, 20);
        assert!(!eval(&filter, &person(1, "a", 9)));
        assert!(eval(&filter, &person(2, "a", 10)));
        assert!(eval(&filter, &person(3, "a", 15)));
        assert!(eval(&filter, &person(4, "a", 20)));
        assert!(!eval(&filter, &person(5, "a", 21)));
    }

    #[test]
    fn test_between_absent_is_false() {
        let filter = Predicate::between("age", 10, 20);
        assert!(!eval(&filter, &Record::new("id", 1)));
    }

    #[test]
    fn test_between_incomparable_is_false() {
        let filter = Predicate::between("name", 10, 20);
        assert!(!eval(&filter, &person(1, "15", 15)));
    }

    #[test]
    fn test_between_text_bounds() {
        let filter = Predicate::between("name", "B", "D");
        assert!(eval(&filter, &person(1, "Bob", 1)));
        assert!(!eval(&filter, &person(2, "Ann", 1)));
    }

    // ==================== In Tests ====================

    #[test]
    fn test_in_matches_any_element() {
        let filter = Predicate::in_values("age", vec![Value::Int(1), Value::Int(3)], false);
        assert!(eval(&filter, &person(1, "a", 3)));
        assert!(!eval(&filter, &person(2, "a", 2)));
    }

    #[test]
    fn test_empty_in_uses_flag() {
        let record = person(1, "a", 3);
        assert!(eval(&Predicate::in_values("age", vec![], true), &record));
        assert!(!eval(&Predicate::in_values("age", vec![], false), &record));
    }

    // ==================== Boolean Operator Tests ====================

    #[test]
    fn test_not_negates() {
        let filter = Predicate::negate(Predicate::equals("name", "Joe"));
        assert!(!eval(&filter, &person(1, "Joe", 1)));
        assert!(eval(&filter, &person(2, "Ann", 1)));
    }

    #[test]
    fn test_and_or() {
        let joe = person(1, "Joe", 30);
        let young = Predicate::between("age", 0, 20);
        let named_joe = Predicate::equals("name", "Joe");

        assert!(!eval(&Predicate::and(young.clone(), named_joe.clone()), &joe));
        assert!(eval(&Predicate::or(young, named_joe), &joe));
    }

    #[test]
    fn test_deep_or_chain() {
        let filter = (2..=10_000i64).fold(Predicate::equals("id", 1), |acc, id| {
            Predicate::or(acc, Predicate::equals("id", id))
        });
        assert!(eval(&filter, &person(1, "a", 1)));
        assert!(eval(&filter, &person(10_000, "a", 1)));
        assert!(!eval(&filter, &person(10_001, "a", 1)));
    }

    #[test]
    fn test_deep_not_chain() {
        let odd = (0..10_001).fold(Predicate::equals("name", "Joe"), |acc, _| {
            Predicate::negate(acc)
        });
        assert!(!eval(&odd, &person(1, "Joe", 1)));
        assert!(eval(&odd, &person(2, "Ann", 1)));

        let even = Predicate::negate(odd);
        assert!(eval(&even, &person(1, "Joe", 1)));
    }

    #[test]
    fn test_mixed_nesting_keeps_precedence() {
        // (name = Joe | age = 5) & !(age = 30)
        let filter = Predicate::and(
            Predicate::or(Predicate::equals("name", "Joe"), Predicate::equals("age", 5)),
            Predicate::negate(Predicate::equals("age", 30)),
        );
        assert!(eval(&filter, &person(1, "Joe", 31)));
        assert!(eval(&filter, &person(2, "Ann", 5)));
        assert!(!eval(&filter, &person(3, "Joe", 30)));
        assert!(!eval(&filter, &person(4, "Ann", 31)));
    }

    #[test]
    fn test_nested_path() {
        let record = Record::new("id", 1).with("address.city", "Oslo");
        assert!(eval(&Predicate::equals("address.city", "Oslo"), &record));
    }

    // ==================== Resolution Tests ====================

    #[test]
    fn test_unknown_property_fails_with_suggestion() {
        let err = Predicate::equals("nmae", "Joe")
            .evaluate(&person(1, "Joe", 1), &schema())
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::property_resolution("nmae", Some("name".to_string()))
        );
    }

    #[test]
    fn test_unknown_property_fails_even_when_entity_has_it() {
        let record = Record::new("id", 1).with("secret", "x");
        let err = Predicate::equals("secret", "x")
            .evaluate(&record, &schema())
            .unwrap_err();
        assert!(matches!(err, FilterError::PropertyResolution { .. }));
    }

    #[test]
    fn test_short_circuited_branch_is_not_resolved() {
        let record = person(1, "Joe", 30);
        let filter = Predicate::or(
            Predicate::equals("name", "Joe"),
            Predicate::equals("bogus", 1),
        );
        assert!(eval(&filter, &record));

        let filter = Predicate::and(
            Predicate::equals("name", "Ann"),
            Predicate::equals("bogus", 1),
        );
        assert!(!eval(&filter, &record));
    }

    #[test]
    fn test_filter_entities_propagates_errors() {
        let schema = schema();
        let filter = Predicate::equals("bogus", 1);
        let evaluator = FilterEvaluator::new(&filter, &schema);
        assert!(evaluator.filter_entities(&[person(1, "a", 1)]).is_err());
        assert!(evaluator.filter_entities::<Record>(&[]).unwrap().is_empty());
    }
}
