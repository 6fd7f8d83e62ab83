//! Translation of predicates into native store criteria.

use lazygrid_store::{Criterion, EntityMetadata, ValueType};
use tracing::trace;

use super::ast::Predicate;
use super::error::{FilterError, FilterResult};
use super::resolve::resolve_property;

/// Stateless translator from [`Predicate`] to [`Criterion`].
///
/// Every property path is resolved through the metadata before anything is
/// emitted. A predicate the store cannot express fails with
/// `FilterError::UnsupportedPredicate`; nothing is left for client-side
/// filtering, so native counts stay exact.
///
/// # Example
///
/// ```
/// use lazygrid_core::filter::{FilterConverter, Predicate};
/// use lazygrid_store::{Criterion, Schema, ValueType};
///
/// let schema = Schema::new("id", ValueType::Int).with_property("name", ValueType::Text);
/// let converter = FilterConverter::new(&schema);
///
/// let criterion = converter.convert(&Predicate::equals("name", "Joe")).unwrap();
/// assert_eq!(criterion, Criterion::eq("name", "Joe"));
/// ```
#[derive(Debug)]
pub struct FilterConverter<'a, M: ?Sized> {
    metadata: &'a M,
}

impl<'a, M> FilterConverter<'a, M>
where
    M: EntityMetadata + ?Sized,
{
    /// Creates a converter resolving paths through `metadata`.
    pub fn new(metadata: &'a M) -> Self {
        Self { metadata }
    }

    /// Converts a predicate into a native criterion.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::PropertyResolution` for unknown paths and
    /// `FilterError::UnsupportedPredicate` for LIKE on a non-text property or
    /// a range with a null bound.
    pub fn convert(&self, predicate: &Predicate) -> FilterResult<Criterion> {
        let criterion = self.convert_node(predicate)?;
        trace!(%criterion, "converted filter");
        Ok(criterion)
    }

    /// Converts an optional filter; no filter matches everything.
    pub fn convert_optional(&self, predicate: Option<&Predicate>) -> FilterResult<Criterion> {
        match predicate {
            Some(predicate) => self.convert(predicate),
            None => Ok(Criterion::All),
        }
    }

    /// Converts a predicate tree bottom-up with an explicit task stack.
    ///
    /// Chains of the same boolean operator become one n-ary criterion and a
    /// chain of NOTs collapses to at most one negation, so the output stays
    /// shallow however deep the input is.
    fn convert_node(&self, root: &Predicate) -> FilterResult<Criterion> {
        let mut tasks = vec![Task::Visit(root)];
        let mut done: Vec<Criterion> = Vec::new();

        while let Some(task) = tasks.pop() {
            let node = match task {
                Task::Visit(node) => node,
                Task::Join(join) => {
                    let criterion = match join {
                        Join::And(arity) => Criterion::And(done.split_off(done.len() - arity)),
                        Join::Or(arity) => Criterion::Or(done.split_off(done.len() - arity)),
                        Join::Not => {
                            Criterion::negate(done.pop().ok_or(FilterError::EmptyExpression)?)
                        }
                    };
                    done.push(criterion);
                    continue;
                }
            };

            let criterion = match node {
                Predicate::Equals { property, value } => {
                    resolve_property(self.metadata, property)?;
                    if value.is_null() {
                        Criterion::IsNull {
                            column: property.clone(),
                        }
                    } else {
                        Criterion::Eq {
                            column: property.clone(),
                            value: value.clone(),
                        }
                    }
                }

                Predicate::Like {
                    property,
                    pattern,
                    case_sensitive,
                } => {
                    let resolution = resolve_property(self.metadata, property)?;
                    if resolution.value_type != Some(ValueType::Text) {
                        let declared = resolution
                            .value_type
                            .map_or("untyped", |ty| ty.as_str());
                        return Err(FilterError::unsupported(format!(
                            "LIKE requires a text property, '{property}' is {declared}"
                        )));
                    }
                    Criterion::Like {
                        column: property.clone(),
                        pattern: pattern.clone(),
                        case_sensitive: *case_sensitive,
                    }
                }

                Predicate::Between {
                    property,
                    lower,
                    upper,
                } => {
                    resolve_property(self.metadata, property)?;
                    if lower.is_null() || upper.is_null() {
                        return Err(FilterError::unsupported(format!(
                            "BETWEEN on '{property}' has a null bound"
                        )));
                    }
                    Criterion::Range {
                        column: property.clone(),
                        lower: lower.clone(),
                        upper: upper.clone(),
                    }
                }

                Predicate::In {
                    property,
                    values,
                    empty_values_is_pass,
                } => {
                    resolve_property(self.metadata, property)?;
                    if values.is_empty() {
                        if *empty_values_is_pass {
                            Criterion::All
                        } else {
                            Criterion::Nothing
                        }
                    } else {
                        Criterion::InList {
                            column: property.clone(),
                            values: values.clone(),
                        }
                    }
                }

                Predicate::And(..) | Predicate::Or(..) => {
                    let operands = chain_operands(node);
                    tasks.push(Task::Join(if matches!(node, Predicate::And(..)) {
                        Join::And(operands.len())
                    } else {
                        Join::Or(operands.len())
                    }));
                    tasks.extend(operands.into_iter().rev().map(Task::Visit));
                    continue;
                }

                Predicate::Not(inner) => {
                    let mut inner: &Predicate = inner;
                    let mut negated = true;
                    while let Predicate::Not(next) = inner {
                        negated = !negated;
                        inner = next.as_ref();
                    }
                    if negated {
                        tasks.push(Task::Join(Join::Not));
                    }
                    tasks.push(Task::Visit(inner));
                    continue;
                }
            };
            done.push(criterion);
        }

        done.pop().ok_or(FilterError::EmptyExpression)
    }
}

/// Operands of a chain of nodes sharing `node`'s operator, left to right.
fn chain_operands(node: &Predicate) -> Vec<&Predicate> {
    let mut operands = Vec::new();
    let mut pending = vec![node];
    while let Some(next) = pending.pop() {
        match (node, next) {
            (Predicate::And(..), Predicate::And(left, right))
            | (Predicate::Or(..), Predicate::Or(left, right)) => {
                pending.push(right);
                pending.push(left);
            }
            _ => operands.push(next),
        }
    }
    operands
}

enum Task<'p> {
    Visit(&'p Predicate),
    /// Combine the last converted results.
    Join(Join),
}

#[derive(Clone, Copy)]
enum Join {
    And(usize),
    Or(usize),
    Not,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazygrid_store::{Schema, Value};

    fn schema() -> Schema {
        Schema::new("id", ValueType::Int)
            .with_property("name", ValueType::Text)
            .with_property("age", ValueType::Int)
    }

    fn convert(predicate: &Predicate) -> FilterResult<Criterion> {
        FilterConverter::new(&schema()).convert(predicate)
    }

    #[test]
    fn test_equals() {
        assert_eq!(
            convert(&Predicate::equals("age", 30)).unwrap(),
            Criterion::eq("age", 30)
        );
    }

    #[test]
    fn test_equals_null_becomes_is_null() {
        assert_eq!(
            convert(&Predicate::equals("name", Value::Null)).unwrap(),
            Criterion::IsNull {
                column: "name".to_string()
            }
        );
    }

    #[test]
    fn test_like() {
        assert_eq!(
            convert(&Predicate::like("name", "%oe%", false)).unwrap(),
            Criterion::Like {
                column: "name".to_string(),
                pattern: "%oe%".to_string(),
                case_sensitive: false,
            }
        );
    }

    #[test]
    fn test_like_on_non_text_is_unsupported() {
        let err = convert(&Predicate::like("age", "3%", true)).unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedPredicate { .. }));
        assert!(err.to_string().contains("'age' is int"));
    }

    #[test]
    fn test_between() {
        assert_eq!(
            convert(&Predicate::between("age", 10, 20)).unwrap(),
            Criterion::Range {
                column: "age".to_string(),
                lower: Value::Int(10),
                upper: Value::Int(20),
            }
        );
    }

    #[test]
    fn test_between_null_bound_is_unsupported() {
        let err = convert(&Predicate::between("age", Value::Null, 20)).unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedPredicate { .. }));
    }

    #[test]
    fn test_in() {
        let predicate = Predicate::in_values("age", vec![Value::Int(1), Value::Int(2)], false);
        assert_eq!(
            convert(&predicate).unwrap(),
            Criterion::InList {
                column: "age".to_string(),
                values: vec![Value::Int(1), Value::Int(2)],
            }
        );
    }

    #[test]
    fn test_empty_in() {
        assert_eq!(
            convert(&Predicate::in_values("age", vec![], true)).unwrap(),
            Criterion::All
        );
        assert_eq!(
            convert(&Predicate::in_values("age", vec![], false)).unwrap(),
            Criterion::Nothing
        );
    }

    #[test]
    fn test_nested_and_is_flattened() {
        let predicate = Predicate::and(
            Predicate::and(Predicate::equals("age", 1), Predicate::equals("age", 2)),
            Predicate::or(Predicate::equals("age", 3), Predicate::equals("age", 4)),
        );
        assert_eq!(
            convert(&predicate).unwrap(),
            Criterion::And(vec![
                Criterion::eq("age", 1),
                Criterion::eq("age", 2),
                Criterion::Or(vec![Criterion::eq("age", 3), Criterion::eq("age", 4)]),
            ])
        );
    }

    #[test]
    fn test_not_is_not_flattened_through() {
        let predicate = Predicate::negate(Predicate::or(
            Predicate::equals("age", 1),
            Predicate::or(Predicate::equals("age", 2), Predicate::equals("age", 3)),
        ));
        assert_eq!(
            convert(&predicate).unwrap(),
            Criterion::negate(Criterion::Or(vec![
                Criterion::eq("age", 1),
                Criterion::eq("age", 2),
                Criterion::eq("age", 3),
            ]))
        );
    }

    #[test]
    fn test_double_negation_cancels() {
        let predicate = Predicate::negate(Predicate::negate(Predicate::equals("age", 1)));
        assert_eq!(convert(&predicate).unwrap(), Criterion::eq("age", 1));

        let predicate = Predicate::negate(predicate);
        assert_eq!(
            convert(&predicate).unwrap(),
            Criterion::negate(Criterion::eq("age", 1))
        );
    }

    #[test]
    fn test_deep_or_chain_is_one_node() {
        let predicate = (2..=10_000i64).fold(Predicate::equals("age", 1), |acc, age| {
            Predicate::or(acc, Predicate::equals("age", age))
        });
        let Criterion::Or(children) = convert(&predicate).unwrap() else {
            panic!("expected OR");
        };
        assert_eq!(children.len(), 10_000);
        assert_eq!(children[0], Criterion::eq("age", 1));
        assert_eq!(children[9_999], Criterion::eq("age", 10_000));
    }

    #[test]
    fn test_deep_not_chain_collapses() {
        let predicate = (0..10_001).fold(Predicate::equals("age", 1), |acc, _| {
            Predicate::negate(acc)
        });
        assert_eq!(
            convert(&predicate).unwrap(),
            Criterion::negate(Criterion::eq("age", 1))
        );
    }

    #[test]
    fn test_alternating_operators_keep_order() {
        let predicate = Predicate::or(
            Predicate::and(
                Predicate::equals("age", 1),
                Predicate::or(Predicate::equals("age", 2), Predicate::equals("age", 3)),
            ),
            Predicate::equals("age", 4),
        );
        assert_eq!(
            convert(&predicate).unwrap(),
            Criterion::Or(vec![
                Criterion::And(vec![
                    Criterion::eq("age", 1),
                    Criterion::Or(vec![Criterion::eq("age", 2), Criterion::eq("age", 3)]),
                ]),
                Criterion::eq("age", 4),
            ])
        );
    }

    #[test]
    fn test_first_unknown_property_is_reported() {
        let predicate = Predicate::and(
            Predicate::equals("nme", 1),
            Predicate::negate(Predicate::equals("agee", 2)),
        );
        assert_eq!(
            convert(&predicate).unwrap_err(),
            FilterError::property_resolution("nme", Some("name".to_string()))
        );
    }

    #[test]
    fn test_unknown_property_anywhere_fails() {
        let predicate = Predicate::or(Predicate::equals("age", 1), Predicate::equals("agee", 2));
        let err = convert(&predicate).unwrap_err();
        assert_eq!(
            err,
            FilterError::property_resolution("agee", Some("age".to_string()))
        );
    }

    #[test]
    fn test_convert_optional_none_is_all() {
        let schema = schema();
        let converter = FilterConverter::new(&schema);
        assert_eq!(converter.convert_optional(None).unwrap(), Criterion::All);
    }
}
