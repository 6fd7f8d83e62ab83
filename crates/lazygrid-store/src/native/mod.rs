//! The store's native query representation.
//!
//! Data providers translate their predicate trees and sort specifications
//! into these types; stores execute them directly. [`Criterion`] is a
//! boolean predicate over columns, [`NativeSort`] an ordered list of
//! [`OrderClause`]s, and [`LikePattern`] the shared `%`-wildcard matcher.

mod criterion;
mod order;
mod pattern;

pub use criterion::Criterion;
pub use order::{NativeSort, OrderClause};
pub use pattern::LikePattern;
