//! In-memory reference store and JSON dataset loading.
//!
//! [`MemoryStore`] executes [`Criterion`]s and [`NativeSort`]s directly over
//! a set of [`Record`]s. It is the reference backend the data providers are
//! tested against and the store behind the `lg` CLI.
//!
//! A dataset file looks like this:
//!
//! ```json
//! {
//!   "schema": {
//!     "primary_key": "id",
//!     "properties": { "id": "int", "name": "text", "born": "date" }
//!   },
//!   "records": [
//!     { "id": 1, "name": "Ann", "born": "1990-04-01" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Deserialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::models::{Record, Schema, Value};
use crate::native::{Criterion, LikePattern, NativeSort};
use crate::store::{BackingStore, FetchJoin};

/// A JSON dataset: a schema plus records.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    /// Entity schema.
    pub schema: Schema,

    /// Raw records, typed by `schema` when loaded into a store.
    #[serde(default)]
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl Dataset {
    /// Parses a dataset from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Dataset` if the JSON is malformed.
    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a dataset file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be read and
    /// `StoreError::Dataset` if it is not a valid dataset.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Builds a [`MemoryStore`] holding every record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRecord` if the schema is inconsistent or a
    /// record does not fit it.
    pub fn into_store(self) -> StoreResult<MemoryStore> {
        self.schema.validate()?;
        let records = self
            .records
            .iter()
            .map(|object| Record::from_json(object, &self.schema))
            .collect::<StoreResult<Vec<_>>>()?;
        MemoryStore::with_records(self.schema, records)
    }
}

/// A [`BackingStore`] over records held in memory.
///
/// Records are keyed by their primary key value. Queries that name a column
/// the schema does not declare fail with `StoreError::Query`, as a database
/// would for an unknown column. Fetch joins are accepted and ignored since
/// records carry no relations.
#[derive(Debug)]
pub struct MemoryStore {
    schema: Schema,
    records: RwLock<BTreeMap<Value, Record>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Creates a store holding `records`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRecord` if a record has no primary key.
    pub fn with_records(
        schema: Schema,
        records: impl IntoIterator<Item = Record>,
    ) -> StoreResult<Self> {
        let store = Self::new(schema);
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Returns the schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Inserts or replaces a record, returning the record it replaced.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRecord` if the record's key is null.
    pub fn insert(&self, record: Record) -> StoreResult<Option<Record>> {
        let key = record.key().clone();
        if key.is_null() {
            return Err(StoreError::invalid_record(format!(
                "record has no value for primary key '{}'",
                self.schema.primary_key
            )));
        }
        Ok(self.write()?.insert(key, record))
    }

    /// Removes the record with `key`, returning it.
    pub fn remove(&self, key: &Value) -> StoreResult<Option<Record>> {
        Ok(self.write()?.remove(key))
    }

    /// Returns the number of records.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<Value, Record>>> {
        self.records
            .read()
            .map_err(lock_poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<Value, Record>>> {
        self.records
            .write()
            .map_err(lock_poisoned)
    }

    fn check_column(&self, column: &str) -> StoreResult<()> {
        if self.schema.property_type(column).is_some() {
            Ok(())
        } else {
            Err(StoreError::query(format!("unknown column '{column}'")))
        }
    }

    /// Returns matching records in `sort` order.
    fn select<'a>(
        &self,
        records: &'a BTreeMap<Value, Record>,
        criterion: &Criterion,
        sort: &NativeSort,
    ) -> StoreResult<Vec<&'a Record>> {
        let compiled = self.compile(criterion)?;
        for clause in sort.clauses() {
            self.check_column(&clause.column)?;
        }

        let mut rows: Vec<&Record> = records.values().filter(|r| compiled.matches(r)).collect();
        rows.sort_by(|a, b| sort.compare(*a, *b));
        Ok(rows)
    }

    fn compile<'c>(&self, criterion: &'c Criterion) -> StoreResult<Compiled<'c>> {
        Ok(match criterion {
            Criterion::All => Compiled::All,
            Criterion::Nothing => Compiled::Nothing,
            Criterion::Eq { column, value } => {
                self.check_column(column)?;
                Compiled::Eq(column, value)
            }
            Criterion::IsNull { column } => {
                self.check_column(column)?;
                Compiled::IsNull(column)
            }
            Criterion::Like {
                column,
                pattern,
                case_sensitive,
            } => {
                self.check_column(column)?;
                let pattern = LikePattern::new(pattern, *case_sensitive)
                    .map_err(|e| StoreError::query(format!("invalid pattern: {e}")))?;
                Compiled::Like(column, pattern)
            }
            Criterion::Range {
                column,
                lower,
                upper,
            } => {
                self.check_column(column)?;
                Compiled::Range(column, lower, upper)
            }
            Criterion::InList { column, values } => {
                self.check_column(column)?;
                Compiled::InList(column, values)
            }
            Criterion::And(children) => Compiled::And(
                children
                    .iter()
                    .map(|c| self.compile(c))
                    .collect::<StoreResult<_>>()?,
            ),
            Criterion::Or(children) => Compiled::Or(
                children
                    .iter()
                    .map(|c| self.compile(c))
                    .collect::<StoreResult<_>>()?,
            ),
            Criterion::Not(inner) => Compiled::Not(Box::new(self.compile(inner)?)),
        })
    }
}

/// A criterion with its patterns compiled once per query.
enum Compiled<'c> {
    All,
    Nothing,
    Eq(&'c str, &'c Value),
    IsNull(&'c str),
    Like(&'c str, LikePattern),
    Range(&'c str, &'c Value, &'c Value),
    InList(&'c str, &'c [Value]),
    And(Vec<Compiled<'c>>),
    Or(Vec<Compiled<'c>>),
    Not(Box<Compiled<'c>>),
}

impl Compiled<'_> {
    fn matches(&self, record: &Record) -> bool {
        let column = |name: &str| record.get(name).unwrap_or(&Value::Null);

        match self {
            Compiled::All => true,
            Compiled::Nothing => false,
            Compiled::Eq(name, value) => column(name).loosely_eq(value),
            Compiled::IsNull(name) => column(name).is_null(),
            Compiled::Like(name, pattern) => column(name)
                .as_text()
                .is_some_and(|text| pattern.is_match(text)),
            Compiled::Range(name, lower, upper) => {
                let value = column(name);
                value.compare(lower).is_some_and(|o| o.is_ge())
                    && value.compare(upper).is_some_and(|o| o.is_le())
            }
            Compiled::InList(name, values) => {
                let value = column(name);
                values.iter().any(|candidate| value.loosely_eq(candidate))
            }
            Compiled::And(children) => children.iter().all(|c| c.matches(record)),
            Compiled::Or(children) => children.iter().any(|c| c.matches(record)),
            Compiled::Not(inner) => !inner.matches(record),
        }
    }
}

impl BackingStore for MemoryStore {
    type Entity = Record;

    fn native_count(&self, criterion: &Criterion) -> StoreResult<usize> {
        let compiled = self.compile(criterion)?;
        let records = self.read()?;
        Ok(records.values().filter(|r| compiled.matches(r)).count())
    }

    fn native_fetch(
        &self,
        criterion: &Criterion,
        sort: &NativeSort,
        offset: usize,
        limit: usize,
        _joins: &[FetchJoin],
    ) -> StoreResult<Vec<Record>> {
        debug!(%criterion, %sort, offset, limit, "memory store fetch");
        let records = self.read()?;
        let rows = self.select(&records, criterion, sort)?;
        Ok(rows.into_iter().skip(offset).take(limit).cloned().collect())
    }

    fn native_fetch_ids(&self, criterion: &Criterion, sort: &NativeSort) -> StoreResult<Vec<Value>> {
        debug!(%criterion, %sort, "memory store id scan");
        let records = self.read()?;
        let rows = self.select(&records, criterion, sort)?;
        Ok(rows.into_iter().map(|r| r.key().clone()).collect())
    }

    fn native_fetch_by_ids(&self, ids: &[Value], _joins: &[FetchJoin]) -> StoreResult<Vec<Record>> {
        let records = self.read()?;
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }
}

/// A writer panicked mid-update; retrying cannot repair the records.
fn lock_poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::query("record lock poisoned")
}
