//! The database collaborator.
//!
//! The engine never talks to a driver directly. It needs four things: run a
//! query with named parameters and hand back the column descriptors plus the
//! rows, run a positional DML statement, commit, and report the id generated
//! by the last insert.

use std::fmt;

use dynaset_model::Value;

/// Opaque error reported by a database driver.
#[derive(Debug)]
pub struct DatabaseError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DatabaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn from_source(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "database error: {}", self.message)
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

/// Name of one column of a query result, in driver order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A fully fetched query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }
}

impl IntoIterator for ResultSet {
    type Item = Vec<Value>;
    type IntoIter = std::vec::IntoIter<Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Named query parameters in declaration order.
///
/// Names carry no driver prefix; drivers bind only the names the query
/// references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(Vec<(String, Value)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Synchronous database connection used by every dynaset of a graph.
pub trait Database {
    /// Run a query and fetch its complete result.
    fn query(&mut self, sql: &str, params: &QueryParams) -> Result<ResultSet, DatabaseError>;

    /// Run a statement with positional (`?`) parameters, returning the number
    /// of affected rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize, DatabaseError>;

    fn commit(&mut self) -> Result<(), DatabaseError>;

    /// Row id generated by the most recent INSERT, if the driver knows one.
    fn last_inserted_id(&self) -> Option<i64>;
}

impl<D: Database + ?Sized> Database for Box<D> {
    fn query(&mut self, sql: &str, params: &QueryParams) -> Result<ResultSet, DatabaseError> {
        (**self).query(sql, params)
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize, DatabaseError> {
        (**self).execute(sql, params)
    }

    fn commit(&mut self) -> Result<(), DatabaseError> {
        (**self).commit()
    }

    fn last_inserted_id(&self) -> Option<i64> {
        (**self).last_inserted_id()
    }
}
