//! SQLite connection implementing the dynaset [`Database`] contract.
//!
//! Query parameters are bound by name under any of SQLite's prefixes
//! (`:name`, `@name`, `$name`); parameters a query does not reference are
//! skipped. Statements run inside a transaction that is opened on first use
//! and closed by [`Database::commit`].

#![deny(unsafe_code)]

mod convert;

use std::path::Path;

use dynaset_core::{ColumnDescriptor, Database, DatabaseError, QueryParams, ResultSet};
use dynaset_model::Value;
use rusqlite::{Connection, Statement, params_from_iter};
use tracing::{debug, trace};

pub use convert::{from_sql, to_sql};

#[derive(Debug)]
pub struct SqliteDatabase {
    conn: Connection,
    last_insert: Option<i64>,
}

impl SqliteDatabase {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(DatabaseError::from_source)?;
        debug!(path = %path.display(), "opened sqlite database");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from_source)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            last_insert: None,
        }
    }

    /// The underlying connection, e.g. for schema setup.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl Database for SqliteDatabase {
    fn query(&mut self, sql: &str, params: &QueryParams) -> Result<ResultSet, DatabaseError> {
        let mut statement = self.conn.prepare(sql).map_err(DatabaseError::from_source)?;
        bind_named(&mut statement, params)?;
        let columns: Vec<ColumnDescriptor> = statement
            .column_names()
            .into_iter()
            .map(ColumnDescriptor::new)
            .collect();

        let width = columns.len();
        let mut fetched = Vec::new();
        let mut rows = statement.raw_query();
        while let Some(row) = rows.next().map_err(DatabaseError::from_source)? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                let value = row.get_ref(index).map_err(DatabaseError::from_source)?;
                values.push(from_sql(value));
            }
            fetched.push(values);
        }
        trace!(rows = fetched.len(), columns = width, "query fetched");
        Ok(ResultSet::new(columns, fetched))
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize, DatabaseError> {
        let began = self.conn.is_autocommit();
        if began {
            self.conn
                .execute_batch("BEGIN")
                .map_err(DatabaseError::from_source)?;
        }
        let affected = match self
            .conn
            .execute(sql, params_from_iter(params.iter().map(to_sql)))
        {
            Ok(affected) => affected,
            Err(err) => {
                // nothing else is pending in a transaction opened here
                if began && let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    debug!(error = %rollback, "rollback after failed statement failed");
                }
                return Err(DatabaseError::from_source(err));
            }
        };
        if is_insert(sql) {
            self.last_insert = Some(self.conn.last_insert_rowid());
        }
        trace!(affected, "statement executed");
        Ok(affected)
    }

    fn commit(&mut self) -> Result<(), DatabaseError> {
        if !self.conn.is_autocommit() {
            self.conn
                .execute_batch("COMMIT")
                .map_err(DatabaseError::from_source)?;
        }
        Ok(())
    }

    fn last_inserted_id(&self) -> Option<i64> {
        self.last_insert
    }
}

fn bind_named(statement: &mut Statement<'_>, params: &QueryParams) -> Result<(), DatabaseError> {
    for (name, value) in params.iter() {
        for prefix in [':', '@', '$'] {
            let index = statement
                .parameter_index(&format!("{prefix}{name}"))
                .map_err(DatabaseError::from_source)?;
            if let Some(index) = index {
                statement
                    .raw_bind_parameter(index, to_sql(value))
                    .map_err(DatabaseError::from_source)?;
            }
        }
    }
    Ok(())
}

fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|keyword| keyword.eq_ignore_ascii_case("insert"))
}
