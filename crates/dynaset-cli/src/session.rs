//! One CLI run: a dynaset graph over a SQLite file, built from a TOML form.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use dynaset_core::{Database, DynasetGraph, DynasetId, SqlLog};
use dynaset_model::{FormDefinition, Value};
use dynaset_sqlite::SqliteDatabase;
use tracing::info;

/// `COLUMN=VALUE` given on the command line. The value is parsed against the
/// column's declared type when it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub value: String,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (column, value) = text
            .split_once('=')
            .ok_or_else(|| format!("expected COLUMN=VALUE, got '{text}'"))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(format!("missing column name in '{text}'"));
        }
        Ok(Self {
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}

/// `NAME=ROW` row selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub dynaset: String,
    pub row: usize,
}

impl FromStr for Selection {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (dynaset, row) = text
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=ROW, got '{text}'"))?;
        let row = row
            .trim()
            .parse()
            .map_err(|_| format!("row must be a non-negative integer, got '{row}'"))?;
        Ok(Self {
            dynaset: dynaset.trim().to_string(),
            row,
        })
    }
}

/// What a mutating command wrote.
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub dynaset: String,
    pub statements: usize,
    pub log: SqlLog,
    /// Id generated for an inserted row.
    pub row_id: Option<i64>,
}

impl fmt::Display for SaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} statement(s) written",
            self.dynaset, self.statements
        )?;
        if let Some(id) = self.row_id {
            write!(f, ", new row id {id}")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Session {
    graph: DynasetGraph,
}

impl Session {
    /// Open the database and form files and load the root dynasets.
    pub fn open(db: &Path, form: &Path) -> Result<Self> {
        let text = fs::read_to_string(form)
            .with_context(|| format!("read form {}", form.display()))?;
        let definition: FormDefinition =
            toml::from_str(&text).with_context(|| format!("parse form {}", form.display()))?;
        let database = SqliteDatabase::open(db)
            .with_context(|| format!("open database {}", db.display()))?;
        Self::from_parts(&definition, database)
    }

    /// Build the graph and execute every root dynaset that has a query.
    pub fn from_parts(form: &FormDefinition, database: impl Database + 'static) -> Result<Self> {
        let mut graph = DynasetGraph::from_form(form, database).context("build dynasets")?;
        for id in graph.roots() {
            let dynaset = graph.get(id)?;
            if dynaset.query().is_none() {
                continue;
            }
            let name = dynaset.name().to_string();
            let rows = graph
                .execute(id)
                .with_context(|| format!("load dynaset '{name}'"))?;
            info!(dynaset = %name, rows, "loaded");
        }
        Ok(Self { graph })
    }

    pub fn graph(&self) -> &DynasetGraph {
        &self.graph
    }

    pub fn dynaset(&self, name: &str) -> Result<DynasetId> {
        self.graph
            .find(name)
            .with_context(|| format!("no dynaset named '{name}'"))
    }

    pub fn select(&mut self, selection: &Selection) -> Result<()> {
        let id = self.dynaset(&selection.dynaset)?;
        self.graph
            .set_row(id, Some(selection.row))
            .with_context(|| format!("select row {} of '{}'", selection.row, selection.dynaset))
    }

    pub fn edit(&mut self, name: &str, row: usize, assignments: &[Assignment]) -> Result<SaveReport> {
        let id = self.dynaset(name)?;
        self.graph
            .set_row(id, Some(row))
            .with_context(|| format!("select row {row} of '{name}'"))?;
        self.graph.edit(id)?;
        self.assign(id, assignments)?;
        self.save(id)
    }

    pub fn insert(&mut self, name: &str, assignments: &[Assignment]) -> Result<SaveReport> {
        let id = self.dynaset(name)?;
        self.graph
            .new_row(id)
            .with_context(|| format!("add a row to '{name}'"))?;
        self.assign(id, assignments)?;
        let mut report = self.save(id)?;
        report.row_id = self.graph.last_row_id(id)?;
        Ok(report)
    }

    pub fn delete(&mut self, name: &str, row: usize) -> Result<SaveReport> {
        let id = self.dynaset(name)?;
        self.graph
            .set_row(id, Some(row))
            .with_context(|| format!("select row {row} of '{name}'"))?;
        self.graph.edit(id)?;
        self.graph.delete(id)?;
        self.save(id)
    }

    fn assign(&mut self, id: DynasetId, assignments: &[Assignment]) -> Result<()> {
        for assignment in assignments {
            let column = &assignment.column;
            let value_type = self.graph.column(id, column)?.value_type();
            let value = Value::parse(value_type, &assignment.value)
                .with_context(|| format!("value for column '{column}'"))?;
            self.graph.set_data(id, column, value)?;
        }
        Ok(())
    }

    fn save(&mut self, id: DynasetId) -> Result<SaveReport> {
        let statements = self.graph.save(id).context("save")?;
        let dynaset = self.graph.get(id)?;
        info!(dynaset = %dynaset.name(), statements, "saved");
        Ok(SaveReport {
            dynaset: dynaset.name().to_string(),
            statements,
            log: dynaset.sql_log().clone(),
            row_id: None,
        })
    }
}
