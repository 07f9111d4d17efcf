//! Read-only access handed to widgets and hooks.

use std::collections::BTreeMap;

use dynaset_model::{Row, Value};

use crate::dynaset::{Dynaset, DynasetId};
use crate::error::{DynasetError, Result};
use crate::graph::DynasetGraph;
use crate::registry::ColumnRegistry;
use crate::statement::SqlLog;

static NULL: Value = Value::Null;

/// Shared borrow of one dynaset (and, through it, the rest of the graph).
///
/// Callbacks only ever see a view, so they cannot change the graph while a
/// broadcast is running.
#[derive(Clone, Copy)]
pub struct DynasetView<'a> {
    graph: &'a DynasetGraph,
    id: DynasetId,
    dynaset: &'a Dynaset,
}

impl<'a> DynasetView<'a> {
    pub(crate) fn new(graph: &'a DynasetGraph, id: DynasetId, dynaset: &'a Dynaset) -> Self {
        Self { graph, id, dynaset }
    }

    pub fn id(&self) -> DynasetId {
        self.id
    }

    pub fn dynaset(&self) -> &'a Dynaset {
        self.dynaset
    }

    pub fn name(&self) -> &'a str {
        &self.dynaset.name
    }

    pub fn table(&self) -> &'a str {
        &self.dynaset.table
    }

    pub fn columns(&self) -> &'a ColumnRegistry {
        &self.dynaset.columns
    }

    pub fn current_row(&self) -> Option<usize> {
        self.dynaset.current_row
    }

    pub fn row_count(&self) -> usize {
        self.dynaset.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&'a Row> {
        self.dynaset.rows.get(index)
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Row> {
        self.dynaset.rows.iter()
    }

    /// Value of a column in the given row.
    pub fn value(&self, row: usize, column: &str) -> Result<&'a Value> {
        value_at(self.dynaset, row, column)
    }

    /// Value of a column in the current row, `None` if the cursor is not on
    /// a row.
    pub fn current_value(&self, column: &str) -> Result<Option<&'a Value>> {
        match self.dynaset.current_data_row() {
            Some(row) => value_at(self.dynaset, row, column).map(Some),
            None => Ok(None),
        }
    }

    /// Column name to value map of a row, optionally restricted to keys.
    pub fn row_values(&self, row: usize, keys_only: bool) -> Result<BTreeMap<String, Value>> {
        row_values(self.dynaset, row, keys_only)
    }

    pub fn is_locked(&self) -> bool {
        self.dynaset.locked
    }

    pub fn is_frozen(&self) -> bool {
        self.dynaset.frozen
    }

    pub fn is_dirty(&self) -> bool {
        self.dynaset.dirty
    }

    pub fn is_broadcasting(&self) -> bool {
        self.dynaset.broadcasting.get()
    }

    pub fn sql_log(&self) -> &'a SqlLog {
        &self.dynaset.sql_log
    }

    pub fn parent(&self) -> Option<DynasetView<'a>> {
        let parent = self.dynaset.parent?;
        self.graph.view(parent).ok()
    }

    pub fn graph(&self) -> &'a DynasetGraph {
        self.graph
    }
}

impl std::fmt::Debug for DynasetView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynasetView")
            .field("id", &self.id)
            .field("name", &self.dynaset.name)
            .finish()
    }
}

pub(crate) fn checked_row(dynaset: &Dynaset, row: usize) -> Result<&Row> {
    dynaset
        .rows
        .get(row)
        .ok_or(DynasetError::IndexOutOfRange {
            row,
            row_count: dynaset.rows.len(),
        })
}

/// Cell lookup shared by the graph and views. Rows shorter than the
/// column's ordinal read as null.
pub(crate) fn value_at<'a>(dynaset: &'a Dynaset, row: usize, column: &str) -> Result<&'a Value> {
    let row = checked_row(dynaset, row)?;
    let id = dynaset.columns.resolve(column)?;
    let ordinal = dynaset.columns.ordinal(id)?;
    Ok(row.get(ordinal).unwrap_or(&NULL))
}

pub(crate) fn row_values(
    dynaset: &Dynaset,
    row: usize,
    keys_only: bool,
) -> Result<BTreeMap<String, Value>> {
    let row = checked_row(dynaset, row)?;
    Ok(dynaset
        .columns
        .iter()
        .filter(|(_, column)| !keys_only || column.role().is_key())
        .filter_map(|(_, column)| {
            let ordinal = column.ordinal()?;
            let value = row.get(ordinal).cloned().unwrap_or_default();
            Some((column.name().to_string(), value))
        })
        .collect())
}
