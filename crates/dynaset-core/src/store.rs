//! Row store with the cached template for new rows.

use dynaset_model::{Row, Value};

use crate::registry::{ColumnId, ColumnRegistry};

/// Ordered rows of one dynaset.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Row>,
    /// Static defaults laid out by the ordinals in force when it was built.
    template: Option<Vec<Value>>,
}

impl RowStore {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// True if any row would be touched by a save.
    pub fn has_pending_changes(&self) -> bool {
        self.rows.iter().any(Row::has_pending_change)
    }

    pub(crate) fn insert(&mut self, index: usize, row: Row) {
        self.rows.insert(index, row);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Row {
        self.rows.remove(index)
    }

    pub(crate) fn replace_all(&mut self, rows: impl IntoIterator<Item = Row>) {
        self.rows.clear();
        self.rows.extend(rows);
        self.template = None;
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
        self.template = None;
    }

    /// Forget the cached template, e.g. after the column set changed.
    pub(crate) fn invalidate_template(&mut self) {
        self.template = None;
    }

    /// Build a fresh new row.
    ///
    /// The template is computed on first use; it resolves any missing
    /// ordinals and holds the static defaults. Default providers are evaluated
    /// for every row. The auto column starts out null.
    pub(crate) fn new_row(&mut self, columns: &mut ColumnRegistry, auto_column: Option<ColumnId>) -> Row {
        let template = self.template.get_or_insert_with(|| {
            let width = columns.synthesize();
            let mut data = vec![Value::Null; width];
            for (id, column) in columns.iter() {
                if Some(id) == auto_column {
                    continue;
                }
                if let (Some(ordinal), Some(value)) = (column.ordinal(), column.default_value()) {
                    data[ordinal] = value.clone();
                }
            }
            data
        });
        let mut data = template.clone();
        for (id, column) in columns.iter() {
            if Some(id) == auto_column || column.default_value().is_some() {
                continue;
            }
            if let Some(ordinal) = column.ordinal().filter(|_| column.has_default_provider())
                && ordinal < data.len()
            {
                data[ordinal] = column.initial_value();
            }
        }
        Row::pending(data)
    }
}
