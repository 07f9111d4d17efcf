//! Row edits: new rows, cell writes, undo, delete and clear.
//!
//! Every change to row data goes through here so that the row snapshot, the
//! dirty flag and the parent freeze stay consistent.

use dynaset_model::Value;
use tracing::{debug, trace};

use crate::broadcast::Change;
use crate::dynaset::DynasetId;
use crate::error::{DynasetError, Result};
use crate::graph::DynasetGraph;
use crate::registry::ColumnId;

impl DynasetGraph {
    /// Insert a new row after `after`, or append it for `None`.
    ///
    /// Columns linked to the parent are filled from the parent's current row.
    /// Returns the index of the new row. Fails while the dynaset is locked.
    pub fn insert_row(&mut self, id: DynasetId, after: Option<usize>) -> Result<usize> {
        let linked = self.parent_link_values(id)?;
        let dynaset = self.get_mut(id)?;
        if dynaset.locked {
            return Err(DynasetError::Locked {
                dynaset: dynaset.name.clone(),
            });
        }
        let row_count = dynaset.rows.len();
        let index = match after {
            None => row_count,
            Some(row) if row < row_count => row + 1,
            Some(row) => return Err(DynasetError::IndexOutOfRange { row, row_count }),
        };

        let auto_column = dynaset.auto_column;
        let mut row = dynaset.rows.new_row(&mut dynaset.columns, auto_column);
        for (column, value) in linked {
            if let Ok(ordinal) = dynaset.columns.ordinal(column) {
                row.assign(ordinal, value);
            }
        }
        dynaset.rows.insert(index, row);
        if let Some(current) = dynaset.current_row
            && current >= index
        {
            dynaset.current_row = Some(current + 1);
        }
        dynaset.dirty = true;
        debug!(dynaset = %dynaset.name, row = index, "inserted new row");

        if let Some(parent) = dynaset.parent {
            self.freeze(parent)?;
        }
        self.data_changed(id, Change::Full)?;
        Ok(index)
    }

    /// The "new" action: unlock, add a row after the current one (or at the
    /// end) and select it.
    ///
    /// Selecting the new row moves the cursor, so a frozen dynaset refuses
    /// before anything changes.
    pub fn new_row(&mut self, id: DynasetId) -> Result<usize> {
        let dynaset = self.get(id)?;
        if dynaset.frozen {
            return Err(DynasetError::Frozen {
                dynaset: dynaset.name.clone(),
            });
        }
        self.edit(id)?;
        let dynaset = self.get(id)?;
        let after = dynaset
            .current_data_row()
            .or_else(|| dynaset.rows.len().checked_sub(1));
        self.set_row(id, None)?;
        let index = self.insert_row(id, after)?;
        self.set_row(id, Some(index))?;
        Ok(index)
    }

    /// Write a cell of the current row.
    pub fn set_data(&mut self, id: DynasetId, column: &str, value: impl Into<Value>) -> Result<()> {
        let row = self.selected(id)?;
        self.set_data_at(id, row, column, value)
    }

    /// Write a cell. The first write to a clean row captures its snapshot.
    pub fn set_data_at(
        &mut self,
        id: DynasetId,
        row: usize,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let dynaset = self.get_mut(id)?;
        if dynaset.locked {
            return Err(DynasetError::Locked {
                dynaset: dynaset.name.clone(),
            });
        }
        let column_id = dynaset.columns.resolve(column)?;
        let ordinal = dynaset.columns.ordinal(column_id)?;
        let row_count = dynaset.rows.len();
        let target = dynaset
            .rows
            .get_mut(row)
            .ok_or(DynasetError::IndexOutOfRange { row, row_count })?;
        let value = value.into();
        trace!(dynaset = %dynaset.name, row, column, ?value, "set data");
        target.set(ordinal, value);
        dynaset.dirty = true;

        if let Some(parent) = dynaset.parent {
            self.freeze(parent)?;
        }
        self.data_changed(
            id,
            Change::Cell {
                row,
                column: column_id,
            },
        )
    }

    /// Undo the current row.
    pub fn undo(&mut self, id: DynasetId) -> Result<()> {
        let row = self.selected(id)?;
        self.undo_row(id, row)
    }

    /// Restore a row's snapshot and lift its delete mark.
    pub fn undo_row(&mut self, id: DynasetId, row: usize) -> Result<()> {
        let dynaset = self.get_mut(id)?;
        let row_count = dynaset.rows.len();
        let target = dynaset
            .rows
            .get_mut(row)
            .ok_or(DynasetError::IndexOutOfRange { row, row_count })?;
        if !target.revert() {
            return Err(DynasetError::NothingToUndo { row });
        }
        dynaset.dirty = dynaset.rows.has_pending_changes();
        debug!(dynaset = %dynaset.name, row, dirty = dynaset.dirty, "row reverted");

        self.thaw_clean_lineage(id)?;
        self.data_changed(id, Change::Full)
    }

    /// Delete the current row.
    pub fn delete(&mut self, id: DynasetId) -> Result<()> {
        let row = self.selected(id)?;
        self.delete_row(id, row)
    }

    /// Mark a row for deletion; a row never saved is dropped right away.
    pub fn delete_row(&mut self, id: DynasetId, row: usize) -> Result<()> {
        let dynaset = self.get_mut(id)?;
        if dynaset.locked {
            return Err(DynasetError::Locked {
                dynaset: dynaset.name.clone(),
            });
        }
        let row_count = dynaset.rows.len();
        let target = dynaset
            .rows
            .get_mut(row)
            .ok_or(DynasetError::IndexOutOfRange { row, row_count })?;

        if target.is_new() {
            dynaset.rows.remove(row);
            let selection_removed = dynaset.cursor_after_removal(row);
            dynaset.dirty = dynaset.rows.has_pending_changes();
            debug!(dynaset = %dynaset.name, row, "dropped unsaved row");
            self.thaw_clean_lineage(id)?;
            self.data_changed(id, Change::Full)?;
            if selection_removed {
                self.notify_children(id)?;
            }
            return Ok(());
        }

        if !target.mark_deleted() {
            return Ok(());
        }
        dynaset.dirty = true;
        debug!(dynaset = %dynaset.name, row, "row marked for deletion");
        if let Some(parent) = dynaset.parent {
            self.freeze(parent)?;
        }
        self.data_changed(id, Change::Full)
    }

    /// Drop every row and the selection. Widgets always get the full reset,
    /// even when there was nothing to drop.
    pub fn clear(&mut self, id: DynasetId) -> Result<()> {
        let dynaset = self.get(id)?;
        if dynaset.frozen {
            return Err(DynasetError::Frozen {
                dynaset: dynaset.name.clone(),
            });
        }

        self.set_row(id, None)?;
        let dynaset = self.get_mut(id)?;
        dynaset.rows.clear();
        dynaset.dirty = false;
        trace!(dynaset = %dynaset.name, "cleared");
        self.thaw_clean_lineage(id)?;
        self.data_changed(id, Change::Full)
    }

    /// Values of the parent's current row for every linked column.
    fn parent_link_values(&self, id: DynasetId) -> Result<Vec<(ColumnId, Value)>> {
        let dynaset = self.get(id)?;
        let Some(parent) = dynaset.parent else {
            return Ok(Vec::new());
        };
        let parent = self.get(parent)?;
        let Some(row) = parent.current_data_row().and_then(|row| parent.rows.get(row)) else {
            return Ok(Vec::new());
        };
        let mut values = Vec::new();
        for (column, link) in dynaset.columns.linked() {
            let ordinal = parent.columns.ordinal(link)?;
            values.push((column, row.get(ordinal).cloned().unwrap_or_default()));
        }
        Ok(values)
    }
}
