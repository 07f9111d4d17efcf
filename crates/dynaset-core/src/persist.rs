//! Writing pending row changes back to the database.
//!
//! Children are saved before their parent. Inside a dynaset rows are handled
//! in order, one statement per row, each committed on its own. A failure stops
//! the save where it is: rows already written stay written.

use dynaset_model::{Row, Value};
use tracing::{debug, debug_span, trace};

use crate::broadcast::Change;
use crate::dynaset::{Dynaset, DynasetId};
use crate::error::{DynasetError, Result};
use crate::graph::DynasetGraph;
use crate::statement::{Statement, StatementBuilder};
use crate::view::DynasetView;

impl DynasetGraph {
    /// Save the dynaset and its subtree. Returns the number of statements
    /// executed; a declining before-save hook makes this a successful no-op.
    pub fn save(&mut self, id: DynasetId) -> Result<usize> {
        let dynaset = self.get(id)?;
        let _span = debug_span!("save", dynaset = %dynaset.name).entered();
        if let Some(hook) = &dynaset.hooks.before_save {
            let view = DynasetView::new(self, id, dynaset);
            let proceed = hook(&view).map_err(|source| DynasetError::Hook {
                dynaset: dynaset.name.clone(),
                hook: "before_save",
                source,
            })?;
            if !proceed {
                debug!("save declined by hook");
                return Ok(0);
            }
        }

        let mut written = 0;
        for child in dynaset.children.clone() {
            written += self.save(child)?;
        }

        let mut index = 0;
        let mut changed = false;
        let mut selection_removed = false;
        loop {
            let dynaset = self.get(id)?;
            let Some(row) = dynaset.rows.get(index) else {
                break;
            };
            if row.is_deleted() && !row.is_new() {
                let statement = delete_statement(dynaset, row)?;
                self.run(id, &statement)?;
                let dynaset = self.get_mut(id)?;
                dynaset.rows.remove(index);
                selection_removed |= dynaset.cursor_after_removal(index);
            } else if row.is_new() {
                let statement = insert_statement(dynaset, row)?;
                self.run(id, &statement)?;
                let inserted = self.database.last_inserted_id();
                let dynaset = self.get_mut(id)?;
                let auto_ordinal = dynaset
                    .auto_column
                    .and_then(|column| dynaset.columns.meta(column).ordinal());
                if let Some(value) = inserted {
                    dynaset.last_row_id = Some(value);
                }
                if let Some(row) = dynaset.rows.get_mut(index) {
                    if let (Some(ordinal), Some(value)) = (auto_ordinal, inserted) {
                        row.assign(ordinal, Value::Integer(value));
                    }
                    row.mark_saved();
                }
                index += 1;
            } else if row.is_dirty() {
                let statement = update_statement(dynaset, row)?;
                self.run(id, &statement)?;
                if let Some(row) = self.get_mut(id)?.rows.get_mut(index) {
                    row.mark_saved();
                }
                index += 1;
            } else {
                index += 1;
                continue;
            }
            changed = true;
            written += 1;
        }

        let dynaset = self.get_mut(id)?;
        dynaset.dirty = false;
        dynaset.locked = true;
        debug!(statements = written, "save finished");
        self.thaw_clean_lineage(id)?;
        if changed {
            self.data_changed(id, Change::Full)?;
        } else {
            self.update_controls(id)?;
        }
        if selection_removed {
            self.notify_children(id)?;
        }
        Ok(written)
    }

    fn run(&mut self, id: DynasetId, statement: &Statement) -> Result<()> {
        debug!(kind = %statement.kind, sql = %statement.sql, "executing statement");
        trace!(params = ?statement.params, "statement parameters");
        self.get_mut(id)?.sql_log.record(statement);
        self.database.execute(&statement.sql, &statement.params)?;
        self.database.commit()?;
        Ok(())
    }
}

fn insert_statement(dynaset: &Dynaset, row: &Row) -> Result<Statement> {
    let mut builder = StatementBuilder::insert(&dynaset.table);
    for (column, ordinal, meta) in dynaset.columns.persisted() {
        if Some(column) == dynaset.auto_column {
            continue;
        }
        builder.column(meta.name(), cell(row.data(), ordinal));
    }
    if builder.column_count() == 0 {
        return Err(DynasetError::NoColumns {
            dynaset: dynaset.name.clone(),
            operation: "insert",
        });
    }
    Ok(builder.build())
}

fn update_statement(dynaset: &Dynaset, row: &Row) -> Result<Statement> {
    let mut builder = StatementBuilder::update(&dynaset.table);
    for (_, ordinal, meta) in dynaset.columns.persisted() {
        if meta.role().is_key() {
            builder.condition(meta.name(), cell(row.stored_values(), ordinal));
        } else {
            builder.column(meta.name(), cell(row.data(), ordinal));
        }
    }
    if builder.condition_count() == 0 {
        return Err(DynasetError::NoKeyColumns {
            dynaset: dynaset.name.clone(),
            operation: "update",
        });
    }
    if builder.column_count() == 0 {
        return Err(DynasetError::NoColumns {
            dynaset: dynaset.name.clone(),
            operation: "update",
        });
    }
    Ok(builder.build())
}

fn delete_statement(dynaset: &Dynaset, row: &Row) -> Result<Statement> {
    let mut builder = StatementBuilder::delete(&dynaset.table);
    for (_, ordinal, meta) in dynaset.columns.persisted() {
        if meta.role().is_key() {
            builder.condition(meta.name(), cell(row.stored_values(), ordinal));
        }
    }
    if builder.condition_count() == 0 {
        return Err(DynasetError::NoKeyColumns {
            dynaset: dynaset.name.clone(),
            operation: "delete",
        });
    }
    Ok(builder.build())
}

fn cell(values: &[Value], ordinal: usize) -> Value {
    values.get(ordinal).cloned().unwrap_or_default()
}
