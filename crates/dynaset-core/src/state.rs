//! Lock, freeze and cursor transitions.
//!
//! Freezing travels upward: unsaved changes in a dynaset freeze every
//! ancestor so no ancestor can move its cursor away from the rows the
//! changes belong to. Unlocking travels downward: editing a dynaset unlocks
//! its whole subtree.

use tracing::{debug, trace};

use crate::broadcast::Change;
use crate::dynaset::{DynasetFlag, DynasetId};
use crate::error::{DynasetError, Result};
use crate::graph::DynasetGraph;
use crate::widget::ButtonRole;

impl DynasetGraph {
    /// Freeze a dynaset and every ancestor. Idempotent.
    pub fn freeze(&mut self, id: DynasetId) -> Result<()> {
        let mut next = Some(id);
        while let Some(current) = next {
            let dynaset = self.get_mut(current)?;
            if !dynaset.frozen {
                trace!(dynaset = %dynaset.name, "frozen");
                dynaset.frozen = true;
            }
            next = dynaset.parent;
        }
        Ok(())
    }

    /// Lift the freeze. Fails while the dynaset or a descendant is dirty.
    pub fn thaw(&mut self, id: DynasetId) -> Result<()> {
        if !self.subtree_clean(id)? {
            return Err(DynasetError::Frozen {
                dynaset: self.get(id)?.name.clone(),
            });
        }
        self.get_mut(id)?.frozen = false;
        Ok(())
    }

    /// Unlock the dynaset and its whole subtree.
    pub fn edit(&mut self, id: DynasetId) -> Result<()> {
        self.set_flag_and_propagate_down(id, DynasetFlag::Locked, false)
    }

    /// Set a flag here and in every descendant, broadcasting at each level.
    pub fn set_flag_and_propagate_down(
        &mut self,
        id: DynasetId,
        flag: DynasetFlag,
        value: bool,
    ) -> Result<()> {
        let dynaset = self.get_mut(id)?;
        *dynaset.flag_mut(flag) = value;
        let children = dynaset.children.clone();
        self.data_changed(id, Change::Full)?;
        for child in children {
            self.set_flag_and_propagate_down(child, flag, value)?;
        }
        Ok(())
    }

    /// Move the cursor. `None` clears the selection; `Some(row_count)` parks
    /// the cursor after the last row, where there is no data to read.
    ///
    /// Moving to the current row does nothing. Otherwise widgets get a full
    /// change, then row pointers and data widgets (up to the first table) are
    /// refreshed, then every child reacts to the new parent selection.
    pub fn set_row(&mut self, id: DynasetId, row: Option<usize>) -> Result<()> {
        let dynaset = self.get(id)?;
        if dynaset.current_row == row {
            return Ok(());
        }
        if dynaset.frozen {
            return Err(DynasetError::Frozen {
                dynaset: dynaset.name.clone(),
            });
        }
        if let Some(row) = row
            && row > dynaset.rows.len()
        {
            return Err(DynasetError::IndexOutOfRange {
                row,
                row_count: dynaset.rows.len(),
            });
        }

        let dynaset = self.get_mut(id)?;
        trace!(dynaset = %dynaset.name, from = ?dynaset.current_row, to = ?row, "moving cursor");
        dynaset.current_row = row;
        self.data_changed(id, Change::Full)?;
        self.notify_row_moved(id)?;
        self.notify_children(id)
    }

    /// Run the action bound to a control button.
    pub fn press(&mut self, id: DynasetId, role: ButtonRole) -> Result<()> {
        debug!(dynaset = %self.get(id)?.name, button = %role, "button pressed");
        match role {
            ButtonRole::New => {
                self.new_row(id)?;
            }
            ButtonRole::Edit => self.edit(id)?,
            ButtonRole::Undo => self.undo(id)?,
            ButtonRole::Save => {
                self.save(id)?;
            }
            ButtonRole::Delete => self.delete(id)?,
            ButtonRole::Ok => {}
        }
        Ok(())
    }

    pub(crate) fn notify_children(&mut self, id: DynasetId) -> Result<()> {
        let children = self.get(id)?.children.clone();
        for child in children {
            self.parent_selection_changed(child)?;
        }
        Ok(())
    }

    /// True if neither the dynaset nor any descendant holds unsaved changes.
    pub(crate) fn subtree_clean(&self, id: DynasetId) -> Result<bool> {
        let dynaset = self.get(id)?;
        if dynaset.dirty {
            return Ok(false);
        }
        for &child in &dynaset.children {
            if !self.subtree_clean(child)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Thaw the dynaset and then its ancestors, up to the first one whose
    /// subtree still holds changes.
    pub(crate) fn thaw_clean_lineage(&mut self, id: DynasetId) -> Result<()> {
        let mut next = Some(id);
        while let Some(current) = next {
            if !self.subtree_clean(current)? {
                break;
            }
            let dynaset = self.get_mut(current)?;
            if dynaset.frozen {
                trace!(dynaset = %dynaset.name, "thawed");
                dynaset.frozen = false;
            }
            next = dynaset.parent;
        }
        Ok(())
    }
}
