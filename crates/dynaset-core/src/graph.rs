//! The arena owning every dynaset of a form plus their shared connection.
//!
//! Parents hold the ids of their children, children hold the id of their
//! parent. All mutation goes through [`DynasetGraph`], which is what lets the
//! engine cascade freezes upward and unlocks downward without shared
//! ownership.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use dynaset_model::{KeyRole, ModelError, Row, Value, ValueType};
use tracing::debug;

use crate::database::Database;
use crate::dynaset::{Dynaset, DynasetConfig, DynasetId};
use crate::error::{CallbackError, DynasetError, Result};
use crate::registry::{Column, ColumnId, ColumnSpec};
use crate::statement::SqlLog;
use crate::view::{self, DynasetView};
use crate::widget::{BoundWidget, ButtonRole, ButtonStates, ControlButton, WidgetBinding, WidgetKind};

pub struct DynasetGraph {
    dynasets: Vec<Dynaset>,
    pub(crate) database: Box<dyn Database>,
}

impl DynasetGraph {
    pub fn new(database: impl Database + 'static) -> Self {
        Self {
            dynasets: Vec::new(),
            database: Box::new(database),
        }
    }

    pub fn database(&self) -> &dyn Database {
        self.database.as_ref()
    }

    pub fn database_mut(&mut self) -> &mut dyn Database {
        self.database.as_mut()
    }

    pub fn len(&self) -> usize {
        self.dynasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dynasets.is_empty()
    }

    /// Ids in creation order, parents before their children.
    pub fn ids(&self) -> impl Iterator<Item = DynasetId> + use<> {
        (0..self.dynasets.len()).map(DynasetId)
    }

    /// Dynasets without a parent.
    pub fn roots(&self) -> Vec<DynasetId> {
        self.ids()
            .filter(|id| self.dynasets[id.0].parent.is_none())
            .collect()
    }

    pub fn get(&self, id: DynasetId) -> Result<&Dynaset> {
        self.dynasets
            .get(id.0)
            .ok_or(DynasetError::UnknownDynaset(id.0))
    }

    pub(crate) fn get_mut(&mut self, id: DynasetId) -> Result<&mut Dynaset> {
        self.dynasets
            .get_mut(id.0)
            .ok_or(DynasetError::UnknownDynaset(id.0))
    }

    pub fn view(&self, id: DynasetId) -> Result<DynasetView<'_>> {
        let dynaset = self.get(id)?;
        Ok(DynasetView::new(self, id, dynaset))
    }

    pub fn find(&self, name: &str) -> Option<DynasetId> {
        self.dynasets
            .iter()
            .position(|dynaset| dynaset.name == name)
            .map(DynasetId)
    }

    /// Create a dynaset. It starts locked, with no rows and no selection.
    pub fn create(&mut self, config: DynasetConfig) -> Result<DynasetId> {
        if config.table.trim().is_empty() {
            return Err(ModelError::InvalidTableName(config.table).into());
        }
        if self.find(config.display_name()).is_some() {
            return Err(ModelError::DuplicateDynaset {
                name: config.display_name().to_string(),
            }
            .into());
        }
        if let Some(parent) = config.parent {
            self.get(parent)?;
        }

        let id = DynasetId(self.dynasets.len());
        let dynaset = Dynaset::new(config);
        debug!(
            dynaset = %dynaset.name,
            table = %dynaset.table,
            parent = ?dynaset.parent,
            "created dynaset"
        );
        if let Some(parent) = dynaset.parent {
            self.dynasets[parent.0].children.push(id);
        }
        self.dynasets.push(dynaset);
        Ok(id)
    }

    pub fn set_query(&mut self, id: DynasetId, query: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.query = Some(query.into());
        Ok(())
    }

    pub fn set_auto_execute(&mut self, id: DynasetId, auto_execute: bool) -> Result<()> {
        self.get_mut(id)?.auto_execute = auto_execute;
        Ok(())
    }

    // ========================================================================
    // Columns
    // ========================================================================

    /// Declare a column. A parent link must name a column of the parent.
    pub fn add_column(&mut self, id: DynasetId, spec: ColumnSpec) -> Result<ColumnId> {
        let dynaset = self.get(id)?;
        let parent_link = match &spec.parent_column {
            None => None,
            Some(name) => {
                let invalid = || DynasetError::InvalidReference {
                    dynaset: dynaset.name.clone(),
                    column: name.clone(),
                };
                let parent = dynaset.parent.ok_or_else(invalid)?;
                let link = self
                    .get(parent)?
                    .columns
                    .resolve(name)
                    .map_err(|_| invalid())?;
                Some(link)
            }
        };

        let dynaset = self.get_mut(id)?;
        let column = dynaset.columns.declare(spec, parent_link)?;
        dynaset.rows.invalidate_template();
        Ok(column)
    }

    pub fn column(&self, id: DynasetId, name: &str) -> Result<&Column> {
        self.get(id)?.columns.column(name)
    }

    /// Designate (or with `None`, forget) the auto-increment column.
    ///
    /// The column must be an integer column; it becomes a key column.
    pub fn set_auto_column(&mut self, id: DynasetId, column: Option<&str>) -> Result<()> {
        let dynaset = self.get_mut(id)?;
        let Some(name) = column else {
            dynaset.auto_column = None;
            dynaset.rows.invalidate_template();
            return Ok(());
        };
        let column = dynaset.columns.resolve(name)?;
        let found = dynaset.columns.meta(column).value_type();
        if found != ValueType::Integer {
            return Err(DynasetError::InvalidAutoColumn {
                column: name.to_string(),
                found,
            });
        }
        dynaset.columns.set_role(column, KeyRole::Key);
        dynaset.auto_column = Some(column);
        dynaset.rows.invalidate_template();
        Ok(())
    }

    // ========================================================================
    // Reading
    // ========================================================================

    pub fn current_row(&self, id: DynasetId) -> Result<Option<usize>> {
        Ok(self.get(id)?.current_row)
    }

    pub fn row_count(&self, id: DynasetId) -> Result<usize> {
        Ok(self.get(id)?.rows.len())
    }

    pub fn row(&self, id: DynasetId, row: usize) -> Result<&Row> {
        view::checked_row(self.get(id)?, row)
    }

    /// Value of a column in the current row.
    pub fn data(&self, id: DynasetId, column: &str) -> Result<&Value> {
        let row = self.selected(id)?;
        self.data_at(id, row, column)
    }

    pub fn data_at(&self, id: DynasetId, row: usize, column: &str) -> Result<&Value> {
        view::value_at(self.get(id)?, row, column)
    }

    /// Column name to value map of a row (the current one for `None`).
    ///
    /// Returns `None` when no row is given and the cursor is not on a row.
    pub fn row_values(
        &self,
        id: DynasetId,
        row: Option<usize>,
        keys_only: bool,
    ) -> Result<Option<BTreeMap<String, Value>>> {
        let dynaset = self.get(id)?;
        match row.or_else(|| dynaset.current_data_row()) {
            Some(row) => view::row_values(dynaset, row, keys_only).map(Some),
            None => Ok(None),
        }
    }

    pub fn sql_log(&self, id: DynasetId) -> Result<&SqlLog> {
        Ok(&self.get(id)?.sql_log)
    }

    pub fn last_row_id(&self, id: DynasetId) -> Result<Option<i64>> {
        Ok(self.get(id)?.last_row_id)
    }

    pub fn button_states(&self, id: DynasetId) -> Result<ButtonStates> {
        let dynaset = self.get(id)?;
        let current = dynaset.current_data_row().and_then(|row| dynaset.rows.get(row));
        Ok(ButtonStates::evaluate(current, dynaset.dirty, dynaset.locked))
    }

    pub(crate) fn selected(&self, id: DynasetId) -> Result<usize> {
        let dynaset = self.get(id)?;
        dynaset
            .current_data_row()
            .ok_or_else(|| DynasetError::NoRowSelected {
                dynaset: dynaset.name.clone(),
            })
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    pub fn bind_widget<W: BoundWidget + 'static>(
        &mut self,
        id: DynasetId,
        widget: &Rc<RefCell<W>>,
        kind: WidgetKind,
    ) -> Result<()> {
        let dynaset = self.get_mut(id)?;
        let column = match &kind {
            WidgetKind::DataBound { column } => Some(dynaset.columns.resolve(column)?),
            WidgetKind::Table | WidgetKind::RowPointer => None,
        };
        let widget: Rc<RefCell<dyn BoundWidget>> = widget.clone();
        dynaset.widgets.retain(|binding| binding.widget.strong_count() > 0);
        dynaset.widgets.push(WidgetBinding {
            kind,
            column,
            widget: Rc::downgrade(&widget),
        });
        Ok(())
    }

    /// Returns false if the widget was not bound.
    pub fn unbind_widget<W: BoundWidget + 'static>(
        &mut self,
        id: DynasetId,
        widget: &Rc<RefCell<W>>,
    ) -> Result<bool> {
        let dynaset = self.get_mut(id)?;
        let before = dynaset.widgets.len();
        dynaset.widgets.retain(|binding| match binding.widget.upgrade() {
            Some(bound) => !std::ptr::addr_eq(Rc::as_ptr(&bound), Rc::as_ptr(widget)),
            None => false,
        });
        Ok(dynaset.widgets.len() < before)
    }

    /// Bind a button and bring its enabled state up to date.
    pub fn bind_button<B: ControlButton + 'static>(
        &mut self,
        id: DynasetId,
        role: ButtonRole,
        button: &Rc<RefCell<B>>,
    ) -> Result<()> {
        let button: Rc<RefCell<dyn ControlButton>> = button.clone();
        self.get_mut(id)?
            .buttons
            .insert(role, Rc::downgrade(&button));
        self.update_controls(id)
    }

    pub fn unbind_button(&mut self, id: DynasetId, role: ButtonRole) -> Result<bool> {
        Ok(self.get_mut(id)?.buttons.remove(&role).is_some())
    }

    pub fn set_before_save(
        &mut self,
        id: DynasetId,
        hook: impl Fn(&DynasetView<'_>) -> std::result::Result<bool, CallbackError> + 'static,
    ) -> Result<()> {
        self.get_mut(id)?.hooks.before_save = Some(Box::new(hook));
        Ok(())
    }

    pub fn set_on_parent_changed(
        &mut self,
        id: DynasetId,
        hook: impl Fn(&DynasetView<'_>) -> std::result::Result<(), CallbackError> + 'static,
    ) -> Result<()> {
        self.get_mut(id)?.hooks.on_parent_changed = Some(Box::new(hook));
        Ok(())
    }
}

impl std::fmt::Debug for DynasetGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynasetGraph")
            .field("dynasets", &self.dynasets)
            .finish_non_exhaustive()
    }
}
