//! Change broadcasting to bound widgets and control buttons.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::dynaset::{Dynaset, DynasetId};
use crate::error::{CallbackError, DynasetError, Result};
use crate::graph::DynasetGraph;
use crate::registry::ColumnId;
use crate::view::DynasetView;
use crate::widget::{BoundWidget, ButtonStates, WidgetKind};

/// What changed in a dynaset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Rows, selection or flags changed; everything should redraw.
    Full,
    /// One cell of one row changed.
    Cell { row: usize, column: ColumnId },
}

impl DynasetGraph {
    /// Notify widgets of a change, then re-evaluate the control buttons.
    ///
    /// The first widget failure stops the broadcast; widgets notified before
    /// it keep what they saw.
    pub fn data_changed(&self, id: DynasetId, change: Change) -> Result<()> {
        let dynaset = self.get(id)?;
        let cell_column = match change {
            Change::Cell { column, .. } => Some(
                dynaset
                    .columns
                    .get(column)
                    .ok_or_else(|| DynasetError::UnknownColumn {
                        dynaset: dynaset.name.clone(),
                        column: column.to_string(),
                    })?
                    .name(),
            ),
            Change::Full => None,
        };
        trace!(dynaset = %dynaset.name, ?change, "broadcasting change");
        let view = DynasetView::new(self, id, dynaset);
        broadcasting(dynaset, || {
            for binding in &dynaset.widgets {
                let Some(widget) = binding.widget.upgrade() else {
                    continue;
                };
                let outcome = match (&binding.kind, change) {
                    (WidgetKind::Table, Change::Full) => with_widget(&widget, |w| w.refresh(&view)),
                    (WidgetKind::Table, Change::Cell { row, .. }) => {
                        let name = cell_column.unwrap_or_default();
                        with_widget(&widget, |w| w.refresh_cell(&view, row, name))
                    }
                    (_, Change::Full) if dynaset.current_data_row().is_some() => {
                        with_widget(&widget, |w| w.refresh(&view))
                    }
                    (_, Change::Cell { row, column })
                        if dynaset.current_row == Some(row) && binding.column == Some(column) =>
                    {
                        with_widget(&widget, |w| w.refresh(&view))
                    }
                    _ => continue,
                };
                outcome.map_err(|source| widget_error(dynaset, source))?;
            }
            Ok(())
        })?;
        self.update_controls(id)
    }

    /// Tell row pointers and data widgets that the cursor moved.
    ///
    /// Stops at the first table widget; tables follow the full change that
    /// precedes this call.
    pub(crate) fn notify_row_moved(&self, id: DynasetId) -> Result<()> {
        let dynaset = self.get(id)?;
        let view = DynasetView::new(self, id, dynaset);
        broadcasting(dynaset, || {
            for binding in &dynaset.widgets {
                let Some(widget) = binding.widget.upgrade() else {
                    continue;
                };
                let outcome = match binding.kind {
                    WidgetKind::RowPointer => with_widget(&widget, |w| w.refresh_row_pointer(&view)),
                    WidgetKind::DataBound { .. } => with_widget(&widget, |w| w.refresh(&view)),
                    WidgetKind::Table => break,
                };
                outcome.map_err(|source| widget_error(dynaset, source))?;
            }
            Ok(())
        })
    }

    /// Push the button policy to every live bound button.
    ///
    /// A button that is borrowed elsewhere keeps its old state; the other
    /// buttons are still updated and the first such button is reported.
    pub fn update_controls(&self, id: DynasetId) -> Result<()> {
        let dynaset = self.get(id)?;
        let current = dynaset.current_data_row().and_then(|row| dynaset.rows.get(row));
        let states = ButtonStates::evaluate(current, dynaset.dirty, dynaset.locked);
        let mut busy = None;
        for (role, button) in &dynaset.buttons {
            let Some(button) = button.upgrade() else {
                continue;
            };
            match button.try_borrow_mut() {
                Ok(mut button) => button.set_enabled(states.enabled(*role)),
                Err(_) => {
                    busy.get_or_insert(*role);
                }
            }
        }
        match busy {
            Some(role) => Err(DynasetError::ButtonBusy {
                dynaset: dynaset.name.clone(),
                role,
            }),
            None => Ok(()),
        }
    }
}

fn broadcasting(dynaset: &Dynaset, notify: impl FnOnce() -> Result<()>) -> Result<()> {
    dynaset.broadcasting.set(true);
    let result = notify();
    dynaset.broadcasting.set(false);
    result
}

fn with_widget(
    widget: &Rc<RefCell<dyn BoundWidget>>,
    refresh: impl FnOnce(&mut dyn BoundWidget) -> std::result::Result<(), CallbackError>,
) -> std::result::Result<(), CallbackError> {
    let mut widget = widget
        .try_borrow_mut()
        .map_err(|err| CallbackError::from(err.to_string()))?;
    refresh(&mut *widget)
}

fn widget_error(dynaset: &Dynaset, source: CallbackError) -> DynasetError {
    DynasetError::Widget {
        dynaset: dynaset.name.clone(),
        source,
    }
}
