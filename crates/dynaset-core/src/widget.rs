//! Bound widgets, control buttons and the button enablement policy.
//!
//! The engine never owns a widget or a button. Both are registered as weak
//! references; once the owner drops them they are skipped and eventually
//! pruned.

use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

use dynaset_model::Row;

use crate::error::CallbackError;
use crate::registry::ColumnId;
use crate::view::DynasetView;

/// A widget that displays data of a dynaset.
pub trait BoundWidget {
    /// Redraw everything the widget shows.
    fn refresh(&mut self, view: &DynasetView<'_>) -> Result<(), CallbackError>;

    /// Redraw one cell. Only table widgets receive this.
    fn refresh_cell(
        &mut self,
        view: &DynasetView<'_>,
        row: usize,
        column: &str,
    ) -> Result<(), CallbackError> {
        let _ = (row, column);
        self.refresh(view)
    }

    /// Move the widget's row indicator to the current row.
    fn refresh_row_pointer(&mut self, view: &DynasetView<'_>) -> Result<(), CallbackError> {
        let _ = view;
        Ok(())
    }
}

/// How a widget relates to the dynaset it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetKind {
    /// Shows many rows; manages itself from full and cell changes.
    Table,
    /// Tracks the current row.
    RowPointer,
    /// Shows one column of the current row.
    DataBound { column: String },
}

impl WidgetKind {
    pub fn data_bound(column: impl Into<String>) -> Self {
        Self::DataBound {
            column: column.into(),
        }
    }
}

pub(crate) struct WidgetBinding {
    pub(crate) kind: WidgetKind,
    /// Resolved column of a `DataBound` widget.
    pub(crate) column: Option<ColumnId>,
    pub(crate) widget: Weak<RefCell<dyn BoundWidget>>,
}

impl fmt::Debug for WidgetBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetBinding")
            .field("kind", &self.kind)
            .field("column", &self.column)
            .field("alive", &(self.widget.strong_count() > 0))
            .finish()
    }
}

/// A button whose enabled state follows the dynaset.
pub trait ControlButton {
    fn set_enabled(&mut self, enabled: bool);
}

/// The action a control button triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ButtonRole {
    New,
    Edit,
    Undo,
    Save,
    Delete,
    Ok,
}

impl ButtonRole {
    pub const ALL: [Self; 6] = [
        Self::New,
        Self::Edit,
        Self::Undo,
        Self::Save,
        Self::Delete,
        Self::Ok,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Edit => "edit",
            Self::Undo => "undo",
            Self::Save => "save",
            Self::Delete => "delete",
            Self::Ok => "ok",
        }
    }
}

impl fmt::Display for ButtonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enabled state of every button role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonStates {
    pub new: bool,
    pub edit: bool,
    pub undo: bool,
    pub save: bool,
    pub delete: bool,
    pub ok: bool,
}

impl ButtonStates {
    /// Apply the policy to the current row (if any) and the dynaset flags.
    pub fn evaluate(current: Option<&Row>, dirty: bool, locked: bool) -> Self {
        let row_dirty = current.is_some_and(Row::is_dirty);
        let row_new = current.is_some_and(Row::is_new);
        let row_deleted = current.is_some_and(Row::is_deleted);
        Self {
            new: !row_dirty && !row_new,
            edit: locked && current.is_some(),
            undo: row_dirty || row_deleted,
            save: dirty,
            delete: !row_deleted,
            ok: current.is_some(),
        }
    }

    pub fn enabled(&self, role: ButtonRole) -> bool {
        match role {
            ButtonRole::New => self.new,
            ButtonRole::Edit => self.edit,
            ButtonRole::Undo => self.undo,
            ButtonRole::Save => self.save,
            ButtonRole::Delete => self.delete,
            ButtonRole::Ok => self.ok,
        }
    }
}
