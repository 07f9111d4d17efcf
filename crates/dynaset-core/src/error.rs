//! Error types for dynaset operations.
//!
//! Every failure is returned synchronously to the caller. Operations that
//! fail half way (`execute`, `save`) leave the state they reached in place;
//! nothing is rolled back or retried.

use dynaset_model::{ModelError, ValueType};
use thiserror::Error;

use crate::database::DatabaseError;
use crate::widget::ButtonRole;

/// Error raised by application code called back from the engine
/// (widget refreshes, hooks).
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DynasetError {
    /// Row index outside the row store.
    #[error("row {row} is out of range for {row_count} rows")]
    IndexOutOfRange { row: usize, row_count: usize },

    /// A descendant holds unsaved changes.
    #[error("dynaset '{dynaset}' is frozen by unsaved changes in a child dynaset")]
    Frozen { dynaset: String },

    /// Edits are not allowed until the dynaset is put into edit mode.
    #[error("dynaset '{dynaset}' is locked")]
    Locked { dynaset: String },

    #[error("dynaset '{dynaset}' has no column named '{column}'")]
    UnknownColumn { dynaset: String, column: String },

    /// The name is already declared with different metadata.
    #[error("column '{column}' is already declared on dynaset '{dynaset}'")]
    DuplicateColumn { dynaset: String, column: String },

    /// A parent link names a column the parent dynaset does not have.
    #[error("parent of dynaset '{dynaset}' has no column named '{column}'")]
    InvalidReference { dynaset: String, column: String },

    /// The query produced a column that is not registered.
    #[error("column '{column}' of the query is not declared on dynaset '{dynaset}'")]
    SchemaMismatch { dynaset: String, column: String },

    /// The column has no position in the current rows.
    #[error("column '{column}' of dynaset '{dynaset}' is not produced by its query")]
    UnboundColumn { dynaset: String, column: String },

    #[error("auto column '{column}' must be declared as integer, not {found}")]
    InvalidAutoColumn { column: String, found: ValueType },

    #[error("dynaset '{dynaset}' has no key columns, cannot {operation}")]
    NoKeyColumns {
        dynaset: String,
        operation: &'static str,
    },

    #[error("dynaset '{dynaset}' has no columns to {operation}")]
    NoColumns {
        dynaset: String,
        operation: &'static str,
    },

    #[error("row {row} has no changes to undo")]
    NothingToUndo { row: usize },

    #[error("dynaset '{dynaset}' has no row selected")]
    NoRowSelected { dynaset: String },

    #[error("dynaset '{dynaset}' has no query")]
    NoQuery { dynaset: String },

    #[error("no dynaset with id {0}")]
    UnknownDynaset(usize),

    /// A form names a parent that is not declared before it.
    #[error("dynaset '{dynaset}' names unknown parent '{parent}'")]
    UnknownParent { dynaset: String, parent: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("widget refresh failed on dynaset '{dynaset}'")]
    Widget {
        dynaset: String,
        #[source]
        source: CallbackError,
    },

    /// A bound button was still borrowed when its state had to change.
    #[error("{role} button of dynaset '{dynaset}' is in use and was not updated")]
    ButtonBusy { dynaset: String, role: ButtonRole },

    #[error("{hook} hook failed on dynaset '{dynaset}'")]
    Hook {
        dynaset: String,
        hook: &'static str,
        #[source]
        source: CallbackError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, DynasetError>;
