//! Hierarchical data-binding engine.
//!
//! A dynaset is an editable view over one query result. Dynasets form a
//! tree: a child re-runs its query whenever its parent's current row moves,
//! binding parameters from the columns it links to the parent. Edits are
//! tracked per row with an undo snapshot, unsaved changes freeze every
//! ancestor, and saving turns pending changes into INSERT, UPDATE and DELETE
//! statements (children first).
//!
//! Widgets and control buttons are collaborators: the engine holds weak
//! references to them and notifies them through [`BoundWidget`] and
//! [`ControlButton`]. The database is reached through [`Database`].
//!
//! ```no_run
//! # fn demo(db: impl dynaset_core::Database + 'static) -> dynaset_core::Result<()> {
//! use dynaset_core::{ColumnSpec, DynasetConfig, DynasetGraph};
//! use dynaset_model::ValueType;
//!
//! let mut graph = DynasetGraph::new(db);
//! let people = graph.create(DynasetConfig::new("people").with_query("SELECT id, name FROM people"))?;
//! graph.add_column(people, ColumnSpec::new("id").with_type(ValueType::Integer).key())?;
//! graph.add_column(people, ColumnSpec::new("name"))?;
//! graph.set_auto_column(people, Some("id"))?;
//!
//! graph.execute(people)?;
//! graph.new_row(people)?;
//! graph.set_data(people, "name", "Ada")?;
//! graph.save(people)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod broadcast;
pub mod database;
pub mod dynaset;
mod edit;
pub mod error;
pub mod form;
pub mod graph;
mod persist;
mod query;
pub mod registry;
mod state;
pub mod statement;
pub mod store;
pub mod view;
pub mod widget;

pub use broadcast::Change;
pub use database::{ColumnDescriptor, Database, DatabaseError, QueryParams, ResultSet};
pub use dynaset::{
    BeforeSaveHook, Dynaset, DynasetConfig, DynasetFlag, DynasetId, ParentChangedHook,
};
pub use error::{CallbackError, DynasetError, Result};
pub use form::{column_spec, default_provider};
pub use graph::DynasetGraph;
pub use registry::{Column, ColumnId, ColumnRegistry, ColumnSpec, DefaultProvider};
pub use statement::{SqlLog, Statement, StatementBuilder, StatementKind};
pub use store::RowStore;
pub use view::DynasetView;
pub use widget::{BoundWidget, ButtonRole, ButtonStates, ControlButton, WidgetKind};
