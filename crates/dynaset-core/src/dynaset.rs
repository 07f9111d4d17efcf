//! The dynaset aggregate and its configuration.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Weak;

use crate::error::CallbackError;
use crate::registry::{ColumnId, ColumnRegistry};
use crate::statement::SqlLog;
use crate::store::RowStore;
use crate::view::DynasetView;
use crate::widget::{ButtonRole, ControlButton, WidgetBinding};

/// Handle of a dynaset inside its [`DynasetGraph`](crate::DynasetGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DynasetId(pub(crate) usize);

impl DynasetId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DynasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runs before a save; returning `false` declines it.
pub type BeforeSaveHook = Box<dyn Fn(&DynasetView<'_>) -> Result<bool, CallbackError>>;

/// Runs when the parent's current row changed, before any re-query.
pub type ParentChangedHook = Box<dyn Fn(&DynasetView<'_>) -> Result<(), CallbackError>>;

#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) before_save: Option<BeforeSaveHook>,
    pub(crate) on_parent_changed: Option<ParentChangedHook>,
}

/// Flags that can be pushed down a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynasetFlag {
    Locked,
    AutoExecute,
}

/// Settings for a new dynaset.
#[derive(Debug, Clone)]
pub struct DynasetConfig {
    pub table: String,
    pub name: Option<String>,
    pub query: Option<String>,
    pub parent: Option<DynasetId>,
    pub auto_execute: bool,
}

impl DynasetConfig {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: None,
            query: None,
            parent: None,
            auto_execute: true,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: DynasetId) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_auto_execute(mut self, auto_execute: bool) -> Self {
        self.auto_execute = auto_execute;
        self
    }

    /// Name used for lookups: the explicit name, else the table.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.table)
    }
}

/// One bound, editable view over a query result.
///
/// Dynasets live in a [`DynasetGraph`](crate::DynasetGraph) and are only
/// mutated through it.
pub struct Dynaset {
    pub(crate) name: String,
    pub(crate) table: String,
    pub(crate) query: Option<String>,
    pub(crate) parent: Option<DynasetId>,
    pub(crate) children: Vec<DynasetId>,
    pub(crate) columns: ColumnRegistry,
    pub(crate) rows: RowStore,
    pub(crate) current_row: Option<usize>,
    pub(crate) auto_column: Option<ColumnId>,
    pub(crate) locked: bool,
    pub(crate) frozen: bool,
    pub(crate) dirty: bool,
    pub(crate) auto_execute: bool,
    pub(crate) broadcasting: Cell<bool>,
    pub(crate) widgets: Vec<WidgetBinding>,
    pub(crate) buttons: BTreeMap<ButtonRole, Weak<RefCell<dyn ControlButton>>>,
    pub(crate) hooks: Hooks,
    pub(crate) sql_log: SqlLog,
    pub(crate) last_row_id: Option<i64>,
}

impl Dynaset {
    pub(crate) fn new(config: DynasetConfig) -> Self {
        let name = config.display_name().to_string();
        Self {
            columns: ColumnRegistry::new(name.clone()),
            name,
            table: config.table,
            query: config.query,
            parent: config.parent,
            children: Vec::new(),
            rows: RowStore::default(),
            current_row: None,
            auto_column: None,
            locked: true,
            frozen: false,
            dirty: false,
            auto_execute: config.auto_execute,
            broadcasting: Cell::new(false),
            widgets: Vec::new(),
            buttons: BTreeMap::new(),
            hooks: Hooks::default(),
            sql_log: SqlLog::default(),
            last_row_id: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn parent(&self) -> Option<DynasetId> {
        self.parent
    }

    pub fn children(&self) -> &[DynasetId] {
        &self.children
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    pub fn current_row(&self) -> Option<usize> {
        self.current_row
    }

    pub fn auto_column(&self) -> Option<ColumnId> {
        self.auto_column
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn auto_execute(&self) -> bool {
        self.auto_execute
    }

    /// True while widgets are being notified.
    pub fn is_broadcasting(&self) -> bool {
        self.broadcasting.get()
    }

    pub fn sql_log(&self) -> &SqlLog {
        &self.sql_log
    }

    /// Id generated by the last INSERT this dynaset ran.
    pub fn last_row_id(&self) -> Option<i64> {
        self.last_row_id
    }

    /// The cursor if it points at a row, `None` when nothing is selected or
    /// the cursor sits after the last row.
    pub(crate) fn current_data_row(&self) -> Option<usize> {
        self.current_row.filter(|&row| row < self.rows.len())
    }

    pub(crate) fn flag_mut(&mut self, flag: DynasetFlag) -> &mut bool {
        match flag {
            DynasetFlag::Locked => &mut self.locked,
            DynasetFlag::AutoExecute => &mut self.auto_execute,
        }
    }

    /// Shift the cursor after the row at `index` was removed.
    ///
    /// Returns true if the removed row was the selected one.
    pub(crate) fn cursor_after_removal(&mut self, index: usize) -> bool {
        match self.current_row {
            Some(current) if current == index => {
                self.current_row = None;
                true
            }
            Some(current) if current > index => {
                self.current_row = Some(current - 1);
                false
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Dynaset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dynaset")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("query", &self.query)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("rows", &self.rows.len())
            .field("current_row", &self.current_row)
            .field("locked", &self.locked)
            .field("frozen", &self.frozen)
            .field("dirty", &self.dirty)
            .field("auto_execute", &self.auto_execute)
            .finish_non_exhaustive()
    }
}
