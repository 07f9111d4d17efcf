//! Column registry: per-dynaset column metadata and ordinal binding.
//!
//! Columns are declared by name. Their position in the row tuples is not
//! known until a query result is bound (matching names against the driver's
//! column descriptors) or, before any query has run, until the first new row
//! is synthesized (declaration order). Every row of the dynaset shares the
//! ordinals stored here.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use dynaset_model::{KeyRole, Value, ValueType};

use crate::database::ColumnDescriptor;
use crate::error::{DynasetError, Result};

/// Zero-argument function producing the default of a new row's column.
pub type DefaultProvider = Rc<dyn Fn() -> Value>;

/// Index of a column inside its dynaset's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(usize);

impl ColumnId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Builder for a column declaration.
#[derive(Clone)]
pub struct ColumnSpec {
    pub(crate) name: String,
    pub(crate) value_type: ValueType,
    pub(crate) role: KeyRole,
    pub(crate) format: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) default_provider: Option<DefaultProvider>,
    pub(crate) parent_column: Option<String>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            value_type: ValueType::default(),
            role: KeyRole::default(),
            format: None,
            default: None,
            default_provider: None,
            parent_column: None,
        }
    }

    #[must_use]
    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: KeyRole) -> Self {
        self.role = role;
        self
    }

    /// Shorthand for `with_role(KeyRole::Key)`.
    #[must_use]
    pub fn key(self) -> Self {
        self.with_role(KeyRole::Key)
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Called for every new row when no static default is set.
    #[must_use]
    pub fn with_default_provider(mut self, provider: impl Fn() -> Value + 'static) -> Self {
        self.default_provider = Some(Rc::new(provider));
        self
    }

    /// Link the column to a column of the parent dynaset.
    #[must_use]
    pub fn with_parent_column(mut self, name: impl Into<String>) -> Self {
        self.parent_column = Some(name.into());
        self
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("role", &self.role)
            .field("parent_column", &self.parent_column)
            .finish_non_exhaustive()
    }
}

/// Registered column metadata.
#[derive(Clone)]
pub struct Column {
    name: String,
    ordinal: Option<usize>,
    value_type: ValueType,
    role: KeyRole,
    format: Option<String>,
    default: Option<Value>,
    default_provider: Option<DefaultProvider>,
    parent: Option<ColumnId>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in the row tuples, `None` while unresolved.
    pub fn ordinal(&self) -> Option<usize> {
        self.ordinal
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn role(&self) -> KeyRole {
        self.role
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn has_default_provider(&self) -> bool {
        self.default_provider.is_some()
    }

    /// Linked column of the parent dynaset.
    pub fn parent(&self) -> Option<ColumnId> {
        self.parent
    }

    /// Value for a new row: the static default, else the provider's value.
    pub(crate) fn initial_value(&self) -> Value {
        match (&self.default, &self.default_provider) {
            (Some(value), _) => value.clone(),
            (None, Some(provider)) => provider(),
            (None, None) => Value::Null,
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("ordinal", &self.ordinal)
            .field("value_type", &self.value_type)
            .field("role", &self.role)
            .field("format", &self.format)
            .field("default", &self.default)
            .field("default_provider", &self.default_provider.is_some())
            .field("parent", &self.parent)
            .finish()
    }
}

/// Ordered column metadata of one dynaset.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    owner: String,
    columns: Vec<Column>,
    by_name: BTreeMap<String, ColumnId>,
    width: usize,
    query_bound: bool,
}

impl ColumnRegistry {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    /// Register a column whose parent link is already resolved.
    ///
    /// Declaring a name again with the same type and key role returns the
    /// existing column unchanged; any other re-declaration is a conflict.
    pub(crate) fn declare(&mut self, spec: ColumnSpec, parent: Option<ColumnId>) -> Result<ColumnId> {
        if spec.name.is_empty() {
            return Err(dynaset_model::ModelError::InvalidColumnName(spec.name).into());
        }
        if let Some(&id) = self.by_name.get(&spec.name) {
            let existing = &self.columns[id.0];
            if existing.value_type == spec.value_type && existing.role == spec.role {
                return Ok(id);
            }
            return Err(DynasetError::DuplicateColumn {
                dynaset: self.owner.clone(),
                column: spec.name,
            });
        }
        let id = ColumnId(self.columns.len());
        self.by_name.insert(spec.name.clone(), id);
        self.columns.push(Column {
            name: spec.name,
            ordinal: None,
            value_type: spec.value_type,
            role: spec.role,
            format: spec.format,
            default: spec.default,
            default_provider: spec.default_provider,
            parent,
        });
        Ok(id)
    }

    pub fn resolve(&self, name: &str) -> Result<ColumnId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| DynasetError::UnknownColumn {
                dynaset: self.owner.clone(),
                column: name.to_string(),
            })
    }

    /// `None` for an id handed out by another registry.
    pub fn get(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get(id.0)
    }

    /// Metadata of a column id this registry handed out.
    pub(crate) fn meta(&self, id: ColumnId) -> &Column {
        &self.columns[id.0]
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.resolve(name).map(|id| self.meta(id))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnId, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, column)| (ColumnId(index), column))
    }

    /// Number of slots in a row tuple.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn ordinal(&self, id: ColumnId) -> Result<usize> {
        let column = self.get(id).ok_or_else(|| DynasetError::UnknownColumn {
            dynaset: self.owner.clone(),
            column: id.to_string(),
        })?;
        column.ordinal.ok_or_else(|| DynasetError::UnboundColumn {
            dynaset: self.owner.clone(),
            column: column.name.clone(),
        })
    }

    pub(crate) fn set_role(&mut self, id: ColumnId, role: KeyRole) {
        self.columns[id.0].role = role;
    }

    /// Point every column at its position in a query result.
    ///
    /// A result column that is not registered fails the binding. A registered
    /// column the query does not produce stays unbound.
    pub(crate) fn bind(&mut self, descriptors: &[ColumnDescriptor]) -> Result<()> {
        for column in &mut self.columns {
            column.ordinal = None;
        }
        self.width = 0;
        self.query_bound = false;
        for (position, descriptor) in descriptors.iter().enumerate() {
            let id = self
                .by_name
                .get(&descriptor.name)
                .copied()
                .ok_or_else(|| DynasetError::SchemaMismatch {
                    dynaset: self.owner.clone(),
                    column: descriptor.name.clone(),
                })?;
            self.columns[id.0].ordinal = Some(position);
        }
        self.width = descriptors.len();
        self.query_bound = true;
        Ok(())
    }

    /// Give unresolved columns positions in declaration order.
    ///
    /// Only applies while no query result has been bound; after a query,
    /// columns it did not produce stay unused.
    pub(crate) fn synthesize(&mut self) -> usize {
        if !self.query_bound {
            for column in &mut self.columns {
                if column.ordinal.is_none() {
                    column.ordinal = Some(self.width);
                    self.width += 1;
                }
            }
        }
        self.width
    }

    /// Bound columns that are written back, in declaration order.
    pub(crate) fn persisted(&self) -> impl Iterator<Item = (ColumnId, usize, &Column)> {
        self.iter().filter_map(|(id, column)| {
            column
                .ordinal
                .filter(|_| column.role.is_persisted())
                .map(|ordinal| (id, ordinal, column))
        })
    }

    /// Columns linked to a column of the parent dynaset.
    pub(crate) fn linked(&self) -> impl Iterator<Item = (ColumnId, ColumnId)> + '_ {
        self.iter()
            .filter_map(|(id, column)| column.parent.map(|parent| (id, parent)))
    }
}
