//! Building a graph from a declarative form definition.

use std::rc::Rc;

use dynaset_model::{ColumnDef, DefaultFn, FormDefinition, Value};
use tracing::info;

use crate::database::Database;
use crate::dynaset::{DynasetConfig, DynasetId};
use crate::error::{DynasetError, Result};
use crate::graph::DynasetGraph;
use crate::registry::{ColumnSpec, DefaultProvider};

impl DynasetGraph {
    /// Create a graph holding every dynaset of the form.
    pub fn from_form(form: &FormDefinition, database: impl Database + 'static) -> Result<Self> {
        let mut graph = Self::new(database);
        graph.load_form(form)?;
        Ok(graph)
    }

    /// Add the form's dynasets in document order. A parent must be declared
    /// before its children.
    pub fn load_form(&mut self, form: &FormDefinition) -> Result<Vec<DynasetId>> {
        form.validate()?;
        let mut ids = Vec::with_capacity(form.dynasets.len());
        for definition in &form.dynasets {
            let mut config = DynasetConfig::new(&definition.table)
                .with_auto_execute(definition.auto_execute);
            if let Some(name) = &definition.name {
                config = config.with_name(name);
            }
            if let Some(query) = &definition.query {
                config = config.with_query(query);
            }
            if let Some(parent) = &definition.parent {
                let parent_id = self.find(parent).ok_or_else(|| DynasetError::UnknownParent {
                    dynaset: definition.display_name().to_string(),
                    parent: parent.clone(),
                })?;
                config = config.with_parent(parent_id);
            }

            let id = self.create(config)?;
            for column in &definition.columns {
                self.add_column(id, column_spec(column))?;
            }
            if let Some(auto_column) = &definition.auto_column {
                self.set_auto_column(id, Some(auto_column))?;
            }
            ids.push(id);
        }
        info!(dynasets = ids.len(), "form loaded");
        Ok(ids)
    }
}

/// Translate a declared column into a registration.
pub fn column_spec(def: &ColumnDef) -> ColumnSpec {
    let mut spec = ColumnSpec::new(&def.name)
        .with_type(def.value_type)
        .with_role(def.role);
    if let Some(format) = &def.format {
        spec = spec.with_format(format);
    }
    if let Some(value) = &def.default {
        spec = spec.with_default(value.clone());
    }
    if let Some(default_fn) = def.default_fn {
        spec.default_provider = Some(default_provider(default_fn));
    }
    if let Some(parent) = &def.parent {
        spec = spec.with_parent_column(parent);
    }
    spec
}

/// Provider for one of the built-in default functions (local time).
pub fn default_provider(default_fn: DefaultFn) -> DefaultProvider {
    match default_fn {
        DefaultFn::Today => {
            Rc::new(|| Value::Text(chrono::Local::now().format("%Y-%m-%d").to_string()))
        }
        DefaultFn::Now => Rc::new(|| {
            Value::Text(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
        }),
    }
}
