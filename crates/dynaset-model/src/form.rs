//! Declarative description of a form's dynasets.
//!
//! A form lists its dynasets parents first. Each dynaset names its table,
//! its query and its columns; child dynasets name their parent and link
//! columns to parent columns, which is what drives parameter binding when
//! the parent's selection moves.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ColumnDef;
use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(rename = "dynaset", default)]
    pub dynasets: Vec<DynasetDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynasetDefinition {
    /// Lookup name, defaults to the table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_column: Option<String>,
    #[serde(default = "default_auto_execute")]
    pub auto_execute: bool,
    #[serde(rename = "column", default)]
    pub columns: Vec<ColumnDef>,
}

fn default_auto_execute() -> bool {
    true
}

impl DynasetDefinition {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.table)
    }
}

impl FormDefinition {
    /// Check names before any dynaset is built from the form.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for dynaset in &self.dynasets {
            if dynaset.table.trim().is_empty() {
                return Err(ModelError::InvalidTableName(dynaset.table.clone()));
            }
            if !seen.insert(dynaset.display_name()) {
                return Err(ModelError::DuplicateDynaset {
                    name: dynaset.display_name().to_string(),
                });
            }
            for column in &dynaset.columns {
                if column.name.trim().is_empty() {
                    return Err(ModelError::InvalidColumnName(column.name.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&DynasetDefinition> {
        self.dynasets.iter().find(|d| d.display_name() == name)
    }
}
