use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::{Value, ValueType};

/// How a column takes part in persistence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    /// Part of the primary key; identifies the row in UPDATE and DELETE.
    Key,
    /// Ordinary database column.
    #[default]
    Data,
    /// Present in the query result but never written back.
    Unpersisted,
}

impl KeyRole {
    pub fn is_key(self) -> bool {
        matches!(self, Self::Key)
    }

    pub fn is_persisted(self) -> bool {
        !matches!(self, Self::Unpersisted)
    }
}

/// Built-in default providers that can be named in a form definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultFn {
    /// Current local date, `YYYY-MM-DD`.
    Today,
    /// Current local date and time, `YYYY-MM-DD HH:MM:SS`.
    Now,
}

/// Declarative column metadata as written in a form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub role: KeyRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_fn: Option<DefaultFn>,
    /// Name of the linked column in the parent dynaset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidColumnName(name));
        }
        Ok(Self {
            name: trimmed.to_string(),
            value_type: ValueType::default(),
            role: KeyRole::default(),
            format: None,
            default: None,
            default_fn: None,
            parent: None,
        })
    }
}
