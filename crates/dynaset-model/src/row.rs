//! A row of a dynaset with its undo snapshot.

use serde::{Deserialize, Serialize};

use crate::Value;

/// One row of a dynaset.
///
/// `data_old` is captured by the first edit of a clean row and kept until the
/// row is saved or reverted; later edits never overwrite it. A row is clean
/// iff it has no snapshot. `is_new` and `is_deleted` are tracked separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    data: Vec<Value>,
    data_old: Option<Vec<Value>>,
    is_new: bool,
    is_deleted: bool,
}

impl Row {
    /// A row read from the database.
    pub fn fetched(data: Vec<Value>) -> Self {
        Self {
            data,
            data_old: None,
            is_new: false,
            is_deleted: false,
        }
    }

    /// A row that has not been written to the database yet.
    pub fn pending(data: Vec<Value>) -> Self {
        Self {
            data,
            data_old: None,
            is_new: true,
            is_deleted: false,
        }
    }

    pub fn data(&self) -> &[Value] {
        &self.data
    }

    pub fn data_old(&self) -> Option<&[Value]> {
        self.data_old.as_deref()
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// True while the row carries unsaved edits.
    pub fn is_dirty(&self) -> bool {
        self.data_old.is_some()
    }

    /// True if saving would touch this row.
    pub fn has_pending_change(&self) -> bool {
        self.is_dirty() || self.is_new || self.is_deleted
    }

    pub fn get(&self, ordinal: usize) -> Option<&Value> {
        self.data.get(ordinal)
    }

    /// Values identifying the row as it is stored in the database.
    ///
    /// This is the snapshot when the row has been edited, so a changed key
    /// still addresses the original record.
    pub fn stored_values(&self) -> &[Value] {
        self.data_old.as_deref().unwrap_or(&self.data)
    }

    /// Replace one value, capturing the snapshot on the first edit.
    ///
    /// Returns the value that was replaced.
    pub fn set(&mut self, ordinal: usize, value: Value) -> Value {
        if self.data_old.is_none() {
            self.data_old = Some(self.data.clone());
        }
        self.write(ordinal, value)
    }

    /// Replace one value without starting a dirty episode.
    pub fn assign(&mut self, ordinal: usize, value: Value) -> Value {
        self.write(ordinal, value)
    }

    /// Restore the snapshot and lift a pending delete.
    ///
    /// Returns false if there was nothing to revert.
    pub fn revert(&mut self) -> bool {
        let mut reverted = false;
        if let Some(old) = self.data_old.take() {
            self.data = old;
            reverted = true;
        }
        if self.is_deleted {
            self.is_deleted = false;
            reverted = true;
        }
        reverted
    }

    /// Flag the row for deletion. Returns false if it already was.
    pub fn mark_deleted(&mut self) -> bool {
        if self.is_deleted {
            return false;
        }
        self.is_deleted = true;
        true
    }

    /// Forget the snapshot and the new flag after a successful write.
    pub fn mark_saved(&mut self) {
        self.data_old = None;
        self.is_new = false;
    }

    fn write(&mut self, ordinal: usize, value: Value) -> Value {
        if ordinal >= self.data.len() {
            self.data.resize(ordinal + 1, Value::Null);
        }
        std::mem::replace(&mut self.data[ordinal], value)
    }
}
