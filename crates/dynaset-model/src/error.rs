use thiserror::Error;

use crate::ValueType;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("column name must not be empty")]
    InvalidColumnName(String),
    #[error("table name must not be empty")]
    InvalidTableName(String),
    #[error("cannot read '{text}' as {expected}")]
    InvalidValue { text: String, expected: ValueType },
    #[error("dynaset '{name}' is declared more than once")]
    DuplicateDynaset { name: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
