#![deny(unsafe_code)]

pub mod column;
pub mod error;
pub mod form;
pub mod row;
pub mod value;

pub use column::{ColumnDef, DefaultFn, KeyRole};
pub use error::{ModelError, Result};
pub use form::{DynasetDefinition, FormDefinition};
pub use row::Row;
pub use value::{Value, ValueType};
