//! SQL statements generated by the persistence engine.
//!
//! Statements use positional `?` placeholders. Column lists and conditions are
//! collected as pairs and joined at the end, so a statement never carries a
//! dangling separator.

use std::fmt;

use dynaset_model::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated statement and its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub sql: String,
    pub params: Vec<Value>,
}

/// Accumulates column and condition pairs for one statement.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    kind: StatementKind,
    table: String,
    columns: Vec<(String, Value)>,
    conditions: Vec<(String, Value)>,
}

impl StatementBuilder {
    pub fn insert(table: impl Into<String>) -> Self {
        Self::new(StatementKind::Insert, table)
    }

    pub fn update(table: impl Into<String>) -> Self {
        Self::new(StatementKind::Update, table)
    }

    pub fn delete(table: impl Into<String>) -> Self {
        Self::new(StatementKind::Delete, table)
    }

    fn new(kind: StatementKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            columns: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Add a column to the INSERT column list or the UPDATE SET clause.
    pub fn column(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.columns.push((name.into(), value));
        self
    }

    /// Add an equality condition to the WHERE clause.
    pub fn condition(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.conditions.push((name.into(), value));
        self
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    pub fn build(self) -> Statement {
        let sql = match self.kind {
            StatementKind::Insert => {
                let names: Vec<&str> = self.columns.iter().map(|(name, _)| name.as_str()).collect();
                let placeholders = vec!["?"; names.len()];
                format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    self.table,
                    names.join(", "),
                    placeholders.join(", ")
                )
            }
            StatementKind::Update => format!(
                "UPDATE {} SET {} WHERE {}",
                self.table,
                assignments(&self.columns, ", "),
                assignments(&self.conditions, " AND ")
            ),
            StatementKind::Delete => format!(
                "DELETE FROM {} WHERE {}",
                self.table,
                assignments(&self.conditions, " AND ")
            ),
        };
        let params = self
            .columns
            .into_iter()
            .chain(self.conditions)
            .map(|(_, value)| value)
            .collect();
        Statement {
            kind: self.kind,
            sql,
            params,
        }
    }
}

fn assignments(pairs: &[(String, Value)], separator: &str) -> String {
    pairs
        .iter()
        .map(|(name, _)| format!("{name} = ?"))
        .collect::<Vec<_>>()
        .join(separator)
}

/// The most recent statement of each kind, kept for introspection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlLog {
    pub last_insert: Option<String>,
    pub last_update: Option<String>,
    pub last_delete: Option<String>,
    /// Parameters of the most recent statement of any kind.
    pub last_params: Vec<Value>,
}

impl SqlLog {
    pub fn record(&mut self, statement: &Statement) {
        let slot = match statement.kind {
            StatementKind::Insert => &mut self.last_insert,
            StatementKind::Update => &mut self.last_update,
            StatementKind::Delete => &mut self.last_delete,
        };
        *slot = Some(statement.sql.clone());
        self.last_params = statement.params.clone();
    }

    pub fn last(&self, kind: StatementKind) -> Option<&str> {
        match kind {
            StatementKind::Insert => self.last_insert.as_deref(),
            StatementKind::Update => self.last_update.as_deref(),
            StatementKind::Delete => self.last_delete.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lists_columns_in_order() {
        let mut builder = StatementBuilder::insert("people");
        builder
            .column("name", Value::from("Ada"))
            .column("born", Value::Integer(1815));
        let statement = builder.build();
        insta::assert_snapshot!(statement.sql, @"INSERT INTO people (name, born) VALUES (?, ?)");
        assert_eq!(statement.params, [Value::from("Ada"), Value::Integer(1815)]);
    }

    #[test]
    fn update_puts_set_params_before_where_params() {
        let mut builder = StatementBuilder::update("people");
        builder
            .column("name", Value::from("Grace"))
            .column("born", Value::Integer(1906))
            .condition("id", Value::Integer(3));
        let statement = builder.build();
        insta::assert_snapshot!(statement.sql, @"UPDATE people SET name = ?, born = ? WHERE id = ?");
        assert_eq!(
            statement.params,
            [Value::from("Grace"), Value::Integer(1906), Value::Integer(3)]
        );
    }

    #[test]
    fn delete_joins_conditions_with_and() {
        let mut builder = StatementBuilder::delete("lines");
        builder
            .condition("order_id", Value::Integer(1))
            .condition("line_no", Value::Integer(2));
        let statement = builder.build();
        insta::assert_snapshot!(statement.sql, @"DELETE FROM lines WHERE order_id = ? AND line_no = ?");
    }

    #[test]
    fn log_keeps_last_statement_per_kind() {
        let mut log = SqlLog::default();
        let mut insert = StatementBuilder::insert("t");
        insert.column("a", Value::Integer(1));
        log.record(&insert.build());
        let mut delete = StatementBuilder::delete("t");
        delete.condition("a", Value::Integer(2));
        log.record(&delete.build());

        assert_eq!(log.last(StatementKind::Insert), Some("INSERT INTO t (a) VALUES (?)"));
        assert_eq!(log.last(StatementKind::Delete), Some("DELETE FROM t WHERE a = ?"));
        assert_eq!(log.last(StatementKind::Update), None);
        assert_eq!(log.last_params, [Value::Integer(2)]);
    }
}
