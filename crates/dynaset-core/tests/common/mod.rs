//! Shared fixtures: a scripted database and recording widgets and buttons.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use dynaset_core::{
    BoundWidget, CallbackError, ColumnDescriptor, ColumnSpec, ControlButton, Database,
    DatabaseError, DynasetConfig, DynasetGraph, DynasetId, DynasetView, QueryParams, ResultSet,
};
use dynaset_model::{Value, ValueType};

pub const CUSTOMERS_SQL: &str = "SELECT id, name FROM customers ORDER BY id";
pub const ORDERS_SQL: &str = "SELECT id, customer_id, item FROM orders WHERE customer_id = :customer_id";

/// Everything the database saw, in order.
#[derive(Debug, Default)]
pub struct DbLog {
    pub queries: Vec<(String, QueryParams)>,
    pub executed: Vec<(String, Vec<Value>)>,
    pub commits: usize,
    /// `query`, `execute` and `commit` events interleaved.
    pub events: Vec<String>,
}

/// A database answering queries from canned results.
///
/// Clones share their state, so a test keeps one clone to inspect while the
/// graph owns another.
#[derive(Clone, Default)]
pub struct ScriptedDatabase {
    pub log: Rc<RefCell<DbLog>>,
    results: Rc<RefCell<HashMap<String, ResultSet>>>,
    fail_on: Rc<RefCell<Option<String>>>,
    next_id: Rc<RefCell<i64>>,
    last_id: Rc<RefCell<Option<i64>>>,
}

impl ScriptedDatabase {
    pub fn new() -> Self {
        let db = Self::default();
        *db.next_id.borrow_mut() = 100;
        db
    }

    pub fn with_result(self, sql: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let columns = columns.iter().map(|name| ColumnDescriptor::new(*name)).collect();
        self.results
            .borrow_mut()
            .insert(sql.to_string(), ResultSet::new(columns, rows));
        self
    }

    /// Make every statement containing `fragment` fail.
    pub fn fail_on(&self, fragment: &str) {
        *self.fail_on.borrow_mut() = Some(fragment.to_string());
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.log
            .borrow()
            .executed
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.log.borrow().executed.clone()
    }

    pub fn queries(&self) -> Vec<(String, QueryParams)> {
        self.log.borrow().queries.clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.log.borrow().events.clone()
    }
}

impl Database for ScriptedDatabase {
    fn query(&mut self, sql: &str, params: &QueryParams) -> Result<ResultSet, DatabaseError> {
        let mut log = self.log.borrow_mut();
        log.queries.push((sql.to_string(), params.clone()));
        log.events.push(format!("query {sql}"));
        self.results
            .borrow()
            .get(sql)
            .cloned()
            .ok_or_else(|| DatabaseError::new(format!("no result scripted for {sql}")))
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize, DatabaseError> {
        if let Some(fragment) = self.fail_on.borrow().as_deref()
            && sql.contains(fragment)
        {
            return Err(DatabaseError::new(format!("constraint failed: {sql}")));
        }
        let mut log = self.log.borrow_mut();
        log.executed.push((sql.to_string(), params.to_vec()));
        log.events.push(format!("execute {sql}"));
        if sql.starts_with("INSERT") {
            let mut next = self.next_id.borrow_mut();
            *self.last_id.borrow_mut() = Some(*next);
            *next += 1;
        }
        Ok(1)
    }

    fn commit(&mut self) -> Result<(), DatabaseError> {
        let mut log = self.log.borrow_mut();
        log.commits += 1;
        log.events.push("commit".to_string());
        Ok(())
    }

    fn last_inserted_id(&self) -> Option<i64> {
        *self.last_id.borrow()
    }
}

/// A widget recording every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingWidget {
    pub events: Vec<String>,
    pub saw_broadcasting: Vec<bool>,
    pub fail: bool,
}

impl RecordingWidget {
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    fn record(&mut self, view: &DynasetView<'_>, event: String) -> Result<(), CallbackError> {
        self.saw_broadcasting.push(view.is_broadcasting());
        self.events.push(event);
        if self.fail {
            return Err("widget refused".into());
        }
        Ok(())
    }
}

impl BoundWidget for RecordingWidget {
    fn refresh(&mut self, view: &DynasetView<'_>) -> Result<(), CallbackError> {
        self.record(view, "refresh".to_string())
    }

    fn refresh_cell(
        &mut self,
        view: &DynasetView<'_>,
        row: usize,
        column: &str,
    ) -> Result<(), CallbackError> {
        self.record(view, format!("cell {row} {column}"))
    }

    fn refresh_row_pointer(&mut self, view: &DynasetView<'_>) -> Result<(), CallbackError> {
        self.record(view, "pointer".to_string())
    }
}

pub fn take_events(widget: &Rc<RefCell<RecordingWidget>>) -> Vec<String> {
    std::mem::take(&mut widget.borrow_mut().events)
}

#[derive(Debug, Default)]
pub struct RecordingButton {
    pub enabled: Option<bool>,
}

impl RecordingButton {
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }
}

impl ControlButton for RecordingButton {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = Some(enabled);
    }
}

pub fn customer_rows() -> Vec<Vec<Value>> {
    vec![
        vec![Value::Integer(1), Value::from("Ada")],
        vec![Value::Integer(7), Value::from("Grace")],
    ]
}

pub fn order_rows() -> Vec<Vec<Value>> {
    vec![
        vec![Value::Integer(10), Value::Integer(7), Value::from("tea")],
        vec![Value::Integer(11), Value::Integer(7), Value::from("cake")],
    ]
}

pub fn scripted() -> ScriptedDatabase {
    ScriptedDatabase::new()
        .with_result(CUSTOMERS_SQL, &["id", "name"], customer_rows())
        .with_result(ORDERS_SQL, &["id", "customer_id", "item"], order_rows())
}

pub struct MasterDetail {
    pub graph: DynasetGraph,
    pub db: ScriptedDatabase,
    pub customers: DynasetId,
    pub orders: DynasetId,
}

/// Customers with their orders; orders link `customer_id` to the customer id.
pub fn master_detail() -> MasterDetail {
    let db = scripted();
    let mut graph = DynasetGraph::new(db.clone());
    let customers = graph
        .create(DynasetConfig::new("customers").with_query(CUSTOMERS_SQL))
        .expect("create customers");
    graph
        .add_column(customers, ColumnSpec::new("id").with_type(ValueType::Integer).key())
        .expect("customers.id");
    graph
        .add_column(customers, ColumnSpec::new("name"))
        .expect("customers.name");
    graph
        .set_auto_column(customers, Some("id"))
        .expect("auto column");

    let orders = graph
        .create(
            DynasetConfig::new("orders")
                .with_query(ORDERS_SQL)
                .with_parent(customers),
        )
        .expect("create orders");
    graph
        .add_column(orders, ColumnSpec::new("id").with_type(ValueType::Integer).key())
        .expect("orders.id");
    graph
        .add_column(
            orders,
            ColumnSpec::new("customer_id")
                .with_type(ValueType::Integer)
                .with_parent_column("id"),
        )
        .expect("orders.customer_id");
    graph
        .add_column(orders, ColumnSpec::new("item"))
        .expect("orders.item");
    graph.set_auto_column(orders, Some("id")).expect("auto column");

    MasterDetail {
        graph,
        db,
        customers,
        orders,
    }
}

/// Master/detail with customers fetched and customer 7 selected, which makes
/// the orders re-query.
pub fn loaded() -> MasterDetail {
    let mut fixture = master_detail();
    fixture.graph.execute(fixture.customers).expect("execute customers");
    fixture
        .graph
        .set_row(fixture.customers, Some(1))
        .expect("select Grace");
    fixture
}
