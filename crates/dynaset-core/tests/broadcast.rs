//! Widget notification, button policy and parent-driven refresh.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{
    CUSTOMERS_SQL, RecordingButton, RecordingWidget, loaded, master_detail, take_events,
};
use dynaset_core::{ButtonRole, Change, DynasetError, WidgetKind};

// ============================================================================
// Cursor movement
// ============================================================================

#[test]
fn moving_to_the_current_row_broadcasts_nothing() {
    let mut fixture = loaded();
    let table = RecordingWidget::shared();
    fixture
        .graph
        .bind_widget(fixture.customers, &table, WidgetKind::Table)
        .unwrap();

    fixture.graph.set_row(fixture.customers, Some(1)).unwrap();

    assert!(take_events(&table).is_empty());
}

#[test]
fn out_of_range_row_is_rejected() {
    let mut fixture = loaded();
    let err = fixture.graph.set_row(fixture.customers, Some(3)).unwrap_err();
    assert!(matches!(
        err,
        DynasetError::IndexOutOfRange {
            row: 3,
            row_count: 2
        }
    ));
    assert_eq!(fixture.graph.current_row(fixture.customers).unwrap(), Some(1));
}

#[test]
fn cursor_can_rest_after_the_last_row() {
    let mut fixture = loaded();
    let customers = fixture.customers;

    fixture.graph.set_row(customers, Some(2)).unwrap();

    assert_eq!(fixture.graph.current_row(customers).unwrap(), Some(2));
    assert!(matches!(
        fixture.graph.data(customers, "name").unwrap_err(),
        DynasetError::NoRowSelected { .. }
    ));
    assert!(fixture.graph.row_values(customers, None, false).unwrap().is_none());
    assert!(!fixture.graph.button_states(customers).unwrap().ok);
    assert_eq!(fixture.graph.row_count(fixture.orders).unwrap(), 0);
}

#[test]
fn row_move_refreshes_pointers_and_fields_up_to_the_first_table() {
    let mut fixture = master_detail();
    let customers = fixture.customers;
    fixture.graph.execute(customers).unwrap();

    let pointer = RecordingWidget::shared();
    let name_field = RecordingWidget::shared();
    let table = RecordingWidget::shared();
    let late_field = RecordingWidget::shared();
    let graph = &mut fixture.graph;
    graph.bind_widget(customers, &pointer, WidgetKind::RowPointer).unwrap();
    graph
        .bind_widget(customers, &name_field, WidgetKind::data_bound("name"))
        .unwrap();
    graph.bind_widget(customers, &table, WidgetKind::Table).unwrap();
    graph
        .bind_widget(customers, &late_field, WidgetKind::data_bound("id"))
        .unwrap();

    graph.set_row(customers, Some(0)).unwrap();

    assert_eq!(take_events(&pointer), ["refresh", "pointer"]);
    assert_eq!(take_events(&name_field), ["refresh", "refresh"]);
    assert_eq!(take_events(&table), ["refresh"]);
    assert_eq!(take_events(&late_field), ["refresh"]);
}

#[test]
fn clearing_the_selection_skips_field_refresh_on_full_change() {
    let mut fixture = loaded();
    let field = RecordingWidget::shared();
    fixture
        .graph
        .bind_widget(fixture.customers, &field, WidgetKind::data_bound("name"))
        .unwrap();

    fixture.graph.set_row(fixture.customers, None).unwrap();

    // only the row-moved pass reaches the field
    assert_eq!(take_events(&field), ["refresh"]);
}

// ============================================================================
// Data changes
// ============================================================================

#[test]
fn cell_change_reaches_tables_and_matching_fields() {
    let mut fixture = loaded();
    let customers = fixture.customers;
    let table = RecordingWidget::shared();
    let name_field = RecordingWidget::shared();
    let id_field = RecordingWidget::shared();
    let graph = &mut fixture.graph;
    graph.bind_widget(customers, &table, WidgetKind::Table).unwrap();
    graph
        .bind_widget(customers, &name_field, WidgetKind::data_bound("name"))
        .unwrap();
    graph
        .bind_widget(customers, &id_field, WidgetKind::data_bound("id"))
        .unwrap();
    graph.edit(customers).unwrap();
    for widget in [&table, &name_field, &id_field] {
        take_events(widget);
    }

    graph.set_data(customers, "name", "Grace H.").unwrap();

    assert_eq!(take_events(&table), ["cell 1 name"]);
    assert_eq!(take_events(&name_field), ["refresh"]);
    assert!(take_events(&id_field).is_empty());
}

#[test]
fn edits_to_other_rows_leave_fields_alone() {
    let mut fixture = loaded();
    let customers = fixture.customers;
    let name_field = RecordingWidget::shared();
    fixture
        .graph
        .bind_widget(customers, &name_field, WidgetKind::data_bound("name"))
        .unwrap();
    fixture.graph.edit(customers).unwrap();
    take_events(&name_field);

    fixture.graph.set_data_at(customers, 0, "name", "Ada L.").unwrap();

    assert!(take_events(&name_field).is_empty());
}

#[test]
fn widget_failure_aborts_the_broadcast() {
    let mut fixture = master_detail();
    let customers = fixture.customers;
    fixture.graph.execute(customers).unwrap();
    let failing = RecordingWidget::shared();
    failing.borrow_mut().fail = true;
    let second = RecordingWidget::shared();
    fixture
        .graph
        .bind_widget(customers, &failing, WidgetKind::Table)
        .unwrap();
    fixture
        .graph
        .bind_widget(customers, &second, WidgetKind::Table)
        .unwrap();

    let err = fixture.graph.set_row(customers, Some(0)).unwrap_err();

    assert!(matches!(err, DynasetError::Widget { .. }));
    assert_eq!(failing.borrow().saw_broadcasting, [true]);
    assert!(take_events(&second).is_empty());
    assert!(!fixture.graph.get(customers).unwrap().is_broadcasting());
}

#[test]
fn dropped_and_unbound_widgets_are_skipped() {
    let mut fixture = loaded();
    let customers = fixture.customers;
    let dropped = RecordingWidget::shared();
    let unbound = RecordingWidget::shared();
    fixture
        .graph
        .bind_widget(customers, &dropped, WidgetKind::Table)
        .unwrap();
    fixture
        .graph
        .bind_widget(customers, &unbound, WidgetKind::Table)
        .unwrap();
    drop(dropped);
    assert!(fixture.graph.unbind_widget(customers, &unbound).unwrap());
    assert!(!fixture.graph.unbind_widget(customers, &unbound).unwrap());

    fixture.graph.set_row(customers, Some(0)).unwrap();

    assert!(take_events(&unbound).is_empty());
}

#[test]
fn data_bound_widget_needs_a_known_column() {
    let mut fixture = master_detail();
    let field = RecordingWidget::shared();
    let err = fixture
        .graph
        .bind_widget(fixture.customers, &field, WidgetKind::data_bound("email"))
        .unwrap_err();
    assert!(matches!(err, DynasetError::UnknownColumn { .. }));
}

// ============================================================================
// Control buttons
// ============================================================================

#[test]
fn buttons_follow_the_policy() {
    let mut fixture = master_detail();
    let customers = fixture.customers;
    fixture.graph.execute(customers).unwrap();
    let buttons: Vec<_> = ButtonRole::ALL
        .iter()
        .map(|role| (*role, RecordingButton::shared()))
        .collect();
    for (role, button) in &buttons {
        fixture.graph.bind_button(customers, *role, button).unwrap();
    }
    let enabled = |role: ButtonRole| {
        buttons
            .iter()
            .find(|(r, _)| *r == role)
            .and_then(|(_, button)| button.borrow().enabled)
    };

    assert_eq!(enabled(ButtonRole::New), Some(true));
    assert_eq!(enabled(ButtonRole::Edit), Some(false));
    assert_eq!(enabled(ButtonRole::Ok), Some(false));
    assert_eq!(enabled(ButtonRole::Delete), Some(true));

    fixture.graph.set_row(customers, Some(0)).unwrap();
    assert_eq!(enabled(ButtonRole::Edit), Some(true));
    assert_eq!(enabled(ButtonRole::Ok), Some(true));
    assert_eq!(enabled(ButtonRole::Save), Some(false));

    fixture.graph.press(customers, ButtonRole::Edit).unwrap();
    assert_eq!(enabled(ButtonRole::Edit), Some(false));

    fixture.graph.set_data(customers, "name", "Ada L.").unwrap();
    assert_eq!(enabled(ButtonRole::Undo), Some(true));
    assert_eq!(enabled(ButtonRole::New), Some(false));
    assert_eq!(enabled(ButtonRole::Save), Some(true));

    fixture.graph.press(customers, ButtonRole::Undo).unwrap();
    assert_eq!(enabled(ButtonRole::Undo), Some(false));
    assert_eq!(enabled(ButtonRole::Save), Some(false));

    fixture.graph.press(customers, ButtonRole::Delete).unwrap();
    assert_eq!(enabled(ButtonRole::Delete), Some(false));
    assert_eq!(enabled(ButtonRole::Undo), Some(true));
}

#[test]
fn button_actions_need_a_selection() {
    let mut fixture = master_detail();
    let customers = fixture.customers;
    fixture.graph.execute(customers).unwrap();
    fixture.graph.edit(customers).unwrap();

    let err = fixture.graph.press(customers, ButtonRole::Delete).unwrap_err();
    assert!(matches!(err, DynasetError::NoRowSelected { .. }));
    let err = fixture.graph.press(customers, ButtonRole::Undo).unwrap_err();
    assert!(matches!(err, DynasetError::NoRowSelected { .. }));
    fixture.graph.press(customers, ButtonRole::Ok).unwrap();
}

#[test]
fn new_button_adds_and_selects_a_row() {
    let mut fixture = loaded();
    let customers = fixture.customers;
    fixture.graph.set_row(customers, Some(0)).unwrap();

    fixture.graph.press(customers, ButtonRole::New).unwrap();

    assert_eq!(fixture.graph.row_count(customers).unwrap(), 3);
    assert_eq!(fixture.graph.current_row(customers).unwrap(), Some(1));
    assert!(fixture.graph.row(customers, 1).unwrap().is_new());
    assert!(!fixture.graph.get(customers).unwrap().is_locked());
}

// ============================================================================
// Parent selection
// ============================================================================

#[test]
fn children_requery_when_the_parent_moves() {
    let mut fixture = loaded();
    assert_eq!(fixture.graph.row_count(fixture.orders).unwrap(), 2);

    fixture.graph.set_row(fixture.customers, Some(0)).unwrap();

    let queries = fixture.db.queries();
    assert_eq!(queries.len(), 3);
    assert_eq!(
        queries[2].1.get("customer_id"),
        Some(&dynaset_model::Value::Integer(1))
    );
}

#[test]
fn children_clear_when_the_parent_loses_its_selection() {
    let mut fixture = loaded();

    fixture.graph.set_row(fixture.customers, None).unwrap();

    assert_eq!(fixture.graph.row_count(fixture.orders).unwrap(), 0);
    assert_eq!(fixture.db.queries().len(), 2);
}

#[test]
fn parent_change_hook_runs_without_auto_execute() {
    let mut fixture = master_detail();
    let (customers, orders) = (fixture.customers, fixture.orders);
    let seen = Rc::new(Cell::new(None));
    let hook_seen = Rc::clone(&seen);
    fixture
        .graph
        .set_on_parent_changed(orders, move |view| {
            hook_seen.set(view.parent().and_then(|parent| parent.current_row()));
            Ok(())
        })
        .unwrap();
    fixture.graph.set_auto_execute(orders, false).unwrap();
    fixture.graph.execute(customers).unwrap();

    fixture.graph.set_row(customers, Some(1)).unwrap();

    assert_eq!(seen.get(), Some(1));
    let queries = fixture.db.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].0, CUSTOMERS_SQL);
}

// ============================================================================
// Clearing and guarded edits
// ============================================================================

#[test]
fn first_execute_broadcasts_the_clear_and_the_fetch() {
    let mut fixture = master_detail();
    let table = RecordingWidget::shared();
    fixture
        .graph
        .bind_widget(fixture.customers, &table, WidgetKind::Table)
        .unwrap();

    fixture.graph.execute(fixture.customers).unwrap();

    assert_eq!(take_events(&table), ["refresh", "refresh"]);
}

#[test]
fn clearing_an_empty_dynaset_still_broadcasts() {
    let mut fixture = master_detail();
    let table = RecordingWidget::shared();
    fixture
        .graph
        .bind_widget(fixture.customers, &table, WidgetKind::Table)
        .unwrap();

    fixture.graph.clear(fixture.customers).unwrap();
    assert_eq!(take_events(&table), ["refresh"]);
    fixture.graph.clear(fixture.customers).unwrap();
    assert_eq!(take_events(&table), ["refresh"]);
}

#[test]
fn new_row_on_a_frozen_dynaset_changes_nothing() {
    let mut fixture = master_detail();
    let customers = fixture.customers;
    fixture.graph.execute(customers).unwrap();
    fixture.graph.freeze(customers).unwrap();

    let err = fixture.graph.new_row(customers).unwrap_err();

    assert!(matches!(err, DynasetError::Frozen { .. }));
    let dynaset = fixture.graph.get(customers).unwrap();
    assert_eq!(fixture.graph.row_count(customers).unwrap(), 2);
    assert_eq!(fixture.graph.current_row(customers).unwrap(), None);
    assert!(!dynaset.is_dirty());
    assert!(dynaset.is_locked());
}

#[test]
fn cell_change_for_a_foreign_column_is_rejected() {
    let fixture = loaded();
    let item = fixture
        .graph
        .get(fixture.orders)
        .unwrap()
        .columns()
        .resolve("item")
        .unwrap();

    let err = fixture
        .graph
        .data_changed(fixture.customers, Change::Cell { row: 0, column: item })
        .unwrap_err();

    assert!(matches!(err, DynasetError::UnknownColumn { .. }));
}

#[test]
fn busy_button_is_reported() {
    let mut fixture = loaded();
    let save = RecordingButton::shared();
    fixture
        .graph
        .bind_button(fixture.customers, ButtonRole::Save, &save)
        .unwrap();

    let guard = save.borrow_mut();
    let err = fixture.graph.update_controls(fixture.customers).unwrap_err();
    drop(guard);

    assert!(matches!(
        err,
        DynasetError::ButtonBusy {
            role: ButtonRole::Save,
            ..
        }
    ));
}
