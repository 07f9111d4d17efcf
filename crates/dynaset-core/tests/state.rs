//! Dirty tracking, locking and the freeze cascade.

mod common;

use common::{loaded, master_detail, ScriptedDatabase};
use dynaset_core::{DynasetConfig, DynasetError, DynasetFlag, DynasetGraph};
use dynaset_model::Value;
use proptest::prelude::*;

// ============================================================================
// Snapshot and undo
// ============================================================================

proptest! {
    #[test]
    fn first_edit_captures_the_only_snapshot(names in prop::collection::vec("[a-z]{1,8}", 1..6)) {
        let mut fixture = loaded();
        let customers = fixture.customers;
        let graph = &mut fixture.graph;
        graph.edit(customers).unwrap();
        let before = graph.row(customers, 0).unwrap().data().to_vec();

        for name in &names {
            graph.set_data_at(customers, 0, "name", name.as_str()).unwrap();
        }

        let row = graph.row(customers, 0).unwrap();
        prop_assert_eq!(row.data_old(), Some(before.as_slice()));
        let last = Value::from(names.last().unwrap().as_str());
        prop_assert_eq!(row.get(1), Some(&last));
    }

    #[test]
    fn undo_restores_the_pre_edit_row(names in prop::collection::vec("[a-z]{1,8}", 1..6)) {
        let mut fixture = loaded();
        let customers = fixture.customers;
        let graph = &mut fixture.graph;
        graph.edit(customers).unwrap();
        let before = graph.row(customers, 0).unwrap().data().to_vec();

        for name in &names {
            graph.set_data_at(customers, 0, "name", name.as_str()).unwrap();
        }
        graph.undo_row(customers, 0).unwrap();

        let row = graph.row(customers, 0).unwrap();
        prop_assert_eq!(row.data(), before.as_slice());
        prop_assert!(!row.is_dirty());
        prop_assert!(!graph.get(customers).unwrap().is_dirty());
    }
}

#[test]
fn undo_on_clean_row_fails() {
    let mut fixture = loaded();
    let err = fixture.graph.undo_row(fixture.customers, 0).unwrap_err();
    assert!(matches!(err, DynasetError::NothingToUndo { row: 0 }));
}

#[test]
fn undo_lifts_a_delete_mark() {
    let mut fixture = loaded();
    let orders = fixture.orders;
    fixture.graph.edit(orders).unwrap();
    fixture.graph.delete_row(orders, 0).unwrap();
    assert!(fixture.graph.row(orders, 0).unwrap().is_deleted());

    fixture.graph.undo_row(orders, 0).unwrap();
    assert!(!fixture.graph.row(orders, 0).unwrap().is_deleted());
    assert!(!fixture.graph.get(orders).unwrap().is_dirty());
}

// ============================================================================
// Locking
// ============================================================================

#[test]
fn new_dynasets_start_locked() {
    let mut fixture = loaded();
    let err = fixture
        .graph
        .set_data(fixture.customers, "name", "Grace H.")
        .unwrap_err();
    assert!(matches!(err, DynasetError::Locked { .. }));
    let err = fixture.graph.delete(fixture.customers).unwrap_err();
    assert!(matches!(err, DynasetError::Locked { .. }));
}

#[test]
fn edit_unlocks_the_whole_subtree() {
    let mut fixture = loaded();
    fixture.graph.edit(fixture.customers).unwrap();
    assert!(!fixture.graph.get(fixture.customers).unwrap().is_locked());
    assert!(!fixture.graph.get(fixture.orders).unwrap().is_locked());
}

#[test]
fn editing_a_child_leaves_the_parent_locked() {
    let mut fixture = loaded();
    fixture.graph.edit(fixture.orders).unwrap();
    assert!(fixture.graph.get(fixture.customers).unwrap().is_locked());
    assert!(!fixture.graph.get(fixture.orders).unwrap().is_locked());
}

#[test]
fn flags_propagate_down() {
    let mut fixture = loaded();
    fixture
        .graph
        .set_flag_and_propagate_down(fixture.customers, DynasetFlag::AutoExecute, false)
        .unwrap();
    assert!(!fixture.graph.get(fixture.customers).unwrap().auto_execute());
    assert!(!fixture.graph.get(fixture.orders).unwrap().auto_execute());
}

// ============================================================================
// Freeze and thaw
// ============================================================================

#[test]
fn freeze_is_transitive_and_spares_siblings() {
    let mut graph = DynasetGraph::new(ScriptedDatabase::new());
    let root = graph.create(DynasetConfig::new("root")).unwrap();
    let middle = graph
        .create(DynasetConfig::new("middle").with_parent(root))
        .unwrap();
    let leaf = graph
        .create(DynasetConfig::new("leaf").with_parent(middle))
        .unwrap();
    let sibling = graph
        .create(DynasetConfig::new("sibling").with_parent(root))
        .unwrap();

    graph.freeze(leaf).unwrap();
    graph.freeze(leaf).unwrap();

    for id in [leaf, middle, root] {
        assert!(graph.get(id).unwrap().is_frozen(), "{id} should be frozen");
    }
    assert!(!graph.get(sibling).unwrap().is_frozen());
}

#[test]
fn child_edit_freezes_parent_cursor() {
    let mut fixture = loaded();
    let (customers, orders) = (fixture.customers, fixture.orders);
    fixture.graph.edit(orders).unwrap();
    fixture.graph.set_data_at(orders, 0, "item", "chai").unwrap();

    assert!(fixture.graph.get(customers).unwrap().is_frozen());
    assert!(!fixture.graph.get(orders).unwrap().is_frozen());
    let err = fixture.graph.set_row(customers, Some(0)).unwrap_err();
    assert!(matches!(err, DynasetError::Frozen { .. }));
    assert_eq!(fixture.graph.current_row(customers).unwrap(), Some(1));
    let err = fixture.graph.clear(customers).unwrap_err();
    assert!(matches!(err, DynasetError::Frozen { .. }));
}

#[test]
fn thaw_refuses_while_a_child_is_dirty() {
    let mut fixture = loaded();
    let (customers, orders) = (fixture.customers, fixture.orders);
    fixture.graph.edit(orders).unwrap();
    fixture.graph.set_data_at(orders, 0, "item", "chai").unwrap();

    let err = fixture.graph.thaw(customers).unwrap_err();
    assert!(matches!(err, DynasetError::Frozen { .. }));

    fixture.graph.undo_row(orders, 0).unwrap();
    assert!(!fixture.graph.get(customers).unwrap().is_frozen());
    fixture.graph.set_row(customers, Some(0)).unwrap();
}

#[test]
fn manual_freeze_thaws_when_clean() {
    let mut fixture = master_detail();
    fixture.graph.freeze(fixture.customers).unwrap();
    fixture.graph.thaw(fixture.customers).unwrap();
    assert!(!fixture.graph.get(fixture.customers).unwrap().is_frozen());
}

#[test]
fn saving_the_child_thaws_the_parent() {
    let mut fixture = loaded();
    let (customers, orders) = (fixture.customers, fixture.orders);
    fixture.graph.edit(orders).unwrap();
    fixture.graph.set_data_at(orders, 0, "item", "chai").unwrap();

    fixture.graph.save(orders).unwrap();

    assert!(!fixture.graph.get(customers).unwrap().is_frozen());
    assert!(!fixture.graph.get(orders).unwrap().is_dirty());
    assert!(fixture.graph.get(orders).unwrap().is_locked());
}
