use super::*;
use crate::column::Column;
use crate::sort::SortType;

use std::cell::RefCell;
use std::rc::Rc;

fn make_store(data: Vec<Vec<&str>>) -> RowStore {
    RowStore::from_rows(
        data.into_iter()
            .map(|row| row.into_iter().map(Value::from).collect())
            .collect(),
    )
}

/// Helper to read a column of the store as strings
fn column(store: &RowStore, data_index: usize) -> Vec<String> {
    (0..store.row_count())
        .map(|r| store.value_at(r, data_index).to_string())
        .collect()
}

fn record_events(store: &mut RowStore) -> Rc<RefCell<Vec<StoreEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    store.subscribe(move |_, e| l.borrow_mut().push(e.clone()));
    log
}

fn numeric_columns() -> ColumnModel {
    ColumnModel::new(vec![
        Column::new("A").width(60).sortable(true).sort_type(SortType::Float),
        Column::new("B").width(150),
    ])
    .unwrap()
}

#[test]
fn float_sort_is_numeric_not_lexicographic() {
    let columns = numeric_columns();
    let mut store = make_store(vec![vec!["3", "x"], vec!["10", "y"], vec!["2", "z"]]);

    store.sort(&columns, 0, SortDirection::Ascending);
    assert_eq!(column(&store, 0), vec!["2", "3", "10"]);
    assert_eq!(column(&store, 1), vec!["z", "x", "y"]);

    store.sort(&columns, 0, SortDirection::Descending);
    assert_eq!(column(&store, 0), vec!["10", "3", "2"]);
}

#[test]
fn sort_is_stable_across_repeats() {
    let columns = ColumnModel::new(vec![Column::new("Key"), Column::new("Tag")]).unwrap();
    let mut store = make_store(vec![
        vec!["b", "1"],
        vec!["a", "2"],
        vec!["b", "3"],
        vec!["a", "4"],
        vec!["b", "5"],
    ]);

    store.sort(&columns, 0, SortDirection::Ascending);
    let first = column(&store, 1);
    assert_eq!(first, vec!["2", "4", "1", "3", "5"]);

    for _ in 0..3 {
        store.sort(&columns, 0, SortDirection::Ascending);
        assert_eq!(column(&store, 1), first);
    }

    store.sort(&columns, 0, SortDirection::Descending);
    assert_eq!(column(&store, 1), vec!["1", "3", "5", "2", "4"]);
}

#[test]
fn sort_updates_state_and_notifies() {
    let columns = numeric_columns();
    let mut store = make_store(vec![vec!["3"], vec!["1"]]);
    let log = record_events(&mut store);
    assert_eq!(store.sort_state().data_index, None);

    store.sort(&columns, 0, SortDirection::Descending);
    let state = SortState { data_index: Some(0), direction: SortDirection::Descending };
    assert_eq!(store.sort_state(), state);
    assert_eq!(*log.borrow(), vec![StoreEvent::RowsSorted { state, no_refresh: false }]);
}

#[test]
fn row_ids_survive_sort() {
    let columns = numeric_columns();
    let mut store = make_store(vec![vec!["3"], vec!["1"], vec!["2"]]);
    let id_of_three = store.row_id(0);

    store.sort(&columns, 0, SortDirection::Ascending);
    assert_eq!(store.index_of_id(id_of_three), Some(2));
    assert_eq!(store.value_at(2, 0), &Value::from("3"));
}

#[test]
fn reapply_sort_after_bulk_update() {
    let columns = numeric_columns();
    let mut store = make_store(vec![vec!["3"], vec!["1"]]);
    store.reapply_sort(&columns, true);
    assert_eq!(column(&store, 0), vec!["3", "1"]);

    store.sort(&columns, 0, SortDirection::Ascending);
    store.set_value_at(0, 0, Value::from("9"));
    let log = record_events(&mut store);
    store.reapply_sort(&columns, true);

    assert_eq!(column(&store, 0), vec!["3", "9"]);
    assert!(matches!(log.borrow()[0], StoreEvent::RowsSorted { no_refresh: true, .. }));
}

#[test]
fn insert_and_delete_fire_ranges() {
    let mut store = make_store(vec![vec!["a"], vec!["b"], vec!["c"]]);
    let log = record_events(&mut store);

    store.insert_rows(1, vec![vec![Value::from("x")], vec![Value::from("y")]]);
    assert_eq!(column(&store, 0), vec!["a", "x", "y", "b", "c"]);

    let removed = store.delete_rows(2, 3);
    assert_eq!(removed.len(), 2);
    assert_eq!(column(&store, 0), vec!["a", "x", "c"]);

    store.add_row(vec![Value::from("d")]);
    assert_eq!(
        *log.borrow(),
        vec![
            StoreEvent::RowsInserted { first: 1, last: 2 },
            StoreEvent::RowsDeleted { first: 2, last: 3 },
            StoreEvent::RowsInserted { first: 3, last: 3 },
        ]
    );
}

#[test]
fn empty_insert_is_silent() {
    let mut store = make_store(vec![vec!["a"]]);
    let log = record_events(&mut store);
    store.insert_rows(0, Vec::new());
    assert!(log.borrow().is_empty());
}

#[test]
fn set_value_extends_short_rows() {
    let mut store = make_store(vec![vec!["a"]]);
    let log = record_events(&mut store);
    assert_eq!(store.value_at(0, 3), &Value::Empty);

    store.set_value_at(0, 3, Value::Int(7));
    assert_eq!(store.value_at(0, 3), &Value::Int(7));
    assert_eq!(store.value_at(0, 2), &Value::Empty);
    assert_eq!(*log.borrow(), vec![StoreEvent::CellUpdated { row: 0, data_index: 3 }]);
}

#[test]
fn listeners_see_post_mutation_state() {
    let mut store = make_store(vec![vec!["a"]]);
    let seen = Rc::new(RefCell::new(0));
    let s = seen.clone();
    store.subscribe(move |store, _| *s.borrow_mut() = store.row_count());

    store.insert_rows(0, vec![vec![Value::from("b")]]);
    assert_eq!(*seen.borrow(), 2);
    store.remove_all();
    assert_eq!(*seen.borrow(), 0);
}

#[test]
#[should_panic]
fn delete_out_of_range_panics() {
    let mut store = make_store(vec![vec!["a"]]);
    store.delete_rows(0, 1);
}
