use super::*;
use crate::sort::SortType;
use crate::value::SortKey;

use std::cell::RefCell;
use std::rc::Rc;

fn ticker_columns() -> ColumnModel {
    ColumnModel::new(vec![
        Column::new("Ticker").width(60).sortable(true).sort_type(SortType::CaseInsensitive),
        Column::new("Company Name").width(150).sortable(true),
        Column::new("Market Cap.").width(100).sortable(true).sort_type(SortType::Float),
    ])
    .unwrap()
}

fn record_events(model: &mut ColumnModel) -> Rc<RefCell<Vec<ColumnEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    model.subscribe(move |_, e| l.borrow_mut().push(e.clone()));
    log
}

#[test]
fn defaults_apply_to_unset_options() {
    let model = ColumnModel::new(vec![Column::new("A"), Column::new("B")]).unwrap();
    assert_eq!(model.column_count(), 2);
    assert_eq!(model.column_width(0), DEFAULT_WIDTH);
    assert!(!model.is_sortable(1));
    assert_eq!(model.data_index(1), 1);
    assert!(!model.is_cell_editable(0, 0));
    assert!(model.cell_editor(0, 0).is_none());

    let render = model.renderer(0);
    assert_eq!(render(&Value::from(""), 0, 0), EMPTY_CELL);
    assert_eq!(render(&Value::from("x"), 0, 0), "x");
}

#[test]
fn zero_width_is_rejected_at_construction() {
    let err = ColumnModel::new(vec![Column::new("A"), Column::new("B").width(0)]).unwrap_err();
    assert!(matches!(err, GridError::InvalidWidth { column: 1, width: 0 }));
}

#[test]
fn duplicate_data_index_is_rejected() {
    let err = ColumnModel::new(vec![Column::new("A"), Column::new("B").data_index(0)]).unwrap_err();
    assert!(matches!(err, GridError::DuplicateDataIndex(0)));
}

#[test]
fn set_width_round_trip_and_event() {
    let mut model = ticker_columns();
    let log = record_events(&mut model);

    model.set_column_width(1, 175, false).unwrap();
    assert_eq!(model.column_width(1), 175);
    assert_eq!(*log.borrow(), vec![ColumnEvent::WidthChanged { column: 1, width: 175 }]);

    model.set_column_width(1, 80, true).unwrap();
    assert_eq!(model.column_width(1), 80);
    assert_eq!(log.borrow().len(), 1);

    assert!(model.set_column_width(0, 0, false).is_err());
    assert_eq!(model.column_width(0), 60);
}

#[test]
fn total_width_tracks_hidden_and_width_changes() {
    let mut model = ticker_columns();
    assert_eq!(model.total_width(false), 310);
    assert_eq!(model.total_width(true), 310);

    model.set_hidden(1, true);
    assert_eq!(model.column_count(), 3);
    assert_eq!(model.total_width(false), 160);
    assert_eq!(model.total_width(true), 310);

    model.set_column_width(2, 40, true).unwrap();
    assert_eq!(model.total_width(false), 100);
    assert_eq!(model.total_width(true), 250);

    let sum_all: u32 = (0..model.column_count()).map(|c| model.column_width(c)).sum();
    let sum_visible: u32 = model.visible_columns().map(|c| model.column_width(c)).sum();
    assert_eq!(model.total_width(true), sum_all);
    assert_eq!(model.total_width(false), sum_visible);
}

#[test]
fn comparator_resolves_by_data_index() {
    let mut model = ColumnModel::new(vec![
        Column::new("Name").data_index(1),
        Column::new("Price").data_index(0).sort_type(SortType::Float),
    ])
    .unwrap();

    // data index 0 is read by the column at position 1
    let cmp = model.sort_comparator(0);
    assert_eq!(cmp(&Value::from("1,500")), SortKey::Float(1500.0));
    let cmp = model.sort_comparator(1);
    assert_eq!(cmp(&Value::from("abc")), SortKey::Text("abc".to_string()));

    // unknown data index falls back to identity
    let cmp = model.sort_comparator(9);
    assert_eq!(cmp(&Value::Int(3)), SortKey::Int(3));

    model.set_sort_comparator(0, SortType::Integer.comparator());
    let cmp = model.sort_comparator(1);
    assert_eq!(cmp(&Value::from("12abc")), SortKey::Int(12));
}

#[test]
fn data_index_change_invalidates_lookup() {
    let mut model = ColumnModel::new(vec![Column::new("A"), Column::new("B")]).unwrap();
    let log = record_events(&mut model);
    assert_eq!(model.column_for_data_index(1), Some(1));

    model.set_data_index(1, 5).unwrap();
    assert_eq!(model.column_for_data_index(1), None);
    assert_eq!(model.column_for_data_index(5), Some(1));
    assert_eq!(*log.borrow(), vec![ColumnEvent::DataIndexChanged { column: 1 }]);

    assert!(matches!(model.set_data_index(0, 5), Err(GridError::DuplicateDataIndex(5))));
}

#[test]
fn move_column_keeps_data_index() {
    let mut model = ColumnModel::new(vec![Column::new("A"), Column::new("B"), Column::new("C")]).unwrap();
    assert_eq!(model.column_for_data_index(0), Some(0));

    model.move_column(0, 2);
    assert_eq!(model.column_header(0), "B");
    assert_eq!(model.column_header(2), "A");
    assert_eq!(model.data_index(0), 1);
    assert_eq!(model.data_index(1), 2);
    assert_eq!(model.data_index(2), 0);
    assert_eq!(model.column_for_data_index(0), Some(2));
}

#[test]
fn editability_follows_editor_when_unspecified() {
    let model = ColumnModel::new(vec![
        Column::new("A").editor(EditorSpec::text()),
        Column::new("B").editor(EditorSpec::text()).editable(false),
        Column::new("C").editable(true),
    ])
    .unwrap();

    assert!(model.is_cell_editable(0, 0));
    assert!(!model.is_cell_editable(1, 0));
    assert!(model.is_cell_editable(2, 0));
    assert!(model.cell_editor(2, 0).is_none());
}

#[test]
fn header_and_hidden_changes_fire_events() {
    let mut model = ticker_columns();
    let log = record_events(&mut model);

    model.set_column_header(0, "Symbol");
    model.set_hidden(2, true);

    assert_eq!(model.column_header(0), "Symbol");
    assert_eq!(
        *log.borrow(),
        vec![
            ColumnEvent::HeaderChanged { column: 0 },
            ColumnEvent::HiddenChanged { column: 2, hidden: true },
        ]
    );
}

#[test]
#[should_panic]
fn out_of_range_column_panics() {
    let model = ticker_columns();
    model.column_width(3);
}
