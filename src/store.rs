//! Row storage, sort state and row-level change notifications

use std::fmt;

use tracing::debug;

use crate::column::ColumnModel;
use crate::event::{ListenerId, Publisher};
use crate::sort::{self, SortDirection, SortState};
use crate::value::Value;

static EMPTY_VALUE: Value = Value::Empty;

/// Stable identity of a row, unchanged by sorting, insertion and deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub values: Vec<Value>,
}

/// Row-level changes. Ranges are inclusive display indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    CellUpdated { row: usize, data_index: usize },
    RowsInserted { first: usize, last: usize },
    RowsDeleted { first: usize, last: usize },
    RowsUpdated { first: usize, last: usize },
    RowsSorted { state: SortState, no_refresh: bool },
    /// Every row was replaced
    DataChanged,
}

pub struct RowStore {
    rows: Vec<Row>,
    next_id: u64,
    sort_state: SortState,
    listeners: Publisher<RowStore, StoreEvent>,
}

impl RowStore {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 0,
            sort_state: SortState::default(),
            listeners: Publisher::new(),
        }
    }

    pub fn from_rows(rows: Vec<Vec<Value>>) -> Self {
        let mut store = Self::new();
        let rows: Vec<Row> = rows.into_iter().map(|values| store.make_row(values)).collect();
        store.rows = rows;
        store
    }

    fn make_row(&mut self, values: Vec<Value>) -> Row {
        let id = RowId(self.next_id);
        self.next_id += 1;
        Row { id, values }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&RowStore, &StoreEvent) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn fire(&mut self, event: StoreEvent) {
        debug!(?event, "store changed");
        let mut listeners = std::mem::take(&mut self.listeners);
        listeners.notify(self, &event);
        self.listeners = listeners;
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, row: usize) -> &Row {
        &self.rows[row]
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn row_id(&self, row: usize) -> RowId {
        self.rows[row].id
    }

    pub fn index_of_id(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Value at `data_index`; short rows read as empty
    pub fn value_at(&self, row: usize, data_index: usize) -> &Value {
        self.rows[row].values.get(data_index).unwrap_or(&EMPTY_VALUE)
    }

    pub fn set_value_at(&mut self, row: usize, data_index: usize, value: Value) {
        let values = &mut self.rows[row].values;
        if values.len() <= data_index {
            values.resize(data_index + 1, Value::Empty);
        }
        values[data_index] = value;
        self.fire(StoreEvent::CellUpdated { row, data_index });
    }

    /// Insert rows so the first lands at `index`
    pub fn insert_rows(&mut self, index: usize, rows: Vec<Vec<Value>>) {
        assert!(index <= self.rows.len(), "insert index {} out of range", index);
        if rows.is_empty() {
            return;
        }
        let count = rows.len();
        let new_rows: Vec<Row> = rows.into_iter().map(|values| self.make_row(values)).collect();
        self.rows.splice(index..index, new_rows);
        self.fire(StoreEvent::RowsInserted {
            first: index,
            last: index + count - 1,
        });
    }

    pub fn add_row(&mut self, values: Vec<Value>) -> RowId {
        let index = self.rows.len();
        self.insert_rows(index, vec![values]);
        self.rows[index].id
    }

    /// Delete rows `first..=last`
    pub fn delete_rows(&mut self, first: usize, last: usize) -> Vec<Row> {
        assert!(first <= last && last < self.rows.len(), "delete range {}..={} out of range", first, last);
        let removed: Vec<Row> = self.rows.drain(first..=last).collect();
        self.fire(StoreEvent::RowsDeleted { first, last });
        removed
    }

    pub fn remove_row(&mut self, row: usize) -> Row {
        self.delete_rows(row, row).remove(0)
    }

    /// Mark rows `first..=last` as changed without changing the row count
    pub fn update_rows(&mut self, first: usize, last: usize) {
        assert!(first <= last && last < self.rows.len(), "update range {}..={} out of range", first, last);
        self.fire(StoreEvent::RowsUpdated { first, last });
    }

    pub fn update_cell(&mut self, row: usize, data_index: usize) {
        assert!(row < self.rows.len(), "row {} out of range", row);
        self.fire(StoreEvent::CellUpdated { row, data_index });
    }

    /// Replace every row
    pub fn set_rows(&mut self, rows: Vec<Vec<Value>>) {
        let rows: Vec<Row> = rows.into_iter().map(|values| self.make_row(values)).collect();
        self.rows = rows;
        self.fire(StoreEvent::DataChanged);
    }

    pub fn remove_all(&mut self) {
        self.rows.clear();
        self.fire(StoreEvent::DataChanged);
    }

    pub fn sort_state(&self) -> SortState {
        self.sort_state
    }

    /// Stable sort by the column reading `data_index`
    pub fn sort(&mut self, columns: &ColumnModel, data_index: usize, direction: SortDirection) {
        self.sort_rows(columns, data_index, direction);
        self.sort_state = SortState {
            data_index: Some(data_index),
            direction,
        };
        self.fire(StoreEvent::RowsSorted {
            state: self.sort_state,
            no_refresh: false,
        });
    }

    /// Re-apply the current sort, e.g. after a bulk update.
    /// `no_refresh` tells views the rendered content did not change.
    pub fn reapply_sort(&mut self, columns: &ColumnModel, no_refresh: bool) {
        let Some(data_index) = self.sort_state.data_index else {
            return;
        };
        self.sort_rows(columns, data_index, self.sort_state.direction);
        self.fire(StoreEvent::RowsSorted {
            state: self.sort_state,
            no_refresh,
        });
    }

    fn sort_rows(&mut self, columns: &ColumnModel, data_index: usize, direction: SortDirection) {
        let comparator = columns.sort_comparator(data_index);
        let order = {
            let values: Vec<&Value> = (0..self.rows.len()).map(|r| self.value_at(r, data_index)).collect();
            sort::stable_order(&values, comparator, direction)
        };
        let mut old: Vec<Option<Row>> = std::mem::take(&mut self.rows).into_iter().map(Some).collect();
        self.rows = order
            .into_iter()
            .filter_map(|i| old[i].take())
            .collect();
    }
}

impl Default for RowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RowStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStore")
            .field("rows", &self.rows.len())
            .field("sort_state", &self.sort_state)
            .finish()
    }
}

#[cfg(test)]
mod test;
