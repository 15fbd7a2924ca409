//! Row selection that survives sorting

use std::collections::HashSet;

use crate::store::{RowId, RowStore};

/// Selected rows, keyed by row identity so the selection follows rows
/// through sorts, inserts and deletes
#[derive(Debug, Clone, Default)]
pub struct RowSelection {
    selected: HashSet<RowId>,
    last_selected: Option<RowId>,
}

impl RowSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_row(&mut self, store: &RowStore, row: usize, keep_existing: bool) {
        if !keep_existing {
            self.selected.clear();
        }
        let id = store.row_id(row);
        self.selected.insert(id);
        self.last_selected = Some(id);
    }

    pub fn select_id(&mut self, id: RowId) {
        self.selected.insert(id);
        self.last_selected = Some(id);
    }

    pub fn deselect_id(&mut self, id: RowId) -> bool {
        if self.last_selected == Some(id) {
            self.last_selected = None;
        }
        self.selected.remove(&id)
    }

    /// Deselect rows `first..=last` of the store
    pub fn deselect_range(&mut self, store: &RowStore, first: usize, last: usize) {
        for row in first..=last {
            self.deselect_id(store.row_id(row));
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.last_selected = None;
    }

    pub fn is_selected_id(&self, id: RowId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_selected(&self, store: &RowStore, row: usize) -> bool {
        self.is_selected_id(store.row_id(row))
    }

    pub fn last_selected(&self) -> Option<RowId> {
        self.last_selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Current display indices of the selected rows, ascending
    pub fn selected_rows(&self, store: &RowStore) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .selected
            .iter()
            .filter_map(|id| store.index_of_id(*id))
            .collect();
        rows.sort_unstable();
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, ColumnModel};
    use crate::sort::{SortDirection, SortType};
    use crate::value::Value;

    fn store() -> RowStore {
        RowStore::from_rows(vec![
            vec![Value::from("3")],
            vec![Value::from("1")],
            vec![Value::from("2")],
        ])
    }

    #[test]
    fn test_selection_follows_rows_through_sort() {
        let mut store = store();
        let columns = ColumnModel::new(vec![Column::new("N").sort_type(SortType::Integer)]).unwrap();
        let mut sel = RowSelection::new();
        sel.select_row(&store, 0, false);

        store.sort(&columns, 0, SortDirection::Ascending);
        assert_eq!(sel.selected_rows(&store), vec![2]);
        assert!(sel.is_selected(&store, 2));
    }

    #[test]
    fn test_deselect_range() {
        let store = store();
        let mut sel = RowSelection::new();
        sel.select_row(&store, 0, false);
        sel.select_row(&store, 1, true);
        sel.select_row(&store, 2, true);

        sel.deselect_range(&store, 1, 2);
        assert_eq!(sel.selected_rows(&store), vec![0]);
        assert_eq!(sel.last_selected(), None);
    }

    #[test]
    fn test_select_replaces_unless_kept() {
        let store = store();
        let mut sel = RowSelection::new();
        sel.select_row(&store, 0, false);
        sel.select_row(&store, 1, false);
        assert_eq!(sel.selected_rows(&store), vec![1]);
        assert_eq!(sel.len(), 1);
    }
}
