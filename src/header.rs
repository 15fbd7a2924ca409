//! Header interaction: click-to-sort and splitter resizing

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::column::ColumnModel;
use crate::error::Result;
use crate::sort::{SortDirection, SortState};
use crate::store::RowStore;

/// Routes header input to the models. Holds no state of its own.
pub struct HeaderController {
    columns: Rc<RefCell<ColumnModel>>,
    store: Rc<RefCell<RowStore>>,
    min_column_width: u32,
}

impl HeaderController {
    pub fn new(columns: Rc<RefCell<ColumnModel>>, store: Rc<RefCell<RowStore>>, min_column_width: u32) -> Self {
        Self {
            columns,
            store,
            min_column_width,
        }
    }

    /// Sort by the clicked column. Ascending unless it is already the active
    /// sort column, in which case the direction flips.
    pub fn header_click(&self, column: usize) -> Option<SortState> {
        let columns = self.columns.borrow();
        if !columns.is_sortable(column) {
            return None;
        }
        let data_index = columns.data_index(column);
        let current = self.store.borrow().sort_state();
        let direction = if current.data_index == Some(data_index) {
            current.direction.toggled()
        } else {
            SortDirection::Ascending
        };
        debug!(column, data_index, ?direction, "header clicked");
        self.store.borrow_mut().sort(&columns, data_index, direction);
        Some(SortState {
            data_index: Some(data_index),
            direction,
        })
    }

    /// Only sortable headers react to hover
    pub fn highlights(&self, column: usize) -> bool {
        self.columns.borrow().is_sortable(column)
    }

    /// Apply the width a splitter drag ended at, clamped to the minimum
    pub fn splitter_moved(&self, column: usize, size: u32) -> Result<u32> {
        let width = size.max(self.min_column_width);
        self.columns.borrow_mut().set_column_width(column, width, false)?;
        Ok(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::sort::SortType;
    use crate::value::Value;

    fn controller() -> HeaderController {
        let columns = ColumnModel::new(vec![
            Column::new("A").width(60).sortable(true).sort_type(SortType::Float),
            Column::new("B").width(150),
        ])
        .unwrap();
        let store = RowStore::from_rows(vec![
            vec![Value::from("3"), Value::from("x")],
            vec![Value::from("10"), Value::from("y")],
            vec![Value::from("2"), Value::from("z")],
        ]);
        HeaderController::new(Rc::new(RefCell::new(columns)), Rc::new(RefCell::new(store)), 25)
    }

    fn first_column(c: &HeaderController) -> Vec<String> {
        let store = c.store.borrow();
        (0..store.row_count()).map(|r| store.value_at(r, 0).to_string()).collect()
    }

    #[test]
    fn test_click_sorts_then_toggles() {
        let c = controller();
        let state = c.header_click(0).unwrap();
        assert_eq!(state.direction, SortDirection::Ascending);
        assert_eq!(first_column(&c), vec!["2", "3", "10"]);

        let state = c.header_click(0).unwrap();
        assert_eq!(state.direction, SortDirection::Descending);
        assert_eq!(first_column(&c), vec!["10", "3", "2"]);

        c.header_click(0);
        assert_eq!(c.store.borrow().sort_state().direction, SortDirection::Ascending);
    }

    #[test]
    fn test_unsortable_header_is_ignored() {
        let c = controller();
        assert_eq!(c.header_click(1), None);
        assert!(!c.highlights(1));
        assert_eq!(c.store.borrow().sort_state().data_index, None);
    }

    #[test]
    fn test_splitter_clamps_to_minimum() {
        let c = controller();
        assert_eq!(c.splitter_moved(1, 10).unwrap(), 25);
        assert_eq!(c.columns.borrow().column_width(1), 25);
        assert_eq!(c.splitter_moved(1, 90).unwrap(), 90);
        assert_eq!(c.columns.borrow().column_width(1), 90);
    }
}
