//! Row rendering: the incremental insert/delete/update paths

use tracing::{debug, trace};

use super::{IndexMap, RowSlot, ViewState};
use crate::column::{ColumnModel, Renderer, EMPTY_CELL};
use crate::host::RenderHost;
use crate::sort::SortState;
use crate::store::RowStore;
use crate::value::Value;
use crate::view::GridEvent;

/// Display text for a cell; empty renderer output shows as a non-breaking space
fn cell_text(renderer: &Renderer, value: &Value, row: usize, col: usize) -> String {
    let text = renderer(value, row, col);
    if text.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        text
    }
}

fn renderers(columns: &ColumnModel) -> Vec<Renderer> {
    (0..columns.column_count()).map(|col| columns.renderer(col)).collect()
}

impl<H: RenderHost> ViewState<H> {
    /// Drop every row handle and render the store from scratch
    pub(super) fn render_rows(&mut self, store: &RowStore, columns: &ColumnModel) {
        debug!(rows = store.row_count(), "rendering all rows");
        self.clear_selection();
        self.last_focused = None;
        self.stop_editing();
        for slot in self.rows.drain(..) {
            self.host.remove_row(slot.handle);
        }
        if store.row_count() > 0 {
            self.insert_rows(store, columns, 0, store.row_count() - 1);
        } else {
            self.update_body_height();
        }
    }

    pub(super) fn insert_rows(&mut self, store: &RowStore, columns: &ColumnModel, first: usize, last: usize) {
        debug!(first, last, "rows inserted");
        self.adjust_for_scroll(true);

        let renderers = renderers(columns);
        let data_indexes = &self
            .index_map
            .get_or_insert_with(|| IndexMap::build(columns))
            .col_to_data;

        let before = self.rows.get(first).map(|slot| &slot.handle);
        let mut new_slots = Vec::with_capacity(last + 1 - first);
        for row in first..=last {
            trace!(row, "creating row");
            let handle = self.host.create_row(row);
            let mut cells = Vec::with_capacity(renderers.len());
            for (col, renderer) in renderers.iter().enumerate() {
                let cell = self.host.create_cell(&handle, col);
                let text = cell_text(renderer, store.value_at(row, data_indexes[col]), row, col);
                self.host.set_cell_content(&cell, &text);
                cells.push(cell);
            }
            self.host.insert_row(&handle, before);
            new_slots.push(RowSlot {
                id: store.row_id(row),
                handle,
                cells,
            });
        }
        self.rows.splice(first..first, new_slots);

        self.update_row_indexes(first);
        self.update_body_height();
        self.adjust_for_scroll(false);
    }

    pub(super) fn delete_rows(&mut self, store: &RowStore, first: usize, last: usize) {
        debug!(first, last, "rows deleted");
        // selection must never reference removed rows
        for slot in &self.rows[first..=last] {
            self.selection.deselect_id(slot.id);
            if self.last_focused == Some(slot.id) {
                self.last_focused = None;
            }
            if self.editing.is_some_and(|e| e.id == slot.id) {
                self.editing = None;
            }
        }
        for slot in self.rows.drain(first..=last) {
            self.host.remove_row(slot.handle);
        }
        debug_assert_eq!(self.rows.len(), store.row_count());

        self.update_row_indexes(first);
        self.update_body_height();
        self.adjust_for_scroll(false);
    }

    /// Re-stripe and re-position rows from `first` to the end
    pub(super) fn update_row_indexes(&mut self, first: usize) {
        let row_height = self.row_height();
        let stripe = self.config.stripe_rows;
        for (row, slot) in self.rows.iter().enumerate().skip(first) {
            self.host.set_row_alternate(&slot.handle, stripe && (row + 1) % 2 == 0);
            self.host.set_row_top(&slot.handle, row as u32 * row_height);
        }
    }

    /// Re-render every cell of rows `first..=last`
    pub(super) fn update_rows(&mut self, store: &RowStore, columns: &ColumnModel, first: usize, last: usize) {
        debug!(first, last, "rows updated");
        let renderers = renderers(columns);
        let data_indexes = &self
            .index_map
            .get_or_insert_with(|| IndexMap::build(columns))
            .col_to_data;
        for row in first..=last {
            let slot = &mut self.rows[row];
            slot.id = store.row_id(row);
            for (col, renderer) in renderers.iter().enumerate() {
                let text = cell_text(renderer, store.value_at(row, data_indexes[col]), row, col);
                self.host.set_cell_content(&slot.cells[col], &text);
            }
        }
    }

    pub(super) fn update_cell(&mut self, store: &RowStore, columns: &ColumnModel, row: usize, data_index: usize) {
        let Some(&col) = self
            .index_map
            .get_or_insert_with(|| IndexMap::build(columns))
            .data_to_col
            .get(&data_index)
        else {
            // no column shows this slot
            return;
        };
        debug!(row, column = col, "cell updated");
        let text = cell_text(&columns.renderer(col), store.value_at(row, data_index), row, col);
        self.host.set_cell_content(&self.rows[row].cells[col], &text);
    }

    /// Re-render one column across all rows, after its data index changed
    pub(super) fn update_column_cells(&mut self, store: &RowStore, columns: &ColumnModel, col: usize) {
        let renderer = columns.renderer(col);
        let data_index = columns.data_index(col);
        for (row, slot) in self.rows.iter().enumerate() {
            let text = cell_text(&renderer, store.value_at(row, data_index), row, col);
            self.host.set_cell_content(&slot.cells[col], &text);
        }
    }

    pub(super) fn handle_sort(&mut self, store: &RowStore, columns: &ColumnModel, state: SortState, no_refresh: bool) {
        debug!(?state, no_refresh, "rows sorted");
        self.sync_selections_to_ids(store);
        if !no_refresh && !self.rows.is_empty() {
            self.update_rows(store, columns, 0, self.rows.len() - 1);
        }
        self.update_header_sort_state(store, columns);
        self.emit(GridEvent::SortChanged(state));

        let focused = self.last_focused.and_then(|id| store.index_of_id(id));
        if let Some(row) = focused {
            self.focus_row(row);
        }
    }

    /// Rows kept their handles but moved; put ids and selected flags back in step
    fn sync_selections_to_ids(&mut self, store: &RowStore) {
        for (row, slot) in self.rows.iter_mut().enumerate() {
            slot.id = store.row_id(row);
            self.host
                .set_row_selected(&slot.handle, self.selection.is_selected_id(slot.id));
        }
    }
}
