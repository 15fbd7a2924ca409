//! Column layout, header state, hit-testing and auto-sizing

use tracing::{debug, trace};

use super::{CellRef, ViewState};
use crate::column::ColumnModel;
use crate::error::Result;
use crate::host::RenderHost;
use crate::store::RowStore;

impl<H: RenderHost> ViewState<H> {
    /// Measured once; the configured height stands in when the host can't tell
    pub(super) fn row_height(&mut self) -> u32 {
        if let Some(height) = self.row_height {
            return height;
        }
        let height = self
            .host
            .measure_row_height()
            .filter(|h| *h > 0)
            .unwrap_or(self.config.row_height)
            .max(1);
        self.row_height = Some(height);
        height
    }

    /// Lay out every visible column from the prefix sums of the preceding widths
    pub(super) fn update_columns(&mut self, columns: &ColumnModel) {
        self.stop_editing();
        let mut left = 0;
        for col in 0..columns.column_count() {
            if columns.is_hidden(col) {
                continue;
            }
            let width = columns.column_width(col);
            trace!(column = col, left, width, "column geometry");
            if let Some(header) = self.headers.get(col) {
                self.host.set_header_geometry(header, left, width);
            }
            self.host.set_column_geometry(col, left, width);
            left += width;
        }
        self.last_width = left;
        debug!(total_width = left, "columns laid out");

        self.viewport = self.host.measure_viewport();
        self.update_body_height();
        self.sync_scroll();
        self.schedule_reflow();
    }

    pub(super) fn update_body_height(&mut self) {
        let height = self.rows.len() as u32 * self.row_height();
        let width = self.last_width.max(self.viewport.width);
        self.host.set_body_extent(width, height);
        self.clamp_scroll(width, height);
    }

    pub(super) fn apply_hidden(&mut self, col: usize, hidden: bool) {
        self.host.set_column_visible(col, !hidden);
        if let Some(header) = self.headers.get(col) {
            self.host.set_header_visible(header, !hidden);
        }
    }

    pub(super) fn handle_hidden_change(&mut self, columns: &ColumnModel, col: usize, hidden: bool) {
        debug!(column = col, hidden, "column visibility changed");
        self.apply_hidden(col, hidden);
        self.update_columns(columns);
    }

    pub(super) fn update_header(&mut self, columns: &ColumnModel, col: usize) {
        if let Some(header) = self.headers.get(col) {
            self.host.set_header_content(header, columns.column_header(col));
        }
    }

    /// Headers and cells keep their handles; only their contents follow the new order
    pub(super) fn handle_column_moved(&mut self, columns: &ColumnModel, store: &RowStore) {
        debug!("column moved");
        for col in 0..columns.column_count() {
            self.update_header(columns, col);
            self.apply_hidden(col, columns.is_hidden(col));
        }
        self.update_header_sort_state(store, columns);
        self.update_columns(columns);
        if !self.rows.is_empty() {
            self.update_rows(store, columns, 0, self.rows.len() - 1);
        }
    }

    /// Show the sort indicator on the active sort column only
    pub(super) fn update_header_sort_state(&mut self, store: &RowStore, columns: &ColumnModel) {
        let state = store.sort_state();
        let active = state.data_index.and_then(|di| columns.column_for_data_index(di));
        for (col, header) in self.headers.iter().enumerate() {
            let direction = (active == Some(col)).then_some(state.direction);
            self.host.set_header_sort(header, direction);
        }
    }

    pub(super) fn set_header_hover(&mut self, col: usize, hover: bool) {
        if let Some(header) = self.headers.get(col) {
            self.host.set_header_hover(header, hover);
        }
    }

    pub(super) fn cell_at_point(&mut self, columns: &ColumnModel, row_count: usize, x: i32, y: i32) -> Option<CellRef> {
        let viewport = self.host.measure_viewport();
        let local_x = i64::from(x) - i64::from(viewport.left) + i64::from(self.scroll_left);
        let local_y = i64::from(y) - i64::from(viewport.top) + i64::from(self.scroll_top);
        if local_x < 0 || local_y < 0 {
            return None;
        }

        let mut left = 0i64;
        let column = columns.visible_columns().find(|&col| {
            let right = left + i64::from(columns.column_width(col));
            let hit = local_x >= left && local_x < right;
            left = right;
            hit
        })?;

        let row = (local_y / i64::from(self.row_height())) as usize;
        (row < row_count).then_some(CellRef { column, row })
    }

    /// Widest rendered content in the column plus the fudge margin
    pub(super) fn calc_column_width(&mut self, col: usize, max_rows: Option<usize>) -> u32 {
        let mut width = 0;
        if self.config.auto_size_headers {
            if let Some(header) = self.headers.get(col) {
                width = self.host.measure_header_width(header);
            }
        }
        let stop = max_rows.map_or(self.rows.len(), |m| m.min(self.rows.len()));
        for slot in &self.rows[..stop] {
            width = width.max(self.host.measure_cell_width(&slot.cells[col]));
        }
        width + self.config.width_fudge
    }

    /// Size visible columns to content, then hand out any slack to the viewport width
    pub(super) fn auto_size_columns(&mut self, columns: &mut ColumnModel) -> Result<()> {
        let min = self.config.min_column_width;
        let max_rows = self.config.max_rows_to_measure;
        let visible: Vec<usize> = columns.visible_columns().collect();
        // widths are floored at 1 so no write below can fail mid-batch
        for &col in &visible {
            let width = self.calc_column_width(col, max_rows).max(min).max(1);
            columns.set_column_width(col, width, true)?;
        }

        self.viewport = self.host.measure_viewport();
        let total = columns.total_width(false);
        if total < self.viewport.width && !visible.is_empty() {
            let slack = self.viewport.width - total;
            let count = visible.len() as u32;
            let share = slack / count;
            let remainder = slack % count;
            // leftmost columns absorb the remainder one pixel each
            for (i, &col) in visible.iter().enumerate() {
                let extra = share + u32::from((i as u32) < remainder);
                if extra > 0 {
                    let width = columns.column_width(col) + extra;
                    columns.set_column_width(col, width, true)?;
                }
            }
        }
        debug!(columns = visible.len(), total = columns.total_width(false), "auto-sized columns");
        self.update_columns(columns);
        Ok(())
    }
}
