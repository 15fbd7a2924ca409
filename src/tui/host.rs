use std::collections::HashMap;

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use crate::host::{Pane, RenderHost, Viewport};
use crate::sort::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellHandle {
    row: u64,
    column: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RowState {
    pub cells: Vec<String>,
    pub alternate: bool,
    pub top: u32,
    pub selected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HeaderState {
    pub text: String,
    pub left: u32,
    pub width: u32,
    pub visible: bool,
    pub hover: bool,
    pub sort: Option<SortDirection>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnState {
    pub left: u32,
    pub width: u32,
    pub visible: bool,
}

/// What a point on the header line lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTarget {
    Column(usize),
    /// The last cell of a column, where dragging resizes it
    Splitter(usize),
}

/// Terminal-backed host: one pixel is one terminal cell, rows are one line high
#[derive(Debug, Default)]
pub struct TerminalHost {
    next_row: u64,
    rows: HashMap<u64, RowState>,
    order: Vec<u64>,
    focused: Option<u64>,
    pub headers: Vec<HeaderState>,
    pub columns: Vec<ColumnState>,
    pub body_extent: (u32, u32),
    pub header_extent: u32,
    pub scroll: (u32, u32),
    pub header_scroll: u32,
    /// Body area in terminal coordinates; the header line sits just above it
    pub area: Rect,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the area changed
    pub fn set_area(&mut self, area: Rect) -> bool {
        let changed = self.area != area;
        self.area = area;
        changed
    }

    pub fn row_count(&self) -> usize {
        self.order.len()
    }

    /// Rows in display order
    pub fn rows(&self) -> impl Iterator<Item = &RowState> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    pub fn is_focused(&self, index: usize) -> bool {
        self.focused.is_some() && self.order.get(index).copied() == self.focused
    }

    /// Largest body scroll offsets that keep the viewport filled
    pub fn max_scroll(&self) -> (u32, u32) {
        (
            self.body_extent.0.saturating_sub(u32::from(self.area.width)),
            self.body_extent.1.saturating_sub(u32::from(self.area.height)),
        )
    }

    /// Scroll the body by a delta, clamped to the extent. Returns the new offsets.
    pub fn scroll_body_by(&mut self, dx: i32, dy: i32) -> (u32, u32) {
        let (max_x, max_y) = self.max_scroll();
        let x = (i64::from(self.scroll.0) + i64::from(dx)).clamp(0, i64::from(max_x)) as u32;
        let y = (i64::from(self.scroll.1) + i64::from(dy)).clamp(0, i64::from(max_y)) as u32;
        self.scroll = (x, y);
        self.scroll
    }

    /// Header line target under screen column `x`
    pub fn header_target_at(&self, x: u16) -> Option<HeaderTarget> {
        let local = u32::from(x.checked_sub(self.area.x)?) + self.header_scroll;
        self.headers.iter().enumerate().find_map(|(col, h)| {
            if !h.visible || local < h.left || local >= h.left + h.width {
                None
            } else if local == h.left + h.width - 1 {
                Some(HeaderTarget::Splitter(col))
            } else {
                Some(HeaderTarget::Column(col))
            }
        })
    }

    pub fn header_row(&self) -> u16 {
        self.area.y.saturating_sub(1)
    }
}

fn text_width(text: &str) -> u32 {
    UnicodeWidthStr::width(text) as u32
}

impl RenderHost for TerminalHost {
    type Row = RowHandle;
    type Cell = CellHandle;
    type Header = usize;

    fn create_row(&mut self, _position: usize) -> RowHandle {
        let id = self.next_row;
        self.next_row += 1;
        self.rows.insert(id, RowState::default());
        RowHandle(id)
    }

    fn create_cell(&mut self, row: &RowHandle, column: usize) -> CellHandle {
        if let Some(state) = self.rows.get_mut(&row.0) {
            if state.cells.len() <= column {
                state.cells.resize(column + 1, String::new());
            }
        }
        CellHandle { row: row.0, column }
    }

    fn insert_row(&mut self, row: &RowHandle, before: Option<&RowHandle>) {
        match before.and_then(|b| self.order.iter().position(|id| *id == b.0)) {
            Some(pos) => self.order.insert(pos, row.0),
            None => self.order.push(row.0),
        }
    }

    fn remove_row(&mut self, row: RowHandle) {
        self.rows.remove(&row.0);
        if let Some(pos) = self.order.iter().position(|id| *id == row.0) {
            self.order.remove(pos);
        }
        if self.focused == Some(row.0) {
            self.focused = None;
        }
    }

    fn set_cell_content(&mut self, cell: &CellHandle, content: &str) {
        if let Some(state) = self.rows.get_mut(&cell.row) {
            state.cells[cell.column] = content.to_string();
        }
    }

    fn set_row_alternate(&mut self, row: &RowHandle, alternate: bool) {
        if let Some(state) = self.rows.get_mut(&row.0) {
            state.alternate = alternate;
        }
    }

    fn set_row_top(&mut self, row: &RowHandle, top: u32) {
        if let Some(state) = self.rows.get_mut(&row.0) {
            state.top = top;
        }
    }

    fn set_row_selected(&mut self, row: &RowHandle, selected: bool) {
        if let Some(state) = self.rows.get_mut(&row.0) {
            state.selected = selected;
        }
    }

    fn focus_row(&mut self, row: &RowHandle) {
        self.focused = Some(row.0);
    }

    fn create_header(&mut self, column: usize) -> usize {
        if self.headers.len() <= column {
            self.headers.resize(column + 1, HeaderState::default());
        }
        self.headers[column].visible = true;
        column
    }

    fn set_header_content(&mut self, header: &usize, text: &str) {
        self.headers[*header].text = text.to_string();
    }

    fn set_header_geometry(&mut self, header: &usize, left: u32, width: u32) {
        let h = &mut self.headers[*header];
        h.left = left;
        h.width = width;
    }

    fn set_header_visible(&mut self, header: &usize, visible: bool) {
        self.headers[*header].visible = visible;
    }

    fn set_header_hover(&mut self, header: &usize, hover: bool) {
        self.headers[*header].hover = hover;
    }

    fn set_header_sort(&mut self, header: &usize, direction: Option<SortDirection>) {
        self.headers[*header].sort = direction;
    }

    fn set_column_geometry(&mut self, column: usize, left: u32, width: u32) {
        if self.columns.len() <= column {
            self.columns.resize(column + 1, ColumnState { visible: true, ..ColumnState::default() });
        }
        self.columns[column].left = left;
        self.columns[column].width = width;
    }

    fn set_column_visible(&mut self, column: usize, visible: bool) {
        if self.columns.len() <= column {
            self.columns.resize(column + 1, ColumnState { visible: true, ..ColumnState::default() });
        }
        self.columns[column].visible = visible;
    }

    fn set_body_extent(&mut self, width: u32, height: u32) {
        self.body_extent = (width, height);
        // a shrinking body pulls the scroll position back in range
        let (max_x, max_y) = self.max_scroll();
        self.scroll = (self.scroll.0.min(max_x), self.scroll.1.min(max_y));
    }

    fn set_header_extent(&mut self, width: u32) {
        self.header_extent = width;
    }

    fn set_scroll_offset(&mut self, pane: Pane, x: u32, y: u32) {
        match pane {
            Pane::Header => self.header_scroll = x,
            Pane::Body => self.scroll = (x, y),
        }
    }

    fn measure_cell_width(&mut self, cell: &CellHandle) -> u32 {
        self.rows
            .get(&cell.row)
            .and_then(|r| r.cells.get(cell.column))
            .map_or(0, |text| text_width(text.trim()))
    }

    fn measure_header_width(&mut self, header: &usize) -> u32 {
        // room for the sort arrow
        text_width(&self.headers[*header].text) + 2
    }

    fn measure_viewport(&mut self) -> Viewport {
        Viewport {
            left: i32::from(self.area.x),
            top: i32::from(self.area.y),
            width: u32::from(self.area.width),
            height: u32::from(self.area.height),
        }
    }

    fn measure_row_height(&mut self) -> Option<u32> {
        Some(1)
    }
}
