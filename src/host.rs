//! The seam between the grid engine and whatever draws it
//!
//! A [`RenderHost`] owns the visual elements. The engine creates, orders and
//! fills them through this trait and asks the host for measurements; it never
//! touches the elements directly. Input flows back as [`HostEvent`]s passed to
//! `GridView::dispatch`.

use crate::sort::SortDirection;

/// The two independently scrolling surfaces of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Header,
    Body,
}

/// Body viewport: page-space origin plus visible client size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

/// Input reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// A pane was scrolled to `(x, y)`
    Scroll { pane: Pane, x: u32, y: u32 },
    /// The viewport changed size
    Resize,
    /// Pointer click in page coordinates over the body
    Click { x: i32, y: i32 },
    HeaderOver { column: usize },
    HeaderOut { column: usize },
    HeaderClick { column: usize },
    /// A column splitter was released after a drag at `size`
    SplitterMoved { column: usize, size: u32 },
    SplitterDoubleClick { column: usize },
}

pub trait RenderHost {
    type Row;
    type Cell;
    type Header;

    // rows and cells

    fn create_row(&mut self, position: usize) -> Self::Row;
    fn create_cell(&mut self, row: &Self::Row, column: usize) -> Self::Cell;
    /// Insert `row` before `before`, or append when `before` is `None`
    fn insert_row(&mut self, row: &Self::Row, before: Option<&Self::Row>);
    fn remove_row(&mut self, row: Self::Row);
    fn set_cell_content(&mut self, cell: &Self::Cell, content: &str);
    fn set_row_alternate(&mut self, row: &Self::Row, alternate: bool);
    fn set_row_top(&mut self, row: &Self::Row, top: u32);
    fn set_row_selected(&mut self, row: &Self::Row, selected: bool);
    fn focus_row(&mut self, _row: &Self::Row) {}

    // headers

    fn create_header(&mut self, column: usize) -> Self::Header;
    fn set_header_content(&mut self, header: &Self::Header, text: &str);
    fn set_header_geometry(&mut self, header: &Self::Header, left: u32, width: u32);
    fn set_header_visible(&mut self, header: &Self::Header, visible: bool);
    fn set_header_hover(&mut self, header: &Self::Header, hover: bool);
    fn set_header_sort(&mut self, header: &Self::Header, direction: Option<SortDirection>);

    // columns and panes

    /// Position and width applied to every cell of a body column
    fn set_column_geometry(&mut self, column: usize, left: u32, width: u32);
    fn set_column_visible(&mut self, column: usize, visible: bool);
    /// Scrollable extent of the body
    fn set_body_extent(&mut self, width: u32, height: u32);
    fn set_header_extent(&mut self, width: u32);
    fn set_scroll_offset(&mut self, pane: Pane, x: u32, y: u32);
    /// Re-run layout after a synchronous width write
    fn force_reflow(&mut self) {}

    // measurement

    /// Natural width of a cell's content
    fn measure_cell_width(&mut self, cell: &Self::Cell) -> u32;
    /// Natural width of a header's content
    fn measure_header_width(&mut self, header: &Self::Header) -> u32;
    fn measure_viewport(&mut self) -> Viewport;
    /// Uniform row height, if the host can tell
    fn measure_row_height(&mut self) -> Option<u32>;
}
