//! The grid view: turns model notifications into host operations
//!
//! `GridView` binds one [`ColumnModel`] and one [`RowStore`] to a
//! [`RenderHost`]. It subscribes to both models and answers every
//! notification with the smallest set of host operations that reproduces the
//! new state: inserted rows get new row handles, deleted rows lose theirs,
//! updated cells are re-rendered in place, and width changes re-run the
//! column layout pass.
//!
//! Models and view share ownership through `Rc<RefCell<_>>`. Listeners must
//! not mutate a model while a notification is being delivered.

mod layout;
mod render;
mod scroll;

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::column::{ColumnEvent, ColumnModel};
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::event::{ListenerId, Publisher};
use crate::header::HeaderController;
use crate::host::{HostEvent, Pane, RenderHost, Viewport};
use crate::selection::RowSelection;
use crate::sort::SortState;
use crate::store::{RowId, RowStore, StoreEvent};
use crate::task::{Clock, DelayedTask, SystemClock};
use crate::value::Value;

/// Notifications for application code
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    RowClicked { row: usize, column: usize, id: RowId },
    ColumnResized { column: usize, width: u32 },
    SortChanged(SortState),
    Scroll { left: u32, top: u32 },
}

/// Result of a hit-test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub column: usize,
    pub row: usize,
}

/// Host handles for one rendered row
struct RowSlot<H: RenderHost> {
    id: RowId,
    handle: H::Row,
    cells: Vec<H::Cell>,
}

/// Cached position <-> data index mapping
#[derive(Debug, Clone, Default)]
struct IndexMap {
    col_to_data: Vec<usize>,
    data_to_col: HashMap<usize, usize>,
}

impl IndexMap {
    fn build(columns: &ColumnModel) -> Self {
        let mut map = IndexMap::default();
        for col in 0..columns.column_count() {
            let di = columns.data_index(col);
            map.col_to_data.push(di);
            map.data_to_col.insert(di, col);
        }
        map
    }
}

#[derive(Debug, Clone, Copy)]
struct EditSession {
    id: RowId,
    column: usize,
}

#[derive(Debug, Default)]
struct Tasks {
    adjust_scroll: DelayedTask<()>,
    ensure_visible: DelayedTask<RowId>,
    reflow: DelayedTask<()>,
    relayout: DelayedTask<()>,
}

/// Mutable view state shared with the model listeners
pub(crate) struct ViewState<H: RenderHost> {
    host: H,
    config: GridConfig,
    clock: Rc<dyn Clock>,
    rendered: bool,
    rows: Vec<RowSlot<H>>,
    headers: Vec<H::Header>,
    index_map: Option<IndexMap>,
    row_height: Option<u32>,
    last_width: u32,
    viewport: Viewport,
    scroll_left: u32,
    scroll_top: u32,
    last_focused: Option<RowId>,
    selection: RowSelection,
    editing: Option<EditSession>,
    tasks: Tasks,
    listeners: Publisher<(), GridEvent>,
}

impl<H: RenderHost> ViewState<H> {
    fn new(host: H, config: GridConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            host,
            config,
            clock,
            rendered: false,
            rows: Vec::new(),
            headers: Vec::new(),
            index_map: None,
            row_height: None,
            last_width: 0,
            viewport: Viewport::default(),
            scroll_left: 0,
            scroll_top: 0,
            last_focused: None,
            selection: RowSelection::new(),
            editing: None,
            tasks: Tasks::default(),
            listeners: Publisher::new(),
        }
    }

    fn emit(&mut self, event: GridEvent) {
        self.listeners.notify(&(), &event);
    }

    fn on_store_event(&mut self, store: &RowStore, columns: &ColumnModel, event: &StoreEvent) {
        if !self.rendered {
            return;
        }
        match *event {
            StoreEvent::CellUpdated { row, data_index } => self.update_cell(store, columns, row, data_index),
            StoreEvent::RowsInserted { first, last } => self.insert_rows(store, columns, first, last),
            StoreEvent::RowsDeleted { first, last } => self.delete_rows(store, first, last),
            StoreEvent::RowsUpdated { first, last } => self.update_rows(store, columns, first, last),
            StoreEvent::RowsSorted { state, no_refresh } => self.handle_sort(store, columns, state, no_refresh),
            StoreEvent::DataChanged => self.render_rows(store, columns),
        }
    }

    fn on_column_event(&mut self, columns: &ColumnModel, store: &RowStore, event: &ColumnEvent) {
        match *event {
            ColumnEvent::ColumnMoved { .. } | ColumnEvent::DataIndexChanged { .. } => {
                // must not survive the tick that changed the mapping
                self.index_map = None;
            }
            _ => {}
        }
        if !self.rendered {
            return;
        }
        match *event {
            ColumnEvent::WidthChanged { .. } => self.update_columns(columns),
            ColumnEvent::HeaderChanged { column } => self.update_header(columns, column),
            ColumnEvent::HiddenChanged { column, hidden } => self.handle_hidden_change(columns, column, hidden),
            ColumnEvent::ColumnMoved { .. } => self.handle_column_moved(columns, store),
            ColumnEvent::DataIndexChanged { column } => self.update_column_cells(store, columns, column),
        }
    }

    /// Full render: headers, column layout and every row
    fn render(&mut self, columns: &mut ColumnModel, store: &RowStore) -> Result<()> {
        self.headers.clear();
        for col in 0..columns.column_count() {
            let header = self.host.create_header(col);
            self.host.set_header_content(&header, columns.column_header(col));
            self.headers.push(header);
        }
        self.rendered = true;

        if self.config.auto_size_columns {
            self.render_rows(store, columns);
            self.auto_size_columns(columns)?;
        } else {
            self.update_columns(columns);
            self.render_rows(store, columns);
        }

        for col in 0..columns.column_count() {
            if columns.is_hidden(col) {
                self.apply_hidden(col, true);
            }
        }
        self.update_header_sort_state(store, columns);
        Ok(())
    }

    fn select_row(&mut self, store: &RowStore, row: usize, keep_existing: bool) {
        if !keep_existing {
            for slot in self.rows.iter() {
                if self.selection.is_selected_id(slot.id) {
                    self.host.set_row_selected(&slot.handle, false);
                }
            }
        }
        self.selection.select_row(store, row, keep_existing);
        if let Some(slot) = self.rows.get(row) {
            self.host.set_row_selected(&slot.handle, true);
        }
    }

    fn clear_selection(&mut self) {
        for slot in self.rows.iter() {
            if self.selection.is_selected_id(slot.id) {
                self.host.set_row_selected(&slot.handle, false);
            }
        }
        self.selection.clear();
    }

    fn stop_editing(&mut self) {
        if self.editing.take().is_some() {
            debug!("editing stopped");
        }
    }

    fn now(&self) -> std::time::Instant {
        self.clock.now()
    }
}

/// A grid bound to one column model and one row store
pub struct GridView<H: RenderHost + 'static> {
    state: Rc<RefCell<ViewState<H>>>,
    columns: Rc<RefCell<ColumnModel>>,
    store: Rc<RefCell<RowStore>>,
    header: HeaderController,
    column_listener: ListenerId,
    store_listener: ListenerId,
}

impl<H: RenderHost + 'static> GridView<H> {
    pub fn new(columns: Rc<RefCell<ColumnModel>>, store: Rc<RefCell<RowStore>>, host: H, config: GridConfig) -> Self {
        Self::with_clock(columns, store, host, config, Rc::new(SystemClock))
    }

    pub fn with_clock(
        columns: Rc<RefCell<ColumnModel>>,
        store: Rc<RefCell<RowStore>>,
        host: H,
        config: GridConfig,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let header = HeaderController::new(columns.clone(), store.clone(), config.min_column_width);
        let state = Rc::new(RefCell::new(ViewState::new(host, config, clock)));

        let store_listener = {
            let state: Weak<RefCell<ViewState<H>>> = Rc::downgrade(&state);
            let columns = Rc::downgrade(&columns);
            store.borrow_mut().subscribe(move |store, event| {
                if let (Some(state), Some(columns)) = (state.upgrade(), columns.upgrade()) {
                    let columns = columns.borrow();
                    state.borrow_mut().on_store_event(store, &columns, event);
                }
            })
        };

        let column_listener = {
            let state: Weak<RefCell<ViewState<H>>> = Rc::downgrade(&state);
            let store = Rc::downgrade(&store);
            columns.borrow_mut().subscribe(move |columns, event| {
                if let (Some(state), Some(store)) = (state.upgrade(), store.upgrade()) {
                    let store = store.borrow();
                    state.borrow_mut().on_column_event(columns, &store, event);
                }
            })
        };

        Self {
            state,
            columns,
            store,
            header,
            column_listener,
            store_listener,
        }
    }

    /// Render headers, layout and rows from scratch
    pub fn render(&self) -> Result<()> {
        let mut columns = self.columns.borrow_mut();
        let store = self.store.borrow();
        self.state.borrow_mut().render(&mut columns, &store)
    }

    pub fn columns(&self) -> &Rc<RefCell<ColumnModel>> {
        &self.columns
    }

    pub fn store(&self) -> &Rc<RefCell<RowStore>> {
        &self.store
    }

    pub fn subscribe(&self, mut listener: impl FnMut(&GridEvent) + 'static) -> ListenerId {
        self.state
            .borrow_mut()
            .listeners
            .subscribe(move |_: &(), event: &GridEvent| listener(event))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.state.borrow_mut().listeners.unsubscribe(id)
    }

    pub fn with_host<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut self.state.borrow_mut().host)
    }

    pub fn config(&self) -> Ref<'_, GridConfig> {
        Ref::map(self.state.borrow(), |s| &s.config)
    }

    /// Route a host input event
    pub fn dispatch(&self, event: HostEvent) {
        match event {
            HostEvent::Scroll { pane: Pane::Body, x, y } => self.state.borrow_mut().handle_scroll(x, y),
            // header follows body, never the reverse
            HostEvent::Scroll { pane: Pane::Header, .. } => {}
            HostEvent::Resize => self.state.borrow_mut().handle_resize(),
            HostEvent::Click { x, y } => {
                if !self.state.borrow().rendered {
                    return;
                }
                if let Some(cell) = self.cell_at_point(x, y) {
                    self.select_row(cell.row, false);
                    self.focus_row(cell.row);
                    let id = self.store.borrow().row_id(cell.row);
                    self.state.borrow_mut().emit(GridEvent::RowClicked {
                        row: cell.row,
                        column: cell.column,
                        id,
                    });
                }
            }
            HostEvent::HeaderOver { column } => {
                if self.header.highlights(column) {
                    self.state.borrow_mut().set_header_hover(column, true);
                }
            }
            HostEvent::HeaderOut { column } => {
                if self.header.highlights(column) {
                    self.state.borrow_mut().set_header_hover(column, false);
                }
            }
            HostEvent::HeaderClick { column } => {
                self.state.borrow_mut().stop_editing();
                self.header.header_click(column);
            }
            HostEvent::SplitterMoved { column, size } => match self.header.splitter_moved(column, size) {
                Ok(width) => self.state.borrow_mut().emit(GridEvent::ColumnResized { column, width }),
                Err(e) => warn!(column, size, error = %e, "column resize rejected"),
            },
            HostEvent::SplitterDoubleClick { column } => {
                if let Err(e) = self.auto_size_column(column, true) {
                    warn!(column, error = %e, "auto-size failed");
                }
            }
        }
    }

    /// Run deferred work whose deadline has passed. Returns true if anything ran.
    pub fn run_pending(&self) -> bool {
        self.state.borrow_mut().run_pending()
    }

    /// Map page coordinates to a cell; `None` outside every column or past the last row
    pub fn cell_at_point(&self, x: i32, y: i32) -> Option<CellRef> {
        let columns = self.columns.borrow();
        let row_count = self.store.borrow().row_count();
        self.state.borrow_mut().cell_at_point(&columns, row_count, x, y)
    }

    pub fn select_row(&self, row: usize, keep_existing: bool) {
        let store = self.store.borrow();
        self.state.borrow_mut().select_row(&store, row, keep_existing);
    }

    pub fn clear_selection(&self) {
        self.state.borrow_mut().clear_selection();
    }

    pub fn selected_rows(&self) -> Vec<usize> {
        let store = self.store.borrow();
        self.state.borrow().selection.selected_rows(&store)
    }

    /// Focus a row and scroll it into view (debounced)
    pub fn focus_row(&self, row: usize) {
        self.state.borrow_mut().focus_row(row);
    }

    pub fn focus_next(&self) {
        let next = self.focused_row().map_or(0, |r| r + 1);
        if next < self.store.borrow().row_count() {
            self.focus_row(next);
        }
    }

    pub fn focus_previous(&self) {
        if let Some(row) = self.focused_row().and_then(|r| r.checked_sub(1)) {
            self.focus_row(row);
        }
    }

    pub fn focused_row(&self) -> Option<usize> {
        let id = self.state.borrow().last_focused?;
        self.store.borrow().index_of_id(id)
    }

    /// Scroll so `row` is fully visible; debounced unless `immediate`
    pub fn ensure_visible(&self, row: usize, immediate: bool) {
        self.state.borrow_mut().ensure_visible(row, immediate);
    }

    pub fn scroll_offset(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (state.scroll_left, state.scroll_top)
    }

    pub fn row_height(&self) -> u32 {
        self.state.borrow_mut().row_height()
    }

    /// Size every visible column to its content, then spread leftover viewport width
    pub fn auto_size_columns(&self) -> Result<()> {
        let mut columns = self.columns.borrow_mut();
        self.state.borrow_mut().auto_size_columns(&mut columns)
    }

    /// Size one column to its content
    pub fn auto_size_column(&self, column: usize, force_min: bool) -> Result<u32> {
        let width = {
            let mut state = self.state.borrow_mut();
            let measured = state.calc_column_width(column, None);
            if force_min {
                measured.max(state.config.min_column_width).max(1)
            } else {
                measured.max(1)
            }
        };
        self.columns.borrow_mut().set_column_width(column, width, false)?;
        self.state.borrow_mut().emit(GridEvent::ColumnResized { column, width });
        Ok(width)
    }

    pub fn adjust_for_scroll(&self, immediate: bool) {
        self.state.borrow_mut().adjust_for_scroll(immediate);
    }

    /// Begin editing a cell, returning the text to edit
    pub fn start_editing(&self, row: usize, column: usize) -> Result<String> {
        let columns = self.columns.borrow();
        let store = self.store.borrow();
        if !columns.is_cell_editable(column, row) {
            return Err(GridError::NotEditable { row, column });
        }
        let value = store.value_at(row, columns.data_index(column));
        let text = match columns.cell_editor(column, row) {
            Some(editor) => editor.edit_text(value),
            None => value.to_string(),
        };
        let mut state = self.state.borrow_mut();
        state.stop_editing();
        state.editing = Some(EditSession {
            id: store.row_id(row),
            column,
        });
        Ok(text)
    }

    pub fn is_editing(&self) -> bool {
        self.state.borrow().editing.is_some()
    }

    /// Parse `text` with the column's editor and write it to the store
    pub fn complete_edit(&self, text: &str) -> Result<()> {
        let Some(session) = self.state.borrow_mut().editing.take() else {
            return Ok(());
        };
        let Some(row) = self.store.borrow().index_of_id(session.id) else {
            return Ok(());
        };
        let (data_index, parsed) = {
            let columns = self.columns.borrow();
            let parsed = match columns.cell_editor(session.column, row) {
                Some(editor) => editor.parse(text),
                None => Ok(Value::Text(text.to_string())),
            };
            (columns.data_index(session.column), parsed)
        };
        match parsed {
            Ok(value) => {
                self.store.borrow_mut().set_value_at(row, data_index, value);
                Ok(())
            }
            Err(e) => {
                // keep the session open so the user can correct the text
                self.state.borrow_mut().editing = Some(session);
                Err(e)
            }
        }
    }

    pub fn cancel_edit(&self) {
        self.state.borrow_mut().stop_editing();
    }
}

impl<H: RenderHost + 'static> Drop for GridView<H> {
    fn drop(&mut self) {
        if let Ok(mut columns) = self.columns.try_borrow_mut() {
            columns.unsubscribe(self.column_listener);
        }
        if let Ok(mut store) = self.store.try_borrow_mut() {
            store.unsubscribe(self.store_listener);
        }
    }
}
