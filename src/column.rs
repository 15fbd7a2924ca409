//! Column definitions and the model that answers structural questions about them

use std::cell::{Cell, OnceCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::editor::EditorSpec;
use crate::error::{GridError, Result};
use crate::event::{ListenerId, Publisher};
use crate::sort::{self, Comparator, SortType};
use crate::value::Value;

/// Width of columns that don't specify one
pub const DEFAULT_WIDTH: u32 = 100;

/// Rendered in place of an empty string so the cell keeps its height
pub const EMPTY_CELL: &str = "\u{a0}";

/// Formats a raw value for display: `(value, row, column) -> text`
pub type Renderer = Rc<dyn Fn(&Value, usize, usize) -> String>;

/// Raw value as text, or a single non-breaking space for an empty string
pub fn default_renderer(value: &Value, _row: usize, _col: usize) -> String {
    if value.is_empty_text() {
        EMPTY_CELL.to_string()
    } else {
        value.to_string()
    }
}

/// One column definition. Unset options fall back to model defaults.
#[derive(Clone, Default)]
pub struct Column {
    pub header: String,
    pub width: Option<u32>,
    pub data_index: Option<usize>,
    pub sortable: Option<bool>,
    pub sort_comparator: Option<Comparator>,
    pub renderer: Option<Renderer>,
    pub editable: Option<bool>,
    pub editor: Option<EditorSpec>,
    pub hidden: bool,
}

impl Column {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            ..Default::default()
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn data_index(mut self, data_index: usize) -> Self {
        self.data_index = Some(data_index);
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    pub fn sort_type(mut self, sort_type: SortType) -> Self {
        self.sort_comparator = Some(sort_type.comparator());
        self
    }

    pub fn sort_with(mut self, comparator: Comparator) -> Self {
        self.sort_comparator = Some(comparator);
        self
    }

    pub fn renderer(mut self, renderer: impl Fn(&Value, usize, usize) -> String + 'static) -> Self {
        self.renderer = Some(Rc::new(renderer));
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    pub fn editor(mut self, editor: EditorSpec) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("header", &self.header)
            .field("width", &self.width)
            .field("data_index", &self.data_index)
            .field("sortable", &self.sortable)
            .field("custom_renderer", &self.renderer.is_some())
            .field("editable", &self.editable)
            .field("editor", &self.editor)
            .field("hidden", &self.hidden)
            .finish()
    }
}

/// Structural changes to the column set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnEvent {
    WidthChanged { column: usize, width: u32 },
    HeaderChanged { column: usize },
    HiddenChanged { column: usize, hidden: bool },
    ColumnMoved { from: usize, to: usize },
    DataIndexChanged { column: usize },
}

pub struct ColumnModel {
    columns: Vec<Column>,
    pub default_width: u32,
    pub default_sortable: bool,
    default_renderer: Renderer,
    /// data index -> position, built on first data-index lookup
    data_map: OnceCell<HashMap<usize, usize>>,
    total_visible: Cell<Option<u32>>,
    total_all: Cell<Option<u32>>,
    listeners: Publisher<ColumnModel, ColumnEvent>,
}

impl ColumnModel {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        Self::with_defaults(columns, DEFAULT_WIDTH, false)
    }

    /// Build a model, rejecting malformed definitions
    pub fn with_defaults(columns: Vec<Column>, default_width: u32, default_sortable: bool) -> Result<Self> {
        if default_width == 0 {
            return Err(GridError::Config("default column width must be positive".to_string()));
        }
        let mut seen = HashMap::new();
        for (i, col) in columns.iter().enumerate() {
            if let Some(0) = col.width {
                return Err(GridError::InvalidWidth { column: i, width: 0 });
            }
            let di = col.data_index.unwrap_or(i);
            if seen.insert(di, i).is_some() {
                return Err(GridError::DuplicateDataIndex(di));
            }
        }

        Ok(Self {
            columns,
            default_width,
            default_sortable,
            default_renderer: Rc::new(default_renderer),
            data_map: OnceCell::new(),
            total_visible: Cell::new(None),
            total_all: Cell::new(None),
            listeners: Publisher::new(),
        })
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ColumnModel, &ColumnEvent) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn fire(&mut self, event: ColumnEvent) {
        let mut listeners = std::mem::take(&mut self.listeners);
        listeners.notify(self, &event);
        self.listeners = listeners;
    }

    fn invalidate_widths(&mut self) {
        self.total_visible.set(None);
        self.total_all.set(None);
    }

    fn invalidate_data_map(&mut self) {
        self.data_map = OnceCell::new();
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, col: usize) -> &Column {
        &self.columns[col]
    }

    pub fn is_sortable(&self, col: usize) -> bool {
        self.columns[col].sortable.unwrap_or(self.default_sortable)
    }

    /// Position of the column reading `data_index`, if any
    pub fn column_for_data_index(&self, data_index: usize) -> Option<usize> {
        self.data_map
            .get_or_init(|| {
                (0..self.columns.len())
                    .map(|i| (self.data_index(i), i))
                    .collect()
            })
            .get(&data_index)
            .copied()
    }

    /// Comparator for the column reading `data_index`
    pub fn sort_comparator(&self, data_index: usize) -> Comparator {
        match self.column_for_data_index(data_index) {
            Some(col) => self.columns[col].sort_comparator.unwrap_or(sort::none),
            None => {
                warn!(data_index, "no column reads this data index, sorting by raw value");
                sort::none
            }
        }
    }

    pub fn set_sort_comparator(&mut self, col: usize, comparator: Comparator) {
        self.columns[col].sort_comparator = Some(comparator);
    }

    pub fn renderer(&self, col: usize) -> Renderer {
        self.columns[col]
            .renderer
            .clone()
            .unwrap_or_else(|| self.default_renderer.clone())
    }

    pub fn set_renderer(&mut self, col: usize, renderer: Renderer) {
        self.columns[col].renderer = Some(renderer);
    }

    pub fn column_width(&self, col: usize) -> u32 {
        self.columns[col].width.unwrap_or(self.default_width)
    }

    pub fn set_column_width(&mut self, col: usize, width: u32, suppress_event: bool) -> Result<()> {
        if width == 0 {
            return Err(GridError::InvalidWidth { column: col, width });
        }
        self.columns[col].width = Some(width);
        self.invalidate_widths();
        if !suppress_event {
            self.fire(ColumnEvent::WidthChanged { column: col, width });
        }
        Ok(())
    }

    /// Sum of column widths, hidden columns only when asked for
    pub fn total_width(&self, include_hidden: bool) -> u32 {
        let cache = if include_hidden { &self.total_all } else { &self.total_visible };
        if let Some(total) = cache.get() {
            return total;
        }
        let total = (0..self.columns.len())
            .filter(|&i| include_hidden || !self.is_hidden(i))
            .map(|i| self.column_width(i))
            .sum();
        cache.set(Some(total));
        total
    }

    pub fn column_header(&self, col: usize) -> &str {
        &self.columns[col].header
    }

    pub fn set_column_header(&mut self, col: usize, header: impl Into<String>) {
        self.columns[col].header = header.into();
        self.fire(ColumnEvent::HeaderChanged { column: col });
    }

    /// Slot in the row's value vector this column reads; defaults to its position
    pub fn data_index(&self, col: usize) -> usize {
        self.columns[col].data_index.unwrap_or(col)
    }

    pub fn set_data_index(&mut self, col: usize, data_index: usize) -> Result<()> {
        if let Some(other) = self.column_for_data_index(data_index) {
            if other != col {
                return Err(GridError::DuplicateDataIndex(data_index));
            }
        }
        self.columns[col].data_index = Some(data_index);
        self.invalidate_data_map();
        self.fire(ColumnEvent::DataIndexChanged { column: col });
        Ok(())
    }

    pub fn is_cell_editable(&self, col: usize, _row: usize) -> bool {
        let column = &self.columns[col];
        match column.editable {
            Some(editable) => editable,
            None => column.editor.is_some(),
        }
    }

    pub fn cell_editor(&self, col: usize, _row: usize) -> Option<&EditorSpec> {
        self.columns[col].editor.as_ref()
    }

    pub fn set_editable(&mut self, col: usize, editable: bool) {
        self.columns[col].editable = Some(editable);
    }

    pub fn set_editor(&mut self, col: usize, editor: Option<EditorSpec>) {
        self.columns[col].editor = editor;
    }

    pub fn is_hidden(&self, col: usize) -> bool {
        self.columns[col].hidden
    }

    pub fn set_hidden(&mut self, col: usize, hidden: bool) {
        self.columns[col].hidden = hidden;
        self.invalidate_widths();
        self.fire(ColumnEvent::HiddenChanged { column: col, hidden });
    }

    /// Move a column to a new display position. Its data index travels with it.
    pub fn move_column(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        // pin the implicit data index before the position changes
        let di = self.data_index(from);
        let mut column = self.columns.remove(from);
        column.data_index = Some(di);
        for i in 0..self.columns.len() {
            let implicit = if i >= from { i + 1 } else { i };
            if self.columns[i].data_index.is_none() {
                self.columns[i].data_index = Some(implicit);
            }
        }
        self.columns.insert(to, column);
        self.invalidate_data_map();
        self.fire(ColumnEvent::ColumnMoved { from, to });
    }

    /// Positions of columns that are not hidden, left to right
    pub fn visible_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.columns.len()).filter(move |&i| !self.columns[i].hidden)
    }
}

impl fmt::Debug for ColumnModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnModel")
            .field("columns", &self.columns)
            .field("default_width", &self.default_width)
            .field("default_sortable", &self.default_sortable)
            .finish()
    }
}

#[cfg(test)]
mod test;
