use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{debug, warn};

use gridview::column::ColumnModel;
use gridview::config::GridConfig;
use gridview::error::Result;
use gridview::fileio::FileIO;
use gridview::host::{HostEvent, Pane};
use gridview::store::RowStore;
use gridview::tui::{ui, HeaderTarget, TerminalHost};
use gridview::value::Value;
use gridview::view::{GridEvent, GridView};

/// Two splitter presses closer than this are a double-click
const DOUBLE_CLICK: Duration = Duration::from_millis(400);
const WHEEL_ROWS: i32 = 3;
const HORIZONTAL_STEP: i32 = 4;

/// A splitter drag in progress
struct Drag {
    column: usize,
    origin: u16,
    width: u32,
}

pub struct App {
    view: GridView<TerminalHost>,
    file_io: FileIO,
    message: Rc<RefCell<Option<String>>>,
    should_quit: bool,
    drag: Option<Drag>,
    last_splitter_press: Option<(usize, Instant)>,
    hovered_header: Option<usize>,
}

impl App {
    pub fn new(columns: ColumnModel, rows: Vec<Vec<Value>>, config: GridConfig, file_io: FileIO, area: Rect) -> Result<Self> {
        let columns = Rc::new(RefCell::new(columns));
        let store = Rc::new(RefCell::new(RowStore::from_rows(rows)));
        let mut host = TerminalHost::new();
        host.set_area(area);
        let view = GridView::new(columns, store, host, config);

        let message = Rc::new(RefCell::new(None));
        let sink = message.clone();
        view.subscribe(move |event| {
            let text = match event {
                GridEvent::RowClicked { row, column, .. } => Some(format!("row {}, column {}", row + 1, column + 1)),
                GridEvent::ColumnResized { column, width } => Some(format!("column {} is {} wide", column + 1, width)),
                GridEvent::SortChanged(_) | GridEvent::Scroll { .. } => None,
            };
            if text.is_some() {
                *sink.borrow_mut() = text;
            }
        });
        view.render()?;

        Ok(Self {
            view,
            file_io,
            message,
            should_quit: false,
            drag: None,
            last_splitter_press: None,
            hovered_header: None,
        })
    }

    pub fn set_message(&self, message: String) {
        *self.message.borrow_mut() = Some(message);
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            let area = ui::body_area(terminal.size()?);
            if self.view.with_host(|h| h.set_area(area)) {
                self.view.dispatch(HostEvent::Resize);
            }
            self.view.run_pending();

            let file_name = self.file_io.file_name();
            let sort = self.sort_description();
            let message = self.message.borrow().clone();
            let rows = self.view.store().borrow().row_count();
            let status = ui::Status {
                file_name: &file_name,
                rows,
                sort: sort.as_ref().map(|(h, d)| (h.as_str(), *d)),
                message: message.as_deref(),
            };
            terminal.draw(|f| self.view.with_host(|h| ui::render(f, h, &status)))?;

            if poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    // picked up from the terminal size on the next pass
                    Event::Resize(..) => {}
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn sort_description(&self) -> Option<(String, gridview::sort::SortDirection)> {
        let state = self.view.store().borrow().sort_state();
        let columns = self.view.columns().borrow();
        let col = columns.column_for_data_index(state.data_index?)?;
        Some((columns.column_header(col).to_string(), state.direction))
    }

    fn scroll_by(&self, dx: i32, dy: i32) {
        let (x, y) = self.view.with_host(|h| h.scroll_body_by(dx, dy));
        self.view.dispatch(HostEvent::Scroll { pane: Pane::Body, x, y });
    }

    fn handle_key(&mut self, key: KeyEvent) {
        debug!(code = ?key.code, "key");
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.view.focus_next(),
            KeyCode::Char('k') | KeyCode::Up => self.view.focus_previous(),
            KeyCode::Char('h') | KeyCode::Left => self.scroll_by(-HORIZONTAL_STEP, 0),
            KeyCode::Char('l') | KeyCode::Right => self.scroll_by(HORIZONTAL_STEP, 0),
            KeyCode::PageDown => {
                let page = self.view.with_host(|h| i32::from(h.area.height));
                self.scroll_by(0, page);
            }
            KeyCode::PageUp => {
                let page = self.view.with_host(|h| i32::from(h.area.height));
                self.scroll_by(0, -page);
            }
            KeyCode::Char('a') => match self.view.auto_size_columns() {
                Ok(()) => self.set_message("auto-sized columns".to_string()),
                Err(e) => {
                    warn!(error = %e, "auto-size failed");
                    self.set_message(e.to_string());
                }
            },
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let header_row = self.view.with_host(|h| h.header_row());
        let on_header = mouse.row == header_row;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if on_header => self.header_press(mouse.column),
            MouseEventKind::Down(MouseButton::Left) => self.view.dispatch(HostEvent::Click {
                x: i32::from(mouse.column),
                y: i32::from(mouse.row),
            }),
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(drag) = self.drag.take() {
                    let size = (i64::from(drag.width) + i64::from(mouse.column) - i64::from(drag.origin)).max(1) as u32;
                    if size != drag.width {
                        self.view.dispatch(HostEvent::SplitterMoved { column: drag.column, size });
                    }
                }
            }
            MouseEventKind::Moved => {
                let target = if on_header {
                    self.view.with_host(|h| h.header_target_at(mouse.column))
                } else {
                    None
                };
                let column = match target {
                    Some(HeaderTarget::Column(c)) | Some(HeaderTarget::Splitter(c)) => Some(c),
                    None => None,
                };
                if column != self.hovered_header {
                    if let Some(old) = self.hovered_header {
                        self.view.dispatch(HostEvent::HeaderOut { column: old });
                    }
                    if let Some(new) = column {
                        self.view.dispatch(HostEvent::HeaderOver { column: new });
                    }
                    self.hovered_header = column;
                }
            }
            MouseEventKind::ScrollDown => self.scroll_by(0, WHEEL_ROWS),
            MouseEventKind::ScrollUp => self.scroll_by(0, -WHEEL_ROWS),
            MouseEventKind::ScrollRight => self.scroll_by(HORIZONTAL_STEP, 0),
            MouseEventKind::ScrollLeft => self.scroll_by(-HORIZONTAL_STEP, 0),
            _ => {}
        }
    }

    fn header_press(&mut self, x: u16) {
        match self.view.with_host(|h| h.header_target_at(x)) {
            Some(HeaderTarget::Splitter(column)) => {
                let now = Instant::now();
                let double = matches!(
                    self.last_splitter_press,
                    Some((c, at)) if c == column && now.duration_since(at) < DOUBLE_CLICK
                );
                if double {
                    self.last_splitter_press = None;
                    self.view.dispatch(HostEvent::SplitterDoubleClick { column });
                } else {
                    self.last_splitter_press = Some((column, now));
                    let width = self.view.columns().borrow().column_width(column);
                    self.drag = Some(Drag { column, origin: x, width });
                }
            }
            Some(HeaderTarget::Column(column)) => self.view.dispatch(HostEvent::HeaderClick { column }),
            None => {}
        }
    }
}
