//! Terminal front end: a `RenderHost` over a character grid, drawn with ratatui

mod host;
pub mod ui;

pub use host::{HeaderTarget, TerminalHost};
