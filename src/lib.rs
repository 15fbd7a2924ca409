//! An incremental grid view engine
//!
//! A [`ColumnModel`](column::ColumnModel) describes the columns, a
//! [`RowStore`](store::RowStore) holds the rows and their sort state, and a
//! [`GridView`](view::GridView) keeps a [`RenderHost`](host::RenderHost) in
//! step with both by translating every model notification into the smallest
//! set of host operations.

pub mod column;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod fileio;
pub mod header;
pub mod host;
pub mod selection;
pub mod sort;
pub mod store;
pub mod task;
pub mod tui;
pub mod value;
pub mod view;

pub use column::{Column, ColumnModel};
pub use error::{GridError, Result};
pub use host::RenderHost;
pub use store::RowStore;
pub use view::GridView;
