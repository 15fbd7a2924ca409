use std::io;

use thiserror::Error;

/// Errors surfaced by the grid engine and its loaders
#[derive(Debug, Error)]
pub enum GridError {
    #[error("column {column}: width must be positive (got {width})")]
    InvalidWidth { column: usize, width: u32 },

    #[error("data index {0} is read by more than one column")]
    DuplicateDataIndex(usize),

    #[error("column {column}: data index {data_index} is out of range")]
    DataIndexOutOfRange { column: usize, data_index: usize },

    #[error("cell ({row}, {column}) is not editable")]
    NotEditable { row: usize, column: usize },

    #[error("invalid value: {0}")]
    InvalidEdit(String),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, GridError>;
