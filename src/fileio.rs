use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::column::Column;
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::sort::SortType;
use crate::value::Value;

/// Non-empty cells inspected when guessing a column's sort type
const TYPE_PROBE_SAMPLE_SIZE: usize = 100;

/// Detected file format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Csv,
    Tsv,
}

impl FileFormat {
    /// Detect format from file extension
    fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" => Some(FileFormat::Tsv),
            _ => None,
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            FileFormat::Csv => b',',
            FileFormat::Tsv => b'\t',
        }
    }
}

/// Result of loading a file, including any warnings
pub struct LoadResult {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
    pub warnings: Vec<String>,
}

pub struct FileIO {
    pub file_path: PathBuf,
    delimiter: u8,
    has_header: bool,
}

impl FileIO {
    /// `delimiter` overrides the one implied by the extension
    pub fn new(file_path: PathBuf, delimiter: Option<u8>, has_header: bool) -> Self {
        let delimiter = delimiter
            .or_else(|| FileFormat::from_extension(&file_path).map(|f| f.delimiter()))
            .unwrap_or(b',');
        Self {
            file_path,
            delimiter,
            has_header,
        }
    }

    pub fn file_name(&self) -> String {
        self.file_path.display().to_string()
    }

    pub fn delimiter_name(&self) -> String {
        match self.delimiter {
            b',' => "comma".to_string(),
            b'\t' => "tab".to_string(),
            b';' => "semicolon".to_string(),
            b'|' => "pipe".to_string(),
            d => format!("'{}'", d as char),
        }
    }

    /// Read the file into rows and derive one column per field.
    /// Column definitions in `config` replace the derived ones.
    pub fn load(&self, config: &GridConfig) -> Result<LoadResult> {
        let file = File::open(&self.file_path)?;
        let reader = BufReader::with_capacity(1 << 20, file);

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::Fields)
            .from_reader(reader);

        let mut records: Vec<Vec<String>> = Vec::new();
        let mut max_cols = 0;
        let mut needs_padding = false;
        for result in csv_reader.records() {
            let record = result?;
            let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            if row.len() != max_cols && !records.is_empty() {
                needs_padding = true;
            }
            max_cols = max_cols.max(row.len());
            records.push(row);
        }

        let mut warnings = Vec::new();
        if needs_padding {
            warnings.push(format!("Padded rows with empty cells (max width: {} columns)", max_cols));
            for row in records.iter_mut() {
                row.resize(max_cols, String::new());
            }
        }

        let headers: Vec<String> = if self.has_header && !records.is_empty() {
            records.remove(0)
        } else {
            (0..max_cols).map(col_to_letters).collect()
        };

        let columns = match config.column_definitions() {
            Some(columns) => {
                validate_data_indexes(&columns, max_cols)?;
                columns
            }
            None => headers
                .iter()
                .enumerate()
                .map(|(col, header)| {
                    Column::new(header.clone())
                        .sortable(true)
                        .sort_type(probe_sort_type(&records, col))
                })
                .collect(),
        };

        let rows = records
            .into_iter()
            .map(|row| row.into_iter().map(Value::Text).collect())
            .collect::<Vec<Vec<Value>>>();

        info!(
            file = %self.file_name(),
            rows = rows.len(),
            columns = columns.len(),
            "loaded file"
        );
        Ok(LoadResult {
            columns,
            rows,
            warnings,
        })
    }
}

fn validate_data_indexes(columns: &[Column], width: usize) -> Result<()> {
    for (col, column) in columns.iter().enumerate() {
        let data_index = column.data_index.unwrap_or(col);
        if data_index >= width {
            return Err(GridError::DataIndexOutOfRange { column: col, data_index });
        }
    }
    Ok(())
}

/// Float when at least half the sampled cells are numbers, text otherwise
fn probe_sort_type(records: &[Vec<String>], col: usize) -> SortType {
    let mut numeric_count = 0;
    let mut total_count = 0;
    for row in records {
        if total_count >= TYPE_PROBE_SAMPLE_SIZE {
            break;
        }
        let trimmed = row.get(col).map_or("", |s| s.trim());
        if !trimmed.is_empty() {
            total_count += 1;
            if trimmed.replace(',', "").parse::<f64>().is_ok() {
                numeric_count += 1;
            }
        }
    }
    if total_count > 0 && numeric_count * 2 >= total_count {
        SortType::Float
    } else {
        SortType::CaseInsensitive
    }
}

/// Convert a column index to spreadsheet letters (0 -> A, 26 -> AA)
fn col_to_letters(mut col: usize) -> String {
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}
