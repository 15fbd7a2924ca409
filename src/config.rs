use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::column::{Column, DEFAULT_WIDTH};
use crate::editor::EditorSpec;
use crate::error::{GridError, Result};
use crate::sort::SortType;

/// Column definition as written in a config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnConfig {
    pub header: String,
    pub width: Option<u32>,
    pub data_index: Option<usize>,
    pub sortable: Option<bool>,
    pub sort_type: Option<SortType>,
    pub editable: Option<bool>,
    pub editor: Option<EditorSpec>,
    pub hidden: bool,
}

impl From<ColumnConfig> for Column {
    fn from(c: ColumnConfig) -> Column {
        Column {
            header: c.header,
            width: c.width,
            data_index: c.data_index,
            sortable: c.sortable,
            sort_comparator: c.sort_type.map(SortType::comparator),
            renderer: None,
            editable: c.editable,
            editor: c.editor,
            hidden: c.hidden,
        }
    }
}

/// Grid behaviour settings. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub default_width: u32,
    pub default_sortable: bool,
    pub min_column_width: u32,
    /// Rows sampled when auto-sizing; `None` measures every row
    pub max_rows_to_measure: Option<usize>,
    pub auto_size_columns: bool,
    pub auto_size_headers: bool,
    /// Added to every measured width
    pub width_fudge: u32,
    pub stripe_rows: bool,
    /// Used when the host can't measure a row
    pub row_height: u32,
    pub monitor_resize: bool,
    pub scroll_delay_ms: u64,
    pub ensure_visible_delay_ms: u64,
    pub resize_delay_ms: u64,
    pub reflow_delay_ms: u64,
    pub columns: Vec<ColumnConfig>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_WIDTH,
            default_sortable: false,
            min_column_width: 25,
            max_rows_to_measure: None,
            auto_size_columns: false,
            auto_size_headers: false,
            width_fudge: 5,
            stripe_rows: true,
            row_height: 21,
            monitor_resize: true,
            scroll_delay_ms: 50,
            ensure_visible_delay_ms: 50,
            resize_delay_ms: 50,
            reflow_delay_ms: 1,
            columns: Vec::new(),
        }
    }
}

impl GridConfig {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GridConfig = toml::from_str(content)
            .map_err(|e| GridError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_width == 0 {
            return Err(GridError::Config("default_width must be positive".to_string()));
        }
        if self.min_column_width == 0 {
            return Err(GridError::Config("min_column_width must be positive".to_string()));
        }
        if self.row_height == 0 {
            return Err(GridError::Config("row_height must be positive".to_string()));
        }
        Ok(())
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }

    pub fn ensure_visible_delay(&self) -> Duration {
        Duration::from_millis(self.ensure_visible_delay_ms)
    }

    pub fn resize_delay(&self) -> Duration {
        Duration::from_millis(self.resize_delay_ms)
    }

    pub fn reflow_delay(&self) -> Duration {
        Duration::from_millis(self.reflow_delay_ms)
    }

    /// Column definitions from the config, if it has any
    pub fn column_definitions(&self) -> Option<Vec<Column>> {
        if self.columns.is_empty() {
            None
        } else {
            Some(self.columns.iter().cloned().map(Column::from).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_empty() {
        let config = GridConfig::from_toml("").unwrap();
        assert_eq!(config.default_width, 100);
        assert_eq!(config.row_height, 21);
        assert_eq!(config.width_fudge, 5);
        assert!(config.column_definitions().is_none());
    }

    #[test]
    fn test_columns_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "min_column_width = 40").unwrap();
        writeln!(file, "stripe_rows = false").unwrap();
        writeln!(file, "[[columns]]").unwrap();
        writeln!(file, "header = \"Ticker\"").unwrap();
        writeln!(file, "width = 60").unwrap();
        writeln!(file, "sortable = true").unwrap();
        writeln!(file, "sort_type = \"ucstring\"").unwrap();
        writeln!(file, "[[columns]]").unwrap();
        writeln!(file, "header = \"Price\"").unwrap();
        writeln!(file, "sort_type = \"float\"").unwrap();
        writeln!(file, "editor = {{ kind = \"number\" }}").unwrap();

        let config = GridConfig::from_file(file.path()).unwrap();
        assert_eq!(config.min_column_width, 40);
        assert!(!config.stripe_rows);

        let columns = config.column_definitions().unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].header, "Ticker");
        assert_eq!(columns[0].width, Some(60));
        assert!(columns[0].sort_comparator.is_some());
        assert_eq!(columns[1].editor, Some(EditorSpec::number()));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(GridConfig::from_toml("row_height = 0"), Err(GridError::Config(_))));
        assert!(matches!(GridConfig::from_toml("no_such_key = 1"), Err(GridError::Config(_))));
        assert!(matches!(GridConfig::from_toml("default_width = \"wide\""), Err(GridError::Config(_))));
    }
}
