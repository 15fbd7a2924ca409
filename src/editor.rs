use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::value::Value;

/// How a cell's text is edited and turned back into a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EditorSpec {
    Text {
        #[serde(default = "default_true")]
        allow_blank: bool,
        #[serde(default)]
        max_length: Option<usize>,
    },
    Number {
        #[serde(default = "default_true")]
        allow_decimals: bool,
        #[serde(default = "default_true")]
        allow_negative: bool,
    },
    Date {
        #[serde(default = "default_date_format")]
        format: String,
    },
    Select {
        options: Vec<String>,
    },
    Checkbox,
}

fn default_true() -> bool {
    true
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl EditorSpec {
    pub fn text() -> Self {
        EditorSpec::Text {
            allow_blank: true,
            max_length: None,
        }
    }

    pub fn number() -> Self {
        EditorSpec::Number {
            allow_decimals: true,
            allow_negative: true,
        }
    }

    /// Text shown in the editor for an existing value
    pub fn edit_text(&self, value: &Value) -> String {
        match (self, value) {
            (EditorSpec::Date { format }, Value::Date(d)) => d.format(format).to_string(),
            _ => value.to_string(),
        }
    }

    /// Parse edited text into a value
    pub fn parse(&self, input: &str) -> Result<Value> {
        match self {
            EditorSpec::Text { allow_blank, max_length } => {
                if !allow_blank && input.trim().is_empty() {
                    return Err(GridError::InvalidEdit("value is required".to_string()));
                }
                if let Some(max) = max_length {
                    if input.chars().count() > *max {
                        return Err(GridError::InvalidEdit(format!("longer than {} characters", max)));
                    }
                }
                Ok(Value::Text(input.to_string()))
            }
            EditorSpec::Number { allow_decimals, allow_negative } => {
                let trimmed = input.trim().replace(',', "");
                if trimmed.is_empty() {
                    return Ok(Value::Empty);
                }
                let value = if *allow_decimals {
                    trimmed
                        .parse::<f64>()
                        .map(Value::Float)
                        .map_err(|_| GridError::InvalidEdit(format!("'{}' is not a number", input)))?
                } else {
                    trimmed
                        .parse::<i64>()
                        .map(Value::Int)
                        .map_err(|_| GridError::InvalidEdit(format!("'{}' is not an integer", input)))?
                };
                let negative = match value {
                    Value::Float(x) => x < 0.0,
                    Value::Int(i) => i < 0,
                    _ => false,
                };
                if negative && !allow_negative {
                    return Err(GridError::InvalidEdit("negative values are not allowed".to_string()));
                }
                Ok(value)
            }
            EditorSpec::Date { format } => {
                if input.trim().is_empty() {
                    return Ok(Value::Empty);
                }
                NaiveDate::parse_from_str(input.trim(), format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(Value::Date)
                    .ok_or_else(|| GridError::InvalidEdit(format!("'{}' does not match {}", input, format)))
            }
            EditorSpec::Select { options } => {
                if options.iter().any(|o| o == input) {
                    Ok(Value::Text(input.to_string()))
                } else {
                    Err(GridError::InvalidEdit(format!("'{}' is not one of the options", input)))
                }
            }
            EditorSpec::Checkbox => match input.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(Value::Bool(true)),
                "false" | "no" | "0" | "off" | "" => Ok(Value::Bool(false)),
                _ => Err(GridError::InvalidEdit(format!("'{}' is not a boolean", input))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_editor() {
        let ed = EditorSpec::Number { allow_decimals: false, allow_negative: false };
        assert_eq!(ed.parse("1,200").unwrap(), Value::Int(1200));
        assert!(ed.parse("1.5").is_err());
        assert!(ed.parse("-3").is_err());
        assert_eq!(EditorSpec::number().parse("-1.5").unwrap(), Value::Float(-1.5));
    }

    #[test]
    fn test_text_editor_limits() {
        let ed = EditorSpec::Text { allow_blank: false, max_length: Some(3) };
        assert!(ed.parse("  ").is_err());
        assert!(ed.parse("abcd").is_err());
        assert_eq!(ed.parse("abc").unwrap(), Value::from("abc"));
    }

    #[test]
    fn test_date_editor_round_trip_text() {
        let ed = EditorSpec::Date { format: "%d/%m/%Y".to_string() };
        let v = ed.parse("02/01/2006").unwrap();
        assert_eq!(ed.edit_text(&v), "02/01/2006");
        assert!(ed.parse("2006-01-02").is_err());
    }

    #[test]
    fn test_select_and_checkbox() {
        let ed = EditorSpec::Select { options: vec!["a".into(), "b".into()] };
        assert!(ed.parse("a").is_ok());
        assert!(ed.parse("c").is_err());
        assert_eq!(EditorSpec::Checkbox.parse("Yes").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_editor_from_toml() {
        let ed: EditorSpec = toml::from_str("kind = \"number\"\nallow_negative = false").unwrap();
        assert_eq!(ed, EditorSpec::Number { allow_decimals: true, allow_negative: false });
    }
}
