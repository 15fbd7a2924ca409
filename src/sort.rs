//! Sort comparators and the stable ordering used by the row store
//!
//! A comparator maps a raw cell value to a [`SortKey`]. Every comparator is
//! total: input that can't be coerced degrades to a fixed key instead of
//! failing, so one bad cell never aborts a sort.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::value::{SortKey, Value};

/// Threshold for using parallel processing
const PARALLEL_THRESHOLD: usize = 10_000;

/// Maps a raw value to its comparable key
pub type Comparator = fn(&Value) -> SortKey;

/// Sorting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Ascending,
    #[serde(rename = "DESC")]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Ascending
    }
}

/// The active sort. `data_index == None` means insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub data_index: Option<usize>,
    pub direction: SortDirection,
}

/// Named comparators that can be referenced from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    None,
    #[serde(alias = "ucstring", alias = "string")]
    CaseInsensitive,
    Date,
    Float,
    #[serde(alias = "int")]
    Integer,
}

impl SortType {
    pub fn comparator(self) -> Comparator {
        match self {
            SortType::None => none,
            SortType::CaseInsensitive => case_insensitive_string,
            SortType::Date => date,
            SortType::Float => float,
            SortType::Integer => integer,
        }
    }
}

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap()
});

static INT_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[+-]?\d+").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y", "%d %b %Y"];

/// Identity: compare raw values with their natural ordering
pub fn none(value: &Value) -> SortKey {
    match value {
        Value::Empty => SortKey::Empty,
        Value::Text(s) => SortKey::Text(s.clone()),
        Value::Int(i) => SortKey::Int(*i),
        Value::Float(x) => SortKey::Float(*x),
        Value::Bool(b) => SortKey::Bool(*b),
        Value::Date(d) => SortKey::Date(d.and_utc().timestamp_millis()),
    }
}

/// Uppercase-normalized text
pub fn case_insensitive_string(value: &Value) -> SortKey {
    SortKey::Text(value.to_string().to_uppercase())
}

/// Dates keep their instant; text is parsed, unparsable text sorts earliest
pub fn date(value: &Value) -> SortKey {
    let millis = match value {
        Value::Date(d) => Some(d.and_utc().timestamp_millis()),
        Value::Int(i) => Some(*i),
        Value::Float(x) if x.is_finite() => Some(*x as i64),
        Value::Text(s) => parse_date(s),
        _ => None,
    };
    SortKey::Date(millis.unwrap_or(i64::MIN))
}

/// Grouping separators stripped, leading float parsed, otherwise `0`
pub fn float(value: &Value) -> SortKey {
    let x = match value {
        Value::Float(x) => *x,
        Value::Int(i) => *i as f64,
        other => {
            let text = strip_grouping(&other.to_string());
            FLOAT_PREFIX
                .find(&text)
                .and_then(|m| m.as_str().trim().parse::<f64>().ok())
                .unwrap_or(0.0)
        }
    };
    SortKey::Float(if x.is_nan() { 0.0 } else { x })
}

/// Grouping separators stripped, leading integer parsed, otherwise `0`
pub fn integer(value: &Value) -> SortKey {
    let i = match value {
        Value::Int(i) => *i,
        Value::Float(x) if x.is_finite() => x.trunc() as i64,
        other => {
            let text = strip_grouping(&other.to_string());
            INT_PREFIX
                .find(&text)
                .map(|m| {
                    let digits = m.as_str().trim();
                    digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
                        i64::MIN
                    } else {
                        i64::MAX
                    })
                })
                .unwrap_or(0)
        }
    };
    SortKey::Int(i)
}

fn strip_grouping(s: &str) -> String {
    s.replace(',', "")
}

fn parse_date(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

/// Compute the stable ordering of `values` under `comparator`.
///
/// Returns source indices in their new order. Ties keep their relative order
/// in both directions. Uses parallel processing for large inputs.
pub fn stable_order(values: &[&Value], comparator: Comparator, direction: SortDirection) -> Vec<usize> {
    let use_parallel = values.len() >= PARALLEL_THRESHOLD;

    let mut keyed: Vec<(usize, SortKey)> = if use_parallel {
        values.par_iter().enumerate().map(|(i, v)| (i, comparator(v))).collect()
    } else {
        values.iter().enumerate().map(|(i, v)| (i, comparator(v))).collect()
    };

    let cmp_fn = |(_, a): &(usize, SortKey), (_, b): &(usize, SortKey)| match direction {
        SortDirection::Ascending => a.cmp(b),
        SortDirection::Descending => b.cmp(a),
    };

    // both sorts are stable
    if use_parallel {
        keyed.par_sort_by(cmp_fn);
    } else {
        keyed.sort_by(cmp_fn);
    }

    keyed.into_iter().map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn test_numeric_comparators_degrade_to_zero() {
        assert_eq!(integer(&text("abc")), SortKey::Int(0));
        assert_eq!(float(&text("abc")), SortKey::Float(0.0));
        assert_eq!(float(&Value::Empty), SortKey::Float(0.0));
    }

    #[test]
    fn test_grouping_separators_are_stripped() {
        assert_eq!(float(&text("1,234.5")), SortKey::Float(1234.5));
        assert_eq!(integer(&text("12,000")), SortKey::Int(12000));
    }

    #[test]
    fn test_numeric_prefix_parse() {
        assert_eq!(float(&text("12.5kg")), SortKey::Float(12.5));
        assert_eq!(integer(&text(" -7 items")), SortKey::Int(-7));
        assert_eq!(integer(&text("3.9")), SortKey::Int(3));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(case_insensitive_string(&text("abc")), case_insensitive_string(&text("ABC")));
        assert!(case_insensitive_string(&text("apple")) < case_insensitive_string(&text("Banana")));
    }

    #[test]
    fn test_date_parse_and_fallback() {
        let a = date(&text("2006-01-02"));
        let b = date(&text("01/03/2006"));
        assert!(a < b);
        assert_eq!(date(&text("not a date")), SortKey::Date(i64::MIN));
        assert!(date(&text("garbage")) < a);

        let dt = NaiveDate::from_ymd_opt(2006, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(date(&Value::Date(dt)), a);
    }

    #[test]
    fn test_stable_order_keeps_ties() {
        let values = vec![text("b"), text("a"), text("b"), text("a")];
        let refs: Vec<&Value> = values.iter().collect();

        assert_eq!(stable_order(&refs, none, SortDirection::Ascending), vec![1, 3, 0, 2]);
        assert_eq!(stable_order(&refs, none, SortDirection::Descending), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_stable_order_parallel_matches_sequential() {
        let values: Vec<Value> = (0..PARALLEL_THRESHOLD + 10)
            .map(|i| Value::Int((i % 7) as i64))
            .collect();
        let refs: Vec<&Value> = values.iter().collect();
        let order = stable_order(&refs, none, SortDirection::Ascending);

        for pair in order.windows(2) {
            let (a, b) = (&values[pair[0]], &values[pair[1]]);
            assert!(none(a) <= none(b));
            if none(a) == none(b) {
                assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn test_sort_type_from_config_name() {
        #[derive(Deserialize)]
        struct Wrapper {
            sort_type: SortType,
        }
        let w: Wrapper = toml::from_str("sort_type = \"float\"").unwrap();
        assert_eq!(w.sort_type, SortType::Float);
        let w: Wrapper = toml::from_str("sort_type = \"int\"").unwrap();
        assert_eq!(w.sort_type, SortType::Integer);
    }
}
