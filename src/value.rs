//! Raw cell values and the comparable keys sort comparators produce

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;

/// A raw value stored in a row, addressed by data index
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl Value {
    pub fn is_empty_text(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Empty
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

/// Comparable value produced by a sort comparator.
///
/// Keys of different kinds order by kind (`Empty` first), so a column that
/// mixes kinds still sorts deterministically.
#[derive(Debug, Clone)]
pub enum SortKey {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Milliseconds since the epoch; `i64::MIN` is the earliest possible key
    Date(i64),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Empty => 0,
            SortKey::Bool(_) => 1,
            SortKey::Int(_) | SortKey::Float(_) => 2,
            SortKey::Date(_) => 3,
            SortKey::Text(_) => 4,
        }
    }
}

/// Numeric order with `-0.0 == 0.0`; NaNs sit past either end by sign
fn cmp_floats(a: f64, b: f64) -> Ordering {
    if a == b {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

/// 2^63, exactly representable
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Exact order of an integer against a float. Casting the integer to `f64`
/// rounds above 2^53, which would make mixed columns sort non-transitively.
fn cmp_int_float(i: i64, x: f64) -> Ordering {
    if x.is_nan() {
        return if x.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if x >= I64_LIMIT {
        return Ordering::Less;
    }
    if x < -I64_LIMIT {
        return Ordering::Greater;
    }
    // in range, so the truncated value converts exactly
    let whole = x.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => cmp_floats(whole, x),
        unequal => unequal,
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Empty, SortKey::Empty) => Ordering::Equal,
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Int(a), SortKey::Int(b)) => a.cmp(b),
            (SortKey::Float(a), SortKey::Float(b)) => cmp_floats(*a, *b),
            (SortKey::Int(a), SortKey::Float(b)) => cmp_int_float(*a, *b),
            (SortKey::Float(a), SortKey::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_numeric_keys_compare_by_value() {
        assert!(SortKey::Int(3) < SortKey::Float(3.5));
        assert!(SortKey::Float(10.0) > SortKey::Int(2));
        assert_eq!(SortKey::Int(2), SortKey::Float(2.0));
    }

    #[test]
    fn test_large_ints_against_floats_stay_transitive() {
        let two_53 = 1i64 << 53;
        assert_eq!(SortKey::Int(two_53), SortKey::Float(two_53 as f64));
        assert!(SortKey::Int(two_53 + 1) > SortKey::Float(two_53 as f64));
        assert!(SortKey::Float(two_53 as f64) < SortKey::Int(two_53 + 1));
        assert!(SortKey::Int(i64::MAX) < SortKey::Float(1e19));
        assert!(SortKey::Int(i64::MIN) > SortKey::Float(-1e19));
        assert!(SortKey::Int(-1) > SortKey::Float(-1.5));
        assert!(SortKey::Int(-2) < SortKey::Float(-1.5));
        assert_eq!(SortKey::Float(-0.0), SortKey::Int(0));
        assert_eq!(SortKey::Float(-0.0), SortKey::Float(0.0));

        let mut keys = vec![
            SortKey::Int(two_53 + 1),
            SortKey::Float(two_53 as f64),
            SortKey::Int(two_53),
            SortKey::Float(f64::NAN),
            SortKey::Int(two_53 - 1),
            SortKey::Float(-3.25),
        ];
        keys.sort();
        for pair in keys.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert!(matches!(keys[0], SortKey::Float(x) if x == -3.25));
        assert!(matches!(keys[5], SortKey::Float(x) if x.is_nan()));
    }

    #[test]
    fn test_empty_sorts_first() {
        assert!(SortKey::Empty < SortKey::Int(i64::MIN));
        assert!(SortKey::Empty < SortKey::Text(String::new()));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert!(Value::from("").is_empty_text());
        assert!(!Value::Int(0).is_empty_text());
    }
}
