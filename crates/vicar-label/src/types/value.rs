//! Parameter values.
//!
//! A VICAR label parameter holds an integer, a real, an ASCII string, or a
//! homogeneous list of one of those. The list's element type is fixed by its
//! first element; mixed and empty lists are invalid.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").expect("invalid name regex"));

/// Return true if `name` is a valid VICAR parameter name.
#[must_use]
pub fn validate_name(name: &str) -> bool {
    NAME_REGEX.is_match(name)
}

/// A single element of a list value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Real(f64),
    Text(String),
}

impl Scalar {
    /// True iff the two scalars hold the same variant.
    #[must_use]
    pub fn same_kind(&self, other: &Scalar) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn is_valid(&self) -> bool {
        match self {
            Scalar::Int(_) | Scalar::Real(_) => true,
            Scalar::Text(s) => s.is_ascii(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Real(v) => write!(f, "{v:?}"),
            Scalar::Text(s) => write!(f, "'{s}'"),
        }
    }
}

/// The value of a VICAR label parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    Text(String),
    List(Vec<Scalar>),
}

impl Value {
    /// Return true if this is a valid value for a VICAR label parameter.
    ///
    /// Numbers are always valid; strings must be ASCII; lists must be
    /// non-empty and homogeneous.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Value::Int(_) | Value::Real(_) => true,
            Value::Text(s) => s.is_ascii(),
            Value::List(items) => match items.first() {
                None => false,
                Some(first) => items
                    .iter()
                    .all(|item| item.same_kind(first) && item.is_valid()),
            },
        }
    }

    /// The integer payload, if this value is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The numeric payload as a real, accepting integers.
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// The string payload, if this value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The list payload, if this value is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v:?}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Scalar>> for Value {
    fn from(v: Vec<Scalar>) -> Self {
        Value::List(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::List(v.into_iter().map(Scalar::Int).collect())
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::List(v.into_iter().map(Scalar::Real).collect())
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::List(v.into_iter().map(|s| Scalar::Text(s.to_string())).collect())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(v.into_iter().map(Scalar::Text).collect())
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Real(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("LBLSIZE"));
        assert!(validate_name("N1"));
        assert!(validate_name("DAT_TIM"));
        assert!(!validate_name("lowercase"));
        assert!(!validate_name("1BAD"));
        assert!(!validate_name(""));
        assert!(!validate_name("BAD-NAME"));
    }

    #[test]
    fn test_scalar_values_valid() {
        assert!(Value::Int(-3).is_valid());
        assert!(Value::Real(1.5).is_valid());
        assert!(Value::Text("IMAGE".to_string()).is_valid());
    }

    #[test]
    fn test_non_ascii_string_invalid() {
        assert!(!Value::Text("caf\u{e9}".to_string()).is_valid());
    }

    #[test]
    fn test_list_homogeneity() {
        assert!(Value::from(vec![1i64, 2, 3]).is_valid());
        assert!(Value::from(vec![1.0, 2.5]).is_valid());
        assert!(Value::from(vec!["A", "B"]).is_valid());

        // Empty lists are invalid
        assert!(!Value::List(Vec::new()).is_valid());

        // Mixed lists are invalid
        let mixed = Value::List(vec![Scalar::Int(1), Scalar::Text("A".to_string())]);
        assert!(!mixed.is_valid());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Int(7).as_real(), Some(7.0));
        assert_eq!(Value::Real(2.5).as_int(), None);
        assert_eq!(Value::Text("X".to_string()).as_str(), Some("X"));
    }
}
