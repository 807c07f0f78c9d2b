//! Lookup keys.
//!
//! A label entry can be addressed several ways: by numeric index, by name,
//! by `(name, occurrence)` with negative-from-end indexing, by
//! `(name, after_name)` or `(name, after_name, after_value)` to select an
//! occurrence inside a task-history block bounded by a repeated marker, or
//! by a trailing-`+` name that forces an append on assignment.

use std::fmt;

use super::Value;

/// A key addressing one entry of a VICAR label.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// Numeric entry index; negative counts from the end.
    Index(isize),
    /// Parameter name; resolves to the first occurrence.
    Name(String),
    /// Name plus occurrence number; negative counts from the last occurrence.
    Occurrence(String, isize),
    /// The occurrence of `name` inside the block opened by the first
    /// occurrence of `after_name`.
    After(String, String),
    /// The occurrence of `name` inside the block opened by the occurrence of
    /// `after_name` holding `after_value`.
    AfterValue(String, String, Value),
    /// Trailing-`+` form: on assignment, always append a new entry.
    Append(String),
}

impl Key {
    /// Parameter name carried by this key, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Key::Index(_) => None,
            Key::Name(name)
            | Key::Occurrence(name, _)
            | Key::After(name, _)
            | Key::AfterValue(name, _, _)
            | Key::Append(name) => Some(name),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(name) => write!(f, "{name}"),
            Key::Occurrence(name, occ) => write!(f, "({name}, {occ})"),
            Key::After(name, after) => write!(f, "({name}, {after})"),
            Key::AfterValue(name, after, value) => write!(f, "({name}, {after}={value})"),
            Key::Append(name) => write!(f, "{name}+"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        match s.strip_suffix('+') {
            Some(name) => Key::Append(name.to_string()),
            None => Key::Name(s.to_string()),
        }
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::from(s.as_str())
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i as isize)
    }
}

impl From<isize> for Key {
    fn from(i: isize) -> Self {
        Key::Index(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Index(i as isize)
    }
}

impl From<(&str, i32)> for Key {
    fn from((name, occ): (&str, i32)) -> Self {
        Key::Occurrence(name.to_string(), occ as isize)
    }
}

impl From<(&str, isize)> for Key {
    fn from((name, occ): (&str, isize)) -> Self {
        Key::Occurrence(name.to_string(), occ)
    }
}

impl From<(&str, usize)> for Key {
    fn from((name, occ): (&str, usize)) -> Self {
        Key::Occurrence(name.to_string(), occ as isize)
    }
}

impl From<(&str, &str)> for Key {
    fn from((name, after): (&str, &str)) -> Self {
        Key::After(name.to_string(), after.to_string())
    }
}

impl<V: Into<Value>> From<(&str, &str, V)> for Key {
    fn from((name, after, value): (&str, &str, V)) -> Self {
        Key::AfterValue(name.to_string(), after.to_string(), value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Key::from("NL"), Key::Name("NL".to_string()));
        assert_eq!(Key::from("TASK+"), Key::Append("TASK".to_string()));
    }

    #[test]
    fn test_from_tuples() {
        assert_eq!(
            Key::from(("TASK", 1)),
            Key::Occurrence("TASK".to_string(), 1)
        );
        assert_eq!(
            Key::from(("DAT_TIM", "TASK")),
            Key::After("DAT_TIM".to_string(), "TASK".to_string())
        );
        assert_eq!(
            Key::from(("DAT_TIM", "TASK", "COPY")),
            Key::AfterValue(
                "DAT_TIM".to_string(),
                "TASK".to_string(),
                Value::Text("COPY".to_string())
            )
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::from(("TASK", -1)).to_string(), "(TASK, -1)");
        assert_eq!(Key::from("TASK+").to_string(), "TASK+");
    }
}
