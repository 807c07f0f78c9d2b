//! Required parameters, constrained values, and host defaults.
//!
//! Every VICAR label carries a fixed set of required parameters; missing
//! ones are filled in with defaults at construction time. A handful of
//! parameters only accept an enumerated set of values, and the geometry
//! parameters must be non-negative integers.

use crate::error::{Result, VicarError};
use crate::types::Value;

/// Width of the fixed field between `LBLSIZE=` and the next parameter name.
pub(crate) const LBLSIZE_WIDTH: usize = 16;

/// Names whose first occurrence cannot be deleted.
const REQUIRED_NAMES: &[&str] = &[
    "LBLSIZE", "FORMAT", "TYPE", "BUFSIZ", "DIM", "EOL", "RECSIZE", "ORG", "NL", "NS", "NB", "N1",
    "N2", "N3", "N4", "NBB", "NLB", "HOST", "INTFMT", "REALFMT", "BHOST", "BINTFMT", "BREALFMT",
    "BLTYPE",
];

/// Names that must hold a non-negative integer on every occurrence.
const REQUIRED_INTS: &[&str] = &[
    "LBLSIZE", "RECSIZE", "NL", "NS", "NB", "N1", "N2", "N3", "NBB", "NLB",
];

const FORMATS: &[&str] = &[
    "BYTE", "HALF", "FULL", "REAL", "DOUB", "COMP", "WORD", "LONG", "COMPLEX",
];
const ORGS: &[&str] = &["BSQ", "BIL", "BIP"];
const INTFMTS: &[&str] = &["HIGH", "LOW"];
const REALFMTS: &[&str] = &["IEEE", "RIEEE", "VAX"];

/// HOST value for the platform this crate was compiled for.
pub(crate) fn host_name() -> &'static str {
    if cfg!(target_os = "linux") {
        "X86-LINUX"
    } else if cfg!(target_os = "macos") {
        "MAC-OSX"
    } else if cfg!(target_os = "windows") {
        "WIN-XP"
    } else if cfg!(target_os = "solaris") {
        "SUN-SOLR"
    } else {
        "UNKNOWN"
    }
}

/// INTFMT value for the target byte order.
pub(crate) fn int_fmt() -> &'static str {
    if cfg!(target_endian = "little") {
        "LOW"
    } else {
        "HIGH"
    }
}

/// REALFMT value for the target byte order.
pub(crate) fn real_fmt() -> &'static str {
    if cfg!(target_endian = "little") {
        "RIEEE"
    } else {
        "IEEE"
    }
}

/// The required parameters in canonical order, with their default values.
pub(crate) fn required_defaults() -> Vec<(&'static str, Value)> {
    vec![
        ("LBLSIZE", Value::Int(0)),
        ("FORMAT", Value::from("BYTE")),
        ("TYPE", Value::from("IMAGE")),
        ("BUFSIZ", Value::Int(20480)),
        ("DIM", Value::Int(3)),
        ("EOL", Value::Int(0)),
        ("RECSIZE", Value::Int(0)),
        ("ORG", Value::from("BSQ")),
        ("NL", Value::Int(0)),
        ("NS", Value::Int(0)),
        ("NB", Value::Int(0)),
        ("N1", Value::Int(0)),
        ("N2", Value::Int(0)),
        ("N3", Value::Int(0)),
        ("N4", Value::Int(0)),
        ("NBB", Value::Int(0)),
        ("NLB", Value::Int(0)),
        ("HOST", Value::from(host_name())),
        ("INTFMT", Value::from(int_fmt())),
        ("REALFMT", Value::from(real_fmt())),
        ("BHOST", Value::from(host_name())),
        ("BINTFMT", Value::from(int_fmt())),
        ("BREALFMT", Value::from(real_fmt())),
        ("BLTYPE", Value::from("")),
    ]
}

/// True if `name` is a required parameter.
pub(crate) fn is_required(name: &str) -> bool {
    REQUIRED_NAMES.contains(&name)
}

/// Validate the value of a required or constrained parameter.
///
/// Enumerated constraints apply only to the first occurrence of a name;
/// some legacy files carry a later `ORG='ROW'` entry, which is tolerated.
/// The non-negative-integer constraint applies to every occurrence.
pub(crate) fn check_type(name: &str, value: &Value, is_first: bool) -> Result<()> {
    let constraint: Option<(&'static str, bool)> = match name {
        "FORMAT" => Some(("BYTE, HALF, FULL, REAL, DOUB, COMP, WORD, LONG, COMPLEX",
            matches!(value.as_str(), Some(s) if FORMATS.contains(&s)))),
        "ORG" => Some(("BSQ, BIL, BIP",
            matches!(value.as_str(), Some(s) if ORGS.contains(&s)))),
        "INTFMT" | "BINTFMT" => Some(("HIGH, LOW",
            matches!(value.as_str(), Some(s) if INTFMTS.contains(&s)))),
        "REALFMT" | "BREALFMT" => Some(("IEEE, RIEEE, VAX",
            matches!(value.as_str(), Some(s) if REALFMTS.contains(&s)))),
        "DIM" => Some(("3", value.as_int() == Some(3))),
        "EOL" => Some(("0, 1", matches!(value.as_int(), Some(0 | 1)))),
        "N4" => Some(("0", value.as_int() == Some(0))),
        _ => None,
    };

    if let Some((allowed, ok)) = constraint {
        if !ok && is_first {
            return Err(VicarError::ConstrainedValue {
                name: name.to_string(),
                value: value.to_string(),
                allowed,
            });
        }
        return Ok(());
    }

    if REQUIRED_INTS.contains(&name) {
        match value.as_int() {
            Some(v) if v >= 0 => {}
            _ => {
                return Err(VicarError::RequiredInt {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_table() {
        let defaults = required_defaults();
        assert_eq!(defaults.len(), 24);
        assert_eq!(defaults[0].0, "LBLSIZE");
        assert!(is_required("BLTYPE"));
        assert!(!is_required("TASK"));
    }

    #[test]
    fn test_constrained_first_occurrence_only() {
        let row = Value::from("ROW");
        assert!(check_type("ORG", &row, true).is_err());
        // Later occurrences are exempt
        assert!(check_type("ORG", &row, false).is_ok());
    }

    #[test]
    fn test_required_int_every_occurrence() {
        assert!(check_type("NL", &Value::Int(5), true).is_ok());
        assert!(check_type("NL", &Value::Int(-1), false).is_err());
        assert!(check_type("NL", &Value::from("TEN"), true).is_err());
        assert!(check_type("NL", &Value::Real(5.0), true).is_err());
    }

    #[test]
    fn test_dim_eol_n4() {
        assert!(check_type("DIM", &Value::Int(3), true).is_ok());
        assert!(check_type("DIM", &Value::Int(2), true).is_err());
        assert!(check_type("EOL", &Value::Int(1), true).is_ok());
        assert!(check_type("EOL", &Value::Int(2), true).is_err());
        assert!(check_type("N4", &Value::Int(0), true).is_ok());
        assert!(check_type("N4", &Value::Int(1), true).is_err());
    }

    #[test]
    fn test_unconstrained_names_pass() {
        assert!(check_type("TASK", &Value::from("COPY"), true).is_ok());
    }
}
