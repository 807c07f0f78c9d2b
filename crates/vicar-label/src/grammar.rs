//! Label text grammar.
//!
//! Turns raw label text into an ordered sequence of entries, capturing the
//! blank counts around each `=` sign and list element so a parsed label can
//! be re-rendered byte-identically.
//!
//! The grammar is a flat sequence of `NAME<blanks>=<blanks><value><blanks>`
//! records. Values are integers, reals, single-quoted strings (with `''`
//! escaping), or parenthesized comma-separated lists of those.

use crate::error::{Result, VicarError};
use crate::label::LabelEntry;
use crate::types::{ListFormat, Scalar, Value, ValueFormat};

/// Parse label text into an ordered list of entries.
pub fn parse_label_text(text: &str) -> Result<Vec<LabelEntry>> {
    Parser::new(text).parse()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Vec<LabelEntry>> {
        let mut entries = Vec::new();
        self.skip_blanks();

        while self.pos < self.chars.len() {
            entries.push(self.parse_entry()?);
        }

        Ok(entries)
    }

    fn parse_entry(&mut self) -> Result<LabelEntry> {
        let name = self.parse_name()?;
        let name_blanks = self.skip_blanks();
        self.expect('=')?;
        let val_blanks = self.skip_blanks();

        let (value, list_formats) = self.parse_value()?;
        let sep_blanks = self.skip_blanks();

        let format = ValueFormat {
            fmt: String::new(),
            name_blanks,
            val_blanks,
            sep_blanks,
            list_formats,
        };
        let format = if format.is_default() {
            None
        } else {
            Some(format)
        };

        Ok(LabelEntry {
            name,
            value,
            format,
        })
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_uppercase() => self.pos += 1,
            _ => return Err(self.error(start, "expected a parameter name")),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_value(&mut self) -> Result<(Value, Vec<Option<ListFormat>>)> {
        match self.peek() {
            Some('\'') => Ok((Value::Text(self.parse_string()?), Vec::new())),
            Some('(') => self.parse_list(),
            Some(_) => Ok((self.parse_number(&[])?.into_value(), Vec::new())),
            None => Err(self.error(self.pos, "expected a value")),
        }
    }

    fn parse_list(&mut self) -> Result<(Value, Vec<Option<ListFormat>>)> {
        self.expect('(')?;

        let mut items = Vec::new();
        let mut formats: Vec<Option<ListFormat>> = Vec::new();

        loop {
            let blanks_before = self.skip_blanks();
            let item = match self.peek() {
                Some('\'') => Scalar::Text(self.parse_string()?),
                Some(_) => self.parse_number(&[',', ')'])?.into_scalar(),
                None => return Err(self.error(self.pos, "unterminated list")),
            };
            let blanks_after = self.skip_blanks();

            items.push(item);
            if blanks_before > 0 || blanks_after > 0 {
                formats.push(Some(ListFormat::new("", blanks_before, blanks_after)));
            } else {
                formats.push(None);
            }

            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error(self.pos, "expected ',' or ')' in list")),
            }
        }

        if formats.iter().all(Option::is_none) {
            formats.clear();
        }

        Ok((Value::List(items), formats))
    }

    fn parse_string(&mut self) -> Result<String> {
        let start = self.pos;
        self.expect('\'')?;

        let mut out = String::new();
        loop {
            match self.peek() {
                Some('\'') => {
                    self.pos += 1;
                    // A doubled quote is a literal quote
                    if self.peek() == Some('\'') {
                        out.push('\'');
                        self.pos += 1;
                    } else {
                        return Ok(out);
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
                None => return Err(self.error(start, "unterminated string")),
            }
        }
    }

    fn parse_number(&mut self, stops: &[char]) -> Result<Number> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || stops.contains(&c) {
                break;
            }
            self.pos += 1;
        }

        let token: String = self.chars[start..self.pos].iter().collect();
        if token.is_empty() {
            return Err(self.error(start, "expected a value"));
        }

        let looks_real = token.contains(['.', 'e', 'E']);
        if !looks_real {
            if let Ok(v) = token.parse::<i64>() {
                return Ok(Number::Int(v));
            }
        }
        if let Ok(v) = parse_real(&token) {
            return Ok(Number::Real(v));
        }

        Err(self.error(start, format!("invalid numeric value {token:?}")))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(self.pos, format!("expected {expected:?}")))
        }
    }

    fn skip_blanks(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> VicarError {
        VicarError::syntax(offset, message)
    }
}

enum Number {
    Int(i64),
    Real(f64),
}

impl Number {
    fn into_value(self) -> Value {
        match self {
            Number::Int(v) => Value::Int(v),
            Number::Real(v) => Value::Real(v),
        }
    }

    fn into_scalar(self) -> Scalar {
        match self {
            Number::Int(v) => Scalar::Int(v),
            Number::Real(v) => Scalar::Real(v),
        }
    }
}

/// Parse a real token, accepting the trailing-dot forms the default float
/// renderer produces ("2." and "1.E20").
fn parse_real(token: &str) -> std::result::Result<f64, std::num::ParseFloatError> {
    if let Ok(v) = token.parse::<f64>() {
        return Ok(v);
    }
    // "1.E20" -> "1.0E20", "2." -> "2.0"
    let patched = if let Some((head, expo)) = token.split_once(['e', 'E']) {
        format!("{}0e{expo}", head.strip_suffix('.').unwrap_or(head))
    } else {
        format!("{token}0")
    };
    patched.parse::<f64>()
}
