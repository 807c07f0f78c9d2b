//! Label rendering.
//!
//! Turns entries back into label text. An entry parsed from a file and not
//! modified since re-renders byte-identically, because the blank counts and
//! format strings captured at parse time drive the output.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::label::{LBLSIZE_WIDTH, LabelEntry, VicarLabel};
use crate::types::{Key, Scalar, Value, ValueFormat};

// Repeating digits in a fractional tail mark binary round-off noise
static REPEATS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)(00000|99999)").expect("invalid repeats regex"));

/// Render a real the way VICAR labels write them: shortest digits that
/// round-trip, a trailing dot on whole numbers, and round-off noise
/// suppressed by truncating a run of zeros or carrying past a run of nines.
pub(crate) fn float_str(value: f64) -> String {
    let repr = format!("{value:?}");

    let (mantissa, expo) = match repr.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (repr.as_str(), None),
    };
    let suffix = expo.map(|e| format!("E{e}")).unwrap_or_default();

    let (sign, unsigned) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let (head, tail) = match unsigned.split_once('.') {
        Some((h, t)) => (h, t),
        None => (unsigned, ""),
    };

    if tail.is_empty() || tail == "0" {
        return format!("{sign}{head}.{suffix}");
    }

    let Some(caps) = REPEATS.captures(tail) else {
        return repr;
    };
    let before = caps.get(1).map_or("", |m| m.as_str());
    let repeats = caps.get(2).map_or("", |m| m.as_str());

    if repeats.starts_with('0') {
        // "1.0300000000001" -> "1.03"
        return format!("{sign}{head}.{before}{suffix}");
    }

    if before.is_empty() {
        // "1.99999" -> "2."; re-normalize in case the carry shifts the
        // exponent, as in "9.99999e-8" -> "1e-7"
        let Ok(head) = head.parse::<u64>() else {
            return repr;
        };
        let carried = format!("{sign}{}e{}", head + 1, expo.unwrap_or("0"));
        return match carried.parse::<f64>() {
            Ok(v) => float_str(v),
            Err(_) => repr,
        };
    }

    // "1.0299999" -> "1.03", preserving leading zeros in the tail
    match before.parse::<u64>() {
        Ok(n) => format!("{sign}{head}.{:0width$}{suffix}", n + 1, width = before.len()),
        Err(_) => repr,
    }
}

fn default_scalar_str(value: &Scalar) -> String {
    match value {
        Scalar::Int(v) => v.to_string(),
        Scalar::Real(v) => float_str(*v),
        Scalar::Text(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

/// Render a scalar through a printf-style format string, falling back to
/// the default rendering when the format does not apply.
fn scalar_str(value: &Scalar, fmt: &str) -> String {
    if fmt.is_empty() {
        return default_scalar_str(value);
    }
    format_with(fmt, value).unwrap_or_else(|| default_scalar_str(value))
}

struct FormatSpec {
    minus: bool,
    plus: bool,
    zero: bool,
    space: bool,
    width: usize,
    precision: Option<usize>,
    conversion: char,
}

impl FormatSpec {
    /// Parse a single `%[flags][width][.precision]conversion` directive.
    fn parse(fmt: &str) -> Option<Self> {
        let rest = fmt.strip_prefix('%')?;
        let mut chars = rest.chars().peekable();

        let mut spec = Self {
            minus: false,
            plus: false,
            zero: false,
            space: false,
            width: 0,
            precision: None,
            conversion: ' ',
        };

        while let Some(&c) = chars.peek() {
            match c {
                '-' => spec.minus = true,
                '+' => spec.plus = true,
                '0' => spec.zero = true,
                ' ' => spec.space = true,
                _ => break,
            }
            chars.next();
        }

        while let Some(&c) = chars.peek() {
            let Some(d) = c.to_digit(10) else { break };
            spec.width = spec.width * 10 + d as usize;
            chars.next();
        }

        if chars.peek() == Some(&'.') {
            chars.next();
            let mut precision = 0usize;
            while let Some(&c) = chars.peek() {
                let Some(d) = c.to_digit(10) else { break };
                precision = precision * 10 + d as usize;
                chars.next();
            }
            spec.precision = Some(precision);
        }

        spec.conversion = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Some(spec)
    }
}

fn format_with(fmt: &str, value: &Scalar) -> Option<String> {
    let spec = FormatSpec::parse(fmt)?;
    let real = match value {
        Scalar::Int(v) => Some(*v as f64),
        Scalar::Real(v) => Some(*v),
        Scalar::Text(_) => None,
    };

    let mut body = match (spec.conversion, value) {
        ('d' | 'i', Scalar::Int(v)) => v.to_string(),
        ('f' | 'F', _) => format_fixed(&spec, real?),
        ('e' | 'E', _) => format_exp(&spec, real?, spec.conversion == 'E', None),
        ('g' | 'G', _) => format_general(&spec, real?, spec.conversion == 'G'),
        ('s', Scalar::Text(s)) => s.clone(),
        _ => return None,
    };

    let numeric = spec.conversion != 's';
    if numeric && !body.starts_with('-') {
        if spec.plus {
            body.insert(0, '+');
        } else if spec.space {
            body.insert(0, ' ');
        }
    }
    Some(pad(&spec, body, numeric))
}

fn pad(spec: &FormatSpec, body: String, numeric: bool) -> String {
    if body.len() >= spec.width {
        return body;
    }
    let fill = spec.width - body.len();
    if spec.minus {
        format!("{body}{}", " ".repeat(fill))
    } else if spec.zero && numeric {
        let (sign, digits) = if body.starts_with(['-', '+', ' ']) {
            body.split_at(1)
        } else {
            ("", body.as_str())
        };
        format!("{sign}{}{digits}", "0".repeat(fill))
    } else {
        format!("{}{body}", " ".repeat(fill))
    }
}

fn format_fixed(spec: &FormatSpec, value: f64) -> String {
    let precision = spec.precision.unwrap_or(6);
    format!("{value:.precision$}")
}

fn format_exp(spec: &FormatSpec, value: f64, upper: bool, precision: Option<usize>) -> String {
    let precision = precision.or(spec.precision).unwrap_or(6);
    let rendered = format!("{value:.precision$e}");
    let (mantissa, exp) = rendered.split_once('e').unwrap_or((rendered.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let e = if upper { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{e}{sign}{:02}", exp.abs())
}

fn format_general(spec: &FormatSpec, value: f64, upper: bool) -> String {
    let significant = spec.precision.unwrap_or(6).max(1);
    if value == 0.0 {
        return "0".to_string();
    }

    let exp = value.abs().log10().floor() as i32;
    let mut rendered = if exp < -4 || exp >= significant as i32 {
        format_exp(spec, value, upper, Some(significant - 1))
    } else {
        let precision = (significant as i32 - 1 - exp).max(0) as usize;
        format!("{value:.precision$}")
    };

    // %g strips trailing zeros from the fractional part
    if let Some(dot) = rendered.find('.') {
        let frac_end = rendered[dot..]
            .find(['e', 'E'])
            .map_or(rendered.len(), |i| dot + i);
        let mut keep = frac_end;
        while keep > dot + 1 && rendered.as_bytes()[keep - 1] == b'0' {
            keep -= 1;
        }
        if keep == dot + 1 {
            keep = dot;
        }
        rendered.replace_range(keep..frac_end, "");
    }
    rendered
}

impl VicarLabel {
    /// Render the value (and its surrounding blanks) of the entry a key
    /// resolves to.
    pub fn value_str(&self, key: impl Into<Key>) -> Result<String> {
        let idx = self.resolve(&key.into(), None)?;
        Ok(self.render_value(idx))
    }

    pub(crate) fn render_value(&self, idx: usize) -> String {
        let entry = &self.entries[idx];
        let default_format = ValueFormat::default();
        let format = entry.format.as_ref().unwrap_or(&default_format);

        let mut result = " ".repeat(format.val_blanks);
        let mut sep_blanks = format.sep_blanks;

        if entry.name == "LBLSIZE" {
            // LBLSIZE occupies a fixed-width field so its digits can be
            // rewritten without moving anything after it
            let valstr = entry.value.to_string();
            sep_blanks = LBLSIZE_WIDTH.saturating_sub(2 + valstr.len());
            result.push_str(&valstr);
        } else if let Value::List(items) = &entry.value {
            result.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    result.push(',');
                }
                match format.list_formats.get(i).and_then(Option::as_ref) {
                    Some(f) => {
                        result.push_str(&" ".repeat(f.blanks_before));
                        result.push_str(&scalar_str(item, &f.fmt));
                        result.push_str(&" ".repeat(f.blanks_after));
                    }
                    None => result.push_str(&scalar_str(item, "")),
                }
            }
            result.push(')');
        } else {
            let rendered = match &entry.value {
                Value::Int(v) => scalar_str(&Scalar::Int(*v), &format.fmt),
                Value::Real(v) => scalar_str(&Scalar::Real(*v), &format.fmt),
                Value::Text(s) => scalar_str(&Scalar::Text(s.clone()), &format.fmt),
                Value::List(_) => String::new(), // handled above
            };
            result.push_str(&rendered);
        }

        result.push_str(&" ".repeat(sep_blanks));
        result
    }

    /// Render a full `NAME=VALUE` record. With `pad`, records that do not
    /// already end in a blank get the standard two-blank separator.
    pub fn name_value_str(&self, key: impl Into<Key>, pad: bool) -> Result<String> {
        let idx = self.resolve(&key.into(), None)?;
        Ok(self.render_name_value(idx, pad))
    }

    pub(crate) fn render_name_value(&self, idx: usize, pad: bool) -> String {
        let entry = &self.entries[idx];
        let name_blanks = entry.format.as_ref().map_or(0, |f| f.name_blanks);
        let valstr = self.render_value(idx);
        let mut result = format!("{}{}={valstr}", entry.name, " ".repeat(name_blanks));
        if pad && !valstr.ends_with(' ') {
            result.push_str("  ");
        }
        result
    }

    /// Normalize the label for export: recompute N1-N3, drop stale EOL
    /// LBLSIZE entries, set EOL, and either split off an overflow label or
    /// (with `resize`) grow LBLSIZE to hold everything.
    pub(crate) fn prepare_for_export(&mut self, resize: bool) -> Result<()> {
        let lblsize = self.int("LBLSIZE")?;
        let recsize = self.int("RECSIZE")?;
        let resize = resize || lblsize == 0 || recsize == 0 || lblsize % recsize != 0;

        self.n123_from_nbls()?;
        while self.contains(("LBLSIZE", 1)) {
            self.delete(("LBLSIZE", 1))?;
        }

        let mut eol = 0i64;
        let mut length = 0usize;
        let mut split_at = self.len();
        for k in 0..self.len() {
            let record_len = self.render_name_value(k, true).len();
            if !resize && (length + record_len) as i64 > lblsize {
                eol = 1;
                split_at = k;
                break;
            }
            length += record_len;
        }
        self.set("EOL", eol)?;

        if eol == 1 {
            let mut tail_len = 0usize;
            for k in split_at..self.len() {
                tail_len += self.render_name_value(k, true).len();
            }
            let recsize = recsize as usize;
            let eol_lblsize = "LBLSIZE=".len() + LBLSIZE_WIDTH + tail_len;
            let eol_lblsize = eol_lblsize.div_ceil(recsize) * recsize;
            self.insert_entry(
                split_at,
                LabelEntry::new("LBLSIZE", eol_lblsize as i64),
            )?;
        } else if resize {
            let new_lblsize = if recsize > 0 {
                (length.div_ceil(recsize as usize) * recsize as usize) as i64
            } else {
                length as i64
            };
            self.set("LBLSIZE", new_lblsize)?;
        }
        Ok(())
    }

    /// Export the label as top-label and EOL-label text, each NUL-padded to
    /// its own LBLSIZE. The EOL text is empty when everything fits.
    pub fn export(&mut self, resize: bool) -> Result<(String, String)> {
        self.prepare_for_export(resize)?;

        let mut records = Vec::with_capacity(self.len());
        let mut k_eol = 0usize;
        for k in 0..self.len() {
            if self.entries[k].name == "LBLSIZE" {
                k_eol = k;
            }
            records.push(self.render_name_value(k, true));
        }

        let (mut header, mut eol_text) = if k_eol != 0 {
            (records[..k_eol].concat(), records[k_eol..].concat())
        } else {
            (records.concat(), String::new())
        };

        let header_size = self.int_or("LBLSIZE", 0).max(0) as usize;
        if header.len() < header_size {
            header.push_str(&"\0".repeat(header_size - header.len()));
        }
        if !eol_text.is_empty() {
            let eol_size = self.int_or(("LBLSIZE", 1), 0).max(0) as usize;
            if eol_text.len() < eol_size {
                eol_text.push_str(&"\0".repeat(eol_size - eol_text.len()));
            }
        }
        Ok((header, eol_text))
    }

    /// Render the entries from `start` up to (not including) `stop` as
    /// label text, inserting `sep` in front of each interior LBLSIZE.
    pub fn as_string(
        &self,
        start: impl Into<Key>,
        stop: Option<Key>,
        sep: &str,
    ) -> Result<String> {
        let start = self.resolve(&start.into(), None)?;
        let stop = match stop {
            None => self.len(),
            Some(key) => self.resolve(&key, None)?.min(self.len()),
        };

        let mut out = String::new();
        for k in start..stop {
            if !sep.is_empty() && k > 0 && self.entries[k].name == "LBLSIZE" {
                out.push_str(sep);
            }
            out.push_str(&self.render_name_value(k, true));
        }
        Ok(out)
    }
}

impl fmt::Display for VicarLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for k in 0..self.len() {
            f.write_str(&self.render_name_value(k, true))?;
        }
        Ok(())
    }
}
