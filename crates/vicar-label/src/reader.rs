//! VICAR file label reading.
//!
//! A VICAR data file begins with `LBLSIZE=<n>`, where `n` is the byte size
//! of the top label. When the top label carries `EOL=1`, a second label
//! starts immediately after the binary headers and image records, at
//! `lblsize + recsize * (nlb + n2 * n3)`. Label bytes are decoded as
//! Latin-1 and the label text ends at the first NUL.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Result, VicarError};
use crate::label::VicarLabel;

static LBLSIZE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^LBLSIZE *= *(\d+)").expect("invalid LBLSIZE regex"));

/// Read the complete label text of a VICAR data file, with any EOL label
/// appended to the top label.
pub fn read_label(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let (text, _) = read_from(&mut file, path, false)?;
    Ok(text)
}

/// Read the label text plus any bytes found after the file's nominal end.
///
/// Some archived products carry trailing content the geometry parameters do
/// not account for; callers that re-write files need to preserve it.
pub fn read_label_with_extra(path: impl AsRef<Path>) -> Result<(String, Vec<u8>)> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    read_from(&mut file, path, true)
}

pub(crate) fn read_from<R: Read + Seek>(
    source: &mut R,
    origin: &Path,
    want_extra: bool,
) -> Result<(String, Vec<u8>)> {
    let snippet = decode_latin1(&read_at_most(source, 0, 40)?);
    let lblsize = match_lblsize(&snippet).ok_or_else(|| VicarError::MissingLblsize {
        path: origin.to_path_buf(),
    })?;
    debug!(lblsize, "found top label");

    let bytes = read_at_most(source, 0, lblsize)?;
    let mut label = truncate_at_nul(&decode_latin1(&bytes));

    // The EOL label, if any, sits after the binary headers and data records
    let parsed = VicarLabel::from_text(&label)?;
    let recsize = parsed.int("RECSIZE")?;
    let nlb = parsed.int_or("NLB", 0);
    let org = parsed.get_or("ORG", "BSQ");
    let data_records = if org.as_str() == Some("BIP") {
        parsed.int_or("NL", 0) * parsed.int_or("NS", 0)
    } else {
        parsed.int_or("NL", 0) * parsed.int_or("NB", 0)
    };
    let skip = lblsize as u64 + (recsize * (nlb + data_records)).max(0) as u64;

    let snippet = decode_latin1(&read_at_most(source, skip, 40)?);
    let end = match match_lblsize(&snippet) {
        Some(eolsize) => {
            debug!(eolsize, offset = skip, "found EOL label");
            let bytes = read_at_most(source, skip, eolsize)?;
            let eol = truncate_at_nul(&decode_latin1(&bytes));
            if !label.ends_with(' ') {
                label.push_str("  ");
            }
            label.push_str(&eol);
            skip + eolsize as u64
        }
        None => skip,
    };

    let mut extra = Vec::new();
    if want_extra {
        source.seek(SeekFrom::Start(end))?;
        source.read_to_end(&mut extra)?;
    }
    Ok((label, extra))
}

/// Match the leading `LBLSIZE=<n>` marker of a label.
pub(crate) fn match_lblsize(text: &str) -> Option<usize> {
    LBLSIZE_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn read_at_most<R: Read + Seek>(source: &mut R, offset: u64, len: usize) -> Result<Vec<u8>> {
    source.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity(len.min(65536));
    source.by_ref().take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn truncate_at_nul(text: &str) -> String {
    match text.find('\0') {
        Some(i) => text[..i].to_string(),
        None => text.to_string(),
    }
}
