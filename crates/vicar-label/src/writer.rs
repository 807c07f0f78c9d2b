//! In-place label rewriting.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, VicarError};
use crate::label::VicarLabel;
use crate::reader::match_lblsize;

impl VicarLabel {
    /// Rewrite the label of an existing VICAR data file in place, leaving
    /// the binary headers and image records untouched.
    ///
    /// The file's own LBLSIZE wins over the stored one, so the data region
    /// never moves; content that no longer fits the top label goes to an
    /// EOL label after the data, and the file is truncated there. With no
    /// `path`, the label's remembered source file is rewritten.
    ///
    /// The rewrite is not atomic. A failure partway through can leave the
    /// file with an inconsistent label; no backup is made.
    pub fn write_label(&mut self, path: Option<&Path>) -> Result<()> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => self
                .filepath()
                .map(Path::to_path_buf)
                .ok_or(VicarError::NoFilePath)?,
        };

        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;

        let mut snippet = Vec::with_capacity(40);
        (&mut file).take(40).read_to_end(&mut snippet)?;
        let snippet: String = snippet.iter().map(|&b| b as char).collect();
        let lblsize = match_lblsize(&snippet).ok_or_else(|| VicarError::MissingLblsize {
            path: path.clone(),
        })?;

        // The file's current label size wins, even if ours is stale
        self.set("LBLSIZE", lblsize as i64)?;
        let (header, eol) = self.export(false)?;

        file.seek(SeekFrom::Start(0))?;
        file.write_all(&encode_latin1(&header))?;

        let recsize = self.int("RECSIZE")?;
        let nlb = self.int_or("NLB", 0);
        let n2 = self.int("N2")?;
        let n3 = self.int("N3")?;
        let skip = lblsize as u64 + (recsize * (nlb + n2 * n3)).max(0) as u64;

        file.seek(SeekFrom::Start(skip))?;
        file.write_all(&encode_latin1(&eol))?;
        file.set_len(skip + eol.len() as u64)?;

        debug!(
            path = %path.display(),
            header_len = header.len(),
            eol_len = eol.len(),
            "label rewritten"
        );
        Ok(())
    }
}

// Label text is ASCII plus NUL padding, so every char fits one byte
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_latin1() {
        assert_eq!(encode_latin1("NL=1\0\0"), b"NL=1\0\0");
    }
}
