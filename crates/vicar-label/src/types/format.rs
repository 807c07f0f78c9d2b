//! Per-value formatting descriptors.
//!
//! A label parameter may carry explicit formatting: a printf-style format
//! string and blank counts controlling spacing around the `=` sign and
//! between entries. List values additionally carry per-element formats.

/// Formatting attached to a single list element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFormat {
    /// Printf-style format string, e.g. `"%+07d"`; empty means default.
    pub fmt: String,
    /// Blanks before the element, after the `(` or `,`.
    pub blanks_before: usize,
    /// Blanks after the element, before the `,` or `)`.
    pub blanks_after: usize,
}

impl ListFormat {
    /// Create a list-element format with the given blank counts.
    #[must_use]
    pub fn new(fmt: impl Into<String>, blanks_before: usize, blanks_after: usize) -> Self {
        Self {
            fmt: fmt.into(),
            blanks_before,
            blanks_after,
        }
    }
}

/// Formatting attached to a parameter value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueFormat {
    /// Printf-style format string, e.g. `"%+7d"` or `"%7.3f"`; empty means
    /// default rendering.
    pub fmt: String,
    /// Blanks between the parameter name and the `=` sign.
    pub name_blanks: usize,
    /// Blanks between the `=` sign and the value.
    pub val_blanks: usize,
    /// Blanks after the value; zero means the standard 2-blank padding is
    /// applied at render time.
    pub sep_blanks: usize,
    /// Per-element formats for list values, parallel to the element list.
    /// Empty means defaults for every element.
    pub list_formats: Vec<Option<ListFormat>>,
}

impl ValueFormat {
    /// Create an empty (all-default) format.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the printf-style format string.
    #[must_use]
    pub fn with_fmt(mut self, fmt: impl Into<String>) -> Self {
        self.fmt = fmt.into();
        self
    }

    /// Set the blank count before the `=` sign.
    #[must_use]
    pub fn with_name_blanks(mut self, blanks: usize) -> Self {
        self.name_blanks = blanks;
        self
    }

    /// Set the blank count after the `=` sign.
    #[must_use]
    pub fn with_val_blanks(mut self, blanks: usize) -> Self {
        self.val_blanks = blanks;
        self
    }

    /// Set the blank count after the value.
    #[must_use]
    pub fn with_sep_blanks(mut self, blanks: usize) -> Self {
        self.sep_blanks = blanks;
        self
    }

    /// Set the per-element list formats.
    #[must_use]
    pub fn with_list_formats(mut self, formats: Vec<Option<ListFormat>>) -> Self {
        self.list_formats = formats;
        self
    }

    /// True if every field is at its default.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }

    /// True if the format string's conversion accepts an integer value.
    #[must_use]
    pub fn accepts_int(&self) -> bool {
        matches!(self.fmt.chars().last(), Some('d' | 'i'))
    }

    /// True if the format string's conversion accepts a real value.
    #[must_use]
    pub fn accepts_real(&self) -> bool {
        matches!(
            self.fmt.chars().last(),
            Some('e' | 'E' | 'f' | 'F' | 'g' | 'G')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let fmt = ValueFormat::new()
            .with_fmt("%7.3f")
            .with_name_blanks(1)
            .with_val_blanks(2)
            .with_sep_blanks(3);
        assert_eq!(fmt.fmt, "%7.3f");
        assert_eq!(fmt.name_blanks, 1);
        assert_eq!(fmt.val_blanks, 2);
        assert_eq!(fmt.sep_blanks, 3);
        assert!(!fmt.is_default());
        assert!(ValueFormat::new().is_default());
    }

    #[test]
    fn test_conversion_compatibility() {
        assert!(ValueFormat::new().with_fmt("%+7d").accepts_int());
        assert!(!ValueFormat::new().with_fmt("%+7d").accepts_real());
        assert!(ValueFormat::new().with_fmt("%12.3e").accepts_real());
        assert!(!ValueFormat::new().with_fmt("%12.3e").accepts_int());
        assert!(!ValueFormat::new().accepts_int());
    }
}
