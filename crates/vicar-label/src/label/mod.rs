//! The label store.
//!
//! A [`VicarLabel`] is an ordered sequence of (name, value, format) entries
//! with average O(1) lookup by name or by (name, occurrence). The name map
//! and the unique-key list are derived indices, rebuilt wholesale after
//! every structural mutation rather than patched incrementally.

mod lookup;
mod required;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{Result, VicarError};
use crate::grammar;
use crate::types::{Key, Value, ValueFormat, validate_name};

pub(crate) use required::LBLSIZE_WIDTH;

/// One entry of a VICAR label: a name, a value, and optional formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEntry {
    pub name: String,
    pub value: Value,
    pub format: Option<ValueFormat>,
}

impl LabelEntry {
    /// Create an entry with default formatting.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            format: None,
        }
    }

    /// Attach explicit formatting to this entry.
    #[must_use]
    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = Some(format);
        self
    }
}

impl<N: Into<String>, V: Into<Value>> From<(N, V)> for LabelEntry {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// The unique key of an entry: the bare name if it occurs once, else the
/// name plus its 0-based occurrence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueKey {
    Name(String),
    Occurrence(String, usize),
}

impl UniqueKey {
    /// The parameter name behind this key.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            UniqueKey::Name(name) | UniqueKey::Occurrence(name, _) => name,
        }
    }

    /// Convert into a lookup [`Key`].
    #[must_use]
    pub fn to_key(&self) -> Key {
        match self {
            UniqueKey::Name(name) => Key::Name(name.clone()),
            UniqueKey::Occurrence(name, occ) => Key::Occurrence(name.clone(), *occ as isize),
        }
    }
}

impl std::fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueKey::Name(name) => write!(f, "{name}"),
            UniqueKey::Occurrence(name, occ) => write!(f, "({name}, {occ})"),
        }
    }
}

/// An ordered, indexed VICAR label.
#[derive(Debug, Clone)]
pub struct VicarLabel {
    pub(crate) entries: Vec<LabelEntry>,
    pub(crate) by_name: HashMap<String, Vec<usize>>,
    unique_keys: Vec<UniqueKey>,
    filepath: Option<PathBuf>,
}

impl VicarLabel {
    /// Create a label containing only the required parameters with their
    /// default values.
    #[must_use]
    pub fn new() -> Self {
        Self::build(Vec::new(), None).expect("default label entries are valid")
    }

    /// Create a label from label text.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::build(grammar::parse_label_text(text)?, None)
    }

    /// Create a label from a list of entries.
    pub fn from_entries<I, E>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<LabelEntry>,
    {
        Self::build(entries.into_iter().map(Into::into).collect(), None)
    }

    /// Create a label from the top (and optional EOL) label of a VICAR data
    /// file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = crate::reader::read_label(path)?;
        let mut label = Self::from_text(&text)?;
        label.filepath = Some(path.to_path_buf());
        Ok(label)
    }

    fn build(mut params: Vec<LabelEntry>, filepath: Option<PathBuf>) -> Result<Self> {
        // Insert a missing LBLSIZE, or move it to the front
        match params.iter().position(|e| e.name == "LBLSIZE") {
            None => params.insert(0, LabelEntry::new("LBLSIZE", 0i64)),
            Some(0) => {}
            Some(k) => {
                let entry = params.remove(k);
                params.insert(0, entry);
            }
        }

        // Append any other missing required parameters
        let present: HashSet<String> = params.iter().map(|e| e.name.clone()).collect();
        for (name, default) in required::required_defaults() {
            if !present.contains(name) {
                params.push(LabelEntry::new(name, default));
            }
        }

        // Check types and values of required parameters
        let mut seen = HashSet::new();
        for entry in &params {
            let is_first = seen.insert(entry.name.clone());
            required::check_type(&entry.name, &entry.value, is_first)?;
        }

        let mut label = Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            unique_keys: Vec::new(),
            filepath,
        };
        label.update(params)?;
        Ok(label)
    }

    /// Replace the label's content, re-validating and re-indexing.
    pub(crate) fn update(&mut self, entries: Vec<LabelEntry>) -> Result<()> {
        for entry in &entries {
            if !validate_name(&entry.name) {
                return Err(VicarError::invalid_name(&entry.name));
            }
            if !entry.value.is_valid() {
                return Err(invalid_value_error(&entry.name, &entry.value));
            }
        }

        self.entries = entries;
        self.reindex();
        Ok(())
    }

    /// Rebuild the name map and unique-key list from the entry sequence.
    fn reindex(&mut self) {
        self.by_name.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            self.by_name.entry(entry.name.clone()).or_default().push(i);
        }

        self.unique_keys = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let positions = &self.by_name[&entry.name];
                if positions.len() == 1 {
                    UniqueKey::Name(entry.name.clone())
                } else {
                    let occ = positions.iter().position(|&p| p == i).unwrap_or(0);
                    UniqueKey::Occurrence(entry.name.clone(), occ)
                }
            })
            .collect();
    }

    /// Insert a single entry at `index`, re-validating and re-indexing.
    pub(crate) fn insert_entry(&mut self, index: usize, entry: LabelEntry) -> Result<()> {
        let mut entries = self.entries.clone();
        entries.insert(index.min(entries.len()), entry);
        self.update(entries)
    }

    /// The number of entries in the label.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the label has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The ordered entry sequence.
    #[must_use]
    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }

    /// The path of the file this label was read from, if any.
    #[must_use]
    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    /// Set or clear the associated file path.
    pub fn set_filepath(&mut self, path: Option<PathBuf>) {
        self.filepath = path;
    }

    /// Bulk-append entries, re-validating each.
    pub fn append<I, E>(&mut self, new_entries: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<LabelEntry>,
    {
        let mut entries = self.entries.clone();
        entries.extend(new_entries.into_iter().map(Into::into));
        self.update(entries)
    }

    /// Bulk-append entries parsed from label text.
    pub fn append_text(&mut self, text: &str) -> Result<()> {
        self.append(grammar::parse_label_text(text)?)
    }

    /// Relocate the given entries so they appear contiguously, immediately
    /// after the first key. A leading `""` key moves the group to the very
    /// front. All other entries keep their relative order, and LBLSIZE is
    /// re-pinned to position 0 afterward.
    pub fn reorder<I, K>(&mut self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        let mut keys: Vec<Key> = keys.into_iter().map(Into::into).collect();
        let move_to_front = matches!(keys.first(), Some(Key::Name(n)) if n.is_empty());
        if move_to_front {
            keys.remove(0);
        }
        if keys.is_empty() {
            return Ok(());
        }

        let order: Vec<usize> = keys
            .iter()
            .map(|k| self.resolve(k, None))
            .collect::<Result<_>>()?;
        let order_set: HashSet<usize> = order.iter().copied().collect();
        if order_set.len() != order.len() {
            return Err(VicarError::DuplicateKey);
        }

        let mut full = Vec::with_capacity(self.len());
        if !move_to_front {
            for i in 0..order[0] {
                if !order_set.contains(&i) {
                    full.push(i);
                }
            }
        }
        full.extend(&order);
        let placed: HashSet<usize> = full.iter().copied().collect();
        for i in 0..self.len() {
            if !placed.contains(&i) {
                full.push(i);
            }
        }

        let mut entries: Vec<LabelEntry> = full.iter().map(|&i| self.entries[i].clone()).collect();

        // LBLSIZE restored to first
        if entries.first().map(|e| e.name.as_str()) != Some("LBLSIZE") {
            if let Some(k) = entries.iter().position(|e| e.name == "LBLSIZE") {
                let entry = entries.remove(k);
                entries.insert(0, entry);
            }
        }

        self.update(entries)
    }

    /// Set NB, NL, NS and recompute N1, N2, N3 from ORG.
    pub fn set_nbls(&mut self, nb: i64, nl: i64, ns: i64) -> Result<()> {
        self.set("NB", nb)?;
        self.set("NL", nl)?;
        self.set("NS", ns)?;
        self.n123_from_nbls()
    }

    /// Set N3, N2, N1 and recompute NB, NL, NS from ORG.
    pub fn set_n123(&mut self, n3: i64, n2: i64, n1: i64) -> Result<()> {
        self.set("N1", n1)?;
        self.set("N2", n2)?;
        self.set("N3", n3)?;
        self.nbls_from_n123()
    }

    /// Fill in N1, N2, N3 given NB, NL, NS and ORG.
    pub(crate) fn n123_from_nbls(&mut self) -> Result<()> {
        let nb = self.int("NB")?;
        let nl = self.int("NL")?;
        let ns = self.int("NS")?;
        let org = self.get_or("ORG", "BSQ");
        let (n1, n2, n3) = match org.as_str() {
            Some("BIL") => (ns, nb, nl),
            Some("BIP") => (nb, ns, nl),
            _ => (ns, nl, nb), // BSQ
        };
        self.set("N1", n1)?;
        self.set("N2", n2)?;
        self.set("N3", n3)
    }

    /// Fill in NB, NL, NS given N1, N2, N3 and ORG.
    fn nbls_from_n123(&mut self) -> Result<()> {
        let n1 = self.int("N1")?;
        let n2 = self.int("N2")?;
        let n3 = self.int("N3")?;
        let org = self.get_or("ORG", "BSQ");
        let (nb, nl, ns) = match org.as_str() {
            Some("BIL") => (n2, n3, n1),
            Some("BIP") => (n1, n3, n2),
            _ => (n3, n2, n1), // BSQ
        };
        self.set("NB", nb)?;
        self.set("NL", nl)?;
        self.set("NS", ns)
    }

    fn matching_indices(&self, pattern: Option<&str>) -> Result<Vec<usize>> {
        match pattern {
            None => Ok((0..self.len()).collect()),
            Some(pattern) => {
                // Case-insensitive full match, like the rest of VICAR tooling
                let re = Regex::new(&format!("(?i)^(?:{pattern})$"))?;
                Ok((0..self.len())
                    .filter(|&i| re.is_match(&self.entries[i].name))
                    .collect())
            }
        }
    }

    /// The parameter names in entry order, optionally filtered by a
    /// case-insensitive regular expression.
    pub fn names(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        Ok(self
            .matching_indices(pattern)?
            .into_iter()
            .map(|i| self.entries[i].name.clone())
            .collect())
    }

    /// The unique keys in entry order, optionally filtered.
    pub fn keys(&self, pattern: Option<&str>) -> Result<Vec<UniqueKey>> {
        Ok(self
            .matching_indices(pattern)?
            .into_iter()
            .map(|i| self.unique_keys[i].clone())
            .collect())
    }

    /// The values in entry order, optionally filtered.
    pub fn values(&self, pattern: Option<&str>) -> Result<Vec<&Value>> {
        Ok(self
            .matching_indices(pattern)?
            .into_iter()
            .map(|i| &self.entries[i].value)
            .collect())
    }

    /// The (key, value) pairs in entry order, optionally filtered. With
    /// `unique` false, keys are bare names and may repeat.
    pub fn items(&self, pattern: Option<&str>, unique: bool) -> Result<Vec<(UniqueKey, &Value)>> {
        Ok(self
            .matching_indices(pattern)?
            .into_iter()
            .map(|i| {
                let key = if unique {
                    self.unique_keys[i].clone()
                } else {
                    UniqueKey::Name(self.entries[i].name.clone())
                };
                (key, &self.entries[i].value)
            })
            .collect())
    }

    /// The numeric indices of entries whose names match the pattern.
    pub fn args(&self, pattern: Option<&str>) -> Result<Vec<usize>> {
        self.matching_indices(pattern)
    }

    /// Iterate over the unique keys in entry order.
    pub fn iter(&self) -> impl Iterator<Item = &UniqueKey> {
        self.unique_keys.iter()
    }
}

impl Default for VicarLabel {
    fn default() -> Self {
        Self::new()
    }
}

/// Labels are equal if they hold the same parameter names and values in the
/// same order. Formatting and filepath are ignored.
impl PartialEq for VicarLabel {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.name == b.name && a.value == b.value)
    }
}

pub(crate) fn invalid_value_error(name: &str, value: &Value) -> VicarError {
    VicarError::invalid_value(name, format!("{value} is not a valid parameter value"))
}
