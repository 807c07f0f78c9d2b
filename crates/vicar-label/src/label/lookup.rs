//! Key resolution and single-entry access.

use crate::error::{Result, VicarError};
use crate::types::{Key, Value, ValueFormat};

use super::{LabelEntry, VicarLabel, invalid_value_error, required};

/// Where a `(name, after_name)` key landed: an existing entry, or the
/// position where a new one belongs.
pub(crate) enum AfterPos {
    Found(usize),
    Missing(usize),
}

impl VicarLabel {
    fn normalize_index(&self, index: isize) -> Result<usize> {
        let len = self.entries.len() as isize;
        let idx = if index < 0 { index + len } else { index };
        if (0..len).contains(&idx) {
            Ok(idx as usize)
        } else {
            Err(VicarError::IndexOutOfRange { index })
        }
    }

    fn occurrence_index(&self, name: &str, occ: isize) -> Result<usize> {
        let positions = self
            .by_name
            .get(name)
            .ok_or_else(|| VicarError::KeyNotFound {
                key: name.to_string(),
            })?;
        let count = positions.len() as isize;
        let k = if occ < 0 { occ + count } else { occ };
        if (0..count).contains(&k) {
            Ok(positions[k as usize])
        } else {
            Err(VicarError::OccurrenceOutOfRange {
                name: name.to_string(),
            })
        }
    }

    /// Locate `name` inside the block opened by `after_name` (optionally the
    /// occurrence of `after_name` holding `after_value`). The block ends at
    /// the next occurrence of `after_name`, or at the end of the label.
    pub(crate) fn after_window(
        &self,
        name: &str,
        after_name: &str,
        after_value: Option<&Value>,
    ) -> Result<AfterPos> {
        let after_key = Key::Name(after_name.to_string());
        let start = self.resolve(&after_key, after_value)?;
        let stop = self
            .by_name
            .get(after_name)
            .and_then(|positions| positions.iter().copied().find(|&i| i > start))
            .unwrap_or(self.entries.len());
        let found = self
            .by_name
            .get(name)
            .and_then(|positions| positions.iter().copied().find(|&i| start < i && i < stop));
        Ok(match found {
            Some(i) => AfterPos::Found(i),
            None => AfterPos::Missing(stop),
        })
    }

    /// Resolve a key to a numeric entry index, optionally requiring the
    /// entry there to hold `value`.
    pub(crate) fn resolve(&self, key: &Key, value: Option<&Value>) -> Result<usize> {
        let idx = match key {
            Key::Index(i) => self.normalize_index(*i)?,
            Key::Name(name) => {
                let positions =
                    self.by_name
                        .get(name)
                        .ok_or_else(|| VicarError::key_not_found(key))?;
                match value {
                    None => positions[0],
                    Some(v) => {
                        return positions
                            .iter()
                            .copied()
                            .find(|&i| self.entries[i].value == *v)
                            .ok_or_else(|| VicarError::value_mismatch(key, v));
                    }
                }
            }
            Key::Occurrence(name, occ) => self.occurrence_index(name, *occ)?,
            Key::After(name, after) => match self.after_window(name, after, None)? {
                AfterPos::Found(i) => i,
                AfterPos::Missing(_) => return Err(VicarError::key_not_found(key)),
            },
            Key::AfterValue(name, after, after_value) => {
                match self.after_window(name, after, Some(after_value))? {
                    AfterPos::Found(i) => i,
                    AfterPos::Missing(_) => return Err(VicarError::key_not_found(key)),
                }
            }
            // A trailing-`+` key never reads an existing entry
            Key::Append(_) => return Err(VicarError::key_not_found(key)),
        };

        if let Some(v) = value {
            if self.entries[idx].value != *v {
                return Err(VicarError::value_mismatch(key, v));
            }
        }
        Ok(idx)
    }

    /// The numeric index of the entry a key resolves to.
    pub fn arg(&self, key: impl Into<Key>) -> Result<usize> {
        self.resolve(&key.into(), None)
    }

    /// The numeric index of the entry a key resolves to, requiring it to
    /// hold `value`.
    pub fn arg_value(&self, key: impl Into<Key>, value: &Value) -> Result<usize> {
        self.resolve(&key.into(), Some(value))
    }

    /// The value a key resolves to.
    pub fn get(&self, key: impl Into<Key>) -> Result<&Value> {
        let key = key.into();
        let idx = self.resolve(&key, None)?;
        Ok(&self.entries[idx].value)
    }

    /// Every value held under `name`, in entry order. A trailing `+` on the
    /// name is ignored.
    pub fn values_of(&self, name: &str) -> Result<Vec<&Value>> {
        let name = name.strip_suffix('+').unwrap_or(name);
        let positions = self
            .by_name
            .get(name)
            .ok_or_else(|| VicarError::KeyNotFound {
                key: name.to_string(),
            })?;
        Ok(positions.iter().map(|&i| &self.entries[i].value).collect())
    }

    /// The value a key resolves to, or `default` if the lookup fails.
    pub fn get_or(&self, key: impl Into<Key>, default: impl Into<Value>) -> Value {
        match self.get(key) {
            Ok(v) => v.clone(),
            Err(_) => default.into(),
        }
    }

    /// The integer value a key resolves to.
    pub fn int(&self, key: impl Into<Key>) -> Result<i64> {
        let key = key.into();
        let idx = self.resolve(&key, None)?;
        let entry = &self.entries[idx];
        entry
            .value
            .as_int()
            .ok_or_else(|| VicarError::invalid_value(&entry.name, "expected an integer"))
    }

    /// The integer value a key resolves to, or `default` if the lookup or
    /// the conversion fails.
    pub fn int_or(&self, key: impl Into<Key>, default: i64) -> i64 {
        self.int(key).unwrap_or(default)
    }

    /// Assign `value` to the entry `key` resolves to, inserting a new entry
    /// when the key addresses a missing one. Existing formatting is kept
    /// when it is still compatible with the new value.
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        self.set_entry(key.into(), value.into(), None)
    }

    /// Assign `value` with explicit formatting.
    pub fn set_with_format(
        &mut self,
        key: impl Into<Key>,
        value: impl Into<Value>,
        format: ValueFormat,
    ) -> Result<()> {
        self.set_entry(key.into(), value.into(), Some(format))
    }

    fn set_entry(&mut self, key: Key, value: Value, format: Option<ValueFormat>) -> Result<()> {
        let (name, insert_loc) = match key {
            Key::Index(i) => {
                let idx = self.normalize_index(i)?;
                return self.set_at(idx, value, format);
            }
            Key::Name(name) => match self.by_name.get(&name) {
                Some(positions) => {
                    let idx = positions[0];
                    return self.set_at(idx, value, format);
                }
                None => (name, self.entries.len()),
            },
            Key::Occurrence(name, occ) => match self.occurrence_index(&name, occ) {
                Ok(idx) => return self.set_at(idx, value, format),
                Err(_) => {
                    // One past the last occurrence appends; a missing name
                    // accepts occurrence 0 or -1
                    let count = self.by_name.get(&name).map_or(0, Vec::len) as isize;
                    let valid = if count > 0 {
                        occ == count
                    } else {
                        occ == 0 || occ == -1
                    };
                    if !valid {
                        return Err(VicarError::OccurrenceOutOfRange { name });
                    }
                    (name, self.entries.len())
                }
            },
            Key::After(name, after) => match self.after_window(&name, &after, None)? {
                AfterPos::Found(idx) => return self.set_at(idx, value, format),
                AfterPos::Missing(stop) => (name, stop),
            },
            Key::AfterValue(name, after, after_value) => {
                match self.after_window(&name, &after, Some(&after_value))? {
                    AfterPos::Found(idx) => return self.set_at(idx, value, format),
                    AfterPos::Missing(stop) => (name, stop),
                }
            }
            Key::Append(name) => (name, self.entries.len()),
        };

        if !value.is_valid() {
            return Err(invalid_value_error(&name, &value));
        }
        required::check_type(&name, &value, false)?;
        self.insert_entry(
            insert_loc,
            LabelEntry {
                name,
                value,
                format,
            },
        )
    }

    fn set_at(&mut self, idx: usize, value: Value, format: Option<ValueFormat>) -> Result<()> {
        let entry = &self.entries[idx];
        if !value.is_valid() {
            return Err(invalid_value_error(&entry.name, &value));
        }
        let is_first = self.by_name.get(&entry.name).is_none_or(|p| p[0] == idx);
        required::check_type(&entry.name, &value, is_first)?;

        let format = match format {
            Some(f) => Some(f),
            // Carry over the old formatting where it still applies
            None => self.entries[idx].format.clone().map(|mut old| {
                if old.fmt.is_empty() {
                    old.list_formats.clear();
                } else {
                    let compatible = match &value {
                        Value::Int(_) => old.accepts_int(),
                        _ => old.accepts_real(),
                    };
                    if !compatible {
                        old.fmt.clear();
                    }
                }
                old
            }),
        };

        self.entries[idx].value = value;
        self.entries[idx].format = format;
        Ok(())
    }

    /// Delete the entry a key resolves to. The first occurrence of a
    /// required parameter cannot be deleted.
    pub fn delete(&mut self, key: impl Into<Key>) -> Result<()> {
        let key = key.into();
        let idx = self.resolve(&key, None)?;
        let name = &self.entries[idx].name;
        if required::is_required(name) {
            let is_first = self.by_name.get(name).is_none_or(|p| p[0] == idx);
            if is_first {
                return Err(VicarError::required_parameter(name.clone()));
            }
        }

        let mut entries = self.entries.clone();
        entries.remove(idx);
        self.update(entries)
    }

    /// True if the key resolves to an entry.
    pub fn contains(&self, key: impl Into<Key>) -> bool {
        self.resolve(&key.into(), None).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_label() -> VicarLabel {
        let mut label = VicarLabel::new();
        label
            .append_text(
                "TASK='COPY'  USER='ALICE'  DAT_TIM='2024-01-01'  \
                 TASK='STRETCH'  USER='BOB'  DAT_TIM='2024-02-02'  ",
            )
            .unwrap();
        label
    }

    #[test]
    fn test_index_lookup() {
        let label = VicarLabel::new();
        assert_eq!(label.arg(0isize).unwrap(), 0);
        assert_eq!(label.arg(-1isize).unwrap(), label.len() - 1);
        assert!(matches!(
            label.arg(1000isize),
            Err(VicarError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_after_lookup() {
        let label = task_label();
        assert_eq!(
            label.get(("DAT_TIM", "TASK")).unwrap(),
            &Value::from("2024-01-01")
        );
        assert_eq!(
            label.get(("DAT_TIM", "TASK", "STRETCH")).unwrap(),
            &Value::from("2024-02-02")
        );
        assert!(matches!(
            label.get(("NOPE", "TASK")),
            Err(VicarError::KeyNotFound { .. })
        ));
        assert!(matches!(
            label.get(("DAT_TIM", "TASK", "NOPE")),
            Err(VicarError::ValueMismatch { .. })
        ));
    }

    #[test]
    fn test_arg_value() {
        let label = task_label();
        let idx = label
            .arg_value("USER", &Value::from("BOB"))
            .unwrap();
        assert_eq!(label.entries()[idx].value, Value::from("BOB"));
        assert!(label.arg_value("USER", &Value::from("EVE")).is_err());
    }

    #[test]
    fn test_values_of() {
        let label = task_label();
        let tasks = label.values_of("TASK").unwrap();
        assert_eq!(tasks, vec![&Value::from("COPY"), &Value::from("STRETCH")]);
        assert_eq!(label.values_of("TASK+").unwrap().len(), 2);
        assert!(label.values_of("NOPE").is_err());
    }

    #[test]
    fn test_get_or() {
        let label = VicarLabel::new();
        assert_eq!(label.get_or("NOPE", 7i64), Value::Int(7));
        assert_eq!(label.get_or("DIM", 0i64), Value::Int(3));
    }

    #[test]
    fn test_set_overwrites_first_occurrence() {
        let mut label = task_label();
        label.set("TASK", "MASKED").unwrap();
        assert_eq!(label.get(("TASK", 0)).unwrap(), &Value::from("MASKED"));
        assert_eq!(label.get(("TASK", 1)).unwrap(), &Value::from("STRETCH"));
    }

    #[test]
    fn test_set_occurrence_one_past_end_appends() {
        let mut label = task_label();
        label.set(("TASK", 2), "LABEL").unwrap();
        assert_eq!(label.values_of("TASK").unwrap().len(), 3);
        assert!(matches!(
            label.set(("TASK", 5), "X"),
            Err(VicarError::OccurrenceOutOfRange { .. })
        ));
        // Missing names accept occurrence 0 and -1
        label.set(("NEW", 0), 1i64).unwrap();
        label.set(("NEW2", -1), 2i64).unwrap();
        assert!(label.set(("NEW3", 1), 3i64).is_err());
    }

    #[test]
    fn test_set_append_key() {
        let mut label = task_label();
        label.set("TASK+", "LABEL").unwrap();
        assert_eq!(label.values_of("TASK").unwrap().len(), 3);
        // The append key never reads
        assert!(!label.contains("TASK+"));
    }

    #[test]
    fn test_set_after_inserts_into_block() {
        let mut label = task_label();
        label.set(("NOTE", "TASK", "COPY"), "FIRST").unwrap();
        let note = label.arg("NOTE").unwrap();
        let second_task = label.arg(("TASK", 1)).unwrap();
        assert!(note < second_task);
        assert_eq!(label.get(("NOTE", "TASK")).unwrap(), &Value::from("FIRST"));

        // Same key again now overwrites
        label.set(("NOTE", "TASK", "COPY"), "EDITED").unwrap();
        assert_eq!(label.values_of("NOTE").unwrap().len(), 1);
    }

    #[test]
    fn test_set_preserves_compatible_format() {
        let mut label = VicarLabel::new();
        label
            .set_with_format("SCALE", 7i64, ValueFormat::new().with_fmt("%+7d"))
            .unwrap();
        label.set("SCALE", 9i64).unwrap();
        let idx = label.arg("SCALE").unwrap();
        assert_eq!(label.entries()[idx].format.as_ref().unwrap().fmt, "%+7d");

        // A real no longer fits %d; the format string is dropped
        label.set("SCALE", 2.5).unwrap();
        assert_eq!(label.entries()[idx].format.as_ref().unwrap().fmt, "");
    }

    #[test]
    fn test_set_validates() {
        let mut label = VicarLabel::new();
        assert!(matches!(
            label.set("NL", -1i64),
            Err(VicarError::RequiredInt { .. })
        ));
        assert!(matches!(
            label.set("ORG", "ROW"),
            Err(VicarError::ConstrainedValue { .. })
        ));
        assert!(matches!(
            label.set("X", Value::List(Vec::new())),
            Err(VicarError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_delete() {
        let mut label = task_label();
        label.delete(("TASK", 1)).unwrap();
        assert_eq!(label.values_of("TASK").unwrap().len(), 1);
        assert!(matches!(
            label.delete("LBLSIZE"),
            Err(VicarError::RequiredParameter { .. })
        ));
        assert!(label.delete("NOPE").is_err());
    }

    #[test]
    fn test_delete_secondary_required_occurrence() {
        let mut label = VicarLabel::from_text("ORG='BSQ'  ORG='ROW'  ").unwrap();
        label.delete(("ORG", 1)).unwrap();
        assert_eq!(label.values_of("ORG").unwrap().len(), 1);
    }

    #[test]
    fn test_contains() {
        let label = task_label();
        assert!(label.contains("TASK"));
        assert!(label.contains(("TASK", -1)));
        assert!(label.contains(0isize));
        assert!(!label.contains("NOPE"));
        assert!(!label.contains(("TASK", 2)));
    }
}
