//! # Field Mappings
//!
//! The `METADATA` and `WHEEL` files of a distribution are lists of
//! email-header-like `Name: value` fields. Some fields legitimately occur
//! more than once (`Classifier`, `Requires-Dist`, `Tag`, ...) and field names
//! are matched without regard to case, so neither a `HashMap` nor a
//! `BTreeMap` can model them faithfully.
//!
//! ## Key Types
//!
//! - [`FieldMap`] - An ordered list of `(name, value)` pairs with case-insensitive lookups and
//!   duplicate keys.
//! - [`Emitter`] - A line buffer used to construct `METADATA`, `WHEEL` and `entry_points.txt`
//!   files.
//!
//! ## Semantics
//!
//! - Insertion order is preserved, including duplicates.
//! - [`FieldMap::set`] always appends; it never overwrites an existing field.
//! - [`FieldMap::delete`] removes every occurrence of a field, so a later `set` of the same name
//!   lands at the end of the list.
//!
//! ```rust
//! use dist_meta::FieldMap;
//!
//! let mut fields = FieldMap::new();
//! fields.set("Classifier", "Typing :: Typed");
//! fields.set("classifier", "Topic :: Utilities");
//!
//! assert_eq!(fields.get("CLASSIFIER"), Some("Typing :: Typed"));
//! assert_eq!(fields.get_all("Classifier").map(|v| v.len()), Some(2));
//! ```

#[cfg(test)]
mod tests;

use std::fmt;

use thiserror::Error;

//================================================================================================
// Types
//================================================================================================

/// An error raised when mutating a [`FieldMap`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// No field with the given name exists.
    #[error("no field named {0:?}")]
    KeyNotFound(String),
}

/// An ordered mapping of field names to values which supports duplicate,
/// case-insensitive keys.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: Vec<(String, String)>,
}

/// Used to construct `METADATA`, `WHEEL` and other email-field-like files.
///
/// Lines are accumulated in order and joined with `\n` by [`Emitter::finish`];
/// no trailing newline is added implicitly.
#[derive(Debug, Default)]
pub struct Emitter<'a> {
    fields: Option<&'a FieldMap>,
    lines: Vec<String>,
}

//================================================================================================
// Impls
//================================================================================================

impl FieldMap {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of fields, including duplicates.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if there are no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Appends a field.
    ///
    /// This does not overwrite existing fields with the same name; use
    /// [`FieldMap::delete`] or [`FieldMap::replace`] for that.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Returns the value of the first field matching `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.matching(name).next()
    }

    /// Like [`FieldMap::get`], but returns `default` when the field is missing.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Returns every value for the named field, in the order they were inserted.
    ///
    /// Returns `None` rather than an empty list when no such field exists.
    pub fn get_all(&self, name: &str) -> Option<Vec<&str>> {
        let values: Vec<&str> = self.matching(name).collect();
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }

    /// Like [`FieldMap::get_all`], but returns `default` when the field is missing.
    pub fn get_all_or<'a>(&'a self, name: &str, default: Vec<&'a str>) -> Vec<&'a str> {
        self.get_all(name).unwrap_or(default)
    }

    /// Removes all occurrences of a field. Missing fields are ignored.
    pub fn delete(&mut self, name: &str) {
        self.fields.retain(|(k, _)| !eq_ignore_case(k, name));
    }

    /// Returns whether a field named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| eq_ignore_case(k, name))
    }

    /// Replaces the value of the first matching field, retaining field order
    /// and the casing of the stored name.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::KeyNotFound`] if no field matches.
    pub fn replace(&mut self, name: &str, value: impl Into<String>) -> Result<(), FieldError> {
        let field = self
            .fields
            .iter_mut()
            .find(|(k, _)| eq_ignore_case(k, name))
            .ok_or_else(|| FieldError::KeyNotFound(name.to_owned()))?;
        field.1 = value.into();
        Ok(())
    }

    /// All field names, in insertion order, including duplicates.
    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// All field values, in insertion order, including duplicates.
    pub fn values(&self) -> Vec<&str> {
        self.fields.iter().map(|(_, v)| v.as_str()).collect()
    }

    /// All `(name, value)` pairs, in insertion order, including duplicates.
    pub fn items(&self) -> Vec<(&str, &str)> {
        self.iter().collect()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn matching<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a str> + use<'a, 'n> {
        self.fields
            .iter()
            .filter(move |(k, _)| eq_ignore_case(k, name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for FieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldMap({self})")
    }
}

impl fmt::Display for FieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k:?}: {v:?}")?;
        }
        f.write_str("}")
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl IntoIterator for FieldMap {
    type IntoIter = std::vec::IntoIter<(String, String)>;
    type Item = (String, String);

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> Emitter<'a> {
    /// Creates an emitter which draws values from `fields`.
    pub fn new(fields: &'a FieldMap) -> Self {
        Emitter {
            fields: Some(fields),
            lines: Vec::new(),
        }
    }

    /// Creates an emitter with no backing fields, for free-form text.
    pub fn empty() -> Self {
        Emitter::default()
    }

    /// Appends text, one line per `\n`-separated segment.
    ///
    /// Segments consisting only of whitespace are stored as empty lines.
    pub fn push(&mut self, text: impl AsRef<str>) {
        for line in text.as_ref().split('\n') {
            if line.trim().is_empty() {
                self.lines.push(String::new());
            } else {
                self.lines.push(line.to_owned());
            }
        }
    }

    /// Appends `Name: value` for the first value of the named field, if present.
    pub fn add_single(&mut self, name: &str) {
        if let Some(value) = self.fields.and_then(|f| f.get(name)) {
            self.push(format!("{name}: {value}"));
        }
    }

    /// Appends `Name: value` for every value of the named field.
    pub fn add_multiple(&mut self, name: &str) {
        if let Some(fields) = self.fields {
            for value in fields.matching(name) {
                self.push(format!("{name}: {value}"));
            }
        }
    }

    /// Appends a blank line.
    ///
    /// With `ensure_single`, trailing blank lines are removed first so that
    /// exactly one remains.
    pub fn blankline(&mut self, ensure_single: bool) {
        if ensure_single {
            while self.lines.last().is_some_and(|l| l.trim().is_empty()) {
                self.lines.pop();
            }
        }
        self.lines.push(String::new());
    }

    /// Appends the body of the file, separated from the fields by a blank line.
    pub fn add_body(&mut self, body: &str) {
        self.blankline(true);
        self.blankline(false);
        self.push(body);
        self.blankline(true);
    }

    /// Joins the accumulated lines with `\n`.
    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

//================================================================================================
// Functions
//================================================================================================

/// Splits text into lines at any line boundary: `\r\n`, `\r`, `\n` and the
/// other Unicode separators (`\x0b`, `\x0c`, `\x1c`-`\x1e`, `\u{85}`,
/// `\u{2028}`, `\u{2029}`). A trailing boundary does not produce an empty
/// final line.
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let remaining = rest.filter(|r| !r.is_empty())?;
        match remaining.char_indices().find(|&(_, c)| is_line_break(c)) {
            Some((i, c)) => {
                let width = if remaining[i..].starts_with("\r\n") {
                    2
                } else {
                    c.len_utf8()
                };
                rest = Some(&remaining[i + width..]);
                Some(&remaining[..i])
            },
            None => {
                rest = None;
                Some(remaining)
            },
        }
    })
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Case-insensitive comparison of field names.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        a.eq_ignore_ascii_case(b)
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}
