//! # Entry Points
//!
//! Parse and create `*.dist-info/entry_points.txt` files, and inspect the
//! entry points they declare.
//!
//! The file is an INI-like list of sections, each naming a group, with
//! `name = value` entries:
//!
//! ```text
//! [console_scripts]
//! flake8 = flake8.main.cli:main
//!
//! [flake8.extension]
//! F = flake8.plugins.pyflakes:FlakesChecker
//! ```
//!
//! ## Semantics
//!
//! - Lines are trimmed and blank lines ignored.
//! - Entries before the first section header are ignored.
//! - A section with no entries does not produce a group.
//! - When a section is repeated, [`loads`] keeps only the entries of the last occurrence.
//!
//! The eager parsers are memoized on the exact input text through an
//! [`EntryPointsCodec`]; the free functions use a process-wide codec whose
//! cache follows the `cache` configuration key.


use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use lazy_regex::regex::Captures;
use lazy_regex::{Lazy, Regex};
use thiserror::Error;

use crate::cache::Memo;
use crate::distributions::{self, Distribution, DistributionResult};
use crate::fields::{Emitter, split_lines};

//================================================================================================
// Statics
//================================================================================================

static ENTRY_POINT_REGEX: Lazy<Regex> = lazy_regex::lazy_regex!(
    r"^(?P<modulename>\w+(\.\w+)*)(:(?P<objectname>\w+(\.\w+)*))?\s*(\[(?P<extras>.+)\])?$"
);
static EXTRAS_SEPARATOR: Lazy<Regex> = lazy_regex::lazy_regex!(r",\s*");

static CODEC: LazyLock<EntryPointsCodec> =
    LazyLock::new(|| EntryPointsCodec::new(config::CONFIG.cache));

//================================================================================================
// Types
//================================================================================================

/// A mapping of entry point groups to mappings of entry point names to values.
pub type EntryPointMap = IndexMap<String, IndexMap<String, String>>;

/// Errors raised by the entry point parsers and by [`EntryPoint`].
#[derive(Error, Debug)]
pub enum EntryPointError {
    /// The value of an entry point does not follow `module:attr [extras]`.
    #[error("Malformed entry point '{0}'")]
    MalformedEntryPoint(String),
    /// An entry line has no `=` separator.
    #[error("malformed entry point line: {0:?}")]
    MalformedLine(String),
    /// The file could not be read or written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized result type for entry point operations.
pub type EntryPointResult<T> = Result<T, EntryPointError>;

/// Parses `entry_points.txt` content, optionally memoizing the results.
#[derive(Debug)]
pub struct EntryPointsCodec {
    memo: Memo<String, EntryPointMap>,
}

/// A lazy iterator over the groups of an `entry_points.txt` file.
///
/// Created by [`lazy_loads`].
#[derive(Debug, Clone)]
pub struct Groups<'a> {
    lines: std::iter::Peekable<std::vec::IntoIter<&'a str>>,
    section: Option<&'a str>,
}

/// A lazy iterator over the `(name, value)` entries of a single group.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    lines: std::vec::IntoIter<&'a str>,
}

/// A single entry point.
#[derive(Clone)]
pub struct EntryPoint {
    /// The name of the entry point.
    pub name: String,
    /// The value of the entry point, in the form `module.submodule:attribute`.
    pub value: String,
    /// The group the entry point belongs to.
    pub group: Option<String>,
    /// The distribution the entry point belongs to.
    pub distro: Option<Arc<dyn Distribution>>,
}

/// The object an entry point refers to.
///
/// Importing it is left to the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointTarget {
    /// The dotted module path.
    pub module: String,
    /// The chain of attributes to look up on the module, outermost first.
    pub attrs: Vec<String>,
}

//================================================================================================
// Traits
//================================================================================================

/// Anything that can be written as a `name = value` line by [`dumps`].
pub trait AsEntryLine {
    /// The name and value of the entry.
    fn entry_line(&self) -> (&str, &str);
}

//================================================================================================
// Impls
//================================================================================================

impl<K: AsRef<str>, V: AsRef<str>> AsEntryLine for (K, V) {
    fn entry_line(&self) -> (&str, &str) {
        (self.0.as_ref(), self.1.as_ref())
    }
}

impl AsEntryLine for EntryPoint {
    fn entry_line(&self) -> (&str, &str) {
        (&self.name, &self.value)
    }
}

impl AsEntryLine for &EntryPoint {
    fn entry_line(&self) -> (&str, &str) {
        (&self.name, &self.value)
    }
}

impl EntryPointsCodec {
    /// Creates a codec; with `cache`, up to 128 parsed inputs are retained.
    pub fn new(cache: bool) -> Self {
        EntryPointsCodec {
            memo: Memo::new(cache),
        }
    }

    /// Parse the entry points from the given text.
    ///
    /// # Errors
    ///
    /// Fails if an entry line has no `=` separator.
    pub fn loads(&self, rawtext: &str) -> EntryPointResult<EntryPointMap> {
        self.memo
            .get_or_try_insert_with(rawtext.to_owned(), || collect_groups(rawtext))
    }

    /// Parse the entry points from the given file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, or for any reason given by
    /// [`EntryPointsCodec::loads`].
    pub fn load(&self, filename: impl AsRef<Path>) -> EntryPointResult<EntryPointMap> {
        self.loads(&std::fs::read_to_string(filename)?)
    }
}

impl<'a> Groups<'a> {
    fn new(rawtext: &'a str) -> Self {
        let lines: Vec<&str> = split_lines(rawtext)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        Groups {
            lines: lines.into_iter().peekable(),
            section: None,
        }
    }
}

impl<'a> Iterator for Groups<'a> {
    type Item = (&'a str, Entries<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;

            if let Some(section) = section_name(line) {
                self.section = Some(section);
                continue;
            }

            let Some(section) = self.section else {
                continue;
            };

            let mut entries = vec![line];
            while let Some(next) = self.lines.next_if(|l| section_name(l).is_none()) {
                entries.push(next);
            }

            return Some((section, Entries {
                lines: entries.into_iter(),
            }));
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = EntryPointResult<(&'a str, &'a str)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next().map(parse_value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.lines.size_hint()
    }
}

impl EntryPoint {
    /// Creates an entry point with no group or distribution.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        EntryPoint {
            name: name.into(),
            value: value.into(),
            group: None,
            distro: None,
        }
    }

    /// Sets the group the entry point belongs to.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the distribution the entry point belongs to.
    pub fn with_distribution(mut self, distro: Arc<dyn Distribution>) -> Self {
        self.distro = Some(distro);
        self
    }

    /// Creates an entry point for each `(name, value)` pair of `mapping`.
    pub fn from_mapping<'m>(
        mapping: impl IntoIterator<Item = (&'m String, &'m String)>,
        group: Option<&str>,
        distro: Option<&Arc<dyn Distribution>>,
    ) -> Vec<EntryPoint> {
        mapping
            .into_iter()
            .map(|(name, value)| EntryPoint {
                name: name.clone(),
                value: value.clone(),
                group: group.map(str::to_owned),
                distro: distro.cloned(),
            })
            .collect()
    }

    /// The module component of the value.
    ///
    /// # Errors
    ///
    /// Fails if the value is malformed.
    pub fn module(&self) -> EntryPointResult<&str> {
        let caps = self.captures()?;
        caps.name("modulename")
            .map(|m| m.as_str())
            .ok_or_else(|| self.malformed())
    }

    /// The object or attribute component of the value, if any.
    ///
    /// # Errors
    ///
    /// Fails if the value is malformed.
    pub fn attr(&self) -> EntryPointResult<Option<&str>> {
        Ok(self.captures()?.name("objectname").map(|m| m.as_str()))
    }

    /// The extras associated with the entry point.
    ///
    /// # Errors
    ///
    /// Fails if the value is malformed.
    pub fn extras(&self) -> EntryPointResult<Vec<&str>> {
        Ok(self
            .captures()?
            .name("extras")
            .map(|m| EXTRAS_SEPARATOR.split(m.as_str()).collect())
            .unwrap_or_default())
    }

    /// Resolves the object referred to by this entry point.
    ///
    /// If only a module is indicated by the value, the target has no
    /// attributes.
    ///
    /// # Errors
    ///
    /// Fails if the value is malformed.
    pub fn load(&self) -> EntryPointResult<EntryPointTarget> {
        let module = self.module()?.to_owned();
        let attrs = self
            .attr()?
            .map(|attr| attr.split('.').map(str::to_owned).collect())
            .unwrap_or_default();
        Ok(EntryPointTarget { module, attrs })
    }

    fn captures(&self) -> EntryPointResult<Captures<'_>> {
        ENTRY_POINT_REGEX
            .captures(&self.value)
            .ok_or_else(|| self.malformed())
    }

    fn malformed(&self) -> EntryPointError {
        EntryPointError::MalformedEntryPoint(self.value.clone())
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("group", &self.group)
            .field("distro", &self.distro.as_ref().map(|d| d.name().to_owned()))
            .finish()
    }
}

impl PartialEq for EntryPoint {
    fn eq(&self, other: &Self) -> bool {
        let distro = |ep: &EntryPoint| ep.distro.as_ref().map(|d| d.name().to_owned());
        self.name == other.name
            && self.value == other.value
            && self.group == other.group
            && distro(self) == distro(other)
    }
}

impl fmt::Display for EntryPointTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.module)?;
        if !self.attrs.is_empty() {
            write!(f, ":{}", self.attrs.join("."))?;
        }
        Ok(())
    }
}

//================================================================================================
// Functions
//================================================================================================

/// Parse the entry points from the given text lazily.
///
/// Each call returns a fresh iterator over `(group, entries)` pairs, where
/// `entries` yields the `(name, value)` pairs of the group.
pub fn lazy_loads(rawtext: &str) -> Groups<'_> {
    Groups::new(rawtext)
}

/// Parse the entry points from the given file lazily.
///
/// Returns the file content, from which [`lazy_loads`] can borrow.
///
/// # Errors
///
/// Fails if the file cannot be read.
pub fn lazy_load(filename: impl AsRef<Path>) -> EntryPointResult<String> {
    Ok(std::fs::read_to_string(filename)?)
}

/// Parse the entry points from the given text.
///
/// # Errors
///
/// Fails if an entry line has no `=` separator.
pub fn loads(rawtext: &str) -> EntryPointResult<EntryPointMap> {
    CODEC.loads(rawtext)
}

/// Parse the entry points from the given file.
///
/// # Errors
///
/// Fails if the file cannot be read, or for any reason given by [`loads`].
pub fn load(filename: impl AsRef<Path>) -> EntryPointResult<EntryPointMap> {
    CODEC.load(filename)
}

/// Construct an `entry_points.txt` file for the given grouped entry points.
///
/// Groups may map to `name -> value` mappings or to lists of [`EntryPoint`]s.
/// Each group is followed by exactly one blank line.
pub fn dumps<G, E>(entry_points: impl IntoIterator<Item = (G, E)>) -> String
where
    G: AsRef<str>,
    E: IntoIterator,
    E::Item: AsEntryLine,
{
    let mut output = Emitter::empty();

    for (group, entries) in entry_points {
        output.push(format!("[{}]", group.as_ref()));
        for entry in entries {
            let (name, value) = entry.entry_line();
            output.push(format!("{name} = {value}"));
        }
        output.blankline(true);
    }

    output.finish()
}

/// Construct an `entry_points.txt` file for the given grouped entry points and
/// write it to `filename`.
///
/// # Errors
///
/// Fails if the file cannot be written.
pub fn dump<G, E>(
    entry_points: impl IntoIterator<Item = (G, E)>,
    filename: impl AsRef<Path>,
) -> EntryPointResult<usize>
where
    G: AsRef<str>,
    E: IntoIterator,
    E::Item: AsEntryLine,
{
    let content = dumps(entry_points);
    std::fs::write(filename, &content)?;
    Ok(content.len())
}

/// Returns the entry points in `group` for every distribution found on `paths`.
///
/// # Errors
///
/// Fails if the entry points of any distribution cannot be read.
pub fn get_entry_points<P: AsRef<Path>>(
    group: &str,
    paths: &[P],
) -> DistributionResult<Vec<EntryPoint>> {
    let mut found = Vec::new();

    for distro in distributions::iter_distributions(paths) {
        let eps = distro.get_entry_points()?;
        if let Some(entries) = eps.get(group) {
            let distro: Arc<dyn Distribution> = Arc::new(distro);
            found.extend(EntryPoint::from_mapping(entries, Some(group), Some(&distro)));
        }
    }

    Ok(found)
}

/// Returns a mapping of entry point groups to entry points for every
/// distribution found on `paths`.
///
/// # Errors
///
/// Fails if the entry points of any distribution cannot be read.
pub fn get_all_entry_points<P: AsRef<Path>>(
    paths: &[P],
) -> DistributionResult<IndexMap<String, Vec<EntryPoint>>> {
    let mut grouped: IndexMap<String, Vec<EntryPoint>> = IndexMap::new();

    for distro in distributions::iter_distributions(paths) {
        let eps = distro.get_entry_points()?;
        let distro: Arc<dyn Distribution> = Arc::new(distro);

        for (group, entries) in &eps {
            grouped
                .entry(group.clone())
                .or_default()
                .extend(EntryPoint::from_mapping(entries, Some(group.as_str()), Some(&distro)));
        }
    }

    Ok(grouped)
}

fn collect_groups(rawtext: &str) -> EntryPointResult<EntryPointMap> {
    let mut map = EntryPointMap::new();

    for (group, entries) in lazy_loads(rawtext) {
        let entries = entries
            .map(|entry| entry.map(|(k, v)| (k.to_owned(), v.to_owned())))
            .collect::<EntryPointResult<IndexMap<_, _>>>()?;
        map.insert(group.to_owned(), entries);
    }

    tracing::trace!(groups = map.len(), "parsed entry points");
    Ok(map)
}

/// Returns the section name if `line` is a `[section]` header.
fn section_name(line: &str) -> Option<&str> {
    (line.starts_with('[') && line.ends_with(']'))
        .then(|| line.trim_matches(|c| c == '[' || c == ']'))
}

fn parse_value(line: &str) -> EntryPointResult<(&str, &str)> {
    line.split_once('=')
        .map(|(name, value)| (name.trim(), value.trim()))
        .ok_or_else(|| EntryPointError::MalformedLine(line.to_owned()))
}
