//! # Distribution Names
//!
//! Helpers for comparing distribution names and for decoding the fields
//! embedded in a wheel's filename:
//!
//! ```text
//! {name}-{version}(-{build})?-{python}-{abi}-{platform}.whl
//! ```
//!
//! Both operations are memoized process-wide.


use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use lazy_regex::{Lazy, Regex};
use thiserror::Error;

use crate::cache::Memo;
use crate::version::{self, Version, VersionError};

//================================================================================================
// Statics
//================================================================================================

static SEPARATORS: Lazy<Regex> = lazy_regex::lazy_regex!(r"[-_.]+");
static ESCAPED_NAME: Lazy<Regex> = lazy_regex::lazy_regex!(r"^[\w\d._]*$");

static CANONICAL: LazyLock<Memo<String, String>> =
    LazyLock::new(|| Memo::new(config::CONFIG.cache));
static WHEEL_FILENAMES: LazyLock<Memo<PathBuf, WheelFilename>> =
    LazyLock::new(|| Memo::new(config::CONFIG.cache));

//================================================================================================
// Types
//================================================================================================

/// Errors raised while decoding names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The filename is not a valid wheel filename.
    #[error("Invalid wheel filename ({reason}): {filename}")]
    InvalidWheelFilename {
        /// The offending filename.
        filename: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// The project name embedded in a wheel filename is not properly escaped.
    #[error("Invalid project name: {0:?}")]
    InvalidProjectName(String),
    /// The version embedded in a wheel filename is invalid.
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// The fields of a wheel filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelFilename {
    /// The escaped project name, as it appears in the filename.
    pub name: String,
    /// The parsed version.
    pub version: Version,
    /// The optional build tag.
    pub build: Option<String>,
    /// The python tag, e.g. `py3`.
    pub python: String,
    /// The ABI tag, e.g. `none`.
    pub abi: String,
    /// The platform tag, e.g. `any`.
    pub platform: String,
}

//================================================================================================
// Functions
//================================================================================================

/// Normalizes a distribution name for comparison: runs of `-`, `_` and `.`
/// collapse to a single `-`, and the result is lowercased.
pub fn canonicalize(name: &str) -> String {
    CANONICAL.get_or_insert_with(name.to_owned(), || {
        SEPARATORS.replace_all(name, "-").to_lowercase()
    })
}

/// Decodes the fields of a wheel filename.
///
/// Only the file name component of `path` is considered.
///
/// # Errors
///
/// Fails if the extension is not `.whl`, the stem does not have four or five
/// dashes, the project name is not escaped, or the version is invalid.
pub fn parse_wheel_filename(path: impl AsRef<Path>) -> Result<WheelFilename, NameError> {
    let path = path.as_ref();
    WHEEL_FILENAMES.get_or_try_insert_with(path.to_path_buf(), || decode_wheel_filename(path))
}

fn decode_wheel_filename(path: &Path) -> Result<WheelFilename, NameError> {
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let invalid = |reason| NameError::InvalidWheelFilename {
        filename: filename.clone(),
        reason,
    };

    let stem = filename
        .strip_suffix(".whl")
        .ok_or_else(|| invalid("extension must be '.whl'"))?;

    let dashes = stem.matches('-').count();
    if dashes != 4 && dashes != 5 {
        return Err(invalid("wrong number of parts"));
    }

    let parts: Vec<&str> = stem.split('-').collect();
    let name = parts[0];

    if name.contains("__") || !ESCAPED_NAME.is_match(name) {
        return Err(NameError::InvalidProjectName(name.to_owned()));
    }

    let version = version::parse(parts[1])?;
    let build = (dashes == 5).then(|| parts[2].to_owned());

    Ok(WheelFilename {
        name: name.to_owned(),
        version,
        build,
        python: parts[dashes - 2].to_owned(),
        abi: parts[dashes - 1].to_owned(),
        platform: parts[dashes].to_owned(),
    })
}
