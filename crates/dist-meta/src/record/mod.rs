//! # File Records
//!
//! Parse and create lines of `*.dist-info/RECORD` files, and check installed
//! files against the hashes they declare.
//!
//! Each line of a `RECORD` file is a CSV row of three fields:
//!
//! ```text
//! cawdrey/__init__.py,sha256=ZEdMG7FV5VKQqnDx5zgbKAHuDSNbZC9xMHfBTmsXqAo,1082
//! cawdrey-0.4.2.dist-info/RECORD,,
//! ```
//!
//! The path is relative to the directory holding the `*.dist-info` directory,
//! the hash is `algorithm=digest` with the digest in URL-safe base64 without
//! padding, and the size is in bytes. Either of the last two may be empty.

#[cfg(test)]
mod tests;

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use lazy_regex::{Lazy, Regex};
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_till};
use nom::character::complete::char;
use nom::combinator::{all_consuming, map, opt, value};
use nom::multi::{fold_many0, separated_list1};
use nom::sequence::{preceded, terminated};
use sha2::{Digest, Sha256, Sha384, Sha512};
use thiserror::Error;

use crate::fields::split_lines;

//================================================================================================
// Statics
//================================================================================================

static DRIVE_PREFIX: Lazy<Regex> = lazy_regex::lazy_regex!(r"^[A-Za-z]:/");

/// Decodes digests whether or not their padding was stripped.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

//================================================================================================
// Types
//================================================================================================

/// Errors raised when parsing, reading or verifying `RECORD` entries.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Record paths must be relative and non-empty.
    #[error("invalid RecordEntry path (must be relative and non-empty): {0:?}")]
    InvalidPath(String),
    /// [`RecordEntry::from_line`] was given more than one line.
    #[error("'entry' must be a single-line entry.")]
    MultilineEntry,
    /// A line has fewer than the three required fields.
    #[error("expected at least 3 fields in RECORD line, found {0}")]
    TooFewFields(usize),
    /// The size field is not a whole number.
    #[error("invalid size {0:?} in RECORD line")]
    InvalidSize(String),
    /// A digest is not valid base64.
    #[error("invalid digest {0:?}: {1}")]
    InvalidDigest(String, #[source] base64::DecodeError),
    /// The entry does not know which distribution it belongs to.
    #[error("Cannot read files without a distribution root")]
    NoDistribution,
    /// The line could not be split into fields.
    #[error("malformed RECORD line: {0:?}")]
    MalformedLine(String),
    /// A file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized result type for `RECORD` operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// A checksum for a file in a `RECORD` file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHash {
    /// The name of the hash algorithm.
    pub name: String,
    /// The URL-safe base64 encoded digest, without padding.
    pub value: String,
}

/// A path in a distribution, with its declared hash and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    path: String,
    /// The hash of the file.
    pub hash: Option<FileHash>,
    /// The size of the file in bytes.
    pub size: Option<u64>,
    root: Option<PathBuf>,
}

/// A file whose content does not match its recorded hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// The path of the file, as recorded.
    pub path: String,
    /// The recorded hash.
    pub expected: FileHash,
    /// The hash of the file on disk.
    pub actual: FileHash,
}

/// The outcome of [`verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// The number of entries whose hash was checked.
    pub checked: usize,
    /// Files whose content does not match.
    pub mismatches: Vec<Mismatch>,
    /// Recorded files which do not exist.
    pub missing: Vec<String>,
    /// Files hashed with an algorithm this crate does not implement.
    pub unsupported: Vec<FileHash>,
}

//================================================================================================
// Traits
//================================================================================================

/// A [`Digest`] with the name used for it in `RECORD` files.
pub trait NamedDigest: Digest {
    /// The algorithm name, e.g. `sha256`.
    const NAME: &'static str;
}

//================================================================================================
// Impls
//================================================================================================

impl NamedDigest for Sha256 {
    const NAME: &'static str = "sha256";
}

impl NamedDigest for Sha384 {
    const NAME: &'static str = "sha384";
}

impl NamedDigest for Sha512 {
    const NAME: &'static str = "sha512";
}

impl FileHash {
    /// Creates a hash from an algorithm name and an encoded digest.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        FileHash {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses a hash in the form `<name>=<value>`.
    ///
    /// Both parts are trimmed; a missing `=` yields an empty value.
    pub fn from_string(string: &str) -> Self {
        let (name, value) = string.split_once('=').unwrap_or((string, ""));
        FileHash::new(name.trim(), value.trim())
    }

    /// Finalizes `hasher` into a hash named after its algorithm.
    pub fn from_hash<D: NamedDigest>(hasher: D) -> Self {
        FileHash::new(D::NAME, URL_SAFE_NO_PAD.encode(hasher.finalize()))
    }

    /// Hashes `data` with the algorithm `D`.
    pub fn of<D: NamedDigest>(data: impl AsRef<[u8]>) -> Self {
        FileHash::from_hash(D::new_with_prefix(data))
    }

    /// Hashes `data` with the algorithm named `name`, if it is one this crate
    /// implements.
    pub fn with_algorithm(name: &str, data: impl AsRef<[u8]>) -> Option<Self> {
        match name {
            <Sha256 as NamedDigest>::NAME => Some(FileHash::of::<Sha256>(data)),
            <Sha384 as NamedDigest>::NAME => Some(FileHash::of::<Sha384>(data)),
            <Sha512 as NamedDigest>::NAME => Some(FileHash::of::<Sha512>(data)),
            _ => None,
        }
    }

    /// The raw digest bytes.
    ///
    /// # Errors
    ///
    /// Fails if the value is not URL-safe base64.
    pub fn digest(&self) -> RecordResult<Vec<u8>> {
        LENIENT
            .decode(&self.value)
            .map_err(|e| RecordError::InvalidDigest(self.value.clone(), e))
    }

    /// Like [`FileHash::digest`], but as a lowercase hexadecimal string.
    ///
    /// # Errors
    ///
    /// Fails if the value is not URL-safe base64.
    pub fn hexdigest(&self) -> RecordResult<String> {
        Ok(hex::encode(self.digest()?))
    }
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl RecordEntry {
    /// Creates an entry for `path`, which must be relative.
    ///
    /// Backslashes are treated as path separators and the path is stored in
    /// normalized POSIX form.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidPath`] for absolute paths, including
    /// Windows drive and UNC paths, and for paths which normalize to nothing.
    pub fn new(path: &str, hash: Option<FileHash>, size: Option<u64>) -> RecordResult<Self> {
        let posix = path.replace('\\', "/");
        if posix.starts_with('/') || DRIVE_PREFIX.is_match(&posix) {
            return Err(RecordError::InvalidPath(path.to_owned()));
        }

        let normalized = normalize(&posix);
        if normalized.is_empty() {
            return Err(RecordError::InvalidPath(path.to_owned()));
        }

        Ok(RecordEntry {
            path: normalized,
            hash,
            size,
            root: None,
        })
    }

    /// Sets the directory which [`RecordEntry::path`] is relative to.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Parses a single `RECORD` line.
    ///
    /// `root` is the directory holding the `*.dist-info` directory, and is
    /// needed to read the file later.
    ///
    /// # Errors
    ///
    /// Fails if `line` holds more than one line, has fewer than three fields,
    /// has an invalid size or an absolute path.
    pub fn from_line(line: &str, root: Option<&Path>) -> RecordResult<Self> {
        let line = line.trim();
        let mut lines = split_lines(line);
        let line = match (lines.next(), lines.next()) {
            (Some(line), None) => line,
            _ => return Err(RecordError::MultilineEntry),
        };

        let fields = if line.contains('"') {
            csv_fields(line)?
        } else {
            line.split(',').map(str::to_owned).collect()
        };

        let [path, hash, size, ..] = fields.as_slice() else {
            return Err(RecordError::TooFewFields(fields.len()));
        };

        let hash = hash.trim();
        let size = size.trim();

        let entry = RecordEntry::new(
            path.trim(),
            (!hash.is_empty()).then(|| FileHash::from_string(hash)),
            if size.is_empty() {
                None
            } else {
                Some(size.parse().map_err(|_| RecordError::InvalidSize(size.to_owned()))?)
            },
        )?;

        Ok(match root {
            Some(root) => entry.with_root(root),
            None => entry,
        })
    }

    /// The path of the file, in POSIX form, relative to the distribution root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The final component of the path.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// The directory the path is relative to, if known.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// The location of the file on disk, if the root is known.
    pub fn full_path(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(&self.path))
    }

    /// Renders the entry as a `RECORD` line, `<path>,<hash>,<size>`.
    pub fn as_line(&self) -> String {
        let hash = self.hash.as_ref().map(FileHash::to_string).unwrap_or_default();
        let size = self.size.map(|s| s.to_string()).unwrap_or_default();
        format!("{},{hash},{size}", self.path)
    }

    /// Reads the file as text.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::NoDistribution`] if the root is unknown, or
    /// if the file cannot be read.
    pub fn read_text(&self) -> RecordResult<String> {
        let path = self.full_path().ok_or(RecordError::NoDistribution)?;
        Ok(std::fs::read_to_string(path)?)
    }

    /// Reads the file as bytes.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::NoDistribution`] if the root is unknown, or
    /// if the file cannot be read.
    pub fn read_bytes(&self) -> RecordResult<Vec<u8>> {
        let path = self.full_path().ok_or(RecordError::NoDistribution)?;
        Ok(std::fs::read(path)?)
    }
}

impl fmt::Display for RecordEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl VerifyReport {
    /// Whether every checked file matched and none were missing.
    pub fn is_ok(&self) -> bool {
        self.mismatches.is_empty() && self.missing.is_empty()
    }
}

//================================================================================================
// Functions
//================================================================================================

/// Parses every non-blank line of a `RECORD` file.
///
/// # Errors
///
/// Fails on the first line which cannot be parsed.
pub fn parse(content: &str, root: Option<&Path>) -> RecordResult<Vec<RecordEntry>> {
    split_lines(content)
        .filter(|line| !line.trim().is_empty())
        .map(|line| RecordEntry::from_line(line, root))
        .collect()
}

/// Rehashes every entry which declares a hash, using the declared algorithm,
/// and reports files which differ or are missing.
///
/// # Errors
///
/// Fails if an entry has no root, or if a file exists but cannot be read.
pub fn verify(entries: &[RecordEntry]) -> RecordResult<VerifyReport> {
    let span = tracing::info_span!("verify", files = entries.len());
    crate::log::set_bar(&span, "🔍 verifying files", entries.len() as u64);
    let _enter = span.enter();

    let mut report = VerifyReport::default();

    for entry in entries {
        crate::log::tick(&span);

        let Some(expected) = &entry.hash else {
            continue;
        };

        let data = match entry.read_bytes() {
            Ok(data) => data,
            Err(RecordError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %entry, "recorded file is missing");
                report.missing.push(entry.path.clone());
                continue;
            },
            Err(e) => return Err(e),
        };

        let Some(actual) = FileHash::with_algorithm(&expected.name, &data) else {
            tracing::warn!(path = %entry, algorithm = %expected.name, "unsupported hash algorithm");
            report.unsupported.push(expected.clone());
            continue;
        };

        report.checked += 1;
        if actual.value != expected.value.trim_end_matches('=') {
            tracing::debug!(path = %entry, %expected, %actual, "hash mismatch");
            report.mismatches.push(Mismatch {
                path: entry.path.clone(),
                expected: expected.clone(),
                actual,
            });
        }
    }

    Ok(report)
}

/// Collapses repeated separators and `.` components.
fn normalize(posix: &str) -> String {
    posix
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Splits a line using CSV quoting rules: fields are separated by `,`, may
/// be wrapped in `"`, and `""` inside a quoted field is a literal quote.
fn csv_fields(line: &str) -> RecordResult<Vec<String>> {
    all_consuming(separated_list1(char(','), alt((quoted_field, bare_field))))(line)
        .map(|(_, fields)| fields)
        .map_err(|_| RecordError::MalformedLine(line.to_owned()))
}

fn quoted_field(input: &str) -> IResult<&str, String> {
    // an unterminated quote runs to the end of the line
    let (input, body) = preceded(
        char('"'),
        terminated(
            fold_many0(
                alt((value("\"", tag("\"\"")), is_not("\""))),
                String::new,
                |mut acc, part| {
                    acc.push_str(part);
                    acc
                },
            ),
            opt(char('"')),
        ),
    )(input)?;
    // anything between the closing quote and the next separator is kept verbatim
    let (input, tail) = take_till(|c: char| c == ',')(input)?;
    Ok((input, body + tail))
}

fn bare_field(input: &str) -> IResult<&str, String> {
    map(take_till(|c: char| c == ','), str::to_owned)(input)
}
