//! # Distributions
//!
//! Locate installed distributions and read the files in their `*.dist-info`
//! directories.
//!
//! ## Key Types
//!
//! - [`Distribution`] - The capability shared by every kind of distribution: read a file from the
//!   `*.dist-info` directory and decode the well known ones.
//! - [`DistInfo`] - An installed distribution, backed by a `*.dist-info` directory on disk.
//! - [`WheelDistribution`] - A distribution inside a `.whl` archive.
//!
//! ## Scanning
//!
//! [`iter_distributions`] walks a list of directories, much like an
//! interpreter's module search path. Distributions found in earlier
//! directories shadow those with the same canonical name found later, and
//! directories whose names cannot be decoded are skipped with a warning.


use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::entry_points::{self, EntryPointError, EntryPointMap};
use crate::fields::FieldMap;
use crate::metadata::{self, MetadataError};
use crate::names::{self, NameError};
use crate::record::{self, RecordEntry, RecordError};
use crate::version::{self, Version, VersionError};
use crate::wheel::{self, WheelError};

//================================================================================================
// Statics
//================================================================================================

const DIST_INFO: &str = ".dist-info";

//================================================================================================
// Types
//================================================================================================

/// Errors raised while locating distributions or reading their files.
#[derive(Error, Debug)]
pub enum DistributionError {
    /// The `*.dist-info` directory has no file with the given name.
    #[error("no file named {0:?} in the distribution")]
    NotFound(String),
    /// No distribution with the given name is installed.
    #[error("No distribution named '{0}'.")]
    DistributionNotFound(String),
    /// A `*.dist-info` directory name is not `{name}-{version}.dist-info`.
    #[error("cannot determine the name and version of {0:?}")]
    InvalidName(PathBuf),
    /// The directory looks like a temporary directory left behind by an installer.
    #[error("Directory path starts with a tilde (~). This may be a temporary directory created by pip.")]
    TemporaryDirectory(PathBuf),
    /// The `METADATA` file is invalid.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// The `WHEEL` file is invalid.
    #[error(transparent)]
    Wheel(#[from] WheelError),
    /// The `entry_points.txt` file is invalid.
    #[error(transparent)]
    EntryPoints(#[from] EntryPointError),
    /// The `RECORD` file is invalid.
    #[error(transparent)]
    Record(#[from] RecordError),
    /// A version could not be parsed.
    #[error(transparent)]
    Version(#[from] VersionError),
    /// A wheel filename could not be parsed.
    #[error(transparent)]
    Name(#[from] NameError),
    /// A wheel archive could not be read.
    #[error(transparent)]
    Zip(#[from] ZipError),
    /// A file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized result type for distribution operations.
pub type DistributionResult<T> = Result<T, DistributionError>;

/// An installed distribution, backed by a `*.dist-info` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistInfo {
    name: String,
    version: Version,
    path: PathBuf,
}

/// A distribution in wheel form.
///
/// The archive is opened by [`WheelDistribution::open`] and closed when the
/// value is dropped or passed to [`WheelDistribution::close`].
pub struct WheelDistribution {
    name: String,
    version: Version,
    path: PathBuf,
    dist_info: String,
    members: Vec<String>,
    archive: Mutex<ZipArchive<File>>,
}

/// An iterator over the distributions installed in a list of directories.
///
/// Created by [`iter_distributions`].
#[derive(Debug)]
pub struct Distributions {
    dirs: std::vec::IntoIter<PathBuf>,
    pending: std::vec::IntoIter<PathBuf>,
    seen: HashSet<String>,
}

//================================================================================================
// Traits
//================================================================================================

/// Read access to the `*.dist-info` directory of a distribution.
pub trait Distribution: Send + Sync {
    /// The name of the distribution, exactly as found. No normalization is
    /// performed.
    fn name(&self) -> &str;

    /// The version of the distribution.
    fn version(&self) -> &Version;

    /// Reads a file from the `*.dist-info` directory.
    ///
    /// # Errors
    ///
    /// Returns [`DistributionError::NotFound`] if there is no such file.
    fn read_file(&self, filename: &str) -> DistributionResult<String>;

    /// Whether the `*.dist-info` directory contains a file named `filename`.
    fn has_file(&self, filename: &str) -> bool;

    /// The directory which the paths in `RECORD` are relative to, if the
    /// files are on disk.
    fn files_root(&self) -> Option<&Path> {
        None
    }

    /// The entry points declared by the distribution, or an empty mapping if
    /// it has no `entry_points.txt`.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    fn get_entry_points(&self) -> DistributionResult<EntryPointMap> {
        if self.has_file("entry_points.txt") {
            Ok(entry_points::loads(&self.read_file("entry_points.txt")?)?)
        } else {
            Ok(EntryPointMap::new())
        }
    }

    /// The parsed `METADATA` file.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or cannot be parsed.
    fn get_metadata(&self) -> DistributionResult<FieldMap> {
        Ok(metadata::loads(&self.read_file("METADATA")?)?)
    }

    /// The parsed `WHEEL` file, or `None` if the distribution was not
    /// installed from a wheel.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    fn get_wheel(&self) -> DistributionResult<Option<FieldMap>> {
        if self.has_file("WHEEL") {
            Ok(Some(wheel::loads(&self.read_file("WHEEL")?)?))
        } else {
            Ok(None)
        }
    }

    /// One entry per line of the `RECORD` file, or `None` if there is no such
    /// file. The entries include the files of the `*.dist-info` directory.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    fn get_record(&self) -> DistributionResult<Option<Vec<RecordEntry>>> {
        if self.has_file("RECORD") {
            let content = self.read_file("RECORD")?;
            Ok(Some(record::parse(&content, self.files_root())?))
        } else {
            Ok(None)
        }
    }
}

//================================================================================================
// Impls
//================================================================================================

impl DistInfo {
    /// Creates a distribution from its parts.
    pub fn new(name: impl Into<String>, version: Version, path: impl Into<PathBuf>) -> Self {
        DistInfo {
            name: name.into(),
            version,
            path: path.into(),
        }
    }

    /// Decodes the name and version from a `{name}-{version}.dist-info`
    /// directory path.
    ///
    /// # Errors
    ///
    /// Fails if the directory name starts with `~`, has no `-`, or if the
    /// version is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> DistributionResult<Self> {
        let path = path.as_ref();
        if path.file_name().is_some_and(|f| f.to_string_lossy().starts_with('~')) {
            return Err(DistributionError::TemporaryDirectory(path.to_owned()));
        }
        let (name, version) =
            split_dist_info(path).ok_or_else(|| DistributionError::InvalidName(path.to_owned()))?;
        Ok(DistInfo::new(name, version::parse(version)?, path))
    }

    /// The path of the `*.dist-info` directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Distribution for DistInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn read_file(&self, filename: &str) -> DistributionResult<String> {
        std::fs::read_to_string(self.path.join(filename)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DistributionError::NotFound(filename.to_owned()),
            _ => e.into(),
        })
    }

    fn has_file(&self, filename: &str) -> bool {
        self.path.join(filename).is_file()
    }

    fn files_root(&self) -> Option<&Path> {
        self.path.parent()
    }
}

impl WheelDistribution {
    /// Opens the wheel at `path`, decoding the name and version from its
    /// filename.
    ///
    /// # Errors
    ///
    /// Fails if the filename is not a valid wheel filename, or the file is not
    /// a readable zip archive.
    pub fn open(path: impl AsRef<Path>) -> DistributionResult<Self> {
        let path = path.as_ref();
        let filename = names::parse_wheel_filename(path)?;
        let mut archive = ZipArchive::new(File::open(path)?)?;

        let members = (0..archive.len())
            .map(|i| archive.by_index_raw(i).map(|f| f.name().to_owned()))
            .collect::<Result<Vec<_>, _>>()?;

        let dist_info = locate_dist_info(&filename.name, &filename.version, &members);
        tracing::debug!(wheel = %path.display(), %dist_info, "opened wheel");

        Ok(WheelDistribution {
            name: filename.name,
            version: filename.version,
            path: path.to_owned(),
            dist_info,
            members,
            archive: Mutex::new(archive),
        })
    }

    /// The path of the `.whl` file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The name of the `*.dist-info` directory inside the archive.
    pub fn dist_info(&self) -> &str {
        &self.dist_info
    }

    /// The names of every member of the archive, in archive order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Closes the underlying archive.
    pub fn close(self) {
        tracing::trace!(wheel = %self.path.display(), "closing wheel");
    }

    fn member(&self, filename: &str) -> String {
        format!("{}/{filename}", self.dist_info)
    }
}

impl Distribution for WheelDistribution {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn read_file(&self, filename: &str) -> DistributionResult<String> {
        let mut archive = self.archive.lock();
        let mut file = archive.by_name(&self.member(filename)).map_err(|e| match e {
            ZipError::FileNotFound => DistributionError::NotFound(filename.to_owned()),
            e => e.into(),
        })?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content)
    }

    fn has_file(&self, filename: &str) -> bool {
        let member = self.member(filename);
        self.members.iter().any(|m| *m == member)
    }

    fn get_wheel(&self) -> DistributionResult<Option<FieldMap>> {
        Ok(Some(wheel::loads(&self.read_file("WHEEL")?)?))
    }

    fn get_record(&self) -> DistributionResult<Option<Vec<RecordEntry>>> {
        Ok(Some(record::parse(&self.read_file("RECORD")?, None)?))
    }
}

impl fmt::Debug for WheelDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WheelDistribution")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("path", &self.path)
            .field("dist_info", &self.dist_info)
            .finish_non_exhaustive()
    }
}

impl Iterator for Distributions {
    type Item = DistInfo;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(subdir) = self.pending.next() else {
                let dir = self.dirs.next()?;
                self.pending = scan_dir(&dir).into_iter();
                continue;
            };

            let distro = match DistInfo::from_path(&subdir) {
                Ok(distro) => distro,
                Err(e) => {
                    tracing::warn!(path = %subdir.display(), error = %e, "skipping distribution");
                    continue;
                },
            };

            if self.seen.insert(names::canonicalize(&distro.name)) {
                return Some(distro);
            }
            tracing::debug!(name = %distro.name, path = %subdir.display(), "shadowed distribution");
        }
    }
}

//================================================================================================
// Functions
//================================================================================================

/// Returns an iterator over the distributions installed in `paths`.
///
/// Directories which do not exist are ignored.
pub fn iter_distributions<P: AsRef<Path>>(paths: &[P]) -> Distributions {
    Distributions {
        dirs: paths
            .iter()
            .map(|p| p.as_ref().to_owned())
            .collect::<Vec<_>>()
            .into_iter(),
        pending: Vec::new().into_iter(),
        seen: HashSet::new(),
    }
}

/// Returns the first distribution in `paths` whose canonical name matches
/// that of `name`.
///
/// # Errors
///
/// Returns [`DistributionError::DistributionNotFound`] if there is none.
pub fn get_distribution<P: AsRef<Path>>(name: &str, paths: &[P]) -> DistributionResult<DistInfo> {
    let wanted = names::canonicalize(name);
    iter_distributions(paths)
        .find(|distro| names::canonicalize(&distro.name) == wanted)
        .ok_or_else(|| DistributionError::DistributionNotFound(name.to_owned()))
}

/// Lists the `*.dist-info` subdirectories of `dir`, sorted by name.
fn scan_dir(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "cannot scan directory");
            return Vec::new();
        },
    };

    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.ends_with(DIST_INFO) && !name.starts_with('~')
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    found.sort();

    tracing::debug!(path = %dir.display(), found = found.len(), "scanned directory");
    found
}

/// Splits `{name}-{version}.dist-info` on the last `-`.
fn split_dist_info(path: &Path) -> Option<(&str, &str)> {
    path.file_name()?
        .to_str()?
        .strip_suffix(DIST_INFO)?
        .rsplit_once('-')
}

/// Picks the `*.dist-info` directory of a wheel.
///
/// The conventional `{name}-{version}.dist-info` is preferred; otherwise the
/// first directory in archive order whose canonical name and version match.
fn locate_dist_info(name: &str, version: &Version, members: &[String]) -> String {
    let expected = format!("{name}-{version}{DIST_INFO}");
    let prefix = format!("{expected}/");
    if members.iter().any(|m| m.starts_with(&prefix)) {
        return expected;
    }

    let canonical = names::canonicalize(name);
    members
        .iter()
        .filter_map(|m| m.split_once('/').map(|(top, _)| top))
        .find(|top| {
            split_dist_info(Path::new(top)).is_some_and(|(n, v)| {
                names::canonicalize(n) == canonical
                    && version::parse(v).is_ok_and(|v| v == *version)
            })
        })
        .map_or(expected, str::to_owned)
}
