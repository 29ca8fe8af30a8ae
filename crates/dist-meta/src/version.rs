//! # Versions
//!
//! A parser for the version scheme used by Python distributions
//! ([PEP 440](https://peps.python.org/pep-0440/)).
//!
//! Versions are normalized on parse, so `1.0-RC.1` and `1.0rc1` are the same
//! version and both render as `1.0rc1`. Trailing zero release components are
//! insignificant for ordering and equality (`1.0 == 1.0.0`) but are kept when
//! rendering.
//!
//! Distribution directories and wheel filenames embed the *normalized* form,
//! which is what [`Version`]'s `Display` produces.


use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use lazy_regex::{Lazy, Regex};
use thiserror::Error;

use crate::cache::Memo;

//================================================================================================
// Statics
//================================================================================================

static VERSION_REGEX: Lazy<Regex> = lazy_regex::lazy_regex!(
    r"(?i)^\s*v?(?:(?:(?P<epoch>[0-9]+)!)?(?P<release>[0-9]+(?:\.[0-9]+)*)(?P<pre>[-_\.]?(?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)[-_\.]?(?P<pre_n>[0-9]+)?)?(?P<post>(?:-(?P<post_n1>[0-9]+))|(?:[-_\.]?(?P<post_l>post|rev|r)[-_\.]?(?P<post_n2>[0-9]+)?))?(?P<dev>[-_\.]?(?P<dev_l>dev)[-_\.]?(?P<dev_n>[0-9]+)?)?)(?:\+(?P<local>[a-z0-9]+(?:[-_\.][a-z0-9]+)*))?\s*$"
);

static PARSED: LazyLock<Memo<String, Version>> =
    LazyLock::new(|| Memo::new(config::CONFIG.cache));

//================================================================================================
// Types
//================================================================================================

/// An error raised for a string which is not a valid version.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The string does not follow the version scheme.
    #[error("Invalid version: '{0}'")]
    Invalid(String),
}

/// The kind of a pre-release, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    /// `a`, `alpha`
    Alpha,
    /// `b`, `beta`
    Beta,
    /// `rc`, `c`, `pre`, `preview`
    Candidate,
}

/// One dot-separated segment of a local version label.
///
/// Alphanumeric segments sort before numeric ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocalSegment {
    /// A segment containing letters.
    Str(String),
    /// A purely numeric segment.
    Num(u64),
}

/// A parsed and normalized version.
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<Vec<LocalSegment>>,
}

/// Where the pre-release component sorts relative to other versions with the
/// same release.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    /// A dev release without a pre-release sorts before every pre-release.
    DevOnly,
    Pre(PreRelease, u64),
    Final,
}

/// A missing dev component sorts after every dev release.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum DevKey {
    Dev(u64),
    Final,
}

//================================================================================================
// Impls
//================================================================================================

impl Version {
    /// The epoch, `0` unless given as `N!`.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The release components, e.g. `[1, 2, 0]` for `1.2.0`.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// The pre-release kind and number, if any.
    pub fn pre(&self) -> Option<(PreRelease, u64)> {
        self.pre
    }

    /// The post-release number, if any.
    pub fn post(&self) -> Option<u64> {
        self.post
    }

    /// The dev-release number, if any.
    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    /// The local version label, if any.
    pub fn local(&self) -> Option<&[LocalSegment]> {
        self.local.as_deref()
    }

    /// Whether this is a pre-release or a dev release.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// The release without trailing zeros, used for ordering and hashing.
    fn trimmed_release(&self) -> &[u64] {
        let len = self
            .release
            .iter()
            .rposition(|&n| n != 0)
            .map_or(0, |i| i + 1);
        &self.release[..len]
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOnly,
            (Some((kind, n)), ..) => PreKey::Pre(kind, n),
            (None, ..) => PreKey::Final,
        }
    }

    fn dev_key(&self) -> DevKey {
        self.dev.map_or(DevKey::Final, DevKey::Dev)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::Invalid(s.to_owned());
        let caps = VERSION_REGEX.captures(s).ok_or_else(invalid)?;
        let number = |name: &str| -> Result<Option<u64>, VersionError> {
            caps.name(name)
                .map(|m| m.as_str().parse().map_err(|_| invalid()))
                .transpose()
        };

        let release = caps
            .name("release")
            .ok_or_else(invalid)?
            .as_str()
            .split('.')
            .map(|n| n.parse().map_err(|_| invalid()))
            .collect::<Result<Vec<u64>, _>>()?;

        let pre = match caps.name("pre_l") {
            Some(label) => {
                let kind = match label.as_str().to_ascii_lowercase().as_str() {
                    "a" | "alpha" => PreRelease::Alpha,
                    "b" | "beta" => PreRelease::Beta,
                    _ => PreRelease::Candidate,
                };
                Some((kind, number("pre_n")?.unwrap_or(0)))
            },
            None => None,
        };

        let post = match (number("post_n1")?, caps.name("post_l")) {
            (Some(n), _) => Some(n),
            (None, Some(_)) => Some(number("post_n2")?.unwrap_or(0)),
            (None, None) => None,
        };

        let dev = match caps.name("dev_l") {
            Some(_) => Some(number("dev_n")?.unwrap_or(0)),
            None => None,
        };

        let local = caps.name("local").map(|m| {
            m.as_str()
                .split(['-', '_', '.'])
                .map(|seg| match seg.parse() {
                    Ok(n) if seg.bytes().all(|b| b.is_ascii_digit()) => LocalSegment::Num(n),
                    _ => LocalSegment::Str(seg.to_ascii_lowercase()),
                })
                .collect()
        });

        Ok(Version {
            epoch: number("epoch")?.unwrap_or(0),
            release,
            pre,
            post,
            dev,
            local,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }

        for (i, n) in self.release.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{n}")?;
        }

        if let Some((kind, n)) = self.pre {
            write!(f, "{kind}{n}")?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{n}")?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{n}")?;
        }

        if let Some(local) = &self.local {
            f.write_str("+")?;
            for (i, seg) in local.iter().enumerate() {
                if i > 0 {
                    f.write_str(".")?;
                }
                match seg {
                    LocalSegment::Str(s) => f.write_str(s)?,
                    LocalSegment::Num(n) => write!(f, "{n}")?,
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PreRelease::Alpha => "a",
            PreRelease::Beta => "b",
            PreRelease::Candidate => "rc",
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.trimmed_release().cmp(other.trimmed_release()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        self.trimmed_release().hash(state);
        self.pre.hash(state);
        self.post.hash(state);
        self.dev.hash(state);
        self.local.hash(state);
    }
}

//================================================================================================
// Functions
//================================================================================================

/// Parses a version, reusing the result of earlier calls for the same string.
///
/// # Errors
///
/// Fails if `version` does not follow the version scheme.
pub fn parse(version: &str) -> Result<Version, VersionError> {
    PARSED.get_or_try_insert_with(version.to_owned(), || version.parse())
}
