//! # Dist-Meta Crate
//!
//! The `dist-meta` crate parses and writes the metadata files which describe
//! an installed or packaged Python distribution, and locates those
//! distributions on disk.
//!
//! ## Key Concepts
//!
//! A **distribution** is described by the files of its `*.dist-info`
//! directory:
//! - `METADATA` - the core metadata, an email-style header block with an
//!   optional long description as its body.
//! - `WHEEL` - information about the wheel the distribution was installed from.
//! - `entry_points.txt` - an INI-style registry of named references into the
//!   distribution's code.
//! - `RECORD` - a CSV listing of every installed file with its hash and size.
//!
//! Header-style files decode into a [`FieldMap`], an ordered list of fields
//! with case-insensitive lookup which keeps repeated fields.
//!
//! ## Architecture
//!
//! - [`fields`] - The ordered field map and the line emitter used by every writer.
//! - [`metadata`] - Reading and writing `METADATA` files.
//! - [`wheel`] - Reading and writing `WHEEL` files.
//! - [`entry_points`] - Reading and writing `entry_points.txt`, eagerly or lazily.
//! - [`record`] - Reading and writing `RECORD` files, and verifying installed files.
//! - [`distributions`] - Installed and archived distributions, and scanning for them.
//! - [`names`] and [`version`] - Name canonicalization and version parsing.
//! - [`cache`] - The bounded memoization shared by the parsers.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use dist_meta::{Distribution, distributions};
//!
//! let paths = ["/usr/lib/python3/dist-packages"];
//! for distro in distributions::iter_distributions(&paths) {
//!     let metadata = distro.get_metadata().unwrap();
//!     println!("{} {}", distro.name(), metadata.get_or("Summary", ""));
//! }
//! ```
//!
//! ## Configuration
//!
//! Memoization can be disabled process-wide with `DIST_META_CACHE=0`, or in
//! the `cache` key of the configuration file.

#![warn(missing_docs)]

pub use self::distributions::{DistInfo, Distribution, DistributionError, WheelDistribution};
pub use self::entry_points::{EntryPoint, EntryPointMap};
pub use self::fields::FieldMap;
pub use self::record::{FileHash, RecordEntry};
pub use self::version::Version;
pub use self::wheel::WheelInfo;

pub mod cache;
pub mod distributions;
pub mod entry_points;
pub mod fields;
pub mod log;
pub mod metadata;
pub mod names;
pub mod record;
pub mod version;
pub mod wheel;
