//! # WHEEL Files
//!
//! Parse and create `*.dist-info/WHEEL` files.
//!
//! Unlike `METADATA`, a `WHEEL` file has no folded lines and no body; it is a
//! flat list of `Name: value` lines:
//!
//! ```text
//! Wheel-Version: 1.0
//! Generator: bdist_wheel (0.36.2)
//! Root-Is-Purelib: true
//! Tag: py3-none-any
//! ```
//!
//! [`dumps`] accepts anything implementing [`WheelSource`]: a parsed
//! [`FieldMap`], or the typed [`WheelInfo`] for callers building a file from
//! scratch.

#[cfg(test)]
mod tests;

use std::path::Path;

use thiserror::Error;

use crate::fields::{Emitter, FieldMap, split_lines};

//================================================================================================
// Types
//================================================================================================

/// Errors that can occur when parsing or emitting a `WHEEL` file.
#[derive(Error, Debug)]
pub enum WheelError {
    /// A required field is missing.
    #[error("No '{0}' field was provided.")]
    MissingField(&'static str),
    /// A line has no `:` separator.
    #[error("malformed WHEEL line: {0:?}")]
    MalformedLine(String),
    /// `Root-Is-Purelib` is not a recognised boolean.
    #[error("invalid truth value {0:?}")]
    InvalidBoolean(String),
    /// `Wheel-Version` is not a number.
    #[error("invalid Wheel-Version: {0:?}")]
    InvalidWheelVersion(String),
    /// The file could not be read or written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized result type for `WHEEL` operations.
pub type WheelResult<T> = Result<T, WheelError>;

/// The typed content of a `WHEEL` file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WheelInfo {
    /// The version of the wheel specification, e.g. `1.0`.
    pub wheel_version: String,
    /// The tool which built the wheel.
    pub generator: Option<String>,
    /// Whether the wheel's root is installed into `purelib`.
    pub root_is_purelib: bool,
    /// The compatibility tags of the wheel.
    pub tags: Vec<String>,
    /// An optional build number.
    pub build: Option<String>,
}

//================================================================================================
// Traits
//================================================================================================

/// A source of `WHEEL` fields for [`dumps`].
pub trait WheelSource {
    /// The raw `Wheel-Version` value, if present.
    fn wheel_version(&self) -> Option<&str>;
    /// The `Generator` value, if present.
    fn generator(&self) -> Option<&str>;
    /// The `Root-Is-Purelib` flag, defaulting to `false`.
    ///
    /// # Errors
    ///
    /// Fails if the value is a string which is not a recognised boolean.
    fn root_is_purelib(&self) -> WheelResult<bool>;
    /// Every `Tag` value, in order.
    fn tags(&self) -> Vec<&str>;
    /// The `Build` value, if present.
    fn build(&self) -> Option<&str>;
}

//================================================================================================
// Impls
//================================================================================================

impl WheelSource for FieldMap {
    fn wheel_version(&self) -> Option<&str> {
        self.get("Wheel-Version")
    }

    fn generator(&self) -> Option<&str> {
        self.get("Generator")
    }

    fn root_is_purelib(&self) -> WheelResult<bool> {
        self.get("Root-Is-Purelib").map_or(Ok(false), strtobool)
    }

    fn tags(&self) -> Vec<&str> {
        self.get_all_or("Tag", Vec::new())
    }

    fn build(&self) -> Option<&str> {
        self.get("Build")
    }
}

impl WheelSource for WheelInfo {
    fn wheel_version(&self) -> Option<&str> {
        Some(&self.wheel_version)
    }

    fn generator(&self) -> Option<&str> {
        self.generator.as_deref()
    }

    fn root_is_purelib(&self) -> WheelResult<bool> {
        Ok(self.root_is_purelib)
    }

    fn tags(&self) -> Vec<&str> {
        self.tags.iter().map(String::as_str).collect()
    }

    fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }
}

impl TryFrom<&FieldMap> for WheelInfo {
    type Error = WheelError;

    fn try_from(fields: &FieldMap) -> Result<Self, Self::Error> {
        Ok(WheelInfo {
            wheel_version: fields
                .wheel_version()
                .ok_or(WheelError::MissingField("Wheel-Version"))?
                .to_owned(),
            generator: fields.generator().map(str::to_owned),
            root_is_purelib: fields.root_is_purelib()?,
            tags: fields.tags().into_iter().map(str::to_owned).collect(),
            build: fields.build().map(str::to_owned),
        })
    }
}

//================================================================================================
// Functions
//================================================================================================

/// Parse a `WHEEL` file from the given string.
///
/// # Errors
///
/// Fails if a line has no `:` separator or if `Wheel-Version` is missing.
pub fn loads(rawtext: &str) -> WheelResult<FieldMap> {
    let mut fields = FieldMap::new();

    for line in split_lines(rawtext).filter(|l| !l.trim().is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| WheelError::MalformedLine(line.to_owned()))?;
        fields.set(name, value.trim_start());
    }

    if !fields.contains("Wheel-Version") {
        return Err(WheelError::MissingField("Wheel-Version"));
    }

    Ok(fields)
}

/// Parse a `WHEEL` file from the given file.
///
/// # Errors
///
/// Fails if the file cannot be read, or for any reason given by [`loads`].
pub fn load(filename: impl AsRef<Path>) -> WheelResult<FieldMap> {
    loads(&std::fs::read_to_string(filename)?)
}

/// Construct a `WHEEL` file from the given fields.
///
/// # Errors
///
/// Fails if `Wheel-Version` is missing or not a number, or if
/// `Root-Is-Purelib` is not a recognised boolean.
pub fn dumps(fields: &impl WheelSource) -> WheelResult<String> {
    let mut output = Emitter::empty();

    let raw_version = fields
        .wheel_version()
        .ok_or(WheelError::MissingField("Wheel-Version"))?;
    output.push(format!("Wheel-Version: {}", format_float(raw_version)?));

    if let Some(generator) = fields.generator() {
        output.push(format!("Generator: {generator}"));
    }

    output.push(format!("Root-Is-Purelib: {}", fields.root_is_purelib()?));

    for tag in fields.tags() {
        output.push(format!("Tag: {tag}"));
    }

    if let Some(build) = fields.build() {
        output.push(format!("Build: {build}"));
    }

    Ok(output.finish())
}

/// Construct a `WHEEL` file from the given fields and write it to `filename`.
///
/// # Errors
///
/// Fails for any reason given by [`dumps`], or if the file cannot be written.
pub fn dump(fields: &impl WheelSource, filename: impl AsRef<Path>) -> WheelResult<usize> {
    let content = dumps(fields)?;
    std::fs::write(filename, &content)?;
    Ok(content.len())
}

/// Parse a generator string into its name and version.
///
/// Common forms include `name (version)`, `name version` and `name`.
pub fn parse_generator_string(generator: &str) -> (&str, Option<&str>) {
    let generator = generator.trim_end();

    match generator.split_once(' ') {
        None => (generator, None),
        Some((name, version)) => (
            name,
            Some(version.trim_start_matches('(').trim_end_matches(')')),
        ),
    }
}

/// Interprets the common spellings of a boolean.
fn strtobool(value: &str) -> WheelResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => Err(WheelError::InvalidBoolean(value.to_owned())),
    }
}

/// Renders a version number the way a float is rendered, with at least one
/// fractional digit (`1` becomes `1.0`).
fn format_float(raw: &str) -> WheelResult<String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| WheelError::InvalidWheelVersion(raw.to_owned()))?;

    if !value.is_finite() {
        return Err(WheelError::InvalidWheelVersion(raw.to_owned()));
    }

    if value.fract() == 0.0 {
        Ok(format!("{value:.1}"))
    } else {
        Ok(value.to_string())
    }
}
