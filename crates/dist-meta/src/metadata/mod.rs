//! # Core Metadata
//!
//! Parse and create `*.dist-info/METADATA` files.
//!
//! The format is a list of RFC 5322-style header fields, optionally followed
//! by a blank line and a free-form body holding the long description:
//!
//! ```text
//! Metadata-Version: 2.1
//! Name: cawdrey
//! Version: 0.4.2
//! Platform: Windows
//! Platform: macOS
//!
//! The long description.
//! ```
//!
//! Long values may be folded onto continuation lines starting with a space or
//! a tab. The `Description` field is special: older tools emit the long
//! description as a folded header, indenting continuation lines with
//! spaces, tabs or `|` characters, and [`loads`] undoes all three conventions.
//!
//! [`dumps`] is schema driven: fields are written in a fixed order and fields
//! outside the known schema are dropped.

#[cfg(test)]
mod tests;

use std::path::Path;

use thiserror::Error;

use crate::fields::{Emitter, FieldMap, eq_ignore_case};

//================================================================================================
// Statics
//================================================================================================

const DELIMITER: &str = "\n\n";
/// Marks an unfolded line break inside a field value until the field is assigned.
const NEWLINE_MARK: char = '\u{f8ff}';
const REQUIRED: [&str; 3] = ["Metadata-Version", "Name", "Version"];

//================================================================================================
// Types
//================================================================================================

/// Errors that can occur when parsing or emitting core metadata.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A required field is missing.
    #[error("No '{0}' field was provided.")]
    MissingField(&'static str),
    /// The description was given both as a field and as the body of the file.
    #[error("A value was given for the 'Description' field but the body of the file is not empty.")]
    ConflictingDescription,
    /// Emission only supports metadata version 2.1 and above.
    #[error("'dumps' only supports metadata version 2.1 and above, got {0}")]
    UnsupportedVersion(String),
    /// The `Metadata-Version` field is not a number.
    #[error("invalid Metadata-Version: {0:?}")]
    InvalidMetadataVersion(String),
    /// A header line has no `:` separator.
    #[error("malformed metadata line: {0:?}")]
    MalformedLine(String),
    /// The file could not be read or written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

//================================================================================================
// Functions
//================================================================================================

/// Parse core metadata from the given string.
///
/// The long description, whether given as a folded `Description` field or as
/// the body of the file, is stored under the `Description` field with a single
/// trailing newline.
///
/// # Errors
///
/// Fails if a header line is malformed, if the description is given twice, or
/// if `Metadata-Version`, `Name` or `Version` is missing.
pub fn loads(rawtext: &str) -> MetadataResult<FieldMap> {
    let rawtext = rawtext.replace("\r\n", "\n");

    let (header, body) = rawtext.split_once(DELIMITER).unwrap_or((rawtext.as_str(), ""));

    // unfold per RFC 5322 § 2.2.3
    let header = header
        .replace("\n\t", &format!("{NEWLINE_MARK}\t"))
        .replace("\n ", &format!("{NEWLINE_MARK} "));

    let mut fields = FieldMap::new();

    for line in header.split('\n').filter(|l| !l.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| MetadataError::MalformedLine(line.replace(NEWLINE_MARK, "\n")))?;

        if eq_ignore_case(name, "description") {
            fields.set("Description", unfold_description(value));
        } else {
            fields.set(name, value.replace(NEWLINE_MARK, "").trim_start());
        }
    }

    if !body.trim().is_empty() {
        if fields.contains("Description") {
            return Err(MetadataError::ConflictingDescription);
        }
        fields.set("Description", format!("{}\n", body.trim()));
    }

    for required in REQUIRED {
        if !fields.contains(required) {
            return Err(MetadataError::MissingField(required));
        }
    }

    tracing::trace!(fields = fields.len(), "parsed core metadata");
    Ok(fields)
}

/// Parse core metadata from the given file.
///
/// # Errors
///
/// Fails if the file cannot be read, or for any reason given by [`loads`].
pub fn load(filename: impl AsRef<Path>) -> MetadataResult<FieldMap> {
    loads(&std::fs::read_to_string(filename)?)
}

/// Construct core metadata from the given fields.
///
/// # Errors
///
/// Fails if a required field is missing, or if `Metadata-Version` is not a
/// number or is lower than 2.1.
pub fn dumps(fields: &FieldMap) -> MetadataResult<String> {
    let mut output = Emitter::new(fields);

    let raw_version = fields
        .get("Metadata-Version")
        .ok_or(MetadataError::MissingField("Metadata-Version"))?;
    let version: f64 = raw_version
        .trim()
        .parse()
        .map_err(|_| MetadataError::InvalidMetadataVersion(raw_version.to_owned()))?;

    if version < 2.1 {
        return Err(MetadataError::UnsupportedVersion(raw_version.to_owned()));
    }

    for required in REQUIRED {
        if !fields.contains(required) {
            return Err(MetadataError::MissingField(required));
        }
    }

    output.add_single("Metadata-Version");

    if version >= 2.2 {
        output.add_multiple("Dynamic");
    }

    output.add_single("Name");
    output.add_single("Version");

    // General Meta
    output.add_single("Summary");
    output.add_single("Author");
    output.add_single("Author-email");
    output.add_single("Maintainer");
    output.add_single("Maintainer-email");
    output.add_single("License");
    output.add_single("License-Expression");
    output.add_multiple("License-File");
    output.add_single("Keywords");

    // URLs
    output.add_single("Home-page");
    output.add_single("Download-URL");
    output.add_multiple("Project-URL");

    // Platforms
    output.add_multiple("Platform");
    output.add_multiple("Supported-Platform");
    output.add_multiple("Classifier");

    // Requirements
    output.add_single("Requires-Python");
    output.add_multiple("Requires-Dist");
    output.add_multiple("Provides-Extra");
    output.add_multiple("Requires-External");
    output.add_multiple("Provides-Dist");
    output.add_multiple("Obsoletes-Dist");

    // Description
    output.add_single("Description-Content-Type");

    if let Some(description) = fields.get("Description") {
        output.add_body(description);
    }

    Ok(output.finish())
}

/// Construct core metadata from the given fields and write it to `filename`.
///
/// Nothing is written if the fields cannot be emitted.
///
/// # Errors
///
/// Fails for any reason given by [`dumps`], or if the file cannot be written.
pub fn dump(fields: &FieldMap, filename: impl AsRef<Path>) -> MetadataResult<usize> {
    let content = dumps(fields)?;
    std::fs::write(filename, &content)?;
    Ok(content.len())
}

/// Folds a long description into the value of a `Description` header field.
///
/// Every line after the first is prefixed with `indent`, which must start with
/// a space or a tab for the result to parse as a continuation. This is the
/// inverse of the unfolding applied by [`loads`] for a single indentation
/// convention.
pub fn fold_description(description: &str, indent: &str) -> String {
    let mut lines = description.trim_end().split('\n');
    let mut folded = lines.next().unwrap_or_default().to_owned();
    for line in lines {
        folded.push('\n');
        folded.push_str(indent);
        folded.push_str(line);
    }
    folded
}

/// Recovers the original text of a folded `Description` field.
fn unfold_description(value: &str) -> String {
    let mut lines: Vec<String> = value.split(NEWLINE_MARK).map(str::to_owned).collect();

    for wsp in [' ', '\t', '|'] {
        clean_desc(&mut lines, wsp);
    }

    format!("{}\n", lines.join("\n").trim())
}

/// Strips the common `wsp` indentation from all lines after the first.
///
/// The first line is only dedented if it carries the same indentation.
pub(crate) fn clean_desc(lines: &mut [String], wsp: char) {
    let Some((first, rest)) = lines.split_first_mut() else {
        return;
    };

    let margin = rest
        .iter()
        .filter_map(|line| {
            let content = line.trim_start_matches(wsp).chars().count();
            (content > 0).then(|| line.chars().count() - content)
        })
        .min();

    let Some(margin) = margin else {
        return;
    };

    if first.chars().take(margin).filter(|&c| c == wsp).count() == margin {
        *first = skip_chars(first, margin);
    }

    for line in rest {
        *line = skip_chars(line, margin);
    }
}

fn skip_chars(s: &str, n: usize) -> String {
    s.char_indices()
        .nth(n)
        .map_or_else(String::new, |(i, _)| s[i..].to_owned())
}
