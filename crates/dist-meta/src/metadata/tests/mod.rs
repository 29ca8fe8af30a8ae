//! Tests for `METADATA` parsing and emission, covering header unfolding, the
//! three description indentation conventions and the schema-driven writer.

use super::*;

const CAWDREY: &str = "\
Metadata-Version: 2.1
Name: cawdrey
Version: 0.4.2
Summary: Several useful custom dictionaries for Python 📖 🐍
Home-page: https://github.com/domdfcoding/cawdrey
Author: Dominic Davis-Foster
Author-email: dominic@davis-foster.co.uk
License: GNU Lesser General Public License v3 or later (LGPLv3+)
Project-URL: Documentation, https://cawdrey.readthedocs.io/en/latest
Project-URL: Issue Tracker, https://github.com/domdfcoding/cawdrey/issues
Keywords: frozenordereddict,orderedfrozendict,frozen
Platform: Windows
Platform: macOS
Platform: Linux
Requires-Python: >=3.6.1
Description-Content-Type: text/x-rst
Requires-Dist: domdf-python-tools (>=1.1.0)
Requires-Dist: typing-extensions (>=3.7.4.3)
Provides-Extra: all
X-Custom: kept by the parser

Cawdrey
=======

Several useful custom dictionaries.
";

fn minimal() -> FieldMap {
    [
        ("Metadata-Version", "2.1"),
        ("Name", "cawdrey"),
        ("Version", "0.4.2"),
        ("Home-page", "https://github.com/domdfcoding/cawdrey"),
        ("Platform", "Windows"),
        ("Platform", "macOS"),
        ("Platform", "Linux"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn parse_full() -> anyhow::Result<()> {
    let fields = loads(CAWDREY)?;

    assert_eq!(fields.get("Name"), Some("cawdrey"));
    assert_eq!(fields.get("version"), Some("0.4.2"));
    assert_eq!(
        fields.get("Summary"),
        Some("Several useful custom dictionaries for Python 📖 🐍")
    );
    assert_eq!(
        fields.get_all("Project-URL"),
        Some(vec![
            "Documentation, https://cawdrey.readthedocs.io/en/latest",
            "Issue Tracker, https://github.com/domdfcoding/cawdrey/issues",
        ])
    );
    assert_eq!(fields.get_all("Platform"), Some(vec!["Windows", "macOS", "Linux"]));
    assert_eq!(fields.get("Provides-Extra"), Some("all"));
    assert_eq!(fields.get("X-Custom"), Some("kept by the parser"));
    assert_eq!(
        fields.get("Description"),
        Some("Cawdrey\n=======\n\nSeveral useful custom dictionaries.\n")
    );
    assert_eq!(fields.keys().last(), Some(&"Description"));
    Ok(())
}

#[test]
fn body_becomes_description() -> anyhow::Result<()> {
    let fields = loads("Metadata-Version: 2.1\nName: foo\nVersion: 1.0\n\nBody text\n")?;
    assert_eq!(fields.get("Description"), Some("Body text\n"));
    Ok(())
}

#[test]
fn crlf_line_endings() -> anyhow::Result<()> {
    let fields = loads("Metadata-Version: 2.1\r\nName: foo\r\nVersion: 1.0\r\n\r\nBody\r\n")?;
    assert_eq!(fields.get("Version"), Some("1.0"));
    assert_eq!(fields.get("Description"), Some("Body\n"));
    Ok(())
}

#[test]
fn folded_field_is_joined() -> anyhow::Result<()> {
    let fields = loads(
        "Metadata-Version: 2.1\nName: foo\nVersion: 1.0\nSummary: a long\n  summary\nLicense: MIT\n",
    )?;
    assert_eq!(fields.get("Summary"), Some("a long  summary"));
    assert_eq!(fields.get("License"), Some("MIT"));
    Ok(())
}

#[test]
fn description_space_indent() -> anyhow::Result<()> {
    let fields = loads(
        "Metadata-Version: 2.1\nName: foo\nVersion: 1.0\nDescription: First line\n        second\n          indented\n        \n        last\nKeywords: a\n",
    )?;
    assert_eq!(
        fields.get("Description"),
        Some("First line\nsecond\n  indented\n\nlast\n")
    );
    assert_eq!(fields.get("Keywords"), Some("a"));
    Ok(())
}

#[test]
fn description_tab_indent() -> anyhow::Result<()> {
    let fields = loads("Metadata-Version: 2.1\nName: foo\nVersion: 1.0\nDescription: Foo\n\tbar\n\t\tbaz\n")?;
    assert_eq!(fields.get("Description"), Some("Foo\nbar\n\tbaz\n"));
    Ok(())
}

#[test]
fn description_pipe_indent() -> anyhow::Result<()> {
    let fields = loads(
        "Metadata-Version: 2.1\nName: foo\nVersion: 1.0\nDescription: Foo\n       |\n       |  bar\n       |baz\n",
    )?;
    assert_eq!(fields.get("Description"), Some("Foo\n\n  bar\nbaz\n"));
    Ok(())
}

#[test]
fn fold_then_unfold_is_stable() -> anyhow::Result<()> {
    let folded = "Description: Foo\n        bar\n          baz\n        \n        end";
    let text = format!("Metadata-Version: 2.1\nName: foo\nVersion: 1.0\n{folded}\n");

    let description = loads(&text)?.get("Description").map(str::to_owned);
    let description = description.expect("description parsed");
    assert_eq!(description, "Foo\nbar\n  baz\n\nend\n");

    let refolded = format!("Description: {}", fold_description(&description, "        "));
    assert_eq!(refolded, folded);
    Ok(())
}

#[test]
fn conflicting_description() {
    let res = loads("Metadata-Version: 2.1\nName: foo\nVersion: 1.0\nDescription: inline\n\nbody\n");
    assert!(matches!(res, Err(MetadataError::ConflictingDescription)));
}

#[test]
fn blank_body_is_ignored() -> anyhow::Result<()> {
    let fields = loads("Metadata-Version: 2.1\nName: foo\nVersion: 1.0\nDescription: inline\n\n   \n")?;
    assert_eq!(fields.get("Description"), Some("inline\n"));
    Ok(())
}

#[test]
fn missing_required_fields() {
    let res = loads("Generator: bdist_wheel (0.36.2)\nName: cawdrey\nVersion: 0.4.2\n");
    assert!(matches!(res, Err(MetadataError::MissingField("Metadata-Version"))));
    assert_eq!(
        res.unwrap_err().to_string(),
        "No 'Metadata-Version' field was provided."
    );

    let res = loads("Metadata-Version: 2.1\nVersion: 0.4.2\n");
    assert!(matches!(res, Err(MetadataError::MissingField("Name"))));

    let res = loads("Metadata-Version: 2.1\nName: cawdrey\n");
    assert!(matches!(res, Err(MetadataError::MissingField("Version"))));
}

#[test]
fn malformed_line() {
    let res = loads("Metadata-Version: 2.1\nName: foo\nVersion: 1.0\nbogus\n");
    assert!(matches!(res, Err(MetadataError::MalformedLine(l)) if l == "bogus"));
}

#[test]
fn dumps_minimal() -> anyhow::Result<()> {
    insta::assert_snapshot!(dumps(&minimal())?, @r"
    Metadata-Version: 2.1
    Name: cawdrey
    Version: 0.4.2
    Home-page: https://github.com/domdfcoding/cawdrey
    Platform: Windows
    Platform: macOS
    Platform: Linux
    ");
    assert!(!dumps(&minimal())?.ends_with('\n'));
    Ok(())
}

#[test]
fn dumps_license_expression_file() -> anyhow::Result<()> {
    let mut fields = minimal();
    fields.set("License-Expression", "MIT OR Apache-2.0");
    fields.set("License-File", "LICENSE");
    fields.set("License-File", "COPYING");

    insta::assert_snapshot!(dumps(&fields)?, @r"
    Metadata-Version: 2.1
    Name: cawdrey
    Version: 0.4.2
    License-Expression: MIT OR Apache-2.0
    License-File: LICENSE
    License-File: COPYING
    Home-page: https://github.com/domdfcoding/cawdrey
    Platform: Windows
    Platform: macOS
    Platform: Linux
    ");
    Ok(())
}

#[test]
fn dumps_description() -> anyhow::Result<()> {
    let mut fields = minimal();
    fields.set(
        "Description",
        "This is the body\n\nIt can have multiple lines\n\t\tand indents",
    );

    assert_eq!(
        dumps(&fields)?,
        "Metadata-Version: 2.1\nName: cawdrey\nVersion: 0.4.2\nHome-page: https://github.com/domdfcoding/cawdrey\nPlatform: Windows\nPlatform: macOS\nPlatform: Linux\n\n\nThis is the body\n\nIt can have multiple lines\n\t\tand indents\n"
    );
    Ok(())
}

#[test]
fn dynamic_requires_2_2() -> anyhow::Result<()> {
    let mut fields: FieldMap = [
        ("Metadata-Version", "2.2"),
        ("Name", "foo"),
        ("Version", "1"),
        ("Dynamic", "Requires-Dist"),
        ("Dynamic", "Summary"),
    ]
    .into_iter()
    .collect();

    insta::assert_snapshot!(dumps(&fields)?, @r"
    Metadata-Version: 2.2
    Dynamic: Requires-Dist
    Dynamic: Summary
    Name: foo
    Version: 1
    ");

    fields.replace("Metadata-Version", "2.1")?;
    assert_eq!(dumps(&fields)?, "Metadata-Version: 2.1\nName: foo\nVersion: 1");
    Ok(())
}

#[test]
fn dumps_errors() {
    let mut fields = minimal();
    fields.replace("Metadata-Version", "1.1").unwrap();
    assert!(matches!(dumps(&fields), Err(MetadataError::UnsupportedVersion(v)) if v == "1.1"));

    fields.replace("Metadata-Version", "two").unwrap();
    assert!(matches!(dumps(&fields), Err(MetadataError::InvalidMetadataVersion(_))));

    fields.delete("Metadata-Version");
    assert!(matches!(dumps(&fields), Err(MetadataError::MissingField("Metadata-Version"))));

    let mut fields = minimal();
    fields.delete("Name");
    assert!(matches!(dumps(&fields), Err(MetadataError::MissingField("Name"))));

    let mut fields = minimal();
    fields.delete("Version");
    assert!(matches!(dumps(&fields), Err(MetadataError::MissingField("Version"))));
}

#[test]
fn round_trip_keeps_only_schema_fields() -> anyhow::Result<()> {
    let original = loads(CAWDREY)?;
    let reparsed = loads(&dumps(&original)?)?;

    assert!(!reparsed.contains("X-Custom"));
    for (name, value) in original.iter().filter(|(k, _)| *k != "X-Custom") {
        assert_eq!(
            reparsed.get_all(name),
            original.get_all(name),
            "field {name} with value {value:?} did not survive"
        );
    }
    assert_eq!(reparsed.len(), original.len() - 1);
    Ok(())
}

#[test]
fn dump_and_load_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("METADATA");

    let written = dump(&minimal(), &path)?;
    assert_eq!(written, std::fs::metadata(&path)?.len() as usize);
    assert_eq!(load(&path)?.get_all("Platform").map(|p| p.len()), Some(3));

    let mut fields = minimal();
    fields.delete("Metadata-Version");
    let other = dir.path().join("OTHER");
    assert!(dump(&fields, &other).is_err());
    assert!(!other.exists());
    Ok(())
}
