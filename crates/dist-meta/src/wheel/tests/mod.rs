use super::*;

const WHEEL: &str = "\
Wheel-Version: 1.0
Generator: bdist_wheel (0.36.2)
Root-Is-Purelib: true
Tag: py3-none-any
Tag: py2-none-any
";

#[test]
fn parse() -> anyhow::Result<()> {
    let fields = loads(WHEEL)?;
    assert_eq!(fields.get("Wheel-Version"), Some("1.0"));
    assert_eq!(fields.get("generator"), Some("bdist_wheel (0.36.2)"));
    assert_eq!(fields.get("Root-Is-Purelib"), Some("true"));
    assert_eq!(fields.get_all("Tag"), Some(vec!["py3-none-any", "py2-none-any"]));
    assert_eq!(fields.len(), 5);
    Ok(())
}

#[test]
fn parse_errors() {
    let res = loads("Generator: bdist_wheel (0.36.2)\nRoot-Is-Purelib: true\n");
    assert!(matches!(res, Err(WheelError::MissingField("Wheel-Version"))));

    let res = loads("Wheel-Version: 1.0\nnot a field\n");
    assert!(matches!(res, Err(WheelError::MalformedLine(l)) if l == "not a field"));
}

#[test]
fn blank_lines_are_skipped() -> anyhow::Result<()> {
    let fields = loads("\n\nWheel-Version: 1.0\n   \nTag: py3-none-any\n")?;
    assert_eq!(fields.keys(), vec!["Wheel-Version", "Tag"]);
    Ok(())
}

#[test]
fn any_line_ending() -> anyhow::Result<()> {
    let fields = loads("Wheel-Version: 1.0\rGenerator: x\rTag: py3-none-any\r")?;
    assert_eq!(fields.keys(), vec!["Wheel-Version", "Generator", "Tag"]);
    assert_eq!(fields.get("Generator"), Some("x"));

    let fields = loads("Wheel-Version: 1.0\r\nTag: py3-none-any\r\n")?;
    assert_eq!(fields.get("Wheel-Version"), Some("1.0"));
    assert_eq!(fields.get("Tag"), Some("py3-none-any"));
    Ok(())
}

#[test]
fn dumps_fieldmap() -> anyhow::Result<()> {
    let mut fields = loads(WHEEL)?;
    fields.set("Build", "1");

    insta::assert_snapshot!(dumps(&fields)?, @r"
    Wheel-Version: 1.0
    Generator: bdist_wheel (0.36.2)
    Root-Is-Purelib: true
    Tag: py3-none-any
    Tag: py2-none-any
    Build: 1
    ");
    Ok(())
}

#[test]
fn dumps_typed() -> anyhow::Result<()> {
    let info = WheelInfo {
        wheel_version: "1".into(),
        generator: Some("whey (0.0.17)".into()),
        root_is_purelib: false,
        tags: vec!["py3-none-any".into()],
        build: None,
    };

    assert_eq!(
        dumps(&info)?,
        "Wheel-Version: 1.0\nGenerator: whey (0.0.17)\nRoot-Is-Purelib: false\nTag: py3-none-any"
    );
    Ok(())
}

#[test]
fn purelib_defaults_and_spellings() -> anyhow::Result<()> {
    let fields: FieldMap = [("Wheel-Version", "1.5")].into_iter().collect();
    assert_eq!(dumps(&fields)?, "Wheel-Version: 1.5\nRoot-Is-Purelib: false");

    for (raw, expected) in [("Yes", true), ("on", true), ("1", true), ("OFF", false), ("n", false)] {
        let fields: FieldMap = [("Wheel-Version", "1.0"), ("Root-Is-Purelib", raw)]
            .into_iter()
            .collect();
        assert_eq!(fields.root_is_purelib()?, expected, "{raw}");
    }

    let fields: FieldMap = [("Wheel-Version", "1.0"), ("Root-Is-Purelib", "maybe")]
        .into_iter()
        .collect();
    assert!(matches!(dumps(&fields), Err(WheelError::InvalidBoolean(v)) if v == "maybe"));
    Ok(())
}

#[test]
fn dumps_errors() {
    let fields: FieldMap = [("Generator", "whey")].into_iter().collect();
    assert!(matches!(dumps(&fields), Err(WheelError::MissingField("Wheel-Version"))));

    let fields: FieldMap = [("Wheel-Version", "one")].into_iter().collect();
    assert!(matches!(dumps(&fields), Err(WheelError::InvalidWheelVersion(_))));
}

#[test]
fn typed_from_fields() -> anyhow::Result<()> {
    let info = WheelInfo::try_from(&loads(WHEEL)?)?;
    assert_eq!(info.wheel_version, "1.0");
    assert!(info.root_is_purelib);
    assert_eq!(info.tags, vec!["py3-none-any", "py2-none-any"]);
    assert_eq!(info.build, None);
    Ok(())
}

#[test]
fn generator_strings() {
    assert_eq!(
        parse_generator_string("bdist_wheel (0.36.2)"),
        ("bdist_wheel", Some("0.36.2"))
    );
    assert_eq!(parse_generator_string("whey 0.0.17"), ("whey", Some("0.0.17")));
    assert_eq!(parse_generator_string("flit  "), ("flit", None));
}

#[test]
fn dump_and_load_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("WHEEL");

    let fields = loads(WHEEL)?;
    let written = dump(&fields, &path)?;
    assert_eq!(written, std::fs::read_to_string(&path)?.len());
    assert_eq!(load(&path)?, fields);
    Ok(())
}
