use super::*;

fn cawdrey() -> FieldMap {
    [
        ("Metadata-Version", "2.1"),
        ("Name", "cawdrey"),
        ("Version", "0.4.2"),
        ("Platform", "Windows"),
        ("Platform", "macOS"),
        ("Platform", "Linux"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn duplicates_preserved() {
    let mut fields = FieldMap::new();
    fields.set("Requires-Dist", "a");
    fields.set("requires-dist", "b");
    fields.set("REQUIRES-DIST", "c");

    assert_eq!(fields.len(), 3);
    assert_eq!(fields.get_all("Requires-Dist"), Some(vec!["a", "b", "c"]));
    assert_eq!(fields.get("requires-DIST"), Some("a"));

    fields.set("Summary", "x");
    fields.delete("Requires-Dist");
    assert!(!fields.contains("requires-dist"));
    assert_eq!(fields.len(), 1);

    fields.set("Requires-Dist", "d");
    assert_eq!(fields.keys(), vec!["Summary", "Requires-Dist"]);
}

#[test]
fn reinserted_fields_append() {
    let mut fields = cawdrey();
    fields.delete("Name");
    fields.set("Name", "Cawdrey");
    assert_eq!(
        fields.keys(),
        vec!["Metadata-Version", "Version", "Platform", "Platform", "Platform", "Name"]
    );
}

#[test]
fn missing_fields() {
    let mut fields = cawdrey();
    assert_eq!(fields.get("Summary"), None);
    assert_eq!(fields.get_or("Summary", "n/a"), "n/a");
    assert_eq!(fields.get_all("Classifier"), None);
    assert_eq!(fields.get_all_or("Classifier", vec![]), Vec::<&str>::new());
    assert!(!fields.contains("Summary"));

    // deleting an absent field is not an error
    fields.delete("Summary");
    assert_eq!(fields.len(), 6);
}

#[test]
fn replace_keeps_position_and_case() {
    let mut fields = cawdrey();
    fields.replace("PLATFORM", "FreeBSD").unwrap();

    assert_eq!(fields.items()[3], ("Platform", "FreeBSD"));
    assert_eq!(fields.get_all("platform"), Some(vec!["FreeBSD", "macOS", "Linux"]));
    assert_eq!(
        fields.replace("Summary", "nope"),
        Err(FieldError::KeyNotFound("Summary".into()))
    );
}

#[test]
fn keys_values_items() {
    let fields = cawdrey();
    assert_eq!(
        fields.values(),
        vec!["2.1", "cawdrey", "0.4.2", "Windows", "macOS", "Linux"]
    );
    assert_eq!(fields.items().len(), fields.len());
    assert_eq!(fields.iter().next(), Some(("Metadata-Version", "2.1")));
}

#[test]
fn display() {
    let fields: FieldMap = [("Name", "foo"), ("Version", "1.0")].into_iter().collect();
    assert_eq!(fields.to_string(), r#"{"Name": "foo", "Version": "1.0"}"#);
    assert_eq!(
        format!("{fields:?}"),
        r#"FieldMap({"Name": "foo", "Version": "1.0"})"#
    );
}

#[test]
fn unicode_names_compare_case_insensitively() {
    let mut fields = FieldMap::new();
    fields.set("Ünïcode", "1");
    assert!(fields.contains("üNÏCODE"));
}

#[test]
fn emitter_blank_lines() {
    let fields = cawdrey();
    let mut out = Emitter::new(&fields);
    out.add_single("Name");
    out.add_multiple("Platform");
    out.add_single("Summary");
    out.blankline(false);
    out.blankline(false);
    out.blankline(true);
    out.push("body\n  \nend");
    out.blankline(true);

    insta::assert_snapshot!(out.finish(), @r"
    Name: cawdrey
    Platform: Windows
    Platform: macOS
    Platform: Linux

    body

    end
    ");
}

#[test]
fn emitter_body() {
    let mut out = Emitter::empty();
    out.push("Header: value");
    out.add_body("Some text\n\n");
    assert_eq!(out.finish(), "Header: value\n\n\nSome text\n");
}

#[test]
fn values_outlive_the_lookup_name() {
    let fields = cawdrey();

    let platforms = {
        let name = String::from("platform");
        fields.get_all(&name)
    };
    let version = {
        let name = "VERSION".to_lowercase();
        fields.get(&name)
    };

    assert_eq!(platforms, Some(vec!["Windows", "macOS", "Linux"]));
    assert_eq!(version, Some("0.4.2"));
}

#[test]
fn split_lines_on_every_boundary() {
    let lines: Vec<_> = split_lines("a\r\nb\rc\n\nd\u{2028}e\r").collect();
    assert_eq!(lines, ["a", "b", "c", "", "d", "e"]);

    assert_eq!(split_lines("").count(), 0);
    assert_eq!(split_lines("\n").collect::<Vec<_>>(), [""]);
    assert_eq!(split_lines("no break").collect::<Vec<_>>(), ["no break"]);
}
