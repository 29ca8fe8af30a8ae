use std::fs;

use sha2::{Sha256, Sha512};

use super::*;

const EMPTY_SHA256: &str = "47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU";

#[test]
fn from_line() -> anyhow::Result<()> {
    let entry = RecordEntry::from_line(&format!("  foo/__init__.py,sha256={EMPTY_SHA256},0\n"), None)?;
    assert_eq!(entry.path(), "foo/__init__.py");
    assert_eq!(entry.file_name(), "__init__.py");
    assert_eq!(entry.hash, Some(FileHash::new("sha256", EMPTY_SHA256)));
    assert_eq!(entry.size, Some(0));
    assert!(entry.root().is_none());

    let entry = RecordEntry::from_line("foo-1.0.dist-info/RECORD,,", None)?;
    assert_eq!(entry.hash, None);
    assert_eq!(entry.size, None);
    assert_eq!(entry.as_line(), "foo-1.0.dist-info/RECORD,,");

    let entry = RecordEntry::from_line("foo/bar.py , sha256=abc , 12 ,extra", None)?;
    assert_eq!(entry.path(), "foo/bar.py");
    assert_eq!(entry.hash.as_ref().map(|h| h.value.as_str()), Some("abc"));
    assert_eq!(entry.size, Some(12));
    Ok(())
}

#[test]
fn quoted_fields() -> anyhow::Result<()> {
    let entry = RecordEntry::from_line(r#""foo/a,b.py",sha256=abc,3"#, None)?;
    assert_eq!(entry.path(), "foo/a,b.py");
    assert_eq!(entry.size, Some(3));

    let entry = RecordEntry::from_line(r#""say ""hi"".txt","",'"#, None);
    assert!(matches!(entry, Err(RecordError::InvalidSize(s)) if s == "'"));

    let entry = RecordEntry::from_line(r#""say ""hi"".txt",,"#, None)?;
    assert_eq!(entry.path(), r#"say "hi".txt"#);
    assert_eq!(entry.hash, None);
    Ok(())
}

#[test]
fn line_errors() {
    assert!(matches!(
        RecordEntry::from_line("a,b,c\nd,e,f", None),
        Err(RecordError::MultilineEntry)
    ));
    assert!(matches!(
        RecordEntry::from_line("a,b,c\rd,e,f", None),
        Err(RecordError::MultilineEntry)
    ));
    assert!(matches!(
        RecordEntry::from_line("   ", None),
        Err(RecordError::MultilineEntry)
    ));
    assert!(matches!(
        RecordEntry::from_line("foo.py,sha256=abc", None),
        Err(RecordError::TooFewFields(2))
    ));
    assert!(matches!(
        RecordEntry::from_line("foo.py,,ten", None),
        Err(RecordError::InvalidSize(s)) if s == "ten"
    ));
    assert!(matches!(
        RecordEntry::from_line("/usr/lib/foo.py,,", None),
        Err(RecordError::InvalidPath(_))
    ));
}

#[test]
fn unterminated_quote_takes_the_rest_of_the_line() -> anyhow::Result<()> {
    assert!(matches!(
        RecordEntry::from_line("\"abc,def,1", None),
        Err(RecordError::TooFewFields(1))
    ));

    let entry = RecordEntry::from_line("foo.py,,\"12", None)?;
    assert_eq!(entry.path(), "foo.py");
    assert_eq!(entry.size, Some(12));
    Ok(())
}

#[test]
fn empty_paths_rejected() {
    assert!(matches!(
        RecordEntry::from_line(",,", None),
        Err(RecordError::InvalidPath(p)) if p.is_empty()
    ));
    for path in ["", ".", "./", "//"] {
        assert!(
            matches!(RecordEntry::new(path, None, None), Err(RecordError::InvalidPath(_))),
            "{path:?}"
        );
    }
}

#[test]
fn absolute_paths_rejected() {
    for path in ["/etc/passwd", r"C:\Windows\foo.py", "c:/foo.py", r"\\server\share\foo.py"] {
        assert!(
            matches!(RecordEntry::new(path, None, None), Err(RecordError::InvalidPath(p)) if p == path),
            "{path}"
        );
    }
}

#[test]
fn paths_are_normalized() -> anyhow::Result<()> {
    let entry = RecordEntry::new(r"foo\bar\baz.py", None, Some(1))?;
    assert_eq!(entry.path(), "foo/bar/baz.py");
    assert_eq!(entry.to_string(), "foo/bar/baz.py");

    let entry = RecordEntry::new("./foo//bar/./baz.py", None, None)?;
    assert_eq!(entry.path(), "foo/bar/baz.py");
    Ok(())
}

#[test]
fn as_line() -> anyhow::Result<()> {
    let entry = RecordEntry::new("foo/a,b.py", Some(FileHash::new("sha256", "xyz")), Some(42))?;
    assert_eq!(entry.as_line(), "foo/a,b.py,sha256=xyz,42");
    Ok(())
}

#[test]
fn file_hash() -> anyhow::Result<()> {
    let hash = FileHash::from_string(&format!(" sha256 = {EMPTY_SHA256} "));
    assert_eq!(hash.name, "sha256");
    assert_eq!(hash.to_string(), format!("sha256={EMPTY_SHA256}"));
    assert_eq!(
        hash.hexdigest()?,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(hash.digest()?.len(), 32);

    // padded values decode the same way
    let padded = FileHash::new("sha256", format!("{EMPTY_SHA256}="));
    assert_eq!(padded.digest()?, hash.digest()?);

    assert_eq!(FileHash::of::<Sha256>(b""), hash);
    assert_eq!(FileHash::from_hash(Sha256::new()), hash);
    assert_eq!(FileHash::of::<Sha512>(b"").name, "sha512");
    assert_eq!(FileHash::with_algorithm("sha384", b"").map(|h| h.name), Some("sha384".into()));
    assert_eq!(FileHash::with_algorithm("md5", b""), None);

    let bad = FileHash::new("sha256", "not*base64");
    assert!(matches!(bad.digest(), Err(RecordError::InvalidDigest(..))));
    Ok(())
}

#[test]
fn parse_whole_file() -> anyhow::Result<()> {
    let content = format!(
        "foo/__init__.py,sha256={EMPTY_SHA256},0\n\nfoo/core.py,sha256=abc,10\nfoo-1.0.dist-info/RECORD,,\n"
    );
    let entries = parse(&content, Some(Path::new("/site-packages")))?;
    assert_eq!(entries.len(), 3);
    assert_eq!(
        entries[0].full_path(),
        Some(PathBuf::from("/site-packages/foo/__init__.py"))
    );
    Ok(())
}

#[test]
fn parse_any_line_ending() -> anyhow::Result<()> {
    let content = "a.py,sha256=abc,1\rb.py,,\r\nc.py,,2\n";
    let paths: Vec<_> = parse(content, None)?
        .into_iter()
        .map(|e| e.path().to_owned())
        .collect();
    assert_eq!(paths, ["a.py", "b.py", "c.py"]);
    Ok(())
}

#[test]
fn read_requires_root() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::create_dir(dir.path().join("foo"))?;
    fs::write(dir.path().join("foo/data.txt"), "hello")?;

    let entry = RecordEntry::new("foo/data.txt", None, Some(5))?;
    assert!(matches!(entry.read_text(), Err(RecordError::NoDistribution)));
    assert!(matches!(entry.read_bytes(), Err(RecordError::NoDistribution)));

    let entry = entry.with_root(dir.path());
    assert_eq!(entry.read_text()?, "hello");
    assert_eq!(entry.read_bytes()?, b"hello");
    Ok(())
}

#[test]
fn verify_detects_tampering() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    fs::create_dir(root.join("foo"))?;
    fs::write(root.join("foo/__init__.py"), "")?;
    fs::write(root.join("foo/core.py"), "print('tampered')\n")?;
    fs::write(root.join("foo/old.py"), "x")?;

    let core = FileHash::of::<Sha256>("print('original')\n");
    let record = format!(
        "foo/__init__.py,sha256={EMPTY_SHA256},0\nfoo/core.py,{core},18\nfoo/gone.py,{core},18\nfoo/old.py,md5=abc,1\nfoo-1.0.dist-info/RECORD,,\n"
    );
    let entries = parse(&record, Some(root))?;

    let report = verify(&entries)?;
    assert!(!report.is_ok());
    assert_eq!(report.checked, 2);
    assert_eq!(report.missing, ["foo/gone.py"]);
    assert_eq!(report.unsupported, [FileHash::new("md5", "abc")]);
    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(report.mismatches[0].path, "foo/core.py");
    assert_eq!(report.mismatches[0].expected, core);
    assert_eq!(
        report.mismatches[0].actual,
        FileHash::of::<Sha256>("print('tampered')\n")
    );

    let report = verify(&entries[..1])?;
    assert!(report.is_ok());
    assert_eq!(report.checked, 1);

    let rootless = RecordEntry::new("foo/core.py", Some(core), None)?;
    assert!(matches!(verify(&[rootless]), Err(RecordError::NoDistribution)));
    Ok(())
}
