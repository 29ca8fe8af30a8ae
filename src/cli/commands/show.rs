use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dist_meta::distributions::get_distribution;
use dist_meta::{Distribution, FieldMap};
use serde_json::{Map, Value};

#[derive(Parser, Debug)]
#[command(next_help_heading = "Show Options")]
pub struct Args {
    /// The name of the distribution
    name: String,
    /// Print the fields as a JSON object
    ///
    /// Fields which appear more than once become arrays.
    #[arg(long)]
    json: bool,
}

pub(super) fn run(paths: &[PathBuf], args: Args, out: &mut impl Write) -> anyhow::Result<()> {
    let distro = get_distribution(&args.name, paths)?;
    let fields = distro
        .get_metadata()
        .with_context(|| format!("could not read the metadata of {}", distro.name()))?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &to_json(&fields))?;
        writeln!(out)?;
        return Ok(());
    }

    for (name, value) in fields.iter() {
        if !name.eq_ignore_ascii_case("description") {
            writeln!(out, "{name}: {value}")?;
        }
    }
    if let Some(description) = fields.get("Description") {
        writeln!(out)?;
        write!(out, "{description}")?;
    }
    Ok(())
}

fn to_json(fields: &FieldMap) -> Map<String, Value> {
    let mut seen = HashSet::new();
    let mut map = Map::new();

    for name in fields.keys() {
        if !seen.insert(name.to_lowercase()) {
            continue;
        }
        let value = match fields.get_all_or(name, Vec::new()).as_slice() {
            [single] => Value::from(*single),
            many => Value::from(many.to_vec()),
        };
        map.insert(name.to_owned(), value);
    }
    map
}

#[test]
fn show_metadata() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let site = super::fixture::site_packages(tmp.path())?;

    let mut out = Vec::new();
    let args = Args {
        name: "Cawdrey".into(),
        json: false,
    };
    run(&[site.clone()], args, &mut out)?;
    let text = String::from_utf8(out)?;
    assert!(text.starts_with("Metadata-Version: 2.1\nName: cawdrey\n"));
    assert!(text.ends_with("\n\nCawdrey\n=======\n"));

    let mut out = Vec::new();
    let args = Args {
        name: "cawdrey".into(),
        json: true,
    };
    run(&[site], args, &mut out)?;
    let parsed: Value = serde_json::from_slice(&out)?;
    assert_eq!(parsed["Version"], "0.4.2");
    assert_eq!(parsed["Classifier"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn show_unknown() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let site = super::fixture::site_packages(tmp.path())?;

    let args = Args {
        name: "nonexistent".into(),
        json: false,
    };
    let err = run(&[site], args, &mut Vec::new()).unwrap_err();
    assert_eq!(err.to_string(), "No distribution named 'nonexistent'.");
    Ok(())
}
