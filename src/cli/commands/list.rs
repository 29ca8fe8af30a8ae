use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use dist_meta::Distribution;
use dist_meta::distributions::iter_distributions;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(next_help_heading = "List Options")]
pub struct Args {
    /// Print a JSON array instead of one distribution per line
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Listed {
    name: String,
    version: String,
}

pub(super) fn run(paths: &[PathBuf], args: Args, out: &mut impl Write) -> anyhow::Result<()> {
    let listed: Vec<Listed> = iter_distributions(paths)
        .map(|distro| Listed {
            name: distro.name().to_owned(),
            version: distro.version().to_string(),
        })
        .collect();

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &listed)?;
        writeln!(out)?;
    } else {
        for Listed { name, version } in &listed {
            writeln!(out, "{name} {version}")?;
        }
    }
    Ok(())
}

#[test]
fn list_installed() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let site = super::fixture::site_packages(tmp.path())?;

    let mut out = Vec::new();
    run(&[site.clone()], Args { json: false }, &mut out)?;
    assert_eq!(String::from_utf8(out)?, "cawdrey 0.4.2\npip 21.0\n");

    let mut out = Vec::new();
    run(&[site], Args { json: true }, &mut out)?;
    let parsed: serde_json::Value = serde_json::from_slice(&out)?;
    assert_eq!(parsed[1]["name"], "pip");
    assert_eq!(parsed[1]["version"], "21.0");
    Ok(())
}
