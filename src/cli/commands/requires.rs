use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use dist_meta::Distribution;
use dist_meta::distributions::get_distribution;

#[derive(Parser, Debug)]
#[command(next_help_heading = "Requires Options")]
pub struct Args {
    /// The name of the distribution
    name: String,
}

pub(super) fn run(paths: &[PathBuf], args: Args, out: &mut impl Write) -> anyhow::Result<()> {
    let distro = get_distribution(&args.name, paths)?;
    let metadata = distro.get_metadata()?;

    let mut requirements = metadata.get_all_or("Requires-Dist", Vec::new());
    requirements.sort_unstable();
    for requirement in requirements {
        writeln!(out, "{requirement}")?;
    }
    Ok(())
}

#[test]
fn sorted_requirements() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let site = super::fixture::site_packages(tmp.path())?;

    let mut out = Vec::new();
    run(&[site.clone()], Args { name: "cawdrey".into() }, &mut out)?;
    assert_eq!(
        String::from_utf8(out)?,
        "domdf-python-tools (>=1.1.0)\ntyping-extensions (>=3.7.4.3)\n"
    );

    let mut out = Vec::new();
    run(&[site], Args { name: "pip".into() }, &mut out)?;
    assert!(out.is_empty());
    Ok(())
}
