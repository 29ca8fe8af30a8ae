use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use dist_meta::Distribution;
use dist_meta::distributions::get_distribution;

#[derive(Parser, Debug)]
#[command(next_help_heading = "Tags Options")]
pub struct Args {
    /// The name of the distribution
    name: String,
}

pub(super) fn run(paths: &[PathBuf], args: Args, out: &mut impl Write) -> anyhow::Result<()> {
    let distro = get_distribution(&args.name, paths)?;

    let Some(wheel) = distro.get_wheel()? else {
        tracing::warn!(name = %distro.name(), "not installed from a wheel");
        return Ok(());
    };

    for platform in platform_tags(&wheel.get_all_or("Tag", Vec::new())) {
        writeln!(out, "{platform}")?;
    }
    Ok(())
}

/// The platform part of each `{python}-{abi}-{platform}` tag, with compressed
/// tag sets (`a.b`) expanded.
fn platform_tags<'a>(tags: &[&'a str]) -> BTreeSet<&'a str> {
    tags.iter()
        .filter_map(|tag| tag.rsplit_once('-').map(|(_, platform)| platform))
        .flat_map(|platform| platform.split('.'))
        .collect()
}

#[test]
fn wheel_platforms() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let site = super::fixture::site_packages(tmp.path())?;

    let mut out = Vec::new();
    run(&[site.clone()], Args { name: "cawdrey".into() }, &mut out)?;
    assert_eq!(
        String::from_utf8(out)?,
        "manylinux1_x86_64\nmanylinux_2_5_x86_64\nwin_amd64\n"
    );

    let mut out = Vec::new();
    run(&[site], Args { name: "pip".into() }, &mut out)?;
    assert!(out.is_empty());
    Ok(())
}
