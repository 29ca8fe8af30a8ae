use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use dist_meta::entry_points::{self, dumps};

#[derive(Parser, Debug)]
#[command(next_help_heading = "Entry Point Options")]
pub struct Args {
    /// Only show the entry points in this group, e.g. `console_scripts`
    group: Option<String>,
}

pub(super) fn run(paths: &[PathBuf], args: Args, out: &mut impl Write) -> anyhow::Result<()> {
    let text = match args.group {
        Some(group) => {
            let found = entry_points::get_entry_points(&group, paths)?;
            if found.is_empty() {
                tracing::warn!(%group, "no entry points in group");
                return Ok(());
            }
            dumps([(group.as_str(), &found)])
        },
        None => dumps(&entry_points::get_all_entry_points(paths)?),
    };
    write!(out, "{text}")?;
    Ok(())
}

#[test]
fn list_entry_points() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let site = super::fixture::site_packages(tmp.path())?;

    let mut out = Vec::new();
    let args = Args {
        group: Some("console_scripts".into()),
    };
    run(&[site.clone()], args, &mut out)?;
    assert_eq!(
        String::from_utf8(out)?,
        "[console_scripts]\npip = pip._internal.cli.main:main\npip3 = pip._internal.cli.main:main\n"
    );

    let mut out = Vec::new();
    let args = Args {
        group: Some("gui_scripts".into()),
    };
    run(&[site], args, &mut out)?;
    assert!(out.is_empty());
    Ok(())
}
