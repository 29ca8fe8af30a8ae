use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use dist_meta::distributions::get_distribution;
use dist_meta::{Distribution, log, record};

#[derive(Parser, Debug)]
#[command(next_help_heading = "Verify Options")]
pub struct Args {
    /// The names of the distributions to check
    #[arg(required = true)]
    names: Vec<String>,
}

/// Returns whether every distribution passed.
pub(super) fn run(paths: &[PathBuf], args: Args, out: &mut impl Write) -> anyhow::Result<bool> {
    let mut ok = true;

    for name in &args.names {
        let distro = get_distribution(name, paths)?;

        let span = tracing::info_span!("check", name = %distro.name());
        log::set_sub_task(&span, &format!("🔍 checking {}", distro.name()));
        let _enter = span.enter();

        let Some(entries) = distro.get_record()? else {
            tracing::error!(name = %distro.name(), "no RECORD file");
            ok = false;
            continue;
        };

        let report = record::verify(&entries)?;
        for mismatch in &report.mismatches {
            writeln!(
                out,
                "{}: expected {}, found {}",
                mismatch.path, mismatch.expected, mismatch.actual
            )?;
        }
        for path in &report.missing {
            writeln!(out, "{path}: missing")?;
        }

        if report.is_ok() {
            writeln!(out, "{} {}: {} files ok", distro.name(), distro.version(), report.checked)?;
        } else {
            ok = false;
        }
    }
    Ok(ok)
}

#[test]
fn verify_installed() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let site = super::fixture::site_packages(tmp.path())?;
    let paths = [site.clone()];

    let args = Args {
        names: vec!["cawdrey".into()],
    };
    let mut out = Vec::new();
    assert!(run(&paths, args, &mut out)?);
    assert_eq!(String::from_utf8(out)?, "cawdrey 0.4.2: 1 files ok\n");

    // pip has no RECORD
    let args = Args {
        names: vec!["cawdrey".into(), "pip".into()],
    };
    assert!(!run(&paths, args, &mut Vec::new())?);

    std::fs::write(site.join("cawdrey/__init__.py"), "tampered")?;
    let args = Args {
        names: vec!["cawdrey".into()],
    };
    let mut out = Vec::new();
    assert!(!run(&paths, args, &mut out)?);
    assert!(String::from_utf8(out)?.starts_with("cawdrey/__init__.py: expected sha256=47DEQ"));
    Ok(())
}
