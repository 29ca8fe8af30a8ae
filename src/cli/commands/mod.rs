mod entry_points;
mod list;
mod requires;
mod show;
mod tags;
mod verify;

use std::process::ExitCode;

use clap::Subcommand;

use super::Args;

#[derive(Subcommand)]
pub(super) enum Commands {
    /// List the installed distributions.
    ///
    /// Prints the name and version of every distribution found in the search
    /// paths, one per line. Distributions shadowed by an earlier search path
    /// are not shown.
    #[command(verbatim_doc_comment)]
    List(list::Args),
    /// Show the core metadata of a distribution.
    Show(show::Args),
    /// List entry points, optionally restricted to a single group.
    ///
    /// The output is in `entry_points.txt` format, merged across all
    /// installed distributions.
    #[command(verbatim_doc_comment)]
    EntryPoints(entry_points::Args),
    /// List the requirements of a distribution, sorted.
    Requires(requires::Args),
    /// List the platforms a distribution's wheel was built for.
    Tags(tags::Args),
    /// Check the installed files of distributions against their RECORD.
    ///
    /// Exits with status 1 if any file is missing or has been modified, or
    /// if a distribution has no RECORD file.
    #[command(verbatim_doc_comment)]
    Verify(verify::Args),
}

/// Runs the selected subcommand, writing its output to stdout.
pub fn run(args: Args) -> anyhow::Result<ExitCode> {
    let paths = args.search_paths();
    tracing::debug!(?paths, "searching for distributions");

    let mut out = std::io::stdout().lock();
    match args.command {
        Commands::List(args) => list::run(&paths, args, &mut out)?,
        Commands::Show(args) => show::run(&paths, args, &mut out)?,
        Commands::EntryPoints(args) => entry_points::run(&paths, args, &mut out)?,
        Commands::Requires(args) => requires::run(&paths, args, &mut out)?,
        Commands::Tags(args) => tags::run(&paths, args, &mut out)?,
        Commands::Verify(args) => {
            if !verify::run(&paths, args, &mut out)? {
                return Ok(ExitCode::from(1));
            }
        },
    }
    Ok(ExitCode::SUCCESS)
}
