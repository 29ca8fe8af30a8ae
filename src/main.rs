//! The main entry point for the distmeta CLI.

#![warn(missing_docs)]

use std::process::ExitCode;

use clap::Parser;
use distmeta::cli::{self, Args};

//================================================================================================
// Functions
//================================================================================================

fn main() -> ExitCode {
    let args = Args::parse();

    let _guard = cli::init_global_subscriber(args.log);

    match cli::run(args) {
        Ok(code) => code,
        Err(e) => {
            distmeta::fatal!(e);
            ExitCode::FAILURE
        },
    }
}
