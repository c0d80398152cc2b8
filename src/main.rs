use std::process::ExitCode;

use clap::Parser;
use filterlab::cli::{self, CliArgs};
use filterlab::logger;

fn main() -> ExitCode {
    // Session log (overwrites the previous run's log)
    logger::init();

    let args = CliArgs::parse();
    cli::run(args)
}
