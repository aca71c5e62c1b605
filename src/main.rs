//! Main entry point for the applist CLI tool

use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;

use applist::cli::{self, Args};
use applist::config::Config;

fn main() -> ExitCode {
    // The original tool's argument contract: no operand prints usage and
    // exits 0, one operand runs, anything else prints usage and exits 2.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    print!("{err}");
                    ExitCode::SUCCESS
                }
                _ => {
                    println!("{}", cli::USAGE);
                    ExitCode::from(2)
                }
            };
        }
    };

    let Some(archive) = args.archive else {
        println!("{}", cli::USAGE);
        return ExitCode::SUCCESS;
    };

    let config = Config::default();
    if let Err(e) = applist::run(&archive, &config) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
