//! # git-svn-externals CLI
//!
//! This is the binary entry point for the `git-svn-externals` command-line tool.
//!
//! Its primary responsibilities are:
//! - Setting up logging from `GIT_SVN_EXTERNALS_LOG`.
//! - Parsing command-line arguments using `clap`.
//! - Executing the selected command and exiting with its status code.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use env_logger::Env;
use git_svn_externals::config::LOG_ENV;
use git_svn_externals::exit_codes;

fn main() {
    env_logger::Builder::from_env(Env::new().filter_or(LOG_ENV, "warn"))
        .format_timestamp(None)
        .init();

    let cli = cli::Cli::parse_or_usage();
    let code = match cli.execute() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::ERROR_BEFORE_WRITE
        }
    };
    std::process::exit(code)
}
