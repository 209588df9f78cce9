//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

use git_svn_externals::config::Config;
use git_svn_externals::exit_codes;
use git_svn_externals::phases::Outcome;

use crate::commands;

/// Check out svn:externals into a git-svn clone
#[derive(Parser, Debug)]
#[command(name = "git-svn-externals")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find the externals of the svn revision this clone tracks and check them out
    Checkout,
    /// Remove the externals a previous checkout created
    Clean,
    /// Prepare the repository for externals (not implemented yet)
    Prepare,
}

impl Cli {
    /// Parse the process arguments.
    ///
    /// Help and version requests are printed and exit as clap does. Anything
    /// else clap rejects prints the usage to stderr and exits successfully.
    pub fn parse_or_usage() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(_) => {
                eprintln!("{}", Self::command().render_help());
                std::process::exit(exit_codes::SUCCESS)
            }
        }
    }

    /// Execute the CLI command, returning the process exit code
    pub fn execute(self) -> Result<i32> {
        let config = Config::from_env();
        log::debug!("configuration: {:?}", config);

        let outcome = match self.command {
            Commands::Checkout => commands::checkout::execute(&config)?,
            Commands::Clean => commands::clean::execute(&config)?,
            Commands::Prepare => commands::prepare::execute(),
        };
        Ok(report(&outcome))
    }
}

/// Print the outcome on stderr and translate it into an exit code.
fn report(outcome: &Outcome) -> i32 {
    eprintln!("{}", outcome.message());
    outcome.exit_code()
}
