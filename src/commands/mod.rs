//! # CLI Command Implementations
//!
//! Each subcommand of `git-svn-externals` lives in its own file with an
//! `execute` function. Commands wire the default collaborators (git, svn, the
//! JSON registry) together and hand over to `git_svn_externals::phases`.
//! They return an `Outcome` rather than printing it, so the CLI reports every
//! result in one place.

pub mod checkout;
pub mod clean;
pub mod prepare;

use std::env;

use anyhow::{Context, Result};

use git_svn_externals::git::{self, WorkTree};
use git_svn_externals::phases::Outcome;

/// Locate the git work tree enclosing the current directory.
///
/// The outer `Result` carries unexpected errors, the inner one a failure
/// that is reported to the user as an outcome.
fn locate_work_tree() -> Result<std::result::Result<WorkTree, Outcome>> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    Ok(git::locate_work_tree(&cwd)
        .map_err(|e| Outcome::setup_failed("Could not find working dir root", e)))
}
