//! Checkout command implementation
//!
//! 1. Locate the git work tree and read its svn URL and revision
//! 2. Discover externals on the remote side
//! 3. Check them out, rolling back on failure

use anyhow::Result;

use git_svn_externals::config::Config;
use git_svn_externals::git;
use git_svn_externals::phases::{orchestrator, Outcome};
use git_svn_externals::pool::SessionPool;
use git_svn_externals::registry::JsonRegistry;
use git_svn_externals::svn::{DefaultSvnOperations, SvnCliSessionFactory};

/// Execute the checkout command
pub fn execute(config: &Config) -> Result<Outcome> {
    let work_tree = match super::locate_work_tree()? {
        Ok(work_tree) => work_tree,
        Err(outcome) => return Ok(outcome),
    };

    let info = match git::git_svn_info(&config.git_binary, &work_tree.root) {
        Ok(info) => info,
        Err(e) => return Ok(Outcome::setup_failed("Could not get git svn info", e)),
    };
    let coordinate = match git::parse_svn_info(&info) {
        Ok(coordinate) => coordinate,
        Err(e) => return Ok(Outcome::setup_failed("Could not evaluate git svn info output", e)),
    };

    let pool = SessionPool::new(Box::new(SvnCliSessionFactory::new(
        config.svn_binary.as_str(),
    )));
    let svn = DefaultSvnOperations::new(config.svn_binary.as_str());
    let registry = JsonRegistry::in_git_dir(&work_tree.git_dir, &config.registry_file);

    Ok(orchestrator::run_checkout(
        &work_tree.root,
        &coordinate,
        pool,
        &svn,
        &registry,
    ))
}
