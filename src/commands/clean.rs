//! Clean command implementation
//!
//! Removes every external a previous `checkout` registered.

use anyhow::Result;

use git_svn_externals::config::Config;
use git_svn_externals::phases::{orchestrator, Outcome};
use git_svn_externals::registry::JsonRegistry;

/// Execute the clean command
pub fn execute(config: &Config) -> Result<Outcome> {
    let work_tree = match super::locate_work_tree()? {
        Ok(work_tree) => work_tree,
        Err(outcome) => return Ok(outcome),
    };

    let registry = JsonRegistry::in_git_dir(&work_tree.git_dir, &config.registry_file);
    Ok(orchestrator::run_clean(&work_tree.root, &registry))
}
