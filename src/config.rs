//! Runtime configuration resolved from the environment.
//!
//! There is no configuration file. Every setting has a default and can be
//! overridden with an environment variable:
//!
//! - `GIT_SVN_EXTERNALS_SVN`: the `svn` binary to run (default `svn`)
//! - `GIT_SVN_EXTERNALS_GIT`: the `git` binary to run (default `git`)
//! - `GIT_SVN_EXTERNALS_REGISTRY`: file name of the registered externals
//!   store inside the git directory (default `svn-externals.json`)
//!
//! Log filtering is configured separately through `GIT_SVN_EXTERNALS_LOG`,
//! see [`LOG_ENV`].

use std::env;

pub const SVN_ENV: &str = "GIT_SVN_EXTERNALS_SVN";
pub const GIT_ENV: &str = "GIT_SVN_EXTERNALS_GIT";
pub const REGISTRY_ENV: &str = "GIT_SVN_EXTERNALS_REGISTRY";
/// Environment variable holding an `env_logger` filter string.
pub const LOG_ENV: &str = "GIT_SVN_EXTERNALS_LOG";

pub const DEFAULT_SVN: &str = "svn";
pub const DEFAULT_GIT: &str = "git";
pub const DEFAULT_REGISTRY_FILE: &str = "svn-externals.json";

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub svn_binary: String,
    pub git_binary: String,
    pub registry_file: String,
}

impl Config {
    /// Resolve the configuration from the process environment.
    ///
    /// Empty values are treated as unset.
    pub fn from_env() -> Self {
        Self {
            svn_binary: env_or(SVN_ENV, DEFAULT_SVN),
            git_binary: env_or(GIT_ENV, DEFAULT_GIT),
            registry_file: env_or(REGISTRY_ENV, DEFAULT_REGISTRY_FILE),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            svn_binary: DEFAULT_SVN.to_string(),
            git_binary: DEFAULT_GIT.to_string(),
            registry_file: DEFAULT_REGISTRY_FILE.to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}
