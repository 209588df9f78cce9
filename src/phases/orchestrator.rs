//! Orchestrator for the checkout and clean operations
//!
//! This module strings the phases together and turns their results into an
//! [`Outcome`]. Nothing here prints or exits; the command layer reports the
//! outcome and maps it to an exit code in one place.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::{checkout, cleanup, discovery};
use crate::coordinate::{Coordinate, ExternalEntry};
use crate::exit_codes;
use crate::pool::SessionPool;
use crate::registry::RegistryStore;
use crate::svn::SvnOperations;

/// How a user-facing operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Everything worked.
    Done { message: String },
    /// The operation exists only as a placeholder.
    NotImplemented { feature: String },
    /// Failed before anything was written.
    SetupFailed { message: String },
    /// A write failed and everything this run wrote was removed again.
    RolledBack { message: String },
    /// A write failed and some paths could not be removed.
    RollbackFailed {
        message: String,
        paths: BTreeSet<PathBuf>,
    },
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Done { .. } => exit_codes::SUCCESS,
            Outcome::NotImplemented { .. } => exit_codes::NOT_IMPLEMENTED_YET,
            Outcome::SetupFailed { .. } => exit_codes::ERROR_BEFORE_WRITE,
            Outcome::RolledBack { .. } => exit_codes::FAIL_CLEANUP_OK,
            Outcome::RollbackFailed { .. } => exit_codes::FAIL_CLEANUP_FAIL,
        }
    }

    /// Human-readable report for the error stream.
    pub fn message(&self) -> String {
        match self {
            Outcome::Done { message }
            | Outcome::SetupFailed { message }
            | Outcome::RolledBack { message } => message.clone(),
            Outcome::NotImplemented { feature } => format!("{} is not implemented yet.", feature),
            Outcome::RollbackFailed { message, paths } => {
                let mut report = format!("{}\nCleanup reported errors for paths:", message);
                for path in paths {
                    let _ = write!(report, "\n  {}", path.display());
                }
                report
            }
        }
    }

    pub fn setup_failed(context: &str, error: impl std::fmt::Display) -> Self {
        Outcome::SetupFailed {
            message: format!("{}:\n{}", context, error),
        }
    }
}

/// Discover the externals of `coordinate` and check them out below
/// `work_tree`, registering them on success and rolling back on failure.
///
/// The pool is closed before returning.
pub fn run_checkout(
    work_tree: &Path,
    coordinate: &Coordinate,
    pool: SessionPool,
    svn: &dyn SvnOperations,
    registry: &dyn RegistryStore,
) -> Outcome {
    let search = discovery::find_externals(coordinate, &pool);
    if let Err(e) = pool.close() {
        warn!("{}", e);
    }
    let externals = match search {
        Ok(externals) => externals,
        Err(e) => return Outcome::setup_failed("Could not perform external search at source", e),
    };

    if externals.is_empty() {
        return Outcome::Done {
            message: "No externals found! Done here.".to_string(),
        };
    }

    let checked_out = match checkout::checkout_externals(work_tree, &externals, svn) {
        Ok(checked_out) => checked_out,
        Err(e) => {
            return roll_back(
                format!("Checking out externals failed:\n{}", e.message),
                &e.paths,
            )
        }
    };

    let registered: BTreeSet<ExternalEntry> = externals.into_iter().collect();
    if let Err(e) = registry.save(&registered) {
        let created: BTreeSet<PathBuf> = checked_out.into_values().flatten().collect();
        return roll_back(
            format!("Could not register checked out externals:\n{}", e),
            &created,
        );
    }

    info!("Registered {} external(s)", registered.len());
    Outcome::Done {
        message: "Checkout done.".to_string(),
    }
}

/// Remove every registered external below `work_tree`.
pub fn run_clean(work_tree: &Path, registry: &dyn RegistryStore) -> Outcome {
    let registered = match registry.load() {
        Ok(registered) => registered,
        Err(e) => return Outcome::setup_failed("Could not read registered externals", e),
    };

    let paths: BTreeSet<PathBuf> = registered.iter().map(|e| e.path_in(work_tree)).collect();
    info!("Cleaning {} registered external(s)", paths.len());

    if let Err(failed) = cleanup::clean_up_externals(&paths) {
        return Outcome::RollbackFailed {
            message: "Cleaning externals failed.".to_string(),
            paths: failed,
        };
    }

    if let Err(e) = registry.save(&BTreeSet::new()) {
        return Outcome::RollbackFailed {
            message: format!(
                "Externals were removed, but the registry could not be cleared:\n{}",
                e
            ),
            paths: BTreeSet::new(),
        };
    }

    Outcome::Done {
        message: "Cleanup done.".to_string(),
    }
}

fn roll_back(message: String, paths: &BTreeSet<PathBuf>) -> Outcome {
    warn!("Rolling back {} path(s)", paths.len());
    match cleanup::clean_up_externals(paths) {
        Ok(()) => Outcome::RolledBack {
            message: format!("{}\nCleanup done.", message),
        },
        Err(failed) => Outcome::RollbackFailed {
            message,
            paths: failed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let done = Outcome::Done {
            message: String::new(),
        };
        assert_eq!(done.exit_code(), 0);
        assert_eq!(
            Outcome::NotImplemented {
                feature: "prepare".to_string()
            }
            .exit_code(),
            1
        );
        assert_eq!(Outcome::setup_failed("x", "y").exit_code(), 2);
        assert_eq!(
            Outcome::RolledBack {
                message: String::new()
            }
            .exit_code(),
            3
        );
        assert_eq!(
            Outcome::RollbackFailed {
                message: String::new(),
                paths: BTreeSet::new()
            }
            .exit_code(),
            4
        );
    }

    #[test]
    fn test_rollback_failed_lists_paths() {
        let outcome = Outcome::RollbackFailed {
            message: "Checking out externals failed".to_string(),
            paths: [PathBuf::from("/w/a"), PathBuf::from("/w/c")]
                .into_iter()
                .collect(),
        };
        let message = outcome.message();
        assert!(message.starts_with("Checking out externals failed"));
        assert!(message.contains("/w/a"));
        assert!(message.contains("/w/c"));
    }

    #[test]
    fn test_setup_failed_message() {
        let outcome = Outcome::setup_failed("Could not get git svn info", "exit status 128");
        assert_eq!(outcome.message(), "Could not get git svn info:\nexit status 128");
    }
}
