//! Checkout: materializing discovered externals in the work tree
//!
//! Externals are grouped by source [`Coordinate`]. Each distinct source is
//! checked out exactly once, into the first target path that declared it (the
//! primary target). Every further target of the same source becomes a
//! symbolic link to the primary checkout.
//!
//! ## Process
//!
//! 1.  **Checkout pass**: for each group, in order of first appearance, check
//!     out the source into its primary target. An existing primary target is
//!     never overwritten.
//!
//! 2.  **Link pass**: for each group, link every further target to the
//!     primary checkout. Missing parent directories of a link are created
//!     and cleaned up with the rest if the operation fails.
//!
//! The first failure stops the whole operation. The returned
//! [`CheckoutOperationError`] lists every path this run created, plus the path
//! that failed when it is safe to delete. A path that failed because it
//! already existed belongs to the user and is never put up for cleanup.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::coordinate::{Coordinate, ExternalEntry};
use crate::svn::SvnOperations;

/// Paths created for each source, primary checkout first.
pub type CheckedOut = HashMap<Coordinate, Vec<PathBuf>>;

/// Failure of a single checkout or link.
///
/// `cleanup` tells whether `path` may be deleted: true when the failed
/// operation may have left partial output behind, false when it failed
/// because `path` already existed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OneCheckoutError {
    pub path: PathBuf,
    pub cleanup: bool,
    pub message: String,
}

/// Failure of a whole checkout operation, with every path that needs to be
/// cleaned up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CheckoutOperationError {
    pub paths: BTreeSet<PathBuf>,
    pub message: String,
}

struct Group<'a> {
    source: &'a Coordinate,
    targets: Vec<PathBuf>,
}

/// Check out `externals` below `work_tree`.
pub fn checkout_externals(
    work_tree: &Path,
    externals: &[ExternalEntry],
    svn: &dyn SvnOperations,
) -> Result<CheckedOut, CheckoutOperationError> {
    let groups = group_by_source(work_tree, externals);
    let mut successes: Vec<(&Coordinate, Vec<PathBuf>)> = Vec::with_capacity(groups.len());

    for group in &groups {
        let primary = &group.targets[0];
        match checkout(work_tree, group.source, primary, svn) {
            Ok(path) => successes.push((group.source, vec![path])),
            Err(failure) => return Err(abort(&successes, &[], failure)),
        }
    }

    let mut created_dirs: Vec<PathBuf> = Vec::new();
    for (index, group) in groups.iter().enumerate() {
        let primary = &group.targets[0];
        for target in &group.targets[1..] {
            match link(primary, target, &mut created_dirs) {
                Ok(path) => successes[index].1.push(path),
                Err(failure) => return Err(abort(&successes, &created_dirs, failure)),
            }
        }
    }

    info!(
        "Checked out {} source(s) into {} path(s)",
        successes.len(),
        successes.iter().map(|(_, paths)| paths.len()).sum::<usize>()
    );
    Ok(successes
        .into_iter()
        .map(|(source, paths)| (source.clone(), paths))
        .collect())
}

/// Group entries by source, keeping first-appearance order for both groups
/// and targets. Repeated targets within a group are dropped.
fn group_by_source<'a>(work_tree: &Path, externals: &'a [ExternalEntry]) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut index: HashMap<&'a Coordinate, usize> = HashMap::new();

    for entry in externals {
        let target = entry.path_in(work_tree);
        match index.get(&entry.source) {
            Some(&i) => {
                if !groups[i].targets.contains(&target) {
                    groups[i].targets.push(target);
                }
            }
            None => {
                index.insert(&entry.source, groups.len());
                groups.push(Group {
                    source: &entry.source,
                    targets: vec![target],
                });
            }
        }
    }

    groups
}

fn checkout(
    work_tree: &Path,
    source: &Coordinate,
    path: &Path,
    svn: &dyn SvnOperations,
) -> Result<PathBuf, OneCheckoutError> {
    // not atomic: something could appear at `path` between this check and svn
    if path.symlink_metadata().is_ok() {
        return Err(OneCheckoutError {
            path: path.to_path_buf(),
            cleanup: false,
            message: format!("Cannot check out: [{}] already exists!", path.display()),
        });
    }

    info!("Checking out {} to {}", source, path.display());
    svn.checkout(source, path, work_tree)
        .map(|()| path.to_path_buf())
        .map_err(|e| OneCheckoutError {
            path: path.to_path_buf(),
            cleanup: true,
            message: format!(
                "Failed to checkout {} to [{}]: {}",
                source,
                path.display(),
                e
            ),
        })
}

/// Link `dest` to `primary`, creating missing parent directories first. The
/// topmost directory created is pushed to `created_dirs`.
fn link(
    primary: &Path,
    dest: &Path,
    created_dirs: &mut Vec<PathBuf>,
) -> Result<PathBuf, OneCheckoutError> {
    if let Some(parent) = dest.parent() {
        if let Some(top) = first_missing_ancestor(parent) {
            debug!("creating {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| OneCheckoutError {
                path: top.clone(),
                cleanup: true,
                message: format!(
                    "Failed to create [{}] for link [{}] because of [{}]",
                    parent.display(),
                    dest.display(),
                    e
                ),
            })?;
            created_dirs.push(top);
        }
    }

    debug!("linking {} -> {}", dest.display(), primary.display());
    symlink_dir(primary, dest)
        .map(|()| dest.to_path_buf())
        .map_err(|e| OneCheckoutError {
            path: dest.to_path_buf(),
            cleanup: e.kind() != io::ErrorKind::AlreadyExists,
            message: format!(
                "Failed to link [{}] to [{}] because of [{}]",
                dest.display(),
                primary.display(),
                e
            ),
        })
}

/// The highest ancestor of `dir` (or `dir` itself) that does not exist yet.
fn first_missing_ancestor(dir: &Path) -> Option<PathBuf> {
    let mut missing = None;
    let mut current = Some(dir);
    while let Some(path) = current {
        match path.symlink_metadata() {
            Err(e) if e.kind() == io::ErrorKind::NotFound => missing = Some(path.to_path_buf()),
            _ => break,
        }
        current = path.parent();
    }
    missing
}

#[cfg(unix)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}

fn abort(
    successes: &[(&Coordinate, Vec<PathBuf>)],
    created_dirs: &[PathBuf],
    failure: OneCheckoutError,
) -> CheckoutOperationError {
    warn!("{}", failure.message);
    let mut paths: BTreeSet<PathBuf> = successes
        .iter()
        .flat_map(|(_, paths)| paths.iter().cloned())
        .chain(created_dirs.iter().cloned())
        .collect();
    if failure.cleanup {
        paths.insert(failure.path);
    }
    CheckoutOperationError {
        paths,
        message: failure.message,
    }
}
