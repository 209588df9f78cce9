//! Cleanup: best-effort removal of externals
//!
//! Used after a failed checkout to undo what the run created, and by the
//! `clean` command to remove previously registered externals. Every path is
//! attempted independently; the paths that could not be removed are returned.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Recursively delete every path in `paths`.
///
/// Symbolic links are removed, never followed. A path that does not exist
/// counts as removed.
pub fn clean_up_externals<'a, I>(paths: I) -> Result<(), BTreeSet<PathBuf>>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    let failures: BTreeSet<PathBuf> = paths
        .into_iter()
        .filter(|path| match remove_path(path) {
            Ok(()) => false,
            Err(e) => {
                warn!("Could not remove {}: {}", path.display(), e);
                true
            }
        })
        .cloned()
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

fn remove_path(path: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    debug!("removing {}", path.display());
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path).or_else(|e| {
            // directory symlinks on Windows are removed like directories
            if cfg!(windows) && metadata.file_type().is_symlink() {
                fs::remove_dir(path)
            } else {
                Err(e)
            }
        })
    }
}
