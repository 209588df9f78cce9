//! SVN coordinates and externals entries

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A point-in-time tree in an SVN repository: URL plus revision.
///
/// A revision of [`Coordinate::HEAD_REVISION`] means "latest".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub repository_url: String,
    pub revision: u64,
}

impl Coordinate {
    pub const HEAD_REVISION: u64 = 0;

    pub fn new(repository_url: impl Into<String>, revision: u64) -> Self {
        Self {
            repository_url: repository_url.into(),
            revision,
        }
    }

    /// A coordinate referencing the HEAD revision of `repository_url`.
    pub fn head(repository_url: impl Into<String>) -> Self {
        Self::new(repository_url, Self::HEAD_REVISION)
    }

    pub fn is_head(&self) -> bool {
        self.revision == Self::HEAD_REVISION
    }

    /// The explicit revision pin, if any.
    pub fn pinned_revision(&self) -> Option<u64> {
        if self.is_head() {
            None
        } else {
            Some(self.revision)
        }
    }

    /// Revision in the form `svn` accepts for `-r` and peg revisions.
    pub fn revision_arg(&self) -> String {
        match self.pinned_revision() {
            Some(rev) => rev.to_string(),
            None => "HEAD".to_string(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]@[{}]", self.repository_url, self.revision_arg())
    }
}

/// One declared external: the target path it is checked out to, and the
/// coordinate it is checked out from.
///
/// `target_path` is repository-relative and starts with `/`, the way the
/// remote tree walk names directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExternalEntry {
    pub target_path: PathBuf,
    pub source: Coordinate,
}

impl ExternalEntry {
    pub fn new(target_path: impl Into<PathBuf>, source: Coordinate) -> Self {
        Self {
            target_path: target_path.into(),
            source,
        }
    }

    /// Where this external lives inside the git work tree at `work_tree`.
    pub fn path_in(&self, work_tree: &Path) -> PathBuf {
        resolve_in(work_tree, &self.target_path)
    }
}

/// Join a `/`-rooted repository path onto `work_tree`.
pub fn resolve_in(work_tree: &Path, target_path: &Path) -> PathBuf {
    let relative: PathBuf = target_path
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    work_tree.join(relative)
}
