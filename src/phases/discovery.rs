//! Discovery: walking the remote tree for `svn:externals`
//!
//! Starting at the root of a [`Coordinate`], every directory is listed with its
//! properties. Child directories go to the back of a FIFO work queue, so
//! siblings are visited before any of their children. Each directory's
//! `svn:externals` value is parsed with the directory path as target base.
//!
//! The first failure anywhere in the tree, whether a transport error or a
//! malformed declaration, aborts the whole walk. There is no partial result.

use std::collections::VecDeque;

use log::{debug, info};

use crate::coordinate::{Coordinate, ExternalEntry};
use crate::error::{Error, Result};
use crate::externals::{self, ExternalsParser};
use crate::pool::SessionPool;
use crate::svn::{join_url, NodeKind};

/// Find every external declared anywhere below `root`.
pub fn find_externals(root: &Coordinate, pool: &SessionPool) -> Result<Vec<ExternalEntry>> {
    info!("Searching for externals in {}", root);

    let session = pool
        .repo_for(&root.repository_url)
        .map_err(|e| traversal_error("/", e))?;

    let mut work_queue: VecDeque<String> = VecDeque::from([String::from("/")]);
    let mut repository_root: Option<String> = None;
    let mut externals = Vec::new();
    let mut visited = 0usize;

    while let Some(current_path) = work_queue.pop_front() {
        debug!("listing {}", current_path);
        visited += 1;

        let listing = session
            .get_dir(&current_path, root.revision)
            .map_err(|e| traversal_error(&current_path, e))?;

        for entry in &listing.entries {
            if entry.kind == NodeKind::Dir {
                work_queue.push_back(format!("{}{}/", current_path, entry.name));
            }
        }

        let declaration = listing.externals();
        if declaration.trim().is_empty() {
            continue;
        }

        let mut parser = ExternalsParser::new()
            .with_directory_url(join_url(&root.repository_url, &current_path));
        if externals::needs_repository_root(declaration) {
            if repository_root.is_none() {
                repository_root = Some(
                    session
                        .repository_root(root.revision)
                        .map_err(|e| traversal_error(&current_path, e))?,
                );
            }
            if let Some(repo_root) = &repository_root {
                parser = parser.with_repository_root(repo_root.as_str());
            }
        }

        let found = parser.parse(&current_path, declaration)?;
        debug!("{} external(s) declared on {}", found.len(), current_path);
        externals.extend(found);
    }

    info!(
        "Found {} external(s) in {} director{}",
        externals.len(),
        visited,
        if visited == 1 { "y" } else { "ies" }
    );
    Ok(externals)
}

fn traversal_error(path: &str, error: Error) -> Error {
    match error {
        Error::Traversal { .. } => error,
        other => Error::Traversal {
            path: path.to_string(),
            message: other.to_string(),
        },
    }
}
