//! # Subversion Access
//!
//! Everything this tool asks of Subversion goes through two traits so that the
//! tree walk and the checkout phase can be tested without a server:
//!
//! - **`RemoteSession`**: read-only queries against one repository URL
//!   (directory listing with properties, repository root).
//! - **`SvnOperations`**: the side-effecting `svn checkout`.
//!
//! The default implementations shell out to the system `svn` client with
//! `--non-interactive`, which picks up whatever credentials the user already
//! has cached (`~/.subversion/auth`), the same way the git helpers rely on the
//! user's git configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;

use log::debug;

use crate::coordinate::Coordinate;
use crate::error::{Error, Result};

/// The property holding externals declarations.
pub const EXTERNALS_PROPERTY: &str = "svn:externals";

/// Kind of a node in the remote tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

/// An immediate child of a remote directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: NodeKind,
}

impl DirEntry {
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Dir,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
        }
    }
}

/// One remote directory: its versioned properties and its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub properties: BTreeMap<String, String>,
    pub entries: Vec<DirEntry>,
}

impl DirListing {
    /// The `svn:externals` value, or the empty string if unset.
    pub fn externals(&self) -> &str {
        self.properties
            .get(EXTERNALS_PROPERTY)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// An open connection to one repository URL.
pub trait RemoteSession: Send + Sync {
    /// Fetch the properties and immediate children of `path` (relative to the
    /// session URL, `/`-rooted) at `revision`. Revision 0 means HEAD.
    fn get_dir(&self, path: &str, revision: u64) -> Result<DirListing>;

    /// The root URL of the repository this session points into.
    fn repository_root(&self, revision: u64) -> Result<String>;
}

/// Creates sessions for the connection pool.
pub trait SessionFactory: Send + Sync {
    fn open(&self, url: &str) -> Result<Arc<dyn RemoteSession>>;
}

/// Side-effecting Subversion operations - allows mocking in tests
pub trait SvnOperations: Send + Sync {
    /// Check out `source` into `destination`, running in `working_dir`.
    ///
    /// Standard streams are inherited so the user sees `svn`'s progress.
    fn checkout(&self, source: &Coordinate, destination: &Path, working_dir: &Path) -> Result<()>;
}

/// `RemoteSession` backed by the `svn` command-line client.
#[derive(Debug, Clone)]
pub struct SvnCliSession {
    svn_binary: String,
    url: String,
}

impl SvnCliSession {
    pub fn new(svn_binary: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            svn_binary: svn_binary.into(),
            url: url.into(),
        }
    }

    fn target(&self, path: &str, revision: u64) -> String {
        let rev = Coordinate::new(self.url.as_str(), revision).revision_arg();
        format!("{}@{}", join_url(&self.url, path), rev)
    }

    fn run(&self, subcommand: &str, args: &[&str]) -> Result<String> {
        let output = run_captured(&self.svn_binary, subcommand, args).map_err(|e| {
            Error::SvnCommand {
                command: subcommand.to_string(),
                url: self.url.clone(),
                message: e.to_string(),
            }
        })?;

        if !output.status.success() {
            return Err(Error::SvnCommand {
                command: subcommand.to_string(),
                url: self.url.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl RemoteSession for SvnCliSession {
    fn get_dir(&self, path: &str, revision: u64) -> Result<DirListing> {
        let target = self.target(path, revision);
        debug!("svn list {}", target);

        let listing = self.run("list", &[&target])?;
        let properties = self.run("proplist", &["-v", &target])?;

        Ok(DirListing {
            properties: parse_proplist(&properties),
            entries: parse_list(&listing),
        })
    }

    fn repository_root(&self, revision: u64) -> Result<String> {
        let target = self.target("/", revision);
        let root = self.run("info", &["--show-item", "repos-root-url", &target])?;
        Ok(root.trim().to_string())
    }
}

/// `SessionFactory` creating [`SvnCliSession`]s.
#[derive(Debug, Clone)]
pub struct SvnCliSessionFactory {
    svn_binary: String,
}

impl SvnCliSessionFactory {
    pub fn new(svn_binary: impl Into<String>) -> Self {
        Self {
            svn_binary: svn_binary.into(),
        }
    }
}

impl SessionFactory for SvnCliSessionFactory {
    fn open(&self, url: &str) -> Result<Arc<dyn RemoteSession>> {
        debug!("opening svn session for {}", url);
        Ok(Arc::new(SvnCliSession::new(self.svn_binary.as_str(), url)))
    }
}

/// The default implementation of `SvnOperations`, which runs `svn checkout`.
#[derive(Debug, Clone)]
pub struct DefaultSvnOperations {
    svn_binary: String,
}

impl DefaultSvnOperations {
    pub fn new(svn_binary: impl Into<String>) -> Self {
        Self {
            svn_binary: svn_binary.into(),
        }
    }
}

impl SvnOperations for DefaultSvnOperations {
    fn checkout(&self, source: &Coordinate, destination: &Path, working_dir: &Path) -> Result<()> {
        let mut command = Command::new(&self.svn_binary);
        command
            .arg("checkout")
            .arg(checkout_target(source))
            .arg(destination)
            .current_dir(working_dir);

        debug!("running {:?}", command);
        let status = command.status().map_err(|e| Error::SvnCommand {
            command: "checkout".to_string(),
            url: source.repository_url.clone(),
            message: e.to_string(),
        })?;

        if !status.success() {
            return Err(Error::SvnCommand {
                command: "checkout".to_string(),
                url: source.repository_url.clone(),
                message: format!(
                    "process returned [{}]",
                    status
                        .code()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "signal".to_string())
                ),
            });
        }
        Ok(())
    }
}

/// `URL@REV` for a pinned source, so the path is resolved in that revision
/// even if it moved or was deleted later. Plain `URL` for HEAD.
pub fn checkout_target(source: &Coordinate) -> String {
    match source.pinned_revision() {
        Some(rev) => format!("{}@{}", source.repository_url, rev),
        None => source.repository_url.clone(),
    }
}

fn run_captured(svn_binary: &str, subcommand: &str, args: &[&str]) -> std::io::Result<Output> {
    Command::new(svn_binary)
        .arg(subcommand)
        .arg("--non-interactive")
        .args(args)
        .output()
}

/// Append a `/`-rooted repository path to a URL.
pub fn join_url(url: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        url.trim_end_matches('/').to_string()
    } else {
        format!("{}/{}", url.trim_end_matches('/'), path)
    }
}

/// Parse `svn list` output. Directory names carry a trailing `/`.
pub fn parse_list(output: &str) -> Vec<DirEntry> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(|line| match line.strip_suffix('/') {
            Some(name) => DirEntry::dir(name),
            None => DirEntry::file(line),
        })
        .collect()
}

/// Parse `svn proplist -v` output.
///
/// Property names are indented by two spaces, each value line by four:
///
/// ```text
/// Properties on 'svn://host/repo/trunk':
///   svn:externals
///     -r5 svn://host/lib lib
///   svn:ignore
///     target
/// ```
pub fn parse_proplist(output: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in output.lines().map(|l| l.trim_end_matches('\r')) {
        if let Some(value) = line.strip_prefix("    ") {
            if let Some((_, values)) = current.as_mut() {
                values.push(value.to_string());
            }
        } else if let Some(name) = line.strip_prefix("  ") {
            if let Some((name, values)) = current.take() {
                properties.insert(name, values.join("\n"));
            }
            current = Some((name.trim().to_string(), Vec::new()));
        }
    }
    if let Some((name, values)) = current {
        properties.insert(name, values.join("\n"));
    }

    properties
}
