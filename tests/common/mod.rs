//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a git work tree fixture and stand-ins for the `git`
//! and `svn` binaries, so the CLI can be driven end to end without a
//! Subversion server.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_fake_tools();
//!     fixture.remote_dir("lib");
//!     fixture.command().arg("checkout").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::TestFixture;
    #[allow(unused_imports)]
    pub use super::FAKE_URL;
}

/// Repository URL the fake `git svn info` reports.
#[allow(dead_code)]
pub const FAKE_URL: &str = "svn://fake/trunk";

/// Answers `git svn info` for a clone of `FAKE_URL` at revision 9.
#[allow(dead_code)]
const FAKE_GIT: &str = r#"#!/bin/sh
printf 'Path: .\nURL: svn://fake/trunk\nRepository Root: svn://fake\nRevision: 9\n'
"#;

/// Serves `list` and `proplist` from the directory tree in `$FAKE_SVN_ROOT`.
///
/// A directory's `svn:externals` value is the content of its hidden
/// `.externals` file. `checkout` creates the destination and appends its
/// arguments to `$FAKE_SVN_LOG`; sources containing `broken` fail.
#[allow(dead_code)]
const FAKE_SVN: &str = r#"#!/bin/sh
sub="$1"
shift
for last; do :; done
target="${last%@*}"
dir="$FAKE_SVN_ROOT${target#svn://fake/trunk}"
case "$sub" in
  list)
    [ -d "$dir" ] || { echo "svn: E170000: URL '$target' doesn't exist" >&2; exit 1; }
    ls -p "$dir"
    ;;
  proplist)
    if [ -f "$dir/.externals" ]; then
      echo "Properties on '$target':"
      echo "  svn:externals"
      sed 's/^/    /' "$dir/.externals"
    fi
    ;;
  info)
    echo "svn://fake"
    ;;
  checkout)
    case "$*" in
      *broken*) echo "svn: E170013: Unable to connect" >&2; exit 1 ;;
    esac
    mkdir -p "$last" && echo "$*" >> "$FAKE_SVN_LOG"
    ;;
  *)
    exit 1
    ;;
esac
"#;

/// A test fixture holding a git work tree in a temporary directory.
///
/// The work tree lives in `work/`. With fake tools enabled, the remote svn
/// tree lives in `remote/` next to it and the fake binaries in `bin/`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new fixture with an initialized, non-bare git repository.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("work")
            .create_dir_all()
            .expect("Failed to create work tree");
        git2::Repository::init(temp_dir.child("work").path())
            .expect("Failed to initialize git repository");
        Self { temp_dir }
    }

    /// Install the fake `git` and `svn` scripts.
    #[allow(dead_code)]
    pub fn with_fake_tools(self) -> Self {
        self.temp_dir
            .child("remote")
            .create_dir_all()
            .expect("Failed to create remote tree");
        self.write_script("bin/git", FAKE_GIT);
        self.write_script("bin/svn", FAKE_SVN);
        self
    }

    /// Add a file to the work tree.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.work_child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Create a directory in the fake remote tree.
    #[allow(dead_code)]
    pub fn remote_dir(&self, path: &str) {
        self.temp_dir
            .child("remote")
            .child(path)
            .create_dir_all()
            .expect("Failed to create remote directory");
    }

    /// Declare `svn:externals` on a directory of the fake remote tree.
    /// An empty `path` means the root.
    #[allow(dead_code)]
    pub fn remote_externals(&self, path: &str, declaration: &str) {
        self.remote_dir(path);
        let dir = self.temp_dir.child("remote").child(path);
        dir.child(".externals")
            .write_str(declaration)
            .expect("Failed to write externals");
    }

    /// Path of the git work tree.
    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().join("work")
    }

    /// Child path inside the work tree.
    #[allow(dead_code)]
    pub fn work_child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        assert_fs::fixture::ChildPath::new(self.path().join(path))
    }

    /// Path of the registry file inside `.git`.
    #[allow(dead_code)]
    pub fn registry_path(&self) -> PathBuf {
        self.path().join(".git").join("svn-externals.json")
    }

    /// Arguments the fake `svn checkout` was called with, one line per call.
    #[allow(dead_code)]
    pub fn checkout_log(&self) -> Vec<String> {
        std::fs::read_to_string(self.log_path())
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Get access to the underlying TempDir for advanced usage.
    #[allow(dead_code)]
    pub fn temp_dir(&self) -> &assert_fs::TempDir {
        &self.temp_dir
    }

    /// Command for the binary, running inside the work tree.
    ///
    /// The configuration variables point at the fake tools whether or not
    /// they were installed; without them, running `git` fails.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("git-svn-externals");
        cmd.current_dir(self.path())
            .env_remove("GIT_SVN_EXTERNALS_REGISTRY")
            .env_remove("GIT_SVN_EXTERNALS_LOG")
            .env("GIT_SVN_EXTERNALS_GIT", self.bin_path("git"))
            .env("GIT_SVN_EXTERNALS_SVN", self.bin_path("svn"))
            .env("FAKE_SVN_ROOT", self.temp_dir.path().join("remote"))
            .env("FAKE_SVN_LOG", self.log_path());
        cmd
    }

    fn bin_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join("bin").join(name)
    }

    fn log_path(&self) -> PathBuf {
        self.temp_dir.path().join("svn-checkout.log")
    }

    fn write_script(&self, path: &str, content: &str) {
        let child = self.temp_dir.child(path);
        child.write_str(content).expect("Failed to write script");
        make_executable(child.path());
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make script executable");
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}
