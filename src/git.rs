//! Git side of the bridge: finding the work tree and asking `git svn` where
//! it came from.

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::Repository;
use log::debug;
use regex::Regex;

use crate::coordinate::Coordinate;
use crate::error::{Error, Result};

/// A non-bare git repository: its work tree and its `.git` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkTree {
    pub root: PathBuf,
    pub git_dir: PathBuf,
}

/// Find the work tree of the git repository enclosing `start`.
///
/// Fails if no repository is found or if the repository is bare.
pub fn locate_work_tree(start: &Path) -> Result<WorkTree> {
    let repo = Repository::discover(start).map_err(|e| Error::WorkingRoot {
        message: format!(
            "no git repository found from [{}]: {}",
            start.display(),
            e.message()
        ),
    })?;

    if repo.is_bare() {
        return Err(Error::WorkingRoot {
            message: "Cannot work with a bare repository!".to_string(),
        });
    }

    let root = repo
        .workdir()
        .ok_or_else(|| Error::WorkingRoot {
            message: format!("repository at [{}] has no work tree", repo.path().display()),
        })?
        .to_path_buf();

    debug!("git work tree at {}", root.display());
    Ok(WorkTree {
        root,
        git_dir: repo.path().to_path_buf(),
    })
}

/// Run `git svn info` in `work_tree` and return its standard output.
pub fn git_svn_info(git_binary: &str, work_tree: &Path) -> Result<String> {
    let output = Command::new(git_binary)
        .args(["svn", "info"])
        .current_dir(work_tree)
        .output()
        .map_err(|e| Error::BridgeInfo {
            message: format!("could not run `{} svn info`: {}", git_binary, e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::BridgeInfo {
            message: format!(
                "git svn info return status was {}: {}",
                output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                stderr.trim()
            ),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Extract the SVN coordinate of the clone root from `git svn info` output.
///
/// Requires a `URL: <url>` line and a `Revision: <digits>` line anywhere in
/// the output.
pub fn parse_svn_info(output: &str) -> Result<Coordinate> {
    let url_re = Regex::new(r"(?m)^URL:[ \t]*(\S+)[ \t]*\r?$")?;
    let rev_re = Regex::new(r"(?m)^Revision:[ \t]*(\S+)[ \t]*\r?$")?;

    let url = url_re
        .captures(output)
        .map(|c| c[1].to_string())
        .ok_or_else(|| Error::BridgeInfo {
            message: "Could not read a URL line from git svn info output!".to_string(),
        })?;

    let rev_text = rev_re
        .captures(output)
        .map(|c| c[1].to_string())
        .ok_or_else(|| Error::BridgeInfo {
            message: "Could not read a Revision line from git svn info output!".to_string(),
        })?;

    let revision = if rev_text.bytes().all(|b| b.is_ascii_digit()) {
        rev_text.parse::<u64>().ok()
    } else {
        None
    }
    .ok_or_else(|| Error::BridgeInfo {
        message: format!("Could not parse revision [{}] from git svn info output!", rev_text),
    })?;

    Ok(Coordinate::new(url, revision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    const EXAMPLE_OUTPUT: &str = "Path: .
URL: svn://localhost/foo/trunk
Repository Root: svn://localhost/foo
Repository UUID: dfd36ecc-345f-42c4-9c1e-50ad7ca3c78d
Revision: 9
Node Kind: directory
Schedule: normal
Last Changed Author: (no author)
Last Changed Rev: 5
Last Changed Date: 2016-05-07 12:56:59 +0200 (Sat, 07 May 2016)

";

    #[test]
    fn test_parse_svn_info_example() {
        let coordinate = parse_svn_info(EXAMPLE_OUTPUT).unwrap();
        assert_eq!(coordinate.repository_url, "svn://localhost/foo/trunk");
        assert_eq!(coordinate.revision, 9);
    }

    #[test]
    fn test_parse_svn_info_revision_before_url() {
        let output = "Revision: 12\nURL: https://svn.example.com/repo/trunk\n";
        let coordinate = parse_svn_info(output).unwrap();
        assert_eq!(coordinate.repository_url, "https://svn.example.com/repo/trunk");
        assert_eq!(coordinate.revision, 12);
    }

    #[test]
    fn test_parse_svn_info_crlf() {
        let output = "URL: svn://host/repo\r\nRevision: 3\r\n";
        let coordinate = parse_svn_info(output).unwrap();
        assert_eq!(coordinate, Coordinate::new("svn://host/repo", 3));
    }

    #[test]
    fn test_parse_svn_info_missing_url() {
        let output = "Repository Root: svn://localhost/foo\nRevision: 9\n";
        assert!(matches!(
            parse_svn_info(output),
            Err(Error::BridgeInfo { .. })
        ));
    }

    #[test]
    fn test_parse_svn_info_missing_revision() {
        let output = "URL: svn://localhost/foo\nLast Changed Rev: 5\n";
        assert!(parse_svn_info(output).is_err());
    }

    #[test]
    fn test_parse_svn_info_non_numeric_revision() {
        let output = "URL: svn://localhost/foo\nRevision: nine\n";
        let err = parse_svn_info(output).unwrap_err();
        assert!(err.to_string().contains("nine"));
    }

    #[test]
    fn test_parse_svn_info_revision_overflow() {
        let output = "URL: svn://localhost/foo\nRevision: 99999999999999999999999\n";
        assert!(parse_svn_info(output).is_err());
    }

    #[test]
    fn test_locate_work_tree_outside_repository() {
        let temp_dir = TempDir::new().unwrap();
        // A fresh temp dir may still sit below some repository on the host,
        // so only the error shape is checked when discovery fails.
        if let Err(e) = locate_work_tree(temp_dir.path()) {
            assert!(matches!(e, Error::WorkingRoot { .. }));
        }
    }

    #[test]
    fn test_locate_work_tree_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init(temp_dir.path()).unwrap();
        let nested = temp_dir.path().join("a_thing").join("lol");
        std::fs::create_dir_all(&nested).unwrap();

        let work_tree = locate_work_tree(&nested).unwrap();
        assert_eq!(
            work_tree.root.canonicalize().unwrap(),
            temp_dir.path().canonicalize().unwrap()
        );
        assert!(work_tree.git_dir.ends_with(".git") || work_tree.git_dir.ends_with(".git/"));
    }

    #[test]
    fn test_locate_work_tree_bare_repository() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init_bare(temp_dir.path()).unwrap();

        let err = locate_work_tree(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("bare repository"));
    }

    proptest! {
        #[test]
        fn prop_parse_svn_info_roundtrips_url_and_revision(
            url in "(svn|https|file)://[a-z]{1,12}(/[a-z0-9_]{1,8}){0,4}",
            revision in any::<u64>(),
            noise in "[A-Za-z ]{0,20}",
        ) {
            let output = format!(
                "Path: .\n{noise}\nURL: {url}\nRepository Root: svn://elsewhere\nRevision: {revision}\nLast Changed Rev: 1\n"
            );
            let coordinate = parse_svn_info(&output).unwrap();
            prop_assert_eq!(coordinate.repository_url, url);
            prop_assert_eq!(coordinate.revision, revision);
        }
    }
}
