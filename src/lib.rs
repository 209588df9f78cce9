//! # git-svn-externals Library
//!
//! This library checks out Subversion externals for a git repository cloned
//! with `git svn`. `git svn` ignores `svn:externals`, so a clone is missing
//! every directory the original working copy pulled in from elsewhere. This
//! crate finds those declarations on the remote side and materializes them in
//! the git work tree.
//!
//! ## Quick Example
//!
//! ```
//! use git_svn_externals::coordinate::Coordinate;
//! use git_svn_externals::externals;
//!
//! let entries = externals::parse("/vendor/", "-r42 svn://example.com/lib/trunk lib").unwrap();
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].target_path.to_str(), Some("/vendor/lib"));
//! assert_eq!(entries[0].source, Coordinate::new("svn://example.com/lib/trunk", 42));
//! ```
//!
//! ## Core Concepts
//!
//! - **Coordinates (`coordinate`)**: a repository URL plus revision, where
//!   revision 0 means HEAD, and the `ExternalEntry` tying a target path to one.
//! - **Externals grammar (`externals`)**: parsing `svn:externals` values in
//!   both the pre-1.5 and the current syntax.
//! - **Subversion access (`svn`, `pool`)**: traits for remote queries and
//!   checkouts, their `svn` command-line implementations, and a per-run pool
//!   caching one session per repository URL.
//! - **Git side (`git`)**: locating the work tree and reading `git svn info`.
//! - **Registry (`registry`)**: which externals a checkout created, so `clean`
//!   can remove them later.
//!
//! ## Execution Flow
//!
//! The `checkout` command runs:
//!
//! 1.  **Locate**: find the git work tree and the SVN URL and revision it was
//!     cloned from.
//! 2.  **Discovery**: walk the remote tree breadth-first, collecting externals.
//! 3.  **Checkout**: check out each distinct source once, link duplicates.
//! 4.  **Rollback**: on failure, remove everything this run created.
//!
//! The `clean` command loads the registry and removes what it lists.

pub mod config;
pub mod coordinate;
pub mod error;
pub mod exit_codes;
pub mod externals;
pub mod git;
pub mod phases;
pub mod pool;
pub mod registry;
pub mod svn;
