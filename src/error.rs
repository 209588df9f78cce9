//! # Error Handling
//!
//! This module defines the centralized error type for `git-svn-externals`.
//! It uses the `thiserror` library to create an `Error` enum covering every
//! environmental failure the tool can run into, each with enough context to
//! produce a useful message on the error stream.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants group failures by where they happen:
//!   locating the git work tree, reading `git svn info`, walking the remote
//!   tree, parsing `svn:externals`, running `svn`, and persisting the registry
//!   of checked-out externals.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The checkout phase has its own failure payloads (`OneCheckoutError` and
//! `CheckoutOperationError` in `phases::checkout`) because a failed checkout
//! must carry the set of paths that need compensation, not just a message.

use thiserror::Error;

/// Main error type for git-svn-externals operations
#[derive(Error, Debug)]
pub enum Error {
    /// The git work tree could not be located, or the repository is bare.
    #[error("Working tree error: {message}")]
    WorkingRoot { message: String },

    /// `git svn info` failed or its output did not contain a URL and revision.
    #[error("git svn info error: {message}")]
    BridgeInfo { message: String },

    /// Talking to the remote repository failed while walking `path`.
    #[error("Remote traversal error at [{path}]: {message}")]
    Traversal { path: String, message: String },

    /// An `svn:externals` declaration could not be parsed.
    #[error("Invalid svn:externals on [{path}] at line [{line}]: {message}")]
    ExternalsParse {
        path: String,
        line: String,
        message: String,
    },

    /// An `svn` subcommand could not be run or returned a failure status.
    #[error("svn command failed for {url}: {command} - {message}")]
    SvnCommand {
        command: String,
        url: String,
        message: String,
    },

    /// Reading or writing the registered externals failed.
    #[error("Registry error: {message}")]
    Registry { message: String },

    /// A mutex guarding shared state has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
