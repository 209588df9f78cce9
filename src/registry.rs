//! Registered externals: which externals a previous `checkout` created.
//!
//! `clean` needs to know what to remove without walking the remote tree
//! again, so a successful checkout records its entries. The store is a trait
//! so callers can keep the registration wherever they like; [`JsonRegistry`]
//! keeps it as a JSON file inside the git directory, where it is never
//! committed.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::coordinate::ExternalEntry;
use crate::error::{Error, Result};

const FORMAT_VERSION: u32 = 1;

/// Persistence for the set of checked-out externals.
pub trait RegistryStore {
    fn load(&self) -> Result<BTreeSet<ExternalEntry>>;
    fn save(&self, externals: &BTreeSet<ExternalEntry>) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    version: u32,
    externals: Vec<ExternalEntry>,
}

/// JSON file backed registry.
#[derive(Debug, Clone)]
pub struct JsonRegistry {
    path: PathBuf,
}

impl JsonRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Registry named `file_name` inside `git_dir`.
    pub fn in_git_dir(git_dir: &Path, file_name: &str) -> Self {
        Self::new(git_dir.join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStore for JsonRegistry {
    fn load(&self) -> Result<BTreeSet<ExternalEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };

        let file: RegistryFile = serde_json::from_str(&content)?;
        if file.version != FORMAT_VERSION {
            return Err(Error::Registry {
                message: format!(
                    "unsupported registry version {} in {}",
                    file.version,
                    self.path.display()
                ),
            });
        }
        Ok(file.externals.into_iter().collect())
    }

    fn save(&self, externals: &BTreeSet<ExternalEntry>) -> Result<()> {
        let file = RegistryFile {
            version: FORMAT_VERSION,
            externals: externals.iter().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        // staged write, the rename replaces the previous registry in one step
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;

        debug!(
            "registered {} external(s) in {}",
            externals.len(),
            self.path.display()
        );
        Ok(())
    }
}
