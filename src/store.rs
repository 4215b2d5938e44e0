//! Credential Store Adapter
//!
//! Read-only view over the hierarchical encrypted credential store. Category
//! directories contain further entries; leaf files hold ciphertext. The store
//! binds lazily to a backing location resolved from configuration the first
//! time it is consulted, and never caches directory listings, so every
//! matching pass sees the store as it is on disk.

use crate::config::StoreConfig;
use crate::error::{PassfillError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// File extension carried by encrypted credential files.
const ENCRYPTED_EXTENSION: &str = "gpg";

/// Whether an entry is a container or a fillable credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory grouping further entries; never fillable itself.
    Category,
    /// A single encrypted credential file.
    Leaf,
}

/// One entry in the credential tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialEntry {
    /// Display name derived from the path segment.
    pub label: String,
    pub kind: EntryKind,
    /// Backing location used to fetch ciphertext or children on demand.
    pub location: PathBuf,
}

/// Listing capability of the credential repository.
pub trait CredentialSource: Send + Sync {
    /// List the entries directly under `dir`, or under the store root when
    /// `None`. Triggers lazy binding of the backing location.
    fn list(&self, dir: Option<&Path>) -> Result<Vec<CredentialEntry>>;

    /// Whether the backing location exists and holds anything. Advisory; a
    /// `false` here is not a failure.
    fn is_initialized(&self) -> bool;

    /// Fetch the ciphertext bytes behind a leaf entry.
    fn read_ciphertext(&self, location: &Path) -> Result<Vec<u8>>;
}

/// Filesystem-backed credential store.
pub struct FsCredentialStore {
    external_store: bool,
    external_location: Option<PathBuf>,
    default_location: PathBuf,
    root: RwLock<Option<PathBuf>>,
}

impl FsCredentialStore {
    pub fn new(config: &StoreConfig, default_location: PathBuf) -> Self {
        Self {
            external_store: config.external_store,
            external_location: config.external_store_location.clone(),
            default_location,
            root: RwLock::new(None),
        }
    }

    /// Build a store from configuration, defaulting to the in-app location.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(config, crate::config::default_store_location()?))
    }

    /// Resolve and remember the backing location.
    fn bind(&self) -> Result<PathBuf> {
        if let Some(root) = self
            .root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(root.clone());
        }

        let root = if self.external_store {
            self.external_location
                .clone()
                .ok_or(PassfillError::ConfigurationRequired)?
        } else {
            self.default_location.clone()
        };

        if !root.is_dir() {
            warn!(
                location = %root.display(),
                "credential store location does not exist yet"
            );
        }

        debug!(location = %root.display(), "bound credential store");
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = Some(root.clone());
        Ok(root)
    }
}

impl CredentialSource for FsCredentialStore {
    fn list(&self, dir: Option<&Path>) -> Result<Vec<CredentialEntry>> {
        let root = self.bind()?;
        let base = dir.map(Path::to_path_buf).unwrap_or(root);

        if !base.is_dir() {
            warn!(location = %base.display(), "listing an absent store directory");
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&base)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            // dotfiles (.git and friends) are bookkeeping, not credentials
            if name.starts_with('.') {
                continue;
            }

            if path.is_dir() {
                entries.push(CredentialEntry {
                    label: name,
                    kind: EntryKind::Category,
                    location: path,
                });
            } else if path
                .extension()
                .is_some_and(|ext| ext == ENCRYPTED_EXTENSION)
            {
                let label = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or(name);
                entries.push(CredentialEntry {
                    label,
                    kind: EntryKind::Leaf,
                    location: path,
                });
            }
        }

        entries.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(entries)
    }

    fn is_initialized(&self) -> bool {
        let Ok(root) = self.bind() else {
            return false;
        };
        match fs::read_dir(&root) {
            Ok(mut entries) => entries.next().is_some(),
            Err(_) => false,
        }
    }

    fn read_ciphertext(&self, location: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(location)?)
    }
}
