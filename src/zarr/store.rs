//! Minimal filesystem-backed key/value access to a Zarr store.

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::error::NgffError;

/// Read-only view of a Zarr store rooted at a directory.
///
/// Keys are `/`-separated paths relative to the root, e.g. `.zattrs` or
/// `A/1/0/.zarray`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// A store rooted at a sub-path of this one (used for the
    /// bioformats2raw layout, where the image lives under `0/`).
    pub fn sub(&self, path: &str) -> Self {
        Self {
            root: self.root.join(path),
        }
    }

    /// Raw bytes for `key`.
    pub fn get(&self, key: &str) -> Result<Vec<u8>, NgffError> {
        fs::read(self.root.join(key)).map_err(|source| NgffError::Io {
            key: key.to_string(),
            source,
        })
    }

    /// `key` parsed as JSON.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<T, NgffError> {
        let bytes = self.get(key)?;
        serde_json::from_slice(&bytes).map_err(|source| NgffError::Json {
            key: key.to_string(),
            source,
        })
    }
}
