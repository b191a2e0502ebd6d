//! Where layout XML comes from.
//!
//! The loader never touches the file system itself; it asks a
//! [`LayoutSource`] for the text of a resolved path.  [`FsLayoutSource`]
//! reads real files, [`MemoryLayoutSource`] serves a fixed set of documents
//! (tests, embedded layouts).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("layout resource {} does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error reading layout resource {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Supplies the raw text of layout resources.
#[cfg_attr(test, mockall::automock)]
pub trait LayoutSource {
    fn read_to_string(&self, path: &Path) -> Result<String, SourceError>;
}

/// Reads layouts from the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLayoutSource;

impl LayoutSource for FsLayoutSource {
    fn read_to_string(&self, path: &Path) -> Result<String, SourceError> {
        std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                SourceError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }
}

/// Serves layouts from memory, keyed by path.
#[derive(Debug, Default, Clone)]
pub struct MemoryLayoutSource {
    files: HashMap<PathBuf, String>,
}

impl MemoryLayoutSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, path: impl Into<PathBuf>, xml: impl Into<String>) -> Self {
        self.insert(path, xml);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, xml: impl Into<String>) {
        self.files.insert(path.into(), xml.into());
    }
}

impl LayoutSource for MemoryLayoutSource {
    fn read_to_string(&self, path: &Path) -> Result<String, SourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                path: path.to_path_buf(),
            })
    }
}
