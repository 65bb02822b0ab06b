//! Page sources
//!
//! A `PageSource` supplies the raw text of a site file. The core never
//! retries a failed fetch; the failure is reported to whoever opened the page.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a page or the offers document
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file does not exist in the source
    #[error("{0} not found")]
    NotFound(String),

    /// The file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The offers document is not valid JSON of the expected shape
    #[error("Invalid offers document {file}: {source}")]
    InvalidOffers {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplier of raw site files
pub trait PageSource {
    /// Fetch the text of a file
    ///
    /// # Parameters
    /// * `file` - File name relative to the site root
    ///
    /// # Returns
    /// * `Ok(String)` - File content
    /// * `Err(LoadError)` - Missing or unreadable file
    fn fetch(&self, file: &str) -> Result<String, LoadError>;
}

/// Reads site files from a directory on disk
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl PageSource for DirSource {
    fn fetch(&self, file: &str) -> Result<String, LoadError> {
        let path = self.root.join(file);
        log::debug!("Fetching {}", path.display());
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(path.display().to_string())
            } else {
                LoadError::Io { path, source }
            }
        })
    }
}

/// In-memory source keyed by file name
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySource {
    pub files: std::collections::HashMap<String, String>,
    pub fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemorySource {
    pub fn with(mut self, file: &str, content: &str) -> Self {
        self.files.insert(file.to_string(), content.to_string());
        self
    }
}

#[cfg(test)]
impl PageSource for MemorySource {
    fn fetch(&self, file: &str) -> Result<String, LoadError> {
        self.fetches
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.files
            .get(file)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(file.to_string()))
    }
}
