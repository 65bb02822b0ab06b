//! Save and copy destinations
//!
//! The core hands finished text to a `Sink`. A download writes a named file;
//! a copy delivers bare content. Whether the action succeeded decides whether
//! the edit model may be marked clean.

use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Media type of regenerated pages
pub const HTML_MEDIA_TYPE: &str = "text/html";

/// Media type of the offers document
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Errors reported by a sink
#[derive(Error, Debug)]
pub enum SinkError {
    /// The sink does not offer this action
    #[error("{0} is not available for this output")]
    Unavailable(&'static str),

    /// Writing the output failed
    #[error("Failed to write {target}: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for saved or copied content
pub trait Sink {
    /// Deliver a named file
    fn download(&mut self, filename: &str, content: &str, media_type: &str) -> Result<(), SinkError>;

    /// Deliver bare content
    fn copy(&mut self, content: &str) -> Result<(), SinkError>;
}

/// Writes downloads into an output directory
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }
}

impl Sink for DirSink {
    fn download(&mut self, filename: &str, content: &str, media_type: &str) -> Result<(), SinkError> {
        let path = self.dir.join(filename);
        let io_err = |source| SinkError::Io {
            target: path.display().to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        std::fs::write(&path, content).map_err(io_err)?;
        log::info!("Wrote {} ({}, {} bytes)", path.display(), media_type, content.len());
        Ok(())
    }

    fn copy(&mut self, _content: &str) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("copy"))
    }
}

/// Prints content to standard output
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    fn emit(content: &str) -> Result<(), SinkError> {
        let io_err = |source| SinkError::Io {
            target: "stdout".to_string(),
            source,
        };
        let mut out = std::io::stdout().lock();
        out.write_all(content.as_bytes()).map_err(io_err)?;
        out.flush().map_err(io_err)
    }
}

impl Sink for StdoutSink {
    fn download(&mut self, filename: &str, content: &str, media_type: &str) -> Result<(), SinkError> {
        log::info!("Printing {} ({})", filename, media_type);
        Self::emit(content)
    }

    fn copy(&mut self, content: &str) -> Result<(), SinkError> {
        Self::emit(content)
    }
}

/// Records deliveries; optionally refuses them
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    pub downloads: Vec<(String, String, String)>,
    pub copies: Vec<String>,
    pub fail: bool,
}

#[cfg(test)]
impl Sink for MemorySink {
    fn download(&mut self, filename: &str, content: &str, media_type: &str) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Unavailable("download"));
        }
        self.downloads
            .push((filename.to_string(), content.to_string(), media_type.to_string()));
        Ok(())
    }

    fn copy(&mut self, content: &str) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Unavailable("copy"));
        }
        self.copies.push(content.to_string());
        Ok(())
    }
}
