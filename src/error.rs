//! Error types for compiling and embedding shaders.

use std::path::PathBuf;
use thiserror::Error;

use crate::tools::ToolError;

/// Main error type for embedding operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An external compiler or translator failed
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Input file missing or unreadable
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generated file could not be written
    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scratch directory for intermediates could not be created
    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    /// Compiler emitted something too short to be a C array
    #[error("Malformed compiler output in {path:?}: expected a C array literal")]
    MalformedArtifact { path: PathBuf },

    /// No constant name can be derived from this path
    #[error("Cannot derive a constant name from {0:?}")]
    InvalidName(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }

    /// True when the failure is a missing input file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
