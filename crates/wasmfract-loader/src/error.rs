use std::path::PathBuf;

use thiserror::Error;

/// Fatal loading failure. A partially built registry is never returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("compiling '{library}' from {path}: {message}")]
    Compile {
        library: String,
        path: PathBuf,
        message: String,
    },
    #[error("instantiating '{library}': {message}")]
    Instantiate { library: String, message: String },
    #[error("defining {library}.{name}: {message}")]
    Define {
        library: String,
        name: String,
        message: String,
    },
}

impl LoadError {
    /// Library whose load step failed, when one is known.
    #[must_use]
    pub fn library(&self) -> Option<&str> {
        match self {
            Self::Read { .. } => None,
            Self::Compile { library, .. }
            | Self::Instantiate { library, .. }
            | Self::Define { library, .. } => Some(library),
        }
    }
}
