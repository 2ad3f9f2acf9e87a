//! error types shared by the library and the command-line tools

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// input file unreadable or in an unsupported format. recovered by the
    /// batch loops: the file is logged and skipped.
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// output write failure. also recovered per file by the batch loops.
    #[error("failed to encode {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// malformed command-line input, e.g. a bad "R,G,B" color string or a
    /// grid with a zero count. fatal to the invocation.
    #[error("invalid {parameter}: {value:?}")]
    InvalidParameter {
        parameter: &'static str,
        value: String,
    },

    /// the configured input directory does not exist. fatal to the run.
    #[error("input directory {0:?} not found")]
    MissingInputDir(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn decode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Decode {
            path: path.into(),
            source,
        }
    }

    pub fn encode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Encode {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_parameter(parameter: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            value: value.into(),
        }
    }
}
