use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read sky map '{}': {reason}", .path.display())]
    MapRead { path: PathBuf, reason: String },

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("position (ra={ra}, dec={dec}) is not covered by the sky map")]
    OutOfMap { ra: f64, dec: f64 },

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn map_read(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::MapRead {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
