use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to resolve program at {path}: {reason}")]
    Resolve { path: PathBuf, reason: String },

    #[error("watch error: {0}")]
    Watch(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl IndexError {
    /// Builds a resolution error for the given path.
    pub fn resolve(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::Resolve {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
