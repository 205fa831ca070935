use std::path::PathBuf;

/// Central error type for Fleet.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("git error: {message}")]
    GitError { message: String },

    #[error("merge conflict on branch {branch}: {message}")]
    MergeConflict { branch: String, message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}
