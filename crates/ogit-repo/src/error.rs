use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not an ogit repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("directory is not empty: {}", .0.display())]
    NotEmpty(PathBuf),

    #[error("configuration file is missing: {}", .0.display())]
    MissingConfig(PathBuf),

    #[error("unsupported repositoryformatversion {0}")]
    UnsupportedFormatVersion(u32),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("could not write configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("store error: {0}")]
    Store(#[from] ogit_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;
