use std::fs;
use std::path::{Path, PathBuf};

use ogit_store::LooseObjectStore;
use tracing::{debug, info};

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};

/// Name of the repository metadata directory inside the worktree.
pub const OGIT_DIR: &str = ".ogit";

/// The only repository format this implementation reads and writes.
pub const FORMAT_VERSION: u32 = 0;

const DEFAULT_HEAD: &str = "ref: refs/heads/master\n";

/// An OGit repository: a worktree plus its `.ogit` metadata directory.
#[derive(Clone, Debug)]
pub struct Repository {
    worktree: PathBuf,
    ogit_dir: PathBuf,
    config: RepoConfig,
}

impl Repository {
    /// Create a new repository at `path`.
    ///
    /// `path` is created if missing. If it exists it must be an empty
    /// directory. Lays out `branches/`, `objects/`, `refs/tags/`,
    /// `refs/heads/`, a `HEAD` pointing at `master`, and the default config.
    pub fn init(path: impl AsRef<Path>) -> RepoResult<Self> {
        let worktree = path.as_ref().to_path_buf();
        if worktree.exists() {
            if !worktree.is_dir() {
                return Err(RepoError::NotADirectory(worktree));
            }
            if fs::read_dir(&worktree)?.next().is_some() {
                return Err(RepoError::NotEmpty(worktree));
            }
        } else {
            fs::create_dir_all(&worktree)?;
        }

        let ogit_dir = worktree.join(OGIT_DIR);
        for dir in ["branches", "objects", "refs/tags", "refs/heads"] {
            let path = ogit_dir.join(dir);
            fs::create_dir_all(&path)?;
            debug!(path = %path.display(), "created repository directory");
        }

        fs::write(ogit_dir.join("HEAD"), DEFAULT_HEAD)?;
        let config = RepoConfig::default();
        fs::write(ogit_dir.join("config"), config.to_toml()?)?;

        info!(worktree = %worktree.display(), "initialized empty repository");
        Ok(Self {
            worktree,
            ogit_dir,
            config,
        })
    }

    /// Open the repository whose worktree is `path`.
    ///
    /// Requires the `.ogit` directory and its config file, and rejects any
    /// format version other than [`FORMAT_VERSION`].
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::load(path.as_ref(), false)
    }

    /// Open `path` without validating the layout.
    ///
    /// A missing or unreadable config falls back to the default one. Used
    /// while a repository is still being assembled.
    pub fn open_forced(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::load(path.as_ref(), true)
    }

    fn load(path: &Path, force: bool) -> RepoResult<Self> {
        let worktree = path.to_path_buf();
        let ogit_dir = worktree.join(OGIT_DIR);
        if !force && !ogit_dir.is_dir() {
            return Err(RepoError::NotARepository(worktree));
        }

        let config_path = ogit_dir.join("config");
        let config = if config_path.is_file() {
            match fs::read_to_string(&config_path)
                .map_err(RepoError::from)
                .and_then(|text| RepoConfig::from_toml(&text))
            {
                Ok(config) => config,
                Err(err) if force => {
                    debug!(error = %err, "ignoring unreadable config");
                    RepoConfig::default()
                }
                Err(err) => return Err(err),
            }
        } else if force {
            RepoConfig::default()
        } else {
            return Err(RepoError::MissingConfig(config_path));
        };

        if !force && config.core.repositoryformatversion != FORMAT_VERSION {
            return Err(RepoError::UnsupportedFormatVersion(
                config.core.repositoryformatversion,
            ));
        }

        Ok(Self {
            worktree,
            ogit_dir,
            config,
        })
    }

    /// Open the repository containing `start`, searching parent directories.
    pub fn discover(start: impl AsRef<Path>) -> RepoResult<Self> {
        let start = start.as_ref();
        let mut current = Some(start);
        while let Some(dir) = current {
            if dir.join(OGIT_DIR).is_dir() {
                return Self::open(dir);
            }
            current = dir.parent();
        }
        Err(RepoError::NotARepository(start.to_path_buf()))
    }

    /// The working tree root.
    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    /// The `.ogit` directory.
    pub fn ogit_dir(&self) -> &Path {
        &self.ogit_dir
    }

    /// Loaded configuration.
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Loose object store under `.ogit/objects`.
    pub fn store(&self) -> LooseObjectStore {
        LooseObjectStore::new(self.ogit_dir.join("objects"))
    }
}
