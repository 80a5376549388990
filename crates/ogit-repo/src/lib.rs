//! Repository layout and working-tree operations for OGit.
//!
//! - [`Repository`] -- creates and opens the `.ogit` directory and its
//!   configuration, and hands out the loose object store
//! - [`checkout`] / [`materialize`] -- write a stored tree onto the filesystem
//! - [`write_tree_from_dir`] -- the inverse: store a directory as blobs and trees

pub mod checkout;
pub mod config;
pub mod error;
pub mod repository;
pub mod snapshot;

pub use checkout::{checkout, materialize};
pub use config::{CoreConfig, RepoConfig};
pub use error::{RepoError, RepoResult};
pub use repository::Repository;
pub use snapshot::write_tree_from_dir;
