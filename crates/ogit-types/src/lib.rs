//! Foundation types for OGit.
//!
//! This crate provides the identifier and kind types shared by every other
//! OGit crate.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Content-addressed identifier (SHA-1 of an object envelope)
//! - [`ObjectKind`]: The closed set of object kinds: blob, tree, commit

pub mod error;
pub mod kind;
pub mod object;

pub use error::TypeError;
pub use kind::ObjectKind;
pub use object::ObjectId;
