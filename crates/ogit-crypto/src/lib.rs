//! Content hashing for OGit.
//!
//! Object identifiers are SHA-1 digests of the uncompressed object envelope.
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
