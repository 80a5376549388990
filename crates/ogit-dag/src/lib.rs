//! Commit ancestry traversal for OGit.
//!
//! Walks `parent` links from a starting commit through an
//! [`ObjectStore`](ogit_store::ObjectStore), visiting each commit at most
//! once, and reports the child → parent edges it crosses. Rendering the
//! edges (e.g. as Graphviz) is left to the caller.

pub mod walk;

pub use walk::{ancestors, visit_order, walk, AncestryEdge};
