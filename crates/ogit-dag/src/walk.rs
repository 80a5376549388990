//! Depth-first ancestry walk.
//!
//! Each commit's parents are processed in header order. For every parent an
//! edge is emitted; the walk descends into the parent only the first time it
//! is seen. The visited set is supplied by the caller and may span several
//! walks, so converging histories are expanded once and adversarial cycles
//! terminate.
//!
//! The walk keeps an explicit stack rather than recursing, so deep histories
//! cannot overflow the call stack.

use std::collections::HashSet;

use ogit_store::{ObjectStore, StoreResult};
use ogit_types::ObjectId;
use tracing::debug;

/// A parent link from `child` to `parent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AncestryEdge {
    pub child: ObjectId,
    pub parent: ObjectId,
}

struct Frame {
    id: ObjectId,
    parents: Vec<ObjectId>,
    next: usize,
}

fn frame<S: ObjectStore>(store: &S, id: ObjectId) -> StoreResult<Frame> {
    let parents = store.read_commit(&id)?.parents()?;
    debug!(commit = %id.short_hex(), parents = parents.len(), "visiting commit");
    Ok(Frame {
        id,
        parents,
        next: 0,
    })
}

/// Walk the ancestry of `start`, returning edges in emission order.
///
/// `start` is added to `visited` before its parents are read. A commit that
/// is already in `visited` when reached is not expanded again, though the
/// edge leading to it is still reported.
///
/// Fails with `NotFound` for a missing commit, and with a format error if a
/// visited object is not a commit or has a malformed `parent` header.
pub fn walk<S: ObjectStore>(
    store: &S,
    start: ObjectId,
    visited: &mut HashSet<ObjectId>,
) -> StoreResult<Vec<AncestryEdge>> {
    let mut edges = Vec::new();
    if !visited.insert(start) {
        return Ok(edges);
    }

    let mut stack = vec![frame(store, start)?];
    while let Some(top) = stack.last_mut() {
        let Some(&parent) = top.parents.get(top.next) else {
            stack.pop();
            continue;
        };
        top.next += 1;
        edges.push(AncestryEdge {
            child: top.id,
            parent,
        });
        if visited.insert(parent) {
            stack.push(frame(store, parent)?);
        }
    }

    Ok(edges)
}

/// Every commit reachable from `start` (inclusive), in first-visit order.
pub fn ancestors<S: ObjectStore>(store: &S, start: ObjectId) -> StoreResult<Vec<ObjectId>> {
    let mut visited = HashSet::new();
    let edges = walk(store, start, &mut visited)?;
    Ok(visit_order(start, &edges))
}

/// `start` followed by each edge's parent the first time it appears.
///
/// For edges produced by [`walk`] this is the order commits were expanded.
pub fn visit_order(start: ObjectId, edges: &[AncestryEdge]) -> Vec<ObjectId> {
    let mut order = vec![start];
    let mut seen = HashSet::from([start]);
    for edge in edges {
        if seen.insert(edge.parent) {
            order.push(edge.parent);
        }
    }
    order
}
