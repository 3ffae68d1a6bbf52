//! Basis synthesis
//!
//! Rebuilds the signal from an unordered set of basis nodes. Pending
//! buffers sit in a max-heap keyed by (depth descending, index ascending),
//! so the deepest remaining sibling group always pops first and in role
//! order. Each group is merged by the transform's inverse step and its
//! parent pushed back; merging the level-0 roots yields the signal.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use ndarray::{Array, Dimension};
use tracing::{info, trace};

use crate::transform::Decomposition;
use crate::tree::{Node, NodeKey};
use crate::BasisError;

struct Pending<D: Dimension> {
    key: NodeKey,
    buffer: Array<f64, D>,
}

impl<D: Dimension> PartialEq for Pending<D> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<D: Dimension> Eq for Pending<D> {}

impl<D: Dimension> PartialOrd for Pending<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<D: Dimension> Ord for Pending<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .depth
            .cmp(&other.key.depth)
            .then(other.key.index.cmp(&self.key.index))
    }
}

/// Merge `nodes` back into the signal they were selected from.
///
/// The nodes must form a cover produced from one tree: any order is
/// accepted, gaps and overlaps are reported as [`BasisError::ShapeMismatch`].
pub fn synthesize<T>(nodes: Vec<Node<T::Dim>>, transform: &T) -> Result<Array<f64, T::Dim>, BasisError>
where
    T: Decomposition,
{
    let branching = T::BRANCHING;
    let lineage: Arc<[T::Dim]> = match nodes.first() {
        Some(node) => Arc::clone(node.lineage()),
        None => {
            return Err(BasisError::ShapeMismatch(
                "cannot synthesize from an empty basis".to_string(),
            ))
        }
    };

    let count = nodes.len();
    let mut heap: BinaryHeap<Pending<T::Dim>> = nodes
        .into_iter()
        .map(|node| Pending {
            key: node.key(),
            buffer: node.into_coefficients(),
        })
        .collect();

    let mut merges = 0usize;
    while let Some(first) = heap.pop() {
        let depth = first.key.depth;
        let parent = first.key.index / branching;

        let mut group = Vec::with_capacity(branching);
        group.push(first);
        while group.len() < branching {
            let sibling = heap.peek().map_or(false, |next| {
                next.key.depth == depth && next.key.index / branching == parent
            });
            if !sibling {
                break;
            }
            if let Some(next) = heap.pop() {
                group.push(next);
            }
        }

        let complete = group.len() == branching
            && group
                .iter()
                .enumerate()
                .all(|(role, pending)| pending.key.index == parent * branching + role);
        if !complete {
            let found: Vec<NodeKey> = group.iter().map(|p| p.key).collect();
            return Err(BasisError::ShapeMismatch(format!(
                "incomplete sibling group under ({},{}): found {:?}",
                depth as isize - 1,
                parent,
                found
            )));
        }

        let target = lineage.get(depth).ok_or_else(|| {
            BasisError::ShapeMismatch(format!("no recorded shape for depth {depth}"))
        })?;
        let views: Vec<_> = group.iter().map(|p| p.buffer.view()).collect();
        let merged = transform.inverse_step(&views, target)?;
        merges += 1;
        trace!(depth, parent, "merged sibling group");

        if depth == 0 {
            if !heap.is_empty() {
                let leftover: Vec<NodeKey> = heap.iter().map(|p| p.key).collect();
                return Err(BasisError::ShapeMismatch(format!(
                    "nodes left after reaching the signal: {leftover:?}"
                )));
            }
            info!(nodes = count, merges, "signal synthesized");
            return Ok(merged);
        }

        heap.push(Pending {
            key: NodeKey::new(depth - 1, parent),
            buffer: merged,
        });
    }

    Err(BasisError::ShapeMismatch(
        "basis does not reach the signal".to_string(),
    ))
}
