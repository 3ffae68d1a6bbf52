//! Complete wavelet-packet tree
//!
//! Level `d` holds `branching^(d + 1)` nodes in index order; the children
//! of node `(d, p)` are `(d + 1, branching * p .. branching * p + branching)`.
//! The tree is built once; afterwards only node scores change.

mod node;
mod traversal;

use std::fmt;
use std::sync::Arc;

use ndarray::{Array, ArrayView, Dimension};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

pub use node::{BasisOrder, Node, NodeKey, NodeScores};
pub use traversal::BasisWalk;

use crate::transform::Decomposition;
use crate::BasisError;

/// Wavelet-packet tree of one signal.
#[derive(Debug, Clone)]
pub struct Tree<D: Dimension> {
    levels: Vec<Vec<Node<D>>>,
    branching: usize,
}

impl<D: Dimension> Tree<D> {
    /// Decompose `signal` into a complete tree of `max_depth` levels.
    ///
    /// `None` uses the deepest level the transform supports for this shape.
    /// Fails with [`BasisError::InvalidDepth`] when the depth is 0 or beyond
    /// that maximum.
    pub fn build<T>(
        signal: ArrayView<'_, f64, D>,
        transform: &T,
        max_depth: Option<usize>,
    ) -> Result<Self, BasisError>
    where
        T: Decomposition<Dim = D>,
    {
        if signal.is_empty() {
            return Err(BasisError::EmptySignal);
        }

        let limit = transform.max_depth(&signal.raw_dim());
        let depth = max_depth.unwrap_or(limit);
        if depth == 0 || depth > limit {
            return Err(BasisError::InvalidDepth {
                requested: depth,
                max: limit,
            });
        }

        let mut shapes = vec![signal.raw_dim()];
        let mut buffers = vec![split_checked(transform, signal)?];
        for d in 1..depth {
            let previous = &buffers[d - 1];
            shapes.push(previous[0].raw_dim());
            let next = split_level(transform, previous)?;
            debug!(depth = d, nodes = next.len(), "built level");
            buffers.push(next);
        }

        let lineage: Arc<[D]> = shapes.into();
        let levels = buffers
            .into_iter()
            .enumerate()
            .map(|(d, level)| {
                level
                    .into_iter()
                    .enumerate()
                    .map(|(index, coefficients)| {
                        Node::new(coefficients, d, index, Arc::clone(&lineage))
                    })
                    .collect()
            })
            .collect();

        debug!(depth, branching = T::BRANCHING, "tree built");
        Ok(Self {
            levels,
            branching: T::BRANCHING,
        })
    }

    /// Assemble a tree from externally produced levels without checking
    /// completeness. Nodes within a level are sorted by index.
    pub fn from_levels(mut levels: Vec<Vec<Node<D>>>, branching: usize) -> Self {
        for level in &mut levels {
            level.sort_by_key(|node| node.index());
        }
        Self { levels, branching }
    }

    /// Number of levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Children per node.
    pub fn branching(&self) -> usize {
        self.branching
    }

    /// All levels, shallowest first.
    pub fn levels(&self) -> &[Vec<Node<D>>] {
        &self.levels
    }

    pub(crate) fn levels_mut(&mut self) -> &mut [Vec<Node<D>>] {
        &mut self.levels
    }

    /// Nodes at depth `d`.
    pub fn level(&self, d: usize) -> Option<&[Node<D>]> {
        self.levels.get(d).map(Vec::as_slice)
    }

    /// Node at `key`, if present.
    pub fn node(&self, key: NodeKey) -> Option<&Node<D>> {
        self.levels
            .get(key.depth)
            .and_then(|level| find_in_level(level, key.index))
    }

    /// Every node, level by level.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<D>> {
        self.levels.iter().flatten()
    }

    /// Number of children of `key` present in the tree.
    pub fn children_present(&self, key: NodeKey) -> usize {
        key.children(self.branching)
            .filter(|child| self.node(*child).is_some())
            .count()
    }

    /// Consume the tree, keeping the deepest level.
    pub fn into_leaves(mut self) -> Vec<Node<D>> {
        self.levels.pop().unwrap_or_default()
    }

    /// Consume the tree, moving out the nodes at `keys` in the given order.
    /// Missing keys are skipped.
    pub fn take(self, keys: &[NodeKey]) -> Vec<Node<D>> {
        let mut slots: Vec<(Vec<usize>, Vec<Option<Node<D>>>)> = self
            .levels
            .into_iter()
            .map(|level| {
                let indices = level.iter().map(Node::index).collect();
                (indices, level.into_iter().map(Some).collect())
            })
            .collect();

        keys.iter()
            .filter_map(|key| {
                let (indices, nodes) = slots.get_mut(key.depth)?;
                let position = indices.binary_search(&key.index).ok()?;
                nodes[position].take()
            })
            .collect()
    }
}

/// One `(depth,index)::[own|best]` line per node, level by level.
impl<D: Dimension> fmt::Display for Tree<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.nodes() {
            writeln!(f, "{node}")?;
        }
        Ok(())
    }
}

/// Binary search a level sorted by index.
pub(crate) fn find_in_level<D: Dimension>(level: &[Node<D>], index: usize) -> Option<&Node<D>> {
    level
        .binary_search_by_key(&index, Node::index)
        .ok()
        .map(|position| &level[position])
}

fn split_checked<T: Decomposition>(
    transform: &T,
    buffer: ArrayView<'_, f64, T::Dim>,
) -> Result<Vec<Array<f64, T::Dim>>, BasisError> {
    let parts = transform.forward_step(buffer)?;
    if parts.len() != T::BRANCHING {
        return Err(BasisError::ShapeMismatch(format!(
            "forward step produced {} subbands, expected {}",
            parts.len(),
            T::BRANCHING
        )));
    }
    Ok(parts)
}

#[cfg(not(feature = "parallel"))]
fn split_level<T: Decomposition>(
    transform: &T,
    previous: &[Array<f64, T::Dim>],
) -> Result<Vec<Array<f64, T::Dim>>, BasisError> {
    let mut next = Vec::with_capacity(previous.len() * T::BRANCHING);
    for buffer in previous {
        next.extend(split_checked(transform, buffer.view())?);
    }
    Ok(next)
}

#[cfg(feature = "parallel")]
fn split_level<T: Decomposition>(
    transform: &T,
    previous: &[Array<f64, T::Dim>],
) -> Result<Vec<Array<f64, T::Dim>>, BasisError> {
    let groups: Vec<Vec<Array<f64, T::Dim>>> = previous
        .par_iter()
        .map(|buffer| split_checked(transform, buffer.view()))
        .collect::<Result<_, _>>()?;
    Ok(groups.into_iter().flatten().collect())
}
