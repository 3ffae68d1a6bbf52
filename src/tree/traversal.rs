//! Top-down walk over a marked tree
//!
//! Explicit stack of keys, no recursion. Starting from the level-0 roots, a
//! node that keeps itself is emitted and its subtree skipped; a node that
//! splits is replaced by its children.

use ndarray::Dimension;

use super::{NodeKey, Tree};
use crate::BasisError;

/// Iterator over the keys of the nodes a marked tree keeps.
///
/// Keys come out in depth-first preorder, children in role order.
#[derive(Debug)]
pub struct BasisWalk<'a, D: Dimension> {
    tree: &'a Tree<D>,
    stack: Vec<NodeKey>,
    failed: bool,
}

impl<'a, D: Dimension> BasisWalk<'a, D> {
    /// Start a walk at the level-0 roots.
    pub fn new(tree: &'a Tree<D>) -> Self {
        let mut stack: Vec<NodeKey> = tree
            .level(0)
            .map(|roots| roots.iter().map(|node| node.key()).collect())
            .unwrap_or_default();
        stack.reverse();
        Self {
            tree,
            stack,
            failed: false,
        }
    }

    fn step(&mut self, key: NodeKey) -> Result<Option<NodeKey>, BasisError> {
        let branching = self.tree.branching();
        // Children are pushed only after their group was found complete.
        let scores = self
            .tree
            .node(key)
            .and_then(|node| node.scores())
            .ok_or(BasisError::UnmarkedNode {
                depth: key.depth,
                index: key.index,
            })?;

        if scores.keeps_self {
            return Ok(Some(key));
        }

        let found = self.tree.children_present(key);
        if found != branching {
            return Err(BasisError::IncompleteTree {
                depth: key.depth,
                index: key.index,
                expected: branching,
                found,
            });
        }
        let children: Vec<NodeKey> = key.children(branching).collect();
        self.stack.extend(children.into_iter().rev());
        Ok(None)
    }
}

impl<D: Dimension> Iterator for BasisWalk<'_, D> {
    type Item = Result<NodeKey, BasisError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while let Some(key) = self.stack.pop() {
            match self.step(key) {
                Ok(Some(kept)) => return Some(Ok(kept)),
                Ok(None) => continue,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}
