//! Cover ledger
//!
//! One bit per slot of the deepest level. A node at depth d, index i covers
//! slots [i * b^(D-d), (i + 1) * b^(D-d)) where D is the deepest depth, so a
//! node set is a cover iff every slot is claimed exactly once.

use bitvec::prelude::*;
use ndarray::Dimension;

use crate::tree::{Node, NodeKey};
use crate::BasisError;

/// Slot bookkeeping for one tree shape.
#[derive(Debug, Clone)]
pub struct CoverLedger {
    claimed: BitVec,
    branching: usize,
    deepest: usize,
}

impl CoverLedger {
    /// Ledger for a tree with `depth` levels and `branching` children per node.
    pub fn new(branching: usize, depth: usize) -> Self {
        let deepest = depth.saturating_sub(1);
        let slots = if depth == 0 {
            0
        } else {
            branching.pow(depth as u32)
        };
        Self {
            claimed: bitvec![0; slots],
            branching,
            deepest,
        }
    }

    /// Slot range covered by `key`.
    pub fn span(&self, key: NodeKey) -> Result<std::ops::Range<usize>, BasisError> {
        if key.depth > self.deepest || self.claimed.is_empty() {
            return Err(BasisError::ShapeMismatch(format!(
                "node ({},{}) lies below the deepest level {}",
                key.depth, key.index, self.deepest
            )));
        }
        let width = self.branching.pow((self.deepest - key.depth) as u32);
        let start = key.index * width;
        let end = start + width;
        if end > self.claimed.len() {
            return Err(BasisError::ShapeMismatch(format!(
                "node ({},{}) lies outside the tree",
                key.depth, key.index
            )));
        }
        Ok(start..end)
    }

    /// Claim the slots covered by `key`; fails if any is already claimed.
    pub fn claim(&mut self, key: NodeKey) -> Result<(), BasisError> {
        let span = self.span(key)?;
        if self.claimed[span.clone()].any() {
            return Err(BasisError::ShapeMismatch(format!(
                "node ({},{}) overlaps an earlier node",
                key.depth, key.index
            )));
        }
        self.claimed[span].fill(true);
        Ok(())
    }

    /// Whether every slot has been claimed.
    pub fn is_complete(&self) -> bool {
        !self.claimed.is_empty() && self.claimed.all()
    }

    /// Fraction of slots claimed.
    pub fn coverage(&self) -> f64 {
        if self.claimed.is_empty() {
            return 0.0;
        }
        self.claimed.count_ones() as f64 / self.claimed.len() as f64
    }
}

/// Check that `nodes` cover the signal exactly once.
///
/// The tree depth is taken from the node lineage.
pub fn verify_cover<D: Dimension>(nodes: &[Node<D>], branching: usize) -> Result<(), BasisError> {
    let depth = nodes
        .first()
        .map(|node| node.lineage().len())
        .ok_or_else(|| BasisError::ShapeMismatch("empty basis covers nothing".to_string()))?;

    let mut ledger = CoverLedger::new(branching, depth);
    for node in nodes {
        ledger.claim(node.key())?;
    }
    if !ledger.is_complete() {
        return Err(BasisError::ShapeMismatch(format!(
            "basis leaves gaps: {:.1}% of the signal covered",
            ledger.coverage() * 100.0
        )));
    }
    Ok(())
}
