//! Wavelet-packet node (one subband)
//!
//! A node is created unscored by the tree builder and scored exactly once by
//! the selector. Coordinates:
//!   depth 0 = first decomposition below the signal
//!   child k of (d, p) = (d + 1, branching * p + k)

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use ndarray::{Array, ArrayViewD, ArrayViewMut, Dimension};

/// Subband coordinates, independent of the coefficient buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeKey {
    /// Decomposition depth (0 = first level below the signal).
    pub depth: usize,
    /// Sibling index within the level.
    pub index: usize,
}

impl NodeKey {
    /// Create a key.
    pub fn new(depth: usize, index: usize) -> Self {
        Self { depth, index }
    }

    /// Key of the parent, `None` for level-0 roots.
    pub fn parent(&self, branching: usize) -> Option<NodeKey> {
        (self.depth > 0).then(|| NodeKey::new(self.depth - 1, self.index / branching))
    }

    /// Keys of the children, in role order.
    pub fn children(&self, branching: usize) -> impl Iterator<Item = NodeKey> {
        let depth = self.depth + 1;
        let first = self.index * branching;
        (first..first + branching).map(move |index| NodeKey::new(depth, index))
    }

    /// Position among the siblings (`index mod branching`).
    #[inline]
    pub fn role(&self, branching: usize) -> usize {
        self.index % branching
    }
}

/// Emission order of a basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BasisOrder {
    /// Depth ascending, then index ascending.
    #[default]
    ShallowFirst,
    /// Depth descending, then index ascending.
    DeepFirst,
}

impl BasisOrder {
    /// Compare two keys under this order.
    pub fn compare(&self, a: &NodeKey, b: &NodeKey) -> Ordering {
        let by_depth = match self {
            BasisOrder::ShallowFirst => a.depth.cmp(&b.depth),
            BasisOrder::DeepFirst => b.depth.cmp(&a.depth),
        };
        by_depth.then(a.index.cmp(&b.index))
    }
}

impl std::str::FromStr for BasisOrder {
    type Err = crate::BasisError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "shallow" | "shallow-first" | "low" => Ok(BasisOrder::ShallowFirst),
            "deep" | "deep-first" | "high" => Ok(BasisOrder::DeepFirst),
            other => Err(crate::BasisError::InvalidConfiguration(format!(
                "unknown basis order '{other}'"
            ))),
        }
    }
}

/// Scores written by the selector's bottom-up pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeScores {
    /// Cost of this node's own coefficients.
    pub own_cost: f64,
    /// Minimal cost of any cover of this node's subtree.
    pub best_cost: f64,
    /// Whether the node keeps itself in the best cover of its subtree.
    pub keeps_self: bool,
}

/// One subband of a wavelet-packet tree.
#[derive(Debug, Clone)]
pub struct Node<D: Dimension> {
    coefficients: Array<f64, D>,
    key: NodeKey,
    lineage: Arc<[D]>,
    scores: Option<NodeScores>,
}

impl<D: Dimension> Node<D> {
    /// Create an unscored node.
    ///
    /// `lineage[d]` is the shape of the buffer that was split to produce the
    /// nodes at depth `d`; it must hold at least `depth + 1` entries.
    pub fn new(coefficients: Array<f64, D>, depth: usize, index: usize, lineage: Arc<[D]>) -> Self {
        debug_assert!(lineage.len() > depth, "lineage shorter than node depth");
        Self {
            coefficients,
            key: NodeKey::new(depth, index),
            lineage,
            scores: None,
        }
    }

    /// Coefficient buffer.
    pub fn coefficients(&self) -> &Array<f64, D> {
        &self.coefficients
    }

    /// Mutable coefficient view (thresholding in place).
    pub fn coefficients_mut(&mut self) -> ArrayViewMut<'_, f64, D> {
        self.coefficients.view_mut()
    }

    /// Coefficients as a dimension-erased view, the form cost functionals take.
    pub fn coefficients_dyn(&self) -> ArrayViewD<'_, f64> {
        self.coefficients.view().into_dyn()
    }

    /// Take the coefficient buffer.
    pub fn into_coefficients(self) -> Array<f64, D> {
        self.coefficients
    }

    /// Coordinates.
    #[inline]
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Depth (0 = first decomposition level).
    #[inline]
    pub fn depth(&self) -> usize {
        self.key.depth
    }

    /// Sibling index.
    #[inline]
    pub fn index(&self) -> usize {
        self.key.index
    }

    /// Shapes decomposed at each depth, shared by the whole tree.
    pub fn lineage(&self) -> &Arc<[D]> {
        &self.lineage
    }

    /// Shape of the buffer this node was split from.
    pub fn parent_shape(&self) -> Option<&D> {
        self.lineage.get(self.key.depth)
    }

    /// Scores, `None` until marked.
    pub fn scores(&self) -> Option<&NodeScores> {
        self.scores.as_ref()
    }

    /// Whether the selector has scored this node.
    pub fn is_marked(&self) -> bool {
        self.scores.is_some()
    }

    /// Own cost, if scored.
    pub fn own_cost(&self) -> Option<f64> {
        self.scores.map(|s| s.own_cost)
    }

    /// Best subtree cost, if scored.
    pub fn best_cost(&self) -> Option<f64> {
        self.scores.map(|s| s.best_cost)
    }

    pub(crate) fn set_scores(&mut self, scores: NodeScores) {
        self.scores = Some(scores);
    }
}

/// `(depth,index)::[own|best]`, with `-` for unscored values.
impl<D: Dimension> fmt::Display for Node<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scores {
            Some(s) => write!(
                f,
                "({},{})::[{}|{}]",
                self.key.depth, self.key.index, s.own_cost, s.best_cost
            ),
            None => write!(f, "({},{})::[-|-]", self.key.depth, self.key.index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Ix1};

    fn leaf(depth: usize, index: usize) -> Node<Ix1> {
        let lineage: Arc<[Ix1]> = vec![Ix1(8); depth + 1].into();
        Node::new(arr1(&[1.0, -2.0]), depth, index, lineage)
    }

    #[test]
    fn test_key_navigation() {
        let key = NodeKey::new(1, 3);
        assert_eq!(key.parent(2), Some(NodeKey::new(0, 1)));
        assert_eq!(NodeKey::new(0, 1).parent(2), None);
        assert_eq!(key.role(2), 1);

        let children: Vec<_> = key.children(4).collect();
        assert_eq!(children.first(), Some(&NodeKey::new(2, 12)));
        assert_eq!(children.last(), Some(&NodeKey::new(2, 15)));
    }

    #[test]
    fn test_orders() {
        let a = NodeKey::new(0, 1);
        let b = NodeKey::new(2, 0);
        let c = NodeKey::new(2, 3);

        let mut keys = vec![c, a, b];
        keys.sort_by(|x, y| BasisOrder::ShallowFirst.compare(x, y));
        assert_eq!(keys, vec![a, b, c]);

        keys.sort_by(|x, y| BasisOrder::DeepFirst.compare(x, y));
        assert_eq!(keys, vec![b, c, a]);
    }

    #[test]
    fn test_display_before_and_after_marking() {
        let mut node = leaf(1, 2);
        assert!(!node.is_marked());
        assert_eq!(node.to_string(), "(1,2)::[-|-]");

        node.set_scores(NodeScores {
            own_cost: 3.0,
            best_cost: 1.5,
            keeps_self: false,
        });
        assert_eq!(node.to_string(), "(1,2)::[3|1.5]");
        assert_eq!(node.best_cost(), Some(1.5));
    }

    #[test]
    fn test_coefficients_mut_writes_through() {
        let mut node = leaf(0, 0);
        node.coefficients_mut().fill(0.0);
        assert!(node.coefficients().iter().all(|&c| c == 0.0));
        assert_eq!(node.parent_shape(), Some(&Ix1(8)));
    }

    #[test]
    fn test_parse_order() {
        assert_eq!("deep".parse::<BasisOrder>().unwrap(), BasisOrder::DeepFirst);
        assert!("sideways".parse::<BasisOrder>().is_err());
    }
}
