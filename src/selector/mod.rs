//! Best-basis selection
//!
//! Phase A ([`mark`]) scores every node bottom-up:
//!   deepest level: own = best = cost(node)
//!   above:         children = Σ best(child)
//!                  keep node iff own <= children (ties keep the parent)
//!                  best = min(own, children)
//!
//! Phase B ([`traverse`]) descends from the level-0 roots and emits every
//! node that keeps itself. The emitted set covers the signal exactly once
//! and its total own cost is the sum of the roots' best costs.

use ndarray::Dimension;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cost::CostFunctional;
use crate::tree::{find_in_level, BasisOrder, BasisWalk, Node, NodeKey, NodeScores, Tree};
use crate::BasisError;

/// Selected basis: disjoint nodes covering the signal, in emission order.
#[derive(Debug, Clone)]
pub struct BestBasis<D: Dimension> {
    nodes: Vec<Node<D>>,
    total_cost: f64,
    order: BasisOrder,
    branching: usize,
}

impl<D: Dimension> BestBasis<D> {
    /// Wrap nodes that are already in `order`.
    pub fn new(nodes: Vec<Node<D>>, order: BasisOrder, branching: usize) -> Self {
        let total_cost = nodes.iter().filter_map(Node::own_cost).sum();
        Self {
            nodes,
            total_cost,
            order,
            branching,
        }
    }

    /// Selected nodes.
    pub fn nodes(&self) -> &[Node<D>] {
        &self.nodes
    }

    /// Selected nodes, mutable (thresholding).
    pub fn nodes_mut(&mut self) -> &mut [Node<D>] {
        &mut self.nodes
    }

    /// Take the nodes.
    pub fn into_nodes(self) -> Vec<Node<D>> {
        self.nodes
    }

    /// Keys of the selected nodes, in emission order.
    pub fn keys(&self) -> Vec<NodeKey> {
        self.nodes.iter().map(Node::key).collect()
    }

    /// Sum of the own costs of the selected nodes.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Emission order.
    pub fn order(&self) -> BasisOrder {
        self.order
    }

    /// Children per node of the tree the basis came from.
    pub fn branching(&self) -> usize {
        self.branching
    }

    /// Number of selected nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node was selected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of coefficients across the basis.
    pub fn coefficient_count(&self) -> usize {
        self.nodes.iter().map(|n| n.coefficients().len()).sum()
    }
}

/// Phase A: score every node of `tree` bottom-up.
///
/// Fails with [`BasisError::IncompleteTree`] when a node above the deepest
/// level lacks its full group of children.
pub fn mark<D, C>(tree: &mut Tree<D>, cost: &C) -> Result<(), BasisError>
where
    D: Dimension,
    C: CostFunctional + ?Sized,
{
    let branching = tree.branching();
    let levels = tree.levels_mut();
    let Some(deepest) = levels.len().checked_sub(1) else {
        return Ok(());
    };

    for d in (0..=deepest).rev() {
        let (upper, lower) = levels.split_at_mut(d + 1);
        let parents = &mut upper[d];
        let children = lower.first().map(Vec::as_slice);

        let scores = score_level(parents, children, cost, branching)?;
        for (node, score) in parents.iter_mut().zip(scores) {
            node.set_scores(score);
        }
        debug!(depth = d, nodes = parents.len(), "scored level");
    }
    Ok(())
}

/// Phase B: keys of the nodes the marked `tree` keeps, sorted by `order`.
pub fn traverse<D: Dimension>(tree: &Tree<D>, order: BasisOrder) -> Result<Vec<NodeKey>, BasisError> {
    let mut keys = BasisWalk::new(tree).collect::<Result<Vec<_>, _>>()?;
    keys.sort_by(|a, b| order.compare(a, b));
    Ok(keys)
}

/// Mark `tree` with `cost`, then move its best basis out.
pub fn select<D, C>(mut tree: Tree<D>, cost: &C, order: BasisOrder) -> Result<BestBasis<D>, BasisError>
where
    D: Dimension,
    C: CostFunctional + ?Sized,
{
    mark(&mut tree, cost)?;
    let keys = traverse(&tree, order)?;
    let branching = tree.branching();
    let basis = BestBasis::new(tree.take(&keys), order, branching);
    info!(
        cost = cost.name(),
        nodes = basis.len(),
        total_cost = basis.total_cost(),
        "best basis selected"
    );
    Ok(basis)
}

/// Keys of the plain wavelet basis of a tree of `depth` levels: every detail
/// subband along the approximation chain, plus the deepest approximation.
pub fn dyadic_keys(depth: usize, branching: usize) -> Vec<NodeKey> {
    if depth == 0 {
        return Vec::new();
    }
    let mut keys: Vec<NodeKey> = (0..depth)
        .flat_map(|d| (1..branching).map(move |index| NodeKey::new(d, index)))
        .collect();
    keys.push(NodeKey::new(depth - 1, 0));
    keys
}

/// Mark `tree` with `cost` and move out the plain wavelet basis instead of
/// the best one.
pub fn dyadic<D, C>(mut tree: Tree<D>, cost: &C, order: BasisOrder) -> Result<BestBasis<D>, BasisError>
where
    D: Dimension,
    C: CostFunctional + ?Sized,
{
    mark(&mut tree, cost)?;
    let mut keys = dyadic_keys(tree.depth(), tree.branching());
    keys.sort_by(|a, b| order.compare(a, b));
    let branching = tree.branching();
    Ok(BestBasis::new(tree.take(&keys), order, branching))
}

fn score_node<D, C>(
    node: &Node<D>,
    children: Option<&[Node<D>]>,
    cost: &C,
    branching: usize,
) -> Result<NodeScores, BasisError>
where
    D: Dimension,
    C: CostFunctional + ?Sized,
{
    let own_cost = cost.cost(node.coefficients_dyn());
    let Some(children) = children else {
        return Ok(NodeScores {
            own_cost,
            best_cost: own_cost,
            keeps_self: true,
        });
    };

    let mut children_cost = 0.0;
    let mut found = 0;
    for key in node.key().children(branching) {
        if let Some(best) = find_in_level(children, key.index).and_then(Node::best_cost) {
            children_cost += best;
            found += 1;
        }
    }
    if found != branching {
        return Err(BasisError::IncompleteTree {
            depth: node.depth(),
            index: node.index(),
            expected: branching,
            found,
        });
    }

    let keeps_self = own_cost <= children_cost;
    Ok(NodeScores {
        own_cost,
        best_cost: if keeps_self { own_cost } else { children_cost },
        keeps_self,
    })
}

#[cfg(not(feature = "parallel"))]
fn score_level<D, C>(
    parents: &[Node<D>],
    children: Option<&[Node<D>]>,
    cost: &C,
    branching: usize,
) -> Result<Vec<NodeScores>, BasisError>
where
    D: Dimension,
    C: CostFunctional + ?Sized,
{
    parents
        .iter()
        .map(|node| score_node(node, children, cost, branching))
        .collect()
}

#[cfg(feature = "parallel")]
fn score_level<D, C>(
    parents: &[Node<D>],
    children: Option<&[Node<D>]>,
    cost: &C,
    branching: usize,
) -> Result<Vec<NodeScores>, BasisError>
where
    D: Dimension,
    C: CostFunctional + ?Sized,
{
    parents
        .par_iter()
        .map(|node| score_node(node, children, cost, branching))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{Shannon, ThresholdCount};
    use crate::transform::{Dwt1d, ExtensionMode, WaveletFamily};
    use ndarray::{arr1, Array1, ArrayViewD, Ix1};
    use std::sync::Arc;

    fn haar_tree(signal: &Array1<f64>, depth: usize) -> Tree<Ix1> {
        let dwt = Dwt1d::new(WaveletFamily::Haar, ExtensionMode::Periodization).unwrap();
        Tree::build(signal.view(), &dwt, Some(depth)).unwrap()
    }

    /// Tree of single-coefficient nodes whose value is the node's cost.
    fn cost_tree(levels: &[&[f64]]) -> Tree<Ix1> {
        let lineage: Arc<[Ix1]> = vec![Ix1(1); levels.len()].into();
        let levels = levels
            .iter()
            .enumerate()
            .map(|(d, costs)| {
                costs
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| Node::new(arr1(&[c]), d, i, Arc::clone(&lineage)))
                    .collect()
            })
            .collect();
        Tree::from_levels(levels, 2)
    }

    fn value(c: ArrayViewD<'_, f64>) -> f64 {
        c.iter().sum()
    }

    #[test]
    fn test_zero_signal_keeps_roots() {
        let mut tree = haar_tree(&Array1::zeros(8), 2);
        let cost = ThresholdCount::new(0.0);
        mark(&mut tree, &cost).unwrap();

        assert!(tree.nodes().all(|n| n.best_cost() == Some(0.0)));
        let keys = traverse(&tree, BasisOrder::ShallowFirst).unwrap();
        assert_eq!(keys, vec![NodeKey::new(0, 0), NodeKey::new(0, 1)]);
    }

    #[test]
    fn test_children_win_when_cheaper() {
        let mut tree = cost_tree(&[&[5.0, 1.0], &[1.0, 1.0, 3.0, 3.0]]);
        mark(&mut tree, &value).unwrap();

        let root = tree.node(NodeKey::new(0, 0)).unwrap().scores().copied().unwrap();
        assert!(!root.keeps_self);
        assert_eq!(root.best_cost, 2.0);
        let right = tree.node(NodeKey::new(0, 1)).unwrap().scores().copied().unwrap();
        assert!(right.keeps_self);
        assert_eq!(right.best_cost, 1.0);

        let keys = traverse(&tree, BasisOrder::DeepFirst).unwrap();
        assert_eq!(
            keys,
            vec![NodeKey::new(1, 0), NodeKey::new(1, 1), NodeKey::new(0, 1)]
        );
    }

    #[test]
    fn test_ties_keep_parent() {
        let mut tree = cost_tree(&[&[2.0, 2.0], &[1.0, 1.0, 1.0, 1.0]]);
        mark(&mut tree, &value).unwrap();
        let keys = traverse(&tree, BasisOrder::ShallowFirst).unwrap();
        assert_eq!(keys, vec![NodeKey::new(0, 0), NodeKey::new(0, 1)]);
    }

    #[test]
    fn test_incomplete_tree() {
        let lineage: Arc<[Ix1]> = vec![Ix1(1); 2].into();
        let levels = vec![
            vec![
                Node::new(arr1(&[1.0]), 0, 0, Arc::clone(&lineage)),
                Node::new(arr1(&[1.0]), 0, 1, Arc::clone(&lineage)),
            ],
            vec![
                Node::new(arr1(&[0.0]), 1, 0, Arc::clone(&lineage)),
                Node::new(arr1(&[0.0]), 1, 1, Arc::clone(&lineage)),
                Node::new(arr1(&[0.0]), 1, 2, lineage),
            ],
        ];
        let mut tree = Tree::from_levels(levels, 2);
        let err = mark(&mut tree, &Shannon).unwrap_err();
        assert!(matches!(
            err,
            BasisError::IncompleteTree {
                depth: 0,
                index: 1,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_traverse_unmarked() {
        let tree = haar_tree(&Array1::zeros(8), 2);
        assert!(matches!(
            traverse(&tree, BasisOrder::ShallowFirst),
            Err(BasisError::UnmarkedNode { depth: 0, index: 0 })
        ));
    }

    #[test]
    fn test_select_total_matches_roots() {
        let signal = Array1::from_shape_fn(32, |i| ((i * 13) % 7) as f64 - 3.0);
        let mut marked = haar_tree(&signal, 4);
        mark(&mut marked, &Shannon).unwrap();
        let roots: f64 = marked.level(0).unwrap().iter().filter_map(Node::best_cost).sum();

        let basis = select(haar_tree(&signal, 4), &Shannon, BasisOrder::ShallowFirst).unwrap();
        assert!((basis.total_cost() - roots).abs() < 1e-9);
        assert_eq!(basis.coefficient_count(), 32);
    }

    #[test]
    fn test_dyadic_keys() {
        assert_eq!(
            dyadic_keys(2, 2),
            vec![NodeKey::new(0, 1), NodeKey::new(1, 1), NodeKey::new(1, 0)]
        );
        assert_eq!(dyadic_keys(1, 4).len(), 4);
        assert!(dyadic_keys(0, 2).is_empty());
    }

    #[test]
    fn test_dyadic_basis_is_never_cheaper() {
        let signal = Array1::from_shape_fn(64, |i| (i as f64 * 0.3).sin() * 4.0);
        let best = select(haar_tree(&signal, 4), &Shannon, BasisOrder::ShallowFirst).unwrap();
        let plain = dyadic(haar_tree(&signal, 4), &Shannon, BasisOrder::ShallowFirst).unwrap();
        assert_eq!(plain.coefficient_count(), 64);
        assert!(best.total_cost() <= plain.total_cost() + 1e-9);
    }
}
