//! Hard thresholding and error measurement
//!
//! The compression experiment: zero every basis coefficient below a
//! fraction of the largest magnitude, synthesize, and compare.

use ndarray::{Array, ArrayView, Dimension};
use tracing::debug;

use crate::tree::Node;
use crate::BasisError;

/// Magnitude at or above which a coefficient counts as large by default.
pub const DEFAULT_LARGE_COEFFICIENT: f64 = 0.1;

/// Outcome of [`hard_threshold`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdReport {
    /// Absolute threshold applied (`fraction * max|c|`).
    pub threshold: f64,
    /// Coefficients set to zero by this call.
    pub zeroed: usize,
    /// Non-zero coefficients left.
    pub retained: usize,
}

/// Zero, in place, every coefficient with `|c| < fraction * max|c|`, the
/// maximum taken over all `nodes`.
pub fn hard_threshold<D: Dimension>(
    nodes: &mut [Node<D>],
    fraction: f64,
) -> Result<ThresholdReport, BasisError> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(BasisError::InvalidConfiguration(format!(
            "threshold fraction {fraction} outside [0, 1]"
        )));
    }

    let maximum = nodes
        .iter()
        .flat_map(|node| node.coefficients().iter())
        .fold(0.0_f64, |m, c| m.max(c.abs()));
    let threshold = fraction * maximum;

    let mut zeroed = 0;
    let mut retained = 0;
    for node in nodes.iter_mut() {
        for c in node.coefficients_mut().iter_mut() {
            if c.abs() < threshold {
                if *c != 0.0 {
                    zeroed += 1;
                }
                *c = 0.0;
            } else if *c != 0.0 {
                retained += 1;
            }
        }
    }

    debug!(threshold, zeroed, retained, "hard threshold applied");
    Ok(ThresholdReport {
        threshold,
        zeroed,
        retained,
    })
}

/// Number of entries with `|c| >= threshold`.
pub fn count_large<D: Dimension>(coefficients: ArrayView<'_, f64, D>, threshold: f64) -> usize {
    coefficients.iter().filter(|c| c.abs() >= threshold).count()
}

/// Large-coefficient count summed over a basis.
pub fn count_large_in<D: Dimension>(nodes: &[Node<D>], threshold: f64) -> usize {
    nodes
        .iter()
        .map(|node| count_large(node.coefficients().view(), threshold))
        .sum()
}

/// Mean of the squared differences between `original` and `reconstructed`.
pub fn mean_squared_error<D: Dimension>(
    original: &Array<f64, D>,
    reconstructed: &Array<f64, D>,
) -> Result<f64, BasisError> {
    if original.shape() != reconstructed.shape() {
        return Err(BasisError::ShapeMismatch(format!(
            "cannot compare shapes {:?} and {:?}",
            original.shape(),
            reconstructed.shape()
        )));
    }
    if original.is_empty() {
        return Err(BasisError::EmptySignal);
    }
    let sum: f64 = original
        .iter()
        .zip(reconstructed.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    Ok(sum / original.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Ix1};
    use std::sync::Arc;

    fn nodes(values: &[&[f64]]) -> Vec<Node<Ix1>> {
        let lineage: Arc<[Ix1]> = vec![Ix1(8)].into();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Node::new(arr1(v), 0, i, Arc::clone(&lineage)))
            .collect()
    }

    #[test]
    fn test_hard_threshold_counts() {
        let mut basis = nodes(&[&[4.0, -1.0, 0.0, 2.5], &[0.5, -3.0, 1.9, 0.0]]);
        let report = hard_threshold(&mut basis, 0.5).unwrap();

        assert_eq!(report.threshold, 2.0);
        assert_eq!(report.zeroed, 3);
        assert_eq!(report.retained, 3);
        assert_eq!(basis[0].coefficients().to_vec(), vec![4.0, 0.0, 0.0, 2.5]);
        assert_eq!(basis[1].coefficients().to_vec(), vec![0.0, -3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_zero_fraction_keeps_everything() {
        let mut basis = nodes(&[&[1e-12, -2.0]]);
        let report = hard_threshold(&mut basis, 0.0).unwrap();
        assert_eq!(report.zeroed, 0);
        assert_eq!(report.retained, 2);
    }

    #[test]
    fn test_fraction_out_of_range() {
        let mut basis = nodes(&[&[1.0]]);
        assert!(matches!(
            hard_threshold(&mut basis, 1.5),
            Err(BasisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_count_large_is_inclusive() {
        let c = arr2(&[[0.1, 0.05], [-0.2, 0.0]]);
        assert_eq!(count_large(c.view(), DEFAULT_LARGE_COEFFICIENT), 2);
        assert_eq!(count_large_in(&nodes(&[&[0.1, 1.0], &[0.0]]), 0.5), 1);
    }

    #[test]
    fn test_mean_squared_error() {
        let a = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let b = arr2(&[[1.0, 2.0], [3.0, 6.0]]);
        assert_eq!(mean_squared_error(&a, &b).unwrap(), 1.0);

        let c = arr2(&[[1.0, 2.0]]);
        assert!(matches!(
            mean_squared_error(&a, &c),
            Err(BasisError::ShapeMismatch(_))
        ));
    }
}
