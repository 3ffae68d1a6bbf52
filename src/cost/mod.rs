//! Cost functionals over coefficient buffers
//!
//! A cost functional maps a buffer of any dimensionality to a real number;
//! lower is better. Buffers are treated as flat sequences.

mod registry;

use ndarray::ArrayViewD;

pub use registry::{CostInfo, CostRegistry};

/// Scalar cost of a coefficient buffer.
///
/// Must be pure: the same buffer always yields the same cost.
pub trait CostFunctional: Send + Sync {
    /// Cost of `coefficients`.
    fn cost(&self, coefficients: ArrayViewD<'_, f64>) -> f64;

    /// Short name used in reports.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> CostFunctional for F
where
    F: for<'a> Fn(ArrayViewD<'a, f64>) -> f64 + Send + Sync,
{
    fn cost(&self, coefficients: ArrayViewD<'_, f64>) -> f64 {
        self(coefficients)
    }
}

/// Shannon-type entropy `-Σ c² log2|c|` over non-zero entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shannon;

impl CostFunctional for Shannon {
    fn cost(&self, coefficients: ArrayViewD<'_, f64>) -> f64 {
        coefficients
            .iter()
            .filter(|&&c| c != 0.0)
            .map(|&c| -c * c * c.abs().log2())
            .sum()
    }

    fn name(&self) -> &str {
        "shannon"
    }
}

/// Number of entries with `|c| > threshold`.
///
/// The threshold is fixed at construction and shared by every node of a run.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdCount {
    threshold: f64,
}

impl ThresholdCount {
    /// Count entries strictly above `threshold` in magnitude.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Threshold in use.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl CostFunctional for ThresholdCount {
    fn cost(&self, coefficients: ArrayViewD<'_, f64>) -> f64 {
        coefficients
            .iter()
            .filter(|c| c.abs() > self.threshold)
            .count() as f64
    }

    fn name(&self) -> &str {
        "threshold"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_shannon_values() {
        let c = arr1(&[2.0, 0.0, -0.5, 1.0]);
        // -(4 * 1) - (0.25 * -1) - (1 * 0) = -3.75
        assert!((Shannon.cost(c.view().into_dyn()) + 3.75).abs() < 1e-12);
    }

    #[test]
    fn test_shannon_of_zeros_is_zero() {
        let c = arr2(&[[0.0, 0.0], [0.0, 0.0]]);
        assert_eq!(Shannon.cost(c.view().into_dyn()), 0.0);
    }

    #[test]
    fn test_threshold_count_is_strict() {
        let cost = ThresholdCount::new(1.0);
        let c = arr2(&[[1.0, -1.5], [0.2, 3.0]]);
        assert_eq!(cost.cost(c.view().into_dyn()), 2.0);
        assert_eq!(ThresholdCount::new(0.0).cost(arr1(&[0.0, 0.0]).view().into_dyn()), 0.0);
    }

    #[test]
    fn test_closures_are_cost_functionals() {
        let l1 = |c: ArrayViewD<'_, f64>| c.iter().map(|v| v.abs()).sum::<f64>();
        let c = arr1(&[1.0, -2.0, 3.0]);
        assert_eq!(l1.cost(c.view().into_dyn()), 6.0);
        assert_eq!(CostFunctional::name(&l1), "custom");
    }
}
