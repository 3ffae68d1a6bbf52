//! Single-level wavelet decomposition adapters
//!
//! The tree builder and the synthesizer only see the [`Decomposition`]
//! trait: one forward step producing `BRANCHING` subbands, one inverse step
//! merging them back, and the deepest level a signal shape supports.
//!
//! Two adapters are provided:
//! - [`Dwt1d`]: binary split of a trace (approximation, detail)
//! - [`Dwt2d`]: quad split of an image (approximation, horizontal,
//!   vertical, diagonal)

mod dwt;
mod dwt2;
mod wavelet;

use std::fmt;
use std::str::FromStr;

use ndarray::{Array, ArrayView, Dimension};

pub use dwt::Dwt1d;
pub use dwt2::Dwt2d;
pub use wavelet::{Wavelet, WaveletFamily};

use crate::BasisError;

/// One level of a separable wavelet filter bank.
///
/// Implementations must be shape-deterministic: the shapes returned by
/// `forward_step` depend only on the input shape, the wavelet and the mode.
pub trait Decomposition: Send + Sync {
    /// Coefficient buffer dimensionality.
    type Dim: Dimension;

    /// Number of subbands produced per step (2 for traces, 4 for images).
    const BRANCHING: usize;

    /// Split `buffer` into exactly `BRANCHING` subbands, in role order.
    fn forward_step(
        &self,
        buffer: ArrayView<'_, f64, Self::Dim>,
    ) -> Result<Vec<Array<f64, Self::Dim>>, BasisError>;

    /// Merge `BRANCHING` subbands (in role order) back into a buffer of
    /// shape `target`.
    ///
    /// `target` is the shape of the buffer that `forward_step` consumed;
    /// padding introduced by the forward step is dropped here.
    fn inverse_step(
        &self,
        parts: &[ArrayView<'_, f64, Self::Dim>],
        target: &Self::Dim,
    ) -> Result<Array<f64, Self::Dim>, BasisError>;

    /// Deepest decomposition level supported for a buffer of `shape`.
    fn max_depth(&self, shape: &Self::Dim) -> usize;
}

/// Signal extension used to handle the borders of finite buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExtensionMode {
    /// Periodic extension with critical sampling: `ceil(n / 2)` coefficients.
    #[default]
    Periodization,
    /// Zero padding.
    Zero,
    /// Border value repeated.
    Constant,
    /// Half-sample mirror: `... x1 x0 | x0 x1 ...`.
    Symmetric,
    /// Periodic padding (redundant coefficients).
    Periodic,
    /// First-order extrapolation from the border slope.
    Smooth,
}

impl ExtensionMode {
    /// Every supported mode.
    pub const ALL: [ExtensionMode; 6] = [
        ExtensionMode::Periodization,
        ExtensionMode::Zero,
        ExtensionMode::Constant,
        ExtensionMode::Symmetric,
        ExtensionMode::Periodic,
        ExtensionMode::Smooth,
    ];

    /// Number of coefficients per subband for an input of `len` samples.
    pub fn coefficient_len(&self, len: usize, filter_len: usize) -> usize {
        match self {
            ExtensionMode::Periodization => (len + 1) / 2,
            _ => (len + filter_len - 1) / 2,
        }
    }
}

impl fmt::Display for ExtensionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtensionMode::Periodization => "per",
            ExtensionMode::Zero => "zero",
            ExtensionMode::Constant => "constant",
            ExtensionMode::Symmetric => "symmetric",
            ExtensionMode::Periodic => "ppd",
            ExtensionMode::Smooth => "smooth",
        };
        f.write_str(name)
    }
}

impl FromStr for ExtensionMode {
    type Err = BasisError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "per" | "periodization" => Ok(ExtensionMode::Periodization),
            "zero" | "zpd" => Ok(ExtensionMode::Zero),
            "constant" | "cpd" => Ok(ExtensionMode::Constant),
            "symmetric" | "sym" => Ok(ExtensionMode::Symmetric),
            "ppd" | "periodic" => Ok(ExtensionMode::Periodic),
            "smooth" | "sp1" => Ok(ExtensionMode::Smooth),
            _ => Err(BasisError::InvalidConfiguration(format!(
                "unknown extension mode '{name}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_round_trip() {
        for mode in ExtensionMode::ALL {
            assert_eq!(mode.to_string().parse::<ExtensionMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_coefficient_len() {
        assert_eq!(ExtensionMode::Periodization.coefficient_len(8, 8), 4);
        assert_eq!(ExtensionMode::Periodization.coefficient_len(9, 8), 5);
        assert_eq!(ExtensionMode::Symmetric.coefficient_len(8, 4), 5);
        assert_eq!(ExtensionMode::Zero.coefficient_len(9, 2), 5);
    }
}
