//! # Wavelet-packet best-basis selection
//!
//! Decomposes a trace (1D) or an image (2D) into a complete tree of
//! wavelet-packet subbands, picks the cheapest cover of the signal under a
//! cost functional, and rebuilds the signal from that cover.
//!
//! ## Core Algorithm
//!
//! 1. **Tree building**: repeated single-level splits, binary for traces and
//!    quaternary for images, down to a fixed depth
//! 2. **Marking**: bottom-up dynamic programming; a node is kept iff its own
//!    cost does not exceed the best cost of its children
//! 3. **Traversal**: top-down extraction of the kept nodes
//! 4. **Synthesis**: merge sibling groups deepest-first until the signal is
//!    reached; accepts the basis in any order
//!
//! ## Usage Example
//!
//! ```no_run
//! use ndarray::Array1;
//! use wpbasis::{BasisConfig, Dwt1d, Shannon, WaveletPacket};
//!
//! let signal = Array1::linspace(0.0, 1.0, 256);
//! let config = BasisConfig::default().with_depth(4);
//! let packet = WaveletPacket::<Dwt1d>::new(&config)?;
//! let basis = packet.best_basis(signal.view(), &Shannon)?;
//! let rebuilt = packet.synthesize(basis.into_nodes())?;
//! assert_eq!(rebuilt.len(), 256);
//! # Ok::<(), wpbasis::BasisError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod compression; // Thresholding and error measurement
pub mod cost; // Cost functionals and their registry
pub mod ledger; // Cover bookkeeping
pub mod selector; // Best-basis marking and traversal
pub mod synthesis; // Sibling-merge reconstruction
pub mod transform; // Single-level wavelet adapters
pub mod tree; // Wavelet-packet tree and nodes

// Re-exports for convenience
pub use compression::{count_large, hard_threshold, mean_squared_error, ThresholdReport};
pub use cost::{CostFunctional, CostRegistry, Shannon, ThresholdCount};
pub use ledger::{verify_cover, CoverLedger};
pub use selector::{mark, select, traverse, BestBasis};
pub use synthesis::synthesize;
pub use transform::{Decomposition, Dwt1d, Dwt2d, ExtensionMode, Wavelet, WaveletFamily};
pub use tree::{BasisOrder, Node, NodeKey, NodeScores, Tree};

use ndarray::{Array, ArrayView};
use thiserror::Error;
use tracing::info;

/// Errors raised while building, selecting or synthesizing a basis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BasisError {
    /// Requested depth is zero or deeper than the signal supports
    #[error("Invalid depth {requested}: {}", depth_bound(*max))]
    InvalidDepth {
        /// Depth asked for
        requested: usize,
        /// Deepest level the signal supports
        max: usize,
    },

    /// A node above the deepest level lacks some of its children
    #[error("Incomplete tree at ({depth},{index}): expected {expected} children, found {found}")]
    IncompleteTree {
        /// Depth of the parent
        depth: usize,
        /// Index of the parent
        index: usize,
        /// Children required
        expected: usize,
        /// Children present
        found: usize,
    },

    /// Traversal reached a node that was never scored
    #[error("Node ({depth},{index}) has not been marked")]
    UnmarkedNode {
        /// Node depth
        depth: usize,
        /// Node index
        index: usize,
    },

    /// Buffers or node sets that do not fit together
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Wavelet name or order without a filter bank
    #[error("Unsupported wavelet: {0}")]
    UnsupportedWavelet(String),

    /// Signal with no samples
    #[error("Signal is empty")]
    EmptySignal,

    /// Configuration value out of range or unknown
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

fn depth_bound(max: usize) -> String {
    if max == 0 {
        "signal is too short for a single level".to_string()
    } else {
        format!("must be between 1 and {max}")
    }
}

/// Parameters of a wavelet-packet run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasisConfig {
    /// Wavelet family (default `db4`)
    pub wavelet: WaveletFamily,

    /// Border handling (default periodization)
    pub mode: ExtensionMode,

    /// Number of tree levels; `None` uses the deepest level the signal supports
    pub depth: Option<usize>,

    /// Emission order of the selected basis
    pub order: BasisOrder,
}

impl Default for BasisConfig {
    fn default() -> Self {
        Self {
            wavelet: WaveletFamily::default(),
            mode: ExtensionMode::default(),
            depth: None,
            order: BasisOrder::default(),
        }
    }
}

impl BasisConfig {
    /// Use `wavelet`.
    pub fn with_wavelet(mut self, wavelet: WaveletFamily) -> Self {
        self.wavelet = wavelet;
        self
    }

    /// Use extension `mode`.
    pub fn with_mode(mut self, mode: ExtensionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build `depth` levels.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Emit the basis in `order`.
    pub fn with_order(mut self, order: BasisOrder) -> Self {
        self.order = order;
        self
    }

    /// Reject settings no signal could satisfy.
    pub fn validate(&self) -> Result<(), BasisError> {
        // The upper bound depends on the signal and is checked by `Tree::build`.
        if self.depth == Some(0) {
            return Err(BasisError::InvalidConfiguration(
                "tree depth must be at least 1".to_string(),
            ));
        }
        Wavelet::new(self.wavelet).map(|_| ())
    }
}

/// Adapters that can be built from a [`BasisConfig`].
pub trait FromConfig: Sized {
    /// Build the adapter for `config`'s wavelet and mode.
    fn from_config(config: &BasisConfig) -> Result<Self, BasisError>;
}

impl FromConfig for Dwt1d {
    fn from_config(config: &BasisConfig) -> Result<Self, BasisError> {
        Dwt1d::new(config.wavelet, config.mode)
    }
}

impl FromConfig for Dwt2d {
    fn from_config(config: &BasisConfig) -> Result<Self, BasisError> {
        Dwt2d::new(config.wavelet, config.mode)
    }
}

/// Decompose, select and synthesize with one configuration
#[derive(Debug, Clone)]
pub struct WaveletPacket<T: Decomposition> {
    transform: T,
    config: BasisConfig,
}

impl<T: Decomposition + FromConfig> WaveletPacket<T> {
    /// Validate `config` and build the matching transform.
    pub fn new(config: &BasisConfig) -> Result<Self, BasisError> {
        config.validate()?;
        Ok(Self {
            transform: T::from_config(config)?,
            config: config.clone(),
        })
    }
}

impl<T: Decomposition> WaveletPacket<T> {
    /// Use an already built transform.
    pub fn with_transform(transform: T, config: BasisConfig) -> Self {
        Self { transform, config }
    }

    /// Transform in use.
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Configuration in use.
    pub fn config(&self) -> &BasisConfig {
        &self.config
    }

    /// Build the complete tree of `signal`.
    pub fn decompose(&self, signal: ArrayView<'_, f64, T::Dim>) -> Result<Tree<T::Dim>, BasisError> {
        Tree::build(signal, &self.transform, self.config.depth)
    }

    /// Build the tree of `signal` and select its best basis under `cost`.
    pub fn best_basis<C>(
        &self,
        signal: ArrayView<'_, f64, T::Dim>,
        cost: &C,
    ) -> Result<BestBasis<T::Dim>, BasisError>
    where
        C: CostFunctional + ?Sized,
    {
        let tree = self.decompose(signal)?;
        select(tree, cost, self.config.order)
    }

    /// Build the tree of `signal` and take its plain wavelet basis.
    pub fn dyadic_basis<C>(
        &self,
        signal: ArrayView<'_, f64, T::Dim>,
        cost: &C,
    ) -> Result<BestBasis<T::Dim>, BasisError>
    where
        C: CostFunctional + ?Sized,
    {
        let tree = self.decompose(signal)?;
        selector::dyadic(tree, cost, self.config.order)
    }

    /// Rebuild the signal from basis `nodes` given in any order.
    pub fn synthesize(&self, nodes: Vec<Node<T::Dim>>) -> Result<Array<f64, T::Dim>, BasisError> {
        synthesize(nodes, &self.transform)
    }

    /// Select, threshold at `fraction` of the largest coefficient, and rebuild.
    pub fn compress<C>(
        &self,
        signal: ArrayView<'_, f64, T::Dim>,
        cost: &C,
        fraction: f64,
    ) -> Result<Compressed<T::Dim>, BasisError>
    where
        C: CostFunctional + ?Sized,
    {
        let basis = self.best_basis(signal.view(), cost)?;
        self.compress_basis(signal, basis, fraction)
    }

    /// Same as [`compress`](Self::compress) with the plain wavelet basis.
    pub fn compress_dyadic<C>(
        &self,
        signal: ArrayView<'_, f64, T::Dim>,
        cost: &C,
        fraction: f64,
    ) -> Result<Compressed<T::Dim>, BasisError>
    where
        C: CostFunctional + ?Sized,
    {
        let basis = self.dyadic_basis(signal.view(), cost)?;
        self.compress_basis(signal, basis, fraction)
    }

    /// Threshold `basis` and compare its reconstruction with `signal`.
    pub fn compress_basis(
        &self,
        signal: ArrayView<'_, f64, T::Dim>,
        mut basis: BestBasis<T::Dim>,
        fraction: f64,
    ) -> Result<Compressed<T::Dim>, BasisError> {
        let report = hard_threshold(basis.nodes_mut(), fraction)?;
        let large_coefficients =
            compression::count_large_in(basis.nodes(), compression::DEFAULT_LARGE_COEFFICIENT);
        let nodes = basis.len();
        let reconstruction = self.synthesize(basis.into_nodes())?;
        let mse = mean_squared_error(&signal.to_owned(), &reconstruction)?;
        info!(fraction, retained = report.retained, mse, "compressed");
        Ok(Compressed {
            reconstruction,
            report,
            large_coefficients,
            nodes,
            mse,
        })
    }
}

/// Result of [`WaveletPacket::compress`]
#[derive(Debug, Clone)]
pub struct Compressed<D: ndarray::Dimension> {
    /// Signal rebuilt from the thresholded basis
    pub reconstruction: Array<f64, D>,
    /// Threshold statistics
    pub report: ThresholdReport,
    /// Coefficients with magnitude at least 0.1 after thresholding
    pub large_coefficients: usize,
    /// Number of basis nodes
    pub nodes: usize,
    /// Mean squared reconstruction error
    pub mse: f64,
}
