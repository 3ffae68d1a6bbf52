//! Separable two-dimensional split
//!
//! Rows are filtered first (along axis 1), then columns (along axis 0).
//! Subbands come out in role order: approximation, horizontal detail
//! (detail along axis 0), vertical detail (detail along axis 1), diagonal.

use ndarray::{Array2, ArrayView, ArrayView1, ArrayView2, Axis, Ix2};

use super::dwt::{analyze, synthesize};
use super::{Decomposition, ExtensionMode, Wavelet, WaveletFamily};
use crate::BasisError;

/// Quad wavelet split of an image.
#[derive(Debug, Clone)]
pub struct Dwt2d {
    wavelet: Wavelet,
    mode: ExtensionMode,
}

impl Dwt2d {
    /// Adapter for `family` with border handling `mode`.
    pub fn new(family: WaveletFamily, mode: ExtensionMode) -> Result<Self, BasisError> {
        Ok(Self::with_wavelet(Wavelet::new(family)?, mode))
    }

    /// Adapter from an already built filter bank.
    pub fn with_wavelet(wavelet: Wavelet, mode: ExtensionMode) -> Self {
        Self { wavelet, mode }
    }

    /// Filter bank in use.
    pub fn wavelet(&self) -> &Wavelet {
        &self.wavelet
    }

    /// Border handling in use.
    pub fn mode(&self) -> ExtensionMode {
        self.mode
    }

    fn analyze_axis(
        &self,
        x: ArrayView2<'_, f64>,
        axis: Axis,
    ) -> Result<(Array2<f64>, Array2<f64>), BasisError> {
        let out_len = self
            .mode
            .coefficient_len(x.len_of(axis), self.wavelet.filter_len());
        let mut shape = x.raw_dim();
        shape[axis.index()] = out_len;

        let mut lo = Array2::zeros(shape);
        let mut hi = Array2::zeros(shape);
        for ((lane, mut lo_lane), mut hi_lane) in x
            .lanes(axis)
            .into_iter()
            .zip(lo.lanes_mut(axis))
            .zip(hi.lanes_mut(axis))
        {
            let samples: Vec<f64> = lane.iter().copied().collect();
            let (approx, detail) = analyze(&samples, &self.wavelet, self.mode)?;
            lo_lane.assign(&ArrayView1::from(&approx[..]));
            hi_lane.assign(&ArrayView1::from(&detail[..]));
        }
        Ok((lo, hi))
    }

    fn synthesize_axis(
        &self,
        lo: ArrayView2<'_, f64>,
        hi: ArrayView2<'_, f64>,
        axis: Axis,
        target_len: usize,
    ) -> Result<Array2<f64>, BasisError> {
        if lo.shape() != hi.shape() {
            return Err(BasisError::ShapeMismatch(format!(
                "subbands {:?} and {:?} differ",
                lo.shape(),
                hi.shape()
            )));
        }
        let mut shape = lo.raw_dim();
        shape[axis.index()] = target_len;

        let mut out = Array2::zeros(shape);
        for ((lo_lane, hi_lane), mut out_lane) in lo
            .lanes(axis)
            .into_iter()
            .zip(hi.lanes(axis))
            .zip(out.lanes_mut(axis))
        {
            let approx: Vec<f64> = lo_lane.iter().copied().collect();
            let detail: Vec<f64> = hi_lane.iter().copied().collect();
            let samples = synthesize(&approx, &detail, &self.wavelet, self.mode, target_len)?;
            out_lane.assign(&ArrayView1::from(&samples[..]));
        }
        Ok(out)
    }
}

impl Decomposition for Dwt2d {
    type Dim = Ix2;
    const BRANCHING: usize = 4;

    fn forward_step(&self, buffer: ArrayView<'_, f64, Ix2>) -> Result<Vec<Array2<f64>>, BasisError> {
        if buffer.is_empty() {
            return Err(BasisError::EmptySignal);
        }
        let (lo_cols, hi_cols) = self.analyze_axis(buffer, Axis(1))?;
        let (approx, horizontal) = self.analyze_axis(lo_cols.view(), Axis(0))?;
        let (vertical, diagonal) = self.analyze_axis(hi_cols.view(), Axis(0))?;
        Ok(vec![approx, horizontal, vertical, diagonal])
    }

    fn inverse_step(
        &self,
        parts: &[ArrayView<'_, f64, Ix2>],
        target: &Ix2,
    ) -> Result<Array2<f64>, BasisError> {
        let [approx, horizontal, vertical, diagonal] = parts else {
            return Err(BasisError::ShapeMismatch(format!(
                "quad merge needs 4 subbands, got {}",
                parts.len()
            )));
        };
        let (rows, cols) = (target[0], target[1]);
        let lo_cols = self.synthesize_axis(approx.view(), horizontal.view(), Axis(0), rows)?;
        let hi_cols = self.synthesize_axis(vertical.view(), diagonal.view(), Axis(0), rows)?;
        self.synthesize_axis(lo_cols.view(), hi_cols.view(), Axis(1), cols)
    }

    fn max_depth(&self, shape: &Ix2) -> usize {
        self.wavelet.max_level(shape[0].min(shape[1]))
    }
}
