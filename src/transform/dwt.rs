//! One-dimensional analysis/synthesis kernels
//!
//! Analysis: `a[k] = Σ_j h[j] y[2k + s + j]`, `d[k] = Σ_j g[j] y[2k + s + j]`
//! where `y` is the extended signal. Synthesis scatters every coefficient
//! back through the same taps, which inverts the analysis exactly because
//! the filter bank is orthogonal.

use ndarray::{Array1, ArrayView, Ix1};

use super::{Decomposition, ExtensionMode, Wavelet, WaveletFamily};
use crate::BasisError;

/// Binary wavelet split of a trace.
#[derive(Debug, Clone)]
pub struct Dwt1d {
    wavelet: Wavelet,
    mode: ExtensionMode,
}

impl Dwt1d {
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
}

impl Decomposition for Dwt1d {
    type Dim = Ix1;
    const BRANCHING: usize = 2;

    fn forward_step(&self, buffer: ArrayView<'_, f64, Ix1>) -> Result<Vec<Array1<f64>>, BasisError> {
        let samples: Vec<f64> = buffer.iter().copied().collect();
        let (approx, detail) = analyze(&samples, &self.wavelet, self.mode)?;
        Ok(vec![Array1::from(approx), Array1::from(detail)])
    }

    fn inverse_step(
        &self,
        parts: &[ArrayView<'_, f64, Ix1>],
        target: &Ix1,
    ) -> Result<Array1<f64>, BasisError> {
        let [approx, detail] = parts else {
            return Err(BasisError::ShapeMismatch(format!(
                "binary merge needs 2 subbands, got {}",
                parts.len()
            )));
        };
        let approx: Vec<f64> = approx.iter().copied().collect();
        let detail: Vec<f64> = detail.iter().copied().collect();
        let signal = synthesize(&approx, &detail, &self.wavelet, self.mode, target[0])?;
        Ok(Array1::from(signal))
    }

    fn max_depth(&self, shape: &Ix1) -> usize {
        self.wavelet.max_level(shape[0])
    }
}

/// Split `x` into (approximation, detail) coefficients.
pub(crate) fn analyze(
    x: &[f64],
    wavelet: &Wavelet,
    mode: ExtensionMode,
) -> Result<(Vec<f64>, Vec<f64>), BasisError> {
    if x.is_empty() {
        return Err(BasisError::EmptySignal);
    }

    let h = wavelet.lowpass();
    let g = wavelet.highpass();
    let out_len = mode.coefficient_len(x.len(), h.len());
    let mut approx = Vec::with_capacity(out_len);
    let mut detail = Vec::with_capacity(out_len);

    match mode {
        ExtensionMode::Periodization => {
            // Odd lengths repeat the last sample once.
            let period = x.len() + x.len() % 2;
            let sample = |i: usize| x[i.min(x.len() - 1)];
            for k in 0..out_len {
                let (mut a, mut d) = (0.0, 0.0);
                for (j, (&hj, &gj)) in h.iter().zip(g).enumerate() {
                    let s = sample((2 * k + j) % period);
                    a += hj * s;
                    d += gj * s;
                }
                approx.push(a);
                detail.push(d);
            }
        }
        _ => {
            let extended = extend(x, h.len() - 1, mode);
            for k in 0..out_len {
                let window = &extended[2 * k + 1..2 * k + 1 + h.len()];
                approx.push(h.iter().zip(window).map(|(c, s)| c * s).sum());
                detail.push(g.iter().zip(window).map(|(c, s)| c * s).sum());
            }
        }
    }

    Ok((approx, detail))
}

/// Rebuild `target_len` samples from (approximation, detail) coefficients.
pub(crate) fn synthesize(
    approx: &[f64],
    detail: &[f64],
    wavelet: &Wavelet,
    mode: ExtensionMode,
    target_len: usize,
) -> Result<Vec<f64>, BasisError> {
    let h = wavelet.lowpass();
    let g = wavelet.highpass();
    let expected = mode.coefficient_len(target_len, h.len());

    if target_len == 0 {
        return Err(BasisError::EmptySignal);
    }
    if approx.len() != detail.len() || approx.len() != expected {
        return Err(BasisError::ShapeMismatch(format!(
            "subbands of length {} and {} cannot rebuild {} samples in {} mode (expected {})",
            approx.len(),
            detail.len(),
            target_len,
            mode,
            expected
        )));
    }

    match mode {
        ExtensionMode::Periodization => {
            let period = target_len + target_len % 2;
            let mut signal = vec![0.0; period];
            for (k, (&a, &d)) in approx.iter().zip(detail).enumerate() {
                for (j, (&hj, &gj)) in h.iter().zip(g).enumerate() {
                    signal[(2 * k + j) % period] += a * hj + d * gj;
                }
            }
            signal.truncate(target_len);
            Ok(signal)
        }
        _ => {
            let span = h.len() - 1;
            let signal = (0..target_len)
                .map(|n| {
                    // Position in the extended signal; every contributing
                    // coefficient lies inside [0, expected).
                    let p = n + span;
                    (0..h.len())
                        .filter(|&t| t < p && (p - 1 - t) % 2 == 0)
                        .map(|t| ((p - 1 - t) / 2, t))
                        .filter(|&(k, _)| k < expected)
                        .map(|(k, t)| approx[k] * h[t] + detail[k] * g[t])
                        .sum::<f64>()
                })
                .collect();
            Ok(signal)
        }
    }
}

/// Pad `x` by `pad` samples on both sides according to `mode`.
fn extend(x: &[f64], pad: usize, mode: ExtensionMode) -> Vec<f64> {
    let n = x.len() as isize;
    let pad = pad as isize;
    (-pad..n + pad)
        .map(|pos| extended_sample(x, pos, mode))
        .collect()
}

fn extended_sample(x: &[f64], pos: isize, mode: ExtensionMode) -> f64 {
    let n = x.len() as isize;
    if (0..n).contains(&pos) {
        return x[pos as usize];
    }
    let first = x[0];
    let last = x[x.len() - 1];

    match mode {
        ExtensionMode::Zero => 0.0,
        ExtensionMode::Constant => {
            if pos < 0 {
                first
            } else {
                last
            }
        }
        ExtensionMode::Symmetric => {
            let m = pos.rem_euclid(2 * n);
            if m < n {
                x[m as usize]
            } else {
                x[(2 * n - 1 - m) as usize]
            }
        }
        ExtensionMode::Periodic | ExtensionMode::Periodization => x[pos.rem_euclid(n) as usize],
        ExtensionMode::Smooth => {
            if n == 1 {
                first
            } else if pos < 0 {
                first + pos as f64 * (x[1] - first)
            } else {
                last + (pos - n + 1) as f64 * (last - x[x.len() - 2])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| ((i * 7) % 11) as f64 - 3.5 + 0.25 * i as f64).collect()
    }

    fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
    }

    #[test]
    fn test_haar_periodization_values() {
        let haar = Wavelet::new(WaveletFamily::Haar).unwrap();
        let (a, d) = analyze(&[1.0, 3.0, 2.0, 2.0], &haar, ExtensionMode::Periodization).unwrap();
        let s = std::f64::consts::SQRT_2;
        assert!(max_abs_diff(&a, &[4.0 / s, 4.0 / s]) < 1e-12);
        assert!(max_abs_diff(&d, &[-2.0 / s, 0.0]) < 1e-12);
    }

    #[test]
    fn test_round_trip_every_mode() {
        let families = [
            WaveletFamily::Haar,
            WaveletFamily::Daubechies(2),
            WaveletFamily::Daubechies(4),
            WaveletFamily::Coiflet(1),
        ];
        for family in families {
            let wavelet = Wavelet::new(family).unwrap();
            for mode in ExtensionMode::ALL {
                for len in [1, 2, 5, 16, 33] {
                    let x = ramp(len);
                    let (a, d) = analyze(&x, &wavelet, mode).unwrap();
                    let y = synthesize(&a, &d, &wavelet, mode, len).unwrap();
                    assert_eq!(y.len(), len);
                    assert!(
                        max_abs_diff(&x, &y) < 1e-9,
                        "{family} {mode} len={len}: error {}",
                        max_abs_diff(&x, &y)
                    );
                }
            }
        }
    }

    #[test]
    fn test_periodization_preserves_energy() {
        let wavelet = Wavelet::new(WaveletFamily::Daubechies(3)).unwrap();
        let x = ramp(64);
        let (a, d) = analyze(&x, &wavelet, ExtensionMode::Periodization).unwrap();
        let before: f64 = x.iter().map(|v| v * v).sum();
        let after: f64 = a.iter().chain(&d).map(|v| v * v).sum();
        assert!((before - after).abs() < 1e-8 * before);
    }

    #[test]
    fn test_synthesize_rejects_wrong_lengths() {
        let wavelet = Wavelet::new(WaveletFamily::Haar).unwrap();
        let err = synthesize(&[1.0, 2.0], &[1.0], &wavelet, ExtensionMode::Periodization, 4);
        assert!(matches!(err, Err(BasisError::ShapeMismatch(_))));

        let err = synthesize(&[1.0, 2.0], &[1.0, 2.0], &wavelet, ExtensionMode::Periodization, 8);
        assert!(matches!(err, Err(BasisError::ShapeMismatch(_))));
    }

    #[test]
    fn test_empty_signal_is_rejected() {
        let wavelet = Wavelet::new(WaveletFamily::Haar).unwrap();
        assert!(matches!(
            analyze(&[], &wavelet, ExtensionMode::Zero),
            Err(BasisError::EmptySignal)
        ));
    }

    #[test]
    fn test_adapter_shapes() {
        let dwt = Dwt1d::new(WaveletFamily::Daubechies(2), ExtensionMode::Symmetric).unwrap();
        let x = Array1::from(ramp(10));
        let parts = dwt.forward_step(x.view()).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 6);
        assert_eq!(parts[1].len(), 6);

        let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
        let back = dwt.inverse_step(&views, &x.raw_dim()).unwrap();
        assert!(max_abs_diff(back.as_slice().unwrap(), x.as_slice().unwrap()) < 1e-9);
    }
}
