//! Orthogonal wavelet families and their filter banks
//!
//! Low-pass taps are tabulated per family; the high-pass filter is derived
//! by alternating flip so every bank is a two-channel orthogonal QMF pair.

use std::fmt;
use std::str::FromStr;

use crate::BasisError;

/// Supported orthogonal wavelet families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaveletFamily {
    /// Haar wavelet (two taps).
    Haar,
    /// Daubechies `dbN`, `N` in `1..=4` or 8.
    Daubechies(usize),
    /// Symlet `symN`, `N` in `2..=4` or 8.
    Symlet(usize),
    /// Coiflet `coifN`, `N` in `1..=2` or 4.
    Coiflet(usize),
}

impl Default for WaveletFamily {
    fn default() -> Self {
        WaveletFamily::Daubechies(4)
    }
}

impl fmt::Display for WaveletFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveletFamily::Haar => write!(f, "haar"),
            WaveletFamily::Daubechies(n) => write!(f, "db{n}"),
            WaveletFamily::Symlet(n) => write!(f, "sym{n}"),
            WaveletFamily::Coiflet(n) => write!(f, "coif{n}"),
        }
    }
}

impl FromStr for WaveletFamily {
    type Err = BasisError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let lowered = name.trim().to_ascii_lowercase();
        let unsupported = || BasisError::UnsupportedWavelet(name.to_string());

        if lowered == "haar" {
            return Ok(WaveletFamily::Haar);
        }
        let (prefix, order) = lowered
            .find(|c: char| c.is_ascii_digit())
            .map(|at| lowered.split_at(at))
            .ok_or_else(unsupported)?;
        let order: usize = order.parse().map_err(|_| unsupported())?;

        match prefix {
            "db" => Ok(WaveletFamily::Daubechies(order)),
            "sym" => Ok(WaveletFamily::Symlet(order)),
            "coif" => Ok(WaveletFamily::Coiflet(order)),
            _ => Err(unsupported()),
        }
    }
}

/// Decomposition filter pair of an orthogonal wavelet.
#[derive(Debug, Clone, PartialEq)]
pub struct Wavelet {
    family: WaveletFamily,
    lowpass: Vec<f64>,
    highpass: Vec<f64>,
}

impl Wavelet {
    /// Build the filter bank for `family`.
    pub fn new(family: WaveletFamily) -> Result<Self, BasisError> {
        let lowpass = lowpass_taps(family)
            .ok_or_else(|| BasisError::UnsupportedWavelet(family.to_string()))?;
        let highpass = alternating_flip(&lowpass);
        Ok(Self {
            family,
            lowpass,
            highpass,
        })
    }

    /// Wavelet family.
    pub fn family(&self) -> WaveletFamily {
        self.family
    }

    /// Low-pass (scaling) taps.
    pub fn lowpass(&self) -> &[f64] {
        &self.lowpass
    }

    /// High-pass (wavelet) taps.
    pub fn highpass(&self) -> &[f64] {
        &self.highpass
    }

    /// Number of taps `L`.
    pub fn filter_len(&self) -> usize {
        self.lowpass.len()
    }

    /// Deepest level a signal of `len` samples supports:
    /// `floor(log2(len / (L - 1)))`, or 0 when the signal is shorter than `L - 1`.
    pub fn max_level(&self, len: usize) -> usize {
        let span = self.filter_len().saturating_sub(1);
        if span == 0 || len < span {
            return 0;
        }
        let mut level = 0;
        while span << (level + 1) <= len {
            level += 1;
        }
        level
    }
}

impl FromStr for Wavelet {
    type Err = BasisError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Wavelet::new(name.parse()?)
    }
}

/// `g[m] = (-1)^m h[L-1-m]`
fn alternating_flip(lowpass: &[f64]) -> Vec<f64> {
    let len = lowpass.len();
    (0..len)
        .map(|m| {
            let tap = lowpass[len - 1 - m];
            if m % 2 == 0 {
                tap
            } else {
                -tap
            }
        })
        .collect()
}

fn lowpass_taps(family: WaveletFamily) -> Option<Vec<f64>> {
    let taps = match family {
        WaveletFamily::Haar | WaveletFamily::Daubechies(1) => {
            let h = std::f64::consts::FRAC_1_SQRT_2;
            vec![h, h]
        }
        WaveletFamily::Daubechies(2) => vec![
            0.48296291314469025,
            0.836516303737469,
            0.22414386804185735,
            -0.12940952255092145,
        ],
        WaveletFamily::Daubechies(3) => vec![
            0.3326705529509569,
            0.8068915093133388,
            0.4598775021193313,
            -0.13501102001039084,
            -0.08544127388224149,
            0.035226291882100656,
        ],
        WaveletFamily::Daubechies(4) => vec![
            0.23037781330885523,
            0.7148465705525415,
            0.6308807679295904,
            -0.02798376941698385,
            -0.18703481171888114,
            0.030841381835986965,
            0.032883011666982945,
            -0.010597401784997278,
        ],
        WaveletFamily::Daubechies(8) => vec![
            0.05441584224310401,
            0.31287159091429995,
            0.6756307362972898,
            0.5853546836542067,
            -0.015829105256349306,
            -0.2840155429615469,
            0.0004724845739132828,
            0.12874742662047847,
            -0.017369301001807547,
            -0.044088253930794755,
            0.013981027917398282,
            0.008746094047405777,
            -0.004870352993451574,
            -0.00039174037337694705,
            0.0006754494064505693,
            -0.00011747678412476953,
        ],
        WaveletFamily::Symlet(2) => vec![
            -0.12940952255092145,
            0.22414386804185735,
            0.836516303737469,
            0.48296291314469025,
        ],
        WaveletFamily::Symlet(3) => vec![
            0.035226291882100656,
            -0.08544127388224149,
            -0.13501102001039084,
            0.4598775021193313,
            0.8068915093133388,
            0.3326705529509569,
        ],
        WaveletFamily::Symlet(4) => vec![
            -0.07576571478927333,
            -0.02963552764599851,
            0.49761866763201545,
            0.8037387518059161,
            0.29785779560527736,
            -0.09921954357684722,
            -0.012603967262037833,
            0.0322231006040427,
        ],
        WaveletFamily::Symlet(8) => vec![
            -0.0033824159510050028,
            -0.0005421323318000107,
            0.03169508781152599,
            0.007607487324976609,
            -0.14329423835127267,
            -0.061273359067811076,
            0.4813596512590534,
            0.777185751699628,
            0.36444189483617895,
            -0.0519458381078818,
            -0.027219029917103486,
            0.04913717967373029,
            0.0038087520138944896,
            -0.014952258337062199,
            -0.0003029205147241331,
            0.001889950332767689,
        ],
        WaveletFamily::Coiflet(1) => vec![
            -0.01565572813546454,
            -0.0727326195128539,
            0.38486484686420286,
            0.8525720202122554,
            0.337_897_662_457_809_2,
            -0.0727326195128539,
        ],
        WaveletFamily::Coiflet(2) => vec![
            -0.0007205494453645122,
            -0.0018232088707029932,
            0.0056114348193944995,
            0.023680171946334084,
            -0.0594344186464569,
            -0.0764885990783064,
            0.41700518442169254,
            0.8127236354455423,
            0.3861100668211622,
            -0.06737255472196302,
            -0.04146493678175915,
            0.016387336463522112,
        ],
        WaveletFamily::Coiflet(4) => vec![
            -1.7849923247014131e-06,
            -3.259661820406219e-06,
            3.122989049843191e-05,
            6.233900337800576e-05,
            -0.00025997455619770015,
            -0.0005890210431895284,
            0.001266562276527722,
            0.003751438221819005,
            -0.0056582844670323785,
            -0.015211727797380755,
            0.025082265144577436,
            0.039334423227837687,
            -0.09622044404674387,
            -0.06662746983312023,
            0.43438605461655977,
            0.7822389291926984,
            0.41530841136890856,
            -0.05607731577773967,
            -0.08126670299516374,
            0.02668230481242222,
            0.016068945085754443,
            -0.007346171999741307,
            -0.0016294961388164642,
            0.000892312841384111,
        ],
        _ => return None,
    };
    Some(taps)
}
