use std::collections::HashSet;

use blake3::Hasher;
use wpbasis::*;

use test_helpers::*;

fn fingerprint<D: ndarray::Dimension>(basis: &BestBasis<D>) -> blake3::Hash {
    let mut hasher = Hasher::new();
    for node in basis.nodes() {
        hasher.update(node.to_string().as_bytes());
        for c in node.coefficients() {
            hasher.update(&c.to_le_bytes());
        }
    }
    hasher.update(&basis.total_cost().to_le_bytes());
    hasher.finalize()
}

#[test]
fn trace_selection_is_deterministic() {
    let signal = chirp(512);
    let config = BasisConfig::default().with_depth(5);

    let mut fingerprints = HashSet::new();
    for _ in 0..5 {
        let packet = WaveletPacket::<Dwt1d>::new(&config).expect("valid configuration");
        let basis = packet
            .best_basis(signal.view(), &Shannon)
            .expect("selection succeeds");
        fingerprints.insert(fingerprint(&basis));
    }

    assert_eq!(fingerprints.len(), 1, "outputs diverged across runs");
}

#[test]
fn image_compression_is_deterministic() {
    let image = ridges(64, 64);
    let config = BasisConfig::default()
        .with_wavelet(WaveletFamily::Symlet(2))
        .with_depth(3)
        .with_order(BasisOrder::DeepFirst);

    let mut fingerprints = HashSet::new();
    for _ in 0..3 {
        let packet = WaveletPacket::<Dwt2d>::new(&config).expect("valid configuration");
        let result = packet
            .compress(image.view(), &ThresholdCount::new(1.0), 0.05)
            .expect("compression succeeds");
        let mut hasher = Hasher::new();
        for value in result.reconstruction.iter() {
            hasher.update(&value.to_le_bytes());
        }
        hasher.update(&result.report.retained.to_le_bytes());
        fingerprints.insert(hasher.finalize());
    }

    assert_eq!(fingerprints.len(), 1, "outputs diverged across runs");
}
