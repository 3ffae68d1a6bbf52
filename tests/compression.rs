//! Thresholding experiments on the selected basis


use test_helpers::*;
use wpbasis::compression::count_large_in;
use wpbasis::*;

#[test]
fn test_error_grows_with_fraction() {
    let image = ridges(64, 64);
    let config = BasisConfig::default().with_wavelet(WaveletFamily::Daubechies(2)).with_depth(3);
    let packet = WaveletPacket::<Dwt2d>::new(&config).expect("valid configuration");

    let mut previous_mse = 0.0;
    let mut previous_retained = usize::MAX;
    for fraction in [0.0, 0.001, 0.01, 0.1, 0.5] {
        let result = packet
            .compress(image.view(), &Shannon, fraction)
            .expect("compression succeeds");
        assert!(result.mse + 1e-12 >= previous_mse, "mse shrank at {fraction}");
        assert!(result.report.retained <= previous_retained);
        previous_mse = result.mse;
        previous_retained = result.report.retained;
    }
    assert!(previous_mse > 0.0);
}

#[test]
fn test_zero_fraction_is_lossless() {
    let signal = chirp(128);
    let config = BasisConfig::default().with_depth(3);
    let packet = WaveletPacket::<Dwt1d>::new(&config).expect("valid configuration");

    let result = packet
        .compress(signal.view(), &Shannon, 0.0)
        .expect("compression succeeds");
    assert!(result.mse < 1e-20);
    assert_eq!(result.reconstruction.len(), 128);
}

#[test]
fn test_full_fraction_keeps_only_the_maximum() {
    let signal = chirp(64);
    let packet = WaveletPacket::<Dwt1d>::new(
        &BasisConfig::default().with_wavelet(WaveletFamily::Haar).with_depth(3),
    )
    .expect("valid configuration");

    let mut basis = packet.best_basis(signal.view(), &Shannon).expect("selection succeeds");
    let maximum = basis
        .nodes()
        .iter()
        .flat_map(|n| n.coefficients().iter())
        .fold(0.0_f64, |m, c| m.max(c.abs()));
    let report = hard_threshold(basis.nodes_mut(), 1.0).expect("threshold applies");
    assert_eq!(report.threshold, maximum);
    assert!(report.retained >= 1);
    for c in basis.nodes().iter().flat_map(|n| n.coefficients().iter()) {
        assert!(*c == 0.0 || c.abs() == maximum, "survivor {c} below the maximum {maximum}");
    }
    let survivors: usize = basis
        .nodes()
        .iter()
        .map(|n| n.coefficients().iter().filter(|c| c.abs() > 0.0).count())
        .sum();
    assert_eq!(survivors, report.retained);
    assert_eq!(count_large_in(basis.nodes(), report.threshold), report.retained);
}

#[test]
fn test_packet_and_dyadic_bases_differ_in_size() {
    let image = ridges(32, 32);
    let config = BasisConfig::default().with_wavelet(WaveletFamily::Haar).with_depth(3);
    let packet = WaveletPacket::<Dwt2d>::new(&config).expect("valid configuration");

    let dyadic = packet
        .compress_dyadic(image.view(), &Shannon, 0.01)
        .expect("compression succeeds");
    assert_eq!(dyadic.nodes, 3 * 3 + 1);

    let best = packet.best_basis(image.view(), &Shannon).expect("selection succeeds");
    let plain = packet.dyadic_basis(image.view(), &Shannon).expect("selection succeeds");
    assert!(best.total_cost() <= plain.total_cost() + 1e-9 * plain.total_cost().abs());
}
