//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use wpbasis::*;

fn trace(len: usize) -> Array1<f64> {
    Array1::from_shape_fn(len, |i| (i as f64 * 0.05).sin() + ((i * 31) % 17) as f64 * 0.1)
}

fn image(side: usize) -> Array2<f64> {
    Array2::from_shape_fn((side, side), |(r, c)| ((r as f64 * 0.4).sin() + (c as f64 * 0.3).cos()) * 64.0)
}

fn benchmark_trace_selection(c: &mut Criterion) {
    let packet = WaveletPacket::<Dwt1d>::new(&BasisConfig::default().with_depth(6))
        .expect("valid configuration");
    let mut group = c.benchmark_group("trace_best_basis");
    for len in [1 << 10, 1 << 13, 1 << 16] {
        let signal = trace(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &signal, |b, signal| {
            b.iter(|| black_box(packet.best_basis(signal.view(), &Shannon)));
        });
    }
    group.finish();
}

fn benchmark_image_round_trip(c: &mut Criterion) {
    let packet = WaveletPacket::<Dwt2d>::new(&BasisConfig::default().with_depth(4))
        .expect("valid configuration");
    let pixels = image(256);

    c.bench_function("image_select_and_synthesize_256", |b| {
        b.iter(|| {
            let basis = packet
                .best_basis(pixels.view(), &Shannon)
                .expect("selection succeeds");
            black_box(packet.synthesize(basis.into_nodes()))
        });
    });
}

criterion_group!(benches, benchmark_trace_selection, benchmark_image_round_trip);
criterion_main!(benches);
