//! Compare packet and plain wavelet compression of a synthetic ridge image.

use ndarray::Array2;
use wpbasis::{BasisConfig, Dwt2d, Shannon, ThresholdCount, WaveletPacket};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Whorl-like ridges on a light background.
    let image = Array2::from_shape_fn((128, 128), |(r, c)| {
        let (x, y) = (r as f64 - 64.0, c as f64 - 64.0);
        let radius = (x * x + y * y).sqrt();
        255.0 - 110.0 * (1.0 + (radius * 0.45 + 0.02 * x).sin())
    });

    let packet = WaveletPacket::<Dwt2d>::new(&BasisConfig::default().with_depth(4))?;
    let counting = ThresholdCount::new(1.0);

    println!("fraction\tbasis\tnodes\tretained\tmse");
    for fraction in [0.0, 1e-4, 1e-3, 1e-2, 5e-2, 1e-1] {
        let runs = [
            ("wp/shannon", packet.compress(image.view(), &Shannon, fraction)?),
            ("wp/count", packet.compress(image.view(), &counting, fraction)?),
            ("dwt", packet.compress_dyadic(image.view(), &Shannon, fraction)?),
        ];
        for (label, result) in runs {
            println!(
                "{fraction:e}\t{label}\t{}\t{}\t{:.4e}",
                result.nodes, result.report.retained, result.mse
            );
        }
    }

    Ok(())
}
