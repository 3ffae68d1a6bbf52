//! Best basis of a piecewise-smooth trace, printed node by node.

use ndarray::Array1;
use wpbasis::{
    mark, traverse, BasisConfig, BasisOrder, Dwt1d, Shannon, Tree, WaveletFamily, WaveletPacket,
};

fn main() -> anyhow::Result<()> {
    // Smooth ramp with a jump and a burst of oscillation in the middle.
    let signal = Array1::from_shape_fn(256, |i| {
        let t = i as f64 / 256.0;
        let jump = if t > 0.3 { 2.0 } else { 0.0 };
        let burst = if (0.55..0.7).contains(&t) {
            (t * 300.0).sin()
        } else {
            0.0
        };
        t + jump + burst
    });

    let config = BasisConfig::default()
        .with_wavelet(WaveletFamily::Daubechies(2))
        .with_depth(5)
        .with_order(BasisOrder::DeepFirst);
    let packet = WaveletPacket::<Dwt1d>::new(&config)?;

    // Full marked tree, the way it is scored.
    let mut tree: Tree<_> = packet.decompose(signal.view())?;
    mark(&mut tree, &Shannon)?;
    print!("{tree}");
    println!("selected: {:?}", traverse(&tree, config.order)?);

    let basis = packet.best_basis(signal.view(), &Shannon)?;
    let plain = packet.dyadic_basis(signal.view(), &Shannon)?;
    println!(
        "best basis: {} nodes, cost {:.4}; wavelet basis: {} nodes, cost {:.4}",
        basis.len(),
        basis.total_cost(),
        plain.len(),
        plain.total_cost()
    );

    let rebuilt = packet.synthesize(basis.into_nodes())?;
    let error = (&rebuilt - &signal).iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    println!("round-trip max error: {error:.2e}");

    Ok(())
}
