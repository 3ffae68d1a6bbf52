use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ndarray::{Array1, Array2, ArrayView};
use tracing_subscriber::EnvFilter;
use wpbasis::{
    verify_cover, BasisConfig, BasisOrder, CostFunctional, CostRegistry, Decomposition, Dwt1d,
    Dwt2d, ExtensionMode, FromConfig, WaveletFamily, WaveletPacket,
};

#[derive(Parser, Debug)]
#[command(name = "wpbasis", about = "Wavelet-packet best-basis selection for traces and images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Select the best basis of a signal and check that it rebuilds the signal.
    Basis(SignalArgs),
    /// Threshold the best basis and report the reconstruction error.
    Compress {
        #[command(flatten)]
        signal: SignalArgs,
        /// Coefficients below this fraction of the largest magnitude are zeroed.
        #[arg(long, default_value_t = 0.01)]
        fraction: f64,
    },
    /// List the available cost functionals.
    Costs {
        /// Threshold used by the `threshold` cost functional.
        #[arg(long, default_value_t = 0.1)]
        threshold: f64,
    },
}

#[derive(Args, Debug)]
struct SignalArgs {
    /// Whitespace-separated reals; for images each line is a row.
    input: PathBuf,
    /// How to read the input file.
    #[arg(long, value_enum, default_value_t = Layout::Trace)]
    layout: Layout,
    /// Wavelet name (haar, db1-db4, db8, sym2-sym4, sym8, coif1, coif2, coif4).
    #[arg(long, default_value = "db4")]
    wavelet: WaveletFamily,
    /// Extension mode (per, zero, constant, symmetric, ppd, smooth).
    #[arg(long, default_value = "per")]
    mode: ExtensionMode,
    /// Tree depth (default: deepest level the signal supports).
    #[arg(long)]
    depth: Option<usize>,
    /// Cost functional name.
    #[arg(long, default_value = "shannon")]
    cost: String,
    /// Threshold used by the `threshold` cost functional.
    #[arg(long, default_value_t = 0.1)]
    threshold: f64,
    /// Basis order (shallow or deep).
    #[arg(long, default_value = "shallow")]
    order: BasisOrder,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// One-dimensional trace
    Trace,
    /// Two-dimensional image
    Image,
}

impl SignalArgs {
    fn config(&self) -> BasisConfig {
        BasisConfig {
            wavelet: self.wavelet,
            mode: self.mode,
            depth: self.depth,
            order: self.order,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Basis(args) => run_basis(&args)?,
        Commands::Compress { signal, fraction } => run_compress(&signal, fraction)?,
        Commands::Costs { threshold } => {
            for info in CostRegistry::with_defaults(threshold).list() {
                println!("{}\t{}", info.name, info.description);
            }
        }
    }

    Ok(())
}

fn run_basis(args: &SignalArgs) -> Result<()> {
    let registry = CostRegistry::with_defaults(args.threshold);
    let cost = lookup_cost(&registry, &args.cost)?;
    let config = args.config();

    match args.layout {
        Layout::Trace => {
            let trace = read_trace(&args.input)?;
            report_basis::<Dwt1d>(&config, trace.view(), cost.as_ref())
        }
        Layout::Image => {
            let image = read_image(&args.input)?;
            report_basis::<Dwt2d>(&config, image.view(), cost.as_ref())
        }
    }
}

fn run_compress(args: &SignalArgs, fraction: f64) -> Result<()> {
    let registry = CostRegistry::with_defaults(args.threshold);
    let cost = lookup_cost(&registry, &args.cost)?;
    let config = args.config();

    match args.layout {
        Layout::Trace => {
            let trace = read_trace(&args.input)?;
            report_compression::<Dwt1d>(&config, trace.view(), cost.as_ref(), fraction)
        }
        Layout::Image => {
            let image = read_image(&args.input)?;
            report_compression::<Dwt2d>(&config, image.view(), cost.as_ref(), fraction)
        }
    }
}

fn lookup_cost(
    registry: &CostRegistry,
    name: &str,
) -> Result<std::sync::Arc<dyn CostFunctional>> {
    registry.get(name).with_context(|| {
        let known: Vec<String> = registry.list().into_iter().map(|info| info.name).collect();
        format!("unknown cost functional '{}' (known: {})", name, known.join(", "))
    })
}

fn report_basis<T>(
    config: &BasisConfig,
    signal: ArrayView<'_, f64, T::Dim>,
    cost: &dyn CostFunctional,
) -> Result<()>
where
    T: Decomposition + FromConfig,
{
    let packet = WaveletPacket::<T>::new(config).context("invalid configuration")?;
    let basis = packet
        .best_basis(signal.view(), cost)
        .context("best-basis selection failed")?;

    for node in basis.nodes() {
        println!("{node}");
    }
    println!("nodes={}\ttotal_cost={:.6}", basis.len(), basis.total_cost());

    match verify_cover(basis.nodes(), basis.branching()) {
        Ok(()) => println!("cover=complete"),
        Err(err) => println!("cover=invalid\t{err}"),
    }

    let rebuilt = packet
        .synthesize(basis.into_nodes())
        .context("synthesis failed")?;
    let error = signal
        .iter()
        .zip(rebuilt.iter())
        .fold(0.0_f64, |m, (a, b)| m.max((a - b).abs()));
    println!("round_trip_max_error={error:.3e}");

    Ok(())
}

fn report_compression<T>(
    config: &BasisConfig,
    signal: ArrayView<'_, f64, T::Dim>,
    cost: &dyn CostFunctional,
    fraction: f64,
) -> Result<()>
where
    T: Decomposition + FromConfig,
{
    let packet = WaveletPacket::<T>::new(config).context("invalid configuration")?;
    let runs = [
        ("wp", packet.compress(signal.view(), cost, fraction)),
        ("dwt", packet.compress_dyadic(signal.view(), cost, fraction)),
    ];

    for (label, result) in runs {
        let result = result.with_context(|| format!("{label} compression failed"))?;
        println!(
            "{}\tnodes={}\tthreshold={:.6e}\tretained={}\tlarge={}\tmse={:.6e}",
            label,
            result.nodes,
            result.report.threshold,
            result.report.retained,
            result.large_coefficients,
            result.mse
        );
    }

    Ok(())
}

fn read_rows(path: &Path) -> Result<Vec<Vec<f64>>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(line_no, line)| {
            line.split_whitespace()
                .map(|token| {
                    token.parse::<f64>().with_context(|| {
                        format!("invalid number '{}' on line {}", token, line_no + 1)
                    })
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect()
}

fn read_trace(path: &Path) -> Result<Array1<f64>> {
    let samples = read_rows(path)?.concat();
    ensure!(!samples.is_empty(), "{} holds no samples", path.display());
    Ok(Array1::from(samples))
}

fn read_image(path: &Path) -> Result<Array2<f64>> {
    let rows = read_rows(path)?;
    let Some(width) = rows.first().map(Vec::len) else {
        bail!("{} holds no rows", path.display());
    };
    if let Some(pos) = rows.iter().position(|row| row.len() != width) {
        bail!(
            "row {} of {} has {} values, expected {}",
            pos + 1,
            path.display(),
            rows[pos].len(),
            width
        );
    }
    let height = rows.len();
    Array2::from_shape_vec((height, width), rows.concat())
        .with_context(|| format!("failed to shape {} as {}x{}", path.display(), height, width))
}
