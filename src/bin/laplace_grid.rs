use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use laplace_noise_timeseries::{
    load_config, ComparisonRenderer, ConfigFormat, Experiment, ExperimentConfig,
    PlottersRenderer,
};

#[derive(Parser, Debug)]
#[command(
    name = "laplace-grid",
    version,
    about = "Plot a synthetic count series next to Laplace-noised copies for several privacy budgets"
)]
struct Args {
    /// Optional configuration file (TOML or YAML). Flags override its values.
    #[arg(long, env = "LAPLACE_GRID_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ConfigFormat::Auto)]
    config_format: ConfigFormat,

    /// Number of time steps.
    #[arg(long)]
    length: Option<usize>,

    #[arg(long)]
    peak: Option<f64>,

    #[arg(long)]
    noise_std: Option<f64>,

    #[arg(long)]
    series_seed: Option<u64>,

    /// Privacy budget; repeat to build the list.
    #[arg(long = "epsilon")]
    epsilons: Vec<f64>,

    #[arg(long)]
    sensitivity: Option<f64>,

    #[arg(long)]
    noise_seed: Option<u64>,

    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    dpi: Option<u32>,

    /// Print per-epsilon noise statistics as JSON.
    #[arg(long)]
    summary_json: bool,
}

impl Args {
    fn apply(self, mut cfg: ExperimentConfig) -> ExperimentConfig {
        if let Some(length) = self.length {
            cfg.length = length;
        }
        if let Some(peak) = self.peak {
            cfg.peak = peak;
        }
        if let Some(noise_std) = self.noise_std {
            cfg.noise_std = noise_std;
        }
        if let Some(seed) = self.series_seed {
            cfg.series_seed = seed;
        }
        if !self.epsilons.is_empty() {
            cfg.epsilons = self.epsilons;
        }
        if let Some(sensitivity) = self.sensitivity {
            cfg.sensitivity = sensitivity;
        }
        if let Some(seed) = self.noise_seed {
            cfg.noise_seed = seed;
        }
        if let Some(output) = self.output {
            cfg.output = output;
        }
        if let Some(dpi) = self.dpi {
            cfg.dpi = dpi;
        }
        cfg
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let base = match &args.config {
        Some(path) => load_config(path, args.config_format)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ExperimentConfig::default(),
    };
    let summary_json = args.summary_json;
    let cfg = args.apply(base);

    let renderer = PlottersRenderer::with_dpi(cfg.dpi);
    renderer
        .check_layout(cfg.epsilons.len())
        .context("checking grid layout")?;

    let outcome = Experiment::run(&cfg).context("running laplace experiment")?;
    renderer
        .render(&outcome, &cfg.output)
        .context("rendering comparison grid")?;

    if summary_json {
        println!("{}", serde_json::to_string_pretty(&outcome.summary_table())?);
    } else {
        println!("wrote {}", cfg.output.display());
    }
    Ok(())
}
