// src/main.rs
use anyhow::{Result, Context};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use systvar::analysis::{self, precision, RandomVariateEngine, UncertaintyPropagator};
use systvar::config::{Preset, RunConfig, StoreLayout, VariationPolicy};
use systvar::file::{self, FileHandler, FileStore, HistogramFileHandler, HistogramStore, ManifestFileHandler, RunManifest};

#[derive(Parser)]
#[command(name = "systvar")]
#[command(about = "Systematic-uncertainty variations for binned measurements")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one "+1 sigma" histogram per systematic source
    Run {
        /// Input histogram container (RON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output container. Defaults to `<input stem>_syst.ron` next to the input.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also export all histograms as a CSV table
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Threads (0 = auto)
        #[arg(long, default_value = "0")]
        threads: usize,

        /// Skip writing the run manifest
        #[arg(long)]
        no_manifest: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the resolved configuration as RON
    ShowConfig {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List the histograms in a container
    Inspect {
        /// Histogram container (RON)
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Config file (RON, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name (or group/name) of the nominal histogram
    #[arg(long)]
    key: Option<String>,

    /// Built-in source list, used when the config names no sources
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// RNG seed. Unseeded runs draw one and record it in the manifest.
    #[arg(long)]
    seed: Option<u64>,

    /// Gaussian draws per (bin, sampled source)
    #[arg(long)]
    samples: Option<usize>,

    /// Output layout for derived histograms
    #[arg(long, value_enum)]
    layout: Option<StoreLayout>,

    /// Evaluate bins and sources on the calling thread only
    #[arg(long)]
    sequential: bool,

    /// Accept a nominal histogram whose binning differs from the configured one
    #[arg(long)]
    any_binning: bool,
}

impl ConfigArgs {
    fn load(&self) -> Result<RunConfig> {
        let mut config = RunConfig::load(self.config.as_deref())?;
        if let Some(key) = &self.key {
            config.nominal_key = key.clone();
        }
        if let Some(preset) = self.preset {
            config.preset = preset;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(samples) = self.samples {
            config.samples = samples;
        }
        if let Some(layout) = self.layout {
            config.layout = Some(layout);
        }
        if self.sequential {
            config.parallel = false;
        }
        if self.any_binning {
            config.check_binning = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Run { input, output, csv, threads, no_manifest, config } => {
            cmd_run(&input, output, csv.as_deref(), threads, !no_manifest, &config)
        }
        Commands::ShowConfig { config } => cmd_show_config(&config),
        Commands::Inspect { input } => cmd_inspect(&input),
    }
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "histograms".to_string());
    input.with_file_name(format!("{}_syst.ron", stem))
}

fn cmd_run(
    input: &Path,
    output: Option<PathBuf>,
    csv: Option<&Path>,
    threads: usize,
    manifest: bool,
    args: &ConfigArgs,
) -> Result<()> {
    let config = args.load()?;
    let (registry, settings) = config.resolve().context("Invalid systematics configuration")?;

    if threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
            tracing::warn!(threads, error = %e, "ignoring --threads; global thread pool already initialized");
        }
    }

    let output = output.unwrap_or_else(|| default_output(input));
    tracing::info!(path = %input.display(), key = %config.nominal_key, "loading nominal histogram");
    let mut store = FileStore::open(input, &output)?;
    let nominal = store.load_nominal(&config.nominal_key)?;
    if config.check_binning {
        analysis::ensure_binning(&nominal, &config.binning)?;
    }

    for source in registry.iter().filter(|s| s.policy == VariationPolicy::Sampled) {
        let (lo, hi) = precision::rms_interval(source.fraction, settings.samples, 0.95);
        tracing::info!(source = %source.name, fraction = source.fraction, lo, hi, "expected relative shift (95%)");
    }

    let propagator = UncertaintyPropagator::new(registry, settings)?;
    let engine = RandomVariateEngine::new(config.seed);
    let derived = analysis::generate_variations(&nominal, &propagator, &engine)?;

    file::write_outputs(&mut store, &nominal, &derived, config.layout())?;
    store.flush()?;

    if let Some(csv) = csv {
        file::export_csv(csv, &nominal, &derived)
            .with_context(|| format!("Failed to export CSV: {}", csv.display()))?;
    }

    if manifest {
        let mut record = RunManifest::new(
            input,
            &output,
            &config.nominal_key,
            engine.seed(),
            settings.samples,
            config.layout(),
            propagator.registry().sources().to_vec(),
        );
        if let Some(csv) = csv {
            record = record.with_csv(csv);
        }
        ManifestFileHandler::new().save(&record, &RunManifest::path_for(&output))?;
    }

    println!("seed: {}", engine.seed());
    println!("{:<48} {:>13} {:>9} {:>10}", "source", "policy", "fraction", "shift");
    let nominal_integral = nominal.integral();
    for (source, histogram) in propagator.registry().iter().zip(&derived) {
        let shift = if nominal_integral != 0.0 {
            histogram.integral() / nominal_integral - 1.0
        } else {
            0.0
        };
        println!(
            "{:<48} {:>13} {:>9.4} {:>9.3}%",
            source.name,
            format!("{:?}", source.policy).to_lowercase(),
            source.fraction,
            shift * 100.0
        );
    }
    println!("wrote {}", output.display());

    Ok(())
}

fn cmd_show_config(args: &ConfigArgs) -> Result<()> {
    let mut config = args.load()?;
    config.resolve().context("Invalid systematics configuration")?;
    config.sources = config.sources();
    config.layout = Some(config.layout());
    println!("{}", file::to_pretty_ron(&config)?);
    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<()> {
    let container = HistogramFileHandler::new().load(input)?;
    println!("{} (version {})", input.display(), container.version);
    for entry in &container.entries {
        let h = &entry.histogram;
        let axis = h.axis();
        println!(
            "  {:<60} {:>4} bins [{}, {}] integral {:.4}",
            entry.key(),
            axis.bins,
            axis.low,
            axis.high,
            h.integral()
        );
    }
    Ok(())
}
