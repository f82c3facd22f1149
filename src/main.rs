use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use maskpoly::io::{job_names, load_mask, write_records};
use maskpoly::{BatchRunner, EdgeMode, ExtractorConfig, MaskJob, MaskToPolygon, TargetSize};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EdgeModeArg {
    Binary,
    Canny,
}

#[derive(Parser)]
#[command(name = "maskpoly")]
#[command(about = "Trace the outline of the largest region in segmentation masks")]
struct Cli {
    /// Mask files (PNG/TIFF/... or .npy)
    #[arg(value_name = "MASK", required = true)]
    masks: Vec<PathBuf>,

    /// Write JSON results here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Size to rescale points into, e.g. 1024x768
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    target: Option<TargetSize>,

    /// Keep points in mask pixel coordinates
    #[arg(long)]
    no_scale: bool,

    /// Extractor settings as JSON
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Structuring element side length (overrides config)
    #[arg(long, value_name = "N")]
    kernel_size: Option<u32>,

    /// Simplification tolerance in pixels (overrides config)
    #[arg(long, value_name = "PIXELS")]
    tolerance: Option<f64>,

    /// Edge detector (overrides config)
    #[arg(long, value_enum)]
    edge_mode: Option<EdgeModeArg>,

    /// Canny low threshold
    #[arg(long, default_value_t = 50.0)]
    canny_low: f32,

    /// Canny high threshold
    #[arg(long, default_value_t = 100.0)]
    canny_high: f32,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Worker threads
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn extractor_config(&self) -> anyhow::Result<ExtractorConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractorConfig::from_json_file(path)?,
            None => ExtractorConfig::default(),
        };
        if let Some(kernel_size) = self.kernel_size {
            config.kernel_size = kernel_size;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        match self.edge_mode {
            Some(EdgeModeArg::Binary) => config.edge_mode = EdgeMode::Binary,
            Some(EdgeModeArg::Canny) => {
                config.edge_mode = EdgeMode::Canny {
                    low: self.canny_low,
                    high: self.canny_high,
                }
            }
            None => {}
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let scale_points = !args.no_scale;
    if scale_points && args.target.is_none() {
        anyhow::bail!("--target is required unless --no-scale is given");
    }

    let extractor = MaskToPolygon::new(args.target).with_config(args.extractor_config()?);

    let mut jobs = Vec::with_capacity(args.masks.len());
    for (path, name) in args.masks.iter().zip(job_names(&args.masks)) {
        if args.verbose {
            eprintln!("Loading mask: {:?}", path);
        }
        jobs.push(MaskJob::new(name, load_mask(path)?));
    }

    let mut runner = BatchRunner::new(extractor)
        .with_verbose(args.verbose)
        .with_threads(args.threads)
        .with_scale_points(scale_points);
    if let Some(debug_dir) = args.debug_out {
        runner = runner.with_debug(debug_dir)?;
    }

    let records = runner.run(&jobs)?;

    match &args.output {
        Some(path) => {
            write_records(path, &records)?;
            if args.verbose {
                eprintln!("Wrote {} record(s) to {:?}", records.len(), path);
            }
        }
        None => println!("{}", serde_json::to_string_pretty(&records)?),
    }

    let failed = records.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} mask(s) failed", failed, records.len());
    }

    Ok(())
}
