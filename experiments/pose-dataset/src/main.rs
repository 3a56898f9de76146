//! pose-dataset: extract, embed and inspect yoga pose landmark datasets.

use asana_base::{LogConfig, init_file_logger, init_stdout_logger};
use asana_dataset::{Dataset, PipelineConfig};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "pose-dataset")]
#[command(about = "Build and inspect pose landmark datasets")]
#[command(version)]
struct Cli {
    /// JSON pipeline configuration (model, tracker, normalizer, builder).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to date-named files in this folder instead of stdout.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect keypoints in `<images>/<class>/*.jpg|png` and write a landmark CSV.
    Build(BuildArgs),

    /// Turn a landmark CSV into classifier features.
    Embed {
        /// Landmark CSV written by `build`.
        #[arg(long)]
        csv: PathBuf,

        /// Output CSV: class_no followed by the 34 embedding features.
        #[arg(long)]
        out: PathBuf,
    },

    /// Print per-class row counts of a landmark CSV.
    Inspect {
        #[arg(long)]
        csv: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
struct BuildArgs {
    /// Root folder with one subfolder per pose class.
    #[arg(long)]
    images: PathBuf,

    /// Merged landmark CSV. `skipped_log.txt` is written next to it.
    #[arg(long)]
    out: PathBuf,

    /// Also write one CSV per class into this folder.
    #[arg(long)]
    per_class: Option<PathBuf>,

    /// Minimum keypoint score for a photo to be kept.
    #[arg(long)]
    threshold: Option<f32>,

    /// MoveNet ONNX model. Overrides the config file.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Square model input size (192 for Lightning, 256 for Thunder).
    #[arg(long)]
    input_size: Option<usize>,
}

fn init_logging(log_dir: Option<&Path>) -> CliResult<()> {
    let config = LogConfig::from_env();
    match log_dir {
        Some(dir) => init_file_logger(dir, config)
            .map_err(|err| format!("cannot log to {}: {}", dir.display(), err))?,
        None => init_stdout_logger(config),
    }
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.log_dir.as_deref())?;

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Build(args) => run_build(config, args),
        Commands::Embed { csv, out } => run_embed(&config, csv, out),
        Commands::Inspect { csv } => run_inspect(csv),
    }
}

#[cfg(feature = "onnx")]
fn run_build(mut config: PipelineConfig, args: BuildArgs) -> CliResult<()> {
    use asana_dataset::DatasetBuilder;
    use asana_pose::MoveNetDetector;

    if let Some(threshold) = args.threshold {
        config.builder.detection_threshold = threshold;
    }
    if let Some(input_size) = args.input_size {
        config.input_size = input_size;
    }
    let model = args
        .model
        .or(config.model.clone())
        .ok_or("no model given: pass --model or set \"model\" in the config")?;
    config.validate()?;

    let detector = MoveNetDetector::new(&model, config.input_size)?;
    let mut builder = DatasetBuilder::new(detector)
        .with_config(config.builder.clone())?
        .with_tracker_config(config.pose.tracker)?;

    let report = builder.build(&args.images, &args.out, args.per_class.as_deref())?;

    println!(
        "{} rows over {} classes written to {}",
        report.accepted(),
        report.class_names.len(),
        args.out.display()
    );
    if !report.skipped.is_empty() {
        println!(
            "{} images skipped, see {}",
            report.skipped.len(),
            report.skipped_log.display()
        );
    }
    Ok(())
}

#[cfg(not(feature = "onnx"))]
fn run_build(_config: PipelineConfig, _args: BuildArgs) -> CliResult<()> {
    Err("pose-dataset was built without ONNX support, rebuild with --features onnx".into())
}

fn run_embed(config: &PipelineConfig, csv: PathBuf, out: PathBuf) -> CliResult<()> {
    let dataset = Dataset::load(&csv)?;
    dataset.write_embeddings(&out, &config.pose.normalizer)?;
    log::info!(
        "embedded {} rows (feature layout v{})",
        dataset.len(),
        asana_pose::EMBEDDING_VERSION
    );
    println!("{} embeddings written to {}", dataset.len(), out.display());
    Ok(())
}

fn run_inspect(csv: PathBuf) -> CliResult<()> {
    let dataset = Dataset::load(&csv)?;
    println!("{}: {} rows", csv.display(), dataset.len());
    for (class_no, name, count) in dataset.class_counts() {
        println!("  {:>3}  {:<24} {}", class_no, name, count);
    }
    Ok(())
}
