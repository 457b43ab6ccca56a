//! Precipitation animation generator.
//!
//! Reads daily gridded precipitation files, renders one map per day and
//! assembles the frames into an animated GIF.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use animator::{AnimatorConfig, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "animator")]
#[command(about = "Render daily precipitation grids into map frames and an animated GIF")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default_config.yaml", env = "ANIMATOR_CONFIG")]
    config: PathBuf,

    /// Log level (overrides logging.level)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format: pretty or json (overrides logging.format)
    #[arg(long)]
    log_format: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match AnimatorConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {} ({})", e, args.config.display());
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&args, &config);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(args: &Args, config: &AnimatorConfig) {
    let level = args
        .log_level
        .clone()
        .or_else(|| config.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let format = args
        .log_format
        .clone()
        .or_else(|| config.logging.format.clone())
        .unwrap_or_else(|| "pretty".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(config: &AnimatorConfig) -> Result<()> {
    info!(
        input = %config.data.input_folder.display(),
        start = %config.date_range.start,
        end = %config.date_range.end,
        "Starting animator"
    );

    let pipeline = Pipeline::new(config).context("Failed to initialise pipeline")?;
    let summary = pipeline.run().context("Animation run failed")?;

    info!(
        discovered = summary.discovered,
        frames = summary.frames.len(),
        skipped = summary.skipped.len(),
        "Run complete"
    );
    if let Some(path) = &summary.animation {
        println!("Animation saved to: {}", path.display());
    }
    Ok(())
}
