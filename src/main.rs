use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use rand::{rngs::SmallRng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use retro_camera::{
    capture::{CaptureCoordinator, CaptureWorker},
    clock::{Clock, SystemClock},
    config::Config,
    effects::RetroPipeline,
    frame::Frame,
    CaptureError,
};

#[derive(Parser)]
#[command(
    name = "retro-camera",
    version,
    about = "A roll-film camera for your photos",
    long_about = "Retro-Camera stores photos on simulated film rolls of 27 exposures each and gives every shot a retro film look: boosted colors, grain, a warm cast and a date imprint."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a fresh roll of film
    Reset,

    /// Take photos: process each image and store it on the current roll
    Capture {
        /// Image files handed over by the camera (PNG or JPEG)
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// List every registered roll
    Rolls,

    /// List the photos on a roll (defaults to the latest roll)
    Photos {
        roll: Option<String>,
    },

    /// Delete a roll
    Delete {
        roll: String,
    },

    /// Apply the retro effect to a single image without touching any roll
    Effect {
        input: PathBuf,
        output: PathBuf,
    },

    /// Write the default configuration to a file
    InitConfig {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting Retro-Camera v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    match cli.command {
        Command::Reset => {
            let mut camera = CaptureCoordinator::open(config)?;
            let roll = camera.reset_film()?;
            println!("Loaded roll {} ({} exposures)", roll.id(), roll.remaining());
        }
        Command::Capture { images } => capture(config, images).await?,
        Command::Rolls => {
            let camera = CaptureCoordinator::open(config)?;
            let rolls = camera.rolls();
            if rolls.is_empty() {
                println!("No rolls yet. Run `retro-camera reset` to load one.");
            }
            for entry in rolls {
                let created = Local
                    .timestamp_millis_opt(entry.created_at)
                    .single()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| entry.created_at.to_string());
                println!("{}  {}", entry.roll_name, created);
            }
        }
        Command::Photos { roll } => {
            let camera = CaptureCoordinator::open(config)?;
            let roll = match roll {
                Some(roll) => roll,
                None => camera
                    .rolls()
                    .pop()
                    .map(|entry| entry.roll_name)
                    .context("No rolls registered")?,
            };
            for photo in camera.photos(&roll)? {
                println!("{}", photo.display());
            }
        }
        Command::Delete { roll } => {
            let mut camera = CaptureCoordinator::open(config)?;
            camera.delete_roll(&roll)?;
            println!("Deleted roll {}", roll);
        }
        Command::Effect { input, output } => {
            let pipeline = RetroPipeline::from_config(&config.effect)?;
            let mut rng = match config.effect.grain_seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            };

            info!("Applying {} to {:?}", pipeline.stage_names().join(" -> "), input);
            let frame = Frame::open(&input)?;
            let processed = pipeline.apply_with(&frame, &mut rng, SystemClock.today());
            let bytes = processed.encode_jpeg(config.output.jpeg_quality)?;
            tokio::fs::write(&output, bytes)
                .await
                .with_context(|| format!("Failed to write {:?}", output))?;
            println!("Saved {:?}", output);
        }
        Command::InitConfig { path } => {
            Config::default().save_to_file(&path)?;
            println!("Wrote default configuration to {:?}", path);
        }
    }

    Ok(())
}

/// Resume the latest roll and feed every image through the capture worker
async fn capture(config: Config, images: Vec<PathBuf>) -> Result<()> {
    let mut camera = CaptureCoordinator::open(config)?;
    if camera.resume_latest()?.is_none() {
        anyhow::bail!("No film loaded. Run `retro-camera reset` first.");
    }

    let worker = CaptureWorker::spawn(camera);
    let handle = worker.handle();

    for image in &images {
        let frame = match Frame::open(image) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping {:?}: {}", image, e);
                continue;
            }
        };

        match handle.capture(frame).await {
            Ok(stored) => println!("{:?} -> {:?}", image, stored),
            Err(e @ CaptureError::Film(_)) => {
                eprintln!("{}", e.user_message());
                break;
            }
            Err(e) if e.is_recoverable() => eprintln!("{:?}: {}", image, e.user_message()),
            Err(e) => return Err(e.into()),
        }
    }

    drop(handle);
    let camera = worker.shutdown().await?;
    println!("Status: {:?}", camera.status());
    Ok(())
}
