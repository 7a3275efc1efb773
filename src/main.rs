use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use proofmark::album::{AlbumSettingsCache, StaticAlbumSettings};
use proofmark::config::Config;
use proofmark::storage::FsStore;
use proofmark::watermark::{FontRegistry, TileLayout, WatermarkInput};
use proofmark::{Pipeline, ProcessingService, QualityTier};

/// Proofmark - optimized and watermarked WebP derivatives for photo proofing
#[derive(Parser, Debug)]
#[command(name = "proofmark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Watermark overrides; unset values come from the configured defaults
#[derive(clap::Args, Debug, Default)]
struct WatermarkArgs {
    /// Watermark text (1-15 characters)
    #[arg(long)]
    text: Option<String>,

    /// Quality tier: 512p, 1080p, 2K or 4K
    #[arg(long)]
    tier: Option<String>,

    /// Font family name
    #[arg(long)]
    font: Option<String>,

    /// Overlay opacity in percent (10-90)
    #[arg(long)]
    opacity: Option<i64>,
}

impl WatermarkArgs {
    fn apply(&self, defaults: &WatermarkInput) -> WatermarkInput {
        WatermarkInput {
            text: self.text.clone().unwrap_or_else(|| defaults.text.clone()),
            tier: self.tier.clone().unwrap_or_else(|| defaults.tier.clone()),
            font: self.font.clone().unwrap_or_else(|| defaults.font.clone()),
            opacity_percent: self.opacity.unwrap_or(defaults.opacity_percent),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a single image file
    Process {
        /// Source image
        input: PathBuf,

        /// Output directory for both variants
        #[arg(short, long)]
        out: PathBuf,

        #[command(flatten)]
        watermark: WatermarkArgs,
    },

    /// Process every image in a directory with an album's settings
    Album {
        /// Directory containing the album's images
        dir: PathBuf,

        /// Album id used to look up watermark settings
        #[arg(long)]
        album_id: String,

        /// Output directory for the variants
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Print the overlay geometry for a canvas as JSON
    Layout {
        #[arg(long)]
        width: u32,

        #[arg(long)]
        height: u32,

        /// Watermark text; defaults to the configured text
        #[arg(long)]
        text: Option<String>,

        /// Quality tier; defaults to the configured tier
        #[arg(long)]
        tier: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Missing config file means built-in defaults
    let config = if args.config.exists() {
        Config::from_file(&args.config).unwrap_or_else(|e| {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        })
    } else {
        Config::default()
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // Initialize logging subsystem
    proofmark::logging::init_subscriber(&config.logging)
        .context("Failed to initialize logging subsystem")?;

    tracing::info!(
        config_file = %args.config.display(),
        resize_mode = ?config.pipeline.resize_mode,
        default_tier = %config.defaults.tier,
        timeout_secs = config.service.timeout_secs,
        max_concurrent_jobs = config.service.max_concurrent_jobs,
        albums = config.albums.len(),
        "Configuration loaded successfully"
    );

    match args.command {
        Command::Process {
            input,
            out,
            watermark,
        } => process_file(&config, &input, &out, &watermark).await,
        Command::Album { dir, album_id, out } => process_album(&config, &dir, &album_id, &out).await,
        Command::Layout {
            width,
            height,
            text,
            tier,
        } => print_layout(&config, width, height, text, tier),
    }
}

fn build_service(config: &Config, source_root: &Path, out: &Path) -> ProcessingService {
    let fonts = FontRegistry::load(&config.fonts);
    let pipeline = Pipeline::new(config.pipeline, config.limits, fonts);
    let albums = AlbumSettingsCache::new(Arc::new(StaticAlbumSettings::new(
        config.albums.clone(),
    )));

    ProcessingService::new(
        Arc::new(pipeline),
        Arc::new(FsStore::new(source_root)),
        Arc::new(FsStore::new(out)),
        Arc::new(albums),
        config.service.clone(),
        config.defaults.clone(),
    )
}

async fn process_file(
    config: &Config,
    input: &Path,
    out: &Path,
    watermark: &WatermarkArgs,
) -> anyhow::Result<()> {
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid input path: {}", input.display()))?;
    let source_root = input.parent().unwrap_or_else(|| Path::new("."));

    let service = build_service(config, source_root, out);
    let watermark = watermark.apply(&config.defaults);
    let processed = service.process_object_with(file_name, &watermark).await?;

    println!("optimized: {}", processed.optimized_ref);
    match (&processed.watermarked_ref, &processed.watermark_error) {
        (Some(reference), _) => println!("watermarked: {}", reference),
        (None, Some(e)) => println!("watermarked: failed ({})", e),
        (None, None) => {}
    }
    Ok(())
}

async fn process_album(config: &Config, dir: &Path, album_id: &str, out: &Path) -> anyhow::Result<()> {
    let service = build_service(config, dir, out);
    let report = service.process_album_prefix(album_id, "").await?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(processed) => println!(
                "{}: {} {}",
                outcome.key,
                processed.optimized_ref,
                processed.watermarked_ref.as_deref().unwrap_or("-")
            ),
            Err(e) => println!("{}: error: {}", outcome.key, e),
        }
    }
    println!("processed: {}, errors: {}", report.processed, report.errors);

    if report.errors > 0 {
        bail!("{} of {} images failed", report.errors, report.outcomes.len());
    }
    Ok(())
}

fn print_layout(
    config: &Config,
    width: u32,
    height: u32,
    text: Option<String>,
    tier: Option<String>,
) -> anyhow::Result<()> {
    let input = WatermarkArgs {
        text,
        tier,
        ..Default::default()
    }
    .apply(&config.defaults);
    let spec = input.validate()?;
    let tier: QualityTier = spec.tier();

    let layout = TileLayout::compute(
        spec.text_len(),
        tier,
        width,
        height,
        &config.pipeline.tiling(),
    )?;
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}
