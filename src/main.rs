use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bilingual_reels::{pipeline::Script, Config, ReelError, ReelPipeline, RenderOutcome, RenderRequest};

#[derive(Parser)]
#[command(
    name = "bilingual-reels",
    version,
    about = "Render a bilingual short-form video reel",
    long_about = "Bilingual Reels synthesizes an English hook and an Arabic body with neural voices, renders their text overlays and joins both clips into one vertical video."
)]
struct Cli {
    /// Opening line, in English
    #[arg(long)]
    hook: String,

    /// Body script, in Arabic
    #[arg(long)]
    body: String,

    /// Content pillar selecting the hook background (wins, tech, vision)
    #[arg(short, long)]
    pillar: Option<String>,

    /// Explicit run id instead of a derived one
    #[arg(long)]
    run_id: Option<String>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the final video
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep the run directory with all intermediate files
    #[arg(long)]
    keep_intermediates: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, the outcome to stdout
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Bilingual Reels v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    config.apply_env();
    if let Some(output_dir) = cli.output_dir {
        config.pipeline.output_dir = output_dir;
    }
    if cli.keep_intermediates {
        config.pipeline.keep_intermediates = true;
    }

    let mut request = RenderRequest::new(cli.hook, cli.body);
    request.pillar = cli.pillar;
    request.run_id = cli.run_id;

    // Reject bad input before touching the network or FFmpeg
    if let Err(e) = Script::from_request(request.clone(), &config.pipeline.default_pillar) {
        let e = ReelError::from(e);
        error!(stage = %e.stage(), "{}", e);
        eprintln!("❌ {} failed: {}", e.stage(), e.user_message());
        std::process::exit(1);
    }

    let pipeline = match ReelPipeline::from_config(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!(stage = %e.stage(), "{}", e);
            eprintln!("❌ {}", e.user_message());
            std::process::exit(2);
        }
    };

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            let _ = cancel_tx.send(true);
        }
    });

    match pipeline.run_until_cancelled(request, cancel_rx).await {
        Ok(video) => {
            println!("{}", serde_json::to_string_pretty(&RenderOutcome::from(&video))?);
            pipeline.shutdown().await;
            Ok(())
        }
        Err(e) => {
            error!(stage = %e.stage(), "{}", e);
            eprintln!("❌ {} failed: {}", e.stage(), e.user_message());
            std::process::exit(1);
        }
    }
}
