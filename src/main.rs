use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;

use page_snap::capture;
use page_snap::config::AppConfig;
use page_snap::logging::init_logging;

#[derive(Parser, Debug)]
#[command(
    name = "page-snap",
    about = "Render a local HTML file in headless Chromium and capture a PNG screenshot"
)]
struct Cli {
    /// HTML document to render (defaults to the configured input path)
    input: Option<PathBuf>,

    /// Screenshot destination, overwritten on each run
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Budget in milliseconds for the page to settle after navigation
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Capture the full scrollable page instead of the viewport
    #[arg(long)]
    full_page: bool,

    /// Run the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Explicit config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv();
    let cli = Cli::parse();

    let (app_config, report) = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let _guard = init_logging(app_config.logging.clone())?;

    // Config discovery ran before the subscriber existed; surface its
    // diagnostics now.
    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }
    match &report.source {
        Some(path) => tracing::info!("Loaded config from {}", path.display()),
        None => tracing::info!("No config file found, using defaults"),
    }

    let mut capture_config = app_config.capture;
    if let Some(input) = cli.input {
        capture_config.input = input;
    }
    if let Some(output) = cli.output {
        capture_config.output = output;
    }
    if let Some(settle_ms) = cli.settle_ms {
        capture_config.settle_ms = settle_ms;
    }
    if cli.full_page {
        capture_config.full_page = true;
    }
    if cli.headed {
        capture_config.headed = true;
    }

    let output = capture::run(&capture_config).await?;
    println!("Screenshot taken at {}", output.display());
    Ok(())
}
